//! Plist XML encoder: converts a [`PlistValue`] tree into property-list text.
//!
//! The encoder writes a flat document in one pass:
//!
//! - **Header**: XML declaration, Apple DOCTYPE, `<plist version="1.0">`
//! - **Dicts**: `<key>` / value pairs in stored order
//! - **Numbers**: `<integer>` when the value equals its own rounding, else `<real>`
//! - **Booleans**: self-closing `<true/>` / `<false/>`
//! - **Strings**: always `<string>…</string>`, even when empty
//! - **Dates**: whole seconds with a trailing `Z`
//!
//! Pretty output re-flows the flat text: every `><` boundary becomes a line
//! break and open tags indent their contents by two spaces. Empty strings are
//! collapsed to `<string/>` during that pass so they are not split across two
//! lines, then expanded again.
//!
//! # Example
//! ```
//! use plistedit_core::{serialize, PlistValue};
//! let xml = serialize(&PlistValue::Array(vec![1.into(), true.into()]), false);
//! assert!(xml.ends_with("<plist version=\"1.0\"><array><integer>1</integer><true/></array></plist>"));
//! ```

use std::sync::LazyLock;

use quick_xml::escape::escape;
use regex::Regex;
use tracing::debug;

use crate::date;
use crate::types::{is_integral, PlistValue};

/// XML declaration and DOCTYPE that open every document.
pub const PLIST_HEADER: &str = concat!(
    r#"<?xml version="1.0" encoding="UTF-8"?>"#,
    r#"<!DOCTYPE plist PUBLIC "-//Apple//DTD PLIST 1.0//EN" "http://www.apple.com/DTDs/PropertyList-1.0.dtd">"#,
);

const EMPTY_STRING: &str = "<string></string>";
const COLLAPSED_STRING: &str = "<string/>";

/// Encode a value tree as plist XML. `pretty` adds line breaks and two-space
/// indentation.
pub fn serialize(value: &PlistValue, pretty: bool) -> String {
    let mut out = String::from(PLIST_HEADER);
    out.push_str(r#"<plist version="1.0">"#);
    encode_value(value, &mut out);
    out.push_str("</plist>");
    if pretty {
        let collapsed = out.replace(EMPTY_STRING, COLLAPSED_STRING);
        format_xml(&collapsed).replace(COLLAPSED_STRING, EMPTY_STRING)
    } else {
        out
    }
}

fn encode_value(value: &PlistValue, out: &mut String) {
    match value {
        PlistValue::Dict(dict) => {
            out.push_str("<dict>");
            for (key, child) in dict {
                out.push_str("<key>");
                out.push_str(&escape(key.as_str()));
                out.push_str("</key>");
                encode_value(child, out);
            }
            out.push_str("</dict>");
        }
        PlistValue::Array(items) => {
            out.push_str("<array>");
            for item in items {
                encode_value(item, out);
            }
            out.push_str("</array>");
        }
        PlistValue::Date(dt) => {
            out.push_str("<date>");
            out.push_str(&date::format_date(dt));
            out.push_str("</date>");
        }
        PlistValue::Boolean(b) => out.push_str(if *b { "<true/>" } else { "<false/>" }),
        PlistValue::Integer(i) => {
            out.push_str("<integer>");
            out.push_str(&i.to_string());
            out.push_str("</integer>");
        }
        PlistValue::Real(f) => {
            if is_integral(*f) {
                out.push_str("<integer>");
                out.push_str(&(*f as i64).to_string());
                out.push_str("</integer>");
            } else {
                out.push_str("<real>");
                out.push_str(&f.to_string());
                out.push_str("</real>");
            }
        }
        PlistValue::String(s) => {
            out.push_str("<string>");
            out.push_str(&escape(s.as_str()));
            out.push_str("</string>");
        }
        // Plists have no null; an unset value is written as an empty dict.
        PlistValue::Null => {
            debug!("encoding null as an empty <dict>");
            out.push_str("<dict></dict>");
        }
    }
}

/// A line that carries both an opening and its closing tag, e.g.
/// `<string>abc</string>`.
static CLOSES_INLINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r".+</\w[^>]*>$").expect("static regex"));

static CLOSING_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^</\w").expect("static regex"));

/// An opening tag that is not self-closing.
static OPENING_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^<\w[^>]*[^/]>.*$").expect("static regex"));

/// Split flat XML at every `><` boundary. Text content (which may hold
/// newlines) stays inside its node.
fn split_nodes(xml: &str) -> Vec<&str> {
    let mut nodes = Vec::new();
    let mut start = 0;
    let bytes = xml.as_bytes();
    for i in 0..bytes.len().saturating_sub(1) {
        if bytes[i] == b'>' && bytes[i + 1] == b'<' {
            nodes.push(&xml[start..=i]);
            start = i + 1;
        }
    }
    if start < xml.len() {
        nodes.push(&xml[start..]);
    }
    nodes
}

fn format_xml(xml: &str) -> String {
    let mut formatted = String::with_capacity(xml.len() * 2);
    let mut pad = 0usize;
    for node in split_nodes(xml) {
        let mut indent = 0;
        if CLOSES_INLINE.is_match(node) {
            indent = 0;
        } else if CLOSING_TAG.is_match(node) {
            pad = pad.saturating_sub(1);
        } else if OPENING_TAG.is_match(node) {
            indent = 1;
        }
        for _ in 0..pad {
            formatted.push_str("  ");
        }
        formatted.push_str(node);
        formatted.push('\n');
        pad += indent;
    }
    formatted
}
