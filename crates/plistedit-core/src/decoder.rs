//! Plist XML decoder: converts property-list text into a [`PlistValue`] tree.
//!
//! The decoder walks `quick-xml` events with a small recursive descent:
//!
//! - `<plist>` is unwrapped to its first child (extra children are skipped)
//! - `<dict>` alternates `<key>` and a value element; a repeated key replaces
//!   the earlier value but keeps its position
//! - `<array>`, `<string>`, `<integer>`, `<real>`, `<true/>`, `<false/>`
//! - `<date>` text is parsed as ISO-8601; unparseable text logs a warning and
//!   decodes as the epoch instead of failing the document
//! - `<integer>` text beyond the `i64` range (unsigned 64-bit values) decodes
//!   as a real; number text that does not parse logs a warning and decodes
//!   as zero
//! - `<data>` keeps its base64 text verbatim and decodes as a string
//!
//! # Failure modes
//!
//! Malformed XML surfaces as [`PlistError::Xml`], an element outside the plist
//! grammar as [`PlistError::UnknownElement`], and misplaced but well-formed
//! markup as [`PlistError::Structure`]. Callers must treat any error as an
//! invalid document rather than an empty one.

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use tracing::{debug, warn};

use crate::date;
use crate::error::{PlistError, Result};
use crate::types::{Dict, PlistValue};

/// Deeper documents are rejected rather than risking the stack.
const MAX_DEPTH: usize = 512;

/// Decode plist XML text into a value tree.
pub fn parse(xml: &str) -> Result<PlistValue> {
    let result = Decoder::new(xml).parse_document();
    if let Err(err) = &result {
        warn!(error = %err, "plist decode failed");
    }
    result
}

/// `<integer>` content. Out-of-range values keep their magnitude as a real.
fn integer_value(text: &str) -> PlistValue {
    let trimmed = text.trim();
    if let Ok(i) = trimmed.parse::<i64>() {
        return PlistValue::Integer(i);
    }
    match trimmed.parse::<f64>() {
        Ok(f) if f.is_finite() => {
            debug!(text = %trimmed, "integer outside the i64 range, decoding as real");
            PlistValue::Real(f)
        }
        _ => {
            warn!(text = %text, "invalid <integer> value in plist, using 0");
            PlistValue::Integer(0)
        }
    }
}

fn real_value(text: &str) -> PlistValue {
    match text.trim().parse::<f64>() {
        Ok(f) => PlistValue::Real(f),
        Err(_) => {
            warn!(text = %text, "invalid <real> value in plist, using 0");
            PlistValue::Real(0.0)
        }
    }
}

/// An opened element: its tag name and whether it was self-closing.
struct Element {
    name: String,
    empty: bool,
}

impl Element {
    fn new(start: &BytesStart<'_>, empty: bool) -> Self {
        Self {
            name: String::from_utf8_lossy(start.name().as_ref()).into_owned(),
            empty,
        }
    }
}

struct Decoder<'a> {
    reader: Reader<&'a [u8]>,
}

impl<'a> Decoder<'a> {
    fn new(xml: &'a str) -> Self {
        Self {
            reader: Reader::from_str(xml),
        }
    }

    fn xml_error(&self, message: impl Into<String>) -> PlistError {
        PlistError::Xml {
            position: self.reader.buffer_position() as u64,
            message: message.into(),
        }
    }

    fn next_event(&mut self) -> Result<Event<'a>> {
        match self.reader.read_event() {
            Ok(event) => Ok(event),
            Err(err) => Err(self.xml_error(err.to_string())),
        }
    }

    /// Find the root element, unwrap `<plist>`, and require nothing but
    /// whitespace, comments or processing instructions after it.
    fn parse_document(&mut self) -> Result<PlistValue> {
        let root = loop {
            match self.next_event()? {
                Event::Start(e) => break Element::new(&e, false),
                Event::Empty(e) => break Element::new(&e, true),
                Event::Eof => {
                    return Err(PlistError::Structure(
                        "document has no root element".to_string(),
                    ))
                }
                Event::Text(t) if !t.iter().all(u8::is_ascii_whitespace) => {
                    return Err(PlistError::Structure(
                        "text outside the root element".to_string(),
                    ))
                }
                _ => {}
            }
        };

        let value = if root.name == "plist" {
            if root.empty {
                return Err(PlistError::Structure("<plist> has no value".to_string()));
            }
            let first = self
                .next_element()?
                .ok_or_else(|| PlistError::Structure("<plist> has no value".to_string()))?;
            let value = self.parse_value(first, 1)?;
            while let Some(extra) = self.next_element()? {
                debug!(element = %extra.name, "ignoring extra <plist> child");
                self.skip(&extra)?;
            }
            value
        } else {
            self.parse_value(root, 0)?
        };

        loop {
            match self.next_event()? {
                Event::Eof => return Ok(value),
                Event::Start(_) | Event::Empty(_) | Event::CData(_) => {
                    return Err(PlistError::Structure(
                        "content after the root element".to_string(),
                    ))
                }
                Event::Text(t) if !t.iter().all(u8::is_ascii_whitespace) => {
                    return Err(PlistError::Structure(
                        "text after the root element".to_string(),
                    ))
                }
                _ => {}
            }
        }
    }

    /// The next child element of the current container, or `None` when the
    /// container's end tag is reached. Whitespace and comments are skipped.
    fn next_element(&mut self) -> Result<Option<Element>> {
        loop {
            match self.next_event()? {
                Event::Start(e) => return Ok(Some(Element::new(&e, false))),
                Event::Empty(e) => return Ok(Some(Element::new(&e, true))),
                Event::End(_) => return Ok(None),
                Event::Text(t) => {
                    if !t.iter().all(u8::is_ascii_whitespace) {
                        let text = String::from_utf8_lossy(&t).trim().to_string();
                        return Err(PlistError::Structure(format!(
                            "unexpected text {text:?} between elements"
                        )));
                    }
                }
                Event::CData(_) => {
                    return Err(PlistError::Structure(
                        "unexpected CDATA between elements".to_string(),
                    ))
                }
                Event::Eof => return Err(self.xml_error("unexpected end of document")),
                _ => {}
            }
        }
    }

    fn parse_value(&mut self, element: Element, depth: usize) -> Result<PlistValue> {
        if depth > MAX_DEPTH {
            return Err(PlistError::Structure(format!(
                "nesting deeper than {MAX_DEPTH} levels"
            )));
        }
        match element.name.as_str() {
            "dict" => self.parse_dict(&element, depth),
            "array" => self.parse_array(&element, depth),
            // `data` stays base64 text: the model has no binary variant.
            "string" | "data" => Ok(PlistValue::String(self.read_text(&element)?)),
            "date" => {
                let text = self.read_text(&element)?;
                match date::parse_date(&text) {
                    Some(dt) => Ok(PlistValue::Date(dt)),
                    None => {
                        warn!(text = %text, "invalid date string in plist, using epoch");
                        Ok(PlistValue::Date(date::epoch()))
                    }
                }
            }
            "integer" => {
                let text = self.read_text(&element)?;
                Ok(integer_value(&text))
            }
            "real" => {
                let text = self.read_text(&element)?;
                Ok(real_value(&text))
            }
            "true" | "false" => {
                let b = element.name == "true";
                self.skip(&element)?;
                Ok(PlistValue::Boolean(b))
            }
            other => Err(PlistError::UnknownElement(other.to_string())),
        }
    }

    fn parse_dict(&mut self, element: &Element, depth: usize) -> Result<PlistValue> {
        let mut dict = Dict::new();
        if element.empty {
            return Ok(PlistValue::Dict(dict));
        }
        let mut pending_key: Option<String> = None;
        while let Some(child) = self.next_element()? {
            if child.name == "key" {
                if let Some(previous) = &pending_key {
                    debug!(key = %previous, "<key> without a value, ignoring");
                }
                pending_key = Some(self.read_text(&child)?);
                continue;
            }
            let value = self.parse_value(child, depth + 1)?;
            match pending_key.take() {
                Some(key) => {
                    dict.insert(key, value);
                }
                None => {
                    return Err(PlistError::Structure(
                        "<dict> value without a preceding <key>".to_string(),
                    ))
                }
            }
        }
        if let Some(key) = pending_key {
            debug!(key = %key, "trailing <key> without a value, ignoring");
        }
        Ok(PlistValue::Dict(dict))
    }

    fn parse_array(&mut self, element: &Element, depth: usize) -> Result<PlistValue> {
        let mut items = Vec::new();
        if element.empty {
            return Ok(PlistValue::Array(items));
        }
        while let Some(child) = self.next_element()? {
            items.push(self.parse_value(child, depth + 1)?);
        }
        Ok(PlistValue::Array(items))
    }

    /// Collect the text content of a scalar element up to its end tag.
    fn read_text(&mut self, element: &Element) -> Result<String> {
        let mut text = String::new();
        if element.empty {
            return Ok(text);
        }
        loop {
            match self.next_event()? {
                Event::Text(t) => match t.unescape() {
                    Ok(s) => text.push_str(&s),
                    Err(err) => return Err(self.xml_error(err.to_string())),
                },
                Event::CData(c) => text.push_str(&String::from_utf8_lossy(&c.into_inner())),
                Event::End(_) => return Ok(text),
                Event::Start(_) | Event::Empty(_) => {
                    return Err(PlistError::Structure(format!(
                        "<{}> cannot contain elements",
                        element.name
                    )))
                }
                Event::Eof => return Err(self.xml_error("unexpected end of document")),
                _ => {}
            }
        }
    }

    /// Consume everything up to the matching end tag of `element`.
    fn skip(&mut self, element: &Element) -> Result<()> {
        if element.empty {
            return Ok(());
        }
        let mut depth = 1usize;
        while depth > 0 {
            match self.next_event()? {
                Event::Start(_) => depth += 1,
                Event::End(_) => depth -= 1,
                Event::Eof => return Err(self.xml_error("unexpected end of document")),
                _ => {}
            }
        }
        Ok(())
    }
}
