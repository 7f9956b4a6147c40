//! Plain-text surface for a rendered view.
//!
//! ```text
//! name: "Firefox"
//! catalogs: <array>
//!   [0]: "testing"
//!   + add element
//! unattended_install: [x]
//! + add entry
//! ```

use super::view::{Cell, Control, KeyControl};

/// Render a view as indented text, two spaces per level.
pub fn outline(cell: &Cell) -> String {
    let mut out = String::new();
    match &cell.control {
        Control::Dict { .. } | Control::Array { .. } => write_children(cell, 0, &mut out),
        _ => {
            out.push_str(&leaf_text(cell));
            out.push('\n');
        }
    }
    out
}

fn write_children(cell: &Cell, depth: usize, out: &mut String) {
    let indent = "  ".repeat(depth);
    match &cell.control {
        Control::Dict { rows, addable } => {
            for row in rows {
                let label = match &row.key {
                    KeyControl::Label { key, label } => format!("{label} ({key})"),
                    KeyControl::Editable { key } => key.clone(),
                };
                write_entry(&indent, &label, &row.cell, depth, out);
            }
            if *addable {
                out.push_str(&indent);
                out.push_str("+ add entry\n");
            }
        }
        Control::Array { rows } => {
            for (i, row) in rows.iter().enumerate() {
                write_entry(&indent, &format!("[{i}]"), &row.cell, depth, out);
            }
            out.push_str(&indent);
            out.push_str("+ add element\n");
        }
        _ => {}
    }
}

fn write_entry(indent: &str, label: &str, cell: &Cell, depth: usize, out: &mut String) {
    out.push_str(indent);
    out.push_str(label);
    match &cell.control {
        Control::Dict { .. } => {
            out.push_str(": <dict>\n");
            write_children(cell, depth + 1, out);
        }
        Control::Array { .. } => {
            out.push_str(": <array>\n");
            write_children(cell, depth + 1, out);
        }
        _ => {
            out.push_str(": ");
            out.push_str(&leaf_text(cell));
            out.push('\n');
        }
    }
}

fn leaf_text(cell: &Cell) -> String {
    let mut text = match &cell.control {
        Control::TypeSelect => "<select type>".to_string(),
        Control::Toggle { checked } => (if *checked { "[x]" } else { "[ ]" }).to_string(),
        Control::TextArea { text, .. } => format!("{text:?}"),
        Control::TextInput { text } => text.clone(),
        Control::Dict { .. } => "<dict>".to_string(),
        Control::Array { .. } => "<array>".to_string(),
    };
    if let Some(tag) = cell.tag {
        text.push_str("  !");
        text.push_str(tag.name());
    }
    text
}
