//! Abstract UI tree produced by rendering a value tree.
//!
//! Rendering is a pure recursive transform from a [`PlistValue`] subtree to a
//! [`Cell`]. Cells know their path, the kind of value they were built from,
//! an optional validator tag and the control to draw. A surface adapter (DOM
//! glue, a terminal outline, a JSON export) walks the cells; nothing here
//! touches a real surface.

use serde::Serialize;

use super::config::{EditorConfig, Severity};
use crate::date;
use crate::path::Path;
use crate::types::{classify, is_integral, Kind, PlistValue};

/// Single-line strings longer than this get a two-row text area.
const LONG_LINE: usize = 79;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Cell {
    pub path: Path,
    pub kind: Kind,
    pub tag: Option<Severity>,
    pub control: Control,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Control {
    /// Key/value table. `addable` shows the "add entry" control.
    Dict { rows: Vec<DictRow>, addable: bool },
    /// Reorderable element table with an "add element" control.
    Array { rows: Vec<ArrayRow> },
    /// Type picker for an unset value.
    TypeSelect,
    Toggle { checked: bool },
    TextArea { text: String, rows: usize },
    TextInput { text: String },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DictRow {
    pub key: KeyControl,
    pub deletable: bool,
    pub cell: Cell,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum KeyControl {
    /// Fixed caption for a restricted key.
    Label { key: String, label: String },
    /// Editable key field supporting rename.
    Editable { key: String },
}

impl KeyControl {
    pub fn key(&self) -> &str {
        match self {
            KeyControl::Label { key, .. } | KeyControl::Editable { key } => key,
        }
    }
}

/// Array rows are always draggable and deletable.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ArrayRow {
    pub cell: Cell,
}

impl Cell {
    /// The cell bound to `path`, searching this cell's subtree.
    pub fn find(&self, path: &Path) -> Option<&Cell> {
        if self.path == *path {
            return Some(self);
        }
        self.children()
            .find(|child| path.starts_with(&child.path))
            .and_then(|child| child.find(path))
    }

    pub fn find_mut(&mut self, path: &Path) -> Option<&mut Cell> {
        if self.path == *path {
            return Some(self);
        }
        self.children_mut()
            .find(|child| path.starts_with(&child.path))
            .and_then(|child| child.find_mut(path))
    }

    /// Direct child cells, in display order.
    pub fn children(&self) -> Box<dyn Iterator<Item = &Cell> + '_> {
        match &self.control {
            Control::Dict { rows, .. } => Box::new(rows.iter().map(|r| &r.cell)),
            Control::Array { rows } => Box::new(rows.iter().map(|r| &r.cell)),
            _ => Box::new(std::iter::empty()),
        }
    }

    fn children_mut(&mut self) -> Box<dyn Iterator<Item = &mut Cell> + '_> {
        match &mut self.control {
            Control::Dict { rows, .. } => Box::new(rows.iter_mut().map(|r| &mut r.cell)),
            Control::Array { rows } => Box::new(rows.iter_mut().map(|r| &mut r.cell)),
            _ => Box::new(std::iter::empty()),
        }
    }

    /// Rewrite the path binding of this cell and every descendant.
    pub(crate) fn retarget(&mut self, f: &dyn Fn(&Path) -> Path) {
        self.path = f(&self.path);
        for child in self.children_mut() {
            child.retarget(f);
        }
    }

    /// Every path bound anywhere in this subtree, depth first.
    pub fn paths(&self) -> Vec<Path> {
        let mut out = vec![self.path.clone()];
        for child in self.children() {
            out.extend(child.paths());
        }
        out
    }
}

pub(crate) struct Renderer<'c> {
    config: &'c EditorConfig,
}

impl<'c> Renderer<'c> {
    pub(crate) fn new(config: &'c EditorConfig) -> Self {
        Self { config }
    }

    pub(crate) fn render(&self, value: &PlistValue, path: Path) -> Cell {
        let kind = classify(value);
        let control = match value {
            PlistValue::Dict(dict) => {
                let restricted = self.config.restricted_keys.as_ref();
                let keys: Vec<&String> = match restricted {
                    Some(list) => list.keys().filter(|k| dict.contains_key(*k)).collect(),
                    None => dict.keys().collect(),
                };
                let rows = keys
                    .into_iter()
                    .map(|key| {
                        let key_control = match restricted.and_then(|list| list.get(key)) {
                            Some(label) => KeyControl::Label {
                                key: key.clone(),
                                label: label.clone(),
                            },
                            None => KeyControl::Editable { key: key.clone() },
                        };
                        DictRow {
                            key: key_control,
                            deletable: restricted.is_none(),
                            cell: self.render(&dict[key.as_str()], path.key(key)),
                        }
                    })
                    .collect();
                Control::Dict {
                    rows,
                    addable: restricted.is_none(),
                }
            }
            PlistValue::Array(items) => Control::Array {
                rows: items
                    .iter()
                    .enumerate()
                    .map(|(i, item)| ArrayRow {
                        cell: self.render(item, path.index(i)),
                    })
                    .collect(),
            },
            PlistValue::Null => Control::TypeSelect,
            PlistValue::Boolean(b) => Control::Toggle { checked: *b },
            PlistValue::String(s) => Control::TextArea {
                text: s.clone(),
                rows: text_rows(s),
            },
            PlistValue::Date(dt) => Control::TextInput {
                text: date::format_date(dt),
            },
            PlistValue::Integer(_) | PlistValue::Real(_) => Control::TextInput {
                text: number_text(value),
            },
        };
        let tag = if kind.is_container() {
            None
        } else {
            self.config.validate(&path, value)
        };
        Cell {
            path,
            kind,
            tag,
            control,
        }
    }
}

/// Visible rows for a text area: one per line, at least two for a long
/// single line.
pub fn text_rows(text: &str) -> usize {
    let rows = text.split('\n').count();
    if rows == 1 && text.chars().count() > LONG_LINE {
        2
    } else {
        rows
    }
}

/// Literal text shown in a number field; integral reals show no fraction.
fn number_text(value: &PlistValue) -> String {
    match value {
        PlistValue::Integer(i) => i.to_string(),
        PlistValue::Real(f) if is_integral(*f) => (*f as i64).to_string(),
        PlistValue::Real(f) => f.to_string(),
        _ => String::new(),
    }
}
