//! The mutation commands every editor control funnels through.

use serde::{Deserialize, Serialize};

use crate::date;
use crate::path::Path;
use crate::types::{Dict, PlistValue};

/// One user action. Each successfully applied command mutates the tree,
/// refreshes the affected part of the view and then fires `on_change`
/// exactly once.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// The "add" control under a dict (new `newKey…` entry) or an array
    /// (new element from the array's template).
    InsertEntry { container: Path },
    /// The row delete control.
    DeleteRow { path: Path },
    /// Edit of a dict key field. An empty `new_key` deletes the row.
    RenameKey { path: Path, new_key: String },
    /// Edit of a value control.
    ChangeValue { path: Path, input: ValueInput },
}

impl Command {
    pub fn name(&self) -> &'static str {
        match self {
            Command::InsertEntry { .. } => "insert entry",
            Command::DeleteRow { .. } => "delete row",
            Command::RenameKey { .. } => "rename key",
            Command::ChangeValue { .. } => "change value",
        }
    }
}

/// Raw input coming from a value control.
#[derive(Debug, Clone, PartialEq)]
pub enum ValueInput {
    /// Text typed into a text area or text field, interpreted by the cell's
    /// declared kind.
    Text(String),
    /// Checkbox state.
    Toggle(bool),
    /// Type picked for an unset value.
    Select(TypeChoice),
    /// A whole replacement value (drag-and-drop reorders).
    Replace(PlistValue),
}

/// Options offered for an unset (null) value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TypeChoice {
    Unset,
    String,
    Integer,
    Boolean,
    Date,
    Array,
    Dict,
}

impl TypeChoice {
    pub const ALL: [TypeChoice; 7] = [
        TypeChoice::Unset,
        TypeChoice::String,
        TypeChoice::Integer,
        TypeChoice::Boolean,
        TypeChoice::Date,
        TypeChoice::Array,
        TypeChoice::Dict,
    ];

    pub fn label(self) -> &'static str {
        match self {
            TypeChoice::Unset => "Select type",
            TypeChoice::String => "String",
            TypeChoice::Integer => "Integer",
            TypeChoice::Boolean => "Boolean",
            TypeChoice::Date => "Date",
            TypeChoice::Array => "Array",
            TypeChoice::Dict => "Dict",
        }
    }

    /// The value a choice starts out as. Textual defaults go through date
    /// reclassification, which is how the Date choice becomes a date.
    pub fn default_value(self) -> PlistValue {
        match self {
            TypeChoice::Unset => PlistValue::Null,
            TypeChoice::String => reclassify_text(String::new()),
            TypeChoice::Integer => PlistValue::Integer(0),
            TypeChoice::Boolean => PlistValue::Boolean(false),
            TypeChoice::Date => reclassify_text(date::format_date(&date::now())),
            TypeChoice::Array => PlistValue::Array(Vec::new()),
            TypeChoice::Dict => PlistValue::Dict(Dict::new()),
        }
    }
}

/// Text that parses as a date becomes a date; anything else stays a string.
pub fn reclassify_text(text: String) -> PlistValue {
    match date::parse_date(&text) {
        Some(dt) => PlistValue::Date(dt),
        None => PlistValue::String(text),
    }
}

/// What the host should do after a command, beyond re-reading the view.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Outcome {
    /// Control that should take keyboard focus.
    pub focus: Option<Path>,
    /// The input could not be interpreted and a placeholder was stored.
    pub invalid_input: bool,
}
