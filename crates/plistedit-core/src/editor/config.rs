//! Per-session editor configuration and host hooks.

use indexmap::IndexMap;
use serde::Serialize;

use crate::date;
use crate::path::Path;
use crate::types::{Dict, PlistValue};

/// Advisory styling tag returned by a [`Validator`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Success,
    Info,
    Warning,
    Danger,
}

impl Severity {
    pub fn name(self) -> &'static str {
        match self {
            Severity::Success => "success",
            Severity::Info => "info",
            Severity::Warning => "warning",
            Severity::Danger => "danger",
        }
    }
}

/// Pure check run on every leaf render and every leaf change. The result
/// only styles the cell; it never blocks a write.
pub trait Validator {
    fn validate(&self, path: &Path, value: &PlistValue) -> Option<Severity>;
}

impl<F> Validator for F
where
    F: Fn(&Path, &PlistValue) -> Option<Severity>,
{
    fn validate(&self, path: &Path, value: &PlistValue) -> Option<Severity> {
        self(path, value)
    }
}

/// What an editor session shows and how it fills in new values.
#[derive(Default)]
pub struct EditorConfig {
    /// Fixed key → label list. When set, only these keys are shown (in this
    /// order) and keys cannot be added, removed or renamed.
    pub restricted_keys: Option<IndexMap<String, String>>,
    /// Key → template used for new array elements and for renamed null
    /// entries.
    pub templates: Option<Dict>,
    pub validator: Option<Box<dyn Validator>>,
}

impl EditorConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_restricted_keys(mut self, keys: IndexMap<String, String>) -> Self {
        self.restricted_keys = Some(keys);
        self
    }

    pub fn with_templates(mut self, templates: Dict) -> Self {
        self.templates = Some(templates);
        self
    }

    pub fn with_validator(mut self, validator: impl Validator + 'static) -> Self {
        self.validator = Some(Box::new(validator));
        self
    }

    pub fn is_restricted(&self) -> bool {
        self.restricted_keys.is_some()
    }

    pub(crate) fn validate(&self, path: &Path, value: &PlistValue) -> Option<Severity> {
        self.validator.as_ref().and_then(|v| v.validate(path, value))
    }

    /// A fresh copy of the template registered for `key`.
    pub fn template_for(&self, key: &str) -> Option<PlistValue> {
        self.templates
            .as_ref()
            .and_then(|t| t.get(key))
            .map(instantiate)
    }

    /// Initial value for an element appended to the array at `array_path`:
    /// the template for the array's own key, or its first element when the
    /// template is itself an array.
    pub fn array_item_default(&self, array_path: &Path) -> PlistValue {
        let Some(last) = array_path.last() else {
            return PlistValue::Null;
        };
        match self.template_for(&last.as_key()) {
            Some(PlistValue::Array(mut items)) => {
                if items.is_empty() {
                    PlistValue::Null
                } else {
                    items.swap_remove(0)
                }
            }
            Some(other) => other,
            None => PlistValue::Null,
        }
    }
}

/// Deep-copy a template. Dates are instantiated as "now" rather than the
/// moment the template was written.
pub(crate) fn instantiate(template: &PlistValue) -> PlistValue {
    match template {
        PlistValue::Date(_) => PlistValue::Date(date::now()),
        PlistValue::Array(items) => PlistValue::Array(items.iter().map(instantiate).collect()),
        PlistValue::Dict(dict) => PlistValue::Dict(
            dict.iter()
                .map(|(k, v)| (k.clone(), instantiate(v)))
                .collect(),
        ),
        other => other.clone(),
    }
}

type ChangeHook<'a> = Box<dyn FnMut(&PlistValue) + 'a>;
type ClickHook<'a> = Box<dyn FnMut(&str) + 'a>;

/// Host callbacks. `on_change` receives the whole (mutated) tree after every
/// command; `on_property_click` receives a bracket-quoted accessor.
#[derive(Default)]
pub struct Hooks<'a> {
    pub(crate) on_change: Option<ChangeHook<'a>>,
    pub(crate) on_property_click: Option<ClickHook<'a>>,
}

impl<'a> Hooks<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_change(mut self, f: impl FnMut(&PlistValue) + 'a) -> Self {
        self.on_change = Some(Box::new(f));
        self
    }

    pub fn on_property_click(mut self, f: impl FnMut(&str) + 'a) -> Self {
        self.on_property_click = Some(Box::new(f));
        self
    }
}
