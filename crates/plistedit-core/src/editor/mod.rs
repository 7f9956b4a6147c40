//! Headless structured-value editor.
//!
//! An [`Editor`] session borrows a caller-owned [`PlistValue`] tree, renders
//! it into an abstract [`Cell`] view and applies [`Command`]s coming from the
//! surface. Every successful command mutates the tree, brings the affected
//! part of the view back in line with it and then calls `on_change` exactly
//! once with the whole tree.
//!
//! # Key design decisions
//!
//! - **Session object**: configuration, hooks and the view live on the
//!   session, so any number of editors can run side by side.
//! - **Targeted re-render**: a command rebuilds only the cell subtree it
//!   touched. Array deletions retarget later sibling rows in place instead.
//! - **Reorders are replacements**: drag-and-drop helpers compute the new
//!   array and route it through [`ValueInput::Replace`], so they notify like
//!   any other change.

pub mod command;
pub mod config;
pub mod outline;
pub mod view;

use tracing::{debug, warn};

use crate::date;
use crate::error::{PlistError, Result};
use crate::path::{self, Path, Segment};
use crate::types::{classify, Dict, Kind, PlistValue};

pub use command::{reclassify_text, Command, Outcome, TypeChoice, ValueInput};
pub use config::{EditorConfig, Hooks, Severity, Validator};
pub use outline::outline;
pub use view::{ArrayRow, Cell, Control, DictRow, KeyControl};

use view::Renderer;

/// Prefix for keys created by the "add entry" control.
const NEW_KEY: &str = "newKey";

/// An editing session over one value tree.
///
/// ```rust
/// use plistedit_core::{Command, Editor, EditorConfig, Hooks, Path, PlistValue};
///
/// let mut tree = PlistValue::from(serde_json::json!({"name": "Firefox"}));
/// let mut editor = Editor::attach(&mut tree, EditorConfig::new(), Hooks::new());
/// editor
///     .apply(Command::InsertEntry { container: Path::root() })
///     .unwrap();
/// assert!(editor.view().find(&Path::parse("newKey")).is_some());
/// ```
pub struct Editor<'a> {
    tree: &'a mut PlistValue,
    config: EditorConfig,
    hooks: Hooks<'a>,
    view: Cell,
}

impl<'a> Editor<'a> {
    /// Render `tree` and start a session over it.
    pub fn attach(tree: &'a mut PlistValue, config: EditorConfig, hooks: Hooks<'a>) -> Self {
        let view = Renderer::new(&config).render(&*tree, Path::root());
        Self {
            tree,
            config,
            hooks,
            view,
        }
    }

    pub fn view(&self) -> &Cell {
        &self.view
    }

    pub fn tree(&self) -> &PlistValue {
        &*self.tree
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    /// Rebuild the whole view from the tree.
    pub fn refresh(&mut self) {
        self.view = Renderer::new(&self.config).render(&*self.tree, Path::root());
    }

    /// Apply one command and notify `on_change` if it succeeded.
    pub fn apply(&mut self, command: Command) -> Result<Outcome> {
        debug!(command = command.name(), "applying editor command");
        let outcome = match command {
            Command::InsertEntry { container } => self.insert_entry(&container),
            Command::DeleteRow { path } => self.delete_row(&path),
            Command::RenameKey { path, new_key } => self.rename_key(&path, new_key),
            Command::ChangeValue { path, input } => self.change_value(&path, input),
        }?;
        if let Some(hook) = self.hooks.on_change.as_mut() {
            hook(&*self.tree);
        }
        Ok(outcome)
    }

    /// Report a click on the property at `path` to `on_property_click` and
    /// return the accessor expression that was sent.
    pub fn click_property(&mut self, path: &Path) -> String {
        let expression = path.accessor_expression();
        if let Some(hook) = self.hooks.on_property_click.as_mut() {
            hook(&expression);
        }
        expression
    }

    /// Drag an element of `array` from display position `from` to `to`.
    pub fn move_element(&mut self, array: &Path, from: usize, to: usize) -> Result<Outcome> {
        let len = self.array_len(array, "move element")?;
        if from >= len || to >= len {
            return Err(PlistError::IndexOutOfBounds {
                path: array.to_string(),
                index: from.max(to),
                len,
            });
        }
        let moved = path::read_or(&*self.tree, &array.index(from), PlistValue::Null);
        let mut order: Vec<usize> = (0..len).collect();
        let picked = order.remove(from);
        order.insert(to, picked);
        let items = order
            .into_iter()
            .map(|i| {
                if i == from {
                    moved.clone()
                } else {
                    path::read_or(&*self.tree, &array.index(i), PlistValue::Null)
                }
            })
            .collect();
        self.apply(Command::ChangeValue {
            path: array.clone(),
            input: ValueInput::Replace(PlistValue::Array(items)),
        })
    }

    /// Drag `element` out of its array and drop it into `target` at position
    /// `at` (clamped to the target's length). Fires one notification per
    /// array touched.
    pub fn transfer(&mut self, element: &Path, target: &Path, at: usize) -> Result<Outcome> {
        let (source, index) = match (element.parent(), element.last()) {
            (Some(parent), Some(Segment::Index(i))) => (parent, *i),
            (None, _) => return Err(PlistError::RootPath),
            _ => return Err(invalid("transfer", element, "not an array element")),
        };
        let source_len = self.array_len(&source, "transfer")?;
        self.array_len(target, "transfer")?;
        if target.starts_with(element) {
            return Err(invalid(
                "transfer",
                element,
                "an element cannot be moved into itself",
            ));
        }
        if source == *target {
            return self.move_element(&source, index, at.min(source_len.saturating_sub(1)));
        }

        let moved = path::read(&*self.tree, element)
            .cloned()
            .ok_or_else(|| PlistError::PathNotFound(element.to_string()))?;
        let mut remaining = self.array_items(&source)?;
        remaining.remove(index);
        self.apply(Command::ChangeValue {
            path: source.clone(),
            input: ValueInput::Replace(PlistValue::Array(remaining)),
        })?;

        let target = target
            .after_array_removal(&source, index)
            .unwrap_or_else(|| target.clone());
        let mut items = self.array_items(&target)?;
        let at = at.min(items.len());
        items.insert(at, moved);
        self.apply(Command::ChangeValue {
            path: target.clone(),
            input: ValueInput::Replace(PlistValue::Array(items)),
        })
    }

    fn cell(&self, path: &Path, command: &'static str) -> Result<&Cell> {
        self.view
            .find(path)
            .ok_or_else(|| invalid(command, path, "no control is bound to this path"))
    }

    fn array_len(&self, array: &Path, command: &'static str) -> Result<usize> {
        match &self.cell(array, command)?.control {
            Control::Array { rows } => Ok(rows.len()),
            _ => Err(invalid(command, array, "not an array")),
        }
    }

    fn array_items(&self, array: &Path) -> Result<Vec<PlistValue>> {
        path::read(&*self.tree, array)
            .and_then(PlistValue::as_array)
            .cloned()
            .ok_or_else(|| PlistError::PathNotFound(array.to_string()))
    }

    /// Write `value` at `path`; the root path replaces the whole tree.
    fn store(&mut self, path: &Path, value: PlistValue) -> Result<()> {
        if path.is_root() {
            *self.tree = value;
            Ok(())
        } else {
            path::write(&mut *self.tree, path, value)
        }
    }

    /// Rebuild the view subtree bound to `path` from the tree.
    fn rerender_at(&mut self, path: &Path) {
        let fresh = match path::read(&*self.tree, path) {
            Some(value) => Renderer::new(&self.config).render(value, path.clone()),
            None => return self.refresh(),
        };
        match self.view.find_mut(path) {
            Some(cell) => *cell = fresh,
            None => self.refresh(),
        }
    }

    fn insert_entry(&mut self, container: &Path) -> Result<Outcome> {
        let kind = self.cell(container, "insert entry")?.kind;
        match kind {
            Kind::Dict => {
                if self.config.is_restricted() {
                    return Err(PlistError::KeysRestricted);
                }
                let key = path::read(&*self.tree, container)
                    .and_then(PlistValue::as_dict)
                    .map(fresh_key)
                    .ok_or_else(|| PlistError::PathNotFound(container.to_string()))?;
                self.store(&container.key(&key), PlistValue::Null)?;
                self.rerender_at(container);
                Ok(Outcome::default())
            }
            Kind::Array => {
                let value = self.config.array_item_default(container);
                let textual = matches!(value, PlistValue::String(_));
                let index = path::append(&mut *self.tree, container, value)?;
                self.rerender_at(container);
                Ok(Outcome {
                    focus: textual.then(|| container.index(index)),
                    ..Outcome::default()
                })
            }
            other => Err(invalid(
                "insert entry",
                container,
                format!("a {other} has no entries"),
            )),
        }
    }

    fn delete_row(&mut self, path: &Path) -> Result<Outcome> {
        let parent = path.parent().ok_or(PlistError::RootPath)?;
        self.cell(path, "delete row")?;
        let parent_kind = self.cell(&parent, "delete row")?.kind;
        match parent_kind {
            Kind::Dict => {
                if self.config.is_restricted() {
                    return Err(PlistError::KeysRestricted);
                }
                path::remove(&mut *self.tree, path)?;
                if let Some(Cell {
                    control: Control::Dict { rows, .. },
                    ..
                }) = self.view.find_mut(&parent)
                {
                    rows.retain(|row| row.cell.path != *path);
                }
            }
            Kind::Array => {
                let Some(Segment::Index(index)) = path.last().cloned() else {
                    return Err(PlistError::PathNotFound(path.to_string()));
                };
                path::remove(&mut *self.tree, path)?;
                if let Some(Cell {
                    control: Control::Array { rows },
                    ..
                }) = self.view.find_mut(&parent)
                {
                    if index < rows.len() {
                        rows.remove(index);
                    }
                    let shift =
                        |p: &Path| p.after_array_removal(&parent, index).unwrap_or_else(|| p.clone());
                    for row in rows.iter_mut().skip(index) {
                        row.cell.retarget(&shift);
                    }
                }
            }
            _ => return Err(PlistError::NotAContainer(parent.to_string())),
        }
        Ok(Outcome::default())
    }

    fn rename_key(&mut self, path: &Path, new_key: String) -> Result<Outcome> {
        if self.config.is_restricted() {
            return Err(PlistError::KeysRestricted);
        }
        let parent = path.parent().ok_or(PlistError::RootPath)?;
        self.cell(path, "rename key")?;
        let old_key = path
            .last()
            .map(|segment| segment.as_key().into_owned())
            .ok_or(PlistError::RootPath)?;

        let dict = path::read_mut(&mut *self.tree, &parent)
            .and_then(PlistValue::as_dict_mut)
            .ok_or_else(|| invalid("rename key", path, "parent is not a dict"))?;
        let (position, _, old_value) = dict
            .shift_remove_full(old_key.as_str())
            .ok_or_else(|| PlistError::PathNotFound(path.to_string()))?;

        if new_key.is_empty() {
            self.drop_dict_row(&parent, path);
            return Ok(Outcome::default());
        }

        let value = if old_value.is_null() {
            self.config.template_for(&new_key).unwrap_or_default()
        } else {
            old_value
        };
        let collided = dict.contains_key(new_key.as_str());
        if collided {
            dict.insert(new_key.clone(), value);
        } else {
            dict.shift_insert(position, new_key.clone(), value);
        }

        if collided {
            self.rerender_at(&parent);
            return Ok(Outcome::default());
        }
        let new_path = parent.key(&new_key);
        let fresh = path::read(&*self.tree, &new_path)
            .map(|value| Renderer::new(&self.config).render(value, new_path.clone()));
        if let (
            Some(fresh),
            Some(Cell {
                control: Control::Dict { rows, .. },
                ..
            }),
        ) = (fresh, self.view.find_mut(&parent))
        {
            if let Some(row) = rows.iter_mut().find(|row| row.cell.path == *path) {
                row.key = KeyControl::Editable { key: new_key };
                row.cell = fresh;
            }
        }
        Ok(Outcome::default())
    }

    fn drop_dict_row(&mut self, parent: &Path, path: &Path) {
        if let Some(Cell {
            control: Control::Dict { rows, .. },
            ..
        }) = self.view.find_mut(parent)
        {
            rows.retain(|row| row.cell.path != *path);
        }
    }

    fn change_value(&mut self, path: &Path, input: ValueInput) -> Result<Outcome> {
        let cell = self.cell(path, "change value")?;
        let declared = cell.kind;
        let (value, invalid_input, focus) = match (&cell.control, input) {
            (Control::TypeSelect, ValueInput::Select(choice)) => {
                let value = choice.default_value();
                let focus = matches!(classify(&value), Kind::String | Kind::Number(_))
                    .then(|| path.clone());
                (value, false, focus)
            }
            (Control::Toggle { .. }, ValueInput::Toggle(checked)) => {
                (PlistValue::Boolean(checked), false, None)
            }
            (Control::TextArea { .. }, ValueInput::Text(text)) => {
                (PlistValue::String(text), false, None)
            }
            (Control::TextInput { .. }, ValueInput::Text(text)) if declared == Kind::Date => {
                match date::parse_date(&text) {
                    Some(dt) => (PlistValue::Date(dt), false, None),
                    None => {
                        warn!(path = %path, text = %text, "invalid date, storing the epoch");
                        (PlistValue::Date(date::epoch()), true, None)
                    }
                }
            }
            (Control::TextInput { .. }, ValueInput::Text(text)) => {
                let (value, ok) = parse_literal(path, &text);
                (value, !ok, None)
            }
            (_, ValueInput::Replace(value)) => (value, false, None),
            (_, input) => {
                return Err(invalid(
                    "change value",
                    path,
                    format!("{input:?} does not fit a {declared} control"),
                ))
            }
        };

        self.store(path, value)?;
        self.rerender_at(path);
        if invalid_input {
            if let Some(cell) = self.view.find_mut(path) {
                cell.tag = Some(Severity::Danger);
            }
        }
        Ok(Outcome {
            focus,
            invalid_input,
        })
    }
}

/// First of `newKey`, `newKey1`, `newKey2`, … not already in `dict`.
fn fresh_key(dict: &Dict) -> String {
    let mut key = NEW_KEY.to_string();
    let mut n = 1;
    while dict.contains_key(key.as_str()) {
        key = format!("{NEW_KEY}{n}");
        n += 1;
    }
    key
}

/// Interpret number-field text as a JSON literal. Blank text is `null`.
fn parse_literal(path: &Path, text: &str) -> (PlistValue, bool) {
    let source = if text.trim().is_empty() { "null" } else { text };
    match serde_json::from_str::<serde_json::Value>(source) {
        Ok(value) => (PlistValue::from(value), true),
        Err(err) => {
            warn!(path = %path, text = %text, error = %err, "not a valid literal, storing null");
            (PlistValue::Null, false)
        }
    }
}

fn invalid(command: &'static str, path: &Path, reason: impl Into<String>) -> PlistError {
    PlistError::InvalidCommand {
        command,
        path: path.to_string(),
        reason: reason.into(),
    }
}
