//! WASM bindings for plistedit-core.
//!
//! Browser hosts get the codec, the rendered editor view and stateless
//! editing: `apply` takes a document and one command and hands back the
//! edited document with its new view. Trees, views and commands cross the
//! boundary as JSON strings; errors become thrown JS strings.
//!
//! ## Build process
//!
//! ```sh
//! cargo build -p plistedit-wasm --target wasm32-unknown-unknown --release
//! wasm-bindgen --target web --out-dir packages/plistedit-js/wasm/ \
//!   target/wasm32-unknown-unknown/release/plistedit_wasm.wasm
//! ```

use std::cell::Cell as Counter;

use plistedit_core::{
    Cell, Command, Editor, EditorProfile, Hooks, Outcome, Path, PlistError, PlistValue,
    SaveOutcome, TypeChoice, ValueInput,
};
use serde::{Deserialize, Serialize};
use wasm_bindgen::prelude::*;

// ---------------------------------------------------------------------------
// Serde-friendly DTOs for crossing the WASM boundary as JSON
// ---------------------------------------------------------------------------

/// One editor action sent from JavaScript, e.g.
/// `{"op": "set_text", "path": "installs.0.path", "text": "/Applications"}`.
#[derive(Debug, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
enum CommandInput {
    InsertEntry { container: String },
    DeleteRow { path: String },
    RenameKey { path: String, new_key: String },
    SetText { path: String, text: String },
    Toggle { path: String, checked: bool },
    SelectType { path: String, choice: TypeChoice },
    Replace { path: String, value: serde_json::Value },
    Move { array: String, from: usize, to: usize },
    Transfer { element: String, target: String, at: usize },
}

#[derive(Serialize)]
struct EditResult<'a> {
    xml: String,
    tree: serde_json::Value,
    view: &'a Cell,
    /// `on_change` notifications fired by the command.
    changes: usize,
    focus: Option<String>,
    invalid_input: bool,
}

fn to_js(e: PlistError) -> JsValue {
    JsValue::from_str(&e.to_string())
}

/// Parse plist XML into compact JSON. Dates become wire-format strings.
#[wasm_bindgen]
pub fn parse(xml: &str) -> Result<String, JsValue> {
    parse_json(xml).map_err(to_js)
}

/// Serialize a JSON document as plist XML.
#[wasm_bindgen]
pub fn serialize(json: &str, pretty: bool) -> Result<String, JsValue> {
    serialize_json(json, pretty).map_err(to_js)
}

/// Render the editor view of a plist as JSON.
///
/// `profile` names a built-in preset (`manifest`, `pkginfo`, ...); `None`
/// shows every key.
#[wasm_bindgen]
pub fn outline(xml: &str, profile: Option<String>) -> Result<String, JsValue> {
    view_json(xml, profile.as_deref()).map_err(to_js)
}

/// Apply one editor command to a document and return the result as JSON:
/// `{"xml", "tree", "view", "changes", "focus", "invalid_input"}`.
///
/// `document` is plist XML or a JSON tree. Send back the returned `tree` to
/// keep unset values (the XML form writes them as empty dicts), or `xml` to
/// keep dates as dates.
#[wasm_bindgen]
pub fn apply(document: &str, profile: Option<String>, command: &str) -> Result<String, JsValue> {
    apply_json(document, profile.as_deref(), command).map_err(to_js)
}

/// Template keys of a preset that the plist does not use yet.
#[wasm_bindgen]
pub fn suggest_keys(xml: &str, profile: &str) -> Result<Vec<String>, JsValue> {
    let tree = plistedit_core::parse(xml).map_err(to_js)?;
    let profile = preset(profile).map_err(to_js)?;
    Ok(profile.suggest_keys(&tree))
}

/// Whether a save endpoint's response body reports success.
#[wasm_bindgen]
pub fn save_succeeded(body: &str) -> bool {
    SaveOutcome::from_body(body).is_saved()
}

fn parse_json(xml: &str) -> plistedit_core::Result<String> {
    let tree = plistedit_core::parse(xml)?;
    Ok(serde_json::to_string(&tree.to_json())?)
}

fn serialize_json(json: &str, pretty: bool) -> plistedit_core::Result<String> {
    let value: serde_json::Value = serde_json::from_str(json)?;
    Ok(plistedit_core::serialize(&PlistValue::from(value), pretty))
}

fn view_json(xml: &str, profile: Option<&str>) -> plistedit_core::Result<String> {
    let mut tree = plistedit_core::parse(xml)?;
    let profile = match profile {
        Some(name) => preset(name)?,
        None => EditorProfile::default(),
    };
    let editor = Editor::attach(&mut tree, profile.editor_config(), Hooks::new());
    Ok(serde_json::to_string(editor.view())?)
}

/// Plist XML when the text starts with markup, otherwise a JSON tree.
fn load_document(document: &str) -> plistedit_core::Result<PlistValue> {
    if document.trim_start().starts_with('<') {
        plistedit_core::parse(document)
    } else {
        let value: serde_json::Value = serde_json::from_str(document)?;
        Ok(PlistValue::from(value))
    }
}

fn apply_json(
    document: &str,
    profile: Option<&str>,
    command: &str,
) -> plistedit_core::Result<String> {
    let input: CommandInput = serde_json::from_str(command)?;
    let mut tree = load_document(document)?;
    let profile = match profile {
        Some(name) => preset(name)?,
        None => EditorProfile::default(),
    };
    let changes = Counter::new(0usize);
    let hooks = Hooks::new().on_change(|_| changes.set(changes.get() + 1));
    let mut editor = Editor::attach(&mut tree, profile.editor_config(), hooks);
    let outcome = run(&mut editor, input)?;
    let result = EditResult {
        xml: plistedit_core::serialize(editor.tree(), true),
        tree: editor.tree().to_json(),
        view: editor.view(),
        changes: changes.get(),
        focus: outcome.focus.as_ref().map(Path::to_string),
        invalid_input: outcome.invalid_input,
    };
    Ok(serde_json::to_string(&result)?)
}

fn run(editor: &mut Editor<'_>, input: CommandInput) -> plistedit_core::Result<Outcome> {
    let change = |path: &str, input: ValueInput| Command::ChangeValue {
        path: Path::parse(path),
        input,
    };
    match input {
        CommandInput::InsertEntry { container } => editor.apply(Command::InsertEntry {
            container: Path::parse(&container),
        }),
        CommandInput::DeleteRow { path } => editor.apply(Command::DeleteRow {
            path: Path::parse(&path),
        }),
        CommandInput::RenameKey { path, new_key } => editor.apply(Command::RenameKey {
            path: Path::parse(&path),
            new_key,
        }),
        CommandInput::SetText { path, text } => editor.apply(change(&path, ValueInput::Text(text))),
        CommandInput::Toggle { path, checked } => {
            editor.apply(change(&path, ValueInput::Toggle(checked)))
        }
        CommandInput::SelectType { path, choice } => {
            editor.apply(change(&path, ValueInput::Select(choice)))
        }
        CommandInput::Replace { path, value } => {
            editor.apply(change(&path, ValueInput::Replace(PlistValue::from(value))))
        }
        CommandInput::Move { array, from, to } => {
            editor.move_element(&Path::parse(&array), from, to)
        }
        CommandInput::Transfer {
            element,
            target,
            at,
        } => editor.transfer(&Path::parse(&element), &Path::parse(&target), at),
    }
}

fn preset(name: &str) -> plistedit_core::Result<EditorProfile> {
    EditorProfile::preset(name).ok_or_else(|| {
        PlistError::InvalidCommand {
            command: "load profile",
            path: String::new(),
            reason: format!("unknown preset {name:?}"),
        }
    })
}
