//! Editor profiles: which keys an editor shows, how it fills in new values
//! and which leaves it flags.
//!
//! A profile is plain data. The built-in presets cover repository manifests
//! and pkginfo records; anything else loads from TOML:
//!
//! ```toml
//! [restricted_keys]
//! name = "Name"
//! catalogs = "Catalogs"
//!
//! [templates]
//! catalogs = ["testing"]
//! unattended_install = true
//!
//! [[validators]]
//! keys = ["catalogs"]
//! allowed = ["testing", "production"]
//! ```

use indexmap::IndexMap;
use serde::Deserialize;
use serde_json::json;
use tracing::debug;

use crate::date;
use crate::editor::{EditorConfig, Severity, Validator};
use crate::error::Result;
use crate::path::Path;
use crate::types::{Dict, PlistValue};

/// Leaves under any of `keys` must be one of `allowed`. An empty `allowed`
/// list disables the rule (the host has no names to check against yet).
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct MembershipRule {
    pub keys: Vec<String>,
    #[serde(default)]
    pub allowed: Vec<String>,
}

impl MembershipRule {
    pub fn new(keys: &[&str]) -> Self {
        Self {
            keys: keys.iter().map(|k| k.to_string()).collect(),
            allowed: Vec::new(),
        }
    }

    fn applies_to(&self, path: &Path) -> bool {
        path.segments()
            .iter()
            .any(|segment| self.keys.iter().any(|k| *k == segment.as_key()))
    }

    fn check(&self, path: &Path, value: &PlistValue) -> Option<Severity> {
        if self.allowed.is_empty() || !self.applies_to(path) {
            return None;
        }
        match value.as_str() {
            Some(name) if self.allowed.iter().any(|a| a == name) => None,
            _ => Some(Severity::Danger),
        }
    }
}

/// [`Validator`] that runs a list of [`MembershipRule`]s.
#[derive(Debug, Clone, Default)]
pub struct MembershipValidator {
    rules: Vec<MembershipRule>,
}

impl MembershipValidator {
    pub fn new(rules: Vec<MembershipRule>) -> Self {
        Self { rules }
    }
}

impl Validator for MembershipValidator {
    fn validate(&self, path: &Path, value: &PlistValue) -> Option<Severity> {
        self.rules.iter().find_map(|rule| rule.check(path, value))
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct EditorProfile {
    /// Key → label. `None` shows every key and allows key edits.
    pub restricted_keys: Option<IndexMap<String, String>>,
    /// Key → default value; also the source of key suggestions.
    pub templates: Dict,
    pub validators: Vec<MembershipRule>,
}

#[derive(Deserialize)]
struct ProfileFile {
    restricted_keys: Option<IndexMap<String, String>>,
    #[serde(default)]
    templates: toml::Table,
    #[serde(default)]
    validators: Vec<MembershipRule>,
}

const MANIFEST_LABELS: &[(&str, &str)] = &[
    ("catalogs", "Catalogs"),
    ("included_manifests", "Included Manifests"),
    ("managed_installs", "Managed Installs"),
    ("managed_uninstalls", "Managed Uninstalls"),
    ("managed_updates", "Managed Updates"),
    ("optional_installs", "Optional Installs"),
];

const PKGINFO_LABELS: &[(&str, &str)] = &[
    ("name", "Name"),
    ("version", "Version"),
    ("display_name", "Display name"),
    ("description", "Description"),
    ("catalogs", "Catalogs"),
    ("category", "Category"),
    ("developer", "Developer"),
    ("unattended_install", "Unattended install"),
    ("unattended_uninstall", "Unattended uninstall"),
];

const INSTALL_ITEM_KEYS: &[&str] = &[
    "managed_installs",
    "managed_uninstalls",
    "managed_updates",
    "optional_installs",
];

fn labels(pairs: &[(&str, &str)]) -> IndexMap<String, String> {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

fn template_dict(json: serde_json::Value) -> Dict {
    match PlistValue::from(json) {
        PlistValue::Dict(dict) => dict,
        _ => Dict::new(),
    }
}

impl EditorProfile {
    /// Full manifest editor: every key editable, templates for the standard
    /// manifest arrays.
    pub fn manifest() -> Self {
        let templates = template_dict(json!({
            "catalogs": ["catalogname"],
            "conditional_items": [{
                "condition": "os_vers_minor > 9",
                "managed_installs": ["itemname"]
            }],
            "included_manifests": ["manifestname"],
            "managed_installs": ["itemname"],
            "managed_uninstalls": ["itemname"],
            "managed_updates": ["itemname"],
            "optional_installs": ["itemname"]
        }));
        Self {
            restricted_keys: None,
            templates,
            validators: vec![
                MembershipRule::new(&["catalogs"]),
                MembershipRule::new(&["included_manifests"]),
                MembershipRule::new(INSTALL_ITEM_KEYS),
            ],
        }
    }

    /// Manifest editor limited to the commonly edited arrays.
    pub fn manifest_basics() -> Self {
        Self {
            restricted_keys: Some(labels(MANIFEST_LABELS)),
            ..Self::manifest()
        }
    }

    /// Full pkginfo editor.
    pub fn pkginfo() -> Self {
        let alert = |title: &str, ok: &str| {
            json!({
                "alert_title": title,
                "alert_detail": "Some important information",
                "ok_label": ok,
                "cancel_label": "Cancel"
            })
        };
        let script = "#!/bin/sh\nexit 0";
        let entries: Vec<(&str, PlistValue)> = vec![
            ("apple_item", true.into()),
            ("autoremove", true.into()),
            ("blocking_applications", json!(["appname"]).into()),
            ("catalogs", json!([""]).into()),
            ("description", "".into()),
            ("display_name", "".into()),
            ("force_install_after_date", PlistValue::Date(date::now())),
            ("icon_name", "".into()),
            ("installable_condition", "".into()),
            ("installed_size", PlistValue::Integer(0)),
            ("installer_choices_xml", "".into()),
            (
                "installer_environment",
                json!({"USER": "CURRENT_CONSOLE_USER"}).into(),
            ),
            ("installer_item_hash", "".into()),
            ("installer_item_location", "".into()),
            ("installer_type", "".into()),
            ("installs", json!([{"type": "file", "path": ""}]).into()),
            (
                "items_to_copy",
                json!([{
                    "destination_path": "",
                    "source_item": "",
                    "user": "root",
                    "group": "admin",
                    "mode": "o-w"
                }])
                .into(),
            ),
            ("minimum_munki_version", "2.3.0".into()),
            ("minimum_os_version", "10.6.".into()),
            ("maximum_os_version", "10.11".into()),
            ("name", "".into()),
            ("notes", "".into()),
            ("OnDemand", true.into()),
            ("PackageCompleteURL", "".into()),
            ("PackageURL", "".into()),
            ("package_path", "".into()),
            ("installcheck_script", "".into()),
            ("uninstallcheck_script", "".into()),
            ("postinstall_script", script.into()),
            ("postuninstall_script", script.into()),
            ("preinstall_alert", alert("Preinstall Alert", "Install").into()),
            ("preuninstall_alert", alert("Preuninstall Alert", "Uninstall").into()),
            ("preupgrade_alert", alert("Preupgrade Alert", "Install").into()),
            ("preinstall_script", script.into()),
            ("preuninstall_script", script.into()),
            ("requires", json!(["itemname"]).into()),
            ("RestartAction", "RequireRestart".into()),
            ("supported_architectures", json!([""]).into()),
            ("unattended_install", true.into()),
            ("unattended_uninstall", true.into()),
            ("uninstall_method", "".into()),
            ("uninstall_script", "".into()),
            ("uninstaller_item_location", "".into()),
            ("uninstallable", true.into()),
            ("update_for", json!(["itemname"]).into()),
            ("version", "1.0".into()),
        ];
        let templates: Dict = entries
            .into_iter()
            .map(|(key, value)| (key.to_string(), value))
            .collect();
        Self {
            restricted_keys: None,
            templates,
            validators: vec![MembershipRule::new(&["requires", "update_for"])],
        }
    }

    /// Pkginfo editor limited to the descriptive fields.
    pub fn pkginfo_basics() -> Self {
        Self {
            restricted_keys: Some(labels(PKGINFO_LABELS)),
            ..Self::pkginfo()
        }
    }

    /// Look up a built-in preset by name.
    pub fn preset(name: &str) -> Option<Self> {
        match name {
            "manifest" => Some(Self::manifest()),
            "manifest-basics" => Some(Self::manifest_basics()),
            "pkginfo" => Some(Self::pkginfo()),
            "pkginfo-basics" => Some(Self::pkginfo_basics()),
            _ => None,
        }
    }

    pub fn preset_names() -> &'static [&'static str] {
        &["manifest", "manifest-basics", "pkginfo", "pkginfo-basics"]
    }

    /// Parse a profile from TOML text.
    pub fn from_toml(text: &str) -> Result<Self> {
        let file: ProfileFile = toml::from_str(text)?;
        let templates: Dict = file
            .templates
            .into_iter()
            .map(|(key, value)| (key, PlistValue::from(value)))
            .collect();
        debug!(
            templates = templates.len(),
            validators = file.validators.len(),
            restricted = file.restricted_keys.is_some(),
            "loaded editor profile"
        );
        Ok(Self {
            restricted_keys: file.restricted_keys,
            templates,
            validators: file.validators,
        })
    }

    /// Fill in the allowed names of every rule that watches `key`.
    pub fn allow<I, S>(&mut self, key: &str, names: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let names: Vec<String> = names.into_iter().map(Into::into).collect();
        let mut matched = false;
        for rule in self.validators.iter_mut().filter(|r| r.keys.iter().any(|k| k == key)) {
            rule.allowed.extend(names.iter().cloned());
            matched = true;
        }
        if !matched {
            self.validators.push(MembershipRule {
                keys: vec![key.to_string()],
                allowed: names,
            });
        }
    }

    /// Template keys the top-level dict does not use yet, in template order.
    pub fn suggest_keys(&self, tree: &PlistValue) -> Vec<String> {
        let in_use = tree.as_dict();
        self.templates
            .keys()
            .filter(|key| in_use.is_none_or(|dict| !dict.contains_key(key.as_str())))
            .cloned()
            .collect()
    }

    /// Editor configuration for a session using this profile.
    pub fn editor_config(&self) -> EditorConfig {
        let mut config = EditorConfig::new();
        if let Some(keys) = &self.restricted_keys {
            config = config.with_restricted_keys(keys.clone());
        }
        if !self.templates.is_empty() {
            config = config.with_templates(self.templates.clone());
        }
        if !self.validators.is_empty() {
            config = config.with_validator(MembershipValidator::new(self.validators.clone()));
        }
        config
    }
}

impl From<toml::Value> for PlistValue {
    fn from(value: toml::Value) -> Self {
        match value {
            toml::Value::String(s) => PlistValue::String(s),
            toml::Value::Integer(i) => PlistValue::Integer(i),
            toml::Value::Float(f) => PlistValue::Real(f),
            toml::Value::Boolean(b) => PlistValue::Boolean(b),
            toml::Value::Datetime(dt) => {
                let text = dt.to_string();
                match date::parse_date(&text) {
                    Some(parsed) => PlistValue::Date(parsed),
                    None => PlistValue::String(text),
                }
            }
            toml::Value::Array(items) => {
                PlistValue::Array(items.into_iter().map(PlistValue::from).collect())
            }
            toml::Value::Table(table) => PlistValue::Dict(
                table
                    .into_iter()
                    .map(|(k, v)| (k, PlistValue::from(v)))
                    .collect(),
            ),
        }
    }
}
