//! # plistedit-core
//!
//! Property-list codec and headless structured-value editor.
//!
//! Plists are the XML documents a managed software repository stores its
//! manifests, package info records and catalogs in. This crate parses them
//! into an ordered value tree, writes them back out (optionally
//! pretty-printed) and drives an editing session over the tree that keeps an
//! abstract control view in step with every change.
//!
//! ## Quick start
//!
//! ```rust
//! use plistedit_core::{parse, serialize, Path, PlistValue};
//!
//! let xml = r#"<plist version="1.0"><dict><key>name</key><string>Firefox</string></dict></plist>"#;
//! let mut tree = parse(xml).unwrap();
//!
//! plistedit_core::path::write(&mut tree, &Path::parse("version"), PlistValue::from("1.0")).unwrap();
//!
//! let out = serialize(&tree, true);
//! assert!(out.contains("<key>version</key>"));
//! assert_eq!(parse(&out).unwrap(), tree);
//! ```
//!
//! ## Modules
//!
//! - [`types`]: `PlistValue` tree and `classify`
//! - [`date`]: plist date parsing and formatting
//! - [`path`]: dot-separated paths, read/write/remove/append
//! - [`decoder`]: plist XML → `PlistValue`
//! - [`encoder`]: `PlistValue` → plist XML
//! - [`editor`]: editing sessions, commands and the control view
//! - [`profile`]: restricted keys, templates and validators per record type
//! - [`response`]: save endpoint response envelope
//! - [`error`]: error types

pub mod date;
pub mod decoder;
pub mod editor;
pub mod encoder;
pub mod error;
pub mod path;
pub mod profile;
pub mod response;
pub mod types;

pub use decoder::parse;
pub use editor::{
    outline, Cell, Command, Control, Editor, EditorConfig, Hooks, Outcome, Severity, TypeChoice,
    Validator, ValueInput,
};
pub use encoder::serialize;
pub use error::{PlistError, Result};
pub use path::{Path, Segment};
pub use profile::{EditorProfile, MembershipRule, MembershipValidator};
pub use response::SaveOutcome;
pub use types::{classify, Dict, Kind, NumberKind, PlistValue};
