//! Error types for plist decoding, path addressing and editor commands.

use thiserror::Error;

/// Errors that can occur while decoding plists, addressing paths or applying
/// editor commands.
#[derive(Error, Debug)]
pub enum PlistError {
    /// The input was not well-formed XML.
    #[error("XML syntax error at byte {position}: {message}")]
    Xml { position: u64, message: String },

    /// Well-formed XML, but an element the plist grammar does not know.
    #[error("unrecognized plist element <{0}>")]
    UnknownElement(String),

    /// Well-formed XML with known elements in an impossible arrangement
    /// (missing root, value without a key, nested markup inside a scalar).
    #[error("invalid plist structure: {0}")]
    Structure(String),

    /// Writes and removals need a parent container; the root has none.
    #[error("the root path has no parent container")]
    RootPath,

    #[error("path not found: {0:?}")]
    PathNotFound(String),

    #[error("index {index} out of bounds for array of length {len} at {path:?}")]
    IndexOutOfBounds {
        path: String,
        index: usize,
        len: usize,
    },

    #[error("value at {0:?} is not a dict or array")]
    NotAContainer(String),

    /// Key insertion, deletion and renaming are disabled when the editor
    /// shows a fixed key list.
    #[error("keys are fixed in this editor")]
    KeysRestricted,

    /// A command was dispatched against a node it does not apply to.
    #[error("cannot {command} at {path:?}: {reason}")]
    InvalidCommand {
        command: &'static str,
        path: String,
        reason: String,
    },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("profile error: {0}")]
    Profile(#[from] toml::de::Error),
}

/// Convenience alias used throughout plistedit-core.
pub type Result<T> = std::result::Result<T, PlistError>;
