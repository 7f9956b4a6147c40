//! Dot-separated paths into a value tree.
//!
//! `installs.0.path` addresses the `path` key of the first element of the
//! `installs` array. Segments made only of ASCII digits parse as indices; an
//! index applied to a dictionary looks up the key with the same decimal text,
//! so dictionaries with numeric-looking keys stay addressable.
//!
//! The empty path is the root. Reads never fail (they return `None` or a
//! caller default); writes and removals need a parent container and report
//! misuse through [`PlistError`].

use std::borrow::Cow;
use std::fmt;
use std::str::FromStr;

use serde::{Serialize, Serializer};

use crate::error::{PlistError, Result};
use crate::types::PlistValue;

/// One step of a [`Path`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Segment {
    Key(String),
    Index(usize),
}

impl Segment {
    /// Canonical decimal text (`0`, `17`, not `007`) becomes an index,
    /// anything else a key, so `as_key` always gives the text back.
    pub fn parse(text: &str) -> Self {
        let canonical = text == "0" || !text.starts_with('0');
        if canonical && !text.is_empty() && text.bytes().all(|b| b.is_ascii_digit()) {
            if let Ok(i) = text.parse() {
                return Segment::Index(i);
            }
        }
        Segment::Key(text.to_string())
    }

    /// The segment as a dictionary key.
    pub fn as_key(&self) -> Cow<'_, str> {
        match self {
            Segment::Key(k) => Cow::Borrowed(k),
            Segment::Index(i) => Cow::Owned(i.to_string()),
        }
    }
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Segment::Key(k) => f.write_str(k),
            Segment::Index(i) => write!(f, "{i}"),
        }
    }
}

impl From<&str> for Segment {
    fn from(key: &str) -> Self {
        Segment::parse(key)
    }
}

impl From<String> for Segment {
    fn from(key: String) -> Self {
        Segment::parse(&key)
    }
}

impl From<usize> for Segment {
    fn from(index: usize) -> Self {
        Segment::Index(index)
    }
}

/// An immutable location inside a value tree.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Path(Vec<Segment>);

impl Path {
    pub fn root() -> Self {
        Path(Vec::new())
    }

    pub fn new(segments: Vec<Segment>) -> Self {
        Path(segments)
    }

    /// Parse the dot-separated textual form. The empty string is the root.
    pub fn parse(text: &str) -> Self {
        if text.is_empty() {
            return Path::root();
        }
        Path(text.split('.').map(Segment::parse).collect())
    }

    pub fn segments(&self) -> &[Segment] {
        &self.0
    }

    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn last(&self) -> Option<&Segment> {
        self.0.last()
    }

    /// The path minus its last segment; `None` for the root.
    pub fn parent(&self) -> Option<Path> {
        if self.0.is_empty() {
            None
        } else {
            Some(Path(self.0[..self.0.len() - 1].to_vec()))
        }
    }

    pub fn child(&self, segment: impl Into<Segment>) -> Path {
        let mut segments = self.0.clone();
        segments.push(segment.into());
        Path(segments)
    }

    /// Child path for a dictionary key. Numeric-looking keys normalize to
    /// index segments so the result equals the parsed textual form.
    pub fn key(&self, key: &str) -> Path {
        self.child(Segment::parse(key))
    }

    pub fn index(&self, index: usize) -> Path {
        self.child(Segment::Index(index))
    }

    /// Replace the last segment. The root is returned unchanged.
    pub fn with_last(&self, segment: impl Into<Segment>) -> Path {
        match self.parent() {
            Some(parent) => parent.child(segment),
            None => self.clone(),
        }
    }

    pub fn starts_with(&self, prefix: &Path) -> bool {
        self.0.starts_with(&prefix.0)
    }

    /// Move this path from under `old_prefix` to under `new_prefix`.
    /// Paths outside `old_prefix` are returned unchanged.
    pub fn rebase(&self, old_prefix: &Path, new_prefix: &Path) -> Path {
        if !self.starts_with(old_prefix) {
            return self.clone();
        }
        let mut segments = new_prefix.0.clone();
        segments.extend_from_slice(&self.0[old_prefix.len()..]);
        Path(segments)
    }

    /// Where this path points after element `index` of the array at `array`
    /// was removed. Paths through later siblings shift down by one, paths
    /// inside the removed element no longer exist.
    pub fn after_array_removal(&self, array: &Path, index: usize) -> Option<Path> {
        if !self.starts_with(array) || self.len() == array.len() {
            return Some(self.clone());
        }
        match &self.0[array.len()] {
            Segment::Index(k) if *k == index => None,
            Segment::Index(k) if *k > index => {
                let mut segments = self.0.clone();
                segments[array.len()] = Segment::Index(k - 1);
                Some(Path(segments))
            }
            _ => Some(self.clone()),
        }
    }

    /// Bracket-quoted accessor, e.g. `['installs']['0']['path']`.
    pub fn accessor_expression(&self) -> String {
        let mut out = String::new();
        for segment in &self.0 {
            out.push_str("['");
            out.push_str(&segment.as_key());
            out.push_str("']");
        }
        out
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, segment) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(".")?;
            }
            write!(f, "{segment}")?;
        }
        Ok(())
    }
}

impl FromStr for Path {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(Path::parse(s))
    }
}

impl Serialize for Path {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

fn child<'v>(node: &'v PlistValue, segment: &Segment) -> Option<&'v PlistValue> {
    match (node, segment) {
        (PlistValue::Dict(dict), seg) => dict.get(seg.as_key().as_ref()),
        (PlistValue::Array(items), Segment::Index(i)) => items.get(*i),
        _ => None,
    }
}

fn child_mut<'v>(node: &'v mut PlistValue, segment: &Segment) -> Option<&'v mut PlistValue> {
    match (node, segment) {
        (PlistValue::Dict(dict), seg) => dict.get_mut(seg.as_key().as_ref()),
        (PlistValue::Array(items), Segment::Index(i)) => items.get_mut(*i),
        _ => None,
    }
}

/// The value at `path`, or `None` if any step is missing.
pub fn read<'v>(tree: &'v PlistValue, path: &Path) -> Option<&'v PlistValue> {
    path.segments()
        .iter()
        .try_fold(tree, |node, segment| child(node, segment))
}

pub fn read_mut<'v>(tree: &'v mut PlistValue, path: &Path) -> Option<&'v mut PlistValue> {
    let mut node = tree;
    for segment in path.segments() {
        node = child_mut(node, segment)?;
    }
    Some(node)
}

/// A copy of the value at `path`, or `default` when it is missing.
pub fn read_or(tree: &PlistValue, path: &Path, default: PlistValue) -> PlistValue {
    read(tree, path).cloned().unwrap_or(default)
}

fn split_last(path: &Path) -> Result<(Path, &Segment)> {
    match (path.parent(), path.last()) {
        (Some(parent), Some(last)) => Ok((parent, last)),
        _ => Err(PlistError::RootPath),
    }
}

fn parent_mut<'v>(tree: &'v mut PlistValue, parent: &Path) -> Result<&'v mut PlistValue> {
    read_mut(tree, parent).ok_or_else(|| PlistError::PathNotFound(parent.to_string()))
}

/// Set the value at `path`. A dictionary parent gains the key if missing; an
/// array parent must already have the index (use [`append`] to grow it).
pub fn write(tree: &mut PlistValue, path: &Path, value: PlistValue) -> Result<()> {
    let (parent_path, last) = split_last(path)?;
    match parent_mut(tree, &parent_path)? {
        PlistValue::Dict(dict) => {
            dict.insert(last.as_key().into_owned(), value);
            Ok(())
        }
        PlistValue::Array(items) => match last {
            Segment::Index(i) if *i < items.len() => {
                items[*i] = value;
                Ok(())
            }
            Segment::Index(i) => Err(PlistError::IndexOutOfBounds {
                path: parent_path.to_string(),
                index: *i,
                len: items.len(),
            }),
            Segment::Key(_) => Err(PlistError::PathNotFound(path.to_string())),
        },
        _ => Err(PlistError::NotAContainer(parent_path.to_string())),
    }
}

/// Delete the value at `path` and return it. Array elements after it shift
/// down by one; dictionary key order is otherwise preserved.
pub fn remove(tree: &mut PlistValue, path: &Path) -> Result<PlistValue> {
    let (parent_path, last) = split_last(path)?;
    match parent_mut(tree, &parent_path)? {
        PlistValue::Dict(dict) => dict
            .shift_remove(last.as_key().as_ref())
            .ok_or_else(|| PlistError::PathNotFound(path.to_string())),
        PlistValue::Array(items) => match last {
            Segment::Index(i) if *i < items.len() => Ok(items.remove(*i)),
            Segment::Index(i) => Err(PlistError::IndexOutOfBounds {
                path: parent_path.to_string(),
                index: *i,
                len: items.len(),
            }),
            Segment::Key(_) => Err(PlistError::PathNotFound(path.to_string())),
        },
        _ => Err(PlistError::NotAContainer(parent_path.to_string())),
    }
}

/// Push `value` onto the array at `array_path`, returning its index.
pub fn append(tree: &mut PlistValue, array_path: &Path, value: PlistValue) -> Result<usize> {
    match read_mut(tree, array_path) {
        Some(PlistValue::Array(items)) => {
            items.push(value);
            Ok(items.len() - 1)
        }
        Some(_) => Err(PlistError::NotAContainer(array_path.to_string())),
        None => Err(PlistError::PathNotFound(array_path.to_string())),
    }
}
