//! Ordered header collections and wire formatting
//!
//! Request and response headers preserve insertion order and the original
//! casing of names; lookups are ASCII-case-insensitive. The combined
//! response-header string terminates every `name: value` line with the
//! two-byte CR LF sequence, matching the native wire convention even when
//! some or all headers originate from the mock pipeline.

use core::fmt;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

/// Inter-header line separator (bytes 0x0D 0x0A, never a bare linefeed)
pub const CRLF: &str = "\r\n";

// ----------------------------------------------------------------------------
// Header Entry
// ----------------------------------------------------------------------------

/// A single name/value pair, name case preserved as first inserted
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeaderEntry {
    pub name: String,
    pub value: String,
}

// ----------------------------------------------------------------------------
// Header Map
// ----------------------------------------------------------------------------

/// Ordered, case-preserving header collection (optimized for small maps)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeaderMap {
    entries: SmallVec<[HeaderEntry; 8]>,
}

impl HeaderMap {
    /// Create an empty header map
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a map from ordered name/value pairs, merging duplicates
    pub fn from_pairs<'a, I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut map = Self::new();
        for (name, value) in pairs {
            map.append(name, value);
        }
        map
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Append a header, comma-joining the value onto an existing entry of
    /// the same name (native duplicate semantics). Insertion order and the
    /// first-seen casing of the name are preserved.
    pub fn append(&mut self, name: &str, value: &str) {
        if let Some(entry) = self
            .entries
            .iter_mut()
            .find(|e| e.name.eq_ignore_ascii_case(name))
        {
            entry.value.push_str(", ");
            entry.value.push_str(value);
        } else {
            self.entries.push(HeaderEntry {
                name: name.to_owned(),
                value: value.to_owned(),
            });
        }
    }

    /// Set a header, replacing the value of an existing entry of the same
    /// name in place (position and casing kept), or appending a new entry.
    pub fn set(&mut self, name: &str, value: &str) {
        if let Some(entry) = self
            .entries
            .iter_mut()
            .find(|e| e.name.eq_ignore_ascii_case(name))
        {
            entry.value = value.to_owned();
        } else {
            self.entries.push(HeaderEntry {
                name: name.to_owned(),
                value: value.to_owned(),
            });
        }
    }

    /// Case-insensitive lookup
    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|e| e.name.eq_ignore_ascii_case(name))
            .map(|e| e.value.as_str())
    }

    /// Whether a header of this name is present
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Iterate entries in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .iter()
            .map(|e| (e.name.as_str(), e.value.as_str()))
    }

    /// Merge synthetic entries over this map: entries from `overlay` replace
    /// same-named entries in place and new names append at the end, so
    /// native entries and mock-injected entries coexist without reordering.
    pub fn merge_synthetic(&mut self, overlay: &HeaderMap) {
        for (name, value) in overlay.iter() {
            self.set(name, value);
        }
    }

    /// Render the combined header block: `name: value` with a single space
    /// after the colon, every line terminated by CR LF.
    pub fn to_wire_string(&self) -> String {
        let mut out = String::new();
        for entry in &self.entries {
            out.push_str(&entry.name);
            out.push_str(": ");
            out.push_str(&entry.value);
            out.push_str(CRLF);
        }
        out
    }
}

impl fmt::Display for HeaderMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_wire_string())
    }
}

impl<'a> FromIterator<(&'a str, &'a str)> for HeaderMap {
    fn from_iter<I: IntoIterator<Item = (&'a str, &'a str)>>(iter: I) -> Self {
        Self::from_pairs(iter)
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------
