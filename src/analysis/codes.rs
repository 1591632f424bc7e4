//! Error code validation and set algebra

use std::collections::btree_set;
use std::collections::BTreeSet;

/// Checks if the given error code is valid.
/// Valid error codes have to match against: `^[a-zA-Z][a-zA-Z0-9\-]*[a-zA-Z0-9]$`
/// or `^[a-zA-Z]$`.
pub fn is_valid_code(code: &str) -> bool {
    let bytes = code.as_bytes();
    if bytes.is_empty() {
        return false;
    }

    if bytes[0] == b'-' || bytes[0].is_ascii_digit() {
        return false;
    }
    if bytes[bytes.len() - 1] == b'-' {
        return false;
    }

    bytes
        .iter()
        .all(|&b| b == b'-' || b.is_ascii_alphanumeric())
}

/// An unordered set of error codes; iteration is always lexicographic
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CodeSet {
    codes: BTreeSet<String>,
}

impl CodeSet {
    /// Create an empty set
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a set holding the given codes
    pub fn from_slice(codes: &[&str]) -> Self {
        Self {
            codes: codes.iter().map(|c| c.to_string()).collect(),
        }
    }

    /// Add a code to this set
    pub fn insert(&mut self, code: impl Into<String>) {
        self.codes.insert(code.into());
    }

    /// Check if this set contains a code
    pub fn contains(&self, code: &str) -> bool {
        self.codes.contains(code)
    }

    /// Number of codes in the set
    pub fn len(&self) -> usize {
        self.codes.len()
    }

    /// Check if the set is empty
    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }

    /// Union with another set
    pub fn union(&self, other: &CodeSet) -> CodeSet {
        CodeSet {
            codes: self.codes.union(&other.codes).cloned().collect(),
        }
    }

    /// Merge another set into this one
    pub fn extend(&mut self, other: &CodeSet) {
        self.codes.extend(other.codes.iter().cloned());
    }

    /// Codes in this set that are not in `other`
    pub fn difference(&self, other: &CodeSet) -> CodeSet {
        CodeSet {
            codes: self.codes.difference(&other.codes).cloned().collect(),
        }
    }

    /// Export as a sorted list
    pub fn to_sorted_vec(&self) -> Vec<String> {
        self.codes.iter().cloned().collect()
    }

    /// Iterate in sorted order
    pub fn iter(&self) -> btree_set::Iter<'_, String> {
        self.codes.iter()
    }
}

impl FromIterator<String> for CodeSet {
    fn from_iter<I: IntoIterator<Item = String>>(iter: I) -> Self {
        Self {
            codes: iter.into_iter().collect(),
        }
    }
}

impl std::fmt::Display for CodeSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[")?;
        for (i, code) in self.codes.iter().enumerate() {
            if i > 0 {
                write!(f, " ")?;
            }
            write!(f, "{}", code)?;
        }
        write!(f, "]")
    }
}
