//! Durable facts shared across packages
//!
//! All inter-package knowledge crosses package boundaries through these
//! two fact kinds, attached to `(package, symbol)` keys. A store covers
//! one analysis run; saving and loading it as JSON lets separate runs
//! compose the way importing packages compose.

use crate::analysis::codes::CodeSet;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;

/// The error codes a function declares in its doc comment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionCodesFact {
    /// Sorted list of declared codes
    pub codes: Vec<String>,
}

impl FunctionCodesFact {
    pub fn from_set(codes: &CodeSet) -> Self {
        Self {
            codes: codes.to_sorted_vec(),
        }
    }

    pub fn code_set(&self) -> CodeSet {
        self.codes.iter().cloned().collect()
    }
}

impl fmt::Display for FunctionCodesFact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ErrorCodes: {}", self.codes.join(" "))
    }
}

/// The struct field a coded error type's `Code()` method returns
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorCodeField {
    pub name: String,
    pub position: usize,
}

impl fmt::Display for ErrorCodeField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{Name:{:?}, Position:{}}}", self.name, self.position)
    }
}

/// What a coded error type's `Code()` method can produce: constant codes,
/// a code-carrying field, or both. At least one side is populated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorTypeFact {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub codes: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<ErrorCodeField>,
}

impl fmt::Display for ErrorTypeFact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ErrorType{{Field:")?;
        match &self.field {
            Some(field) => write!(f, "{}", field)?,
            None => write!(f, "<nil>")?,
        }
        write!(f, ", Codes:")?;
        if let Some(codes) = &self.codes {
            write!(f, "{}", codes.join(" "))?;
        }
        write!(f, "}}")
    }
}

/// Fact storage keyed by package and symbol.
///
/// Function symbols are plain names for functions and `Type.Method` for
/// methods; error type facts are keyed by the type name.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct FactStore {
    #[serde(default)]
    function_codes: BTreeMap<String, FunctionCodesFact>,
    #[serde(default)]
    error_types: BTreeMap<String, ErrorTypeFact>,
}

fn key(package: &str, symbol: &str) -> String {
    format!("{}.{}", package, symbol)
}

impl FactStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach declared codes to a function symbol
    pub fn export_function_codes(&mut self, package: &str, symbol: &str, fact: FunctionCodesFact) {
        self.function_codes.insert(key(package, symbol), fact);
    }

    /// Declared codes of a function symbol, if exported
    pub fn function_codes(&self, package: &str, symbol: &str) -> Option<&FunctionCodesFact> {
        self.function_codes.get(&key(package, symbol))
    }

    /// Attach a code description to an error type. Facts are monotonic:
    /// the first export for a type wins.
    pub fn export_error_type(&mut self, package: &str, type_name: &str, fact: ErrorTypeFact) {
        self.error_types.entry(key(package, type_name)).or_insert(fact);
    }

    /// Code description of an error type, if exported
    pub fn error_type(&self, package: &str, type_name: &str) -> Option<&ErrorTypeFact> {
        self.error_types.get(&key(package, type_name))
    }

    /// All function code facts, sorted by key
    pub fn function_code_entries(&self) -> impl Iterator<Item = (&String, &FunctionCodesFact)> {
        self.function_codes.iter()
    }

    /// All error type facts, sorted by key
    pub fn error_type_entries(&self) -> impl Iterator<Item = (&String, &ErrorTypeFact)> {
        self.error_types.iter()
    }

    /// Load a store from a JSON file
    pub fn load(path: &Path) -> Result<Self, Box<dyn std::error::Error>> {
        let content = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Save the store to a JSON file
    pub fn save(&self, path: &Path) -> Result<(), Box<dyn std::error::Error>> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}
