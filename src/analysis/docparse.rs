//! Parser for the "Errors:" block of a function doc comment
//!
//! Recognized shapes:
//!
//! ```text
//! Errors: none
//!
//! Errors:
//!
//!    - some-error  -- when it happens
//!    - other-error -- when something else happens
//! ```
//!
//! The block form requires a blank line after the indicator. Inside the
//! block, lines leading with `- ` declare codes and other non-blank lines
//! are prose; the block closes at the first blank line after a code line.
//! A second `Errors:` indicator anywhere in the doc is an error.

use crate::analysis::codes::{is_valid_code, CodeSet};
use std::fmt;

/// Ways a doc comment's error declaration can be malformed
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocParseError {
    NeedBlankLine,
    RepeatedIndicator,
    MissingSeparator,
    WhitespaceCode,
    InvalidCodeFormat,
    IndicatorTrailingText,
    ParamNotSupported,
}

impl fmt::Display for DocParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DocParseError::NeedBlankLine => {
                write!(f, "need a blank line after the 'Errors:' block indicator")
            }
            DocParseError::RepeatedIndicator => {
                write!(f, "repeated 'Errors:' block indicator")
            }
            DocParseError::MissingSeparator => write!(
                f,
                "mid block, a line leading with '- ' didn't contain a '--' to mark the end of the code name"
            ),
            DocParseError::WhitespaceCode => {
                write!(f, "an error code can't be purely whitespace")
            }
            DocParseError::InvalidCodeFormat => write!(
                f,
                "declared error code has invalid format: should match [a-zA-Z][a-zA-Z0-9\\-]*[a-zA-Z0-9]"
            ),
            DocParseError::IndicatorTrailingText => {
                write!(f, "unexpected text after the 'Errors:' block indicator")
            }
            DocParseError::ParamNotSupported => {
                write!(f, "declaring error codes for a parameter is not supported")
            }
        }
    }
}

impl std::error::Error for DocParseError {}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    /// Before any indicator
    Outside,
    /// Indicator seen, blank line required next
    NeedBlank,
    /// Collecting code lines
    Codes,
    /// Block closed; only repeated indicators matter now
    After,
}

/// Parse the error declaration out of a doc comment.
///
/// Returns `Ok(None)` when the doc has no "Errors:" block (distinct from
/// an explicit `Errors: none`, which yields an empty set).
pub fn find_error_docs(doc: &str) -> Result<Option<CodeSet>, DocParseError> {
    let mut state = State::Outside;
    let mut codes = CodeSet::new();
    let mut declared = false;

    for line in doc.lines() {
        let trimmed = line.trim();

        if let Some(rest) = trimmed.strip_prefix("Errors:") {
            if state != State::Outside {
                return Err(DocParseError::RepeatedIndicator);
            }
            declared = true;
            let rest = rest.trim();
            if rest.is_empty() {
                state = State::NeedBlank;
            } else if let Some(tail) = rest.strip_prefix("none") {
                let tail = tail.trim_start();
                if !tail.is_empty() && !tail.starts_with("--") {
                    return Err(DocParseError::IndicatorTrailingText);
                }
                state = State::After;
            } else {
                return Err(DocParseError::IndicatorTrailingText);
            }
            continue;
        }

        match state {
            State::Outside | State::After => {}
            State::NeedBlank => {
                if !trimmed.is_empty() {
                    return Err(DocParseError::NeedBlankLine);
                }
                state = State::Codes;
            }
            State::Codes => {
                if trimmed.is_empty() {
                    state = State::After;
                } else if let Some(rest) = trimmed.strip_prefix("- ") {
                    let code = match rest.find("--") {
                        Some(pos) => rest[..pos].trim(),
                        None => return Err(DocParseError::MissingSeparator),
                    };
                    if code.is_empty() {
                        return Err(DocParseError::WhitespaceCode);
                    }
                    if code.starts_with("param:") {
                        return Err(DocParseError::ParamNotSupported);
                    }
                    if !is_valid_code(code) {
                        return Err(DocParseError::InvalidCodeFormat);
                    }
                    codes.insert(code);
                }
                // Other non-blank lines are prose between code lines.
            }
        }
    }

    if state == State::NeedBlank {
        return Err(DocParseError::NeedBlankLine);
    }

    if declared {
        Ok(Some(codes))
    } else {
        Ok(None)
    }
}

#[cfg(test)]
#[path = "docparse_tests.rs"]
mod tests;
