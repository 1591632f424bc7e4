//! vouch — error-code contract verification for Vo packages
//!
//! Functions that return an error may enumerate, in an "Errors:" block of
//! their doc comment, the error codes they can produce. vouch checks the
//! claims against a data-flow analysis of each function and shares the
//! declared contracts across packages as durable facts.

pub mod analysis;
pub mod cli;
pub mod diagnostics;
pub mod sema;
pub mod syntax;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::analysis::facts::{ErrorTypeFact, FactStore, FunctionCodesFact};
    pub use crate::analysis::Pass;
    pub use crate::diagnostics::{Diagnostic, DiagnosticBag, Severity, Span};
    pub use crate::sema::PackageInfo;
    pub use crate::syntax::ast::*;
}
