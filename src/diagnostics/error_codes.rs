//! Error code definitions for analyzer diagnostics

/// Syntax/parsing errors (V0xxx)
pub mod syntax {
    pub const UNEXPECTED_TOKEN: &str = "V0001";
    pub const INVALID_TOKEN: &str = "V0002";
    pub const UNEXPECTED_EOF: &str = "V0003";
}

/// Docstring contract errors (V1xxx)
pub mod contract {
    /// "function X has odd docstring: ..."
    pub const ODD_DOCSTRING: &str = "V1001";
    /// "function X is exported, but does not declare any error codes"
    pub const UNDECLARED_CODES: &str = "V1002";
    /// "function X has a mismatch of declared and actual error codes: ..."
    pub const CODE_MISMATCH: &str = "V1003";
}

/// Signature shape errors (V2xxx)
pub mod shape {
    /// "error should be returned as the last argument"
    pub const ERROR_NOT_LAST: &str = "V2001";
}

/// Data-flow analysis errors (V3xxx)
pub mod flow {
    /// "expression does not define an error code"
    pub const NO_ERROR_CODE: &str = "V3001";
    /// "expression is not a valid error: error types must return constant
    /// error codes or a single field"
    pub const ILLEGIBLE_ERROR_TYPE: &str = "V3002";
    /// "returned error may not be a parameter, receiver or global variable"
    pub const FOREIGN_ORIGIN: &str = "V3003";
    /// "unsupported: tracking error codes for function call with error as
    /// non-last return argument"
    pub const NON_LAST_DESTRUCTURE: &str = "V3004";
    /// "called function does not declare error codes"
    pub const UNDECLARED_CALLEE: &str = "V3005";
    /// "function X in package P does not declare error codes"
    pub const UNDECLARED_FOREIGN: &str = "V3006";
    /// "function X should always return a string constant or a single field"
    pub const CODE_NOT_CONSTANT: &str = "V3007";
    /// "error code has invalid format: ..."
    pub const INVALID_CODE_FORMAT: &str = "V3008";
    /// "error code field has to be instantiated by constant value"
    pub const FIELD_NOT_CONSTANT: &str = "V3009";
    /// "returned field F is not a valid error code field (promoted fields
    /// not supported)"
    pub const PROMOTED_FIELD: &str = "V3010";
    /// "expression does not implement valid error type"
    pub const NOT_AN_ERROR: &str = "V3011";
}
