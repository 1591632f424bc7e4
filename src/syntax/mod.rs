//! Front end for Vo source files
//!
//! This module provides:
//! - Lexer (tokenization with semicolon insertion and comment trivia)
//! - Parser (AST construction)
//! - AST definitions
//! - Span tracking

pub mod ast;
pub mod lexer;
pub mod parser;
mod span;

pub use ast::*;
pub use lexer::Lexer;
pub use parser::Parser;
pub use span::SourceFile;

use crate::diagnostics::{error_codes, Diagnostic, DiagnosticBag};
use std::path::Path;

/// Parse a source file into an AST
pub fn parse_file(path: &Path) -> Result<File, DiagnosticBag> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        let mut bag = DiagnosticBag::new();
        bag.push(
            Diagnostic::error(error_codes::syntax::INVALID_TOKEN)
                .message(format!("could not read file: {}", e))
                .span(crate::diagnostics::Span::file(path))
                .build(),
        );
        bag
    })?;

    parse_source(&content, path)
}

/// Parse source code into an AST
pub fn parse_source(source: &str, path: &Path) -> Result<File, DiagnosticBag> {
    let source_file = SourceFile::new(path.to_path_buf(), source.to_string());
    let lexer = Lexer::new(&source_file);
    let mut parser = Parser::new(lexer);
    parser.parse_file()
}
