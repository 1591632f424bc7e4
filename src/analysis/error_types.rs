//! Analysis of coded error types
//!
//! Decides, for a type satisfying the coded-error capability, which codes
//! its `Code()` method can produce: a set of compile-time constants, a
//! single struct field, or both. Illegible types are reported and treated
//! as opaque by the rest of the pass.

use crate::analysis::codes::{is_valid_code, CodeSet};
use crate::analysis::facts::{ErrorCodeField, ErrorTypeFact};
use crate::analysis::Pass;
use crate::diagnostics::{error_codes, Diagnostic};
use crate::sema::{Type, TypeId};
use crate::syntax::ast::*;
use std::fmt;

/// Look up or compute the `ErrorTypeFact` for the error type behind `ty`.
///
/// Pointer types are unwrapped to their element type first. Types of this
/// package are analyzed once and memoized (and exported as facts); foreign
/// types are only as legible as the facts their package exported.
pub fn error_type_fact(pass: &mut Pass<'_>, ty: &Type) -> Option<ErrorTypeFact> {
    match ty.deref() {
        Type::Named(id) => {
            let id = *id;
            let name = pass.info.named_type(id).name.clone();
            if let Some(cached) = pass.error_type_cache.get(&name) {
                return cached.clone();
            }
            let fact = analyze_error_type(pass, id);
            if let Some(fact) = &fact {
                pass.facts
                    .export_error_type(&pass.package, &name, fact.clone());
            }
            pass.error_type_cache.insert(name, fact.clone());
            fact
        }
        Type::Foreign { package, name } => pass.facts.error_type(package, name).cloned(),
        _ => None,
    }
}

/// Analyze the `Code()` method of a named type.
///
/// Walks every return statement of the method body (nested function
/// literals do not contribute returns) and classifies each result as a
/// constant code or a read of a single receiver field.
pub fn analyze_error_type(pass: &mut Pass<'_>, type_id: TypeId) -> Option<ErrorTypeFact> {
    let decl = pass.info.named_type(type_id).decl;
    let code_method = pass.info.method(&Type::Named(type_id), "Code")?;

    let recv_obj = code_method
        .recv
        .as_ref()
        .and_then(|r| r.name.as_ref())
        .and_then(|name| pass.info.obj_id_of(name.id));

    let mut constants = CodeSet::new();
    let mut field_name: Option<String> = None;
    let mut conflicting_fields = false;

    for results in collect_returns(&code_method.body) {
        // The signature guarantees exactly one result expression.
        let Some(expr) = results.first() else { continue };

        if let Some(value) = pass.info.const_string_value(expr) {
            if is_valid_code(&value) {
                constants.insert(value);
            } else {
                pass.diags.push(
                    Diagnostic::error(error_codes::flow::INVALID_CODE_FORMAT)
                        .message(
                            "error code has invalid format: should match \
                             [a-zA-Z][a-zA-Z0-9\\-]*[a-zA-Z0-9]",
                        )
                        .span(expr.span().clone())
                        .build(),
                );
            }
            continue;
        }

        if let Expr::Selector {
            expr: base, name, ..
        } = expr
        {
            if let Expr::Ident(base_ident) = base.as_ref() {
                let is_receiver =
                    recv_obj.is_some() && pass.info.obj_id_of(base_ident.id) == recv_obj;
                if is_receiver {
                    let same_field = field_name.as_deref() == Some(name.as_str());
                    if field_name.is_some() && !same_field {
                        // A second, different field: the type is not legible.
                        conflicting_fields = true;
                        report_not_constant(pass, code_method, expr);
                    } else {
                        field_name = Some(name.clone());
                    }
                    continue;
                }
            }
        }

        report_not_constant(pass, code_method, expr);
    }

    if conflicting_fields {
        field_name = None;
    }

    let field = field_name.and_then(|name| match field_position(decl, &name) {
        Some(position) => Some(ErrorCodeField { name, position }),
        None => {
            pass.diags.push(
                Diagnostic::error(error_codes::flow::PROMOTED_FIELD)
                    .message(format!(
                        "returned field {} is not a valid error code field \
                         (promoted fields not supported)",
                        name
                    ))
                    .span(code_method.name_span.clone())
                    .build(),
            );
            None
        }
    });

    if constants.is_empty() && field.is_none() {
        return None;
    }

    Some(ErrorTypeFact {
        codes: if constants.is_empty() {
            None
        } else {
            Some(constants.to_sorted_vec())
        },
        field,
    })
}

fn report_not_constant(pass: &mut Pass<'_>, method: &FuncDecl, expr: &Expr) {
    pass.diags.push(
        Diagnostic::error(error_codes::flow::CODE_NOT_CONSTANT)
            .message(format!(
                "function \"{}\" should always return a string constant or a single field",
                method.name
            ))
            .span(expr.span().clone())
            .build(),
    );
}

/// Translate a field name to its position among the struct's fields.
/// Embedded fields occupy positions but can never be the code field.
fn field_position(decl: &TypeDecl, field_name: &str) -> Option<usize> {
    let TypeBody::Struct(st) = &decl.body else {
        return None;
    };
    let mut position = 0usize;
    for field in &st.fields {
        if field.is_embedded() {
            position += 1;
            continue;
        }
        for name in &field.names {
            if name.name == field_name {
                return Some(position);
            }
            position += 1;
        }
    }
    None
}

/// Result expressions of every return statement in the block, without
/// descending into nested function literals.
pub fn collect_returns<'p>(block: &'p Block) -> Vec<&'p [Expr]> {
    let mut out = Vec::new();
    collect_returns_into(block, &mut out);
    out
}

fn collect_returns_into<'p>(block: &'p Block, out: &mut Vec<&'p [Expr]>) {
    for stmt in &block.stmts {
        match stmt {
            Stmt::Return { results, .. } => out.push(results.as_slice()),
            Stmt::If {
                then_block,
                else_branch,
                ..
            } => {
                collect_returns_into(then_block, out);
                if let Some(else_branch) = else_branch {
                    collect_returns_stmt(else_branch, out);
                }
            }
            Stmt::Block(inner) => collect_returns_into(inner, out),
            Stmt::Var(_) | Stmt::Assign { .. } | Stmt::Expr { .. } => {}
        }
    }
}

fn collect_returns_stmt<'p>(stmt: &'p Stmt, out: &mut Vec<&'p [Expr]>) {
    match stmt {
        Stmt::Block(block) => collect_returns_into(block, out),
        Stmt::If {
            then_block,
            else_branch,
            ..
        } => {
            collect_returns_into(then_block, out);
            if let Some(else_branch) = else_branch {
                collect_returns_stmt(else_branch, out);
            }
        }
        _ => {}
    }
}

/// Extract the code a constructor expression assigns to the type's code
/// field, unwrapping a single address-of.
pub fn extract_field_code(
    pass: &Pass<'_>,
    expr: &Expr,
    field: &ErrorCodeField,
) -> Result<String, FieldCodeError> {
    match expr {
        Expr::Composite { elems, .. } => {
            // Key-based literal: find the field by name. Either all
            // elements are keyed or none are.
            for elem in elems {
                let Some(key) = &elem.key else { break };
                if key.name == field.name {
                    if let Some(value) = pass.info.const_string_value(&elem.value) {
                        return code_from_constant(&value);
                    }
                }
            }

            // Position-based literal.
            if let Some(elem) = elems.get(field.position) {
                if elem.key.is_none() {
                    if let Some(value) = pass.info.const_string_value(&elem.value) {
                        return code_from_constant(&value);
                    }
                }
            }

            Err(FieldCodeError::NotConstant)
        }
        Expr::Unary {
            op: UnaryOp::Ref,
            expr,
            ..
        } => extract_field_code(pass, expr, field),
        _ => {
            tracing::debug!("field code extraction does not handle this expression kind");
            Err(FieldCodeError::NotConstant)
        }
    }
}

fn code_from_constant(value: &str) -> Result<String, FieldCodeError> {
    if is_valid_code(value) {
        Ok(value.to_string())
    } else {
        Err(FieldCodeError::InvalidFormat)
    }
}

/// Why a constructor's code field could not be read
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldCodeError {
    NotConstant,
    InvalidFormat,
}

impl FieldCodeError {
    /// The stable diagnostic code to report this failure under
    pub fn diagnostic_code(&self) -> &'static str {
        match self {
            FieldCodeError::NotConstant => error_codes::flow::FIELD_NOT_CONSTANT,
            FieldCodeError::InvalidFormat => error_codes::flow::INVALID_CODE_FORMAT,
        }
    }
}

impl fmt::Display for FieldCodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldCodeError::NotConstant => {
                write!(f, "error code field has to be instantiated by constant value")
            }
            FieldCodeError::InvalidFormat => write!(
                f,
                "error code has invalid format: should match [a-zA-Z][a-zA-Z0-9\\-]*[a-zA-Z0-9]"
            ),
        }
    }
}

impl std::error::Error for FieldCodeError {}
