//! The error-code contract analyzer
//!
//! Verifies that any function carrying an "Errors:" docstring enumerating
//! error codes is telling the truth: every code the function can actually
//! return is declared, and every declared code is reachable. Declared
//! codes and the shapes of coded error types are exported as facts so
//! analyses of importing packages can reuse them.

use crate::analysis::callgraph::find_affectors_of_error_return;
use crate::analysis::codes::CodeSet;
use crate::analysis::docparse::find_error_docs;
use crate::analysis::error_types::{analyze_error_type, error_type_fact, extract_field_code};
use crate::analysis::facts::{ErrorTypeFact, FactStore, FunctionCodesFact};
use crate::analysis::registry::FuncRegistry;
use crate::analysis::scc::SccState;
use crate::diagnostics::{error_codes, Diagnostic, DiagnosticBag, Note};
use crate::sema::{PackageInfo, Type};
use crate::syntax::ast::*;
use std::collections::HashMap;

pub mod affectors;
pub mod callgraph;
pub mod codes;
pub mod docparse;
pub mod error_types;
pub mod facts;
pub mod registry;
pub mod scc;

pub use callgraph::AnalysisResult;

/// State for one analysis pass over one package
pub struct Pass<'p> {
    /// Name of the package under analysis
    pub package: String,
    /// Semantic services for the package
    pub info: &'p PackageInfo<'p>,
    /// Function and method index
    pub registry: FuncRegistry<'p>,
    /// Fact store shared across the packages of this run
    pub facts: &'p mut FactStore,
    /// Diagnostics collected so far
    pub diags: DiagnosticBag,
    /// Memoized per-function analysis results
    pub results: HashMap<NodeId, AnalysisResult<'p>>,
    /// Memoized error type analyses, by type name; `None` marks a type
    /// already found illegible
    pub error_type_cache: HashMap<String, Option<ErrorTypeFact>>,
}

impl<'p> Pass<'p> {
    pub fn new(files: &'p [File], info: &'p PackageInfo<'p>, facts: &'p mut FactStore) -> Self {
        Pass {
            package: info.package.clone(),
            info,
            registry: FuncRegistry::collect(files),
            facts,
            diags: DiagnosticBag::new(),
            results: HashMap::new(),
            error_type_cache: HashMap::new(),
        }
    }

    /// Run the whole pass and return its diagnostics, sorted by position.
    pub fn run(mut self) -> DiagnosticBag {
        find_and_tag_error_types(&mut self);

        let candidates = find_error_returning_functions(&mut self);
        let claims = find_claimed_error_codes(&mut self, &candidates);

        // Explore what can actually affect each claiming function's error
        // return. Recursion is handled through one shared SCC state.
        let mut scc = SccState::new();
        for (func, claimed) in &claims {
            let result = match self.results.get(&func.id) {
                Some(result) => result.clone(),
                None => find_affectors_of_error_return(&mut self, &mut scc, *func),
            };
            let affector_codes =
                extract_error_codes_from_affectors(&mut self, result.affectors());
            let found = result.codes.union(&affector_codes);

            report_if_codes_do_not_match(&mut self, func, &found, claimed);
        }

        // Only the documented behaviour matters on the caller side, so the
        // exported fact is the declared set, not the computed one.
        for (func, claimed) in &claims {
            let symbol = fact_symbol(func);
            self.facts.export_function_codes(
                &self.package,
                &symbol,
                FunctionCodesFact::from_set(claimed),
            );
        }

        self.diags.sort_by_position();
        self.diags
    }

    /// Whether a value of `ty` satisfies the `error` capability, consulting
    /// facts for foreign types.
    pub(crate) fn type_implements_error(&self, ty: &Type) -> bool {
        if self.info.implements_error(ty) {
            return true;
        }
        matches!(ty.deref(), Type::Foreign { package, name }
            if self.facts.error_type(package, name).is_some())
    }

    /// Whether a value of `ty` satisfies the coded-error capability,
    /// consulting facts for foreign types.
    pub(crate) fn type_is_coded_error(&self, ty: &Type) -> bool {
        if self.info.implements_coded_error(ty) {
            return true;
        }
        matches!(ty.deref(), Type::Foreign { package, name }
            if self.facts.error_type(package, name).is_some())
    }
}

/// Analyze every named type that satisfies the coded-error capability and
/// export its fact, whether or not anything in this package uses it.
fn find_and_tag_error_types(pass: &mut Pass<'_>) {
    let mut type_ids = Vec::new();
    for (id, _) in pass.info.named_types() {
        type_ids.push(id);
    }

    for id in type_ids {
        let value = Type::Named(id);
        let pointer = Type::Pointer(Box::new(Type::Named(id)));
        if !pass.info.implements_coded_error(&value)
            && !pass.info.implements_coded_error(&pointer)
        {
            continue;
        }
        let name = pass.info.named_type(id).name.clone();
        if pass.error_type_cache.contains_key(&name) {
            continue;
        }
        let fact = analyze_error_type(pass, id);
        if let Some(fact) = &fact {
            pass.facts
                .export_error_type(&pass.package, &name, fact.clone());
        }
        pass.error_type_cache.insert(name, fact);
    }
}

/// Find the functions whose last result satisfies `error`, reporting any
/// function that returns an error in a non-last position.
fn find_error_returning_functions<'p>(pass: &mut Pass<'p>) -> Vec<&'p FuncDecl> {
    let mut candidates = Vec::new();

    let funcs: Vec<&'p FuncDecl> = pass.registry.iter().collect();
    for func in funcs {
        let Some(last) = func.results.last() else {
            continue;
        };
        let last_ty = pass.info.type_expr_type(&last.ty);
        if pass.type_implements_error(&last_ty) {
            candidates.push(func);
            continue;
        }

        for result in &func.results {
            let ty = pass.info.type_expr_type(&result.ty);
            if pass.type_implements_error(&ty) {
                pass.diags.push(
                    Diagnostic::error(error_codes::shape::ERROR_NOT_LAST)
                        .message("error should be returned as the last argument")
                        .span(result.span.clone())
                        .build(),
                );
            }
        }
    }

    candidates
}

/// Parse the docstring claims of the candidate functions.
///
/// Functions without a block are not analyzed further; exported ones are
/// warned about, except `Cause()` methods of coded-error-with-cause
/// receivers.
fn find_claimed_error_codes<'p>(
    pass: &mut Pass<'p>,
    candidates: &[&'p FuncDecl],
) -> Vec<(&'p FuncDecl, CodeSet)> {
    let mut claims = Vec::new();

    for func in candidates {
        let doc = func.doc.as_deref().unwrap_or("");
        match find_error_docs(doc) {
            Err(err) => {
                pass.diags.push(
                    Diagnostic::error(error_codes::contract::ODD_DOCSTRING)
                        .message(format!(
                            "function \"{}\" has odd docstring: {}",
                            func.name, err
                        ))
                        .span(func.name_span.clone())
                        .build(),
                );
            }
            Ok(Some(codes)) => claims.push((*func, codes)),
            Ok(None) => {
                if func.name == "Cause" && receiver_has_cause_capability(pass, func) {
                    continue;
                }
                if func.is_exported() {
                    pass.diags.push(
                        Diagnostic::warning(error_codes::contract::UNDECLARED_CODES)
                            .message(format!(
                                "function \"{}\" is exported, but does not declare any error codes",
                                func.name
                            ))
                            .span(func.name_span.clone())
                            .build(),
                    );
                }
            }
        }
    }

    claims
}

/// Whether a method's receiver type satisfies coded-error-with-cause
fn receiver_has_cause_capability(pass: &Pass<'_>, func: &FuncDecl) -> bool {
    let Some(recv) = &func.recv else {
        return false;
    };
    let Some(id) = pass.info.lookup_type(&recv.type_name) else {
        return false;
    };
    let ty = if recv.is_pointer {
        Type::Pointer(Box::new(Type::Named(id)))
    } else {
        Type::Named(id)
    };
    pass.info.implements_coded_error_with_cause(&ty)
}

/// Extract the codes the given affectors can contribute.
fn extract_error_codes_from_affectors<'p>(
    pass: &mut Pass<'p>,
    affectors: &[&'p Expr],
) -> CodeSet {
    let mut result = CodeSet::new();

    for affector in affectors {
        let ty = pass.info.type_of(affector);
        if !pass.type_is_coded_error(&ty) {
            pass.diags.push(
                Diagnostic::error(error_codes::flow::NO_ERROR_CODE)
                    .message("expression does not define an error code")
                    .span(affector.span().clone())
                    .build(),
            );
            continue;
        }

        let Some(fact) = error_type_fact(pass, &ty) else {
            pass.diags.push(
                Diagnostic::error(error_codes::flow::ILLEGIBLE_ERROR_TYPE)
                    .message(
                        "expression is not a valid error: error types must return \
                         constant error codes or a single field",
                    )
                    .span(affector.span().clone())
                    .build(),
            );
            continue;
        };

        if let Some(codes) = &fact.codes {
            for code in codes {
                result.insert(code.clone());
            }
        }

        if let Some(field) = &fact.field {
            match extract_field_code(pass, affector, field) {
                Ok(code) => result.insert(code),
                Err(err) => {
                    pass.diags.push(
                        Diagnostic::error(err.diagnostic_code())
                            .message(err.to_string())
                            .span(affector.span().clone())
                            .build(),
                    );
                }
            }
        }
    }

    result
}

/// Report the symmetric difference of found and claimed codes.
fn report_if_codes_do_not_match(
    pass: &mut Pass<'_>,
    func: &FuncDecl,
    found: &CodeSet,
    claimed: &CodeSet,
) {
    let missing = found.difference(claimed);
    let unused = claimed.difference(found);

    let mut parts = Vec::new();
    if !missing.is_empty() {
        parts.push(format!("missing codes: {}", missing));
    }
    if !unused.is_empty() {
        parts.push(format!("unused codes: {}", unused));
    }

    if !parts.is_empty() {
        pass.diags.push(
            Diagnostic::error(error_codes::contract::CODE_MISMATCH)
                .message(format!(
                    "function \"{}\" has a mismatch of declared and actual error codes: {}",
                    func.name,
                    parts.join(" ")
                ))
                .span(func.name_span.clone())
                .note(Note::new(
                    "declared codes come from the 'Errors:' block of the doc comment",
                ))
                .build(),
        );
    }
}

/// The fact key symbol for a declaration: `Name` for functions,
/// `Receiver.Name` for methods.
fn fact_symbol(func: &FuncDecl) -> String {
    match &func.recv {
        Some(recv) => format!("{}.{}", recv.type_name, func.name),
        None => func.name.clone(),
    }
}

#[cfg(test)]
#[path = "tests.rs"]
mod tests;
