//! Inter-procedural walk over the dynamic call graph
//!
//! Resolves each affector that is a call into either an already-known
//! code set (facts from other packages), a recursion into a function of
//! this package, or an opaque boundary that gets reported. Mutual
//! recursion converges through the SCC state: members of a component end
//! up sharing one unified result.

use crate::analysis::affectors::{find_affectors_in_func, ident_affectors};
use crate::analysis::codes::CodeSet;
use crate::analysis::error_types::collect_returns;
use crate::analysis::scc::SccState;
use crate::analysis::Pass;
use crate::diagnostics::{error_codes, Diagnostic};
use crate::sema::{ObjKind, Type};
use crate::syntax::ast::*;
use std::collections::HashSet;

/// Per-function intermediate result: the affectors that still need code
/// extraction, and the codes already collected from callees.
#[derive(Debug, Clone, Default)]
pub struct AnalysisResult<'p> {
    affectors: Vec<&'p Expr>,
    affector_ids: HashSet<NodeId>,
    pub codes: CodeSet,
}

impl<'p> AnalysisResult<'p> {
    /// Affectors in discovery order, deduplicated
    pub fn affectors(&self) -> &[&'p Expr] {
        &self.affectors
    }

    pub fn add_affector(&mut self, expr: &'p Expr) {
        if self.affector_ids.insert(expr.id()) {
            self.affectors.push(expr);
        }
    }

    /// Union another result into this one
    pub fn combine(&mut self, other: &AnalysisResult<'p>) {
        for affector in &other.affectors {
            self.add_affector(affector);
        }
        self.codes.extend(&other.codes);
    }
}

/// Analyze every return path of `func`, recursing through its call edges
/// under the SCC protocol.
pub fn find_affectors_of_error_return<'p>(
    pass: &mut Pass<'p>,
    scc: &mut SccState,
    func: &'p FuncDecl,
) -> AnalysisResult<'p> {
    scc.visit(func.id);
    let mut result = AnalysisResult::default();

    for results in collect_returns(&func.body) {
        match results.last() {
            Some(expr) => {
                let step = find_affectors(pass, scc, expr, func);
                result.combine(&step);
            }
            None => {
                // A bare return delivers the named results.
                let Some(ident) = last_named_result(func) else {
                    continue;
                };
                let mut visited = HashSet::new();
                let step = ident_affectors(pass, ident, func, &mut visited);
                let step = classify_affectors(pass, scc, func, step);
                result.combine(&step);
            }
        }
    }

    pass.results.insert(func.id, result.clone());

    if let Some(component) = scc.end_visit(func.id) {
        return unify_component_results(pass, &component);
    }
    result
}

/// The identifier of the last named result, for resolving bare returns
fn last_named_result<'p>(func: &'p FuncDecl) -> Option<&'p Ident> {
    func.results.last().and_then(|r| r.names.last())
}

/// Run the intra-procedural walk on one return expression and classify
/// everything it surfaces.
pub fn find_affectors<'p>(
    pass: &mut Pass<'p>,
    scc: &mut SccState,
    expr: &'p Expr,
    within: &'p FuncDecl,
) -> AnalysisResult<'p> {
    let mut visited = HashSet::new();
    let step = find_affectors_in_func(pass, expr, within, &mut visited);
    classify_affectors(pass, scc, within, step)
}

/// Resolve call affectors into code sets or recursions; keep everything
/// else for code extraction.
fn classify_affectors<'p>(
    pass: &mut Pass<'p>,
    scc: &mut SccState,
    caller: &'p FuncDecl,
    step: Vec<&'p Expr>,
) -> AnalysisResult<'p> {
    let mut result = AnalysisResult::default();

    for expr in step {
        let Expr::Call { callee, .. } = expr else {
            result.add_affector(expr);
            continue;
        };

        match callee.as_ref() {
            Expr::Ident(ident) => {
                let obj = pass.info.obj_id_of(ident.id).map(|id| pass.info.object(id));
                match obj {
                    Some(obj) if obj.kind == ObjKind::Func => {
                        if let Some(decl) = obj.func.and_then(|id| pass.info.func_decl(id)) {
                            recurse_or_use_cached(pass, scc, caller, decl, &mut result);
                        }
                    }
                    Some(obj) if obj.kind == ObjKind::TypeName => {
                        // A conversion: the expression's codes come from
                        // the target type, not from a callee.
                        result.add_affector(expr);
                    }
                    _ => {
                        pass.diags.push(
                            Diagnostic::error(error_codes::flow::UNDECLARED_CALLEE)
                                .message("called function does not declare error codes")
                                .span(callee.span().clone())
                                .build(),
                        );
                    }
                }
            }
            Expr::Selector {
                expr: base, name, ..
            } => {
                classify_selector_call(pass, scc, caller, callee, base, name, &mut result);
            }
            _ => {
                tracing::debug!("call whose callee is neither a name nor a selection");
                pass.diags.push(
                    Diagnostic::error(error_codes::flow::UNDECLARED_CALLEE)
                        .message("called function does not declare error codes")
                        .span(callee.span().clone())
                        .build(),
                );
            }
        }
    }
    result
}

fn classify_selector_call<'p>(
    pass: &mut Pass<'p>,
    scc: &mut SccState,
    caller: &'p FuncDecl,
    callee: &'p Expr,
    base: &'p Expr,
    name: &str,
    result: &mut AnalysisResult<'p>,
) {
    // Package-qualified call: only exported facts can describe it.
    if let Expr::Ident(base_ident) = base {
        let package = pass
            .info
            .obj_id_of(base_ident.id)
            .map(|id| pass.info.object(id))
            .filter(|obj| obj.kind == ObjKind::Package)
            .and_then(|obj| obj.package_name.clone());
        if let Some(package) = package {
            match pass.facts.function_codes(&package, name) {
                Some(fact) => result.codes.extend(&fact.code_set()),
                None => {
                    pass.diags.push(
                        Diagnostic::error(error_codes::flow::UNDECLARED_FOREIGN)
                            .message(format!(
                                "function \"{}\" in package \"{}\" does not declare error codes",
                                name, package
                            ))
                            .span(callee.span().clone())
                            .build(),
                    );
                }
            }
            return;
        }
    }

    // Method call: resolve the declaration through the receiver type.
    let recv_ty = pass.info.type_of(base);

    if let Type::Foreign { package, name: type_name } = recv_ty.deref() {
        let symbol = format!("{}.{}", type_name, name);
        if let Some(fact) = pass.facts.function_codes(package, &symbol) {
            result.codes.extend(&fact.code_set());
            return;
        }
    }

    match pass.registry.search_method(pass.info, &recv_ty, name) {
        Some(decl) => recurse_or_use_cached(pass, scc, caller, decl, result),
        None => {
            pass.diags.push(
                Diagnostic::error(error_codes::flow::UNDECLARED_CALLEE)
                    .message("called function does not declare error codes")
                    .span(callee.span().clone())
                    .build(),
            );
        }
    }
}

/// Follow one call edge under the SCC protocol: recurse into unvisited
/// callees, consume cached results for finished ones, and contribute
/// nothing for back-edges (unification happens when the component
/// closes).
fn recurse_or_use_cached<'p>(
    pass: &mut Pass<'p>,
    scc: &mut SccState,
    caller: &'p FuncDecl,
    callee: &'p FuncDecl,
    result: &mut AnalysisResult<'p>,
) {
    if scc.handle_edge(caller.id, callee.id) {
        let callee_result = find_affectors_of_error_return(pass, scc, callee);
        scc.after_recurse(caller.id, callee.id);
        result.combine(&callee_result);
    } else if let Some(cached) = pass.results.get(&callee.id) {
        let cached = cached.clone();
        result.combine(&cached);
    }
}

/// Give every function of a closed component the union of the members'
/// results.
fn unify_component_results<'p>(pass: &mut Pass<'p>, component: &[NodeId]) -> AnalysisResult<'p> {
    let mut unified = AnalysisResult::default();
    for member in component {
        if let Some(result) = pass.results.get(member) {
            let result = result.clone();
            unified.combine(&result);
        }
    }
    for member in component {
        pass.results.insert(*member, unified.clone());
    }
    unified
}
