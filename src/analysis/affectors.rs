//! Backward taint from a returned error expression to the expressions
//! that can supply its value
//!
//! The walk follows assignments until it reaches value creation or a call
//! boundary, disregarding branching entirely: every assignment that can
//! ever touch a variable is taken as simultaneously possible. The
//! resulting "affectors" are terminal for the intra-procedural analysis;
//! the call-graph layer decides what each one contributes.

use crate::analysis::Pass;
use crate::diagnostics::{error_codes, Diagnostic};
use crate::sema::ObjKind;
use crate::syntax::ast::*;
use std::collections::HashSet;

/// Find the expressions that can affect the value of `expr` inside
/// `within`. `visited` breaks cycles through self-referential assignments
/// (e.g. `err = wrap(err)`).
pub fn find_affectors_in_func<'p>(
    pass: &mut Pass<'p>,
    expr: &'p Expr,
    within: &'p FuncDecl,
    visited: &mut HashSet<NodeId>,
) -> Vec<&'p Expr> {
    match expr {
        // A call boundary terminates the walk.
        Expr::Call { .. } => vec![expr],

        Expr::Ident(ident) => ident_affectors(pass, ident, within, visited),

        Expr::Unary { op, .. } => {
            // Taking the address of a value can produce an error, if the
            // pointer type satisfies the capability.
            if *op == UnaryOp::Ref && pass.type_implements_error(&pass.info.type_of(expr)) {
                return vec![expr];
            }
            pass.diags.push(
                Diagnostic::error(error_codes::flow::NOT_AN_ERROR)
                    .message("expression does not implement valid error type")
                    .span(expr.span().clone())
                    .build(),
            );
            Vec::new()
        }

        // Value creation.
        Expr::Composite { .. } | Expr::StringLit { .. } | Expr::IntLit { .. } => vec![expr],

        Expr::Selector { .. } | Expr::Binary { .. } | Expr::FuncLit { .. } => {
            tracing::debug!("affector walk does not handle this expression kind");
            pass.diags.push(
                Diagnostic::error(error_codes::flow::NO_ERROR_CODE)
                    .message("expression does not define an error code")
                    .span(expr.span().clone())
                    .build(),
            );
            Vec::new()
        }
    }
}

/// The identifier case of the affector walk, also used directly for bare
/// returns through named results.
pub fn ident_affectors<'p>(
    pass: &mut Pass<'p>,
    ident: &'p Ident,
    within: &'p FuncDecl,
    visited: &mut HashSet<NodeId>,
) -> Vec<&'p Expr> {
    if visited.contains(&ident.id) {
        return Vec::new();
    }
    visited.insert(ident.id);

    let Some(obj_id) = pass.info.obj_id_of(ident.id) else {
        // Unresolved names have nothing to trace.
        return Vec::new();
    };
    let obj = pass.info.object(obj_id);
    if obj.kind == ObjKind::Predeclared {
        // `nil` never carries a code.
        return Vec::new();
    }

    if !matches!(obj.kind, ObjKind::Local | ObjKind::NamedResult) {
        pass.diags.push(
            Diagnostic::error(error_codes::flow::FOREIGN_ORIGIN)
                .message("returned error may not be a parameter, receiver or global variable")
                .span(ident.span.clone())
                .build(),
        );
    }

    let mut result = Vec::new();
    for site in collect_assignment_sites(&within.body) {
        for (i, slot) in site.lhs.iter().enumerate() {
            let Some(lhs_ident) = slot else {
                // Assignments to fields are not tracked.
                continue;
            };
            if pass.info.obj_id_of(lhs_ident.id) != Some(obj_id) {
                continue;
            }

            if site.lhs.len() > site.rhs.len() {
                // Destructuring from a single multi-value call.
                if i != site.lhs.len() - 1 {
                    pass.diags.push(
                        Diagnostic::error(error_codes::flow::NON_LAST_DESTRUCTURE)
                            .message(
                                "unsupported: tracking error codes for function call \
                                 with error as non-last return argument",
                            )
                            .span(lhs_ident.span.clone())
                            .build(),
                    );
                } else if matches!(site.rhs.first(), Some(Expr::Call { .. })) {
                    result.push(&site.rhs[0]);
                } else {
                    tracing::debug!("destructuring assignment without a call on the right");
                }
            } else if let Some(rhs) = site.rhs.get(i) {
                result.extend(find_affectors_in_func(pass, rhs, within, visited));
            }
        }
    }
    result
}

/// One assignment-like site: per left-hand slot the plain identifier, if
/// the slot is one, and the right-hand expressions.
struct AssignmentSite<'p> {
    lhs: Vec<Option<&'p Ident>>,
    rhs: &'p [Expr],
}

/// Every assignment in the block, including those inside nested function
/// literals (statements in closures can assign enclosing variables) and
/// `var` declarations with initializers.
fn collect_assignment_sites<'p>(block: &'p Block) -> Vec<AssignmentSite<'p>> {
    let mut sites = Vec::new();
    collect_in_block(block, &mut sites);
    sites
}

fn collect_in_block<'p>(block: &'p Block, sites: &mut Vec<AssignmentSite<'p>>) {
    for stmt in &block.stmts {
        collect_in_stmt(stmt, sites);
    }
}

fn collect_in_stmt<'p>(stmt: &'p Stmt, sites: &mut Vec<AssignmentSite<'p>>) {
    match stmt {
        Stmt::Var(var) => {
            if !var.values.is_empty() {
                sites.push(AssignmentSite {
                    lhs: var.names.iter().map(Some).collect(),
                    rhs: &var.values,
                });
            }
            for value in &var.values {
                collect_in_expr(value, sites);
            }
        }
        Stmt::Assign { lhs, rhs, .. } => {
            sites.push(AssignmentSite {
                lhs: lhs
                    .iter()
                    .map(|e| match e {
                        Expr::Ident(ident) => Some(ident),
                        _ => None,
                    })
                    .collect(),
                rhs,
            });
            for expr in lhs.iter().chain(rhs.iter()) {
                collect_in_expr(expr, sites);
            }
        }
        Stmt::Return { results, .. } => {
            for expr in results {
                collect_in_expr(expr, sites);
            }
        }
        Stmt::If {
            cond,
            then_block,
            else_branch,
            ..
        } => {
            collect_in_expr(cond, sites);
            collect_in_block(then_block, sites);
            if let Some(else_branch) = else_branch {
                collect_in_stmt(else_branch, sites);
            }
        }
        Stmt::Expr { expr, .. } => collect_in_expr(expr, sites),
        Stmt::Block(inner) => collect_in_block(inner, sites),
    }
}

fn collect_in_expr<'p>(expr: &'p Expr, sites: &mut Vec<AssignmentSite<'p>>) {
    match expr {
        Expr::FuncLit { body, .. } => collect_in_block(body, sites),
        Expr::Call { callee, args, .. } => {
            collect_in_expr(callee, sites);
            for arg in args {
                collect_in_expr(arg, sites);
            }
        }
        Expr::Unary { expr, .. } => collect_in_expr(expr, sites),
        Expr::Binary { lhs, rhs, .. } => {
            collect_in_expr(lhs, sites);
            collect_in_expr(rhs, sites);
        }
        Expr::Selector { expr, .. } => collect_in_expr(expr, sites),
        Expr::Composite { elems, .. } => {
            for elem in elems {
                collect_in_expr(&elem.value, sites);
            }
        }
        Expr::Ident(_) | Expr::StringLit { .. } | Expr::IntLit { .. } => {}
    }
}
