//! Strongly connected component detection over the dynamic call graph
//!
//! The inter-procedural walk discovers call edges while it recurses, so
//! this is Tarjan's algorithm driven from the outside: the walker reports
//! edges as it finds them and closes components when a root's visit ends.
//! Functions in one component are mutually recursive and must share one
//! analysis result.

use crate::syntax::ast::NodeId;
use std::collections::HashMap;

#[derive(Debug, Clone, Copy)]
struct VisitState {
    index: usize,
    lowlink: usize,
    on_stack: bool,
    done: bool,
}

/// Mutable SCC bookkeeping for one analysis pass
#[derive(Debug, Default)]
pub struct SccState {
    states: HashMap<NodeId, VisitState>,
    stack: Vec<NodeId>,
    next_index: usize,
}

impl SccState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the function has been visited at all
    pub fn is_visited(&self, func: NodeId) -> bool {
        self.states.contains_key(&func)
    }

    /// Whether the function's component has been finalized
    pub fn is_done(&self, func: NodeId) -> bool {
        self.states.get(&func).is_some_and(|s| s.done)
    }

    /// Begin visiting a function: assign its discovery index and push it
    /// on the component stack.
    pub fn visit(&mut self, func: NodeId) {
        debug_assert!(
            !self.is_visited(func),
            "visit called twice for the same function"
        );
        let index = self.next_index;
        self.next_index += 1;
        self.states.insert(
            func,
            VisitState {
                index,
                lowlink: index,
                on_stack: true,
                done: false,
            },
        );
        self.stack.push(func);
    }

    /// Record the call edge `caller -> callee` and decide whether the
    /// walker should recurse into `callee`.
    ///
    /// Returns false for back-edges (the callee is on the stack; its
    /// contribution arrives when the component is unified) and for
    /// finalized callees (the caller consumes the cached result).
    pub fn handle_edge(&mut self, caller: NodeId, callee: NodeId) -> bool {
        let Some(&callee_state) = self.states.get(&callee) else {
            return true;
        };
        if callee_state.on_stack {
            let callee_index = callee_state.index;
            if let Some(caller_state) = self.states.get_mut(&caller) {
                caller_state.lowlink = caller_state.lowlink.min(callee_index);
            }
        }
        false
    }

    /// Propagate the callee's lowlink after a completed recursion.
    pub fn after_recurse(&mut self, caller: NodeId, callee: NodeId) {
        let Some(&callee_state) = self.states.get(&callee) else {
            return;
        };
        if callee_state.on_stack {
            if let Some(caller_state) = self.states.get_mut(&caller) {
                caller_state.lowlink = caller_state.lowlink.min(callee_state.lowlink);
            }
        }
    }

    /// Finish visiting a function. When it is a component root, pop its
    /// component off the stack, mark the members done, and return them.
    pub fn end_visit(&mut self, func: NodeId) -> Option<Vec<NodeId>> {
        let state = self.states.get(&func)?;
        if state.lowlink != state.index {
            return None;
        }

        let mut component = Vec::new();
        while let Some(member) = self.stack.pop() {
            if let Some(member_state) = self.states.get_mut(&member) {
                member_state.on_stack = false;
                member_state.done = true;
            }
            component.push(member);
            if member == func {
                break;
            }
        }
        Some(component)
    }
}
