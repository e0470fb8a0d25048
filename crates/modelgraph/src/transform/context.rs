//! Per-node policy for transformation passes.

use std::fmt;
use std::sync::Arc;

use crate::node::Node;

/// Action to take on a node during a refinement pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeAction {
    /// Defer the decision to later policy functions or the default.
    Abstain,
    /// Ask the node to decompose itself into more primitive operations.
    Refine,
    /// The node is final: clone it unchanged.
    Compile,
}

/// Policy callback consulted per node during a pass.
pub type NodeActionFn = Arc<dyn Fn(&Node) -> NodeAction + Send + Sync>;

/// Downstream code generator predicate reachable through the context. Only
/// used to compute the default action for nodes no policy claims.
pub trait CompileTarget: Send + Sync {
    /// Whether the target can translate the node directly, ending refinement
    /// for it.
    fn is_node_compilable(&self, node: &Node) -> bool;
}

/// Carries the policy chain and the optional downstream compiler for one
/// transformation (or a sequence of related calls). Never persisted inside
/// a model.
#[derive(Clone, Default)]
pub struct TransformContext {
    actions: Vec<NodeActionFn>,
    compiler: Option<Arc<dyn CompileTarget>>,
}

impl TransformContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Context with a single policy function.
    pub fn with_action<F>(action: F) -> Self
    where
        F: Fn(&Node) -> NodeAction + Send + Sync + 'static,
    {
        let mut context = Self::new();
        context.add_node_action(action);
        context
    }

    /// Context whose default action consults the given compile target.
    pub fn for_compiler(compiler: Arc<dyn CompileTarget>) -> Self {
        Self {
            actions: Vec::new(),
            compiler: Some(compiler),
        }
    }

    /// Appends a policy function. Earlier registrations take precedence;
    /// appending never replaces previously registered functions.
    pub fn add_node_action<F>(&mut self, action: F)
    where
        F: Fn(&Node) -> NodeAction + Send + Sync + 'static,
    {
        self.actions.push(Arc::new(action));
    }

    pub fn set_compiler(&mut self, compiler: Arc<dyn CompileTarget>) {
        self.compiler = Some(compiler);
    }

    pub fn compiler(&self) -> Option<&Arc<dyn CompileTarget>> {
        self.compiler.as_ref()
    }

    /// Whether the downstream compiler (if any) can translate the node.
    pub fn is_node_compilable(&self, node: &Node) -> bool {
        self.compiler
            .as_ref()
            .map(|compiler| compiler.is_node_compilable(node))
            .unwrap_or(false)
    }

    /// Resolves the action for a node: the first registered policy function
    /// returning something other than `Abstain` wins; if all abstain (or
    /// none are registered), `Compile` when a compile target reports the
    /// node compilable, otherwise `Refine`.
    pub fn node_action(&self, node: &Node) -> NodeAction {
        for action in &self.actions {
            match action(node) {
                NodeAction::Abstain => continue,
                decided => return decided,
            }
        }
        if self.is_node_compilable(node) {
            NodeAction::Compile
        } else {
            NodeAction::Refine
        }
    }
}

impl fmt::Debug for TransformContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransformContext")
            .field("actions", &self.actions.len())
            .field("has_compiler", &self.compiler.is_some())
            .finish()
    }
}
