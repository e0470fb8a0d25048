//! The engine that builds a new model from an old one.
//!
//! Every entry point walks the source model in dependency order, rebuilds
//! each node in a fresh model through the node's copy/refine behavior, and
//! records how old output ports map onto new ones so later nodes (and
//! external callers) can rewire their references. Pass maps compose across
//! refinement generations, so a port from the original model stays
//! resolvable against the fully refined result.

use anyhow::{anyhow, Result};

use crate::model::Model;
use crate::node::{InputPort, Node};
use crate::port::{NodeId, OutputPortRef, PortElements};

use super::context::{NodeAction, TransformContext};
use super::map::PortOutputsMap;
use super::rewriter::NodeRewriter;

/// Transforms models: copying, sub-model extraction, fixed-point refinement,
/// and caller-defined rewriting.
///
/// Holds only transient, call-scoped state (the port map and the active
/// context). A single transformer must not run two top-level transformations
/// concurrently; every entry point resets the transient state first.
#[derive(Debug, Default)]
pub struct ModelTransformer {
    map: PortOutputsMap,
    context: TransformContext,
}

impl ModelTransformer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Clears all transient state. Implied at the start of every entry
    /// point; does not affect already-returned models.
    pub fn reset(&mut self) {
        self.map.clear();
        self.context = TransformContext::default();
    }

    /// `true` while no transformation has recorded any port mapping.
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    pub fn context(&self) -> &TransformContext {
        &self.context
    }

    pub fn context_mut(&mut self) -> &mut TransformContext {
        &mut self.context
    }

    /// Copies every node of `model` in dependency order. The result is
    /// isomorphic to the input: same operation kinds, rewired references.
    pub fn copy_model(&mut self, model: &Model, context: &TransformContext) -> Result<Model> {
        self.begin(context);
        let context = self.context.clone();
        let (copied, _) = run_pass(model, None, &mut self.map, &context, |node, rewriter| {
            node.op().copy(node, rewriter)
        })?;
        Ok(copied)
    }

    /// Copies the subset of `model` required to compute the outputs of the
    /// given nodes; everything else is dropped from the result.
    pub fn copy_submodel(
        &mut self,
        model: &Model,
        outputs: &[NodeId],
        context: &TransformContext,
    ) -> Result<Model> {
        self.begin(context);
        let subset = model.dependencies_of(outputs)?;
        let context = self.context.clone();
        let (copied, _) = run_pass(
            model,
            Some(&subset),
            &mut self.map,
            &context,
            |node, rewriter| node.op().copy(node, rewriter),
        )?;
        Ok(copied)
    }

    /// Fixed-point refinement. Each iteration produces a new model from the
    /// previous one: per node, the context decides `Compile` (clone
    /// unchanged) or `Refine` (let the node decompose itself). The loop
    /// stops when a pass changes nothing or after `max_iterations` passes;
    /// exhausting the cap is a normal outcome and the caller receives the
    /// best-effort result.
    ///
    /// A pass counts as changed when some visited node produced anything
    /// other than exactly one replacement node of its own kind.
    ///
    /// With `max_iterations == 0` no refinement is attempted and the result
    /// equals [`ModelTransformer::copy_model`].
    pub fn refine_model(
        &mut self,
        model: &Model,
        context: &TransformContext,
        max_iterations: usize,
    ) -> Result<Model> {
        if max_iterations == 0 {
            return self.copy_model(model, context);
        }
        self.begin(context);
        let context = self.context.clone();

        let visit = |node: &Node, rewriter: &mut NodeRewriter<'_>| match rewriter
            .context()
            .node_action(node)
        {
            NodeAction::Refine => node.op().refine(node, rewriter),
            NodeAction::Compile | NodeAction::Abstain => node.op().copy(node, rewriter),
        };

        let (mut current, mut changed) = run_pass(model, None, &mut self.map, &context, visit)?;
        let mut accumulated = std::mem::take(&mut self.map);
        for _ in 1..max_iterations {
            if !changed {
                break;
            }
            let (next, pass_changed) = run_pass(&current, None, &mut self.map, &context, visit)?;
            accumulated = PortOutputsMap::concatenate(&accumulated, &self.map)?;
            self.map.clear();
            current = next;
            changed = pass_changed;
        }
        self.map = accumulated;
        Ok(current)
    }

    /// Generic per-node rewrite. The callback owns the copy/replace decision
    /// for every node (typically falling back to
    /// [`NodeRewriter::clone_node`] for kinds it does not rewrite); nothing
    /// is copied on its behalf.
    pub fn transform_model<F>(
        &mut self,
        model: &Model,
        context: &TransformContext,
        mut transform: F,
    ) -> Result<Model>
    where
        F: FnMut(&Node, &mut NodeRewriter<'_>) -> Result<()>,
    {
        self.begin(context);
        let context = self.context.clone();
        let (transformed, _) = run_pass(model, None, &mut self.map, &context, |node, rewriter| {
            transform(node, rewriter)
        })?;
        Ok(transformed)
    }

    /// The new-model elements corresponding to an old-model output port, or
    /// `None` when the port's node was not part of the iterated set.
    pub fn corresponding_outputs(&self, port: OutputPortRef) -> Option<&PortElements> {
        self.map.lookup(port)
    }

    /// The new-model elements corresponding to arbitrary old-model elements.
    pub fn corresponding_elements(&self, elements: &PortElements) -> Option<PortElements> {
        self.map.resolve(elements).ok()
    }

    /// The new-model elements corresponding to an old-model input port.
    pub fn corresponding_inputs(&self, input: &InputPort) -> Option<PortElements> {
        self.corresponding_elements(input.elements())
    }

    /// The new-model node corresponding to an old-model node whose first
    /// output maps onto a single new port (true for any node that was
    /// cloned rather than decomposed).
    pub fn corresponding_input_node(&self, node: NodeId) -> Option<NodeId> {
        self.map
            .lookup(OutputPortRef::new(node, 0))?
            .single_source()
            .map(|port| port.node)
    }

    fn begin(&mut self, context: &TransformContext) {
        self.map.clear();
        self.context = context.clone();
    }
}

/// Runs one pass: visits `source` (or the given subset of it) in dependency
/// order, handing each node to `visit` together with a rewriter over the
/// model under construction. Returns the new model and whether the pass
/// changed anything (some node produced other than one same-kind clone).
fn run_pass<F>(
    source: &Model,
    subset: Option<&[NodeId]>,
    map: &mut PortOutputsMap,
    context: &TransformContext,
    mut visit: F,
) -> Result<(Model, bool)>
where
    F: FnMut(&Node, &mut NodeRewriter<'_>) -> Result<()>,
{
    map.clear();
    let mut building = Model::new();
    let mut changed = false;

    let order: Vec<NodeId> = match subset {
        Some(ids) => ids.to_vec(),
        None => source.node_ids().collect(),
    };

    for id in order {
        let node = source
            .node(id)
            .ok_or_else(|| anyhow!("node {id} missing from source model"))?;
        let before = building.len();
        {
            let mut rewriter = NodeRewriter {
                model: &mut building,
                map,
                context,
            };
            visit(node, &mut rewriter)?;
        }
        let trivial = building.len() == before + 1
            && building.last().map(|added| added.kind()) == Some(node.kind());
        changed |= !trivial;
    }

    Ok((building, changed))
}
