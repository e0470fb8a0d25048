//! Narrow mutation surface handed to operations while a pass runs.

use anyhow::{anyhow, Result};

use crate::model::Model;
use crate::node::{Node, Operation};
use crate::port::{NodeId, OutputPortRef, PortElements};

use super::context::TransformContext;
use super::map::PortOutputsMap;

/// The only sanctioned way to mutate the model under construction during a
/// pass. Handed to [`Operation::copy`]/[`Operation::refine`] and to
/// `transform_model` callbacks; deliberately narrower than the transformer
/// itself so node implementations cannot reach engine internals.
pub struct NodeRewriter<'a> {
    pub(crate) model: &'a mut Model,
    pub(crate) map: &'a mut PortOutputsMap,
    pub(crate) context: &'a TransformContext,
}

impl<'a> NodeRewriter<'a> {
    /// The active transformation context.
    pub fn context(&self) -> &TransformContext {
        self.context
    }

    /// Read access to the model under construction.
    pub fn model(&self) -> &Model {
        self.model
    }

    /// Constructs a new node in the model under construction. `inputs` must
    /// already reference new-model ports (resolve old references first).
    pub fn add_node(
        &mut self,
        op: Box<dyn Operation>,
        inputs: Vec<PortElements>,
    ) -> Result<NodeId> {
        Ok(self.model.add_node(op, inputs)?)
    }

    /// Removes a node from the model under construction. Legal only while
    /// nothing references it.
    pub fn delete_node(&mut self, id: NodeId) -> Result<()> {
        self.model.remove_node(id)?;
        Ok(())
    }

    /// Resolves old-model elements into their new-model equivalents.
    pub fn resolve(&self, elements: &PortElements) -> Result<PortElements> {
        self.map.resolve(elements)
    }

    /// Resolves input `index` of an old-model node.
    pub fn resolve_input(&self, node: &Node, index: usize) -> Result<PortElements> {
        let input = node
            .inputs()
            .get(index)
            .ok_or_else(|| anyhow!("{} node has no input {index}", node.kind()))?;
        self.map.resolve(input.elements())
    }

    /// Elements covering one whole output port of a new-model node.
    pub fn output_of(&self, node: NodeId, port: u16) -> Result<PortElements> {
        Ok(self.model.port_elements_of(OutputPortRef::new(node, port))?)
    }

    /// Records that old port `old` is produced by new port `new`.
    pub fn map_output(&mut self, old: OutputPortRef, new: OutputPortRef) -> Result<()> {
        let elements = self.model.port_elements_of(new)?;
        self.map.insert(old, elements);
        Ok(())
    }

    /// Records that old port `old` is produced by the given new-model
    /// elements (possibly a concatenation across several replacement nodes).
    pub fn map_output_elements(&mut self, old: OutputPortRef, new: PortElements) {
        self.map.insert(old, new);
    }

    /// Generic single-node clone: resolves every input through the port map,
    /// re-adds the operation, and maps each output port onto its clone.
    /// A node whose outputs were already mapped this pass is left alone and
    /// its existing clone is returned.
    pub fn clone_node(&mut self, node: &Node) -> Result<NodeId> {
        if let Some(existing) = self.cloned_id_of(node) {
            return Ok(existing);
        }
        let mut inputs = Vec::with_capacity(node.inputs().len());
        for input in node.inputs() {
            inputs.push(self.map.resolve(input.elements())?);
        }
        let id = self.model.add_node(node.op().clone_op(), inputs)?;
        for port in 0..node.outputs().len() {
            self.map_output(node.output_ref(port), OutputPortRef::new(id, port as u16))?;
        }
        Ok(id)
    }

    fn cloned_id_of(&self, node: &Node) -> Option<NodeId> {
        if node.outputs().is_empty() {
            return None;
        }
        let mapped = self.map.lookup(node.output_ref(0))?;
        mapped.single_source().map(|port| port.node)
    }
}
