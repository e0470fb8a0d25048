//! Owned, acyclic operation graphs with dependency-ordered traversal.

use std::collections::{HashMap, HashSet};
use std::fmt;

use crate::error::GraphError;
use crate::node::{InputPort, Node, Operation, PortShape};
use crate::port::{NodeId, OutputPort, OutputPortRef, PortElements};

/// An owned DAG of nodes reachable through their port references.
///
/// Node storage mirrors the id-keyed map plus insertion-order list used for
/// staged graphs elsewhere in this workspace. Because [`Model::add_node`]
/// validates that every referenced output port already exists, insertion
/// order is a topological order and the graph is acyclic by construction;
/// [`Model::iter`] therefore visits a node only after all of its producers.
#[derive(Default)]
pub struct Model {
    next_id: u32,
    nodes: HashMap<NodeId, Node>,
    order: Vec<NodeId>,
}

impl Model {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains_key(&id)
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(&id)
    }

    /// The most recently added node.
    pub fn last(&self) -> Option<&Node> {
        self.order.last().and_then(|id| self.nodes.get(id))
    }

    /// Looks up an output port through its handle.
    pub fn output_port(&self, port: OutputPortRef) -> Option<&OutputPort> {
        self.nodes.get(&port.node)?.outputs().get(port.port as usize)
    }

    /// Elements covering the whole of the referenced output port.
    pub fn port_elements_of(&self, port: OutputPortRef) -> Result<PortElements, GraphError> {
        let output = self
            .output_port(port)
            .ok_or(GraphError::DanglingPort(port))?;
        Ok(PortElements::from_port(port, output.size))
    }

    /// Validates the input wiring, runs the operation's shape inference, and
    /// inserts the node. All user and configuration errors surface here.
    pub fn add_node(
        &mut self,
        op: Box<dyn Operation>,
        inputs: Vec<PortElements>,
    ) -> Result<NodeId, GraphError> {
        let mut shapes = Vec::with_capacity(inputs.len());
        for (index, elements) in inputs.iter().enumerate() {
            shapes.push(self.resolve_shape(index, elements)?);
        }
        let outputs = op.output_ports(&shapes)?;

        let id = NodeId(self.next_id);
        self.next_id += 1;
        let input_ports = inputs
            .into_iter()
            .zip(shapes)
            .map(|(elements, shape)| InputPort::new(elements, shape.element_type, shape.size))
            .collect();
        self.nodes
            .insert(id, Node::new(id, input_ports, outputs, op));
        self.order.push(id);
        Ok(id)
    }

    /// Removes a node. Rejected while any remaining node's elements still
    /// reference one of the removed node's outputs.
    pub fn remove_node(&mut self, id: NodeId) -> Result<Node, GraphError> {
        if !self.nodes.contains_key(&id) {
            return Err(GraphError::UnknownNode(id));
        }
        for node in self.iter() {
            if node.id() == id {
                continue;
            }
            for input in node.inputs() {
                for range in input.elements().ranges() {
                    if range.port.node == id {
                        return Err(GraphError::PortInUse {
                            node: id,
                            referenced_by: node.id(),
                        });
                    }
                }
            }
        }
        let node = self.nodes.remove(&id).ok_or(GraphError::UnknownNode(id))?;
        self.order.retain(|entry| *entry != id);
        Ok(node)
    }

    /// Dependency-ordered traversal over all nodes.
    pub fn iter(&self) -> impl Iterator<Item = &Node> {
        self.order.iter().filter_map(|id| self.nodes.get(id))
    }

    /// Node ids in dependency order.
    pub fn node_ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.order.iter().copied()
    }

    /// Backward reachability from `targets`, returned in forward topological
    /// order: exactly the nodes required to compute the targets' outputs.
    pub fn dependencies_of(&self, targets: &[NodeId]) -> Result<Vec<NodeId>, GraphError> {
        let mut stack = Vec::with_capacity(targets.len());
        for target in targets {
            if !self.nodes.contains_key(target) {
                return Err(GraphError::UnknownNode(*target));
            }
            stack.push(*target);
        }

        let mut needed = HashSet::new();
        while let Some(id) = stack.pop() {
            if !needed.insert(id) {
                continue;
            }
            let node = self.nodes.get(&id).ok_or(GraphError::UnknownNode(id))?;
            for input in node.inputs() {
                for range in input.elements().ranges() {
                    stack.push(range.port.node);
                }
            }
        }

        Ok(self
            .order
            .iter()
            .copied()
            .filter(|id| needed.contains(id))
            .collect())
    }

    /// Re-checks the availability invariant: every input range must name an
    /// output of a node appearing earlier in the traversal order.
    pub fn validate(&self) -> Result<(), GraphError> {
        let mut available: HashSet<NodeId> = HashSet::with_capacity(self.order.len());
        for id in &self.order {
            let node = self.nodes.get(id).ok_or(GraphError::UnknownNode(*id))?;
            for input in node.inputs() {
                for range in input.elements().ranges() {
                    if !available.contains(&range.port.node) {
                        return Err(GraphError::DanglingPort(range.port));
                    }
                }
            }
            available.insert(*id);
        }
        Ok(())
    }

    fn resolve_shape(&self, index: usize, elements: &PortElements) -> Result<PortShape, GraphError> {
        let mut element_type = None;
        let mut size = 0usize;
        for range in elements.ranges() {
            let output = self
                .output_port(range.port)
                .ok_or(GraphError::DanglingPort(range.port))?;
            if range.len == 0 {
                return Err(GraphError::EmptyRange(range.port));
            }
            if range.end() > output.size {
                return Err(GraphError::RangeOutOfBounds {
                    port: range.port,
                    start: range.start,
                    end: range.end(),
                    size: output.size,
                });
            }
            match element_type {
                None => element_type = Some(output.element_type),
                Some(first) if first != output.element_type => {
                    return Err(GraphError::MixedElementTypes {
                        index,
                        first,
                        second: output.element_type,
                    });
                }
                Some(_) => {}
            }
            size += range.len;
        }
        let element_type = element_type.ok_or(GraphError::EmptyInput { index })?;
        Ok(PortShape { element_type, size })
    }
}

impl fmt::Display for Model {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for node in self.iter() {
            writeln!(f, "{node}")?;
        }
        Ok(())
    }
}

impl fmt::Debug for Model {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Model")
            .field("len", &self.len())
            .field("order", &self.order)
            .finish()
    }
}
