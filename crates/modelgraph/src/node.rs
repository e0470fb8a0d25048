//! Node records and the behavior seam implemented by concrete operations.

use std::any::Any;
use std::fmt;

use anyhow::Result;

use crate::error::GraphError;
use crate::port::{ElementType, NodeId, OutputPort, OutputPortRef, PortElements};
use crate::transform::NodeRewriter;

/// Resolved shape of one input: element type plus total element count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PortShape {
    pub element_type: ElementType,
    pub size: usize,
}

/// Input endpoint: the upstream elements it consumes plus the shape frozen
/// from them at construction time.
#[derive(Debug, Clone)]
pub struct InputPort {
    elements: PortElements,
    element_type: ElementType,
    size: usize,
}

impl InputPort {
    pub(crate) fn new(elements: PortElements, element_type: ElementType, size: usize) -> Self {
        Self {
            elements,
            element_type,
            size,
        }
    }

    pub fn elements(&self) -> &PortElements {
        &self.elements
    }

    pub fn element_type(&self) -> ElementType {
        self.element_type
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn shape(&self) -> PortShape {
        PortShape {
            element_type: self.element_type,
            size: self.size,
        }
    }
}

/// Behavior contract implemented by every concrete operation kind.
///
/// The engine owns structure (identity, ports, wiring); the operation owns
/// shape inference and the two rewriting capabilities. Concrete kinds are
/// plugins against this seam rather than a class hierarchy: most implement
/// `kind`, `output_ports`, `clone_op`, and `as_any`, and inherit the default
/// copy/refine behavior.
pub trait Operation: Any + Send + Sync {
    /// Operation-kind tag. Used for convergence checks and rendering.
    fn kind(&self) -> &'static str;

    /// Validates the resolved input shapes and infers the output ports.
    /// This is where user and configuration errors surface, at
    /// node-construction time.
    fn output_ports(&self, inputs: &[PortShape]) -> Result<Vec<OutputPort>, GraphError>;

    /// Clones the operation payload for generic node copies.
    fn clone_op(&self) -> Box<dyn Operation>;

    /// Reproduces this node unchanged in the model under construction,
    /// resolving its inputs through the rewriter's port map and recording
    /// the mapping for every output port. Idempotent within one pass.
    fn copy(&self, node: &Node, rewriter: &mut NodeRewriter<'_>) -> Result<()> {
        rewriter.clone_node(node)?;
        Ok(())
    }

    /// Replaces this node with an equivalent subgraph of more primitive
    /// operations, mapping the node's own output ports onto whichever
    /// replacement ports produce the equivalent values. Semantic equivalence
    /// is the operation's responsibility; the engine only checks wiring.
    ///
    /// The default is the fixed-point base case: an identical copy.
    fn refine(&self, node: &Node, rewriter: &mut NodeRewriter<'_>) -> Result<()> {
        self.copy(node, rewriter)
    }

    /// Downcasting hook for typed node queries.
    fn as_any(&self) -> &dyn Any;
}

/// A unit of computation: identity, ordered typed ports, and boxed behavior.
///
/// Nodes are created only by [`Model::add_node`](crate::model::Model::add_node)
/// and never move between models.
pub struct Node {
    id: NodeId,
    inputs: Vec<InputPort>,
    outputs: Vec<OutputPort>,
    op: Box<dyn Operation>,
}

impl Node {
    pub(crate) fn new(
        id: NodeId,
        inputs: Vec<InputPort>,
        outputs: Vec<OutputPort>,
        op: Box<dyn Operation>,
    ) -> Self {
        Self {
            id,
            inputs,
            outputs,
            op,
        }
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn inputs(&self) -> &[InputPort] {
        &self.inputs
    }

    pub fn outputs(&self) -> &[OutputPort] {
        &self.outputs
    }

    pub fn op(&self) -> &dyn Operation {
        self.op.as_ref()
    }

    pub fn kind(&self) -> &'static str {
        self.op.kind()
    }

    /// Handle to output port `port` of this node.
    pub fn output_ref(&self, port: usize) -> OutputPortRef {
        OutputPortRef::new(self.id, port as u16)
    }

    /// Distinct upstream nodes, in order of first appearance.
    pub fn input_nodes(&self) -> Vec<NodeId> {
        let mut upstream = Vec::new();
        for input in &self.inputs {
            for range in input.elements().ranges() {
                if !upstream.contains(&range.port.node) {
                    upstream.push(range.port.node);
                }
            }
        }
        upstream
    }

    /// Downcasts the operation payload to a concrete kind.
    pub fn op_as<T: Operation>(&self) -> Option<&T> {
        self.op.as_any().downcast_ref::<T>()
    }
}

impl fmt::Debug for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Node")
            .field("id", &self.id)
            .field("kind", &self.kind())
            .field("inputs", &self.inputs)
            .field("outputs", &self.outputs)
            .finish()
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} = {}(", self.id, self.kind())?;
        for (index, input) in self.inputs.iter().enumerate() {
            if index > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}", input.elements())?;
        }
        f.write_str(") -> ")?;
        for (index, output) in self.outputs.iter().enumerate() {
            if index > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{output}")?;
        }
        Ok(())
    }
}
