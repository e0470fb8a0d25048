//! Fully-connected layers and the primitive they lower to.

use std::any::Any;

use anyhow::Result;

use modelgraph::{
    GraphError, Node, NodeRewriter, Operation, OutputPort, OutputPortRef, PortShape,
};

use crate::arithmetic::{BinaryKind, BinaryOp};
use crate::constant::ConstantOp;

/// Matrix-vector product against a fixed row-major `rows`×`cols` weight
/// matrix. A lowering primitive: it never refines further.
#[derive(Debug, Clone, PartialEq)]
pub struct MatVecOp {
    rows: usize,
    cols: usize,
    weights: Vec<f64>,
}

impl MatVecOp {
    pub fn new(rows: usize, cols: usize, weights: Vec<f64>) -> Result<Self, GraphError> {
        if weights.len() != rows * cols {
            return Err(GraphError::InvalidOperation {
                kind: "matvec",
                message: format!(
                    "weight matrix needs {} values ({rows}x{cols}), got {}",
                    rows * cols,
                    weights.len()
                ),
            });
        }
        Ok(Self {
            rows,
            cols,
            weights,
        })
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn weights(&self) -> &[f64] {
        &self.weights
    }
}

impl Operation for MatVecOp {
    fn kind(&self) -> &'static str {
        "matvec"
    }

    fn output_ports(&self, inputs: &[PortShape]) -> Result<Vec<OutputPort>, GraphError> {
        let [input] = inputs else {
            return Err(GraphError::InputArity {
                kind: self.kind(),
                expected: 1,
                actual: inputs.len(),
            });
        };
        if input.size != self.cols {
            return Err(GraphError::InputSizeMismatch {
                kind: self.kind(),
                index: 0,
                expected: self.cols,
                actual: input.size,
            });
        }
        Ok(vec![OutputPort::new(input.element_type, self.rows)])
    }

    fn clone_op(&self) -> Box<dyn Operation> {
        Box::new(self.clone())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Fully-connected layer `y = W·x + b`.
///
/// Refines into the primitive subgraph `matvec → constant(bias) → add`,
/// mapping its old output onto the add node's output so downstream
/// references survive the decomposition.
#[derive(Debug, Clone, PartialEq)]
pub struct LinearOp {
    rows: usize,
    cols: usize,
    weights: Vec<f64>,
    bias: Vec<f64>,
}

impl LinearOp {
    pub fn new(
        rows: usize,
        cols: usize,
        weights: Vec<f64>,
        bias: Vec<f64>,
    ) -> Result<Self, GraphError> {
        if weights.len() != rows * cols {
            return Err(GraphError::InvalidOperation {
                kind: "linear",
                message: format!(
                    "weight matrix needs {} values ({rows}x{cols}), got {}",
                    rows * cols,
                    weights.len()
                ),
            });
        }
        if bias.len() != rows {
            return Err(GraphError::InvalidOperation {
                kind: "linear",
                message: format!("bias needs {rows} values, got {}", bias.len()),
            });
        }
        Ok(Self {
            rows,
            cols,
            weights,
            bias,
        })
    }

    pub fn weights(&self) -> &[f64] {
        &self.weights
    }

    pub fn bias(&self) -> &[f64] {
        &self.bias
    }
}

impl Operation for LinearOp {
    fn kind(&self) -> &'static str {
        "linear"
    }

    fn output_ports(&self, inputs: &[PortShape]) -> Result<Vec<OutputPort>, GraphError> {
        let [input] = inputs else {
            return Err(GraphError::InputArity {
                kind: self.kind(),
                expected: 1,
                actual: inputs.len(),
            });
        };
        if input.size != self.cols {
            return Err(GraphError::InputSizeMismatch {
                kind: self.kind(),
                index: 0,
                expected: self.cols,
                actual: input.size,
            });
        }
        Ok(vec![OutputPort::new(input.element_type, self.rows)])
    }

    fn clone_op(&self) -> Box<dyn Operation> {
        Box::new(self.clone())
    }

    fn refine(&self, node: &Node, rewriter: &mut NodeRewriter<'_>) -> Result<()> {
        let x = rewriter.resolve_input(node, 0)?;
        let element_type = node.outputs()[0].element_type;

        let product = rewriter.add_node(
            Box::new(MatVecOp::new(self.rows, self.cols, self.weights.clone())?),
            vec![x],
        )?;
        let bias = rewriter.add_node(
            Box::new(ConstantOp::with_type(self.bias.clone(), element_type)?),
            vec![],
        )?;
        let sum = rewriter.add_node(
            Box::new(BinaryOp::new(BinaryKind::Add)),
            vec![rewriter.output_of(product, 0)?, rewriter.output_of(bias, 0)?],
        )?;

        rewriter.map_output(node.output_ref(0), OutputPortRef::new(sum, 0))?;
        Ok(())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
