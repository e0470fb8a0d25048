//! Fixed-payload source nodes.

use std::any::Any;

use modelgraph::{ElementType, GraphError, Operation, OutputPort, PortShape};

/// Source node producing a fixed sequence of values. Values are stored as
/// `f64` regardless of the declared element type; the downstream code
/// generator narrows them when it emits the payload.
#[derive(Debug, Clone, PartialEq)]
pub struct ConstantOp {
    values: Vec<f64>,
    element_type: ElementType,
}

impl ConstantOp {
    pub fn new(values: Vec<f64>) -> Result<Self, GraphError> {
        Self::with_type(values, ElementType::F64)
    }

    pub fn with_type(values: Vec<f64>, element_type: ElementType) -> Result<Self, GraphError> {
        if values.is_empty() {
            return Err(GraphError::InvalidOperation {
                kind: "constant",
                message: "requires at least one value".to_string(),
            });
        }
        Ok(Self {
            values,
            element_type,
        })
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn element_type(&self) -> ElementType {
        self.element_type
    }
}

impl Operation for ConstantOp {
    fn kind(&self) -> &'static str {
        "constant"
    }

    fn output_ports(&self, inputs: &[PortShape]) -> Result<Vec<OutputPort>, GraphError> {
        if !inputs.is_empty() {
            return Err(GraphError::InputArity {
                kind: self.kind(),
                expected: 0,
                actual: inputs.len(),
            });
        }
        Ok(vec![OutputPort::new(self.element_type, self.values.len())])
    }

    fn clone_op(&self) -> Box<dyn Operation> {
        Box::new(self.clone())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
