//! Model entry and exit markers.

use std::any::Any;

use modelgraph::{ElementType, GraphError, Operation, OutputPort, PortShape};

/// Source node feeding externally supplied values into a model.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InputOp {
    size: usize,
    element_type: ElementType,
}

impl InputOp {
    pub fn new(size: usize, element_type: ElementType) -> Self {
        Self { size, element_type }
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn element_type(&self) -> ElementType {
        self.element_type
    }
}

impl Operation for InputOp {
    fn kind(&self) -> &'static str {
        "input"
    }

    fn output_ports(&self, inputs: &[PortShape]) -> Result<Vec<OutputPort>, GraphError> {
        if !inputs.is_empty() {
            return Err(GraphError::InputArity {
                kind: self.kind(),
                expected: 0,
                actual: inputs.len(),
            });
        }
        Ok(vec![OutputPort::new(self.element_type, self.size)])
    }

    fn clone_op(&self) -> Box<dyn Operation> {
        Box::new(*self)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Sink marking a model output; mirrors its input's shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct OutputOp;

impl Operation for OutputOp {
    fn kind(&self) -> &'static str {
        "output"
    }

    fn output_ports(&self, inputs: &[PortShape]) -> Result<Vec<OutputPort>, GraphError> {
        match inputs {
            [input] => Ok(vec![OutputPort::new(input.element_type, input.size)]),
            _ => Err(GraphError::InputArity {
                kind: self.kind(),
                expected: 1,
                actual: inputs.len(),
            }),
        }
    }

    fn clone_op(&self) -> Box<dyn Operation> {
        Box::new(*self)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
