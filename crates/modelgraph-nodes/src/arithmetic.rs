//! Elementwise arithmetic primitives.

use std::any::Any;

use modelgraph::{GraphError, Operation, OutputPort, PortShape};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryKind {
    Neg,
    Abs,
    Sqrt,
}

impl UnaryKind {
    pub fn name(self) -> &'static str {
        match self {
            UnaryKind::Neg => "neg",
            UnaryKind::Abs => "abs",
            UnaryKind::Sqrt => "sqrt",
        }
    }
}

/// Elementwise unary operation mirroring its input's shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnaryOp {
    kind: UnaryKind,
}

impl UnaryOp {
    pub fn new(kind: UnaryKind) -> Self {
        Self { kind }
    }

    pub fn unary_kind(&self) -> UnaryKind {
        self.kind
    }
}

impl Operation for UnaryOp {
    fn kind(&self) -> &'static str {
        self.kind.name()
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

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryKind {
    Add,
    Subtract,
    Multiply,
}

impl BinaryKind {
    pub fn name(self) -> &'static str {
        match self {
            BinaryKind::Add => "add",
            BinaryKind::Subtract => "subtract",
            BinaryKind::Multiply => "multiply",
        }
    }
}

/// Elementwise binary operation over two inputs of equal size and type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BinaryOp {
    kind: BinaryKind,
}

impl BinaryOp {
    pub fn new(kind: BinaryKind) -> Self {
        Self { kind }
    }

    pub fn binary_kind(&self) -> BinaryKind {
        self.kind
    }
}

impl Operation for BinaryOp {
    fn kind(&self) -> &'static str {
        self.kind.name()
    }

    fn output_ports(&self, inputs: &[PortShape]) -> Result<Vec<OutputPort>, GraphError> {
        let [lhs, rhs] = inputs else {
            return Err(GraphError::InputArity {
                kind: self.kind(),
                expected: 2,
                actual: inputs.len(),
            });
        };
        if rhs.size != lhs.size {
            return Err(GraphError::InputSizeMismatch {
                kind: self.kind(),
                index: 1,
                expected: lhs.size,
                actual: rhs.size,
            });
        }
        if rhs.element_type != lhs.element_type {
            return Err(GraphError::InputTypeMismatch {
                kind: self.kind(),
                index: 1,
                expected: lhs.element_type,
                actual: rhs.element_type,
            });
        }
        Ok(vec![OutputPort::new(lhs.element_type, lhs.size)])
    }

    fn clone_op(&self) -> Box<dyn Operation> {
        Box::new(*self)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
