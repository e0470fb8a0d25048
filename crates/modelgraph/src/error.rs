//! User-facing construction errors.
//!
//! Everything here is detectable when a node is added to a model: dangling
//! or out-of-bounds port references, shape or type mismatches, and invalid
//! operation payloads. Engine invariant violations (unmapped ports during a
//! pass, conflicting remaps) are not represented here; those fail loudly in
//! the transform layer because they signal an engine or node bug.

use thiserror::Error;

use crate::port::{ElementType, NodeId, OutputPortRef};

/// Errors reported while constructing or editing a model.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GraphError {
    #[error("unknown node {0}")]
    UnknownNode(NodeId),

    #[error("input references unknown output port {0}")]
    DanglingPort(OutputPortRef),

    #[error("range {start}..{end} exceeds output port {port} of size {size}")]
    RangeOutOfBounds {
        port: OutputPortRef,
        start: usize,
        end: usize,
        size: usize,
    },

    #[error("zero-length range on output port {0}")]
    EmptyRange(OutputPortRef),

    #[error("input {index} has no elements")]
    EmptyInput { index: usize },

    #[error("input {index} mixes element types {first} and {second}")]
    MixedElementTypes {
        index: usize,
        first: ElementType,
        second: ElementType,
    },

    #[error("{kind} expects {expected} inputs, got {actual}")]
    InputArity {
        kind: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("input {index} of {kind} expects {expected} elements, got {actual}")]
    InputSizeMismatch {
        kind: &'static str,
        index: usize,
        expected: usize,
        actual: usize,
    },

    #[error("input {index} of {kind} expects element type {expected}, got {actual}")]
    InputTypeMismatch {
        kind: &'static str,
        index: usize,
        expected: ElementType,
        actual: ElementType,
    },

    #[error("cannot remove node {node}: output still referenced by node {referenced_by}")]
    PortInUse {
        node: NodeId,
        referenced_by: NodeId,
    },

    #[error("{kind}: {message}")]
    InvalidOperation { kind: &'static str, message: String },
}
