//! Graph-based intermediate representation for computational models,
//! together with the transformation engine that copies, prunes, and
//! progressively lowers it.
//!
//! A [`Model`] owns an acyclic graph of [`Node`]s connected through typed
//! port references ([`PortElements`]). The [`ModelTransformer`] rebuilds a
//! model generation by generation (cloning nodes, extracting sub-models,
//! or asking nodes to refine themselves into more primitive subgraphs)
//! while maintaining the old-port to new-port mapping that keeps every
//! reference resolvable across rewriting generations. Concrete operation
//! kinds live outside this crate and plug in through the [`Operation`]
//! seam.

pub mod error;
pub mod model;
pub mod node;
pub mod port;
pub mod transform;

pub use error::GraphError;
pub use model::Model;
pub use node::{InputPort, Node, Operation, PortShape};
pub use port::{ElementType, NodeId, OutputPort, OutputPortRef, PortElements, PortRange};
pub use transform::{
    CompileTarget, ModelTransformer, NodeAction, NodeActionFn, NodeRewriter, PortOutputsMap,
    TransformContext,
};
