//! Model transformation: policy context, port remapping, and the
//! copy/refine engine.

mod context;
mod map;
mod rewriter;
mod transformer;

pub use context::{CompileTarget, NodeAction, NodeActionFn, TransformContext};
pub use map::PortOutputsMap;
pub use rewriter::NodeRewriter;
pub use transformer::ModelTransformer;
