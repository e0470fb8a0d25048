//! Concrete operation kinds for `modelgraph` models.
//!
//! Each kind is a plugin against the [`modelgraph::Operation`] seam. These
//! ops carry shape and payload only; numeric evaluation belongs to the
//! downstream code generator, not to the graph layer.

pub mod arithmetic;
pub mod constant;
pub mod io;
pub mod linear;

pub use arithmetic::{BinaryKind, BinaryOp, UnaryKind, UnaryOp};
pub use constant::ConstantOp;
pub use io::{InputOp, OutputOp};
pub use linear::{LinearOp, MatVecOp};
