//! Graph storage: node ids, node kinds and the registry holding the equations.
mod registry;
mod types;

pub use registry::Registry;
pub use types::{Inversion, NodeId, NodeKind, NodeMetadata, Operand, Operation, Value};

/// The loaded expression graph.
pub type Graph = Registry;
