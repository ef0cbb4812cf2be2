//! Expression graph solver.
//!
//! A graph maps node names to integer literals or to binary operations over
//! two other nodes. Nodes are evaluated forward with exact rational
//! arithmetic; a node with no usable definition can instead be backed out of
//! the equations that mention it.
//!
//! ```
//! let graph = expr_graph_solver::load("root: x + y\nx: 3\ny: 4").unwrap();
//! let value = expr_graph_solver::evaluate(&graph, "root").unwrap();
//! assert_eq!(value.to_string(), "7");
//! ```

pub mod compute;
pub mod display;
pub mod driver;
pub mod parse;
pub mod solver;
pub mod store;

pub use compute::ComputationError;
pub use parse::LoadError;
pub use store::{Graph, Value};

use solver::{Mode, Propagator};

/// Parses declarations into a graph and builds its reverse index.
pub fn load(text: &str) -> Result<Graph, LoadError> {
    parse::load(text)
}

/// Forward-only evaluation. Fails if any literal on the way is missing.
pub fn evaluate(graph: &Graph, name: &str) -> Result<Value, ComputationError> {
    compute::Evaluator::new(graph).evaluate(name)
}

/// Forward and reverse solving, treating `unknown` as if it had no
/// definition. An empty `unknown` designates no node.
pub fn solve(graph: &Graph, name: &str, unknown: &str) -> Result<Value, ComputationError> {
    let unknown = match unknown {
        "" => None,
        other => Some(
            graph
                .lookup(other)
                .ok_or_else(|| ComputationError::UnknownNode { name: other.to_string() })?,
        ),
    };
    Propagator::new(graph, unknown, Mode::Reverse).solve(name)
}
