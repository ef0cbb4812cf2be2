//! Solves for a designated unknown by inverting the equations around it.
pub mod equation;
pub mod propagator;

pub use equation::{solve_equality, Solved};
pub use propagator::{Mode, Propagator};
