//! Forward evaluation, operator kernel, inversion and the value cache.
pub mod evaluator;
pub mod inverter;
pub mod kernel;
pub mod ledger;

pub use evaluator::Evaluator;
pub use inverter::invert;
pub use ledger::{ComputationError, Derivation, Ledger, Status};
