//! Human-readable derivation traces.
pub mod trace;

pub use trace::format_trace;
