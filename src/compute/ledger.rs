use crate::store::{NodeId, Value};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ComputationError {
    #[error("Unknown node '{name}'")]
    UnknownNode { name: String },
    #[error("Cycle detected while evaluating '{name}'")]
    CycleDetected { name: String },
    #[error("Node '{name}' was re-entered while its constraints were being resolved")]
    CyclicConstraint { name: String },
    #[error("Division by zero at node '{name}'")]
    DivisionByZero { name: String },
    #[error("No forward or reverse path determines '{name}'")]
    Unsolvable { name: String },
    #[error("Node '{name}' is not an operation and cannot be turned into an equation")]
    NotAnEquation { name: String },
}

impl ComputationError {
    /// Failures the propagator may route around by trying another path.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::CyclicConstraint { .. } | Self::Unsolvable { .. })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Status {
    #[default]
    Unresolved,
    Resolving,
    Resolved,
    Failed,
}

/// How a cached value was obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Derivation {
    Literal,
    /// Computed from the node's own operation.
    Forward,
    /// Backed out of the equation of `via`, using the value of `other`.
    Inverted { via: NodeId, other: NodeId },
}

#[derive(Debug, Clone, Default)]
struct Slot {
    value: Option<Value>,
    status: Status,
    derivation: Option<Derivation>,
}

/// Value cache for one solve pass.
///
/// A ledger is never carried across modes: switching between forward-only
/// and reverse solving starts from a fresh (or `clear`ed) ledger.
#[derive(Debug, Clone, Default)]
pub struct Ledger {
    slots: Vec<Slot>,
}

impl Ledger {
    pub fn new() -> Self { Self::default() }

    pub fn with_capacity(size: usize) -> Self {
        let mut ledger = Self::new();
        ledger.ensure_capacity(size);
        ledger
    }

    pub fn ensure_capacity(&mut self, size: usize) {
        if self.slots.len() < size {
            self.slots.resize(size, Slot::default());
        }
    }

    #[inline(always)]
    pub fn get(&self, node_id: NodeId) -> Option<&Value> {
        self.slots.get(node_id.index())?.value.as_ref()
    }

    pub fn status(&self, node_id: NodeId) -> Status {
        self.slots.get(node_id.index()).map_or(Status::Unresolved, |s| s.status)
    }

    pub fn derivation(&self, node_id: NodeId) -> Option<Derivation> {
        self.slots.get(node_id.index())?.derivation
    }

    /// Stores a value and marks the node resolved.
    pub fn insert(&mut self, node_id: NodeId, value: Value, derivation: Derivation) {
        let slot = self.slot_mut(node_id);
        slot.value = Some(value);
        slot.status = Status::Resolved;
        slot.derivation = Some(derivation);
    }

    pub fn set_status(&mut self, node_id: NodeId, status: Status) {
        self.slot_mut(node_id).status = status;
    }

    pub fn clear(&mut self) {
        self.slots.iter_mut().for_each(|slot| *slot = Slot::default());
    }

    fn slot_mut(&mut self, node_id: NodeId) -> &mut Slot {
        let idx = node_id.index();
        if idx >= self.slots.len() {
            self.slots.resize(idx + 1, Slot::default());
        }
        &mut self.slots[idx]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use num::BigRational;

    #[test]
    fn test_insert_marks_resolved() {
        let mut ledger = Ledger::new();
        let id = NodeId(3);
        assert_eq!(ledger.status(id), Status::Unresolved);
        assert!(ledger.get(id).is_none());

        ledger.insert(id, BigRational::from_integer(7.into()), Derivation::Forward);
        assert_eq!(ledger.status(id), Status::Resolved);
        assert_eq!(ledger.get(id), Some(&BigRational::from_integer(7.into())));
        assert_eq!(ledger.derivation(id), Some(Derivation::Forward));
    }

    #[test]
    fn test_clear_resets_every_slot() {
        let mut ledger = Ledger::with_capacity(4);
        ledger.insert(NodeId(0), BigRational::from_integer(1.into()), Derivation::Literal);
        ledger.insert(NodeId(1), BigRational::from_integer(2.into()), Derivation::Literal);
        ledger.set_status(NodeId(2), Status::Failed);

        ledger.clear();
        assert!(ledger.get(NodeId(0)).is_none());
        assert!(ledger.get(NodeId(1)).is_none());
        assert_eq!(ledger.status(NodeId(2)), Status::Unresolved);
    }

    #[test]
    fn test_recoverable_errors() {
        assert!(ComputationError::Unsolvable { name: "a".into() }.is_recoverable());
        assert!(ComputationError::CyclicConstraint { name: "a".into() }.is_recoverable());
        assert!(!ComputationError::DivisionByZero { name: "a".into() }.is_recoverable());
        assert!(!ComputationError::UnknownNode { name: "a".into() }.is_recoverable());
    }
}
