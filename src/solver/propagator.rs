//! Forward/backward solving around a designated unknown.
//!
//! Each node moves through `Unresolved -> Resolving -> Resolved | Failed`.
//! A node is first tried forward from its own definition; if that fails and
//! reverse mode is on, every equation that mentions the node is inverted in
//! reverse-index order until one of them yields a value. The first success
//! wins.
//!
//! A failure that leaned on a node still `Resolving` higher up the call
//! stack is provisional. It stays `Failed` while the shallowest frame it
//! leaned on is open, so a node shared by many equations is explored once
//! per frame rather than once per path. Any success releases every
//! provisional failure back to `Unresolved`. When a frame fails without
//! leaning on anything above it, the failures filed under it become final.
use crate::compute::inverter::invert;
use crate::compute::kernel;
use crate::compute::ledger::{ComputationError, Derivation, Ledger, Status};
use crate::store::{NodeId, NodeKind, Registry, Value};
use std::collections::HashMap;
use tracing::{debug, trace};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    /// Only a node's own definition is used.
    ForwardOnly,
    /// Definitions first, then inversion through the reverse index.
    #[default]
    Reverse,
}

pub struct Propagator<'a> {
    registry: &'a Registry,
    unknown: Option<NodeId>,
    mode: Mode,
    ledger: Ledger,
    /// Call-stack depth of every node currently `Resolving`.
    depth_of: HashMap<NodeId, usize>,
    /// One bucket per open frame: provisional failures filed under the
    /// shallowest frame they leaned on.
    provisional: Vec<Vec<NodeId>>,
    provisional_low: HashMap<NodeId, usize>,
    /// Shallowest open frame the current exploration has leaned on.
    low: usize,
}

impl<'a> Propagator<'a> {
    /// `unknown` is solved as if it had no definition, whatever the registry holds.
    pub fn new(registry: &'a Registry, unknown: Option<NodeId>, mode: Mode) -> Self {
        Self {
            registry,
            unknown,
            mode,
            ledger: Ledger::with_capacity(registry.count()),
            depth_of: HashMap::new(),
            provisional: Vec::new(),
            provisional_low: HashMap::new(),
            low: usize::MAX,
        }
    }

    pub fn mode(&self) -> Mode { self.mode }
    pub fn ledger(&self) -> &Ledger { &self.ledger }
    pub fn into_ledger(self) -> Ledger { self.ledger }

    /// Switching modes drops every cached value and memoized failure.
    pub fn set_mode(&mut self, mode: Mode) {
        if self.mode != mode {
            debug!(?mode, "switching solve mode, clearing ledger");
            self.ledger.clear();
            self.provisional_low.clear();
            self.mode = mode;
        }
    }

    pub fn solve(&mut self, name: &str) -> Result<Value, ComputationError> {
        let id = self.registry.lookup(name)
            .ok_or_else(|| ComputationError::UnknownNode { name: name.to_string() })?;
        self.solve_node(id)
    }

    /// Like `solve_node`, but a node that cannot be determined yields `Ok(None)`.
    /// Only errors that abort the whole solve (`DivisionByZero`, `UnknownNode`)
    /// come back as `Err`.
    pub fn try_solve(&mut self, id: NodeId) -> Result<Option<Value>, ComputationError> {
        match self.solve_node(id) {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.is_recoverable() => Ok(None),
            Err(e) => Err(e),
        }
    }

    pub fn solve_node(&mut self, id: NodeId) -> Result<Value, ComputationError> {
        let registry = self.registry;
        let name = registry.name(id);
        match self.ledger.status(id) {
            Status::Resolved => {
                if let Some(value) = self.ledger.get(id) {
                    return Ok(value.clone());
                }
            }
            Status::Failed => {
                trace!(node = name, "memoized failure");
                if let Some(&low) = self.provisional_low.get(&id) {
                    self.low = self.low.min(low);
                }
                return Err(ComputationError::Unsolvable { name: name.to_string() });
            }
            Status::Resolving => {
                debug!(node = name, "already resolving on this path, giving up");
                if let Some(&depth) = self.depth_of.get(&id) {
                    self.low = self.low.min(depth);
                }
                return Err(ComputationError::CyclicConstraint { name: name.to_string() });
            }
            Status::Unresolved => {}
        }

        let depth = self.provisional.len();
        trace!(node = name, depth, "solving");
        self.provisional.push(Vec::new());
        self.depth_of.insert(id, depth);
        self.ledger.set_status(id, Status::Resolving);
        let outer_low = std::mem::replace(&mut self.low, usize::MAX);

        let outcome = self.resolve(id);

        let low = std::mem::replace(&mut self.low, outer_low);
        self.depth_of.remove(&id);
        let filed_here = self.provisional.pop().unwrap_or_default();

        match outcome {
            Ok(Some((value, derivation))) => {
                debug!(node = name, value = %value, ?derivation, "solved");
                self.ledger.insert(id, value.clone(), derivation);
                self.release_provisional(filed_here);
                Ok(value)
            }
            Ok(None) if low >= depth => {
                debug!(node = name, settled = filed_here.len(), "cannot solve");
                for node in filed_here {
                    self.provisional_low.remove(&node);
                }
                self.ledger.set_status(id, Status::Failed);
                Err(ComputationError::Unsolvable { name: name.to_string() })
            }
            Ok(None) => {
                debug!(node = name, leaned_on = low, "cannot solve while outer frames are open");
                self.ledger.set_status(id, Status::Failed);
                self.low = outer_low.min(low);
                for &node in filed_here.iter().chain(std::iter::once(&id)) {
                    self.provisional_low.insert(node, low);
                }
                let bucket = &mut self.provisional[low];
                bucket.extend(filed_here);
                bucket.push(id);
                Err(ComputationError::Unsolvable { name: name.to_string() })
            }
            Err(e) => {
                self.ledger.set_status(id, Status::Unresolved);
                self.release_provisional(filed_here);
                Err(e)
            }
        }
    }

    /// Sends every provisional failure back to `Unresolved`.
    fn release_provisional(&mut self, mut released: Vec<NodeId>) {
        for bucket in &mut self.provisional {
            released.append(bucket);
        }
        for node in released {
            self.provisional_low.remove(&node);
            self.ledger.set_status(node, Status::Unresolved);
        }
    }

    fn resolve(&mut self, id: NodeId) -> Result<Option<(Value, Derivation)>, ComputationError> {
        let registry = self.registry;
        if self.unknown != Some(id) {
            match registry.kind(id) {
                NodeKind::Literal(value) => return Ok(Some((value.clone(), Derivation::Literal))),
                NodeKind::Formula(_) => {
                    if let Some(value) = self.try_forward(id)? {
                        return Ok(Some((value, Derivation::Forward)));
                    }
                }
                NodeKind::Undefined => {}
            }
        }

        if self.mode == Mode::Reverse {
            return self.try_reverse(id);
        }
        Ok(None)
    }

    fn try_forward(&mut self, id: NodeId) -> Result<Option<Value>, ComputationError> {
        let registry = self.registry;
        let (Some([lhs, rhs]), NodeKind::Formula(op)) = (registry.operands(id), registry.kind(id)) else {
            return Ok(None);
        };

        let Some(l) = self.try_solve(lhs)? else { return Ok(None) };
        let Some(r) = self.try_solve(rhs)? else { return Ok(None) };

        kernel::apply(*op, &l, &r)
            .map(Some)
            .map_err(|_| ComputationError::DivisionByZero { name: registry.name(id).to_string() })
    }

    fn try_reverse(&mut self, id: NodeId) -> Result<Option<(Value, Derivation)>, ComputationError> {
        let registry = self.registry;
        let inversions = registry.inversions(id);
        trace!(node = registry.name(id), candidates = inversions.len(), "trying reverse lookup");

        for inv in inversions {
            let Some(result) = self.try_solve(inv.via)? else {
                trace!(node = registry.name(id), via = registry.name(inv.via), "equation result unknown");
                continue;
            };
            let Some(known) = self.try_solve(inv.other)? else {
                trace!(node = registry.name(id), other = registry.name(inv.other), "other operand unknown");
                continue;
            };

            let value = invert(inv.op, &result, &known, inv.position)
                .map_err(|_| ComputationError::DivisionByZero { name: registry.name(id).to_string() })?;
            return Ok(Some((value, Derivation::Inverted { via: inv.via, other: inv.other })));
        }

        trace!(node = registry.name(id), "no reverse equation worked out");
        Ok(None)
    }
}
