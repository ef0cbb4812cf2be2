//! A synchronous, single-threaded forward evaluator.
use super::kernel;
use super::ledger::{ComputationError, Derivation, Ledger};
use crate::store::{NodeId, NodeKind, Registry, Value};
use std::collections::HashSet;

pub struct Evaluator<'a> {
    registry: &'a Registry,
    ledger: Ledger,
}

impl<'a> Evaluator<'a> {
    pub fn new(registry: &'a Registry) -> Self {
        Self { registry, ledger: Ledger::with_capacity(registry.count()) }
    }

    pub fn ledger(&self) -> &Ledger { &self.ledger }
    pub fn into_ledger(self) -> Ledger { self.ledger }

    /// Evaluates a node by name. Every literal it depends on must be present.
    pub fn evaluate(&mut self, name: &str) -> Result<Value, ComputationError> {
        let id = self.registry.lookup(name)
            .ok_or_else(|| ComputationError::UnknownNode { name: name.to_string() })?;
        self.evaluate_node(id)
    }

    /// Computes a node and its dependencies, reusing anything already in the ledger.
    ///
    /// A DFS first builds a post-order of the uncached dependencies (which
    /// rejects cycles and undefined nodes before any arithmetic happens), then
    /// the nodes are computed in that order.
    pub fn evaluate_node(&mut self, target: NodeId) -> Result<Value, ComputationError> {
        let mut eval_order = Vec::new();
        let mut visiting = HashSet::new(); // For cycle detection
        let mut visited = HashSet::new();  // For memoization

        self.build_eval_order_dfs(target, &mut eval_order, &mut visiting, &mut visited)?;

        for &node_id in &eval_order {
            let (value, derivation) = self.evaluate_with_parents(node_id)?;
            self.ledger.insert(node_id, value, derivation);
        }

        self.ledger.get(target).cloned()
            .ok_or_else(|| ComputationError::UnknownNode { name: self.registry.name(target).to_string() })
    }

    fn build_eval_order_dfs(
        &self,
        node_id: NodeId,
        eval_order: &mut Vec<NodeId>,
        visiting: &mut HashSet<NodeId>,
        visited: &mut HashSet<NodeId>,
    ) -> Result<(), ComputationError> {
        if visited.contains(&node_id) || self.ledger.get(node_id).is_some() {
            return Ok(());
        }
        // Re-entering a node that is still on the recursion stack.
        if visiting.contains(&node_id) {
            return Err(ComputationError::CycleDetected { name: self.registry.name(node_id).to_string() });
        }

        match self.registry.kind(node_id) {
            NodeKind::Undefined => {
                return Err(ComputationError::UnknownNode { name: self.registry.name(node_id).to_string() });
            }
            NodeKind::Literal(_) => {}
            NodeKind::Formula(_) => {
                visiting.insert(node_id);
                for &parent_id in self.registry.get_parents(node_id) {
                    self.build_eval_order_dfs(parent_id, eval_order, visiting, visited)?;
                }
                visiting.remove(&node_id);
            }
        }

        visited.insert(node_id);
        eval_order.push(node_id);
        Ok(())
    }

    fn evaluate_with_parents(&self, node_id: NodeId) -> Result<(Value, Derivation), ComputationError> {
        let name = || self.registry.name(node_id).to_string();
        match self.registry.kind(node_id) {
            NodeKind::Literal(value) => Ok((value.clone(), Derivation::Literal)),
            NodeKind::Formula(op) => {
                let [lhs, rhs] = self.registry.operands(node_id)
                    .ok_or_else(|| ComputationError::UnknownNode { name: name() })?;
                // The DFS order guarantees both parents are in the ledger.
                let (Some(l), Some(r)) = (self.ledger.get(lhs), self.ledger.get(rhs)) else {
                    return Err(ComputationError::UnknownNode { name: name() });
                };
                let value = kernel::apply(*op, l, r)
                    .map_err(|_| ComputationError::DivisionByZero { name: name() })?;
                Ok((value, Derivation::Forward))
            }
            NodeKind::Undefined => Err(ComputationError::UnknownNode { name: name() }),
        }
    }
}
