use super::types::*;
use smallvec::SmallVec;
use std::collections::HashMap;

/// Node storage for one expression graph.
///
/// Definitions (`kinds` + parent ranges) may be edited after loading, the
/// reverse index may not: it records the equations as they were declared,
/// so a node whose definition is later replaced still constrains its operands.
#[derive(Debug, Clone, Default)]
pub struct Registry {
    // Columnar Arrays
    pub kinds: Vec<NodeKind>,
    pub meta: Vec<NodeMetadata>,

    // Topology (CSR-ish)
    pub parents_flat: Vec<NodeId>,
    pub parents_ranges: Vec<(u32, u32)>, // (start, count)

    // Reverse index, one list per node in declaration order
    pub dependents: Vec<SmallVec<[Inversion; 2]>>,

    names: HashMap<String, NodeId>,
    declaration_order: Vec<NodeId>,
}

impl Registry {
    pub fn new() -> Self { Self::default() }
    pub fn count(&self) -> usize { self.kinds.len() }

    /// Returns the id for `name`, creating an `Undefined` node on first mention.
    pub fn intern(&mut self, name: &str) -> NodeId {
        if let Some(&id) = self.names.get(name) {
            return id;
        }
        let id = NodeId::new(self.kinds.len());
        self.names.insert(name.to_string(), id);

        self.kinds.push(NodeKind::Undefined);
        self.meta.push(NodeMetadata { name: name.to_string(), line: None });
        self.parents_ranges.push((self.parents_flat.len() as u32, 0));
        self.dependents.push(SmallVec::new());
        id
    }

    pub fn lookup(&self, name: &str) -> Option<NodeId> {
        self.names.get(name).copied()
    }

    pub fn is_declared(&self, id: NodeId) -> bool {
        self.meta[id.index()].line.is_some()
    }

    /// Attaches a definition to an interned node.
    pub fn define(&mut self, id: NodeId, kind: NodeKind, parents: &[NodeId], line: usize) {
        let idx = id.index();
        let start = self.parents_flat.len() as u32;
        self.parents_flat.extend_from_slice(parents);
        self.parents_ranges[idx] = (start, parents.len() as u32);
        self.kinds[idx] = kind;
        self.meta[idx].line = Some(line);
        self.declaration_order.push(id);
    }

    /// Rebuilds the reverse index from the current formulas, in declaration order.
    pub fn build_reverse_index(&mut self) {
        for list in &mut self.dependents {
            list.clear();
        }
        for i in 0..self.declaration_order.len() {
            let via = self.declaration_order[i];
            let Some([lhs, rhs]) = self.operands(via) else { continue };
            let NodeKind::Formula(op) = self.kinds[via.index()] else { continue };

            self.dependents[lhs.index()].push(Inversion { via, other: rhs, op, position: Operand::Lhs });
            self.dependents[rhs.index()].push(Inversion { via, other: lhs, op, position: Operand::Rhs });
        }
    }

    #[inline(always)]
    pub fn get_parents(&self, id: NodeId) -> &[NodeId] {
        let (start, count) = self.parents_ranges[id.index()];
        &self.parents_flat[start as usize..(start + count) as usize]
    }

    /// Both operands of a formula node, `None` for literals and undefined nodes.
    pub fn operands(&self, id: NodeId) -> Option<[NodeId; 2]> {
        match (&self.kinds[id.index()], self.get_parents(id)) {
            (NodeKind::Formula(_), &[lhs, rhs]) => Some([lhs, rhs]),
            _ => None,
        }
    }

    pub fn inversions(&self, id: NodeId) -> &[Inversion] {
        &self.dependents[id.index()]
    }

    pub fn kind(&self, id: NodeId) -> &NodeKind { &self.kinds[id.index()] }
    pub fn name(&self, id: NodeId) -> &str { &self.meta[id.index()].name }

    /// Drops the node's literal or operation. The reverse index keeps the
    /// node's equation. Returns `false` if there was nothing to remove.
    pub fn remove_definition(&mut self, id: NodeId) -> bool {
        let idx = id.index();
        if self.kinds[idx] == NodeKind::Undefined {
            return false;
        }
        self.kinds[idx] = NodeKind::Undefined;
        self.parents_ranges[idx].1 = 0;
        true
    }

    /// Replaces the node's definition with a literal.
    pub fn set_literal(&mut self, id: NodeId, value: Value) {
        let idx = id.index();
        self.kinds[idx] = NodeKind::Literal(value);
        self.parents_ranges[idx].1 = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use num::BigRational;

    fn int(v: i64) -> Value { BigRational::from_integer(v.into()) }

    #[test]
    fn test_intern_is_stable() {
        let mut reg = Registry::new();
        let a = reg.intern("a");
        let b = reg.intern("b");
        assert_eq!(reg.intern("a"), a);
        assert_ne!(a, b);
        assert_eq!(reg.count(), 2);
        assert!(!reg.is_declared(a));
    }

    #[test]
    fn test_reverse_index_follows_declaration_order() {
        // c = a + b, d = b * a (declared c first)
        let mut reg = Registry::new();
        let c = reg.intern("c");
        let a = reg.intern("a");
        let b = reg.intern("b");
        reg.define(c, NodeKind::Formula(Operation::Add), &[a, b], 1);
        let d = reg.intern("d");
        reg.define(d, NodeKind::Formula(Operation::Multiply), &[b, a], 2);
        reg.define(a, NodeKind::Literal(int(1)), &[], 3);
        reg.build_reverse_index();

        let via_a: Vec<_> = reg.inversions(a).iter().map(|inv| (inv.via, inv.other, inv.position)).collect();
        assert_eq!(via_a, vec![(c, b, Operand::Lhs), (d, b, Operand::Rhs)]);
        assert!(reg.inversions(c).is_empty());
    }

    #[test]
    fn test_removed_definition_keeps_equation() {
        let mut reg = Registry::new();
        let r = reg.intern("r");
        let x = reg.intern("x");
        let y = reg.intern("y");
        reg.define(r, NodeKind::Formula(Operation::Subtract), &[x, y], 1);
        reg.build_reverse_index();

        assert!(reg.remove_definition(r));
        assert!(!reg.remove_definition(r));
        assert_eq!(reg.operands(r), None);
        assert!(reg.get_parents(r).is_empty());
        assert_eq!(reg.inversions(x).len(), 1);
        assert_eq!(reg.inversions(y)[0].op, Operation::Subtract);

        reg.set_literal(r, int(9));
        assert_eq!(reg.kind(r), &NodeKind::Literal(int(9)));
    }
}
