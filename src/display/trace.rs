use crate::compute::ledger::{Derivation, Ledger};
use crate::store::{NodeId, NodeKind, Operand, Registry};
use std::collections::HashMap;
use std::fmt::Write;

/// Renders how `target` got its value as an indented tree.
pub fn format_trace(registry: &Registry, ledger: &Ledger, target: NodeId) -> String {
    let mut tracer = Tracer {
        registry,
        ledger,
        visited_at_level: HashMap::new(),
        output: String::new(),
    };

    if target.index() < registry.count() {
        let _ = writeln!(tracer.output, "DERIVATION for node '{}':", registry.name(target));
        let _ = writeln!(tracer.output, "--------------------------------------------------");
        tracer.trace_node(target, 1, "");
    } else {
        let _ = writeln!(tracer.output, "Error: Invalid Node ID {:?}", target);
    }
    tracer.output
}

struct Tracer<'a> {
    registry: &'a Registry,
    ledger: &'a Ledger,
    visited_at_level: HashMap<NodeId, usize>,
    output: String,
}

impl<'a> Tracer<'a> {
    fn trace_node(&mut self, node_id: NodeId, level: usize, prefix: &str) {
        if let Some(&first_seen) = self.visited_at_level.get(&node_id) {
            let _ = writeln!(self.output, "{}-> (Ref to L{})", prefix, first_seen);
            return;
        }
        self.visited_at_level.insert(node_id, level);

        let registry = self.registry;
        let line_header = format!("[L{}] {} = {}", level, registry.name(node_id), self.format_value(node_id));

        match self.ledger.derivation(node_id) {
            None => {
                let _ = writeln!(self.output, "{}{}", prefix, line_header);
            }
            Some(Derivation::Literal) => {
                let _ = writeln!(self.output, "{}{} -> Literal", prefix, line_header);
            }
            Some(Derivation::Forward) => {
                let parents = registry.get_parents(node_id);
                let formula = match registry.kind(node_id) {
                    NodeKind::Formula(op) if parents.len() == 2 => {
                        format!("{} {} {}", self.format_ref(parents[0]), op, self.format_ref(parents[1]))
                    }
                    _ => "?".to_string(),
                };
                let _ = writeln!(self.output, "{}{} <- {}", prefix, line_header, formula);
                self.recurse_children(prefix, parents, level);
            }
            Some(Derivation::Inverted { via, other }) => {
                let equation = self.format_equation(node_id, via, other);
                let _ = writeln!(self.output, "{}{} <- inverted from {}", prefix, line_header, equation);
                self.recurse_children(prefix, &[via, other], level);
            }
        }
    }

    fn recurse_children(&mut self, prefix: &str, children: &[NodeId], level: usize) {
        let stem = self.build_child_stem(prefix);
        for (i, &child) in children.iter().enumerate() {
            let connector = if i == children.len() - 1 { "`--" } else { "|--" };
            let full_prefix = format!("{}{}", stem, connector);
            self.trace_node(child, level + 1, &full_prefix);
        }
    }

    /// The declared equation `via = lhs op rhs` that `node_id` was backed out of.
    fn format_equation(&self, node_id: NodeId, via: NodeId, other: NodeId) -> String {
        let found = self.registry.inversions(node_id).iter()
            .find(|inv| inv.via == via && inv.other == other);
        match found {
            Some(inv) => {
                let (lhs, rhs) = match inv.position {
                    Operand::Lhs => (node_id, other),
                    Operand::Rhs => (other, node_id),
                };
                format!(
                    "{} = {} {} {}",
                    self.format_ref(via),
                    self.registry.name(lhs),
                    inv.op,
                    self.registry.name(rhs)
                )
            }
            None => format!("{} with {}", self.registry.name(via), self.registry.name(other)),
        }
    }

    fn format_ref(&self, id: NodeId) -> String {
        format!("{}[{}]", self.registry.name(id), self.format_value(id))
    }

    fn format_value(&self, id: NodeId) -> String {
        match self.ledger.get(id) {
            Some(v) => v.to_string(),
            None => "?".to_string(),
        }
    }

    fn build_child_stem(&self, current_prefix: &str) -> String {
        current_prefix.replace("`--", "   ").replace("|--", "|  ")
    }
}
