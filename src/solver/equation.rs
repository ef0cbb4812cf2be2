//! Turns the root's operation into an equality and solves for the unknown.
use super::propagator::{Mode, Propagator};
use crate::compute::ledger::{ComputationError, Ledger};
use crate::store::{NodeId, Registry, Value};
use tracing::{info, warn};

/// Result of an equality solve: the unknown's value and the ledger that
/// records how every touched node was derived.
#[derive(Debug, Clone)]
pub struct Solved {
    pub unknown: NodeId,
    pub value: Value,
    pub ledger: Ledger,
}

fn require(graph: &Registry, name: &str) -> Result<NodeId, ComputationError> {
    graph.lookup(name).ok_or_else(|| ComputationError::UnknownNode { name: name.to_string() })
}

/// Solves `unknown` such that both operands of `root` are equal.
///
/// The unknown's definition and the root's operation are removed from
/// `graph` (their equations stay in the reverse index). Both sides of the
/// root are evaluated forward; the side that depends on the unknown fails and
/// is pinned to the other side's value. The unknown is then solved with
/// inversion enabled, starting from an empty ledger.
pub fn solve_equality(graph: &mut Registry, root: &str, unknown: &str) -> Result<Solved, ComputationError> {
    let root_id = require(graph, root)?;
    let unknown_id = require(graph, unknown)?;
    let [lhs, rhs] = graph.operands(root_id)
        .ok_or_else(|| ComputationError::NotAnEquation { name: root.to_string() })?;

    graph.remove_definition(unknown_id);
    graph.remove_definition(root_id);

    let (lhs_value, rhs_value) = {
        let mut forward = Propagator::new(graph, Some(unknown_id), Mode::ForwardOnly);
        (forward.try_solve(lhs)?, forward.try_solve(rhs)?)
    };

    let pinned = match (lhs_value, rhs_value) {
        (Some(value), None) => Some((rhs, value)),
        (None, Some(value)) => Some((lhs, value)),
        (None, None) => {
            warn!(root, "neither side of the root can be evaluated without the unknown");
            return Err(ComputationError::Unsolvable { name: root.to_string() });
        }
        (Some(_), Some(_)) => {
            warn!(root, unknown, "both sides of the root evaluate without the unknown");
            None
        }
    };

    // Pinning the unknown itself settles it; otherwise it stays shadowed.
    let mut shadowed = Some(unknown_id);
    if let Some((side, value)) = pinned {
        info!(side = graph.name(side), value = %value, "pinning failed side of the root");
        if side == unknown_id {
            shadowed = None;
        }
        graph.set_literal(side, value);
    }

    let mut reverse = Propagator::new(graph, shadowed, Mode::Reverse);
    let value = reverse.solve_node(unknown_id)?;
    info!(unknown, value = %value, "solved unknown");
    Ok(Solved { unknown: unknown_id, value, ledger: reverse.into_ledger() })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compute::Derivation;
    use crate::compute::Evaluator;
    use crate::parse::load;
    use num::BigRational;

    const SAMPLE: &str = "root: pppw + sjmn
dbpl: 5
cczh: sllz + lgvd
zczc: 2
ptdq: humn - dvpt
dvpt: 3
lfqf: 4
humn: 5
ljgn: 2
sjmn: drzm * dbpl
sllz: 4
pppw: cczh / lfqf
lgvd: ljgn * ptdq
drzm: hmdt - zczc
hmdt: 32";

    fn int(v: i64) -> Value { BigRational::from_integer(v.into()) }

    #[test]
    fn test_sample_both_phases() {
        let mut graph = load(SAMPLE).unwrap();
        assert_eq!(Evaluator::new(&graph).evaluate("root"), Ok(int(152)));

        let solved = solve_equality(&mut graph, "root", "humn").unwrap();
        assert_eq!(solved.value, int(301));

        let pppw = graph.lookup("pppw").unwrap();
        assert_eq!(graph.kind(pppw), &crate::store::NodeKind::Literal(int(150)));
        let ptdq = graph.lookup("ptdq").unwrap();
        assert!(matches!(
            solved.ledger.derivation(solved.unknown),
            Some(Derivation::Inverted { via, .. }) if via == ptdq
        ));
    }

    #[test]
    fn test_round_trip_recovers_removed_literal() {
        let text = "root: left * right\nleft: a + b\nright: c / d\na: 7\nb: 11\nc: 90\nd: e - f\ne: 20\nf: 5";
        let original = load(text).unwrap();
        let mut graph = original.clone();
        // left == right  needs  c / d == 18  =>  c == 270
        let solved = solve_equality(&mut graph, "root", "c").unwrap();
        assert_eq!(solved.value, int(270));

        // Restoring the literal makes both sides agree.
        let mut check = original;
        let c = check.lookup("c").unwrap();
        check.set_literal(c, solved.value.clone());
        let mut eval = Evaluator::new(&check);
        assert_eq!(eval.evaluate("left"), eval.evaluate("right"));
    }

    #[test]
    fn test_unknown_directly_under_root() {
        let mut graph = load("root: x + y\nx: 3\ny: 4").unwrap();
        let solved = solve_equality(&mut graph, "root", "y").unwrap();
        assert_eq!(solved.value, int(3));
        assert_eq!(solved.ledger.derivation(solved.unknown), Some(Derivation::Literal));
    }

    #[test]
    fn test_root_must_be_an_operation() {
        let mut graph = load("root: 5\nhumn: 1").unwrap();
        assert_eq!(
            solve_equality(&mut graph, "root", "humn").unwrap_err(),
            ComputationError::NotAnEquation { name: "root".into() }
        );
    }

    #[test]
    fn test_missing_names() {
        let mut graph = load("root: a + b\na: 1\nb: 2").unwrap();
        assert_eq!(
            solve_equality(&mut graph, "root", "humn").unwrap_err(),
            ComputationError::UnknownNode { name: "humn".into() }
        );
        assert_eq!(
            solve_equality(&mut graph, "top", "a").unwrap_err(),
            ComputationError::UnknownNode { name: "top".into() }
        );
    }

    #[test]
    fn test_both_sides_depend_on_unknown() {
        let mut graph = load("root: a + b\na: humn * two\nb: humn - one\ntwo: 2\none: 1\nhumn: 4").unwrap();
        assert_eq!(
            solve_equality(&mut graph, "root", "humn").unwrap_err(),
            ComputationError::Unsolvable { name: "root".into() }
        );
    }

    #[test]
    fn test_unknown_outside_the_equation() {
        let mut graph = load("root: a + b\na: 1\nb: 1\nhumn: 5").unwrap();
        assert_eq!(
            solve_equality(&mut graph, "root", "humn").unwrap_err(),
            ComputationError::Unsolvable { name: "humn".into() }
        );
    }

    #[test]
    fn test_fractional_intermediate_is_exact() {
        // 2 * (humn / 4) == 5 passes through h4 = 5/2 on the way to humn = 10.
        let text = "root: p + q\np: two * h4\nh4: humn / four\ntwo: 2\nfour: 4\nq: 5\nhumn: 0";
        let mut graph = load(text).unwrap();
        let solved = solve_equality(&mut graph, "root", "humn").unwrap();
        assert_eq!(solved.value, int(10));
        let h4 = graph.lookup("h4").unwrap();
        assert_eq!(solved.ledger.get(h4), Some(&BigRational::new(5.into(), 2.into())));
    }
}
