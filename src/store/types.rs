use num::BigRational;
use std::fmt;

/// Exact value of a node. Integer literals are lifted to rationals so that
/// division never truncates.
pub type Value = BigRational;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct NodeId(pub u32);

impl NodeId {
    #[inline(always)]
    pub fn index(&self) -> usize { self.0 as usize }
    pub fn new(idx: usize) -> Self { Self(idx as u32) }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NodeMetadata {
    pub name: String,
    /// 1-based line of the declaration, `None` for names only used as operands.
    pub line: Option<usize>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Add,
    Subtract,
    Multiply,
    Divide,
}

impl Operation {
    pub fn from_symbol(symbol: &str) -> Option<Self> {
        match symbol {
            "+" => Some(Operation::Add),
            "-" => Some(Operation::Subtract),
            "*" => Some(Operation::Multiply),
            "/" => Some(Operation::Divide),
            _ => None,
        }
    }

    pub fn symbol(&self) -> char {
        match self {
            Operation::Add => '+',
            Operation::Subtract => '-',
            Operation::Multiply => '*',
            Operation::Divide => '/',
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

/// Which side of `lhs op rhs` a node occupies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operand {
    Lhs,
    Rhs,
}

#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    Literal(Value),
    /// Operands live in the registry's parent arrays.
    Formula(Operation),
    /// Referenced but never declared, or definition removed.
    Undefined,
}

/// One entry of the reverse index: `via = lhs op rhs`, where the indexed node
/// sits at `position` and `other` is the remaining operand.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Inversion {
    pub via: NodeId,
    pub other: NodeId,
    pub op: Operation,
    pub position: Operand,
}
