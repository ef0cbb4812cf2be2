//! Graph loader.
//!
//! Each line declares one node, either `name: 42` or `name: lhs + rhs` with
//! one of `+ - * /`. Operands may be declared after their first use. Every
//! line is checked before the graph is handed out, so a malformed input never
//! reaches evaluation.
use crate::store::{NodeId, NodeKind, Operation, Registry, Value};
use num::{BigInt, BigRational};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LoadError {
    #[error("Malformed line {line}: {reason} in '{content}'")]
    MalformedLine { line: usize, content: String, reason: &'static str },
    #[error("Node '{name}' is defined again on line {line}")]
    DuplicateNode { name: String, line: usize },
}

/// A single parsed declaration, before names are resolved to ids.
#[derive(Debug, Clone, PartialEq)]
enum Declaration<'s> {
    Literal { name: &'s str, value: Value },
    Formula { name: &'s str, op: Operation, lhs: &'s str, rhs: &'s str },
}

impl<'s> Declaration<'s> {
    fn name(&self) -> &'s str {
        match self {
            Declaration::Literal { name, .. } | Declaration::Formula { name, .. } => *name,
        }
    }
}

/// Parses the whole text into a graph and builds its reverse index.
pub fn load(text: &str) -> Result<Registry, LoadError> {
    let mut registry = Registry::new();

    for (i, raw) in text.lines().enumerate() {
        let line = i + 1;
        let decl = parse_line(raw).map_err(|reason| LoadError::MalformedLine {
            line,
            content: raw.to_string(),
            reason,
        })?;

        let id = registry.intern(decl.name());
        if registry.is_declared(id) {
            return Err(LoadError::DuplicateNode { name: decl.name().to_string(), line });
        }

        match decl {
            Declaration::Literal { value, .. } => {
                registry.define(id, NodeKind::Literal(value), &[], line);
            }
            Declaration::Formula { op, lhs, rhs, .. } => {
                let parents: [NodeId; 2] = [registry.intern(lhs), registry.intern(rhs)];
                registry.define(id, NodeKind::Formula(op), &parents, line);
            }
        }
    }

    registry.build_reverse_index();
    Ok(registry)
}

fn parse_line(raw: &str) -> Result<Declaration<'_>, &'static str> {
    if raw.trim().is_empty() {
        return Err("blank line");
    }
    let (name, content) = raw.split_once(':').ok_or("missing ':' separator")?;
    let name = name.trim();
    if !is_name(name) {
        return Err("invalid node name");
    }

    let tokens: Vec<&str> = content.split_whitespace().collect();
    match tokens[..] {
        [literal] => {
            let value = parse_integer(literal).ok_or("expected an integer or 'lhs op rhs'")?;
            Ok(Declaration::Literal { name, value })
        }
        [lhs, symbol, rhs] => {
            let op = Operation::from_symbol(symbol).ok_or("unrecognized operator")?;
            if !is_name(lhs) || !is_name(rhs) {
                return Err("invalid operand name");
            }
            Ok(Declaration::Formula { name, op, lhs, rhs })
        }
        [] => Err("missing definition"),
        _ => Err("expected an integer or 'lhs op rhs'"),
    }
}

fn is_name(s: &str) -> bool {
    !s.is_empty() && s.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
}

fn parse_integer(s: &str) -> Option<Value> {
    let digits = s.strip_prefix('-').unwrap_or(s);
    if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    s.parse::<BigInt>().ok().map(BigRational::from_integer)
}
