use crate::store::{Operation, Value};
use num::Zero;
use thiserror::Error;

/// Raised by the kernel and the inverter; callers attach the node name.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("division by zero")]
pub struct DivisionByZero;

/// Applies a single operator to two exact operands.
#[inline(always)]
pub fn apply(op: Operation, lhs: &Value, rhs: &Value) -> Result<Value, DivisionByZero> {
    match op {
        Operation::Add => Ok(lhs + rhs),
        Operation::Subtract => Ok(lhs - rhs),
        Operation::Multiply => Ok(lhs * rhs),
        Operation::Divide => divide(lhs, rhs),
    }
}

#[inline(always)]
pub(crate) fn divide(lhs: &Value, rhs: &Value) -> Result<Value, DivisionByZero> {
    if rhs.is_zero() {
        return Err(DivisionByZero);
    }
    Ok(lhs / rhs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use num::BigRational;
    use rstest::rstest;

    fn ratio(n: i64, d: i64) -> Value { BigRational::new(n.into(), d.into()) }

    #[rstest]
    #[case(Operation::Add, 3, 4, ratio(7, 1))]
    #[case(Operation::Subtract, 3, 4, ratio(-1, 1))]
    #[case(Operation::Multiply, 3, 4, ratio(12, 1))]
    #[case(Operation::Divide, 10, 4, ratio(5, 2))]
    fn test_apply(#[case] op: Operation, #[case] lhs: i64, #[case] rhs: i64, #[case] expected: Value) {
        assert_eq!(apply(op, &ratio(lhs, 1), &ratio(rhs, 1)), Ok(expected));
    }

    #[test]
    fn test_divide_by_zero() {
        assert_eq!(apply(Operation::Divide, &ratio(1, 1), &ratio(0, 1)), Err(DivisionByZero));
    }
}
