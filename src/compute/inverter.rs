//! Algebraic inversion of a single binary operation.
//!
//! Given `result = lhs op rhs` with `result` and one operand known, recovers
//! the other operand:
//!
//! | op | solve lhs        | solve rhs        |
//! |----|------------------|------------------|
//! | +  | result - rhs     | result - lhs     |
//! | -  | result + rhs     | lhs - result     |
//! | *  | result / rhs     | result / lhs     |
//! | /  | result * rhs     | lhs / result     |
use super::kernel::{divide, DivisionByZero};
use crate::store::{Operand, Operation, Value};

/// Solves for the operand at `unknown`, given the `result` and the `known`
/// value of the opposite operand.
pub fn invert(
    op: Operation,
    result: &Value,
    known: &Value,
    unknown: Operand,
) -> Result<Value, DivisionByZero> {
    match (op, unknown) {
        (Operation::Add, _) => Ok(result - known),
        (Operation::Subtract, Operand::Lhs) => Ok(result + known),
        (Operation::Subtract, Operand::Rhs) => Ok(known - result),
        (Operation::Multiply, _) => divide(result, known),
        (Operation::Divide, Operand::Lhs) => Ok(result * known),
        (Operation::Divide, Operand::Rhs) => divide(known, result),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compute::kernel::apply;
    use num::BigRational;
    use rstest::rstest;

    fn int(v: i64) -> Value { BigRational::from_integer(v.into()) }

    #[rstest]
    #[case(Operation::Add, 12, 5, Operand::Lhs, 7)]
    #[case(Operation::Add, 12, 5, Operand::Rhs, 7)]
    #[case(Operation::Subtract, 2, 5, Operand::Lhs, 7)] // x - 5 = 2
    #[case(Operation::Subtract, 2, 5, Operand::Rhs, 3)] // 5 - x = 2
    #[case(Operation::Multiply, 35, 5, Operand::Lhs, 7)]
    #[case(Operation::Multiply, 35, 7, Operand::Rhs, 5)]
    #[case(Operation::Divide, 3, 4, Operand::Lhs, 12)] // x / 4 = 3
    #[case(Operation::Divide, 3, 12, Operand::Rhs, 4)] // 12 / x = 3
    fn test_inversion_table(
        #[case] op: Operation,
        #[case] result: i64,
        #[case] known: i64,
        #[case] unknown: Operand,
        #[case] expected: i64,
    ) {
        assert_eq!(invert(op, &int(result), &int(known), unknown), Ok(int(expected)));
    }

    #[test]
    fn test_inversion_is_exact() {
        // 4 / x = 3  =>  x = 4/3
        let x = invert(Operation::Divide, &int(3), &int(4), Operand::Rhs).unwrap();
        assert_eq!(x, BigRational::new(4.into(), 3.into()));
        assert_eq!(apply(Operation::Divide, &int(4), &x), Ok(int(3)));
    }

    #[rstest]
    #[case(Operation::Multiply, 0, 0, Operand::Lhs)]
    #[case(Operation::Multiply, 6, 0, Operand::Rhs)]
    #[case(Operation::Divide, 0, 5, Operand::Rhs)] // 5 / x = 0
    fn test_zero_divisor(
        #[case] op: Operation,
        #[case] result: i64,
        #[case] known: i64,
        #[case] unknown: Operand,
    ) {
        assert_eq!(invert(op, &int(result), &int(known), unknown), Err(DivisionByZero));
    }

    #[test]
    fn test_divide_lhs_with_zero_result_is_fine() {
        // x / 7 = 0  =>  x = 0
        assert_eq!(invert(Operation::Divide, &int(0), &int(7), Operand::Lhs), Ok(int(0)));
    }
}
