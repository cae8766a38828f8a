//! Binary and unary operator implementations.
//!
//! The kernel dispatches on the operand tags a binary node resolved at
//! construction (or derived from the live values). A tag only selects the
//! promotion. A resolved tag that disagrees with its live value is widened to
//! cover the value, so a value wider than its declared type is never
//! truncated, and a value of another kind is reported under its own tag.

use alloc::format;
use core::cmp::Ordering;

use num_bigint::{BigInt, Sign};
use num_traits::{ToPrimitive, Zero};
use rust_decimal::{Decimal, MathematicalOps};

use crate::conversion::ConversionRegistry;
use crate::evaluator::RuntimeError;
use crate::parser::{Operator, UnaryOp};
use crate::types::TypeTag;
use crate::values::Value;

/// Largest shift distance or exponent accepted for arbitrary-precision
/// operands.
const MAX_BIG_EXPONENT: u32 = i32::MAX as u32;

/// Apply `op` to two evaluated operands.
pub fn do_operation<'a>(
    op: Operator,
    l_tag: TypeTag,
    left: &Value<'a>,
    r_tag: TypeTag,
    right: &Value<'a>,
    conversions: &ConversionRegistry,
) -> Result<Value<'a>, RuntimeError> {
    let (l_tag, r_tag) = (live_tag(l_tag, left), live_tag(r_tag, right));

    if op == Operator::Add && (l_tag == TypeTag::Str || r_tag == TypeTag::Str) {
        return Ok(Value::str(format!("{}{}", left, right)));
    }

    if left.is_null() || right.is_null() {
        return match op {
            Operator::Eq => Ok(Value::Boolean(left.is_null() && right.is_null())),
            Operator::Neq => Ok(Value::Boolean(left.is_null() != right.is_null())),
            _ => Err(RuntimeError::NullOperand { op }),
        };
    }

    match op {
        Operator::Eq => return Ok(Value::Boolean(equals(l_tag, left, r_tag, right, conversions))),
        Operator::Neq => {
            return Ok(Value::Boolean(!equals(l_tag, left, r_tag, right, conversions)));
        }
        Operator::And | Operator::Or => {
            let (l, r) =
                both(left, right, Value::as_bool).ok_or_else(|| incompatible(op, l_tag, r_tag))?;
            let result = if op == Operator::And { l && r } else { l || r };
            return Ok(Value::Boolean(result));
        }
        _ => {}
    }

    // A string meeting a number outside concatenation is read as that number.
    let converted;
    let (l_tag, left, r_tag, right) = match (l_tag, r_tag) {
        (TypeTag::Str, tag) if tag.is_numeric() => {
            converted = conversions.convert(left, tag.to_type())?;
            (tag, &converted, r_tag, right)
        }
        (tag, TypeTag::Str) if tag.is_numeric() => {
            converted = conversions.convert(right, tag.to_type())?;
            (l_tag, left, tag, &converted)
        }
        _ => (l_tag, left, r_tag, right),
    };

    match op {
        Operator::Lt => Ok(Value::Boolean(
            ordering(op, l_tag, left, r_tag, right)? == Some(Ordering::Less),
        )),
        Operator::Gt => Ok(Value::Boolean(
            ordering(op, l_tag, left, r_tag, right)? == Some(Ordering::Greater),
        )),
        Operator::Le => Ok(Value::Boolean(matches!(
            ordering(op, l_tag, left, r_tag, right)?,
            Some(Ordering::Less | Ordering::Equal)
        ))),
        Operator::Ge => Ok(Value::Boolean(matches!(
            ordering(op, l_tag, left, r_tag, right)?,
            Some(Ordering::Greater | Ordering::Equal)
        ))),
        op if op.is_arithmetic() => arithmetic(op, l_tag, left, r_tag, right),
        _ => bitwise(op, l_tag, left, r_tag, right),
    }
}

/// Apply a prefix operator to an evaluated operand.
pub fn do_unary<'a>(op: UnaryOp, value: &Value<'a>) -> Result<Value<'a>, RuntimeError> {
    let result = match (op, value) {
        (UnaryOp::Not, Value::Boolean(b)) => Value::Boolean(!b),
        (UnaryOp::Neg, Value::Char(c)) => Value::Int(-(*c as i32)),
        (UnaryOp::Neg, Value::Byte(n)) => Value::Byte(n.wrapping_neg()),
        (UnaryOp::Neg, Value::Short(n)) => Value::Short(n.wrapping_neg()),
        (UnaryOp::Neg, Value::Int(n)) => Value::Int(n.wrapping_neg()),
        (UnaryOp::Neg, Value::Long(n)) => Value::Long(n.wrapping_neg()),
        (UnaryOp::Neg, Value::Float(n)) => Value::Float(-n),
        (UnaryOp::Neg, Value::Double(n)) => Value::Double(-n),
        (UnaryOp::Neg, Value::BigInteger(n)) => Value::BigInteger(-n),
        (UnaryOp::Neg, Value::BigDecimal(n)) => Value::BigDecimal(-n),
        _ => {
            return Err(RuntimeError::InvalidUnaryOperand {
                op,
                operand: TypeTag::of_value(value),
            });
        }
    };
    Ok(result)
}

/// The tag to dispatch `value` on. Nulls keep the node's tag.
fn live_tag(tag: TypeTag, value: &Value<'_>) -> TypeTag {
    let actual = TypeTag::of_value(value);
    if actual == tag || value.is_null() {
        return tag;
    }
    TypeTag::widen(tag, actual).unwrap_or(actual)
}

fn both<'a, T>(
    left: &Value<'a>,
    right: &Value<'a>,
    view: impl Fn(&Value<'a>) -> Option<T>,
) -> Option<(T, T)> {
    Some((view(left)?, view(right)?))
}

fn incompatible(op: Operator, left: TypeTag, right: TypeTag) -> RuntimeError {
    RuntimeError::IncompatibleOperands { op, left, right }
}

fn equals<'a>(
    l_tag: TypeTag,
    left: &Value<'a>,
    r_tag: TypeTag,
    right: &Value<'a>,
    conversions: &ConversionRegistry,
) -> bool {
    let coercible = |tag: TypeTag| !matches!(tag, TypeTag::Str | TypeTag::Object | TypeTag::Null);

    // A string that does not read as the other side's type is simply unequal.
    if l_tag == TypeTag::Str && coercible(r_tag) {
        return conversions
            .convert(left, r_tag.to_type())
            .is_ok_and(|l| equals(r_tag, &l, r_tag, right, conversions));
    }
    if r_tag == TypeTag::Str && coercible(l_tag) {
        return conversions
            .convert(right, l_tag.to_type())
            .is_ok_and(|r| equals(l_tag, left, l_tag, &r, conversions));
    }

    // Host objects may be read from strings by a conversion handler.
    if let (TypeTag::Str, Value::Object(_)) = (l_tag, right) {
        return conversions
            .convert(left, right.ty())
            .is_ok_and(|l| l == *right);
    }
    if let (Value::Object(_), TypeTag::Str) = (left, r_tag) {
        return conversions
            .convert(right, left.ty())
            .is_ok_and(|r| *left == r);
    }

    match TypeTag::widen(l_tag, r_tag) {
        Some(TypeTag::Float | TypeTag::Double) => {
            both(left, right, Value::to_f64).is_some_and(|(l, r)| l == r)
        }
        Some(TypeTag::BigInteger) => both(left, right, Value::to_bigint).is_some_and(|(l, r)| l == r),
        Some(TypeTag::BigDecimal) => {
            both(left, right, Value::to_decimal).is_some_and(|(l, r)| l == r)
        }
        Some(_) => both(left, right, Value::to_i64).is_some_and(|(l, r)| l == r),
        None => left == right,
    }
}

fn ordering<'a>(
    op: Operator,
    l_tag: TypeTag,
    left: &Value<'a>,
    r_tag: TypeTag,
    right: &Value<'a>,
) -> Result<Option<Ordering>, RuntimeError> {
    let err = || incompatible(op, l_tag, r_tag);

    if l_tag == TypeTag::Str && r_tag == TypeTag::Str {
        let (Some(l), Some(r)) = (left.as_str(), right.as_str()) else {
            return Err(err());
        };
        return Ok(Some(l.cmp(r)));
    }

    let ordering = match TypeTag::widen(l_tag, r_tag).ok_or_else(err)? {
        TypeTag::Float | TypeTag::Double => {
            let (l, r) = both(left, right, Value::to_f64).ok_or_else(err)?;
            // NaN is unordered: every comparison with it is false.
            l.partial_cmp(&r)
        }
        TypeTag::BigInteger => {
            let (l, r) = both(left, right, Value::to_bigint).ok_or_else(err)?;
            Some(l.cmp(&r))
        }
        TypeTag::BigDecimal => {
            let (l, r) = both(left, right, Value::to_decimal).ok_or_else(err)?;
            Some(l.cmp(&r))
        }
        _ => {
            let (l, r) = both(left, right, Value::to_i64).ok_or_else(err)?;
            Some(l.cmp(&r))
        }
    };
    Ok(ordering)
}

fn arithmetic<'a>(
    op: Operator,
    l_tag: TypeTag,
    left: &Value<'a>,
    r_tag: TypeTag,
    right: &Value<'a>,
) -> Result<Value<'a>, RuntimeError> {
    let err = || incompatible(op, l_tag, r_tag);
    let tag = TypeTag::widen(l_tag, r_tag).ok_or_else(err)?;

    let value = match tag {
        TypeTag::Float | TypeTag::Double => {
            let (l, r) = both(left, right, Value::to_f64).ok_or_else(err)?;
            let result = eval_binary_float(op, l, r).ok_or_else(err)?;
            if tag == TypeTag::Float {
                Value::Float(result as f32)
            } else {
                Value::Double(result)
            }
        }
        TypeTag::BigInteger => {
            let (l, r) = both(left, right, Value::to_bigint).ok_or_else(err)?;
            Value::BigInteger(eval_binary_bigint(op, l, r).ok_or_else(err)??)
        }
        TypeTag::BigDecimal => {
            let (l, r) = both(left, right, Value::to_decimal).ok_or_else(err)?;
            Value::BigDecimal(eval_binary_decimal(op, l, r).ok_or_else(err)??)
        }
        _ => {
            let (l, r) = both(left, right, Value::to_i64).ok_or_else(err)?;
            let result = eval_binary_int(op, l, r).ok_or_else(err)??;
            // Narrower kinds wrap the same way their native arithmetic does.
            match tag {
                TypeTag::Long => Value::Long(result),
                TypeTag::Short => Value::Short(result as i16),
                TypeTag::Byte => Value::Byte(result as i8),
                _ => Value::Int(result as i32),
            }
        }
    };
    Ok(value)
}

/// Evaluate an arithmetic operation on two integers.
///
/// Uses wrapping arithmetic to prevent panics on overflow. Returns `None` for
/// operators that are not arithmetic.
fn eval_binary_int(op: Operator, left: i64, right: i64) -> Option<Result<i64, RuntimeError>> {
    let result = match op {
        Operator::Add => Ok(left.wrapping_add(right)),
        Operator::Sub => Ok(left.wrapping_sub(right)),
        Operator::Mul => Ok(left.wrapping_mul(right)),
        Operator::Div | Operator::Mod if right == 0 => Err(RuntimeError::DivisionByZero),
        // wrapping_div handles i64::MIN / -1
        Operator::Div => Ok(left.wrapping_div(right)),
        Operator::Mod => Ok(left.wrapping_rem(right)),
        Operator::Pow => {
            if right < 0 || right > u32::MAX as i64 {
                // Negative exponents floor to zero; huge ones are treated the same.
                Ok(0)
            } else {
                Ok(left.wrapping_pow(right as u32))
            }
        }
        _ => return None,
    };
    Some(result)
}

/// Evaluate an arithmetic operation on two floats.
///
/// Follows IEEE 754 semantics (produces inf/nan rather than failing).
fn eval_binary_float(op: Operator, left: f64, right: f64) -> Option<f64> {
    let result = match op {
        Operator::Add => left + right,
        Operator::Sub => left - right,
        Operator::Mul => left * right,
        Operator::Div => left / right,
        Operator::Mod => left % right,
        Operator::Pow => left.powf(right),
        _ => return None,
    };
    Some(result)
}

fn eval_binary_bigint(
    op: Operator,
    left: BigInt,
    right: BigInt,
) -> Option<Result<BigInt, RuntimeError>> {
    let result = match op {
        Operator::Add => Ok(left + right),
        Operator::Sub => Ok(left - right),
        Operator::Mul => Ok(left * right),
        Operator::Div | Operator::Mod if right.is_zero() => Err(RuntimeError::DivisionByZero),
        Operator::Div => Ok(left / right),
        Operator::Mod => Ok(left % right),
        Operator::Pow if right.sign() == Sign::Minus => Ok(BigInt::zero()),
        Operator::Pow => match right.to_u32() {
            Some(exponent) if exponent <= MAX_BIG_EXPONENT => Ok(left.pow(exponent)),
            _ => Err(RuntimeError::Overflow { op }),
        },
        _ => return None,
    };
    Some(result)
}

fn eval_binary_decimal(
    op: Operator,
    left: Decimal,
    right: Decimal,
) -> Option<Result<Decimal, RuntimeError>> {
    let result = match op {
        Operator::Add => left.checked_add(right),
        Operator::Sub => left.checked_sub(right),
        Operator::Mul => left.checked_mul(right),
        Operator::Div | Operator::Mod if right.is_zero() => {
            return Some(Err(RuntimeError::DivisionByZero));
        }
        Operator::Div => left.checked_div(right),
        Operator::Mod => left.checked_rem(right),
        Operator::Pow => left.checked_powd(right),
        _ => return None,
    };
    Some(result.ok_or(RuntimeError::Overflow { op }))
}

fn bitwise<'a>(
    op: Operator,
    l_tag: TypeTag,
    left: &Value<'a>,
    r_tag: TypeTag,
    right: &Value<'a>,
) -> Result<Value<'a>, RuntimeError> {
    let err = || incompatible(op, l_tag, r_tag);

    if l_tag == TypeTag::Boolean && r_tag == TypeTag::Boolean {
        let (l, r) = both(left, right, Value::as_bool).ok_or_else(err)?;
        return match op {
            Operator::BitAnd => Ok(Value::Boolean(l & r)),
            Operator::BitOr => Ok(Value::Boolean(l | r)),
            Operator::BitXor => Ok(Value::Boolean(l ^ r)),
            _ => Err(err()),
        };
    }
    if !l_tag.is_integral() || !r_tag.is_integral() {
        return Err(err());
    }

    if l_tag == TypeTag::BigInteger || r_tag == TypeTag::BigInteger {
        let (l, r) = both(left, right, Value::to_bigint).ok_or_else(err)?;
        let shift = |r: &BigInt| match r.to_u32() {
            Some(distance) if distance <= MAX_BIG_EXPONENT => Ok(distance as usize),
            _ => Err(RuntimeError::Overflow { op }),
        };
        let result = match op {
            Operator::BitAnd => l & r,
            Operator::BitOr => l | r,
            Operator::BitXor => l ^ r,
            Operator::Shl => l << shift(&r)?,
            Operator::Shr => l >> shift(&r)?,
            _ => return Err(err()),
        };
        return Ok(Value::BigInteger(result));
    }

    let (l, r) = both(left, right, Value::to_i64).ok_or_else(err)?;
    if l_tag == TypeTag::Long || r_tag == TypeTag::Long {
        // Shift distances are masked to the width of the promoted type.
        let distance = (r & 0x3f) as u32;
        let result = match op {
            Operator::BitAnd => l & r,
            Operator::BitOr => l | r,
            Operator::BitXor => l ^ r,
            Operator::Shl => l.wrapping_shl(distance),
            Operator::Shr => l.wrapping_shr(distance),
            Operator::UShr => ((l as u64) >> distance) as i64,
            _ => return Err(err()),
        };
        Ok(Value::Long(result))
    } else {
        let (l, r) = (l as i32, r as i32);
        let distance = (r & 0x1f) as u32;
        let result = match op {
            Operator::BitAnd => l & r,
            Operator::BitOr => l | r,
            Operator::BitXor => l ^ r,
            Operator::Shl => l.wrapping_shl(distance),
            Operator::Shr => l.wrapping_shr(distance),
            Operator::UShr => ((l as u32) >> distance) as i32,
            _ => return Err(err()),
        };
        Ok(Value::Int(result))
    }
}
