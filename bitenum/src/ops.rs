//! Operator closure: integer operators on flags that stay within the flag set.
//!
//! Every binary operator computes the plain integer result (with the floor
//! semantics of arbitrary-precision integers, in `i128`) and wraps it back
//! through [`FlagSetType::flag`](crate::FlagSetType::flag) of the flag
//! operand. The result is a `Result` because arithmetic can leave the mask:
//!
//! ```
//! use bitenum::{FlagError, FlagSetType};
//!
//! let seq = FlagSetType::declare("Seq { one = 1, two = 2, four = 4, eight = 8 }").unwrap();
//! let two = seq.member("two").unwrap();
//!
//! assert_eq!((two << 2).unwrap(), seq.member("eight").unwrap());
//! assert_eq!((two + 1).unwrap(), seq.flag(3).unwrap());
//! assert!(matches!(two << 3, Err(FlagError::UnknownBits { value: 16, .. })));
//! assert_eq!((12u64 - two).unwrap(), seq.flag(10).unwrap());
//! ```
//!
//! An integer on the left of the operator needs a type suffix (`12u64`,
//! `3u8`, ...). The reflected impls exist for every primitive integer width,
//! so an unsuffixed literal there is ambiguous.
//!
//! Complement is the only infallible operator: `!flag` is taken relative to
//! the mask. There are no `*Assign` impls; flags are values, not
//! accumulators. Code that dispatches operators dynamically goes through
//! [`Flag::apply`], which rejects [`Operator::InPlace`].

use core::fmt;
use core::ops::{Add, BitAnd, BitOr, BitXor, Div, Mul, Not, Rem, Shl, Shr, Sub};
use core::str::FromStr;

use thiserror::Error;

use crate::error::{FlagError, Result};
use crate::flag::Flag;
use crate::operand::Operand;

/// A binary integer operator.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BinaryOp {
    /// `|`
    BitOr,
    /// `&`
    BitAnd,
    /// `^`
    BitXor,
    /// `<<`
    Shl,
    /// `>>`
    Shr,
    /// `+`
    Add,
    /// `-`
    Sub,
    /// `*`
    Mul,
    /// `//`, rounding toward negative infinity.
    FloorDiv,
    /// `%`, taking the sign of the divisor.
    Rem,
    /// `**`
    Pow,
}

impl BinaryOp {
    /// Every binary operator.
    pub const ALL: [BinaryOp; 11] = [
        BinaryOp::BitOr,
        BinaryOp::BitAnd,
        BinaryOp::BitXor,
        BinaryOp::Shl,
        BinaryOp::Shr,
        BinaryOp::Add,
        BinaryOp::Sub,
        BinaryOp::Mul,
        BinaryOp::FloorDiv,
        BinaryOp::Rem,
        BinaryOp::Pow,
    ];

    /// Operator symbol.
    pub const fn symbol(self) -> &'static str {
        match self {
            BinaryOp::BitOr => "|",
            BinaryOp::BitAnd => "&",
            BinaryOp::BitXor => "^",
            BinaryOp::Shl => "<<",
            BinaryOp::Shr => ">>",
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::FloorDiv => "//",
            BinaryOp::Rem => "%",
            BinaryOp::Pow => "**",
        }
    }

    /// Applies the operator to plain integers.
    ///
    /// The error is a short reason: overflow, division by zero, negative
    /// shift count or negative exponent.
    pub fn eval(self, lhs: i128, rhs: i128) -> core::result::Result<i128, &'static str> {
        const OVERFLOW: &str = "integer overflow";
        const DIV_ZERO: &str = "division by zero";

        match self {
            BinaryOp::BitOr => Ok(lhs | rhs),
            BinaryOp::BitAnd => Ok(lhs & rhs),
            BinaryOp::BitXor => Ok(lhs ^ rhs),
            BinaryOp::Shl => {
                if rhs < 0 {
                    return Err("negative shift count");
                }
                if lhs == 0 {
                    return Ok(0);
                }
                if rhs >= i128::from(i128::BITS) {
                    return Err(OVERFLOW);
                }
                let shifted = lhs << rhs;
                if shifted >> rhs != lhs {
                    return Err(OVERFLOW);
                }
                Ok(shifted)
            }
            BinaryOp::Shr => {
                if rhs < 0 {
                    return Err("negative shift count");
                }
                if rhs >= i128::from(i128::BITS) {
                    return Ok(if lhs < 0 { -1 } else { 0 });
                }
                Ok(lhs >> rhs)
            }
            BinaryOp::Add => lhs.checked_add(rhs).ok_or(OVERFLOW),
            BinaryOp::Sub => lhs.checked_sub(rhs).ok_or(OVERFLOW),
            BinaryOp::Mul => lhs.checked_mul(rhs).ok_or(OVERFLOW),
            BinaryOp::FloorDiv => {
                if rhs == 0 {
                    return Err(DIV_ZERO);
                }
                let quotient = lhs.checked_div(rhs).ok_or(OVERFLOW)?;
                if lhs % rhs != 0 && (lhs < 0) != (rhs < 0) {
                    Ok(quotient - 1)
                } else {
                    Ok(quotient)
                }
            }
            BinaryOp::Rem => {
                if rhs == 0 {
                    return Err(DIV_ZERO);
                }
                let rem = lhs.checked_rem(rhs).ok_or(OVERFLOW)?;
                if rem != 0 && (rem < 0) != (rhs < 0) {
                    Ok(rem + rhs)
                } else {
                    Ok(rem)
                }
            }
            BinaryOp::Pow => {
                if rhs < 0 {
                    return Err("negative exponent");
                }
                match lhs {
                    0 => Ok(if rhs == 0 { 1 } else { 0 }),
                    1 => Ok(1),
                    -1 => Ok(if rhs % 2 == 0 { 1 } else { -1 }),
                    _ => {
                        let exp = u32::try_from(rhs).map_err(|_| OVERFLOW)?;
                        lhs.checked_pow(exp).ok_or(OVERFLOW)
                    }
                }
            }
        }
    }
}

impl fmt::Display for BinaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// An operator as named by dynamic code: plain or in-place.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Operator {
    /// `a op b`
    Binary(BinaryOp),
    /// `a op= b`; always rejected on flags.
    InPlace(BinaryOp),
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operator::Binary(op) => f.write_str(op.symbol()),
            Operator::InPlace(op) => write!(f, "{}=", op.symbol()),
        }
    }
}

/// Symbol that [`Operator::from_str`] does not know.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown operator {0:?}")]
pub struct UnknownOperator(pub String);

impl FromStr for Operator {
    type Err = UnknownOperator;

    /// Parses `|`, `|=`, `**`, `**=` and so on. `/` is accepted as an alias
    /// of `//` since there is no true division on flags.
    fn from_str(symbol: &str) -> core::result::Result<Self, Self::Err> {
        let (base, in_place) = match symbol.strip_suffix('=') {
            Some(base) if !base.is_empty() => (base, true),
            _ => (symbol, false),
        };
        let op = match base {
            "/" => BinaryOp::FloorDiv,
            _ => BinaryOp::ALL
                .into_iter()
                .find(|op| op.symbol() == base)
                .ok_or_else(|| UnknownOperator(symbol.to_owned()))?,
        };
        Ok(if in_place {
            Operator::InPlace(op)
        } else {
            Operator::Binary(op)
        })
    }
}

impl<'a> Flag<'a> {
    /// Applies `self op rhs`.
    ///
    /// `rhs` may be a flag of any flag set; only its integer value is used,
    /// and the result belongs to `self`'s flag set.
    ///
    /// ```
    /// use bitenum::{FlagError, FlagSetType, Operator};
    ///
    /// let seq = FlagSetType::declare("Seq { one = 1, two = 2, four = 4 }").unwrap();
    /// let one = seq.member("one").unwrap();
    ///
    /// let op: Operator = "|".parse().unwrap();
    /// assert_eq!(one.apply(op, 4).unwrap().value(), 5);
    ///
    /// let op: Operator = "|=".parse().unwrap();
    /// assert!(matches!(one.apply(op, 4), Err(FlagError::UnsupportedOperation { .. })));
    /// ```
    pub fn apply(self, op: Operator, rhs: impl Into<Operand<'a>>) -> Result<Flag<'a>> {
        match op {
            Operator::Binary(op) => self.binary(op, rhs.into()),
            Operator::InPlace(_) => Err(self.unsupported(op)),
        }
    }

    /// Applies `lhs op self`, the reflected form of [`apply`](Self::apply).
    pub fn apply_reflected(self, op: Operator, lhs: impl Into<Operand<'a>>) -> Result<Flag<'a>> {
        match op {
            Operator::Binary(op) => self.reflected(op, lhs.into()),
            Operator::InPlace(_) => Err(self.unsupported(op)),
        }
    }

    /// `self ** exp`.
    pub fn pow(self, exp: impl Into<Operand<'a>>) -> Result<Flag<'a>> {
        self.binary(BinaryOp::Pow, exp.into())
    }

    pub(crate) fn binary(self, op: BinaryOp, rhs: Operand<'_>) -> Result<Flag<'a>> {
        self.rewrap(op, op.eval(i128::from(self.value()), rhs.raw()))
    }

    pub(crate) fn reflected(self, op: BinaryOp, lhs: Operand<'_>) -> Result<Flag<'a>> {
        self.rewrap(op, op.eval(lhs.raw(), i128::from(self.value())))
    }

    fn rewrap(
        self,
        op: BinaryOp,
        result: core::result::Result<i128, &'static str>,
    ) -> Result<Flag<'a>> {
        let flag_set = self.flag_set();
        match result {
            Ok(value) => flag_set.flag(value),
            Err(reason) => Err(FlagError::Arithmetic {
                type_name: flag_set.name().to_owned(),
                op,
                reason,
            }),
        }
    }

    fn unsupported(self, op: Operator) -> FlagError {
        FlagError::UnsupportedOperation {
            type_name: self.flag_set().name().to_owned(),
            op,
        }
    }
}

impl<'a> Not for Flag<'a> {
    type Output = Flag<'a>;

    /// Complement within the flag set's mask.
    #[inline]
    fn not(self) -> Flag<'a> {
        let flag_set = self.flag_set();
        flag_set.intern(!self.value() & flag_set.mask())
    }
}

macro_rules! impl_binary_ops {
    ($($trait:ident :: $method:ident => $op:ident),* $(,)?) => {
        $(
            impl<'a, R: Into<Operand<'a>>> $trait<R> for Flag<'a> {
                type Output = Result<Flag<'a>>;

                #[inline]
                fn $method(self, rhs: R) -> Self::Output {
                    self.binary(BinaryOp::$op, rhs.into())
                }
            }
        )*
    };
}

impl_binary_ops! {
    BitOr::bitor => BitOr,
    BitAnd::bitand => BitAnd,
    BitXor::bitxor => BitXor,
    Shl::shl => Shl,
    Shr::shr => Shr,
    Add::add => Add,
    Sub::sub => Sub,
    Mul::mul => Mul,
    Div::div => FloorDiv,
    Rem::rem => Rem,
}

macro_rules! impl_reflected_op {
    ($int:ty, $trait:ident :: $method:ident => $op:ident) => {
        impl<'a> $trait<Flag<'a>> for $int {
            type Output = Result<Flag<'a>>;

            #[inline]
            fn $method(self, rhs: Flag<'a>) -> Self::Output {
                rhs.reflected(BinaryOp::$op, Operand::from(self))
            }
        }
    };
}

macro_rules! impl_reflected_ops {
    ($($int:ty),*) => {
        $(
            impl_reflected_op!($int, BitOr::bitor => BitOr);
            impl_reflected_op!($int, BitAnd::bitand => BitAnd);
            impl_reflected_op!($int, BitXor::bitxor => BitXor);
            impl_reflected_op!($int, Shl::shl => Shl);
            impl_reflected_op!($int, Shr::shr => Shr);
            impl_reflected_op!($int, Add::add => Add);
            impl_reflected_op!($int, Sub::sub => Sub);
            impl_reflected_op!($int, Mul::mul => Mul);
            impl_reflected_op!($int, Div::div => FloorDiv);
            impl_reflected_op!($int, Rem::rem => Rem);
        )*
    };
}

impl_reflected_ops!(u8, u16, u32, u64, i8, i16, i32, i64, i128);
