//! Mixed flag / integer operands and the ordering rules between them.

use core::cmp::Ordering;

use crate::error::{FlagError, Result};
use crate::flag::Flag;

/// Either a flag or a plain integer.
///
/// The right-hand side of operators, and the element type for sorting
/// mixed sequences with [`try_sort`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Operand<'a> {
    /// A flag of some flag set.
    Flag(Flag<'a>),
    /// A plain integer.
    Int(i128),
}

impl<'a> Operand<'a> {
    /// Integer value, whatever the variant.
    #[inline]
    pub fn raw(self) -> i128 {
        match self {
            Operand::Flag(flag) => i128::from(flag.value()),
            Operand::Int(value) => value,
        }
    }

    /// Flag-set name, or `int` for plain integers.
    pub fn type_name(&self) -> &str {
        match self {
            Operand::Flag(flag) => flag.flag_set().name(),
            Operand::Int(_) => "int",
        }
    }

    /// Orders two operands.
    ///
    /// Integers order among themselves and flags among flags of the same
    /// set. Anything else is [`FlagError::Incomparable`].
    pub fn try_cmp(&self, other: &Operand<'_>) -> Result<Ordering> {
        match (self, other) {
            (Operand::Int(lhs), Operand::Int(rhs)) => Ok(lhs.cmp(rhs)),
            (Operand::Flag(lhs), Operand::Flag(rhs)) => lhs.try_cmp(*rhs),
            _ => Err(FlagError::Incomparable {
                left: self.type_name().to_owned(),
                right: other.type_name().to_owned(),
            }),
        }
    }
}

impl<'a> From<Flag<'a>> for Operand<'a> {
    #[inline]
    fn from(flag: Flag<'a>) -> Self {
        Operand::Flag(flag)
    }
}

macro_rules! impl_from_int {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for Operand<'_> {
                #[inline]
                fn from(value: $ty) -> Self {
                    Operand::Int(i128::from(value))
                }
            }
        )*
    };
}

impl_from_int!(u8, u16, u32, u64, i8, i16, i32, i64, i128);

/// Sorts a mixed sequence, failing instead of coercing.
///
/// All elements must be mutually orderable: all integers, or all flags of
/// one flag set. On failure the slice is left untouched.
///
/// ```
/// use bitenum::{FlagSetType, Operand, try_sort};
///
/// let seq = FlagSetType::declare("Seq { one = 1, two = 2 }").unwrap();
/// let one = seq.member("one").unwrap();
///
/// let mut mixed = [Operand::from(one), Operand::from(2)];
/// assert!(try_sort(&mut mixed).is_err());
/// ```
pub fn try_sort(items: &mut [Operand<'_>]) -> Result<()> {
    // same-set is an equivalence, so checking against the first is enough
    if let Some((first, rest)) = items.split_first() {
        for item in rest {
            first.try_cmp(item)?;
        }
    }
    items.sort_by_key(|item| item.raw());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::FlagSetType;

    #[test]
    fn ints_sort() {
        let mut ints = [Operand::from(3u8), Operand::from(-1i64), Operand::from(2u64)];
        try_sort(&mut ints).unwrap();
        assert_eq!(ints, [Operand::Int(-1), Operand::Int(2), Operand::Int(3)]);
    }

    #[test]
    fn int_and_flag_are_incomparable() {
        let seq = FlagSetType::declare("Seq { one = 1, two = 2 }").unwrap();
        let one = Operand::from(seq.member("one").unwrap());

        let err = one.try_cmp(&Operand::Int(2)).unwrap_err();
        assert_eq!(
            err,
            FlagError::Incomparable {
                left: "Seq".into(),
                right: "int".into(),
            }
        );

        let err = Operand::Int(2).try_cmp(&one).unwrap_err();
        assert_eq!(err.to_string(), "unorderable types: int Seq");

        let mut mixed = [Operand::Int(2), one];
        assert!(try_sort(&mut mixed).is_err());
        assert_eq!(mixed, [Operand::Int(2), one]);
    }

    #[test]
    fn raw_values() {
        let seq = FlagSetType::declare("Seq { one = 1, two = 2 }").unwrap();
        assert_eq!(Operand::from(seq.flag(3).unwrap()).raw(), 3);
        assert_eq!(Operand::from(-5i32).raw(), -5);
        assert_eq!(Operand::from(u64::MAX).raw(), i128::from(u64::MAX));
    }
}
