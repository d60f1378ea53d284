//! Flag values: interned subsets of a flag set's bits.

use core::cmp::Ordering;
use core::fmt;
use core::hash::{Hash, Hasher};
use core::iter::FusedIterator;
use core::ptr;
use core::slice;

use crate::error::{FlagError, Result};
use crate::flag_set::{FlagSetType, Member, Slot};
use crate::operand::Operand;

/// A value of a [`FlagSetType`]: any combination of its members.
///
/// A `Flag` is a small copyable handle to an interned value. It borrows the
/// flag set it belongs to and has no mutating methods.
///
/// Equality requires the same flag set *and* the same value, so a flag is
/// never equal to a plain integer or to a flag of another set:
///
/// ```
/// use bitenum::FlagSetType;
///
/// let seq = FlagSetType::declare("Seq { one = 1, two = 2 }").unwrap();
/// let gap = FlagSetType::declare("Gap { two = 2, eight = 8 }").unwrap();
///
/// assert_eq!(seq.flag(2).unwrap(), seq.member("two").unwrap());
/// assert_ne!(seq.member("two").unwrap(), gap.member("two").unwrap());
/// assert!(seq.member("one").unwrap() != 1);
/// ```
///
/// Ordering only exists within one flag set. `<` and `>` cannot fail, so
/// across sets they are simply `false`. Use [`Flag::try_cmp`],
/// [`Flag::try_lt`], [`Flag::try_gt`] or [`sort_flags`] to get
/// [`FlagError::Incomparable`] instead:
///
/// ```
/// use bitenum::{FlagError, FlagSetType};
///
/// let seq = FlagSetType::declare("Seq { one = 1, two = 2 }").unwrap();
/// let gap = FlagSetType::declare("Gap { two = 2, eight = 8 }").unwrap();
/// let one = seq.member("one").unwrap();
/// let eight = gap.member("eight").unwrap();
///
/// assert!(!(one < eight) && !(one > eight));
/// assert!(matches!(one.try_lt(eight), Err(FlagError::Incomparable { .. })));
/// ```
#[derive(Clone, Copy)]
pub struct Flag<'a> {
    flag_set: &'a FlagSetType,
    slot: Slot,
    value: u64,
}

impl<'a> Flag<'a> {
    #[inline]
    pub(crate) fn new(flag_set: &'a FlagSetType, slot: Slot, value: u64) -> Self {
        Self {
            flag_set,
            slot,
            value,
        }
    }

    /// The flag set this flag belongs to.
    #[inline]
    pub fn flag_set(self) -> &'a FlagSetType {
        self.flag_set
    }

    /// Integer value.
    #[inline]
    pub fn value(self) -> u64 {
        self.value
    }

    /// Interning slot of this value.
    #[inline]
    pub fn slot(self) -> Slot {
        self.slot
    }

    /// Returns true if both handles refer to the same interned instance.
    ///
    /// For flags obtained through the public API this coincides with `==`;
    /// it exists to observe that interning actually happened.
    #[inline]
    pub fn is_identical(self, other: Flag<'_>) -> bool {
        self.same_flag_set(other) && self.slot == other.slot
    }

    /// Returns true if both flags belong to the same flag set.
    #[inline]
    pub fn same_flag_set(self, other: Flag<'_>) -> bool {
        ptr::eq(self.flag_set, other.flag_set)
    }

    /// Returns true if no bits are set.
    #[inline]
    pub fn is_empty(self) -> bool {
        self.value == 0
    }

    /// Member name, if this value is exactly one declared member.
    pub fn name(self) -> Option<&'a str> {
        let members = self.flag_set.member_slice();
        members
            .binary_search_by_key(&self.value, |m| m.value)
            .ok()
            .map(|idx| members[idx].name.as_str())
    }

    /// Member flags set in this value, ascending.
    #[inline]
    pub fn iter(self) -> Iter<'a> {
        Iter {
            flag_set: self.flag_set,
            members: self.flag_set.member_slice().iter(),
            value: self.value,
        }
    }

    /// Returns true if `value` is a valid value of this flag's set.
    ///
    /// This tests representability in the flag set, not whether `value` is a
    /// subset of `self`; use [`is_subset_of`](Self::is_subset_of) for that.
    ///
    /// ```
    /// use bitenum::FlagSetType;
    ///
    /// let gap = FlagSetType::declare("Gap { two = 2, eight = 8 }").unwrap();
    /// let two = gap.member("two").unwrap();
    ///
    /// assert!(two.contains(8));
    /// assert!(two.contains(10));
    /// assert!(!two.contains(1));
    /// assert!(!two.contains(-2));
    /// ```
    #[inline]
    pub fn contains(self, value: impl Into<Operand<'a>>) -> bool {
        self.flag_set.representable(value.into().raw()).is_some()
    }

    /// Returns true if every bit of `self` is set in `other`, both in one set.
    #[inline]
    pub fn is_subset_of(self, other: Flag<'_>) -> bool {
        self.same_flag_set(other) && self.value & !other.value == 0
    }

    /// Returns true if `self` and `other` share a bit, both in one set.
    #[inline]
    pub fn intersects(self, other: Flag<'_>) -> bool {
        self.same_flag_set(other) && self.value & other.value != 0
    }

    /// Orders two flags of the same set by value.
    ///
    /// Flags of different sets are [`FlagError::Incomparable`]. `<` and `>`
    /// on flags of different sets are simply false; use this when that
    /// should be an error.
    pub fn try_cmp(self, other: Flag<'_>) -> Result<Ordering> {
        if self.same_flag_set(other) {
            Ok(self.value.cmp(&other.value))
        } else {
            Err(FlagError::Incomparable {
                left: self.flag_set.name().to_owned(),
                right: other.flag_set.name().to_owned(),
            })
        }
    }

    /// `self < other`, failing across flag sets.
    #[inline]
    pub fn try_lt(self, other: Flag<'_>) -> Result<bool> {
        self.try_cmp(other).map(Ordering::is_lt)
    }

    /// `self > other`, failing across flag sets.
    #[inline]
    pub fn try_gt(self, other: Flag<'_>) -> Result<bool> {
        self.try_cmp(other).map(Ordering::is_gt)
    }
}

/// Sorts flags of one flag set by value.
///
/// Fails with [`FlagError::Incomparable`], leaving the slice untouched, if
/// the flags come from more than one set.
pub fn sort_flags(flags: &mut [Flag<'_>]) -> Result<()> {
    if let Some((first, rest)) = flags.split_first() {
        for flag in rest {
            first.try_cmp(*flag)?;
        }
    }
    flags.sort_by_key(|flag| flag.value);
    Ok(())
}

impl PartialEq<Flag<'_>> for Flag<'_> {
    #[inline]
    fn eq(&self, other: &Flag<'_>) -> bool {
        self.same_flag_set(*other) && self.value == other.value
    }
}

impl Eq for Flag<'_> {}

impl Hash for Flag<'_> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        ptr::hash(self.flag_set, state);
        self.value.hash(state);
    }
}

impl PartialOrd<Flag<'_>> for Flag<'_> {
    /// `None` across flag sets.
    #[inline]
    fn partial_cmp(&self, other: &Flag<'_>) -> Option<Ordering> {
        self.try_cmp(*other).ok()
    }
}

macro_rules! impl_int_ne {
    ($($ty:ty),*) => {
        $(
            impl PartialEq<$ty> for Flag<'_> {
                #[inline]
                fn eq(&self, _: &$ty) -> bool {
                    false
                }
            }

            impl PartialEq<Flag<'_>> for $ty {
                #[inline]
                fn eq(&self, _: &Flag<'_>) -> bool {
                    false
                }
            }
        )*
    };
}

// a flag is never equal to a bare integer, even with the same value
impl_int_ne!(u8, u16, u32, u64, i8, i16, i32, i64, i128);

impl From<Flag<'_>> for u64 {
    #[inline]
    fn from(flag: Flag<'_>) -> u64 {
        flag.value
    }
}

impl From<Flag<'_>> for i128 {
    #[inline]
    fn from(flag: Flag<'_>) -> i128 {
        i128::from(flag.value)
    }
}

/// `Name(value)`; the alternate form lists members, `Name(a | b)`.
impl fmt::Display for Flag<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = self.flag_set.name();
        if !f.alternate() || self.is_empty() {
            return write!(f, "{}({})", name, self.value);
        }

        write!(f, "{name}(")?;
        for (i, member) in self.iter().enumerate() {
            if i > 0 {
                f.write_str(" | ")?;
            }
            f.write_str(member.name().unwrap_or("?"))?;
        }
        f.write_str(")")
    }
}

impl fmt::Debug for Flag<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.flag_set.name(), self.value)
    }
}

impl<'a> IntoIterator for Flag<'a> {
    type Item = Flag<'a>;
    type IntoIter = Iter<'a>;

    #[inline]
    fn into_iter(self) -> Iter<'a> {
        self.iter()
    }
}

/// Member flags set in a [`Flag`], in ascending value order.
///
/// ```
/// use bitenum::FlagSetType;
///
/// let seq = FlagSetType::declare("Seq { one = 1, two = 2, four = 4, eight = 8 }").unwrap();
/// let names: Vec<_> = seq.flag(13).unwrap().iter().filter_map(|f| f.name()).collect();
/// assert_eq!(names, ["one", "four", "eight"]);
/// ```
#[derive(Clone)]
pub struct Iter<'a> {
    flag_set: &'a FlagSetType,
    members: slice::Iter<'a, Member>,
    value: u64,
}

impl<'a> Iterator for Iter<'a> {
    type Item = Flag<'a>;

    #[inline]
    fn next(&mut self) -> Option<Flag<'a>> {
        let value = self.value;
        let member = self.members.find(|m| m.value & value != 0)?;
        Some(self.flag_set.canonical(member))
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        (0, Some(self.members.len()))
    }
}

impl DoubleEndedIterator for Iter<'_> {
    #[inline]
    fn next_back(&mut self) -> Option<Self::Item> {
        let value = self.value;
        let member = self.members.rfind(|m| m.value & value != 0)?;
        Some(self.flag_set.canonical(member))
    }
}

impl FusedIterator for Iter<'_> {}

impl fmt::Debug for Iter<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Iter")
            .field("flag_set", &self.flag_set.name())
            .field("value", &self.value)
            .finish()
    }
}
