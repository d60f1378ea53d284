// bitenum/src/bit_enum.rs

use crate::flag::Flag;
use crate::flag_set::FlagSetType;

/// Trait for fieldless enums whose variants are the members of a flag set.
///
/// Derive this on an enum with power-of-two discriminants. The derive checks
/// the declaration at compile time (zero, non-power-of-two and repeated bits
/// are compile errors) and builds the flag set on first use:
///
/// ```
/// use bitenum::BitEnum;
///
/// #[derive(BitEnum, Debug, Clone, Copy, PartialEq, Eq)]
/// pub enum Perm {
///     Read = 1,
///     Write = 2,
///     Exec = 4,
/// }
///
/// let rw = (Perm::Read.to_flag() | Perm::Write.to_flag()).unwrap();
/// assert_eq!(rw.to_string(), "Perm(3)");
/// assert_eq!(Perm::from_flag(Perm::flag_set().flag(4).unwrap()), Some(Perm::Exec));
/// ```
pub trait BitEnum: Copy + 'static {
    /// The flag set shared by every variant.
    fn flag_set() -> &'static FlagSetType;

    /// The canonical member flag of this variant.
    fn to_flag(self) -> Flag<'static>;

    /// The variant for a single-member flag of this enum's flag set.
    /// Returns `None` for composite values and flags of other sets.
    fn from_flag(flag: Flag<'_>) -> Option<Self>;
}
