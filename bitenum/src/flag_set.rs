//! Flag-set descriptors and their interning tables.

use core::fmt;
use std::collections::HashMap;

use log::trace;
use parking_lot::RwLock;

use crate::builder::FlagSetTypeBuilder;
use crate::declaration::{is_identifier, parse_int};
use crate::error::{FlagError, Result};
use crate::flag::Flag;

/// Index of an interned value in a flag set's arena.
///
/// Slots are handed out once per distinct value and never reused, so two
/// flags with the same slot in the same flag set are the same instance.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Slot(usize);

impl Slot {
    /// Position in the arena.
    #[inline]
    pub const fn index(self) -> usize {
        self.0
    }
}

/// A declared member: name, single-bit value, and its pre-interned slot.
#[derive(Debug, Clone)]
pub(crate) struct Member {
    pub(crate) name: String,
    pub(crate) value: u64,
    pub(crate) slot: Slot,
}

#[derive(Debug, Default)]
struct Interner {
    values: Vec<u64>,
    slots: HashMap<u64, Slot>,
}

impl Interner {
    #[inline]
    fn get(&self, value: u64) -> Option<Slot> {
        self.slots.get(&value).copied()
    }

    fn get_or_insert(&mut self, value: u64) -> (Slot, bool) {
        if let Some(slot) = self.get(value) {
            return (slot, false);
        }
        let slot = Slot(self.values.len());
        self.values.push(value);
        self.slots.insert(value, slot);
        (slot, true)
    }
}

/// A closed set of named single-bit values.
///
/// Built once by [`FlagSetTypeBuilder`], immutable afterwards. Owns the
/// interning table every [`Flag`] of this set points into.
///
/// # Example
///
/// ```
/// use bitenum::FlagSetType;
///
/// let seq = FlagSetType::builder("Seq")
///     .member("one", 1)
///     .member("two", 2)
///     .member("four", 4)
///     .member("eight", 8)
///     .finish()
///     .unwrap();
///
/// let one = seq.member("one").unwrap();
/// let four = seq.member("four").unwrap();
///
/// assert_eq!((one | four).unwrap(), seq.flag(5).unwrap());
/// assert_eq!(!(one | four).unwrap(), seq.flag(10).unwrap());
/// assert_eq!(seq.flag(15).unwrap().to_string(), "Seq(15)");
/// ```
pub struct FlagSetType {
    name: String,
    mask: u64,
    members: Box<[Member]>,
    interner: RwLock<Interner>,
}

impl FlagSetType {
    /// Starts declaring a flag set called `name`.
    pub fn builder(name: impl Into<String>) -> FlagSetTypeBuilder {
        FlagSetTypeBuilder::new(name)
    }

    /// Builds from already validated `(name, bit)` pairs.
    pub(crate) fn assemble(name: String, mut declared: Vec<(String, u64)>) -> Self {
        declared.sort_by_key(|&(_, value)| value);

        let mut interner = Interner::default();
        let mut mask = 0;
        let members = declared
            .into_iter()
            .map(|(member, value)| {
                mask |= value;
                let (slot, _) = interner.get_or_insert(value);
                Member {
                    name: member,
                    value,
                    slot,
                }
            })
            .collect();

        Self {
            name,
            mask,
            members,
            interner: RwLock::new(interner),
        }
    }

    /// Builds from members checked at compile time by `#[derive(BitEnum)]`.
    #[doc(hidden)]
    pub fn from_validated_members(name: &str, members: &[(&str, u64)]) -> Self {
        let declared = members
            .iter()
            .map(|&(member, value)| (member.to_owned(), value))
            .collect();
        Self::assemble(name.to_owned(), declared)
    }

    /// Diagnostic name.
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// OR of every member value.
    #[inline]
    pub fn mask(&self) -> u64 {
        self.mask
    }

    /// Number of declared members.
    #[inline]
    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// Returns true if no members were declared.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Number of distinct values interned so far, members included.
    pub fn interned_len(&self) -> usize {
        self.interner.read().values.len()
    }

    /// Members as `(name, flag)`, in ascending value order.
    pub fn members(&self) -> Members<'_> {
        Members {
            flag_set: self,
            inner: self.members.iter(),
        }
    }

    /// The declared member called `name`.
    pub fn member(&self, name: &str) -> Option<Flag<'_>> {
        self.members
            .iter()
            .find(|member| member.name == name)
            .map(|member| self.canonical(member))
    }

    /// Returns the interned flag for `value`.
    ///
    /// Fails with [`FlagError::UnknownBits`] if `value` is negative or has a
    /// bit outside [`mask`](Self::mask). Every call with the same value
    /// returns the same instance.
    pub fn flag(&self, value: impl Into<i128>) -> Result<Flag<'_>> {
        let value = value.into();
        match self.representable(value) {
            Some(bits) => Ok(self.intern(bits)),
            None => Err(FlagError::UnknownBits {
                type_name: self.name.clone(),
                value,
            }),
        }
    }

    /// Parses an integer literal or `|`-separated member names.
    ///
    /// ```
    /// use bitenum::FlagSetType;
    ///
    /// let perm = FlagSetType::declare("Perm { read = 1, write = 2, exec = 4 }").unwrap();
    /// assert_eq!(perm.parse("read | exec").unwrap(), perm.flag(5).unwrap());
    /// assert_eq!(perm.parse("0x6").unwrap(), perm.flag(6).unwrap());
    /// assert!(perm.parse("\"2\"").is_err());
    /// ```
    pub fn parse(&self, text: &str) -> Result<Flag<'_>> {
        let trimmed = text.trim();
        if let Some(value) = parse_int(trimmed) {
            return self.flag(value);
        }

        if trimmed.is_empty() || !trimmed.split('|').all(|name| is_identifier(name.trim())) {
            return Err(FlagError::InvalidMemberType {
                type_name: self.name.clone(),
                member: "<value>".to_owned(),
                found: text.to_owned(),
            });
        }

        let mut bits = 0;
        for name in trimmed.split('|').map(str::trim) {
            let member = self
                .members
                .iter()
                .find(|member| member.name == name)
                .ok_or_else(|| FlagError::UnknownMember {
                    type_name: self.name.clone(),
                    member: name.to_owned(),
                })?;
            bits |= member.value;
        }
        Ok(self.intern(bits))
    }

    /// The flag with no bits set.
    pub fn empty(&self) -> Flag<'_> {
        self.intern(0)
    }

    /// The flag with every member set.
    pub fn all(&self) -> Flag<'_> {
        self.intern(self.mask)
    }

    /// Returns true if `value` is non-negative and made only of member bits.
    #[inline]
    pub fn contains(&self, value: impl Into<i128>) -> bool {
        self.representable(value.into()).is_some()
    }

    #[inline]
    pub(crate) fn representable(&self, value: i128) -> Option<u64> {
        u64::try_from(value)
            .ok()
            .filter(|bits| bits | self.mask == self.mask)
    }

    #[inline]
    pub(crate) fn member_slice(&self) -> &[Member] {
        &self.members
    }

    #[inline]
    pub(crate) fn canonical(&self, member: &Member) -> Flag<'_> {
        Flag::new(self, member.slot, member.value)
    }

    /// Interns `bits & mask`. Used by derived enums, whose values are
    /// members by construction.
    #[doc(hidden)]
    pub fn intern_masked(&self, bits: u64) -> Flag<'_> {
        self.intern(bits & self.mask)
    }

    /// Interns `bits`, which must already be within the mask.
    pub(crate) fn intern(&self, bits: u64) -> Flag<'_> {
        debug_assert_eq!(bits | self.mask, self.mask);

        // members are pre-interned and sorted; no lock needed
        if let Ok(idx) = self.members.binary_search_by_key(&bits, |m| m.value) {
            return self.canonical(&self.members[idx]);
        }

        if let Some(slot) = self.interner.read().get(bits) {
            return Flag::new(self, slot, bits);
        }

        let (slot, inserted) = self.interner.write().get_or_insert(bits);
        if inserted {
            trace!("{}: interned {:#x} at slot {}", self.name, bits, slot.index());
        }
        Flag::new(self, slot, bits)
    }
}

impl fmt::Debug for FlagSetType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FlagSetType")
            .field("name", &self.name)
            .field("mask", &format_args!("{:#x}", self.mask))
            .field(
                "members",
                &self
                    .members
                    .iter()
                    .map(|m| (m.name.as_str(), m.value))
                    .collect::<Vec<_>>(),
            )
            .finish()
    }
}

/// Iterator over a flag set's members, ascending. See [`FlagSetType::members`].
#[derive(Clone)]
pub struct Members<'a> {
    flag_set: &'a FlagSetType,
    inner: core::slice::Iter<'a, Member>,
}

impl<'a> Iterator for Members<'a> {
    type Item = (&'a str, Flag<'a>);

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        let member = self.inner.next()?;
        Some((member.name.as_str(), self.flag_set.canonical(member)))
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl DoubleEndedIterator for Members<'_> {
    #[inline]
    fn next_back(&mut self) -> Option<Self::Item> {
        let member = self.inner.next_back()?;
        Some((member.name.as_str(), self.flag_set.canonical(member)))
    }
}

impl ExactSizeIterator for Members<'_> {}

impl core::iter::FusedIterator for Members<'_> {}
