//! Definition-time validation of flag-set declarations.

use log::debug;

use crate::declaration::{is_identifier, parse_int};
use crate::error::{FlagError, Result};
use crate::flag_set::FlagSetType;

/// Declared value of a member, before validation.
#[derive(Debug, Clone, PartialEq, Eq)]
enum DeclaredValue {
    Int(i128),
    Text(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Declared {
    name: String,
    value: DeclaredValue,
}

/// Collects member declarations and validates them into a [`FlagSetType`].
///
/// Declarations are only checked by [`finish`](Self::finish), in declaration
/// order, stopping at the first bad member.
///
/// # Example
///
/// ```
/// use bitenum::FlagSetType;
///
/// let perm = FlagSetType::builder("Perm")
///     .member("write", 2)
///     .member("read", 1)
///     .member("exec", 4)
///     .finish()
///     .unwrap();
///
/// assert_eq!(perm.mask(), 7);
/// let names: Vec<_> = perm.members().map(|(name, _)| name).collect();
/// assert_eq!(names, ["read", "write", "exec"]);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlagSetTypeBuilder {
    name: String,
    declared: Vec<Declared>,
}

impl FlagSetTypeBuilder {
    /// Starts a declaration for a flag set called `name`.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            declared: Vec::new(),
        }
    }

    /// Name of the flag set being declared.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Declares a member with an integer value.
    pub fn member(mut self, name: impl Into<String>, value: impl Into<i128>) -> Self {
        self.declared.push(Declared {
            name: name.into(),
            value: DeclaredValue::Int(value.into()),
        });
        self
    }

    /// Declares a member whose value is still text, e.g. read from a
    /// declaration file. Text that is not an integer literal is rejected by
    /// [`finish`](Self::finish) with [`FlagError::InvalidMemberType`].
    pub fn member_text(mut self, name: impl Into<String>, text: impl Into<String>) -> Self {
        self.declared.push(Declared {
            name: name.into(),
            value: DeclaredValue::Text(text.into()),
        });
        self
    }

    /// Validates every declaration and builds the flag set.
    ///
    /// Members end up ordered by value, not by declaration, and each one is
    /// interned before this returns.
    pub fn finish(self) -> Result<FlagSetType> {
        let accepted = match self.validate() {
            Ok(accepted) => accepted,
            Err(err) => {
                debug!("rejected flag set {}: {}", self.name, err);
                return Err(err);
            }
        };
        let flag_set = FlagSetType::assemble(self.name, accepted);
        debug!(
            "declared flag set {} with {} members, mask {:#x}",
            flag_set.name(),
            flag_set.len(),
            flag_set.mask()
        );
        Ok(flag_set)
    }

    fn validate(&self) -> Result<Vec<(String, u64)>> {
        let mut aggregated: u64 = 0;
        let mut accepted: Vec<(String, u64)> = Vec::with_capacity(self.declared.len());

        for declared in &self.declared {
            let member = &declared.name;
            if !is_identifier(member) {
                return Err(FlagError::InvalidMemberName {
                    type_name: self.name.clone(),
                    member: member.clone(),
                });
            }
            if accepted.iter().any(|(name, _)| name == member) {
                return Err(FlagError::DuplicateName {
                    type_name: self.name.clone(),
                    member: member.clone(),
                });
            }

            let value = match &declared.value {
                DeclaredValue::Int(value) => *value,
                DeclaredValue::Text(text) => {
                    parse_int(text).ok_or_else(|| FlagError::InvalidMemberType {
                        type_name: self.name.clone(),
                        member: member.clone(),
                        found: text.clone(),
                    })?
                }
            };

            if value == 0 {
                return Err(FlagError::ZeroValue {
                    type_name: self.name.clone(),
                    member: member.clone(),
                });
            }
            if value < 0 || value.count_ones() != 1 {
                return Err(FlagError::NotPowerOfTwo {
                    type_name: self.name.clone(),
                    member: member.clone(),
                    value,
                });
            }
            let bit = u64::try_from(value).map_err(|_| FlagError::OutOfRange {
                type_name: self.name.clone(),
                member: member.clone(),
                value,
            })?;

            if bit & aggregated != 0 {
                let claimed_by = accepted
                    .iter()
                    .find(|(_, other)| other & bit != 0)
                    .map(|(name, _)| name.clone())
                    .unwrap_or_default();
                return Err(FlagError::DuplicateBit {
                    type_name: self.name.clone(),
                    member: member.clone(),
                    value: bit,
                    claimed_by,
                });
            }

            aggregated |= bit;
            accepted.push((member.clone(), bit));
        }

        Ok(accepted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn empty_declaration_builds() {
        let empty = FlagSetTypeBuilder::new("Nothing").finish().unwrap();
        assert_eq!(empty.mask(), 0);
        assert!(empty.is_empty());
    }

    #[test]
    fn first_failure_wins() {
        let err = FlagSetTypeBuilder::new("Bad")
            .member("one", 1)
            .member("three", 3)
            .member("zero", 0)
            .finish()
            .unwrap_err();
        assert!(matches!(err, FlagError::NotPowerOfTwo { ref member, value: 3, .. } if member == "three"));
    }

    #[test]
    fn negative_is_not_power_of_two() {
        let err = FlagSetTypeBuilder::new("Bad")
            .member("neg", -4)
            .finish()
            .unwrap_err();
        assert!(matches!(err, FlagError::NotPowerOfTwo { value: -4, .. }));
    }

    #[test]
    fn beyond_64_bits_rejected() {
        let err = FlagSetTypeBuilder::new("Wide")
            .member("huge", 1i128 << 64)
            .finish()
            .unwrap_err();
        assert!(matches!(err, FlagError::OutOfRange { .. }));
        assert_eq!(err.kind(), ErrorKind::Value);
    }

    #[test]
    fn top_bit_accepted() {
        let wide = FlagSetTypeBuilder::new("Wide")
            .member("top", 1u64 << 63)
            .finish()
            .unwrap();
        assert_eq!(wide.mask(), 1 << 63);
    }

    #[test]
    fn duplicate_bit_names_the_owner() {
        let err = FlagSetTypeBuilder::new("Dup")
            .member("a", 1)
            .member("b", 2)
            .member("c", 2)
            .finish()
            .unwrap_err();
        assert_eq!(
            err,
            FlagError::DuplicateBit {
                type_name: "Dup".into(),
                member: "c".into(),
                value: 2,
                claimed_by: "b".into(),
            }
        );
    }

    #[test]
    fn names_are_checked() {
        let err = FlagSetTypeBuilder::new("Names")
            .member("ok", 1)
            .member("not ok", 2)
            .finish()
            .unwrap_err();
        assert!(matches!(err, FlagError::InvalidMemberName { .. }));

        let err = FlagSetTypeBuilder::new("Names")
            .member("ok", 1)
            .member("ok", 2)
            .finish()
            .unwrap_err();
        assert!(matches!(err, FlagError::DuplicateName { .. }));
    }

    #[test]
    fn text_values() {
        let hex = FlagSetTypeBuilder::new("Hex")
            .member_text("low", "0x1")
            .member_text("high", "0b1000_0000")
            .finish()
            .unwrap();
        assert_eq!(hex.mask(), 0x81);

        let err = FlagSetTypeBuilder::new("Str")
            .member("one", 1)
            .member_text("two", "\"2\"")
            .finish()
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Type);
    }
}
