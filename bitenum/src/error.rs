// bitenum/src/error.rs

//! Error types for flag-set declaration and flag operations.

use thiserror::Error;

use crate::ops::{BinaryOp, Operator};

/// Result alias used throughout the crate.
pub type Result<T, E = FlagError> = core::result::Result<T, E>;

/// Coarse error family, for callers that only care about the category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// The value had the wrong shape (not an integer, wrong operand types).
    Type,
    /// The value was an integer but not an acceptable one.
    Value,
    /// Attempted mutation of something already built.
    Attribute,
    /// The operation exists but is disabled for flag values.
    NotImplemented,
}

/// Everything that can go wrong declaring a flag set or using its flags.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FlagError {
    /// A declared member (or construction argument) is not an integer.
    #[error("member ({member}) of {type_name} must be an integer, got {found:?}")]
    InvalidMemberType {
        /// Flag set being declared or constructed.
        type_name: String,
        /// Offending member, or `"<value>"` for construction arguments.
        member: String,
        /// The text that failed to parse.
        found: String,
    },

    /// A declared member is zero.
    #[error("zero is not a valid flag value (member ({member}) of {type_name})")]
    ZeroValue {
        /// Flag set being declared.
        type_name: String,
        /// Offending member.
        member: String,
    },

    /// A declared member has more or less than one bit set.
    #[error("member ({member}) of {type_name} must be a power of 2, got {value}")]
    NotPowerOfTwo {
        /// Flag set being declared.
        type_name: String,
        /// Offending member.
        member: String,
        /// The declared value.
        value: i128,
    },

    /// A declared member is a power of two beyond the 64-bit flag space.
    #[error("member ({member}) of {type_name} does not fit in 64 bits, got {value}")]
    OutOfRange {
        /// Flag set being declared.
        type_name: String,
        /// Offending member.
        member: String,
        /// The declared value.
        value: i128,
    },

    /// A declared member reuses a bit claimed by an earlier member.
    #[error("member ({member}) of {type_name} must be unique power of 2, bit {value:#x} already used by ({claimed_by})")]
    DuplicateBit {
        /// Flag set being declared.
        type_name: String,
        /// Offending member.
        member: String,
        /// The declared value.
        value: u64,
        /// Earlier member owning the bit.
        claimed_by: String,
    },

    /// A member name is not an identifier.
    #[error("invalid member name {member:?} in {type_name}")]
    InvalidMemberName {
        /// Flag set being declared.
        type_name: String,
        /// Offending name.
        member: String,
    },

    /// A member name was declared twice.
    #[error("member ({member}) declared twice in {type_name}")]
    DuplicateName {
        /// Flag set being declared.
        type_name: String,
        /// Repeated name.
        member: String,
    },

    /// Textual declaration could not be parsed.
    #[error("malformed flag set declaration: {reason}")]
    MalformedDeclaration {
        /// What was wrong.
        reason: String,
    },

    /// Requested value is negative or uses bits outside the aggregated mask.
    #[error("requested value ({value}) can not be composed of known flags of {type_name}")]
    UnknownBits {
        /// Flag set the value was requested from.
        type_name: String,
        /// The requested value.
        value: i128,
    },

    /// Lookup of a member name the flag set does not declare.
    #[error("{type_name} has no member ({member})")]
    UnknownMember {
        /// Flag set searched.
        type_name: String,
        /// Missing name.
        member: String,
    },

    /// Registry lookup of a flag set name that was never declared.
    #[error("no flag set named {name} is registered")]
    UnknownFlagSet {
        /// Requested name.
        name: String,
    },

    /// Attempt to redefine or extend a flag set after it was built.
    #[error("can't set attribute on an enum class: {type_name} is already built")]
    FrozenTypeMutation {
        /// Flag set that is frozen.
        type_name: String,
    },

    /// Use of a disabled in-place operator.
    #[error("unable to call method ({op}) on enum type {type_name}")]
    UnsupportedOperation {
        /// Flag set of the receiver.
        type_name: String,
        /// The rejected operator.
        op: Operator,
    },

    /// Ordering across flag sets, or between a flag and a plain integer.
    #[error("unorderable types: {left} {right}")]
    Incomparable {
        /// Type name of the left operand.
        left: String,
        /// Type name of the right operand.
        right: String,
    },

    /// Integer arithmetic failed before the result could be wrapped.
    #[error("{op} on {type_name}: {reason}")]
    Arithmetic {
        /// Flag set of the flag operand.
        type_name: String,
        /// Operator that failed.
        op: BinaryOp,
        /// Overflow, division by zero, negative shift or exponent.
        reason: &'static str,
    },
}

impl FlagError {
    /// Error family of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidMemberType { .. } | Self::Incomparable { .. } => ErrorKind::Type,
            Self::FrozenTypeMutation { .. }
            | Self::UnknownMember { .. }
            | Self::UnknownFlagSet { .. } => ErrorKind::Attribute,
            Self::UnsupportedOperation { .. } => ErrorKind::NotImplemented,
            Self::ZeroValue { .. }
            | Self::NotPowerOfTwo { .. }
            | Self::OutOfRange { .. }
            | Self::DuplicateBit { .. }
            | Self::InvalidMemberName { .. }
            | Self::DuplicateName { .. }
            | Self::MalformedDeclaration { .. }
            | Self::UnknownBits { .. }
            | Self::Arithmetic { .. } => ErrorKind::Value,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_member() {
        let err = FlagError::NotPowerOfTwo {
            type_name: "Perm".into(),
            member: "rw".into(),
            value: 3,
        };
        assert_eq!(err.to_string(), "member (rw) of Perm must be a power of 2, got 3");
        assert_eq!(err.kind(), ErrorKind::Value);
    }

    #[test]
    fn unknown_bits_message() {
        let err = FlagError::UnknownBits {
            type_name: "Gap".into(),
            value: 9,
        };
        assert_eq!(
            err.to_string(),
            "requested value (9) can not be composed of known flags of Gap"
        );
    }

    #[test]
    fn kinds() {
        let frozen = FlagError::FrozenTypeMutation {
            type_name: "Perm".into(),
        };
        assert_eq!(frozen.kind(), ErrorKind::Attribute);

        let unordered = FlagError::Incomparable {
            left: "Perm".into(),
            right: "int".into(),
        };
        assert_eq!(unordered.kind(), ErrorKind::Type);
        assert_eq!(unordered.to_string(), "unorderable types: Perm int");

        let missing = FlagError::UnknownFlagSet {
            name: "Perm".into(),
        };
        assert_eq!(missing.kind(), ErrorKind::Attribute);
        assert_eq!(missing.to_string(), "no flag set named Perm is registered");
    }
}
