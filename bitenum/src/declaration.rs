//! Textual flag-set declarations and integer literals.
//!
//! A declaration names the flag set and lists its members:
//!
//! ```text
//! Perm {
//!     read = 1,
//!     write = 0b10,
//!     exec = 0x4,
//! }
//! ```
//!
//! Values are kept as text until [`FlagSetTypeBuilder::finish`] so a value
//! that is not an integer literal fails validation with the member's name,
//! exactly like a bad value passed to the builder directly.

use core::str::FromStr;

use crate::builder::FlagSetTypeBuilder;
use crate::error::{FlagError, Result};
use crate::flag_set::FlagSetType;

impl FromStr for FlagSetTypeBuilder {
    type Err = FlagError;

    fn from_str(text: &str) -> Result<Self> {
        let (name, rest) = text
            .trim()
            .split_once('{')
            .ok_or_else(|| malformed("expected `{` after the type name"))?;

        let name = name.trim();
        if !is_identifier(name) {
            return Err(malformed(format!("invalid type name {name:?}")));
        }

        let body = rest
            .trim_end()
            .strip_suffix('}')
            .ok_or_else(|| malformed("expected closing `}`"))?;

        let mut builder = FlagSetTypeBuilder::new(name);
        for entry in body.split(',').map(str::trim) {
            if entry.is_empty() {
                continue;
            }
            let (member, value) = entry
                .split_once('=')
                .ok_or_else(|| malformed(format!("expected `name = value`, got {entry:?}")))?;
            builder = builder.member_text(member.trim(), value.trim());
        }
        Ok(builder)
    }
}

impl FlagSetType {
    /// Parses and builds a flag set from its textual declaration.
    ///
    /// ```
    /// use bitenum::FlagSetType;
    ///
    /// let gap = FlagSetType::declare("Gap { two = 2, eight = 8, thirtytwo = 32 }").unwrap();
    /// assert_eq!(gap.mask(), 42);
    /// assert!(gap.flag(9).is_err());
    /// ```
    pub fn declare(text: &str) -> Result<FlagSetType> {
        text.parse::<FlagSetTypeBuilder>()?.finish()
    }
}

fn malformed(reason: impl Into<String>) -> FlagError {
    FlagError::MalformedDeclaration {
        reason: reason.into(),
    }
}

/// `[A-Za-z][A-Za-z0-9_]*`
pub(crate) fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() => {
            chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        _ => false,
    }
}

/// Parses an integer literal: optional sign, optional `0x`/`0o`/`0b`
/// prefix, `_` allowed between digits.
pub(crate) fn parse_int(text: &str) -> Option<i128> {
    let text = text.trim();
    let (negative, unsigned) = match text.as_bytes().first()? {
        b'-' => (true, &text[1..]),
        b'+' => (false, &text[1..]),
        _ => (false, text),
    };

    let (radix, digits) = match unsigned.get(..2) {
        Some("0x" | "0X") => (16, &unsigned[2..]),
        Some("0o" | "0O") => (8, &unsigned[2..]),
        Some("0b" | "0B") => (2, &unsigned[2..]),
        _ => (10, unsigned),
    };

    if digits.is_empty() || digits.starts_with('_') || digits.ends_with('_') {
        return None;
    }
    let cleaned: String = digits.chars().filter(|&c| c != '_').collect();
    // from_str_radix takes its own sign, which would let "--1" through
    if cleaned.starts_with(['+', '-']) {
        return None;
    }

    let magnitude = i128::from_str_radix(&cleaned, radix).ok()?;
    Some(if negative { -magnitude } else { magnitude })
}
