//! Closed bit-flag enumerations with interned instances.
//!
//! `bitenum` models a flag set the way a typed enum would: a fixed list of
//! named members, each a distinct power of two, declared once and validated
//! up front. Values of the set ([`Flag`]) are any combination of members and
//! are interned by their flag set, so every request for the same value gets
//! the same instance.
//!
//! Operators stay inside the flag set: `|`, `&`, `^`, shifts and arithmetic
//! wrap their integer result back into the flag set (failing if it leaves the
//! mask), and `!` complements relative to the declared members.
//!
//! # Example
//!
//! ```
//! use bitenum::{FlagError, FlagSetType};
//!
//! let gap = FlagSetType::builder("Gap")
//!     .member("two", 2)
//!     .member("eight", 8)
//!     .member("thirtytwo", 32)
//!     .finish()
//!     .unwrap();
//!
//! let eight = gap.member("eight").unwrap();
//!
//! // Complement only flips declared bits
//! assert_eq!(!eight, gap.flag(34).unwrap());
//!
//! // Bit 0 is not a member
//! assert!(matches!(gap.flag(9), Err(FlagError::UnknownBits { .. })));
//!
//! // Iteration yields members in ascending order
//! let members: Vec<_> = gap.all().iter().filter_map(|f| f.name()).collect();
//! assert_eq!(members, ["two", "eight", "thirtytwo"]);
//! ```

#![warn(missing_docs)]

mod bit_enum;
mod builder;
mod declaration;
mod error;
mod flag;
mod flag_set;
mod operand;
mod ops;
mod registry;

pub use bit_enum::BitEnum;
pub use builder::FlagSetTypeBuilder;
pub use error::{ErrorKind, FlagError, Result};
pub use flag::{Flag, Iter, sort_flags};
pub use flag_set::{FlagSetType, Members, Slot};
pub use operand::{Operand, try_sort};
pub use ops::{BinaryOp, Operator, UnknownOperator};
pub use registry::Registry;

#[cfg(feature = "derive")]
pub use bitenum_derive::BitEnum;
