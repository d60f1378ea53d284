//! Named, process-lifetime flag sets.
//!
//! A [`Registry`] is where flag sets live when they are declared at runtime
//! rather than owned by a local. Declaration holds the registry's write lock
//! for the whole build, so two threads declaring the same name are
//! serialized and exactly one of them wins; the other gets
//! [`FlagError::FrozenTypeMutation`].

use std::collections::HashMap;
use std::sync::OnceLock;

use log::debug;
use parking_lot::RwLock;

use crate::builder::FlagSetTypeBuilder;
use crate::error::{FlagError, Result};
use crate::flag_set::FlagSetType;

/// Flag sets by name.
///
/// Registered flag sets are leaked: like the types they describe, they live
/// until the process exits, which is what lets the registry hand out
/// `&'static` references.
///
/// # Example
///
/// ```
/// use bitenum::{FlagError, FlagSetType, Registry};
///
/// let registry = Registry::new();
/// let perm = registry
///     .declare(FlagSetType::builder("Perm").member("read", 1).member("write", 2))
///     .unwrap();
/// assert_eq!(registry.get("Perm").unwrap().mask(), perm.mask());
///
/// let again = registry.declare(FlagSetType::builder("Perm").member("exec", 4));
/// assert!(matches!(again, Err(FlagError::FrozenTypeMutation { .. })));
/// ```
#[derive(Default)]
pub struct Registry {
    types: RwLock<HashMap<String, &'static FlagSetType>>,
}

impl Registry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// The process-wide registry.
    pub fn global() -> &'static Registry {
        static GLOBAL: OnceLock<Registry> = OnceLock::new();
        GLOBAL.get_or_init(Registry::new)
    }

    /// Builds and registers a flag set.
    ///
    /// Fails with [`FlagError::FrozenTypeMutation`] if the name is already
    /// registered, or with the builder's validation error.
    pub fn declare(&self, builder: FlagSetTypeBuilder) -> Result<&'static FlagSetType> {
        let mut types = self.types.write();
        if types.contains_key(builder.name()) {
            return Err(FlagError::FrozenTypeMutation {
                type_name: builder.name().to_owned(),
            });
        }

        let flag_set: &'static FlagSetType = Box::leak(Box::new(builder.finish()?));
        types.insert(flag_set.name().to_owned(), flag_set);
        debug!("registered flag set {} ({} total)", flag_set.name(), types.len());
        Ok(flag_set)
    }

    /// Parses a textual declaration and registers it.
    pub fn declare_text(&self, text: &str) -> Result<&'static FlagSetType> {
        self.declare(text.parse()?)
    }

    /// Looks up a registered flag set.
    pub fn get(&self, name: &str) -> Option<&'static FlagSetType> {
        self.types.read().get(name).copied()
    }

    /// Looks up a registered flag set, failing with
    /// [`FlagError::UnknownFlagSet`] if missing.
    pub fn require(&self, name: &str) -> Result<&'static FlagSetType> {
        self.get(name).ok_or_else(|| FlagError::UnknownFlagSet {
            name: name.to_owned(),
        })
    }

    /// Number of registered flag sets.
    pub fn len(&self) -> usize {
        self.types.read().len()
    }

    /// Returns true if nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.types.read().is_empty()
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.types.read().keys().cloned().collect();
        names.sort();
        names
    }
}
