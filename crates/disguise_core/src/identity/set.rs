//! Immutable identity set evaluated by every activation.

use crate::identity::catalog::{
    ComponentRef, ComponentRefError, LauncherIdentity, DEFAULT_PACKAGE_NAME,
};
use std::collections::BTreeSet;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// One identity paired with the registry component that makes it launchable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentityEntry {
    pub identity: LauncherIdentity,
    pub component: ComponentRef,
}

impl IdentityEntry {
    pub fn new(identity: LauncherIdentity, component: ComponentRef) -> Self {
        Self {
            identity,
            component,
        }
    }

    pub fn id(&self) -> &'static str {
        self.identity.id()
    }
}

/// Ordered, validated catalogue of identities.
///
/// # Invariants
/// - Non-empty, with exactly one `LauncherIdentity::Default` entry.
/// - Identities and component refs are unique.
/// - No mutation API exists; share it by reference or `Arc`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentitySet {
    entries: Vec<IdentityEntry>,
    default_index: usize,
}

impl IdentitySet {
    /// Validates and freezes one identity catalogue.
    ///
    /// # Errors
    /// - `Empty` when no entries are given.
    /// - `DuplicateIdentity` / `DuplicateComponent` on repeated keys.
    /// - `MissingDefault` when no entry is the default identity.
    pub fn new(entries: Vec<IdentityEntry>) -> Result<Self, IdentitySetError> {
        if entries.is_empty() {
            return Err(IdentitySetError::Empty);
        }

        let mut identities = BTreeSet::new();
        let mut components = BTreeSet::new();
        let mut default_index = None;
        for (index, entry) in entries.iter().enumerate() {
            if entry.identity.is_default() {
                default_index = Some(index);
            }
            if !identities.insert(entry.identity) {
                return Err(IdentitySetError::DuplicateIdentity(entry.identity));
            }
            if !components.insert(entry.component.clone()) {
                return Err(IdentitySetError::DuplicateComponent(
                    entry.component.clone(),
                ));
            }
        }
        let Some(default_index) = default_index else {
            return Err(IdentitySetError::MissingDefault);
        };

        Ok(Self {
            entries,
            default_index,
        })
    }

    /// Full six-identity catalogue registered under `package`.
    pub fn standard(package: &str) -> Result<Self, IdentitySetError> {
        let entries = LauncherIdentity::ALL
            .into_iter()
            .map(|identity| {
                identity
                    .component_in(package)
                    .map(|component| IdentityEntry::new(identity, component))
            })
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(entries)
    }

    /// Stock catalogue for the shipped application package.
    pub fn builtin() -> Result<Self, IdentitySetError> {
        Self::standard(DEFAULT_PACKAGE_NAME)
    }

    pub fn entries(&self) -> &[IdentityEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, identity: LauncherIdentity) -> Option<&IdentityEntry> {
        self.entries.iter().find(|entry| entry.identity == identity)
    }

    pub fn contains(&self, identity: LauncherIdentity) -> bool {
        self.get(identity).is_some()
    }

    /// The true identity. Always present by construction.
    pub fn default_entry(&self) -> &IdentityEntry {
        &self.entries[self.default_index]
    }

    /// Finds the entry named by `name`.
    ///
    /// Accepts the symbolic id (`notes`) or the alias class
    /// (`MainActivityAliasNotes`). Matching is exact and case-sensitive.
    pub fn lookup(&self, name: &str) -> Option<&IdentityEntry> {
        let identity = LauncherIdentity::from_id(name)
            .or_else(|| LauncherIdentity::from_alias_class(name))?;
        self.get(identity)
    }
}

/// Identity set construction errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IdentitySetError {
    Empty,
    MissingDefault,
    DuplicateIdentity(LauncherIdentity),
    DuplicateComponent(ComponentRef),
    InvalidComponent(ComponentRefError),
}

impl Display for IdentitySetError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Empty => write!(f, "identity set must not be empty"),
            Self::MissingDefault => write!(f, "identity set has no default identity"),
            Self::DuplicateIdentity(identity) => {
                write!(f, "identity declared more than once: {identity}")
            }
            Self::DuplicateComponent(component) => {
                write!(f, "component shared by more than one identity: {component}")
            }
            Self::InvalidComponent(err) => write!(f, "{err}"),
        }
    }
}

impl Error for IdentitySetError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::InvalidComponent(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ComponentRefError> for IdentitySetError {
    fn from(value: ComponentRefError) -> Self {
        Self::InvalidComponent(value)
    }
}
