//! Requested-name resolution.

use crate::activation::outcome::UnknownIdentityRequested;
use crate::identity::set::{IdentityEntry, IdentitySet};

/// Entry an activation will target, plus the fallback note when the request
/// named no known identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution<'a> {
    pub entry: &'a IdentityEntry,
    pub fallback: Option<UnknownIdentityRequested>,
}

/// Resolves `requested` against `set`.
///
/// - `None` and `""` resolve to the default identity.
/// - An exact id or alias-class match resolves to that identity.
/// - Anything else resolves to the default identity with a fallback note.
pub fn resolve<'a>(set: &'a IdentitySet, requested: Option<&str>) -> Resolution<'a> {
    let name = match requested {
        None | Some("") => {
            return Resolution {
                entry: set.default_entry(),
                fallback: None,
            }
        }
        Some(name) => name,
    };

    match set.lookup(name) {
        Some(entry) => Resolution {
            entry,
            fallback: None,
        },
        None => Resolution {
            entry: set.default_entry(),
            fallback: Some(UnknownIdentityRequested {
                requested: name.to_string(),
            }),
        },
    }
}
