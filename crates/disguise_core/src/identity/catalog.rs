//! Identity catalogue and platform component references.
//!
//! # Responsibility
//! - Enumerate every launcher identity known at build time.
//! - Map identities to the platform component (activity alias) they toggle.
//!
//! # Invariants
//! - `LauncherIdentity::id()` values are stable and never reused.
//! - `ComponentRef` parts always pass dotted-identifier validation.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Application package the stock catalogue is registered under.
pub const DEFAULT_PACKAGE_NAME: &str = "com.example.photo_and_video_vault_app";

static DOTTED_IDENTIFIER_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*(\.[A-Za-z_][A-Za-z0-9_]*)*$")
        .expect("valid dotted identifier regex")
});

/// One presentable face of the application.
///
/// `Default` is the true identity; every other variant is a disguise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LauncherIdentity {
    Default,
    Calculator,
    Calendar,
    Notes,
    Weather,
    Clock,
}

impl LauncherIdentity {
    /// Every identity in catalogue order, `Default` first.
    pub const ALL: [LauncherIdentity; 6] = [
        Self::Default,
        Self::Calculator,
        Self::Calendar,
        Self::Notes,
        Self::Weather,
        Self::Clock,
    ];

    /// Stable symbolic id.
    pub fn id(self) -> &'static str {
        match self {
            Self::Default => "default",
            Self::Calculator => "calculator",
            Self::Calendar => "calendar",
            Self::Notes => "notes",
            Self::Weather => "weather",
            Self::Clock => "clock",
        }
    }

    /// Activity (alias) class name declared for this identity.
    pub fn alias_class(self) -> &'static str {
        match self {
            Self::Default => "MainActivity",
            Self::Calculator => "MainActivityAliasCalculator",
            Self::Calendar => "MainActivityAliasCalendar",
            Self::Notes => "MainActivityAliasNotes",
            Self::Weather => "MainActivityAliasWeather",
            Self::Clock => "MainActivityAliasClock",
        }
    }

    /// Exact, case-sensitive lookup by symbolic id.
    pub fn from_id(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|identity| identity.id() == value)
    }

    /// Exact, case-sensitive lookup by alias class name.
    pub fn from_alias_class(value: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|identity| identity.alias_class() == value)
    }

    pub fn is_default(self) -> bool {
        matches!(self, Self::Default)
    }

    /// Component reference for this identity inside `package`.
    pub fn component_in(self, package: &str) -> Result<ComponentRef, ComponentRefError> {
        ComponentRef::new(package, format!("{package}.{}", self.alias_class()))
    }
}

impl Display for LauncherIdentity {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.id())
    }
}

/// Opaque handle the component registry resolves to one launchable entry.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ComponentRef {
    package: String,
    class: String,
}

impl ComponentRef {
    /// Creates a component reference from a package and fully qualified class.
    ///
    /// # Errors
    /// - Returns an error when either part is empty or not a dotted identifier.
    pub fn new(
        package: impl Into<String>,
        class: impl Into<String>,
    ) -> Result<Self, ComponentRefError> {
        let package = package.into();
        let class = class.into();
        validate_part("package", &package)?;
        validate_part("class", &class)?;
        Ok(Self { package, class })
    }

    pub fn package(&self) -> &str {
        &self.package
    }

    pub fn class(&self) -> &str {
        &self.class
    }

    /// Class name without its package qualifier.
    pub fn short_class(&self) -> &str {
        self.class.rsplit('.').next().unwrap_or(self.class.as_str())
    }

    /// Flattened form used as the registry key (`package/class`).
    pub fn flatten(&self) -> String {
        format!("{}/{}", self.package, self.class)
    }

    /// Parses the flattened `package/class` form.
    pub fn unflatten(value: &str) -> Result<Self, ComponentRefError> {
        let Some((package, class)) = value.split_once('/') else {
            return Err(ComponentRefError::Malformed(value.to_string()));
        };
        Self::new(package, class)
    }
}

impl Display for ComponentRef {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.package, self.class)
    }
}

/// Component reference validation errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ComponentRefError {
    Empty { part: &'static str },
    InvalidIdentifier { part: &'static str, value: String },
    Malformed(String),
}

impl Display for ComponentRefError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Empty { part } => write!(f, "component {part} must not be empty"),
            Self::InvalidIdentifier { part, value } => {
                write!(f, "component {part} is not a dotted identifier: {value}")
            }
            Self::Malformed(value) => {
                write!(f, "component ref must have the form package/class: {value}")
            }
        }
    }
}

impl Error for ComponentRefError {}

fn validate_part(part: &'static str, value: &str) -> Result<(), ComponentRefError> {
    if value.is_empty() {
        return Err(ComponentRefError::Empty { part });
    }
    if !DOTTED_IDENTIFIER_RE.is_match(value) {
        return Err(ComponentRefError::InvalidIdentifier {
            part,
            value: value.to_string(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{ComponentRef, ComponentRefError, LauncherIdentity, DEFAULT_PACKAGE_NAME};

    #[test]
    fn ids_round_trip_through_lookup() {
        for identity in LauncherIdentity::ALL {
            assert_eq!(LauncherIdentity::from_id(identity.id()), Some(identity));
            assert_eq!(
                LauncherIdentity::from_alias_class(identity.alias_class()),
                Some(identity)
            );
        }
    }

    #[test]
    fn lookup_is_case_sensitive() {
        assert_eq!(LauncherIdentity::from_id("Notes"), None);
        assert_eq!(LauncherIdentity::from_id("NOTES"), None);
        assert_eq!(
            LauncherIdentity::from_alias_class("mainactivityaliasnotes"),
            None
        );
    }

    #[test]
    fn only_default_is_default() {
        let defaults = LauncherIdentity::ALL
            .into_iter()
            .filter(|identity| identity.is_default())
            .count();
        assert_eq!(defaults, 1);
        assert_eq!(LauncherIdentity::ALL[0], LauncherIdentity::Default);
    }

    #[test]
    fn component_in_package_qualifies_alias_class() {
        let component = LauncherIdentity::Weather
            .component_in(DEFAULT_PACKAGE_NAME)
            .expect("valid component");
        assert_eq!(component.package(), DEFAULT_PACKAGE_NAME);
        assert_eq!(
            component.class(),
            "com.example.photo_and_video_vault_app.MainActivityAliasWeather"
        );
        assert_eq!(component.short_class(), "MainActivityAliasWeather");
    }

    #[test]
    fn component_ref_rejects_invalid_parts() {
        assert_eq!(
            ComponentRef::new("", "a.B").expect_err("empty package must fail"),
            ComponentRefError::Empty { part: "package" }
        );
        assert!(matches!(
            ComponentRef::new("com.example", "a..B").expect_err("bad class must fail"),
            ComponentRefError::InvalidIdentifier { part: "class", .. }
        ));
        assert!(matches!(
            ComponentRef::new("com/example", "a.B").expect_err("slash must fail"),
            ComponentRefError::InvalidIdentifier {
                part: "package",
                ..
            }
        ));
    }

    #[test]
    fn flattened_form_parses_back() {
        let component = LauncherIdentity::Clock
            .component_in("com.example.app")
            .expect("valid component");
        let flat = component.flatten();
        assert_eq!(flat, "com.example.app/com.example.app.MainActivityAliasClock");
        assert_eq!(
            ComponentRef::unflatten(&flat).expect("flattened ref parses"),
            component
        );
        assert!(matches!(
            ComponentRef::unflatten("no-separator"),
            Err(ComponentRefError::Malformed(_))
        ));
    }

    #[test]
    fn identity_serializes_as_symbolic_id() {
        let json = serde_json::to_string(&LauncherIdentity::Calculator).expect("serialize");
        assert_eq!(json, "\"calculator\"");
        let parsed: LauncherIdentity = serde_json::from_str("\"clock\"").expect("deserialize");
        assert_eq!(parsed, LauncherIdentity::Clock);
    }
}
