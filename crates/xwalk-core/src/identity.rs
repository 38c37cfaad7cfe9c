//! # Domain Identity Newtypes
//!
//! Newtype wrappers for all identifiers in the crosswalk domain. These
//! prevent accidental identifier confusion — you cannot pass a `ControlId`
//! where a `RequirementId` is expected.
//!
//! Identifiers are opaque non-empty strings. The engine never inspects
//! their structure; the injected id provider decides the format (the
//! default provider emits UUID v4 strings).

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::CoreError;

/// Source of fresh opaque identifiers.
///
/// Injected wherever the engine mints record ids, so tests can supply a
/// deterministic sequence and production uses UUIDs.
pub trait IdProvider: Send + Sync {
    /// Produce a globally unique opaque identifier string.
    fn next_id(&self) -> String;
}

/// Default `IdProvider` backed by UUID v4.
#[derive(Debug, Default, Clone, Copy)]
pub struct UuidProvider;

impl IdProvider for UuidProvider {
    fn next_id(&self) -> String {
        Uuid::new_v4().to_string()
    }
}

macro_rules! identifier {
    ($(#[$doc:meta])* $name:ident, $kind:literal) => {
        $(#[$doc])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Construct from a non-empty string.
            ///
            /// # Errors
            ///
            /// Returns `Validation` if the string is empty or whitespace-only.
            pub fn new(id: impl Into<String>) -> Result<Self, CoreError> {
                let id = id.into();
                if id.trim().is_empty() {
                    return Err(CoreError::Validation(format!(
                        "{} identifier must be non-empty",
                        $kind
                    )));
                }
                Ok(Self(id))
            }

            /// Access the identifier string.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

identifier!(
    /// Identifier of a regulatory framework (e.g. the framework behind
    /// "ISO 27001", independent of any dated revision).
    FrameworkId,
    "framework"
);

identifier!(
    /// Identifier of one dated revision of a framework.
    VersionId,
    "framework version"
);

identifier!(
    /// Identifier of a master requirement within a framework version.
    RequirementId,
    "requirement"
);

identifier!(
    /// Identifier of an organization-internal control.
    ControlId,
    "control"
);

identifier!(
    /// Identifier of a crosswalk mapping record.
    MappingId,
    "mapping"
);

identifier!(
    /// Identifier of a compliance drift record.
    DriftId,
    "drift record"
);

identifier!(
    /// Identifier of a custom gap record.
    GapId,
    "gap record"
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_empty_identifier() {
        assert!(FrameworkId::new("").is_err());
        assert!(ControlId::new("   ").is_err());
    }

    #[test]
    fn accepts_and_displays_identifier() {
        let id = RequirementId::new("req-cc6.1").unwrap();
        assert_eq!(id.as_str(), "req-cc6.1");
        assert_eq!(format!("{id}"), "req-cc6.1");
    }

    #[test]
    fn serializes_transparently() {
        let id = VersionId::new("v-2022").unwrap();
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"v-2022\"");
        let back: VersionId = serde_json::from_str("\"v-2022\"").unwrap();
        assert_eq!(back, id);
    }
}
