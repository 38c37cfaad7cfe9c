//! # xwalk-core — Foundational Types for the Crosswalk Stack
//!
//! This crate is the bedrock of the Crosswalk Stack. It defines the core
//! type-system primitives shared by every other crate in the workspace;
//! it depends on nothing internal.
//!
//! ## Key Design Principles
//!
//! 1. **Newtype wrappers for domain primitives.** `FrameworkId`, `VersionId`,
//!    `RequirementId`, `ControlId`, `MappingId`, `DriftId`, `GapId` — all
//!    newtypes with validated constructors. No bare strings for identifiers.
//!
//! 2. **Validated measures.** `CoveragePercent` is guaranteed to be in
//!    [0, 100] and `RiskWeight` in [1, 10] by construction. Out-of-range
//!    values are a `Validation` error at the boundary, never a silent clamp.
//!
//! 3. **Closed enums, exhaustive matches.** Every classification in the
//!    crosswalk domain (implementation level, verification frequency,
//!    mapping strength, drift type, severity, ...) is a closed enum.
//!    Adding a variant forces every consumer to handle it.
//!
//! 4. **`CanonicalBytes` newtype.** All digest computation flows through
//!    `CanonicalBytes::new()`. No raw `serde_json::to_vec()` for digests.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `xwalk-*` crates (this is the leaf of the DAG).
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.
//! - All public types derive `Debug`, `Clone`, and implement
//!   `Serialize`/`Deserialize`.

pub mod canonical;
pub mod digest;
pub mod domain;
pub mod error;
pub mod identity;
pub mod measure;
pub mod temporal;

// Re-export primary types for ergonomic imports.
pub use canonical::CanonicalBytes;
pub use digest::{sha256_digest, sha256_hex, ContentDigest, Sha256Accumulator};
pub use domain::{
    ControlAnswer, DriftRecordStatus, DriftType, EffortEstimate, EmergingTechCategory,
    GapStatus, GapType, ImplementationLevel, MappingDriftStatus, MappingStrength,
    ResolutionOption, ResolutionType, RiskLevel, Severity, VerificationFrequency,
    VersionStatus,
};
pub use error::CoreError;
pub use identity::{
    ControlId, DriftId, FrameworkId, GapId, IdProvider, MappingId, RequirementId, UuidProvider,
    VersionId,
};
pub use measure::{CoveragePercent, RiskWeight};
pub use temporal::days_remaining;
