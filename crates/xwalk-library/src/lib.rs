//! # xwalk-library — Versioned Requirement Catalogs
//!
//! The requirement library side of the Crosswalk Stack:
//!
//! - [`FrameworkVersion`] and the version lifecycle
//!   (`draft → published → active → superseded → retired`) with the
//!   single-active-version invariant enforced by [`VersionManager`].
//! - [`MasterRequirement`] and [`RequirementLibrary`], the per-version
//!   requirement sets keyed by requirement code.
//! - Catalog ingestion ([`catalog`]): YAML/JSON catalog documents with
//!   layered validation and a content-addressed catalog digest.
//! - Case-insensitive requirement [`search`].
//!
//! Writes flow through catalog ingestion; the scoring and drift engines
//! treat this crate as read-only.

pub mod catalog;
pub mod requirement;
pub mod search;
pub mod version;

pub use catalog::{
    catalog_digest, ingest_catalog, validate_catalog, CatalogDocument, CatalogRequirement,
    CatalogValidationResult, IngestOutcome,
};
pub use requirement::{MasterRequirement, RequirementLibrary};
pub use version::{
    ActivationOutcome, ChangeKind, FrameworkVersion, VersionChange, VersionManager,
};
