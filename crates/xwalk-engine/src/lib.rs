//! # xwalk-engine — The Crosswalk Engine
//!
//! The explicitly constructed engine object that ties the stack
//! together. An engine instance owns the framework versions, the
//! requirement library, the crosswalk, and the gap/drift collections;
//! it borrows the organization's control inventory, answer store, and
//! id generator through injected collaborator traits. No global state:
//! construct one engine per tenant, or one per test.
//!
//! ## Atomicity
//!
//! Recomputation passes (gap recalculation, drift scans) are computed
//! as pure functions over a read snapshot, then published wholesale
//! under a single write lock. Readers never observe a partially
//! replaced collection, and a failed pass leaves prior state untouched.

pub mod config;
pub mod engine;
pub mod store;
pub mod views;

pub use config::EngineConfig;
pub use engine::{CrosswalkEngine, NewMappingRequest};
pub use store::GapStore;
pub use views::{
    ActivationReport, DashboardSnapshot, DriftScanReport, GapRecalculationReport, IngestReport,
    OpenDrift,
};
