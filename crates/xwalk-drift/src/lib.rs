//! # xwalk-drift — Drift Detection Engine
//!
//! When a framework transitions from one version to the next, existing
//! crosswalk mappings and questionnaire answers may stop holding. This
//! crate decides which ones, how badly, and what to do about it:
//!
//! - [`analyze`]: the change-analysis rule set for a (old requirement,
//!   new requirement, existing answer) triple.
//! - [`matcher`]: keyword-overlap matching of controls against new
//!   requirements, also exposed as ranked mapping suggestions.
//! - [`detect`]: the version-transition scan producing drift records and
//!   mapping status flips as one atomic result set.
//! - [`record`] / [`resolution`]: the drift record, its audit-trail
//!   history, and the acknowledge/resolve lifecycle.
//! - [`compare`]: the side-by-side version comparator with the
//!   positional word differ.

pub mod analyze;
pub mod compare;
pub mod detect;
pub mod matcher;
pub mod record;
pub mod resolution;

pub use analyze::{analyze_change, ChangeAnalysis};
pub use compare::{
    compare_versions, diff_words, ChangeType, CurrentComplianceStatus, DiffSegment,
    DiffSegmentKind, ProjectedComplianceStatus, VersionComparison,
};
pub use detect::{detect_drift, DriftScanConfig, DriftScanOutcome};
pub use matcher::{suggest_mappings, MappingSuggestion, MatcherConfig};
pub use record::{ComplianceDrift, DriftTransition};
pub use resolution::{DriftResolution, DriftStore};
