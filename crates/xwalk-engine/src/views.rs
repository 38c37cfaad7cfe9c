//! Read models for dashboards.
//!
//! Snapshots handed to the UI layer. Everything here is a plain
//! serializable value — collaborators read these, they never reach
//! into the engine's stores.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use xwalk_core::{FrameworkId, VersionId};
use xwalk_drift::ComplianceDrift;
use xwalk_scoring::{CustomGap, DomainBreakdown, FrameworkCoverageSummary, RiskScoreReport};

/// Result of a catalog ingestion.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestReport {
    pub framework_id: FrameworkId,
    pub version_id: VersionId,
    pub requirement_count: usize,
    /// Advisory validation warnings; ingestion succeeded despite them.
    pub warnings: Vec<String>,
    /// Content digest of the ingested catalog.
    pub digest: String,
}

/// Result of a version activation, including the automatic drift scan
/// against the superseded version when one existed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActivationReport {
    pub activated: VersionId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub superseded: Option<VersionId>,
    /// Drift records emitted by the activation scan.
    pub drifts_detected: usize,
    /// Mappings flipped to at_risk/drifted by the scan.
    pub mappings_flagged: usize,
}

/// Result of an explicit drift scan.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DriftScanReport {
    pub old_version: VersionId,
    pub new_version: VersionId,
    pub drifts_detected: usize,
    pub mappings_flagged: usize,
}

/// Result of a gap recalculation pass.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GapRecalculationReport {
    pub total_gaps: usize,
    pub open_gaps: usize,
}

/// One open drift record with its deadline distance materialized at
/// read time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenDrift {
    pub drift: ComplianceDrift,
    pub days_remaining: i64,
}

impl OpenDrift {
    pub fn from_record(drift: &ComplianceDrift, now: DateTime<Utc>) -> Self {
        Self {
            drift: drift.clone(),
            days_remaining: drift.days_remaining(now),
        }
    }
}

/// Combined dashboard snapshot for one organization.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardSnapshot {
    pub frameworks: Vec<FrameworkCoverageSummary>,
    pub domains: Vec<DomainBreakdown>,
    pub risk: RiskScoreReport,
    /// Open drift records, ascending days remaining.
    pub open_drifts: Vec<OpenDrift>,
    /// Open gaps, most severe first.
    pub open_gaps: Vec<CustomGap>,
    pub generated_at: DateTime<Utc>,
}
