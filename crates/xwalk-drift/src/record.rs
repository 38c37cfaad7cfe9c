//! # Compliance Drift Records
//!
//! A drift record is a finding produced by the drift scan — never by a
//! user. Records are never deleted: they move through the resolution
//! lifecycle and every status change appends to the record's history,
//! preserving the audit trail.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use xwalk_core::{
    days_remaining, ControlAnswer, ControlId, DriftId, DriftRecordStatus, DriftType,
    MappingId, RequirementId, ResolutionOption, Severity, VersionId,
};

/// One status transition in a drift record's history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DriftTransition {
    pub from: DriftRecordStatus,
    pub to: DriftRecordStatus,
    pub at: DateTime<Utc>,
    /// Who performed the transition, when known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub by: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

/// A drift finding for one (control, requirement) pair across a
/// version transition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComplianceDrift {
    pub id: DriftId,
    pub control_id: ControlId,
    /// The affected mapping; absent for new-requirement findings, which
    /// have no mapping yet.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mapping_id: Option<MappingId>,
    /// The requirement in the **new** framework version.
    pub requirement_id: RequirementId,
    pub requirement_code: String,
    pub old_framework_version_id: VersionId,
    pub new_framework_version_id: VersionId,
    pub drift_type: DriftType,
    pub severity: Severity,
    /// The control's answer at scan time.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub previous_answer: Option<ControlAnswer>,
    pub answer_still_valid: bool,
    pub validity_reason: String,
    /// One line per detected change, in rule order.
    #[serde(default)]
    pub detected_changes: Vec<String>,
    pub status: DriftRecordStatus,
    /// Ordered typed options; the caller selects one at resolution.
    pub resolution_paths: Vec<ResolutionOption>,
    /// Deadline by which the organization must be compliant with the
    /// new version.
    pub compliance_deadline: DateTime<Utc>,
    pub detected_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resolved_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resolved_by: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resolution_notes: Option<String>,
    /// Status transition audit trail, oldest first.
    #[serde(default)]
    pub history: Vec<DriftTransition>,
}

impl ComplianceDrift {
    /// Days until the compliance deadline, recomputed at read time.
    /// Never cached — see [`days_remaining`].
    pub fn days_remaining(&self, now: DateTime<Utc>) -> i64 {
        days_remaining(self.compliance_deadline, now)
    }

    /// Whether the record still needs attention.
    pub fn is_open(&self) -> bool {
        self.status.is_open()
    }
}
