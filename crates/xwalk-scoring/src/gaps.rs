//! # Gap Detector
//!
//! A full, deterministic pass over every requirement of the frameworks'
//! active versions — never a per-event patch. Each pass re-derives the
//! gap set from scratch and preserves user triage (id, status, notes,
//! first-detected timestamp) by requirement id, so recomputing because
//! an unrelated requirement changed does not reset anyone's work.
//!
//! Severity for unmapped requirements comes from keyword heuristics.
//! The heuristics are best-effort classifiers, not authoritative: an
//! unmatched case always falls back to `low`, never errors.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use xwalk_core::{
    EffortEstimate, GapId, GapStatus, GapType, IdProvider, RequirementId, ResolutionOption,
    ResolutionType, Severity, VersionId,
};
use xwalk_crosswalk::MappingStore;
use xwalk_library::MasterRequirement;

use crate::coverage::aggregate_coverage;

// ---------------------------------------------------------------------------
// Record type
// ---------------------------------------------------------------------------

/// A requirement with zero or insufficient crosswalk coverage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CustomGap {
    pub id: GapId,
    pub requirement_id: RequirementId,
    pub framework_version_id: VersionId,
    pub requirement_code: String,
    pub gap_type: GapType,
    pub severity: Severity,
    /// Aggregated coverage at detection time (0 for unmapped).
    pub coverage: u8,
    /// Fixed ordered option templates; the caller selects one.
    pub resolution_options: Vec<ResolutionOption>,
    pub status: GapStatus,
    /// Free-form triage notes; preserved across recomputation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    /// Evidence attached directly, for gaps resolved without a control.
    #[serde(default)]
    pub direct_evidence: Vec<String>,
    pub first_detected_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Thresholds
// ---------------------------------------------------------------------------

/// Coverage thresholds for gap detection. Tunable, not magic numbers.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct GapThresholds {
    /// Coverage below this is an `insufficient_coverage` gap.
    pub coverage_floor: u8,
    /// Coverage below this raises the gap's severity to high.
    pub severe_floor: u8,
}

impl Default for GapThresholds {
    fn default() -> Self {
        Self {
            coverage_floor: 80,
            severe_floor: 50,
        }
    }
}

// ---------------------------------------------------------------------------
// Severity heuristics
// ---------------------------------------------------------------------------

/// Requirement-code prefixes that indicate technical safeguards
/// (SOC 2 logical access, HIPAA §164.312, NIST 800-53 SC/IA families).
const TECHNICAL_CODE_PATTERNS: &[&str] = &["cc6", "164.312", "sc-", "ia-"];

const CRITICAL_KEYWORDS: &[&str] = &["encryption", "authentication", "cryptograph"];
const HIGH_KEYWORDS: &[&str] = &["access", "audit", "incident", "backup"];
const MEDIUM_KEYWORDS: &[&str] = &["policy", "procedure", "training"];

/// Infer severity for a requirement with no mapped controls.
///
/// Best-effort keyword classifier over code, title, and official text.
/// Never errors: nothing matched means `low`.
pub fn unmapped_gap_severity(requirement: &MasterRequirement) -> Severity {
    let code = requirement.requirement_code.to_lowercase();
    let text = format!(
        "{} {} {}",
        code,
        requirement.title.to_lowercase(),
        requirement.official_text.to_lowercase()
    );

    if TECHNICAL_CODE_PATTERNS.iter().any(|p| code.starts_with(p))
        || CRITICAL_KEYWORDS.iter().any(|k| text.contains(k))
    {
        return Severity::Critical;
    }
    if HIGH_KEYWORDS.iter().any(|k| text.contains(k)) {
        return Severity::High;
    }
    if MEDIUM_KEYWORDS.iter().any(|k| text.contains(k)) {
        return Severity::Medium;
    }
    Severity::Low
}

// ---------------------------------------------------------------------------
// Resolution templates
// ---------------------------------------------------------------------------

/// The fixed ordered resolution option templates attached to every gap.
pub fn gap_resolution_templates(gap_type: GapType) -> Vec<ResolutionOption> {
    let create_control_effort = match gap_type {
        GapType::NoControlMapped => EffortEstimate::High,
        GapType::InsufficientCoverage
        | GapType::ControlNotImplemented
        | GapType::EvidenceMissing => EffortEstimate::Medium,
    };
    vec![
        ResolutionOption::new(
            ResolutionType::CreateControl,
            "Create a new control addressing this requirement",
            create_control_effort,
        ),
        ResolutionOption::new(
            ResolutionType::UploadEvidence,
            "Attach direct evidence demonstrating the requirement is met",
            EffortEstimate::Low,
        ),
        ResolutionOption::new(
            ResolutionType::CreatePolicy,
            "Author a policy document covering the requirement",
            EffortEstimate::Medium,
        ),
        ResolutionOption::new(
            ResolutionType::CompensatingControl,
            "Install a compensating control that mitigates the same risk",
            EffortEstimate::Medium,
        ),
        ResolutionOption::new(
            ResolutionType::AcceptRisk,
            "Accept the risk and document the rationale",
            EffortEstimate::Low,
        ),
    ]
}

// ---------------------------------------------------------------------------
// Recomputation pass
// ---------------------------------------------------------------------------

/// Recompute the gap set for a collection of requirements.
///
/// `existing` is the previous gap set; any gap for a requirement that is
/// still a gap keeps its id, status, notes, direct evidence, and
/// first-detected timestamp. Requirements that are no longer gaps simply
/// produce no record in the result — the pass replaces the collection
/// wholesale.
pub fn recalculate_gaps<'a>(
    requirements: impl Iterator<Item = &'a MasterRequirement>,
    mappings: &MappingStore,
    existing: &[CustomGap],
    thresholds: GapThresholds,
    ids: &dyn IdProvider,
    now: DateTime<Utc>,
) -> Result<Vec<CustomGap>, xwalk_core::CoreError> {
    let prior: BTreeMap<&RequirementId, &CustomGap> =
        existing.iter().map(|g| (&g.requirement_id, g)).collect();

    let mut result = Vec::new();
    for requirement in requirements {
        let current = mappings.current_for_requirement(&requirement.id);

        let (gap_type, severity, coverage) = if current.is_empty() {
            (GapType::NoControlMapped, unmapped_gap_severity(requirement), 0)
        } else {
            let percents: Vec<_> = current.iter().map(|m| m.coverage_percentage).collect();
            let coverage = aggregate_coverage(&percents);
            if coverage >= thresholds.coverage_floor {
                continue;
            }
            let severity = if coverage < thresholds.severe_floor {
                Severity::High
            } else {
                Severity::Medium
            };
            (GapType::InsufficientCoverage, severity, coverage)
        };

        let gap = match prior.get(&requirement.id) {
            Some(prev) => CustomGap {
                id: prev.id.clone(),
                requirement_id: requirement.id.clone(),
                framework_version_id: requirement.framework_version_id.clone(),
                requirement_code: requirement.requirement_code.clone(),
                gap_type,
                severity,
                coverage,
                resolution_options: gap_resolution_templates(gap_type),
                status: prev.status,
                notes: prev.notes.clone(),
                direct_evidence: prev.direct_evidence.clone(),
                first_detected_at: prev.first_detected_at,
            },
            None => CustomGap {
                id: GapId::new(ids.next_id())?,
                requirement_id: requirement.id.clone(),
                framework_version_id: requirement.framework_version_id.clone(),
                requirement_code: requirement.requirement_code.clone(),
                gap_type,
                severity,
                coverage,
                resolution_options: gap_resolution_templates(gap_type),
                status: GapStatus::Identified,
                notes: None,
                direct_evidence: Vec::new(),
                first_detected_at: now,
            },
        };
        result.push(gap);
    }

    tracing::debug!(gaps = result.len(), "gap recalculation pass complete");
    Ok(result)
}
