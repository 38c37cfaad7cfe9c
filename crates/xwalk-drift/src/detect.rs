//! # Version-Transition Drift Scan
//!
//! Invoked when a framework moves from version `Vold` to `Vnew`. For
//! every requirement in the new version:
//!
//! - **Matched** (same requirement code existed in `Vold`): every
//!   crosswalk mapping against the old requirement is analyzed via
//!   [`analyze_change`]; each pair that drifted yields one record plus
//!   a mapping status flip (`at_risk` when the answer still holds,
//!   `drifted` when it does not).
//! - **New** (no matching code): controls are ranked by keyword
//!   overlap; each of the top matches yields a `new_requirement`
//!   record with no answer carried forward.
//!
//! The scan is a pure function of its inputs: it returns the complete
//! result set (records + mapping updates) without touching any store,
//! so the caller can publish everything atomically or discard it on
//! failure. Running the scan twice over identical inputs produces
//! structurally identical results.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use xwalk_core::{
    CoreError, DriftId, DriftRecordStatus, DriftType, EffortEstimate, IdProvider,
    MappingDriftStatus, MappingId, ResolutionOption, ResolutionType, Severity,
};
use xwalk_crosswalk::{AnswerSource, Control, MappingStore};
use xwalk_library::{FrameworkVersion, MasterRequirement, RequirementLibrary};

use crate::analyze::analyze_change;
use crate::matcher::{suggest_mappings, MatcherConfig};
use crate::record::ComplianceDrift;

/// Tunables for the drift scan.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DriftScanConfig {
    pub matcher: MatcherConfig,
    /// Risk-weight increase that must be exceeded to raise severity.
    pub risk_weight_jump: i8,
    /// Fallback remediation window when the new version carries no
    /// transition deadline and the old version no sunset date.
    pub default_remediation_days: i64,
}

impl Default for DriftScanConfig {
    fn default() -> Self {
        Self {
            matcher: MatcherConfig::default(),
            risk_weight_jump: 2,
            default_remediation_days: 90,
        }
    }
}

/// Complete result of one drift scan.
#[derive(Debug, Default)]
pub struct DriftScanOutcome {
    pub drifts: Vec<ComplianceDrift>,
    /// Mapping status flips to apply alongside the new records.
    pub mapping_updates: Vec<(MappingId, MappingDriftStatus)>,
}

fn matched_resolution_paths(drift_type: DriftType) -> Vec<ResolutionOption> {
    match drift_type {
        DriftType::RequirementStrengthened => vec![
            ResolutionOption::new(
                ResolutionType::UpdateControl,
                "Strengthen the mapped control to meet the tightened requirement",
                EffortEstimate::Medium,
            ),
            ResolutionOption::new(
                ResolutionType::AcceptRisk,
                "Accept the risk and document the rationale",
                EffortEstimate::Low,
            ),
        ],
        DriftType::EvidenceTypeChanged => vec![
            ResolutionOption::new(
                ResolutionType::UploadEvidence,
                "Collect and attach the newly required evidence types",
                EffortEstimate::Low,
            ),
            ResolutionOption::new(
                ResolutionType::UpdateControl,
                "Extend the mapped control's evidence collection",
                EffortEstimate::Medium,
            ),
        ],
        DriftType::VerificationFrequencyChanged => vec![
            ResolutionOption::new(
                ResolutionType::UpdateControl,
                "Increase the control's verification cadence",
                EffortEstimate::Medium,
            ),
            ResolutionOption::new(
                ResolutionType::AcceptRisk,
                "Accept the risk and document the rationale",
                EffortEstimate::Low,
            ),
        ],
        DriftType::TechnologySpecific => vec![
            ResolutionOption::new(
                ResolutionType::UpdateControl,
                "Re-assess the mapped control against the technology-specific requirement",
                EffortEstimate::High,
            ),
            ResolutionOption::new(
                ResolutionType::CreateControl,
                "Create a dedicated control for the technology area",
                EffortEstimate::High,
            ),
        ],
        DriftType::NewRequirement => new_requirement_resolution_paths(),
    }
}

fn new_requirement_resolution_paths() -> Vec<ResolutionOption> {
    vec![
        ResolutionOption::new(
            ResolutionType::UpdateControl,
            "Update the matched existing control to cover the new requirement",
            EffortEstimate::Medium,
        ),
        ResolutionOption::new(
            ResolutionType::CreateControl,
            "Create a new dedicated control for the requirement",
            EffortEstimate::High,
        ),
    ]
}

/// Severity ladder for brand-new requirements. Shared with the version
/// comparator's `added` case.
pub(crate) fn new_requirement_severity(requirement: &MasterRequirement) -> Severity {
    if requirement.implementation_level.is_mandatory() && requirement.risk_weight.value() >= 8 {
        Severity::Critical
    } else if requirement.implementation_level.is_mandatory() {
        Severity::High
    } else if requirement.emerging_tech_category.is_some() {
        Severity::High
    } else if requirement.risk_weight.value() >= 7 {
        Severity::Medium
    } else {
        Severity::Low
    }
}

/// Compliance deadline for records of this transition.
fn transition_deadline(
    old_version: &FrameworkVersion,
    new_version: &FrameworkVersion,
    config: &DriftScanConfig,
) -> DateTime<Utc> {
    new_version
        .transition_deadline
        .or(old_version.sunset_date)
        .unwrap_or_else(|| {
            new_version.effective_date + Duration::days(config.default_remediation_days)
        })
}

/// Run the drift scan for a `Vold → Vnew` framework transition.
///
/// `controls` is the organization's control inventory; `answers` the
/// current questionnaire state. The scan reads the crosswalk but never
/// writes — mapping flips come back in the outcome for the caller to
/// apply.
pub fn detect_drift(
    old_version: &FrameworkVersion,
    new_version: &FrameworkVersion,
    library: &RequirementLibrary,
    mappings: &MappingStore,
    controls: &[Control],
    answers: &dyn AnswerSource,
    config: &DriftScanConfig,
    ids: &dyn IdProvider,
    now: DateTime<Utc>,
) -> Result<DriftScanOutcome, CoreError> {
    let deadline = transition_deadline(old_version, new_version, config);
    let old_requirements = library.requirements_for_version(&old_version.id);
    let new_requirements = library.requirements_for_version(&new_version.id);

    let mut outcome = DriftScanOutcome::default();

    for (code, new_req) in &new_requirements {
        match old_requirements.get(code) {
            Some(old_req) => {
                for mapping in mappings.current_for_requirement(&old_req.id) {
                    let answer = answers.answer(&mapping.control_id);
                    let analysis =
                        analyze_change(old_req, new_req, answer, config.risk_weight_jump);
                    if !analysis.has_drift {
                        continue;
                    }
                    // analyze_change sets a type whenever has_drift holds;
                    // strengthened is the defensive default.
                    let drift_type = analysis
                        .drift_type
                        .unwrap_or(DriftType::RequirementStrengthened);

                    outcome.mapping_updates.push((
                        mapping.id.clone(),
                        if analysis.answer_still_valid {
                            MappingDriftStatus::AtRisk
                        } else {
                            MappingDriftStatus::Drifted
                        },
                    ));

                    outcome.drifts.push(ComplianceDrift {
                        id: DriftId::new(ids.next_id())?,
                        control_id: mapping.control_id.clone(),
                        mapping_id: Some(mapping.id.clone()),
                        requirement_id: new_req.id.clone(),
                        requirement_code: new_req.requirement_code.clone(),
                        old_framework_version_id: old_version.id.clone(),
                        new_framework_version_id: new_version.id.clone(),
                        drift_type,
                        severity: analysis.severity,
                        previous_answer: answer,
                        answer_still_valid: analysis.answer_still_valid,
                        validity_reason: analysis.validity_reason.clone(),
                        detected_changes: analysis.detected_changes.clone(),
                        status: DriftRecordStatus::Detected,
                        resolution_paths: matched_resolution_paths(drift_type),
                        compliance_deadline: deadline,
                        detected_at: now,
                        resolved_at: None,
                        resolved_by: None,
                        resolution_notes: None,
                        history: Vec::new(),
                    });
                }
            }
            None => {
                // Brand-new requirement: surface the closest controls.
                let severity = new_requirement_severity(new_req);
                for suggestion in suggest_mappings(new_req, controls, &config.matcher) {
                    outcome.drifts.push(ComplianceDrift {
                        id: DriftId::new(ids.next_id())?,
                        control_id: suggestion.control_id.clone(),
                        mapping_id: None,
                        requirement_id: new_req.id.clone(),
                        requirement_code: new_req.requirement_code.clone(),
                        old_framework_version_id: old_version.id.clone(),
                        new_framework_version_id: new_version.id.clone(),
                        drift_type: DriftType::NewRequirement,
                        severity,
                        previous_answer: answers.answer(&suggestion.control_id),
                        answer_still_valid: false,
                        validity_reason: format!(
                            "New requirement in this version; control matched on {} keyword(s) and needs assessment.",
                            suggestion.matched_keywords.len()
                        ),
                        detected_changes: vec![format!(
                            "new requirement {} introduced",
                            new_req.requirement_code
                        )],
                        status: DriftRecordStatus::Detected,
                        resolution_paths: new_requirement_resolution_paths(),
                        compliance_deadline: deadline,
                        detected_at: now,
                        resolved_at: None,
                        resolved_by: None,
                        resolution_notes: None,
                        history: Vec::new(),
                    });
                }
            }
        }
    }

    tracing::info!(
        old_version = %old_version.id,
        new_version = %new_version.id,
        drifts = outcome.drifts.len(),
        mapping_updates = outcome.mapping_updates.len(),
        "drift scan complete"
    );
    Ok(outcome)
}
