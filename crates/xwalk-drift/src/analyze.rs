//! # Change Analysis
//!
//! Given the old and new revisions of one requirement plus the
//! organization's existing answer, decide whether drift occurred, what
//! kind, how severe, and whether the previous answer can be carried
//! forward.
//!
//! The rules run in a fixed cascade. Each firing rule overwrites the
//! drift type and raises the running severity to a floor — severity
//! only ever moves up, so an escalation to critical earlier in the
//! cascade survives later rules that would set a lower floor.
//!
//! `answer_still_valid` defaults to true and is only forced false by
//! the rules that say so: a mandatory escalation against a "no"/"na"
//! answer, and the appearance of an emerging-technology category
//! (technology-specific requirements always require human re-review).

use serde::{Deserialize, Serialize};

use xwalk_core::{ControlAnswer, DriftType, Severity};
use xwalk_library::MasterRequirement;

/// Strengthening keywords whose first appearance in requirement text
/// marks a requirement as strengthened.
const STRENGTHENING_KEYWORDS: &[&str] = &["must", "shall", "required", "mandatory", "always", "all"];

/// Result of analyzing one (old, new, answer) triple.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChangeAnalysis {
    /// Whether any rule fired. When false, no drift record is emitted.
    pub has_drift: bool,
    /// Classification of the last rule that fired.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub drift_type: Option<DriftType>,
    pub severity: Severity,
    pub answer_still_valid: bool,
    /// Human-readable explanation of the validity decision.
    pub validity_reason: String,
    /// One line per detected change, in rule order.
    pub detected_changes: Vec<String>,
}

/// Lowercase word set of a requirement's official text.
fn word_set(text: &str) -> std::collections::BTreeSet<String> {
    text.split_whitespace()
        .map(|w| {
            w.chars()
                .filter(|c| c.is_alphanumeric())
                .collect::<String>()
                .to_lowercase()
        })
        .filter(|w| !w.is_empty())
        .collect()
}

/// Analyze the transition of one requirement between framework versions.
///
/// `answer` is the existing answer of the control mapped to the old
/// requirement; an unanswered control is treated as "no" (fail-closed).
pub fn analyze_change(
    old: &MasterRequirement,
    new: &MasterRequirement,
    answer: Option<ControlAnswer>,
    risk_weight_jump: i8,
) -> ChangeAnalysis {
    let answer = answer.unwrap_or(ControlAnswer::No);

    let mut has_drift = false;
    let mut drift_type: Option<DriftType> = None;
    let mut severity = Severity::Low;
    let mut answer_still_valid = true;
    let mut forced_invalid_by_tech = false;
    let mut detected_changes: Vec<String> = Vec::new();

    // 1. Text strengthened: new text introduces a strengthening keyword
    //    that was absent before.
    if old.official_text != new.official_text {
        let old_words = word_set(&old.official_text);
        let new_words = word_set(&new.official_text);
        let added: Vec<&str> = STRENGTHENING_KEYWORDS
            .iter()
            .copied()
            .filter(|k| new_words.contains(*k) && !old_words.contains(*k))
            .collect();
        if !added.is_empty() {
            has_drift = true;
            drift_type = Some(DriftType::RequirementStrengthened);
            severity = severity.raised_to(Severity::High);
            detected_changes.push(format!(
                "requirement text strengthened (new keywords: {})",
                added.join(", ")
            ));
        }
    }

    // 2. Implementation level escalated to mandatory.
    if !old.implementation_level.is_mandatory()
        && new.implementation_level.is_mandatory()
        && matches!(
            old.implementation_level,
            xwalk_core::ImplementationLevel::Optional | xwalk_core::ImplementationLevel::Recommended
        )
    {
        has_drift = true;
        drift_type = Some(DriftType::RequirementStrengthened);
        severity = severity.raised_to(Severity::Critical);
        detected_changes.push(format!(
            "implementation level escalated from {} to mandatory",
            old.implementation_level
        ));
        if matches!(answer, ControlAnswer::No | ControlAnswer::NotApplicable) {
            answer_still_valid = false;
        }
    }

    // 3. New required evidence types.
    let new_evidence: Vec<&String> = new
        .required_evidence_types
        .difference(&old.required_evidence_types)
        .collect();
    if !new_evidence.is_empty() {
        has_drift = true;
        drift_type = Some(DriftType::EvidenceTypeChanged);
        severity = severity.raised_to(Severity::Medium);
        detected_changes.push(format!(
            "new required evidence types: {}",
            new_evidence
                .iter()
                .map(|s| s.as_str())
                .collect::<Vec<_>>()
                .join(", ")
        ));
    }

    // 4. Verification frequency tightened.
    if new.verification_frequency.is_stricter_than(old.verification_frequency) {
        has_drift = true;
        drift_type = Some(DriftType::VerificationFrequencyChanged);
        severity = severity.raised_to(Severity::Medium);
        detected_changes.push(format!(
            "verification frequency tightened from {} to {}",
            old.verification_frequency, new.verification_frequency
        ));
    }

    // 5. Risk weight jumped by more than the configured threshold.
    let weight_delta = new.risk_weight.delta(old.risk_weight);
    if weight_delta > risk_weight_jump {
        has_drift = true;
        if drift_type.is_none() {
            drift_type = Some(DriftType::RequirementStrengthened);
        }
        severity = severity.raised_to(Severity::High);
        detected_changes.push(format!(
            "risk weight increased from {} to {}",
            old.risk_weight, new.risk_weight
        ));
    }

    // 6. Emerging-technology category appeared where none existed.
    //    Forces re-review regardless of every other finding.
    if old.emerging_tech_category.is_none() {
        if let Some(category) = new.emerging_tech_category {
            has_drift = true;
            drift_type = Some(DriftType::TechnologySpecific);
            severity = severity.raised_to(Severity::High);
            answer_still_valid = false;
            forced_invalid_by_tech = true;
            detected_changes.push(format!(
                "emerging technology category introduced: {category}"
            ));
        }
    }

    if !has_drift {
        return ChangeAnalysis {
            has_drift: false,
            drift_type: None,
            severity: Severity::Low,
            answer_still_valid: true,
            validity_reason: String::new(),
            detected_changes: Vec::new(),
        };
    }

    let validity_reason = if forced_invalid_by_tech {
        "Technology-specific requirements require human re-review; the previous answer cannot be carried forward automatically.".to_string()
    } else if !answer_still_valid {
        "The requirement is now mandatory and the previous answer no longer demonstrates compliance.".to_string()
    } else {
        "Previous answer remains valid; re-confirmation is recommended for the detected changes.".to_string()
    };

    ChangeAnalysis {
        has_drift,
        drift_type,
        severity,
        answer_still_valid,
        validity_reason,
        detected_changes,
    }
}
