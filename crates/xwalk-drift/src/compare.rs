//! # Version Comparator & Positional Word Differ
//!
//! Produces the side-by-side comparison record a reviewer sees when a
//! requirement transitions between versions.
//!
//! The differ is **positional**, not edit-distance based: both texts
//! are split on whitespace and walked in lock-step, flagging a
//! `changed` span wherever the words at the same index differ, then
//! flagging the longer side's tail as `added`/`removed`. When word
//! counts match but words shifted (an insertion plus a deletion), this
//! reports spurious `changed` pairs instead of true adds/removes.
//! That behavior is part of the contract — display layers pin it — so
//! do not substitute an LCS diff here.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use xwalk_core::{ControlAnswer, ControlId, CoreError, Severity, VersionId};
use xwalk_crosswalk::{AnswerSource, MappingStore};
use xwalk_library::{FrameworkVersion, RequirementLibrary};

use crate::analyze::analyze_change;
use crate::detect::{new_requirement_severity, DriftScanConfig};

// ---------------------------------------------------------------------------
// Word diff
// ---------------------------------------------------------------------------

/// Classification of one diff position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiffSegmentKind {
    Unchanged,
    Changed,
    Added,
    Removed,
}

/// One word position in the diff.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiffSegment {
    pub position: usize,
    pub kind: DiffSegmentKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub old_word: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub new_word: Option<String>,
}

/// Positional word-level diff of two texts.
pub fn diff_words(old_text: &str, new_text: &str) -> Vec<DiffSegment> {
    let old_words: Vec<&str> = old_text.split_whitespace().collect();
    let new_words: Vec<&str> = new_text.split_whitespace().collect();
    let common = old_words.len().min(new_words.len());

    let mut segments = Vec::with_capacity(old_words.len().max(new_words.len()));
    for i in 0..common {
        let kind = if old_words[i] == new_words[i] {
            DiffSegmentKind::Unchanged
        } else {
            DiffSegmentKind::Changed
        };
        segments.push(DiffSegment {
            position: i,
            kind,
            old_word: Some(old_words[i].to_string()),
            new_word: Some(new_words[i].to_string()),
        });
    }
    for (i, word) in new_words.iter().enumerate().skip(common) {
        segments.push(DiffSegment {
            position: i,
            kind: DiffSegmentKind::Added,
            old_word: None,
            new_word: Some(word.to_string()),
        });
    }
    for (i, word) in old_words.iter().enumerate().skip(common) {
        segments.push(DiffSegment {
            position: i,
            kind: DiffSegmentKind::Removed,
            old_word: Some(word.to_string()),
            new_word: None,
        });
    }
    segments
}

// ---------------------------------------------------------------------------
// Comparison record
// ---------------------------------------------------------------------------

/// What happened to the requirement between the two versions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeType {
    /// The requirement did not exist in the old version.
    Added,
    /// Text or attributes changed.
    Modified,
    Unchanged,
}

/// Compliance standing against the old version, from current answers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CurrentComplianceStatus {
    /// Every affected control answered yes.
    Compliant,
    /// Some answered yes and none outright failed.
    Partial,
    NonCompliant,
    /// No affected controls exist.
    Unknown,
}

/// Projected standing against the new version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProjectedComplianceStatus {
    /// Every affected control's answer is yes and remains valid.
    Compliant,
    /// At least one answer is yes and remains valid.
    AtRisk,
    /// At least one mapping is explicitly invalidated.
    NonCompliant,
    NeedsReview,
}

/// The side-by-side comparison record for one requirement transition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VersionComparison {
    pub requirement_code: String,
    pub old_version_id: VersionId,
    pub new_version_id: VersionId,
    pub change_type: ChangeType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub old_text: Option<String>,
    pub new_text: String,
    pub diff: Vec<DiffSegment>,
    pub change_severity: Severity,
    pub affected_controls: Vec<ControlId>,
    pub current_compliance_status: CurrentComplianceStatus,
    pub projected_compliance_status: ProjectedComplianceStatus,
}

/// Build the comparison record for one requirement code across a
/// version transition.
///
/// # Errors
///
/// `NotFound` when the code does not exist in the new version. (A code
/// absent from the old version is the `added` case, not an error.)
pub fn compare_versions(
    requirement_code: &str,
    old_version: &FrameworkVersion,
    new_version: &FrameworkVersion,
    library: &RequirementLibrary,
    mappings: &MappingStore,
    answers: &dyn AnswerSource,
    config: &DriftScanConfig,
) -> Result<VersionComparison, CoreError> {
    let new_req = library
        .by_code(&new_version.id, requirement_code)
        .ok_or_else(|| CoreError::not_found("requirement", requirement_code))?;
    let old_req = library.by_code(&old_version.id, requirement_code);

    match old_req {
        None => Ok(VersionComparison {
            requirement_code: requirement_code.to_string(),
            old_version_id: old_version.id.clone(),
            new_version_id: new_version.id.clone(),
            change_type: ChangeType::Added,
            old_text: None,
            new_text: new_req.official_text.clone(),
            diff: diff_words("", &new_req.official_text),
            change_severity: new_requirement_severity(new_req),
            affected_controls: Vec::new(),
            current_compliance_status: CurrentComplianceStatus::Unknown,
            projected_compliance_status: ProjectedComplianceStatus::NeedsReview,
        }),
        Some(old_req) => {
            let affected: Vec<(ControlId, Option<ControlAnswer>)> = mappings
                .current_for_requirement(&old_req.id)
                .into_iter()
                .map(|m| (m.control_id.clone(), answers.answer(&m.control_id)))
                .collect();

            // Severity comes from the change itself, not any one
            // control's answer; a neutral yes isolates the rules that
            // depend only on the requirement pair.
            let neutral = analyze_change(
                old_req,
                new_req,
                Some(ControlAnswer::Yes),
                config.risk_weight_jump,
            );
            let text_changed = old_req.official_text != new_req.official_text;
            let change_type = if neutral.has_drift || text_changed {
                ChangeType::Modified
            } else {
                ChangeType::Unchanged
            };
            let change_severity = if neutral.has_drift {
                neutral.severity
            } else {
                Severity::Low
            };

            let current = current_status(&affected);
            let projected = projected_status(&affected, |answer| {
                analyze_change(old_req, new_req, answer, config.risk_weight_jump)
                    .answer_still_valid
            });

            Ok(VersionComparison {
                requirement_code: requirement_code.to_string(),
                old_version_id: old_version.id.clone(),
                new_version_id: new_version.id.clone(),
                change_type,
                old_text: Some(old_req.official_text.clone()),
                new_text: new_req.official_text.clone(),
                diff: diff_words(&old_req.official_text, &new_req.official_text),
                change_severity,
                affected_controls: affected.iter().map(|(c, _)| c.clone()).collect(),
                current_compliance_status: current,
                projected_compliance_status: projected,
            })
        }
    }
}

fn current_status(affected: &[(ControlId, Option<ControlAnswer>)]) -> CurrentComplianceStatus {
    if affected.is_empty() {
        return CurrentComplianceStatus::Unknown;
    }
    let answers: Vec<ControlAnswer> = affected
        .iter()
        .map(|(_, a)| a.unwrap_or(ControlAnswer::No))
        .collect();
    if answers.iter().all(|a| a.is_implemented()) {
        CurrentComplianceStatus::Compliant
    } else if answers.iter().any(|a| a.is_implemented())
        && !answers.iter().any(|a| matches!(a, ControlAnswer::No))
    {
        CurrentComplianceStatus::Partial
    } else {
        CurrentComplianceStatus::NonCompliant
    }
}

fn projected_status(
    affected: &[(ControlId, Option<ControlAnswer>)],
    mut still_valid: impl FnMut(Option<ControlAnswer>) -> bool,
) -> ProjectedComplianceStatus {
    if affected.is_empty() {
        return ProjectedComplianceStatus::NeedsReview;
    }
    let verdicts: Vec<(bool, bool)> = affected
        .iter()
        .map(|(_, answer)| {
            let valid = still_valid(*answer);
            let yes = answer.unwrap_or(ControlAnswer::No).is_implemented();
            (yes && valid, valid)
        })
        .collect();

    if verdicts.iter().all(|(ok, _)| *ok) {
        ProjectedComplianceStatus::Compliant
    } else if verdicts.iter().any(|(ok, _)| *ok) {
        ProjectedComplianceStatus::AtRisk
    } else if verdicts.iter().any(|(_, valid)| !valid) {
        ProjectedComplianceStatus::NonCompliant
    } else {
        ProjectedComplianceStatus::NeedsReview
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    use xwalk_core::{
        CoveragePercent, FrameworkId, ImplementationLevel, MappingStrength, RequirementId,
        RiskWeight, UuidProvider, VerificationFrequency, VersionStatus,
    };
    use xwalk_crosswalk::{InMemoryAnswerSource, NewMapping};
    use xwalk_library::MasterRequirement;

    fn ts(s: &str) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(s).unwrap().with_timezone(&Utc)
    }

    // ── Differ ───────────────────────────────────────────────────────

    #[test]
    fn identical_texts_are_all_unchanged() {
        let diff = diff_words("restrict logical access", "restrict logical access");
        assert!(diff.iter().all(|s| s.kind == DiffSegmentKind::Unchanged));
        assert_eq!(diff.len(), 3);
    }

    #[test]
    fn positional_change_flagged_in_place() {
        let diff = diff_words("access is reviewed annually", "access is reviewed quarterly");
        assert_eq!(diff[3].kind, DiffSegmentKind::Changed);
        assert_eq!(diff[3].old_word.as_deref(), Some("annually"));
        assert_eq!(diff[3].new_word.as_deref(), Some("quarterly"));
        assert!(diff[..3].iter().all(|s| s.kind == DiffSegmentKind::Unchanged));
    }

    #[test]
    fn longer_new_side_tail_is_added() {
        let diff = diff_words("access reviewed", "access reviewed and logged");
        assert_eq!(diff[2].kind, DiffSegmentKind::Added);
        assert_eq!(diff[3].kind, DiffSegmentKind::Added);
        assert_eq!(diff[2].new_word.as_deref(), Some("and"));
        assert!(diff[2].old_word.is_none());
    }

    #[test]
    fn longer_old_side_tail_is_removed() {
        let diff = diff_words("access reviewed and logged", "access reviewed");
        assert_eq!(diff[2].kind, DiffSegmentKind::Removed);
        assert_eq!(diff[3].kind, DiffSegmentKind::Removed);
        assert!(diff[3].new_word.is_none());
    }

    #[test]
    fn equal_length_shift_reports_spurious_changes() {
        // One word inserted and one dropped: a positional diff reports
        // changed pairs from the insertion point on. This pinned
        // behavior is the documented limitation of positional diffing.
        let diff = diff_words("a b c d", "a x b c");
        let kinds: Vec<DiffSegmentKind> = diff.iter().map(|s| s.kind).collect();
        assert_eq!(
            kinds,
            vec![
                DiffSegmentKind::Unchanged,
                DiffSegmentKind::Changed,
                DiffSegmentKind::Changed,
                DiffSegmentKind::Changed,
            ]
        );
    }

    #[test]
    fn empty_old_text_is_all_added() {
        let diff = diff_words("", "entirely new text");
        assert!(diff.iter().all(|s| s.kind == DiffSegmentKind::Added));
    }

    proptest::proptest! {
        #[test]
        fn diff_covers_every_position_exactly_once(
            old_words in proptest::collection::vec("[a-z]{1,6}", 0..12),
            new_words in proptest::collection::vec("[a-z]{1,6}", 0..12),
        ) {
            let old = old_words.join(" ");
            let new = new_words.join(" ");
            let diff = diff_words(&old, &new);
            proptest::prop_assert_eq!(diff.len(), old_words.len().max(new_words.len()));
            // Tail kinds depend only on which side is longer.
            let common = old_words.len().min(new_words.len());
            for seg in &diff[common..] {
                let expected = if new_words.len() > old_words.len() {
                    DiffSegmentKind::Added
                } else {
                    DiffSegmentKind::Removed
                };
                proptest::prop_assert_eq!(seg.kind, expected);
            }
        }
    }

    // ── Comparator ───────────────────────────────────────────────────

    fn version(id: &str) -> FrameworkVersion {
        FrameworkVersion {
            id: VersionId::new(id).unwrap(),
            framework_id: FrameworkId::new("soc2").unwrap(),
            version_code: id.to_string(),
            status: VersionStatus::Active,
            published_date: ts("2024-01-01T00:00:00Z"),
            effective_date: ts("2024-06-01T00:00:00Z"),
            transition_deadline: None,
            sunset_date: None,
            previous_version_id: None,
            changes: Vec::new(),
            catalog_digest: None,
            created_at: ts("2024-01-01T00:00:00Z"),
            updated_at: ts("2024-01-01T00:00:00Z"),
        }
    }

    fn requirement(id: &str, version: &str, code: &str, text: &str) -> MasterRequirement {
        MasterRequirement {
            id: RequirementId::new(id).unwrap(),
            framework_version_id: VersionId::new(version).unwrap(),
            requirement_code: code.to_string(),
            title: "t".to_string(),
            official_text: text.to_string(),
            implementation_level: ImplementationLevel::Mandatory,
            required_evidence_types: BTreeSet::new(),
            verification_frequency: VerificationFrequency::Annual,
            risk_weight: RiskWeight::new(5).unwrap(),
            emerging_tech_category: None,
            keywords: BTreeSet::new(),
            effective_date: ts("2024-06-01T00:00:00Z"),
        }
    }

    struct Fixture {
        old: FrameworkVersion,
        new: FrameworkVersion,
        library: RequirementLibrary,
        mappings: MappingStore,
        answers: InMemoryAnswerSource,
    }

    fn fixture(old_text: &str, new_text: &str) -> Fixture {
        let mut library = RequirementLibrary::new();
        library.upsert(requirement("v1-r", "v1", "CC6.1", old_text));
        library.upsert(requirement("v2-r", "v2", "CC6.1", new_text));
        Fixture {
            old: version("v1"),
            new: version("v2"),
            library,
            mappings: MappingStore::new(),
            answers: InMemoryAnswerSource::new(),
        }
    }

    fn link(f: &mut Fixture, control: &str, answer: ControlAnswer) {
        f.mappings
            .create(
                NewMapping {
                    control_id: ControlId::new(control).unwrap(),
                    requirement_id: RequirementId::new("v1-r").unwrap(),
                    framework_version_id: VersionId::new("v1").unwrap(),
                    mapping_strength: MappingStrength::Direct,
                    coverage_percentage: CoveragePercent::new(90).unwrap(),
                    covered_aspects: BTreeSet::new(),
                    uncovered_aspects: BTreeSet::new(),
                    justification: "t".into(),
                },
                &UuidProvider,
                ts("2024-02-01T00:00:00Z"),
            )
            .unwrap();
        f.answers.set_answer(ControlId::new(control).unwrap(), answer);
    }

    fn run(f: &Fixture, code: &str) -> VersionComparison {
        compare_versions(
            code,
            &f.old,
            &f.new,
            &f.library,
            &f.mappings,
            &f.answers,
            &DriftScanConfig::default(),
        )
        .unwrap()
    }

    #[test]
    fn added_requirement_needs_review() {
        let mut f = fixture("old", "old");
        f.library
            .upsert(requirement("v2-new", "v2", "CC9.9", "Brand new requirement text."));
        let cmp = run(&f, "CC9.9");
        assert_eq!(cmp.change_type, ChangeType::Added);
        assert!(cmp.old_text.is_none());
        assert_eq!(cmp.current_compliance_status, CurrentComplianceStatus::Unknown);
        assert_eq!(
            cmp.projected_compliance_status,
            ProjectedComplianceStatus::NeedsReview
        );
        // Mandatory, weight 5 → high on the new-requirement ladder.
        assert_eq!(cmp.change_severity, Severity::High);
    }

    #[test]
    fn unknown_code_is_not_found() {
        let f = fixture("a", "a");
        let err = compare_versions(
            "NOPE",
            &f.old,
            &f.new,
            &f.library,
            &f.mappings,
            &f.answers,
            &DriftScanConfig::default(),
        )
        .unwrap_err();
        assert!(matches!(err, CoreError::NotFound { .. }));
    }

    #[test]
    fn all_yes_and_valid_projects_compliant() {
        let mut f = fixture("access reviewed", "access reviewed");
        link(&mut f, "c1", ControlAnswer::Yes);
        link(&mut f, "c2", ControlAnswer::Yes);
        let cmp = run(&f, "CC6.1");
        assert_eq!(cmp.change_type, ChangeType::Unchanged);
        assert_eq!(cmp.current_compliance_status, CurrentComplianceStatus::Compliant);
        assert_eq!(
            cmp.projected_compliance_status,
            ProjectedComplianceStatus::Compliant
        );
        assert_eq!(cmp.change_severity, Severity::Low);
    }

    #[test]
    fn some_yes_none_failed_is_partial_and_at_risk() {
        let mut f = fixture("access reviewed", "access reviewed");
        link(&mut f, "c1", ControlAnswer::Yes);
        link(&mut f, "c2", ControlAnswer::Partial);
        let cmp = run(&f, "CC6.1");
        assert_eq!(cmp.current_compliance_status, CurrentComplianceStatus::Partial);
        assert_eq!(
            cmp.projected_compliance_status,
            ProjectedComplianceStatus::AtRisk
        );
    }

    #[test]
    fn outright_no_is_non_compliant_currently() {
        let mut f = fixture("access reviewed", "access reviewed");
        link(&mut f, "c1", ControlAnswer::Yes);
        link(&mut f, "c2", ControlAnswer::No);
        let cmp = run(&f, "CC6.1");
        assert_eq!(
            cmp.current_compliance_status,
            CurrentComplianceStatus::NonCompliant
        );
    }

    #[test]
    fn text_change_without_drift_is_modified_low() {
        let mut f = fixture("access reviewed annually", "access checked annually");
        link(&mut f, "c1", ControlAnswer::Yes);
        let cmp = run(&f, "CC6.1");
        assert_eq!(cmp.change_type, ChangeType::Modified);
        assert_eq!(cmp.change_severity, Severity::Low);
    }

    #[test]
    fn strengthened_text_carries_drift_severity() {
        let mut f = fixture("access reviewed annually", "access must be reviewed");
        link(&mut f, "c1", ControlAnswer::Yes);
        let cmp = run(&f, "CC6.1");
        assert_eq!(cmp.change_type, ChangeType::Modified);
        assert_eq!(cmp.change_severity, Severity::High);
    }
}
