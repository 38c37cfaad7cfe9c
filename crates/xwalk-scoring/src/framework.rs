//! # Per-Framework Satisfaction Percentage
//!
//! For each requirement mapped by at least one control in a framework
//! version, the requirement is *satisfied* iff at least one mapped
//! control is answered "yes". A requirement whose mapped controls are
//! **all** answered not-applicable is excluded from the percentage
//! entirely — it counts toward neither numerator nor denominator.
//!
//! `percentage = round(100 · satisfied / (total − excluded))`, 0 when
//! the denominator is 0.

use serde::{Deserialize, Serialize};

use xwalk_core::{ControlAnswer, FrameworkId, RequirementId, VersionId};
use xwalk_crosswalk::{AnswerSource, MappingStore};
use xwalk_library::RequirementLibrary;

use crate::coverage::aggregate_coverage;

/// Per-requirement line of a framework summary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequirementCoverage {
    pub requirement_id: RequirementId,
    pub requirement_code: String,
    /// Aggregated mapped coverage (diminishing returns).
    pub coverage: u8,
    /// At least one mapped control is answered yes.
    pub satisfied: bool,
    /// Every mapped control is answered not-applicable.
    pub excluded: bool,
    /// Number of current mappings.
    pub mapping_count: usize,
}

/// Framework-level satisfaction summary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FrameworkCoverageSummary {
    pub framework_id: FrameworkId,
    pub version_id: VersionId,
    /// Requirements with at least one current mapping.
    pub mapped_requirements: usize,
    /// Requirements excluded under the N/A rule.
    pub excluded_requirements: usize,
    pub satisfied_requirements: usize,
    /// Rounded percentage over the non-excluded population; 0 when the
    /// denominator is 0.
    pub percentage: u8,
    pub requirements: Vec<RequirementCoverage>,
}

/// Summarize one framework version against the current crosswalk.
///
/// Only requirements with at least one current mapping participate;
/// unmapped requirements are the gap detector's concern, not a
/// percentage input.
pub fn summarize_framework(
    framework_id: &FrameworkId,
    version_id: &VersionId,
    library: &RequirementLibrary,
    mappings: &MappingStore,
    answers: &dyn AnswerSource,
) -> FrameworkCoverageSummary {
    let mut lines: Vec<RequirementCoverage> = Vec::new();

    for (_code, requirement) in library.requirements_for_version(version_id) {
        let current = mappings.current_for_requirement(&requirement.id);
        if current.is_empty() {
            continue;
        }

        let mapped_answers: Vec<ControlAnswer> = current
            .iter()
            .map(|m| answers.answer(&m.control_id).unwrap_or(ControlAnswer::No))
            .collect();

        let excluded = mapped_answers.iter().all(|a| a.is_not_applicable());
        let satisfied = !excluded && mapped_answers.iter().any(|a| a.is_implemented());
        let percents: Vec<_> = current.iter().map(|m| m.coverage_percentage).collect();

        lines.push(RequirementCoverage {
            requirement_id: requirement.id.clone(),
            requirement_code: requirement.requirement_code.clone(),
            coverage: aggregate_coverage(&percents),
            satisfied,
            excluded,
            mapping_count: current.len(),
        });
    }

    let mapped = lines.len();
    let excluded = lines.iter().filter(|l| l.excluded).count();
    let satisfied = lines.iter().filter(|l| l.satisfied).count();
    let denominator = mapped - excluded;
    let percentage = if denominator == 0 {
        0
    } else {
        ((satisfied as f64 / denominator as f64) * 100.0).round() as u8
    };

    FrameworkCoverageSummary {
        framework_id: framework_id.clone(),
        version_id: version_id.clone(),
        mapped_requirements: mapped,
        excluded_requirements: excluded,
        satisfied_requirements: satisfied,
        percentage,
        requirements: lines,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    use chrono::{DateTime, Utc};
    use xwalk_core::{
        ControlId, CoveragePercent, ImplementationLevel, MappingStrength, RiskWeight,
        UuidProvider, VerificationFrequency,
    };
    use xwalk_crosswalk::{InMemoryAnswerSource, NewMapping};
    use xwalk_library::MasterRequirement;

    fn ts() -> DateTime<Utc> {
        DateTime::parse_from_rfc3339("2024-01-01T00:00:00Z")
            .unwrap()
            .with_timezone(&Utc)
    }

    fn requirement(id: &str, code: &str) -> MasterRequirement {
        MasterRequirement {
            id: RequirementId::new(id).unwrap(),
            framework_version_id: VersionId::new("v1").unwrap(),
            requirement_code: code.to_string(),
            title: code.to_string(),
            official_text: format!("Requirement {code}."),
            implementation_level: ImplementationLevel::Mandatory,
            required_evidence_types: BTreeSet::new(),
            verification_frequency: VerificationFrequency::Annual,
            risk_weight: RiskWeight::new(5).unwrap(),
            emerging_tech_category: None,
            keywords: BTreeSet::new(),
            effective_date: ts(),
        }
    }

    fn map(store: &mut MappingStore, control: &str, req: &str, coverage: u8) {
        store
            .create(
                NewMapping {
                    control_id: ControlId::new(control).unwrap(),
                    requirement_id: RequirementId::new(req).unwrap(),
                    framework_version_id: VersionId::new("v1").unwrap(),
                    mapping_strength: MappingStrength::Direct,
                    coverage_percentage: CoveragePercent::new(coverage).unwrap(),
                    covered_aspects: BTreeSet::new(),
                    uncovered_aspects: BTreeSet::new(),
                    justification: "t".into(),
                },
                &UuidProvider,
                ts(),
            )
            .unwrap();
    }

    fn setup(
        codes: &[(&str, &str)],
    ) -> (RequirementLibrary, MappingStore, InMemoryAnswerSource) {
        let mut library = RequirementLibrary::new();
        for (id, code) in codes {
            library.upsert(requirement(id, code));
        }
        (library, MappingStore::new(), InMemoryAnswerSource::new())
    }

    #[test]
    fn satisfied_requires_a_yes_answer() {
        let (library, mut store, mut answers) = setup(&[("r1", "CC1.1"), ("r2", "CC1.2")]);
        map(&mut store, "c1", "r1", 100);
        map(&mut store, "c2", "r2", 100);
        answers.set_answer(ControlId::new("c1").unwrap(), ControlAnswer::Yes);
        answers.set_answer(ControlId::new("c2").unwrap(), ControlAnswer::No);

        let summary = summarize_framework(
            &FrameworkId::new("soc2").unwrap(),
            &VersionId::new("v1").unwrap(),
            &library,
            &store,
            &answers,
        );
        assert_eq!(summary.mapped_requirements, 2);
        assert_eq!(summary.satisfied_requirements, 1);
        assert_eq!(summary.percentage, 50);
    }

    #[test]
    fn all_na_requirement_is_excluded_from_both_sides() {
        let (library, mut store, mut answers) = setup(&[("r1", "CC1.1"), ("r2", "CC1.2")]);
        map(&mut store, "c1", "r1", 100);
        map(&mut store, "c2", "r2", 100);
        answers.set_answer(ControlId::new("c1").unwrap(), ControlAnswer::Yes);
        answers.set_answer(ControlId::new("c2").unwrap(), ControlAnswer::NotApplicable);

        let summary = summarize_framework(
            &FrameworkId::new("soc2").unwrap(),
            &VersionId::new("v1").unwrap(),
            &library,
            &store,
            &answers,
        );
        // r2 is excluded entirely: 1 satisfied / 1 applicable.
        assert_eq!(summary.excluded_requirements, 1);
        assert_eq!(summary.percentage, 100);
    }

    #[test]
    fn mixed_na_and_no_is_not_excluded() {
        let (library, mut store, mut answers) = setup(&[("r1", "CC1.1")]);
        map(&mut store, "c1", "r1", 60);
        map(&mut store, "c2", "r1", 60);
        answers.set_answer(ControlId::new("c1").unwrap(), ControlAnswer::NotApplicable);
        answers.set_answer(ControlId::new("c2").unwrap(), ControlAnswer::No);

        let summary = summarize_framework(
            &FrameworkId::new("soc2").unwrap(),
            &VersionId::new("v1").unwrap(),
            &library,
            &store,
            &answers,
        );
        // One control answered NA, the other No: requirement stays in the
        // denominator and is unsatisfied.
        assert_eq!(summary.excluded_requirements, 0);
        assert_eq!(summary.percentage, 0);
    }

    #[test]
    fn fully_excluded_framework_reports_zero_not_nan() {
        let codes: Vec<(String, String)> = (0..10)
            .map(|i| (format!("r{i}"), format!("CC{i}.1")))
            .collect();
        let refs: Vec<(&str, &str)> = codes
            .iter()
            .map(|(a, b)| (a.as_str(), b.as_str()))
            .collect();
        let (library, mut store, mut answers) = setup(&refs);
        for (i, (id, _)) in refs.iter().enumerate() {
            let control = format!("c{i}");
            map(&mut store, &control, id, 100);
            answers.set_answer(
                ControlId::new(control).unwrap(),
                ControlAnswer::NotApplicable,
            );
        }

        let summary = summarize_framework(
            &FrameworkId::new("soc2").unwrap(),
            &VersionId::new("v1").unwrap(),
            &library,
            &store,
            &answers,
        );
        assert_eq!(summary.mapped_requirements, 10);
        assert_eq!(summary.excluded_requirements, 10);
        assert_eq!(summary.percentage, 0);
    }

    #[test]
    fn unanswered_control_counts_as_not_implemented() {
        let (library, mut store, answers) = setup(&[("r1", "CC1.1")]);
        map(&mut store, "c1", "r1", 100);

        let summary = summarize_framework(
            &FrameworkId::new("soc2").unwrap(),
            &VersionId::new("v1").unwrap(),
            &library,
            &store,
            &answers,
        );
        assert_eq!(summary.percentage, 0);
        assert_eq!(summary.excluded_requirements, 0);
    }
}
