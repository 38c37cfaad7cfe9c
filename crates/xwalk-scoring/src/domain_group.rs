//! # Per-Domain Implementation Breakdown
//!
//! Controls grouped by their declared domain, with the N/A-exclusion
//! rule applied at control granularity: a not-applicable control counts
//! toward neither numerator nor denominator of its domain's
//! implementation percentage.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use xwalk_core::ControlAnswer;
use xwalk_crosswalk::{AnswerSource, Control};

/// Implementation summary for one control domain.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DomainBreakdown {
    pub domain: String,
    /// All controls in the domain, N/A included.
    pub total_controls: usize,
    pub implemented: usize,
    pub not_applicable: usize,
    /// `round(100 · implemented / (total − not_applicable))`; 0 when
    /// every control in the domain is N/A.
    pub percentage: u8,
}

/// Group controls by domain and compute per-domain implementation
/// percentages. Domains come back in lexicographic order.
pub fn domain_breakdown(controls: &[Control], answers: &dyn AnswerSource) -> Vec<DomainBreakdown> {
    let mut grouped: BTreeMap<&str, Vec<&Control>> = BTreeMap::new();
    for control in controls {
        grouped.entry(control.domain.as_str()).or_default().push(control);
    }

    grouped
        .into_iter()
        .map(|(domain, members)| {
            let total = members.len();
            let mut implemented = 0;
            let mut not_applicable = 0;
            for control in members {
                match answers.answer(&control.id).unwrap_or(ControlAnswer::No) {
                    ControlAnswer::Yes => implemented += 1,
                    ControlAnswer::NotApplicable => not_applicable += 1,
                    ControlAnswer::Partial | ControlAnswer::No => {}
                }
            }
            let applicable = total - not_applicable;
            let percentage = if applicable == 0 {
                0
            } else {
                ((implemented as f64 / applicable as f64) * 100.0).round() as u8
            };
            DomainBreakdown {
                domain: domain.to_string(),
                total_controls: total,
                implemented,
                not_applicable,
                percentage,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    use xwalk_core::{ControlId, RiskLevel};
    use xwalk_crosswalk::InMemoryAnswerSource;

    fn control(id: &str, domain: &str) -> Control {
        Control {
            id: ControlId::new(id).unwrap(),
            title: id.to_string(),
            risk_level: RiskLevel::Medium,
            keywords: BTreeSet::new(),
            domain: domain.to_string(),
        }
    }

    #[test]
    fn na_controls_excluded_from_denominator() {
        let controls = vec![
            control("c1", "access"),
            control("c2", "access"),
            control("c3", "access"),
        ];
        let mut answers = InMemoryAnswerSource::new();
        answers.set_answer(ControlId::new("c1").unwrap(), ControlAnswer::Yes);
        answers.set_answer(ControlId::new("c2").unwrap(), ControlAnswer::NotApplicable);
        answers.set_answer(ControlId::new("c3").unwrap(), ControlAnswer::No);

        let breakdown = domain_breakdown(&controls, &answers);
        assert_eq!(breakdown.len(), 1);
        let access = &breakdown[0];
        assert_eq!(access.total_controls, 3);
        assert_eq!(access.not_applicable, 1);
        // 1 implemented of 2 applicable.
        assert_eq!(access.percentage, 50);
    }

    #[test]
    fn all_na_domain_reports_zero() {
        let controls = vec![control("c1", "physical")];
        let mut answers = InMemoryAnswerSource::new();
        answers.set_answer(ControlId::new("c1").unwrap(), ControlAnswer::NotApplicable);
        let breakdown = domain_breakdown(&controls, &answers);
        assert_eq!(breakdown[0].percentage, 0);
    }

    #[test]
    fn domains_sorted_and_separated() {
        let controls = vec![
            control("c1", "network"),
            control("c2", "access"),
            control("c3", "network"),
        ];
        let mut answers = InMemoryAnswerSource::new();
        answers.set_answer(ControlId::new("c1").unwrap(), ControlAnswer::Yes);
        answers.set_answer(ControlId::new("c3").unwrap(), ControlAnswer::Yes);

        let breakdown = domain_breakdown(&controls, &answers);
        assert_eq!(breakdown.len(), 2);
        assert_eq!(breakdown[0].domain, "access");
        assert_eq!(breakdown[1].domain, "network");
        assert_eq!(breakdown[1].percentage, 100);
    }

    #[test]
    fn partial_answers_do_not_count_as_implemented() {
        let controls = vec![control("c1", "ops")];
        let mut answers = InMemoryAnswerSource::new();
        answers.set_answer(ControlId::new("c1").unwrap(), ControlAnswer::Partial);
        let breakdown = domain_breakdown(&controls, &answers);
        assert_eq!(breakdown[0].implemented, 0);
        assert_eq!(breakdown[0].percentage, 0);
    }
}
