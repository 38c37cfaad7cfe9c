//! # Risk-Weighted Scoring
//!
//! Control risk tiers carry weights {critical 4, high 3, medium 2,
//! low 1}. Every applicable (non-N/A) control contributes its weight to
//! the total; implemented controls also contribute to the achieved
//! weight. The unweighted score counts heads instead of weights. N/A
//! controls are tallied per tier but appear in neither score.

use serde::{Deserialize, Serialize};

use xwalk_core::{ControlAnswer, ControlId, RiskLevel};
use xwalk_crosswalk::{AnswerSource, Control};

/// Per-tier tally of not-applicable controls.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NaTally {
    pub critical: usize,
    pub high: usize,
    pub medium: usize,
    pub low: usize,
}

impl NaTally {
    fn bump(&mut self, level: RiskLevel) {
        match level {
            RiskLevel::Critical => self.critical += 1,
            RiskLevel::High => self.high += 1,
            RiskLevel::Medium => self.medium += 1,
            RiskLevel::Low => self.low += 1,
        }
    }
}

/// Weighted and unweighted compliance scores with risk-tier gap lists.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RiskScoreReport {
    /// `round(100 · achieved_weight / total_weight)`; 0 when no
    /// applicable controls exist.
    pub weighted_score: u8,
    /// `round(100 · implemented / applicable)`, head-count based.
    pub unweighted_score: u8,
    pub total_weight: u32,
    pub achieved_weight: u32,
    pub applicable_controls: usize,
    pub implemented_controls: usize,
    pub not_applicable: NaTally,
    /// Critical-risk controls that are not implemented.
    pub critical_gaps: Vec<ControlId>,
    /// High-risk controls that are not implemented.
    pub high_gaps: Vec<ControlId>,
}

/// Compute the weighted risk score over a control population.
pub fn weighted_risk_score(controls: &[Control], answers: &dyn AnswerSource) -> RiskScoreReport {
    let mut total_weight = 0u32;
    let mut achieved_weight = 0u32;
    let mut applicable = 0usize;
    let mut implemented = 0usize;
    let mut na = NaTally::default();
    let mut critical_gaps = Vec::new();
    let mut high_gaps = Vec::new();

    for control in controls {
        let answer = answers.answer(&control.id).unwrap_or(ControlAnswer::No);
        if answer.is_not_applicable() {
            na.bump(control.risk_level);
            continue;
        }

        let weight = control.risk_level.weight();
        total_weight += weight;
        applicable += 1;

        if answer.is_implemented() {
            achieved_weight += weight;
            implemented += 1;
        } else {
            match control.risk_level {
                RiskLevel::Critical => critical_gaps.push(control.id.clone()),
                RiskLevel::High => high_gaps.push(control.id.clone()),
                RiskLevel::Medium | RiskLevel::Low => {}
            }
        }
    }

    let weighted_score = if total_weight == 0 {
        0
    } else {
        ((achieved_weight as f64 / total_weight as f64) * 100.0).round() as u8
    };
    let unweighted_score = if applicable == 0 {
        0
    } else {
        ((implemented as f64 / applicable as f64) * 100.0).round() as u8
    };

    RiskScoreReport {
        weighted_score,
        unweighted_score,
        total_weight,
        achieved_weight,
        applicable_controls: applicable,
        implemented_controls: implemented,
        not_applicable: na,
        critical_gaps,
        high_gaps,
    }
}
