//! # Keyword-Overlap Matcher
//!
//! Finds the controls most likely to satisfy a requirement by token
//! overlap between the requirement's keyword-and-title set and each
//! control's keyword-and-title set. Used in two places: ranking
//! candidate controls for brand-new requirements during a drift scan,
//! and serving mapping suggestions to a human or auto-mapper.
//!
//! The confidence score is a heuristic, not a contract. Its threshold
//! and result cap live in [`MatcherConfig`] rather than inline
//! constants.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use xwalk_core::ControlId;
use xwalk_crosswalk::Control;
use xwalk_library::MasterRequirement;

/// Matcher tunables.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct MatcherConfig {
    /// Minimum fraction of the requirement's token set a control must
    /// overlap to count as a match.
    pub overlap_threshold: f64,
    /// Maximum number of ranked matches returned.
    pub max_matches: usize,
}

impl Default for MatcherConfig {
    fn default() -> Self {
        Self {
            overlap_threshold: 0.30,
            max_matches: 5,
        }
    }
}

/// One ranked control suggestion for a requirement.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MappingSuggestion {
    pub control_id: ControlId,
    /// Overlap fraction in (0, 1].
    pub confidence: f64,
    /// The tokens that matched, sorted.
    pub matched_keywords: Vec<String>,
}

/// The requirement-side token set: declared keywords plus title tokens.
fn requirement_tokens(requirement: &MasterRequirement) -> BTreeSet<String> {
    let mut tokens: BTreeSet<String> = requirement
        .keywords
        .iter()
        .map(|k| k.trim().to_lowercase())
        .filter(|k| !k.is_empty())
        .collect();
    for word in requirement.title.split_whitespace() {
        let w: String = word
            .chars()
            .filter(|c| c.is_alphanumeric())
            .collect::<String>()
            .to_lowercase();
        if !w.is_empty() {
            tokens.insert(w);
        }
    }
    tokens
}

/// Rank controls against a requirement by keyword overlap.
///
/// A control matches when its token overlap reaches
/// `overlap_threshold` of the requirement's token-set size. Results are
/// sorted by descending confidence (ties broken by control id for
/// determinism) and capped at `max_matches`. A requirement with no
/// tokens matches nothing — the matcher never errors.
pub fn suggest_mappings(
    requirement: &MasterRequirement,
    controls: &[Control],
    config: &MatcherConfig,
) -> Vec<MappingSuggestion> {
    let req_tokens = requirement_tokens(requirement);
    if req_tokens.is_empty() {
        tracing::warn!(
            requirement = %requirement.requirement_code,
            "requirement has no keywords or title tokens; no suggestions possible"
        );
        return Vec::new();
    }

    let mut suggestions: Vec<MappingSuggestion> = controls
        .iter()
        .filter_map(|control| {
            let control_tokens = control.match_tokens();
            let matched: Vec<String> = req_tokens
                .intersection(&control_tokens)
                .cloned()
                .collect();
            let confidence = matched.len() as f64 / req_tokens.len() as f64;
            if confidence >= config.overlap_threshold {
                Some(MappingSuggestion {
                    control_id: control.id.clone(),
                    confidence,
                    matched_keywords: matched,
                })
            } else {
                None
            }
        })
        .collect();

    suggestions.sort_by(|a, b| {
        b.confidence
            .partial_cmp(&a.confidence)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.control_id.cmp(&b.control_id))
    });
    suggestions.truncate(config.max_matches);
    suggestions
}
