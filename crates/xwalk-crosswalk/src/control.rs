//! Internal controls.
//!
//! A control is an organization-defined implementation unit. Controls
//! are independent of any framework; only the crosswalk links them to
//! requirements, so one control can satisfy requirements across many
//! frameworks at once.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use xwalk_core::{ControlId, RiskLevel};

/// An organization-internal control.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Control {
    pub id: ControlId,
    pub title: String,
    /// Risk tier used for weighted scoring.
    pub risk_level: RiskLevel,
    /// Keywords used by the auto-mapper and new-requirement matching.
    #[serde(default)]
    pub keywords: BTreeSet<String>,
    /// Grouping domain, e.g. "access_control" or "incident_response".
    pub domain: String,
}

impl Control {
    /// The token set used for keyword-overlap matching: declared
    /// keywords plus title tokens, normalized.
    pub fn match_tokens(&self) -> BTreeSet<String> {
        let mut tokens: BTreeSet<String> = self
            .keywords
            .iter()
            .map(|k| k.trim().to_lowercase())
            .filter(|k| !k.is_empty())
            .collect();
        for word in self.title.split_whitespace() {
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
}
