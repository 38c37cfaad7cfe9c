//! Engine configuration.
//!
//! Every heuristic threshold in the stack is a tunable here rather
//! than an inline constant: the keyword-overlap threshold and match
//! cap, the coverage floors for gap detection, the risk-weight jump
//! that escalates drift severity, and the fallback remediation window.

use serde::{Deserialize, Serialize};

use xwalk_drift::DriftScanConfig;
use xwalk_scoring::GapThresholds;

/// Complete engine configuration. `Default` reproduces the stock
/// thresholds (30% overlap, top 5 matches, 80/50 coverage floors,
/// risk-weight jump of 2, 90-day remediation window).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub gap_thresholds: GapThresholds,
    pub drift: DriftScanConfig,
}
