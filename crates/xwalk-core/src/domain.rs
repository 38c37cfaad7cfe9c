//! # Crosswalk Domain Enums
//!
//! Closed enumerations for the crosswalk domain: framework version
//! lifecycle, requirement classification, mapping strength, drift
//! classification, and gap classification.
//!
//! Every enum here is exhaustive-match friendly: no consumer uses a
//! wildcard arm, so adding a variant is a compile error at every decision
//! point instead of a silent fall-through.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Framework version lifecycle
// ---------------------------------------------------------------------------

/// Lifecycle status of a framework version.
///
/// `draft → published → active → superseded → retired`. Retired is
/// terminal. At most one version per framework is `Active` at any time;
/// activating a version supersedes the previously active one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VersionStatus {
    /// Version is being assembled and may still change.
    Draft,
    /// Version is published but not yet the evaluation baseline.
    Published,
    /// Version is the framework's current evaluation baseline.
    Active,
    /// Version was replaced by a newer active version.
    Superseded,
    /// Version is retired from all use (terminal).
    Retired,
}

impl VersionStatus {
    /// Whether this status is terminal (no further transitions).
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Retired)
    }

    /// The canonical string name of this status.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Published => "published",
            Self::Active => "active",
            Self::Superseded => "superseded",
            Self::Retired => "retired",
        }
    }
}

impl std::fmt::Display for VersionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Requirement classification
// ---------------------------------------------------------------------------

/// How binding a requirement is within its framework.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImplementationLevel {
    /// Must be implemented; non-negotiable.
    Mandatory,
    /// Should be implemented; strongly encouraged.
    Recommended,
    /// May be implemented at the organization's discretion.
    Optional,
    /// Required only when a stated condition applies.
    Conditional,
}

impl ImplementationLevel {
    /// Whether this level is mandatory.
    pub fn is_mandatory(&self) -> bool {
        matches!(self, Self::Mandatory)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Mandatory => "mandatory",
            Self::Recommended => "recommended",
            Self::Optional => "optional",
            Self::Conditional => "conditional",
        }
    }
}

impl std::fmt::Display for ImplementationLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How often satisfaction of a requirement must be verified.
///
/// The variants form a strict ordering from least to most demanding:
/// `once < annual < semi_annual < quarterly < monthly < continuous`.
/// Drift detection uses this ordering to recognize when a new framework
/// version tightens the verification cadence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VerificationFrequency {
    /// One-time verification at implementation.
    Once,
    /// Verified annually.
    Annual,
    /// Verified twice a year.
    SemiAnnual,
    /// Verified quarterly.
    Quarterly,
    /// Verified monthly.
    Monthly,
    /// Continuously monitored.
    Continuous,
}

impl VerificationFrequency {
    /// Position on the strictness scale. Higher is more demanding.
    fn rank(self) -> u8 {
        match self {
            Self::Once => 0,
            Self::Annual => 1,
            Self::SemiAnnual => 2,
            Self::Quarterly => 3,
            Self::Monthly => 4,
            Self::Continuous => 5,
        }
    }

    /// Whether `self` demands verification more often than `other`.
    pub fn is_stricter_than(self, other: Self) -> bool {
        self.rank() > other.rank()
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Once => "once",
            Self::Annual => "annual",
            Self::SemiAnnual => "semi_annual",
            Self::Quarterly => "quarterly",
            Self::Monthly => "monthly",
            Self::Continuous => "continuous",
        }
    }
}

impl PartialOrd for VerificationFrequency {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for VerificationFrequency {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.rank().cmp(&other.rank())
    }
}

impl std::fmt::Display for VerificationFrequency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Forward-looking regulatory area tags.
///
/// A requirement tagged with an emerging-technology category always
/// requires human re-review when drift touches it — automated validity
/// carry-over is disabled for these areas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmergingTechCategory {
    /// AI governance and model accountability.
    AiGovernance,
    /// Post-quantum cryptography readiness.
    PostQuantumCrypto,
    /// Zero-trust architecture mandates.
    ZeroTrust,
    /// Confidential computing / enclave requirements.
    ConfidentialComputing,
    /// Synthetic media and content provenance.
    SyntheticMedia,
    /// IoT and embedded device security.
    IotSecurity,
}

impl EmergingTechCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AiGovernance => "ai_governance",
            Self::PostQuantumCrypto => "post_quantum_crypto",
            Self::ZeroTrust => "zero_trust",
            Self::ConfidentialComputing => "confidential_computing",
            Self::SyntheticMedia => "synthetic_media",
            Self::IotSecurity => "iot_security",
        }
    }
}

impl std::fmt::Display for EmergingTechCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Controls and answers
// ---------------------------------------------------------------------------

/// Risk classification of an internal control.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
    Critical,
}

impl RiskLevel {
    /// Scoring weight: critical 4, high 3, medium 2, low 1.
    pub fn weight(self) -> u32 {
        match self {
            Self::Critical => 4,
            Self::High => 3,
            Self::Medium => 2,
            Self::Low => 1,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::Critical => "critical",
        }
    }
}

impl std::fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The organization's current answer for a control.
///
/// Answers come from the answer-lookup collaborator, not from the engine.
/// `parse()` is lenient about the upstream vocabulary: "implemented"
/// means yes and "na" means not applicable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ControlAnswer {
    /// Control is implemented.
    Yes,
    /// Control is partially implemented.
    Partial,
    /// Control is not implemented.
    No,
    /// Control does not apply to this organization.
    NotApplicable,
}

impl ControlAnswer {
    /// Parse an upstream answer string.
    ///
    /// Unrecognized values parse as `No` (fail-closed): an answer the
    /// engine cannot interpret must not count as implemented.
    pub fn parse(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "yes" | "implemented" => Self::Yes,
            "partial" | "partially_implemented" => Self::Partial,
            "na" | "n/a" | "not_applicable" => Self::NotApplicable,
            "no" | "not_implemented" => Self::No,
            _ => Self::No,
        }
    }

    /// Whether this answer counts as implemented for scoring.
    pub fn is_implemented(self) -> bool {
        matches!(self, Self::Yes)
    }

    /// Whether this answer excludes the control from percentage math.
    pub fn is_not_applicable(self) -> bool {
        matches!(self, Self::NotApplicable)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Yes => "yes",
            Self::Partial => "partial",
            Self::No => "no",
            Self::NotApplicable => "not_applicable",
        }
    }
}

impl std::fmt::Display for ControlAnswer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Crosswalk mappings
// ---------------------------------------------------------------------------

/// How directly a control addresses a requirement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MappingStrength {
    /// The control addresses the requirement head-on.
    Direct,
    /// The control addresses part of the requirement.
    Partial,
    /// The control supports the requirement without addressing it directly.
    Supportive,
}

impl MappingStrength {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Direct => "direct",
            Self::Partial => "partial",
            Self::Supportive => "supportive",
        }
    }
}

impl std::fmt::Display for MappingStrength {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Drift posture of a single crosswalk mapping.
///
/// Mutated only by the drift engine and drift resolution, never by direct
/// user edit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MappingDriftStatus {
    /// Mapping is believed valid against the active framework version.
    Current,
    /// A detected change may affect this mapping; answer still held valid.
    AtRisk,
    /// A detected change invalidated the previous answer.
    Drifted,
    /// The mapping's requirement no longer exists or the mapping was
    /// superseded during drift resolution.
    Invalidated,
}

impl MappingDriftStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Current => "current",
            Self::AtRisk => "at_risk",
            Self::Drifted => "drifted",
            Self::Invalidated => "invalidated",
        }
    }
}

impl std::fmt::Display for MappingDriftStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Severity
// ---------------------------------------------------------------------------

/// Severity of a drift finding or gap.
///
/// Ordered `low < medium < high < critical`. Classification rules only
/// ever raise severity (`raised_to`); an earlier `critical` is never
/// lowered by a later rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

impl Severity {
    fn rank(self) -> u8 {
        match self {
            Self::Low => 0,
            Self::Medium => 1,
            Self::High => 2,
            Self::Critical => 3,
        }
    }

    /// Raise this severity to at least `floor`. Never lowers.
    pub fn raised_to(self, floor: Self) -> Self {
        if self.rank() >= floor.rank() {
            self
        } else {
            floor
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::Critical => "critical",
        }
    }
}

impl PartialOrd for Severity {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Severity {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.rank().cmp(&other.rank())
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Drift classification
// ---------------------------------------------------------------------------

/// The kind of change a drift record describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DriftType {
    /// Requirement text or level became more demanding.
    RequirementStrengthened,
    /// The set of required evidence types grew.
    EvidenceTypeChanged,
    /// Verification cadence moved to a stricter point on the scale.
    VerificationFrequencyChanged,
    /// A new emerging-technology category appeared on the requirement.
    TechnologySpecific,
    /// The requirement did not exist in the previous version.
    NewRequirement,
}

impl DriftType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::RequirementStrengthened => "requirement_strengthened",
            Self::EvidenceTypeChanged => "evidence_type_changed",
            Self::VerificationFrequencyChanged => "verification_frequency_changed",
            Self::TechnologySpecific => "technology_specific",
            Self::NewRequirement => "new_requirement",
        }
    }
}

impl std::fmt::Display for DriftType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Resolution status of a drift record.
///
/// Drift records are never deleted; they only move through these states
/// (audit trail).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DriftRecordStatus {
    /// Freshly emitted by a drift scan.
    Detected,
    /// A human has seen the record.
    Acknowledged,
    /// Remediation is being evaluated.
    InReview,
    /// A resolution path was selected and applied.
    Resolved,
    /// The organization accepted the risk without remediation.
    AcceptedRisk,
}

impl DriftRecordStatus {
    /// Whether the record still needs attention.
    pub fn is_open(&self) -> bool {
        matches!(self, Self::Detected | Self::Acknowledged | Self::InReview)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Detected => "detected",
            Self::Acknowledged => "acknowledged",
            Self::InReview => "in_review",
            Self::Resolved => "resolved",
            Self::AcceptedRisk => "accepted_risk",
        }
    }
}

impl std::fmt::Display for DriftRecordStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Gap classification
// ---------------------------------------------------------------------------

/// Why a requirement is considered a gap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GapType {
    /// No crosswalk mapping links any control to the requirement.
    NoControlMapped,
    /// Mapped coverage aggregates below the acceptance threshold.
    InsufficientCoverage,
    /// Mapped controls exist but none is implemented.
    ControlNotImplemented,
    /// Implemented controls lack the required evidence.
    EvidenceMissing,
}

impl GapType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NoControlMapped => "no_control_mapped",
            Self::InsufficientCoverage => "insufficient_coverage",
            Self::ControlNotImplemented => "control_not_implemented",
            Self::EvidenceMissing => "evidence_missing",
        }
    }
}

impl std::fmt::Display for GapType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Workflow status of a gap record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GapStatus {
    /// Produced by a recalculation pass, not yet triaged.
    Identified,
    /// A human has seen the gap.
    Acknowledged,
    /// Remediation is underway.
    InProgress,
    /// The gap was closed.
    Resolved,
    /// The organization accepted the risk.
    AcceptedRisk,
}

impl GapStatus {
    /// Whether the gap still needs attention.
    pub fn is_open(&self) -> bool {
        matches!(self, Self::Identified | Self::Acknowledged | Self::InProgress)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Identified => "identified",
            Self::Acknowledged => "acknowledged",
            Self::InProgress => "in_progress",
            Self::Resolved => "resolved",
            Self::AcceptedRisk => "accepted_risk",
        }
    }
}

impl std::fmt::Display for GapStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Resolution options
// ---------------------------------------------------------------------------

/// The action a resolution option proposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResolutionType {
    /// Create a new dedicated control.
    CreateControl,
    /// Update an existing control to absorb the change.
    UpdateControl,
    /// Attach direct evidence without a control.
    UploadEvidence,
    /// Author a policy document.
    CreatePolicy,
    /// Install a compensating control.
    CompensatingControl,
    /// Accept the risk without remediation.
    AcceptRisk,
}

impl ResolutionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CreateControl => "create_control",
            Self::UpdateControl => "update_control",
            Self::UploadEvidence => "upload_evidence",
            Self::CreatePolicy => "create_policy",
            Self::CompensatingControl => "compensating_control",
            Self::AcceptRisk => "accept_risk",
        }
    }
}

impl std::fmt::Display for ResolutionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Rough effort estimate attached to a resolution option.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EffortEstimate {
    Low,
    Medium,
    High,
}

impl EffortEstimate {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }
}

impl std::fmt::Display for EffortEstimate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One typed option on a gap's or drift record's resolution path.
/// The caller selects one; the engine never picks automatically.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolutionOption {
    pub resolution_type: ResolutionType,
    pub description: String,
    pub estimated_effort: EffortEstimate,
}

impl ResolutionOption {
    pub fn new(
        resolution_type: ResolutionType,
        description: impl Into<String>,
        estimated_effort: EffortEstimate,
    ) -> Self {
        Self {
            resolution_type,
            description: description.into(),
            estimated_effort,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version_status_terminal() {
        assert!(!VersionStatus::Draft.is_terminal());
        assert!(!VersionStatus::Active.is_terminal());
        assert!(!VersionStatus::Superseded.is_terminal());
        assert!(VersionStatus::Retired.is_terminal());
    }

    #[test]
    fn frequency_ordering_matches_scale() {
        use VerificationFrequency::*;
        let scale = [Once, Annual, SemiAnnual, Quarterly, Monthly, Continuous];
        for pair in scale.windows(2) {
            assert!(pair[1].is_stricter_than(pair[0]), "{} !> {}", pair[1], pair[0]);
            assert!(!pair[0].is_stricter_than(pair[1]));
        }
        assert!(!Quarterly.is_stricter_than(Quarterly));
    }

    #[test]
    fn risk_level_weights() {
        assert_eq!(RiskLevel::Critical.weight(), 4);
        assert_eq!(RiskLevel::High.weight(), 3);
        assert_eq!(RiskLevel::Medium.weight(), 2);
        assert_eq!(RiskLevel::Low.weight(), 1);
    }

    #[test]
    fn severity_raised_to_never_lowers() {
        assert_eq!(Severity::Critical.raised_to(Severity::Medium), Severity::Critical);
        assert_eq!(Severity::Low.raised_to(Severity::Medium), Severity::Medium);
        assert_eq!(Severity::High.raised_to(Severity::High), Severity::High);
    }

    #[test]
    fn answer_parse_vocabulary() {
        assert_eq!(ControlAnswer::parse("yes"), ControlAnswer::Yes);
        assert_eq!(ControlAnswer::parse("Implemented"), ControlAnswer::Yes);
        assert_eq!(ControlAnswer::parse("na"), ControlAnswer::NotApplicable);
        assert_eq!(ControlAnswer::parse("N/A"), ControlAnswer::NotApplicable);
        assert_eq!(ControlAnswer::parse("partial"), ControlAnswer::Partial);
        // Unknown vocabulary fails closed.
        assert_eq!(ControlAnswer::parse("mystery"), ControlAnswer::No);
    }

    #[test]
    fn open_statuses() {
        assert!(DriftRecordStatus::Detected.is_open());
        assert!(DriftRecordStatus::InReview.is_open());
        assert!(!DriftRecordStatus::Resolved.is_open());
        assert!(!DriftRecordStatus::AcceptedRisk.is_open());
        assert!(GapStatus::Identified.is_open());
        assert!(!GapStatus::AcceptedRisk.is_open());
    }

    #[test]
    fn enum_serialization_is_snake_case() {
        assert_eq!(
            serde_json::to_string(&DriftType::EvidenceTypeChanged).unwrap(),
            "\"evidence_type_changed\""
        );
        assert_eq!(
            serde_json::to_string(&VerificationFrequency::SemiAnnual).unwrap(),
            "\"semi_annual\""
        );
        let parsed: MappingDriftStatus = serde_json::from_str("\"at_risk\"").unwrap();
        assert_eq!(parsed, MappingDriftStatus::AtRisk);
    }
}
