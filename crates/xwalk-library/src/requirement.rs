//! # Master Requirements
//!
//! Official regulatory requirements, each owned by exactly one framework
//! version. Deleting a version invalidates its requirements; nothing
//! outside the owning version ever holds a requirement by reference
//! without going through the library.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use xwalk_core::{
    EmergingTechCategory, ImplementationLevel, RequirementId, RiskWeight,
    VerificationFrequency, VersionId,
};

use crate::search::matches_query;

/// One official requirement within a framework version.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MasterRequirement {
    pub id: RequirementId,
    /// Owning framework version.
    pub framework_version_id: VersionId,
    /// Requirement code, unique within the owning version (e.g. "CC6.1").
    pub requirement_code: String,
    /// Short title.
    pub title: String,
    /// The official requirement text as published.
    pub official_text: String,
    pub implementation_level: ImplementationLevel,
    /// Evidence types an auditor expects for this requirement.
    #[serde(default)]
    pub required_evidence_types: BTreeSet<String>,
    pub verification_frequency: VerificationFrequency,
    /// Regulator-assigned weight in [1, 10].
    pub risk_weight: RiskWeight,
    /// Forward-looking regulatory area, if the requirement belongs to one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub emerging_tech_category: Option<EmergingTechCategory>,
    /// Classification keywords used by search and the auto-mapper.
    #[serde(default)]
    pub keywords: BTreeSet<String>,
    pub effective_date: DateTime<Utc>,
}

/// In-memory requirement library: all ingested requirements, queryable
/// by owning version and by free-text search.
#[derive(Debug, Default)]
pub struct RequirementLibrary {
    requirements: BTreeMap<RequirementId, MasterRequirement>,
}

impl RequirementLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a requirement. Replaces any record with the same id.
    pub fn upsert(&mut self, requirement: MasterRequirement) {
        self.requirements.insert(requirement.id.clone(), requirement);
    }

    /// Look up a requirement by id.
    pub fn get(&self, id: &RequirementId) -> Option<&MasterRequirement> {
        self.requirements.get(id)
    }

    /// Remove all requirements owned by a version. Used when a draft
    /// catalog is re-ingested.
    pub fn remove_version(&mut self, version_id: &VersionId) {
        self.requirements
            .retain(|_, r| &r.framework_version_id != version_id);
    }

    /// All requirements of one framework version, keyed by requirement
    /// code. Codes are unique within a version by ingestion validation.
    pub fn requirements_for_version(
        &self,
        version_id: &VersionId,
    ) -> BTreeMap<&str, &MasterRequirement> {
        self.requirements
            .values()
            .filter(|r| &r.framework_version_id == version_id)
            .map(|r| (r.requirement_code.as_str(), r))
            .collect()
    }

    /// Find one requirement by code within a version.
    pub fn by_code(&self, version_id: &VersionId, code: &str) -> Option<&MasterRequirement> {
        self.requirements
            .values()
            .find(|r| &r.framework_version_id == version_id && r.requirement_code == code)
    }

    /// Case-insensitive substring search over code, title, official text,
    /// and keywords. When `version_filter` is given, only requirements
    /// owned by one of those versions are returned (the engine passes the
    /// version set of a single framework here).
    pub fn search(
        &self,
        query: &str,
        version_filter: Option<&BTreeSet<VersionId>>,
    ) -> Vec<&MasterRequirement> {
        self.requirements
            .values()
            .filter(|r| match version_filter {
                Some(versions) => versions.contains(&r.framework_version_id),
                None => true,
            })
            .filter(|r| matches_query(r, query))
            .collect()
    }

    /// Iterate every requirement in the library.
    pub fn all(&self) -> impl Iterator<Item = &MasterRequirement> {
        self.requirements.values()
    }
}
