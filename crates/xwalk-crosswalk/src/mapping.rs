//! # Crosswalk Mappings
//!
//! The versioned N:N junction records. A mapping links one control to
//! one master requirement **within one specific framework version** —
//! when a framework revs, the old version's mappings stay behind as the
//! drift engine's comparison baseline.
//!
//! Lifecycle: created by a human or the auto-mapper; superseded
//! (`valid_until_version` set) when a newer mapping replaces it;
//! `drift_status` mutated by the drift engine and drift resolution,
//! never by direct user edit.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use xwalk_core::{
    ControlId, CoreError, CoveragePercent, IdProvider, MappingDriftStatus, MappingId,
    MappingStrength, RequirementId, VersionId,
};

/// One control-to-requirement mapping record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrosswalkMapping {
    pub id: MappingId,
    pub control_id: ControlId,
    pub requirement_id: RequirementId,
    /// The framework version the linked requirement belongs to.
    pub framework_version_id: VersionId,
    pub mapping_strength: MappingStrength,
    /// Fraction of the requirement's intent this control satisfies.
    pub coverage_percentage: CoveragePercent,
    /// Aspects of the requirement this control covers.
    #[serde(default)]
    pub covered_aspects: BTreeSet<String>,
    /// Aspects the control is known not to cover.
    #[serde(default)]
    pub uncovered_aspects: BTreeSet<String>,
    /// Why the mapper believes this link holds.
    pub justification: String,
    /// Version in which this mapping first became valid.
    pub valid_from_version: VersionId,
    /// Version that superseded this mapping; `None` = still current.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub valid_until_version: Option<VersionId>,
    pub drift_status: MappingDriftStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl CrosswalkMapping {
    /// Whether this mapping is still the current link for its pair.
    pub fn is_current(&self) -> bool {
        self.valid_until_version.is_none()
    }
}

/// Input for creating a mapping.
#[derive(Debug, Clone)]
pub struct NewMapping {
    pub control_id: ControlId,
    pub requirement_id: RequirementId,
    pub framework_version_id: VersionId,
    pub mapping_strength: MappingStrength,
    pub coverage_percentage: CoveragePercent,
    pub covered_aspects: BTreeSet<String>,
    pub uncovered_aspects: BTreeSet<String>,
    pub justification: String,
}

/// The mapping collection.
///
/// Superseded mappings are retained — they are the drift engine's
/// comparison baseline and the audit trail of how coverage evolved.
#[derive(Debug, Default)]
pub struct MappingStore {
    mappings: BTreeMap<MappingId, CrosswalkMapping>,
}

impl MappingStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a mapping. If a current mapping already links the same
    /// control to the same requirement, it is superseded by the new one.
    pub fn create(
        &mut self,
        new: NewMapping,
        ids: &dyn IdProvider,
        now: DateTime<Utc>,
    ) -> Result<&CrosswalkMapping, CoreError> {
        let id = MappingId::new(ids.next_id())?;

        // Supersede the previous current mapping for this pair, if any.
        let replaced: Option<MappingId> = self
            .mappings
            .values()
            .find(|m| {
                m.is_current()
                    && m.control_id == new.control_id
                    && m.requirement_id == new.requirement_id
            })
            .map(|m| m.id.clone());
        if let Some(old_id) = replaced {
            if let Some(old) = self.mappings.get_mut(&old_id) {
                old.valid_until_version = Some(new.framework_version_id.clone());
                old.updated_at = now;
                tracing::debug!(mapping = %old_id, "mapping superseded by replacement");
            }
        }

        let record = CrosswalkMapping {
            id: id.clone(),
            control_id: new.control_id,
            requirement_id: new.requirement_id,
            framework_version_id: new.framework_version_id.clone(),
            mapping_strength: new.mapping_strength,
            coverage_percentage: new.coverage_percentage,
            covered_aspects: new.covered_aspects,
            uncovered_aspects: new.uncovered_aspects,
            justification: new.justification,
            valid_from_version: new.framework_version_id,
            valid_until_version: None,
            drift_status: MappingDriftStatus::Current,
            created_at: now,
            updated_at: now,
        };
        self.mappings.insert(id.clone(), record);
        // Just inserted under this id.
        self.mappings
            .get(&id)
            .ok_or_else(|| CoreError::not_found("mapping", id.as_str()))
    }

    /// Remove a mapping outright.
    ///
    /// # Errors
    ///
    /// `NotFound` if the id is unknown — removal is never silently
    /// ignored.
    pub fn remove(&mut self, id: &MappingId) -> Result<CrosswalkMapping, CoreError> {
        self.mappings
            .remove(id)
            .ok_or_else(|| CoreError::not_found("mapping", id.as_str()))
    }

    pub fn get(&self, id: &MappingId) -> Option<&CrosswalkMapping> {
        self.mappings.get(id)
    }

    /// Current mappings for one requirement.
    pub fn current_for_requirement(&self, requirement_id: &RequirementId) -> Vec<&CrosswalkMapping> {
        self.mappings
            .values()
            .filter(|m| m.is_current() && &m.requirement_id == requirement_id)
            .collect()
    }

    /// Current mappings within one framework version.
    pub fn current_for_version(&self, version_id: &VersionId) -> Vec<&CrosswalkMapping> {
        self.mappings
            .values()
            .filter(|m| m.is_current() && &m.framework_version_id == version_id)
            .collect()
    }

    /// Current mappings for one control.
    pub fn current_for_control(&self, control_id: &ControlId) -> Vec<&CrosswalkMapping> {
        self.mappings
            .values()
            .filter(|m| m.is_current() && &m.control_id == control_id)
            .collect()
    }

    /// Set a mapping's drift status. Reserved for the drift engine and
    /// drift resolution.
    pub fn set_drift_status(
        &mut self,
        id: &MappingId,
        status: MappingDriftStatus,
        now: DateTime<Utc>,
    ) -> Result<(), CoreError> {
        let mapping = self
            .mappings
            .get_mut(id)
            .ok_or_else(|| CoreError::not_found("mapping", id.as_str()))?;
        mapping.drift_status = status;
        mapping.updated_at = now;
        Ok(())
    }

    /// Iterate every mapping, superseded included.
    pub fn all(&self) -> impl Iterator<Item = &CrosswalkMapping> {
        self.mappings.values()
    }
}
