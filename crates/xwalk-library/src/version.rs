//! # Framework Version Lifecycle
//!
//! One dated revision of a regulatory framework, and the manager that
//! enforces the lifecycle invariant: **at most one version per framework
//! is active at any time**. Activating a version supersedes the
//! framework's previously active version in the same operation.
//!
//! Transitions are validated explicitly; an invalid transition is a
//! structured `InvalidTransition` error carrying the current state, the
//! attempted target, and the reason. No wildcard matches — adding a
//! status variant is a compile error at every transition decision.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use xwalk_core::{CoreError, FrameworkId, VersionId, VersionStatus};

// ---------------------------------------------------------------------------
// Record types
// ---------------------------------------------------------------------------

/// The kind of change a version introduces for one requirement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeKind {
    /// Requirement added in this version.
    Added,
    /// Requirement text or attributes modified.
    Modified,
    /// Requirement removed in this version.
    Removed,
}

/// A change note attached to a framework version.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VersionChange {
    /// Requirement code the change touches, if the change is scoped.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub requirement_code: Option<String>,
    /// What kind of change this is.
    pub kind: ChangeKind,
    /// Human-readable summary.
    pub summary: String,
}

/// One dated revision of a regulatory framework.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FrameworkVersion {
    /// Identifier of this version.
    pub id: VersionId,
    /// The framework this version belongs to.
    pub framework_id: FrameworkId,
    /// Human-readable version code, e.g. "2022" in "ISO 27001:2022".
    pub version_code: String,
    /// Lifecycle status.
    pub status: VersionStatus,
    /// When the regulator published this version.
    pub published_date: DateTime<Utc>,
    /// When this version takes regulatory effect.
    pub effective_date: DateTime<Utc>,
    /// Deadline for organizations to complete the transition.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transition_deadline: Option<DateTime<Utc>>,
    /// When the previous version stops being accepted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sunset_date: Option<DateTime<Utc>>,
    /// Back-reference to the version this one replaces. Not ownership:
    /// deleting the previous version does not cascade here.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub previous_version_id: Option<VersionId>,
    /// Change notes relative to the previous version.
    #[serde(default)]
    pub changes: Vec<VersionChange>,
    /// Content digest of the ingested requirement catalog, if ingested.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub catalog_digest: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl FrameworkVersion {
    /// Whether this version can move to `target` from its current status.
    ///
    /// Activation is permitted from draft or published (activating a
    /// draft implies publication). Supersession happens only as a side
    /// effect of activating a sibling. Retirement is permitted only from
    /// superseded.
    fn transition_allowed(&self, target: VersionStatus) -> Result<(), CoreError> {
        use VersionStatus::*;
        let ok = match (self.status, target) {
            (Draft, Published) => true,
            (Draft, Active) => true,
            (Published, Active) => true,
            (Active, Superseded) => true,
            (Superseded, Retired) => true,
            // Everything else is rejected, including terminal escapes.
            (Draft | Published | Active | Superseded | Retired, _) => false,
        };
        if ok {
            Ok(())
        } else {
            Err(CoreError::invalid_transition(
                self.status.as_str(),
                target.as_str(),
                format!("version {} does not permit this transition", self.id),
            ))
        }
    }
}

// ---------------------------------------------------------------------------
// Version Manager
// ---------------------------------------------------------------------------

/// Outcome of an activation: the activated version and, when a prior
/// active version existed, the version that was superseded by it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActivationOutcome {
    pub activated: VersionId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub superseded: Option<VersionId>,
}

/// In-memory manager for framework version lifecycles.
///
/// The manager owns the version records; all status mutation flows
/// through it so the single-active-version invariant cannot be violated
/// by direct field edits.
#[derive(Debug, Default)]
pub struct VersionManager {
    versions: BTreeMap<VersionId, FrameworkVersion>,
}

impl VersionManager {
    /// Create an empty manager.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a version record. Replaces any record with the same id.
    pub fn upsert(&mut self, version: FrameworkVersion) {
        self.versions.insert(version.id.clone(), version);
    }

    /// Look up a version by id.
    pub fn get(&self, id: &VersionId) -> Option<&FrameworkVersion> {
        self.versions.get(id)
    }

    /// All versions of one framework.
    pub fn versions_of(&self, framework_id: &FrameworkId) -> Vec<&FrameworkVersion> {
        self.versions
            .values()
            .filter(|v| &v.framework_id == framework_id)
            .collect()
    }

    /// All known versions.
    pub fn all(&self) -> impl Iterator<Item = &FrameworkVersion> {
        self.versions.values()
    }

    /// The single active version of a framework, if any.
    pub fn get_active(&self, framework_id: &FrameworkId) -> Option<&FrameworkVersion> {
        self.versions
            .values()
            .find(|v| &v.framework_id == framework_id && v.status == VersionStatus::Active)
    }

    /// The version with the most recent effective date, regardless of
    /// status. Used for "what's coming" views.
    pub fn get_latest(&self, framework_id: &FrameworkId) -> Option<&FrameworkVersion> {
        self.versions
            .values()
            .filter(|v| &v.framework_id == framework_id)
            .max_by_key(|v| v.effective_date)
    }

    /// Publish a draft version.
    ///
    /// # Errors
    ///
    /// `NotFound` for an unknown id; `InvalidTransition` unless the
    /// version is a draft.
    pub fn publish(&mut self, id: &VersionId, now: DateTime<Utc>) -> Result<(), CoreError> {
        let version = self
            .versions
            .get_mut(id)
            .ok_or_else(|| CoreError::not_found("framework version", id.as_str()))?;
        version.transition_allowed(VersionStatus::Published)?;
        version.status = VersionStatus::Published;
        version.updated_at = now;
        Ok(())
    }

    /// Activate a version, superseding the framework's currently active
    /// version if one exists.
    ///
    /// No side effects beyond status and `updated_at` mutation; the
    /// caller is responsible for running drift detection against the
    /// superseded version.
    ///
    /// # Errors
    ///
    /// `NotFound` for an unknown id; `InvalidTransition` when the version
    /// is already active, superseded, or retired.
    pub fn activate(
        &mut self,
        id: &VersionId,
        now: DateTime<Utc>,
    ) -> Result<ActivationOutcome, CoreError> {
        let (framework_id, _) = {
            let version = self
                .versions
                .get(id)
                .ok_or_else(|| CoreError::not_found("framework version", id.as_str()))?;
            version.transition_allowed(VersionStatus::Active)?;
            (version.framework_id.clone(), version.status)
        };

        // Supersede the currently active sibling, if any.
        let superseded = self
            .versions
            .values()
            .find(|v| {
                v.framework_id == framework_id
                    && v.status == VersionStatus::Active
                    && &v.id != id
            })
            .map(|v| v.id.clone());

        if let Some(prev_id) = &superseded {
            // Unwrap-free: the id was just observed under the same borrow.
            if let Some(prev) = self.versions.get_mut(prev_id) {
                prev.status = VersionStatus::Superseded;
                prev.updated_at = now;
            }
        }

        let version = self
            .versions
            .get_mut(id)
            .ok_or_else(|| CoreError::not_found("framework version", id.as_str()))?;
        version.status = VersionStatus::Active;
        version.updated_at = now;
        if version.previous_version_id.is_none() {
            version.previous_version_id = superseded.clone();
        }

        tracing::info!(
            version = %id,
            framework = %framework_id,
            superseded = superseded.as_ref().map(|s| s.as_str()).unwrap_or("-"),
            "framework version activated"
        );

        Ok(ActivationOutcome {
            activated: id.clone(),
            superseded,
        })
    }

    /// Retire a superseded version.
    pub fn retire(&mut self, id: &VersionId, now: DateTime<Utc>) -> Result<(), CoreError> {
        let version = self
            .versions
            .get_mut(id)
            .ok_or_else(|| CoreError::not_found("framework version", id.as_str()))?;
        version.transition_allowed(VersionStatus::Retired)?;
        version.status = VersionStatus::Retired;
        version.updated_at = now;
        Ok(())
    }
}
