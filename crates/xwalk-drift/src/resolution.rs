//! # Drift Resolution Lifecycle
//!
//! Drift records start `detected` and move through acknowledge/resolve
//! operations only. Records are never deleted; every transition appends
//! to the record's history. Unknown ids are a `NotFound` error, never a
//! silent no-op, and re-resolving a settled record is an
//! `InvalidTransition`.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use xwalk_core::{CoreError, DriftId, DriftRecordStatus, MappingId, ResolutionType, VersionId};

use crate::record::{ComplianceDrift, DriftTransition};

/// Caller-supplied resolution details.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DriftResolution {
    /// Which of the record's resolution paths was taken.
    pub resolution_type: ResolutionType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    pub resolved_by: String,
}

/// The drift record collection.
#[derive(Debug, Default)]
pub struct DriftStore {
    records: BTreeMap<DriftId, ComplianceDrift>,
}

impl DriftStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Publish a scan's records into the store.
    pub fn insert_all(&mut self, drifts: Vec<ComplianceDrift>) {
        for drift in drifts {
            self.records.insert(drift.id.clone(), drift);
        }
    }

    /// Publish a re-scan of one version transition.
    ///
    /// Records for the same transition that are still in `detected`
    /// status are replaced by the fresh scan results; records a human
    /// has already acted on (acknowledged, in review, settled) are
    /// retained untouched — they are the audit trail — and the fresh
    /// scan's duplicate of such a pair is dropped rather than
    /// re-opened.
    pub fn replace_detected_for_transition(
        &mut self,
        old_version: &VersionId,
        new_version: &VersionId,
        drifts: Vec<ComplianceDrift>,
    ) {
        self.records.retain(|_, d| {
            !(d.status == DriftRecordStatus::Detected
                && &d.old_framework_version_id == old_version
                && &d.new_framework_version_id == new_version)
        });

        let handled: std::collections::BTreeSet<(String, String)> = self
            .records
            .values()
            .filter(|d| {
                &d.old_framework_version_id == old_version
                    && &d.new_framework_version_id == new_version
            })
            .map(|d| (d.control_id.as_str().to_string(), d.requirement_code.clone()))
            .collect();

        self.insert_all(
            drifts
                .into_iter()
                .filter(|d| {
                    !handled.contains(&(
                        d.control_id.as_str().to_string(),
                        d.requirement_code.clone(),
                    ))
                })
                .collect(),
        );
    }

    pub fn get(&self, id: &DriftId) -> Option<&ComplianceDrift> {
        self.records.get(id)
    }

    /// All records, open or settled.
    pub fn all(&self) -> impl Iterator<Item = &ComplianceDrift> {
        self.records.values()
    }

    /// Open records sorted by ascending days remaining — the most
    /// urgent deadline first. `days_remaining` is derived from `now` at
    /// this call, never cached.
    pub fn open_sorted_by_deadline(&self, now: DateTime<Utc>) -> Vec<&ComplianceDrift> {
        let mut open: Vec<&ComplianceDrift> =
            self.records.values().filter(|d| d.is_open()).collect();
        open.sort_by_key(|d| (d.days_remaining(now), d.id.clone()));
        open
    }

    /// Acknowledge a detected record.
    ///
    /// # Errors
    ///
    /// `NotFound` for an unknown id; `InvalidTransition` unless the
    /// record is currently `detected`.
    pub fn acknowledge(
        &mut self,
        id: &DriftId,
        now: DateTime<Utc>,
    ) -> Result<&ComplianceDrift, CoreError> {
        let record = self
            .records
            .get_mut(id)
            .ok_or_else(|| CoreError::not_found("drift record", id.as_str()))?;
        if record.status != DriftRecordStatus::Detected {
            return Err(CoreError::invalid_transition(
                record.status.as_str(),
                DriftRecordStatus::Acknowledged.as_str(),
                "only a detected record can be acknowledged",
            ));
        }
        record.history.push(DriftTransition {
            from: record.status,
            to: DriftRecordStatus::Acknowledged,
            at: now,
            by: None,
            note: None,
        });
        record.status = DriftRecordStatus::Acknowledged;
        Ok(record)
    }

    /// Resolve a record, stamping who/when/how.
    ///
    /// Returns the affected mapping id (if the record has one) so the
    /// caller can reset that mapping's drift status to `current`.
    ///
    /// # Errors
    ///
    /// `NotFound` for an unknown id; `InvalidTransition` when the record
    /// is already resolved or accepted.
    pub fn resolve(
        &mut self,
        id: &DriftId,
        resolution: DriftResolution,
        now: DateTime<Utc>,
    ) -> Result<(ComplianceDrift, Option<MappingId>), CoreError> {
        let record = self
            .records
            .get_mut(id)
            .ok_or_else(|| CoreError::not_found("drift record", id.as_str()))?;
        if !record.status.is_open() {
            return Err(CoreError::invalid_transition(
                record.status.as_str(),
                DriftRecordStatus::Resolved.as_str(),
                "drift record is already settled",
            ));
        }

        let target = match resolution.resolution_type {
            ResolutionType::AcceptRisk => DriftRecordStatus::AcceptedRisk,
            _ => DriftRecordStatus::Resolved,
        };

        record.history.push(DriftTransition {
            from: record.status,
            to: target,
            at: now,
            by: Some(resolution.resolved_by.clone()),
            note: resolution.notes.clone(),
        });
        record.status = target;
        record.resolved_at = Some(now);
        record.resolved_by = Some(resolution.resolved_by);
        record.resolution_notes = resolution.notes;

        Ok((record.clone(), record.mapping_id.clone()))
    }
}
