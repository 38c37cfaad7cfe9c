//! # The Crosswalk Engine
//!
//! One engine instance per tenant. The engine owns the framework
//! versions, requirement library, crosswalk, and gap/drift collections;
//! the control inventory, answer store, and id generator are injected
//! collaborators. All inbound operations go through the engine — the
//! collections have no other mutator.
//!
//! Recomputation passes (drift scan, gap recalculation) compute their
//! complete result over a read snapshot first and publish under a
//! write lock second, so a failing pass changes nothing and a reader
//! never sees half a pass.

use std::collections::BTreeSet;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use parking_lot::RwLock;

use xwalk_core::{
    ControlId, CoreError, CoveragePercent, DriftId, FrameworkId, GapId, GapStatus,
    IdProvider, MappingDriftStatus, MappingId, MappingStrength, RequirementId, VersionId,
    VersionStatus,
};
use xwalk_crosswalk::{
    AnswerSource, ControlDirectory, CrosswalkMapping, MappingStore, NewMapping,
};
use xwalk_drift::{
    compare_versions, detect_drift, ComplianceDrift, DriftResolution, DriftStore,
    MappingSuggestion, VersionComparison,
};
use xwalk_library::{
    ingest_catalog, CatalogDocument, FrameworkVersion, MasterRequirement,
    RequirementLibrary, VersionManager,
};
use xwalk_scoring::{
    domain_breakdown, recalculate_gaps, summarize_framework, weighted_risk_score, CustomGap,
    DomainBreakdown, FrameworkCoverageSummary, RiskScoreReport,
};

use crate::config::EngineConfig;
use crate::store::GapStore;
use crate::views::{
    ActivationReport, DashboardSnapshot, DriftScanReport, GapRecalculationReport,
    IngestReport, OpenDrift,
};

/// Caller input for creating a crosswalk mapping.
#[derive(Debug, Clone)]
pub struct NewMappingRequest {
    pub control_id: ControlId,
    pub requirement_id: RequirementId,
    pub strength: MappingStrength,
    /// Raw percentage; validated into [0, 100] by the engine.
    pub coverage_percentage: u8,
    pub covered_aspects: BTreeSet<String>,
    pub uncovered_aspects: BTreeSet<String>,
    pub justification: String,
}

/// The engine object. See the crate docs for the ownership model.
pub struct CrosswalkEngine {
    versions: RwLock<VersionManager>,
    library: RwLock<RequirementLibrary>,
    mappings: RwLock<MappingStore>,
    drifts: RwLock<DriftStore>,
    gaps: RwLock<GapStore>,
    controls: Arc<dyn ControlDirectory>,
    answers: Arc<dyn AnswerSource>,
    ids: Arc<dyn IdProvider>,
    config: EngineConfig,
}

impl CrosswalkEngine {
    /// Construct an engine with injected collaborators.
    pub fn new(
        controls: Arc<dyn ControlDirectory>,
        answers: Arc<dyn AnswerSource>,
        ids: Arc<dyn IdProvider>,
        config: EngineConfig,
    ) -> Self {
        Self {
            versions: RwLock::new(VersionManager::new()),
            library: RwLock::new(RequirementLibrary::new()),
            mappings: RwLock::new(MappingStore::new()),
            drifts: RwLock::new(DriftStore::new()),
            gaps: RwLock::new(GapStore::new()),
            controls,
            answers,
            ids,
            config,
        }
    }

    // ── Catalog & version lifecycle ──────────────────────────────────

    /// Ingest a catalog document as a new draft framework version.
    pub fn ingest_catalog(&self, doc: &CatalogDocument) -> Result<IngestReport, CoreError> {
        let now = Utc::now();
        let outcome = ingest_catalog(doc, self.ids.as_ref(), now)?;
        let report = IngestReport {
            framework_id: outcome.version.framework_id.clone(),
            version_id: outcome.version.id.clone(),
            requirement_count: outcome.requirements.len(),
            warnings: outcome.warnings,
            digest: outcome.digest,
        };

        let mut library = self.library.write();
        for requirement in outcome.requirements {
            library.upsert(requirement);
        }
        drop(library);
        self.versions.write().upsert(outcome.version);
        Ok(report)
    }

    /// Publish a draft version.
    pub fn publish_version(&self, id: &VersionId) -> Result<(), CoreError> {
        self.versions.write().publish(id, Utc::now())
    }

    /// Activate a version. When the framework had an active version,
    /// it is superseded and the drift scan against it runs
    /// automatically, publishing its full result set atomically.
    pub fn activate_version(&self, id: &VersionId) -> Result<ActivationReport, CoreError> {
        let now = Utc::now();
        let outcome = self.versions.write().activate(id, now)?;

        let (drifts_detected, mappings_flagged) = match &outcome.superseded {
            Some(old_id) => {
                let scan = self.run_drift_scan(old_id, id, now)?;
                (scan.drifts_detected, scan.mappings_flagged)
            }
            None => (0, 0),
        };

        Ok(ActivationReport {
            activated: outcome.activated,
            superseded: outcome.superseded,
            drifts_detected,
            mappings_flagged,
        })
    }

    /// Retire a superseded version.
    pub fn retire_version(&self, id: &VersionId) -> Result<(), CoreError> {
        self.versions.write().retire(id, Utc::now())
    }

    /// The single active version of a framework.
    pub fn get_active_version(&self, framework_id: &FrameworkId) -> Option<FrameworkVersion> {
        self.versions.read().get_active(framework_id).cloned()
    }

    /// The most recently effective version, regardless of status.
    pub fn get_latest_version(&self, framework_id: &FrameworkId) -> Option<FrameworkVersion> {
        self.versions.read().get_latest(framework_id).cloned()
    }

    // ── Crosswalk ────────────────────────────────────────────────────

    /// Create a mapping between a control and a requirement.
    ///
    /// # Errors
    ///
    /// `NotFound` when the control or requirement is unknown;
    /// `Validation` when the coverage percentage is out of range.
    pub fn create_mapping(
        &self,
        request: NewMappingRequest,
    ) -> Result<CrosswalkMapping, CoreError> {
        if self.controls.control(&request.control_id).is_none() {
            return Err(CoreError::not_found("control", request.control_id.as_str()));
        }
        let coverage = CoveragePercent::new(request.coverage_percentage)?;
        let framework_version_id = {
            let library = self.library.read();
            library
                .get(&request.requirement_id)
                .ok_or_else(|| {
                    CoreError::not_found("requirement", request.requirement_id.as_str())
                })?
                .framework_version_id
                .clone()
        };

        let mut mappings = self.mappings.write();
        let created = mappings.create(
            NewMapping {
                control_id: request.control_id,
                requirement_id: request.requirement_id,
                framework_version_id,
                mapping_strength: request.strength,
                coverage_percentage: coverage,
                covered_aspects: request.covered_aspects,
                uncovered_aspects: request.uncovered_aspects,
                justification: request.justification,
            },
            self.ids.as_ref(),
            Utc::now(),
        )?;
        Ok(created.clone())
    }

    /// Remove a mapping outright.
    pub fn remove_mapping(&self, id: &MappingId) -> Result<CrosswalkMapping, CoreError> {
        self.mappings.write().remove(id)
    }

    /// Ranked control suggestions for a requirement (the auto-mapper's
    /// input).
    pub fn suggest_mappings(
        &self,
        requirement_id: &RequirementId,
    ) -> Result<Vec<MappingSuggestion>, CoreError> {
        let library = self.library.read();
        let requirement = library
            .get(requirement_id)
            .ok_or_else(|| CoreError::not_found("requirement", requirement_id.as_str()))?;
        let controls = self.controls.all_controls();
        Ok(xwalk_drift::suggest_mappings(
            requirement,
            &controls,
            &self.config.drift.matcher,
        ))
    }

    /// Case-insensitive requirement search, optionally scoped to one
    /// framework.
    pub fn search_requirements(
        &self,
        query: &str,
        framework_id: Option<&FrameworkId>,
    ) -> Vec<MasterRequirement> {
        let versions = self.versions.read();
        let filter: Option<BTreeSet<VersionId>> = framework_id.map(|fw| {
            versions
                .versions_of(fw)
                .into_iter()
                .map(|v| v.id.clone())
                .collect()
        });
        drop(versions);
        let library = self.library.read();
        library
            .search(query, filter.as_ref())
            .into_iter()
            .cloned()
            .collect()
    }

    // ── Drift ────────────────────────────────────────────────────────

    /// Explicitly run the drift scan for a version transition. The two
    /// versions must belong to the same framework.
    pub fn detect_drift(
        &self,
        old_version_id: &VersionId,
        new_version_id: &VersionId,
    ) -> Result<DriftScanReport, CoreError> {
        {
            let versions = self.versions.read();
            let old = versions
                .get(old_version_id)
                .ok_or_else(|| CoreError::not_found("framework version", old_version_id.as_str()))?;
            let new = versions
                .get(new_version_id)
                .ok_or_else(|| CoreError::not_found("framework version", new_version_id.as_str()))?;
            if old.framework_id != new.framework_id {
                return Err(CoreError::Validation(format!(
                    "versions {old_version_id} and {new_version_id} belong to different frameworks"
                )));
            }
        }
        self.run_drift_scan(old_version_id, new_version_id, Utc::now())
    }

    /// Acknowledge a drift record.
    pub fn acknowledge_drift(&self, id: &DriftId) -> Result<ComplianceDrift, CoreError> {
        Ok(self.drifts.write().acknowledge(id, Utc::now())?.clone())
    }

    /// Resolve a drift record. When the record has an associated
    /// mapping, that mapping's drift status resets to `current`.
    pub fn resolve_drift(
        &self,
        id: &DriftId,
        resolution: DriftResolution,
    ) -> Result<ComplianceDrift, CoreError> {
        let now = Utc::now();
        let (record, mapping_id) = self.drifts.write().resolve(id, resolution, now)?;
        if let Some(mapping_id) = mapping_id {
            match self
                .mappings
                .write()
                .set_drift_status(&mapping_id, MappingDriftStatus::Current, now)
            {
                Ok(()) => {}
                Err(CoreError::NotFound { .. }) => {
                    // The mapping was removed after the drift was
                    // detected; nothing left to reset.
                    tracing::warn!(mapping = %mapping_id, "resolved drift's mapping no longer exists");
                }
                Err(e) => return Err(e),
            }
        }
        Ok(record)
    }

    /// Open drift records, ascending days remaining.
    pub fn open_drifts(&self) -> Vec<OpenDrift> {
        let now = Utc::now();
        self.drifts
            .read()
            .open_sorted_by_deadline(now)
            .into_iter()
            .map(|d| OpenDrift::from_record(d, now))
            .collect()
    }

    /// Look up one drift record.
    pub fn get_drift(&self, id: &DriftId) -> Option<ComplianceDrift> {
        self.drifts.read().get(id).cloned()
    }

    // ── Gaps ─────────────────────────────────────────────────────────

    /// Run the full gap recalculation pass over every active
    /// framework version, preserving triage state by requirement id.
    pub fn recalculate_gaps(&self) -> Result<GapRecalculationReport, CoreError> {
        let now = Utc::now();

        let next = {
            let versions = self.versions.read();
            let library = self.library.read();
            let mappings = self.mappings.read();
            let existing = self.gaps.read().snapshot();

            let active_versions: Vec<VersionId> = versions
                .all()
                .filter(|v| v.status == VersionStatus::Active)
                .map(|v| v.id.clone())
                .collect();
            let requirements: Vec<&MasterRequirement> = active_versions
                .iter()
                .flat_map(|vid| library.requirements_for_version(vid).into_values())
                .collect();

            recalculate_gaps(
                requirements.into_iter(),
                &mappings,
                &existing,
                self.config.gap_thresholds,
                self.ids.as_ref(),
                now,
            )?
        };

        let mut store = self.gaps.write();
        store.replace_all(next);
        let total = store.all().count();
        let open = store.open_sorted().len();
        Ok(GapRecalculationReport {
            total_gaps: total,
            open_gaps: open,
        })
    }

    /// Update a gap's triage status, optionally appending a note.
    pub fn set_gap_status(
        &self,
        id: &GapId,
        status: GapStatus,
        note: Option<String>,
    ) -> Result<CustomGap, CoreError> {
        Ok(self.gaps.write().set_status(id, status, note)?.clone())
    }

    /// Attach direct evidence to a gap.
    pub fn attach_gap_evidence(
        &self,
        id: &GapId,
        reference: impl Into<String>,
    ) -> Result<CustomGap, CoreError> {
        Ok(self.gaps.write().attach_evidence(id, reference)?.clone())
    }

    /// Open gaps, most severe first.
    pub fn open_gaps(&self) -> Vec<CustomGap> {
        self.gaps.read().open_sorted().into_iter().cloned().collect()
    }

    // ── Comparison ───────────────────────────────────────────────────

    /// Side-by-side comparison of one requirement across a version
    /// transition.
    pub fn compare_versions(
        &self,
        requirement_code: &str,
        old_version_id: &VersionId,
        new_version_id: &VersionId,
    ) -> Result<VersionComparison, CoreError> {
        let versions = self.versions.read();
        let old = versions
            .get(old_version_id)
            .ok_or_else(|| CoreError::not_found("framework version", old_version_id.as_str()))?
            .clone();
        let new = versions
            .get(new_version_id)
            .ok_or_else(|| CoreError::not_found("framework version", new_version_id.as_str()))?
            .clone();
        drop(versions);

        let library = self.library.read();
        let mappings = self.mappings.read();
        compare_versions(
            requirement_code,
            &old,
            &new,
            &library,
            &mappings,
            self.answers.as_ref(),
            &self.config.drift,
        )
    }

    // ── Read models ──────────────────────────────────────────────────

    /// Coverage summary for a framework's active version.
    ///
    /// # Errors
    ///
    /// `NotFound` when the framework has no active version.
    pub fn framework_summary(
        &self,
        framework_id: &FrameworkId,
    ) -> Result<FrameworkCoverageSummary, CoreError> {
        let version_id = self
            .get_active_version(framework_id)
            .ok_or_else(|| CoreError::not_found("active framework version", framework_id.as_str()))?
            .id;
        let library = self.library.read();
        let mappings = self.mappings.read();
        Ok(summarize_framework(
            framework_id,
            &version_id,
            &library,
            &mappings,
            self.answers.as_ref(),
        ))
    }

    /// Per-domain control implementation breakdown.
    pub fn domain_breakdown(&self) -> Vec<DomainBreakdown> {
        domain_breakdown(&self.controls.all_controls(), self.answers.as_ref())
    }

    /// Weighted/unweighted risk scores with gap lists.
    pub fn risk_report(&self) -> RiskScoreReport {
        weighted_risk_score(&self.controls.all_controls(), self.answers.as_ref())
    }

    /// Complete dashboard snapshot across every framework with an
    /// active version.
    pub fn dashboard(&self) -> DashboardSnapshot {
        let frameworks: Vec<FrameworkCoverageSummary> = {
            let versions = self.versions.read();
            let active: Vec<(FrameworkId, VersionId)> = versions
                .all()
                .filter(|v| v.status == VersionStatus::Active)
                .map(|v| (v.framework_id.clone(), v.id.clone()))
                .collect();
            drop(versions);
            let library = self.library.read();
            let mappings = self.mappings.read();
            active
                .iter()
                .map(|(fw, vid)| {
                    summarize_framework(fw, vid, &library, &mappings, self.answers.as_ref())
                })
                .collect()
        };

        DashboardSnapshot {
            frameworks,
            domains: self.domain_breakdown(),
            risk: self.risk_report(),
            open_drifts: self.open_drifts(),
            open_gaps: self.open_gaps(),
            generated_at: Utc::now(),
        }
    }

    // ── Internal ─────────────────────────────────────────────────────

    /// Compute a drift scan over a read snapshot, then publish records
    /// and mapping flips. Nothing is written if the scan fails.
    fn run_drift_scan(
        &self,
        old_version_id: &VersionId,
        new_version_id: &VersionId,
        now: DateTime<Utc>,
    ) -> Result<DriftScanReport, CoreError> {
        let (old, new) = {
            let versions = self.versions.read();
            let old = versions
                .get(old_version_id)
                .ok_or_else(|| CoreError::not_found("framework version", old_version_id.as_str()))?
                .clone();
            let new = versions
                .get(new_version_id)
                .ok_or_else(|| CoreError::not_found("framework version", new_version_id.as_str()))?
                .clone();
            (old, new)
        };

        let outcome = {
            let library = self.library.read();
            let mappings = self.mappings.read();
            let controls = self.controls.all_controls();
            detect_drift(
                &old,
                &new,
                &library,
                &mappings,
                &controls,
                self.answers.as_ref(),
                &self.config.drift,
                self.ids.as_ref(),
                now,
            )?
        };

        let report = DriftScanReport {
            old_version: old.id.clone(),
            new_version: new.id.clone(),
            drifts_detected: outcome.drifts.len(),
            mappings_flagged: outcome.mapping_updates.len(),
        };

        {
            let mut mappings = self.mappings.write();
            // Verify every target exists before the first flip so the
            // publish is all-or-nothing.
            for (mapping_id, _) in &outcome.mapping_updates {
                if mappings.get(mapping_id).is_none() {
                    return Err(CoreError::not_found("mapping", mapping_id.as_str()));
                }
            }
            for (mapping_id, status) in &outcome.mapping_updates {
                mappings.set_drift_status(mapping_id, *status, now)?;
            }
        }
        self.drifts
            .write()
            .replace_detected_for_transition(&old.id, &new.id, outcome.drifts);

        Ok(report)
    }
}
