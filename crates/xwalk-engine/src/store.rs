//! # Gap Collection
//!
//! The engine-owned store for custom gaps. Recalculation passes
//! replace the collection wholesale; triage mutations (status, notes,
//! direct evidence) go through targeted operations that report
//! `NotFound` for unknown ids.

use std::collections::BTreeMap;

use xwalk_core::{CoreError, GapId, GapStatus};
use xwalk_scoring::CustomGap;

/// The gap record collection.
#[derive(Debug, Default)]
pub struct GapStore {
    gaps: BTreeMap<GapId, CustomGap>,
}

impl GapStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Publish a recalculation pass's complete result set, replacing
    /// the previous collection.
    pub fn replace_all(&mut self, gaps: Vec<CustomGap>) {
        self.gaps = gaps.into_iter().map(|g| (g.id.clone(), g)).collect();
    }

    pub fn get(&self, id: &GapId) -> Option<&CustomGap> {
        self.gaps.get(id)
    }

    pub fn all(&self) -> impl Iterator<Item = &CustomGap> {
        self.gaps.values()
    }

    /// Snapshot of the current collection, for feeding the next
    /// recalculation pass.
    pub fn snapshot(&self) -> Vec<CustomGap> {
        self.gaps.values().cloned().collect()
    }

    /// Open gaps, most severe first, ties broken by requirement code.
    pub fn open_sorted(&self) -> Vec<&CustomGap> {
        let mut open: Vec<&CustomGap> =
            self.gaps.values().filter(|g| g.status.is_open()).collect();
        open.sort_by(|a, b| {
            b.severity
                .cmp(&a.severity)
                .then_with(|| a.requirement_code.cmp(&b.requirement_code))
        });
        open
    }

    /// Update a gap's triage status and optionally append a note.
    pub fn set_status(
        &mut self,
        id: &GapId,
        status: GapStatus,
        note: Option<String>,
    ) -> Result<&CustomGap, CoreError> {
        let gap = self
            .gaps
            .get_mut(id)
            .ok_or_else(|| CoreError::not_found("gap record", id.as_str()))?;
        gap.status = status;
        if let Some(note) = note {
            gap.notes = Some(match gap.notes.take() {
                Some(existing) => format!("{existing}\n{note}"),
                None => note,
            });
        }
        Ok(gap)
    }

    /// Attach direct evidence to a gap (for gaps resolved without a
    /// control).
    pub fn attach_evidence(
        &mut self,
        id: &GapId,
        reference: impl Into<String>,
    ) -> Result<&CustomGap, CoreError> {
        let gap = self
            .gaps
            .get_mut(id)
            .ok_or_else(|| CoreError::not_found("gap record", id.as_str()))?;
        gap.direct_evidence.push(reference.into());
        Ok(gap)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use chrono::Utc;
    use xwalk_core::{GapType, RequirementId, Severity, VersionId};

    fn gap(id: &str, code: &str, severity: Severity) -> CustomGap {
        CustomGap {
            id: GapId::new(id).unwrap(),
            requirement_id: RequirementId::new(format!("r-{id}")).unwrap(),
            framework_version_id: VersionId::new("v1").unwrap(),
            requirement_code: code.to_string(),
            gap_type: GapType::NoControlMapped,
            severity,
            coverage: 0,
            resolution_options: Vec::new(),
            status: GapStatus::Identified,
            notes: None,
            direct_evidence: Vec::new(),
            first_detected_at: Utc::now(),
        }
    }

    #[test]
    fn open_sorted_by_severity_then_code() {
        let mut store = GapStore::new();
        store.replace_all(vec![
            gap("g1", "B.2", Severity::Medium),
            gap("g2", "A.1", Severity::Critical),
            gap("g3", "A.2", Severity::Critical),
        ]);
        let ordered: Vec<&str> = store.open_sorted().iter().map(|g| g.requirement_code.as_str()).collect();
        assert_eq!(ordered, vec!["A.1", "A.2", "B.2"]);
    }

    #[test]
    fn set_status_appends_notes() {
        let mut store = GapStore::new();
        store.replace_all(vec![gap("g1", "A.1", Severity::Low)]);
        let id = GapId::new("g1").unwrap();
        store.set_status(&id, GapStatus::Acknowledged, Some("first".into())).unwrap();
        store.set_status(&id, GapStatus::InProgress, Some("second".into())).unwrap();
        let g = store.get(&id).unwrap();
        assert_eq!(g.status, GapStatus::InProgress);
        assert_eq!(g.notes.as_deref(), Some("first\nsecond"));
    }

    #[test]
    fn unknown_gap_is_not_found() {
        let mut store = GapStore::new();
        let err = store
            .set_status(&GapId::new("ghost").unwrap(), GapStatus::Resolved, None)
            .unwrap_err();
        assert!(matches!(err, CoreError::NotFound { .. }));
    }

    #[test]
    fn replace_all_is_wholesale() {
        let mut store = GapStore::new();
        store.replace_all(vec![gap("g1", "A.1", Severity::Low)]);
        store.replace_all(vec![gap("g2", "B.1", Severity::High)]);
        assert!(store.get(&GapId::new("g1").unwrap()).is_none());
        assert!(store.get(&GapId::new("g2").unwrap()).is_some());
    }
}
