//! # End-to-End Engine Lifecycle
//!
//! Walks the full path: catalog ingestion → publication → activation →
//! crosswalk mapping → scoring → gap recalculation → version rev with
//! automatic drift scan → drift resolution. One engine instance, no
//! global state.

use std::collections::BTreeSet;
use std::sync::Arc;

use xwalk_core::{
    ControlAnswer, ControlId, FrameworkId, GapStatus, MappingStrength, ResolutionType,
    RiskLevel, UuidProvider,
};
use xwalk_crosswalk::{Control, InMemoryAnswerSource, InMemoryControlDirectory};
use xwalk_drift::DriftResolution;
use xwalk_engine::{CrosswalkEngine, EngineConfig, NewMappingRequest};
use xwalk_library::CatalogDocument;

const SOC2_2017: &str = r#"
framework_id: soc2
version_code: "2017"
published_date: "2017-04-01T00:00:00Z"
effective_date: "2017-12-15T00:00:00Z"
requirements:
  - code: CC6.1
    title: Logical access security
    official_text: The entity implements logical access security software.
    implementation_level: mandatory
    verification_frequency: annual
    risk_weight: 5
    required_evidence_types: [access_policy]
    keywords: [access, logical, security]
  - code: CC6.2
    title: User registration
    official_text: New internal and external users are registered and authorized.
    implementation_level: mandatory
    verification_frequency: annual
    risk_weight: 4
    required_evidence_types: [user_list]
    keywords: [registration, authorization, users]
  - code: CC7.1
    title: Vulnerability monitoring
    official_text: The entity monitors for vulnerabilities.
    implementation_level: recommended
    verification_frequency: quarterly
    risk_weight: 6
    required_evidence_types: [scan_report]
    keywords: [vulnerability, monitoring, scanning]
"#;

const SOC2_2022: &str = r#"
framework_id: soc2
version_code: "2022"
published_date: "2022-10-01T00:00:00Z"
effective_date: "2023-06-01T00:00:00Z"
transition_deadline: "2024-06-01T00:00:00Z"
requirements:
  - code: CC6.1
    title: Logical access security
    official_text: The entity implements logical access security software.
    implementation_level: mandatory
    verification_frequency: annual
    risk_weight: 5
    required_evidence_types: [access_policy, audit_log]
    keywords: [access, logical, security]
  - code: CC6.2
    title: User registration
    official_text: New internal and external users must be registered and authorized.
    implementation_level: mandatory
    verification_frequency: annual
    risk_weight: 4
    required_evidence_types: [user_list]
    keywords: [registration, authorization, users]
  - code: CC7.1
    title: Vulnerability monitoring
    official_text: The entity monitors for vulnerabilities.
    implementation_level: mandatory
    verification_frequency: quarterly
    risk_weight: 6
    required_evidence_types: [scan_report]
    keywords: [vulnerability, monitoring, scanning]
  - code: CC9.9
    title: AI governance oversight
    official_text: The entity governs the use of artificial intelligence systems.
    implementation_level: mandatory
    verification_frequency: annual
    risk_weight: 8
    required_evidence_types: [model_inventory]
    emerging_tech_category: ai_governance
    keywords: [artificial, intelligence, governance, models]
"#;

fn build_engine() -> (CrosswalkEngine, Vec<ControlId>) {
    let controls = [
        ("ctl-access", "Logical access control", RiskLevel::Critical, &["access", "logical"][..], "access"),
        ("ctl-users", "User registration workflow", RiskLevel::High, &["registration", "users"][..], "access"),
        ("ctl-vuln", "Vulnerability scanning", RiskLevel::Medium, &["vulnerability", "scanning"][..], "ops"),
    ];
    let mut directory = InMemoryControlDirectory::new();
    let mut answers = InMemoryAnswerSource::new();
    let mut ids = Vec::new();
    for (id, title, level, keywords, domain) in controls {
        let control_id = ControlId::new(id).unwrap();
        directory.insert(Control {
            id: control_id.clone(),
            title: title.to_string(),
            risk_level: level,
            keywords: keywords.iter().map(|s| s.to_string()).collect(),
            domain: domain.to_string(),
        });
        answers.set_answer(control_id.clone(), ControlAnswer::Yes);
        ids.push(control_id);
    }

    let engine = CrosswalkEngine::new(
        Arc::new(directory),
        Arc::new(answers),
        Arc::new(UuidProvider),
        EngineConfig::default(),
    );
    (engine, ids)
}

fn map_all(engine: &CrosswalkEngine, controls: &[ControlId], version: &xwalk_core::VersionId) {
    let pairs = [("CC6.1", 0, 90), ("CC6.2", 1, 85), ("CC7.1", 2, 95)];
    for (code, control_idx, coverage) in pairs {
        let requirement = engine
            .search_requirements(code, None)
            .into_iter()
            .find(|r| &r.framework_version_id == version)
            .unwrap();
        engine
            .create_mapping(NewMappingRequest {
                control_id: controls[control_idx].clone(),
                requirement_id: requirement.id,
                strength: MappingStrength::Direct,
                coverage_percentage: coverage,
                covered_aspects: BTreeSet::new(),
                uncovered_aspects: BTreeSet::new(),
                justification: format!("covers {code}"),
            })
            .unwrap();
    }
}

// ---------------------------------------------------------------------------
// 1. Ingest → activate → map → score
// ---------------------------------------------------------------------------

#[test]
fn ingest_activate_map_and_score() {
    let (engine, controls) = build_engine();
    let doc = CatalogDocument::from_yaml_str(SOC2_2017).unwrap();
    let v1 = engine.ingest_catalog(&doc).unwrap();
    assert_eq!(v1.requirement_count, 3);
    assert!(!v1.digest.is_empty());

    engine.publish_version(&v1.version_id).unwrap();
    let report = engine.activate_version(&v1.version_id).unwrap();
    assert!(report.superseded.is_none());
    assert_eq!(report.drifts_detected, 0);

    map_all(&engine, &controls, &v1.version_id);

    let summary = engine
        .framework_summary(&FrameworkId::new("soc2").unwrap())
        .unwrap();
    assert_eq!(summary.mapped_requirements, 3);
    assert_eq!(summary.satisfied_requirements, 3);
    assert_eq!(summary.percentage, 100);

    let risk = engine.risk_report();
    assert_eq!(risk.weighted_score, 100);
    assert!(risk.critical_gaps.is_empty());

    let domains = engine.domain_breakdown();
    assert_eq!(domains.len(), 2);
    assert!(domains.iter().all(|d| d.percentage == 100));
}

// ---------------------------------------------------------------------------
// 2. Gap pass finds unmapped and thin coverage, then converges
// ---------------------------------------------------------------------------

#[test]
fn gap_pass_identifies_and_releases_gaps() {
    let (engine, controls) = build_engine();
    let doc = CatalogDocument::from_yaml_str(SOC2_2017).unwrap();
    let v1 = engine.ingest_catalog(&doc).unwrap();
    engine.activate_version(&v1.version_id).unwrap();

    // Nothing mapped yet: three unmapped gaps.
    let report = engine.recalculate_gaps().unwrap();
    assert_eq!(report.total_gaps, 3);

    // Triage one, then map everything and recalculate.
    let gap = engine.open_gaps().into_iter().next().unwrap();
    engine
        .set_gap_status(&gap.id, GapStatus::InProgress, Some("assigned".into()))
        .unwrap();

    map_all(&engine, &controls, &v1.version_id);
    let report = engine.recalculate_gaps().unwrap();
    assert_eq!(report.total_gaps, 0);
    assert!(engine.open_gaps().is_empty());
}

// ---------------------------------------------------------------------------
// 3. Version rev: automatic drift scan, resolution, mapping reset
// ---------------------------------------------------------------------------

#[test]
fn version_rev_detects_and_resolves_drift() {
    let (engine, controls) = build_engine();
    let v1 = engine
        .ingest_catalog(&CatalogDocument::from_yaml_str(SOC2_2017).unwrap())
        .unwrap();
    engine.activate_version(&v1.version_id).unwrap();
    map_all(&engine, &controls, &v1.version_id);

    let v2 = engine
        .ingest_catalog(&CatalogDocument::from_yaml_str(SOC2_2022).unwrap())
        .unwrap();
    let report = engine.activate_version(&v2.version_id).unwrap();
    assert_eq!(report.superseded, Some(v1.version_id.clone()));

    // Expected drift: CC6.1 evidence change, CC6.2 strengthened text,
    // CC7.1 recommended→mandatory escalation, CC9.9 new requirement
    // (no control matches its token set strongly enough to suggest, so
    // at minimum the three matched-requirement drifts exist).
    assert!(report.drifts_detected >= 3);

    let open = engine.open_drifts();
    assert_eq!(open.len(), report.drifts_detected);
    // Sorted ascending by days remaining; all share one deadline here.
    for pair in open.windows(2) {
        assert!(pair[0].days_remaining <= pair[1].days_remaining);
    }

    // Resolve the CC6.1 evidence drift; its mapping resets to current.
    let evidence_drift = open
        .iter()
        .find(|d| d.drift.requirement_code == "CC6.1")
        .unwrap();
    let resolved = engine
        .resolve_drift(
            &evidence_drift.drift.id,
            DriftResolution {
                resolution_type: ResolutionType::UploadEvidence,
                notes: Some("audit logs attached".into()),
                resolved_by: "compliance-team".into(),
            },
        )
        .unwrap();
    assert_eq!(resolved.resolved_by.as_deref(), Some("compliance-team"));
    assert_eq!(engine.open_drifts().len(), report.drifts_detected - 1);

    // Acknowledge another; it stays open.
    let next = engine.open_drifts().into_iter().next().unwrap();
    engine.acknowledge_drift(&next.drift.id).unwrap();
    assert_eq!(engine.open_drifts().len(), report.drifts_detected - 1);
}

// ---------------------------------------------------------------------------
// 4. Comparator over the rev
// ---------------------------------------------------------------------------

#[test]
fn comparator_reports_positional_diff_and_projection() {
    let (engine, controls) = build_engine();
    let v1 = engine
        .ingest_catalog(&CatalogDocument::from_yaml_str(SOC2_2017).unwrap())
        .unwrap();
    engine.activate_version(&v1.version_id).unwrap();
    map_all(&engine, &controls, &v1.version_id);
    let v2 = engine
        .ingest_catalog(&CatalogDocument::from_yaml_str(SOC2_2022).unwrap())
        .unwrap();
    engine.activate_version(&v2.version_id).unwrap();

    // CC9.9 exists only in 2022: added, needs review.
    let added = engine
        .compare_versions("CC9.9", &v1.version_id, &v2.version_id)
        .unwrap();
    assert_eq!(added.change_type, xwalk_drift::ChangeType::Added);
    assert!(added.old_text.is_none());
    assert_eq!(
        added.projected_compliance_status,
        xwalk_drift::ProjectedComplianceStatus::NeedsReview
    );

    // CC6.2 text gained "must": modified, currently compliant, at risk
    // going forward only through the strengthened-text rule (answer
    // remains valid, so projection stays compliant).
    let modified = engine
        .compare_versions("CC6.2", &v1.version_id, &v2.version_id)
        .unwrap();
    assert_eq!(modified.change_type, xwalk_drift::ChangeType::Modified);
    assert_eq!(
        modified.current_compliance_status,
        xwalk_drift::CurrentComplianceStatus::Compliant
    );
    assert_eq!(
        modified.projected_compliance_status,
        xwalk_drift::ProjectedComplianceStatus::Compliant
    );
    assert!(modified
        .diff
        .iter()
        .any(|s| s.kind != xwalk_drift::DiffSegmentKind::Unchanged));

    // Unknown code is an error, not a silent empty result.
    assert!(engine
        .compare_versions("ZZ9.9", &v1.version_id, &v2.version_id)
        .is_err());
}
