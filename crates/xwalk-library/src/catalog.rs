//! # Catalog Ingestion
//!
//! Framework requirement catalogs arrive as YAML or JSON documents. This
//! module parses them, runs layered validation, and turns a valid
//! document into a draft [`FrameworkVersion`] plus its owned
//! [`MasterRequirement`] set, stamped with a content-addressed catalog
//! digest.
//!
//! ## Validation Layers
//!
//! 1. **Structural**: the document parses and required fields are present.
//! 2. **Range**: risk weights are in [1, 10], dates parse as RFC 3339.
//! 3. **Uniqueness**: requirement codes are unique within the catalog.
//! 4. **Advisory warnings** (non-fatal): mandatory requirements without
//!    evidence types, requirements without keywords.
//!
//! ## Digest
//!
//! `SHA256( b"xwalk-catalog-v1\0" + canonical(version metadata)
//!          + canonical(requirement)... )` with requirements fed in
//! requirement-code order. Digests chain through
//! `previous_version_id`, so a version lineage is content-addressed.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use xwalk_core::{
    CanonicalBytes, CoreError, EmergingTechCategory, FrameworkId, IdProvider,
    ImplementationLevel, RequirementId, RiskWeight, Sha256Accumulator,
    VerificationFrequency, VersionId, VersionStatus,
};

use crate::requirement::MasterRequirement;
use crate::version::{FrameworkVersion, VersionChange};

/// Domain-separation prefix for catalog digests.
const CATALOG_DIGEST_PREFIX: &[u8] = b"xwalk-catalog-v1\0";

// ---------------------------------------------------------------------------
// Document types
// ---------------------------------------------------------------------------

/// One requirement as it appears in a catalog document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogRequirement {
    pub code: String,
    pub title: String,
    pub official_text: String,
    pub implementation_level: ImplementationLevel,
    #[serde(default)]
    pub required_evidence_types: BTreeSet<String>,
    pub verification_frequency: VerificationFrequency,
    /// Raw weight; validated into [`RiskWeight`] during ingestion.
    pub risk_weight: u8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub emerging_tech_category: Option<EmergingTechCategory>,
    #[serde(default)]
    pub keywords: BTreeSet<String>,
    /// Per-requirement effective date; defaults to the version's.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub effective_date: Option<DateTime<Utc>>,
}

/// A complete catalog document for one framework version.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogDocument {
    pub framework_id: String,
    pub version_code: String,
    pub published_date: DateTime<Utc>,
    pub effective_date: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transition_deadline: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sunset_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub changes: Vec<VersionChange>,
    pub requirements: Vec<CatalogRequirement>,
}

impl CatalogDocument {
    /// Parse a catalog document from YAML.
    pub fn from_yaml_str(yaml: &str) -> Result<Self, CoreError> {
        serde_yaml::from_str(yaml)
            .map_err(|e| CoreError::Validation(format!("catalog YAML parse error: {e}")))
    }

    /// Parse a catalog document from JSON.
    pub fn from_json_str(json: &str) -> Result<Self, CoreError> {
        serde_json::from_str(json)
            .map_err(|e| CoreError::Validation(format!("catalog JSON parse error: {e}")))
    }

    /// Load a catalog document from disk, dispatching on the file
    /// extension (`.yaml`/`.yml` vs `.json`).
    pub fn from_path(path: &std::path::Path) -> Result<Self, CoreError> {
        let raw = std::fs::read_to_string(path).map_err(|e| {
            CoreError::Validation(format!("cannot read catalog {}: {e}", path.display()))
        })?;
        match path.extension().and_then(|e| e.to_str()) {
            Some("json") => Self::from_json_str(&raw),
            Some("yaml") | Some("yml") => Self::from_yaml_str(&raw),
            other => Err(CoreError::Validation(format!(
                "unsupported catalog extension {:?} for {}",
                other.unwrap_or(""),
                path.display()
            ))),
        }
    }
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

/// Result of validating a catalog document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogValidationResult {
    /// Whether the catalog can be ingested.
    pub is_valid: bool,
    /// Fatal problems; ingestion refuses while any exist.
    pub errors: Vec<String>,
    /// Advisory problems; ingestion proceeds.
    pub warnings: Vec<String>,
}

impl CatalogValidationResult {
    fn ok() -> Self {
        Self {
            is_valid: true,
            errors: Vec::new(),
            warnings: Vec::new(),
        }
    }

    fn error(&mut self, msg: impl Into<String>) {
        self.is_valid = false;
        self.errors.push(msg.into());
    }

    fn warning(&mut self, msg: impl Into<String>) {
        self.warnings.push(msg.into());
    }
}

/// Validate a catalog document without ingesting it.
pub fn validate_catalog(doc: &CatalogDocument) -> CatalogValidationResult {
    let mut result = CatalogValidationResult::ok();

    if doc.framework_id.trim().is_empty() {
        result.error("framework_id is empty");
    }
    if doc.version_code.trim().is_empty() {
        result.error("version_code is empty");
    }
    if doc.requirements.is_empty() {
        result.error("catalog contains no requirements");
    }

    let mut seen_codes: BTreeSet<&str> = BTreeSet::new();
    for req in &doc.requirements {
        if req.code.trim().is_empty() {
            result.error("requirement with empty code");
            continue;
        }
        if !seen_codes.insert(req.code.as_str()) {
            result.error(format!("duplicate requirement code: {}", req.code));
        }
        if let Err(e) = RiskWeight::new(req.risk_weight) {
            result.error(format!("requirement {}: {e}", req.code));
        }
        if req.official_text.trim().is_empty() {
            result.error(format!("requirement {}: official_text is empty", req.code));
        }
        if req.implementation_level.is_mandatory() && req.required_evidence_types.is_empty() {
            result.warning(format!(
                "requirement {}: mandatory but no evidence types listed",
                req.code
            ));
        }
        if req.keywords.is_empty() {
            result.warning(format!(
                "requirement {}: no keywords; auto-mapping will rely on title tokens only",
                req.code
            ));
        }
    }

    result
}

// ---------------------------------------------------------------------------
// Digest
// ---------------------------------------------------------------------------

#[derive(Serialize)]
struct CatalogDigestHeader<'a> {
    framework_id: &'a str,
    version_code: &'a str,
    published_date: &'a DateTime<Utc>,
    effective_date: &'a DateTime<Utc>,
}

/// Compute the content digest of a catalog document.
///
/// Requirements are fed to the accumulator in requirement-code order so
/// the digest is independent of document ordering.
pub fn catalog_digest(doc: &CatalogDocument) -> Result<String, CoreError> {
    let mut acc = Sha256Accumulator::new();
    acc.update(CATALOG_DIGEST_PREFIX);

    let header = CatalogDigestHeader {
        framework_id: &doc.framework_id,
        version_code: &doc.version_code,
        published_date: &doc.published_date,
        effective_date: &doc.effective_date,
    };
    acc.update_canonical(&CanonicalBytes::new(&header)?);

    let mut sorted: Vec<&CatalogRequirement> = doc.requirements.iter().collect();
    sorted.sort_by(|a, b| a.code.cmp(&b.code));
    for req in sorted {
        acc.update_canonical(&CanonicalBytes::new(req)?);
    }

    Ok(acc.finalize_hex())
}

// ---------------------------------------------------------------------------
// Ingestion
// ---------------------------------------------------------------------------

/// A successfully ingested catalog: the draft version record, its owned
/// requirements, and the advisory warnings from validation.
#[derive(Debug)]
pub struct IngestOutcome {
    pub version: FrameworkVersion,
    pub requirements: Vec<MasterRequirement>,
    pub warnings: Vec<String>,
    pub digest: String,
}

/// Turn a validated catalog document into a draft framework version and
/// its requirement set.
///
/// # Errors
///
/// Returns `Validation` carrying every fatal validation message when the
/// document is invalid. The outcome is all-or-nothing: no partial
/// requirement sets.
pub fn ingest_catalog(
    doc: &CatalogDocument,
    ids: &dyn IdProvider,
    now: DateTime<Utc>,
) -> Result<IngestOutcome, CoreError> {
    let validation = validate_catalog(doc);
    if !validation.is_valid {
        return Err(CoreError::Validation(format!(
            "catalog rejected: {}",
            validation.errors.join("; ")
        )));
    }
    for warning in &validation.warnings {
        tracing::warn!(framework = %doc.framework_id, "catalog warning: {warning}");
    }

    let digest = catalog_digest(doc)?;
    let version_id = VersionId::new(ids.next_id())?;

    let version = FrameworkVersion {
        id: version_id.clone(),
        framework_id: FrameworkId::new(doc.framework_id.clone())?,
        version_code: doc.version_code.clone(),
        status: VersionStatus::Draft,
        published_date: doc.published_date,
        effective_date: doc.effective_date,
        transition_deadline: doc.transition_deadline,
        sunset_date: doc.sunset_date,
        previous_version_id: None,
        changes: doc.changes.clone(),
        catalog_digest: Some(digest.clone()),
        created_at: now,
        updated_at: now,
    };

    let requirements = doc
        .requirements
        .iter()
        .map(|req| {
            Ok(MasterRequirement {
                id: RequirementId::new(ids.next_id())?,
                framework_version_id: version_id.clone(),
                requirement_code: req.code.clone(),
                title: req.title.clone(),
                official_text: req.official_text.clone(),
                implementation_level: req.implementation_level,
                required_evidence_types: req.required_evidence_types.clone(),
                verification_frequency: req.verification_frequency,
                // Range was checked by validate_catalog.
                risk_weight: RiskWeight::new(req.risk_weight)?,
                emerging_tech_category: req.emerging_tech_category,
                keywords: req.keywords.clone(),
                effective_date: req.effective_date.unwrap_or(doc.effective_date),
            })
        })
        .collect::<Result<Vec<_>, CoreError>>()?;

    tracing::info!(
        framework = %doc.framework_id,
        version_code = %doc.version_code,
        requirements = requirements.len(),
        digest = %digest,
        "catalog ingested"
    );

    Ok(IngestOutcome {
        version,
        requirements,
        warnings: validation.warnings,
        digest,
    })
}
