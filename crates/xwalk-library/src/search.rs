//! Requirement search helpers.
//!
//! Case-insensitive substring matching over a requirement's code, title,
//! official text, and keywords. Normalization strips punctuation down to
//! alphanumerics and single spaces so "CC6.1" matches "cc6 1" as well as
//! the literal code.

use crate::requirement::MasterRequirement;

/// Normalize a string for matching: lowercase, punctuation to spaces,
/// whitespace collapsed.
pub(crate) fn normalize(s: &str) -> String {
    let lower = s.to_lowercase();
    let cleaned: String = lower
        .chars()
        .map(|c| if c.is_alphanumeric() || c.is_whitespace() { c } else { ' ' })
        .collect();
    cleaned.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Whether a requirement matches a free-text query.
///
/// The raw lowercase query is tried first (so literal codes with dots
/// match), then the normalized form.
pub(crate) fn matches_query(requirement: &MasterRequirement, query: &str) -> bool {
    let raw = query.trim().to_lowercase();
    if raw.is_empty() {
        return false;
    }
    let norm = normalize(query);

    let haystacks = [
        requirement.requirement_code.to_lowercase(),
        requirement.title.to_lowercase(),
        requirement.official_text.to_lowercase(),
    ];
    for hay in &haystacks {
        if hay.contains(&raw) || (!norm.is_empty() && normalize(hay).contains(&norm)) {
            return true;
        }
    }
    requirement
        .keywords
        .iter()
        .any(|k| k.to_lowercase().contains(&raw))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_strips_punctuation_and_case() {
        assert_eq!(normalize("CC6.1 — Logical Access!"), "cc6 1 logical access");
        assert_eq!(normalize("  spaced   out  "), "spaced out");
    }
}
