//! # Coverage Aggregation
//!
//! Multiple partial controls stack against one requirement without
//! double-counting overlapping protection: mappings are applied in
//! descending coverage order, and each subsequent mapping only covers
//! the fraction of the requirement that is still uncovered.
//!
//! `coverage += mapping.coverage * (1 - coverage/100)`
//!
//! The accumulation stops early once coverage reaches 100, clamps to
//! [0, 100], and rounds to the nearest integer. Zero mappings means
//! zero coverage.

use xwalk_core::CoveragePercent;

/// Aggregate a requirement's mapped coverage percentages.
///
/// The result is always in [0, 100] and never decreases when another
/// mapping is added — the formula is equivalent to
/// `100 · (1 − Π(1 − pᵢ/100))`, which is order-independent and
/// monotone in the multiset of inputs.
pub fn aggregate_coverage(percentages: &[CoveragePercent]) -> u8 {
    let mut sorted: Vec<CoveragePercent> = percentages.to_vec();
    sorted.sort_by(|a, b| b.cmp(a));

    let mut coverage = 0.0_f64;
    for pct in sorted {
        if coverage >= 100.0 {
            break;
        }
        coverage += f64::from(pct.value()) * (1.0 - coverage / 100.0);
    }
    coverage.clamp(0.0, 100.0).round() as u8
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn pct(v: u8) -> CoveragePercent {
        CoveragePercent::new(v).unwrap()
    }

    #[test]
    fn zero_mappings_is_zero_coverage() {
        assert_eq!(aggregate_coverage(&[]), 0);
    }

    #[test]
    fn single_mapping_passes_through() {
        assert_eq!(aggregate_coverage(&[pct(60)]), 60);
        assert_eq!(aggregate_coverage(&[pct(100)]), 100);
    }

    #[test]
    fn two_partials_stack_with_diminishing_returns() {
        // 60 + 60·(1 − 0.6) = 84
        assert_eq!(aggregate_coverage(&[pct(60), pct(60)]), 84);
        // 80 + 50·(1 − 0.8) = 90
        assert_eq!(aggregate_coverage(&[pct(50), pct(80)]), 90);
    }

    #[test]
    fn full_mapping_caps_immediately() {
        assert_eq!(aggregate_coverage(&[pct(100), pct(100), pct(100)]), 100);
        assert_eq!(aggregate_coverage(&[pct(40), pct(100)]), 100);
    }

    #[test]
    fn many_small_mappings_never_exceed_cap() {
        let lots: Vec<CoveragePercent> = std::iter::repeat(pct(90)).take(50).collect();
        assert_eq!(aggregate_coverage(&lots), 100);
    }

    proptest! {
        #[test]
        fn aggregate_is_bounded(values in proptest::collection::vec(0u8..=100, 0..40)) {
            let percents: Vec<CoveragePercent> = values.iter().map(|&v| pct(v)).collect();
            let result = aggregate_coverage(&percents);
            prop_assert!(result <= 100);
        }

        #[test]
        fn aggregate_is_monotone_in_added_mappings(
            values in proptest::collection::vec(0u8..=100, 0..30),
            extra in 0u8..=100,
        ) {
            let percents: Vec<CoveragePercent> = values.iter().map(|&v| pct(v)).collect();
            let before = aggregate_coverage(&percents);
            let mut extended = percents;
            extended.push(pct(extra));
            let after = aggregate_coverage(&extended);
            prop_assert!(after >= before, "adding a mapping lowered coverage: {before} -> {after}");
        }

        #[test]
        fn aggregate_is_order_independent(values in proptest::collection::vec(0u8..=100, 0..20)) {
            let percents: Vec<CoveragePercent> = values.iter().map(|&v| pct(v)).collect();
            let mut reversed = percents.clone();
            reversed.reverse();
            prop_assert_eq!(aggregate_coverage(&percents), aggregate_coverage(&reversed));
        }
    }
}
