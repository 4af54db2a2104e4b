//! Competitive dynamics: competitor count, Huff trade area, HHI and monthly
//! entry/exit expectations.

use serde::{Deserialize, Serialize};
use sim_core::{check_non_negative, check_range, BusinessCategory, ValidationError};
use std::f64::consts::PI;
use tracing::debug;

use crate::benchmarks::{benchmarks, EntryBarrier};
use crate::market::EconomicClimate;
use crate::rng::RandomSource;
use crate::EconError;

/// Monthly entry probability bounds.
pub const MIN_ENTRY_PROBABILITY: f64 = 0.005;
pub const MAX_ENTRY_PROBABILITY: f64 = 0.20;
const BASE_ENTRY_RATE: f64 = 0.05;
/// Months in the five-year survival window.
const SURVIVAL_WINDOW_MONTHS: f64 = 60.0;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CompetitionResult {
    pub competitor_count: u32,
    pub trade_radius_miles: f64,
    pub trade_area_sq_miles: f64,
    /// HHI of the local market (competitors plus this business) in [0, 10000].
    pub hhi: f64,
    /// Monthly probability a new competitor opens, in [0.005, 0.20].
    pub entry_probability: f64,
    pub expected_entries: f64,
    /// Expected exits before rounding.
    pub expected_exits: f64,
    /// Exits after the probabilistic rounding draw.
    pub exits: u32,
    pub projected_competitors: u32,
    /// Competitive intensity in [0, 100].
    pub intensity: f64,
}

/// Competitor count from density benchmark and saturation, minimum 1.
pub fn competitor_count(
    population: f64,
    category: BusinessCategory,
    saturation: f64,
) -> Result<u32, EconError> {
    check_non_negative("population", population)?;
    check_range("saturation", saturation, 0.0, 100.0, "[0, 100]")?;
    let base = population / 10_000.0 * benchmarks(category).density_per_10k;
    let scaled = (base * (0.5 + saturation / 100.0)).round();
    Ok((scaled as u32).max(1))
}

/// Huff-gravity trade radius in miles:
/// `base_radius * (store_sqft / avg_competitor_sqft)^(1/lambda)`.
pub fn trade_radius(store_sqft: f64, category: BusinessCategory) -> Result<f64, EconError> {
    if !(store_sqft.is_finite() && store_sqft > 0.0) {
        return Err(ValidationError::OutOfRange {
            field: "square_feet",
            value: store_sqft,
            expected: "(0, inf)",
        }
        .into());
    }
    let b = benchmarks(category);
    Ok(b.trade_radius_miles * (store_sqft / b.avg_competitor_sqft).powf(1.0 / b.distance_decay))
}

pub fn trade_area(radius_miles: f64) -> f64 {
    PI * radius_miles * radius_miles
}

/// HHI from market shares given as fractions: `sum(share^2) * 10000`.
pub fn hhi(shares: &[f64]) -> Result<f64, EconError> {
    if shares.is_empty() {
        return Err(ValidationError::EmptyMarketShares.into());
    }
    let mut sum = 0.0;
    for s in shares {
        check_range("market_share", *s, 0.0, 1.0, "[0, 1]")?;
        sum += s * s;
    }
    Ok((sum * 10_000.0).clamp(0.0, 10_000.0))
}

/// HHI for `n` equal competitors, `10000/n`. No competitors reads as a
/// monopoly (10000).
pub fn uniform_hhi(n: u32) -> f64 {
    if n == 0 {
        return 10_000.0;
    }
    10_000.0 / n as f64
}

fn entry_climate_factor(climate: EconomicClimate) -> f64 {
    match climate {
        EconomicClimate::Booming => 1.5,
        EconomicClimate::Stable => 1.0,
        EconomicClimate::Declining => 0.7,
        EconomicClimate::Recession => 0.4,
    }
}

fn exit_climate_factor(climate: EconomicClimate) -> f64 {
    match climate {
        EconomicClimate::Booming => 0.7,
        EconomicClimate::Stable => 1.0,
        EconomicClimate::Declining => 1.3,
        EconomicClimate::Recession => 1.8,
    }
}

fn barrier_factor(barrier: EntryBarrier) -> f64 {
    match barrier {
        EntryBarrier::Low => 1.3,
        EntryBarrier::Medium => 1.0,
        EntryBarrier::High => 0.6,
    }
}

/// Monthly probability that a new competitor enters.
pub fn entry_probability(
    climate: EconomicClimate,
    saturation: f64,
    category: BusinessCategory,
) -> f64 {
    let b = benchmarks(category);
    let saturation_penalty = (-(saturation - 50.0) / 30.0).exp();
    let attractiveness = (1.0 + (b.typical_margin - 0.10) * 5.0).clamp(0.5, 1.5);
    (BASE_ENTRY_RATE
        * entry_climate_factor(climate)
        * saturation_penalty
        * attractiveness
        * barrier_factor(b.entry_barrier))
    .clamp(MIN_ENTRY_PROBABILITY, MAX_ENTRY_PROBABILITY)
}

/// Monthly failure rate implied by a five-year survival rate.
pub fn monthly_failure_rate(survival_5yr: f64) -> f64 {
    1.0 - survival_5yr.clamp(0.0, 1.0).powf(1.0 / SURVIVAL_WINDOW_MONTHS)
}

/// Expected competitor exits this month before rounding.
pub fn expected_exits(
    competitors: u32,
    climate: EconomicClimate,
    saturation: f64,
    category: BusinessCategory,
) -> f64 {
    let rate = monthly_failure_rate(benchmarks(category).survival_5yr);
    let saturation_factor = 1.0 + (saturation - 50.0).max(0.0) / 100.0;
    rate * exit_climate_factor(climate) * saturation_factor * competitors as f64
}

/// Resolve a fractional expectation to a whole count with one draw.
///
/// Returns `floor(expected) + 1` with probability equal to the fractional
/// part, so the expected value is preserved.
pub fn probabilistic_round(expected: f64, rng: &mut dyn RandomSource) -> u32 {
    let whole = expected.max(0.0).floor();
    let fraction = expected.max(0.0) - whole;
    let bump = if rng.next_unit() < fraction { 1.0 } else { 0.0 };
    (whole + bump) as u32
}

/// Intensity in [0, 100] from density, inverse HHI and saturation.
pub fn competitive_intensity(competitors: u32, expected: f64, hhi: f64, saturation: f64) -> f64 {
    let density_score = if expected > 0.0 {
        (competitors as f64 / expected * 50.0).clamp(0.0, 100.0)
    } else {
        100.0
    };
    let dispersion_score = (1.0 - hhi / 10_000.0) * 100.0;
    (0.4 * density_score + 0.3 * dispersion_score + 0.3 * saturation).clamp(0.0, 100.0)
}

/// Full competition analysis for a month.
pub fn analyze(
    population: f64,
    category: BusinessCategory,
    store_sqft: f64,
    saturation: f64,
    climate: EconomicClimate,
    rng: &mut dyn RandomSource,
) -> Result<CompetitionResult, EconError> {
    let count = competitor_count(population, category, saturation)?;
    let radius = trade_radius(store_sqft, category)?;
    let hhi = uniform_hhi(count + 1);
    let entry = entry_probability(climate, saturation, category);
    let expected_entries = entry * count as f64;
    let expected = expected_exits(count, climate, saturation, category);
    let exits = probabilistic_round(expected, rng).min(count);
    let projected = (count as i64 + expected_entries.round() as i64 - exits as i64).max(1) as u32;
    let benchmark_count = population / 10_000.0 * benchmarks(category).density_per_10k;
    let intensity = competitive_intensity(count, benchmark_count, hhi, saturation);
    debug!(count, exits, hhi, intensity, "competition analyzed");
    Ok(CompetitionResult {
        competitor_count: count,
        trade_radius_miles: radius,
        trade_area_sq_miles: trade_area(radius),
        hhi,
        entry_probability: entry,
        expected_entries,
        expected_exits: expected,
        exits,
        projected_competitors: projected,
        intensity,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::FixedDraw;
    use proptest::prelude::*;

    #[test]
    fn uniform_hhi_examples() {
        assert_eq!(uniform_hhi(4), 2500.0);
        assert_eq!(uniform_hhi(5), 2000.0);
        assert_eq!(uniform_hhi(1), 10_000.0);
        assert_eq!(uniform_hhi(0), 10_000.0);
    }

    #[test]
    fn hhi_matches_uniform_helper() {
        let shares = vec![0.25; 4];
        assert!((hhi(&shares).unwrap() - uniform_hhi(4)).abs() < 1e-9);
        assert!((hhi(&[0.5, 0.3, 0.2]).unwrap() - 3800.0).abs() < 1e-9);
    }

    #[test]
    fn hhi_rejects_empty_list() {
        assert_eq!(
            hhi(&[]),
            Err(EconError::Validation(ValidationError::EmptyMarketShares))
        );
    }

    #[test]
    fn competitor_count_scales_with_saturation() {
        // coffee, 35k: base 28
        assert_eq!(competitor_count(35_000.0, BusinessCategory::Coffee, 50.0).unwrap(), 28);
        assert_eq!(competitor_count(35_000.0, BusinessCategory::Coffee, 0.0).unwrap(), 14);
        assert_eq!(competitor_count(35_000.0, BusinessCategory::Coffee, 100.0).unwrap(), 42);
    }

    #[test]
    fn competitor_count_minimum_one() {
        assert_eq!(competitor_count(0.0, BusinessCategory::Fitness, 0.0).unwrap(), 1);
    }

    #[test]
    fn negative_population_fails_fast() {
        assert!(matches!(
            competitor_count(-1.0, BusinessCategory::Coffee, 50.0),
            Err(EconError::Validation(ValidationError::OutOfRange { field: "population", .. }))
        ));
    }

    #[test]
    fn average_store_gets_base_radius() {
        let r = trade_radius(1_200.0, BusinessCategory::Coffee).unwrap();
        assert!((r - 0.75).abs() < 1e-12);
        let bigger = trade_radius(2_400.0, BusinessCategory::Coffee).unwrap();
        assert!(bigger > r);
        assert!((trade_area(1.0) - PI).abs() < 1e-12);
        assert!(trade_radius(0.0, BusinessCategory::Coffee).is_err());
    }

    #[test]
    fn failure_rate_reproduces_survival() {
        let m = monthly_failure_rate(0.5);
        assert!(((1.0 - m).powf(60.0) - 0.5).abs() < 1e-12);
    }

    #[test]
    fn probabilistic_round_both_branches() {
        assert_eq!(probabilistic_round(2.3, &mut FixedDraw(0.1)), 3);
        assert_eq!(probabilistic_round(2.3, &mut FixedDraw(0.9)), 2);
        assert_eq!(probabilistic_round(2.0, &mut FixedDraw(0.0)), 2);
        assert_eq!(probabilistic_round(-1.0, &mut FixedDraw(0.0)), 0);
    }

    #[test]
    fn analysis_is_reproducible_with_fixed_draw() {
        let run = |draw: f64| {
            analyze(
                35_000.0,
                BusinessCategory::Coffee,
                1_000.0,
                45.0,
                EconomicClimate::Stable,
                &mut FixedDraw(draw),
            )
            .unwrap()
        };
        assert_eq!(run(0.5), run(0.5));
        let low = run(0.0);
        let high = run(0.999_999);
        assert!(low.exits >= high.exits);
        assert!(low.exits - high.exits <= 1);
    }

    #[test]
    fn harsher_climate_means_fewer_entries_more_exits() {
        let c = BusinessCategory::Restaurant;
        assert!(
            entry_probability(EconomicClimate::Booming, 50.0, c)
                > entry_probability(EconomicClimate::Recession, 50.0, c)
        );
        assert!(
            expected_exits(20, EconomicClimate::Recession, 50.0, c)
                > expected_exits(20, EconomicClimate::Booming, 50.0, c)
        );
    }

    proptest! {
        #[test]
        fn uniform_hhi_is_exact(n in 1u32..10_000) {
            prop_assert_eq!(uniform_hhi(n), 10_000.0 / n as f64);
        }

        #[test]
        fn hhi_bounded(shares in proptest::collection::vec(0.0f64..=1.0, 1..30)) {
            let h = hhi(&shares).unwrap();
            prop_assert!((0.0..=10_000.0).contains(&h));
        }

        #[test]
        fn entry_probability_bounded(sat in 0.0f64..=100.0, ci in 0usize..9, cl in 0u8..4) {
            let climate = match cl { 0 => EconomicClimate::Booming, 1 => EconomicClimate::Stable, 2 => EconomicClimate::Declining, _ => EconomicClimate::Recession };
            let p = entry_probability(climate, sat, BusinessCategory::ALL[ci]);
            prop_assert!((MIN_ENTRY_PROBABILITY..=MAX_ENTRY_PROBABILITY).contains(&p));
        }

        #[test]
        fn intensity_bounded(count in 1u32..500, expected in 0.0f64..300.0, sat in 0.0f64..=100.0) {
            let i = competitive_intensity(count, expected, uniform_hhi(count + 1), sat);
            prop_assert!((0.0..=100.0).contains(&i));
        }
    }
}
