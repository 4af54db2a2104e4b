//! Market context: saturation, economic climate, risk and strategy.

use serde::{Deserialize, Serialize};
use sim_core::{check_non_negative, BusinessCategory, EnvironmentSnapshot};

use crate::benchmarks::benchmarks;
use crate::{EconError, NATIONAL_MEDIAN_INCOME};

/// Local economic climate.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EconomicClimate {
    Booming,
    Stable,
    Declining,
    Recession,
}

/// Recommended positioning.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    AggressiveGrowth,
    Differentiation,
    NicheFocus,
    CostLeadership,
    Avoid,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MarketContextResult {
    /// Competitor count the saturation was computed from.
    pub estimated_competitors: u32,
    /// Saturation in [0, 100].
    pub saturation: f64,
    /// Composite risk in [0, 100], whole numbers.
    pub risk_score: f64,
    pub climate: EconomicClimate,
    /// Averaged climate score in [0, 100].
    pub climate_score: f64,
    /// Addressable monthly customers for the whole category.
    pub market_capacity: f64,
    /// Estimated annual market growth rate (0.04 = 4%).
    pub growth_rate: f64,
    pub strategy: Strategy,
}

/// Saturation multiplier steps for median household income.
pub fn income_multiplier(median_income: f64) -> f64 {
    if median_income > 80_000.0 {
        1.3
    } else if median_income > 60_000.0 {
        1.1
    } else if median_income > 40_000.0 {
        1.0
    } else {
        0.8
    }
}

/// Businesses of the category a population of this size supports.
pub fn expected_competitors(population: f64, category: BusinessCategory) -> f64 {
    population / 10_000.0 * benchmarks(category).density_per_10k
}

/// Competitor estimate when the data provider has no observed count.
pub fn estimate_competitors(population: f64, category: BusinessCategory) -> u32 {
    expected_competitors(population, category).round().max(0.0) as u32
}

/// Industry saturation in [0, 100].
pub fn industry_saturation(
    competitors: u32,
    population: f64,
    median_income: f64,
    category: BusinessCategory,
) -> Result<f64, EconError> {
    check_non_negative("population", population)?;
    check_non_negative("median_household_income", median_income)?;
    let expected = expected_competitors(population, category);
    let ratio = if expected > 0.0 {
        (competitors as f64 / expected).min(1.0)
    } else if competitors > 0 {
        1.0
    } else {
        0.0
    };
    Ok((ratio / income_multiplier(median_income) * 100.0).clamp(0.0, 100.0))
}

/// Composite risk score: 40% failure rate, 35% saturation, 25% income/poverty.
pub fn risk_score(
    survival_5yr: f64,
    saturation: f64,
    median_income: f64,
    poverty_rate: f64,
) -> f64 {
    let survival_risk = (1.0 - survival_5yr) * 100.0;
    let income_risk = (100.0 - median_income / NATIONAL_MEDIAN_INCOME * 50.0).clamp(0.0, 100.0);
    let poverty_risk = (poverty_rate * 200.0).clamp(0.0, 100.0);
    let blended = 0.5 * income_risk + 0.5 * poverty_risk;
    (0.40 * survival_risk + 0.35 * saturation + 0.25 * blended)
        .round()
        .clamp(0.0, 100.0)
}

/// Climate score from income ratio, inverse poverty and work-from-home share.
pub fn climate_score(median_income: f64, poverty_rate: f64, work_from_home_rate: f64) -> f64 {
    let income_score = (median_income / NATIONAL_MEDIAN_INCOME * 70.0).clamp(0.0, 100.0);
    let poverty_score = (100.0 - poverty_rate * 300.0).clamp(0.0, 100.0);
    // Remote-work share stands in for high-paying office jobs.
    let wfh_score = (40.0 + work_from_home_rate * 200.0).clamp(0.0, 100.0);
    (income_score + poverty_score + wfh_score) / 3.0
}

pub fn classify_climate(score: f64) -> EconomicClimate {
    if score >= 80.0 {
        EconomicClimate::Booming
    } else if score >= 60.0 {
        EconomicClimate::Stable
    } else if score >= 40.0 {
        EconomicClimate::Declining
    } else {
        EconomicClimate::Recession
    }
}

/// Annual growth estimate, damped by saturation.
pub fn growth_rate(climate: EconomicClimate, saturation: f64) -> f64 {
    let base = match climate {
        EconomicClimate::Booming => 0.08,
        EconomicClimate::Stable => 0.04,
        EconomicClimate::Declining => 0.01,
        EconomicClimate::Recession => -0.03,
    };
    base * (1.0 - saturation / 100.0 * 0.5)
}

pub fn recommend_strategy(saturation: f64, risk: f64, median_income: f64) -> Strategy {
    if risk >= 75.0 {
        Strategy::Avoid
    } else if saturation < 40.0 && risk < 50.0 {
        Strategy::AggressiveGrowth
    } else if saturation >= 70.0 && median_income > 80_000.0 {
        Strategy::Differentiation
    } else if saturation >= 70.0 {
        Strategy::NicheFocus
    } else if median_income <= 40_000.0 {
        Strategy::CostLeadership
    } else {
        Strategy::Differentiation
    }
}

/// Full market context for a month.
pub fn analyze(
    env: &EnvironmentSnapshot,
    category: BusinessCategory,
    estimated_competitors: u32,
) -> Result<MarketContextResult, EconError> {
    let saturation = industry_saturation(
        estimated_competitors,
        env.population,
        env.median_household_income,
        category,
    )?;
    let bench = benchmarks(category);
    let risk = risk_score(
        bench.survival_5yr,
        saturation,
        env.median_household_income,
        env.poverty_rate,
    );
    let score = climate_score(
        env.median_household_income,
        env.poverty_rate,
        env.work_from_home_rate,
    );
    let climate = classify_climate(score);
    Ok(MarketContextResult {
        estimated_competitors,
        saturation,
        risk_score: risk,
        climate,
        climate_score: score,
        market_capacity: env.population * bench.base_penetration,
        growth_rate: growth_rate(climate, saturation),
        strategy: recommend_strategy(saturation, risk, env.median_household_income),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    // proptest's prelude also exports a `Strategy`.
    use super::Strategy;
    use proptest::prelude::*;
    use sim_core::InterestSeries;

    fn env(income: f64, poverty: f64, wfh: f64) -> EnvironmentSnapshot {
        EnvironmentSnapshot {
            population: 35_000.0,
            population_density: 12_000.0,
            median_household_income: income,
            poverty_rate: poverty,
            work_from_home_rate: wfh,
            month: 6,
            year: 2024,
            observed_competitors: None,
            interest: InterestSeries::default(),
        }
    }

    #[test]
    fn income_tiers() {
        assert_eq!(income_multiplier(90_000.0), 1.3);
        assert_eq!(income_multiplier(80_000.0), 1.1);
        assert_eq!(income_multiplier(65_000.0), 1.1);
        assert_eq!(income_multiplier(45_000.0), 1.0);
        assert_eq!(income_multiplier(30_000.0), 0.8);
    }

    #[test]
    fn saturation_formula() {
        // coffee: expected = 3.5 * 8 = 28; 14/28 = 0.5; /1.1 -> 45.45
        let s = industry_saturation(14, 35_000.0, 65_000.0, BusinessCategory::Coffee).unwrap();
        assert!((s - 50.0 / 1.1).abs() < 1e-9);
    }

    #[test]
    fn saturation_caps_ratio_at_one() {
        let s = industry_saturation(500, 35_000.0, 30_000.0, BusinessCategory::Coffee).unwrap();
        assert_eq!(s, 100.0);
    }

    #[test]
    fn empty_market_has_no_saturation() {
        let s = industry_saturation(0, 0.0, 50_000.0, BusinessCategory::Bar).unwrap();
        assert_eq!(s, 0.0);
    }

    #[test]
    fn negative_population_is_rejected() {
        assert!(industry_saturation(3, -10.0, 50_000.0, BusinessCategory::Bar).is_err());
    }

    #[test]
    fn climate_thresholds() {
        assert_eq!(classify_climate(85.0), EconomicClimate::Booming);
        assert_eq!(classify_climate(80.0), EconomicClimate::Booming);
        assert_eq!(classify_climate(65.0), EconomicClimate::Stable);
        assert_eq!(classify_climate(40.0), EconomicClimate::Declining);
        assert_eq!(classify_climate(39.9), EconomicClimate::Recession);
    }

    #[test]
    fn affluent_area_is_booming_poor_area_is_not() {
        let rich = analyze(&env(140_000.0, 0.05, 0.35), BusinessCategory::Coffee, 20).unwrap();
        assert_eq!(rich.climate, EconomicClimate::Booming);
        let poor = analyze(&env(28_000.0, 0.35, 0.02), BusinessCategory::Coffee, 20).unwrap();
        assert_eq!(poor.climate, EconomicClimate::Recession);
        assert!(poor.risk_score > rich.risk_score);
    }

    #[test]
    fn strategy_table() {
        assert_eq!(recommend_strategy(10.0, 80.0, 90_000.0), Strategy::Avoid);
        assert_eq!(recommend_strategy(20.0, 30.0, 50_000.0), Strategy::AggressiveGrowth);
        assert_eq!(recommend_strategy(80.0, 50.0, 95_000.0), Strategy::Differentiation);
        assert_eq!(recommend_strategy(80.0, 50.0, 50_000.0), Strategy::NicheFocus);
        assert_eq!(recommend_strategy(50.0, 55.0, 35_000.0), Strategy::CostLeadership);
    }

    proptest! {
        #[test]
        fn outputs_in_range(c in 0u32..500, pop in 0.0f64..2_000_000.0, inc in 1_000.0f64..300_000.0,
                            pov in 0.0f64..=1.0, wfh in 0.0f64..=1.0) {
            let mut e = env(inc, pov, wfh);
            e.population = pop;
            let r = analyze(&e, BusinessCategory::Restaurant, c).unwrap();
            prop_assert!((0.0..=100.0).contains(&r.saturation));
            prop_assert!((0.0..=100.0).contains(&r.risk_score));
            prop_assert_eq!(r.risk_score, r.risk_score.round());
            prop_assert!((0.0..=100.0).contains(&r.climate_score));
        }
    }
}
