//! Supplier-side costs: utilities, COGS with volume and relationship
//! discounts, and energy consumption.

use serde::{Deserialize, Serialize};
use sim_core::{BusinessCategory, Region, ValidationError};
use std::f64::consts::PI;

use crate::benchmarks::benchmarks;
use crate::EconError;

/// Utility cost per square foot per month before multipliers.
pub const BASE_UTILITY_RATE_PER_SQFT: f64 = 0.30;
pub const MAX_VOLUME_DISCOUNT: f64 = 0.15;
pub const MAX_RELATIONSHIP_DISCOUNT: f64 = 0.025;
pub const MIN_SEASONAL_FACTOR: f64 = 0.95;
pub const MAX_SEASONAL_FACTOR: f64 = 1.30;
const WINTER_AMPLITUDE: f64 = 0.25;
const SUMMER_AMPLITUDE: f64 = 0.20;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SupplierCostResult {
    /// Utilities for the month in USD.
    pub utilities: f64,
    pub seasonal_factor: f64,
    pub base_cogs_rate: f64,
    pub volume_discount: f64,
    pub relationship_discount: f64,
    /// COGS rate after both discounts.
    pub cogs_rate: f64,
    pub energy_kwh: f64,
}

pub fn region_utility_multiplier(region: Region) -> f64 {
    match region {
        Region::Manhattan => 1.25,
        Region::Brooklyn => 1.05,
        Region::Queens => 1.0,
        Region::Bronx => 0.95,
        Region::StatenIsland => 0.95,
        Region::Other => 1.0,
    }
}

/// Heating/cooling load factor for a calendar month, in [0.95, 1.30].
///
/// `1 + max(winter, summer)` where the winter wave peaks in January and the
/// summer wave in July.
pub fn seasonal_factor(month: u32) -> Result<f64, EconError> {
    if !(1..=12).contains(&month) {
        return Err(ValidationError::InvalidMonth(month).into());
    }
    let m = month as f64;
    let winter = WINTER_AMPLITUDE * (2.0 * PI * (m - 1.0) / 12.0).cos();
    let summer = SUMMER_AMPLITUDE * (2.0 * PI * (m - 7.0) / 12.0).cos();
    Ok((1.0 + winter.max(summer)).clamp(MIN_SEASONAL_FACTOR, MAX_SEASONAL_FACTOR))
}

/// Monthly utilities in USD.
pub fn utilities(
    square_feet: f64,
    region: Region,
    category: BusinessCategory,
    month: u32,
) -> Result<f64, EconError> {
    Ok(square_feet
        * BASE_UTILITY_RATE_PER_SQFT
        * region_utility_multiplier(region)
        * benchmarks(category).energy_multiplier
        * seasonal_factor(month)?)
}

/// Monthly energy consumption in kWh.
pub fn energy_kwh(square_feet: f64, category: BusinessCategory, month: u32) -> Result<f64, EconError> {
    Ok(square_feet * benchmarks(category).kwh_per_sqft_month * seasonal_factor(month)?)
}

/// 1% off per $10k of monthly revenue, capped at 15%.
pub fn volume_discount(monthly_revenue: f64) -> f64 {
    (monthly_revenue.max(0.0) / 10_000.0 * 0.01).min(MAX_VOLUME_DISCOUNT)
}

/// Discount earned by supplier tenure.
pub fn relationship_discount(months_in_business: u32) -> f64 {
    match months_in_business {
        0..=3 => 0.0,
        4..=12 => 0.005,
        13..=24 => 0.015,
        _ => MAX_RELATIONSHIP_DISCOUNT,
    }
}

/// Base rate after the volume discount only.
pub fn volume_cogs(base_rate: f64, monthly_revenue: f64) -> f64 {
    base_rate * (1.0 - volume_discount(monthly_revenue))
}

/// Final COGS rate. The two discounts compose multiplicatively.
pub fn cogs_rate(base_rate: f64, monthly_revenue: f64, months_in_business: u32) -> f64 {
    base_rate
        * (1.0 - volume_discount(monthly_revenue))
        * (1.0 - relationship_discount(months_in_business))
}

/// Supplier costs for a month. `trailing_revenue` is the previous month's
/// revenue, which is what the volume tier is negotiated on.
pub fn analyze(
    category: BusinessCategory,
    region: Region,
    square_feet: f64,
    month: u32,
    trailing_revenue: f64,
    months_in_business: u32,
) -> Result<SupplierCostResult, EconError> {
    let base = benchmarks(category).base_cogs_rate;
    Ok(SupplierCostResult {
        utilities: utilities(square_feet, region, category, month)?,
        seasonal_factor: seasonal_factor(month)?,
        base_cogs_rate: base,
        volume_discount: volume_discount(trailing_revenue),
        relationship_discount: relationship_discount(months_in_business),
        cogs_rate: cogs_rate(base, trailing_revenue, months_in_business),
        energy_kwh: energy_kwh(square_feet, category, month)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn seasonal_peaks() {
        assert!((seasonal_factor(1).unwrap() - 1.25).abs() < 1e-12);
        assert!((seasonal_factor(7).unwrap() - 1.20).abs() < 1e-12);
        assert!((seasonal_factor(4).unwrap() - 1.0).abs() < 1e-9);
        assert!(seasonal_factor(0).is_err());
        assert!(seasonal_factor(13).is_err());
    }

    #[test]
    fn volume_cogs_cap_reached() {
        assert!((volume_cogs(0.40, 150_000.0) - 0.34).abs() < 1e-12);
        assert!((volume_cogs(0.40, 1_000_000.0) - 0.34).abs() < 1e-12);
        assert!((volume_cogs(0.40, 50_000.0) - 0.38).abs() < 1e-12);
    }

    #[test]
    fn relationship_tiers() {
        assert_eq!(relationship_discount(0), 0.0);
        assert_eq!(relationship_discount(3), 0.0);
        assert_eq!(relationship_discount(4), 0.005);
        assert_eq!(relationship_discount(12), 0.005);
        assert_eq!(relationship_discount(13), 0.015);
        assert_eq!(relationship_discount(24), 0.015);
        assert_eq!(relationship_discount(25), 0.025);
    }

    #[test]
    fn discounts_compose_multiplicatively() {
        let r = cogs_rate(0.40, 200_000.0, 36);
        assert!((r - 0.40 * 0.85 * 0.975).abs() < 1e-12);
        assert!(r > 0.40 * (1.0 - 0.15 - 0.025));
    }

    #[test]
    fn manhattan_restaurant_pays_more_than_queens_office() {
        let a = utilities(1_000.0, Region::Manhattan, BusinessCategory::Restaurant, 1).unwrap();
        let b = utilities(1_000.0, Region::Queens, BusinessCategory::ProfessionalServices, 1).unwrap();
        assert!(a > b);
        // 1000 * 0.30 * 1.25 * 2.2 * 1.25
        assert!((a - 1_031.25).abs() < 1e-9);
    }

    proptest! {
        #[test]
        fn seasonal_factor_bounded(m in 1u32..=12) {
            let f = seasonal_factor(m).unwrap();
            prop_assert!((MIN_SEASONAL_FACTOR..=MAX_SEASONAL_FACTOR).contains(&f));
        }

        #[test]
        fn discounts_capped_and_cogs_not_above_base(rev in 0.0f64..5_000_000.0, months in 0u32..600, ci in 0usize..9) {
            let base = benchmarks(BusinessCategory::ALL[ci]).base_cogs_rate;
            prop_assert!(volume_discount(rev) <= MAX_VOLUME_DISCOUNT);
            prop_assert!(relationship_discount(months) <= MAX_RELATIONSHIP_DISCOUNT);
            prop_assert!(cogs_rate(base, rev, months) <= base);
        }
    }
}
