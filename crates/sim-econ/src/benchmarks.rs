//! Per-category benchmark tables shared by the models.

use sim_core::BusinessCategory;

/// How hard it is for a new competitor to open.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EntryBarrier {
    Low,
    Medium,
    High,
}

/// Static economics of a business category.
#[derive(Clone, Debug, PartialEq)]
pub struct CategoryBenchmarks {
    /// Expected businesses per 10,000 residents.
    pub density_per_10k: f64,
    /// Share of new businesses still open after five years.
    pub survival_5yr: f64,
    /// Trade-area radius in miles for an average-sized store.
    pub trade_radius_miles: f64,
    /// Huff distance-decay sensitivity (lambda).
    pub distance_decay: f64,
    pub avg_competitor_sqft: f64,
    /// Cost of goods sold as a share of revenue.
    pub base_cogs_rate: f64,
    /// Utility intensity relative to plain retail floor space.
    pub energy_multiplier: f64,
    pub kwh_per_sqft_month: f64,
    /// Share of residents who are potential monthly customers of the category.
    pub base_penetration: f64,
    pub income_elasticity: f64,
    /// Average ticket per visit in USD.
    pub avg_spend: f64,
    pub visits_per_month: f64,
    /// Baseline customer acquisition cost in USD.
    pub base_cac: f64,
    pub entry_barrier: EntryBarrier,
    /// Typical net margin of an incumbent.
    pub typical_margin: f64,
    pub rent_multiplier: f64,
}

const RESTAURANT: CategoryBenchmarks = CategoryBenchmarks {
    density_per_10k: 12.0,
    survival_5yr: 0.40,
    trade_radius_miles: 1.5,
    distance_decay: 2.0,
    avg_competitor_sqft: 2_500.0,
    base_cogs_rate: 0.32,
    energy_multiplier: 2.2,
    kwh_per_sqft_month: 3.5,
    base_penetration: 0.30,
    income_elasticity: 0.6,
    avg_spend: 28.0,
    visits_per_month: 2.0,
    base_cac: 35.0,
    entry_barrier: EntryBarrier::High,
    typical_margin: 0.06,
    rent_multiplier: 1.10,
};

const COFFEE: CategoryBenchmarks = CategoryBenchmarks {
    density_per_10k: 8.0,
    survival_5yr: 0.45,
    trade_radius_miles: 0.75,
    distance_decay: 2.5,
    avg_competitor_sqft: 1_200.0,
    base_cogs_rate: 0.23,
    energy_multiplier: 1.6,
    kwh_per_sqft_month: 2.6,
    base_penetration: 0.35,
    income_elasticity: 0.4,
    avg_spend: 6.5,
    visits_per_month: 8.0,
    base_cac: 20.0,
    entry_barrier: EntryBarrier::Low,
    typical_margin: 0.10,
    rent_multiplier: 1.0,
};

const BAKERY: CategoryBenchmarks = CategoryBenchmarks {
    density_per_10k: 4.0,
    survival_5yr: 0.50,
    trade_radius_miles: 1.0,
    distance_decay: 2.2,
    avg_competitor_sqft: 1_500.0,
    base_cogs_rate: 0.28,
    energy_multiplier: 1.9,
    kwh_per_sqft_month: 3.0,
    base_penetration: 0.22,
    income_elasticity: 0.5,
    avg_spend: 12.0,
    visits_per_month: 4.0,
    base_cac: 25.0,
    entry_barrier: EntryBarrier::Medium,
    typical_margin: 0.09,
    rent_multiplier: 1.05,
};

const BAR: CategoryBenchmarks = CategoryBenchmarks {
    density_per_10k: 6.0,
    survival_5yr: 0.45,
    trade_radius_miles: 1.25,
    distance_decay: 2.0,
    avg_competitor_sqft: 2_000.0,
    base_cogs_rate: 0.24,
    energy_multiplier: 1.5,
    kwh_per_sqft_month: 2.2,
    base_penetration: 0.18,
    income_elasticity: 0.7,
    avg_spend: 32.0,
    visits_per_month: 2.5,
    base_cac: 30.0,
    entry_barrier: EntryBarrier::Medium,
    typical_margin: 0.12,
    rent_multiplier: 1.0,
};

const GROCERY: CategoryBenchmarks = CategoryBenchmarks {
    density_per_10k: 5.0,
    survival_5yr: 0.60,
    trade_radius_miles: 1.0,
    distance_decay: 2.5,
    avg_competitor_sqft: 4_000.0,
    base_cogs_rate: 0.70,
    energy_multiplier: 1.8,
    kwh_per_sqft_month: 4.0,
    base_penetration: 0.40,
    income_elasticity: 0.2,
    avg_spend: 45.0,
    visits_per_month: 5.0,
    base_cac: 40.0,
    entry_barrier: EntryBarrier::Medium,
    typical_margin: 0.03,
    rent_multiplier: 1.0,
};

const RETAIL: CategoryBenchmarks = CategoryBenchmarks {
    density_per_10k: 15.0,
    survival_5yr: 0.55,
    trade_radius_miles: 2.0,
    distance_decay: 1.8,
    avg_competitor_sqft: 2_000.0,
    base_cogs_rate: 0.50,
    energy_multiplier: 1.0,
    kwh_per_sqft_month: 1.4,
    base_penetration: 0.15,
    income_elasticity: 0.9,
    avg_spend: 55.0,
    visits_per_month: 1.2,
    base_cac: 45.0,
    entry_barrier: EntryBarrier::Low,
    typical_margin: 0.08,
    rent_multiplier: 1.0,
};

const SALON: CategoryBenchmarks = CategoryBenchmarks {
    density_per_10k: 7.0,
    survival_5yr: 0.55,
    trade_radius_miles: 2.0,
    distance_decay: 1.5,
    avg_competitor_sqft: 1_000.0,
    base_cogs_rate: 0.12,
    energy_multiplier: 1.3,
    kwh_per_sqft_month: 1.8,
    base_penetration: 0.12,
    income_elasticity: 0.8,
    avg_spend: 60.0,
    visits_per_month: 1.0,
    base_cac: 50.0,
    entry_barrier: EntryBarrier::Low,
    typical_margin: 0.10,
    rent_multiplier: 1.0,
};

const FITNESS: CategoryBenchmarks = CategoryBenchmarks {
    density_per_10k: 3.0,
    survival_5yr: 0.50,
    trade_radius_miles: 3.0,
    distance_decay: 1.5,
    avg_competitor_sqft: 5_000.0,
    base_cogs_rate: 0.08,
    energy_multiplier: 1.4,
    kwh_per_sqft_month: 2.0,
    base_penetration: 0.10,
    income_elasticity: 1.0,
    avg_spend: 55.0,
    visits_per_month: 1.0,
    base_cac: 80.0,
    entry_barrier: EntryBarrier::High,
    typical_margin: 0.12,
    rent_multiplier: 0.95,
};

const PROFESSIONAL_SERVICES: CategoryBenchmarks = CategoryBenchmarks {
    density_per_10k: 10.0,
    survival_5yr: 0.60,
    trade_radius_miles: 5.0,
    distance_decay: 1.2,
    avg_competitor_sqft: 1_500.0,
    base_cogs_rate: 0.10,
    energy_multiplier: 0.8,
    kwh_per_sqft_month: 1.2,
    base_penetration: 0.05,
    income_elasticity: 1.2,
    avg_spend: 250.0,
    visits_per_month: 0.5,
    base_cac: 150.0,
    entry_barrier: EntryBarrier::Medium,
    typical_margin: 0.18,
    rent_multiplier: 1.0,
};

/// Benchmarks for a category.
pub fn benchmarks(category: BusinessCategory) -> &'static CategoryBenchmarks {
    match category {
        BusinessCategory::Restaurant => &RESTAURANT,
        BusinessCategory::Coffee => &COFFEE,
        BusinessCategory::Bakery => &BAKERY,
        BusinessCategory::Bar => &BAR,
        BusinessCategory::Grocery => &GROCERY,
        BusinessCategory::Retail => &RETAIL,
        BusinessCategory::Salon => &SALON,
        BusinessCategory::Fitness => &FITNESS,
        BusinessCategory::ProfessionalServices => &PROFESSIONAL_SERVICES,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tables_are_in_domain() {
        for c in BusinessCategory::ALL {
            let b = benchmarks(c);
            assert!(b.density_per_10k > 0.0, "{c}");
            assert!((0.0..=1.0).contains(&b.survival_5yr), "{c}");
            assert!((0.0..1.0).contains(&b.base_cogs_rate), "{c}");
            assert!(b.distance_decay > 0.0, "{c}");
            assert!((0.05..=0.60).contains(&b.base_penetration), "{c}");
            assert!(b.visits_per_month > 0.0 && b.avg_spend > 0.0, "{c}");
        }
    }

    #[test]
    fn documented_cogs_rates() {
        assert_eq!(benchmarks(BusinessCategory::Restaurant).base_cogs_rate, 0.32);
        assert_eq!(benchmarks(BusinessCategory::Coffee).base_cogs_rate, 0.23);
        assert_eq!(benchmarks(BusinessCategory::Grocery).base_cogs_rate, 0.70);
        assert_eq!(
            benchmarks(BusinessCategory::ProfessionalServices).base_cogs_rate,
            0.10
        );
    }
}
