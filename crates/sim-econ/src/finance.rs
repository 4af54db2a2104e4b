//! Monthly financial roll-up: revenue, costs, profit, cash and health metrics.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sim_core::{BusinessCategory, InventoryStrategy, Region};

use crate::benchmarks::benchmarks;
use crate::customer::SegmentBreakdown;
use crate::{to_money, EconError};

/// Cost lines for the month, each rounded to cents.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CostBreakdown {
    pub labor: Decimal,
    pub cogs: Decimal,
    pub inventory_holding: Decimal,
    pub utilities: Decimal,
    pub rent: Decimal,
    pub marketing: Decimal,
    pub overhead: Decimal,
}

impl CostBreakdown {
    pub fn total(&self) -> Decimal {
        self.labor
            + self.cogs
            + self.inventory_holding
            + self.utilities
            + self.rent
            + self.marketing
            + self.overhead
    }

    /// Costs that do not scale with revenue.
    pub fn fixed(&self) -> Decimal {
        self.labor + self.utilities + self.rent + self.marketing + self.overhead
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct HealthMetrics {
    /// profit / revenue; 0 when there is no revenue.
    pub profit_margin: f64,
    /// Month-over-month revenue growth; 0 without prior revenue.
    pub revenue_growth: f64,
    /// Months of cash left at this month's burn; `None` when not burning.
    pub runway_months: Option<f64>,
    /// Customers needed to cover fixed costs; `None` when each customer
    /// contributes nothing.
    pub break_even_customers: Option<u64>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FinancialResult {
    pub revenue: Decimal,
    pub costs: CostBreakdown,
    pub total_costs: Decimal,
    pub profit: Decimal,
    pub cash_balance: Decimal,
    pub health: HealthMetrics,
}

/// Everything Phase 5 reads.
#[derive(Clone, Debug)]
pub struct FinanceInputs<'a> {
    pub category: BusinessCategory,
    pub region: Region,
    pub square_feet: f64,
    pub segments: &'a [SegmentBreakdown],
    pub visit_frequency: f64,
    pub labor: f64,
    pub cogs_rate: f64,
    pub utilities: f64,
    pub marketing_spend: f64,
    pub fixed_overhead: f64,
    pub inventory_strategy: InventoryStrategy,
    pub previous_cash: Decimal,
    pub previous_revenue: Decimal,
}

/// Asking rent in USD per square foot per year.
pub fn rent_per_sqft_year(region: Region) -> f64 {
    match region {
        Region::Manhattan => 90.0,
        Region::Brooklyn => 55.0,
        Region::Queens => 45.0,
        Region::Bronx => 35.0,
        Region::StatenIsland => 30.0,
        Region::Other => 30.0,
    }
}

pub fn monthly_rent(region: Region, category: BusinessCategory, square_feet: f64) -> f64 {
    square_feet * rent_per_sqft_year(region) / 12.0 * benchmarks(category).rent_multiplier
}

/// Holding and spoilage cost as a share of revenue.
pub fn inventory_holding_rate(strategy: InventoryStrategy) -> f64 {
    match strategy {
        InventoryStrategy::Lean => 0.0,
        InventoryStrategy::Balanced => 0.005,
        InventoryStrategy::Stockpile => 0.015,
    }
}

/// `sum(segment customers * spend per visit) * visits per month`.
pub fn revenue(segments: &[SegmentBreakdown], visit_frequency: f64) -> f64 {
    segments
        .iter()
        .map(|s| s.customers as f64 * s.avg_spend)
        .sum::<f64>()
        * visit_frequency
}

fn ratio(num: Decimal, den: Decimal) -> f64 {
    if den <= Decimal::ZERO {
        return 0.0;
    }
    (num / den).to_f64().unwrap_or(0.0)
}

pub fn revenue_growth(current: Decimal, previous: Decimal) -> f64 {
    ratio(current - previous, previous)
}

/// Full financial roll-up for a month.
pub fn analyze(input: &FinanceInputs<'_>) -> Result<FinancialResult, EconError> {
    let gross = revenue(input.segments, input.visit_frequency);
    let revenue = to_money("revenue", gross)?;
    let costs = CostBreakdown {
        labor: to_money("labor", input.labor)?,
        cogs: to_money("cogs", gross * input.cogs_rate)?,
        inventory_holding: to_money(
            "inventory_holding",
            gross * inventory_holding_rate(input.inventory_strategy),
        )?,
        utilities: to_money("utilities", input.utilities)?,
        rent: to_money(
            "rent",
            monthly_rent(input.region, input.category, input.square_feet),
        )?,
        marketing: to_money("marketing", input.marketing_spend)?,
        overhead: to_money("overhead", input.fixed_overhead)?,
    };
    let total_costs = costs.total();
    let profit = revenue - total_costs;
    let cash_balance = input.previous_cash + profit;

    let customers: u64 = input.segments.iter().map(|s| s.customers).sum();
    let variable_share = input.cogs_rate + inventory_holding_rate(input.inventory_strategy);
    let break_even_customers = if customers > 0 {
        let contribution = gross / customers as f64 * (1.0 - variable_share);
        let fixed = costs.fixed().to_f64().unwrap_or(0.0);
        (contribution > 0.0).then(|| (fixed / contribution).ceil() as u64)
    } else {
        None
    };
    let runway_months = if profit < Decimal::ZERO && cash_balance > Decimal::ZERO {
        Some(ratio(cash_balance, -profit))
    } else {
        None
    };

    Ok(FinancialResult {
        revenue,
        costs,
        total_costs,
        profit,
        cash_balance,
        health: HealthMetrics {
            profit_margin: ratio(profit, revenue),
            revenue_growth: revenue_growth(revenue, input.previous_revenue),
            runway_months,
            break_even_customers,
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::customer::Segment;

    fn seg(segment: Segment, customers: u64, avg_spend: f64) -> SegmentBreakdown {
        SegmentBreakdown {
            segment,
            customers,
            avg_spend,
            loyalty: segment.loyalty(),
        }
    }

    fn inputs(segments: &[SegmentBreakdown]) -> FinanceInputs<'_> {
        FinanceInputs {
            category: BusinessCategory::Coffee,
            region: Region::Queens,
            square_feet: 1_200.0,
            segments,
            visit_frequency: 8.0,
            labor: 8_000.0,
            cogs_rate: 0.20,
            utilities: 500.0,
            marketing_spend: 300.0,
            fixed_overhead: 750.0,
            inventory_strategy: InventoryStrategy::Lean,
            previous_cash: Decimal::new(50_000, 0),
            previous_revenue: Decimal::new(20_000, 0),
        }
    }

    #[test]
    fn revenue_is_segment_spend_times_visits() {
        let segs = [
            seg(Segment::Premium, 100, 10.0),
            seg(Segment::Regular, 200, 6.0),
            seg(Segment::Budget, 100, 4.0),
        ];
        assert!((revenue(&segs, 8.0) - 20_800.0).abs() < 1e-9);
    }

    #[test]
    fn profit_and_cash_roll_forward() {
        let segs = [
            seg(Segment::Premium, 100, 10.0),
            seg(Segment::Regular, 200, 6.0),
            seg(Segment::Budget, 100, 4.0),
        ];
        let r = analyze(&inputs(&segs)).unwrap();
        assert_eq!(r.revenue, Decimal::new(20_800, 0));
        // rent: 1200 * 45 / 12 = 4500
        assert_eq!(r.costs.rent, Decimal::new(4_500, 0));
        assert_eq!(r.costs.cogs, Decimal::new(4_160, 0));
        assert_eq!(r.total_costs, r.costs.total());
        assert_eq!(r.profit, r.revenue - r.total_costs);
        assert_eq!(r.cash_balance, Decimal::new(50_000, 0) + r.profit);
        assert!((r.health.revenue_growth - 0.04).abs() < 1e-12);
        assert!(r.health.runway_months.is_none());
        assert!(r.health.break_even_customers.is_some());
    }

    #[test]
    fn zero_revenue_reports_zero_ratios() {
        let mut i = inputs(&[]);
        i.previous_revenue = Decimal::ZERO;
        let r = analyze(&i).unwrap();
        assert_eq!(r.revenue, Decimal::ZERO);
        assert_eq!(r.health.profit_margin, 0.0);
        assert_eq!(r.health.revenue_growth, 0.0);
        assert!(r.profit < Decimal::ZERO);
        assert!(r.health.runway_months.is_some());
        assert!(r.health.break_even_customers.is_none());
    }

    #[test]
    fn stockpiling_costs_more_than_lean() {
        let segs = [seg(Segment::Regular, 300, 6.0)];
        let lean = analyze(&inputs(&segs)).unwrap();
        let mut i = inputs(&segs);
        i.inventory_strategy = InventoryStrategy::Stockpile;
        let stock = analyze(&i).unwrap();
        assert!(stock.total_costs > lean.total_costs);
    }
}
