//! Phase schedule: one `bevy_ecs` system per model, ordered by system sets.
//!
//! Every system reads the immutable [`MonthContext`] plus the finished slots
//! of earlier phases and writes only its own [`Slot`]. Systems in the same
//! phase touch disjoint resources, so the multi-threaded executor is free to
//! run them side by side; set ordering gives join semantics between phases.

use bevy_ecs::prelude::*;
use bevy_ecs::schedule::ExecutorKind;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use sim_core::{BusinessProfile, EnvironmentSnapshot, PlayerDecisions, SimConfig};
use sim_econ::benchmarks::benchmarks;
use sim_econ::customer::CustomerInputs;
use sim_econ::finance::FinanceInputs;
use sim_econ::rng::RandomSource;
use sim_econ::{
    competition, customer, employee, events, finance, market, supplier, trend, CompetitionResult,
    CustomerBehaviorResult, EconError, EmployeeResult, EventsResult, FinancialResult,
    MarketContextResult, SupplierCostResult, TrendResult,
};
use tracing::debug;

#[derive(SystemSet, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    /// Phase 1: market context.
    Market,
    /// Phase 2: trend signal and calendar events.
    Signals,
    /// Phase 3: supplier costs, competition, staffing.
    Costs,
    /// Phase 4: customer behaviour.
    Customers,
    /// Phase 5: financial roll-up.
    Financials,
}

/// Read-only inputs for the month being simulated.
#[derive(Resource, Clone, Debug)]
pub struct MonthContext {
    pub config: SimConfig,
    pub profile: BusinessProfile,
    pub environment: EnvironmentSnapshot,
    pub decisions: PlayerDecisions,
    pub first_month: bool,
    pub current_customers: u64,
    pub previous_revenue: Decimal,
    pub previous_cash: Decimal,
}

/// Source for the competitor-exit draw. Only the competition system uses it.
#[derive(Resource)]
pub struct MonthRng(pub Box<dyn RandomSource>);

/// Output of one model for the month. `None` until the system has run, and
/// left empty when an upstream phase failed.
#[derive(Resource)]
pub struct Slot<T: Send + Sync + 'static>(pub Option<Result<T, EconError>>);

impl<T: Send + Sync + 'static> Default for Slot<T> {
    fn default() -> Self {
        Self(None)
    }
}

impl<T: Send + Sync + 'static> Slot<T> {
    pub fn ok(&self) -> Option<&T> {
        self.0.as_ref().and_then(|r| r.as_ref().ok())
    }
}

fn market_system(ctx: Res<MonthContext>, mut out: ResMut<Slot<MarketContextResult>>) {
    let env = &ctx.environment;
    let category = ctx.profile.category;
    let competitors = env
        .observed_competitors
        .unwrap_or_else(|| market::estimate_competitors(env.population, category));
    let result = market::analyze(env, category, competitors);
    if let Ok(r) = &result {
        debug!(saturation = r.saturation, climate = ?r.climate, risk = r.risk_score, "market context");
    }
    out.0 = Some(result);
}

fn trend_system(ctx: Res<MonthContext>, mut out: ResMut<Slot<TrendResult>>) {
    let r = trend::analyze(&ctx.environment.interest, &ctx.config.trend);
    debug!(impact = r.impact_score, momentum = ?r.momentum, "trend signal");
    out.0 = Some(Ok(r));
}

fn events_system(ctx: Res<MonthContext>, mut out: ResMut<Slot<EventsResult>>) {
    let result = events::analyze(ctx.environment.month, ctx.profile.category);
    if let Ok(r) = &result {
        debug!(events = r.events.len(), factor = r.demand_factor(), "calendar events");
    }
    out.0 = Some(result);
}

fn supplier_system(
    ctx: Res<MonthContext>,
    market: Res<Slot<MarketContextResult>>,
    mut out: ResMut<Slot<SupplierCostResult>>,
) {
    if market.ok().is_none() {
        return;
    }
    let p = &ctx.profile;
    let result = supplier::analyze(
        p.category,
        p.region,
        p.square_feet,
        ctx.environment.month,
        ctx.previous_revenue.to_f64().unwrap_or(0.0),
        p.months_in_operation,
    );
    if let Ok(r) = &result {
        debug!(utilities = r.utilities, cogs_rate = r.cogs_rate, "supplier costs");
    }
    out.0 = Some(result);
}

fn competition_system(
    ctx: Res<MonthContext>,
    market: Res<Slot<MarketContextResult>>,
    mut rng: ResMut<MonthRng>,
    mut out: ResMut<Slot<CompetitionResult>>,
) {
    let Some(m) = market.ok() else {
        return;
    };
    out.0 = Some(competition::analyze(
        ctx.environment.population,
        ctx.profile.category,
        ctx.profile.square_feet,
        m.saturation,
        m.climate,
        rng.0.as_mut(),
    ));
}

fn employee_system(
    ctx: Res<MonthContext>,
    market: Res<Slot<MarketContextResult>>,
    mut out: ResMut<Slot<EmployeeResult>>,
) {
    let Some(m) = market.ok() else {
        return;
    };
    let d = &ctx.decisions;
    // An opening month is staffed for the customers it is expected to win.
    let served = if ctx.first_month || ctx.current_customers == 0 {
        customer::expected_opening_customers(
            ctx.profile.category,
            m.market_capacity,
            ctx.profile.square_feet,
            m.estimated_competitors,
            d.marketing_spend,
        )
    } else {
        ctx.current_customers
    };
    let visits = served as f64 * benchmarks(ctx.profile.category).visits_per_month;
    let result = employee::analyze(
        d.target_employees,
        visits,
        d.hourly_wage,
        d.weekly_hours,
        ctx.environment.median_household_income,
    );
    if let Ok(r) = &result {
        debug!(morale = r.morale, overworked = r.overworked, "staffing");
    }
    out.0 = Some(result);
}

#[allow(clippy::too_many_arguments)]
fn customer_system(
    ctx: Res<MonthContext>,
    market: Res<Slot<MarketContextResult>>,
    trend: Res<Slot<TrendResult>>,
    events: Res<Slot<EventsResult>>,
    supplier: Res<Slot<SupplierCostResult>>,
    competition: Res<Slot<CompetitionResult>>,
    employee: Res<Slot<EmployeeResult>>,
    mut out: ResMut<Slot<CustomerBehaviorResult>>,
) {
    let (Some(m), Some(t), Some(ev), Some(s), Some(c), Some(e)) = (
        market.ok(),
        trend.ok(),
        events.ok(),
        supplier.ok(),
        competition.ok(),
        employee.ok(),
    ) else {
        return;
    };
    let d = &ctx.decisions;
    let result = customer::analyze(&CustomerInputs {
        category: ctx.profile.category,
        env: &ctx.environment,
        square_feet: ctx.profile.square_feet,
        current_customers: ctx.current_customers,
        first_month: ctx.first_month,
        pricing_modifier: d.pricing_modifier,
        marketing_spend: d.marketing_spend,
        inventory_strategy: d.inventory_strategy,
        competitor_count: c.competitor_count,
        competition_intensity: c.intensity,
        climate: m.climate,
        morale: e.morale,
        service_quality: e.service_quality,
        cogs_rate: s.cogs_rate,
        demand_factor: t.demand_factor() * ev.demand_factor(),
    });
    if let Ok(r) = &result {
        debug!(
            acquired = r.acquisition.acquired,
            churned = r.churned,
            total = r.total_customers,
            "customer behaviour"
        );
    }
    out.0 = Some(result);
}

fn finance_system(
    ctx: Res<MonthContext>,
    supplier: Res<Slot<SupplierCostResult>>,
    employee: Res<Slot<EmployeeResult>>,
    customers: Res<Slot<CustomerBehaviorResult>>,
    mut out: ResMut<Slot<FinancialResult>>,
) {
    let (Some(s), Some(e), Some(c)) = (supplier.ok(), employee.ok(), customers.ok()) else {
        return;
    };
    let p = &ctx.profile;
    let result = finance::analyze(&FinanceInputs {
        category: p.category,
        region: p.region,
        square_feet: p.square_feet,
        segments: &c.segments,
        visit_frequency: c.visit_frequency,
        labor: e.total_salaries,
        cogs_rate: s.cogs_rate,
        utilities: s.utilities,
        marketing_spend: ctx.decisions.marketing_spend,
        fixed_overhead: ctx.config.fixed_overhead_usd,
        inventory_strategy: ctx.decisions.inventory_strategy,
        previous_cash: ctx.previous_cash,
        previous_revenue: ctx.previous_revenue,
    });
    if let Ok(r) = &result {
        debug!(revenue = %r.revenue, profit = %r.profit, "financials");
    }
    out.0 = Some(result);
}

/// Build the five-phase month schedule.
pub fn build_schedule() -> Schedule {
    let mut schedule = Schedule::default();
    schedule.set_executor_kind(ExecutorKind::MultiThreaded);
    schedule.configure_sets(Phase::Signals.after(Phase::Market));
    schedule.configure_sets(Phase::Costs.after(Phase::Market));
    schedule.configure_sets(Phase::Customers.after(Phase::Signals).after(Phase::Costs));
    schedule.configure_sets(Phase::Financials.after(Phase::Customers));
    schedule.add_systems(market_system.in_set(Phase::Market));
    schedule.add_systems((trend_system, events_system).in_set(Phase::Signals));
    schedule.add_systems(
        (supplier_system, competition_system, employee_system).in_set(Phase::Costs),
    );
    schedule.add_systems(customer_system.in_set(Phase::Customers));
    schedule.add_systems(finance_system.in_set(Phase::Financials));
    schedule
}

/// Reset every output slot and install the month's inputs.
pub fn prepare_world(world: &mut World, ctx: MonthContext, rng: Box<dyn RandomSource>) {
    world.insert_resource(ctx);
    world.insert_resource(MonthRng(rng));
    world.insert_resource(Slot::<MarketContextResult>::default());
    world.insert_resource(Slot::<TrendResult>::default());
    world.insert_resource(Slot::<EventsResult>::default());
    world.insert_resource(Slot::<SupplierCostResult>::default());
    world.insert_resource(Slot::<CompetitionResult>::default());
    world.insert_resource(Slot::<EmployeeResult>::default());
    world.insert_resource(Slot::<CustomerBehaviorResult>::default());
    world.insert_resource(Slot::<FinancialResult>::default());
}
