//! Month orchestration: validation, state continuity, phase schedule, next state.

use bevy_ecs::prelude::*;
use rust_decimal::Decimal;
use serde::Serialize;
use sim_ai::MonthSummary;
use sim_core::{
    validate_decisions, validate_environment, validate_profile, validate_state, BusinessProfile,
    EnvironmentSnapshot, PlayerDecisions, PreviousMonth, SimConfig, SimulationState,
    ValidationError,
};
use sim_econ::rng::{RandomSource, SeededSource};
use sim_econ::{
    CompetitionResult, CustomerBehaviorResult, EmployeeResult, EventsResult, FinancialResult,
    MarketContextResult, SupplierCostResult, TrendResult,
};
use tracing::info;

use crate::schedule::{build_schedule, prepare_world, MonthContext, MonthRng, Slot};
use crate::SimError;

/// Everything needed to simulate one month.
#[derive(Clone, Debug, PartialEq)]
pub struct MonthInput {
    pub profile: BusinessProfile,
    pub environment: EnvironmentSnapshot,
    pub decisions: PlayerDecisions,
    pub previous: PreviousMonth,
}

/// One result per model, in phase order.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct PhaseOutputs {
    pub market: MarketContextResult,
    pub trend: TrendResult,
    pub events: EventsResult,
    pub supplier: SupplierCostResult,
    pub competition: CompetitionResult,
    pub employee: EmployeeResult,
    pub customer: CustomerBehaviorResult,
    pub financial: FinancialResult,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct MonthOutcome {
    /// State closing the simulated month.
    pub state: SimulationState,
    /// Profile to use for the following month.
    pub profile: BusinessProfile,
    pub outputs: PhaseOutputs,
}

impl MonthOutcome {
    /// Numbers handed to the narrative collaborator.
    pub fn summary(&self) -> MonthSummary {
        let o = &self.outputs;
        MonthSummary {
            business_name: self.profile.name.clone(),
            category: self.profile.category,
            month: self.state.month,
            year: self.state.year,
            revenue: self.state.revenue,
            profit: self.state.profit,
            cash_balance: self.state.cash_balance,
            customers: self.state.customers,
            new_customers: o.customer.acquisition.acquired,
            churned_customers: o.customer.churned,
            churn_rate: o.customer.churn_rate,
            profit_margin: o.financial.health.profit_margin,
            revenue_growth: o.financial.health.revenue_growth,
            morale: o.employee.morale,
            overworked: o.employee.overworked,
            saturation: o.market.saturation,
            climate: o.market.climate,
            strategy: o.market.strategy,
            momentum: o.trend.momentum,
            runway_months: o.financial.health.runway_months,
        }
    }
}

/// Runs simulated months on a `bevy_ecs` world.
///
/// The orchestrator is the only owner of the month-to-month state
/// transition: it reads the previous state, runs the phases, and builds the
/// next state once after the financial phase has finished.
pub struct Orchestrator {
    config: SimConfig,
    world: World,
    schedule: Schedule,
    injected: Option<Box<dyn RandomSource>>,
}

impl Orchestrator {
    pub fn new(config: SimConfig) -> Result<Self, SimError> {
        config.validate()?;
        Ok(Self {
            config,
            world: World::new(),
            schedule: build_schedule(),
            injected: None,
        })
    }

    /// Use `source` for the competitor-exit draw instead of the per-month
    /// seeded source. The same source is reused across months.
    pub fn with_random_source(mut self, source: Box<dyn RandomSource>) -> Self {
        self.injected = Some(source);
        self
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    /// Simulate one month.
    pub fn run_month(&mut self, input: &MonthInput) -> Result<MonthOutcome, SimError> {
        validate_profile(&input.profile)?;
        validate_environment(&input.environment)?;
        validate_decisions(&input.decisions)?;
        let (first_month, previous) = self.resolve_previous(input)?;

        let env = &input.environment;
        let (rng, injected): (Box<dyn RandomSource>, bool) = match self.injected.take() {
            Some(source) => (source, true),
            None => (
                Box::new(SeededSource::for_period(
                    self.config.rng_seed,
                    env.year,
                    env.month,
                )),
                false,
            ),
        };
        let ctx = MonthContext {
            config: self.config.clone(),
            profile: input.profile.clone(),
            environment: env.clone(),
            decisions: input.decisions.clone(),
            first_month,
            current_customers: previous.customers,
            previous_revenue: previous.revenue,
            previous_cash: previous.cash_balance,
        };
        prepare_world(&mut self.world, ctx, rng);
        self.schedule.run(&mut self.world);
        if let Some(MonthRng(source)) = self.world.remove_resource::<MonthRng>() {
            if injected {
                self.injected = Some(source);
            }
        }

        let outputs = PhaseOutputs {
            market: take(&mut self.world, "market")?,
            trend: take(&mut self.world, "trend")?,
            events: take(&mut self.world, "events")?,
            supplier: take(&mut self.world, "supplier")?,
            competition: take(&mut self.world, "competition")?,
            employee: take(&mut self.world, "employee")?,
            customer: take(&mut self.world, "customer")?,
            financial: take(&mut self.world, "financial")?,
        };

        let profile = input.profile.advanced();
        let state = SimulationState {
            month: env.month,
            year: env.year,
            revenue: outputs.financial.revenue,
            profit: outputs.financial.profit,
            customers: outputs.customer.total_customers,
            cash_balance: outputs.financial.cash_balance,
            months_in_operation: profile.months_in_operation,
        };
        info!(
            business = %input.profile.name,
            year = state.year,
            month = state.month,
            revenue = %state.revenue,
            profit = %state.profit,
            customers = state.customers,
            cash = %state.cash_balance,
            "month simulated"
        );
        Ok(MonthOutcome {
            state,
            profile,
            outputs,
        })
    }

    /// Turn the explicit previous-month marker into the state the phases
    /// read. A first month is seeded from opening cash; a continuing month
    /// must directly follow the state it continues.
    fn resolve_previous(&self, input: &MonthInput) -> Result<(bool, SimulationState), SimError> {
        let env = &input.environment;
        let profile = &input.profile;
        match &input.previous {
            PreviousMonth::FirstMonth { opening_cash } => {
                if profile.months_in_operation > 0 {
                    return Err(SimError::StateInconsistency(format!(
                        "first month requested but {} has {} months in operation",
                        profile.name, profile.months_in_operation
                    )));
                }
                if *opening_cash < Decimal::ZERO {
                    return Err(ValidationError::NegativeMoney("opening_cash").into());
                }
                Ok((true, SimulationState::seed(env.month, env.year, *opening_cash)))
            }
            PreviousMonth::Continuing(state) => {
                validate_state(state)?;
                if profile.months_in_operation == 0 {
                    return Err(SimError::StateInconsistency(format!(
                        "previous state supplied but {} has not operated yet",
                        profile.name
                    )));
                }
                if state.months_in_operation != profile.months_in_operation {
                    return Err(SimError::StateInconsistency(format!(
                        "previous state closes month {} of operation but {} reports {}",
                        state.months_in_operation, profile.name, profile.months_in_operation
                    )));
                }
                let expected = state.next_period()?;
                let actual = env.period()?;
                if expected != actual {
                    return Err(SimError::StateInconsistency(format!(
                        "environment is for {actual} but previous state expects {expected}"
                    )));
                }
                Ok((false, state.clone()))
            }
        }
    }
}

fn take<T: Send + Sync + 'static>(world: &mut World, phase: &'static str) -> Result<T, SimError> {
    match world.remove_resource::<Slot<T>>().and_then(|slot| slot.0) {
        Some(result) => Ok(result?),
        None => Err(SimError::StateInconsistency(format!(
            "{phase} phase produced no result"
        ))),
    }
}
