//! Session glue: state store, orchestrator and narrative collaborator.

use persistence::StateStore;
use rust_decimal::Decimal;
use sim_ai::{narrate_with_fallback, NarrativeOutcome, NarrativeService, RetryPolicy};
use sim_core::{
    BusinessProfile, EnvironmentSnapshot, PlayerDecisions, PreviousMonth, SimulationId,
    SimulationState,
};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

use crate::{MonthInput, MonthOutcome, Orchestrator, SimError};

/// Caller inputs for one month of a stored simulation.
#[derive(Clone, Debug, PartialEq)]
pub struct SessionMonth {
    pub profile: BusinessProfile,
    pub environment: EnvironmentSnapshot,
    pub decisions: PlayerDecisions,
    /// Cash the business opens with. Read only for its first month.
    pub opening_cash: Decimal,
}

#[derive(Clone, Debug)]
pub struct SessionOutcome {
    pub month: MonthOutcome,
    pub narrative: NarrativeOutcome,
}

/// Runs months for stored simulations.
pub struct SimulationSession<S: StateStore> {
    orchestrator: Orchestrator,
    store: S,
    narrator: Arc<dyn NarrativeService>,
    policy: RetryPolicy,
    timeout: Duration,
}

impl<S: StateStore> SimulationSession<S> {
    pub fn new(orchestrator: Orchestrator, store: S, narrator: Arc<dyn NarrativeService>) -> Self {
        let narrative = &orchestrator.config().narrative;
        let policy = RetryPolicy::from(narrative);
        let timeout = narrative.timeout();
        Self {
            orchestrator,
            store,
            narrator,
            policy,
            timeout,
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Point `request` at the month after the stored state of `id`, so a
    /// caller restarted from its opening inputs picks up where the last run
    /// stopped. Leaves `request` alone and returns `false` when nothing is
    /// stored.
    pub async fn resume(
        &self,
        id: &SimulationId,
        request: &mut SessionMonth,
    ) -> Result<bool, SimError> {
        let Some(state) = self.store.load(id).await? else {
            return Ok(false);
        };
        let (year, month) = state.next_year_month()?;
        request.profile.months_in_operation = state.months_in_operation;
        request.environment.year = year;
        request.environment.month = month;
        info!(%id, year, month, months = state.months_in_operation, "resuming stored simulation");
        Ok(true)
    }

    /// Simulate the next month of `id` and persist its closing state.
    ///
    /// A missing stored state is only acceptable for a business that has
    /// not operated yet. Narrative failures never fail the month.
    pub async fn run_month(
        &mut self,
        id: &SimulationId,
        request: &SessionMonth,
    ) -> Result<SessionOutcome, SimError> {
        let previous = match self.store.load(id).await? {
            Some(state) => PreviousMonth::Continuing(state),
            None if request.profile.months_in_operation == 0 => PreviousMonth::FirstMonth {
                opening_cash: request.opening_cash,
            },
            None => {
                return Err(SimError::StateInconsistency(format!(
                    "no stored state for {id} but {} has {} months in operation",
                    request.profile.name, request.profile.months_in_operation
                )))
            }
        };
        let month = self.orchestrator.run_month(&MonthInput {
            profile: request.profile.clone(),
            environment: request.environment.clone(),
            decisions: request.decisions.clone(),
            previous,
        })?;
        self.store.save(id, &month.state).await?;
        let narrative = narrate_with_fallback(
            self.narrator.as_ref(),
            &month.summary(),
            &self.policy,
            self.timeout,
        )
        .await;
        Ok(SessionOutcome { month, narrative })
    }

    /// Add cash to the stored state of `id` outside the monthly cycle.
    pub async fn inject_capital(
        &self,
        id: &SimulationId,
        amount: Decimal,
    ) -> Result<SimulationState, SimError> {
        let Some(state) = self.store.load(id).await? else {
            return Err(SimError::StateInconsistency(format!(
                "cannot inject capital into {id}: no stored state"
            )));
        };
        let next = state.with_capital_injection(amount)?;
        self.store.save(id, &next).await?;
        info!(%id, %amount, cash = %next.cash_balance, "capital injected");
        Ok(next)
    }
}
