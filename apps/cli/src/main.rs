#![deny(warnings)]

//! Headless CLI: load a YAML scenario, simulate N months, print KPIs.

use anyhow::{Context, Result};
use persistence::{InMemoryStateStore, JsonDirStateStore, StateStore};
use rust_decimal::Decimal;
use serde::Deserialize;
use sim_ai::{NarrativeSource, TemplateNarrator};
use sim_core::{
    BusinessProfile, EnvironmentSnapshot, PlayerDecisions, SimConfig, SimulationId,
    SimulationState,
};
use sim_runtime::{Orchestrator, SessionMonth, SimulationSession};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Default)]
struct Args {
    scenario: Option<PathBuf>,
    months: Option<u32>,
    store_dir: Option<PathBuf>,
}

fn parse_args() -> Args {
    let mut args = Args::default();
    let mut it = std::env::args().skip(1);
    while let Some(arg) = it.next() {
        match arg.as_str() {
            "--scenario" => args.scenario = it.next().map(PathBuf::from),
            "--months" => args.months = it.next().and_then(|s| s.parse().ok()),
            "--store" => args.store_dir = it.next().map(PathBuf::from),
            other => warn!(arg = other, "ignoring unknown argument"),
        }
    }
    args
}

/// Scenario file: everything needed to open a business and run it.
#[derive(Debug, Deserialize)]
struct Scenario {
    #[serde(default = "default_id")]
    id: String,
    #[serde(default)]
    config: SimConfig,
    profile: BusinessProfile,
    /// Environment for the opening month; later months reuse it with the
    /// calendar advanced.
    environment: EnvironmentSnapshot,
    #[serde(default)]
    decisions: PlayerDecisions,
    opening_cash: Decimal,
}

fn default_id() -> String {
    "scenario".to_string()
}

const DEFAULT_SCENARIO: &str = include_str!("../../../assets/scenarios/coffee_brooklyn.yaml");

fn load_scenario(path: Option<&Path>) -> Result<Scenario> {
    let text = match path {
        Some(p) => std::fs::read_to_string(p)
            .with_context(|| format!("reading scenario {}", p.display()))?,
        None => DEFAULT_SCENARIO.to_string(),
    };
    let scenario: Scenario = serde_yaml::from_str(&text).context("parsing scenario YAML")?;
    scenario.config.validate()?;
    Ok(scenario)
}

fn advance_calendar(env: &mut EnvironmentSnapshot) {
    if env.month >= 12 {
        env.month = 1;
        env.year += 1;
    } else {
        env.month += 1;
    }
}

/// Simulate `months` further months of the scenario, continuing from
/// whatever `store` already holds for its id. Returns the closing state.
async fn run<S: StateStore>(
    scenario: Scenario,
    months: u32,
    store: S,
) -> Result<Option<SimulationState>> {
    let id = SimulationId(scenario.id.clone());
    let orchestrator = Orchestrator::new(scenario.config.clone())?;
    let mut session = SimulationSession::new(orchestrator, store, Arc::new(TemplateNarrator));
    let mut request = SessionMonth {
        profile: scenario.profile,
        environment: scenario.environment,
        decisions: scenario.decisions,
        opening_cash: scenario.opening_cash,
    };
    if session.resume(&id, &mut request).await? {
        println!(
            "resuming {id} at {:04}-{:02} after {} months",
            request.environment.year,
            request.environment.month,
            request.profile.months_in_operation
        );
    }

    let mut last = None;
    for _ in 0..months {
        let out = session.run_month(&id, &request).await?;
        let s = &out.month.state;
        println!(
            "{:04}-{:02} | revenue: ${} | profit: ${} | customers: {} | cash: ${}",
            s.year, s.month, s.revenue, s.profit, s.customers, s.cash_balance
        );
        if let NarrativeSource::Fallback { reason } = &out.narrative.source {
            warn!(%reason, "narrative fell back to template text");
        }
        println!("  {}", out.narrative.narrative.headline);
        request.profile = out.month.profile.clone();
        advance_calendar(&mut request.environment);
        last = Some(out);
    }

    let Some(out) = last else {
        return Ok(None);
    };
    let f = &out.month.outputs.financial;
    let c = &out.month.outputs.customer;
    println!(
        "KPI | months: {} | margin: {:.1}% | growth: {:.1}% | churn: {:.1}% | CLV: ${:.0} | break-even customers: {}",
        out.month.profile.months_in_operation,
        f.health.profit_margin * 100.0,
        f.health.revenue_growth * 100.0,
        c.churn_rate * 100.0,
        c.lifetime_value,
        f.health
            .break_even_customers
            .map_or_else(|| "n/a".to_string(), |n| n.to_string()),
    );
    for rec in &out.narrative.narrative.recommendations {
        println!("  - {rec}");
    }
    Ok(Some(out.month.state))
}

#[tokio::main]
async fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let args = parse_args();
    info!(
        build = env!("GIT_SHA"),
        built = env!("BUILD_DATE"),
        scenario = ?args.scenario,
        months = ?args.months,
        "starting CLI"
    );

    let scenario = load_scenario(args.scenario.as_deref())?;
    let months = args.months.unwrap_or(12);
    match args.store_dir {
        Some(dir) => run(scenario, months, JsonDirStateStore::new(dir)).await?,
        None => run(scenario, months, InMemoryStateStore::new()).await?,
    };
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bundled_scenario_parses() {
        let s = load_scenario(None).unwrap();
        assert_eq!(s.profile.months_in_operation, 0);
        assert!(s.opening_cash > Decimal::ZERO);
    }

    #[test]
    fn calendar_wraps_at_december() {
        let mut env = load_scenario(None).unwrap().environment;
        env.month = 12;
        env.year = 2024;
        advance_calendar(&mut env);
        assert_eq!((env.year, env.month), (2025, 1));
    }

    #[tokio::test]
    async fn second_run_resumes_from_the_store() {
        let dir = std::env::temp_dir().join(format!("storefront-cli-resume-{}", std::process::id()));
        let _ = std::fs::remove_dir_all(&dir);
        let first = run(load_scenario(None).unwrap(), 2, JsonDirStateStore::new(&dir))
            .await
            .unwrap()
            .unwrap();
        assert_eq!((first.year, first.month, first.months_in_operation), (2024, 2, 2));

        let second = run(load_scenario(None).unwrap(), 3, JsonDirStateStore::new(&dir))
            .await
            .unwrap()
            .unwrap();
        assert_eq!((second.year, second.month, second.months_in_operation), (2024, 5, 5));
        let _ = std::fs::remove_dir_all(&dir);
    }
}
