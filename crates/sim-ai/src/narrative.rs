//! Narrative port and the deterministic template narrator.

use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sim_core::BusinessCategory;
use sim_econ::market::{EconomicClimate, Strategy};
use sim_econ::trend::Momentum;
use thiserror::Error;

/// Structured numbers handed to the narrative collaborator.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MonthSummary {
    pub business_name: String,
    pub category: BusinessCategory,
    pub month: u32,
    pub year: i32,
    pub revenue: Decimal,
    pub profit: Decimal,
    pub cash_balance: Decimal,
    pub customers: u64,
    pub new_customers: u64,
    pub churned_customers: u64,
    pub churn_rate: f64,
    pub profit_margin: f64,
    pub revenue_growth: f64,
    pub morale: f64,
    pub overworked: bool,
    pub saturation: f64,
    pub climate: EconomicClimate,
    pub strategy: Strategy,
    pub momentum: Momentum,
    pub runway_months: Option<f64>,
}

/// Display text for a month.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Narrative {
    pub headline: String,
    pub insights: Vec<String>,
    pub recommendations: Vec<String>,
}

/// Failures of the narrative collaborator.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum NarrativeError {
    #[error("narrative request timed out after {after_ms} ms")]
    Timeout { after_ms: u64 },
    #[error("narrative service unavailable: {0}")]
    Unavailable(String),
    #[error("narrative service returned an empty response")]
    Empty,
}

/// Port for narrative generation (typically an LLM-backed service).
#[async_trait]
pub trait NarrativeService: Send + Sync {
    async fn narrate(&self, summary: &MonthSummary) -> Result<Narrative, NarrativeError>;

    /// Short name used in logs.
    fn name(&self) -> &str;
}

fn pct(x: f64) -> String {
    format!("{:.1}%", x * 100.0)
}

/// Template text built only from the summary numbers.
pub fn fallback_narrative(s: &MonthSummary) -> Narrative {
    let headline = if s.profit >= Decimal::ZERO {
        format!(
            "{} earned ${} profit on ${} revenue in {}/{}",
            s.business_name,
            s.profit.round_dp(0),
            s.revenue.round_dp(0),
            s.month,
            s.year
        )
    } else {
        format!(
            "{} lost ${} on ${} revenue in {}/{}",
            s.business_name,
            (-s.profit).round_dp(0),
            s.revenue.round_dp(0),
            s.month,
            s.year
        )
    };

    let mut insights = vec![
        format!(
            "{} active customers: {} new, {} lost (churn {}).",
            s.customers,
            s.new_customers,
            s.churned_customers,
            pct(s.churn_rate)
        ),
        format!(
            "Margin {}, revenue growth {}.",
            pct(s.profit_margin),
            pct(s.revenue_growth)
        ),
    ];
    if s.overworked {
        insights.push(format!(
            "Staff are overworked; morale is {:.0}/100.",
            s.morale
        ));
    }
    if let Some(runway) = s.runway_months {
        insights.push(format!("At this burn rate cash lasts {runway:.1} months."));
    }

    let mut recommendations = Vec::new();
    if s.overworked {
        recommendations.push("Hire another employee to relieve the team.".to_string());
    }
    if s.churn_rate > 0.25 {
        recommendations
            .push("Churn is high; review pricing and service quality.".to_string());
    }
    match s.strategy {
        Strategy::AggressiveGrowth => recommendations
            .push("The market has room: invest in marketing while it lasts.".to_string()),
        Strategy::Differentiation => recommendations
            .push("Stand out on quality and experience rather than price.".to_string()),
        Strategy::NicheFocus => recommendations
            .push("Focus on a loyal niche the crowded market underserves.".to_string()),
        Strategy::CostLeadership => recommendations
            .push("Keep prices sharp and costs tight for price-sensitive locals.".to_string()),
        Strategy::Avoid => recommendations
            .push("Conditions are unfavourable; protect cash and limit exposure.".to_string()),
    }
    if s.momentum == Momentum::Decelerating {
        recommendations.push("Interest in the category is cooling; avoid over-stocking.".to_string());
    }

    Narrative {
        headline,
        insights,
        recommendations,
    }
}

/// Local narrator that never fails. Also the source of fallback text.
#[derive(Clone, Copy, Debug, Default)]
pub struct TemplateNarrator;

#[async_trait]
impl NarrativeService for TemplateNarrator {
    async fn narrate(&self, summary: &MonthSummary) -> Result<Narrative, NarrativeError> {
        Ok(fallback_narrative(summary))
    }

    fn name(&self) -> &str {
        "template"
    }
}
