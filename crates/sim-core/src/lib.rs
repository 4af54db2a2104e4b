#![deny(warnings)]

//! Core domain models and invariants for the storefront simulation.
//!
//! This crate defines serializable types shared by the economic models, the
//! orchestrator and the persistence adapters, plus validation helpers that
//! reject inputs outside their documented domain before any math runs.

use chrono::{Datelike, Months, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

mod config;

pub use config::{NarrativeConfig, SimConfig, TrendConfig};

/// Closed set of business categories understood by every model.
///
/// Classification from free text happens once, outside the core, when a
/// profile is created. Parsing here is exact (snake_case name) and never
/// falls back to a default category.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BusinessCategory {
    /// Full-service or quick-service restaurant.
    Restaurant,
    /// Coffee shop / cafe.
    Coffee,
    /// Bakery.
    Bakery,
    /// Bar or pub.
    Bar,
    /// Grocery or convenience store.
    Grocery,
    /// General retail shop.
    Retail,
    /// Hair or beauty salon.
    Salon,
    /// Gym or fitness studio.
    Fitness,
    /// Accounting, legal, consulting and similar offices.
    ProfessionalServices,
}

impl BusinessCategory {
    /// Every category, in declaration order.
    pub const ALL: [BusinessCategory; 9] = [
        BusinessCategory::Restaurant,
        BusinessCategory::Coffee,
        BusinessCategory::Bakery,
        BusinessCategory::Bar,
        BusinessCategory::Grocery,
        BusinessCategory::Retail,
        BusinessCategory::Salon,
        BusinessCategory::Fitness,
        BusinessCategory::ProfessionalServices,
    ];

    /// Stable snake_case name, identical to the serde representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            BusinessCategory::Restaurant => "restaurant",
            BusinessCategory::Coffee => "coffee",
            BusinessCategory::Bakery => "bakery",
            BusinessCategory::Bar => "bar",
            BusinessCategory::Grocery => "grocery",
            BusinessCategory::Retail => "retail",
            BusinessCategory::Salon => "salon",
            BusinessCategory::Fitness => "fitness",
            BusinessCategory::ProfessionalServices => "professional_services",
        }
    }
}

impl fmt::Display for BusinessCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BusinessCategory {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        BusinessCategory::ALL
            .iter()
            .copied()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| ValidationError::UnknownCategory(s.to_string()))
    }
}

/// Region the business operates in. Drives rent and utility multipliers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Region {
    Manhattan,
    Brooklyn,
    Queens,
    Bronx,
    StatenIsland,
    /// Anywhere outside the five boroughs.
    Other,
}

impl FromStr for Region {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "manhattan" => Ok(Region::Manhattan),
            "brooklyn" => Ok(Region::Brooklyn),
            "queens" => Ok(Region::Queens),
            "bronx" => Ok(Region::Bronx),
            "staten_island" => Ok(Region::StatenIsland),
            "other" => Ok(Region::Other),
            _ => Err(ValidationError::UnknownRegion(s.to_string())),
        }
    }
}

/// Static description of the simulated business.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BusinessProfile {
    /// Display name.
    pub name: String,
    /// Business category.
    pub category: BusinessCategory,
    /// Floor area in square feet (> 0).
    pub square_feet: f64,
    /// Borough / region.
    pub region: Region,
    /// Completed months of operation before the month being simulated.
    pub months_in_operation: u32,
}

impl BusinessProfile {
    /// Profile for the following month (operation counter incremented).
    pub fn advanced(&self) -> Self {
        Self {
            months_in_operation: self.months_in_operation.saturating_add(1),
            ..self.clone()
        }
    }
}

/// Coarse direction label supplied alongside an interest series.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrendDirection {
    Rising,
    #[default]
    Stable,
    Declining,
}

/// Market-interest time series on a 0-100 scale, oldest first.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct InterestSeries {
    pub values: Vec<f64>,
    /// Average interest over the observation window.
    pub average: f64,
    /// Peak interest over the observation window.
    pub peak: f64,
    pub direction: TrendDirection,
}

/// External facts for one month, supplied by the environment data provider.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EnvironmentSnapshot {
    /// Residents in the trade area (>= 0).
    pub population: f64,
    /// Residents per square mile (> 0).
    pub population_density: f64,
    /// Median household income in USD/year (> 0).
    pub median_household_income: f64,
    /// Share of residents below the poverty line, in [0,1].
    pub poverty_rate: f64,
    /// Share of workers working from home, in [0,1].
    pub work_from_home_rate: f64,
    /// Calendar month being simulated, 1-12.
    pub month: u32,
    /// Calendar year being simulated.
    pub year: i32,
    /// Competitor count observed by the data provider, when known.
    #[serde(default)]
    pub observed_competitors: Option<u32>,
    /// Market interest signal for the category.
    #[serde(default)]
    pub interest: InterestSeries,
}

impl EnvironmentSnapshot {
    /// First day of the simulated month.
    pub fn period(&self) -> Result<NaiveDate, ValidationError> {
        period_of(self.year, self.month)
    }
}

/// How aggressively inventory is stocked.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InventoryStrategy {
    /// Minimal stock: no holding cost, occasional stock-outs.
    Lean,
    #[default]
    Balanced,
    /// Deep stock: holding and spoilage cost, never out of stock.
    Stockpile,
}

/// Operating decisions made by the player for one month.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PlayerDecisions {
    /// Price relative to the local market price (1.0 = at market), in [0.5, 2.0].
    pub pricing_modifier: f64,
    /// Marketing spend in USD for the month (>= 0).
    pub marketing_spend: f64,
    /// Employees on payroll this month.
    pub target_employees: u32,
    /// Average hourly wage in USD (>= 0).
    pub hourly_wage: f64,
    /// Paid hours per employee per week, in [0, 80].
    pub weekly_hours: f64,
    #[serde(default)]
    pub inventory_strategy: InventoryStrategy,
}

impl Default for PlayerDecisions {
    fn default() -> Self {
        Self {
            pricing_modifier: 1.0,
            marketing_spend: 0.0,
            target_employees: 2,
            hourly_wage: 18.0,
            weekly_hours: 35.0,
            inventory_strategy: InventoryStrategy::Balanced,
        }
    }
}

/// Financial state carried from one simulated month to the next.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimulationState {
    /// Calendar month this state closes, 1-12.
    pub month: u32,
    pub year: i32,
    pub revenue: Decimal,
    pub profit: Decimal,
    pub customers: u64,
    pub cash_balance: Decimal,
    /// Months operated once this month closes.
    #[serde(default)]
    pub months_in_operation: u32,
}

impl SimulationState {
    /// Zeroed state holding only opening cash.
    pub fn seed(month: u32, year: i32, opening_cash: Decimal) -> Self {
        Self {
            month,
            year,
            revenue: Decimal::ZERO,
            profit: Decimal::ZERO,
            customers: 0,
            cash_balance: opening_cash,
            months_in_operation: 0,
        }
    }

    /// First day of the month this state closes.
    pub fn period(&self) -> Result<NaiveDate, ValidationError> {
        period_of(self.year, self.month)
    }

    /// Calendar month that follows this state.
    pub fn next_period(&self) -> Result<NaiveDate, ValidationError> {
        self.period()?
            .checked_add_months(Months::new(1))
            .ok_or(ValidationError::YearOutOfRange(self.year))
    }

    /// `(year, month)` of the month that follows this state.
    pub fn next_year_month(&self) -> Result<(i32, u32), ValidationError> {
        let next = self.next_period()?;
        Ok((next.year(), next.month()))
    }

    /// Out-of-band capital injection. Only the cash balance moves.
    pub fn with_capital_injection(&self, amount: Decimal) -> Result<Self, ValidationError> {
        if amount < Decimal::ZERO {
            return Err(ValidationError::NegativeMoney("capital_injection"));
        }
        Ok(Self {
            cash_balance: self.cash_balance + amount,
            ..self.clone()
        })
    }
}

/// Explicit marker for what precedes the month being simulated.
///
/// The orchestrator never infers a first month from missing data.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PreviousMonth {
    /// The business opens this month with the given cash.
    FirstMonth { opening_cash: Decimal },
    /// State closed by the previous simulated month.
    Continuing(SimulationState),
}

/// Identity of a simulation run, used as the state-store key.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SimulationId(pub String);

impl fmt::Display for SimulationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Validation errors for domain invariants.
#[derive(Debug, Error, PartialEq)]
pub enum ValidationError {
    /// Numeric field outside its documented domain.
    #[error("{field} = {value} is outside {expected}")]
    OutOfRange {
        field: &'static str,
        value: f64,
        expected: &'static str,
    },
    /// Numeric field must be finite.
    #[error("{0} must be finite")]
    NonFinite(&'static str),
    /// Monetary amount must be non-negative.
    #[error("{0} must not be negative")]
    NegativeMoney(&'static str),
    /// Category name is not one of the enumerated categories.
    #[error("unknown business category: {0}")]
    UnknownCategory(String),
    /// Region name is not one of the enumerated regions.
    #[error("unknown region: {0}")]
    UnknownRegion(String),
    /// Calendar month outside 1-12.
    #[error("month {0} is outside 1-12")]
    InvalidMonth(u32),
    /// Year outside supported range [1970, 2100].
    #[error("year {0} is out of supported range [1970, 2100]")]
    YearOutOfRange(i32),
    /// Market-share list must contain at least one entry.
    #[error("market share list is empty")]
    EmptyMarketShares,
    /// Configuration could not be parsed or is inconsistent.
    #[error("invalid configuration: {0}")]
    Config(String),
}

fn period_of(year: i32, month: u32) -> Result<NaiveDate, ValidationError> {
    if !(1..=12).contains(&month) {
        return Err(ValidationError::InvalidMonth(month));
    }
    if !(1970..=2100).contains(&year) {
        return Err(ValidationError::YearOutOfRange(year));
    }
    NaiveDate::from_ymd_opt(year, month, 1).ok_or(ValidationError::InvalidMonth(month))
}

/// Require `value` to be finite and within `[min, max]`.
pub fn check_range(
    field: &'static str,
    value: f64,
    min: f64,
    max: f64,
    expected: &'static str,
) -> Result<(), ValidationError> {
    if !value.is_finite() {
        return Err(ValidationError::NonFinite(field));
    }
    if value < min || value > max {
        return Err(ValidationError::OutOfRange {
            field,
            value,
            expected,
        });
    }
    Ok(())
}

/// Require `value` to be finite and `>= 0`.
pub fn check_non_negative(field: &'static str, value: f64) -> Result<(), ValidationError> {
    check_range(field, value, 0.0, f64::INFINITY, "[0, inf)")
}

/// Validate a business profile.
pub fn validate_profile(p: &BusinessProfile) -> Result<(), ValidationError> {
    if !p.square_feet.is_finite() {
        return Err(ValidationError::NonFinite("square_feet"));
    }
    if p.square_feet <= 0.0 {
        return Err(ValidationError::OutOfRange {
            field: "square_feet",
            value: p.square_feet,
            expected: "(0, inf)",
        });
    }
    Ok(())
}

/// Validate an interest series (values and summary on the 0-100 scale).
pub fn validate_interest(s: &InterestSeries) -> Result<(), ValidationError> {
    for v in &s.values {
        check_range("interest.values", *v, 0.0, 100.0, "[0, 100]")?;
    }
    check_range("interest.average", s.average, 0.0, 100.0, "[0, 100]")?;
    check_range("interest.peak", s.peak, 0.0, 100.0, "[0, 100]")?;
    Ok(())
}

/// Validate an environment snapshot.
pub fn validate_environment(e: &EnvironmentSnapshot) -> Result<(), ValidationError> {
    check_non_negative("population", e.population)?;
    if !e.population_density.is_finite() {
        return Err(ValidationError::NonFinite("population_density"));
    }
    if e.population_density <= 0.0 {
        return Err(ValidationError::OutOfRange {
            field: "population_density",
            value: e.population_density,
            expected: "(0, inf)",
        });
    }
    if !e.median_household_income.is_finite() {
        return Err(ValidationError::NonFinite("median_household_income"));
    }
    if e.median_household_income <= 0.0 {
        return Err(ValidationError::OutOfRange {
            field: "median_household_income",
            value: e.median_household_income,
            expected: "(0, inf)",
        });
    }
    check_range("poverty_rate", e.poverty_rate, 0.0, 1.0, "[0, 1]")?;
    check_range(
        "work_from_home_rate",
        e.work_from_home_rate,
        0.0,
        1.0,
        "[0, 1]",
    )?;
    e.period()?;
    validate_interest(&e.interest)
}

/// Validate player decisions.
pub fn validate_decisions(d: &PlayerDecisions) -> Result<(), ValidationError> {
    check_range("pricing_modifier", d.pricing_modifier, 0.5, 2.0, "[0.5, 2.0]")?;
    if !d.marketing_spend.is_finite() {
        return Err(ValidationError::NonFinite("marketing_spend"));
    }
    if d.marketing_spend < 0.0 {
        return Err(ValidationError::NegativeMoney("marketing_spend"));
    }
    if !d.hourly_wage.is_finite() {
        return Err(ValidationError::NonFinite("hourly_wage"));
    }
    if d.hourly_wage < 0.0 {
        return Err(ValidationError::NegativeMoney("hourly_wage"));
    }
    check_range("weekly_hours", d.weekly_hours, 0.0, 80.0, "[0, 80]")
}

/// Validate a carried-forward state.
pub fn validate_state(s: &SimulationState) -> Result<(), ValidationError> {
    s.period()?;
    Ok(())
}
