#![deny(warnings)]

//! Economic models for the storefront simulation.
//!
//! Every model is a set of pure functions over plain inputs that returns an
//! immutable result record:
//! - [`trend`]: EMA/MACD/RSI signal processing of market-interest series
//! - [`market`]: saturation, economic climate, risk and strategy
//! - [`competition`]: competitor count, Huff trade area, HHI, entry/exit dynamics
//! - [`supplier`]: utilities, COGS with volume/relationship discounts, energy use
//! - [`employee`]: productivity, morale and labour cost
//! - [`customer`]: penetration, Bass-diffusion acquisition, churn, CLV, segments
//! - [`finance`]: revenue, cost roll-up, profit and health metrics
//! - [`events`]: deterministic seasonal events per category
//!
//! The only stochastic step (competitor exit rounding) draws from an injected
//! [`rng::RandomSource`].

use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;
use sim_core::ValidationError;
use thiserror::Error;

pub mod benchmarks;
pub mod competition;
pub mod customer;
pub mod employee;
pub mod events;
pub mod finance;
pub mod market;
pub mod rng;
pub mod supplier;
pub mod trend;

pub use competition::CompetitionResult;
pub use customer::CustomerBehaviorResult;
pub use employee::EmployeeResult;
pub use events::EventsResult;
pub use finance::FinancialResult;
pub use market::{EconomicClimate, MarketContextResult};
pub use supplier::SupplierCostResult;
pub use trend::TrendResult;

/// Errors produced by the economic models.
#[derive(Debug, Error, PartialEq)]
pub enum EconError {
    /// Input outside its documented domain.
    #[error(transparent)]
    Validation(#[from] ValidationError),
    /// Numeric conversion to a monetary amount failed.
    #[error("non-finite numeric conversion in {0}")]
    NonFinite(&'static str),
}

/// Convert a float amount to cents-rounded money.
pub fn to_money(field: &'static str, value: f64) -> Result<Decimal, EconError> {
    if !value.is_finite() {
        return Err(EconError::NonFinite(field));
    }
    Decimal::from_f64(value)
        .map(|d| d.round_dp(2))
        .ok_or(EconError::NonFinite(field))
}

/// Reference median household income (USD/year) used across the models.
pub const NATIONAL_MEDIAN_INCOME: f64 = 74_580.0;
