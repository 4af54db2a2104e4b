//! Staffing: productivity, morale and labour cost.

use serde::{Deserialize, Serialize};
use sim_core::check_non_negative;

use crate::EconError;

pub const CUSTOMERS_PER_EMPLOYEE_PER_DAY: f64 = 60.0;
pub const WORKING_DAYS_PER_MONTH: f64 = 26.0;
pub const WEEKS_PER_MONTH: f64 = 52.0 / 12.0;
/// Load ratio above which staff count as overworked.
pub const OVERWORK_THRESHOLD: f64 = 1.2;
const SALARY_WEIGHT: f64 = 0.4;
const WORKLOAD_WEIGHT: f64 = 0.6;
const OVERWORK_PENALTY: f64 = 10.0;
/// Workload morale lost per unit of load ratio away from 1.0.
const WORKLOAD_SLOPE: f64 = 40.0;
/// Morale reported when there is no staff to measure.
pub const NEUTRAL_MORALE: f64 = 50.0;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EmployeeResult {
    pub employees: u32,
    /// Customer visits one employee handles comfortably per month.
    pub ideal_load: f64,
    pub actual_load: f64,
    /// actual / ideal; 0 without staff.
    pub load_ratio: f64,
    /// Productivity in [0, 100].
    pub productivity: f64,
    pub salary_morale: f64,
    pub workload_morale: f64,
    /// Morale in [0, 100].
    pub morale: f64,
    pub overworked: bool,
    /// Service quality in [0, 100], falls once staff are stretched.
    pub service_quality: f64,
    pub monthly_salary: f64,
    /// Total labour cost in USD, never negative.
    pub total_salaries: f64,
}

pub fn ideal_monthly_load() -> f64 {
    CUSTOMERS_PER_EMPLOYEE_PER_DAY * WORKING_DAYS_PER_MONTH
}

pub fn monthly_salary(hourly_wage: f64, weekly_hours: f64) -> f64 {
    hourly_wage * weekly_hours * WEEKS_PER_MONTH
}

/// Salary component: pay relative to the local median monthly income.
/// Half the household median scores 60; five sixths of it or more scores 100.
pub fn salary_morale(monthly_salary: f64, median_household_income: f64) -> f64 {
    let median_monthly = median_household_income / 12.0;
    if median_monthly <= 0.0 {
        return NEUTRAL_MORALE;
    }
    (monthly_salary / median_monthly * 120.0).clamp(0.0, 100.0)
}

/// Workload component: symmetric penalty around a load ratio of 1.0. An idle
/// team still scores 60; overload is punished further by the overwork
/// penalty in [`analyze`].
pub fn workload_morale(load_ratio: f64) -> f64 {
    (100.0 - (load_ratio - 1.0).abs() * WORKLOAD_SLOPE).clamp(0.0, 100.0)
}

/// Staffing analysis. `customers_served` counts visits in the month.
pub fn analyze(
    employees: u32,
    customers_served: f64,
    hourly_wage: f64,
    weekly_hours: f64,
    median_household_income: f64,
) -> Result<EmployeeResult, EconError> {
    check_non_negative("customers_served", customers_served)?;
    check_non_negative("hourly_wage", hourly_wage)?;
    check_non_negative("weekly_hours", weekly_hours)?;
    let ideal = ideal_monthly_load();
    let salary = monthly_salary(hourly_wage, weekly_hours);

    if employees == 0 {
        return Ok(EmployeeResult {
            employees,
            ideal_load: ideal,
            actual_load: 0.0,
            load_ratio: 0.0,
            productivity: 0.0,
            salary_morale: NEUTRAL_MORALE,
            workload_morale: NEUTRAL_MORALE,
            morale: NEUTRAL_MORALE,
            overworked: false,
            service_quality: if customers_served > 0.0 { 0.0 } else { 100.0 },
            monthly_salary: salary,
            total_salaries: 0.0,
        });
    }

    let actual = customers_served / employees as f64;
    let ratio = actual / ideal;
    let productivity = (100.0 * ratio).min(100.0);
    let salary_score = salary_morale(salary, median_household_income);
    let workload_score = workload_morale(ratio);
    let overworked = ratio > OVERWORK_THRESHOLD;
    let penalty = if overworked { OVERWORK_PENALTY } else { 0.0 };
    let morale =
        (SALARY_WEIGHT * salary_score + WORKLOAD_WEIGHT * workload_score - penalty).clamp(0.0, 100.0);
    let service_quality = if ratio <= 1.0 {
        100.0
    } else {
        (100.0 - (ratio - 1.0) * 100.0).clamp(0.0, 100.0)
    };

    Ok(EmployeeResult {
        employees,
        ideal_load: ideal,
        actual_load: actual,
        load_ratio: ratio,
        productivity,
        salary_morale: salary_score,
        workload_morale: workload_score,
        morale,
        overworked,
        service_quality,
        monthly_salary: salary,
        total_salaries: (employees as f64 * salary).max(0.0),
    })
}
