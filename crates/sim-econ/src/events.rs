//! Seasonal market events by category and calendar month.

use serde::{Deserialize, Serialize};
use sim_core::{BusinessCategory, ValidationError};

use crate::EconError;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    HolidaySeason,
    SummerSlowdown,
    BackToSchool,
    NewYearResolutions,
    PatioSeason,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MarketEvent {
    pub kind: EventKind,
    /// Multiplier on demand while the event is active.
    pub demand_modifier: f64,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct EventsResult {
    pub events: Vec<MarketEvent>,
}

impl EventsResult {
    /// Product of all active modifiers; 1.0 when nothing is active.
    pub fn demand_factor(&self) -> f64 {
        self.events.iter().map(|e| e.demand_modifier).product()
    }
}

fn modifier(kind: EventKind, category: BusinessCategory) -> Option<f64> {
    use BusinessCategory::*;
    match (kind, category) {
        (EventKind::HolidaySeason, Retail | Bakery | Grocery) => Some(1.15),
        (EventKind::HolidaySeason, Restaurant | Bar | Coffee) => Some(1.08),
        (EventKind::HolidaySeason, Salon) => Some(1.10),
        (EventKind::HolidaySeason, Fitness) => Some(0.90),
        (EventKind::SummerSlowdown, ProfessionalServices) => Some(0.85),
        (EventKind::SummerSlowdown, Fitness) => Some(0.92),
        (EventKind::BackToSchool, Retail | Coffee | Salon) => Some(1.05),
        (EventKind::NewYearResolutions, Fitness) => Some(1.25),
        (EventKind::NewYearResolutions, Bar | Bakery) => Some(0.92),
        (EventKind::PatioSeason, Restaurant | Bar) => Some(1.07),
        _ => None,
    }
}

fn calendar(month: u32) -> &'static [EventKind] {
    match month {
        1 => &[EventKind::NewYearResolutions],
        5 | 6 => &[EventKind::PatioSeason],
        7 | 8 => &[EventKind::SummerSlowdown, EventKind::PatioSeason],
        9 => &[EventKind::BackToSchool],
        11 | 12 => &[EventKind::HolidaySeason],
        _ => &[],
    }
}

/// Events active for a category in a calendar month.
pub fn analyze(month: u32, category: BusinessCategory) -> Result<EventsResult, EconError> {
    if !(1..=12).contains(&month) {
        return Err(ValidationError::InvalidMonth(month).into());
    }
    let events = calendar(month)
        .iter()
        .filter_map(|&kind| {
            modifier(kind, category).map(|demand_modifier| MarketEvent {
                kind,
                demand_modifier,
            })
        })
        .collect();
    Ok(EventsResult { events })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gyms_peak_in_january() {
        let r = analyze(1, BusinessCategory::Fitness).unwrap();
        assert_eq!(r.events.len(), 1);
        assert_eq!(r.events[0].kind, EventKind::NewYearResolutions);
        assert!((r.demand_factor() - 1.25).abs() < 1e-12);
    }

    #[test]
    fn quiet_month_is_neutral() {
        let r = analyze(3, BusinessCategory::Restaurant).unwrap();
        assert!(r.events.is_empty());
        assert_eq!(r.demand_factor(), 1.0);
    }

    #[test]
    fn modifiers_compose() {
        let r = analyze(7, BusinessCategory::Bar).unwrap();
        assert_eq!(r.events.len(), 1);
        let f = analyze(7, BusinessCategory::Fitness).unwrap();
        assert!((f.demand_factor() - 0.92).abs() < 1e-12);
    }

    #[test]
    fn invalid_month_rejected() {
        assert!(analyze(0, BusinessCategory::Retail).is_err());
    }
}
