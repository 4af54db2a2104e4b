//! Trend signal processing for market-interest series.
//!
//! EMA, MACD and RSI, the usual price indicators, applied to a 0-100 interest
//! series to derive a bounded impact score, a momentum label and a confidence
//! level.

use serde::{Deserialize, Serialize};
use sim_core::{InterestSeries, TrendConfig, TrendDirection};

/// Momentum of the interest series.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Momentum {
    Accelerating,
    Stable,
    Decelerating,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Confidence {
    Low,
    Medium,
    High,
}

/// MACD line, its signal line and the histogram between them.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct MacdReading {
    pub macd: f64,
    pub signal: f64,
    pub histogram: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TrendResult {
    /// Impact on demand in [-100, 100].
    pub impact_score: f64,
    pub momentum: Momentum,
    pub confidence: Confidence,
    pub macd: MacdReading,
    /// RSI in [0, 100]; 50 when the series is too short.
    pub rsi: f64,
    pub data_points: usize,
}

impl TrendResult {
    /// Result for an empty series.
    pub fn neutral() -> Self {
        Self {
            impact_score: 0.0,
            momentum: Momentum::Stable,
            confidence: Confidence::Low,
            macd: MacdReading {
                macd: 0.0,
                signal: 0.0,
                histogram: 0.0,
            },
            rsi: 50.0,
            data_points: 0,
        }
    }

    /// Demand multiplier implied by the impact score, within [0.9, 1.1].
    pub fn demand_factor(&self) -> f64 {
        1.0 + self.impact_score / 100.0 * 0.10
    }
}

const DIRECTION_BONUS: f64 = 20.0;
const HISTOGRAM_THRESHOLD: f64 = 0.5;
const RSI_BULLISH: f64 = 55.0;
const RSI_BEARISH: f64 = 45.0;

/// Exponential moving average of `values`.
///
/// The first output is the simple average of the first `period` values; each
/// later value applies `alpha = 2/(period+1)`. The output has
/// `values.len() - period + 1` entries. A series shorter than `period` yields
/// its simple average as the single value, an empty series yields nothing.
pub fn ema(values: &[f64], period: usize) -> Vec<f64> {
    if values.is_empty() || period == 0 {
        return Vec::new();
    }
    if values.len() < period {
        return vec![mean(values)];
    }
    let alpha = 2.0 / (period as f64 + 1.0);
    let mut out = Vec::with_capacity(values.len() - period + 1);
    let mut current = mean(&values[..period]);
    out.push(current);
    for v in &values[period..] {
        current = v * alpha + current * (1.0 - alpha);
        out.push(current);
    }
    out
}

/// MACD of the latest point.
///
/// The signal line is a one-step EMA of the current MACD value seeded at
/// zero, not a rolling series of past MACD values.
pub fn macd(values: &[f64], fast: usize, slow: usize, signal_period: usize) -> MacdReading {
    let fast_ema = ema(values, fast).last().copied().unwrap_or(0.0);
    let slow_ema = ema(values, slow).last().copied().unwrap_or(0.0);
    let line = fast_ema - slow_ema;
    let alpha = 2.0 / (signal_period as f64 + 1.0);
    let signal = line * alpha;
    MacdReading {
        macd: line,
        signal,
        histogram: line - signal,
    }
}

/// RSI over the trailing `period` changes.
///
/// Returns 50 with fewer than `period + 1` points and 100 when the window
/// holds no losses.
pub fn rsi(values: &[f64], period: usize) -> f64 {
    if period == 0 || values.len() < period + 1 {
        return 50.0;
    }
    let window = &values[values.len() - period - 1..];
    let (mut gains, mut losses) = (0.0, 0.0);
    for pair in window.windows(2) {
        let change = pair[1] - pair[0];
        if change > 0.0 {
            gains += change;
        } else {
            losses -= change;
        }
    }
    let avg_gain = gains / period as f64;
    let avg_loss = losses / period as f64;
    if avg_loss == 0.0 {
        return 100.0;
    }
    let rs = avg_gain / avg_loss;
    100.0 - 100.0 / (1.0 + rs)
}

/// Impact score in [-100, 100].
pub fn impact_score(average: f64, peak: f64, direction: TrendDirection) -> f64 {
    let bonus = match direction {
        TrendDirection::Rising => DIRECTION_BONUS,
        TrendDirection::Stable => 0.0,
        TrendDirection::Declining => -DIRECTION_BONUS,
    };
    ((average - 50.0) + bonus + 0.2 * (peak - average)).clamp(-100.0, 100.0)
}

pub fn classify_momentum(histogram: f64, rsi: f64) -> Momentum {
    if histogram > HISTOGRAM_THRESHOLD && rsi > RSI_BULLISH {
        Momentum::Accelerating
    } else if histogram < -HISTOGRAM_THRESHOLD && rsi < RSI_BEARISH {
        Momentum::Decelerating
    } else {
        Momentum::Stable
    }
}

pub fn classify_confidence(data_points: usize, average: f64) -> Confidence {
    if data_points >= 26 && average >= 20.0 {
        Confidence::High
    } else if data_points >= 12 && average >= 10.0 {
        Confidence::Medium
    } else {
        Confidence::Low
    }
}

/// Full trend analysis of an interest series.
pub fn analyze(series: &InterestSeries, cfg: &TrendConfig) -> TrendResult {
    if series.values.is_empty() {
        return TrendResult::neutral();
    }
    let reading = macd(
        &series.values,
        cfg.fast_period,
        cfg.slow_period,
        cfg.signal_period,
    );
    let rsi_value = rsi(&series.values, cfg.rsi_period);
    TrendResult {
        impact_score: impact_score(series.average, series.peak, series.direction),
        momentum: classify_momentum(reading.histogram, rsi_value),
        confidence: classify_confidence(series.values.len(), series.average),
        macd: reading,
        rsi: rsi_value,
        data_points: series.values.len(),
    }
}

fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}
