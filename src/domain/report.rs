//! Performance report values handed to the report and render ports.

use crate::domain::stats::DrawdownEpisode;
use crate::domain::timeseries::TimeSeries;
use chrono::NaiveDate;
use std::fmt;

/// One formatted metric. Degenerate statistics are `Undefined`, never errors.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MetricValue {
    /// Fraction shown as a percentage with two decimals.
    Percent(f64),
    /// Plain ratio with two decimals.
    Ratio(f64),
    /// Small coefficient shown with four decimals.
    Coefficient(f64),
    /// Whole number of periods.
    Periods(usize),
    Undefined,
}

impl MetricValue {
    pub fn percent(v: Option<f64>) -> Self {
        v.map_or(MetricValue::Undefined, MetricValue::Percent)
    }

    pub fn ratio(v: Option<f64>) -> Self {
        v.map_or(MetricValue::Undefined, MetricValue::Ratio)
    }

    pub fn coefficient(v: Option<f64>) -> Self {
        v.map_or(MetricValue::Undefined, MetricValue::Coefficient)
    }

    pub fn periods(v: Option<usize>) -> Self {
        v.map_or(MetricValue::Undefined, MetricValue::Periods)
    }

    /// Raw value, unscaled. `None` when undefined.
    pub fn value(&self) -> Option<f64> {
        match *self {
            MetricValue::Percent(v) | MetricValue::Ratio(v) | MetricValue::Coefficient(v) => {
                Some(v)
            }
            MetricValue::Periods(n) => Some(n as f64),
            MetricValue::Undefined => None,
        }
    }

    pub fn is_defined(&self) -> bool {
        !matches!(self, MetricValue::Undefined)
    }
}

impl fmt::Display for MetricValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MetricValue::Percent(v) => write!(f, "{:.2}", v * 100.0),
            MetricValue::Ratio(v) => write!(f, "{:.2}", v),
            MetricValue::Coefficient(v) => write!(f, "{:.4}", v),
            MetricValue::Periods(n) => write!(f, "{}", n),
            MetricValue::Undefined => write!(f, "undefined"),
        }
    }
}

/// Metric name to value, in insertion order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReportRecord {
    entries: Vec<(String, MetricValue)>,
}

impl ReportRecord {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, name: impl Into<String>, value: MetricValue) {
        self.entries.push((name.into(), value));
    }

    pub fn get(&self, name: &str) -> Option<MetricValue> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| *v)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, MetricValue)> + '_ {
        self.entries.iter().map(|(n, v)| (n.as_str(), *v))
    }

    pub fn names(&self) -> Vec<&str> {
        self.entries.iter().map(|(n, _)| n.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Derived series for the rendering collaborator.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportSeries {
    pub cumulative_returns: TimeSeries,
    pub benchmark_cumulative_returns: TimeSeries,
    pub rolling_sharpe: TimeSeries,
    pub rolling_drawdown: TimeSeries,
    pub rolling_drawdown_duration: TimeSeries,
    pub monthly_returns: TimeSeries,
    pub drawdowns_by_magnitude: Vec<DrawdownEpisode<f64>>,
    pub drawdowns_by_duration: Vec<DrawdownEpisode<usize>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PerformanceReport {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub symbols: Vec<String>,
    pub record: ReportRecord,
    pub series: ReportSeries,
}

impl PerformanceReport {
    /// Plain-text log: date and symbol header, then one padded line per metric.
    pub fn log_lines(&self) -> Vec<String> {
        let mut lines = vec![
            format!("Start date: {}", self.start_date),
            format!("End date: {}", self.end_date),
            format!("Symbols: {}", self.symbols.join(", ")),
        ];
        lines.extend(
            self.record
                .iter()
                .map(|(name, value)| format!("{:<20.20} {}", name, value)),
        );
        lines
    }
}
