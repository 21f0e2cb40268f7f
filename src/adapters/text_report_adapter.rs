//! Plain-text report log.

use crate::domain::error::SigtraderError;
use crate::domain::report::PerformanceReport;
use crate::ports::report_port::ReportPort;
use std::fs;
use std::path::Path;

pub const LOG_FILE: &str = "log.txt";

pub struct TextReportAdapter;

impl TextReportAdapter {
    pub fn new() -> Self {
        Self
    }
}

impl Default for TextReportAdapter {
    fn default() -> Self {
        Self::new()
    }
}

impl ReportPort for TextReportAdapter {
    fn write(&self, report: &PerformanceReport, output_dir: &Path) -> Result<(), SigtraderError> {
        fs::create_dir_all(output_dir)?;
        let path = output_dir.join(LOG_FILE);

        let mut text = report.log_lines().join("\n");
        text.push('\n');
        fs::write(&path, text)?;

        tracing::info!(path = %path.display(), "report log written");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::report::{MetricValue, ReportRecord, ReportSeries};
    use crate::domain::timeseries::TimeSeries;
    use chrono::NaiveDate;
    use tempfile::tempdir;

    fn sample_report() -> PerformanceReport {
        let day = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        let mut record = ReportRecord::new();
        record.push("Sharpe ratio", MetricValue::Ratio(1.5));
        record.push("Beta", MetricValue::Undefined);
        let empty = TimeSeries::new(vec![], vec![]).unwrap();
        PerformanceReport {
            start_date: day,
            end_date: day,
            symbols: vec!["SPY".into()],
            record,
            series: ReportSeries {
                cumulative_returns: empty.clone(),
                benchmark_cumulative_returns: empty.clone(),
                rolling_sharpe: empty.clone(),
                rolling_drawdown: empty.clone(),
                rolling_drawdown_duration: empty.clone(),
                monthly_returns: empty,
                drawdowns_by_magnitude: vec![],
                drawdowns_by_duration: vec![],
            },
        }
    }

    #[test]
    fn write_creates_log_in_nested_dir() {
        let dir = tempdir().unwrap();
        let out = dir.path().join("runs").join("first");

        TextReportAdapter::new().write(&sample_report(), &out).unwrap();

        let contents = fs::read_to_string(out.join(LOG_FILE)).unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines[0], "Start date: 2024-03-01");
        assert_eq!(lines[2], "Symbols: SPY");
        assert_eq!(lines[3], "Sharpe ratio         1.50");
        assert_eq!(lines[4], "Beta                 undefined");
    }

    #[test]
    fn write_overwrites_previous_log() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join(LOG_FILE), "stale\n").unwrap();

        TextReportAdapter::new()
            .write(&sample_report(), dir.path())
            .unwrap();

        let contents = fs::read_to_string(dir.path().join(LOG_FILE)).unwrap();
        assert!(!contents.contains("stale"));
    }
}
