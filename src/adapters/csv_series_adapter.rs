//! Writes every derived report series to CSV, one file per series.
//!
//! Series files have a `date,value` header with missing values left empty.
//! Episode files list `start,end,<peak>,recovered` in ranked order.

use crate::domain::error::SigtraderError;
use crate::domain::report::ReportSeries;
use crate::domain::stats::DrawdownEpisode;
use crate::domain::timeseries::TimeSeries;
use crate::ports::render_port::RenderPort;
use std::fmt::Display;
use std::fs;
use std::path::{Path, PathBuf};

pub struct CsvSeriesAdapter;

impl CsvSeriesAdapter {
    pub fn new() -> Self {
        Self
    }

    fn write_series(path: &Path, series: &TimeSeries) -> Result<(), SigtraderError> {
        let mut wtr = csv::Writer::from_path(path)?;
        wtr.write_record(["date", "value"])?;
        for (date, value) in series.iter() {
            let value = value.map(|v| v.to_string()).unwrap_or_default();
            wtr.write_record([date.to_string(), value])?;
        }
        wtr.flush()?;
        Ok(())
    }

    fn write_episodes<T: Display>(
        path: &Path,
        peak_column: &str,
        episodes: &[DrawdownEpisode<T>],
    ) -> Result<(), SigtraderError> {
        let mut wtr = csv::Writer::from_path(path)?;
        wtr.write_record(["start", "end", peak_column, "recovered"])?;
        for ep in episodes {
            wtr.write_record([
                ep.start.to_string(),
                ep.end.to_string(),
                ep.peak.to_string(),
                ep.recovered.to_string(),
            ])?;
        }
        wtr.flush()?;
        Ok(())
    }
}

impl Default for CsvSeriesAdapter {
    fn default() -> Self {
        Self::new()
    }
}

impl RenderPort for CsvSeriesAdapter {
    fn render(
        &self,
        series: &ReportSeries,
        output_dir: &Path,
    ) -> Result<Vec<PathBuf>, SigtraderError> {
        fs::create_dir_all(output_dir)?;

        let named: [(&str, &TimeSeries); 6] = [
            ("cumulative_returns", &series.cumulative_returns),
            (
                "benchmark_cumulative_returns",
                &series.benchmark_cumulative_returns,
            ),
            ("rolling_sharpe", &series.rolling_sharpe),
            ("rolling_drawdown", &series.rolling_drawdown),
            ("rolling_drawdown_duration", &series.rolling_drawdown_duration),
            ("monthly_returns", &series.monthly_returns),
        ];

        let mut written = Vec::with_capacity(named.len() + 2);
        for (name, s) in named {
            let path = output_dir.join(format!("{}.csv", name));
            Self::write_series(&path, s)?;
            written.push(path);
        }

        let path = output_dir.join("drawdowns_by_magnitude.csv");
        Self::write_episodes(&path, "magnitude", &series.drawdowns_by_magnitude)?;
        written.push(path);

        let path = output_dir.join("drawdowns_by_duration.csv");
        Self::write_episodes(&path, "duration", &series.drawdowns_by_duration)?;
        written.push(path);

        tracing::debug!(files = written.len(), dir = %output_dir.display(), "series written");
        Ok(written)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use tempfile::tempdir;

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, day).unwrap()
    }

    fn sample_series() -> ReportSeries {
        let cum = TimeSeries::new(vec![d(1), d(2), d(3)], vec![Some(0.0), None, Some(0.05)])
            .unwrap();
        ReportSeries {
            cumulative_returns: cum.clone(),
            benchmark_cumulative_returns: cum.clone(),
            rolling_sharpe: cum.clone(),
            rolling_drawdown: cum.clone(),
            rolling_drawdown_duration: cum.clone(),
            monthly_returns: cum,
            drawdowns_by_magnitude: vec![DrawdownEpisode {
                start: d(2),
                end: d(3),
                peak: 0.25,
                recovered: true,
            }],
            drawdowns_by_duration: vec![DrawdownEpisode {
                start: d(2),
                end: d(3),
                peak: 1,
                recovered: false,
            }],
        }
    }

    #[test]
    fn render_writes_one_file_per_series() {
        let dir = tempdir().unwrap();
        let files = CsvSeriesAdapter::new()
            .render(&sample_series(), dir.path())
            .unwrap();

        assert_eq!(files.len(), 8);
        assert!(files.iter().all(|p| p.exists()));

        let cum = fs::read_to_string(dir.path().join("cumulative_returns.csv")).unwrap();
        assert_eq!(cum, "date,value\n2024-01-01,0\n2024-01-02,\n2024-01-03,0.05\n");
    }

    #[test]
    fn episodes_keep_rank_order_and_recovery_flag() {
        let dir = tempdir().unwrap();
        CsvSeriesAdapter::new()
            .render(&sample_series(), dir.path())
            .unwrap();

        let mag = fs::read_to_string(dir.path().join("drawdowns_by_magnitude.csv")).unwrap();
        assert_eq!(
            mag,
            "start,end,magnitude,recovered\n2024-01-02,2024-01-03,0.25,true\n"
        );
        let dur = fs::read_to_string(dir.path().join("drawdowns_by_duration.csv")).unwrap();
        assert!(dur.ends_with("2024-01-02,2024-01-03,1,false\n"));
    }
}
