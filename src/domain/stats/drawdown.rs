//! Drawdown series and underwater episodes derived from cumulative returns.
//!
//! drawdown[t] = (1 + runningmax(cumret)[t]) / (1 + cumret[t]) - 1
//! duration[t] = duration[t-1] + 1 while drawdown[t] > 0, else 0
//!
//! Timestamps with a missing cumulative return are skipped: their drawdown
//! and duration are missing and they neither extend nor break a run.

use super::rolling::rolling_max;
use crate::domain::timeseries::TimeSeries;
use chrono::NaiveDate;
use std::cmp::Ordering;

/// One contiguous underwater period.
///
/// `end` is the first timestamp back at a peak, or the last observed
/// timestamp when the series finishes underwater (`recovered == false`).
/// `peak` is the largest drawdown magnitude or duration seen in the run.
#[derive(Debug, Clone, PartialEq)]
pub struct DrawdownEpisode<T> {
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub peak: T,
    pub recovered: bool,
}

pub fn rolling_drawdown(cumret: &TimeSeries) -> TimeSeries {
    let peak = rolling_max(cumret);
    let values = cumret
        .values()
        .iter()
        .zip(peak.values())
        .map(|(c, m)| Some((1.0 + (*m)?) / (1.0 + (*c)?) - 1.0))
        .collect();
    cumret.with_values(values)
}

fn durations(drawdown: &[Option<f64>]) -> Vec<Option<usize>> {
    let mut run = 0usize;
    drawdown
        .iter()
        .map(|dd| {
            let dd = (*dd)?;
            run = if dd > 0.0 { run + 1 } else { 0 };
            Some(run)
        })
        .collect()
}

/// Consecutive underwater periods at each timestamp, as whole numbers.
pub fn rolling_drawdown_duration(cumret: &TimeSeries) -> TimeSeries {
    let dd = rolling_drawdown(cumret);
    let values = durations(dd.values())
        .into_iter()
        .map(|d| d.map(|d| d as f64))
        .collect();
    cumret.with_values(values)
}

pub fn max_drawdown(cumret: &TimeSeries) -> Option<f64> {
    rolling_drawdown(cumret)
        .values()
        .iter()
        .flatten()
        .copied()
        .max_by(f64::total_cmp)
}

pub fn max_drawdown_duration(cumret: &TimeSeries) -> Option<usize> {
    durations(rolling_drawdown(cumret).values())
        .into_iter()
        .flatten()
        .max()
}

struct OpenRun {
    start: NaiveDate,
    last: NaiveDate,
    max_dd: f64,
    max_duration: usize,
}

/// Underwater episodes ranked by magnitude and by duration, both descending.
///
/// Ties keep chronological order, so the earlier episode ranks first.
pub fn sort_drawdowns(
    cumret: &TimeSeries,
) -> (Vec<DrawdownEpisode<f64>>, Vec<DrawdownEpisode<usize>>) {
    let dd = rolling_drawdown(cumret);
    let ddd = durations(dd.values());

    let mut by_magnitude = Vec::new();
    let mut by_duration = Vec::new();
    let mut open: Option<OpenRun> = None;

    let mut close = |run: OpenRun, end: NaiveDate, recovered: bool| {
        by_magnitude.push(DrawdownEpisode {
            start: run.start,
            end,
            peak: run.max_dd,
            recovered,
        });
        by_duration.push(DrawdownEpisode {
            start: run.start,
            end,
            peak: run.max_duration,
            recovered,
        });
    };

    for (i, date) in cumret.index().iter().copied().enumerate() {
        let (Some(depth), Some(duration)) = (dd.get(i), ddd[i]) else {
            continue;
        };
        if duration == 0 {
            if let Some(run) = open.take() {
                close(run, date, true);
            }
            continue;
        }
        match open.as_mut() {
            Some(run) => {
                run.last = date;
                run.max_dd = run.max_dd.max(depth);
                run.max_duration = run.max_duration.max(duration);
            }
            None => {
                open = Some(OpenRun {
                    start: date,
                    last: date,
                    max_dd: depth,
                    max_duration: duration,
                });
            }
        }
    }
    if let Some(run) = open.take() {
        let last = run.last;
        close(run, last, false);
    }

    by_magnitude.sort_by(|a, b| b.peak.partial_cmp(&a.peak).unwrap_or(Ordering::Equal));
    by_duration.sort_by(|a, b| b.peak.cmp(&a.peak));
    (by_magnitude, by_duration)
}

#[cfg(test)]
mod tests {
    use super::super::test_support::*;
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn drawdown_series_example() {
        let cumret = ts_full(&[0.0, 0.05, 0.02, 0.08]);
        let dd = rolling_drawdown(&cumret);
        assert_eq!(dd.get(0), Some(0.0));
        assert_eq!(dd.get(1), Some(0.0));
        assert_abs_diff_eq!(dd.get(2).unwrap(), 1.05 / 1.02 - 1.0, epsilon = 1e-12);
        assert_eq!(dd.get(3), Some(0.0));

        let ddd = rolling_drawdown_duration(&cumret);
        assert_eq!(ddd.values(), &[Some(0.0), Some(0.0), Some(1.0), Some(0.0)]);

        assert_abs_diff_eq!(max_drawdown(&cumret).unwrap(), 0.0294, epsilon = 1e-4);
        assert_eq!(max_drawdown_duration(&cumret), Some(1));
    }

    #[test]
    fn duration_accumulates_until_new_peak() {
        let cumret = ts_full(&[0.0, 0.10, 0.05, 0.0, 0.02, 0.12]);
        let ddd = rolling_drawdown_duration(&cumret);
        assert_eq!(
            ddd.values(),
            &[Some(0.0), Some(0.0), Some(1.0), Some(2.0), Some(3.0), Some(0.0)]
        );
    }

    #[test]
    fn missing_points_do_not_break_run() {
        let cumret = ts(&[Some(0.0), Some(0.10), Some(0.05), None, Some(0.04), Some(0.2)]);
        let ddd = rolling_drawdown_duration(&cumret);
        assert_eq!(
            ddd.values(),
            &[Some(0.0), Some(0.0), Some(1.0), None, Some(2.0), Some(0.0)]
        );

        let (by_mag, by_dur) = sort_drawdowns(&cumret);
        assert_eq!(by_mag.len(), 1);
        assert_eq!(by_mag[0].start, day(2));
        assert_eq!(by_mag[0].end, day(5));
        assert!(by_mag[0].recovered);
        assert_abs_diff_eq!(by_mag[0].peak, 1.10 / 1.04 - 1.0, epsilon = 1e-12);
        assert_eq!(by_dur[0].peak, 2);
    }

    #[test]
    fn episodes_sorted_descending() {
        // shallow-but-long run, then deep-but-short run
        let cumret = ts_full(&[0.0, 0.10, 0.09, 0.08, 0.09, 0.11, 0.00, 0.12]);
        let (by_mag, by_dur) = sort_drawdowns(&cumret);

        assert_eq!(by_mag.len(), 2);
        assert_eq!(by_mag[0].start, day(6));
        assert_eq!(by_mag[0].end, day(7));
        assert_abs_diff_eq!(by_mag[0].peak, 1.11 - 1.0, epsilon = 1e-12);
        assert_eq!(by_mag[1].start, day(2));
        assert_eq!(by_mag[1].end, day(5));

        assert_eq!(by_dur[0].start, day(2));
        assert_eq!(by_dur[0].peak, 3);
        assert_eq!(by_dur[1].peak, 1);
    }

    #[test]
    fn ties_rank_earlier_episode_first() {
        let cumret = ts_full(&[0.0, -0.1, 0.0, -0.1, 0.0]);
        let (by_mag, by_dur) = sort_drawdowns(&cumret);
        assert_eq!(by_mag.len(), 2);
        assert_eq!(by_mag[0].start, day(1));
        assert_eq!(by_mag[1].start, day(3));
        assert_eq!(by_dur[0].start, day(1));
        assert_eq!(by_dur[1].start, day(3));
    }

    #[test]
    fn unrecovered_episode_is_kept() {
        let cumret = ts_full(&[0.0, 0.1, 0.0, -0.05]);
        let (by_mag, by_dur) = sort_drawdowns(&cumret);
        assert_eq!(by_mag.len(), 1);
        assert!(!by_mag[0].recovered);
        assert_eq!(by_mag[0].start, day(2));
        assert_eq!(by_mag[0].end, day(3));
        assert_eq!(by_dur[0].peak, 2);
    }

    #[test]
    fn no_drawdown_no_episodes() {
        let cumret = ts_full(&[0.0, 0.01, 0.02]);
        let (by_mag, by_dur) = sort_drawdowns(&cumret);
        assert!(by_mag.is_empty());
        assert!(by_dur.is_empty());
        assert_eq!(max_drawdown(&cumret), Some(0.0));
        assert_eq!(max_drawdown_duration(&cumret), Some(0));
    }
}
