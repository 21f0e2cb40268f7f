//! SVG charts: equity curve against the benchmark, and underwater drawdown.

use crate::domain::error::SigtraderError;
use crate::domain::report::ReportSeries;
use crate::domain::timeseries::TimeSeries;
use crate::ports::render_port::RenderPort;
use std::fs;
use std::path::{Path, PathBuf};

const WIDTH: f64 = 500.0;
const HEIGHT: f64 = 200.0;
const PADDING: f64 = 40.0;

pub const EQUITY_CHART: &str = "equity_curve.svg";
pub const DRAWDOWN_CHART: &str = "drawdown.svg";

/// Vertical extent shared by every line in one chart.
#[derive(Debug, Clone, Copy)]
struct Range {
    min: f64,
    max: f64,
}

impl Range {
    fn of(lines: &[&[Option<f64>]]) -> Option<Self> {
        let mut values = lines.iter().flat_map(|l| l.iter().flatten().copied());
        let first = values.next()?;
        let (min, max) = values.fold((first, first), |(lo, hi), v| (lo.min(v), hi.max(v)));
        Some(Self { min, max })
    }
}

/// Polyline points for one line. Missing observations are skipped, so the
/// line joins its neighbours.
fn polyline_points(values: &[Option<f64>], range: Range) -> String {
    let plot_width = WIDTH - 2.0 * PADDING;
    let plot_height = HEIGHT - 2.0 * PADDING;

    let span = range.max - range.min;
    let scale_y = if span > 0.0 { plot_height / span } else { 1.0 };
    let scale_x = if values.len() > 1 {
        plot_width / (values.len() - 1) as f64
    } else {
        0.0
    };

    values
        .iter()
        .enumerate()
        .filter_map(|(i, v)| {
            let v = (*v)?;
            let x = PADDING + i as f64 * scale_x;
            let y = HEIGHT - PADDING - (v - range.min) * scale_y;
            Some(format!("{:.1},{:.1}", x, y))
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn axis_label(series: &TimeSeries) -> String {
    match (series.first_date(), series.last_date()) {
        (Some(start), Some(end)) => format!("{} to {}", start, end),
        _ => String::new(),
    }
}

/// Wraps one or more `(colour, values)` lines in an SVG document with axes.
fn chart(title: &str, subtitle: &str, lines: &[(&str, &[Option<f64>])]) -> String {
    let mut svg = format!(
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w:.0}" height="{h:.0}" viewBox="0 0 {w:.0} {h:.0}">
<rect width="{w:.0}" height="{h:.0}" fill="white"/>
<text x="{p:.0}" y="{ty:.0}" font-size="12" font-family="sans-serif">{title}</text>
<line x1="{p:.0}" y1="{p:.0}" x2="{p:.0}" y2="{b:.0}" stroke="black"/>
<line x1="{p:.0}" y1="{b:.0}" x2="{r:.0}" y2="{b:.0}" stroke="black"/>
<text x="{p:.0}" y="{ly:.0}" font-size="10" font-family="sans-serif">{subtitle}</text>
"#,
        w = WIDTH,
        h = HEIGHT,
        p = PADDING,
        b = HEIGHT - PADDING,
        r = WIDTH - PADDING,
        ty = PADDING / 2.0,
        ly = HEIGHT - PADDING / 4.0,
        title = title,
        subtitle = subtitle,
    );

    let values: Vec<&[Option<f64>]> = lines.iter().map(|(_, v)| *v).collect();
    match Range::of(&values) {
        Some(range) => {
            for (colour, v) in lines {
                svg.push_str(&format!(
                    "<polyline fill=\"none\" stroke=\"{}\" stroke-width=\"1\" points=\"{}\"/>\n",
                    colour,
                    polyline_points(v, range)
                ));
            }
        }
        None => svg.push_str(&format!(
            "<text x=\"{:.0}\" y=\"{:.0}\" font-size=\"10\" font-family=\"sans-serif\">No data available.</text>\n",
            WIDTH / 2.0 - PADDING,
            HEIGHT / 2.0
        )),
    }

    svg.push_str("</svg>\n");
    svg
}

pub fn equity_chart(strategy: &TimeSeries, benchmark: &TimeSeries) -> String {
    chart(
        "Cumulative return (blue: strategy, grey: benchmark)",
        &axis_label(strategy),
        &[("grey", benchmark.values()), ("blue", strategy.values())],
    )
}

/// Drawdown is plotted below zero so the chart reads as an underwater curve.
pub fn drawdown_chart(drawdown: &TimeSeries) -> String {
    let underwater: Vec<Option<f64>> = drawdown.values().iter().map(|v| v.map(|d| -d)).collect();
    chart("Drawdown", &axis_label(drawdown), &[("red", underwater.as_slice())])
}

pub struct SvgChartAdapter;

impl SvgChartAdapter {
    pub fn new() -> Self {
        Self
    }
}

impl Default for SvgChartAdapter {
    fn default() -> Self {
        Self::new()
    }
}

impl RenderPort for SvgChartAdapter {
    fn render(
        &self,
        series: &ReportSeries,
        output_dir: &Path,
    ) -> Result<Vec<PathBuf>, SigtraderError> {
        fs::create_dir_all(output_dir)?;

        let equity = output_dir.join(EQUITY_CHART);
        fs::write(
            &equity,
            equity_chart(
                &series.cumulative_returns,
                &series.benchmark_cumulative_returns,
            ),
        )?;

        let drawdown = output_dir.join(DRAWDOWN_CHART);
        fs::write(&drawdown, drawdown_chart(&series.rolling_drawdown))?;

        tracing::debug!(dir = %output_dir.display(), "charts rendered");
        Ok(vec![equity, drawdown])
    }
}
