//! CLI definition and dispatch.

use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use crate::adapters::csv_adapter::CsvDataAdapter;
use crate::adapters::csv_series_adapter::CsvSeriesAdapter;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::adapters::svg_chart_adapter::SvgChartAdapter;
use crate::adapters::text_report_adapter::TextReportAdapter;
use crate::domain::backtest::{run_backtest, BacktestResult};
use crate::domain::config_validation::build_context;
use crate::domain::context::Context;
use crate::domain::error::SigtraderError;
use crate::domain::frame::PriceMatrix;
use crate::domain::timeseries::TimeSeries;
use crate::ports::data_port::DataHandler;
use crate::ports::render_port::RenderPort;
use crate::ports::report_port::ReportPort;

#[derive(Parser, Debug)]
#[command(name = "sigtrader", about = "Signal-driven portfolio backtester")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run a backtest
    Backtest {
        #[arg(short, long)]
        config: PathBuf,
        /// Overrides [report] output_dir
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Write the report log, series and charts to the output directory
        #[arg(long)]
        save: bool,
        #[arg(short, long)]
        verbose: bool,
        /// Validate and print the resolved run without reading any data
        #[arg(long)]
        dry_run: bool,
    },
    /// Validate a configuration file
    Validate {
        #[arg(short, long)]
        config: PathBuf,
    },
}

/// Flag values that take precedence over the `[report]` section.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub output: Option<PathBuf>,
    pub save: bool,
    pub verbose: bool,
}

pub fn run(cli: Cli) -> ExitCode {
    match cli.command {
        Command::Backtest {
            config,
            output,
            save,
            verbose,
            dry_run,
        } => {
            let overrides = Overrides {
                output,
                save,
                verbose,
            };
            if dry_run {
                run_dry_run(&config, &overrides)
            } else {
                run_backtest_command(&config, &overrides)
            }
        }
        Command::Validate { config } => run_validate(&config),
    }
}

/// Installs the stderr log subscriber. `RUST_LOG` wins over `verbose`.
pub fn init_tracing(verbose: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(if verbose { "debug" } else { "info" }));
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .finish();
    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        tracing::debug!("keeping the installed log subscriber: {e}");
    }
}

/// Load the INI file, build the context and apply flag overrides.
pub fn load_context(config_path: &Path, overrides: &Overrides) -> Result<Context, SigtraderError> {
    let adapter = FileConfigAdapter::from_file(config_path)?;
    let mut ctx = build_context(&adapter)?;
    if let Some(dir) = &overrides.output {
        ctx.output.output_dir = dir.clone();
    }
    ctx.output.save |= overrides.save;
    ctx.output.verbose |= overrides.verbose;
    Ok(ctx)
}

/// Logs the error and maps it to the process exit code.
fn fail(err: &SigtraderError) -> ExitCode {
    tracing::error!("{err}");
    err.into()
}

/// Context with tracing installed at the level it asks for. On failure the
/// subscriber falls back to the flag level so the error is still logged.
fn start(config_path: &Path, overrides: &Overrides) -> Result<Context, ExitCode> {
    match load_context(config_path, overrides) {
        Ok(ctx) => {
            init_tracing(ctx.output.verbose);
            tracing::info!(config = %config_path.display(), "configuration loaded");
            Ok(ctx)
        }
        Err(e) => {
            init_tracing(overrides.verbose);
            Err(fail(&e))
        }
    }
}

pub fn run_dry_run(config_path: &Path, overrides: &Overrides) -> ExitCode {
    let ctx = match start(config_path, overrides) {
        Ok(ctx) => ctx,
        Err(code) => return code,
    };
    if let Err(e) = ctx.strategy.build() {
        return fail(&e);
    }

    println!("{ctx}");
    println!("dry run: configuration valid, no data read");
    ExitCode::SUCCESS
}

fn run_validate(config_path: &Path) -> ExitCode {
    let ctx = match start(config_path, &Overrides::default()) {
        Ok(ctx) => ctx,
        Err(code) => return code,
    };
    match ctx.strategy.build() {
        Ok(strategy) => {
            println!(
                "{}: valid ({}, {} symbols)",
                config_path.display(),
                strategy.name(),
                ctx.symbols.len()
            );
            ExitCode::SUCCESS
        }
        Err(e) => fail(&e),
    }
}

fn run_backtest_command(config_path: &Path, overrides: &Overrides) -> ExitCode {
    let ctx = match start(config_path, overrides) {
        Ok(ctx) => ctx,
        Err(code) => return code,
    };

    let data = CsvDataAdapter::new(ctx.data_dir.clone());
    let csv_series = CsvSeriesAdapter::new();
    let charts = SvgChartAdapter::new();
    let renderers: [&dyn RenderPort; 2] = [&csv_series, &charts];

    match run_backtest_pipeline(&ctx, &data, &TextReportAdapter::new(), &renderers) {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => fail(&e),
    }
}

/// Benchmark prices: reuse the traded column when the benchmark is one of
/// the symbols, otherwise fetch it on its own.
fn benchmark_prices(
    ctx: &Context,
    prices: &PriceMatrix,
    data: &dyn DataHandler,
) -> Result<TimeSeries, SigtraderError> {
    if let Some(col) = prices.symbols().iter().position(|s| *s == ctx.benchmark) {
        return Ok(prices.series(col));
    }
    let fetched = data.fetch(
        std::slice::from_ref(&ctx.benchmark),
        ctx.start_date,
        ctx.end_date,
        ctx.frequency,
    )?;
    match fetched.symbols().iter().position(|s| *s == ctx.benchmark) {
        Some(col) => Ok(fetched.series(col)),
        None => Err(SigtraderError::missing_data(format!(
            "benchmark {}",
            ctx.benchmark
        ))),
    }
}

/// Fetch, backtest, print the report and, when saving, hand it to the
/// report and render collaborators.
pub fn run_backtest_pipeline(
    ctx: &Context,
    data: &dyn DataHandler,
    report_port: &dyn ReportPort,
    renderers: &[&dyn RenderPort],
) -> Result<BacktestResult, SigtraderError> {
    tracing::info!(symbols = %ctx.symbols.join(","), "fetching prices");
    let prices = data.fetch(&ctx.symbols, ctx.start_date, ctx.end_date, ctx.frequency)?;
    let benchmark = benchmark_prices(ctx, &prices, data)?;

    let result = run_backtest(ctx, &prices, &benchmark)?;

    for line in result.report.log_lines() {
        println!("{line}");
    }

    if ctx.output.save {
        let dir = &ctx.output.output_dir;
        report_port.write(&result.report, dir)?;
        for renderer in renderers {
            let files = renderer.render(&result.report.series, dir)?;
            tracing::info!(files = files.len(), dir = %dir.display(), "rendered");
        }
    } else {
        tracing::debug!("save disabled, nothing written");
    }

    Ok(result)
}
