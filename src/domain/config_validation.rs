//! Configuration validation.
//!
//! Reads every section through a [`ConfigPort`] and builds the immutable
//! [`Context`]. Strategy parameters are only checked for shape here; a
//! missing required parameter surfaces when the strategy is constructed.
//! Combinations that no data could make valid (wrong symbol count, a hedge
//! portfolio without a hedging strategy) are rejected up front.

use crate::domain::context::{Context, OutputOptions, DEFAULT_RISK_FREE_RATE};
use crate::domain::error::SigtraderError;
use crate::domain::frequency::Frequency;
use crate::domain::portfolio::PortfolioKind;
use crate::domain::strategy::{HedgeWindow, StrategyConfig};
use crate::ports::config_port::ConfigPort;
use chrono::NaiveDate;
use std::collections::HashSet;
use std::path::PathBuf;
use std::str::FromStr;

pub fn build_context(config: &dyn ConfigPort) -> Result<Context, SigtraderError> {
    let symbols = parse_symbols(config)?;
    let benchmark = match non_empty(config, "backtest", "benchmark") {
        Some(b) => b.to_uppercase(),
        None => symbols[0].clone(),
    };
    let (start_date, end_date) = validate_dates(config)?;
    let frequency = parse_frequency(config)?;
    let risk_free_rate = validate_risk_free_rate(config)?;
    let data_dir = non_empty(config, "backtest", "data_dir")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("data"));

    let ctx = Context {
        symbols,
        benchmark,
        start_date,
        end_date,
        frequency,
        risk_free_rate,
        data_dir,
        strategy: parse_strategy(config)?,
        portfolio: parse_portfolio(config)?,
        output: parse_output(config)?,
    };
    check_compatibility(&ctx)?;
    Ok(ctx)
}

/// Strategy, portfolio and symbol list must fit together.
pub fn check_compatibility(ctx: &Context) -> Result<(), SigtraderError> {
    ctx.strategy.check_symbols(&ctx.symbols)?;
    if ctx.portfolio == PortfolioKind::HedgeRatioWeights && !ctx.strategy.estimates_hedge_ratio() {
        return Err(invalid(
            "portfolio",
            "kind",
            format!(
                "hedge_ratio_weights needs a strategy that estimates a hedge ratio, got {}",
                ctx.strategy.kind()
            ),
        ));
    }
    Ok(())
}

fn non_empty(config: &dyn ConfigPort, section: &str, key: &str) -> Option<String> {
    config
        .get_string(section, key)
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

fn invalid(section: &str, key: &str, reason: impl Into<String>) -> SigtraderError {
    SigtraderError::ConfigInvalid {
        section: section.to_string(),
        key: key.to_string(),
        reason: reason.into(),
    }
}

/// Parse an optional key with `FromStr`; present but unparsable is invalid.
fn parse_opt<T: FromStr>(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
) -> Result<Option<T>, SigtraderError> {
    match non_empty(config, section, key) {
        None => Ok(None),
        Some(s) => s
            .parse::<T>()
            .map(Some)
            .map_err(|_| invalid(section, key, format!("cannot parse '{}'", s))),
    }
}

pub fn parse_symbol_list(input: &str) -> Result<Vec<String>, SigtraderError> {
    let mut symbols = Vec::new();
    let mut seen = HashSet::new();

    for token in input.split(',') {
        let trimmed = token.trim();
        if trimmed.is_empty() {
            return Err(invalid("backtest", "symbols", "empty token in symbol list"));
        }
        let symbol = trimmed.to_uppercase();
        if !seen.insert(symbol.clone()) {
            return Err(invalid(
                "backtest",
                "symbols",
                format!("duplicate symbol {}", symbol),
            ));
        }
        symbols.push(symbol);
    }

    Ok(symbols)
}

fn parse_symbols(config: &dyn ConfigPort) -> Result<Vec<String>, SigtraderError> {
    let raw = non_empty(config, "backtest", "symbols").ok_or_else(|| {
        SigtraderError::ConfigMissing {
            section: "backtest".to_string(),
            key: "symbols".to_string(),
        }
    })?;
    parse_symbol_list(&raw)
}

fn validate_dates(config: &dyn ConfigPort) -> Result<(NaiveDate, NaiveDate), SigtraderError> {
    let start_str = config.get_string("backtest", "start_date");
    let end_str = config.get_string("backtest", "end_date");

    let start_date = parse_date(start_str.as_deref(), "start_date")?;
    let end_date = parse_date(end_str.as_deref(), "end_date")?;

    if start_date >= end_date {
        return Err(invalid(
            "backtest",
            "start_date",
            "start_date must be before end_date",
        ));
    }
    Ok((start_date, end_date))
}

fn parse_date(value: Option<&str>, field: &str) -> Result<NaiveDate, SigtraderError> {
    match value {
        None => Err(SigtraderError::ConfigMissing {
            section: "backtest".to_string(),
            key: field.to_string(),
        }),
        Some(s) => NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d").map_err(|_| {
            invalid(
                "backtest",
                field,
                format!("invalid {} format, expected YYYY-MM-DD", field),
            )
        }),
    }
}

/// Unknown names raise `UnknownFrequency`, not a generic config error.
fn parse_frequency(config: &dyn ConfigPort) -> Result<Frequency, SigtraderError> {
    match non_empty(config, "backtest", "frequency") {
        None => Ok(Frequency::Daily),
        Some(s) => s.parse(),
    }
}

fn validate_risk_free_rate(config: &dyn ConfigPort) -> Result<f64, SigtraderError> {
    let value = parse_opt::<f64>(config, "backtest", "risk_free_rate")?
        .unwrap_or(DEFAULT_RISK_FREE_RATE);
    if !(0.0..1.0).contains(&value) {
        return Err(invalid(
            "backtest",
            "risk_free_rate",
            "risk_free_rate must be between 0 and 1",
        ));
    }
    Ok(value)
}

fn parse_strategy(config: &dyn ConfigPort) -> Result<StrategyConfig, SigtraderError> {
    let kind = non_empty(config, "strategy", "kind").ok_or_else(|| {
        SigtraderError::ConfigMissing {
            section: "strategy".to_string(),
            key: "kind".to_string(),
        }
    })?;

    match kind.to_ascii_lowercase().as_str() {
        "buy_and_hold" => Ok(StrategyConfig::BuyAndHold),
        "ma_crossover" => Ok(StrategyConfig::MovingAverageCrossover {
            short_window: parse_opt(config, "strategy", "short_window")?,
            long_window: parse_opt(config, "strategy", "long_window")?,
        }),
        "mean_reversion_pairs" => Ok(StrategyConfig::MeanReversionPairs {
            window: parse_opt::<HedgeWindow>(config, "strategy", "window")?,
            z_entry: parse_opt(config, "strategy", "z_entry")?,
            z_exit: parse_opt(config, "strategy", "z_exit")?,
        }),
        other => Err(invalid(
            "strategy",
            "kind",
            format!(
                "unknown strategy '{}' (expected buy_and_hold, ma_crossover or mean_reversion_pairs)",
                other
            ),
        )),
    }
}

fn parse_portfolio(config: &dyn ConfigPort) -> Result<PortfolioKind, SigtraderError> {
    match non_empty(config, "portfolio", "kind") {
        None => Ok(PortfolioKind::default()),
        Some(s) => s
            .parse()
            .map_err(|_| invalid("portfolio", "kind", format!("unknown portfolio '{}'", s))),
    }
}

fn parse_output(config: &dyn ConfigPort) -> Result<OutputOptions, SigtraderError> {
    let defaults = OutputOptions::default();
    let top_drawdowns =
        parse_opt::<usize>(config, "report", "top_drawdowns")?.unwrap_or(defaults.top_drawdowns);
    let rolling_window =
        parse_opt::<usize>(config, "report", "rolling_window")?.unwrap_or(defaults.rolling_window);
    if rolling_window < 2 {
        return Err(invalid(
            "report",
            "rolling_window",
            "rolling_window must be at least 2",
        ));
    }
    Ok(OutputOptions {
        output_dir: non_empty(config, "report", "output_dir")
            .map(PathBuf::from)
            .unwrap_or(defaults.output_dir),
        save: config.get_bool("report", "save", defaults.save),
        verbose: config.get_bool("report", "verbose", defaults.verbose),
        top_drawdowns,
        rolling_window,
    })
}
