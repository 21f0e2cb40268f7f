//! Core domain types and logic.

pub mod analyser;
pub mod backtest;
pub mod config_validation;
pub mod context;
pub mod error;
pub mod frame;
pub mod frequency;
pub mod portfolio;
pub mod report;
pub mod signal;
pub mod stats;
pub mod strategy;
pub mod timeseries;
