//! sigtrader: signal-driven portfolio backtester.
//!
//! Hexagonal architecture: domain logic in [`domain`], port traits in [`ports`],
//! filesystem implementations in [`adapters`], argument parsing in [`cli`].

pub mod adapters;
pub mod cli;
pub mod domain;
pub mod ports;
