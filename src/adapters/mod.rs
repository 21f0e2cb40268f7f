//! Filesystem implementations of the ports.

pub mod csv_adapter;
pub mod csv_series_adapter;
pub mod file_config_adapter;
pub mod svg_chart_adapter;
pub mod text_report_adapter;
