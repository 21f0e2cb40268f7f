//! Port traits for the collaborators at the edge of the pipeline.

pub mod config_port;
pub mod data_port;
pub mod render_port;
pub mod report_port;
