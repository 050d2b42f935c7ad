#[macro_use]
mod log_macros;

pub mod adapter;
pub mod error;
pub mod job;
pub mod loader;
pub mod render;
pub mod timespec;
pub mod tracing_init;

pub use adapter::run_rollup;
pub use error::{RuntimeError, RuntimeReason, RuntimeResult};
pub use job::{resolve_options, run_job};
pub use loader::load_records;
pub use render::{render_json, render_table};
pub use timespec::parse_time_spec;
