pub mod config;
pub mod logging;
pub mod rollup;
pub mod types;
pub mod validate;

pub use config::RollupConfig;
pub use logging::{LogFormat, LoggingConfig};
pub use rollup::RollupSection;
pub use types::{FcnSetting, FillSetting};
