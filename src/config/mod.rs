//! Configuration loading from TOML files.

mod logging;
mod monitor;
mod settings;

pub use logging::{LogFormat, LoggingConfig};
pub use monitor::{IntervalPolicy, MonitorConfig};
pub use settings::Config;
