//! Per-invocation configuration handed to every command handler

use crate::output::OutputFormat;
use tracing::Level;

/// Build date baked in at compile time
pub const BUILD_DATE: &str = match option_env!("MACCONV_BUILD_DATE") {
    Some(date) => date,
    None => "unknown",
};

/// Settings that used to live in process-wide globals
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub version: &'static str,
    pub build_date: &'static str,
    pub output: OutputFormat,
    pub log_level: Level,
}

impl AppConfig {
    pub fn new(output: OutputFormat, log_level: Level) -> Self {
        Self {
            version: env!("CARGO_PKG_VERSION"),
            build_date: BUILD_DATE,
            output,
            log_level,
        }
    }
}
