use anyhow::Result;
use shopfront_core::tracing::{InstrumentationConfig, init_tracing};
use std::path::Path;
use tracing::Level;

/// File the CLI tees its log into, relative to the data directory
pub const LOG_FILE_NAME: &str = "cli.log";

/// Initialize logging for the CLI
///
/// `RUST_LOG` overrides `log_level`; `SHOPFRONT_LOG_FILE` overrides the log
/// file location.
pub fn init_logging(log_level: Level, data_dir: &Path, no_file_log: bool) -> Result<()> {
    init_tracing(&instrumentation_config(log_level, data_dir, no_file_log))
}

fn instrumentation_config(log_level: Level, data_dir: &Path, no_file_log: bool) -> InstrumentationConfig {
    let level = log_level.as_str().to_lowercase();
    let filter = format!(
        "shopfront={level},shopfront_core={level},shopfront_http={level},shopfront_frontend_common={level}"
    );

    let env = InstrumentationConfig::from_env();
    let log_file = if no_file_log {
        None
    } else {
        env.log_file
            .clone()
            .or_else(|| Some(data_dir.join(LOG_FILE_NAME)))
    };

    InstrumentationConfig {
        service_name: "shopfront-cli".to_string(),
        ..env
    }
    .with_log_level(filter)
    .with_log_file(log_file)
}
