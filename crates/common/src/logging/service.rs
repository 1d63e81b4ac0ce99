//! Logger setup from the node's `[logging]` config section.

use plasma_config::LoggingConfig;
use tracing::*;

use super::{format_service_name, init, FileLoggingConfig, LogFormat, LoggerConfig};

/// Turns the `[logging]` section into a [`LoggerConfig`].
///
/// Log files are prefixed with `service_base_name` unless the section names
/// a prefix.
pub fn build_logger_config(service_base_name: &str, config: &LoggingConfig) -> LoggerConfig {
    let format = LogFormat::from_json_flag(config.json_format.unwrap_or(false));
    let service_name = format_service_name(service_base_name, config.service_label.as_deref());

    let mut lconfig = LoggerConfig::new(service_name)
        .with_service_version(env!("CARGO_PKG_VERSION").to_owned())
        .with_stdout_format(format)
        .with_directives(config.directives.iter().cloned());

    if let Some(dir) = &config.log_dir {
        let prefix = config
            .log_file_prefix
            .as_deref()
            .unwrap_or(service_base_name)
            .to_owned();
        lconfig =
            lconfig.with_file_logging(FileLoggingConfig::new(dir.clone(), prefix).with_format(format));
    }

    lconfig
}

/// Installs the global subscriber for a binary.
pub fn init_logging_from_config(service_base_name: &str, config: &LoggingConfig) {
    let lconfig = build_logger_config(service_base_name, config);
    let file = lconfig.file.clone();

    init(lconfig);

    if let Some(file) = file {
        info!(
            log_dir = %file.directory.display(),
            log_prefix = %file.file_name_prefix,
            "file logging enabled"
        );
    }
}
