//! Logging subsystem built on `tracing-subscriber`.

pub mod manager;
pub mod service;
pub mod types;

#[cfg(test)]
mod tests;

pub use manager::{build_env_filter, init};
pub use service::{build_logger_config, init_logging_from_config};
pub use tracing_appender::rolling::Rotation;
pub use types::{FileLoggingConfig, LogFormat, LoggerConfig, DEFAULT_DIRECTIVES};

/// Service name with an optional deployment label, e.g. `plasma-node%dev`.
pub fn format_service_name(base: &str, label: Option<&str>) -> String {
    match label {
        Some(label) => format!("{base}%{label}"),
        None => base.to_owned(),
    }
}
