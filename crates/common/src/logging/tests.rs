use std::path::PathBuf;

use plasma_config::LoggingConfig;
use tracing_subscriber::fmt::format::FmtSpan;

use super::*;

#[test]
fn test_logger_config_keeps_default_directives() {
    let config = LoggerConfig::new("plasma-node".to_owned())
        .with_stdout_format(LogFormat::Json)
        .with_span_events(FmtSpan::NONE)
        .with_directives(["plasma_chaintsn=trace"]);

    assert_eq!(config.stdout_format, LogFormat::Json);
    assert_eq!(config.directives.len(), DEFAULT_DIRECTIVES.len() + 1);
    assert_eq!(config.directives.last().unwrap(), "plasma_chaintsn=trace");
    assert!(config.file.is_none());
}

#[test]
fn test_file_logging_config() {
    let config = FileLoggingConfig::new(PathBuf::from("/tmp/logs"), "plasma".to_owned())
        .with_rotation(Rotation::HOURLY)
        .with_format(LogFormat::Json);

    assert_eq!(config.file_name_prefix, "plasma");
    assert_eq!(config.rotation, Rotation::HOURLY);
    assert_eq!(config.format, LogFormat::Json);
}

#[test]
fn test_format_service_name() {
    assert_eq!(format_service_name("plasma-node", None), "plasma-node");
    assert_eq!(format_service_name("plasma-node", Some("dev")), "plasma-node%dev");
}

#[test]
fn test_env_filter_rejects_bad_directives() {
    let directives = vec!["sled=warn".to_owned(), "sled=loud".to_owned()];
    let (_filt, rejected) = build_env_filter(&directives);
    assert_eq!(rejected, vec!["sled=loud".to_owned()]);

    let defaults: Vec<String> = DEFAULT_DIRECTIVES.iter().map(|d| (*d).to_owned()).collect();
    assert!(build_env_filter(&defaults).1.is_empty());
}

#[test]
fn test_build_logger_config_with_file() {
    let dir = PathBuf::from("/var/log/plasma");
    let section = LoggingConfig {
        service_label: Some("prod".to_owned()),
        log_dir: Some(dir.clone()),
        log_file_prefix: None,
        json_format: Some(true),
        directives: vec!["plasma_rootchain=debug".to_owned()],
    };

    let config = build_logger_config("plasma-node", &section);
    assert_eq!(config.service_name, "plasma-node%prod");
    assert_eq!(config.stdout_format, LogFormat::Json);
    assert!(config.directives.contains(&"plasma_rootchain=debug".to_owned()));

    let file = config.file.unwrap();
    assert_eq!(file.directory, dir);
    assert_eq!(file.file_name_prefix, "plasma-node");
    assert_eq!(file.format, LogFormat::Json);
}

#[test]
fn test_build_logger_config_stdout_only() {
    let section = LoggingConfig {
        log_file_prefix: Some("ignored".to_owned()),
        ..LoggingConfig::default()
    };

    let config = build_logger_config("plasma-node", &section);
    assert_eq!(config.service_name, "plasma-node");
    assert_eq!(config.stdout_format, LogFormat::Compact);
    assert_eq!(config.directives.len(), DEFAULT_DIRECTIVES.len());
    assert!(config.file.is_none());
}
