//! Logger settings.

use std::path::PathBuf;

use tracing_appender::rolling::Rotation;
use tracing_subscriber::fmt::format::FmtSpan;

/// Directives applied before any configured ones.  The HTTP stack underneath
/// the root-chain client logs every request at debug level.
pub const DEFAULT_DIRECTIVES: &[&str] = &["hyper=warn", "reqwest=warn", "sled=warn"];

/// Line format of a log output.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum LogFormat {
    #[default]
    Compact,
    Json,
}

impl LogFormat {
    pub fn from_json_flag(json: bool) -> Self {
        if json {
            Self::Json
        } else {
            Self::Compact
        }
    }
}

/// A rolling log file output.
#[derive(Debug, Clone)]
pub struct FileLoggingConfig {
    pub directory: PathBuf,

    /// Files are named `<prefix>.<date>`.
    pub file_name_prefix: String,

    pub rotation: Rotation,
    pub format: LogFormat,
}

impl FileLoggingConfig {
    pub fn new(directory: PathBuf, file_name_prefix: String) -> Self {
        Self {
            directory,
            file_name_prefix,
            rotation: Rotation::DAILY,
            format: LogFormat::Compact,
        }
    }

    pub fn with_rotation(mut self, rotation: Rotation) -> Self {
        self.rotation = rotation;
        self
    }

    pub fn with_format(mut self, format: LogFormat) -> Self {
        self.format = format;
        self
    }
}

#[derive(Debug, Clone)]
pub struct LoggerConfig {
    /// Reported once the subscriber is installed.
    pub service_name: String,
    pub service_version: Option<String>,

    pub stdout_format: LogFormat,

    /// Span lifecycle events written to stdout.  Closing events carry the
    /// span's busy and idle time.
    pub span_events: FmtSpan,

    pub file: Option<FileLoggingConfig>,

    /// Filter directives added on top of `RUST_LOG`, after
    /// [`DEFAULT_DIRECTIVES`].
    pub directives: Vec<String>,
}

impl LoggerConfig {
    pub fn new(service_name: String) -> Self {
        Self {
            service_name,
            service_version: None,
            stdout_format: LogFormat::Compact,
            span_events: FmtSpan::CLOSE,
            file: None,
            directives: DEFAULT_DIRECTIVES.iter().map(|d| (*d).to_owned()).collect(),
        }
    }

    pub fn with_service_version(mut self, version: String) -> Self {
        self.service_version = Some(version);
        self
    }

    pub fn with_stdout_format(mut self, format: LogFormat) -> Self {
        self.stdout_format = format;
        self
    }

    pub fn with_file_logging(mut self, config: FileLoggingConfig) -> Self {
        self.file = Some(config);
        self
    }

    pub fn with_span_events(mut self, span_events: FmtSpan) -> Self {
        self.span_events = span_events;
        self
    }

    pub fn with_directives<I, D>(mut self, directives: I) -> Self
    where
        I: IntoIterator<Item = D>,
        D: Into<String>,
    {
        self.directives.extend(directives.into_iter().map(Into::into));
        self
    }
}
