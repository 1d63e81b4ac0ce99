//! Subscriber installation.

use std::io;

use tracing::*;
use tracing_appender::rolling::RollingFileAppender;
use tracing_subscriber::{
    filter::Directive,
    fmt::{format::FmtSpan, layer, MakeWriter},
    layer::SubscriberExt,
    registry::LookupSpan,
    util::SubscriberInitExt,
    EnvFilter, Layer,
};

use super::types::{LogFormat, LoggerConfig};

type BoxedLayer<S> = Box<dyn Layer<S> + Send + Sync + 'static>;

/// Builds the filter shared by all outputs.
///
/// The default level is `INFO` and `RUST_LOG` overrides it.  Directives that
/// fail to parse are returned instead of applied.
pub fn build_env_filter(directives: &[String]) -> (EnvFilter, Vec<String>) {
    let mut filt = EnvFilter::builder()
        .with_default_directive(Level::INFO.into())
        .from_env_lossy();

    let mut rejected = Vec::new();
    for d in directives {
        match d.parse::<Directive>() {
            Ok(directive) => filt = filt.add_directive(directive),
            Err(_) => rejected.push(d.clone()),
        }
    }

    (filt, rejected)
}

fn output_layer<S, W>(
    format: LogFormat,
    span_events: FmtSpan,
    writer: W,
    ansi: bool,
    filt: EnvFilter,
) -> BoxedLayer<S>
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    let base = layer()
        .with_writer(writer)
        .with_ansi(ansi)
        .with_span_events(span_events);

    match format {
        LogFormat::Compact => base.compact().with_filter(filt).boxed(),
        LogFormat::Json => base.json().with_filter(filt).boxed(),
    }
}

/// Installs the global subscriber: stdout plus the optional rolling file.
pub fn init(config: LoggerConfig) {
    let (filt, rejected) = build_env_filter(&config.directives);

    let stdout = output_layer(
        config.stdout_format,
        config.span_events.clone(),
        io::stdout,
        true,
        filt.clone(),
    );

    let file = config.file.as_ref().map(|file| {
        let appender =
            RollingFileAppender::new(file.rotation.clone(), &file.directory, &file.file_name_prefix);
        output_layer(file.format, FmtSpan::NONE, appender, false, filt.clone())
    });

    tracing_subscriber::registry().with(stdout).with(file).init();

    for directive in rejected {
        warn!(%directive, "ignoring invalid log directive");
    }

    info!(
        service_name = %config.service_name,
        service_version = ?config.service_version,
        "logging initialized"
    );
}
