use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::configuration::{LogFormat, LogSettings};

/// Install the global tracing subscriber
///
/// `RUST_LOG` wins over the configured level. Logs go to stdout, as JSON
/// or in the multi-line pretty format.
pub fn init_telemetry(settings: &LogSettings) {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&settings.level));

    let (json_layer, pretty_layer) = match settings.format {
        LogFormat::Json => (
            Some(tracing_subscriber::fmt::layer().with_writer(std::io::stdout).json()),
            None,
        ),
        LogFormat::Pretty => (
            None,
            Some(tracing_subscriber::fmt::layer().with_writer(std::io::stdout).pretty()),
        ),
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(json_layer)
        .with(pretty_layer)
        .init();
}
