use crate::config::{LogFormat, Logging};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// stdout carries the protocol, so every log line goes to stderr.
/// `RUST_LOG` wins over the configured level.
pub fn init(cfg: &Logging) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cfg.level));
    let registry = tracing_subscriber::registry().with(filter);
    match cfg.format {
        LogFormat::Json => registry.with(fmt::layer().json().with_writer(std::io::stderr)).init(),
        LogFormat::Pretty => registry.with(fmt::layer().with_ansi(false).with_writer(std::io::stderr)).init(),
    }
}
