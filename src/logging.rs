use error_stack::{Result, ResultExt};
use thiserror::Error;
use tracing::{level_filters::LevelFilter, Subscriber};
use tracing_subscriber::fmt::time::ChronoUtc;
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::{layer::SubscriberExt, EnvFilter, Layer};

use crate::config::{Logging, LoggingStyle};

#[derive(Debug, Error)]
#[error("Failed to initialize tracing")]
pub struct LoggingInitError;

/// Installs the global subscriber. Logs go to stderr so command
/// output on stdout stays clean.
pub fn init(config: &Logging) -> Result<(), LoggingInitError> {
    let targets = std::env::var("RUST_LOG").unwrap_or_else(|_| config.targets.clone());
    let registry = tracing_subscriber::Registry::default().with(console_layer(config.style, &targets));

    tracing::subscriber::set_global_default(registry)
        .change_context(LoggingInitError)
        .attach_printable("already initialized tracing")?;

    Ok(())
}

pub fn init_for_tests() {
    let targets = std::env::var("RUST_LOG").unwrap_or_default();
    let layer = tracing_subscriber::fmt::layer()
        .with_test_writer()
        .with_filter(make_env_filter(&targets));

    // only the first test to get here installs it
    tracing::subscriber::set_global_default(tracing_subscriber::Registry::default().with(layer))
        .ok();
}

fn console_layer<S>(style: LoggingStyle, targets: &str) -> Box<dyn Layer<S> + Send + Sync + 'static>
where
    S: Subscriber + for<'a> LookupSpan<'a> + 'static,
{
    let layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_timer(ChronoUtc::rfc_3339());

    let filter = make_env_filter(targets);
    match style {
        LoggingStyle::Compact => layer.compact().with_filter(filter).boxed(),
        LoggingStyle::Full => layer.with_filter(filter).boxed(),
        LoggingStyle::Pretty => layer.pretty().with_filter(filter).boxed(),
        LoggingStyle::JSON => layer.json().with_filter(filter).boxed(),
    }
}

fn make_env_filter(targets: &str) -> EnvFilter {
    let default_level = if cfg!(debug_assertions) {
        LevelFilter::DEBUG
    } else {
        LevelFilter::INFO
    };

    EnvFilter::builder()
        .with_default_directive(default_level.into())
        .parse_lossy(targets)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing_subscriber::Registry;

    #[test]
    fn every_style_builds_a_layer() {
        for style in [
            LoggingStyle::Compact,
            LoggingStyle::Full,
            LoggingStyle::Pretty,
            LoggingStyle::JSON,
        ] {
            let layer = console_layer::<Registry>(style, "registrar=debug,info");
            drop(layer);
        }
    }

    #[test]
    fn unparsable_targets_are_skipped() {
        let filter = make_env_filter("registrar=debug,mail=loud").to_string();
        assert!(filter.contains("registrar=debug"));
        assert!(!filter.contains("loud"));
    }
}
