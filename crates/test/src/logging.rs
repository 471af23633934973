use ccv_config::{LogFormat, LoggingConfig};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

/// Install a global subscriber for tests. `RUST_LOG` overrides the configured level.
///
/// Only the first call in a process has an effect.
pub fn init_logging(config: &LoggingConfig) {
    let filter = EnvFilter::builder()
        .with_default_directive(
            config
                .log_level
                .as_str()
                .parse()
                .unwrap_or_else(|_| LevelFilter::INFO.into()),
        )
        .from_env_lossy();

    let builder = FmtSubscriber::builder()
        .with_target(false)
        .with_env_filter(filter)
        .with_test_writer()
        .with_thread_ids(false);

    // Ignore, a subscriber is already set after the first call
    let _ = match config.log_format {
        LogFormat::Plaintext => builder.finish().try_init(),
        LogFormat::Json => builder.json().finish().try_init(),
    };
}
