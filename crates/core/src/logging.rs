//! Tracing subscriber setup

use once_cell::sync::OnceCell;
use tracing_subscriber::{fmt, EnvFilter};

use crate::config::LoggingConfig;

static INSTALLED: OnceCell<bool> = OnceCell::new();

/// Install the global fmt subscriber
///
/// `RUST_LOG` takes precedence over `config.level`. Only the first call has
/// an effect; the return value says whether this process ended up with our
/// subscriber (false when another one was installed first).
pub fn init(config: &LoggingConfig) -> bool {
    *INSTALLED.get_or_init(|| {
        let filter = EnvFilter::try_from_default_env()
            .or_else(|_| EnvFilter::try_new(&config.level))
            .unwrap_or_else(|_| EnvFilter::new("info"));

        let builder = fmt()
            .with_env_filter(filter)
            .with_target(true)
            .with_writer(std::io::stderr);

        let installed = if config.with_timestamps {
            builder.try_init()
        } else {
            builder.without_time().try_init()
        };
        installed.is_ok()
    })
}
