use std::io;

use tracing_subscriber::EnvFilter;

pub const LOG_ENV: &str = "GUNLUK_LOG";

/// Logs go to stderr so they never mix with tables printed on stdout.
/// `GUNLUK_LOG` takes precedence over the configured level.
pub fn init(default_level: &str) {
    let filter = EnvFilter::try_from_env(LOG_ENV)
        .or_else(|_| EnvFilter::try_new(default_level))
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .compact()
        .try_init();
}
