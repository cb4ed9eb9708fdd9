//! Logging bootstrap.
//!
//! One `tracing-subscriber` fmt subscriber per process. `RUST_LOG` wins when
//! set; otherwise the level follows the configured environment.

use tracing_subscriber::EnvFilter;

/// Default level for an environment name.
///
/// - `local`, `dev`, `development` -> `debug`
/// - anything else -> `info`
pub fn default_log_level(env: &str) -> &'static str {
    match env.trim().to_ascii_lowercase().as_str() {
        "local" | "dev" | "development" => "debug",
        _ => "info",
    }
}

/// Installs the global subscriber.
///
/// Returns an error string when a subscriber is already installed.
pub fn init_logging(env: &str) -> Result<(), String> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_log_level(env)));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init()
        .map_err(|err| format!("failed to install log subscriber: {err}"))
}

#[cfg(test)]
mod tests {
    use super::{default_log_level, init_logging};

    #[test]
    fn local_environments_log_debug() {
        assert_eq!(default_log_level("local"), "debug");
        assert_eq!(default_log_level(" Dev "), "debug");
        assert_eq!(default_log_level("production"), "info");
    }

    #[test]
    fn second_init_is_rejected() {
        let _ = init_logging("local");
        let err = init_logging("local").expect_err("second init should fail");
        assert!(err.contains("subscriber"));
    }
}
