//! Tracing subscriber bootstrap.

use tracing_subscriber::EnvFilter;

use crate::config::LoggingConfig;
use crate::error::SessionError;

/// Install the global `tracing` subscriber.
///
/// `RUST_LOG` wins when set; otherwise `config.level` is used.
///
/// # Errors
///
/// Returns [`SessionError::Telemetry`] if a global subscriber is already
/// installed.
pub fn init(config: &LoggingConfig) -> Result<(), SessionError> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));

    let installed = if config.json {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .json()
            .try_init()
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .try_init()
    };
    installed.map_err(|e| SessionError::Telemetry(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_init_is_rejected() {
        let config = LoggingConfig::default();
        let _ = init(&config);
        assert!(matches!(init(&config), Err(SessionError::Telemetry(_))));
    }
}
