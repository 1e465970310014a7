//! Subscriber construction and installation for embedding hosts.

use anyhow::{Context, Result};
use tracing::Subscriber;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

use crate::config::Config;

/// Build the JSON subscriber fieldseal events are meant to be read through.
///
/// `RUST_LOG` wins over `log_level` when it is set and parses. Hosts that
/// already own a subscriber can scope this one with
/// [`tracing::subscriber::with_default`] instead of installing it.
pub fn subscriber(log_level: &str) -> impl Subscriber + Send + Sync + 'static {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));
    tracing_subscriber::fmt()
        .json()
        .with_env_filter(filter)
        .finish()
}

/// Install [`subscriber`] as the process-wide default at `cfg.log_level`.
///
/// Call once, after [`Config::from_env`] and before building
/// [`crate::DataProtection`], so the insecure-key warning is not lost.
///
/// # Errors
///
/// Returns an error if a global subscriber has already been set.
pub fn init(cfg: &Config) -> Result<()> {
    subscriber(&cfg.log_level)
        .try_init()
        .context("failed to install fieldseal tracing subscriber")
}

#[cfg(test)]
mod tests {
    use tracing::Level;

    use super::*;

    #[test]
    fn subscriber_applies_log_level() {
        if std::env::var_os("RUST_LOG").is_some() {
            return;
        }
        tracing::subscriber::with_default(subscriber("warn"), || {
            assert!(tracing::enabled!(Level::WARN));
            assert!(!tracing::enabled!(Level::DEBUG));
        });
    }
}
