//! Tracing subscriber setup for the `mercari` binary.
//!
//! Filter priority: `MERCARI_LOG`, then `RUST_LOG`, then the `-v` default.
//! Logs go to stderr so rendered views on stdout stay clean.

use tracing::Level;
use tracing_subscriber::fmt;
use tracing_subscriber::prelude::*;
use tracing_subscriber::EnvFilter;

pub const LOG_ENV: &str = "MERCARI_LOG";

pub fn default_level(verbose: bool) -> Level {
    if verbose {
        Level::DEBUG
    } else {
        Level::WARN
    }
}

/// Install the global subscriber. A second call is a no-op.
pub fn init(verbose: bool) {
    let filter = build_env_filter(std::env::var(LOG_ENV).ok().as_deref(), verbose);
    let layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .without_time()
        .compact();
    let _ = tracing_subscriber::registry().with(filter).with(layer).try_init();
}

fn build_env_filter(directives: Option<&str>, verbose: bool) -> EnvFilter {
    if let Some(filter) = directives.and_then(|d| EnvFilter::try_new(d).ok()) {
        return filter;
    }
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return filter;
    }
    let level = default_level(verbose);
    let directive = if verbose {
        format!("{level},mercari_core=debug,mercari_storefront=debug")
    } else {
        level.to_string()
    };
    EnvFilter::try_new(&directive).unwrap_or_else(|_| EnvFilter::new(level.as_str()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verbose_raises_default_level() {
        assert_eq!(default_level(false), Level::WARN);
        assert_eq!(default_level(true), Level::DEBUG);
    }

    #[test]
    fn explicit_directives_win() {
        let filter = build_env_filter(Some("mercari_core=trace"), false);
        assert!(filter.to_string().contains("mercari_core=trace"));
    }
}
