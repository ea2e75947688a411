//! Logging setup for the `relforge` binary.
//!
//! # Environment Variables
//!
//! - `RELFORGE_LOG=<filter>` - `EnvFilter` directives, e.g. `relforge_migrate=debug`
//! - `RELFORGE_LOG_FORMAT=pretty|compact|json` - Output format (default: compact)
//!
//! Without `RELFORGE_LOG` the level is `debug` when `--verbose` is passed and
//! `warn` otherwise. Log lines go to stderr so `relforge sql` output stays
//! pipeable.

use std::env;
use std::sync::Once;

use tracing_subscriber::{EnvFilter, fmt, prelude::*};

static INIT: Once = Once::new();

/// Environment variable holding the filter directives.
pub const LOG_ENV: &str = "RELFORGE_LOG";

/// Environment variable selecting the output format.
pub const LOG_FORMAT_ENV: &str = "RELFORGE_LOG_FORMAT";

/// Level used when no filter is configured.
pub fn default_level(verbose: bool) -> &'static str {
    if verbose { "debug" } else { "warn" }
}

/// Get the configured log format from `RELFORGE_LOG_FORMAT`.
pub fn get_log_format() -> &'static str {
    env::var(LOG_FORMAT_ENV)
        .map(|f| match f.to_lowercase().as_str() {
            "pretty" => "pretty",
            "json" => "json",
            _ => "compact",
        })
        .unwrap_or("compact")
}

fn build_filter(verbose: bool) -> EnvFilter {
    let fallback = || EnvFilter::new(default_level(verbose));
    match env::var(LOG_ENV) {
        Ok(directives) => EnvFilter::try_new(directives).unwrap_or_else(|_| fallback()),
        Err(_) => fallback(),
    }
}

/// Initialize logging. Subsequent calls are no-ops.
pub fn init(verbose: bool) {
    INIT.call_once(|| {
        let filter = build_filter(verbose);

        match get_log_format() {
            "json" => {
                tracing_subscriber::registry()
                    .with(filter)
                    .with(fmt::layer().json().with_writer(std::io::stderr))
                    .init();
            }
            "pretty" => {
                tracing_subscriber::registry()
                    .with(filter)
                    .with(fmt::layer().pretty().with_writer(std::io::stderr))
                    .init();
            }
            _ => {
                tracing_subscriber::registry()
                    .with(filter)
                    .with(fmt::layer().compact().with_writer(std::io::stderr))
                    .init();
            }
        }

        tracing::debug!(format = get_log_format(), "logging initialized");
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_level() {
        assert_eq!(default_level(true), "debug");
        assert_eq!(default_level(false), "warn");
    }

    #[test]
    fn test_log_format_is_known() {
        assert!(matches!(get_log_format(), "pretty" | "compact" | "json"));
    }
}
