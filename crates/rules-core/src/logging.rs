//! Tracing setup: [`init`] picks a level from a verbose flag, [`init_with_filter`] takes an explicit directive.

use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Install a compact stderr subscriber.
///
/// `RUST_LOG` takes precedence; otherwise the level is `debug` when
/// `verbose` is set and `info` when not. Calling this again after a
/// subscriber is installed returns an error and changes nothing.
pub fn init(verbose: bool) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let fallback = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(fallback))?;
    install(filter)
}

/// Like [`init`], with an explicit filter directive such as
/// `"rules_core=debug,warn"`.
pub fn init_with_filter(directive: &str) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    install(EnvFilter::try_new(directive)?)
}

fn install(filter: EnvFilter) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let fmt_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_level(true)
        .compact();

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .try_init()?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing::{info, warn};

    #[test]
    fn test_logging_init() {
        // Only one subscriber per process; the second call must not panic.
        let _ = init(false);
        assert!(init_with_filter("debug").is_err());

        info!("This is an info message");
        warn!("This is a warning message");
    }

    #[test]
    fn test_bad_directive_is_rejected() {
        assert!(init_with_filter("rules_core=notalevel").is_err());
    }
}
