use std::io;
use tracing_subscriber::{fmt, EnvFilter};

const DEFAULT_FILTER: &str = "info,catalog=debug,sqlx=warn,sea_orm=warn";

fn env_filter(fallback: Option<&str>) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(fallback.unwrap_or(DEFAULT_FILTER)))
}

/// Initialize tracing subscriber with sensible defaults and stdout writer.
/// - Respects `RUST_LOG` if set
/// - Falls back to `info,catalog=debug,sqlx=warn,sea_orm=warn`
pub fn init_logging_default() {
    let _ = fmt()
        .with_env_filter(env_filter(None))
        .with_target(false)
        .compact()
        .with_writer(io::stdout)
        .try_init();
}

/// Initialize tracing subscriber with JSON structured output.
/// Same filter rules as [`init_logging_default`].
pub fn init_logging_json() {
    let _ = fmt()
        .with_env_filter(env_filter(None))
        .with_target(true)
        .json()
        .with_writer(io::stdout)
        .try_init();
}

/// Initialize logging from the `[logging]` config section values.
/// `RUST_LOG` still wins over `fallback_filter`.
pub fn init_logging(json: bool, fallback_filter: Option<&str>) {
    if json {
        let _ = fmt()
            .with_env_filter(env_filter(fallback_filter))
            .with_target(true)
            .json()
            .with_writer(io::stdout)
            .try_init();
    } else {
        let _ = fmt()
            .with_env_filter(env_filter(fallback_filter))
            .with_target(false)
            .compact()
            .with_writer(io::stdout)
            .try_init();
    }
}
