use tracing_subscriber::{fmt, EnvFilter};

/// Install the stdout subscriber. `RUST_LOG` wins over `--debug`.
pub fn init(debug: bool) {
    let level = if debug { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("{level},ureq=warn,rustls=warn")));
    let _ = fmt().with_env_filter(filter).with_target(false).try_init();
}
