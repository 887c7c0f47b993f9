//! Shared setup for the surfcrate demo binaries

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Log to stderr, honoring `RUST_LOG` when it is set
pub fn init_tracing(verbose: u8) {
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else {
        let level = match verbose {
            0 => "warn",
            1 => "surfcrate_reconstruction=info,surfcrate_fairing=info,surfcrate_io=info",
            2 => "surfcrate_reconstruction=debug,surfcrate_fairing=debug,surfcrate_io=debug",
            _ => "trace",
        };
        EnvFilter::try_new(level).unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr).compact())
        .with(filter)
        .init();
}
