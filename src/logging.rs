//! Logging setup.
//!
//! Installs a global tracing subscriber writing to stderr so stdout carries
//! only reports. `RUST_LOG` takes precedence over the verbosity flag.

use tracing_subscriber::{fmt, prelude::*, EnvFilter, Registry};

/// Install the global subscriber. Later calls are no-ops.
pub fn init(verbose: bool) {
    let default_level = if verbose { "pricewatch=debug" } else { "pricewatch=info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let layer = fmt::layer()
        .compact()
        .with_target(false)
        .with_writer(std::io::stderr);

    let _ = tracing::subscriber::set_global_default(Registry::default().with(filter).with(layer));
}
