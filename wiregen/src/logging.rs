//! Default tracing logger. The generator only emits events; installing a subscriber is optional
//! and controlled by [GeneratorConfig::install_tracing_logger](crate::config::GeneratorConfig).

use tracing_subscriber::util::{SubscriberInitExt, TryInitError};
use tracing_subscriber::EnvFilter;

const DEFAULT_FILTER: &str = "wiregen=info,wiregen_di=info";

/// Installs a global `fmt` subscriber writing to stderr. `RUST_LOG` takes precedence over the
/// default filter. Fails if a global subscriber has already been set.
pub fn install_tracing_logger() -> Result<(), TryInitError> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .finish()
        .try_init()
}
