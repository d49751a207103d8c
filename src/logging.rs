//! Subscriber setup for the binary.

use tracing_subscriber::{fmt, EnvFilter};

/// Filter used when `RUST_LOG` is unset.
pub const DEFAULT_FILTER: &str = "adgenius=info";

/// Installs a stderr subscriber filtered by `RUST_LOG`.
///
/// `verbose` raises the crate to `debug` when `RUST_LOG` is unset.
pub fn init(verbose: bool) {
    let fallback = if verbose { "adgenius=debug,info" } else { DEFAULT_FILTER };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));

    // A second init (e.g. from tests) is ignored.
    let _ = fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
