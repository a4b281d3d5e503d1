//! Logging setup for the CLI.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Install a compact stderr subscriber. `RUST_LOG` wins over `verbose`.
pub fn init_cli_logger(verbose: bool) {
    let default = if verbose { "netforge=debug" } else { "netforge=info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    // try_init: tests may have installed a subscriber already
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .compact(),
        )
        .try_init();
}
