// Process-wide logging setup.
//
// The kit logs through `tracing`. `ensure` lazily installs a default fmt
// subscriber so timing and messaging helpers produce output even when the
// host never configures logging itself. A subscriber already installed by
// the host takes precedence.

use std::sync::Once;

static INIT: Once = Once::new();

const DEFAULT_FILTER: &str = "satchel=info";

/// Install the default process-wide subscriber if none is set yet.
///
/// Called internally on the kit's logging paths; safe to call any number
/// of times from any thread.
pub fn ensure() {
    init_with_filter(DEFAULT_FILTER);
}

/// Install a process-wide fmt subscriber, using `default_filter` when
/// `RUST_LOG` is unset.
///
/// At most one installation per process: later calls, and calls in a
/// process where the host already set a global subscriber, are no-ops.
pub fn init_with_filter(default_filter: &str) {
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| default_filter.into()),
            )
            .try_init();
    });
}
