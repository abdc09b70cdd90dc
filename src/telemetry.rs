use std::sync::Once;

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

static INIT: Once = Once::new();

/// Installs the global subscriber, writing to stderr.
///
/// Reads `SYMPTOM_LOG_LOG` (e.g. `symptom_log=debug`) and falls back to
/// `symptom_log=info`. Safe to call more than once.
pub fn init_tracing() {
    INIT.call_once(|| {
        let filter = EnvFilter::try_from_env("SYMPTOM_LOG_LOG")
            .unwrap_or_else(|_| EnvFilter::new("symptom_log=info"));

        tracing_subscriber::registry()
            .with(fmt::layer().with_target(true).with_writer(std::io::stderr))
            .with(filter)
            .init();
    });
}
