//! Diagnostic tracing for troubleshooting a batch run.
//!
//! Operator-facing status goes through `ui::OutputFormatter` on stdout. Tracing
//! is for developers: it reads `RUST_LOG` (default `warn`) and writes compact
//! lines to stderr so it never mixes with the prompts.

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    // A second init (tests, embedding) keeps the first subscriber.
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr).compact())
        .try_init();
}
