use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize logging with optional verbose mode.
///
/// Logs go to stderr as JSON so they never interleave with the live table
/// on stdout. When `verbose` is false only error-level events are emitted.
pub fn init_logging(verbose: bool) {
    let directive = if verbose {
        "hpwatch=info"
    } else {
        "hpwatch=error"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_writer(std::io::stderr)
                .with_current_span(false)
                .with_span_list(false),
        )
        .with(
            EnvFilter::from_default_env()
                .add_directive(directive.parse().expect("Invalid log directive")),
        )
        .init();
}
