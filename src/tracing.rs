use tracing::Level;
use tracing_subscriber::{
    filter::LevelFilter, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer,
};

/// Installs global subscriber that writes to stderr, keeping stdout for command output.
///
/// `RUST_LOG` directives take precedence over `max_level`.
pub fn init_tracer(max_level: Level) {
    let filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::from_level(max_level).into())
        .from_env_lossy();
    let fmt = tracing_subscriber::fmt::layer()
        .pretty()
        .with_writer(std::io::stderr)
        .with_filter(tracing_subscriber::filter::filter_fn(|metadata| {
            let patterns = ["hyper", "mio", "reqwest::connect"];
            !patterns
                .iter()
                .any(|pattern| metadata.target().starts_with(pattern))
        }));
    tracing_subscriber::registry().with(filter).with(fmt).init();
}
