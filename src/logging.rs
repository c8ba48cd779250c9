use tracing::warn;
use tracing_subscriber::{
    fmt, layer::SubscriberExt, reload, util::SubscriberInitExt, EnvFilter, Registry,
};

/// Filter used until the configured one is known
pub const DEFAULT_FILTER: &str = "lexdesk=info";

/// Swaps the active filter once config has been read
pub type FilterHandle = reload::Handle<EnvFilter, Registry>;

fn build_filter(fallback: &str) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(fallback))
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

/// Install the stderr subscriber. `RUST_LOG` wins over `fallback`.
///
/// Returns `None` when a subscriber was already installed; that one stays in place.
pub fn init(fallback: &str) -> Option<FilterHandle> {
    let (filter, handle) = reload::Layer::new(build_filter(fallback));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
        .try_init()
        .ok()
        .map(|_| handle)
}

/// Replace the fallback filter installed by `init`. `RUST_LOG` still wins.
pub fn refilter(handle: &FilterHandle, fallback: &str) {
    if let Err(e) = handle.reload(build_filter(fallback)) {
        warn!(error = %e, "Could not apply log filter");
    }
}
