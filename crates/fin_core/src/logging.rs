use std::sync::Once;
use tracing_subscriber::EnvFilter;

static INIT: Once = Once::new();

/// Installs the global subscriber. Later calls are no-ops.
pub fn init_logging(json: bool) {
    if tracing::dispatcher::has_been_set() {
        return;
    }
    INIT.call_once(|| {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
        let builder = tracing_subscriber::fmt().with_env_filter(filter);
        let installed = if json {
            builder.json().try_init()
        } else {
            builder.try_init()
        };
        if let Err(e) = installed {
            eprintln!("Logging already initialised: {}", e);
        }
    });
}
