pub mod build_info;
pub mod paths;

use std::{fs, path::Path, sync::Once};

use crate::errors::Result;

pub use paths::PathResolver;

static TRACING_INIT: Once = Once::new();

pub const DEFAULT_LOG_FILTER: &str = "split_core=info";

/// Initializes the global tracing subscriber. `RUST_LOG` directives win over `directive`.
pub fn init_tracing(directive: Option<&str>) {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{fmt, EnvFilter};

        let fallback = directive.unwrap_or(DEFAULT_LOG_FILTER);
        let filter = EnvFilter::try_from_default_env()
            .or_else(|_| EnvFilter::try_new(fallback))
            .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

        let _ = fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .try_init();
    });
}

pub fn ensure_dir(path: &Path) -> Result<()> {
    if !path.exists() {
        fs::create_dir_all(path)?;
    }
    Ok(())
}
