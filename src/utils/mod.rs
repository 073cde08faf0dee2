pub mod build_info;

use std::{
    env,
    path::{Path, PathBuf},
    sync::Once,
};

use dirs::home_dir;

static TRACING_INIT: Once = Once::new();

const DEFAULT_FILTER: &str = "vaultrise=info";
const DEFAULT_DIR_NAME: &str = ".vaultrise";
const PREFERENCES_FILE: &str = "preferences.json";

/// Initializes the global tracing subscriber with sensible defaults.
/// `RUST_LOG` replaces the default `vaultrise=info` directive when set.
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{fmt, EnvFilter};

        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

        // Another subscriber may already be installed by a host process.
        let _ = fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .try_init();
    });
}

/// Returns the application data directory, defaulting to `~/.vaultrise`.
pub fn app_data_dir() -> PathBuf {
    if let Some(custom) = env::var_os("VAULTRISE_HOME") {
        return PathBuf::from(custom);
    }
    home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(DEFAULT_DIR_NAME)
}

/// Key-value preferences file holding goals and the onboarding flag.
pub fn preferences_file(base: &Path) -> PathBuf {
    base.join(PREFERENCES_FILE)
}
