use dirs::home_dir;
use std::{env, path::PathBuf};

pub const HOME_ENV: &str = "SPLIT_CORE_HOME";

const DEFAULT_DIR_NAME: &str = ".split_core";
const CONFIG_DIR: &str = "config";
const CONFIG_FILE: &str = "config.json";
const DATA_DIR: &str = "data";
const SNAPSHOT_FILE: &str = "ledger.json";

/// Layout of the application data directory.
pub struct PathResolver;

impl PathResolver {
    /// `$SPLIT_CORE_HOME`, else `~/.split_core`.
    pub fn base_dir() -> PathBuf {
        if let Some(custom) = env::var_os(HOME_ENV) {
            return PathBuf::from(custom);
        }
        home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(DEFAULT_DIR_NAME)
    }

    pub fn resolve_base(root: Option<PathBuf>) -> PathBuf {
        root.unwrap_or_else(Self::base_dir)
    }

    pub fn config_dir_in(base: &std::path::Path) -> PathBuf {
        base.join(CONFIG_DIR)
    }

    pub fn config_file_in(base: &std::path::Path) -> PathBuf {
        Self::config_dir_in(base).join(CONFIG_FILE)
    }

    pub fn snapshot_file_in(base: &std::path::Path) -> PathBuf {
        base.join(DATA_DIR).join(SNAPSHOT_FILE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    #[test]
    fn layout_is_relative_to_base() {
        let base = Path::new("/tmp/split");
        assert_eq!(
            PathResolver::config_file_in(base),
            PathBuf::from("/tmp/split/config/config.json")
        );
        assert_eq!(
            PathResolver::snapshot_file_in(base),
            PathBuf::from("/tmp/split/data/ledger.json")
        );
        assert_eq!(
            PathResolver::resolve_base(Some(base.to_path_buf())),
            base.to_path_buf()
        );
    }
}
