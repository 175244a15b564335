use serde::{Deserialize, Serialize};
use std::{
    env, fs,
    path::{Path, PathBuf},
};

use crate::{
    core::forecast::{HoltLinear, Smoothing},
    domain::Currency,
    errors::{Result, SplitError},
    storage::{images::DEFAULT_MAX_IMAGE_SIZE, json_backend},
    utils::{ensure_dir, PathResolver, DEFAULT_LOG_FILTER},
};

pub const UPLOAD_DIR_ENV: &str = "SPLIT_CORE_UPLOAD_DIR";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastSettings {
    #[serde(default)]
    pub smoothing: Smoothing,
    /// Upper bound on parameter pairs evaluated while fitting.
    #[serde(default = "default_max_evaluations")]
    pub max_evaluations: usize,
}

fn default_max_evaluations() -> usize {
    400
}

impl Default for ForecastSettings {
    fn default() -> Self {
        Self {
            smoothing: Smoothing::default(),
            max_evaluations: default_max_evaluations(),
        }
    }
}

impl ForecastSettings {
    pub fn engine(&self) -> HoltLinear {
        HoltLinear::new(self.smoothing, self.max_evaluations)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Currency given to groups created without one.
    pub currency: Currency,
    pub upload_dir: PathBuf,
    pub max_image_size: usize,
    pub forecast: ForecastSettings,
    pub log_filter: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            currency: Currency::default(),
            upload_dir: PathBuf::from("uploads"),
            max_image_size: DEFAULT_MAX_IMAGE_SIZE,
            forecast: ForecastSettings::default(),
            log_filter: DEFAULT_LOG_FILTER.into(),
        }
    }
}

impl Config {
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides_from(|key| env::var(key).ok());
    }

    pub fn apply_overrides_from<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(dir) = lookup(UPLOAD_DIR_ENV).filter(|value| !value.trim().is_empty()) {
            self.upload_dir = PathBuf::from(dir);
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.max_image_size == 0 {
            return Err(SplitError::Config("max_image_size must be positive".into()));
        }
        if let Smoothing::Fixed { alpha, beta } = self.forecast.smoothing {
            let params = crate::core::forecast::SmoothingParams { alpha, beta };
            if !params.is_valid() {
                return Err(SplitError::Config(format!(
                    "smoothing parameters out of range: alpha={alpha}, beta={beta}"
                )));
            }
        }
        Ok(())
    }

    /// Upload directory, resolved against `base` when relative.
    pub fn upload_dir_in(&self, base: &Path) -> PathBuf {
        if self.upload_dir.is_absolute() {
            self.upload_dir.clone()
        } else {
            base.join(&self.upload_dir)
        }
    }
}

pub struct ConfigManager {
    base: PathBuf,
    path: PathBuf,
}

impl ConfigManager {
    pub fn new() -> Result<Self> {
        Self::with_base_dir(PathResolver::base_dir())
    }

    pub fn with_base_dir(base: PathBuf) -> Result<Self> {
        ensure_dir(&base)?;
        ensure_dir(&PathResolver::config_dir_in(&base))?;
        Ok(Self {
            path: PathResolver::config_file_in(&base),
            base,
        })
    }

    /// Stored config (defaults when absent) with environment overrides applied.
    pub fn load(&self) -> Result<Config> {
        let mut config = if self.path.exists() {
            let data = fs::read_to_string(&self.path)?;
            serde_json::from_str(&data)
                .map_err(|err| SplitError::Config(format!("{}: {err}", self.path.display())))?
        } else {
            Config::default()
        };
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    pub fn save(&self, config: &Config) -> Result<()> {
        config.validate()?;
        let json = serde_json::to_string_pretty(config)?;
        let tmp = json_backend::tmp_path(&self.path);
        json_backend::write_file(&tmp, &json)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }

    pub fn base(&self) -> &Path {
        &self.base
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn load_defaults_when_missing() {
        let dir = tempdir().unwrap();
        let manager = ConfigManager::with_base_dir(dir.path().to_path_buf()).unwrap();
        let config = manager.load().unwrap();
        assert_eq!(config.currency, Currency::Chf);
        assert_eq!(config.max_image_size, 5 * 1024 * 1024);
        assert_eq!(config.forecast.max_evaluations, 400);
    }

    #[test]
    fn save_and_reload_round_trip() {
        let dir = tempdir().unwrap();
        let manager = ConfigManager::with_base_dir(dir.path().to_path_buf()).unwrap();
        let mut config = Config::default();
        config.currency = Currency::Eur;
        config.forecast.smoothing = Smoothing::Fixed {
            alpha: 0.3,
            beta: 0.1,
        };
        manager.save(&config).unwrap();

        let loaded = manager.load().unwrap();
        assert_eq!(loaded.currency, Currency::Eur);
        assert_eq!(loaded.forecast.smoothing, config.forecast.smoothing);
        assert!(manager.path().ends_with("config/config.json"));
    }

    #[test]
    fn partial_file_falls_back_to_defaults() {
        let dir = tempdir().unwrap();
        let manager = ConfigManager::with_base_dir(dir.path().to_path_buf()).unwrap();
        fs::write(manager.path(), r#"{ "currency": "USD" }"#).unwrap();
        let config = manager.load().unwrap();
        assert_eq!(config.currency, Currency::Usd);
        assert_eq!(config.forecast, ForecastSettings::default());
    }

    #[test]
    fn upload_dir_override() {
        let mut config = Config::default();
        config.apply_overrides_from(|key| (key == UPLOAD_DIR_ENV).then(|| "/srv/receipts".into()));
        assert_eq!(config.upload_dir, PathBuf::from("/srv/receipts"));
        assert_eq!(
            config.upload_dir_in(Path::new("/ignored")),
            PathBuf::from("/srv/receipts")
        );
    }

    #[test]
    fn invalid_fixed_smoothing_is_rejected() {
        let mut config = Config::default();
        config.forecast.smoothing = Smoothing::Fixed {
            alpha: 1.5,
            beta: 0.2,
        };
        assert!(matches!(config.validate(), Err(SplitError::Config(_))));
    }
}
