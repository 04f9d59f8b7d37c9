use crate::config::toml_config::ArloaderConfig;
use crate::core::arweave::{CHUNKS_RETRIES, CHUNKS_RETRY_SLEEP, DEFAULT_BASE_URL, DEFAULT_ORACLE_URL};
use crate::domain::ports::ConfigProvider;
use crate::utils::error::Result;
use crate::utils::validation::{
    validate_positive_number, validate_range, validate_reward_multiplier, validate_url, Validate,
};
use std::path::{Path, PathBuf};
use std::time::Duration;
use url::Url;

pub const DEFAULT_REWARD_MULTIPLIER: f32 = 1.0;
pub const DEFAULT_BUFFER: usize = 5;
pub const DEFAULT_BUNDLE_SIZE_MB: u64 = 10;

const BYTES_PER_MB: u64 = 1_000_000;

/// Values given on the command line. `None` falls through to the config
/// file, then to the built-in default.
#[derive(Debug, Clone, Default)]
pub struct SettingsOverrides {
    pub base_url: Option<String>,
    pub ar_keypair_path: Option<PathBuf>,
    pub reward_multiplier: Option<f32>,
    pub buffer: Option<usize>,
    pub bundle_size_mb: Option<u64>,
    pub log_dir: Option<PathBuf>,
    pub monitor: bool,
}

/// Fully resolved settings for one run.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub base_url: Url,
    pub oracle_url: Url,
    pub ar_keypair_path: Option<PathBuf>,
    pub reward_multiplier: f32,
    pub buffer: usize,
    pub bundle_size_mb: u64,
    pub log_dir: Option<PathBuf>,
    pub retry_attempts: u16,
    pub retry_delay: Duration,
    pub monitoring: bool,
}

impl Settings {
    pub fn resolve(overrides: &SettingsOverrides, file: Option<&ArloaderConfig>) -> Result<Self> {
        let file = file.cloned().unwrap_or_default();

        let base_url = overrides
            .base_url
            .clone()
            .or(file.network.base_url)
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        validate_url("base_url", &base_url)?;

        let oracle_url = file
            .network
            .oracle_url
            .unwrap_or_else(|| DEFAULT_ORACLE_URL.to_string());
        validate_url("oracle_url", &oracle_url)?;

        Ok(Settings {
            base_url: Url::parse(&base_url)?,
            oracle_url: Url::parse(&oracle_url)?,
            ar_keypair_path: overrides
                .ar_keypair_path
                .clone()
                .or_else(|| file.wallet.ar_keypair_path.map(PathBuf::from)),
            reward_multiplier: overrides
                .reward_multiplier
                .or(file.upload.reward_multiplier)
                .unwrap_or(DEFAULT_REWARD_MULTIPLIER),
            buffer: overrides
                .buffer
                .or(file.upload.buffer)
                .unwrap_or(DEFAULT_BUFFER),
            bundle_size_mb: overrides
                .bundle_size_mb
                .or(file.upload.bundle_size_mb)
                .unwrap_or(DEFAULT_BUNDLE_SIZE_MB),
            log_dir: overrides
                .log_dir
                .clone()
                .or_else(|| file.upload.log_dir.map(PathBuf::from)),
            retry_attempts: file.upload.retry_attempts.unwrap_or(CHUNKS_RETRIES),
            retry_delay: Duration::from_secs(
                file.upload.retry_delay_seconds.unwrap_or(CHUNKS_RETRY_SLEEP),
            ),
            monitoring: overrides.monitor || file.monitoring.enabled,
        })
    }
}

impl Validate for Settings {
    fn validate(&self) -> Result<()> {
        validate_reward_multiplier(self.reward_multiplier)?;
        validate_positive_number("buffer", self.buffer, 1)?;
        validate_range("bundle_size_mb", self.bundle_size_mb, 1, 200)?;
        Ok(())
    }
}

impl ConfigProvider for Settings {
    fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn oracle_url(&self) -> &Url {
        &self.oracle_url
    }

    fn ar_keypair_path(&self) -> Option<&Path> {
        self.ar_keypair_path.as_deref()
    }

    fn reward_multiplier(&self) -> f32 {
        self.reward_multiplier
    }

    fn buffer(&self) -> usize {
        self.buffer
    }

    fn bundle_size(&self) -> u64 {
        self.bundle_size_mb * BYTES_PER_MB
    }

    fn log_dir(&self) -> Option<&Path> {
        self.log_dir.as_deref()
    }

    fn retry_attempts(&self) -> u16 {
        self.retry_attempts
    }

    fn retry_delay(&self) -> Duration {
        self.retry_delay
    }

    fn monitoring_enabled(&self) -> bool {
        self.monitoring
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::error::ArloaderError;

    #[test]
    fn test_defaults() {
        let settings = Settings::resolve(&SettingsOverrides::default(), None).unwrap();
        assert_eq!(settings.base_url.as_str(), DEFAULT_BASE_URL);
        assert_eq!(settings.buffer, DEFAULT_BUFFER);
        assert_eq!(settings.bundle_size(), 10_000_000);
        assert_eq!(settings.retry_attempts(), CHUNKS_RETRIES);
        assert_eq!(settings.retry_delay(), Duration::from_secs(1));
        assert!(settings.ar_keypair_path().is_none());
        assert!(!settings.monitoring_enabled());
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_cli_overrides_file() {
        let file = ArloaderConfig::from_toml_str(
            r#"
[network]
base_url = "http://localhost:1984"

[wallet]
ar_keypair_path = "/from/file.json"

[upload]
buffer = 3
reward_multiplier = 2.0
retry_attempts = 2
retry_delay_seconds = 5

[monitoring]
enabled = true
"#,
        )
        .unwrap();

        let overrides = SettingsOverrides {
            ar_keypair_path: Some(PathBuf::from("/from/cli.json")),
            buffer: Some(7),
            ..Default::default()
        };

        let settings = Settings::resolve(&overrides, Some(&file)).unwrap();
        assert_eq!(settings.base_url.as_str(), "http://localhost:1984/");
        assert_eq!(settings.ar_keypair_path(), Some(Path::new("/from/cli.json")));
        assert_eq!(settings.buffer(), 7);
        assert_eq!(settings.reward_multiplier(), 2.0);
        assert_eq!(settings.retry_attempts(), 2);
        assert_eq!(settings.retry_delay(), Duration::from_secs(5));
        assert!(settings.monitoring_enabled());
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        let overrides = SettingsOverrides {
            base_url: Some("not a url".to_string()),
            ..Default::default()
        };
        assert!(matches!(
            Settings::resolve(&overrides, None),
            Err(ArloaderError::InvalidConfigValueError { .. })
        ));

        let overrides = SettingsOverrides {
            bundle_size_mb: Some(0),
            ..Default::default()
        };
        let settings = Settings::resolve(&overrides, None).unwrap();
        assert!(settings.validate().is_err());

        let overrides = SettingsOverrides {
            reward_multiplier: Some(0.0),
            ..Default::default()
        };
        let settings = Settings::resolve(&overrides, None).unwrap();
        assert!(settings.validate().is_err());
    }
}
