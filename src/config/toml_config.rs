use crate::utils::error::{ArloaderError, Result};
use crate::utils::validation::{
    validate_path, validate_positive_number, validate_range, validate_reward_multiplier,
    validate_url, Validate,
};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Optional `arloader.toml` settings file. Every section and key may be
/// omitted; command-line flags take precedence over anything set here.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArloaderConfig {
    pub network: NetworkConfig,
    pub wallet: WalletConfig,
    pub upload: UploadConfig,
    pub monitoring: MonitoringConfig,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworkConfig {
    pub base_url: Option<String>,
    pub oracle_url: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WalletConfig {
    pub ar_keypair_path: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UploadConfig {
    pub reward_multiplier: Option<f32>,
    pub buffer: Option<usize>,
    pub bundle_size_mb: Option<u64>,
    pub log_dir: Option<String>,
    pub retry_attempts: Option<u16>,
    pub retry_delay_seconds: Option<u64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MonitoringConfig {
    pub enabled: bool,
}

impl ArloaderConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| ArloaderError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// Replaces `${VAR}` with the variable's value. Unset variables are left
    /// as written.
    fn substitute_env_vars(content: &str) -> Result<String> {
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| ArloaderError::ConfigError {
            message: e.to_string(),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    pub fn validate_config(&self) -> Result<()> {
        if let Some(base_url) = &self.network.base_url {
            validate_url("network.base_url", base_url)?;
        }
        if let Some(oracle_url) = &self.network.oracle_url {
            validate_url("network.oracle_url", oracle_url)?;
        }
        if let Some(path) = &self.wallet.ar_keypair_path {
            validate_path("wallet.ar_keypair_path", path)?;
        }
        if let Some(reward_multiplier) = self.upload.reward_multiplier {
            validate_reward_multiplier(reward_multiplier)?;
        }
        if let Some(buffer) = self.upload.buffer {
            validate_positive_number("upload.buffer", buffer, 1)?;
        }
        if let Some(bundle_size_mb) = self.upload.bundle_size_mb {
            validate_range("upload.bundle_size_mb", bundle_size_mb, 1, 200)?;
        }
        if let Some(log_dir) = &self.upload.log_dir {
            validate_path("upload.log_dir", log_dir)?;
        }
        Ok(())
    }
}

impl Validate for ArloaderConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_parse_full_config() {
        let toml_content = r#"
[network]
base_url = "https://arweave.net/"
oracle_url = "https://api.coingecko.com/api/v3/simple/price?ids=arweave&vs_currencies=usd"

[wallet]
ar_keypair_path = "/keys/arweave.json"

[upload]
reward_multiplier = 1.5
buffer = 8
bundle_size_mb = 20
log_dir = "./logs"
retry_attempts = 3
retry_delay_seconds = 2

[monitoring]
enabled = true
"#;

        let config = ArloaderConfig::from_toml_str(toml_content).unwrap();
        assert_eq!(config.network.base_url.as_deref(), Some("https://arweave.net/"));
        assert_eq!(
            config.wallet.ar_keypair_path.as_deref(),
            Some("/keys/arweave.json")
        );
        assert_eq!(config.upload.reward_multiplier, Some(1.5));
        assert_eq!(config.upload.buffer, Some(8));
        assert_eq!(config.upload.retry_attempts, Some(3));
        assert!(config.monitoring.enabled);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_sections_are_optional() {
        let config = ArloaderConfig::from_toml_str("[upload]\nbuffer = 2\n").unwrap();
        assert_eq!(config.upload.buffer, Some(2));
        assert!(config.network.base_url.is_none());
        assert!(!config.monitoring.enabled);

        let empty = ArloaderConfig::from_toml_str("").unwrap();
        assert_eq!(empty, ArloaderConfig::default());
    }

    #[test]
    fn test_env_var_substitution() {
        std::env::set_var("ARLOADER_TEST_KEYPAIR", "/secret/wallet.json");

        let toml_content = r#"
[wallet]
ar_keypair_path = "${ARLOADER_TEST_KEYPAIR}"

[upload]
log_dir = "${ARLOADER_TEST_UNSET_VAR}"
"#;

        let config = ArloaderConfig::from_toml_str(toml_content).unwrap();
        assert_eq!(
            config.wallet.ar_keypair_path.as_deref(),
            Some("/secret/wallet.json")
        );
        assert_eq!(
            config.upload.log_dir.as_deref(),
            Some("${ARLOADER_TEST_UNSET_VAR}")
        );

        std::env::remove_var("ARLOADER_TEST_KEYPAIR");
    }

    #[test]
    fn test_config_validation() {
        let bad_url = ArloaderConfig::from_toml_str("[network]\nbase_url = \"arweave.net\"\n").unwrap();
        assert!(bad_url.validate().is_err());

        let bad_mult = ArloaderConfig::from_toml_str("[upload]\nreward_multiplier = 5.0\n").unwrap();
        assert!(bad_mult.validate().is_err());

        let bad_size = ArloaderConfig::from_toml_str("[upload]\nbundle_size_mb = 500\n").unwrap();
        assert!(bad_size.validate().is_err());

        let bad_buffer = ArloaderConfig::from_toml_str("[upload]\nbuffer = 0\n").unwrap();
        assert!(bad_buffer.validate().is_err());
    }

    #[test]
    fn test_invalid_toml_is_config_error() {
        let err = ArloaderConfig::from_toml_str("[upload\nbuffer = 2").unwrap_err();
        assert!(matches!(err, ArloaderError::ConfigValidationError { .. }));
    }

    #[test]
    fn test_config_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file
            .write_all(b"[network]\nbase_url = \"http://localhost:1984\"\n")
            .unwrap();

        let config = ArloaderConfig::from_file(temp_file.path()).unwrap();
        assert_eq!(
            config.network.base_url.as_deref(),
            Some("http://localhost:1984")
        );
    }
}
