use crate::utils::error::{ArloaderError, Result};
use url::Url;

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

pub fn validate_url(field_name: &str, url_str: &str) -> Result<()> {
    if url_str.is_empty() {
        return Err(ArloaderError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: url_str.to_string(),
            reason: "URL cannot be empty".to_string(),
        });
    }

    match Url::parse(url_str) {
        Ok(url) => match url.scheme() {
            "http" | "https" => Ok(()),
            scheme => Err(ArloaderError::InvalidConfigValueError {
                field: field_name.to_string(),
                value: url_str.to_string(),
                reason: format!("Unsupported URL scheme: {}", scheme),
            }),
        },
        Err(e) => Err(ArloaderError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: url_str.to_string(),
            reason: format!("Invalid URL format: {}", e),
        }),
    }
}

pub fn validate_path(field_name: &str, path: &str) -> Result<()> {
    if path.is_empty() {
        return Err(ArloaderError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path cannot be empty".to_string(),
        });
    }

    if path.contains('\0') {
        return Err(ArloaderError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path contains null bytes".to_string(),
        });
    }

    Ok(())
}

pub fn validate_positive_number(field_name: &str, value: usize, min_value: usize) -> Result<()> {
    if value < min_value {
        return Err(ArloaderError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: format!("Value must be at least {}", min_value),
        });
    }
    Ok(())
}

pub fn validate_range<T: PartialOrd + std::fmt::Display + Copy>(
    field_name: &str,
    value: T,
    min: T,
    max: T,
) -> Result<()> {
    if value < min || value > max {
        return Err(ArloaderError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: format!("Value must be between {} and {}", min, max),
        });
    }
    Ok(())
}

/// Reward multipliers must lie in (0, 3].
pub fn validate_reward_multiplier(value: f32) -> Result<()> {
    if value <= 0.0 || value > 3.0 {
        return Err(ArloaderError::InvalidConfigValueError {
            field: "reward_multiplier".to_string(),
            value: value.to_string(),
            reason: "Value must be greater than 0 and at most 3".to_string(),
        });
    }
    Ok(())
}

/// Splits a `name:value` tag argument. Only the first colon separates, so
/// values may contain colons.
pub fn parse_tag_arg(arg: &str) -> Result<(String, String)> {
    match arg.split_once(':') {
        Some((name, value)) if !name.trim().is_empty() => {
            Ok((name.trim().to_string(), value.trim().to_string()))
        }
        _ => Err(ArloaderError::InvalidConfigValueError {
            field: "tags".to_string(),
            value: arg.to_string(),
            reason: "Tags must be formatted as name:value".to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_url() {
        assert!(validate_url("base_url", "https://arweave.net").is_ok());
        assert!(validate_url("base_url", "http://localhost:1984").is_ok());
        assert!(validate_url("base_url", "").is_err());
        assert!(validate_url("base_url", "invalid-url").is_err());
        assert!(validate_url("base_url", "ftp://arweave.net").is_err());
    }

    #[test]
    fn test_validate_positive_number() {
        assert!(validate_positive_number("buffer", 5, 1).is_ok());
        assert!(validate_positive_number("buffer", 0, 1).is_err());
    }

    #[test]
    fn test_validate_range() {
        assert!(validate_range("bundle_size_mb", 10u64, 1, 200).is_ok());
        assert!(validate_range("bundle_size_mb", 0u64, 1, 200).is_err());
        assert!(validate_range("bundle_size_mb", 201u64, 1, 200).is_err());
    }

    #[test]
    fn test_validate_reward_multiplier() {
        assert!(validate_reward_multiplier(1.0).is_ok());
        assert!(validate_reward_multiplier(3.0).is_ok());
        assert!(validate_reward_multiplier(0.0).is_err());
        assert!(validate_reward_multiplier(3.5).is_err());
    }

    #[test]
    fn test_parse_tag_arg() {
        assert_eq!(
            parse_tag_arg("App-Name:arloader").unwrap(),
            ("App-Name".to_string(), "arloader".to_string())
        );
        assert_eq!(
            parse_tag_arg("url:https://arweave.net").unwrap(),
            ("url".to_string(), "https://arweave.net".to_string())
        );
        assert!(parse_tag_arg("no-colon").is_err());
        assert!(parse_tag_arg(":value").is_err());
    }
}
