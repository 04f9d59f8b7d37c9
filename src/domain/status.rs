use crate::domain::base64::Base64;
use crate::utils::error::ArloaderError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StatusCode {
    #[default]
    Submitted,
    Pending,
    Confirmed,
    NotFound,
}

impl fmt::Display for StatusCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            StatusCode::Submitted => "Submitted",
            StatusCode::Pending => "Pending",
            StatusCode::Confirmed => "Confirmed",
            StatusCode::NotFound => "NotFound",
        };
        write!(f, "{}", s)
    }
}

impl FromStr for StatusCode {
    type Err = ArloaderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().replace(['-', '_'], "").as_str() {
            "submitted" => Ok(StatusCode::Submitted),
            "pending" => Ok(StatusCode::Pending),
            "confirmed" => Ok(StatusCode::Confirmed),
            "notfound" => Ok(StatusCode::NotFound),
            _ => Err(ArloaderError::InvalidConfigValueError {
                field: "statuses".to_string(),
                value: s.to_string(),
                reason: "Expected one of Submitted, Pending, Confirmed, NotFound".to_string(),
            }),
        }
    }
}

/// Block information the gateway returns for a mined transaction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawStatus {
    pub block_height: u64,
    pub block_indep_hash: Base64,
    pub number_of_confirmations: u64,
}

/// Upload record for one transaction, persisted in the log directory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Status {
    pub id: Base64,
    pub status: StatusCode,
    pub file_path: Option<PathBuf>,
    pub content_type: String,
    pub created_at: DateTime<Utc>,
    pub last_modified: DateTime<Utc>,
    pub reward: u64,
    pub raw_status: Option<RawStatus>,
}

impl Default for Status {
    fn default() -> Self {
        let now = Utc::now();
        Self {
            id: Base64::default(),
            status: StatusCode::default(),
            file_path: None,
            content_type: mime_guess::mime::APPLICATION_OCTET_STREAM.to_string(),
            created_at: now,
            last_modified: now,
            reward: 0,
            raw_status: None,
        }
    }
}

/// Upload record for a bundle transaction. `file_paths` maps each bundled
/// file path to `{"id", "content_type"}` of its data item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BundleStatus {
    pub id: Base64,
    pub status: StatusCode,
    pub file_paths: Value,
    pub number_of_files: u64,
    pub data_size: u64,
    pub created_at: DateTime<Utc>,
    pub last_modified: DateTime<Utc>,
    pub reward: u64,
    pub raw_status: Option<RawStatus>,
}

impl Default for BundleStatus {
    fn default() -> Self {
        let now = Utc::now();
        Self {
            id: Base64::default(),
            status: StatusCode::default(),
            file_paths: Value::Object(serde_json::Map::new()),
            number_of_files: 0,
            data_size: 0,
            created_at: now,
            last_modified: now,
            reward: 0,
            raw_status: None,
        }
    }
}

pub struct FilterElements<'a> {
    pub status: &'a StatusCode,
    pub raw_status: &'a Option<RawStatus>,
}

impl FilterElements<'_> {
    /// Confirmations, counting a missing raw status as zero.
    pub fn confirmations(&self) -> u64 {
        self.raw_status
            .as_ref()
            .map(|r| r.number_of_confirmations)
            .unwrap_or(0)
    }
}

pub trait Filterable {
    fn get_filter_elements(&self) -> FilterElements<'_>;
}

impl Filterable for Status {
    fn get_filter_elements(&self) -> FilterElements<'_> {
        FilterElements {
            status: &self.status,
            raw_status: &self.raw_status,
        }
    }
}

impl Filterable for BundleStatus {
    fn get_filter_elements(&self) -> FilterElements<'_> {
        FilterElements {
            status: &self.status,
            raw_status: &self.raw_status,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_code_parse_and_display() {
        assert_eq!(StatusCode::from_str("pending").unwrap(), StatusCode::Pending);
        assert_eq!(StatusCode::from_str("NotFound").unwrap(), StatusCode::NotFound);
        assert_eq!(StatusCode::from_str("not-found").unwrap(), StatusCode::NotFound);
        assert!(StatusCode::from_str("mined").is_err());
        assert_eq!(StatusCode::Confirmed.to_string(), "Confirmed");
    }

    #[test]
    fn test_status_defaults() {
        assert_eq!(StatusCode::default(), StatusCode::Submitted);
        let status = Status::default();
        assert_eq!(status.status, StatusCode::Submitted);
        assert_eq!(status.content_type, "application/octet-stream");
        assert!(status.raw_status.is_none());
    }

    #[test]
    fn test_raw_status_from_gateway_json() {
        let raw: RawStatus = serde_json::from_str(
            r#"{"block_height":812345,"block_indep_hash":"LCwsLCwsLA","number_of_confirmations":12}"#,
        )
        .unwrap();
        assert_eq!(raw.number_of_confirmations, 12);

        let status = Status {
            raw_status: Some(raw),
            ..Default::default()
        };
        assert_eq!(status.get_filter_elements().confirmations(), 12);
        assert_eq!(Status::default().get_filter_elements().confirmations(), 0);
    }

    #[test]
    fn test_bundle_status_serde() {
        let status = BundleStatus {
            id: Base64(vec![7; 32]),
            number_of_files: 2,
            file_paths: serde_json::json!({"a.png": {"id": "x", "content_type": "image/png"}}),
            ..Default::default()
        };
        let json = serde_json::to_string(&status).unwrap();
        let back: BundleStatus = serde_json::from_str(&json).unwrap();
        assert_eq!(back, status);
    }
}
