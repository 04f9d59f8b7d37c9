use crate::domain::base64::Base64;
use crate::domain::model::PriceTerms;
use crate::domain::status::Status;
use crate::domain::tags::Tag;
use crate::utils::error::Result;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::time::Duration;
use url::Url;

/// Resolved settings, whatever their source (CLI flags, config file, defaults).
pub trait ConfigProvider: Send + Sync {
    fn base_url(&self) -> &Url;
    fn oracle_url(&self) -> &Url;
    fn ar_keypair_path(&self) -> Option<&Path>;
    fn reward_multiplier(&self) -> f32;
    fn buffer(&self) -> usize;
    /// Maximum bundle size in bytes.
    fn bundle_size(&self) -> u64;
    fn log_dir(&self) -> Option<&Path>;
    /// Extra attempts after a failed post to `tx` or `chunk`.
    fn retry_attempts(&self) -> u16;
    fn retry_delay(&self) -> Duration;
    fn monitoring_enabled(&self) -> bool;
}

/// Network operations used by the read-only commands and by single uploads.
#[async_trait]
pub trait ArweaveApi: Send + Sync {
    fn get_url(&self) -> &Url;

    async fn get_price_terms(&self, reward_mult: f32) -> Result<PriceTerms>;

    async fn upload_raw_data(
        &self,
        data: Vec<u8>,
        content_type: Option<&str>,
        log_dir: Option<PathBuf>,
        additional_tags: Option<Vec<Tag<Base64>>>,
        last_tx: Option<Base64>,
    ) -> Result<Status>;

    async fn upload_file_from_path(
        &self,
        file_path: PathBuf,
        log_dir: Option<PathBuf>,
        additional_tags: Option<Vec<Tag<Base64>>>,
        last_tx: Option<Base64>,
        price_terms: PriceTerms,
    ) -> Result<Status>;

    async fn get_status(&self, id: &Base64) -> Result<Status>;

    async fn get_price(&self, bytes: u64) -> Result<u64>;
}
