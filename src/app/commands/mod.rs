//! Command functions behind the CLI sub-commands. Each prints its results to
//! stdout and returns `Result<()>`.

mod network;
mod nft;
mod status;
mod upload;

pub use network::{
    command_estimate, command_get_pending_count, command_get_status, command_get_transaction,
    command_wallet_balance,
};
pub use nft::{command_update_metadata, command_upload_nfts, command_write_metaplex_items};
pub use status::{
    command_list_statuses, command_status_report, command_update_bundle_statuses,
    command_update_statuses,
};
pub use upload::{command_reupload, command_upload, command_upload_bundles, command_upload_manifest};

use crate::core::arweave::{Arweave, WINSTONS_PER_AR};
use crate::domain::status::{BundleStatus, Status, StatusCode};
use crate::utils::error::{ArloaderError, Result};
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Results of a batch where one failure does not stop the others.
#[derive(Debug)]
pub(crate) struct BatchOutcome<T> {
    pub succeeded: Vec<T>,
    pub failed: Vec<ArloaderError>,
}

impl<T> Default for BatchOutcome<T> {
    fn default() -> Self {
        Self {
            succeeded: Vec::new(),
            failed: Vec::new(),
        }
    }
}

impl<T> BatchOutcome<T> {
    pub fn push(&mut self, result: Result<T>) {
        match result {
            Ok(value) => self.succeeded.push(value),
            Err(e) => {
                tracing::warn!("⚠️ {}", e);
                self.failed.push(e);
            }
        }
    }

    /// Fails with the first error, if any.
    pub fn into_result(self) -> Result<Vec<T>> {
        match self.failed.into_iter().next() {
            Some(e) => Err(e),
            None => Ok(self.succeeded),
        }
    }
}

pub(crate) fn winstons_to_ar(winstons: u64) -> f64 {
    winstons as f64 / WINSTONS_PER_AR as f64
}

pub(crate) fn parse_status_codes(codes: &[String]) -> Result<Option<Vec<StatusCode>>> {
    if codes.is_empty() {
        return Ok(None);
    }
    codes
        .iter()
        .map(|c| StatusCode::from_str(c))
        .collect::<Result<Vec<_>>>()
        .map(Some)
}

/// The given log directory, created if needed, or a fresh `arloader_*`
/// directory next to the first file.
pub(crate) async fn resolve_log_dir(
    arweave: &Arweave,
    log_dir: Option<PathBuf>,
    paths: &[PathBuf],
) -> Result<PathBuf> {
    match log_dir {
        Some(log_dir) => {
            tokio::fs::create_dir_all(&log_dir).await?;
            Ok(log_dir)
        }
        None => {
            let parent = paths
                .first()
                .and_then(|p| p.parent())
                .filter(|p| !p.as_os_str().is_empty())
                .unwrap_or_else(|| Path::new("."));
            arweave.create_log_dir(parent).await
        }
    }
}

pub(crate) fn status_header() -> String {
    format!(" {:<43}  {:<10}  {:>8}  {}", "id", "status", "confirms", "path")
}

pub(crate) fn status_row(status: &Status) -> String {
    let confirms = status
        .raw_status
        .as_ref()
        .map_or(0, |r| r.number_of_confirmations);
    let path = status
        .file_path
        .as_deref()
        .map(|p| p.display().to_string())
        .unwrap_or_default();
    format!(
        " {:<43}  {:<10}  {:>8}  {}",
        status.id.to_string(),
        status.status.to_string(),
        confirms,
        path
    )
}

pub(crate) fn bundle_status_header() -> String {
    format!(
        " {:<43}  {:<10}  {:>8}  {:>6}  {:>12}",
        "bundle id", "status", "confirms", "files", "bytes"
    )
}

pub(crate) fn bundle_status_row(status: &BundleStatus) -> String {
    let confirms = status
        .raw_status
        .as_ref()
        .map_or(0, |r| r.number_of_confirmations);
    format!(
        " {:<43}  {:<10}  {:>8}  {:>6}  {:>12}",
        status.id.to_string(),
        status.status.to_string(),
        confirms,
        status.number_of_files,
        status.data_size
    )
}
