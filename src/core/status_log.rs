//! Upload status files kept in a log directory.
//!
//! A file upload is recorded as `<blake3 of its path>.json`, so each path has
//! at most one status per log directory. Uploads without a path use
//! `txid_<id>.json` and bundles use `<bundle id>.json`.

use crate::core::arweave::Arweave;
use crate::domain::base64::Base64;
use crate::domain::status::{BundleStatus, Filterable, Status, StatusCode};
use crate::utils::error::{ArloaderError, Result};
use crate::utils::paths::json_glob;
use chrono::Utc;
use futures::future::try_join_all;
use std::collections::HashMap;
use std::fmt::Write;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tokio::fs;

const SUMMARY_ORDER: [StatusCode; 4] = [
    StatusCode::Submitted,
    StatusCode::Pending,
    StatusCode::NotFound,
    StatusCode::Confirmed,
];

/// Whether the file stem decodes to a 32-byte transaction id.
pub fn file_stem_is_valid_txid(file_path: &Path) -> bool {
    file_path
        .file_stem()
        .and_then(|stem| stem.to_str())
        .and_then(|stem| Base64::from_str(stem).ok())
        .is_some_and(|id| id.0.len() == 32)
}

/// Stem of the status file recorded for `file_path`.
pub fn status_file_stem(file_path: &Path) -> String {
    blake3::hash(file_path.to_string_lossy().as_bytes())
        .to_hex()
        .to_string()
}

fn is_file_status_stem(stem: &str) -> bool {
    (stem.len() == 64 && stem.bytes().all(|b| b.is_ascii_hexdigit())) || stem.starts_with("txid_")
}

/// Keeps statuses whose code is in `codes` (when given) and whose
/// confirmations are at most `max_confirms` (when given). A missing raw status
/// counts as zero confirmations.
pub fn filter_statuses<S: Filterable>(
    statuses: Vec<S>,
    codes: Option<&[StatusCode]>,
    max_confirms: Option<u64>,
) -> Vec<S> {
    statuses
        .into_iter()
        .filter(|s| {
            let elements = s.get_filter_elements();
            let code_matches = codes.map_or(true, |codes| codes.contains(elements.status));
            let confirms_match = max_confirms.map_or(true, |max| elements.confirmations() <= max);
            code_matches && confirms_match
        })
        .collect()
}

/// Table of status counts in a fixed order, with a total.
pub fn format_status_summary(statuses: &[Status]) -> Result<String> {
    let counts = statuses.iter().fold(HashMap::new(), |mut map, s| {
        *map.entry(s.status).or_insert(0u64) += 1;
        map
    });

    let mut output = String::new();
    writeln!(output, " {:<15}  {:>10}", "status", "count")?;
    writeln!(output, "{:-<29}", "")?;
    let mut total = 0;
    for code in SUMMARY_ORDER {
        let count = counts.get(&code).copied().unwrap_or(0);
        writeln!(output, " {:<16} {:>10}", code.to_string(), count)?;
        total += count;
    }
    writeln!(output, "{:-<29}", "")?;
    writeln!(output, " {:<15}  {:>10}", "Total", total)?;
    Ok(output)
}

fn glob_log_dir(log_dir: &Path) -> Result<Vec<PathBuf>> {
    let pattern = json_glob(log_dir);
    let mut paths: Vec<PathBuf> = glob::glob(&pattern)?.filter_map(|p| p.ok()).collect();
    paths.sort();
    Ok(paths)
}

impl Arweave {
    /// Creates `parent/arloader_<random suffix>`.
    pub async fn create_log_dir(&self, parent_dir: &Path) -> Result<PathBuf> {
        let mut rand_bytes = [0u8; 8];
        self.crypto.fill_rand(&mut rand_bytes)?;
        let log_dir = parent_dir.join(format!("arloader_{}", Base64(rand_bytes.to_vec())));
        fs::create_dir_all(&log_dir).await?;
        tracing::debug!("Created log dir {}", log_dir.display());
        Ok(log_dir)
    }

    /// Writes `status` to `log_dir/<stem>.json` and returns the path written.
    pub async fn write_status(
        &self,
        status: &Status,
        log_dir: &Path,
        file_stem: Option<&str>,
    ) -> Result<PathBuf> {
        if status.id.is_empty() {
            return Err(ArloaderError::UnsignedTransaction);
        }

        let file_stem = match (file_stem, &status.file_path) {
            (Some(stem), _) => stem.to_string(),
            (None, Some(file_path)) => status_file_stem(file_path),
            (None, None) => format!("txid_{}", status.id),
        };

        let path = log_dir.join(file_stem).with_extension("json");
        fs::write(&path, serde_json::to_string(status)?).await?;
        Ok(path)
    }

    pub async fn write_bundle_status(&self, status: &BundleStatus, log_dir: &Path) -> Result<PathBuf> {
        if status.id.is_empty() {
            return Err(ArloaderError::UnsignedTransaction);
        }
        let path = log_dir.join(status.id.to_string()).with_extension("json");
        fs::write(&path, serde_json::to_string(status)?).await?;
        Ok(path)
    }

    /// Status recorded for `file_path` in `log_dir`.
    pub async fn read_status(&self, file_path: &Path, log_dir: &Path) -> Result<Status> {
        let status_path = log_dir
            .join(status_file_stem(file_path))
            .with_extension("json");

        if !fs::try_exists(&status_path).await? {
            return Err(ArloaderError::StatusNotFound {
                path: file_path.display().to_string(),
            });
        }
        let data = fs::read_to_string(status_path).await?;
        Ok(serde_json::from_str(&data)?)
    }

    pub async fn read_statuses<IP>(&self, paths_iter: IP, log_dir: &Path) -> Result<Vec<Status>>
    where
        IP: IntoIterator<Item = PathBuf>,
    {
        try_join_all(
            paths_iter
                .into_iter()
                .map(|p| async move { self.read_status(&p, log_dir).await }),
        )
        .await
    }

    /// Every single-file status in `log_dir`, whatever file it was for.
    pub async fn read_log_dir_statuses(&self, log_dir: &Path) -> Result<Vec<Status>> {
        let paths = glob_log_dir(log_dir)?.into_iter().filter(|p| {
            p.file_stem()
                .and_then(|s| s.to_str())
                .is_some_and(is_file_status_stem)
        });

        try_join_all(paths.map(|p| async move {
            let data = fs::read_to_string(&p).await?;
            Ok::<Status, ArloaderError>(serde_json::from_str(&data)?)
        }))
        .await
    }

    pub async fn read_bundle_status(&self, status_path: &Path) -> Result<BundleStatus> {
        let data = fs::read_to_string(status_path).await?;
        Ok(serde_json::from_str(&data)?)
    }

    /// Bundle statuses in `log_dir`, recognised by their transaction id stems.
    pub async fn read_bundle_statuses(&self, log_dir: &Path) -> Result<Vec<BundleStatus>> {
        let paths = self.bundle_status_paths(log_dir)?;
        try_join_all(
            paths
                .iter()
                .map(|p| async move { self.read_bundle_status(p).await }),
        )
        .await
    }

    pub fn bundle_status_paths(&self, log_dir: &Path) -> Result<Vec<PathBuf>> {
        Ok(glob_log_dir(log_dir)?
            .into_iter()
            .filter(|p| file_stem_is_valid_txid(p))
            .collect())
    }

    /// Refreshes the status of `file_path` from the network and saves it.
    pub async fn update_status(&self, file_path: &Path, log_dir: &Path) -> Result<Status> {
        let mut status = self.read_status(file_path, log_dir).await?;
        let network_status = self.get_status(&status.id).await?;
        status.last_modified = Utc::now();
        status.status = network_status.status;
        status.raw_status = network_status.raw_status;
        self.write_status(&status, log_dir, None).await?;
        Ok(status)
    }

    pub async fn update_statuses<IP>(&self, paths_iter: IP, log_dir: &Path) -> Result<Vec<Status>>
    where
        IP: IntoIterator<Item = PathBuf>,
    {
        try_join_all(
            paths_iter
                .into_iter()
                .map(|p| async move { self.update_status(&p, log_dir).await }),
        )
        .await
    }

    /// Refreshes a bundle status file in place.
    pub async fn update_bundle_status(&self, status_path: &Path) -> Result<BundleStatus> {
        let mut status = self.read_bundle_status(status_path).await?;
        let network_status = self.get_status(&status.id).await?;
        status.last_modified = Utc::now();
        status.status = network_status.status;
        status.raw_status = network_status.raw_status;
        fs::write(status_path, serde_json::to_string(&status)?).await?;
        Ok(status)
    }

    pub async fn status_summary<IP>(&self, paths_iter: IP, log_dir: &Path) -> Result<String>
    where
        IP: IntoIterator<Item = PathBuf>,
    {
        let statuses = self.read_statuses(paths_iter, log_dir).await?;
        format_status_summary(&statuses)
    }
}
