//! Path manifests mapping uploaded file paths to transaction ids.

use crate::core::arweave::{Arweave, MANIFEST_CONTENT_TYPE};
use crate::core::bundle::DataItem;
use crate::domain::base64::Base64;
use crate::domain::model::PriceTerms;
use crate::domain::status::{BundleStatus, Status};
use crate::domain::tags::{FromUtf8Strs, Tag};
use crate::domain::transaction::Transaction;
use crate::utils::error::Result;
use serde_json::{json, Map, Value};
use std::path::{Path, PathBuf};
use tokio::fs;

pub const MANIFEST_TYPE: &str = "arweave/paths";
pub const MANIFEST_VERSION: &str = "0.1.0";

fn wrap_paths(paths: Map<String, Value>) -> Value {
    json!({
        "manifest": MANIFEST_TYPE,
        "version": MANIFEST_VERSION,
        "paths": Value::Object(paths)
    })
}

/// Name of the consolidated manifest file written for `transaction_id`.
pub fn manifest_file_name(transaction_id: &str) -> String {
    format!("manifest_{}.json", transaction_id)
}

impl Arweave {
    /// `<gateway>/<id>` or, with a path, `<gateway>/<id>/<path>`.
    pub fn gateway_link(&self, id: &str, path: Option<&str>) -> String {
        match path {
            Some(path) => format!("{}{}/{}", self.base_url, id, path),
            None => format!("{}{}", self.base_url, id),
        }
    }

    /// Manifest of file statuses. Statuses without a file path are skipped.
    pub fn create_manifest(&self, statuses: Vec<Status>) -> Result<Value> {
        let paths = statuses
            .into_iter()
            .filter_map(|s| {
                let file_path = s.file_path?;
                Some((
                    file_path.display().to_string(),
                    json!({"id": s.id.to_string(), "content_type": s.content_type}),
                ))
            })
            .collect();
        Ok(wrap_paths(paths))
    }

    pub fn create_manifest_from_bundle_statuses(&self, statuses: Vec<BundleStatus>) -> Result<Value> {
        let mut paths = Map::new();
        for status in statuses {
            if let Value::Object(mut file_paths) = status.file_paths {
                paths.append(&mut file_paths);
            }
        }
        Ok(wrap_paths(paths))
    }

    /// Unsigned data item carrying a manifest, for inclusion in a bundle.
    pub fn create_data_item_from_manifest(&self, manifest: &Value) -> Result<DataItem> {
        let tags = vec![Tag::<String>::from_utf8_strs(
            "Content-Type",
            MANIFEST_CONTENT_TYPE,
        )?];
        self.create_data_item(serde_json::to_vec(manifest)?, tags, false)
    }

    pub async fn create_transaction_from_manifest(
        &self,
        manifest: &Value,
        price_terms: PriceTerms,
    ) -> Result<Transaction> {
        let tags = vec![Tag::<Base64>::from_utf8_strs(
            "Content-Type",
            MANIFEST_CONTENT_TYPE,
        )?];
        let data = serde_json::to_vec(manifest)?;
        self.create_transaction(data, Some(tags), None, price_terms, false)
            .await
    }

    /// Uploads a manifest of every status in `log_dir` and writes the
    /// consolidated manifest file next to them. Returns a message for the user.
    pub async fn upload_manifest_from_log_dir(
        &self,
        log_dir: &Path,
        price_terms: PriceTerms,
    ) -> Result<String> {
        let bundle_statuses = self.read_bundle_statuses(log_dir).await?;
        let file_statuses = self.read_log_dir_statuses(log_dir).await?;

        let mut manifest = self.create_manifest_from_bundle_statuses(bundle_statuses)?;
        let file_manifest = self.create_manifest(file_statuses)?;
        if let (Some(paths), Some(file_paths)) = (
            manifest["paths"].as_object_mut(),
            file_manifest["paths"].as_object(),
        ) {
            paths.extend(file_paths.clone());
        }

        let num_files = manifest["paths"].as_object().map_or(0, |p| p.len());
        if num_files == 0 {
            return Ok(format!("No statuses found in {}", log_dir.display()));
        }

        let (id, manifest_path) = self.post_manifest(&manifest, log_dir, price_terms).await?;

        Ok(format!(
            "Uploaded manifest for {} files and wrote to {}.\n\nRun `arloader get-status {}` to confirm manifest transaction.",
            num_files,
            manifest_path.display(),
            id
        ))
    }

    /// Signs and posts `manifest`, then writes the consolidated manifest file
    /// to `log_dir`. Returns the manifest transaction id and the file path.
    pub async fn post_manifest(
        &self,
        manifest: &Value,
        log_dir: &Path,
        price_terms: PriceTerms,
    ) -> Result<(String, PathBuf)> {
        let transaction = self
            .create_transaction_from_manifest(manifest, price_terms)
            .await?;
        let signed_transaction = self.sign_transaction(transaction)?;
        let (id, _) = self.post_transaction(&signed_transaction).await?;
        let id = id.to_string();

        let manifest_path = self.write_manifest(manifest, &id, log_dir).await?;
        let num_files = manifest["paths"].as_object().map_or(0, |p| p.len());
        tracing::info!("Uploaded manifest {} for {} files", id, num_files);
        Ok((id, manifest_path))
    }

    /// Writes `manifest_<transaction_id>.json`, listing for each path its id
    /// and both gateway links to the file.
    pub async fn write_manifest(
        &self,
        manifest: &Value,
        transaction_id: &str,
        log_dir: &Path,
    ) -> Result<PathBuf> {
        let mut consolidated = Map::new();
        if let Some(paths) = manifest["paths"].as_object() {
            for (file_path, entry) in paths {
                let id = entry["id"].as_str().unwrap_or_default();
                let content_type = entry["content_type"].as_str().unwrap_or_default();
                consolidated.insert(
                    file_path.clone(),
                    json!({
                        "id": id,
                        "files": [
                            {"uri": self.gateway_link(id, None), "type": content_type},
                            {"uri": self.gateway_link(transaction_id, Some(file_path)), "type": content_type}
                        ]
                    }),
                );
            }
        }

        let path = log_dir.join(manifest_file_name(transaction_id));
        fs::write(&path, serde_json::to_string(&Value::Object(consolidated))?).await?;
        Ok(path)
    }
}
