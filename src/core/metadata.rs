//! NFT metadata files and the metaplex items file built from them.
//!
//! Each asset `<name>.<ext>` is expected to have a metadata file
//! `<name>.json` next to it. Links point either at the file's own transaction
//! (`<gateway>/<id>`) or at its path under a manifest
//! (`<gateway>/<manifest id>/<path>`).

use crate::core::arweave::Arweave;
use crate::utils::error::{ArloaderError, Result};
use futures::future::try_join_all;
use serde_json::{json, Map, Value};
use std::path::{Path, PathBuf};
use tokio::fs;

/// Metadata JSON and the file it was read from.
#[derive(Debug, Clone, PartialEq)]
pub struct MetadataFile {
    pub file_path: PathBuf,
    pub metadata: Value,
}

/// Consolidated manifest (`manifest_<id>.json`) loaded from disk.
#[derive(Debug, Clone)]
pub struct ManifestFile {
    pub id: String,
    pub path: PathBuf,
    pub entries: Map<String, Value>,
}

impl ManifestFile {
    pub async fn read(manifest_path: &Path) -> Result<ManifestFile> {
        if !fs::try_exists(manifest_path).await? {
            return Err(ArloaderError::ManifestNotFound {
                path: manifest_path.display().to_string(),
            });
        }

        let id = manifest_path
            .file_stem()
            .and_then(|s| s.to_str())
            .map(|s| s.trim_start_matches("manifest_").to_string())
            .unwrap_or_default();

        let data = fs::read_to_string(manifest_path).await?;
        let entries = match serde_json::from_str::<Value>(&data)? {
            Value::Object(entries) => entries,
            _ => {
                return Err(ArloaderError::InvalidMetadata {
                    path: manifest_path.display().to_string(),
                    message: "manifest is not a JSON object".to_string(),
                })
            }
        };

        Ok(ManifestFile {
            id,
            path: manifest_path.to_path_buf(),
            entries,
        })
    }

    pub fn entry(&self, file_path: &Path) -> Result<&Value> {
        let key = file_path.display().to_string();
        self.entries
            .get(&key)
            .ok_or(ArloaderError::PathNotInManifest { path: key })
    }

    pub fn entry_id(&self, file_path: &Path) -> Result<&str> {
        self.entry(file_path)?["id"]
            .as_str()
            .ok_or_else(|| ArloaderError::PathNotInManifest {
                path: file_path.display().to_string(),
            })
    }
}

fn invalid(path: &Path, message: &str) -> ArloaderError {
    ArloaderError::InvalidMetadata {
        path: path.display().to_string(),
        message: message.to_string(),
    }
}

impl Arweave {
    pub async fn read_metadata_file(&self, file_path: &Path) -> Result<MetadataFile> {
        let data = fs::read_to_string(file_path).await?;
        Ok(MetadataFile {
            file_path: file_path.to_path_buf(),
            metadata: serde_json::from_str(&data)?,
        })
    }

    /// Sets `image` and `animation_url` when given and appends `files` to
    /// `properties.files`, creating either when absent.
    pub async fn update_metadata_file(
        &self,
        file_path: &Path,
        mut files: Vec<Value>,
        image_link: Option<String>,
        animation_url_link: Option<String>,
    ) -> Result<()> {
        let data = fs::read_to_string(file_path).await?;
        let mut metadata: Value = serde_json::from_str(&data)?;
        let object = metadata
            .as_object_mut()
            .ok_or_else(|| invalid(file_path, "metadata is not a JSON object"))?;

        if let Some(image_link) = image_link {
            object.insert("image".to_string(), Value::String(image_link));
        }
        if let Some(animation_url_link) = animation_url_link {
            object.insert("animation_url".to_string(), Value::String(animation_url_link));
        }

        let properties = object
            .entry("properties")
            .or_insert_with(|| json!({}))
            .as_object_mut()
            .ok_or_else(|| invalid(file_path, "`properties` is not an object"))?;
        let existing = properties
            .entry("files")
            .or_insert_with(|| json!([]))
            .as_array_mut()
            .ok_or_else(|| invalid(file_path, "`properties.files` is not an array"))?;
        existing.append(&mut files);

        fs::write(file_path, serde_json::to_string(&metadata)?).await?;
        Ok(())
    }

    /// Points the metadata file of each asset at the asset's upload. With
    /// `link_file` the link uses the manifest path and every file entry is
    /// appended; otherwise the bare id link and only the first entry.
    pub async fn update_metadata<IP>(
        &self,
        asset_paths: IP,
        manifest_path: &Path,
        link_file: bool,
        update_image: bool,
        update_animation_url: bool,
    ) -> Result<Vec<PathBuf>>
    where
        IP: IntoIterator<Item = PathBuf>,
    {
        let manifest = ManifestFile::read(manifest_path).await?;

        let updates = asset_paths
            .into_iter()
            .map(|asset_path| {
                let entry = manifest.entry(&asset_path)?;
                let (link, files) = if link_file {
                    let key = asset_path.display().to_string();
                    let files = entry["files"].as_array().cloned().unwrap_or_default();
                    (self.gateway_link(&manifest.id, Some(&key)), files)
                } else {
                    let id = manifest.entry_id(&asset_path)?;
                    let files = entry["files"]
                        .as_array()
                        .and_then(|f| f.first())
                        .cloned()
                        .into_iter()
                        .collect();
                    (self.gateway_link(id, None), files)
                };
                Ok((asset_path.with_extension("json"), link, files))
            })
            .collect::<Result<Vec<_>>>()?;

        try_join_all(updates.iter().map(|(metadata_path, link, files)| {
            self.update_metadata_file(
                metadata_path,
                files.clone(),
                update_image.then(|| link.clone()),
                update_animation_url.then(|| link.clone()),
            )
        }))
        .await?;

        tracing::info!("Updated {} metadata files", updates.len());
        Ok(updates.into_iter().map(|(p, _, _)| p).collect())
    }

    /// Writes `metaplex_items_<manifest id>.json` next to the manifest, keyed
    /// by metadata file stem, in the format candy machine uploads expect.
    pub async fn write_metaplex_items<IP>(
        &self,
        metadata_paths: IP,
        manifest_path: &Path,
        link_file: bool,
    ) -> Result<PathBuf>
    where
        IP: IntoIterator<Item = PathBuf>,
    {
        let manifest = ManifestFile::read(manifest_path).await?;
        let metadata = try_join_all(
            metadata_paths
                .into_iter()
                .map(|p| async move { self.read_metadata_file(&p).await }),
        )
        .await?;

        let mut items = Map::new();
        for meta in metadata {
            let name = meta.metadata["name"].as_str().ok_or_else(|| {
                ArloaderError::MissingMetadataField {
                    path: meta.file_path.display().to_string(),
                    field: "name".to_string(),
                }
            })?;
            let id = manifest.entry_id(&meta.file_path)?;
            let link = if link_file {
                self.gateway_link(&manifest.id, Some(&meta.file_path.display().to_string()))
            } else {
                self.gateway_link(id, None)
            };

            let stem = meta
                .file_path
                .file_stem()
                .and_then(|s| s.to_str())
                .unwrap_or_default()
                .to_string();
            items.insert(stem, json!({"name": name, "link": link, "onChain": false}));
        }

        let items_path = manifest
            .path
            .parent()
            .unwrap_or_else(|| Path::new("."))
            .join(format!("metaplex_items_{}.json", manifest.id));
        fs::write(&items_path, serde_json::to_string(&Value::Object(items))?).await?;
        Ok(items_path)
    }
}
