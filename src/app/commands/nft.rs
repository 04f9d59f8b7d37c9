use super::resolve_log_dir;
use super::upload::upload_bundles;
use crate::core::arweave::Arweave;
use crate::domain::tags::{tags_from_args, Tag};
use crate::utils::error::Result;
use crate::utils::monitor::UploadMonitor;
use crate::utils::paths::paths_from_glob;
use std::path::{Path, PathBuf};

pub async fn command_update_metadata(
    arweave: &Arweave,
    glob_str: &str,
    manifest_path: &Path,
    link_file: bool,
    update_image: bool,
    update_animation_url: bool,
) -> Result<()> {
    let paths = paths_from_glob(glob_str)?;
    let updated = arweave
        .update_metadata(
            paths,
            manifest_path,
            link_file,
            update_image,
            update_animation_url,
        )
        .await?;
    println!("Updated {} metadata files.", updated.len());
    Ok(())
}

/// `glob_str` matches metadata files; `manifest_path` is the manifest they
/// were uploaded under.
pub async fn command_write_metaplex_items(
    arweave: &Arweave,
    glob_str: &str,
    manifest_path: &Path,
    link_file: bool,
) -> Result<()> {
    let paths = paths_from_glob(glob_str)?;
    let items_path = arweave
        .write_metaplex_items(paths, manifest_path, link_file)
        .await?;
    println!("Wrote metaplex items to {}.", items_path.display());
    Ok(())
}

/// Uploads NFT assets and their `<asset>.json` metadata files:
/// bundles the assets, posts a manifest, points the metadata at the assets,
/// bundles the metadata, posts a second manifest and writes the metaplex
/// items file for it.
#[allow(clippy::too_many_arguments)]
pub async fn command_upload_nfts(
    arweave: &Arweave,
    glob_str: &str,
    log_dir: Option<PathBuf>,
    tags: &[String],
    reward_mult: f32,
    bundle_size: u64,
    buffer: usize,
    link_file: bool,
    update_animation_url: bool,
    monitor: &UploadMonitor,
) -> Result<()> {
    let asset_paths = paths_from_glob(glob_str)?;
    let tags = tags_from_args::<Tag<String>>(tags)?;
    let price_terms = arweave.get_price_terms(reward_mult).await?;

    let assets_log_dir = resolve_log_dir(arweave, log_dir, &asset_paths).await?;
    let logs_parent = assets_log_dir
        .parent()
        .unwrap_or_else(|| Path::new("."))
        .to_path_buf();

    tracing::info!("🖼️ Uploading {} assets", asset_paths.len());
    let asset_statuses = upload_bundles(
        arweave,
        asset_paths.clone(),
        &assets_log_dir,
        tags.clone(),
        price_terms,
        bundle_size,
        buffer,
        monitor,
    )
    .await?
    .into_result()?;

    let assets_manifest = arweave.create_manifest_from_bundle_statuses(asset_statuses)?;
    let (assets_manifest_id, assets_manifest_path) = arweave
        .post_manifest(&assets_manifest, &assets_log_dir, price_terms)
        .await?;
    println!("Uploaded assets manifest {}.", assets_manifest_id);

    let metadata_paths = arweave
        .update_metadata(
            asset_paths,
            &assets_manifest_path,
            link_file,
            true,
            update_animation_url,
        )
        .await?;

    let metadata_log_dir = arweave.create_log_dir(&logs_parent).await?;
    tracing::info!("📝 Uploading {} metadata files", metadata_paths.len());
    let metadata_statuses = upload_bundles(
        arweave,
        metadata_paths.clone(),
        &metadata_log_dir,
        tags,
        price_terms,
        bundle_size,
        buffer,
        monitor,
    )
    .await?
    .into_result()?;

    let metadata_manifest = arweave.create_manifest_from_bundle_statuses(metadata_statuses)?;
    let (metadata_manifest_id, metadata_manifest_path) = arweave
        .post_manifest(&metadata_manifest, &metadata_log_dir, price_terms)
        .await?;
    println!("Uploaded metadata manifest {}.", metadata_manifest_id);

    let items_path = arweave
        .write_metaplex_items(metadata_paths, &metadata_manifest_path, link_file)
        .await?;

    println!(
        "\nUploaded NFT assets to {} and metadata to {}.\nMetaplex items written to {}.",
        assets_log_dir.display(),
        metadata_log_dir.display(),
        items_path.display()
    );
    println!(
        "Run `arloader update-bundle-status --log-dir {}` to confirm the uploads.",
        metadata_log_dir.display()
    );
    monitor.log_final_stats();
    Ok(())
}
