use super::{
    bundle_status_header, bundle_status_row, parse_status_codes, resolve_log_dir, status_header,
    status_row, BatchOutcome,
};
use crate::core::arweave::Arweave;
use crate::core::status_log::filter_statuses;
use crate::core::streams::{upload_bundles_stream, upload_files_stream};
use crate::domain::base64::Base64;
use crate::domain::model::PriceTerms;
use crate::domain::status::{BundleStatus, Status};
use crate::domain::tags::{tags_from_args, Tag};
use crate::utils::error::Result;
use crate::utils::monitor::UploadMonitor;
use crate::utils::paths::paths_from_glob;
use futures::StreamExt;
use std::path::{Path, PathBuf};

/// Uploads `paths` one transaction each, recording statuses in `log_dir`.
pub(crate) async fn upload_files(
    arweave: &Arweave,
    paths: Vec<PathBuf>,
    log_dir: &Path,
    tags: Vec<Tag<Base64>>,
    price_terms: PriceTerms,
    buffer: usize,
    monitor: &UploadMonitor,
) -> Result<BatchOutcome<Status>> {
    let tags = (!tags.is_empty()).then_some(tags);
    let mut stream = upload_files_stream(
        arweave,
        paths,
        tags,
        Some(log_dir.to_path_buf()),
        None,
        price_terms,
        buffer,
    );

    println!("{}", status_header());
    let mut outcome = BatchOutcome::default();
    while let Some(result) = stream.next().await {
        if let Ok(status) = &result {
            println!("{}", status_row(status));
            if let Some(len) = status
                .file_path
                .as_deref()
                .and_then(|p| p.metadata().ok())
                .map(|m| m.len())
            {
                monitor.record_upload(len);
            }
        }
        outcome.push(result);
    }
    monitor.log_stats("Files uploaded");
    Ok(outcome)
}

/// Bundles `paths` and uploads the bundles, writing each bundle status to
/// `log_dir` as soon as it is posted.
#[allow(clippy::too_many_arguments)]
pub(crate) async fn upload_bundles(
    arweave: &Arweave,
    paths: Vec<PathBuf>,
    log_dir: &Path,
    tags: Vec<Tag<String>>,
    price_terms: PriceTerms,
    bundle_size: u64,
    buffer: usize,
    monitor: &UploadMonitor,
) -> Result<BatchOutcome<BundleStatus>> {
    let paths_chunks = arweave.chunk_file_paths(paths, bundle_size)?;
    tracing::info!("📦 Uploading {} bundles", paths_chunks.len());

    let mut stream = upload_bundles_stream(arweave, paths_chunks, tags, price_terms, buffer);

    println!("{}", bundle_status_header());
    let mut outcome = BatchOutcome::default();
    while let Some(result) = stream.next().await {
        let result = match result {
            Ok(status) => arweave
                .write_bundle_status(&status, log_dir)
                .await
                .map(|_| status),
            Err(e) => Err(e),
        };
        if let Ok(status) = &result {
            println!("{}", bundle_status_row(status));
            monitor.record_upload(status.data_size);
            monitor.log_stats("Bundle uploaded");
        }
        outcome.push(result);
    }
    Ok(outcome)
}

fn print_upload_summary(uploaded: usize, failed: usize, log_dir: &Path, glob_str: Option<&str>) {
    println!(
        "\nUploaded {} transactions ({} failed). Statuses written to {}.",
        uploaded,
        failed,
        log_dir.display()
    );
    match glob_str {
        Some(glob_str) => println!(
            "Run `arloader update-status \"{}\" --log-dir {}` to confirm the uploads.",
            glob_str,
            log_dir.display()
        ),
        None => println!(
            "Run `arloader update-bundle-status --log-dir {}` to confirm the uploads.",
            log_dir.display()
        ),
    }
}

pub async fn command_upload(
    arweave: &Arweave,
    glob_str: &str,
    log_dir: Option<PathBuf>,
    tags: &[String],
    reward_mult: f32,
    buffer: usize,
    monitor: &UploadMonitor,
) -> Result<()> {
    let paths = paths_from_glob(glob_str)?;
    let tags = tags_from_args::<Tag<Base64>>(tags)?;
    let log_dir = resolve_log_dir(arweave, log_dir, &paths).await?;
    let price_terms = arweave.get_price_terms(reward_mult).await?;

    let outcome = upload_files(
        arweave,
        paths,
        &log_dir,
        tags,
        price_terms,
        buffer,
        monitor,
    )
    .await?;

    print_upload_summary(
        outcome.succeeded.len(),
        outcome.failed.len(),
        &log_dir,
        Some(glob_str),
    );
    monitor.log_final_stats();
    Ok(())
}

#[allow(clippy::too_many_arguments)]
pub async fn command_upload_bundles(
    arweave: &Arweave,
    glob_str: &str,
    log_dir: Option<PathBuf>,
    tags: &[String],
    reward_mult: f32,
    bundle_size: u64,
    buffer: usize,
    monitor: &UploadMonitor,
) -> Result<()> {
    let paths = paths_from_glob(glob_str)?;
    let tags = tags_from_args::<Tag<String>>(tags)?;
    let log_dir = resolve_log_dir(arweave, log_dir, &paths).await?;
    let price_terms = arweave.get_price_terms(reward_mult).await?;

    let outcome = upload_bundles(
        arweave,
        paths,
        &log_dir,
        tags,
        price_terms,
        bundle_size,
        buffer,
        monitor,
    )
    .await?;

    print_upload_summary(outcome.succeeded.len(), outcome.failed.len(), &log_dir, None);
    monitor.log_final_stats();
    Ok(())
}

/// Uploads again the files whose recorded status matches `statuses` and
/// `max_confirms`, overwriting their status files.
#[allow(clippy::too_many_arguments)]
pub async fn command_reupload(
    arweave: &Arweave,
    glob_str: &str,
    log_dir: &Path,
    statuses: &[String],
    max_confirms: Option<u64>,
    tags: &[String],
    reward_mult: f32,
    buffer: usize,
    monitor: &UploadMonitor,
) -> Result<()> {
    let codes = parse_status_codes(statuses)?;
    let paths = paths_from_glob(glob_str)?;
    let tags = tags_from_args::<Tag<Base64>>(tags)?;

    let recorded = arweave.read_statuses(paths, log_dir).await?;
    let paths: Vec<PathBuf> = filter_statuses(recorded, codes.as_deref(), max_confirms)
        .into_iter()
        .filter_map(|s| s.file_path)
        .collect();

    if paths.is_empty() {
        println!("No files matched the status filters, nothing to re-upload.");
        return Ok(());
    }
    tracing::info!("🔁 Re-uploading {} files", paths.len());

    let price_terms = arweave.get_price_terms(reward_mult).await?;
    let outcome = upload_files(arweave, paths, log_dir, tags, price_terms, buffer, monitor).await?;

    print_upload_summary(
        outcome.succeeded.len(),
        outcome.failed.len(),
        log_dir,
        Some(glob_str),
    );
    monitor.log_final_stats();
    Ok(())
}

pub async fn command_upload_manifest(
    arweave: &Arweave,
    log_dir: &Path,
    reward_mult: f32,
) -> Result<()> {
    let price_terms = arweave.get_price_terms(reward_mult).await?;
    let message = arweave
        .upload_manifest_from_log_dir(log_dir, price_terms)
        .await?;
    println!("{}", message);
    Ok(())
}
