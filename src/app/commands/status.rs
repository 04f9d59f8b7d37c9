use super::{
    bundle_status_header, bundle_status_row, parse_status_codes, status_header, status_row,
    BatchOutcome,
};
use crate::core::arweave::Arweave;
use crate::core::status_log::filter_statuses;
use crate::core::streams::{update_bundle_statuses_stream, update_statuses_stream};
use crate::utils::error::Result;
use crate::utils::paths::paths_from_glob;
use futures::StreamExt;
use std::path::Path;

/// Refreshes the status of every matched file from the network.
pub async fn command_update_statuses(
    arweave: &Arweave,
    glob_str: &str,
    log_dir: &Path,
    buffer: usize,
) -> Result<()> {
    let paths = paths_from_glob(glob_str)?;
    let mut stream = update_statuses_stream(arweave, paths, log_dir.to_path_buf(), buffer);

    println!("{}", status_header());
    let mut outcome = BatchOutcome::default();
    while let Some(result) = stream.next().await {
        if let Ok(status) = &result {
            println!("{}", status_row(status));
        }
        outcome.push(result);
    }

    println!(
        "\nUpdated {} statuses ({} failed).",
        outcome.succeeded.len(),
        outcome.failed.len()
    );
    Ok(())
}

/// Refreshes every bundle status file in `log_dir`.
pub async fn command_update_bundle_statuses(
    arweave: &Arweave,
    log_dir: &Path,
    buffer: usize,
) -> Result<()> {
    let paths = arweave.bundle_status_paths(log_dir)?;
    if paths.is_empty() {
        println!("No bundle statuses found in {}.", log_dir.display());
        return Ok(());
    }

    let mut stream = update_bundle_statuses_stream(arweave, paths, buffer);

    println!("{}", bundle_status_header());
    let mut outcome = BatchOutcome::default();
    while let Some(result) = stream.next().await {
        if let Ok(status) = &result {
            println!("{}", bundle_status_row(status));
        }
        outcome.push(result);
    }

    println!(
        "\nUpdated {} bundle statuses ({} failed).",
        outcome.succeeded.len(),
        outcome.failed.len()
    );
    Ok(())
}

/// Prints stored statuses without querying the network.
pub async fn command_list_statuses(
    arweave: &Arweave,
    glob_str: &str,
    log_dir: &Path,
    statuses: &[String],
    max_confirms: Option<u64>,
) -> Result<()> {
    let codes = parse_status_codes(statuses)?;
    let paths = paths_from_glob(glob_str)?;
    let recorded = arweave.read_statuses(paths, log_dir).await?;
    let filtered = filter_statuses(recorded, codes.as_deref(), max_confirms);

    println!("{}", status_header());
    for status in &filtered {
        println!("{}", status_row(status));
    }
    println!("\nFound {} statuses.", filtered.len());
    Ok(())
}

pub async fn command_status_report(arweave: &Arweave, glob_str: &str, log_dir: &Path) -> Result<()> {
    let paths = paths_from_glob(glob_str)?;
    let summary = arweave.status_summary(paths, log_dir).await?;
    println!("{}", summary);
    Ok(())
}
