pub mod commands;

#[cfg(feature = "cli")]
use crate::config::{Command, Settings};
#[cfg(feature = "cli")]
use crate::core::arweave::Arweave;
#[cfg(feature = "cli")]
use crate::domain::ports::ConfigProvider;
#[cfg(feature = "cli")]
use crate::utils::error::{ArloaderError, Result};
#[cfg(feature = "cli")]
use crate::utils::monitor::UploadMonitor;
#[cfg(feature = "cli")]
use std::path::PathBuf;

#[cfg(feature = "cli")]
fn require_log_dir(log_dir: Option<PathBuf>) -> Result<PathBuf> {
    log_dir.ok_or_else(|| ArloaderError::MissingConfigError {
        field: "log_dir".to_string(),
    })
}

/// Runs one CLI command with resolved settings.
#[cfg(feature = "cli")]
pub async fn run(
    command: Command,
    arweave: &Arweave,
    settings: &Settings,
    monitor: &UploadMonitor,
) -> Result<()> {
    use commands::*;

    let reward_mult = settings.reward_multiplier();
    let buffer = settings.buffer();
    let log_dir = || require_log_dir(settings.log_dir.clone());

    match command {
        Command::Estimate { glob, no_bundle, .. } => {
            let bundle_size = (!no_bundle).then(|| settings.bundle_size());
            command_estimate(arweave, &glob, reward_mult, bundle_size).await
        }
        Command::WalletBalance { address } => command_wallet_balance(arweave, address).await,
        Command::Pending => command_get_pending_count(arweave).await,
        Command::GetStatus { id } => command_get_status(arweave, &id).await,
        Command::GetTransaction { id } => command_get_transaction(arweave, &id).await,
        Command::Upload { glob, upload } => {
            command_upload(
                arweave,
                &glob,
                settings.log_dir.clone(),
                &upload.tags,
                reward_mult,
                buffer,
                monitor,
            )
            .await
        }
        Command::UploadBundles { glob, upload, .. } => {
            command_upload_bundles(
                arweave,
                &glob,
                settings.log_dir.clone(),
                &upload.tags,
                reward_mult,
                settings.bundle_size(),
                buffer,
                monitor,
            )
            .await
        }
        Command::Reupload {
            glob,
            upload,
            statuses,
            max_confirms,
        } => {
            command_reupload(
                arweave,
                &glob,
                &log_dir()?,
                &statuses,
                max_confirms,
                &upload.tags,
                reward_mult,
                buffer,
                monitor,
            )
            .await
        }
        Command::UploadManifest { .. } => {
            command_upload_manifest(arweave, &log_dir()?, reward_mult).await
        }
        Command::UpdateStatus { glob, .. } => {
            command_update_statuses(arweave, &glob, &log_dir()?, buffer).await
        }
        Command::UpdateBundleStatus { .. } => {
            command_update_bundle_statuses(arweave, &log_dir()?, buffer).await
        }
        Command::ListStatus {
            glob,
            statuses,
            max_confirms,
            ..
        } => command_list_statuses(arweave, &glob, &log_dir()?, &statuses, max_confirms).await,
        Command::StatusReport { glob, .. } => {
            command_status_report(arweave, &glob, &log_dir()?).await
        }
        Command::UpdateMetadata {
            glob,
            manifest_path,
            link_file,
            no_image,
            update_animation_url,
        } => {
            command_update_metadata(
                arweave,
                &glob,
                &manifest_path,
                link_file,
                !no_image,
                update_animation_url,
            )
            .await
        }
        Command::WriteMetaplexItems {
            glob,
            manifest_path,
            link_file,
        } => command_write_metaplex_items(arweave, &glob, &manifest_path, link_file).await,
        Command::UploadNfts {
            glob,
            upload,
            link_file,
            update_animation_url,
            ..
        } => {
            command_upload_nfts(
                arweave,
                &glob,
                settings.log_dir.clone(),
                &upload.tags,
                reward_mult,
                settings.bundle_size(),
                buffer,
                link_file,
                update_animation_url,
                monitor,
            )
            .await
        }
    }
}

#[cfg(all(test, feature = "cli"))]
mod tests {
    use super::*;

    #[test]
    fn test_require_log_dir() {
        assert_eq!(
            require_log_dir(Some(PathBuf::from("logs"))).unwrap(),
            PathBuf::from("logs")
        );
        assert!(matches!(
            require_log_dir(None),
            Err(ArloaderError::MissingConfigError { field }) if field == "log_dir"
        ));
    }
}
