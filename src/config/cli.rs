use crate::config::settings::SettingsOverrides;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "arloader")]
#[command(about = "Upload files, bundles and NFT assets to Arweave")]
#[command(version)]
pub struct Cli {
    /// Optional TOML settings file
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Arweave gateway
    #[arg(long, global = true)]
    pub base_url: Option<String>,

    /// Path to an Arweave JWK keyfile
    #[arg(long, env = "AR_KEYPAIR_PATH", global = true)]
    pub ar_keypair_path: Option<PathBuf>,

    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Log as JSON lines
    #[arg(long, global = true)]
    pub log_json: bool,

    /// Log CPU and memory usage during uploads
    #[arg(long, global = true)]
    pub monitor: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// Options shared by the commands that post files.
#[derive(Args, Debug, Clone, Default)]
pub struct UploadArgs {
    /// Directory for status files; created next to the files when omitted
    #[arg(long)]
    pub log_dir: Option<PathBuf>,

    /// Extra tags as name:value
    #[arg(long, num_args = 1..)]
    pub tags: Vec<String>,

    /// Multiplier applied to the network reward
    #[arg(long)]
    pub reward_multiplier: Option<f32>,

    /// Number of concurrent uploads
    #[arg(long)]
    pub buffer: Option<usize>,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Estimate the cost of uploading files
    Estimate {
        glob: String,
        /// Price each file as its own transaction
        #[arg(long)]
        no_bundle: bool,
        /// Maximum bundle size in MB
        #[arg(long)]
        bundle_size: Option<u64>,
        #[arg(long)]
        reward_multiplier: Option<f32>,
    },
    /// Show a wallet balance; defaults to the loaded keypair's address
    WalletBalance { address: Option<String> },
    /// Count of transactions waiting in the mempool
    Pending,
    /// Confirmation status of a transaction
    GetStatus { id: String },
    /// Fetch a transaction by id
    GetTransaction { id: String },
    /// Upload each file as its own transaction
    Upload {
        glob: String,
        #[command(flatten)]
        upload: UploadArgs,
    },
    /// Upload files as bundles of data items
    UploadBundles {
        glob: String,
        #[command(flatten)]
        upload: UploadArgs,
        #[arg(long)]
        bundle_size: Option<u64>,
    },
    /// Upload again the files whose status matches the filters
    Reupload {
        glob: String,
        #[command(flatten)]
        upload: UploadArgs,
        /// Status codes to re-upload, e.g. NotFound
        #[arg(long, num_args = 1..)]
        statuses: Vec<String>,
        #[arg(long)]
        max_confirms: Option<u64>,
    },
    /// Upload a path manifest for every status in a log directory
    UploadManifest {
        #[arg(long)]
        log_dir: Option<PathBuf>,
        #[arg(long)]
        reward_multiplier: Option<f32>,
    },
    /// Refresh the statuses of uploaded files
    UpdateStatus {
        glob: String,
        #[arg(long)]
        log_dir: Option<PathBuf>,
        #[arg(long)]
        buffer: Option<usize>,
    },
    /// Refresh the statuses of uploaded bundles
    UpdateBundleStatus {
        #[arg(long)]
        log_dir: Option<PathBuf>,
        #[arg(long)]
        buffer: Option<usize>,
    },
    /// Print stored statuses, optionally filtered
    ListStatus {
        glob: String,
        #[arg(long)]
        log_dir: Option<PathBuf>,
        #[arg(long, num_args = 1..)]
        statuses: Vec<String>,
        #[arg(long)]
        max_confirms: Option<u64>,
    },
    /// Count stored statuses by code
    StatusReport {
        glob: String,
        #[arg(long)]
        log_dir: Option<PathBuf>,
    },
    /// Point NFT metadata files at their uploaded assets
    UpdateMetadata {
        glob: String,
        #[arg(long)]
        manifest_path: PathBuf,
        /// Link through the manifest path instead of the bare id
        #[arg(long)]
        link_file: bool,
        /// Leave the `image` field untouched
        #[arg(long)]
        no_image: bool,
        #[arg(long)]
        update_animation_url: bool,
    },
    /// Write the name/link items file used by the metaplex candy machine
    WriteMetaplexItems {
        glob: String,
        #[arg(long)]
        manifest_path: PathBuf,
        #[arg(long)]
        link_file: bool,
    },
    /// Upload NFT assets and their metadata in one go
    UploadNfts {
        glob: String,
        #[command(flatten)]
        upload: UploadArgs,
        #[arg(long)]
        bundle_size: Option<u64>,
        #[arg(long)]
        link_file: bool,
        #[arg(long)]
        update_animation_url: bool,
    },
}

impl Command {
    /// Whether the command signs transactions and so needs a keyfile.
    pub fn requires_wallet(&self) -> bool {
        match self {
            Command::Upload { .. }
            | Command::UploadBundles { .. }
            | Command::Reupload { .. }
            | Command::UploadManifest { .. }
            | Command::UploadNfts { .. } => true,
            Command::WalletBalance { address } => address.is_none(),
            _ => false,
        }
    }
}

impl Cli {
    /// Collects every setting given on the command line, global or per command.
    pub fn overrides(&self) -> SettingsOverrides {
        let mut overrides = SettingsOverrides {
            base_url: self.base_url.clone(),
            ar_keypair_path: self.ar_keypair_path.clone(),
            monitor: self.monitor,
            ..Default::default()
        };

        let apply_upload = |upload: &UploadArgs, overrides: &mut SettingsOverrides| {
            overrides.log_dir = upload.log_dir.clone();
            overrides.reward_multiplier = upload.reward_multiplier;
            overrides.buffer = upload.buffer;
        };

        match &self.command {
            Command::Estimate {
                bundle_size,
                reward_multiplier,
                ..
            } => {
                overrides.bundle_size_mb = *bundle_size;
                overrides.reward_multiplier = *reward_multiplier;
            }
            Command::Upload { upload, .. } | Command::Reupload { upload, .. } => {
                apply_upload(upload, &mut overrides);
            }
            Command::UploadBundles {
                upload,
                bundle_size,
                ..
            }
            | Command::UploadNfts {
                upload,
                bundle_size,
                ..
            } => {
                apply_upload(upload, &mut overrides);
                overrides.bundle_size_mb = *bundle_size;
            }
            Command::UploadManifest {
                log_dir,
                reward_multiplier,
            } => {
                overrides.log_dir = log_dir.clone();
                overrides.reward_multiplier = *reward_multiplier;
            }
            Command::UpdateStatus {
                log_dir, buffer, ..
            }
            | Command::UpdateBundleStatus { log_dir, buffer } => {
                overrides.log_dir = log_dir.clone();
                overrides.buffer = *buffer;
            }
            Command::ListStatus { log_dir, .. } | Command::StatusReport { log_dir, .. } => {
                overrides.log_dir = log_dir.clone();
            }
            _ => {}
        }

        overrides
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_upload_bundles() {
        let cli = Cli::try_parse_from([
            "arloader",
            "upload-bundles",
            "assets/*.png",
            "--bundle-size",
            "20",
            "--tags",
            "App-Name:arloader",
            "Type:nft",
            "--buffer",
            "3",
        ])
        .unwrap();

        match &cli.command {
            Command::UploadBundles {
                glob,
                upload,
                bundle_size,
            } => {
                assert_eq!(glob, "assets/*.png");
                assert_eq!(upload.tags.len(), 2);
                assert_eq!(*bundle_size, Some(20));
            }
            other => panic!("unexpected command {:?}", other),
        }

        let overrides = cli.overrides();
        assert_eq!(overrides.bundle_size_mb, Some(20));
        assert_eq!(overrides.buffer, Some(3));
        assert!(cli.command.requires_wallet());
    }

    #[test]
    fn test_global_options_after_subcommand() {
        let cli = Cli::try_parse_from([
            "arloader",
            "get-status",
            "abc",
            "--base-url",
            "http://localhost:1984",
            "--verbose",
        ])
        .unwrap();
        assert!(cli.verbose);
        assert_eq!(cli.overrides().base_url.as_deref(), Some("http://localhost:1984"));
        assert!(!cli.command.requires_wallet());
    }

    #[test]
    fn test_wallet_balance_needs_wallet_only_without_address() {
        let with_address = Command::WalletBalance {
            address: Some("addr".to_string()),
        };
        assert!(!with_address.requires_wallet());
        assert!(Command::WalletBalance { address: None }.requires_wallet());
    }

    #[test]
    fn test_update_metadata_flags() {
        let cli = Cli::try_parse_from([
            "arloader",
            "update-metadata",
            "nfts/*.png",
            "--manifest-path",
            "logs/manifest_x.json",
            "--link-file",
            "--no-image",
        ])
        .unwrap();
        match cli.command {
            Command::UpdateMetadata {
                link_file,
                no_image,
                update_animation_url,
                ..
            } => {
                assert!(link_file);
                assert!(no_image);
                assert!(!update_animation_url);
            }
            other => panic!("unexpected command {:?}", other),
        }
    }
}
