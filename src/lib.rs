pub mod app;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

/// Reported in the `User-Agent` tag of every upload.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(feature = "cli")]
pub use config::{Cli, Command};
pub use config::{ArloaderConfig, Settings, SettingsOverrides};

pub use crate::core::{Arweave, ArweaveApi, ConfigProvider, RetryPolicy};
pub use domain::base64::Base64;
pub use domain::status::{BundleStatus, Status, StatusCode};
pub use domain::tags::Tag;
pub use domain::transaction::Transaction;
pub use utils::error::{ArloaderError, Result};
