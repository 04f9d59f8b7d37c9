#[cfg(feature = "cli")]
pub mod cli;
pub mod settings;
pub mod toml_config;

#[cfg(feature = "cli")]
pub use cli::{Cli, Command, UploadArgs};
pub use settings::{Settings, SettingsOverrides};
pub use toml_config::ArloaderConfig;
