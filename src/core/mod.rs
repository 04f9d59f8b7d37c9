pub mod arweave;
pub mod bundle;
pub mod crypto;
pub mod manifest;
pub mod merkle;
pub mod metadata;
pub mod status_log;
pub mod streams;

pub use crate::domain::ports::{ArweaveApi, ConfigProvider};
pub use crate::utils::error::Result;
pub use arweave::{Arweave, RetryPolicy};
