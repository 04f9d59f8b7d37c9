use thiserror::Error;

#[derive(Error, Debug)]
pub enum ArloaderError {
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Invalid URL: {0}")]
    UrlError(#[from] url::ParseError),

    #[error("Base64 decode error: {0}")]
    Base64Error(#[from] base64::DecodeError),

    #[error("Invalid glob pattern: {0}")]
    GlobPatternError(#[from] glob::PatternError),

    #[error("Glob error: {0}")]
    GlobError(#[from] glob::GlobError),

    #[error("Avro error: {0}")]
    AvroError(#[from] apache_avro::Error),

    #[error("RSA error: {0}")]
    RsaError(#[from] rsa::Error),

    #[error("Signature error: {0}")]
    SignatureError(#[from] rsa::signature::Error),

    #[error("Formatting error: {0}")]
    FmtError(#[from] std::fmt::Error),

    #[error("Transaction is not signed")]
    UnsignedTransaction,

    #[error("No keypair loaded, a wallet is required for this operation")]
    MissingKeypair,

    #[error("Status not found for {path}")]
    StatusNotFound { path: String },

    #[error("Manifest not found at {path}")]
    ManifestNotFound { path: String },

    #[error("{path} is not listed in the manifest")]
    PathNotInManifest { path: String },

    #[error("Metadata file {path} has no `{field}` field")]
    MissingMetadataField { path: String, field: String },

    #[error("Metadata file {path} is malformed: {message}")]
    InvalidMetadata { path: String, message: String },

    #[error("No files matched {pattern}")]
    NoFilesFound { pattern: String },

    #[error("Invalid data item: {message}")]
    InvalidDataItem { message: String },

    #[error("Invalid bundle: {message}")]
    InvalidBundle { message: String },

    #[error("Invalid merkle proof for offset {offset}")]
    InvalidProof { offset: usize },

    #[error("Chunk index {index} out of range ({len} chunks)")]
    ChunkOutOfRange { index: usize, len: usize },

    #[error("Posting to {endpoint} failed with status {status}")]
    PostFailed { endpoint: String, status: u16 },

    #[error("Unexpected response status from Arweave: {status}")]
    ArweaveNetworkError { status: u16 },

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Invalid value for {field}: {value} ({reason})")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },

    #[error("Configuration parse error in {field}: {message}")]
    ConfigValidationError { field: String, message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Network,
    Configuration,
    Data,
    Io,
    Crypto,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl ArloaderError {
    pub fn category(&self) -> ErrorCategory {
        use ArloaderError::*;
        match self {
            HttpError(_) | PostFailed { .. } | ArweaveNetworkError { .. } => ErrorCategory::Network,
            UrlError(_)
            | GlobPatternError(_)
            | MissingKeypair
            | ConfigError { .. }
            | InvalidConfigValueError { .. }
            | MissingConfigError { .. }
            | ConfigValidationError { .. } => ErrorCategory::Configuration,
            IoError(_) | GlobError(_) | NoFilesFound { .. } => ErrorCategory::Io,
            RsaError(_) | SignatureError(_) | UnsignedTransaction | InvalidProof { .. } => {
                ErrorCategory::Crypto
            }
            _ => ErrorCategory::Data,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        use ArloaderError::*;
        match self {
            NoFilesFound { .. } => ErrorSeverity::Low,
            HttpError(_) | PostFailed { .. } | ArweaveNetworkError { .. } => ErrorSeverity::Medium,
            RsaError(_) | SignatureError(_) | UnsignedTransaction | InvalidProof { .. } => {
                ErrorSeverity::Critical
            }
            _ => ErrorSeverity::High,
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        use ArloaderError::*;
        match self {
            HttpError(_) | ArweaveNetworkError { .. } => {
                "Check your connection and the --base-url gateway, then try again"
            }
            PostFailed { .. } => {
                "The gateway rejected the upload; check your wallet balance and retry with `reupload`"
            }
            MissingKeypair | MissingConfigError { .. } => {
                "Pass --ar-keypair-path or set AR_KEYPAIR_PATH to your Arweave keyfile"
            }
            StatusNotFound { .. } => "Make sure --log-dir points to the directory used for the upload",
            ManifestNotFound { .. } | PathNotInManifest { .. } => {
                "Run `upload-manifest` first and pass the manifest_<id>.json it writes"
            }
            MissingMetadataField { .. } | InvalidMetadata { .. } => {
                "Fix the metadata file so it is a JSON object with the expected fields"
            }
            NoFilesFound { .. } => "Check the glob pattern; quote it so the shell does not expand it",
            ConfigError { .. } | InvalidConfigValueError { .. } | ConfigValidationError { .. } => {
                "Fix the configuration value and run the command again"
            }
            _ => "Run again with --verbose for details",
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self.category() {
            ErrorCategory::Network => format!("Network problem: {}", self),
            ErrorCategory::Configuration => format!("Configuration problem: {}", self),
            ErrorCategory::Io => format!("File problem: {}", self),
            ErrorCategory::Crypto => format!("Signing problem: {}", self),
            ErrorCategory::Data => format!("Data problem: {}", self),
        }
    }

    /// Process exit code for the CLI.
    pub fn exit_code(&self) -> i32 {
        match self.severity() {
            ErrorSeverity::Low => 0,
            ErrorSeverity::Medium => 2,
            ErrorSeverity::High => 1,
            ErrorSeverity::Critical => 3,
        }
    }
}

pub type Result<T> = std::result::Result<T, ArloaderError>;
