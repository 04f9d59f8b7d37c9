//! Client for the Arweave HTTP API.
//!
//! [`Arweave`] builds, signs and posts format-2 transactions and ANS-104
//! bundles. Transactions up to [`MAX_TX_DATA`] bytes go to `tx/` in one
//! request; larger ones post their header to `tx/` and the data to `chunk/`
//! in 256 KiB pieces.

use crate::core::bundle::{self, DataItem};
use crate::core::crypto::Provider;
use crate::core::merkle::{generate_data_root, generate_leaves, resolve_proofs};
use crate::core::streams::upload_transaction_chunks_stream;
use crate::domain::base64::Base64;
use crate::domain::model::{OraclePrice, PathsChunk, PriceTerms};
use crate::domain::ports::{ArweaveApi, ConfigProvider};
use crate::domain::status::{BundleStatus, Status, StatusCode};
use crate::domain::tags::{FromUtf8Strs, Tag};
use crate::domain::transaction::{Chunk, ToItems, Transaction};
use crate::utils::error::{ArloaderError, Result};
use crate::VERSION;
use async_trait::async_trait;
use futures::future::{try_join, try_join_all};
use futures::{Future, StreamExt};
use reqwest::header::ACCEPT;
use reqwest::{Client, Response, StatusCode as HttpStatus};
use serde::Serialize;
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;
use tokio::fs;
use url::Url;

pub const WINSTONS_PER_AR: u64 = 1_000_000_000_000;
/// Bytes covered by one unit of the network's storage price.
pub const BLOCK_SIZE: u64 = 1024 * 256;
/// Transactions with more data than this are uploaded through `chunk/`.
pub const MAX_TX_DATA: u64 = 10_000_000;
/// Chunk concurrency multiplier applied when bundles are posted one at a time.
pub const CHUNKS_BUFFER_FACTOR: usize = 20;
pub const CHUNKS_RETRIES: u16 = 10;
/// Seconds between retries.
pub const CHUNKS_RETRY_SLEEP: u64 = 1;
/// Concurrent chunk posts for a single large file.
pub const FILE_CHUNKS_BUFFER: usize = 100;

pub const DEFAULT_BASE_URL: &str = "https://arweave.net/";
pub const DEFAULT_ORACLE_URL: &str =
    "https://api.coingecko.com/api/v3/simple/price?ids=arweave&vs_currencies=usd";
pub const MANIFEST_CONTENT_TYPE: &str = "application/x.arweave-manifest+json";
const OCTET_STREAM: &str = "application/octet-stream";

/// How often and how far apart failed posts are retried.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub retries: u16,
    pub delay: Duration,
}

impl RetryPolicy {
    pub fn new(retries: u16, delay: Duration) -> Self {
        Self { retries, delay }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            retries: CHUNKS_RETRIES,
            delay: Duration::from_secs(CHUNKS_RETRY_SLEEP),
        }
    }
}

pub struct Arweave {
    pub name: String,
    pub units: String,
    pub base_url: Url,
    pub oracle_url: Url,
    pub crypto: Provider,
    pub retry: RetryPolicy,
    client: Client,
}

/// Content type from the file extension, if it has a known one.
pub fn content_type_from_path(path: &Path) -> Option<String> {
    mime_guess::from_path(path).first().map(|m| m.to_string())
}

/// Content type from magic numbers, falling back to octet-stream.
pub fn sniff_content_type(data: &[u8]) -> &'static str {
    infer::get(data)
        .map(|kind| kind.mime_type())
        .unwrap_or(OCTET_STREAM)
}

fn user_agent() -> String {
    format!("arloader/{}", VERSION)
}

/// Makes sure relative joins append to the gateway path instead of replacing
/// its last segment.
fn with_trailing_slash(mut url: Url) -> Url {
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    url
}

fn ensure_success(resp: Response) -> Result<Response> {
    let status = resp.status();
    if status.is_success() {
        Ok(resp)
    } else {
        Err(ArloaderError::ArweaveNetworkError {
            status: status.as_u16(),
        })
    }
}

impl Arweave {
    pub fn new(base_url: Url, oracle_url: Url) -> Self {
        Self {
            name: String::from("arweave"),
            units: String::from("winstons"),
            base_url: with_trailing_slash(base_url),
            oracle_url,
            crypto: Provider::default(),
            retry: RetryPolicy::default(),
            client: Client::new(),
        }
    }

    pub fn with_crypto(mut self, crypto: Provider) -> Self {
        self.crypto = crypto;
        self
    }

    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub async fn from_keypair_path(
        keypair_path: impl AsRef<Path>,
        base_url: Url,
        oracle_url: Url,
    ) -> Result<Arweave> {
        let crypto = Provider::from_keypair_path(keypair_path).await?;
        Ok(Self::new(base_url, oracle_url).with_crypto(crypto))
    }

    /// Builds a client from resolved settings. The wallet is only loaded when
    /// `load_wallet` is set.
    pub async fn from_config(config: &dyn ConfigProvider, load_wallet: bool) -> Result<Arweave> {
        let arweave = Self::new(config.base_url().clone(), config.oracle_url().clone())
            .with_retry_policy(RetryPolicy::new(
                config.retry_attempts(),
                config.retry_delay(),
            ));

        if !load_wallet {
            return Ok(arweave);
        }

        let keypair_path = config
            .ar_keypair_path()
            .ok_or(ArloaderError::MissingKeypair)?;
        let crypto = Provider::from_keypair_path(keypair_path).await?;
        tracing::debug!("Loaded wallet {}", crypto.wallet_address()?);
        Ok(arweave.with_crypto(crypto))
    }

    async fn get(&self, path: &str) -> Result<Response> {
        let url = self.base_url.join(path)?;
        tracing::debug!("GET {}", url);
        let resp = self.client.get(url).send().await?;
        tracing::debug!("GET {} -> {}", path, resp.status());
        Ok(resp)
    }

    async fn post_json<T: Serialize + ?Sized>(&self, endpoint: &str, body: &T) -> Result<()> {
        let url = self.base_url.join(endpoint)?;
        let resp = self
            .client
            .post(url)
            .header(ACCEPT, "application/json")
            .json(body)
            .send()
            .await?;

        let status = resp.status();
        tracing::debug!("POST {} -> {}", endpoint, status);
        if status.is_success() {
            Ok(())
        } else {
            Err(ArloaderError::PostFailed {
                endpoint: endpoint.to_string(),
                status: status.as_u16(),
            })
        }
    }

    /// Runs `op` until it succeeds or the retry policy is exhausted, returning
    /// the last error.
    async fn with_retries<T, F, Fut>(&self, label: &str, mut op: F) -> Result<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let mut attempt = 0;
        loop {
            match op().await {
                Ok(value) => return Ok(value),
                Err(e) if attempt < self.retry.retries => {
                    attempt += 1;
                    tracing::debug!(
                        "{} failed ({}), retry {} of {}",
                        label,
                        e,
                        attempt,
                        self.retry.retries
                    );
                    tokio::time::sleep(self.retry.delay).await;
                }
                Err(e) => return Err(e),
            }
        }
    }

    //-------------------------
    // Queries
    //-------------------------

    /// Number of transactions waiting in the network mempool.
    pub async fn get_pending_count(&self) -> Result<usize> {
        let tx_ids: Vec<String> = ensure_success(self.get("tx/pending").await?)?
            .json()
            .await?;
        Ok(tx_ids.len())
    }

    /// Winstons the network charges to store `bytes` bytes.
    pub async fn get_price(&self, bytes: u64) -> Result<u64> {
        let resp = ensure_success(self.get(&format!("price/{}", bytes)).await?)?;
        Ok(resp.json::<u64>().await?)
    }

    /// USD per AR from the price oracle.
    pub async fn get_usd_per_ar(&self) -> Result<f64> {
        tracing::debug!("GET {}", self.oracle_url);
        let resp = ensure_success(self.client.get(self.oracle_url.clone()).send().await?)?;
        let prices: OraclePrice = resp.json().await?;
        Ok(prices.arweave.usd)
    }

    /// Base price for one block and incremental price for each further block,
    /// both scaled by `reward_mult`.
    pub async fn get_price_terms(&self, reward_mult: f32) -> Result<PriceTerms> {
        let (one_block, two_blocks) =
            try_join(self.get_price(BLOCK_SIZE), self.get_price(BLOCK_SIZE * 2)).await?;
        let mult = reward_mult as f64;
        let base = (one_block as f64 * mult) as u64;
        let incremental = ((two_blocks as f64 * mult) as u64).saturating_sub(base);
        Ok(PriceTerms::new(base, incremental))
    }

    pub async fn get_transaction(&self, id: &Base64) -> Result<Transaction> {
        let resp = ensure_success(self.get(&format!("tx/{}", id)).await?)?;
        Ok(resp.json::<Transaction>().await?)
    }

    /// Balance in winstons of `wallet_address`, or of the loaded wallet.
    pub async fn get_wallet_balance(&self, wallet_address: Option<String>) -> Result<u64> {
        let wallet_address = match wallet_address {
            Some(address) => address,
            None => self.crypto.wallet_address()?.to_string(),
        };
        let resp = ensure_success(
            self.get(&format!("wallet/{}/balance", wallet_address))
                .await?,
        )?;
        Ok(resp.json::<u64>().await?)
    }

    pub async fn get_tx_anchor(&self) -> Result<Base64> {
        let resp = ensure_success(self.get("tx_anchor").await?)?;
        Base64::from_str(&resp.text().await?)
    }

    /// Current network status of a transaction.
    pub async fn get_status(&self, id: &Base64) -> Result<Status> {
        let resp = self.get(&format!("tx/{}/status", id)).await?;
        let mut status = Status {
            id: id.clone(),
            ..Status::default()
        };

        match resp.status() {
            HttpStatus::OK => {
                let body = resp.text().await?;
                if body.trim() == "Pending" {
                    status.status = StatusCode::Pending;
                } else {
                    status.raw_status = Some(serde_json::from_str(&body)?);
                    status.status = StatusCode::Confirmed;
                }
            }
            HttpStatus::ACCEPTED => status.status = StatusCode::Pending,
            HttpStatus::NOT_FOUND => status.status = StatusCode::NotFound,
            other => {
                return Err(ArloaderError::ArweaveNetworkError {
                    status: other.as_u16(),
                })
            }
        }
        Ok(status)
    }

    //-------------------------
    // Transactions
    //-------------------------

    /// Chunks `data` and sets data root, chunks and proofs on a new transaction.
    pub fn merklize(&self, data: Vec<u8>) -> Result<Transaction> {
        if data.is_empty() {
            return Ok(Transaction {
                format: 2,
                ..Default::default()
            });
        }

        let mut chunks = generate_leaves(&data, &self.crypto)?;
        let root = generate_data_root(chunks.clone(), &self.crypto)?;
        let data_root = Base64(root.id.to_vec());
        let mut proofs = resolve_proofs(root, None)?;

        if chunks
            .last()
            .is_some_and(|last| last.max_byte_range == last.min_byte_range)
        {
            chunks.pop();
            proofs.pop();
        }

        Ok(Transaction {
            format: 2,
            data_size: data.len() as u64,
            data: Base64(data),
            data_root,
            chunks,
            proofs,
            ..Default::default()
        })
    }

    /// Unsigned transaction carrying `data`. Fetches an anchor when `last_tx`
    /// is not given.
    pub async fn create_transaction(
        &self,
        data: Vec<u8>,
        other_tags: Option<Vec<Tag<Base64>>>,
        last_tx: Option<Base64>,
        price_terms: PriceTerms,
        auto_content_tag: bool,
    ) -> Result<Transaction> {
        let mut transaction = self.merklize(data)?;
        transaction.owner = self.crypto.keypair_modulus()?;

        let mut tags = vec![Tag::<Base64>::from_utf8_strs("User-Agent", &user_agent())?];
        if auto_content_tag {
            tags.push(Tag::<Base64>::from_utf8_strs(
                "Content-Type",
                sniff_content_type(&transaction.data.0),
            )?);
        }
        if let Some(other_tags) = other_tags {
            tags.extend(other_tags);
        }
        transaction.tags = tags;

        transaction.last_tx = match last_tx {
            Some(last_tx) => last_tx,
            None => self.get_tx_anchor().await?,
        };

        let blocks = transaction.data_size.div_ceil(BLOCK_SIZE);
        transaction.reward = price_terms.reward_for_blocks(blocks);

        Ok(transaction)
    }

    pub async fn create_transaction_from_file_path(
        &self,
        file_path: &Path,
        other_tags: Option<Vec<Tag<Base64>>>,
        last_tx: Option<Base64>,
        price_terms: PriceTerms,
        auto_content_tag: bool,
    ) -> Result<Transaction> {
        let data = fs::read(file_path).await?;
        self.create_transaction(data, other_tags, last_tx, price_terms, auto_content_tag)
            .await
    }

    /// Signs the deep hash and sets `signature` and `id`.
    pub fn sign_transaction(&self, mut transaction: Transaction) -> Result<Transaction> {
        let deep_hash = self.crypto.deep_hash(transaction.to_deep_hash_item()?)?;
        let signature = self.crypto.sign(&deep_hash)?;
        let id = self.crypto.hash_sha256(&signature)?;
        transaction.signature = Base64(signature);
        transaction.id = Base64(id.to_vec());
        Ok(transaction)
    }

    //-------------------------
    // Posting
    //-------------------------

    /// Posts a signed transaction to `tx/`, retrying failures.
    pub async fn post_transaction(&self, signed_transaction: &Transaction) -> Result<(Base64, u64)> {
        if !signed_transaction.is_signed() {
            return Err(ArloaderError::UnsignedTransaction);
        }

        self.with_retries("post_transaction", || {
            self.post_json("tx", signed_transaction)
        })
        .await?;

        tracing::debug!("Posted transaction {}", signed_transaction.id);
        Ok((signed_transaction.id.clone(), signed_transaction.reward))
    }

    /// Posts one chunk, returning its offset.
    pub async fn post_chunk(&self, chunk: &Chunk) -> Result<usize> {
        self.post_json("chunk", chunk).await?;
        Ok(chunk.offset)
    }

    pub async fn post_chunk_with_retries(&self, chunk: Chunk) -> Result<usize> {
        self.with_retries("post_chunk", || self.post_chunk(&chunk))
            .await
    }

    /// Posts the header without data, then every chunk with up to
    /// `chunks_buffer` requests in flight.
    pub async fn post_transaction_chunks(
        &self,
        signed_transaction: Transaction,
        chunks_buffer: usize,
    ) -> Result<(Base64, u64)> {
        if !signed_transaction.is_signed() {
            return Err(ArloaderError::UnsignedTransaction);
        }

        let header = signed_transaction.clone_with_no_data()?;
        let (id, reward) = self.post_transaction(&header).await?;

        let chunks_len = signed_transaction.chunks.len();
        let results: Vec<Result<usize>> =
            upload_transaction_chunks_stream(self, signed_transaction, chunks_buffer)
                .collect()
                .await;
        results.into_iter().collect::<Result<Vec<usize>>>()?;

        tracing::debug!("Posted {} chunks for {}", chunks_len, id);
        Ok((id, reward))
    }

    /// Posts through `tx/` or `chunk/` depending on data size.
    async fn post_by_size(
        &self,
        signed_transaction: Transaction,
        chunks_buffer: usize,
    ) -> Result<(Base64, u64)> {
        if signed_transaction.data_size > MAX_TX_DATA {
            self.post_transaction_chunks(signed_transaction, chunks_buffer)
                .await
        } else {
            self.post_transaction(&signed_transaction).await
        }
    }

    //-------------------------
    // Uploads
    //-------------------------

    /// Uploads one file. The content type comes from the file extension when
    /// it is known, otherwise from the file's magic numbers.
    pub async fn upload_file_from_path(
        &self,
        file_path: PathBuf,
        log_dir: Option<PathBuf>,
        additional_tags: Option<Vec<Tag<Base64>>>,
        last_tx: Option<Base64>,
        price_terms: PriceTerms,
    ) -> Result<Status> {
        let data = fs::read(&file_path).await?;
        let content_type = content_type_from_path(&file_path);
        let mut status = self
            .upload_data(
                data,
                content_type.as_deref(),
                additional_tags,
                last_tx,
                price_terms,
            )
            .await?;
        status.file_path = Some(file_path);

        tracing::debug!(
            "Uploaded {} as {}",
            status.file_path.as_deref().unwrap_or(Path::new("")).display(),
            status.id
        );

        if let Some(log_dir) = log_dir {
            self.write_status(&status, &log_dir, None).await?;
        }
        Ok(status)
    }

    /// Uploads each path with its own tags, all at once.
    pub async fn upload_files_from_paths<IP, IT>(
        &self,
        paths_iter: IP,
        log_dir: Option<PathBuf>,
        tags_iter: Option<IT>,
        last_tx: Option<Base64>,
        price_terms: PriceTerms,
    ) -> Result<Vec<Status>>
    where
        IP: IntoIterator<Item = PathBuf>,
        IT: IntoIterator<Item = Option<Vec<Tag<Base64>>>>,
    {
        let tags: Box<dyn Iterator<Item = Option<Vec<Tag<Base64>>>>> = match tags_iter {
            Some(tags_iter) => Box::new(tags_iter.into_iter()),
            None => Box::new(std::iter::repeat(None)),
        };

        try_join_all(paths_iter.into_iter().zip(tags).map(|(p, t)| {
            self.upload_file_from_path(p, log_dir.clone(), t, last_tx.clone(), price_terms)
        }))
        .await
    }

    /// Uploads bytes that do not come from a file. `content_type` overrides
    /// sniffing; the price is fetched at the base rate.
    pub async fn upload_raw_data(
        &self,
        data: Vec<u8>,
        content_type: Option<&str>,
        log_dir: Option<PathBuf>,
        additional_tags: Option<Vec<Tag<Base64>>>,
        last_tx: Option<Base64>,
    ) -> Result<Status> {
        let price_terms = self.get_price_terms(1.0).await?;
        let content_type = content_type.unwrap_or_else(|| sniff_content_type(&data));
        let status = self
            .upload_data(data, Some(content_type), additional_tags, last_tx, price_terms)
            .await?;

        if let Some(log_dir) = log_dir {
            self.write_status(&status, &log_dir, None).await?;
        }
        Ok(status)
    }

    async fn upload_data(
        &self,
        data: Vec<u8>,
        content_type: Option<&str>,
        additional_tags: Option<Vec<Tag<Base64>>>,
        last_tx: Option<Base64>,
        price_terms: PriceTerms,
    ) -> Result<Status> {
        let mut tags = additional_tags.unwrap_or_default();
        let status_content_type = match content_type {
            Some(content_type) => {
                tags.push(Tag::<Base64>::from_utf8_strs("Content-Type", content_type)?);
                content_type.to_string()
            }
            None => sniff_content_type(&data).to_string(),
        };

        let transaction = self
            .create_transaction(
                data,
                Some(tags),
                last_tx,
                price_terms,
                content_type.is_none(),
            )
            .await?;
        let signed_transaction = self.sign_transaction(transaction)?;
        let (id, reward) = self
            .post_by_size(signed_transaction, FILE_CHUNKS_BUFFER)
            .await?;

        Ok(Status {
            id,
            reward,
            content_type: status_content_type,
            ..Default::default()
        })
    }

    //-------------------------
    // Bundles
    //-------------------------

    /// Groups paths greedily so each group stays within `data_size` bytes. A
    /// file larger than the limit gets a group of its own.
    pub fn chunk_file_paths<IP>(&self, paths_iter: IP, data_size: u64) -> Result<Vec<PathsChunk>>
    where
        IP: IntoIterator<Item = PathBuf>,
    {
        let mut paths_chunks = Vec::new();
        let mut current = Vec::new();
        let mut current_len = 0u64;

        for path in paths_iter {
            let len = std::fs::metadata(&path)?.len();
            if !current.is_empty() && current_len + len > data_size {
                paths_chunks.push(PathsChunk(std::mem::take(&mut current), current_len));
                current_len = 0;
            }
            current.push(path);
            current_len += len;
        }

        if !current.is_empty() {
            paths_chunks.push(PathsChunk(current, current_len));
        }
        Ok(paths_chunks)
    }

    /// Unsigned data item with a `User-Agent` tag and, if asked, a sniffed
    /// `Content-Type` tag.
    pub fn create_data_item(
        &self,
        data: Vec<u8>,
        mut tags: Vec<Tag<String>>,
        auto_content_tag: bool,
    ) -> Result<DataItem> {
        tags.push(Tag::<String>::from_utf8_strs("User-Agent", &user_agent())?);
        if auto_content_tag {
            tags.push(Tag::<String>::from_utf8_strs(
                "Content-Type",
                sniff_content_type(&data),
            )?);
        }

        Ok(DataItem {
            data: Base64(data),
            tags,
            ..DataItem::default()
        })
    }

    pub fn sign_data_item(&self, mut data_item: DataItem) -> Result<DataItem> {
        data_item.owner = self.crypto.keypair_modulus()?;
        let deep_hash = self.crypto.deep_hash(data_item.to_deep_hash_item()?)?;
        let signature = self.crypto.sign(&deep_hash)?;
        let id = self.crypto.hash_sha256(&signature)?;
        data_item.signature = Base64(signature);
        data_item.id = Base64(id.to_vec());
        Ok(data_item)
    }

    /// Signed data item for a file plus the status that will be recorded for it.
    pub async fn create_data_item_from_file_path(
        &self,
        file_path: PathBuf,
        mut tags: Vec<Tag<String>>,
    ) -> Result<(DataItem, Status)> {
        let data = fs::read(&file_path).await?;
        let content_type = content_type_from_path(&file_path);
        let status_content_type = match &content_type {
            Some(content_type) => {
                tags.push(Tag::<String>::from_utf8_strs("Content-Type", content_type)?);
                content_type.clone()
            }
            None => sniff_content_type(&data).to_string(),
        };

        let data_item = self.create_data_item(data, tags, content_type.is_none())?;
        let data_item = self.sign_data_item(data_item)?;

        let status = Status {
            id: data_item.id.clone(),
            file_path: Some(file_path),
            content_type: status_content_type,
            ..Status::default()
        };
        Ok((data_item, status))
    }

    pub async fn create_data_items_from_file_paths(
        &self,
        paths: Vec<PathBuf>,
        tags: Vec<Tag<String>>,
    ) -> Result<Vec<(DataItem, Status)>> {
        try_join_all(
            paths
                .into_iter()
                .map(|p| self.create_data_item_from_file_path(p, tags.clone())),
        )
        .await
    }

    /// Bundle bytes and the path manifest of the bundled files.
    pub fn create_bundle_from_data_items(
        &self,
        data_items: Vec<(DataItem, Status)>,
    ) -> Result<(Vec<u8>, Value)> {
        let (items, statuses): (Vec<DataItem>, Vec<Status>) = data_items.into_iter().unzip();
        let bundle = bundle::create_bundle(&items)?;
        let manifest = self.create_manifest(statuses)?;
        Ok((bundle, manifest))
    }

    fn bundle_tags() -> Result<Vec<Tag<Base64>>> {
        Ok(vec![
            Tag::<Base64>::from_utf8_strs("Bundle-Format", "binary")?,
            Tag::<Base64>::from_utf8_strs("Bundle-Version", "2.0.0")?,
        ])
    }

    /// Unsigned bundle transaction for `paths` and its path manifest.
    pub async fn create_bundle_transaction_from_file_paths(
        &self,
        paths: Vec<PathBuf>,
        tags: Vec<Tag<String>>,
        price_terms: PriceTerms,
    ) -> Result<(Transaction, Value)> {
        let data_items = self.create_data_items_from_file_paths(paths, tags).await?;
        let (bundle, manifest) = self.create_bundle_from_data_items(data_items)?;
        let transaction = self
            .create_transaction(bundle, Some(Self::bundle_tags()?), None, price_terms, true)
            .await?;
        Ok((transaction, manifest))
    }

    /// Bundles, signs and posts one group of files.
    pub async fn post_bundle_transaction_from_file_paths(
        &self,
        paths_chunk: PathsChunk,
        tags: Vec<Tag<String>>,
        price_terms: PriceTerms,
        chunks_buffer: usize,
    ) -> Result<BundleStatus> {
        let PathsChunk(paths, data_size) = paths_chunk;
        let number_of_files = paths.len() as u64;

        let (transaction, manifest) = self
            .create_bundle_transaction_from_file_paths(paths, tags, price_terms)
            .await?;
        let signed_transaction = self.sign_transaction(transaction)?;
        let (id, reward) = self.post_by_size(signed_transaction, chunks_buffer).await?;

        tracing::info!("Posted bundle {} with {} files", id, number_of_files);

        Ok(BundleStatus {
            id,
            reward,
            file_paths: manifest["paths"].clone(),
            number_of_files,
            data_size,
            ..BundleStatus::default()
        })
    }

    pub fn deserialize_bundle(&self, bundle: &[u8]) -> Result<Vec<DataItem>> {
        bundle::deserialize_bundle(bundle, &self.crypto)
    }
}

#[async_trait]
impl ArweaveApi for Arweave {
    fn get_url(&self) -> &Url {
        &self.base_url
    }

    async fn get_price_terms(&self, reward_mult: f32) -> Result<PriceTerms> {
        Arweave::get_price_terms(self, reward_mult).await
    }

    async fn upload_raw_data(
        &self,
        data: Vec<u8>,
        content_type: Option<&str>,
        log_dir: Option<PathBuf>,
        additional_tags: Option<Vec<Tag<Base64>>>,
        last_tx: Option<Base64>,
    ) -> Result<Status> {
        Arweave::upload_raw_data(self, data, content_type, log_dir, additional_tags, last_tx).await
    }

    async fn upload_file_from_path(
        &self,
        file_path: PathBuf,
        log_dir: Option<PathBuf>,
        additional_tags: Option<Vec<Tag<Base64>>>,
        last_tx: Option<Base64>,
        price_terms: PriceTerms,
    ) -> Result<Status> {
        Arweave::upload_file_from_path(
            self,
            file_path,
            log_dir,
            additional_tags,
            last_tx,
            price_terms,
        )
        .await
    }

    async fn get_status(&self, id: &Base64) -> Result<Status> {
        Arweave::get_status(self, id).await
    }

    async fn get_price(&self, bytes: u64) -> Result<u64> {
        Arweave::get_price(self, bytes).await
    }
}
