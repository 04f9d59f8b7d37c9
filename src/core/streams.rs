//! Buffered upload and status streams.
//!
//! Every stream maps an iterator of work items to futures and runs up to
//! `buffer` of them at once, yielding results in completion order.

use crate::core::arweave::{Arweave, CHUNKS_BUFFER_FACTOR, MAX_TX_DATA};
use crate::core::bundle::BUNDLE_ITEM_OVERHEAD;
use crate::domain::base64::Base64;
use crate::domain::model::{PathsChunk, PriceTerms};
use crate::domain::status::{BundleStatus, Status};
use crate::domain::tags::Tag;
use crate::domain::transaction::Transaction;
use crate::utils::error::Result;
use futures::{stream, Stream, StreamExt};
use std::path::PathBuf;

/// Serialized size of a bundle built from `paths_chunk`, counting item headers.
fn estimated_bundle_size(paths_chunk: &PathsChunk) -> u64 {
    paths_chunk.1 + paths_chunk.0.len() as u64 * BUNDLE_ITEM_OVERHEAD
}

/// Bundle and chunk concurrency for a set of bundles. Bundles too large for
/// `tx/` go one at a time with many chunks in flight.
pub fn bundle_buffers(paths_chunks: &[PathsChunk], buffer: usize) -> (usize, usize) {
    let largest = paths_chunks
        .iter()
        .map(estimated_bundle_size)
        .max()
        .unwrap_or(0);
    if largest > MAX_TX_DATA {
        (1, buffer * CHUNKS_BUFFER_FACTOR)
    } else {
        (buffer, 1)
    }
}

pub fn upload_files_stream<'a, IP>(
    arweave: &'a Arweave,
    paths_iter: IP,
    tags: Option<Vec<Tag<Base64>>>,
    log_dir: Option<PathBuf>,
    last_tx: Option<Base64>,
    price_terms: PriceTerms,
    buffer: usize,
) -> impl Stream<Item = Result<Status>> + 'a
where
    IP: IntoIterator<Item = PathBuf>,
    IP::IntoIter: Send + 'a,
{
    stream::iter(paths_iter)
        .map(move |p| {
            arweave.upload_file_from_path(
                p,
                log_dir.clone(),
                tags.clone(),
                last_tx.clone(),
                price_terms,
            )
        })
        .buffer_unordered(buffer)
}

pub fn upload_bundles_stream<'a>(
    arweave: &'a Arweave,
    paths_chunks: Vec<PathsChunk>,
    tags: Vec<Tag<String>>,
    price_terms: PriceTerms,
    buffer: usize,
) -> impl Stream<Item = Result<BundleStatus>> + 'a {
    let (bundles_buffer, chunks_buffer) = bundle_buffers(&paths_chunks, buffer);
    tracing::debug!(
        "Uploading {} bundles, {} at a time with {} chunks in flight",
        paths_chunks.len(),
        bundles_buffer,
        chunks_buffer
    );

    stream::iter(paths_chunks)
        .map(move |p| {
            arweave.post_bundle_transaction_from_file_paths(
                p,
                tags.clone(),
                price_terms,
                chunks_buffer,
            )
        })
        .buffer_unordered(bundles_buffer)
}

/// Posts every chunk of a signed transaction, yielding chunk offsets.
pub fn upload_transaction_chunks_stream<'a>(
    arweave: &'a Arweave,
    signed_transaction: Transaction,
    buffer: usize,
) -> impl Stream<Item = Result<usize>> + 'a {
    stream::iter(0..signed_transaction.chunks.len())
        .map(move |i| {
            let chunk = signed_transaction.get_chunk(i);
            async move { arweave.post_chunk_with_retries(chunk?).await }
        })
        .buffer_unordered(buffer)
}

pub fn update_statuses_stream<'a, IP>(
    arweave: &'a Arweave,
    paths_iter: IP,
    log_dir: PathBuf,
    buffer: usize,
) -> impl Stream<Item = Result<Status>> + 'a
where
    IP: IntoIterator<Item = PathBuf>,
    IP::IntoIter: Send + 'a,
{
    stream::iter(paths_iter)
        .map(move |p| {
            let log_dir = log_dir.clone();
            async move { arweave.update_status(&p, &log_dir).await }
        })
        .buffer_unordered(buffer)
}

/// Refreshes bundle status files, given their paths in the log directory.
pub fn update_bundle_statuses_stream<'a, IP>(
    arweave: &'a Arweave,
    paths_iter: IP,
    buffer: usize,
) -> impl Stream<Item = Result<BundleStatus>> + 'a
where
    IP: IntoIterator<Item = PathBuf>,
    IP::IntoIter: Send + 'a,
{
    stream::iter(paths_iter)
        .map(move |p| async move { arweave.update_bundle_status(&p).await })
        .buffer_unordered(buffer)
}
