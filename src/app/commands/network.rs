use super::{status_header, status_row, winstons_to_ar};
use crate::core::arweave::{Arweave, BLOCK_SIZE};
use crate::domain::base64::Base64;
use crate::utils::error::Result;
use crate::utils::paths::{paths_from_glob, total_size};
use std::str::FromStr;

pub async fn command_get_transaction(arweave: &Arweave, id: &str) -> Result<()> {
    let id = Base64::from_str(id)?;
    let transaction = arweave.get_transaction(&id).await?;
    println!("{}", serde_json::to_string_pretty(&transaction)?);
    Ok(())
}

pub async fn command_get_status(arweave: &Arweave, id: &str) -> Result<()> {
    let id = Base64::from_str(id)?;
    let status = arweave.get_status(&id).await?;
    println!("{}", status_header());
    println!("{}", status_row(&status));
    Ok(())
}

/// Balance of `address`, or of the loaded wallet, in AR and USD.
pub async fn command_wallet_balance(arweave: &Arweave, address: Option<String>) -> Result<()> {
    let (winstons, usd_per_ar) = futures::future::try_join(
        arweave.get_wallet_balance(address),
        arweave.get_usd_per_ar(),
    )
    .await?;
    let ar = winstons_to_ar(winstons);

    println!(
        "Wallet balance is {} AR ({} {}, ${:.2} at ${:.2} USD per AR).",
        ar,
        winstons,
        arweave.units,
        ar * usd_per_ar,
        usd_per_ar
    );
    Ok(())
}

pub async fn command_get_pending_count(arweave: &Arweave) -> Result<()> {
    let count = arweave.get_pending_count().await?;
    println!("{} pending transactions.", count);
    Ok(())
}

/// Cost of uploading the matched files, either one transaction per file or,
/// with `bundle_size`, one transaction per bundle.
pub async fn command_estimate(
    arweave: &Arweave,
    glob_str: &str,
    reward_mult: f32,
    bundle_size: Option<u64>,
) -> Result<()> {
    let paths = paths_from_glob(glob_str)?;
    let num_files = paths.len();
    let data_size = total_size(&paths)?;

    let transaction_sizes: Vec<u64> = match bundle_size {
        Some(bundle_size) => arweave
            .chunk_file_paths(paths, bundle_size)?
            .into_iter()
            .map(|chunk| chunk.1)
            .collect(),
        None => paths
            .iter()
            .map(|p| Ok(p.metadata()?.len()))
            .collect::<Result<Vec<_>>>()?,
    };

    let (price_terms, usd_per_ar) = futures::future::try_join(
        arweave.get_price_terms(reward_mult),
        arweave.get_usd_per_ar(),
    )
    .await?;

    let winstons: u64 = transaction_sizes
        .iter()
        .map(|size| price_terms.reward_for_blocks(size.div_ceil(BLOCK_SIZE)))
        .sum();
    let ar = winstons_to_ar(winstons);

    println!(
        "The price to upload {} files with {} total bytes in {} transactions is {} AR ({} {}, ${:.4}).",
        num_files,
        data_size,
        transaction_sizes.len(),
        ar,
        winstons,
        arweave.units,
        ar * usd_per_ar
    );
    Ok(())
}
