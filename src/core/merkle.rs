//! Chunking and merkle proofs for transaction data.

use crate::core::crypto::Provider;
use crate::domain::transaction::{Node, Proof};
use crate::utils::error::Result;

pub const MAX_CHUNK_SIZE: usize = 256 * 1024;
pub const MIN_CHUNK_SIZE: usize = 32 * 1024;
const HASH_SIZE: usize = 32;
const NOTE_SIZE: usize = 32;

/// 32-byte big-endian encoding of an offset.
fn to_note(offset: usize) -> [u8; NOTE_SIZE] {
    let mut note = [0u8; NOTE_SIZE];
    note[NOTE_SIZE - 8..].copy_from_slice(&(offset as u64).to_be_bytes());
    note
}

fn from_note(note: &[u8]) -> usize {
    let mut bytes = [0u8; 8];
    bytes.copy_from_slice(&note[note.len() - 8..]);
    u64::from_be_bytes(bytes) as usize
}

/// Splits data into chunks and hashes each one into a leaf. A final empty
/// leaf is produced when the data length is a multiple of `MAX_CHUNK_SIZE`.
pub fn generate_leaves(data: &[u8], crypto: &Provider) -> Result<Vec<Node>> {
    let mut leaves = Vec::new();
    let mut rest = data;
    let mut cursor = 0usize;

    while rest.len() >= MAX_CHUNK_SIZE {
        let mut chunk_size = MAX_CHUNK_SIZE;

        // Keep the last chunk from falling under the minimum size.
        let next_chunk_size = rest.len() - MAX_CHUNK_SIZE;
        if next_chunk_size > 0 && next_chunk_size < MIN_CHUNK_SIZE {
            chunk_size = rest.len().div_ceil(2);
        }

        let (chunk, remainder) = rest.split_at(chunk_size);
        leaves.push(hash_leaf(chunk, cursor, crypto)?);
        cursor += chunk.len();
        rest = remainder;
    }

    leaves.push(hash_leaf(rest, cursor, crypto)?);
    Ok(leaves)
}

fn hash_leaf(chunk: &[u8], min_byte_range: usize, crypto: &Provider) -> Result<Node> {
    let data_hash = crypto.hash_sha256(chunk)?;
    let max_byte_range = min_byte_range + chunk.len();
    let id = crypto.hash_all(&[&data_hash, &to_note(max_byte_range)])?;

    Ok(Node {
        id,
        data_hash: Some(data_hash),
        min_byte_range,
        max_byte_range,
        left_child: None,
        right_child: None,
    })
}

fn hash_branch(left: Node, right: Option<Node>, crypto: &Provider) -> Result<Node> {
    let right = match right {
        Some(right) => right,
        None => return Ok(left),
    };

    let id = crypto.hash_all(&[&left.id, &right.id, &to_note(left.max_byte_range)])?;
    Ok(Node {
        id,
        data_hash: None,
        min_byte_range: left.max_byte_range,
        max_byte_range: right.max_byte_range,
        left_child: Some(Box::new(left)),
        right_child: Some(Box::new(right)),
    })
}

/// Folds leaves pairwise into a single root. Unpaired nodes move up a layer.
pub fn generate_data_root(mut nodes: Vec<Node>, crypto: &Provider) -> Result<Node> {
    while nodes.len() > 1 {
        let mut next_layer = Vec::with_capacity(nodes.len().div_ceil(2));
        let mut iter = nodes.into_iter();
        while let Some(left) = iter.next() {
            next_layer.push(hash_branch(left, iter.next(), crypto)?);
        }
        nodes = next_layer;
    }

    nodes.pop().ok_or(crate::utils::error::ArloaderError::InvalidDataItem {
        message: "cannot build a merkle root without leaves".to_string(),
    })
}

/// Proofs for every leaf under `node`, in leaf order.
pub fn resolve_proofs(node: Node, proof: Option<Proof>) -> Result<Vec<Proof>> {
    let mut proofs = Vec::new();
    let prefix = proof.map(|p| p.proof).unwrap_or_default();
    collect_proofs(&node, prefix, &mut proofs);
    Ok(proofs)
}

fn collect_proofs(node: &Node, prefix: Vec<u8>, proofs: &mut Vec<Proof>) {
    match (&node.left_child, &node.right_child, &node.data_hash) {
        (Some(left), Some(right), _) => {
            let mut partial = prefix;
            partial.extend_from_slice(&left.id);
            partial.extend_from_slice(&right.id);
            partial.extend_from_slice(&to_note(node.min_byte_range));
            collect_proofs(left, partial.clone(), proofs);
            collect_proofs(right, partial, proofs);
        }
        (_, _, Some(data_hash)) => {
            let mut proof = prefix;
            proof.extend_from_slice(data_hash);
            proof.extend_from_slice(&to_note(node.max_byte_range));
            proofs.push(Proof {
                offset: node.max_byte_range.saturating_sub(1),
                proof,
            });
        }
        _ => {}
    }
}

/// Checks that `path` proves the chunk containing byte `dest` under `root_id`.
/// Returns the leaf's data hash and byte range on success.
pub fn validate_path(
    root_id: [u8; 32],
    dest: usize,
    left_bound: usize,
    right_bound: usize,
    path: &[u8],
    crypto: &Provider,
) -> Result<Option<([u8; 32], usize, usize)>> {
    if right_bound == 0 {
        return Ok(None);
    }
    if dest >= right_bound {
        return validate_path(root_id, right_bound - 1, left_bound, right_bound, path, crypto);
    }

    if path.len() == HASH_SIZE + NOTE_SIZE {
        let (data_hash, end_note) = path.split_at(HASH_SIZE);
        let leaf_id = crypto.hash_all(&[data_hash, end_note])?;
        if leaf_id != root_id {
            return Ok(None);
        }
        let mut hash = [0u8; 32];
        hash.copy_from_slice(data_hash);
        return Ok(Some((hash, left_bound, from_note(end_note))));
    }

    if path.len() < 2 * HASH_SIZE + NOTE_SIZE {
        return Ok(None);
    }

    let left = &path[..HASH_SIZE];
    let right = &path[HASH_SIZE..2 * HASH_SIZE];
    let offset_note = &path[2 * HASH_SIZE..2 * HASH_SIZE + NOTE_SIZE];
    let remainder = &path[2 * HASH_SIZE + NOTE_SIZE..];
    let offset = from_note(offset_note);

    let branch_id = crypto.hash_all(&[left, right, offset_note])?;
    if branch_id != root_id {
        return Ok(None);
    }

    let mut child = [0u8; 32];
    if dest < offset {
        child.copy_from_slice(left);
        validate_path(
            child,
            dest,
            left_bound,
            right_bound.min(offset),
            remainder,
            crypto,
        )
    } else {
        child.copy_from_slice(right);
        validate_path(
            child,
            dest,
            left_bound.max(offset),
            right_bound,
            remainder,
            crypto,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_data(len: usize) -> Vec<u8> {
        (0..len).map(|i| (i % 251) as u8).collect()
    }

    #[test]
    fn test_single_small_chunk() {
        let crypto = Provider::default();
        let data = sample_data(1000);
        let leaves = generate_leaves(&data, &crypto).unwrap();

        assert_eq!(leaves.len(), 1);
        assert_eq!(leaves[0].min_byte_range, 0);
        assert_eq!(leaves[0].max_byte_range, 1000);

        let root = generate_data_root(leaves.clone(), &crypto).unwrap();
        assert_eq!(root.id, leaves[0].id);

        let proofs = resolve_proofs(root, None).unwrap();
        assert_eq!(proofs.len(), 1);
        assert_eq!(proofs[0].offset, 999);
        assert_eq!(proofs[0].proof.len(), HASH_SIZE + NOTE_SIZE);
    }

    #[test]
    fn test_last_chunk_is_rebalanced() {
        let crypto = Provider::default();
        // One full chunk would leave 1000 bytes, under the minimum.
        let data = sample_data(MAX_CHUNK_SIZE + 1000);
        let leaves = generate_leaves(&data, &crypto).unwrap();

        assert_eq!(leaves.len(), 2);
        let first = leaves[0].max_byte_range - leaves[0].min_byte_range;
        let second = leaves[1].max_byte_range - leaves[1].min_byte_range;
        assert_eq!(first, (MAX_CHUNK_SIZE + 1000).div_ceil(2));
        assert_eq!(first + second, data.len());
        assert!(second >= MIN_CHUNK_SIZE);
    }

    #[test]
    fn test_exact_multiple_yields_empty_trailing_leaf() {
        let crypto = Provider::default();
        let data = sample_data(MAX_CHUNK_SIZE * 2);
        let leaves = generate_leaves(&data, &crypto).unwrap();

        assert_eq!(leaves.len(), 3);
        let last = leaves.last().unwrap();
        assert_eq!(last.min_byte_range, last.max_byte_range);
    }

    #[test]
    fn test_proofs_validate_against_root() {
        let crypto = Provider::default();
        let data = sample_data(MAX_CHUNK_SIZE * 3 + 50_000);
        let leaves = generate_leaves(&data, &crypto).unwrap();
        assert_eq!(leaves.len(), 4);

        let root = generate_data_root(leaves.clone(), &crypto).unwrap();
        let root_id = root.id;
        assert_eq!(root.max_byte_range, data.len());

        let proofs = resolve_proofs(root, None).unwrap();
        assert_eq!(proofs.len(), leaves.len());

        for (leaf, proof) in leaves.iter().zip(proofs.iter()) {
            assert_eq!(proof.offset, leaf.max_byte_range - 1);
            let (data_hash, _, end) =
                validate_path(root_id, proof.offset, 0, data.len(), &proof.proof, &crypto)
                    .unwrap()
                    .expect("proof should validate");
            assert_eq!(Some(data_hash), leaf.data_hash);
            assert_eq!(end, leaf.max_byte_range);
        }
    }

    #[test]
    fn test_tampered_proof_is_rejected() {
        let crypto = Provider::default();
        let data = sample_data(MAX_CHUNK_SIZE * 2 + 40_000);
        let leaves = generate_leaves(&data, &crypto).unwrap();
        let root = generate_data_root(leaves, &crypto).unwrap();
        let root_id = root.id;
        let mut proofs = resolve_proofs(root, None).unwrap();

        let proof = &mut proofs[1];
        proof.proof[0] ^= 0xff;
        let result =
            validate_path(root_id, proof.offset, 0, data.len(), &proof.proof, &crypto).unwrap();
        assert!(result.is_none());
    }

    #[test]
    fn test_odd_leaf_is_promoted() {
        let crypto = Provider::default();
        let data = sample_data(MAX_CHUNK_SIZE * 2 + 40_000);
        let leaves = generate_leaves(&data, &crypto).unwrap();
        assert_eq!(leaves.len(), 3);

        let root = generate_data_root(leaves.clone(), &crypto).unwrap();
        let right = root.right_child.as_ref().unwrap();
        assert_eq!(right.id, leaves[2].id);
        assert_eq!(root.min_byte_range, leaves[1].max_byte_range);
    }
}
