use crate::domain::base64::Base64;
use crate::domain::tags::Tag;
use crate::utils::error::{ArloaderError, Result};
use serde::{Deserialize, Serialize};

/// Input to the deep hash algorithm: raw bytes or a nested list.
#[derive(Debug, Clone, PartialEq)]
pub enum DeepHashItem {
    Blob(Vec<u8>),
    List(Vec<DeepHashItem>),
}

impl DeepHashItem {
    pub fn from_item(item: &[u8]) -> DeepHashItem {
        DeepHashItem::Blob(item.to_vec())
    }

    pub fn from_children(children: Vec<DeepHashItem>) -> DeepHashItem {
        DeepHashItem::List(children)
    }
}

/// Assembles the elements that get deep hashed and signed.
pub trait ToItems {
    fn to_deep_hash_item(&self) -> Result<DeepHashItem>;
}

/// Merkle tree node. For leaves `min_byte_range..max_byte_range` is the chunk
/// span; for branches `min_byte_range` is the split offset between children.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub id: [u8; 32],
    pub data_hash: Option<[u8; 32]>,
    pub min_byte_range: usize,
    pub max_byte_range: usize,
    pub left_child: Option<Box<Node>>,
    pub right_child: Option<Box<Node>>,
}

/// Merkle inclusion proof for the chunk ending at `offset + 1`.
#[derive(Debug, Clone, PartialEq)]
pub struct Proof {
    pub offset: usize,
    pub proof: Vec<u8>,
}

/// Format 2 Arweave transaction.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub format: u8,
    pub id: Base64,
    pub last_tx: Base64,
    pub owner: Base64,
    pub tags: Vec<Tag<Base64>>,
    pub target: Base64,
    #[serde(with = "stringify")]
    pub quantity: u64,
    pub data_root: Base64,
    pub data: Base64,
    #[serde(with = "stringify")]
    pub data_size: u64,
    #[serde(with = "stringify")]
    pub reward: u64,
    pub signature: Base64,
    #[serde(skip)]
    pub chunks: Vec<Node>,
    #[serde(skip)]
    pub proofs: Vec<Proof>,
}

/// Body posted to the `chunk` endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chunk {
    pub data_root: Base64,
    #[serde(with = "stringify")]
    pub data_size: u64,
    pub data_path: Base64,
    #[serde(with = "stringify")]
    pub offset: usize,
    pub chunk: Base64,
}

impl Transaction {
    pub fn get_chunk(&self, idx: usize) -> Result<Chunk> {
        let (node, proof) = match (self.chunks.get(idx), self.proofs.get(idx)) {
            (Some(node), Some(proof)) => (node, proof),
            _ => {
                return Err(ArloaderError::ChunkOutOfRange {
                    index: idx,
                    len: self.chunks.len(),
                })
            }
        };

        let chunk = self
            .data
            .0
            .get(node.min_byte_range..node.max_byte_range)
            .ok_or(ArloaderError::ChunkOutOfRange {
                index: idx,
                len: self.chunks.len(),
            })?;

        Ok(Chunk {
            data_root: self.data_root.clone(),
            data_size: self.data_size,
            data_path: Base64(proof.proof.clone()),
            offset: proof.offset,
            chunk: Base64(chunk.to_vec()),
        })
    }

    /// Header-only copy, posted to `tx` before its chunks go to `chunk`.
    pub fn clone_with_no_data(&self) -> Result<Transaction> {
        Ok(Transaction {
            data: Base64::default(),
            chunks: Vec::new(),
            proofs: Vec::new(),
            ..self.clone()
        })
    }

    pub fn is_signed(&self) -> bool {
        !self.id.is_empty() && !self.signature.is_empty()
    }
}

impl ToItems for Transaction {
    fn to_deep_hash_item(&self) -> Result<DeepHashItem> {
        let tags = self
            .tags
            .iter()
            .map(|t| {
                DeepHashItem::from_children(vec![
                    DeepHashItem::from_item(&t.name.0),
                    DeepHashItem::from_item(&t.value.0),
                ])
            })
            .collect();

        Ok(DeepHashItem::from_children(vec![
            DeepHashItem::from_item(self.format.to_string().as_bytes()),
            DeepHashItem::from_item(&self.owner.0),
            DeepHashItem::from_item(&self.target.0),
            DeepHashItem::from_item(self.quantity.to_string().as_bytes()),
            DeepHashItem::from_item(self.reward.to_string().as_bytes()),
            DeepHashItem::from_item(&self.last_tx.0),
            DeepHashItem::from_children(tags),
            DeepHashItem::from_item(self.data_size.to_string().as_bytes()),
            DeepHashItem::from_item(&self.data_root.0),
        ]))
    }
}

/// Integers that the Arweave HTTP API carries as decimal strings.
pub(crate) mod stringify {
    use serde::{de, Deserialize, Deserializer, Serializer};
    use std::fmt::Display;
    use std::str::FromStr;

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum StringOrNumber {
        String(String),
        Number(u64),
    }

    pub fn serialize<S, T>(value: &T, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
        T: Display,
    {
        serializer.collect_str(value)
    }

    pub fn deserialize<'de, D, T>(deserializer: D) -> Result<T, D::Error>
    where
        D: Deserializer<'de>,
        T: FromStr + TryFrom<u64>,
        <T as FromStr>::Err: Display,
    {
        match StringOrNumber::deserialize(deserializer)? {
            StringOrNumber::String(s) if s.is_empty() => {
                T::from_str("0").map_err(de::Error::custom)
            }
            StringOrNumber::String(s) => T::from_str(&s).map_err(de::Error::custom),
            StringOrNumber::Number(n) => {
                T::try_from(n).map_err(|_| de::Error::custom("number out of range"))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::tags::FromUtf8Strs;

    fn leaf(min: usize, max: usize) -> Node {
        Node {
            id: [0; 32],
            data_hash: Some([0; 32]),
            min_byte_range: min,
            max_byte_range: max,
            left_child: None,
            right_child: None,
        }
    }

    #[test]
    fn test_numbers_serialize_as_strings() {
        let transaction = Transaction {
            format: 2,
            reward: 42,
            data_size: 7,
            ..Default::default()
        };
        let json = serde_json::to_value(&transaction).unwrap();
        assert_eq!(json["format"], 2);
        assert_eq!(json["reward"], "42");
        assert_eq!(json["data_size"], "7");
        assert_eq!(json["quantity"], "0");
        assert!(json.get("chunks").is_none());
    }

    #[test]
    fn test_deserialize_network_transaction() {
        let json = serde_json::json!({
            "format": 2,
            "id": "LCwsLCwsLA",
            "last_tx": "",
            "owner": "",
            "tags": [{"name": "Q29udGVudC1UeXBl", "value": "aW1hZ2UvcG5n"}],
            "target": "",
            "quantity": "0",
            "data_root": "",
            "data": "",
            "data_size": "1024",
            "reward": 1337,
            "signature": ""
        });
        let transaction: Transaction = serde_json::from_value(json).unwrap();
        assert_eq!(transaction.data_size, 1024);
        assert_eq!(transaction.reward, 1337);
        assert_eq!(transaction.tags[0].to_utf8_tag().name, "Content-Type");
    }

    #[test]
    fn test_get_chunk() {
        let transaction = Transaction {
            data: Base64((0u8..10).collect()),
            data_size: 10,
            chunks: vec![leaf(0, 6), leaf(6, 10)],
            proofs: vec![
                Proof {
                    offset: 5,
                    proof: vec![1],
                },
                Proof {
                    offset: 9,
                    proof: vec![2],
                },
            ],
            ..Default::default()
        };

        let chunk = transaction.get_chunk(1).unwrap();
        assert_eq!(chunk.chunk.0, vec![6, 7, 8, 9]);
        assert_eq!(chunk.offset, 9);
        assert_eq!(chunk.data_path.0, vec![2]);

        let json = serde_json::to_value(&chunk).unwrap();
        assert_eq!(json["offset"], "9");
        assert_eq!(json["data_size"], "10");

        assert!(matches!(
            transaction.get_chunk(2),
            Err(ArloaderError::ChunkOutOfRange { index: 2, len: 2 })
        ));
    }

    #[test]
    fn test_clone_with_no_data_keeps_header() {
        let transaction = Transaction {
            format: 2,
            id: Base64(vec![1; 32]),
            data: Base64(vec![9; 100]),
            data_size: 100,
            chunks: vec![leaf(0, 100)],
            ..Default::default()
        };
        let header = transaction.clone_with_no_data().unwrap();
        assert!(header.data.is_empty());
        assert!(header.chunks.is_empty());
        assert_eq!(header.data_size, 100);
        assert_eq!(header.id, transaction.id);
    }

    #[test]
    fn test_deep_hash_item_layout() {
        let transaction = Transaction {
            format: 2,
            reward: 10,
            data_size: 3,
            tags: vec![Tag::<Base64>::from_utf8_strs("a", "b").unwrap()],
            ..Default::default()
        };

        match transaction.to_deep_hash_item().unwrap() {
            DeepHashItem::List(items) => {
                assert_eq!(items.len(), 9);
                assert_eq!(items[0], DeepHashItem::Blob(b"2".to_vec()));
                assert_eq!(items[3], DeepHashItem::Blob(b"0".to_vec()));
                assert_eq!(items[4], DeepHashItem::Blob(b"10".to_vec()));
                assert_eq!(
                    items[6],
                    DeepHashItem::List(vec![DeepHashItem::List(vec![
                        DeepHashItem::Blob(b"a".to_vec()),
                        DeepHashItem::Blob(b"b".to_vec()),
                    ])])
                );
                assert_eq!(items[7], DeepHashItem::Blob(b"3".to_vec()));
            }
            other => panic!("expected list, got {:?}", other),
        }
    }
}
