//! ANS-104 data items and bundles.

use crate::core::crypto::Provider;
use crate::domain::base64::Base64;
use crate::domain::tags::Tag;
use crate::domain::transaction::{DeepHashItem, ToItems};
use crate::utils::error::{ArloaderError, Result};
use apache_avro::types::Value as AvroValue;
use apache_avro::{from_avro_datum, to_avro_datum, Schema};

/// Signature type for Arweave RSA-PSS keys.
pub const ARWEAVE_SIGNATURE_TYPE: u16 = 1;
const SIGNATURE_LENGTH: usize = 512;
const OWNER_LENGTH: usize = 512;
const ID_LENGTH: usize = 32;

/// Upper bound on the bytes a bundle adds per item on top of the item's data:
/// the signed item header with its default tags plus the bundle index entry.
pub const BUNDLE_ITEM_OVERHEAD: u64 = 2048;

const TAGS_SCHEMA: &str = r#"{
    "type": "array",
    "items": {
        "type": "record",
        "name": "Tag",
        "fields": [
            { "name": "name", "type": "bytes" },
            { "name": "value", "type": "bytes" }
        ]
    }
}"#;

pub fn get_tags_schema() -> Result<Schema> {
    Ok(Schema::parse_str(TAGS_SCHEMA)?)
}

/// Avro-encodes tags. An empty list encodes to no bytes at all.
pub fn encode_tags(tags: &[Tag<String>]) -> Result<Vec<u8>> {
    if tags.is_empty() {
        return Ok(Vec::new());
    }

    let schema = get_tags_schema()?;
    let records = tags
        .iter()
        .map(|t| {
            AvroValue::Record(vec![
                ("name".to_string(), AvroValue::Bytes(t.name.as_bytes().to_vec())),
                ("value".to_string(), AvroValue::Bytes(t.value.as_bytes().to_vec())),
            ])
        })
        .collect();

    Ok(to_avro_datum(&schema, AvroValue::Array(records))?)
}

pub fn decode_tags(bytes: &[u8]) -> Result<Vec<Tag<String>>> {
    if bytes.is_empty() {
        return Ok(Vec::new());
    }

    let schema = get_tags_schema()?;
    let mut reader = bytes;
    let value = from_avro_datum(&schema, &mut reader, None)?;

    let records = match value {
        AvroValue::Array(records) => records,
        other => return Err(invalid_item(format!("tags are not an array: {:?}", other))),
    };

    records
        .into_iter()
        .map(|record| {
            let fields = match record {
                AvroValue::Record(fields) => fields,
                other => return Err(invalid_item(format!("tag is not a record: {:?}", other))),
            };
            let mut tag = Tag::<String>::default();
            for (field, value) in fields {
                let bytes = match value {
                    AvroValue::Bytes(bytes) => bytes,
                    other => {
                        return Err(invalid_item(format!("tag {} is not bytes: {:?}", field, other)))
                    }
                };
                let text = String::from_utf8(bytes)
                    .map_err(|e| invalid_item(format!("tag {} is not utf-8: {}", field, e)))?;
                match field.as_str() {
                    "name" => tag.name = text,
                    "value" => tag.value = text,
                    _ => {}
                }
            }
            Ok(tag)
        })
        .collect()
}

fn invalid_item(message: String) -> ArloaderError {
    ArloaderError::InvalidDataItem { message }
}

/// A signed entry inside a bundle.
#[derive(Debug, Clone, PartialEq)]
pub struct DataItem {
    pub id: Base64,
    pub signature_type: u16,
    pub signature: Base64,
    pub owner: Base64,
    pub target: Base64,
    pub anchor: Base64,
    pub tags: Vec<Tag<String>>,
    pub data: Base64,
}

impl Default for DataItem {
    fn default() -> Self {
        Self {
            id: Base64::default(),
            signature_type: ARWEAVE_SIGNATURE_TYPE,
            signature: Base64::default(),
            owner: Base64::default(),
            target: Base64::default(),
            anchor: Base64::default(),
            tags: Vec::new(),
            data: Base64::default(),
        }
    }
}

impl ToItems for DataItem {
    fn to_deep_hash_item(&self) -> Result<DeepHashItem> {
        Ok(DeepHashItem::from_children(vec![
            DeepHashItem::from_item(b"dataitem"),
            DeepHashItem::from_item(b"1"),
            DeepHashItem::from_item(self.signature_type.to_string().as_bytes()),
            DeepHashItem::from_item(&self.owner.0),
            DeepHashItem::from_item(&self.target.0),
            DeepHashItem::from_item(&self.anchor.0),
            DeepHashItem::from_item(&encode_tags(&self.tags)?),
            DeepHashItem::from_item(&self.data.0),
        ]))
    }
}

impl DataItem {
    pub fn serialize(&self) -> Result<Vec<u8>> {
        if self.signature.0.len() != SIGNATURE_LENGTH {
            return Err(ArloaderError::UnsignedTransaction);
        }
        if self.owner.0.len() != OWNER_LENGTH {
            return Err(invalid_item(format!(
                "owner must be {} bytes, got {}",
                OWNER_LENGTH,
                self.owner.0.len()
            )));
        }

        let tag_bytes = encode_tags(&self.tags)?;
        let mut out = Vec::with_capacity(
            2 + SIGNATURE_LENGTH + OWNER_LENGTH + 2 + 2 * ID_LENGTH + 16 + tag_bytes.len()
                + self.data.0.len(),
        );

        out.extend_from_slice(&self.signature_type.to_le_bytes());
        out.extend_from_slice(&self.signature.0);
        out.extend_from_slice(&self.owner.0);
        push_optional(&mut out, &self.target, "target")?;
        push_optional(&mut out, &self.anchor, "anchor")?;
        out.extend_from_slice(&(self.tags.len() as u64).to_le_bytes());
        out.extend_from_slice(&(tag_bytes.len() as u64).to_le_bytes());
        out.extend_from_slice(&tag_bytes);
        out.extend_from_slice(&self.data.0);
        Ok(out)
    }

    pub fn deserialize(bytes: &[u8]) -> Result<DataItem> {
        let mut reader = ByteReader::new(bytes);

        let signature_type = u16::from_le_bytes(reader.array::<2>()?);
        if signature_type != ARWEAVE_SIGNATURE_TYPE {
            return Err(invalid_item(format!(
                "unsupported signature type {}",
                signature_type
            )));
        }
        let signature = Base64(reader.take(SIGNATURE_LENGTH)?.to_vec());
        let owner = Base64(reader.take(OWNER_LENGTH)?.to_vec());
        let target = reader.optional_id()?;
        let anchor = reader.optional_id()?;

        let tags_count = u64::from_le_bytes(reader.array::<8>()?) as usize;
        let tags_len = u64::from_le_bytes(reader.array::<8>()?) as usize;
        let tags = decode_tags(reader.take(tags_len)?)?;
        if tags.len() != tags_count {
            return Err(invalid_item(format!(
                "header declares {} tags, found {}",
                tags_count,
                tags.len()
            )));
        }

        let data = Base64(reader.rest().to_vec());

        Ok(DataItem {
            id: Base64::default(),
            signature_type,
            signature,
            owner,
            target,
            anchor,
            tags,
            data,
        })
    }

    /// Bundle header entry (32-byte size, 32-byte id) and the serialized item.
    pub fn to_bundle_item(&self) -> Result<(Vec<u8>, Vec<u8>)> {
        if self.id.0.len() != ID_LENGTH {
            return Err(ArloaderError::UnsignedTransaction);
        }
        let binary = self.serialize()?;
        let mut header = Vec::with_capacity(64);
        header.extend_from_slice(&u256_le(binary.len() as u64));
        header.extend_from_slice(&self.id.0);
        Ok((header, binary))
    }
}

fn push_optional(out: &mut Vec<u8>, field: &Base64, name: &str) -> Result<()> {
    match field.0.len() {
        0 => out.push(0),
        ID_LENGTH => {
            out.push(1);
            out.extend_from_slice(&field.0);
        }
        len => {
            return Err(invalid_item(format!(
                "{} must be empty or {} bytes, got {}",
                name, ID_LENGTH, len
            )))
        }
    }
    Ok(())
}

/// 8-byte little-endian value padded to 32 bytes.
fn u256_le(value: u64) -> [u8; 32] {
    let mut out = [0u8; 32];
    out[..8].copy_from_slice(&value.to_le_bytes());
    out
}

struct ByteReader<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> ByteReader<'a> {
    fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, pos: 0 }
    }

    fn take(&mut self, len: usize) -> Result<&'a [u8]> {
        let end = self
            .pos
            .checked_add(len)
            .filter(|end| *end <= self.bytes.len())
            .ok_or_else(|| {
                invalid_item(format!(
                    "unexpected end of input reading {} bytes at {}",
                    len, self.pos
                ))
            })?;
        let slice = &self.bytes[self.pos..end];
        self.pos = end;
        Ok(slice)
    }

    fn array<const N: usize>(&mut self) -> Result<[u8; N]> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.take(N)?);
        Ok(out)
    }

    fn u256(&mut self) -> Result<u64> {
        let bytes = self.take(32)?;
        if bytes[8..].iter().any(|b| *b != 0) {
            return Err(ArloaderError::InvalidBundle {
                message: "length does not fit in 64 bits".to_string(),
            });
        }
        let mut low = [0u8; 8];
        low.copy_from_slice(&bytes[..8]);
        Ok(u64::from_le_bytes(low))
    }

    fn optional_id(&mut self) -> Result<Base64> {
        match self.array::<1>()?[0] {
            0 => Ok(Base64::default()),
            1 => Ok(Base64(self.take(ID_LENGTH)?.to_vec())),
            flag => Err(invalid_item(format!("invalid presence flag {}", flag))),
        }
    }

    fn rest(&mut self) -> &'a [u8] {
        let slice = &self.bytes[self.pos..];
        self.pos = self.bytes.len();
        slice
    }
}

/// Concatenates signed data items into bundle bytes.
pub fn create_bundle(data_items: &[DataItem]) -> Result<Vec<u8>> {
    let (headers, binaries): (Vec<Vec<u8>>, Vec<Vec<u8>>) = data_items
        .iter()
        .map(|d| d.to_bundle_item())
        .collect::<Result<Vec<_>>>()?
        .into_iter()
        .unzip();

    let size = 32 + headers.iter().map(Vec::len).sum::<usize>()
        + binaries.iter().map(Vec::len).sum::<usize>();
    let mut bundle = Vec::with_capacity(size);
    bundle.extend_from_slice(&u256_le(data_items.len() as u64));
    headers.iter().for_each(|h| bundle.extend_from_slice(h));
    binaries.iter().for_each(|b| bundle.extend_from_slice(b));
    Ok(bundle)
}

/// Parses bundle bytes, checking every item's signature against its owner and
/// its id against the bundle header.
pub fn deserialize_bundle(bundle: &[u8], crypto: &Provider) -> Result<Vec<DataItem>> {
    let mut reader = ByteReader::new(bundle);
    let count = reader.u256()? as usize;

    let mut entries = Vec::with_capacity(count.min(bundle.len() / 64));
    for _ in 0..count {
        let size = reader.u256()? as usize;
        let id = reader.take(ID_LENGTH)?.to_vec();
        entries.push((size, id));
    }

    entries
        .into_iter()
        .map(|(size, id)| {
            let mut data_item = DataItem::deserialize(reader.take(size)?)?;
            let deep_hash = crypto.deep_hash(data_item.to_deep_hash_item()?)?;
            crypto.verify_with_owner(&data_item.owner.0, &data_item.signature.0, &deep_hash)?;

            let computed = crypto.hash_sha256(&data_item.signature.0)?;
            if computed.as_slice() != id.as_slice() {
                return Err(ArloaderError::InvalidBundle {
                    message: format!(
                        "data item id {} does not match its signature",
                        Base64(id)
                    ),
                });
            }
            data_item.id = Base64(id);
            Ok(data_item)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::tags::FromUtf8Strs;

    const KEYFILE: &str = "tests/fixtures/arweave-keyfile.json";

    fn signed_item(provider: &Provider, data: &[u8], tags: Vec<Tag<String>>) -> DataItem {
        let mut item = DataItem {
            owner: provider.keypair_modulus().unwrap(),
            data: Base64(data.to_vec()),
            tags,
            ..Default::default()
        };
        let deep_hash = provider.deep_hash(item.to_deep_hash_item().unwrap()).unwrap();
        let signature = provider.sign(&deep_hash).unwrap();
        item.id = Base64(provider.hash_sha256(&signature).unwrap().to_vec());
        item.signature = Base64(signature);
        item
    }

    #[test]
    fn test_tags_avro_encoding() {
        let tags = vec![
            Tag::<String>::from_utf8_strs("Content-Type", "image/png").unwrap(),
            Tag::<String>::from_utf8_strs("User-Agent", "arloader").unwrap(),
        ];
        let bytes = encode_tags(&tags).unwrap();
        // Block of two items (zigzag 4), then "Content-Type" length (zigzag 24).
        assert_eq!(bytes[0], 4);
        assert_eq!(bytes[1], 24);
        assert_eq!(&bytes[2..14], b"Content-Type");
        assert_eq!(*bytes.last().unwrap(), 0);
        assert_eq!(decode_tags(&bytes).unwrap(), tags);

        assert!(encode_tags(&[]).unwrap().is_empty());
        assert!(decode_tags(&[]).unwrap().is_empty());
    }

    #[test]
    fn test_data_item_binary_layout() {
        let provider = Provider::from_keypair_path_sync(KEYFILE).unwrap();
        let tags = vec![Tag::<String>::from_utf8_strs("Type", "test").unwrap()];
        let item = signed_item(&provider, b"hello", tags.clone());

        let bytes = item.serialize().unwrap();
        assert_eq!(&bytes[..2], &[1, 0]);
        assert_eq!(&bytes[2..514], item.signature.as_slice());
        assert_eq!(&bytes[514..1026], item.owner.as_slice());
        // Target and anchor absent.
        assert_eq!(&bytes[1026..1028], &[0, 0]);
        assert_eq!(&bytes[1028..1036], &1u64.to_le_bytes());
        assert!(bytes.ends_with(b"hello"));

        let parsed = DataItem::deserialize(&bytes).unwrap();
        assert_eq!(parsed.tags, tags);
        assert_eq!(parsed.data.0, b"hello".to_vec());
        assert!(parsed.id.is_empty());
    }

    #[test]
    fn test_deserialize_rejects_truncated_item() {
        let provider = Provider::from_keypair_path_sync(KEYFILE).unwrap();
        let item = signed_item(&provider, b"data", vec![]);
        let bytes = item.serialize().unwrap();

        let err = DataItem::deserialize(&bytes[..600]).unwrap_err();
        assert!(matches!(err, ArloaderError::InvalidDataItem { .. }));
    }

    #[test]
    fn test_unsigned_item_cannot_be_bundled() {
        let item = DataItem::default();
        assert!(matches!(
            item.to_bundle_item(),
            Err(ArloaderError::UnsignedTransaction)
        ));
    }

    #[test]
    fn test_bundle_header_and_items() {
        let provider = Provider::from_keypair_path_sync(KEYFILE).unwrap();
        let items = vec![
            signed_item(&provider, b"first", vec![]),
            signed_item(
                &provider,
                b"second item",
                vec![Tag::<String>::from_utf8_strs("k", "v").unwrap()],
            ),
        ];

        let bundle = create_bundle(&items).unwrap();
        assert_eq!(&bundle[..8], &2u64.to_le_bytes());
        assert!(bundle[8..32].iter().all(|b| *b == 0));
        let first_size = items[0].serialize().unwrap().len() as u64;
        assert_eq!(&bundle[32..40], &first_size.to_le_bytes());
        assert_eq!(&bundle[64..96], items[0].id.as_slice());

        let parsed = deserialize_bundle(&bundle, &provider).unwrap();
        assert_eq!(parsed, items);
    }

    #[test]
    fn test_deserialize_bundle_detects_tampering() {
        let provider = Provider::from_keypair_path_sync(KEYFILE).unwrap();
        let items = vec![signed_item(&provider, b"payload", vec![])];
        let mut bundle = create_bundle(&items).unwrap();

        let last = bundle.len() - 1;
        bundle[last] ^= 0xff;
        assert!(deserialize_bundle(&bundle, &provider).is_err());
    }
}
