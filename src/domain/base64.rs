use crate::utils::error::ArloaderError;
use base64::alphabet::URL_SAFE;
use base64::engine::general_purpose::{GeneralPurpose, GeneralPurposeConfig};
use base64::engine::DecodePaddingMode;
use base64::Engine;
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Base64url without padding on output; padded input is accepted.
const ENGINE: GeneralPurpose = GeneralPurpose::new(
    &URL_SAFE,
    GeneralPurposeConfig::new()
        .with_encode_padding(false)
        .with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// Bytes that travel as base64url text: ids, owners, signatures, data.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Base64(pub Vec<u8>);

impl Base64 {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Display for Base64 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", ENGINE.encode(&self.0))
    }
}

impl FromStr for Base64 {
    type Err = ArloaderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Base64(ENGINE.decode(s.trim())?))
    }
}

impl From<Vec<u8>> for Base64 {
    fn from(bytes: Vec<u8>) -> Self {
        Base64(bytes)
    }
}

impl Serialize for Base64 {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Base64 {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Base64::from_str(&s).map_err(de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_is_url_safe_without_padding() {
        let b = Base64(vec![0xfb, 0xff, 0xbf]);
        assert_eq!(b.to_string(), "-_-_");

        let b = Base64(b"ab".to_vec());
        assert_eq!(b.to_string(), "YWI");
    }

    #[test]
    fn test_parse_accepts_padding() {
        assert_eq!(Base64::from_str("YWI=").unwrap().0, b"ab".to_vec());
        assert_eq!(Base64::from_str("YWI").unwrap().0, b"ab".to_vec());
        assert!(Base64::from_str("not base64!").is_err());
    }

    #[test]
    fn test_empty_value() {
        let b = Base64::from_str("").unwrap();
        assert!(b.is_empty());
        assert_eq!(serde_json::to_string(&b).unwrap(), "\"\"");
    }

    #[test]
    fn test_serde_as_string() {
        let b: Base64 = serde_json::from_str("\"LCwsLCwsLA\"").unwrap();
        assert_eq!(b.0, vec![44u8; 7]);
        assert_eq!(serde_json::to_string(&b).unwrap(), "\"LCwsLCwsLA\"");
    }
}
