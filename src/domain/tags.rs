use crate::domain::base64::Base64;
use crate::utils::error::Result;
use crate::utils::validation::parse_tag_arg;
use serde::{Deserialize, Serialize};

/// Name/value pair attached to a transaction (`Tag<Base64>`) or a bundled
/// data item (`Tag<String>`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag<T> {
    pub name: T,
    pub value: T,
}

pub trait FromUtf8Strs<T> {
    fn from_utf8_strs(name: &str, value: &str) -> Result<T>;
}

impl FromUtf8Strs<Tag<Base64>> for Tag<Base64> {
    fn from_utf8_strs(name: &str, value: &str) -> Result<Self> {
        Ok(Tag {
            name: Base64(name.as_bytes().to_vec()),
            value: Base64(value.as_bytes().to_vec()),
        })
    }
}

impl FromUtf8Strs<Tag<String>> for Tag<String> {
    fn from_utf8_strs(name: &str, value: &str) -> Result<Self> {
        Ok(Tag {
            name: name.to_string(),
            value: value.to_string(),
        })
    }
}

impl Tag<Base64> {
    pub fn to_utf8_tag(&self) -> Tag<String> {
        Tag {
            name: String::from_utf8_lossy(&self.name.0).into_owned(),
            value: String::from_utf8_lossy(&self.value.0).into_owned(),
        }
    }
}

/// Parses `name:value` CLI arguments into tags of either kind.
pub fn tags_from_args<T: FromUtf8Strs<T>>(args: &[String]) -> Result<Vec<T>> {
    args.iter()
        .map(|arg| {
            let (name, value) = parse_tag_arg(arg)?;
            T::from_utf8_strs(&name, &value)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base64_tag_serializes_encoded() {
        let tag = Tag::<Base64>::from_utf8_strs("Content-Type", "image/png").unwrap();
        let json = serde_json::to_value(&tag).unwrap();
        assert_eq!(json["name"], "Q29udGVudC1UeXBl");
        assert_eq!(json["value"], "aW1hZ2UvcG5n");
        assert_eq!(tag.to_utf8_tag().value, "image/png");
    }

    #[test]
    fn test_tags_from_args() {
        let args = vec!["App-Name:arloader".to_string(), "Type:nft".to_string()];
        let tags: Vec<Tag<String>> = tags_from_args(&args).unwrap();
        assert_eq!(tags.len(), 2);
        assert_eq!(tags[1].name, "Type");
        assert_eq!(tags[1].value, "nft");

        let bad = vec!["missing-separator".to_string()];
        assert!(tags_from_args::<Tag<Base64>>(&bad).is_err());
    }
}
