//! Keys, hashing and signing.
//!
//! Arweave signs with RSA-PSS over SHA-256 (salt length 32) and hashes the
//! signing payload with its deep hash algorithm, built on SHA-384.

use crate::domain::base64::Base64;
use crate::domain::transaction::DeepHashItem;
use crate::utils::error::{ArloaderError, Result};
use rand::RngCore;
use rsa::pss::{BlindedSigningKey, Signature, VerifyingKey};
use rsa::signature::{RandomizedSigner, SignatureEncoding, Verifier};
use rsa::traits::PublicKeyParts;
use rsa::{BigUint, RsaPrivateKey, RsaPublicKey};
use serde::Deserialize;
use sha2::{Digest, Sha256, Sha384};
use std::path::Path;
use std::str::FromStr;

const PUBLIC_EXPONENT: u32 = 65537;

/// Arweave keyfile (RSA JWK).
#[derive(Debug, Deserialize)]
struct Jwk {
    kty: String,
    n: Base64,
    e: Base64,
    d: Base64,
    p: Option<Base64>,
    q: Option<Base64>,
}

impl Jwk {
    fn into_private_key(self) -> Result<RsaPrivateKey> {
        if self.kty != "RSA" {
            return Err(ArloaderError::ConfigError {
                message: format!("unsupported key type {}", self.kty),
            });
        }

        let to_uint = |b: &Base64| BigUint::from_bytes_be(&b.0);
        let primes = match (&self.p, &self.q) {
            (Some(p), Some(q)) => vec![to_uint(p), to_uint(q)],
            _ => Vec::new(),
        };

        let key = RsaPrivateKey::from_components(
            to_uint(&self.n),
            to_uint(&self.e),
            to_uint(&self.d),
            primes,
        )?;
        key.validate()?;
        Ok(key)
    }
}

#[derive(Debug, Clone, Default)]
pub struct Provider {
    keypair: Option<RsaPrivateKey>,
}

impl Provider {
    pub async fn from_keypair_path(keypair_path: impl AsRef<Path>) -> Result<Provider> {
        let data = tokio::fs::read_to_string(keypair_path.as_ref()).await?;
        Self::from_jwk_str(&data)
    }

    pub fn from_keypair_path_sync(keypair_path: impl AsRef<Path>) -> Result<Provider> {
        let data = std::fs::read_to_string(keypair_path.as_ref())?;
        Self::from_jwk_str(&data)
    }

    pub fn from_jwk_str(jwk: &str) -> Result<Provider> {
        let jwk: Jwk = serde_json::from_str(jwk)?;
        Ok(Provider {
            keypair: Some(jwk.into_private_key()?),
        })
    }

    pub fn has_keypair(&self) -> bool {
        self.keypair.is_some()
    }

    fn keypair(&self) -> Result<&RsaPrivateKey> {
        self.keypair.as_ref().ok_or(ArloaderError::MissingKeypair)
    }

    /// Public modulus, used as the `owner` of transactions and data items.
    pub fn keypair_modulus(&self) -> Result<Base64> {
        Ok(Base64(self.keypair()?.n().to_bytes_be()))
    }

    pub fn wallet_address(&self) -> Result<Base64> {
        let modulus = self.keypair_modulus()?;
        Ok(Base64(self.hash_sha256(&modulus.0)?.to_vec()))
    }

    pub fn sign(&self, message: &[u8]) -> Result<Vec<u8>> {
        let signing_key = BlindedSigningKey::<Sha256>::new(self.keypair()?.clone());
        let mut rng = rand::thread_rng();
        let signature = signing_key.try_sign_with_rng(&mut rng, message)?;
        Ok(signature.to_vec())
    }

    pub fn verify(&self, signature: &[u8], message: &[u8]) -> Result<()> {
        let public_key = RsaPublicKey::from(self.keypair()?);
        verify_with_key(public_key, signature, message)
    }

    /// Verifies against an arbitrary owner modulus, e.g. a data item signed by
    /// another wallet.
    pub fn verify_with_owner(&self, owner: &[u8], signature: &[u8], message: &[u8]) -> Result<()> {
        let public_key = RsaPublicKey::new(
            BigUint::from_bytes_be(owner),
            BigUint::from(PUBLIC_EXPONENT),
        )?;
        verify_with_key(public_key, signature, message)
    }

    pub fn hash_sha256(&self, message: &[u8]) -> Result<[u8; 32]> {
        Ok(Sha256::digest(message).into())
    }

    pub fn hash_sha384(&self, message: &[u8]) -> Result<[u8; 48]> {
        let mut out = [0u8; 48];
        out.copy_from_slice(&Sha384::digest(message));
        Ok(out)
    }

    /// SHA-256 of the concatenated SHA-256 hashes of each message; the node
    /// hash used by the merkle tree.
    pub fn hash_all(&self, messages: &[&[u8]]) -> Result<[u8; 32]> {
        let mut hasher = Sha256::new();
        for m in messages {
            hasher.update(self.hash_sha256(m)?);
        }
        Ok(hasher.finalize().into())
    }

    pub fn concat_u8_48(&self, left: [u8; 48], right: [u8; 48]) -> Result<[u8; 96]> {
        let mut out = [0u8; 96];
        out[..48].copy_from_slice(&left);
        out[48..].copy_from_slice(&right);
        Ok(out)
    }

    pub fn deep_hash(&self, deep_hash_item: DeepHashItem) -> Result<[u8; 48]> {
        match deep_hash_item {
            DeepHashItem::Blob(blob) => {
                let tag = format!("blob{}", blob.len());
                let tagged = self.concat_u8_48(
                    self.hash_sha384(tag.as_bytes())?,
                    self.hash_sha384(&blob)?,
                )?;
                self.hash_sha384(&tagged)
            }
            DeepHashItem::List(list) => {
                let tag = format!("list{}", list.len());
                let mut acc = self.hash_sha384(tag.as_bytes())?;
                for child in list {
                    let child_hash = self.deep_hash(child)?;
                    acc = self.hash_sha384(&self.concat_u8_48(acc, child_hash)?)?;
                }
                Ok(acc)
            }
        }
    }

    pub fn fill_rand(&self, dest: &mut [u8]) -> Result<()> {
        rand::thread_rng().fill_bytes(dest);
        Ok(())
    }
}

fn verify_with_key(public_key: RsaPublicKey, signature: &[u8], message: &[u8]) -> Result<()> {
    let verifying_key = VerifyingKey::<Sha256>::new(public_key);
    let signature = Signature::try_from(signature)?;
    verifying_key.verify(message, &signature)?;
    Ok(())
}

impl FromStr for Provider {
    type Err = ArloaderError;

    fn from_str(jwk: &str) -> Result<Self> {
        Self::from_jwk_str(jwk)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const KEYFILE: &str = "tests/fixtures/arweave-keyfile.json";
    const WALLET_ADDRESS: &str = "IrVE39_1_jMAMehSbfew__a7OzK3OdLQl-clMfFnUEo";

    #[tokio::test]
    async fn test_wallet_address_from_keyfile() {
        let provider = Provider::from_keypair_path(KEYFILE).await.unwrap();
        assert_eq!(provider.keypair_modulus().unwrap().0.len(), 512);
        assert_eq!(provider.wallet_address().unwrap().to_string(), WALLET_ADDRESS);
    }

    #[test]
    fn test_sign_and_verify() {
        let provider = Provider::from_keypair_path_sync(KEYFILE).unwrap();
        let message = provider.hash_sha384(b"arloader").unwrap();
        let signature = provider.sign(&message).unwrap();
        assert_eq!(signature.len(), 512);

        provider.verify(&signature, &message).unwrap();
        let owner = provider.keypair_modulus().unwrap();
        provider
            .verify_with_owner(&owner.0, &signature, &message)
            .unwrap();

        assert!(provider.verify(&signature, b"something else").is_err());
    }

    #[test]
    fn test_provider_without_keypair() {
        let provider = Provider::default();
        assert!(!provider.has_keypair());
        assert!(matches!(
            provider.sign(b"data"),
            Err(ArloaderError::MissingKeypair)
        ));
        assert!(provider.hash_sha256(b"data").is_ok());
    }

    #[test]
    fn test_deep_hash_blob() {
        let provider = Provider::default();
        let data = b"arweave".to_vec();

        let mut tagged = Sha384::digest(b"blob7").to_vec();
        tagged.extend_from_slice(&Sha384::digest(&data));
        let expected = Sha384::digest(&tagged).to_vec();

        assert_eq!(
            provider.deep_hash(DeepHashItem::Blob(data)).unwrap().to_vec(),
            expected
        );
    }

    #[test]
    fn test_deep_hash_list() {
        let provider = Provider::default();
        let child = DeepHashItem::Blob(b"a".to_vec());
        let child_hash = provider.deep_hash(child.clone()).unwrap();

        let mut joined = Sha384::digest(b"list1").to_vec();
        joined.extend_from_slice(&child_hash);
        let expected = Sha384::digest(&joined).to_vec();

        assert_eq!(
            provider
                .deep_hash(DeepHashItem::List(vec![child]))
                .unwrap()
                .to_vec(),
            expected
        );

        let empty = Sha384::digest(b"list0").to_vec();
        assert_eq!(
            provider.deep_hash(DeepHashItem::List(vec![])).unwrap().to_vec(),
            empty
        );
    }

    #[test]
    fn test_rejects_non_rsa_key() {
        let err = Provider::from_str(r#"{"kty":"EC","n":"","e":"","d":""}"#).unwrap_err();
        assert!(matches!(err, ArloaderError::ConfigError { .. }));
    }
}
