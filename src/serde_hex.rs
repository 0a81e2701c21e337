// Single-purpose hex (de)serializers for use in `#[serde(with)]`.

use ed25519_dalek::{Signature, VerifyingKey};
use num_bigint::BigUint;
use std::borrow::Cow;
use std::convert::TryInto;

pub use hex_buffer_serde::Hex;

// a single-purpose type for use in `#[serde(with)]`
pub enum EdPublicKeyHex {}

impl Hex<VerifyingKey> for EdPublicKeyHex {
    type Error = String;

    fn create_bytes(public_key: &VerifyingKey) -> Cow<[u8]> {
        public_key.as_bytes().to_vec().into()
    }

    fn from_bytes(bytes: &[u8]) -> Result<VerifyingKey, String> {
        let bytes: &[u8; 32] = bytes
            .try_into()
            .map_err(|_| "wrong length for ed25519 public key".to_string())?;
        VerifyingKey::from_bytes(bytes).map_err(|e| e.to_string())
    }
}

// a single-purpose type for use in `#[serde(with)]`
pub enum EdSignatureHex {}

impl Hex<Signature> for EdSignatureHex {
    type Error = String;

    fn create_bytes(sig: &Signature) -> Cow<[u8]> {
        sig.to_bytes().to_vec().into()
    }

    fn from_bytes(bytes: &[u8]) -> Result<Signature, String> {
        Signature::from_slice(bytes).map_err(|e| e.to_string())
    }
}

// a single-purpose type for use in `#[serde(with)]`
pub enum BigUintHex {}

impl Hex<BigUint> for BigUintHex {
    type Error = String;

    fn create_bytes(value: &BigUint) -> Cow<[u8]> {
        value.to_bytes_be().into()
    }

    fn from_bytes(bytes: &[u8]) -> Result<BigUint, String> {
        Ok(BigUint::from_bytes_be(bytes))
    }
}

/// Hex serde for a 32-byte merkle hash.
pub mod hash_hex {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(hash: &[u8; 32], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&hex::encode(hash))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<[u8; 32], D::Error> {
        let s = String::deserialize(deserializer)?;
        let bytes = hex::decode(&s).map_err(serde::de::Error::custom)?;
        if bytes.len() != 32 {
            return Err(serde::de::Error::custom("expected 32 bytes of hash"));
        }
        let mut hash = [0u8; 32];
        hash.copy_from_slice(&bytes);
        Ok(hash)
    }
}

/// Hex serde for a sibling-hash path.
pub mod hash_vec_hex {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(
        hashes: &[[u8; 32]],
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(hashes.iter().map(hex::encode))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Vec<[u8; 32]>, D::Error> {
        let strings = Vec::<String>::deserialize(deserializer)?;
        let mut hashes = Vec::with_capacity(strings.len());
        for s in strings {
            let bytes = hex::decode(&s).map_err(serde::de::Error::custom)?;
            if bytes.len() != 32 {
                return Err(serde::de::Error::custom("expected 32 bytes of hash"));
            }
            let mut hash = [0u8; 32];
            hash.copy_from_slice(&bytes);
            hashes.push(hash);
        }
        Ok(hashes)
    }
}
