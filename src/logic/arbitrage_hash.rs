use super::types::Swap;
use alloy_primitives::{B256, hex};
use serde::{Deserialize, Serialize};
use sha2::digest::Update;
use sha2::{Digest, Sha256};
use std::fmt::{Debug, Display};

/// Stable identifier of an arbitrage: sha256 over the transaction hash and the trace address of every swap in the cycle.
#[derive(Clone, Default, Eq, PartialEq, Hash)]
pub struct ArbitrageHash(pub [u8; 32]);

impl ArbitrageHash {
    pub fn new(transaction_hash: B256, swaps: &[Swap]) -> Self {
        let mut hasher = Sha256::new();

        Update::update(&mut hasher, transaction_hash.as_slice());
        for swap in swaps {
            let path = swap.trace_address.as_slice();
            Update::update(&mut hasher, &(path.len() as u64).to_be_bytes());
            for index in path {
                Update::update(&mut hasher, &(*index as u64).to_be_bytes());
            }
        }

        ArbitrageHash(hasher.finalize().into())
    }
}

impl Display for ArbitrageHash {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", hex::encode_prefixed(self.0))
    }
}

impl Debug for ArbitrageHash {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ArbitrageHash({})", hex::encode_prefixed(self.0))
    }
}

impl Serialize for ArbitrageHash {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&hex::encode_prefixed(self.0))
    }
}

impl<'de> Deserialize<'de> for ArbitrageHash {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        let bytes = hex::decode(&s).map_err(serde::de::Error::custom)?;
        let hash: [u8; 32] = bytes.try_into().map_err(|_| serde::de::Error::custom("arbitrage hash must be 32 bytes"))?;
        Ok(ArbitrageHash(hash))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::{TEST_TRANSACTION_HASH, swap};
    use alloy_primitives::Address;

    #[test]
    fn test_serialize_arbitrage_hash() {
        let arbitrage_hash = ArbitrageHash([1; 32]);

        let serialized = serde_json::to_string(&arbitrage_hash).unwrap();
        let deserialized: ArbitrageHash = serde_json::from_str(&serialized).unwrap();

        assert_eq!(arbitrage_hash, deserialized);
    }

    #[test]
    fn test_deserialize_wrong_length() {
        assert!(serde_json::from_str::<ArbitrageHash>("\"0x0102\"").is_err());
    }

    #[test]
    fn test_arbitrage_hash() {
        let x = Address::repeat_byte(1);
        let swaps = vec![
            swap(&[0], Address::repeat_byte(0x10), x, x, Address::repeat_byte(0xa), 100, Address::repeat_byte(0xb), 80),
            swap(&[1], Address::repeat_byte(0x11), x, x, Address::repeat_byte(0xb), 80, Address::repeat_byte(0xa), 110),
        ];

        let arbitrage_hash = ArbitrageHash::new(TEST_TRANSACTION_HASH, &swaps);

        assert_eq!(arbitrage_hash.to_string(), "0xd662965436d7b665932d15e8860c62c6133c9bb3086aedabde69438d6e6cf27d");
        assert_ne!(arbitrage_hash, ArbitrageHash::new(TEST_TRANSACTION_HASH, &swaps[..1]));
    }
}
