use std::fmt;

use serde::{Serialize, Serializer};
use sha2::{Digest, Sha256};

const CHECKSUM_LEN: usize = 4;

/// A 32-byte chain identifier (transaction, blockchain, or asset ID).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Id(pub [u8; 32]);

impl Id {
    pub const EMPTY: Self = Self([0u8; 32]);

    pub fn hash_of(bytes: &[u8]) -> Self {
        let digest = Sha256::digest(bytes);
        let mut out = [0u8; 32];
        out.copy_from_slice(&digest);
        Self(out)
    }
}

impl fmt::Display for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&cb58_encode(&self.0))
    }
}

impl Serialize for Id {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Base58 with the last four bytes of the payload's sha256 appended.
pub fn cb58_encode(bytes: &[u8]) -> String {
    let checksum = Sha256::digest(bytes);
    let mut payload = Vec::with_capacity(bytes.len() + CHECKSUM_LEN);
    payload.extend_from_slice(bytes);
    payload.extend_from_slice(&checksum[checksum.len() - CHECKSUM_LEN..]);
    bs58::encode(payload).into_string()
}
