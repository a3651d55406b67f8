//! Block structure and hashing for the traceability ledger.

use chrono::Utc;
use rand::rngs::OsRng;
use rand::RngCore;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// All-zero SHA-256 hex sentinel. The genesis block carries this as both its
/// own hash and its previous hash, anchoring the chain.
pub const ZERO_HASH: &str = "0000000000000000000000000000000000000000000000000000000000000000";

/// Subject key reserved for the genesis block. Shaped like a nil UUID so it
/// can never collide with a real packaging record identifier.
pub const GENESIS_SUBJECT_KEY: &str = "00000000-0000-0000-0000-000000000000";

/// Caller-supplied payload for a new traceability record.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordInput {
    pub subject_key: String,
    pub material_origin: String,
    pub certification_type: String,
    pub certification_number: String,
    pub sustainability_score: f64,
}

/// One entry in the ledger. Blocks are immutable once appended; the stored
/// `hash` must be reproducible from the other fields (excluding `id`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Block {
    pub id: String,
    pub subject_key: String,
    pub material_origin: String,
    pub certification_type: String,
    pub certification_number: String,
    pub sustainability_score: f64,
    pub hash: String,
    pub previous_hash: String,
    pub timestamp: u64,
    pub nonce: u64,
}

impl Block {
    /// Build an unmined candidate linked to `previous_hash`. The hash field
    /// is left empty until mining assigns the accepted digest.
    pub fn new(input: RecordInput, previous_hash: String) -> Self {
        Block {
            id: generate_block_id(),
            subject_key: input.subject_key,
            material_origin: input.material_origin,
            certification_type: input.certification_type,
            certification_number: input.certification_number,
            sustainability_score: input.sustainability_score,
            hash: String::new(),
            previous_hash,
            timestamp: now_millis(),
            nonce: 0,
        }
    }

    /// The fixed first block of every chain. Never mined: its hash is the
    /// zero sentinel rather than a proof-of-work digest.
    pub fn genesis() -> Self {
        Block {
            id: "genesis".to_string(),
            subject_key: GENESIS_SUBJECT_KEY.to_string(),
            material_origin: "Genesis Block".to_string(),
            certification_type: "GENESIS".to_string(),
            certification_number: "GEN-000000".to_string(),
            sustainability_score: 100.0,
            hash: ZERO_HASH.to_string(),
            previous_hash: ZERO_HASH.to_string(),
            timestamp: now_millis(),
            nonce: 0,
        }
    }

    /// SHA-256 over the deterministic serialization of every field except
    /// `id` and the stored `hash` itself. Field order is fixed; mining and
    /// verification must agree on it exactly.
    pub fn compute_hash(&self) -> String {
        let data = format!(
            "{}{}{}{}{}{}{}{}",
            self.subject_key,
            self.material_origin,
            self.certification_type,
            self.certification_number,
            self.sustainability_score,
            self.previous_hash,
            self.timestamp,
            self.nonce
        );
        hex::encode(Sha256::digest(data.as_bytes()))
    }
}

/// Whether a hex digest has at least `difficulty` leading `'0'` characters.
pub fn meets_difficulty(hash: &str, difficulty: u32) -> bool {
    let n = difficulty as usize;
    hash.len() >= n && hash.as_bytes()[..n].iter().all(|&b| b == b'0')
}

/// Random, collision-resistant block identifier in RFC 4122 version-4
/// layout, so ids read as standard UUIDs.
pub fn generate_block_id() -> String {
    let mut bytes = [0u8; 16];
    OsRng.fill_bytes(&mut bytes);
    bytes[6] = (bytes[6] & 0x0f) | 0x40;
    bytes[8] = (bytes[8] & 0x3f) | 0x80;
    let h = hex::encode(bytes);
    format!(
        "{}-{}-{}-{}-{}",
        &h[..8],
        &h[8..12],
        &h[12..16],
        &h[16..20],
        &h[20..]
    )
}

pub(crate) fn now_millis() -> u64 {
    Utc::now().timestamp_millis() as u64
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_input() -> RecordInput {
        RecordInput {
            subject_key: "pkg-1001".to_string(),
            material_origin: "Oregon Forests".to_string(),
            certification_type: "FSC Certified".to_string(),
            certification_number: "FSC-1001".to_string(),
            sustainability_score: 92.0,
        }
    }

    #[test]
    fn test_genesis_is_sentinel_valued() {
        let genesis = Block::genesis();
        assert_eq!(genesis.id, "genesis");
        assert_eq!(genesis.subject_key, GENESIS_SUBJECT_KEY);
        assert_eq!(genesis.hash, ZERO_HASH);
        assert_eq!(genesis.previous_hash, ZERO_HASH);
        assert_eq!(genesis.nonce, 0);
    }

    #[test]
    fn test_hash_is_deterministic() {
        let block = Block::new(sample_input(), ZERO_HASH.to_string());
        assert_eq!(block.compute_hash(), block.compute_hash());
        assert_eq!(block.compute_hash().len(), 64);
    }

    #[test]
    fn test_hash_excludes_id() {
        let mut a = Block::new(sample_input(), ZERO_HASH.to_string());
        let b = Block {
            id: generate_block_id(),
            ..a.clone()
        };
        assert_eq!(a.compute_hash(), b.compute_hash());

        // Any hashed field changing must change the digest.
        a.nonce = 1;
        assert_ne!(a.compute_hash(), b.compute_hash());
    }

    #[test]
    fn test_hash_covers_every_payload_field() {
        let base = Block::new(sample_input(), ZERO_HASH.to_string());
        let reference = base.compute_hash();

        let mut tampered = base.clone();
        tampered.material_origin = "Unknown".to_string();
        assert_ne!(tampered.compute_hash(), reference);

        let mut tampered = base.clone();
        tampered.sustainability_score = 10.0;
        assert_ne!(tampered.compute_hash(), reference);

        let mut tampered = base.clone();
        tampered.previous_hash = "ff".repeat(32);
        assert_ne!(tampered.compute_hash(), reference);
    }

    #[test]
    fn test_integer_score_serializes_without_fraction() {
        // 92.0 must hash identically at mine time and verify time, and its
        // rendering must not grow a trailing ".0" between the two.
        assert_eq!(format!("{}", 92.0_f64), "92");
    }

    #[test]
    fn test_meets_difficulty() {
        assert!(meets_difficulty(ZERO_HASH, 4));
        assert!(meets_difficulty(ZERO_HASH, 64));
        assert!(meets_difficulty("0000ab", 4));
        assert!(!meets_difficulty("000a", 4));
        assert!(!meets_difficulty("00", 4));
        assert!(meets_difficulty("abc", 0));
    }

    #[test]
    fn test_block_ids_are_unique_and_uuid_shaped() {
        let a = generate_block_id();
        let b = generate_block_id();
        assert_ne!(a, b);
        assert_eq!(a.len(), 36);
        assert_eq!(a.matches('-').count(), 4);
        // Version nibble is 4.
        assert_eq!(&a[14..15], "4");
    }
}
