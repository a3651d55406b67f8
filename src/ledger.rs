//! The append-only traceability ledger.
//!
//! A [`Ledger`] owns a growing sequence of hash-linked blocks. The first
//! block is always the sentinel genesis; every later block is appended only
//! through the mining operation, so each one satisfies the difficulty
//! predicate and links to the hash of its predecessor. Blocks are never
//! mutated or removed, and callers only ever receive clones of them.

use serde::Serialize;

use crate::block::{meets_difficulty, Block, RecordInput, ZERO_HASH};
use crate::error::{LedgerError, Result};
use crate::miner::mine_block;

/// Leading hex zeros required of every mined block hash.
pub const DEFAULT_DIFFICULTY: u32 = 4;

/// Upper bound on nonce attempts per append. Far above the `16^4` expected
/// work at the default difficulty, so legitimate mining never trips it.
pub const DEFAULT_MAX_MINING_ITERATIONS: u64 = 10_000_000;

/// Outcome of a lookup by subject key. Verification failures are data, not
/// errors: a tampered record is returned alongside `is_valid = false` so
/// callers can inspect it, and an absent record leaves `record` as `None`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Verification {
    pub is_valid: bool,
    pub record: Option<Block>,
    pub chain: Vec<Block>,
}

pub struct Ledger {
    blocks: Vec<Block>,
    difficulty: u32,
    max_mining_iterations: u64,
}

impl Ledger {
    /// Create a ledger holding only the genesis block.
    ///
    /// The genesis block is a trust anchor, not a mined record: its hash is
    /// the zero sentinel and deliberately does not satisfy the difficulty
    /// predicate, so verifying the genesis subject key reports invalid.
    pub fn new(difficulty: u32) -> Result<Self> {
        Self::with_limits(difficulty, DEFAULT_MAX_MINING_ITERATIONS)
    }

    /// Create a ledger with an explicit bound on nonce attempts per append.
    pub fn with_limits(difficulty: u32, max_mining_iterations: u64) -> Result<Self> {
        if difficulty == 0 || difficulty > 64 {
            return Err(LedgerError::InvalidDifficulty(format!(
                "difficulty must be between 1 and 64 leading hex zeros, got {}",
                difficulty
            )));
        }
        Ok(Ledger {
            blocks: vec![Block::genesis()],
            difficulty,
            max_mining_iterations,
        })
    }

    pub fn difficulty(&self) -> u32 {
        self.difficulty
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Mine a new block for `input` and append it to the chain.
    ///
    /// Either a fully valid block is appended and returned, or the chain is
    /// left unchanged: an exhausted nonce search surfaces as
    /// [`LedgerError::MiningExhausted`] without a partial append.
    pub fn append_record(&mut self, input: RecordInput) -> Result<Block> {
        // The chain is never empty; genesis is created at construction.
        let previous_hash = self
            .blocks
            .last()
            .map(|b| b.hash.clone())
            .unwrap_or_else(|| ZERO_HASH.to_string());

        let candidate = Block::new(input, previous_hash);
        let mined = mine_block(candidate, self.difficulty, self.max_mining_iterations)?;
        self.blocks.push(mined.clone());
        Ok(mined)
    }

    /// Look up the earliest block recorded for `subject_key` and check its
    /// integrity: the stored hash must be reproducible from the stored
    /// fields and must satisfy the difficulty predicate.
    pub fn verify_record(&self, subject_key: &str) -> Verification {
        match self.blocks.iter().find(|b| b.subject_key == subject_key) {
            None => Verification {
                is_valid: false,
                record: None,
                chain: self.chain(),
            },
            Some(block) => {
                let recomputed = block.compute_hash();
                let is_valid =
                    recomputed == block.hash && meets_difficulty(&recomputed, self.difficulty);
                Verification {
                    is_valid,
                    record: Some(block.clone()),
                    chain: self.chain(),
                }
            }
        }
    }

    /// Snapshot of the full chain, oldest first.
    pub fn chain(&self) -> Vec<Block> {
        self.blocks.clone()
    }

    /// Clone of the block at `index`, if present.
    pub fn block_at(&self, index: usize) -> Option<Block> {
        self.blocks.get(index).cloned()
    }
}
