//! Proof-of-work mining for candidate blocks.

use crate::block::{meets_difficulty, Block};
use crate::error::{LedgerError, Result};

/// Search for a nonce whose digest carries `difficulty` leading hex zeros.
///
/// The returned block stores the exact nonce that produced the accepted
/// hash. The search is bounded: if `max_iterations` nonces are exhausted
/// without a passing digest, the candidate is discarded and
/// [`LedgerError::MiningExhausted`] is returned instead of an unmined block.
pub fn mine_block(mut candidate: Block, difficulty: u32, max_iterations: u64) -> Result<Block> {
    for nonce in 0..max_iterations {
        candidate.nonce = nonce;
        let hash = candidate.compute_hash();
        if meets_difficulty(&hash, difficulty) {
            candidate.hash = hash;
            return Ok(candidate);
        }
    }
    Err(LedgerError::MiningExhausted {
        attempts: max_iterations,
    })
}
