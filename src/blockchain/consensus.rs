use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

use super::block::{Block, GENESIS_PREVIOUS_HASH};
use super::pow;

/// A peer's view of its chain, as served by `GET /api/v1/chain`
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RemoteChain {
    /// The length of the chain
    pub length: usize,

    /// The blocks in the chain
    pub chain: Vec<Block>,
}

/// Errors that can occur while fetching a peer's chain
///
/// All of these mean the same thing to the resolver: the peer contributes no
/// candidate. They are logged and skipped, never propagated.
#[derive(Debug, Error)]
pub enum PeerError {
    #[error("peer unreachable: {0}")]
    Unreachable(String),

    #[error("malformed peer response: {0}")]
    MalformedResponse(String),
}

/// Transport collaborator that fetches a peer's `(length, chain)` view
///
/// `?Send` because the production implementation runs on actix's thread-local
/// runtime; tests substitute an in-memory implementation.
#[async_trait(?Send)]
pub trait PeerClient {
    async fn fetch_chain(&self, address: &str) -> Result<RemoteChain, PeerError>;
}

/// Validates a candidate chain from genesis to tip
///
/// Walks the sequence tracking the expected previous hash, starting at "0".
/// Each block's hash is re-derived from its fields rather than trusted, so a
/// tampered transaction list is caught either directly (the recomputed hash
/// no longer carries the proof-of-work) or through broken linkage further
/// down. Every block's index must equal its position in the sequence. Only
/// the first block is the genesis, sealed without proof-of-work, so only its
/// content hash and linkage are checked; every other block must also satisfy
/// the difficulty predicate. Short-circuits on the first failure.
pub fn check_chain_validity(chain: &[Block], difficulty: u32) -> bool {
    let mut expected_previous_hash = GENESIS_PREVIOUS_HASH.to_string();

    for (position, block) in chain.iter().enumerate() {
        // Indices are positional; a block cannot claim a slot it does not
        // occupy. The genesis exemption below keys on the position, never on
        // the block's self-reported index.
        if block.index != position as u64 {
            return false;
        }

        if block.previous_hash != expected_previous_hash {
            return false;
        }

        let sealed = if position == 0 {
            block.hash == block.compute_hash()
        } else {
            pow::is_valid_proof(block, &block.hash, difficulty)
        };
        if !sealed {
            return false;
        }

        expected_previous_hash = block.hash.clone();
    }

    true
}

/// Selects the longest valid candidate chain, if any beats the local one
///
/// Pure longest-valid-chain rule: a candidate qualifies when its reported
/// length strictly exceeds the running maximum (seeded with the local length)
/// and its chain passes full validity checking. A reported length that
/// disagrees with the delivered chain is a malformed payload and contributes
/// no candidate. With a strict comparison the first-seen candidate wins among
/// equal lengths, so the tie-break follows iteration order.
pub fn select_longest_valid(
    local_length: usize,
    candidates: &[RemoteChain],
    difficulty: u32,
) -> Option<&RemoteChain> {
    let mut max_length = local_length;
    let mut best = None;

    for candidate in candidates {
        if candidate.length != candidate.chain.len() {
            continue;
        }

        if candidate.length > max_length && check_chain_validity(&candidate.chain, difficulty) {
            max_length = candidate.length;
            best = Some(candidate);
        }
    }

    best
}
