use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use chrono::Utc;
use log::{error, info, warn};
use thiserror::Error;

use super::block::Block;
use super::consensus::{self, PeerClient};
use super::pow;
use super::transaction::Transaction;

/// Errors that can occur during blockchain operations
#[derive(Debug, Error)]
pub enum BlockchainError {
    /// A block produced by our own miner failed verification. Under the
    /// single-writer discipline this indicates a bug, not a routine rejection.
    #[error("Mined block rejected: {0}")]
    MinedBlockRejected(String),
}

/// Block sequence plus pending pool, guarded together
///
/// Everything that must change atomically lives behind one lock: the pool is
/// cleared in the same critical section that appends the block it was mined
/// into, so no caller can observe one without the other.
#[derive(Debug)]
struct LedgerState {
    blocks: Vec<Block>,
    pending: Vec<Transaction>,
}

/// Represents the blockchain
#[derive(Debug, Clone)]
pub struct Blockchain {
    /// The chain of blocks and the pending transaction pool
    state: Arc<Mutex<LedgerState>>,

    /// Registered peer addresses
    nodes: Arc<Mutex<HashSet<String>>>,

    /// Mining difficulty (number of leading zeros required in hash)
    difficulty: u32,
}

impl Blockchain {
    /// Creates a new blockchain with a genesis block
    ///
    /// # Arguments
    ///
    /// * `difficulty` - The number of leading zero characters a mined block's
    ///   hash must have
    ///
    /// # Returns
    ///
    /// A new Blockchain instance
    pub fn new(difficulty: u32) -> Self {
        Blockchain {
            state: Arc::new(Mutex::new(LedgerState {
                blocks: vec![Block::genesis()],
                pending: Vec::new(),
            })),
            nodes: Arc::new(Mutex::new(HashSet::new())),
            difficulty,
        }
    }

    /// Gets the configured mining difficulty
    pub fn difficulty(&self) -> u32 {
        self.difficulty
    }

    /// Gets the entire chain
    ///
    /// # Returns
    ///
    /// A vector of all blocks in the chain
    pub fn get_chain(&self) -> Vec<Block> {
        self.state.lock().unwrap().blocks.clone()
    }

    /// Gets the number of blocks in the chain
    pub fn len(&self) -> usize {
        self.state.lock().unwrap().blocks.len()
    }

    /// Gets the last block in the chain
    ///
    /// # Returns
    ///
    /// The last block in the chain
    pub fn get_last_block(&self) -> Block {
        let state = self.state.lock().unwrap();
        state.blocks.last().unwrap().clone()
    }

    /// Gets all pending transactions
    ///
    /// # Returns
    ///
    /// A vector of all transactions waiting to be mined
    pub fn get_pending_transactions(&self) -> Vec<Transaction> {
        self.state.lock().unwrap().pending.clone()
    }

    /// Adds a new transaction to the pending pool
    ///
    /// No balance or signature checking happens here; every submission is
    /// accepted.
    ///
    /// # Arguments
    ///
    /// * `sender` - The address of the sender
    /// * `receiver` - The address of the receiver
    /// * `amount` - The amount to transfer
    ///
    /// # Returns
    ///
    /// The index of the block that will include this transaction
    pub fn add_new_transaction(&self, sender: String, receiver: String, amount: f64) -> u64 {
        let transaction = Transaction::new(sender, receiver, amount);

        let mut state = self.state.lock().unwrap();
        state.pending.push(transaction);

        state.blocks.last().unwrap().index + 1
    }

    /// Mines a new block with the pending transactions
    ///
    /// Builds a candidate from the pool and the current tip, runs the
    /// proof-of-work search, and appends the sealed block. The whole
    /// operation holds the state lock, so the tip cannot move under the
    /// search and the pool is cleared atomically with the append.
    ///
    /// # Returns
    ///
    /// `Ok(Some(index))` of the new block, or `Ok(None)` if the pool was
    /// empty and there was nothing to mine
    pub fn mine(&self) -> Result<Option<u64>, BlockchainError> {
        let mut state = self.state.lock().unwrap();

        if state.pending.is_empty() {
            return Ok(None);
        }

        let last_block = state.blocks.last().unwrap();
        let mut candidate = Block::new(
            last_block.index + 1,
            last_block.hash.clone(),
            state.pending.clone(),
            Utc::now(),
        );

        let proof = pow::find_proof(&mut candidate, self.difficulty);
        let index = candidate.index;
        let transaction_count = candidate.transactions.len();

        if !Self::append_block(&mut state.blocks, candidate, &proof, self.difficulty) {
            // The proof was computed against the current tip inside this same
            // critical section, so a rejection here means an invariant broke.
            error!("Freshly mined block {} was rejected; pending pool kept for retry", index);
            return Err(BlockchainError::MinedBlockRejected(format!(
                "block {} failed verification immediately after mining",
                index
            )));
        }

        state.pending.clear();
        info!("Mined block {} with {} transactions", index, transaction_count);

        Ok(Some(index))
    }

    /// Adds a sealed block to the chain
    ///
    /// The single authoritative gate for mutating the chain's tail. Rejects
    /// the block if its `previous_hash` does not match the current tip (stale
    /// or forked candidate) or if the proof fails verification.
    ///
    /// # Arguments
    ///
    /// * `block` - The candidate block
    /// * `proof` - The claimed proof-of-work hash
    ///
    /// # Returns
    ///
    /// true if the block was appended, false if it was rejected (chain
    /// unchanged)
    pub fn add_block(&self, block: Block, proof: &str) -> bool {
        let mut state = self.state.lock().unwrap();
        Self::append_block(&mut state.blocks, block, proof, self.difficulty)
    }

    fn append_block(blocks: &mut Vec<Block>, mut block: Block, proof: &str, difficulty: u32) -> bool {
        let last_hash = &blocks.last().unwrap().hash;

        if block.previous_hash != *last_hash {
            warn!(
                "Rejected block {}: previous_hash does not match the current tip",
                block.index
            );
            return false;
        }

        if !pow::is_valid_proof(&block, proof, difficulty) {
            warn!("Rejected block {}: invalid proof of work", block.index);
            return false;
        }

        block.hash = proof.to_string();
        blocks.push(block);
        true
    }

    /// Validates the local chain
    ///
    /// # Returns
    ///
    /// true if the chain is valid, false otherwise
    pub fn is_valid(&self) -> bool {
        let state = self.state.lock().unwrap();
        consensus::check_chain_validity(&state.blocks, self.difficulty)
    }

    /// Validates a candidate chain against this chain's difficulty
    pub fn check_chain_validity(&self, chain: &[Block]) -> bool {
        consensus::check_chain_validity(chain, self.difficulty)
    }

    /// Registers a peer node
    ///
    /// Idempotent: registering the same address twice is a no-op.
    ///
    /// # Arguments
    ///
    /// * `address` - The peer's address (e.g. "127.0.0.1:8081")
    pub fn register_node(&self, address: String) {
        let mut nodes = self.nodes.lock().unwrap();
        if nodes.insert(address.clone()) {
            info!("Registered peer node {}", address);
        }
    }

    /// Gets all registered peer addresses
    pub fn get_nodes(&self) -> Vec<String> {
        self.nodes.lock().unwrap().iter().cloned().collect()
    }

    /// Resolves conflicts with peers using the longest-valid-chain rule
    ///
    /// Fetches every registered peer's chain concurrently, then adopts the
    /// longest candidate that is strictly longer than the local chain and
    /// passes full validity checking. Unreachable peers, malformed responses,
    /// and invalid chains contribute no candidate and never abort resolution.
    /// The replacement itself is a single atomic swap under the state lock.
    ///
    /// # Arguments
    ///
    /// * `client` - The transport collaborator used to fetch peer chains
    ///
    /// # Returns
    ///
    /// true if the local chain was replaced
    pub async fn resolve_conflicts<C: PeerClient>(&self, client: &C) -> bool {
        let peers = self.get_nodes();
        if peers.is_empty() {
            return false;
        }

        let fetches = peers.iter().map(|peer| client.fetch_chain(peer));
        let responses = futures::future::join_all(fetches).await;

        let mut candidates = Vec::new();
        for (peer, response) in peers.iter().zip(responses) {
            match response {
                Ok(remote) => candidates.push(remote),
                Err(err) => warn!("Skipping peer {}: {}", peer, err),
            }
        }

        let mut state = self.state.lock().unwrap();
        match consensus::select_longest_valid(state.blocks.len(), &candidates, self.difficulty) {
            Some(best) => {
                info!(
                    "Replacing local chain of length {} with peer chain of length {}",
                    state.blocks.len(),
                    best.chain.len()
                );
                state.blocks = best.chain.clone();
                true
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_blockchain() {
        let blockchain = Blockchain::new(2);
        let chain = blockchain.get_chain();

        assert_eq!(chain.len(), 1);
        assert_eq!(chain[0].index, 0);
        assert_eq!(chain[0].previous_hash, "0");
        assert!(chain[0].transactions.is_empty());
    }

    #[test]
    fn test_add_new_transaction() {
        let blockchain = Blockchain::new(2);

        let block_index =
            blockchain.add_new_transaction("Alice".to_string(), "Bob".to_string(), 10.0);
        assert_eq!(block_index, 1);

        let pending = blockchain.get_pending_transactions();
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].sender, "Alice");
    }

    #[test]
    fn test_mine_empty_pool_is_noop() {
        let blockchain = Blockchain::new(2);

        assert!(blockchain.mine().unwrap().is_none());
        assert_eq!(blockchain.len(), 1);
    }

    #[test]
    fn test_mine_block() {
        let blockchain = Blockchain::new(2);
        blockchain.add_new_transaction("Alice".to_string(), "Bob".to_string(), 10.0);

        let index = blockchain.mine().unwrap();
        assert_eq!(index, Some(1));
        assert_eq!(blockchain.len(), 2);

        // The pool is cleared once its contents are committed
        assert!(blockchain.get_pending_transactions().is_empty());

        let tip = blockchain.get_last_block();
        assert_eq!(tip.transactions.len(), 1);
        assert!(tip.hash.starts_with("00"));
    }

    #[test]
    fn test_mine_two_blocks_and_validate() {
        let blockchain = Blockchain::new(2);

        blockchain.add_new_transaction("Alice".to_string(), "Bob".to_string(), 10.0);
        assert_eq!(blockchain.mine().unwrap(), Some(1));

        blockchain.add_new_transaction("Bob".to_string(), "Charlie".to_string(), 5.0);
        assert_eq!(blockchain.mine().unwrap(), Some(2));

        assert_eq!(blockchain.len(), 3);
        assert!(blockchain.is_valid());
    }

    #[test]
    fn test_add_block_rejects_stale_previous_hash() {
        let blockchain = Blockchain::new(1);
        blockchain.add_new_transaction("Alice".to_string(), "Bob".to_string(), 10.0);
        blockchain.mine().unwrap();

        // Candidate built against genesis instead of the current tip
        let genesis = blockchain.get_chain()[0].clone();
        let mut stale = Block::new(1, genesis.hash, Vec::new(), Utc::now());
        let proof = pow::find_proof(&mut stale, 1);

        assert!(!blockchain.add_block(stale, &proof));
        assert_eq!(blockchain.len(), 2);
    }

    #[test]
    fn test_add_block_rejects_invalid_proof() {
        let blockchain = Blockchain::new(2);

        let tip = blockchain.get_last_block();
        let block = Block::new(1, tip.hash, Vec::new(), Utc::now());

        // A claimed hash with enough zeros that matches nothing
        assert!(!blockchain.add_block(block.clone(), &"0".repeat(64)));

        // The block's true hash, but without the required leading zeros
        let content_hash = block.compute_hash();
        if !content_hash.starts_with("00") {
            assert!(!blockchain.add_block(block, &content_hash));
        }

        assert_eq!(blockchain.len(), 1);
    }

    #[test]
    fn test_add_block_accepts_valid_candidate() {
        let blockchain = Blockchain::new(1);

        let tip = blockchain.get_last_block();
        let mut block = Block::new(
            1,
            tip.hash,
            vec![Transaction::new("Alice".to_string(), "Bob".to_string(), 10.0)],
            Utc::now(),
        );
        let proof = pow::find_proof(&mut block, 1);

        assert!(blockchain.add_block(block, &proof));
        assert_eq!(blockchain.len(), 2);
        assert_eq!(blockchain.get_last_block().hash, proof);
    }

    #[test]
    fn test_register_node_is_idempotent() {
        let blockchain = Blockchain::new(2);

        blockchain.register_node("127.0.0.1:5000".to_string());
        blockchain.register_node("127.0.0.1:5000".to_string());

        assert_eq!(blockchain.get_nodes().len(), 1);
    }
}
