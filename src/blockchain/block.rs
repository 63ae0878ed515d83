use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use utoipa::ToSchema;

use super::transaction::Transaction;

/// The `previous_hash` value of the genesis block
pub const GENESIS_PREVIOUS_HASH: &str = "0";

/// Represents a block in the chain
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Block {
    /// Index of the block in the chain
    pub index: u64,

    /// Hash of the previous block
    pub previous_hash: String,

    /// List of transactions included in this block
    pub transactions: Vec<Transaction>,

    /// Timestamp when the block was created
    #[schema(value_type = String, example = "2023-01-01T12:00:00Z")]
    pub timestamp: DateTime<Utc>,

    /// Nonce varied during proof-of-work search
    pub nonce: u64,

    /// Hash of the current block (calculated)
    pub hash: String,
}

impl Block {
    /// Creates a new block with nonce 0 and its content hash filled in
    ///
    /// No validation of `index` or `previous_hash` happens here; linkage is
    /// checked by the chain when the block is appended.
    ///
    /// # Arguments
    ///
    /// * `index` - The index of the block in the chain
    /// * `previous_hash` - The hash of the previous block
    /// * `transactions` - The list of transactions to include in the block
    /// * `timestamp` - The creation time of the block
    ///
    /// # Returns
    ///
    /// A new Block instance
    pub fn new(
        index: u64,
        previous_hash: String,
        transactions: Vec<Transaction>,
        timestamp: DateTime<Utc>,
    ) -> Self {
        let mut block = Block {
            index,
            previous_hash,
            transactions,
            timestamp,
            nonce: 0,
            hash: String::new(),
        };

        block.hash = block.compute_hash();
        block
    }

    /// Creates the genesis block for a new chain
    pub fn genesis() -> Self {
        Block::new(0, GENESIS_PREVIOUS_HASH.to_string(), Vec::new(), Utc::now())
    }

    /// Calculates the content hash of the block
    ///
    /// The hash covers every field except `hash` itself, serialized with
    /// sorted keys so identical logical content always yields identical
    /// bytes. Pure: recomputing on unchanged fields gives the same digest.
    ///
    /// # Returns
    ///
    /// The SHA-256 hash of the block as a hexadecimal string
    pub fn compute_hash(&self) -> String {
        let mut hasher = Sha256::new();

        // serde_json objects are BTreeMap-backed, so keys come out sorted
        let block_data = serde_json::json!({
            "index": self.index,
            "previous_hash": self.previous_hash,
            "transactions": self.transactions,
            "timestamp": self.timestamp,
            "nonce": self.nonce,
        });

        hasher.update(block_data.to_string().as_bytes());

        format!("{:x}", hasher.finalize())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_block() {
        let transactions = vec![
            Transaction::new("Alice".to_string(), "Bob".to_string(), 10.0),
            Transaction::new("Bob".to_string(), "Charlie".to_string(), 5.0),
        ];

        let block = Block::new(1, "previous_hash".to_string(), transactions, Utc::now());

        assert_eq!(block.index, 1);
        assert_eq!(block.previous_hash, "previous_hash");
        assert_eq!(block.nonce, 0);
        assert_eq!(block.hash, block.compute_hash());
    }

    #[test]
    fn test_genesis_block() {
        let genesis = Block::genesis();

        assert_eq!(genesis.index, 0);
        assert_eq!(genesis.previous_hash, GENESIS_PREVIOUS_HASH);
        assert!(genesis.transactions.is_empty());
        assert_eq!(genesis.hash, genesis.compute_hash());
    }

    #[test]
    fn test_compute_hash_is_deterministic() {
        let transactions = vec![Transaction::new("Alice".to_string(), "Bob".to_string(), 10.0)];
        let block = Block::new(1, "previous_hash".to_string(), transactions, Utc::now());

        let hash = block.compute_hash();
        assert_eq!(hash, block.compute_hash());
        assert_eq!(hash.len(), 64); // SHA-256 hash is 64 characters in hex
    }

    #[test]
    fn test_hash_field_is_not_part_of_its_own_input() {
        let mut block = Block::new(1, "previous_hash".to_string(), Vec::new(), Utc::now());
        let hash = block.compute_hash();

        // Overwriting the stored hash must not change the recomputed digest
        block.hash = "tampered".to_string();
        assert_eq!(hash, block.compute_hash());
    }

    #[test]
    fn test_hash_changes_with_nonce() {
        let mut block = Block::new(1, "previous_hash".to_string(), Vec::new(), Utc::now());
        let before = block.compute_hash();

        block.nonce += 1;
        assert_ne!(before, block.compute_hash());
    }
}
