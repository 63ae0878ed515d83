// Blockchain module
//
// This module contains the core ledger implementation including:
// - Block structure and canonical content hashing
// - Transaction structure
// - Proof of work engine
// - Blockchain structure (pending pool, mining, appends)
// - Chain validity checking and longest-valid-chain conflict resolution

pub mod block;
pub mod chain;
pub mod consensus;
pub mod pow;
pub mod transaction;

// Re-export main components for easier access
pub use block::Block;
pub use chain::{Blockchain, BlockchainError};
pub use consensus::{PeerClient, PeerError, RemoteChain};
pub use transaction::Transaction;
