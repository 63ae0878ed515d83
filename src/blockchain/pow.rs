use super::block::Block;

/// Checks whether a hex digest has at least `difficulty` leading zero characters
pub fn meets_difficulty(hash: &str, difficulty: u32) -> bool {
    let target = "0".repeat(difficulty as usize);
    hash.starts_with(&target)
}

/// Searches for a nonce that makes the block's hash satisfy the difficulty
///
/// Resets the nonce to 0 and increments it until the recomputed content hash
/// has `difficulty` leading zero characters. Unbounded search: expected
/// iterations grow as 16^difficulty, and the call does not return until a
/// proof is found.
///
/// # Arguments
///
/// * `block` - The candidate block; its nonce is mutated in place
/// * `difficulty` - The number of leading zeros required
///
/// # Returns
///
/// The proof: the first qualifying hash
pub fn find_proof(block: &mut Block, difficulty: u32) -> String {
    block.nonce = 0;
    let mut hash = block.compute_hash();

    while !meets_difficulty(&hash, difficulty) {
        block.nonce += 1;
        hash = block.compute_hash();
    }

    hash
}

/// Checks whether a claimed hash is a valid proof-of-work for a block
///
/// Both conditions are required: the claimed hash must satisfy the difficulty
/// predicate, and it must equal the block's recomputed content hash. A
/// sufficiently hard hash that does not match the block's contents is not a
/// proof, and neither is a matching hash that is too easy.
pub fn is_valid_proof(block: &Block, claimed_hash: &str, difficulty: u32) -> bool {
    meets_difficulty(claimed_hash, difficulty) && claimed_hash == block.compute_hash()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    use crate::blockchain::transaction::Transaction;

    fn sample_block() -> Block {
        let transactions = vec![Transaction::new("Alice".to_string(), "Bob".to_string(), 10.0)];
        Block::new(1, "previous_hash".to_string(), transactions, Utc::now())
    }

    #[test]
    fn test_meets_difficulty() {
        assert!(meets_difficulty("00abc", 2));
        assert!(meets_difficulty("000abc", 2));
        assert!(!meets_difficulty("0abc", 2));
        assert!(meets_difficulty("abc", 0));
        assert!(!meets_difficulty("0", 2));
    }

    #[test]
    fn test_find_proof_produces_valid_proof() {
        let mut block = sample_block();
        let proof = find_proof(&mut block, 2);

        assert!(proof.starts_with("00"));
        assert_eq!(proof, block.compute_hash());
        assert!(is_valid_proof(&block, &proof, 2));
    }

    #[test]
    fn test_is_valid_proof_rejects_insufficient_difficulty() {
        let mut block = sample_block();
        let proof = find_proof(&mut block, 1);

        // The block's true hash, but checked against a harder target
        if !proof.starts_with("00") {
            assert!(!is_valid_proof(&block, &proof, 2));
        }
        assert!(is_valid_proof(&block, &proof, 1));
    }

    #[test]
    fn test_is_valid_proof_rejects_tampered_block() {
        let mut block = sample_block();
        let proof = find_proof(&mut block, 2);
        assert!(is_valid_proof(&block, &proof, 2));

        // Mutating a transaction after the search invalidates the proof even
        // though the claimed hash still has enough leading zeros
        block.transactions[0].amount = 1_000_000.0;
        assert!(!is_valid_proof(&block, &proof, 2));
    }
}
