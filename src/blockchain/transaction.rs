use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Represents a transfer recorded in the ledger
///
/// Transactions carry no signatures or balance semantics; they are opaque
/// payload from the chain's point of view and are immutable once created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Transaction {
    /// Sender's address
    pub sender: String,

    /// Receiver's address
    pub receiver: String,

    /// Amount being transferred
    pub amount: f64,

    /// Timestamp when the transaction was created
    #[schema(value_type = String, example = "2023-01-01T12:00:00Z")]
    pub timestamp: DateTime<Utc>,

    /// Unique identifier for the transaction
    pub id: String,
}

impl Transaction {
    /// Creates a new transaction with a fresh id and the current time
    ///
    /// # Arguments
    ///
    /// * `sender` - The address of the sender
    /// * `receiver` - The address of the receiver
    /// * `amount` - The amount to transfer
    ///
    /// # Returns
    ///
    /// A new Transaction instance
    pub fn new(sender: String, receiver: String, amount: f64) -> Self {
        Transaction {
            sender,
            receiver,
            amount,
            timestamp: Utc::now(),
            id: Uuid::new_v4().to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_transaction() {
        let transaction = Transaction::new("Alice".to_string(), "Bob".to_string(), 10.0);

        assert_eq!(transaction.sender, "Alice");
        assert_eq!(transaction.receiver, "Bob");
        assert_eq!(transaction.amount, 10.0);
        assert!(!transaction.id.is_empty());
    }

    #[test]
    fn test_ids_are_unique() {
        let a = Transaction::new("Alice".to_string(), "Bob".to_string(), 1.0);
        let b = Transaction::new("Alice".to_string(), "Bob".to_string(), 1.0);

        assert_ne!(a.id, b.id);
    }
}
