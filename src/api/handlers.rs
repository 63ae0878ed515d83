use actix_web::{web, HttpResponse, Responder};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::client::HttpPeerClient;
use crate::blockchain::{Blockchain, RemoteChain, Transaction};

/// Data structure for the blockchain state
pub type BlockchainData = web::Data<Blockchain>;

/// Request for the transaction endpoint
#[derive(Serialize, Deserialize, ToSchema)]
pub struct TransactionRequest {
    /// The sender's address
    pub sender: String,

    /// The receiver's address
    pub receiver: String,

    /// The amount to transfer
    pub amount: f64,
}

/// Response for the transaction endpoint
#[derive(Serialize, Deserialize, ToSchema)]
pub struct TransactionResponse {
    /// The message
    pub message: String,

    /// The index of the block that will include this transaction
    pub block_index: u64,
}

/// Response for the mine endpoint
#[derive(Serialize, Deserialize, ToSchema)]
pub struct MineResponse {
    /// The message
    pub message: String,

    /// The index of the newly mined block, absent when there was nothing to mine
    #[serde(skip_serializing_if = "Option::is_none")]
    pub block_index: Option<u64>,
}

/// Request for the node registration endpoint
#[derive(Serialize, Deserialize, ToSchema)]
pub struct RegisterNodeRequest {
    /// The peer's address, e.g. "127.0.0.1:8081"
    pub address: String,
}

/// Response for the node listing endpoint
#[derive(Serialize, Deserialize, ToSchema)]
pub struct NodesResponse {
    /// The registered peer addresses
    pub nodes: Vec<String>,
}

/// Response for the conflict resolution endpoint
#[derive(Serialize, Deserialize, ToSchema)]
pub struct ResolveResponse {
    /// Whether the local chain was replaced by a peer's chain
    pub replaced: bool,

    /// The length of the chain after resolution
    pub length: usize,
}

/// Get the full chain
///
/// Returns the chain and its length. This is also the payload peers consume
/// during conflict resolution.
#[utoipa::path(
    get,
    path = "/api/v1/chain",
    responses(
        (status = 200, description = "Chain retrieved successfully", body = RemoteChain)
    )
)]
pub async fn get_chain(blockchain: BlockchainData) -> impl Responder {
    let chain = blockchain.get_chain();

    let response = RemoteChain {
        length: chain.len(),
        chain,
    };

    HttpResponse::Ok().json(response)
}

/// Get all pending transactions
///
/// Returns all transactions waiting to be included in a block
#[utoipa::path(
    get,
    path = "/api/v1/transactions/pending",
    responses(
        (status = 200, description = "Pending transactions retrieved successfully", body = Vec<Transaction>)
    )
)]
pub async fn get_pending_transactions(blockchain: BlockchainData) -> impl Responder {
    let transactions = blockchain.get_pending_transactions();
    HttpResponse::Ok().json(transactions)
}

/// Create a new transaction
///
/// Adds a new transaction to the pending pool. Submissions are always
/// accepted; there is no balance or signature checking.
#[utoipa::path(
    post,
    path = "/api/v1/transactions/new",
    request_body = TransactionRequest,
    responses(
        (status = 201, description = "Transaction created successfully", body = TransactionResponse)
    )
)]
pub async fn new_transaction(
    blockchain: BlockchainData,
    transaction_req: web::Json<TransactionRequest>,
) -> impl Responder {
    let transaction_req = transaction_req.into_inner();

    let block_index = blockchain.add_new_transaction(
        transaction_req.sender,
        transaction_req.receiver,
        transaction_req.amount,
    );

    let response = TransactionResponse {
        message: "Transaction will be added to Block".to_string(),
        block_index,
    };

    HttpResponse::Created().json(response)
}

/// Mine a new block
///
/// Seals all pending transactions into a new block via proof-of-work. An
/// empty pool is not an error: the response simply carries no block index.
#[utoipa::path(
    post,
    path = "/api/v1/mine",
    responses(
        (status = 200, description = "Mining finished", body = MineResponse),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn mine_block(blockchain: BlockchainData) -> impl Responder {
    match blockchain.mine() {
        Ok(Some(block_index)) => {
            let response = MineResponse {
                message: "New Block Mined".to_string(),
                block_index: Some(block_index),
            };

            HttpResponse::Ok().json(response)
        }
        Ok(None) => {
            let response = MineResponse {
                message: "No transactions to mine".to_string(),
                block_index: None,
            };

            HttpResponse::Ok().json(response)
        }
        Err(err) => HttpResponse::InternalServerError().json(serde_json::json!({
            "error": format!("Failed to mine block: {}", err)
        })),
    }
}

/// Check if the chain is valid
///
/// Validates the entire local chain
#[utoipa::path(
    get,
    path = "/api/v1/validate",
    responses(
        (status = 200, description = "Chain validation status", body = bool)
    )
)]
pub async fn validate_chain(blockchain: BlockchainData) -> impl Responder {
    let is_valid = blockchain.is_valid();
    HttpResponse::Ok().json(is_valid)
}

/// Register a peer node
///
/// Adds a peer address to the node registry. Registering the same address
/// twice is a no-op.
#[utoipa::path(
    post,
    path = "/api/v1/nodes/register",
    request_body = RegisterNodeRequest,
    responses(
        (status = 201, description = "Node registered successfully", body = NodesResponse)
    )
)]
pub async fn register_node(
    blockchain: BlockchainData,
    register_req: web::Json<RegisterNodeRequest>,
) -> impl Responder {
    blockchain.register_node(register_req.into_inner().address);

    let response = NodesResponse {
        nodes: blockchain.get_nodes(),
    };

    HttpResponse::Created().json(response)
}

/// Get all registered peer nodes
#[utoipa::path(
    get,
    path = "/api/v1/nodes",
    responses(
        (status = 200, description = "Nodes retrieved successfully", body = NodesResponse)
    )
)]
pub async fn get_nodes(blockchain: BlockchainData) -> impl Responder {
    let response = NodesResponse {
        nodes: blockchain.get_nodes(),
    };

    HttpResponse::Ok().json(response)
}

/// Resolve conflicts with peers
///
/// Fetches every registered peer's chain and adopts the longest valid one
/// that is strictly longer than the local chain. Unreachable or invalid
/// peers are skipped.
#[utoipa::path(
    post,
    path = "/api/v1/nodes/resolve",
    responses(
        (status = 200, description = "Conflict resolution finished", body = ResolveResponse)
    )
)]
pub async fn resolve_conflicts(blockchain: BlockchainData) -> impl Responder {
    let client = HttpPeerClient::default();
    let replaced = blockchain.resolve_conflicts(&client).await;

    let response = ResolveResponse {
        replaced,
        length: blockchain.len(),
    };

    HttpResponse::Ok().json(response)
}
