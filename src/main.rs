use actix_cors::Cors;
use actix_web::{middleware, web, App, HttpServer};
use log::info;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

mod api;
mod blockchain;

/// Difficulty used when POW_DIFFICULTY is not set
const DEFAULT_DIFFICULTY: u32 = 2;

/// Reads the mining difficulty from the environment
fn configured_difficulty() -> u32 {
    std::env::var("POW_DIFFICULTY")
        .ok()
        .and_then(|value| value.parse().ok())
        .unwrap_or(DEFAULT_DIFFICULTY)
}

#[derive(OpenApi)]
#[openapi(
    paths(
        api::handlers::get_chain,
        api::handlers::get_pending_transactions,
        api::handlers::new_transaction,
        api::handlers::mine_block,
        api::handlers::validate_chain,
        api::handlers::register_node,
        api::handlers::get_nodes,
        api::handlers::resolve_conflicts
    ),
    components(
        schemas(
            blockchain::Block,
            blockchain::Transaction,
            blockchain::RemoteChain,
            api::handlers::TransactionRequest,
            api::handlers::TransactionResponse,
            api::handlers::MineResponse,
            api::handlers::RegisterNodeRequest,
            api::handlers::NodesResponse,
            api::handlers::ResolveResponse
        )
    ),
    tags(
        (name = "blockchain", description = "Proof-of-work ledger node endpoints")
    ),
    info(
        title = "Proof-of-Work Ledger API",
        version = "1.0.0",
        description = "A hash-linked transaction ledger with proof-of-work mining and longest-valid-chain conflict resolution",
        license(
            name = "MIT",
            url = "https://opensource.org/licenses/MIT"
        )
    )
)]
struct ApiDoc;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Initialize logger
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let difficulty = configured_difficulty();
    let bind_address =
        std::env::var("BIND_ADDRESS").unwrap_or_else(|_| "127.0.0.1:8080".to_string());

    // Create a new blockchain with its genesis block
    let blockchain = web::Data::new(blockchain::Blockchain::new(difficulty));

    info!(
        "Starting ledger node at http://{} with difficulty {}",
        bind_address, difficulty
    );

    // Start HTTP server
    HttpServer::new(move || {
        // Configure CORS
        let cors = Cors::default()
            .allow_any_origin()
            .allow_any_method()
            .allow_any_header()
            .max_age(3600);

        // Configure OpenAPI documentation
        let openapi = ApiDoc::openapi();

        App::new()
            .wrap(middleware::Logger::default())
            .wrap(cors)
            .app_data(blockchain.clone())
            // API routes
            .configure(api::configure_routes)
            // Swagger UI
            .service(
                SwaggerUi::new("/swagger-ui/{_:.*}")
                    .url("/api-docs/openapi.json", openapi.clone())
            )
    })
    .bind(bind_address)?
    .run()
    .await
}
