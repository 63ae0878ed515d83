// API module
//
// This module contains the HTTP surface of the node and the transport
// collaborator used to fetch peer chains

pub mod client;
pub mod handlers;
pub mod routes;

// Re-export main components for easier access
pub use routes::configure_routes;
