use std::time::Duration;

use async_trait::async_trait;
use awc::Client;

use crate::blockchain::{PeerClient, PeerError, RemoteChain};

/// Fetches peer chains over HTTP
///
/// Peers are addressed as `host:port` and serve their chain from the same
/// `GET /api/v1/chain` endpoint this node exposes. Every failure mode
/// (connect error, timeout, non-2xx status, undecodable body) maps to a
/// `PeerError`, which the resolver treats as "no candidate from this peer".
pub struct HttpPeerClient {
    timeout: Duration,
}

impl HttpPeerClient {
    /// Creates a client with the given per-request timeout
    pub fn new(timeout: Duration) -> Self {
        HttpPeerClient { timeout }
    }
}

impl Default for HttpPeerClient {
    fn default() -> Self {
        HttpPeerClient::new(Duration::from_secs(5))
    }
}

#[async_trait(?Send)]
impl PeerClient for HttpPeerClient {
    async fn fetch_chain(&self, address: &str) -> Result<RemoteChain, PeerError> {
        let url = format!("http://{}/api/v1/chain", address);
        let client = Client::default();

        let mut response = client
            .get(&url)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|err| PeerError::Unreachable(err.to_string()))?;

        if !response.status().is_success() {
            return Err(PeerError::Unreachable(format!(
                "{} returned status {}",
                url,
                response.status()
            )));
        }

        response
            .json::<RemoteChain>()
            .await
            .map_err(|err| PeerError::MalformedResponse(err.to_string()))
    }
}
