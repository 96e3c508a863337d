//! HTTP Peer Pool
//!
//! `HttpPool` is both sides of the peer protocol for one node:
//! - as a [`PeerPicker`] it routes keys over the consistent hash ring and
//!   hands out an [`HttpGetter`] for the owning peer (never for itself);
//! - through [`HttpPool::router`] it serves other nodes' requests out of the
//!   local group registry.

use async_trait::async_trait;
use axum::routing::get;
use axum::{Extension, Router};
use bytes::Bytes;
use parking_lot::Mutex;
use reqwest::Url;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use super::handlers::{handle_bad_request, handle_peer_get};
use super::protocol::{
    DEFAULT_BASE_PATH, DEFAULT_PEER_TIMEOUT, DEFAULT_REPLICAS, is_valid_base_path,
};
use super::types::{PeerGetter, PeerPicker};
use crate::consistenthash::HashRing;
use crate::error::{CacheError, Result};
use crate::group::GroupRegistry;

#[derive(Debug, Clone)]
pub struct PoolOptions {
    pub base_path: String,
    pub replicas: usize,
    pub timeout: Duration,
}

impl Default for PoolOptions {
    fn default() -> Self {
        Self {
            base_path: DEFAULT_BASE_PATH.to_string(),
            replicas: DEFAULT_REPLICAS,
            timeout: DEFAULT_PEER_TIMEOUT,
        }
    }
}

struct PeerSet {
    ring: HashRing,
    getters: HashMap<String, Arc<HttpGetter>>,
}

pub struct HttpPool {
    /// This node's own address, e.g. `http://127.0.0.1:8001`.
    self_addr: String,
    base_path: String,
    replicas: usize,
    client: reqwest::Client,
    peers: Mutex<PeerSet>,
}

impl HttpPool {
    pub fn new(self_addr: impl Into<String>) -> Result<Self> {
        Self::with_options(self_addr, PoolOptions::default())
    }

    pub fn with_options(self_addr: impl Into<String>, options: PoolOptions) -> Result<Self> {
        if !is_valid_base_path(&options.base_path) {
            return Err(CacheError::Configuration(format!(
                "base path must start and end with '/': {}",
                options.base_path
            )));
        }

        let client = reqwest::Client::builder()
            .timeout(options.timeout)
            .build()
            .map_err(|e| CacheError::Configuration(format!("http client: {}", e)))?;

        let self_addr: String = self_addr.into();
        Ok(Self {
            self_addr: self_addr.trim_end_matches('/').to_string(),
            base_path: options.base_path,
            replicas: options.replicas,
            client,
            peers: Mutex::new(PeerSet {
                ring: HashRing::new(options.replicas, None),
                getters: HashMap::new(),
            }),
        })
    }

    /// Replaces the peer set. The list should include this node's own
    /// address so the ring agrees with every other node's ring. Trailing
    /// slashes are ignored when comparing addresses.
    pub fn set_peers<I, S>(&self, peers: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let peers: Vec<String> = peers
            .into_iter()
            .map(|p| p.as_ref().trim_end_matches('/').to_string())
            .collect();

        let mut ring = HashRing::new(self.replicas, None);
        ring.add(&peers);

        let getters = peers
            .iter()
            .map(|peer| {
                let getter = HttpGetter::new(
                    format!("{}{}", peer, self.base_path),
                    self.client.clone(),
                );
                (peer.clone(), Arc::new(getter))
            })
            .collect();

        *self.peers.lock() = PeerSet { ring, getters };
        tracing::info!("[Server {}] peer set: {:?}", self.self_addr, peers);
    }

    pub fn self_addr(&self) -> &str {
        &self.self_addr
    }

    pub fn base_path(&self) -> &str {
        &self.base_path
    }

    /// Routes serving peer requests under the base path.
    pub fn router(&self, registry: Arc<GroupRegistry>) -> Router {
        let peer_routes = Router::new()
            .route("/:group/*key", get(handle_peer_get))
            .fallback(handle_bad_request)
            .layer(Extension(registry));

        Router::new().nest(self.base_path.trim_end_matches('/'), peer_routes)
    }
}

impl PeerPicker for HttpPool {
    fn pick_peer(&self, key: &str) -> Option<Arc<dyn PeerGetter>> {
        let peers = self.peers.lock();
        let peer = peers.ring.get(key)?;
        if peer == self.self_addr {
            return None;
        }

        tracing::info!("[Server {}] Pick peer {}", self.self_addr, peer);
        let getter: Arc<dyn PeerGetter> = peers.getters.get(peer)?.clone();
        Some(getter)
    }
}

/// Client side of the protocol for one remote node.
pub struct HttpGetter {
    /// Peer address plus base path, e.g. `http://10.0.0.2:8001/_distributed_cache/`.
    base_url: String,
    client: reqwest::Client,
}

impl HttpGetter {
    pub fn new(base_url: impl Into<String>, client: reqwest::Client) -> Self {
        Self {
            base_url: base_url.into(),
            client,
        }
    }

    /// Builds `{base_url}{group}/{key}` with each segment percent-encoded,
    /// so keys containing `/`, `?` or spaces survive the trip.
    pub fn url_for(&self, group: &str, key: &str) -> Result<Url> {
        let mut url = Url::parse(&self.base_url)
            .map_err(|e| CacheError::Peer(format!("invalid peer url {}: {}", self.base_url, e)))?;
        url.path_segments_mut()
            .map_err(|_| CacheError::Peer(format!("invalid peer url {}", self.base_url)))?
            .pop_if_empty()
            .push(group)
            .push(key);
        Ok(url)
    }
}

#[async_trait]
impl PeerGetter for HttpGetter {
    async fn get(&self, group: &str, key: &str) -> Result<Bytes> {
        let url = self.url_for(group, key)?;

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| CacheError::Peer(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(CacheError::Peer(format!(
                "server returned {}: {}",
                status,
                body.trim()
            )));
        }

        response
            .bytes()
            .await
            .map_err(|e| CacheError::Peer(format!("reading response body: {}", e)))
    }
}
