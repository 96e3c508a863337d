//! Node Configuration
//!
//! Command line flags, each with an environment variable fallback, so a node
//! can be started from a shell or a container definition alike:
//!
//! ```text
//! cache-node --addr http://127.0.0.1:8001 \
//!            --peers http://127.0.0.1:8001,http://127.0.0.1:8002,http://127.0.0.1:8003 \
//!            --api-bind 127.0.0.1:9999
//! ```

use clap::Parser;
use reqwest::Url;
use std::net::{SocketAddr, ToSocketAddrs};
use std::time::Duration;

use crate::error::{CacheError, Result};
use crate::group::RemotePolicy;
use crate::peers::PoolOptions;
use crate::peers::protocol::{DEFAULT_BASE_PATH, DEFAULT_REPLICAS, is_valid_base_path};

#[derive(Debug, Clone, Parser)]
#[command(name = "cache-node", version, about = "Distributed read-through cache node")]
pub struct NodeConfig {
    /// URL other peers use to reach this node.
    #[arg(long, env = "CACHE_ADDR", default_value = "http://127.0.0.1:8001")]
    pub addr: String,

    /// Socket the peer server listens on. Derived from --addr when omitted.
    #[arg(long, env = "CACHE_BIND")]
    pub bind: Option<SocketAddr>,

    /// Every node in the cluster, this one included.
    #[arg(long, env = "CACHE_PEERS", value_delimiter = ',', required = true)]
    pub peers: Vec<String>,

    /// Socket for the front API. No front API is served when omitted.
    #[arg(long, env = "CACHE_API_BIND")]
    pub api_bind: Option<SocketAddr>,

    #[arg(long, env = "CACHE_GROUP", default_value = "scores")]
    pub group: String,

    /// Byte budget of the group's cache; 0 means unbounded.
    #[arg(long, env = "CACHE_BYTES", default_value_t = 2 << 10)]
    pub cache_bytes: usize,

    /// Virtual nodes per peer on the hash ring.
    #[arg(long, env = "CACHE_REPLICAS", default_value_t = DEFAULT_REPLICAS)]
    pub replicas: usize,

    #[arg(long, env = "CACHE_BASE_PATH", default_value = DEFAULT_BASE_PATH)]
    pub base_path: String,

    #[arg(long, env = "CACHE_PEER_TIMEOUT_MS", default_value_t = 3000)]
    pub peer_timeout_ms: u64,

    /// Keep a local copy of values fetched from other peers.
    #[arg(long, env = "CACHE_REMOTE")]
    pub cache_remote: bool,
}

impl NodeConfig {
    pub fn validate(&self) -> Result<()> {
        if self.group.is_empty() {
            return Err(CacheError::Configuration("group name is empty".to_string()));
        }
        if self.replicas == 0 {
            return Err(CacheError::Configuration(
                "replicas must be at least 1".to_string(),
            ));
        }
        if !is_valid_base_path(&self.base_path) {
            return Err(CacheError::Configuration(format!(
                "base path must start and end with '/': {}",
                self.base_path
            )));
        }

        let peers = self.peer_addrs();
        if peers.is_empty() {
            return Err(CacheError::Configuration("peer list is empty".to_string()));
        }
        for peer in &peers {
            parse_http_url(peer)?;
        }

        let addr = self.self_addr();
        parse_http_url(&addr)?;
        if !peers.contains(&addr) {
            return Err(CacheError::Configuration(format!(
                "{} is not in the peer list {:?}",
                addr, peers
            )));
        }

        Ok(())
    }

    /// This node's address without a trailing slash.
    pub fn self_addr(&self) -> String {
        self.addr.trim().trim_end_matches('/').to_string()
    }

    /// Peer addresses, trimmed, with blanks dropped.
    pub fn peer_addrs(&self) -> Vec<String> {
        self.peers
            .iter()
            .map(|p| p.trim().trim_end_matches('/').to_string())
            .filter(|p| !p.is_empty())
            .collect()
    }

    /// The explicit `--bind`, or the host and port of `--addr`.
    pub fn bind_addr(&self) -> Result<SocketAddr> {
        if let Some(bind) = self.bind {
            return Ok(bind);
        }

        let url = parse_http_url(&self.self_addr())?;
        let host = url
            .host_str()
            .ok_or_else(|| CacheError::Configuration(format!("no host in {}", self.addr)))?;
        let port = url
            .port_or_known_default()
            .ok_or_else(|| CacheError::Configuration(format!("no port in {}", self.addr)))?;

        (host, port)
            .to_socket_addrs()
            .map_err(|e| CacheError::Configuration(format!("cannot resolve {}: {}", host, e)))?
            .next()
            .ok_or_else(|| CacheError::Configuration(format!("cannot resolve {}", host)))
    }

    pub fn pool_options(&self) -> PoolOptions {
        PoolOptions {
            base_path: self.base_path.clone(),
            replicas: self.replicas,
            timeout: Duration::from_millis(self.peer_timeout_ms),
        }
    }

    pub fn remote_policy(&self) -> RemotePolicy {
        if self.cache_remote {
            RemotePolicy::Populate
        } else {
            RemotePolicy::Skip
        }
    }
}

fn parse_http_url(addr: &str) -> Result<Url> {
    let url = Url::parse(addr)
        .map_err(|e| CacheError::Configuration(format!("invalid peer url {}: {}", addr, e)))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(CacheError::Configuration(format!(
            "unsupported scheme {} in {}",
            other, addr
        ))),
    }
}
