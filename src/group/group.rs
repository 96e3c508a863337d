use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, OnceLock};

use super::getter::Getter;
use crate::cache::{ByteView, EvictionHook, GuardedStore, StoreStats};
use crate::error::{CacheError, Result};
use crate::peers::types::PeerPicker;
use crate::singleflight::SingleFlight;

/// What to do with a value that was fetched from a remote peer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RemotePolicy {
    /// Hand it to the caller only. The owning peer keeps the single cached
    /// copy, so every remote hit costs one round trip.
    #[default]
    Skip,
    /// Also store it in the local cache.
    Populate,
}

#[derive(Debug, Default)]
struct Counters {
    gets: AtomicU64,
    hits: AtomicU64,
    peer_loads: AtomicU64,
    peer_errors: AtomicU64,
    local_loads: AtomicU64,
    local_errors: AtomicU64,
}

/// Point-in-time view of a group's counters and cache usage.
#[derive(Debug, Clone, Serialize)]
pub struct GroupStats {
    pub name: String,
    pub gets: u64,
    pub hits: u64,
    pub peer_loads: u64,
    pub peer_errors: u64,
    pub local_loads: u64,
    pub local_errors: u64,
    pub cache: StoreStats,
}

/// A named cache namespace.
///
/// Lookups are read-through: a miss is resolved by the peer owning the key
/// or, failing that, by the group's [`Getter`]. Concurrent misses for the
/// same key share one load.
pub struct Group {
    name: String,
    getter: Arc<dyn Getter>,
    main_cache: Arc<GuardedStore>,
    peers: OnceLock<Arc<dyn PeerPicker>>,
    loader: SingleFlight<ByteView, CacheError>,
    /// Loads for `get_local`. Kept apart from `loader` so a peer request
    /// never joins a load that is itself waiting on a peer.
    local_loader: SingleFlight<ByteView, CacheError>,
    remote_policy: RemotePolicy,
    counters: Arc<Counters>,
}

pub struct GroupBuilder {
    name: String,
    cache_bytes: usize,
    getter: Arc<dyn Getter>,
    remote_policy: RemotePolicy,
    on_evicted: Option<EvictionHook>,
}

impl GroupBuilder {
    pub fn remote_policy(mut self, policy: RemotePolicy) -> Self {
        self.remote_policy = policy;
        self
    }

    pub fn on_evicted(mut self, hook: EvictionHook) -> Self {
        self.on_evicted = Some(hook);
        self
    }

    pub fn build(self) -> Group {
        Group {
            name: self.name,
            getter: self.getter,
            main_cache: Arc::new(GuardedStore::with_eviction_hook(
                self.cache_bytes,
                self.on_evicted,
            )),
            peers: OnceLock::new(),
            loader: SingleFlight::new(),
            local_loader: SingleFlight::new(),
            remote_policy: self.remote_policy,
            counters: Arc::new(Counters::default()),
        }
    }
}

impl Group {
    pub fn new(name: impl Into<String>, cache_bytes: usize, getter: Arc<dyn Getter>) -> Self {
        Self::builder(name, cache_bytes, getter).build()
    }

    pub fn builder(
        name: impl Into<String>,
        cache_bytes: usize,
        getter: Arc<dyn Getter>,
    ) -> GroupBuilder {
        GroupBuilder {
            name: name.into(),
            cache_bytes,
            getter,
            remote_policy: RemotePolicy::default(),
            on_evicted: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Installs the peer router. Allowed once per group.
    pub fn register_peers(&self, peers: Arc<dyn PeerPicker>) -> Result<()> {
        self.peers.set(peers).map_err(|_| {
            CacheError::Configuration(format!(
                "peers already registered for group {}",
                self.name
            ))
        })
    }

    /// Read-through lookup: local cache, then the owning peer, then the getter.
    pub async fn get(&self, key: &str) -> Result<ByteView> {
        self.lookup(key, true).await
    }

    /// Like [`Group::get`] but never consults peers. Used to answer peer
    /// requests so a lookup crosses at most one hop.
    pub async fn get_local(&self, key: &str) -> Result<ByteView> {
        self.lookup(key, false).await
    }

    pub fn stats(&self) -> GroupStats {
        let c = &self.counters;
        GroupStats {
            name: self.name.clone(),
            gets: c.gets.load(Ordering::Relaxed),
            hits: c.hits.load(Ordering::Relaxed),
            peer_loads: c.peer_loads.load(Ordering::Relaxed),
            peer_errors: c.peer_errors.load(Ordering::Relaxed),
            local_loads: c.local_loads.load(Ordering::Relaxed),
            local_errors: c.local_errors.load(Ordering::Relaxed),
            cache: self.main_cache.stats(),
        }
    }

    async fn lookup(&self, key: &str, allow_remote: bool) -> Result<ByteView> {
        if key.is_empty() {
            return Err(CacheError::InvalidArgument("key is required".to_string()));
        }
        self.counters.gets.fetch_add(1, Ordering::Relaxed);

        if let Some(value) = self.main_cache.get(key) {
            tracing::debug!(group = %self.name, key, "cache hit");
            self.counters.hits.fetch_add(1, Ordering::Relaxed);
            return Ok(value);
        }

        let loader = if allow_remote {
            &self.loader
        } else {
            &self.local_loader
        };
        let load = Load {
            group: self.name.clone(),
            key: key.to_string(),
            getter: self.getter.clone(),
            main_cache: self.main_cache.clone(),
            peers: if allow_remote {
                self.peers.get().cloned()
            } else {
                None
            },
            remote_policy: self.remote_policy,
            counters: self.counters.clone(),
        };

        loader.call(key, move || load.run()).await
    }
}

/// Everything a deduplicated load needs, detached from the group's lifetime.
struct Load {
    group: String,
    key: String,
    getter: Arc<dyn Getter>,
    main_cache: Arc<GuardedStore>,
    peers: Option<Arc<dyn PeerPicker>>,
    remote_policy: RemotePolicy,
    counters: Arc<Counters>,
}

impl Load {
    async fn run(self) -> Result<ByteView> {
        if let Some(peers) = &self.peers
            && let Some(peer) = peers.pick_peer(&self.key)
        {
            match peer.get(&self.group, &self.key).await {
                Ok(bytes) => {
                    self.counters.peer_loads.fetch_add(1, Ordering::Relaxed);
                    let value = ByteView::from(bytes);
                    if self.remote_policy == RemotePolicy::Populate {
                        self.main_cache.add(&self.key, value.clone());
                    }
                    return Ok(value);
                }
                Err(e) => {
                    self.counters.peer_errors.fetch_add(1, Ordering::Relaxed);
                    tracing::warn!(
                        group = %self.group,
                        key = %self.key,
                        "Failed to get from peer, loading locally: {}",
                        e
                    );
                }
            }
        }

        self.load_locally().await
    }

    async fn load_locally(&self) -> Result<ByteView> {
        let bytes = match self.getter.get(&self.key).await {
            Ok(bytes) => bytes,
            Err(e) => {
                self.counters.local_errors.fetch_add(1, Ordering::Relaxed);
                tracing::error!(group = %self.group, key = %self.key, "Getter failed: {:#}", e);
                return Err(CacheError::Upstream(format!("{:#}", e)));
            }
        };

        // The getter handed over ownership, so nobody else can reach this buffer.
        let value = ByteView::from(bytes);
        self.main_cache.add(&self.key, value.clone());
        self.counters.local_loads.fetch_add(1, Ordering::Relaxed);

        Ok(value)
    }
}
