//! Group Module Tests
//!
//! Validates the read-through algorithm without any network.
//!
//! ## Test Scopes
//! - **Argument checks**: Empty keys never reach the getter.
//! - **Read-through**: First miss loads once, later reads hit the cache.
//! - **Deduplication**: Concurrent misses collapse into one getter call.
//! - **Peers**: Remote hits are not cached locally; remote failures fall back to the getter.
//! - **Registry**: Registration, duplicate names and lookups by name.

#[cfg(test)]
mod tests {
    use crate::error::{CacheError, Result};
    use crate::group::{Getter, GetterFn, Group, GroupRegistry, RemotePolicy};
    use crate::peers::types::{PeerGetter, PeerPicker};
    use async_trait::async_trait;
    use bytes::Bytes;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    fn score_db() -> HashMap<&'static str, &'static str> {
        HashMap::from([("Tom", "630"), ("Jack", "589"), ("Sam", "567")])
    }

    /// Getter backed by `score_db` that counts its calls per key.
    fn counting_getter() -> (Arc<dyn Getter>, Arc<Mutex<HashMap<String, usize>>>) {
        let counts = Arc::new(Mutex::new(HashMap::new()));
        let seen = counts.clone();
        let getter = GetterFn::new(move |key: String| {
            let seen = seen.clone();
            async move {
                *seen.lock().unwrap().entry(key.clone()).or_insert(0) += 1;
                match score_db().get(key.as_str()) {
                    Some(v) => Ok(v.as_bytes().to_vec()),
                    None => Err(anyhow::anyhow!("{} not exist", key)),
                }
            }
        });
        let getter: Arc<dyn Getter> = Arc::new(getter);
        (getter, counts)
    }

    struct StaticPeer {
        calls: AtomicUsize,
        healthy: bool,
        delay: Duration,
    }

    #[async_trait]
    impl PeerGetter for StaticPeer {
        async fn get(&self, group: &str, key: &str) -> Result<Bytes> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(self.delay).await;
            if self.healthy {
                Ok(Bytes::from(format!("remote:{}:{}", group, key)))
            } else {
                Err(CacheError::Peer("connection refused".to_string()))
            }
        }
    }

    struct AlwaysRemote(Arc<StaticPeer>);

    impl PeerPicker for AlwaysRemote {
        fn pick_peer(&self, _key: &str) -> Option<Arc<dyn PeerGetter>> {
            Some(self.0.clone())
        }
    }

    fn static_peer(healthy: bool) -> Arc<StaticPeer> {
        slow_peer(healthy, Duration::ZERO)
    }

    fn slow_peer(healthy: bool, delay: Duration) -> Arc<StaticPeer> {
        Arc::new(StaticPeer {
            calls: AtomicUsize::new(0),
            healthy,
            delay,
        })
    }

    // ============================================================
    // ARGUMENT CHECKS
    // ============================================================

    #[tokio::test]
    async fn test_empty_key_is_rejected_without_loading() {
        let (getter, counts) = counting_getter();
        let group = Group::new("scores", 2 << 10, getter);

        let result = group.get("").await;

        assert!(matches!(result, Err(CacheError::InvalidArgument(_))));
        assert!(counts.lock().unwrap().is_empty());
        assert_eq!(group.stats().gets, 0);
    }

    // ============================================================
    // READ-THROUGH
    // ============================================================

    #[tokio::test]
    async fn test_miss_loads_once_then_hits() {
        let (getter, counts) = counting_getter();
        let group = Group::new("scores", 2 << 10, getter);

        for (key, value) in score_db() {
            assert_eq!(group.get(key).await.unwrap().to_string(), value);
            assert_eq!(group.get(key).await.unwrap().to_string(), value);
            assert_eq!(counts.lock().unwrap()[key], 1, "cache {} miss twice", key);
        }

        let stats = group.stats();
        assert_eq!(stats.gets, 6);
        assert_eq!(stats.hits, 3);
        assert_eq!(stats.local_loads, 3);
        assert_eq!(stats.cache.entries, 3);
    }

    #[tokio::test]
    async fn test_cached_value_is_independent_of_getter_buffer() {
        let source = Arc::new(Mutex::new(b"original".to_vec()));
        let shared = source.clone();
        let getter = GetterFn::new(move |_key: String| {
            let shared = shared.clone();
            async move { Ok::<_, anyhow::Error>(shared.lock().unwrap().clone()) }
        });
        let group = Group::new("buffers", 1024, Arc::new(getter));

        let first = group.get("k").await.unwrap();
        source.lock().unwrap().copy_from_slice(b"mutated!");
        let second = group.get("k").await.unwrap();

        assert_eq!(first.as_slice(), b"original");
        assert_eq!(second.as_slice(), b"original");
    }

    #[tokio::test]
    async fn test_unknown_key_propagates_upstream_error_and_is_not_cached() {
        let (getter, counts) = counting_getter();
        let group = Group::new("scores", 2 << 10, getter);

        let err = group.get("unknown").await.unwrap_err();
        assert_eq!(err, CacheError::Upstream("unknown not exist".to_string()));

        assert!(group.get("unknown").await.is_err());
        assert_eq!(counts.lock().unwrap()["unknown"], 2);
        assert_eq!(group.stats().local_errors, 2);
    }

    #[tokio::test]
    async fn test_small_budget_evicts_older_keys() {
        let (getter, counts) = counting_getter();
        // Room for exactly one "Tom"/"630" entry.
        let group = Group::new("scores", 6, getter);

        group.get("Tom").await.unwrap();
        group.get("Sam").await.unwrap();
        group.get("Tom").await.unwrap();

        assert_eq!(counts.lock().unwrap()["Tom"], 2);
        assert_eq!(group.stats().cache.entries, 1);
    }

    // ============================================================
    // DEDUPLICATION
    // ============================================================

    #[tokio::test]
    async fn test_concurrent_misses_share_one_load() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let getter = GetterFn::new(move |key: String| {
            let counter = counter.clone();
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
                tokio::time::sleep(Duration::from_millis(100)).await;
                Ok::<_, anyhow::Error>(format!("value-of-{}", key).into_bytes())
            }
        });
        let group = Arc::new(Group::new("slow", 1024, Arc::new(getter)));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let group = group.clone();
                tokio::spawn(async move { group.get("hot").await })
            })
            .collect();

        for handle in handles {
            assert_eq!(handle.await.unwrap().unwrap().to_string(), "value-of-hot");
        }
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    // ============================================================
    // PEERS
    // ============================================================

    #[tokio::test]
    async fn test_remote_value_is_returned_but_not_cached() {
        let (getter, counts) = counting_getter();
        let group = Group::new("scores", 2 << 10, getter);
        let peer = static_peer(true);
        group
            .register_peers(Arc::new(AlwaysRemote(peer.clone())))
            .unwrap();

        let first = group.get("Tom").await.unwrap();
        let second = group.get("Tom").await.unwrap();

        assert_eq!(first.to_string(), "remote:scores:Tom");
        assert_eq!(second, first);
        assert_eq!(peer.calls.load(Ordering::SeqCst), 2);
        assert!(counts.lock().unwrap().is_empty());
        assert_eq!(group.stats().cache.entries, 0);
        assert_eq!(group.stats().peer_loads, 2);
    }

    #[tokio::test]
    async fn test_populate_policy_caches_remote_values() {
        let (getter, _counts) = counting_getter();
        let group = Group::builder("scores", 2 << 10, getter)
            .remote_policy(RemotePolicy::Populate)
            .build();
        let peer = static_peer(true);
        group
            .register_peers(Arc::new(AlwaysRemote(peer.clone())))
            .unwrap();

        group.get("Tom").await.unwrap();
        group.get("Tom").await.unwrap();

        assert_eq!(peer.calls.load(Ordering::SeqCst), 1);
        assert_eq!(group.stats().hits, 1);
    }

    #[tokio::test]
    async fn test_peer_failure_falls_back_to_getter() {
        let (getter, counts) = counting_getter();
        let group = Group::new("scores", 2 << 10, getter);
        let peer = static_peer(false);
        group
            .register_peers(Arc::new(AlwaysRemote(peer.clone())))
            .unwrap();

        let value = group.get("Jack").await.unwrap();

        assert_eq!(value.to_string(), "589");
        assert_eq!(peer.calls.load(Ordering::SeqCst), 1);
        assert_eq!(counts.lock().unwrap()["Jack"], 1);

        let stats = group.stats();
        assert_eq!(stats.peer_errors, 1);
        assert_eq!(stats.local_loads, 1);

        // Locally computed values are cached, so the peer is not asked again.
        group.get("Jack").await.unwrap();
        assert_eq!(peer.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_get_local_never_consults_peers() {
        let (getter, counts) = counting_getter();
        let group = Group::new("scores", 2 << 10, getter);
        let peer = static_peer(true);
        group
            .register_peers(Arc::new(AlwaysRemote(peer.clone())))
            .unwrap();

        let value = group.get_local("Sam").await.unwrap();

        assert_eq!(value.to_string(), "567");
        assert_eq!(peer.calls.load(Ordering::SeqCst), 0);
        assert_eq!(counts.lock().unwrap()["Sam"], 1);
    }

    #[tokio::test]
    async fn test_get_local_does_not_join_in_flight_remote_load() {
        let (getter, counts) = counting_getter();
        let group = Arc::new(Group::new("scores", 2 << 10, getter));
        let peer = slow_peer(true, Duration::from_millis(200));
        group
            .register_peers(Arc::new(AlwaysRemote(peer.clone())))
            .unwrap();

        let remote = {
            let group = group.clone();
            tokio::spawn(async move { group.get("Tom").await })
        };
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert_eq!(peer.calls.load(Ordering::SeqCst), 1);

        let local = group.get_local("Tom").await.unwrap();

        assert_eq!(local.to_string(), "630");
        assert_eq!(counts.lock().unwrap()["Tom"], 1);
        assert_eq!(
            remote.await.unwrap().unwrap().to_string(),
            "remote:scores:Tom"
        );
        assert_eq!(peer.calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_register_peers_twice_is_rejected() {
        let (getter, _counts) = counting_getter();
        let group = Group::new("scores", 2 << 10, getter);

        group
            .register_peers(Arc::new(AlwaysRemote(static_peer(true))))
            .unwrap();
        let second = group.register_peers(Arc::new(AlwaysRemote(static_peer(true))));

        assert!(matches!(second, Err(CacheError::Configuration(_))));
    }

    // ============================================================
    // REGISTRY
    // ============================================================

    #[test]
    fn test_registry_register_and_lookup() {
        let registry = GroupRegistry::new();
        let (getter, _counts) = counting_getter();

        let group = registry.new_group("scores", 2 << 10, getter).unwrap();

        assert_eq!(group.name(), "scores");
        assert!(registry.get("scores").is_some());
        assert!(registry.get("missing").is_none());
        assert_eq!(registry.names(), vec!["scores".to_string()]);
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_registry_rejects_duplicate_names() {
        let registry = GroupRegistry::new();
        let (getter, _counts) = counting_getter();

        registry.new_group("scores", 1024, getter.clone()).unwrap();
        let duplicate = registry.new_group("scores", 1024, getter);

        assert!(matches!(duplicate, Err(CacheError::Configuration(_))));
        assert_eq!(registry.len(), 1);
    }
}
