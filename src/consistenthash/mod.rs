//! Consistent Hashing
//!
//! Maps arbitrary keys onto a fixed set of node identities. Every node is
//! placed on a 32-bit ring `replicas` times (virtual nodes) to even out the
//! share of keys each physical node owns; a key belongs to the first virtual
//! node at or after its own hash, wrapping around at the end of the ring.
//!
//! Membership is fixed once nodes are added: there is no removal and no
//! rebalancing. Rebuilding the ring is the way to change the node set.

use std::collections::HashMap;
use std::fmt;

/// Hash function placing keys and virtual nodes on the ring.
pub type HashFn = fn(&[u8]) -> u32;

pub struct HashRing {
    hash: HashFn,
    replicas: usize,
    /// Sorted ascending.
    ring: Vec<u32>,
    nodes: HashMap<u32, String>,
}

impl HashRing {
    /// Creates an empty ring. `hash` defaults to CRC-32 (IEEE).
    pub fn new(replicas: usize, hash: Option<HashFn>) -> Self {
        Self {
            hash: hash.unwrap_or(crc32fast::hash),
            replicas,
            ring: Vec::new(),
            nodes: HashMap::new(),
        }
    }

    /// Places each node on the ring `replicas` times, at `hash("{i}{node}")`.
    pub fn add<I, S>(&mut self, nodes: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for node in nodes {
            let node = node.as_ref();
            for i in 0..self.replicas {
                let position = (self.hash)(format!("{}{}", i, node).as_bytes());
                self.ring.push(position);
                self.nodes.insert(position, node.to_string());
            }
        }
        self.ring.sort_unstable();
    }

    /// Returns the node owning `key`, or `None` for an empty ring.
    pub fn get(&self, key: &str) -> Option<&str> {
        if self.ring.is_empty() {
            return None;
        }

        let hash = (self.hash)(key.as_bytes());
        let idx = self.ring.partition_point(|&position| position < hash);
        let position = self.ring[idx % self.ring.len()];

        self.nodes.get(&position).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.ring.is_empty()
    }

    /// Number of virtual nodes on the ring.
    pub fn len(&self) -> usize {
        self.ring.len()
    }

    pub fn replicas(&self) -> usize {
        self.replicas
    }
}

impl fmt::Debug for HashRing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HashRing")
            .field("replicas", &self.replicas)
            .field("virtual_nodes", &self.ring.len())
            .finish()
    }
}
