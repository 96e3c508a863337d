//! Byte-bounded LRU engine.
//!
//! Entries live in a slab of nodes linked by index, giving O(1) insert,
//! touch and eviction without pointer juggling.
//!
//! ```text
//!   head (MRU) ─► [3] ◄──► [0] ◄──► [2] ◄── tail (LRU)
//!   index: { "k3" -> 3, "k0" -> 0, "k2" -> 2 }   free: [1]
//! ```
//!
//! The engine is not synchronized; [`super::store::GuardedStore`] wraps it
//! in a mutex for shared use.

use std::collections::HashMap;

/// Anything that can report how many bytes it occupies.
pub trait Value {
    fn len(&self) -> usize;
}

impl Value for Vec<u8> {
    fn len(&self) -> usize {
        Vec::len(self)
    }
}

impl Value for String {
    fn len(&self) -> usize {
        String::len(self)
    }
}

/// Called with every entry removed to make room.
pub type OnEvicted<V> = Box<dyn FnMut(&str, V) + Send>;

#[derive(Debug)]
struct Node<V> {
    key: String,
    value: V,
    prev: Option<usize>,
    next: Option<usize>,
}

pub struct LruCache<V> {
    /// Zero means unbounded.
    max_bytes: usize,
    n_bytes: usize,
    nodes: Vec<Option<Node<V>>>,
    free: Vec<usize>,
    head: Option<usize>,
    tail: Option<usize>,
    index: HashMap<String, usize>,
    on_evicted: Option<OnEvicted<V>>,
}

impl<V: Value> LruCache<V> {
    pub fn new(max_bytes: usize, on_evicted: Option<OnEvicted<V>>) -> Self {
        Self {
            max_bytes,
            n_bytes: 0,
            nodes: Vec::new(),
            free: Vec::new(),
            head: None,
            tail: None,
            index: HashMap::new(),
            on_evicted,
        }
    }

    /// Inserts or replaces `key`, marks it most recently used, then evicts
    /// from the tail until the byte budget holds again.
    pub fn add(&mut self, key: impl Into<String>, value: V) {
        for (key, value) in self.insert(key.into(), value) {
            if let Some(callback) = self.on_evicted.as_mut() {
                callback(&key, value);
            }
        }
    }

    /// Same as [`LruCache::add`] but hands the evicted entries back instead of
    /// running the callback, so a caller holding a lock can run its own hook
    /// after releasing it.
    pub(crate) fn insert(&mut self, key: String, value: V) -> Vec<(String, V)> {
        if let Some(&id) = self.index.get(&key) {
            let new_len = value.len();
            if let Some(node) = self.nodes[id].as_mut() {
                let old_len = node.value.len();
                node.value = value;
                self.n_bytes = self.n_bytes + new_len - old_len;
            }
            self.move_to_front(id);
        } else {
            self.n_bytes += key.len() + value.len();
            let id = self.alloc(Node {
                key: key.clone(),
                value,
                prev: None,
                next: None,
            });
            self.attach_front(id);
            self.index.insert(key, id);
        }

        let mut evicted = Vec::new();
        while self.max_bytes != 0 && self.n_bytes > self.max_bytes {
            match self.pop_oldest() {
                Some(entry) => evicted.push(entry),
                None => break,
            }
        }
        evicted
    }

    /// Looks up `key` and marks it most recently used.
    pub fn get(&mut self, key: &str) -> Option<&V> {
        let id = *self.index.get(key)?;
        self.move_to_front(id);
        self.nodes[id].as_ref().map(|node| &node.value)
    }

    /// Looks up `key` without touching its recency.
    pub fn peek(&self, key: &str) -> Option<&V> {
        let id = *self.index.get(key)?;
        self.nodes[id].as_ref().map(|node| &node.value)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.index.contains_key(key)
    }

    /// Evicts the least recently used entry, running the eviction callback.
    /// Returns `false` when the cache is empty.
    pub fn remove_oldest(&mut self) -> bool {
        match self.pop_oldest() {
            Some((key, value)) => {
                if let Some(callback) = self.on_evicted.as_mut() {
                    callback(&key, value);
                }
                true
            }
            None => false,
        }
    }

    /// Removes `key` without treating it as an eviction.
    pub fn remove(&mut self, key: &str) -> Option<V> {
        let id = self.index.remove(key)?;
        let node = self.release(id)?;
        self.n_bytes -= node.key.len() + node.value.len();
        Some(node.value)
    }

    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Bytes currently accounted for (keys plus values).
    pub fn bytes(&self) -> usize {
        self.n_bytes
    }

    pub fn max_bytes(&self) -> usize {
        self.max_bytes
    }

    /// Keys from most to least recently used.
    pub fn keys(&self) -> Vec<&str> {
        let mut keys = Vec::with_capacity(self.len());
        let mut current = self.head;
        while let Some(id) = current {
            let Some(node) = self.nodes[id].as_ref() else {
                break;
            };
            keys.push(node.key.as_str());
            current = node.next;
        }
        keys
    }

    fn pop_oldest(&mut self) -> Option<(String, V)> {
        let id = self.tail?;
        let node = self.release(id)?;
        self.index.remove(&node.key);
        self.n_bytes -= node.key.len() + node.value.len();
        Some((node.key, node.value))
    }

    fn alloc(&mut self, node: Node<V>) -> usize {
        match self.free.pop() {
            Some(id) => {
                self.nodes[id] = Some(node);
                id
            }
            None => {
                self.nodes.push(Some(node));
                self.nodes.len() - 1
            }
        }
    }

    fn release(&mut self, id: usize) -> Option<Node<V>> {
        self.detach(id);
        let node = self.nodes[id].take()?;
        self.free.push(id);
        Some(node)
    }

    fn move_to_front(&mut self, id: usize) {
        if self.head == Some(id) {
            return;
        }
        self.detach(id);
        self.attach_front(id);
    }

    fn detach(&mut self, id: usize) {
        let Some((prev, next)) = self.nodes[id].as_ref().map(|node| (node.prev, node.next)) else {
            return;
        };

        match prev {
            Some(prev_id) => {
                if let Some(prev_node) = self.nodes[prev_id].as_mut() {
                    prev_node.next = next;
                }
            }
            None => self.head = next,
        }

        match next {
            Some(next_id) => {
                if let Some(next_node) = self.nodes[next_id].as_mut() {
                    next_node.prev = prev;
                }
            }
            None => self.tail = prev,
        }

        if let Some(node) = self.nodes[id].as_mut() {
            node.prev = None;
            node.next = None;
        }
    }

    fn attach_front(&mut self, id: usize) {
        let old_head = self.head;
        if let Some(node) = self.nodes[id].as_mut() {
            node.prev = None;
            node.next = old_head;
        }
        match old_head {
            Some(head_id) => {
                if let Some(head_node) = self.nodes[head_id].as_mut() {
                    head_node.prev = Some(id);
                }
            }
            None => self.tail = Some(id),
        }
        self.head = Some(id);
    }
}
