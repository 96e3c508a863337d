//! Local Cache Storage
//!
//! The per-node storage layer every group reads from and populates.
//!
//! ## Core Concepts
//! - **ByteView**: Immutable value snapshot; callers can never mutate cached state through it.
//! - **LruCache**: Single-threaded, byte-bounded store evicting the least recently used entries.
//! - **GuardedStore**: Mutex-protected, lazily allocated `LruCache` shared by concurrent lookups.

pub mod byte_view;
pub mod lru;
pub mod store;

pub use byte_view::ByteView;
pub use lru::{LruCache, OnEvicted, Value};
pub use store::{EvictionHook, GuardedStore, StoreStats};
