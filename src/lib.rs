//! Distributed Read-Through Cache Library
//!
//! This library crate holds everything a cache node is made of. The binary
//! (`main.rs`) only wires it together from command line flags.
//!
//! ## Architecture Modules
//! The system is built bottom-up from small, independently testable parts:
//!
//! - **`cache`**: Local storage. A byte-bounded LRU engine, the immutable `ByteView`
//!   values it holds, and the mutex-guarded, lazily allocated store a group owns.
//! - **`consistenthash`**: The hash ring mapping every key to exactly one owning node
//!   through virtual replicas.
//! - **`singleflight`**: Per-key call deduplication, so a burst of misses for the
//!   same key runs the expensive load once.
//! - **`group`**: Named cache namespaces and the read-through algorithm
//!   (local cache, owning peer, then the data source), plus the `GroupRegistry`.
//! - **`peers`**: The peer transport. Traits the group depends on and their HTTP
//!   implementation, both client and server side.
//! - **`api`**: The client-facing HTTP endpoints and per-group statistics.
//! - **`config`**: Node configuration from flags and environment.

pub mod api;
pub mod cache;
pub mod config;
pub mod consistenthash;
pub mod error;
pub mod group;
pub mod peers;
pub mod singleflight;

pub use cache::ByteView;
pub use error::{CacheError, Result};
pub use group::{Getter, GetterFn, Group, GroupRegistry, RemotePolicy};
pub use peers::{HttpPool, PeerGetter, PeerPicker};
