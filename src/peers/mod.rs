//! Peer Transport
//!
//! How a node finds the owner of a key and asks it for the value.
//!
//! ## Core Concepts
//! - **PeerPicker**: Chooses the remote node owning a key, or none when the key is local.
//! - **PeerGetter**: Fetches `(group, key)` from one remote node.
//! - **HttpPool**: HTTP implementation of both, routing with a consistent hash ring.
//!
//! ## Submodules
//! - **`types`**: The transport traits the group layer depends on.
//! - **`http`**: `HttpPool` and `HttpGetter`.
//! - **`handlers`**: Axum handlers answering other nodes.
//! - **`protocol`**: Path layout, status codes and defaults.

pub mod handlers;
pub mod http;
pub mod protocol;
pub mod types;

pub use http::{HttpGetter, HttpPool, PoolOptions};
pub use types::{PeerGetter, PeerPicker};
