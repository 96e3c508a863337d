//! Cache Groups
//!
//! A group is a named namespace with its own byte budget, miss-handler and
//! peer routing (e.g. `scores` and `avatars` on the same node).
//!
//! ## Read-through lookup
//! 1. Empty keys are rejected before any work happens.
//! 2. A local hit is returned directly.
//! 3. A miss enters the single-flight layer, so concurrent misses share one load:
//!    - if a peer owns the key, the value is fetched from it and returned
//!      without being cached locally (see [`RemotePolicy`]);
//!    - if the peer fails or this node owns the key, the [`Getter`] produces
//!      the value and it is stored locally.
//!
//! ## Submodules
//! - **`getter`**: The miss-handler trait and its closure adapter.
//! - **`group`**: The `Group` itself and its builder.
//! - **`registry`**: Name → group lookup shared with the transport layer.

pub mod getter;
pub mod group;
pub mod registry;

pub use getter::{Getter, GetterFn};
pub use group::{Group, GroupBuilder, GroupStats, RemotePolicy};
pub use registry::GroupRegistry;

#[cfg(test)]
mod tests;
