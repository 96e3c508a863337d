//! Peer Wire Protocol
//!
//! One request shape: `GET {base_path}{group}/{key}` with both segments
//! percent-encoded. The response body is the raw value, nothing else.
//!
//! | Status | Meaning |
//! |--------|---------|
//! | 200 | Body holds the value (`application/octet-stream`) |
//! | 400 | Path does not split into a group and a key, or the key is empty |
//! | 404 | Unknown group |
//! | 500 | The group failed to load the value; body carries the error text |
//!
//! Requests are idempotent and safe to retry: the only side effect on the
//! serving node is populating its own cache.

use std::time::Duration;

/// Path prefix every peer request lives under.
pub const DEFAULT_BASE_PATH: &str = "/_distributed_cache/";
/// Virtual nodes per peer on the hash ring.
pub const DEFAULT_REPLICAS: usize = 50;
/// Upper bound for one peer round trip.
pub const DEFAULT_PEER_TIMEOUT: Duration = Duration::from_secs(3);

pub const CONTENT_TYPE_OCTET_STREAM: &str = "application/octet-stream";

/// A base path must look like `/segment/`; the root alone is rejected.
pub fn is_valid_base_path(base_path: &str) -> bool {
    base_path.len() > 1 && base_path.starts_with('/') && base_path.ends_with('/')
}
