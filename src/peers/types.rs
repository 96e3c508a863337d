use async_trait::async_trait;
use bytes::Bytes;
use std::sync::Arc;

use crate::error::Result;

/// Fetches a value for `(group, key)` from one remote node.
#[async_trait]
pub trait PeerGetter: Send + Sync {
    async fn get(&self, group: &str, key: &str) -> Result<Bytes>;
}

/// Chooses the node responsible for a key.
///
/// `None` means the key should be resolved locally, either because this node
/// owns it or because no peers are known. Implementations never hand back a
/// getter pointing at the local node.
pub trait PeerPicker: Send + Sync {
    fn pick_peer(&self, key: &str) -> Option<Arc<dyn PeerGetter>>;
}
