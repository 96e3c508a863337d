use bytes::Bytes;
use std::fmt;

use super::lru::Value;

/// Immutable snapshot of a cached value.
///
/// The backing buffer is never handed out mutably: callers either borrow it
/// read-only or take an owned copy through [`ByteView::byte_slice`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ByteView {
    b: Bytes,
}

impl ByteView {
    /// Copies `data` into a new view, so later changes to the caller's buffer
    /// are never observed through the cache.
    pub fn copy_from_slice(data: &[u8]) -> Self {
        Self {
            b: Bytes::copy_from_slice(data),
        }
    }

    pub fn len(&self) -> usize {
        self.b.len()
    }

    pub fn is_empty(&self) -> bool {
        self.b.is_empty()
    }

    /// Returns an owned copy of the data.
    pub fn byte_slice(&self) -> Vec<u8> {
        self.b.to_vec()
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.b
    }

    /// Cheap reference-counted handle to the same immutable buffer, used to
    /// write response bodies without copying.
    pub fn to_bytes(&self) -> Bytes {
        self.b.clone()
    }
}

impl From<Vec<u8>> for ByteView {
    fn from(data: Vec<u8>) -> Self {
        Self { b: Bytes::from(data) }
    }
}

impl From<Bytes> for ByteView {
    fn from(b: Bytes) -> Self {
        Self { b }
    }
}

impl fmt::Display for ByteView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&String::from_utf8_lossy(&self.b))
    }
}

impl Value for ByteView {
    fn len(&self) -> usize {
        self.b.len()
    }
}
