use async_trait::async_trait;
use std::future::Future;

/// Produces the value for a key on a cache miss.
///
/// Called concurrently for distinct keys; calls for the same key are already
/// collapsed into one by the group, so implementations only need to be
/// idempotent.
#[async_trait]
pub trait Getter: Send + Sync {
    async fn get(&self, key: &str) -> anyhow::Result<Vec<u8>>;
}

/// Adapts an async closure into a [`Getter`].
///
/// ```ignore
/// let getter = GetterFn::new(|key: String| async move { Ok(key.into_bytes()) });
/// ```
pub struct GetterFn<F> {
    f: F,
}

impl<F> GetterFn<F> {
    pub fn new(f: F) -> Self {
        Self { f }
    }
}

#[async_trait]
impl<F, Fut> Getter for GetterFn<F>
where
    F: Fn(String) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = anyhow::Result<Vec<u8>>> + Send + 'static,
{
    async fn get(&self, key: &str) -> anyhow::Result<Vec<u8>> {
        (self.f)(key.to_string()).await
    }
}
