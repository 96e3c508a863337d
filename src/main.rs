use clap::Parser;
use distributed_cache::api;
use distributed_cache::cache::ByteView;
use distributed_cache::config::NodeConfig;
use distributed_cache::group::{Getter, GetterFn, Group, GroupRegistry};
use distributed_cache::peers::HttpPool;
use std::collections::HashMap;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = NodeConfig::parse();
    config.validate()?;

    let self_addr = config.self_addr();
    let peers = config.peer_addrs();
    tracing::info!("Starting cache node {}", self_addr);
    tracing::info!("Peers: {:?}", peers);

    // 1. Groups:
    let registry = GroupRegistry::new();
    let group = registry.register(
        Group::builder(&config.group, config.cache_bytes, score_db())
            .remote_policy(config.remote_policy())
            .on_evicted(Arc::new(|key: &str, value: &ByteView| {
                tracing::debug!("Evicted {} ({} bytes)", key, value.len());
            }))
            .build(),
    )?;

    // 2. Peer routing:
    let pool = Arc::new(HttpPool::with_options(&self_addr, config.pool_options())?);
    pool.set_peers(&peers);
    group.register_peers(pool.clone())?;

    // 3. Front API:
    if let Some(api_bind) = config.api_bind {
        let app = api::router(group.clone(), registry.clone());
        let listener = tokio::net::TcpListener::bind(api_bind).await?;
        tracing::info!("API server listening on {}", api_bind);

        tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, app).await {
                tracing::error!("API server stopped: {}", e);
            }
        });
    }

    // 4. Peer server:
    let bind_addr = config.bind_addr()?;
    let app = pool.router(registry);
    let listener = tokio::net::TcpListener::bind(bind_addr).await?;

    tracing::info!(
        "Peer server listening on {} under {}",
        bind_addr,
        pool.base_path()
    );
    tracing::info!("Press Ctrl+C to shutdown");

    axum::serve(listener, app).await?;

    Ok(())
}

/// Stand-in for a slow data source: a fixed score table.
fn score_db() -> Arc<dyn Getter> {
    let db: Arc<HashMap<&'static str, &'static str>> = Arc::new(HashMap::from([
        ("Tom", "630"),
        ("Jack", "589"),
        ("Sam", "567"),
    ]));

    Arc::new(GetterFn::new(move |key: String| {
        let db = db.clone();
        async move {
            tracing::info!("[SlowDB] search key {}", key);
            match db.get(key.as_str()) {
                Some(score) => Ok(score.as_bytes().to_vec()),
                None => Err(anyhow::anyhow!("{} not exist", key)),
            }
        }
    }))
}
