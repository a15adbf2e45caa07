//! Gem Mirror Sync
//!
//! One-shot reconciliation of a gem server's local cache with the shared
//! bucket: refreshes stale artifacts, then pulls the binary-set index files.
//!
//! Text logs are left alone. Pulling one appends the remote copy again even
//! when nothing changed, so repeated runs would keep growing them; they are
//! reconciled by the metadata batch instead.

use std::sync::Arc;

use anyhow::Context;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use gem_mirror_sync::config::Config;
use gem_mirror_sync::{
    Encoding, FsLocalCache, InProcessLockManager, LockManager, ReindexReport, S3Store,
    SyncEngine,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| "gem_mirror_sync=debug".into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env().context("Failed to load config from env")?;

    tracing::info!("Starting gem mirror sync v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!("S3 endpoint: {}", config.storage.endpoint);
    tracing::info!("S3 bucket: {}", config.storage.bucket);
    tracing::info!("Cache directory: {}", config.cache.root.display());

    let remote = S3Store::new(&config.storage)
        .await
        .context("Failed to initialize S3 store")?;

    let locks: Arc<dyn LockManager> = match config.sync.lock_timeout() {
        Some(timeout) => Arc::new(InProcessLockManager::with_timeout(timeout)),
        None => Arc::new(InProcessLockManager::new()),
    };

    let engine = SyncEngine::new(
        Arc::new(FsLocalCache::new(&config.cache.root)),
        Arc::new(remote),
        locks,
        config.sync.shared_files(),
    );

    let report = engine
        .reindex(Some(Box::new(|report: &ReindexReport| {
            tracing::info!(
                "Reindex complete: {} remote gems, {} refreshed, {} cached",
                report.objects_seen,
                report.refreshed,
                report.local_artifacts
            );
        })))
        .await
        .context("Reindex failed")?;

    let names: Vec<String> = engine
        .shared_files()
        .batch_order()
        .filter(|f| f.encoding == Encoding::BinarySet)
        .map(|f| f.name.clone())
        .collect();

    let mut failed = 0;
    for name in &names {
        if let Err(e) = engine.sync_shared_index_file(name).await {
            tracing::error!("Failed to pull {}: {}", name, e);
            failed += 1;
        }
    }

    if failed > 0 {
        anyhow::bail!("{} of {} shared index files could not be pulled", failed, names.len());
    }

    tracing::info!(
        "Sync complete: {} gems refreshed, {} index files pulled",
        report.refreshed,
        names.len()
    );
    Ok(())
}
