//! Catalog change notification
//!
//! Zero-argument trigger fired once per successful batch. The read-side
//! snapshot rebuild and its broadcast live outside this crate; they only
//! need to learn that the catalog moved.

use async_trait::async_trait;
use tokio::sync::broadcast;

/// Marker event carried on the broadcast channel
#[derive(Debug, Clone)]
pub struct CatalogChanged;

#[async_trait]
pub trait CatalogNotifier: Send + Sync {
    async fn catalog_changed(&self);
}

/// Fan-out over a tokio broadcast channel
pub struct BroadcastNotifier {
    tx: broadcast::Sender<CatalogChanged>,
}

impl BroadcastNotifier {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<CatalogChanged> {
        self.tx.subscribe()
    }
}

#[async_trait]
impl CatalogNotifier for BroadcastNotifier {
    async fn catalog_changed(&self) {
        // No subscribers is fine (e.g. before the snapshot worker starts)
        let _ = self.tx.send(CatalogChanged);
    }
}

/// Notifier that drops events, for tests and tooling
pub struct NullNotifier;

#[async_trait]
impl CatalogNotifier for NullNotifier {
    async fn catalog_changed(&self) {}
}
