//! # Receipt Progress Hydrator
//!
//! Subscribes to one receipt's document, turns each pushed snapshot into a
//! progress event, a hydrated completion or an error, and hands it to a
//! [`ReceiptEventHandler`].
//!
//! ```rust,no_run
//! use receipt_hydrator::hydrator::{ReceiptCallbacks, ReceiptProgressHydrator};
//! use receipt_hydrator::config::HydratorConfig;
//! use receipt_hydrator::store::InMemoryDocumentStore;
//! use std::sync::Arc;
//!
//! # async fn example() -> receipt_hydrator::Result<()> {
//! let config = HydratorConfig::default();
//! let store = Arc::new(InMemoryDocumentStore::from_config(&config));
//! let hydrator = ReceiptProgressHydrator::new(store, config)?;
//!
//! let subscription = hydrator.subscribe(
//!     "receipt-123",
//!     ReceiptCallbacks::new()
//!         .with_progress(|p| println!("[{}] {} ({}%)", p.agent, p.message, p.progress))
//!         .with_completion(|analysis| println!("done: {:?}", analysis.summary())),
//! );
//!
//! // ... later
//! subscription.cancel();
//! # Ok(())
//! # }
//! ```

pub mod handler;
pub mod subscription;
pub mod watcher;

pub use handler::{ReceiptCallbacks, ReceiptEvent, ReceiptEventHandler};
pub use subscription::{ReceiptSubscription, SubscriptionStats};
pub use watcher::ReceiptWatcher;

use std::sync::Arc;
use tracing::debug;

use crate::config::HydratorConfig;
use crate::error::Result;
use crate::store::DocumentStore;

/// Factory for receipt subscriptions over an injected store client
pub struct ReceiptProgressHydrator<S: DocumentStore> {
    store: Arc<S>,
    config: Arc<HydratorConfig>,
}

impl<S: DocumentStore> Clone for ReceiptProgressHydrator<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            config: Arc::clone(&self.config),
        }
    }
}

impl<S: DocumentStore> ReceiptProgressHydrator<S> {
    pub fn new(store: Arc<S>, config: HydratorConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            store,
            config: Arc::new(config),
        })
    }

    pub fn config(&self) -> &HydratorConfig {
        &self.config
    }

    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    /// Open one subscription on `receipts/{receipt_id}`.
    ///
    /// A blank `receipt_id` opens nothing and returns an inert handle. Must be
    /// called from within a tokio runtime.
    pub fn subscribe<H>(&self, receipt_id: &str, handler: H) -> ReceiptSubscription
    where
        H: ReceiptEventHandler,
    {
        if receipt_id.trim().is_empty() {
            debug!("No receipt id given, not subscribing");
            return ReceiptSubscription::inert();
        }

        ReceiptSubscription::spawn(
            Arc::clone(&self.store),
            Arc::clone(&self.config),
            receipt_id,
            handler,
        )
    }
}
