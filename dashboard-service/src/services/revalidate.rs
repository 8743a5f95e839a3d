//! Invalidation signal for cached views.
//!
//! Every successful mutation bumps the generation. Anything holding a rendered
//! copy of a view treats it as stale once it observes a newer generation.

use serde::Serialize;
use std::sync::Arc;
use tokio::sync::watch;

/// Path of the invoice listing view.
pub const INVOICES_PATH: &str = "/dashboard/invoices";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RefreshSignal {
    pub path: String,
    pub generation: u64,
}

#[derive(Clone)]
pub struct Revalidator {
    tx: Arc<watch::Sender<RefreshSignal>>,
}

impl Default for Revalidator {
    fn default() -> Self {
        Self::new()
    }
}

impl Revalidator {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(RefreshSignal {
            path: INVOICES_PATH.to_string(),
            generation: 0,
        });
        Self { tx: Arc::new(tx) }
    }

    /// Mark `path` stale and return the signal that was published.
    pub fn revalidate(&self, path: &str) -> RefreshSignal {
        let mut published = RefreshSignal {
            path: path.to_string(),
            generation: 0,
        };
        self.tx.send_modify(|current| {
            current.generation += 1;
            current.path = path.to_string();
            published.generation = current.generation;
        });
        tracing::debug!(path = %path, generation = published.generation, "View revalidated");
        published
    }

    pub fn generation(&self) -> u64 {
        self.tx.borrow().generation
    }

    pub fn subscribe(&self) -> watch::Receiver<RefreshSignal> {
        self.tx.subscribe()
    }
}
