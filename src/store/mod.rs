//! Key-path document store interface.
//!
//! The real backing service stays behind this trait; the dashboard only
//! relies on document-replace change notifications and atomic field merges.

pub mod memory;

use std::future::Future;

use anyhow::Result;
use tokio::sync::watch;

use crate::models::{FieldMap, Snapshot};

pub use memory::MemoryStore;

pub trait StateStore: Send + Sync {
    /// Persistent listener on `path`. The receiver always holds the full
    /// current value (`None` while the path is absent) and observes every
    /// subsequent change in emit order.
    fn subscribe(&self, path: &str) -> watch::Receiver<Snapshot>;

    /// Like [`subscribe`](StateStore::subscribe), but the snapshot is
    /// restricted to the last `limit` entries of the document ordered by
    /// key.
    fn subscribe_tail(&self, path: &str, limit: usize) -> watch::Receiver<Snapshot>;

    /// Atomically merge `fields` into the document at `path`. Either all
    /// fields land or none do; no partial write is ever observable.
    fn update(&self, path: &str, fields: FieldMap) -> impl Future<Output = Result<()>> + Send;
}
