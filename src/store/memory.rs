//! In-process store with the same observable semantics as the remote one:
//! per-path documents, merge-on-update, and full-snapshot notifications.
//! Backs the demo binary and the tests.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use anyhow::Result;
use serde_json::Value;
use tokio::sync::watch;

use crate::models::{FieldMap, Snapshot};

use super::StateStore;

struct TailChannel {
    limit: usize,
    tx: watch::Sender<Snapshot>,
}

#[derive(Default)]
struct PathState {
    doc: Option<FieldMap>,
    tx: Option<watch::Sender<Snapshot>>,
    tails: Vec<TailChannel>,
}

impl PathState {
    fn snapshot(&self) -> Snapshot {
        self.doc.clone().map(Value::Object)
    }

    fn sender(&mut self) -> &watch::Sender<Snapshot> {
        let doc = &self.doc;
        self.tx
            .get_or_insert_with(|| watch::channel(doc.clone().map(Value::Object)).0)
    }
}

#[derive(Clone, Default)]
pub struct MemoryStore {
    paths: Arc<Mutex<HashMap<String, PathState>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl StateStore for MemoryStore {
    fn subscribe(&self, path: &str) -> watch::Receiver<Snapshot> {
        let mut paths = self.paths.lock().unwrap();
        paths.entry(path.to_owned()).or_default().sender().subscribe()
    }

    fn subscribe_tail(&self, path: &str, limit: usize) -> watch::Receiver<Snapshot> {
        let mut paths = self.paths.lock().unwrap();
        let state = paths.entry(path.to_owned()).or_default();
        let (tx, rx) = watch::channel(tail_snapshot(state.doc.as_ref(), limit));
        state.tails.push(TailChannel { limit, tx });
        rx
    }

    async fn update(&self, path: &str, fields: FieldMap) -> Result<()> {
        let mut paths = self.paths.lock().unwrap();
        let state = paths.entry(path.to_owned()).or_default();

        let doc = state.doc.get_or_insert_with(FieldMap::new);
        for (key, value) in fields {
            doc.insert(key, value);
        }

        let snapshot = state.snapshot();
        // send_replace keeps working with zero receivers; a path nobody
        // watches is still writable.
        state.sender().send_replace(snapshot);
        for tail in &state.tails {
            tail.tx
                .send_replace(tail_snapshot(state.doc.as_ref(), tail.limit));
        }
        Ok(())
    }
}

/// Last `limit` fields of the document ordered by key, as its own document.
fn tail_snapshot(doc: Option<&FieldMap>, limit: usize) -> Snapshot {
    let doc = doc?;
    let mut keys: Vec<&String> = doc.keys().collect();
    keys.sort();
    let skip = keys.len().saturating_sub(limit);
    let mut tail = FieldMap::new();
    for key in keys.into_iter().skip(skip) {
        tail.insert(key.clone(), doc[key].clone());
    }
    Some(Value::Object(tail))
}
