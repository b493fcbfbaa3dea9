//! Local preview references for selected files. A handle keeps its bytes
//! registered until it is dropped, so replacing or clearing a selection
//! releases the previous preview.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, Weak};

use uuid::Uuid;

type Registry = Mutex<HashMap<Uuid, Arc<[u8]>>>;

const URL_PREFIX: &str = "blob:steganoshield/";

#[derive(Debug, Clone, Default)]
pub struct PreviewStore {
    registry: Arc<Registry>,
}

impl PreviewStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn acquire(&self, bytes: Arc<[u8]>) -> PreviewHandle {
        let id = Uuid::new_v4();
        lock(&self.registry).insert(id, bytes);
        log::debug!("preview {id} acquired");
        PreviewHandle {
            id,
            url: format!("{URL_PREFIX}{id}"),
            registry: Arc::downgrade(&self.registry),
        }
    }

    pub fn resolve(&self, url: &str) -> Option<Arc<[u8]>> {
        let id = url.strip_prefix(URL_PREFIX)?.parse::<Uuid>().ok()?;
        lock(&self.registry).get(&id).cloned()
    }

    pub fn live_count(&self) -> usize {
        lock(&self.registry).len()
    }
}

#[derive(Debug)]
pub struct PreviewHandle {
    id: Uuid,
    url: String,
    registry: Weak<Registry>,
}

impl PreviewHandle {
    pub fn url(&self) -> &str {
        &self.url
    }
}

impl Drop for PreviewHandle {
    fn drop(&mut self) {
        if let Some(registry) = self.registry.upgrade() {
            lock(&registry).remove(&self.id);
            log::debug!("preview {} released", self.id);
        }
    }
}

fn lock(registry: &Registry) -> std::sync::MutexGuard<'_, HashMap<Uuid, Arc<[u8]>>> {
    registry.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
