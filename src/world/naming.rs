use crate::core::ActorId;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

#[derive(Debug, Default)]
struct Names {
    by_id: HashMap<ActorId, String>,
    by_name: HashMap<String, ActorId>,
}

/// Naming-uniqueness registry: which identity holds which character name.
#[derive(Debug, Clone, Default)]
pub struct NameRegistry {
    inner: Arc<RwLock<Names>>,
}

impl NameRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Binds `name` to `id`, replacing any previous name of `id`.
    pub async fn register(&self, id: ActorId, name: &str) {
        let mut names = self.inner.write().await;
        let key = name.to_lowercase();
        if let Some(previous) = names.by_id.insert(id, name.to_string()) {
            names.by_name.remove(&previous.to_lowercase());
        }
        names.by_name.insert(key, id);
    }

    /// Frees the name held by `id`. Returns the freed name.
    pub async fn unregister(&self, id: ActorId) -> Option<String> {
        let mut names = self.inner.write().await;
        let name = names.by_id.remove(&id)?;
        names.by_name.remove(&name.to_lowercase());
        Some(name)
    }

    /// Case-insensitive.
    pub async fn is_taken(&self, name: &str) -> bool {
        self.inner
            .read()
            .await
            .by_name
            .contains_key(&name.to_lowercase())
    }

    pub async fn name_of(&self, id: ActorId) -> Option<String> {
        self.inner.read().await.by_id.get(&id).cloned()
    }

    pub async fn id_of(&self, name: &str) -> Option<ActorId> {
        self.inner
            .read()
            .await
            .by_name
            .get(&name.to_lowercase())
            .copied()
    }

    pub async fn len(&self) -> usize {
        self.inner.read().await.by_id.len()
    }
}
