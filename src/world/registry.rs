use super::LiveActor;
use crate::core::{ActorId, Position};
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Shared map of every actor currently live in the world.
///
/// Owned by the world runtime for the lifetime of the service and handed to
/// each component that needs it. Clones share the same map.
#[derive(Debug, Clone, Default)]
pub struct LiveRegistry {
    actors: Arc<RwLock<BTreeMap<ActorId, LiveActor>>>,
}

impl LiveRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn get(&self, id: ActorId) -> Option<LiveActor> {
        self.actors.read().await.get(&id).cloned()
    }

    pub async fn contains(&self, id: ActorId) -> bool {
        self.actors.read().await.contains_key(&id)
    }

    pub async fn len(&self) -> usize {
        self.actors.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.actors.read().await.is_empty()
    }

    /// Consistent copy of the whole registry, ordered by identity.
    pub async fn snapshot(&self) -> BTreeMap<ActorId, LiveActor> {
        self.actors.read().await.clone()
    }

    pub async fn list(&self) -> Vec<LiveActor> {
        self.actors.read().await.values().cloned().collect()
    }

    pub async fn position_of(&self, id: ActorId) -> Option<Position> {
        self.actors.read().await.get(&id).map(|actor| actor.position)
    }

    pub async fn state_of(&self, id: ActorId) -> Option<String> {
        self.actors
            .read()
            .await
            .get(&id)
            .map(|actor| actor.state_label.clone())
    }

    /// Returns the previous entry for the same identity, if any.
    pub async fn insert(&self, actor: LiveActor) -> Option<LiveActor> {
        self.actors.write().await.insert(actor.id, actor)
    }

    pub async fn remove(&self, id: ActorId) -> Option<LiveActor> {
        self.actors.write().await.remove(&id)
    }

    /// Applies `f` to the live entry; `None` when the actor is not live.
    pub async fn update<T>(&self, id: ActorId, f: impl FnOnce(&mut LiveActor) -> T) -> Option<T> {
        self.actors.write().await.get_mut(&id).map(f)
    }
}
