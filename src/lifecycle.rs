//! Lifecycle Commander: create, spawn and despawn fake actors through the
//! world runtime.

use crate::config::ConsoleConfig;
use crate::core::{ActorId, ClassProfile, ConsoleError, Result, TeleportPoint, WorldError};
use crate::world::{LiveActor, WorldRuntime};
use std::sync::Arc;
use tracing::{debug, info, warn};

pub const SELECT_POINT: &str = "Select a Point.";
pub const SELECT_CLASS: &str = "Select a ClassId.";
pub const NO_PINNED_TARGETS: &str = "No pinned targets.";

#[derive(Clone)]
pub struct LifecycleCommander {
    world: Arc<dyn WorldRuntime>,
    config: ConsoleConfig,
}

impl LifecycleCommander {
    pub fn new(world: Arc<dyn WorldRuntime>) -> Self {
        Self {
            world,
            config: ConsoleConfig::default(),
        }
    }

    pub fn with_config(mut self, config: ConsoleConfig) -> Self {
        self.config = config;
        self
    }

    pub fn world(&self) -> &Arc<dyn WorldRuntime> {
        &self.world
    }

    /// Creates `count` new actors around `point` and returns their identities
    /// in creation order.
    pub async fn create_batch(
        &self,
        point: Option<&TeleportPoint>,
        class: Option<&ClassProfile>,
        count: i32,
        radius: i32,
    ) -> Result<Vec<ActorId>> {
        let point = point.ok_or_else(|| ConsoleError::validation(SELECT_POINT))?;
        let class = class.ok_or_else(|| ConsoleError::validation(SELECT_CLASS))?;
        if count <= 0 {
            return Ok(Vec::new());
        }
        self.config.validate_count(count)?;
        self.config.validate_radius(radius)?;
        if !self.world.has_controller(class).await {
            return Err(ConsoleError::validation(format!(
                "No behavior controller registered for: {}",
                class
            )));
        }

        let mut created = Vec::with_capacity(count as usize);
        for _ in 0..count {
            let at = point.base.jittered(radius, &mut rand::thread_rng());
            match self.world.create_actor(class, at).await {
                Ok(id) => created.push(id),
                Err(err) => warn!(class = %class, position = %at, error = %err, "failed creating actor"),
            }
        }

        info!(created = created.len(), requested = count, point = %point.name, "create batch finished");
        Ok(created)
    }

    /// Restores and places every pinned identity that is not live yet.
    /// Returns how many were actually spawned.
    pub async fn spawn_pinned(
        &self,
        ids: &[ActorId],
        point: Option<&TeleportPoint>,
        radius: i32,
    ) -> Result<usize> {
        if ids.is_empty() {
            return Err(ConsoleError::validation(NO_PINNED_TARGETS));
        }
        let point = point.ok_or_else(|| ConsoleError::validation(SELECT_POINT))?;
        self.config.validate_radius(radius)?;

        let mut spawned = 0;
        for &id in ids {
            if self.world.registry().contains(id).await {
                debug!(actor_id = %id, "already online, skipping spawn");
                continue;
            }

            match self.spawn_one(id, point, radius).await {
                Ok(()) => spawned += 1,
                Err(err) => warn!(actor_id = %id, error = %err, "failed spawning actor"),
            }
        }

        info!(spawned, pinned = ids.len(), point = %point.name, "spawn pinned finished");
        Ok(spawned)
    }

    async fn spawn_one(&self, id: ActorId, point: &TeleportPoint, radius: i32) -> std::result::Result<(), WorldError> {
        let actor = self.world.restore(id).await?;
        self.world.register_identity(&actor).await?;

        let result = self.bring_online(actor, point, radius).await;
        if result.is_err() {
            // Leave nothing half-spawned behind.
            if let Err(err) = self.world.remove_from_world(id).await {
                if !matches!(err, WorldError::NotFound(_)) {
                    debug!(actor_id = %id, error = %err, "spawn cleanup could not remove actor");
                }
            }
            self.world.unregister_identity(id).await;
        }
        result
    }

    async fn bring_online(
        &self,
        actor: LiveActor,
        point: &TeleportPoint,
        radius: i32,
    ) -> std::result::Result<(), WorldError> {
        let id = actor.id;
        self.world.register_live(actor).await?;
        self.world.attach_session(id).await?;
        let at = point.base.jittered(radius, &mut rand::thread_rng());
        self.world.place(id, at).await?;
        self.world.assign_default_controller(id).await
    }

    /// Takes every pinned identity that is online out of the world.
    /// Offline identities are skipped silently.
    pub async fn despawn_pinned(&self, ids: &[ActorId]) -> Result<usize> {
        if ids.is_empty() {
            return Err(ConsoleError::validation(NO_PINNED_TARGETS));
        }

        let mut despawned = 0;
        for &id in ids {
            match self.despawn(id).await {
                Ok(true) => despawned += 1,
                Ok(false) => {}
                Err(err) => warn!(actor_id = %id, error = %err, "failed despawning actor"),
            }
        }

        info!(despawned, pinned = ids.len(), "despawn pinned finished");
        Ok(despawned)
    }

    /// Cancels in-flight actions and removes the actor from the world.
    /// Returns `false` when the actor was not online.
    pub async fn despawn(&self, id: ActorId) -> std::result::Result<bool, WorldError> {
        if !self.world.registry().contains(id).await {
            return Ok(false);
        }

        let steps = async {
            self.world.abort_attack(id).await?;
            self.world.abort_cast(id).await?;
            self.world.remove_from_world(id).await
        };
        match steps.await {
            Ok(()) => Ok(true),
            // Went offline concurrently.
            Err(WorldError::NotFound(_)) => Ok(false),
            Err(err) => Err(err),
        }
    }
}
