use super::{LiveActor, LiveRegistry, SessionContext};
use crate::core::{ActorId, ClassProfile, Position, WorldError};
use async_trait::async_trait;

/// Capabilities the console consumes from the world runtime.
///
/// Read-side capabilities (lookup by identity, listing, position, level,
/// class, state label) are served by the shared [`LiveRegistry`]; everything
/// that changes the world goes through this trait.
#[async_trait]
pub trait WorldRuntime: Send + Sync {
    fn registry(&self) -> &LiveRegistry;

    async fn has_controller(&self, class: &ClassProfile) -> bool;

    /// Creates a brand-new actor at `at`. The runtime persists it and
    /// registers it as live as part of creation.
    async fn create_actor(&self, class: &ClassProfile, at: Position) -> Result<ActorId, WorldError>;

    /// Rebuilds an actor from its persisted record without making it live.
    async fn restore(&self, id: ActorId) -> Result<LiveActor, WorldError>;

    async fn register_identity(&self, actor: &LiveActor) -> Result<(), WorldError>;

    /// Frees the identity's name in the naming-uniqueness registry.
    async fn unregister_identity(&self, id: ActorId);

    async fn register_live(&self, actor: LiveActor) -> Result<(), WorldError>;

    async fn attach_session(&self, id: ActorId) -> Result<SessionContext, WorldError>;

    async fn place(&self, id: ActorId, at: Position) -> Result<(), WorldError>;

    async fn assign_default_controller(&self, id: ActorId) -> Result<(), WorldError>;

    async fn abort_attack(&self, id: ActorId) -> Result<(), WorldError>;

    async fn abort_cast(&self, id: ActorId) -> Result<(), WorldError>;

    /// Removes the actor from the world and from the live registry.
    async fn remove_from_world(&self, id: ActorId) -> Result<(), WorldError>;
}
