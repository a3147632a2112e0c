use super::{LiveActor, LiveRegistry, NameRegistry, SessionContext, WorldRuntime};
use crate::core::{ActorId, ClassCatalog, ClassProfile, Position, StoreError, Value, WorldError};
use crate::storage::schema::{ACCOUNTS, CHARACTERS};
use crate::storage::{Database, Filter};
use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info};

/// First object id handed out by the world's id factory.
pub const FIRST_OBJECT_ID: i64 = 0x1000_0000;

/// Controller label used when no class-specific controller is registered.
pub const DEFAULT_CONTROLLER: &str = "ROAMING";

/// Side effects the simulated world has performed, in order.
#[derive(Debug, Clone, PartialEq)]
pub enum WorldEvent {
    Created(ActorId),
    Restored(ActorId),
    IdentityRegistered(ActorId),
    IdentityUnregistered(ActorId),
    Registered(ActorId),
    SessionAttached(ActorId),
    Placed(ActorId, Position),
    ControllerAssigned(ActorId, String),
    AttackAborted(ActorId),
    CastAborted(ActorId),
    Removed(ActorId),
}

/// In-process world runtime over a [`Database`].
///
/// Backs the demo binary and the test suites. It persists new actors the way
/// the game server's factory does (one `AutoPilot_<id>` account with access
/// level -1 per actor) and restores characters from the `characters` table.
pub struct SimulatedWorld {
    db: Database,
    registry: LiveRegistry,
    names: NameRegistry,
    classes: ClassCatalog,
    controllers: RwLock<HashMap<i64, String>>,
    next_id: Mutex<i64>,
    journal: Mutex<Vec<WorldEvent>>,
    account_prefix: String,
    access_level: i64,
}

impl SimulatedWorld {
    pub fn new(db: Database, registry: LiveRegistry, names: NameRegistry) -> Self {
        Self {
            db,
            registry,
            names,
            classes: ClassCatalog::default(),
            controllers: RwLock::new(HashMap::new()),
            next_id: Mutex::new(FIRST_OBJECT_ID),
            journal: Mutex::new(Vec::new()),
            account_prefix: "AutoPilot_".to_string(),
            access_level: -1,
        }
    }

    pub fn with_classes(mut self, classes: ClassCatalog) -> Self {
        self.classes = classes;
        self
    }

    pub fn with_accounts(mut self, prefix: impl Into<String>, access_level: i64) -> Self {
        self.account_prefix = prefix.into();
        self.access_level = access_level;
        self
    }

    pub fn names(&self) -> &NameRegistry {
        &self.names
    }

    pub fn classes(&self) -> &ClassCatalog {
        &self.classes
    }

    /// Registers a behavior controller for `class`; its label becomes the
    /// live state label of actors that receive it.
    pub async fn register_controller(&self, class: &ClassProfile, label: impl Into<String>) {
        self.controllers.write().await.insert(class.id, label.into());
    }

    pub async fn events(&self) -> Vec<WorldEvent> {
        self.journal.lock().await.clone()
    }

    pub async fn clear_events(&self) {
        self.journal.lock().await.clear();
    }

    /// Puts a live actor into combat with an attack and a cast in flight.
    pub async fn engage(&self, id: ActorId) -> Result<(), WorldError> {
        self.registry
            .update(id, |actor| {
                actor.attacking = true;
                actor.casting = true;
                actor.state_label = "FIGHTING".to_string();
            })
            .await
            .ok_or(WorldError::NotFound(id))
    }

    async fn record(&self, event: WorldEvent) {
        self.journal.lock().await.push(event);
    }

    async fn allocate_id(&self) -> Result<ActorId, WorldError> {
        let persisted = self.db.select(CHARACTERS, &Filter::All).await?;
        let max_persisted = persisted
            .records()
            .filter_map(|record| record.get_i64("obj_id").ok())
            .max()
            .unwrap_or(0);
        let max_live = self
            .registry
            .snapshot()
            .await
            .keys()
            .map(|id| id.as_i64())
            .max()
            .unwrap_or(0);

        let mut next = self.next_id.lock().await;
        let id = (*next).max(max_persisted + 1).max(max_live + 1);
        *next = id + 1;
        Ok(ActorId(id))
    }

    async fn persist_new(&self, id: ActorId, name: &str, class: &ClassProfile, at: Position) -> Result<(), StoreError> {
        let account = format!("{}{}", self.account_prefix, id);
        let mut txn = self.db.begin().await;
        txn.insert(ACCOUNTS, vec![account.clone().into(), Value::Integer(self.access_level)])?;
        txn.insert(
            CHARACTERS,
            vec![
                id.into(),
                account.into(),
                name.into(),
                Value::Integer(class.id),
                Value::Integer(1),
                at.x.into(),
                at.y.into(),
                at.z.into(),
            ],
        )?;
        txn.commit().await
    }
}

#[async_trait]
impl WorldRuntime for SimulatedWorld {
    fn registry(&self) -> &LiveRegistry {
        &self.registry
    }

    async fn has_controller(&self, class: &ClassProfile) -> bool {
        self.controllers.read().await.contains_key(&class.id)
    }

    async fn create_actor(&self, class: &ClassProfile, at: Position) -> Result<ActorId, WorldError> {
        if !self.has_controller(class).await {
            return Err(WorldError::NoController(class.name.clone()));
        }

        let id = self.allocate_id().await?;
        let name = format!("Bot{}", id);
        self.persist_new(id, &name, class, at).await?;

        let actor = LiveActor::new(id, name, Some(class.clone()), 1);
        self.register_identity(&actor).await?;
        self.register_live(actor).await?;
        self.attach_session(id).await?;
        self.place(id, at).await?;
        self.assign_default_controller(id).await?;

        self.record(WorldEvent::Created(id)).await;
        info!(actor_id = %id, class = %class, position = %at, "actor created");
        Ok(id)
    }

    async fn restore(&self, id: ActorId) -> Result<LiveActor, WorldError> {
        let fail = |err: StoreError| WorldError::RestoreFailed(id, err.to_string());

        let rows = self
            .db
            .select(CHARACTERS, &Filter::eq("obj_id", id))
            .await
            .map_err(fail)?;
        let record = rows
            .first()
            .ok_or_else(|| WorldError::RestoreFailed(id, "no persisted character".to_string()))?;

        let name = record.get_str("char_name").map_err(fail)?;
        let class = record
            .get_i64("classid")
            .ok()
            .and_then(|class_id| self.classes.resolve(class_id));
        let level = record.get_i64("level").unwrap_or(1);
        let coord = |column: &str| record.get_i32(column).map_err(fail);
        let position = Position::new(coord("x")?, coord("y")?, coord("z")?);

        self.record(WorldEvent::Restored(id)).await;
        Ok(LiveActor::new(id, name, class, level).at(position))
    }

    async fn register_identity(&self, actor: &LiveActor) -> Result<(), WorldError> {
        self.names.register(actor.id, &actor.name).await;
        self.record(WorldEvent::IdentityRegistered(actor.id)).await;
        Ok(())
    }

    async fn unregister_identity(&self, id: ActorId) {
        if self.names.unregister(id).await.is_some() {
            self.record(WorldEvent::IdentityUnregistered(id)).await;
        }
    }

    async fn register_live(&self, actor: LiveActor) -> Result<(), WorldError> {
        let id = actor.id;
        self.registry.insert(actor).await;
        self.record(WorldEvent::Registered(id)).await;
        Ok(())
    }

    async fn attach_session(&self, id: ActorId) -> Result<SessionContext, WorldError> {
        let session = SessionContext::detached();
        let attached = session.clone();
        self.registry
            .update(id, move |actor| actor.session = Some(attached))
            .await
            .ok_or(WorldError::NotFound(id))?;
        self.record(WorldEvent::SessionAttached(id)).await;
        Ok(session)
    }

    async fn place(&self, id: ActorId, at: Position) -> Result<(), WorldError> {
        self.registry
            .update(id, |actor| actor.position = at)
            .await
            .ok_or(WorldError::NotFound(id))?;
        self.record(WorldEvent::Placed(id, at)).await;
        Ok(())
    }

    async fn assign_default_controller(&self, id: ActorId) -> Result<(), WorldError> {
        let actor = self.registry.get(id).await.ok_or(WorldError::NotFound(id))?;
        let registered = match &actor.class {
            Some(class) => self.controllers.read().await.get(&class.id).cloned(),
            None => None,
        };
        let label = registered.unwrap_or_else(|| DEFAULT_CONTROLLER.to_string());

        let assigned = label.clone();
        self.registry
            .update(id, move |actor| {
                actor.state_label = assigned.clone();
                actor.controller = Some(assigned);
            })
            .await
            .ok_or(WorldError::NotFound(id))?;
        debug!(actor_id = %id, controller = %label, "controller assigned");
        self.record(WorldEvent::ControllerAssigned(id, label)).await;
        Ok(())
    }

    async fn abort_attack(&self, id: ActorId) -> Result<(), WorldError> {
        self.registry
            .update(id, |actor| actor.attacking = false)
            .await
            .ok_or(WorldError::NotFound(id))?;
        self.record(WorldEvent::AttackAborted(id)).await;
        Ok(())
    }

    async fn abort_cast(&self, id: ActorId) -> Result<(), WorldError> {
        self.registry
            .update(id, |actor| actor.casting = false)
            .await
            .ok_or(WorldError::NotFound(id))?;
        self.record(WorldEvent::CastAborted(id)).await;
        Ok(())
    }

    async fn remove_from_world(&self, id: ActorId) -> Result<(), WorldError> {
        self.registry.remove(id).await.ok_or(WorldError::NotFound(id))?;
        self.record(WorldEvent::Removed(id)).await;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::schema::create_game_schema;

    async fn world() -> SimulatedWorld {
        let db = Database::new();
        create_game_schema(&db).await.unwrap();
        SimulatedWorld::new(db, LiveRegistry::new(), NameRegistry::new())
    }

    #[tokio::test]
    async fn test_create_requires_controller() {
        let world = world().await;
        let class = ClassProfile::new(0, "HUMAN_FIGHTER");
        let err = world.create_actor(&class, Position::default()).await.unwrap_err();
        assert_eq!(err, WorldError::NoController("HUMAN_FIGHTER".into()));
        assert!(world.registry().is_empty().await);
    }

    #[tokio::test]
    async fn test_create_persists_and_registers() {
        let world = world().await;
        let class = ClassProfile::new(0, "HUMAN_FIGHTER");
        world.register_controller(&class, "FARMING").await;

        let at = Position::new(10, 20, 30);
        let id = world.create_actor(&class, at).await.unwrap();
        assert_eq!(id, ActorId(FIRST_OBJECT_ID));

        let live = world.registry().get(id).await.unwrap();
        assert_eq!(live.position, at);
        assert_eq!(live.state_label, "FARMING");
        assert!(live.session.is_some());
        assert!(world.names().is_taken(&live.name).await);

        let restored = world.restore(id).await.unwrap();
        assert_eq!(restored.class, Some(class));
        assert_eq!(restored.position, at);
    }

    #[tokio::test]
    async fn test_ids_continue_after_persisted_max() {
        let world = world().await;
        let class = ClassProfile::new(0, "HUMAN_FIGHTER");
        world.register_controller(&class, "FARMING").await;
        world
            .db
            .insert(
                CHARACTERS,
                vec![
                    Value::Integer(FIRST_OBJECT_ID + 50),
                    "acc".into(),
                    "Existing".into(),
                    Value::Integer(0),
                    Value::Integer(1),
                    0.into(),
                    0.into(),
                    0.into(),
                ],
            )
            .await
            .unwrap();

        let id = world.create_actor(&class, Position::default()).await.unwrap();
        assert_eq!(id, ActorId(FIRST_OBJECT_ID + 51));
    }

    #[tokio::test]
    async fn test_restore_unknown_fails() {
        let world = world().await;
        assert!(matches!(
            world.restore(ActorId(99)).await,
            Err(WorldError::RestoreFailed(ActorId(99), _))
        ));
    }

    #[tokio::test]
    async fn test_remove_unknown_is_not_found() {
        let world = world().await;
        assert_eq!(
            world.remove_from_world(ActorId(5)).await,
            Err(WorldError::NotFound(ActorId(5)))
        );
    }
}
