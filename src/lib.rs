// ============================================================================
// Phantom Console Library
// ============================================================================

pub mod config;
pub mod console;
pub mod core;
pub mod deletion;
pub mod lifecycle;
pub mod reconcile;
pub mod selection;
pub mod storage;
pub mod transaction;
pub mod world;

// Re-export main types for convenience
pub use config::ConsoleConfig;
pub use console::{ConsoleHandle, ConsoleService, ConsoleView};
pub use core::{
    ActorId, ClassCatalog, ClassProfile, ConsoleError, PointCatalog, PointKind, Position, Result,
    TeleportPoint,
};
pub use deletion::{DeletionEngine, DeletionReport};
pub use lifecycle::LifecycleCommander;
pub use reconcile::{FakeRow, RowCounts, RowReconciler, filter_rows};
pub use selection::{DisplayRow, Pager, SelectionModel};
pub use storage::Database;
pub use world::{LiveRegistry, NameRegistry, SimulatedWorld, WorldRuntime};

use std::sync::Arc;

// ============================================================================
// High-level console API
// ============================================================================

/// Everything a front end calls, wired over one store and one world runtime.
///
/// # Examples
///
/// ```
/// use phantom_console::{ConsoleConfig, Database, LiveRegistry, NameRegistry, PhantomConsole, SimulatedWorld};
/// use phantom_console::storage::schema::create_game_schema;
/// use std::sync::Arc;
///
/// # #[tokio::main]
/// # async fn main() -> phantom_console::Result<()> {
/// let db = Database::new();
/// create_game_schema(&db).await?;
/// let world = Arc::new(SimulatedWorld::new(db.clone(), LiveRegistry::new(), NameRegistry::new()));
///
/// let console = PhantomConsole::new(ConsoleConfig::default(), db, world)?;
/// let rows = console.load_all_rows().await;
/// assert!(rows.is_empty());
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct PhantomConsole {
    config: ConsoleConfig,
    reconciler: RowReconciler,
    lifecycle: LifecycleCommander,
    deletion: DeletionEngine,
}

impl PhantomConsole {
    /// Fails with [`ConsoleError::Config`] when `config` does not validate.
    pub fn new(config: ConsoleConfig, db: Database, world: Arc<dyn WorldRuntime>) -> Result<Self> {
        config.validate()?;
        let reconciler = RowReconciler::new(db.clone(), world.registry().clone())
            .with_account_marker(config.fake_account_pattern.clone(), config.fake_access_level);
        let lifecycle = LifecycleCommander::new(world).with_config(config.clone());
        let deletion = DeletionEngine::new(db, lifecycle.clone());
        Ok(Self {
            config,
            reconciler,
            lifecycle,
            deletion,
        })
    }

    /// Resolves persisted class ids with `classes` instead of the default catalog.
    pub fn with_classes(mut self, classes: ClassCatalog) -> Self {
        self.reconciler = self.reconciler.with_classes(classes);
        self
    }

    pub fn with_deletion(mut self, deletion: DeletionEngine) -> Self {
        self.deletion = deletion;
        self
    }

    pub fn config(&self) -> &ConsoleConfig {
        &self.config
    }

    pub fn reconciler(&self) -> &RowReconciler {
        &self.reconciler
    }

    pub fn lifecycle(&self) -> &LifecycleCommander {
        &self.lifecycle
    }

    pub fn deletion(&self) -> &DeletionEngine {
        &self.deletion
    }

    pub async fn load_all_rows(&self) -> Vec<FakeRow> {
        self.reconciler.load_all_rows().await
    }

    pub fn filter(&self, rows: &[FakeRow], text: Option<&str>) -> Vec<FakeRow> {
        filter_rows(rows, text)
    }

    pub async fn create_batch(
        &self,
        point: Option<&TeleportPoint>,
        class: Option<&ClassProfile>,
        count: i32,
        radius: i32,
    ) -> Result<Vec<ActorId>> {
        self.lifecycle.create_batch(point, class, count, radius).await
    }

    pub async fn spawn_pinned(
        &self,
        ids: &[ActorId],
        point: Option<&TeleportPoint>,
        radius: i32,
    ) -> Result<usize> {
        self.lifecycle.spawn_pinned(ids, point, radius).await
    }

    pub async fn despawn_pinned(&self, ids: &[ActorId]) -> Result<usize> {
        self.lifecycle.despawn_pinned(ids).await
    }

    pub async fn delete_batch(&self, ids: &[ActorId]) -> Result<usize> {
        self.deletion.delete_batch(ids).await
    }

    pub async fn delete_one(&self, id: ActorId) -> Result<DeletionReport> {
        self.deletion.delete_one(id).await
    }

    /// Starts the periodic refresh and display workers.
    pub fn start(self) -> ConsoleService {
        ConsoleService::start(self)
    }
}
