use super::state::{ConsoleState, ConsoleView, Update};
use crate::PhantomConsole;
use crate::core::{ActorId, ClassProfile, ConsoleError, TeleportPoint};
use crate::reconcile::RowReconciler;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Notify, mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, info};

/// Running console: one refresh worker and one display consumer.
pub struct ConsoleService {
    handle: ConsoleHandle,
    refresher: JoinHandle<()>,
    consumer: JoinHandle<()>,
}

impl ConsoleService {
    /// Spawns the workers on the current tokio runtime.
    pub fn start(core: PhantomConsole) -> Self {
        let config = core.config().clone();
        let (updates_tx, updates_rx) = mpsc::unbounded_channel();
        let (view_tx, view_rx) = watch::channel(ConsoleView::default());
        let (stop_tx, stop_rx) = watch::channel(false);
        let refresh = Arc::new(Notify::new());

        let refresher = tokio::spawn(refresh_worker(
            core.reconciler().clone(),
            updates_tx.clone(),
            Arc::clone(&refresh),
            stop_rx.clone(),
            config.initial_delay(),
            config.interval(),
        ));
        let consumer = tokio::spawn(display_consumer(
            ConsoleState::new(config.page_size),
            updates_rx,
            view_tx,
            stop_rx,
        ));

        info!(
            interval_ms = config.refresh_interval_ms,
            page_size = config.page_size,
            "console service started"
        );

        Self {
            handle: ConsoleHandle {
                core: Arc::new(core),
                updates: updates_tx,
                view: view_rx,
                refresh,
                stop: Arc::new(stop_tx),
            },
            refresher,
            consumer,
        }
    }

    pub fn handle(&self) -> ConsoleHandle {
        self.handle.clone()
    }

    /// Stops both workers and waits for them. Updates already queued are
    /// still applied.
    pub async fn shutdown(self) {
        self.handle.shutdown();
        let _ = self.refresher.await;
        let _ = self.consumer.await;
        info!("console service stopped");
    }
}

async fn refresh_worker(
    reconciler: RowReconciler,
    updates: mpsc::UnboundedSender<Update>,
    refresh: Arc<Notify>,
    mut stop: watch::Receiver<bool>,
    initial_delay: Duration,
    interval: Duration,
) {
    let mut ticker = tokio::time::interval_at(Instant::now() + initial_delay, interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = ticker.tick() => {}
            _ = refresh.notified() => {}
            changed = stop.changed() => {
                if changed.is_err() || *stop.borrow() {
                    break;
                }
                continue;
            }
        }

        let rows = reconciler.load_all_rows().await;
        debug!(rows = rows.len(), "refresh produced snapshot");
        if updates.send(Update::Snapshot(rows)).is_err() {
            break;
        }
    }
}

async fn display_consumer(
    mut state: ConsoleState,
    mut updates: mpsc::UnboundedReceiver<Update>,
    view: watch::Sender<ConsoleView>,
    mut stop: watch::Receiver<bool>,
) {
    loop {
        tokio::select! {
            update = updates.recv() => match update {
                Some(update) => state.apply(update),
                None => break,
            },
            changed = stop.changed() => {
                if changed.is_err() || *stop.borrow() {
                    while let Ok(update) = updates.try_recv() {
                        state.apply(update);
                    }
                    view.send_replace(state.view());
                    break;
                }
                continue;
            }
        }
        view.send_replace(state.view());
    }
}

/// Cloneable front-end handle. Queries go through the display consumer;
/// commands run on their own tasks and report through the status line.
#[derive(Clone)]
pub struct ConsoleHandle {
    core: Arc<PhantomConsole>,
    updates: mpsc::UnboundedSender<Update>,
    view: watch::Receiver<ConsoleView>,
    refresh: Arc<Notify>,
    stop: Arc<watch::Sender<bool>>,
}

impl ConsoleHandle {
    fn send(&self, update: Update) {
        // Fails only after shutdown.
        let _ = self.updates.send(update);
    }

    pub fn core(&self) -> &PhantomConsole {
        &self.core
    }

    pub fn refresh_now(&self) {
        self.refresh.notify_one();
    }

    pub fn set_search(&self, text: impl Into<String>) {
        self.send(Update::Search(text.into()));
    }

    pub fn set_page(&self, page: usize) {
        self.send(Update::Page(page));
    }

    pub fn pin(&self, id: ActorId) {
        self.send(Update::Pin(id));
    }

    pub fn unpin(&self, id: ActorId) {
        self.send(Update::Unpin(id));
    }

    pub fn select_page(&self) {
        self.send(Update::SelectPage);
    }

    pub fn select_filtered(&self) {
        self.send(Update::SelectFiltered);
    }

    pub fn clear_selection(&self) {
        self.send(Update::ClearSelection);
    }

    /// Pinned ids as of every update sent before this call.
    pub async fn pinned(&self) -> Vec<ActorId> {
        let (reply, answer) = oneshot::channel();
        self.send(Update::PinnedQuery(reply));
        answer.await.unwrap_or_default()
    }

    pub fn view(&self) -> ConsoleView {
        self.view.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<ConsoleView> {
        self.view.clone()
    }

    /// Waits until a view satisfying `predicate` is published.
    pub async fn wait_for(&self, predicate: impl FnMut(&ConsoleView) -> bool) -> Option<ConsoleView> {
        let mut receiver = self.view.clone();
        let view = receiver.wait_for(predicate).await.ok().map(|view| view.clone());
        view
    }

    pub fn shutdown(&self) {
        self.stop.send_replace(true);
    }

    pub fn create(
        &self,
        point: Option<TeleportPoint>,
        class: Option<ClassProfile>,
        count: i32,
        radius: i32,
    ) -> JoinHandle<()> {
        let this = self.clone();
        tokio::spawn(async move {
            let result = this
                .core
                .create_batch(point.as_ref(), class.as_ref(), count, radius)
                .await;
            match result {
                Ok(ids) => {
                    let created = ids.len();
                    this.send(Update::PinCreated(ids));
                    let at = point.map(|p| p.name).unwrap_or_default();
                    this.send(Update::Status(format!("CREATE OK: {} @ {}", created, at)));
                }
                Err(err) => this.report_failure("Create", &err),
            }
            this.refresh_now();
        })
    }

    pub fn spawn_pinned(&self, point: Option<TeleportPoint>, radius: i32) -> JoinHandle<()> {
        let this = self.clone();
        tokio::spawn(async move {
            let ids = this.pinned().await;
            match this.core.spawn_pinned(&ids, point.as_ref(), radius).await {
                Ok(spawned) => this.send(Update::Status(format!(
                    "SPAWN PINNED OK: {} restored/spawned.",
                    spawned
                ))),
                Err(err) => this.report_failure("Spawn", &err),
            }
            this.refresh_now();
        })
    }

    pub fn despawn_pinned(&self) -> JoinHandle<()> {
        let this = self.clone();
        tokio::spawn(async move {
            let ids = this.pinned().await;
            match this.core.despawn_pinned(&ids).await {
                Ok(despawned) => {
                    this.send(Update::Status(format!("DESPAWN PINNED OK: {}", despawned)))
                }
                Err(err) => this.report_failure("Despawn", &err),
            }
            this.refresh_now();
        })
    }

    pub fn delete_pinned(&self) -> JoinHandle<()> {
        let this = self.clone();
        tokio::spawn(async move {
            let ids = this.pinned().await;
            match this.core.delete_batch(&ids).await {
                Ok(deleted) => {
                    this.send(Update::Status(format!("DELETE DB PINNED OK: {}", deleted)))
                }
                Err(err) => this.report_failure("Delete", &err),
            }
            this.refresh_now();
        })
    }

    fn report_failure(&self, command: &str, err: &ConsoleError) {
        debug!(command, validation = err.is_validation(), error = %err, "command failed");
        self.send(Update::Status(format!("{} failed: {}", command, err)));
    }
}
