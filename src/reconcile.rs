//! Row Reconciler: merges persisted fake characters with the live registry
//! into one snapshot per refresh.

use crate::core::{ActorId, ClassCatalog, ClassProfile, Position, StoreResult};
use crate::storage::schema::{ACCOUNTS, CHARACTERS};
use crate::storage::{Database, Filter, Record};
use crate::world::{LiveActor, LiveRegistry};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use tracing::{debug, warn};

/// State label of a character with no live instance.
pub const OFFLINE: &str = "OFFLINE";

/// One reconciled fake actor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FakeRow {
    pub id: ActorId,
    pub name: String,
    pub class_profile: Option<ClassProfile>,
    pub level: i64,
    pub position: Position,
    pub online: bool,
    pub state_label: String,
}

impl FakeRow {
    fn from_live(actor: &LiveActor) -> Self {
        Self {
            id: actor.id,
            name: actor.name.clone(),
            class_profile: actor.class.clone(),
            level: actor.level,
            position: actor.position,
            online: true,
            state_label: actor.state_label.clone(),
        }
    }

    /// Live values take precedence over whatever was persisted.
    fn overlay(mut self, live: Option<&LiveActor>) -> Self {
        match live {
            Some(actor) => {
                self.position = actor.position;
                self.state_label = actor.state_label.clone();
                self.online = true;
            }
            None => {
                self.state_label = OFFLINE.to_string();
                self.online = false;
            }
        }
        self
    }

    pub fn class_display(&self) -> String {
        self.class_profile
            .as_ref()
            .map(ClassProfile::display_name)
            .unwrap_or_else(|| "UNKNOWN".to_string())
    }
}

/// Online and offline totals of one snapshot.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RowCounts {
    pub online: usize,
    pub offline: usize,
}

impl RowCounts {
    pub fn of(rows: &[FakeRow]) -> Self {
        let online = rows.iter().filter(|row| row.online).count();
        Self {
            online,
            offline: rows.len().saturating_sub(online),
        }
    }

    pub fn total(&self) -> usize {
        self.online + self.offline
    }
}

/// Reads the persisted store and the live registry; never writes to either.
#[derive(Clone)]
pub struct RowReconciler {
    db: Database,
    registry: LiveRegistry,
    classes: ClassCatalog,
    account_pattern: String,
    access_level: i64,
}

impl RowReconciler {
    pub fn new(db: Database, registry: LiveRegistry) -> Self {
        Self {
            db,
            registry,
            classes: ClassCatalog::default(),
            account_pattern: "AutoPilot_%".to_string(),
            access_level: -1,
        }
    }

    pub fn with_classes(mut self, classes: ClassCatalog) -> Self {
        self.classes = classes;
        self
    }

    /// Marker identifying fake accounts: a login LIKE pattern plus access level.
    pub fn with_account_marker(mut self, pattern: impl Into<String>, access_level: i64) -> Self {
        self.account_pattern = pattern.into();
        self.access_level = access_level;
        self
    }

    /// Builds the reconciled snapshot.
    ///
    /// Persisted rows come first in query order, followed by live actors the
    /// query did not return. A store failure is logged and whatever was
    /// gathered before it is still returned.
    pub async fn load_all_rows(&self) -> Vec<FakeRow> {
        let live = self.registry.snapshot().await;
        let mut rows = Vec::new();
        let mut index: HashMap<ActorId, usize> = HashMap::new();

        if let Err(err) = self.load_persisted(&live, &mut rows, &mut index).await {
            warn!(error = %err, loaded = rows.len(), "failed loading persisted fake rows");
        }

        let persisted = rows.len();
        for actor in live.values() {
            if !index.contains_key(&actor.id) {
                index.insert(actor.id, rows.len());
                rows.push(FakeRow::from_live(actor));
            }
        }

        debug!(
            persisted,
            live_only = rows.len() - persisted,
            "reconciled fake rows"
        );
        rows
    }

    async fn load_persisted(
        &self,
        live: &BTreeMap<ActorId, LiveActor>,
        rows: &mut Vec<FakeRow>,
        index: &mut HashMap<ActorId, usize>,
    ) -> StoreResult<()> {
        let marker = Filter::eq("access_level", self.access_level)
            .and(Filter::like("login", self.account_pattern.as_str()));
        let accounts = self.db.select(ACCOUNTS, &marker).await?;

        for account in accounts.records() {
            let login = account.get_str("login")?;
            let characters = self
                .db
                .select(CHARACTERS, &Filter::eq("account_name", login))
                .await?;

            for record in characters.records() {
                let row = self.persisted_row(&record)?;
                let live_actor = live.get(&row.id);
                let row = row.overlay(live_actor);
                match index.get(&row.id) {
                    Some(&slot) => rows[slot] = row,
                    None => {
                        index.insert(row.id, rows.len());
                        rows.push(row);
                    }
                }
            }
        }
        Ok(())
    }

    fn persisted_row(&self, record: &Record<'_>) -> StoreResult<FakeRow> {
        Ok(FakeRow {
            id: ActorId(record.get_i64("obj_id")?),
            name: record.get_str("char_name")?.to_string(),
            class_profile: record
                .get_i64("classid")
                .ok()
                .and_then(|class_id| self.classes.resolve(class_id)),
            level: record.get_i64("level").unwrap_or(0),
            position: Position::new(record.get_i32("x")?, record.get_i32("y")?, record.get_i32("z")?),
            online: false,
            state_label: OFFLINE.to_string(),
        })
    }
}

/// Case-insensitive substring match on name or class name.
///
/// Blank or absent text returns the rows unchanged.
pub fn filter_rows(rows: &[FakeRow], text: Option<&str>) -> Vec<FakeRow> {
    let query = match text.map(str::trim) {
        Some(query) if !query.is_empty() => query.to_lowercase(),
        _ => return rows.to_vec(),
    };

    rows.iter()
        .filter(|row| {
            let class = row
                .class_profile
                .as_ref()
                .map(|class| class.name.to_lowercase())
                .unwrap_or_default();
            row.name.to_lowercase().contains(&query) || class.contains(&query)
        })
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(id: i64, name: &str, class: Option<&str>, online: bool) -> FakeRow {
        FakeRow {
            id: ActorId(id),
            name: name.to_string(),
            class_profile: class.map(|name| ClassProfile::new(0, name)),
            level: 1,
            position: Position::default(),
            online,
            state_label: if online { "FARMING" } else { OFFLINE }.to_string(),
        }
    }

    #[test]
    fn test_filter_blank_is_identity() {
        let rows = vec![row(1, "Bot1", None, false), row(2, "Bot2", Some("WARRIOR"), true)];
        assert_eq!(filter_rows(&rows, None), rows);
        assert_eq!(filter_rows(&rows, Some("")), rows);
        assert_eq!(filter_rows(&rows, Some("   ")), rows);
    }

    #[test]
    fn test_filter_matches_name_or_class() {
        let rows = vec![
            row(1, "Alpha", Some("WARRIOR"), false),
            row(2, "Beta", Some("CLERIC"), false),
            row(3, "Gamma", None, false),
        ];

        let by_class = filter_rows(&rows, Some(" warr "));
        assert_eq!(by_class.len(), 1);
        assert_eq!(by_class[0].id, ActorId(1));

        let by_name = filter_rows(&rows, Some("GAM"));
        assert_eq!(by_name.len(), 1);
        assert_eq!(by_name[0].id, ActorId(3));

        assert!(filter_rows(&rows, Some("nomatch")).is_empty());
        assert!(filter_rows(&[], Some("x")).is_empty());
    }

    #[test]
    fn test_counts() {
        let rows = vec![row(1, "a", None, true), row(2, "b", None, false), row(3, "c", None, false)];
        let counts = RowCounts::of(&rows);
        assert_eq!(counts, RowCounts { online: 1, offline: 2 });
        assert_eq!(counts.total(), 3);
        assert_eq!(RowCounts::of(&[]), RowCounts::default());
    }

    #[test]
    fn test_class_display_unknown() {
        assert_eq!(row(1, "a", None, false).class_display(), "UNKNOWN");
        assert_eq!(row(1, "a", Some("DARK_AVENGER"), false).class_display(), "DARK AVENGER");
    }
}
