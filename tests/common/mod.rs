#![allow(dead_code)]

use phantom_console::core::Value;
use phantom_console::storage::schema::{ACCOUNTS, CHARACTERS, ITEMS, create_game_schema};
use phantom_console::storage::Filter;
use phantom_console::{
    ActorId, ClassProfile, ConsoleConfig, Database, LiveRegistry, NameRegistry, PhantomConsole,
    PointKind, Position, SimulatedWorld, TeleportPoint, WorldRuntime,
};
use std::sync::Arc;

pub const CONTROLLER: &str = "FARMING";

pub struct Fixture {
    pub db: Database,
    pub world: Arc<SimulatedWorld>,
    pub console: PhantomConsole,
}

impl Fixture {
    pub async fn new() -> Self {
        Self::with_config(ConsoleConfig::default()).await
    }

    pub async fn with_config(config: ConsoleConfig) -> Self {
        let db = Database::new();
        create_game_schema(&db).await.unwrap();
        let world = Arc::new(SimulatedWorld::new(
            db.clone(),
            LiveRegistry::new(),
            NameRegistry::new(),
        ));
        world.register_controller(&fighter(), CONTROLLER).await;
        world.register_controller(&cleric(), CONTROLLER).await;
        let console = PhantomConsole::new(config, db.clone(), world.clone()).unwrap();
        Self { db, world, console }
    }

    pub async fn count(&self, table: &str, filter: Filter) -> usize {
        self.db.count(table, &filter).await.unwrap()
    }

    pub async fn is_live(&self, id: i64) -> bool {
        self.world.registry().contains(ActorId(id)).await
    }
}

pub fn fighter() -> ClassProfile {
    ClassProfile::new(0, "HUMAN_FIGHTER")
}

pub fn cleric() -> ClassProfile {
    ClassProfile::new(15, "CLERIC")
}

pub fn giran() -> TeleportPoint {
    TeleportPoint::new("Giran Town", PointKind::Town, Position::new(83400, 147943, -3404))
}

pub async fn seed_account(db: &Database, login: &str, access_level: i64) {
    db.insert(ACCOUNTS, vec![login.into(), Value::Integer(access_level)])
        .await
        .unwrap();
}

pub async fn seed_character(
    db: &Database,
    account: Option<&str>,
    id: i64,
    name: &str,
    class_id: i64,
    level: i64,
    at: Position,
) {
    db.insert(
        CHARACTERS,
        vec![
            Value::Integer(id),
            account.map(Value::from).unwrap_or(Value::Null),
            name.into(),
            Value::Integer(class_id),
            Value::Integer(level),
            at.x.into(),
            at.y.into(),
            at.z.into(),
        ],
    )
    .await
    .unwrap();
}

/// Fake account with one character, as the game server creates them.
pub async fn seed_fake(db: &Database, account: &str, id: i64, name: &str, at: Position) {
    seed_account(db, account, -1).await;
    seed_character(db, Some(account), id, name, 0, 1, at).await;
}

/// One row in every dependent table of `id`, plus an item carrying a pet
/// and an augmentation. Item object ids are derived from `id`.
pub async fn seed_dependents(db: &Database, id: i64) {
    let by_character: &[(&str, Vec<Value>)] = &[
        ("character_hennas", vec![Value::Integer(1), Value::Integer(1)]),
        ("character_macroses", vec![Value::Integer(1), "macro".into()]),
        ("character_memo", vec!["var".into(), "val".into()]),
        ("character_memo_alt", vec!["name".into(), "value".into()]),
        ("character_quests", vec!["Q001".into(), "cond".into(), "1".into()]),
        ("character_recipebook", vec![Value::Integer(10)]),
        (
            "character_shortcuts",
            vec![Value::Integer(1), Value::Integer(2), Value::Integer(3)],
        ),
        ("character_skills", vec![Value::Integer(1), Value::Integer(1)]),
        ("character_skills_save", vec![Value::Integer(1), Value::Integer(60)]),
        ("character_subclasses", vec![Value::Integer(2), Value::Integer(40)]),
        ("heroes", vec![Value::Integer(1)]),
        ("olympiad_nobles", vec![Value::Integer(18)]),
        ("seven_signs", vec!["dawn".into()]),
        ("character_raid_points", vec![Value::Integer(25001), Value::Integer(100)]),
    ];
    for (table, payload) in by_character {
        let mut row = vec![Value::Integer(id)];
        row.extend(payload.iter().cloned());
        db.insert(table, row).await.unwrap();
    }

    db.insert("character_friends", vec![Value::Integer(id), Value::Integer(id + 100_000)])
        .await
        .unwrap();

    let item = id * 10;
    db.insert(
        ITEMS,
        vec![Value::Integer(item), Value::Integer(id), Value::Integer(57), Value::Integer(1)],
    )
    .await
    .unwrap();
    db.insert("pets", vec![Value::Integer(item), "Wolf".into(), Value::Integer(5)])
        .await
        .unwrap();
    db.insert("augmentations", vec![Value::Integer(item), Value::Integer(123)])
        .await
        .unwrap();
}

/// Tables touched by [`seed_dependents`], each with the column holding `id`
/// (or the item id for item-linked tables).
pub const DEPENDENT_KEYS: &[(&str, &str)] = &[
    ("character_hennas", "char_obj_id"),
    ("character_macroses", "char_obj_id"),
    ("character_memo", "charId"),
    ("character_memo_alt", "obj_id"),
    ("character_quests", "charId"),
    ("character_recipebook", "char_id"),
    ("character_shortcuts", "char_obj_id"),
    ("character_skills", "char_obj_id"),
    ("character_skills_save", "char_obj_id"),
    ("character_subclasses", "char_obj_id"),
    ("heroes", "char_id"),
    ("olympiad_nobles", "char_id"),
    ("seven_signs", "char_obj_id"),
    ("character_raid_points", "char_id"),
    ("character_friends", "char_id"),
    ("items", "owner_id"),
];

pub async fn dependent_rows(db: &Database, id: i64) -> usize {
    let mut total = 0;
    for (table, column) in DEPENDENT_KEYS {
        total += db.count(table, &Filter::eq(*column, id)).await.unwrap();
    }
    let item = id * 10;
    total += db.count("pets", &Filter::eq("item_obj_id", item)).await.unwrap();
    total += db.count("augmentations", &Filter::eq("item_id", item)).await.unwrap();
    total
}
