//! Game-server schema. Table and column names match the live server's
//! relational store so the same deletion plan applies to both.

use super::{Column, Database, TableSchema};
use crate::core::{DataType, StoreResult};

pub const ACCOUNTS: &str = "accounts";
pub const CHARACTERS: &str = "characters";
pub const ITEMS: &str = "items";

fn int(name: &str) -> Column {
    Column::new(name, DataType::Integer)
}

fn text(name: &str) -> Column {
    Column::new(name, DataType::Text)
}

/// Dependent table keyed by one character column plus payload columns.
fn keyed(table: &str, key: &str, payload: Vec<Column>) -> TableSchema {
    let mut columns = vec![int(key).not_null()];
    columns.extend(payload);
    TableSchema::new(table, columns)
}

pub fn game_schema() -> Vec<TableSchema> {
    vec![
        TableSchema::new(
            ACCOUNTS,
            vec![text("login").primary_key(), int("access_level").not_null()],
        ),
        TableSchema::new(
            CHARACTERS,
            vec![
                int("obj_id").primary_key(),
                text("account_name"),
                text("char_name").not_null(),
                int("classid"),
                int("level"),
                int("x"),
                int("y"),
                int("z"),
            ],
        ),
        keyed("character_friends", "char_id", vec![int("friend_id").not_null()]),
        keyed("character_hennas", "char_obj_id", vec![int("symbol_id"), int("slot")]),
        keyed("character_macroses", "char_obj_id", vec![int("id"), text("name")]),
        keyed("character_memo", "charId", vec![text("var"), text("val")]),
        keyed("character_memo_alt", "obj_id", vec![text("name"), text("value")]),
        keyed("character_quests", "charId", vec![text("name"), text("var"), text("value")]),
        keyed("character_recipebook", "char_id", vec![int("id")]),
        keyed(
            "character_shortcuts",
            "char_obj_id",
            vec![int("slot"), int("type"), int("shortcut_id")],
        ),
        keyed("character_skills", "char_obj_id", vec![int("skill_id"), int("skill_level")]),
        keyed(
            "character_skills_save",
            "char_obj_id",
            vec![int("skill_id"), int("remaining_time")],
        ),
        keyed("character_subclasses", "char_obj_id", vec![int("class_id"), int("level")]),
        keyed("heroes", "char_id", vec![int("count")]),
        keyed("olympiad_nobles", "char_id", vec![int("olympiad_points")]),
        keyed("seven_signs", "char_obj_id", vec![text("cabal")]),
        keyed("character_raid_points", "char_id", vec![int("boss_id"), int("points")]),
        TableSchema::new(
            ITEMS,
            vec![
                int("object_id").primary_key(),
                int("owner_id").not_null(),
                int("item_id"),
                int("count"),
            ],
        ),
        keyed("pets", "item_obj_id", vec![text("name"), int("level")]),
        keyed("augmentations", "item_id", vec![int("attributes")]),
    ]
}

/// Creates every table of [`game_schema`] that does not exist yet.
pub async fn create_game_schema(db: &Database) -> StoreResult<()> {
    for schema in game_schema() {
        if !db.table_exists(schema.name()).await {
            db.create_table(schema).await?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_create_is_idempotent() {
        let db = Database::new();
        create_game_schema(&db).await.unwrap();
        create_game_schema(&db).await.unwrap();
        let names = db.table_names().await;
        assert_eq!(names.len(), game_schema().len());
        assert!(names.contains(&"character_memo_alt".to_string()));
    }
}
