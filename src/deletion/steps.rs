use crate::core::{ActorId, StoreResult};
use crate::storage::schema::ITEMS;
use crate::storage::{Filter, Transaction};

/// How a cascade step selects the rows belonging to one character.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepKey {
    /// `column = id`
    Character(&'static str),
    /// `first = id OR second = id`
    CharacterEither(&'static str, &'static str),
    /// `column IN (SELECT object_id FROM items WHERE owner_id = id)`
    OwnedItem(&'static str),
}

/// One `(table, key)` entry of a cascade plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeletionStep {
    pub table: &'static str,
    pub key: StepKey,
}

impl DeletionStep {
    pub const fn by_character(table: &'static str, column: &'static str) -> Self {
        Self {
            table,
            key: StepKey::Character(column),
        }
    }

    pub const fn by_either(table: &'static str, first: &'static str, second: &'static str) -> Self {
        Self {
            table,
            key: StepKey::CharacterEither(first, second),
        }
    }

    pub const fn by_owned_item(table: &'static str, column: &'static str) -> Self {
        Self {
            table,
            key: StepKey::OwnedItem(column),
        }
    }

    /// Builds the predicate against the transaction's current view, so
    /// item-linked steps see the items that are still there.
    pub fn filter(&self, txn: &Transaction, id: ActorId) -> StoreResult<Filter> {
        Ok(match self.key {
            StepKey::Character(column) => Filter::eq(column, id),
            StepKey::CharacterEither(first, second) => {
                Filter::eq(first, id).or(Filter::eq(second, id))
            }
            StepKey::OwnedItem(column) => {
                let owned = txn
                    .select(ITEMS, &Filter::eq("owner_id", id))?
                    .column_values("object_id")?;
                Filter::in_list(column, owned)
            }
        })
    }
}

/// Removal order for one character. Directly keyed records first, then
/// records hanging off owned items, then the items, then the character row.
pub const CHARACTER_CASCADE: &[DeletionStep] = &[
    DeletionStep::by_either("character_friends", "char_id", "friend_id"),
    DeletionStep::by_character("character_hennas", "char_obj_id"),
    DeletionStep::by_character("character_macroses", "char_obj_id"),
    DeletionStep::by_character("character_memo", "charId"),
    DeletionStep::by_character("character_memo_alt", "obj_id"),
    DeletionStep::by_character("character_quests", "charId"),
    DeletionStep::by_character("character_recipebook", "char_id"),
    DeletionStep::by_character("character_shortcuts", "char_obj_id"),
    DeletionStep::by_character("character_skills", "char_obj_id"),
    DeletionStep::by_character("character_skills_save", "char_obj_id"),
    DeletionStep::by_character("character_subclasses", "char_obj_id"),
    DeletionStep::by_character("heroes", "char_id"),
    DeletionStep::by_character("olympiad_nobles", "char_id"),
    DeletionStep::by_character("seven_signs", "char_obj_id"),
    DeletionStep::by_character("character_raid_points", "char_id"),
    DeletionStep::by_owned_item("pets", "item_obj_id"),
    DeletionStep::by_owned_item("augmentations", "item_id"),
    DeletionStep::by_character(ITEMS, "owner_id"),
    DeletionStep::by_character("characters", "obj_id"),
];
