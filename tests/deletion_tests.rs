/// Cascading deletion tests
///
/// All-or-nothing removal of a character, its dependent records and its
/// orphaned account.
/// Run with: cargo test --test deletion_tests

mod common;

use common::*;
use phantom_console::deletion::{CHARACTER_CASCADE, DeletionStep};
use phantom_console::storage::Filter;
use phantom_console::storage::schema::{ACCOUNTS, CHARACTERS, ITEMS};
use phantom_console::{ActorId, ConsoleError, Position, WorldRuntime};

#[tokio::test]
async fn test_delete_without_dependents() {
    let fx = Fixture::new().await;
    seed_fake(&fx.db, "AutoPilot_1", 1, "Bot1", Position::default()).await;

    let report = fx.console.delete_one(ActorId(1)).await.unwrap();
    assert_eq!(report.account, "AutoPilot_1");
    assert!(report.account_deleted);
    assert_eq!(report.rows_deleted.get(CHARACTERS), Some(&1));
    assert_eq!(report.rows_deleted.get(ACCOUNTS), Some(&1));
    assert_eq!(report.total_rows(), 2);

    assert_eq!(fx.count(CHARACTERS, Filter::All).await, 0);
    assert_eq!(fx.count(ACCOUNTS, Filter::All).await, 0);
}

#[tokio::test]
async fn test_account_kept_while_characters_remain() {
    let fx = Fixture::new().await;
    seed_account(&fx.db, "AutoPilot_5", -1).await;
    seed_character(&fx.db, Some("AutoPilot_5"), 51, "Bot51", 0, 1, Position::default()).await;
    seed_character(&fx.db, Some("AutoPilot_5"), 52, "Bot52", 0, 1, Position::default()).await;

    let first = fx.console.delete_one(ActorId(51)).await.unwrap();
    assert!(!first.account_deleted);
    assert_eq!(first.total_rows(), 1);
    assert_eq!(fx.count(ACCOUNTS, Filter::eq("login", "AutoPilot_5")).await, 1);

    let second = fx.console.delete_one(ActorId(52)).await.unwrap();
    assert!(second.account_deleted);
    assert_eq!(fx.count(ACCOUNTS, Filter::eq("login", "AutoPilot_5")).await, 0);
}

#[tokio::test]
async fn test_cascade_removes_every_dependent_row() {
    let fx = Fixture::new().await;
    seed_fake(&fx.db, "AutoPilot_1", 1, "Bot1", Position::default()).await;
    seed_fake(&fx.db, "AutoPilot_2", 2, "Bot2", Position::default()).await;
    seed_dependents(&fx.db, 1).await;
    seed_dependents(&fx.db, 2).await;
    assert_eq!(dependent_rows(&fx.db, 1).await, 18);

    let report = fx.console.delete_one(ActorId(1)).await.unwrap();
    assert_eq!(dependent_rows(&fx.db, 1).await, 0);
    assert_eq!(report.rows_deleted.get("pets"), Some(&1));
    assert_eq!(report.rows_deleted.get("augmentations"), Some(&1));
    assert_eq!(report.rows_deleted.get(ITEMS), Some(&1));

    // The other character is untouched.
    assert_eq!(dependent_rows(&fx.db, 2).await, 18);
    assert_eq!(fx.count(CHARACTERS, Filter::eq("obj_id", 2)).await, 1);
}

#[tokio::test]
async fn test_friend_links_removed_on_both_sides() {
    let fx = Fixture::new().await;
    seed_fake(&fx.db, "AutoPilot_1", 1, "Bot1", Position::default()).await;
    fx.db
        .insert("character_friends", vec![9.into(), 1.into()])
        .await
        .unwrap();
    fx.db
        .insert("character_friends", vec![1.into(), 9.into()])
        .await
        .unwrap();
    fx.db
        .insert("character_friends", vec![9.into(), 8.into()])
        .await
        .unwrap();

    let report = fx.console.delete_one(ActorId(1)).await.unwrap();
    assert_eq!(report.rows_deleted.get("character_friends"), Some(&2));
    assert_eq!(fx.count("character_friends", Filter::All).await, 1);
}

#[tokio::test]
async fn test_unresolvable_account_rolls_back() {
    let fx = Fixture::new().await;
    seed_character(&fx.db, None, 3, "Orphan", 0, 1, Position::default()).await;
    seed_dependents(&fx.db, 3).await;

    let err = fx.console.delete_one(ActorId(3)).await.unwrap_err();
    assert!(matches!(err, ConsoleError::AccountMissing(ActorId(3))));
    assert_eq!(dependent_rows(&fx.db, 3).await, 18);
    assert_eq!(fx.count(CHARACTERS, Filter::eq("obj_id", 3)).await, 1);
}

#[tokio::test]
async fn test_missing_character_fails() {
    let fx = Fixture::new().await;
    let err = fx.console.delete_one(ActorId(12345)).await.unwrap_err();
    assert!(!err.is_validation());
}

#[tokio::test]
async fn test_mid_cascade_failure_rolls_back_everything() {
    let fx = Fixture::new().await;
    seed_fake(&fx.db, "AutoPilot_1", 1, "Bot1", Position::default()).await;
    seed_dependents(&fx.db, 1).await;

    // Fails after the character-keyed steps already ran.
    let mut cascade = CHARACTER_CASCADE.to_vec();
    cascade.insert(cascade.len() - 1, DeletionStep::by_character("missing_table", "char_id"));
    let engine = fx.console.deletion().clone().with_cascade(cascade);

    assert!(engine.delete_one(ActorId(1)).await.is_err());
    assert_eq!(dependent_rows(&fx.db, 1).await, 18);
    assert_eq!(fx.count(CHARACTERS, Filter::All).await, 1);
    assert_eq!(fx.count(ACCOUNTS, Filter::All).await, 1);
}

#[tokio::test]
async fn test_name_released_even_when_rolled_back() {
    let fx = Fixture::new().await;
    seed_character(&fx.db, None, 3, "Orphan", 0, 1, Position::default()).await;
    fx.world.names().register(ActorId(3), "Orphan").await;

    assert!(fx.console.delete_one(ActorId(3)).await.is_err());
    assert!(!fx.world.names().is_taken("Orphan").await);
    assert_eq!(fx.count(CHARACTERS, Filter::eq("obj_id", 3)).await, 1);
}

#[tokio::test]
async fn test_invalid_identity_has_no_side_effects() {
    let fx = Fixture::new().await;
    fx.world.names().register(ActorId(0), "Zero").await;

    for id in [0, -5] {
        let err = fx.console.delete_one(ActorId(id)).await.unwrap_err();
        assert!(err.is_validation());
    }
    assert!(fx.world.names().is_taken("Zero").await);
}

#[tokio::test]
async fn test_batch_counts_only_successes() {
    let fx = Fixture::new().await;
    seed_fake(&fx.db, "AutoPilot_1", 1, "Bot1", Position::default()).await;

    let deleted = fx.console.delete_batch(&[ActorId(1), ActorId(2)]).await.unwrap();
    assert_eq!(deleted, 1);
    assert_eq!(fx.count(CHARACTERS, Filter::All).await, 0);
}

#[tokio::test]
async fn test_batch_despawns_online_targets() {
    let fx = Fixture::new().await;
    let ids = fx.console.create_batch(Some(&giran()), Some(&fighter()), 2, 0).await.unwrap();
    fx.world.engage(ids[0]).await.unwrap();

    assert_eq!(fx.console.delete_batch(&ids).await.unwrap(), 2);
    assert!(fx.world.registry().is_empty().await);
    assert!(fx.console.load_all_rows().await.is_empty());
    assert_eq!(fx.count(ACCOUNTS, Filter::All).await, 0);
}

#[tokio::test]
async fn test_batch_validation() {
    let fx = Fixture::new().await;
    let err = fx.console.delete_batch(&[]).await.unwrap_err();
    assert!(err.is_validation());
}

#[tokio::test]
async fn test_operator_scenario() {
    let fx = Fixture::new().await;
    seed_account(&fx.db, "AutoPilot_7", -1).await;
    seed_character(&fx.db, Some("AutoPilot_7"), 5001, "Bot5001", 0, 40, Position::new(10, 20, 30)).await;
    let point = giran();

    let rows = fx.console.load_all_rows().await;
    assert_eq!(rows.len(), 1);
    assert!(!rows[0].online);
    assert_eq!(rows[0].state_label, "OFFLINE");
    assert_eq!(rows[0].position, Position::new(10, 20, 30));

    assert_eq!(fx.console.spawn_pinned(&[ActorId(5001)], Some(&point), 0).await.unwrap(), 1);
    let rows = fx.console.load_all_rows().await;
    assert_eq!(rows.len(), 1);
    assert!(rows[0].online);
    assert_eq!(rows[0].state_label, CONTROLLER);
    assert_eq!(rows[0].position, point.base);

    assert_eq!(fx.console.delete_batch(&[ActorId(5001)]).await.unwrap(), 1);
    assert!(!fx.world.registry().contains(ActorId(5001)).await);
    assert_eq!(fx.count(CHARACTERS, Filter::eq("obj_id", 5001)).await, 0);
    assert_eq!(fx.count(ACCOUNTS, Filter::eq("login", "AutoPilot_7")).await, 0);
    assert!(fx.console.load_all_rows().await.is_empty());
}
