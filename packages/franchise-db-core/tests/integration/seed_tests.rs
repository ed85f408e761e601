//! Seed snapshot loading.

use std::fs;

use tempfile::tempdir;

use franchise_db_core::config::DbConfig;
use franchise_db_core::entity::Position;
use franchise_db_core::{Database, DbError, EntityKind};

use super::helpers::{assert_sound, franchise_dataset};

#[test]
fn test_seed_round_trip() -> anyhow::Result<()> {
    let dir = tempdir()?;
    let path = dir.path().join("seed.json");
    fs::write(&path, serde_json::to_string_pretty(&franchise_dataset())?)?;

    let db = Database::load_seed(&path, DbConfig::default())?;
    assert_eq!(*db.snapshot(), franchise_dataset());
    assert_eq!(db.len(EntityKind::Employee), 4);
    let manager: Position = db.get(1)?;
    assert_eq!(manager.title, "Manager");
    assert_sound(&db);
    Ok(())
}

#[test]
fn test_partial_seed_defaults_missing_tables() -> anyhow::Result<()> {
    let dir = tempdir()?;
    let path = dir.path().join("seed.json");
    fs::write(&path, r#"{"dishes": [{"name": "Soup"}], "menus": [{}]}"#)?;

    let db = Database::load_seed(&path, DbConfig::default())?;
    assert_eq!(db.len(EntityKind::Dish), 1);
    assert_eq!(db.len(EntityKind::Menu), 1);
    assert_eq!(db.len(EntityKind::Position), 0);
    Ok(())
}

#[test]
fn test_seed_with_dangling_key_is_corrupt() -> anyhow::Result<()> {
    let dir = tempdir()?;
    let path = dir.path().join("seed.json");
    fs::write(
        &path,
        r#"{"dishes": [{"name": "Soup"}], "menus": [{}], "menu_items": [{"dish_id": 1, "menu_id": 2}]}"#,
    )?;

    let err = Database::load_seed(&path, DbConfig::default()).unwrap_err();
    assert!(matches!(err, DbError::DataCorruption(_)), "{err}");
    Ok(())
}

#[test]
fn test_seed_with_double_manager_is_corrupt() -> anyhow::Result<()> {
    let mut dataset = franchise_dataset();
    dataset
        .managements
        .insert(franchise_db_core::entity::Management {
            location_id: 2,
            manager_id: 1,
        });
    let dir = tempdir()?;
    let path = dir.path().join("seed.json");
    fs::write(&path, serde_json::to_string(&dataset)?)?;

    assert!(matches!(
        Database::load_seed(&path, DbConfig::default()),
        Err(DbError::DataCorruption(_))
    ));
    Ok(())
}

#[test]
fn test_seed_errors() -> anyhow::Result<()> {
    let dir = tempdir()?;
    assert!(matches!(
        Database::load_seed(dir.path().join("missing.json"), DbConfig::default()),
        Err(DbError::IoError(_))
    ));

    let path = dir.path().join("bad.json");
    fs::write(&path, r#"{"widgets": []}"#)?;
    assert!(matches!(
        Database::load_seed(&path, DbConfig::default()),
        Err(DbError::SerializationError(_))
    ));
    Ok(())
}
