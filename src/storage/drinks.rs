// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Embedded drink database backed by redb (pure Rust, ACID).
//!
//! ## Table Layout
//!
//! - `drinks`: id → serialized Drink
//! - `drink_titles`: title → id (uniqueness index)
//! - `meta`: key → value (id sequence)

use std::path::Path;

use redb::{Database, ReadableDatabase, ReadableTable, TableDefinition};

use crate::models::{Drink, Ingredient};

// =============================================================================
// Table Definitions
// =============================================================================

/// Primary table: id → serialized Drink (JSON bytes).
const DRINKS: TableDefinition<u64, &[u8]> = TableDefinition::new("drinks");

/// Index: title → id. Titles are unique.
const DRINK_TITLES: TableDefinition<&str, u64> = TableDefinition::new("drink_titles");

/// Store metadata: key → value.
const META: TableDefinition<&str, u64> = TableDefinition::new("meta");

/// Next id to hand out. Ids are never reused.
const NEXT_ID_KEY: &str = "next_drink_id";

// =============================================================================
// Error Type
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("redb error: {0}")]
    Redb(#[from] redb::Error),

    #[error("redb database error: {0}")]
    RedbDatabase(#[from] redb::DatabaseError),

    #[error("redb transaction error: {0}")]
    RedbTransaction(#[from] redb::TransactionError),

    #[error("redb table error: {0}")]
    RedbTable(#[from] redb::TableError),

    #[error("redb storage error: {0}")]
    RedbStorage(#[from] redb::StorageError),

    #[error("redb commit error: {0}")]
    RedbCommit(#[from] redb::CommitError),

    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("drink {0} not found")]
    NotFound(u64),

    #[error("a drink titled {0:?} already exists")]
    TitleTaken(String),

    #[error("title must not be blank")]
    BlankTitle,
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Fields of a drink about to be inserted.
#[derive(Debug, Clone)]
pub struct NewDrink {
    pub title: String,
    pub recipe: Vec<Ingredient>,
}

/// Partial update; `None` keeps the stored value.
#[derive(Debug, Clone, Default)]
pub struct DrinkChanges {
    pub title: Option<String>,
    pub recipe: Option<Vec<Ingredient>>,
}

fn normalize_title(title: &str) -> StoreResult<String> {
    let title = title.trim();
    if title.is_empty() {
        return Err(StoreError::BlankTitle);
    }
    Ok(title.to_string())
}

// =============================================================================
// DrinkStore
// =============================================================================

/// Embedded ACID drink database.
pub struct DrinkStore {
    db: Database,
}

impl DrinkStore {
    /// Open (or create) the database at the given path.
    pub fn open(path: &Path) -> StoreResult<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let db = Database::create(path)?;

        // Pre-create all tables so later read transactions don't fail
        let write_txn = db.begin_write()?;
        {
            let _ = write_txn.open_table(DRINKS)?;
            let _ = write_txn.open_table(DRINK_TITLES)?;
            let _ = write_txn.open_table(META)?;
        }
        write_txn.commit()?;

        tracing::debug!(path = %path.display(), "Opened drink store");
        Ok(Self { db })
    }

    /// All drinks, ordered by id.
    pub fn list(&self) -> StoreResult<Vec<Drink>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(DRINKS)?;

        let mut drinks = Vec::new();
        for entry in table.iter()? {
            let (_, value) = entry?;
            drinks.push(serde_json::from_slice(value.value())?);
        }
        Ok(drinks)
    }

    /// Insert a drink and assign it the next id.
    pub fn insert(&self, new: NewDrink) -> StoreResult<Drink> {
        let title = normalize_title(&new.title)?;

        let write_txn = self.db.begin_write()?;
        let drink = {
            let mut titles = write_txn.open_table(DRINK_TITLES)?;
            if titles.get(title.as_str())?.is_some() {
                return Err(StoreError::TitleTaken(title));
            }

            let mut meta = write_txn.open_table(META)?;
            let id = meta.get(NEXT_ID_KEY)?.map(|v| v.value()).unwrap_or(1);
            meta.insert(NEXT_ID_KEY, id + 1)?;

            let drink = Drink {
                id,
                title,
                recipe: new.recipe,
            };
            let json = serde_json::to_vec(&drink)?;

            let mut drinks = write_txn.open_table(DRINKS)?;
            drinks.insert(id, json.as_slice())?;
            titles.insert(drink.title.as_str(), id)?;
            drink
        };
        write_txn.commit()?;

        Ok(drink)
    }

    /// Apply `changes` to an existing drink.
    pub fn update(&self, id: u64, changes: DrinkChanges) -> StoreResult<Drink> {
        let new_title = changes.title.as_deref().map(normalize_title).transpose()?;

        let write_txn = self.db.begin_write()?;
        let drink = {
            let mut drinks = write_txn.open_table(DRINKS)?;

            // Read existing value and deserialize before mutating
            let existing_bytes = {
                let existing = drinks.get(id)?.ok_or(StoreError::NotFound(id))?;
                existing.value().to_vec()
            };
            let mut drink: Drink = serde_json::from_slice(&existing_bytes)?;

            if let Some(title) = new_title.filter(|t| *t != drink.title) {
                let mut titles = write_txn.open_table(DRINK_TITLES)?;
                if titles.get(title.as_str())?.is_some() {
                    return Err(StoreError::TitleTaken(title));
                }
                titles.remove(drink.title.as_str())?;
                titles.insert(title.as_str(), id)?;
                drink.title = title;
            }

            if let Some(recipe) = changes.recipe {
                drink.recipe = recipe;
            }

            let json = serde_json::to_vec(&drink)?;
            drinks.insert(id, json.as_slice())?;
            drink
        };
        write_txn.commit()?;

        Ok(drink)
    }

    /// Remove a drink.
    pub fn delete(&self, id: u64) -> StoreResult<()> {
        let write_txn = self.db.begin_write()?;
        {
            let mut drinks = write_txn.open_table(DRINKS)?;
            let removed = drinks
                .remove(id)?
                .ok_or(StoreError::NotFound(id))?
                .value()
                .to_vec();
            let drink: Drink = serde_json::from_slice(&removed)?;

            let mut titles = write_txn.open_table(DRINK_TITLES)?;
            titles.remove(drink.title.as_str())?;
        }
        write_txn.commit()?;
        Ok(())
    }

    /// Cheap read used by readiness probes.
    pub fn check(&self) -> StoreResult<()> {
        let read_txn = self.db.begin_read()?;
        let _ = read_txn.open_table(DRINKS)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn open_store() -> (DrinkStore, TempDir) {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let store = DrinkStore::open(&temp_dir.path().join("drinks.redb")).unwrap();
        (store, temp_dir)
    }

    fn find(store: &DrinkStore, id: u64) -> Option<Drink> {
        store.list().unwrap().into_iter().find(|d| d.id == id)
    }

    fn milk() -> Ingredient {
        Ingredient {
            name: "Milk".into(),
            color: "white".into(),
            parts: 1,
        }
    }

    fn new_drink(title: &str) -> NewDrink {
        NewDrink {
            title: title.into(),
            recipe: vec![milk()],
        }
    }

    #[test]
    fn insert_assigns_increasing_ids() {
        let (store, _dir) = open_store();
        let first = store.insert(new_drink("Latte")).unwrap();
        let second = store.insert(new_drink("Flat White")).unwrap();

        assert_eq!(first.id, 1);
        assert_eq!(second.id, 2);
        assert_eq!(find(&store, 1), Some(first));
    }

    #[test]
    fn list_is_ordered_by_id() {
        let (store, _dir) = open_store();
        for title in ["Mocha", "Americano", "Cortado"] {
            store.insert(new_drink(title)).unwrap();
        }

        let titles: Vec<String> = store.list().unwrap().into_iter().map(|d| d.title).collect();
        assert_eq!(titles, ["Mocha", "Americano", "Cortado"]);
    }

    #[test]
    fn duplicate_title_is_rejected() {
        let (store, _dir) = open_store();
        store.insert(new_drink("Latte")).unwrap();

        let result = store.insert(new_drink("  Latte "));
        assert!(matches!(result, Err(StoreError::TitleTaken(t)) if t == "Latte"));
        assert_eq!(store.list().unwrap().len(), 1);
    }

    #[test]
    fn blank_title_is_rejected() {
        let (store, _dir) = open_store();
        assert!(matches!(
            store.insert(new_drink("   ")),
            Err(StoreError::BlankTitle)
        ));
    }

    #[test]
    fn title_only_update_keeps_recipe() {
        let (store, _dir) = open_store();
        let drink = store.insert(new_drink("Latte")).unwrap();

        let updated = store
            .update(
                drink.id,
                DrinkChanges {
                    title: Some("New Name".into()),
                    recipe: None,
                },
            )
            .unwrap();

        assert_eq!(updated.title, "New Name");
        assert_eq!(updated.recipe, vec![milk()]);
        assert_eq!(find(&store, drink.id), Some(updated));
    }

    #[test]
    fn renamed_title_is_released() {
        let (store, _dir) = open_store();
        let drink = store.insert(new_drink("Latte")).unwrap();
        store
            .update(
                drink.id,
                DrinkChanges {
                    title: Some("Caffe Latte".into()),
                    recipe: None,
                },
            )
            .unwrap();

        assert!(store.insert(new_drink("Latte")).is_ok());
    }

    #[test]
    fn update_to_taken_title_fails() {
        let (store, _dir) = open_store();
        store.insert(new_drink("Latte")).unwrap();
        let mocha = store.insert(new_drink("Mocha")).unwrap();

        let result = store.update(
            mocha.id,
            DrinkChanges {
                title: Some("Latte".into()),
                recipe: None,
            },
        );
        assert!(matches!(result, Err(StoreError::TitleTaken(_))));
        assert_eq!(find(&store, mocha.id).unwrap().title, "Mocha");
    }

    #[test]
    fn update_missing_drink_fails() {
        let (store, _dir) = open_store();
        let result = store.update(42, DrinkChanges::default());
        assert!(matches!(result, Err(StoreError::NotFound(42))));
    }

    #[test]
    fn delete_removes_drink_and_title() {
        let (store, _dir) = open_store();
        let drink = store.insert(new_drink("Latte")).unwrap();

        store.delete(drink.id).unwrap();
        assert_eq!(find(&store, drink.id), None);
        assert!(matches!(
            store.delete(drink.id),
            Err(StoreError::NotFound(_))
        ));

        // Title is free again, and the id is not reused.
        let again = store.insert(new_drink("Latte")).unwrap();
        assert_eq!(again.id, 2);
    }

    #[test]
    fn data_survives_reopen() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("nested").join("drinks.redb");
        {
            let store = DrinkStore::open(&path).unwrap();
            store.insert(new_drink("Latte")).unwrap();
        }

        let store = DrinkStore::open(&path).unwrap();
        store.check().unwrap();
        assert_eq!(store.list().unwrap()[0].title, "Latte");
        assert_eq!(store.insert(new_drink("Mocha")).unwrap().id, 2);
    }
}
