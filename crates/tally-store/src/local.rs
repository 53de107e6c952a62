//! # Local Keyed-Record Store
//!
//! Durable mirror of the in-memory collections: one SQLite-backed record
//! holding the whole [`StorageData`] document as JSON.
//!
//! ## Degradation Contract
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │  The local store never raises to its callers:                       │
//! │                                                                     │
//! │  open()  → always yields a LocalStore; a failed backing medium      │
//! │            produces an unavailable store (logged)                   │
//! │  load()  → default empty record on missing row, parse failure,      │
//! │            or unavailable medium                                    │
//! │  save()  → false on failure, true on success                        │
//! │                                                                     │
//! │  The collection stores are the data authority; this layer is a      │
//! │  mirror written after every mutation and read at initialization.    │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Partial Saves
//! `save_expenses` and friends do a read-modify-write of one field of the
//! record. Two collection stores persisting concurrently race at the
//! field level (last write wins for the whole record); each store only
//! ever rewrites its own field, so a lost race costs at most one stale
//! field until that store's next save.

use chrono::Utc;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sqlx::SqlitePool;
use tracing::{debug, info, warn};

use tally_core::types::{
    Budget, Category, Expense, StorageData, UserPreferences, STORAGE_VERSION,
};

use crate::config::StoreConfig;
use crate::error::{StoreError, StoreResult};

/// Key of the single persisted record.
const STORAGE_KEY: &str = "tally-data";

/// Schema for the keyed-record table.
const SCHEMA: &str = "CREATE TABLE IF NOT EXISTS app_state (\
     key TEXT PRIMARY KEY, \
     payload TEXT NOT NULL\
     )";

// =============================================================================
// Local Store
// =============================================================================

/// Handle to the local keyed-record store.
///
/// Cheap to clone; clones share the connection pool.
#[derive(Debug, Clone)]
pub struct LocalStore {
    /// Connection pool, or None when the backing medium is unavailable.
    pool: Option<SqlitePool>,
}

impl LocalStore {
    /// Opens (or creates) the store described by `config`.
    ///
    /// Never fails: if the backing medium cannot be opened the returned
    /// store is unavailable: reads yield defaults and writes report
    /// false, matching the degradation contract above.
    pub async fn open(config: StoreConfig) -> LocalStore {
        let options = match &config.database_path {
            Some(path) => {
                if let Some(parent) = path.parent() {
                    if !parent.as_os_str().is_empty() {
                        if let Err(e) = std::fs::create_dir_all(parent) {
                            warn!(path = %parent.display(), error = %e, "Could not create data directory");
                        }
                    }
                }
                SqliteConnectOptions::new()
                    .filename(path)
                    .create_if_missing(true)
                    // WAL mode: readers don't block the persistence writes
                    .journal_mode(SqliteJournalMode::Wal)
            }
            None => SqliteConnectOptions::new().in_memory(true),
        };

        let pool = SqlitePoolOptions::new()
            .max_connections(config.max_connections)
            .min_connections(1)
            .acquire_timeout(config.connect_timeout)
            // The sole in-memory connection must never be reclaimed.
            .idle_timeout(None)
            .connect_with(options)
            .await;

        let pool = match pool {
            Ok(pool) => pool,
            Err(e) => {
                warn!(error = %e, "Local store unavailable, falling back to in-memory defaults");
                return LocalStore { pool: None };
            }
        };

        if let Err(e) = sqlx::query(SCHEMA).execute(&pool).await {
            warn!(error = %e, "Could not initialize local store schema");
            return LocalStore { pool: None };
        }

        info!(
            path = %config
                .database_path
                .as_deref()
                .map(|p| p.display().to_string())
                .unwrap_or_else(|| ":memory:".to_string()),
            "Local store ready"
        );
        LocalStore { pool: Some(pool) }
    }

    /// True when the backing medium accepted the last open.
    pub fn is_available(&self) -> bool {
        self.pool.is_some()
    }

    // =========================================================================
    // Whole-Record Operations
    // =========================================================================

    /// Reads the raw persisted record, if one exists.
    async fn read_record(&self) -> StoreResult<Option<StorageData>> {
        let Some(pool) = &self.pool else {
            return Err(StoreError::OpenFailed("backing medium unavailable".into()));
        };

        let payload: Option<String> =
            sqlx::query_scalar("SELECT payload FROM app_state WHERE key = ?")
                .bind(STORAGE_KEY)
                .fetch_optional(pool)
                .await?;

        match payload {
            Some(payload) => Ok(Some(serde_json::from_str(&payload)?)),
            None => Ok(None),
        }
    }

    /// Writes the record under the well-known key.
    async fn write_record(&self, data: &StorageData) -> StoreResult<()> {
        let Some(pool) = &self.pool else {
            return Err(StoreError::OpenFailed("backing medium unavailable".into()));
        };

        let payload = serde_json::to_string(data)?;
        sqlx::query(
            "INSERT INTO app_state (key, payload) VALUES (?, ?) \
             ON CONFLICT(key) DO UPDATE SET payload = excluded.payload",
        )
        .bind(STORAGE_KEY)
        .bind(payload)
        .execute(pool)
        .await?;
        Ok(())
    }

    /// Loads the persisted record.
    ///
    /// Returns the default empty record when no record exists, the
    /// payload fails to parse, or the backing medium is unavailable.
    /// Applies pending schema migrations (and persists the upgraded
    /// record) before returning.
    pub async fn load(&self) -> StorageData {
        let data = match self.read_record().await {
            Ok(Some(data)) => data,
            Ok(None) => return StorageData::empty(),
            Err(e) => {
                warn!(error = %e, "Failed to read local store, using defaults");
                return StorageData::empty();
            }
        };

        if data.version < STORAGE_VERSION {
            let from = data.version;
            let upgraded = migrate(data);
            if self.save(&upgraded).await {
                info!(from, to = STORAGE_VERSION, "Migrated persisted record");
            } else {
                warn!(from, "Migration succeeded in memory but could not be persisted");
            }
            return upgraded;
        }

        data
    }

    /// Persists the full record, stamping `last_updated` to now.
    ///
    /// Returns false (never raises) when the backing medium rejects the
    /// write.
    pub async fn save(&self, data: &StorageData) -> bool {
        let mut to_save = data.clone();
        to_save.last_updated = Utc::now();

        match self.write_record(&to_save).await {
            Ok(()) => {
                debug!(
                    expenses = to_save.expenses.len(),
                    categories = to_save.categories.len(),
                    budgets = to_save.budgets.len(),
                    "Persisted record"
                );
                true
            }
            Err(e) => {
                warn!(error = %e, "Failed to persist record");
                false
            }
        }
    }

    /// Deletes the persisted record.
    pub async fn clear(&self) -> bool {
        let Some(pool) = &self.pool else {
            return false;
        };
        sqlx::query("DELETE FROM app_state WHERE key = ?")
            .bind(STORAGE_KEY)
            .execute(pool)
            .await
            .is_ok()
    }

    // =========================================================================
    // Partial-Field Saves
    // =========================================================================
    // Each of these reloads the whole record, replaces one field, and
    // rewrites the record. See the module docs for the (accepted) race
    // between concurrent partial saves from different stores.

    /// Persists only the expense collection.
    pub async fn save_expenses(&self, expenses: &[Expense]) -> bool {
        let mut data = self.load().await;
        data.expenses = expenses.to_vec();
        self.save(&data).await
    }

    /// Persists only the category collection.
    pub async fn save_categories(&self, categories: &[Category]) -> bool {
        let mut data = self.load().await;
        data.categories = categories.to_vec();
        self.save(&data).await
    }

    /// Persists only the budget collection.
    pub async fn save_budgets(&self, budgets: &[Budget]) -> bool {
        let mut data = self.load().await;
        data.budgets = budgets.to_vec();
        self.save(&data).await
    }

    /// Persists only the preferences singleton.
    pub async fn save_preferences(&self, preferences: &UserPreferences) -> bool {
        let mut data = self.load().await;
        data.preferences = preferences.clone();
        self.save(&data).await
    }
}

// =============================================================================
// Migration
// =============================================================================

/// Applies schema migration steps sequentially up to [`STORAGE_VERSION`].
///
/// Steps for future versions slot in here in order, e.g.:
/// `if data.version < 2 { data = migrate_v1_to_v2(data); }`
fn migrate(mut data: StorageData) -> StorageData {
    data.version = STORAGE_VERSION;
    data
}

// =============================================================================
// Unit Tests
// =============================================================================
