#[cfg(test)]
use csv_merge_service::dto::StoredRecord;
use csv_merge_service::error::ServiceError;
use rusqlite::{params, Connection};
use std::path::{Path, PathBuf};
use tracing::info;

/// Result of asking the store to persist a payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveOutcome {
    Inserted(i64),
    AlreadyExists,
    NoData,
}

///
/// Owns the single connection to the `json_data` table.
///
/// The connection is released by `close`, or when the manager is dropped.
///
pub struct DatabaseManager {
    conn: Connection,
    db_path: PathBuf,
}

impl DatabaseManager {
    pub fn open<P: AsRef<Path>>(db_path: P) -> Result<Self, ServiceError> {
        let db_path = db_path.as_ref().to_path_buf();
        let conn = Connection::open(&db_path).map_err(|err| {
            ServiceError::store(format!(
                "Unable to open database {}: {}",
                db_path.display(),
                err
            ))
        })?;
        Self::init(conn, db_path)
    }

    #[cfg(test)]
    pub fn open_in_memory() -> Result<Self, ServiceError> {
        let conn = Connection::open_in_memory().map_err(ServiceError::store)?;
        Self::init(conn, PathBuf::from(":memory:"))
    }

    fn init(conn: Connection, db_path: PathBuf) -> Result<Self, ServiceError> {
        let manager = DatabaseManager { conn, db_path };
        manager.create_table()?;
        Ok(manager)
    }

    fn create_table(&self) -> Result<(), ServiceError> {
        self.conn
            .execute_batch(
                "CREATE TABLE IF NOT EXISTS json_data (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    data TEXT
                );
                CREATE INDEX IF NOT EXISTS json_data_data_idx ON json_data (data);",
            )
            .map_err(|err| ServiceError::store(format!("Error creating table: {}", err)))
    }

    /// Whether a row with exactly this text is already stored.
    pub fn json_exists(&self, json_data: &str) -> Result<bool, ServiceError> {
        let count: i64 = self
            .conn
            .query_row(
                "SELECT COUNT(1) FROM json_data WHERE data = ?1",
                params![json_data],
                |row| row.get(0),
            )
            .map_err(|err| ServiceError::store(format!("Error checking stored data: {}", err)))?;
        Ok(count > 0)
    }

    pub fn save_json(&self, json_data: &str) -> Result<SaveOutcome, ServiceError> {
        if json_data.is_empty() {
            info!("No data to add to the database, nothing saved");
            return Ok(SaveOutcome::NoData);
        }
        if self.json_exists(json_data)? {
            info!("Data already exists in the database, nothing saved");
            return Ok(SaveOutcome::AlreadyExists);
        }
        self.conn
            .execute(
                "INSERT INTO json_data (data) VALUES (?1)",
                params![json_data],
            )
            .map_err(|err| ServiceError::store(format!("Error saving to database: {}", err)))?;
        let id = self.conn.last_insert_rowid();
        info!(id, "Data saved to database {}", self.db_path.display());
        Ok(SaveOutcome::Inserted(id))
    }

    pub fn count(&self) -> Result<i64, ServiceError> {
        self.conn
            .query_row("SELECT COUNT(1) FROM json_data", [], |row| row.get(0))
            .map_err(ServiceError::store)
    }

    #[cfg(test)]
    pub fn records(&self) -> Result<Vec<StoredRecord>, ServiceError> {
        let mut statement = self
            .conn
            .prepare("SELECT id, data FROM json_data ORDER BY id")
            .map_err(ServiceError::store)?;
        let records = statement
            .query_map([], |row| {
                Ok(StoredRecord {
                    id: row.get(0)?,
                    data: row.get(1)?,
                })
            })
            .map_err(ServiceError::store)?;
        records
            .collect::<Result<Vec<_>, _>>()
            .map_err(ServiceError::store)
    }

    pub fn close(self) -> Result<(), ServiceError> {
        self.conn
            .close()
            .map_err(|(_, err)| ServiceError::store(format!("Error closing database: {}", err)))
    }
}
