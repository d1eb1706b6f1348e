use crate::core::{ConfigProvider, DocumentStore, NormalizedRecord, PersistedRecord, StoreConnection};
use crate::utils::error::{EtlError, Result};
use crate::utils::validation::{validate_identifier, validate_store_uri};
use rusqlite::{params, Connection};
use std::path::PathBuf;

/// SQLite-backed collection of `(name, age, email)` documents, addressed by a
/// `sqlite://<path>` URI. Every `connect` opens a fresh connection.
#[derive(Debug, Clone)]
pub struct SqliteStore {
    uri: String,
    path: PathBuf,
    collection: String,
}

impl SqliteStore {
    pub fn from_uri(uri: &str, collection: &str) -> Result<Self> {
        validate_store_uri("store_uri", uri)?;
        validate_identifier("collection", collection)?;

        let path = uri.trim_start_matches("sqlite://");
        Ok(Self {
            uri: uri.to_string(),
            path: PathBuf::from(path),
            collection: collection.to_string(),
        })
    }

    pub fn from_config<C: ConfigProvider>(config: &C) -> Result<Self> {
        Self::from_uri(config.store_uri(), config.collection())
    }

    fn connection_error(&self, err: impl std::fmt::Display) -> EtlError {
        EtlError::StorageConnectionError {
            uri: self.uri.clone(),
            message: err.to_string(),
        }
    }
}

impl DocumentStore for SqliteStore {
    type Connection = SqliteConnection;

    fn connect(&self) -> Result<SqliteConnection> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| self.connection_error(e))?;
        }

        let conn = Connection::open(&self.path).map_err(|e| self.connection_error(e))?;
        conn.execute_batch(&format!(
            r#"
            CREATE TABLE IF NOT EXISTS {} (
                id    INTEGER PRIMARY KEY AUTOINCREMENT,
                name  TEXT NOT NULL,
                age   INTEGER NOT NULL,
                email TEXT NOT NULL
            );
            "#,
            self.collection
        ))
        .map_err(|e| self.connection_error(e))?;

        tracing::debug!("Opened store connection to {}", self.uri);
        Ok(SqliteConnection {
            conn,
            uri: self.uri.clone(),
            collection: self.collection.clone(),
        })
    }
}

pub struct SqliteConnection {
    conn: Connection,
    uri: String,
    collection: String,
}

impl SqliteConnection {
    pub fn find_all(&self) -> Result<Vec<PersistedRecord>> {
        let mut stmt = self
            .conn
            .prepare(&format!(
                "SELECT id, name, age, email FROM {} ORDER BY id",
                self.collection
            ))
            .map_err(EtlError::storage_write)?;

        let rows = stmt
            .query_map([], |row| {
                Ok(PersistedRecord {
                    id: row.get(0)?,
                    record: NormalizedRecord {
                        name: row.get(1)?,
                        age: row.get(2)?,
                        email: row.get(3)?,
                    },
                })
            })
            .map_err(EtlError::storage_write)?;

        rows.collect::<std::result::Result<Vec<_>, _>>()
            .map_err(EtlError::storage_write)
    }
}

fn insert_row(
    conn: &Connection,
    collection: &str,
    record: &NormalizedRecord,
) -> rusqlite::Result<PersistedRecord> {
    conn.execute(
        &format!(
            "INSERT INTO {} (name, age, email) VALUES (?1, ?2, ?3)",
            collection
        ),
        params![record.name, record.age, record.email],
    )?;

    Ok(PersistedRecord {
        id: conn.last_insert_rowid(),
        record: record.clone(),
    })
}

impl StoreConnection for SqliteConnection {
    fn insert_one(&mut self, record: &NormalizedRecord) -> Result<PersistedRecord> {
        insert_row(&self.conn, &self.collection, record).map_err(EtlError::storage_write)
    }

    /// All rows land in one transaction; a failure leaves the collection untouched.
    fn insert_many(&mut self, records: &[NormalizedRecord]) -> Result<Vec<PersistedRecord>> {
        if records.is_empty() {
            return Ok(Vec::new());
        }

        let collection = self.collection.as_str();
        let tx = self.conn.transaction().map_err(EtlError::storage_write)?;
        let persisted = records
            .iter()
            .map(|r| insert_row(&tx, collection, r))
            .collect::<rusqlite::Result<Vec<_>>>()
            .map_err(EtlError::storage_write)?;
        tx.commit().map_err(EtlError::storage_write)?;

        Ok(persisted)
    }

    fn close(self) -> Result<()> {
        self.conn
            .close()
            .map_err(|(_, e)| EtlError::StorageConnectionError {
                uri: self.uri,
                message: e.to_string(),
            })
    }
}
