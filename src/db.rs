use crate::error::StoreError;
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use rusqlite::types::Type;
use rusqlite::{params, Connection};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};

/// Maximum number of records the read API returns
pub const READ_LIMIT: usize = 31;

/// Blog record: one input row plus its generated post
/// Created once by the batch, never updated or deleted
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct BlogRecord {
    /// Stable identity (UUID v4)
    pub id: String,

    pub name: String,
    pub average_revenue: f64,
    pub average_cost_to_start: f64,
    pub blog_content: String,

    /// Creation time, exposed as `date`
    #[serde(rename = "date")]
    pub created_at: DateTime<Utc>,
}

impl BlogRecord {
    pub fn new(
        name: String,
        average_revenue: f64,
        average_cost_to_start: f64,
        blog_content: String,
    ) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            name,
            average_revenue,
            average_cost_to_start,
            blog_content,
            created_at: Utc::now(),
        }
    }

    /// Required-field check run before every insert
    fn validate(&self) -> Result<(), StoreError> {
        if self.name.trim().is_empty() {
            return Err(StoreError::MissingField("name"));
        }
        if self.blog_content.trim().is_empty() {
            return Err(StoreError::MissingField("blog_content"));
        }
        Ok(())
    }
}

pub fn setup_database(conn: &Connection) -> Result<(), StoreError> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS blogs (
            seq INTEGER PRIMARY KEY AUTOINCREMENT,
            id TEXT UNIQUE NOT NULL,
            name TEXT NOT NULL CHECK (length(trim(name)) > 0),
            average_revenue REAL NOT NULL,
            average_cost_to_start REAL NOT NULL,
            blog_content TEXT NOT NULL CHECK (length(trim(blog_content)) > 0),
            created_at TEXT NOT NULL
        )",
        [],
    )?;

    Ok(())
}

// ============================================================================
// BLOG STORE
// ============================================================================

/// Handle to the blog record store
///
/// Cloning is cheap; all clones share one connection. The batch writes and
/// the read API queries through the same handle.
#[derive(Clone)]
pub struct BlogStore {
    conn: Arc<Mutex<Connection>>,
}

impl BlogStore {
    /// Open (or create) the database file and its schema
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)
            .with_context(|| format!("Failed to open database: {}", path.display()))?;

        // Enable WAL mode so readers don't block the batch writer
        conn.pragma_update(None, "journal_mode", "WAL")
            .context("Failed to enable WAL mode")?;
        setup_database(&conn).context("Failed to create blogs table")?;

        Ok(Self::from_connection(conn))
    }

    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().context("Failed to open in-memory database")?;
        setup_database(&conn).context("Failed to create blogs table")?;
        Ok(Self::from_connection(conn))
    }

    fn from_connection(conn: Connection) -> Self {
        Self {
            conn: Arc::new(Mutex::new(conn)),
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>, StoreError> {
        self.conn.lock().map_err(|_| StoreError::Poisoned)
    }

    /// Persist one record
    pub fn save(&self, record: &BlogRecord) -> Result<(), StoreError> {
        record.validate()?;

        let conn = self.lock()?;
        conn.execute(
            "INSERT INTO blogs (
                id, name, average_revenue, average_cost_to_start, blog_content, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                record.id,
                record.name,
                record.average_revenue,
                record.average_cost_to_start,
                record.blog_content,
                record.created_at.to_rfc3339(),
            ],
        )?;

        Ok(())
    }

    /// Up to `limit` records in insertion order
    pub fn find_all(&self, limit: usize) -> Result<Vec<BlogRecord>, StoreError> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(
            "SELECT id, name, average_revenue, average_cost_to_start, blog_content, created_at
             FROM blogs
             ORDER BY seq ASC
             LIMIT ?1",
        )?;

        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        let records = stmt
            .query_map(params![limit], |row| {
                let created_at_str: String = row.get(5)?;
                let created_at = DateTime::parse_from_rfc3339(&created_at_str)
                    .map_err(|e| rusqlite::Error::FromSqlConversionFailure(5, Type::Text, Box::new(e)))?
                    .with_timezone(&Utc);

                Ok(BlogRecord {
                    id: row.get(0)?,
                    name: row.get(1)?,
                    average_revenue: row.get(2)?,
                    average_cost_to_start: row.get(3)?,
                    blog_content: row.get(4)?,
                    created_at,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(records)
    }

    pub fn count(&self) -> Result<i64, StoreError> {
        let conn = self.lock()?;
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM blogs", [], |row| row.get(0))?;
        Ok(count)
    }

    #[cfg(test)]
    pub(crate) fn break_schema_for_test(&self) {
        self.lock().unwrap().execute("DROP TABLE blogs", []).unwrap();
    }
}
