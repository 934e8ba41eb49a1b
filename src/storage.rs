use crate::{app::AppError, previews::Preview, submissions::UserUrl};
use anyhow::anyhow;
use rusqlite::{params, Connection, OptionalExtension};
use std::{
    collections::BTreeMap,
    sync::{Mutex, MutexGuard},
};

/// Persistence for previews, url submissions and token lookups.
///
/// Every method is a single statement; implementations need no transaction
/// discipline beyond that.
pub trait Store: Send + Sync {
    fn insert_preview(&self, preview: &Preview) -> Result<(), AppError>;
    fn find_preview(&self, id: &str) -> Result<Option<Preview>, AppError>;
    /// Resolves an api token to the id of the user owning it.
    fn find_token_owner(&self, token: &str) -> Result<Option<String>, AppError>;
    fn insert_user_url(&self, user_url: &UserUrl) -> Result<(), AppError>;
}

const SCHEMA: &str = "
    PRAGMA foreign_keys = ON;

    CREATE TABLE IF NOT EXISTS users (
        id TEXT PRIMARY KEY
    );

    -- provisioned outside this service
    CREATE TABLE IF NOT EXISTS api_tokens (
        token TEXT PRIMARY KEY,
        user_id TEXT NOT NULL REFERENCES users(id)
    );

    CREATE TABLE IF NOT EXISTS user_urls (
        id TEXT PRIMARY KEY,
        url TEXT NOT NULL,
        user_id TEXT NOT NULL REFERENCES users(id),
        created_at INTEGER NOT NULL
    );

    CREATE TABLE IF NOT EXISTS previews (
        id TEXT PRIMARY KEY,
        title TEXT,
        description TEXT,
        thumbnail TEXT,
        keywords TEXT NOT NULL,
        metadata TEXT
    );

    CREATE INDEX IF NOT EXISTS idx_user_urls_user_id ON user_urls(user_id);
";

/// SQLite-backed store. One connection, shared behind a mutex.
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Opens `database_url`, which is either `sqlite://<path>`, a bare path,
    /// or `sqlite::memory:` / `:memory:` for a throwaway database.
    pub fn open(database_url: &str) -> Result<Self, AppError> {
        let conn = match database_url {
            ":memory:" | "sqlite::memory:" => Connection::open_in_memory()?,
            url => Connection::open(url.strip_prefix("sqlite://").unwrap_or(url))?,
        };

        conn.execute_batch(SCHEMA)?;

        log::info!("store opened at {database_url}");

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>, AppError> {
        self.conn
            .lock()
            .map_err(|_| AppError::Other(anyhow!("store connection lock poisoned")))
    }

    #[cfg(test)]
    pub fn grant_token(&self, token: &str, user_id: &str) -> Result<(), AppError> {
        let conn = self.conn()?;
        conn.execute("INSERT OR IGNORE INTO users (id) VALUES (?1)", [user_id])?;
        conn.execute(
            "INSERT INTO api_tokens (token, user_id) VALUES (?1, ?2)",
            [token, user_id],
        )?;
        Ok(())
    }

    #[cfg(test)]
    pub fn user_urls(&self) -> Result<Vec<UserUrl>, AppError> {
        let conn = self.conn()?;
        let mut stmt =
            conn.prepare("SELECT id, url, user_id, created_at FROM user_urls ORDER BY id")?;
        let rows = stmt.query_map([], |row| {
            Ok(UserUrl {
                id: row.get(0)?,
                url: row.get(1)?,
                user_id: row.get(2)?,
                created_at: row.get(3)?,
            })
        })?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    #[cfg(test)]
    pub fn execute(&self, sql: &str) -> Result<(), AppError> {
        self.conn()?.execute_batch(sql)?;
        Ok(())
    }
}

impl Store for SqliteStore {
    fn insert_preview(&self, preview: &Preview) -> Result<(), AppError> {
        let keywords = serde_json::to_string(&preview.keywords)?;
        let metadata = preview
            .metadata
            .as_ref()
            .map(serde_json::to_string)
            .transpose()?;

        self.conn()?.execute(
            "INSERT INTO previews (id, title, description, thumbnail, keywords, metadata)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                preview.id,
                preview.title,
                preview.description,
                preview.thumbnail,
                keywords,
                metadata
            ],
        )?;
        Ok(())
    }

    fn find_preview(&self, id: &str) -> Result<Option<Preview>, AppError> {
        let row = self
            .conn()?
            .query_row(
                "SELECT id, title, description, thumbnail, keywords, metadata
                 FROM previews WHERE id = ?1",
                [id],
                |row| {
                    Ok((
                        row.get::<_, String>(0)?,
                        row.get::<_, Option<String>>(1)?,
                        row.get::<_, Option<String>>(2)?,
                        row.get::<_, Option<String>>(3)?,
                        row.get::<_, String>(4)?,
                        row.get::<_, Option<String>>(5)?,
                    ))
                },
            )
            .optional()?;

        let Some((id, title, description, thumbnail, keywords, metadata)) = row else {
            return Ok(None);
        };

        let metadata = metadata
            .map(|m| serde_json::from_str::<BTreeMap<String, String>>(&m))
            .transpose()?;

        Ok(Some(Preview {
            id,
            title,
            description,
            thumbnail,
            keywords: serde_json::from_str(&keywords)?,
            metadata,
        }))
    }

    fn find_token_owner(&self, token: &str) -> Result<Option<String>, AppError> {
        let owner = self
            .conn()?
            .query_row(
                "SELECT user_id FROM api_tokens WHERE token = ?1",
                [token],
                |row| row.get(0),
            )
            .optional()?;
        Ok(owner)
    }

    fn insert_user_url(&self, user_url: &UserUrl) -> Result<(), AppError> {
        self.conn()?.execute(
            "INSERT INTO user_urls (id, url, user_id, created_at) VALUES (?1, ?2, ?3, ?4)",
            params![user_url.id, user_url.url, user_url.user_id, user_url.created_at],
        )?;
        Ok(())
    }
}
