//! Composition root for the users store.
//!
//! Owns the database connection and hands out repositories bound to it.

use crate::client::SqliteUserClient;
use crate::config::AppConfig;
use crate::db::{open_db, open_db_in_memory, DbResult};
use crate::repo::users_repo::UsersRepository;
use crate::repo::RepoResult;
use rusqlite::Connection;

/// Users module: one migrated connection shared by every repository it builds.
pub struct UsersModule {
    conn: Connection,
}

impl UsersModule {
    /// Opens the configured database (file or in-memory) and migrates it.
    pub fn open(config: &AppConfig) -> DbResult<Self> {
        let conn = match &config.db_path {
            Some(path) => open_db(path)?,
            None => open_db_in_memory()?,
        };
        Ok(Self { conn })
    }

    /// Wraps a connection opened elsewhere. Readiness is checked when a
    /// repository is requested.
    pub fn from_connection(conn: Connection) -> Self {
        Self { conn }
    }

    /// Builds a repository over this module's connection.
    pub fn users_repository(&self) -> RepoResult<UsersRepository<SqliteUserClient<'_>>> {
        let client = SqliteUserClient::try_new(&self.conn)?;
        Ok(UsersRepository::new(client))
    }

    /// Borrows the module's connection for work outside the repository,
    /// such as schema inspection or maintenance pragmas.
    pub fn connection(&self) -> &Connection {
        &self.conn
    }
}
