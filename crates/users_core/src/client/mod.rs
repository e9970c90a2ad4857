//! Record-oriented database clients for the `users` table.
//!
//! # Responsibility
//! - Define the client handle the users repository is constructed with.
//! - Keep SQL and row decoding behind that handle.
//!
//! # Invariants
//! - Each trait method is exactly one round trip against the store.
//! - Absence is `Ok(None)` for reads and `RepoError::NotFound` for writes.

mod sqlite;

pub use sqlite::SqliteUserClient;

use crate::model::user::{
    User, UserCreateInput, UserListQuery, UserUpdateInput, UserWhereUniqueInput,
};
use crate::repo::RepoResult;

/// Database-access handle for user rows.
pub trait UserClient {
    /// Inserts one row and returns it with every database-assigned field.
    fn create(&self, data: &UserCreateInput) -> RepoResult<User>;
    /// Returns every row matching `query`, fully materialized.
    fn find_many(&self, query: &UserListQuery) -> RepoResult<Vec<User>>;
    /// Returns the row matching `filter`, if any.
    fn find_unique(&self, filter: &UserWhereUniqueInput) -> RepoResult<Option<User>>;
    /// Applies `data` to the row matching `filter` and returns the new state.
    fn update(&self, filter: &UserWhereUniqueInput, data: &UserUpdateInput) -> RepoResult<User>;
    /// Removes the row matching `filter` and returns its last state.
    fn delete(&self, filter: &UserWhereUniqueInput) -> RepoResult<User>;
}

impl<C: UserClient + ?Sized> UserClient for &C {
    fn create(&self, data: &UserCreateInput) -> RepoResult<User> {
        (**self).create(data)
    }

    fn find_many(&self, query: &UserListQuery) -> RepoResult<Vec<User>> {
        (**self).find_many(query)
    }

    fn find_unique(&self, filter: &UserWhereUniqueInput) -> RepoResult<Option<User>> {
        (**self).find_unique(filter)
    }

    fn update(&self, filter: &UserWhereUniqueInput, data: &UserUpdateInput) -> RepoResult<User> {
        (**self).update(filter, data)
    }

    fn delete(&self, filter: &UserWhereUniqueInput) -> RepoResult<User> {
        (**self).delete(filter)
    }
}
