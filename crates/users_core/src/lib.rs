//! Data access for user records.
//!
//! `UsersRepository` forwards typed calls to a `UserClient`; `UsersModule`
//! wires the SQLite client to a migrated connection.

pub mod client;
pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod module;
pub mod repo;

pub use client::{SqliteUserClient, UserClient};
pub use config::AppConfig;
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::user::{
    SortOrder, StringFilter, User, UserCreateInput, UserId, UserListQuery, UserOrderByInput,
    UserOrderField, UserUpdateInput, UserWhereInput, UserWhereUniqueInput,
};
pub use module::UsersModule;
pub use repo::users_repo::{
    CreateUserArgs, DeleteUserArgs, GetUserArgs, GetUsersArgs, UpdateUserArgs, UsersRepository,
};
pub use repo::{RepoError, RepoResult};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
