//! Users repository and the error contract shared with user clients.
//!
//! # Responsibility
//! - Expose the five user operations to application code.
//! - Forward each call to one `UserClient` method and return its outcome.
//!
//! # Invariants
//! - The repository never validates, retries or translates errors.
//! - Missing rows surface as `RepoError::NotFound` only on writes.

mod error;
pub mod users_repo;

pub use error::{RepoError, RepoResult};
