//! Record and query-argument types for the users store.
//!
//! # Responsibility
//! - Define the `User` record as persisted by the database.
//! - Define typed filter, ordering and mutation inputs consumed by clients.
//!
//! # Invariants
//! - Every record is identified by a stable `UserId`.
//! - These types carry no validation; constraints live in the database.

pub mod user;
