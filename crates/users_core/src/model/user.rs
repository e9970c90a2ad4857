//! User record and the typed inputs accepted by user clients.

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Stable identifier of a user row.
pub type UserId = Uuid;

/// One row of the `users` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Assigned by the client on insert, never reused.
    pub id: UserId,
    /// Unique across all rows.
    pub email: String,
    pub name: Option<String>,
    /// Unix epoch milliseconds, assigned by the database.
    pub created_at: i64,
    /// Unix epoch milliseconds, refreshed on every update.
    pub updated_at: i64,
}

/// Fields required to insert a new user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserCreateInput {
    pub email: String,
    #[serde(default)]
    pub name: Option<String>,
}

impl UserCreateInput {
    pub fn new(email: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            name: None,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }
}

/// Partial update of a user row.
///
/// `None` leaves a column untouched. For `name`, `Some(None)` clears it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserUpdateInput {
    pub email: Option<String>,
    pub name: Option<Option<String>>,
}

impl UserUpdateInput {
    /// Returns whether no column would change (only `updated_at` is touched).
    pub fn is_empty(&self) -> bool {
        self.email.is_none() && self.name.is_none()
    }
}

/// Filter guaranteed by schema to match at most one row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserWhereUniqueInput {
    Id(UserId),
    Email(String),
}

impl Display for UserWhereUniqueInput {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Id(id) => write!(f, "id={id}"),
            Self::Email(email) => write!(f, "email={email}"),
        }
    }
}

/// Text predicate applied to one column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StringFilter {
    Equals(String),
    Contains(String),
    StartsWith(String),
    EndsWith(String),
}

/// Filter matching zero or more rows. Present conditions are AND-ed.
///
/// The default value matches every row.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserWhereInput {
    pub id: Option<UserId>,
    pub email: Option<StringFilter>,
    pub name: Option<StringFilter>,
    /// `Some(true)` keeps rows without a name, `Some(false)` rows with one.
    pub name_is_null: Option<bool>,
}

/// Sort direction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

/// Sortable user columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserOrderField {
    Id,
    Email,
    Name,
    CreatedAt,
    UpdatedAt,
}

/// One ordering term.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UserOrderByInput {
    pub field: UserOrderField,
    pub direction: SortOrder,
}

impl UserOrderByInput {
    pub fn asc(field: UserOrderField) -> Self {
        Self {
            field,
            direction: SortOrder::Asc,
        }
    }

    pub fn desc(field: UserOrderField) -> Self {
        Self {
            field,
            direction: SortOrder::Desc,
        }
    }
}

/// Find-many query handed to a user client.
///
/// Ordering terms apply in sequence; clients append `id ASC` as the final
/// tie-breaker. `cursor` resumes strictly after the referenced row.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserListQuery {
    pub cursor: Option<UserWhereUniqueInput>,
    pub filter: Option<UserWhereInput>,
    pub order_by: Vec<UserOrderByInput>,
    pub skip: Option<u32>,
    pub take: Option<u32>,
}
