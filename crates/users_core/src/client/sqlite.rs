//! SQLite implementation of `UserClient`.
//!
//! # Responsibility
//! - Translate typed user inputs into parameterized SQL.
//! - Decode `users` rows and classify engine failures.
//!
//! # Invariants
//! - Mutations are single statements with `RETURNING`, so the returned row
//!   is exactly what was written or removed.
//! - Result ordering always ends with `id ASC` unless `id` is already ordered.

use super::UserClient;
use crate::db::migrations::latest_version;
use crate::model::user::{
    SortOrder, StringFilter, User, UserCreateInput, UserListQuery, UserOrderByInput,
    UserOrderField, UserUpdateInput, UserWhereInput, UserWhereUniqueInput,
};
use crate::repo::{RepoError, RepoResult};
use log::{debug, warn};
use rusqlite::types::Value;
use rusqlite::{params_from_iter, Connection, Row};
use std::time::Instant;
use uuid::Uuid;

const USER_COLUMNS: &str = "id, email, name, created_at, updated_at";
const NOW_MS_SQL: &str = "CAST((julianday('now') - 2440587.5) * 86400000 AS INTEGER)";
const REQUIRED_COLUMNS: [&str; 5] = ["id", "email", "name", "created_at", "updated_at"];

/// `UserClient` over a borrowed, migrated SQLite connection.
pub struct SqliteUserClient<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteUserClient<'conn> {
    /// Constructs a client after checking the connection carries the
    /// current `users` schema.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_users_connection_ready(conn)?;
        Ok(Self { conn })
    }

    fn select_unique(&self, filter: &UserWhereUniqueInput) -> RepoResult<Option<User>> {
        let (column, key) = unique_key(filter);
        query_one(
            self.conn,
            &format!("SELECT {USER_COLUMNS} FROM users WHERE {column} = ?;"),
            vec![key],
        )
    }

    fn select_many(&self, query: &UserListQuery) -> RepoResult<Vec<User>> {
        let order = effective_order(&query.order_by);
        let mut sql = format!("SELECT {USER_COLUMNS} FROM users WHERE 1 = 1");
        let mut binds: Vec<Value> = Vec::new();

        if let Some(filter) = &query.filter {
            push_filter(&mut sql, &mut binds, filter);
        }

        if let Some(cursor) = &query.cursor {
            let Some(anchor) = self.select_unique(cursor)? else {
                return Ok(Vec::new());
            };
            push_cursor(&mut sql, &mut binds, &order, &anchor);
        }

        let order_sql = order
            .iter()
            .map(|term| {
                format!(
                    "{} {}",
                    field_column(term.field),
                    direction_sql(term.direction)
                )
            })
            .collect::<Vec<_>>()
            .join(", ");
        sql.push_str(" ORDER BY ");
        sql.push_str(&order_sql);

        match (query.take, query.skip) {
            (Some(take), skip) => {
                sql.push_str(" LIMIT ?");
                binds.push(Value::Integer(i64::from(take)));
                if let Some(skip) = skip.filter(|skip| *skip > 0) {
                    sql.push_str(" OFFSET ?");
                    binds.push(Value::Integer(i64::from(skip)));
                }
            }
            (None, Some(skip)) if skip > 0 => {
                sql.push_str(" LIMIT -1 OFFSET ?");
                binds.push(Value::Integer(i64::from(skip)));
            }
            (None, _) => {}
        }

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(binds))?;
        let mut users = Vec::new();
        while let Some(row) = rows.next()? {
            users.push(parse_user_row(row)?);
        }

        Ok(users)
    }
}

impl UserClient for SqliteUserClient<'_> {
    fn create(&self, data: &UserCreateInput) -> RepoResult<User> {
        let started_at = Instant::now();
        let result = query_one(
            self.conn,
            &format!(
                "INSERT INTO users (id, email, name) VALUES (?, ?, ?) RETURNING {USER_COLUMNS};"
            ),
            vec![
                Value::Text(Uuid::new_v4().to_string()),
                Value::Text(data.email.clone()),
                optional_text(data.name.as_deref()),
            ],
        )
        .and_then(|created| {
            created.ok_or_else(|| RepoError::InvalidData("insert returned no row".to_string()))
        });
        observe("user_create", started_at, result)
    }

    fn find_many(&self, query: &UserListQuery) -> RepoResult<Vec<User>> {
        let started_at = Instant::now();
        let result = self.select_many(query);
        if let Ok(users) = &result {
            debug!(
                "event=user_find_many module=client rows={} cursor={} take={:?} skip={:?}",
                users.len(),
                query.cursor.is_some(),
                query.take,
                query.skip
            );
        }
        observe("user_find_many", started_at, result)
    }

    fn find_unique(&self, filter: &UserWhereUniqueInput) -> RepoResult<Option<User>> {
        let started_at = Instant::now();
        let result = self.select_unique(filter);
        observe("user_find_unique", started_at, result)
    }

    fn update(&self, filter: &UserWhereUniqueInput, data: &UserUpdateInput) -> RepoResult<User> {
        let started_at = Instant::now();
        if data.is_empty() {
            debug!("event=user_update module=client status=start touch_only=true");
        }
        let mut assignments: Vec<String> = Vec::new();
        let mut binds: Vec<Value> = Vec::new();

        if let Some(email) = &data.email {
            assignments.push("email = ?".to_string());
            binds.push(Value::Text(email.clone()));
        }
        if let Some(name) = &data.name {
            assignments.push("name = ?".to_string());
            binds.push(optional_text(name.as_deref()));
        }
        assignments.push(format!("updated_at = {NOW_MS_SQL}"));

        let (column, key) = unique_key(filter);
        binds.push(key);

        let result = query_one(
            self.conn,
            &format!(
                "UPDATE users SET {} WHERE {column} = ? RETURNING {USER_COLUMNS};",
                assignments.join(", ")
            ),
            binds,
        )
        .and_then(|updated| updated.ok_or_else(|| RepoError::NotFound(filter.to_string())));
        observe("user_update", started_at, result)
    }

    fn delete(&self, filter: &UserWhereUniqueInput) -> RepoResult<User> {
        let started_at = Instant::now();
        let (column, key) = unique_key(filter);
        let result = query_one(
            self.conn,
            &format!("DELETE FROM users WHERE {column} = ? RETURNING {USER_COLUMNS};"),
            vec![key],
        )
        .and_then(|deleted| deleted.ok_or_else(|| RepoError::NotFound(filter.to_string())));
        observe("user_delete", started_at, result)
    }
}

fn observe<T>(event: &str, started_at: Instant, result: RepoResult<T>) -> RepoResult<T> {
    match &result {
        Ok(_) => debug!(
            "event={event} module=client status=ok duration_ms={}",
            started_at.elapsed().as_millis()
        ),
        Err(err) => warn!(
            "event={event} module=client status=error duration_ms={} error_code={}",
            started_at.elapsed().as_millis(),
            err.code()
        ),
    }
    result
}

fn query_one(conn: &Connection, sql: &str, binds: Vec<Value>) -> RepoResult<Option<User>> {
    let mut stmt = conn.prepare(sql)?;
    let mut rows = stmt.query(params_from_iter(binds))?;
    match rows.next()? {
        Some(row) => Ok(Some(parse_user_row(row)?)),
        None => Ok(None),
    }
}

fn parse_user_row(row: &Row<'_>) -> RepoResult<User> {
    let id_text: String = row.get("id")?;
    let id = Uuid::parse_str(&id_text).map_err(|_| {
        RepoError::InvalidData(format!("invalid uuid value `{id_text}` in users.id"))
    })?;

    Ok(User {
        id,
        email: row.get("email")?,
        name: row.get("name")?,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    })
}

fn unique_key(filter: &UserWhereUniqueInput) -> (&'static str, Value) {
    match filter {
        UserWhereUniqueInput::Id(id) => ("id", Value::Text(id.to_string())),
        UserWhereUniqueInput::Email(email) => ("email", Value::Text(email.clone())),
    }
}

fn push_filter(sql: &mut String, binds: &mut Vec<Value>, filter: &UserWhereInput) {
    if let Some(id) = filter.id {
        sql.push_str(" AND id = ?");
        binds.push(Value::Text(id.to_string()));
    }
    if let Some(email) = &filter.email {
        push_string_filter(sql, binds, "email", email);
    }
    if let Some(name) = &filter.name {
        push_string_filter(sql, binds, "name", name);
    }
    match filter.name_is_null {
        Some(true) => sql.push_str(" AND name IS NULL"),
        Some(false) => sql.push_str(" AND name IS NOT NULL"),
        None => {}
    }
}

// LIKE patterns follow SQLite semantics: ASCII case-insensitive.
fn push_string_filter(
    sql: &mut String,
    binds: &mut Vec<Value>,
    column: &str,
    filter: &StringFilter,
) {
    let (clause, bind) = match filter {
        StringFilter::Equals(value) => (format!(" AND {column} = ?"), value.clone()),
        StringFilter::Contains(value) => (
            format!(" AND {column} LIKE ? ESCAPE '\\'"),
            format!("%{}%", escape_like(value)),
        ),
        StringFilter::StartsWith(value) => (
            format!(" AND {column} LIKE ? ESCAPE '\\'"),
            format!("{}%", escape_like(value)),
        ),
        StringFilter::EndsWith(value) => (
            format!(" AND {column} LIKE ? ESCAPE '\\'"),
            format!("%{}", escape_like(value)),
        ),
    };
    sql.push_str(&clause);
    binds.push(Value::Text(bind));
}

fn escape_like(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for ch in value.chars() {
        if matches!(ch, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped
}

fn effective_order(requested: &[UserOrderByInput]) -> Vec<UserOrderByInput> {
    let mut order = requested.to_vec();
    if !order.iter().any(|term| term.field == UserOrderField::Id) {
        order.push(UserOrderByInput::asc(UserOrderField::Id));
    }
    order
}

/// Keyset predicate selecting rows strictly after `anchor` in `order`.
///
/// Expands to `(a > ?) OR (a = ? AND b > ?) OR ...`, with NULL handling that
/// mirrors SQLite sort order (NULL first ascending, last descending).
fn push_cursor(
    sql: &mut String,
    binds: &mut Vec<Value>,
    order: &[UserOrderByInput],
    anchor: &User,
) {
    let mut disjuncts: Vec<String> = Vec::new();
    for (index, term) in order.iter().enumerate() {
        let mut conjuncts: Vec<String> = Vec::new();
        for earlier in &order[..index] {
            let value = field_value(anchor, earlier.field);
            conjuncts.push(equal_fragment(field_column(earlier.field), &value, binds));
        }
        let value = field_value(anchor, term.field);
        conjuncts.push(after_fragment(
            field_column(term.field),
            term.direction,
            &value,
            binds,
        ));
        disjuncts.push(format!("({})", conjuncts.join(" AND ")));
    }

    sql.push_str(" AND (");
    sql.push_str(&disjuncts.join(" OR "));
    sql.push(')');
}

fn equal_fragment(column: &str, value: &Value, binds: &mut Vec<Value>) -> String {
    if matches!(value, Value::Null) {
        return format!("{column} IS NULL");
    }
    binds.push(value.clone());
    format!("{column} = ?")
}

fn after_fragment(
    column: &str,
    direction: SortOrder,
    value: &Value,
    binds: &mut Vec<Value>,
) -> String {
    match (direction, value) {
        (SortOrder::Asc, Value::Null) => format!("{column} IS NOT NULL"),
        (SortOrder::Desc, Value::Null) => "0".to_string(),
        (SortOrder::Asc, _) => {
            binds.push(value.clone());
            format!("{column} > ?")
        }
        (SortOrder::Desc, _) => {
            binds.push(value.clone());
            format!("({column} < ? OR {column} IS NULL)")
        }
    }
}

fn field_value(user: &User, field: UserOrderField) -> Value {
    match field {
        UserOrderField::Id => Value::Text(user.id.to_string()),
        UserOrderField::Email => Value::Text(user.email.clone()),
        UserOrderField::Name => optional_text(user.name.as_deref()),
        UserOrderField::CreatedAt => Value::Integer(user.created_at),
        UserOrderField::UpdatedAt => Value::Integer(user.updated_at),
    }
}

fn field_column(field: UserOrderField) -> &'static str {
    match field {
        UserOrderField::Id => "id",
        UserOrderField::Email => "email",
        UserOrderField::Name => "name",
        UserOrderField::CreatedAt => "created_at",
        UserOrderField::UpdatedAt => "updated_at",
    }
}

fn direction_sql(direction: SortOrder) -> &'static str {
    match direction {
        SortOrder::Asc => "ASC",
        SortOrder::Desc => "DESC",
    }
}

fn optional_text(value: Option<&str>) -> Value {
    value.map_or(Value::Null, |text| Value::Text(text.to_string()))
}

fn ensure_users_connection_ready(conn: &Connection) -> RepoResult<()> {
    let expected_version = latest_version();
    let actual_version: u32 = conn.query_row("PRAGMA user_version;", [], |row| row.get(0))?;
    if actual_version != expected_version {
        return Err(RepoError::UninitializedConnection {
            expected_version,
            actual_version,
        });
    }

    if !table_exists(conn, "users")? {
        return Err(RepoError::MissingRequiredTable("users"));
    }

    for column in REQUIRED_COLUMNS {
        if !table_has_column(conn, "users", column)? {
            return Err(RepoError::MissingRequiredColumn {
                table: "users",
                column,
            });
        }
    }

    Ok(())
}

fn table_exists(conn: &Connection, table: &str) -> RepoResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM sqlite_master
            WHERE type = 'table' AND name = ?1
        );",
        [table],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}

fn table_has_column(conn: &Connection, table: &str, column: &str) -> RepoResult<bool> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({table});"))?;
    let mut rows = stmt.query([])?;
    while let Some(row) = rows.next()? {
        let current: String = row.get(1)?;
        if current == column {
            return Ok(true);
        }
    }
    Ok(false)
}
