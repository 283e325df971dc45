use anyhow::Result;
use chrono::Utc;
use sqlx::{Sqlite, SqlitePool, Transaction};
use uuid::Uuid;

use crate::database::models::{NewUser, User, UserRole};
use crate::leave::Days;

const USER_COLUMNS: &str = r#"
    id,
    name,
    email,
    role,
    leave_balance,
    comp_off_balance,
    balance_version,
    leave_approver_id,
    parent_id,
    created_at,
    updated_at
"#;

#[derive(Clone)]
pub struct UserRepository {
    pool: SqlitePool,
}

impl UserRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn create_user(&self, input: NewUser, default_balance: &Days) -> Result<User> {
        let now = Utc::now();
        let query = format!(
            r#"
            INSERT INTO users (
                id, name, email, role, leave_balance, comp_off_balance,
                balance_version, leave_approver_id, parent_id, created_at, updated_at
            )
            VALUES (?, ?, ?, ?, ?, ?, 0, ?, ?, ?, ?)
            RETURNING {USER_COLUMNS}
            "#
        );

        let user = sqlx::query_as::<_, User>(&query)
            .bind(Uuid::new_v4())
            .bind(input.name.trim())
            .bind(input.email.trim().to_lowercase())
            .bind(input.role.unwrap_or_default())
            .bind(input.leave_balance.unwrap_or_else(|| default_balance.clone()))
            .bind(input.comp_off_balance.unwrap_or_default())
            .bind(input.leave_approver_id)
            .bind(input.parent_id)
            .bind(now)
            .bind(now)
            .fetch_one(&self.pool)
            .await?;

        Ok(user)
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<User>> {
        let query = format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?");
        let user = sqlx::query_as::<_, User>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(user)
    }

    /// Read a user inside an open transaction, so the balance seen is the
    /// one the transaction will write against.
    pub async fn find_by_id_tx(
        &self,
        tx: &mut Transaction<'_, Sqlite>,
        id: Uuid,
    ) -> Result<Option<User>> {
        let query = format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?");
        let user = sqlx::query_as::<_, User>(&query)
            .bind(id)
            .fetch_optional(&mut **tx)
            .await?;

        Ok(user)
    }

    /// Takes the SQLite write lock before anything is read, so the snapshot
    /// that follows cannot go stale before the balance write. Returns false
    /// when the user does not exist.
    pub async fn lock_for_update(
        &self,
        tx: &mut Transaction<'_, Sqlite>,
        id: Uuid,
    ) -> Result<bool> {
        let result = sqlx::query("UPDATE users SET balance_version = balance_version WHERE id = ?")
            .bind(id)
            .execute(&mut **tx)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    pub async fn find_leave_managers(&self) -> Result<Vec<User>> {
        let query = format!(
            r#"
            SELECT {USER_COLUMNS}
            FROM users
            WHERE role IN (?, ?, ?)
            ORDER BY name
            "#
        );
        let users = sqlx::query_as::<_, User>(&query)
            .bind(UserRole::Admin)
            .bind(UserRole::Hr)
            .bind(UserRole::Manager)
            .fetch_all(&self.pool)
            .await?;

        Ok(users)
    }

    /// Users whose name contains `name` (case-insensitive for ASCII), or
    /// everyone when no name is given, alphabetically.
    pub async fn search_by_name(&self, name: Option<&str>) -> Result<Vec<User>> {
        let users = match name {
            Some(name) => {
                let pattern = format!(
                    "%{}%",
                    name.replace('\\', "\\\\")
                        .replace('%', "\\%")
                        .replace('_', "\\_")
                );
                let query = format!(
                    "SELECT {USER_COLUMNS} FROM users WHERE name LIKE ? ESCAPE '\\' ORDER BY name"
                );
                sqlx::query_as::<_, User>(&query)
                    .bind(pattern)
                    .fetch_all(&self.pool)
                    .await?
            }
            None => {
                let query = format!("SELECT {USER_COLUMNS} FROM users ORDER BY name");
                sqlx::query_as::<_, User>(&query)
                    .fetch_all(&self.pool)
                    .await?
            }
        };

        Ok(users)
    }

    pub async fn list_all(&self) -> Result<Vec<User>> {
        let query = format!("SELECT {USER_COLUMNS} FROM users ORDER BY created_at");
        let users = sqlx::query_as::<_, User>(&query)
            .fetch_all(&self.pool)
            .await?;

        Ok(users)
    }
}
