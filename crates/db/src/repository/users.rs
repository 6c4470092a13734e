//! `users` table.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::SqliteConnection;

use super::{Table, Writable};
use crate::models::{User, UserDraft};
use crate::{DbError, Kind};

impl Table for User {
    const KIND: Kind = Kind::User;
    const COLUMNS: &'static str =
        "user_id, username, password_hash, role_id, created_at, modified_at";

    fn id(&self) -> i64 {
        self.user_id
    }
}

#[async_trait]
impl Writable for User {
    type Draft = UserDraft;

    async fn insert(
        conn: &mut SqliteConnection,
        draft: &UserDraft,
        now: DateTime<Utc>,
    ) -> Result<Option<User>, DbError> {
        let row = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (username, password_hash, role_id, created_at, modified_at)
            VALUES (?, ?, ?, ?, ?)
            RETURNING user_id, username, password_hash, role_id, created_at, modified_at
            "#,
        )
        .bind(&draft.username)
        .bind(&draft.password_hash)
        .bind(draft.role_id)
        .bind(now)
        .bind(now)
        .fetch_optional(conn)
        .await?;

        Ok(row)
    }

    async fn update(
        conn: &mut SqliteConnection,
        id: i64,
        draft: &UserDraft,
        now: DateTime<Utc>,
    ) -> Result<bool, DbError> {
        let result = sqlx::query(
            r#"
            UPDATE users
            SET username = ?, password_hash = ?, role_id = ?, modified_at = ?
            WHERE user_id = ?
            "#,
        )
        .bind(&draft.username)
        .bind(&draft.password_hash)
        .bind(draft.role_id)
        .bind(now)
        .bind(id)
        .execute(conn)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    fn references(draft: &UserDraft) -> Vec<(Kind, i64)> {
        draft.role_id.map(|id| (Kind::Role, id)).into_iter().collect()
    }
}
