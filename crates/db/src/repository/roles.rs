//! `roles` table.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::SqliteConnection;

use super::{Table, Writable};
use crate::models::{Role, RoleDraft};
use crate::{DbError, Kind};

impl Table for Role {
    const KIND: Kind = Kind::Role;
    const COLUMNS: &'static str =
        "role_id, role_name, role_description, created_at, modified_at";

    fn id(&self) -> i64 {
        self.role_id
    }
}

#[async_trait]
impl Writable for Role {
    type Draft = RoleDraft;

    async fn insert(
        conn: &mut SqliteConnection,
        draft: &RoleDraft,
        now: DateTime<Utc>,
    ) -> Result<Option<Role>, DbError> {
        let row = sqlx::query_as::<_, Role>(
            r#"
            INSERT INTO roles (role_name, role_description, created_at, modified_at)
            VALUES (?, ?, ?, ?)
            RETURNING role_id, role_name, role_description, created_at, modified_at
            "#,
        )
        .bind(&draft.role_name)
        .bind(&draft.role_description)
        .bind(now)
        .bind(now)
        .fetch_optional(conn)
        .await?;

        Ok(row)
    }

    async fn update(
        conn: &mut SqliteConnection,
        id: i64,
        draft: &RoleDraft,
        now: DateTime<Utc>,
    ) -> Result<bool, DbError> {
        let result = sqlx::query(
            r#"
            UPDATE roles
            SET role_name = ?, role_description = ?, modified_at = ?
            WHERE role_id = ?
            "#,
        )
        .bind(&draft.role_name)
        .bind(&draft.role_description)
        .bind(now)
        .bind(id)
        .execute(conn)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    fn references(_draft: &RoleDraft) -> Vec<(Kind, i64)> {
        Vec::new()
    }
}
