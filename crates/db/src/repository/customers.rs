//! `customers` table.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::SqliteConnection;

use super::{Table, Writable};
use crate::models::{Customer, CustomerDraft};
use crate::{DbError, Kind};

impl Table for Customer {
    const KIND: Kind = Kind::Customer;
    const COLUMNS: &'static str =
        "customer_id, name, pic_contact, address, user_id, created_at, modified_at";

    fn id(&self) -> i64 {
        self.customer_id
    }
}

#[async_trait]
impl Writable for Customer {
    type Draft = CustomerDraft;

    async fn insert(
        conn: &mut SqliteConnection,
        draft: &CustomerDraft,
        now: DateTime<Utc>,
    ) -> Result<Option<Customer>, DbError> {
        let row = sqlx::query_as::<_, Customer>(
            r#"
            INSERT INTO customers (name, pic_contact, address, user_id, created_at, modified_at)
            VALUES (?, ?, ?, ?, ?, ?)
            RETURNING customer_id, name, pic_contact, address, user_id, created_at, modified_at
            "#,
        )
        .bind(&draft.name)
        .bind(&draft.pic_contact)
        .bind(&draft.address)
        .bind(draft.user_id)
        .bind(now)
        .bind(now)
        .fetch_optional(conn)
        .await?;

        Ok(row)
    }

    async fn update(
        conn: &mut SqliteConnection,
        id: i64,
        draft: &CustomerDraft,
        now: DateTime<Utc>,
    ) -> Result<bool, DbError> {
        let result = sqlx::query(
            r#"
            UPDATE customers
            SET name = ?, pic_contact = ?, address = ?, user_id = ?, modified_at = ?
            WHERE customer_id = ?
            "#,
        )
        .bind(&draft.name)
        .bind(&draft.pic_contact)
        .bind(&draft.address)
        .bind(draft.user_id)
        .bind(now)
        .bind(id)
        .execute(conn)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    fn references(draft: &CustomerDraft) -> Vec<(Kind, i64)> {
        draft.user_id.map(|id| (Kind::User, id)).into_iter().collect()
    }
}
