//! `vehicles` table.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::SqliteConnection;

use super::{Table, Writable};
use crate::models::{Vehicle, VehicleDraft};
use crate::{DbError, Kind};

impl Table for Vehicle {
    const KIND: Kind = Kind::Vehicle;
    const COLUMNS: &'static str = "vehicle_id, registration_number, model, brand, mileage, \
                                   customer_id, created_at, modified_at";

    fn id(&self) -> i64 {
        self.vehicle_id
    }
}

#[async_trait]
impl Writable for Vehicle {
    type Draft = VehicleDraft;

    async fn insert(
        conn: &mut SqliteConnection,
        draft: &VehicleDraft,
        now: DateTime<Utc>,
    ) -> Result<Option<Vehicle>, DbError> {
        let row = sqlx::query_as::<_, Vehicle>(
            r#"
            INSERT INTO vehicles
                (registration_number, model, brand, mileage, customer_id, created_at, modified_at)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            RETURNING vehicle_id, registration_number, model, brand, mileage,
                      customer_id, created_at, modified_at
            "#,
        )
        .bind(&draft.registration_number)
        .bind(&draft.model)
        .bind(&draft.brand)
        .bind(draft.mileage)
        .bind(draft.customer_id)
        .bind(now)
        .bind(now)
        .fetch_optional(conn)
        .await?;

        Ok(row)
    }

    async fn update(
        conn: &mut SqliteConnection,
        id: i64,
        draft: &VehicleDraft,
        now: DateTime<Utc>,
    ) -> Result<bool, DbError> {
        let result = sqlx::query(
            r#"
            UPDATE vehicles
            SET registration_number = ?, model = ?, brand = ?, mileage = ?,
                customer_id = ?, modified_at = ?
            WHERE vehicle_id = ?
            "#,
        )
        .bind(&draft.registration_number)
        .bind(&draft.model)
        .bind(&draft.brand)
        .bind(draft.mileage)
        .bind(draft.customer_id)
        .bind(now)
        .bind(id)
        .execute(conn)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    fn references(draft: &VehicleDraft) -> Vec<(Kind, i64)> {
        draft.customer_id.map(|id| (Kind::Customer, id)).into_iter().collect()
    }
}
