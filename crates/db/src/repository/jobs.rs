//! `jobs` table.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::SqliteConnection;

use super::{Table, Writable};
use crate::models::{Job, JobDraft};
use crate::{DbError, Kind};

impl Table for Job {
    const KIND: Kind = Kind::Job;
    const COLUMNS: &'static str =
        "job_id, job_summary, customer_id, vehicle_id, job_status_id, created_at, modified_at";

    fn id(&self) -> i64 {
        self.job_id
    }
}

#[async_trait]
impl Writable for Job {
    type Draft = JobDraft;

    async fn insert(
        conn: &mut SqliteConnection,
        draft: &JobDraft,
        now: DateTime<Utc>,
    ) -> Result<Option<Job>, DbError> {
        let row = sqlx::query_as::<_, Job>(
            r#"
            INSERT INTO jobs
                (job_summary, customer_id, vehicle_id, job_status_id, created_at, modified_at)
            VALUES (?, ?, ?, ?, ?, ?)
            RETURNING job_id, job_summary, customer_id, vehicle_id, job_status_id,
                      created_at, modified_at
            "#,
        )
        .bind(&draft.job_summary)
        .bind(draft.customer_id)
        .bind(draft.vehicle_id)
        .bind(draft.job_status_id)
        .bind(now)
        .bind(now)
        .fetch_optional(conn)
        .await?;

        Ok(row)
    }

    async fn update(
        conn: &mut SqliteConnection,
        id: i64,
        draft: &JobDraft,
        now: DateTime<Utc>,
    ) -> Result<bool, DbError> {
        let result = sqlx::query(
            r#"
            UPDATE jobs
            SET job_summary = ?, customer_id = ?, vehicle_id = ?, job_status_id = ?,
                modified_at = ?
            WHERE job_id = ?
            "#,
        )
        .bind(&draft.job_summary)
        .bind(draft.customer_id)
        .bind(draft.vehicle_id)
        .bind(draft.job_status_id)
        .bind(now)
        .bind(id)
        .execute(conn)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    fn references(draft: &JobDraft) -> Vec<(Kind, i64)> {
        [
            draft.customer_id.map(|id| (Kind::Customer, id)),
            draft.vehicle_id.map(|id| (Kind::Vehicle, id)),
            draft.job_status_id.map(|id| (Kind::JobStatus, id)),
        ]
        .into_iter()
        .flatten()
        .collect()
    }
}
