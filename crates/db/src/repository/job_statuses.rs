//! `job_statuses` table.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::SqliteConnection;

use super::{Table, Writable};
use crate::models::{JobStatus, JobStatusDraft};
use crate::{DbError, Kind};

impl Table for JobStatus {
    const KIND: Kind = Kind::JobStatus;
    const COLUMNS: &'static str =
        "job_status_id, job_status_title, job_status_description, created_at, modified_at";

    fn id(&self) -> i64 {
        self.job_status_id
    }
}

#[async_trait]
impl Writable for JobStatus {
    type Draft = JobStatusDraft;

    async fn insert(
        conn: &mut SqliteConnection,
        draft: &JobStatusDraft,
        now: DateTime<Utc>,
    ) -> Result<Option<JobStatus>, DbError> {
        let row = sqlx::query_as::<_, JobStatus>(
            r#"
            INSERT INTO job_statuses
                (job_status_title, job_status_description, created_at, modified_at)
            VALUES (?, ?, ?, ?)
            RETURNING job_status_id, job_status_title, job_status_description,
                      created_at, modified_at
            "#,
        )
        .bind(&draft.job_status_title)
        .bind(&draft.job_status_description)
        .bind(now)
        .bind(now)
        .fetch_optional(conn)
        .await?;

        Ok(row)
    }

    async fn update(
        conn: &mut SqliteConnection,
        id: i64,
        draft: &JobStatusDraft,
        now: DateTime<Utc>,
    ) -> Result<bool, DbError> {
        let result = sqlx::query(
            r#"
            UPDATE job_statuses
            SET job_status_title = ?, job_status_description = ?, modified_at = ?
            WHERE job_status_id = ?
            "#,
        )
        .bind(&draft.job_status_title)
        .bind(&draft.job_status_description)
        .bind(now)
        .bind(id)
        .execute(conn)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    fn references(_draft: &JobStatusDraft) -> Vec<(Kind, i64)> {
        Vec::new()
    }
}
