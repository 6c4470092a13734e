//! `job_details` table.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::SqliteConnection;

use super::{Table, Writable};
use crate::models::{JobDetail, JobDetailDraft};
use crate::{DbError, Kind};

impl Table for JobDetail {
    const KIND: Kind = Kind::JobDetail;
    const COLUMNS: &'static str =
        "job_detail_id, title, description, job_id, job_status_id, created_at, modified_at";

    fn id(&self) -> i64 {
        self.job_detail_id
    }
}

#[async_trait]
impl Writable for JobDetail {
    type Draft = JobDetailDraft;

    async fn insert(
        conn: &mut SqliteConnection,
        draft: &JobDetailDraft,
        now: DateTime<Utc>,
    ) -> Result<Option<JobDetail>, DbError> {
        let row = sqlx::query_as::<_, JobDetail>(
            r#"
            INSERT INTO job_details
                (title, description, job_id, job_status_id, created_at, modified_at)
            VALUES (?, ?, ?, ?, ?, ?)
            RETURNING job_detail_id, title, description, job_id, job_status_id,
                      created_at, modified_at
            "#,
        )
        .bind(&draft.title)
        .bind(&draft.description)
        .bind(draft.job_id)
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
        draft: &JobDetailDraft,
        now: DateTime<Utc>,
    ) -> Result<bool, DbError> {
        let result = sqlx::query(
            r#"
            UPDATE job_details
            SET title = ?, description = ?, job_id = ?, job_status_id = ?, modified_at = ?
            WHERE job_detail_id = ?
            "#,
        )
        .bind(&draft.title)
        .bind(&draft.description)
        .bind(draft.job_id)
        .bind(draft.job_status_id)
        .bind(now)
        .bind(id)
        .execute(conn)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    fn references(draft: &JobDetailDraft) -> Vec<(Kind, i64)> {
        [
            draft.job_id.map(|id| (Kind::Job, id)),
            draft.job_status_id.map(|id| (Kind::JobStatus, id)),
        ]
        .into_iter()
        .flatten()
        .collect()
    }
}
