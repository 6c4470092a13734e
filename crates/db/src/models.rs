//! Record structs that map 1-to-1 onto database tables.
//!
//! Records are flat: a relation is only ever the foreign-key id of the
//! referenced row, never an embedded object.  Walking relations is done
//! explicitly through [`crate::graph`].
//!
//! Each table also has a `*Draft`: the validated set of mutable fields a
//! create or full-replace update writes.  Identity and timestamps are never
//! part of a draft; the store assigns them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

// ---------------------------------------------------------------------------
// roles
// ---------------------------------------------------------------------------

/// A staff role (Admin, Mechanic, ...).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "PascalCase")]
pub struct Role {
    pub role_id: i64,
    pub role_name: String,
    pub role_description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub modified_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RoleDraft {
    pub role_name: String,
    pub role_description: Option<String>,
}

// ---------------------------------------------------------------------------
// users
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "PascalCase")]
pub struct User {
    pub user_id: i64,
    pub username: String,
    /// Opaque; never hashed or checked by this service.
    pub password_hash: Option<String>,
    pub role_id: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub modified_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct UserDraft {
    pub username: String,
    pub password_hash: Option<String>,
    pub role_id: Option<i64>,
}

// ---------------------------------------------------------------------------
// customers
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "PascalCase")]
pub struct Customer {
    pub customer_id: i64,
    pub name: String,
    /// Contact person at the customer.
    pub pic_contact: Option<String>,
    pub address: Option<String>,
    pub user_id: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub modified_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CustomerDraft {
    pub name: String,
    pub pic_contact: Option<String>,
    pub address: Option<String>,
    pub user_id: Option<i64>,
}

// ---------------------------------------------------------------------------
// vehicles
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "PascalCase")]
pub struct Vehicle {
    pub vehicle_id: i64,
    pub registration_number: String,
    pub model: Option<String>,
    pub brand: Option<String>,
    #[serde(alias = "Milleage")]
    pub mileage: i64,
    pub customer_id: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub modified_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct VehicleDraft {
    pub registration_number: String,
    pub model: Option<String>,
    pub brand: Option<String>,
    pub mileage: i64,
    pub customer_id: Option<i64>,
}

// ---------------------------------------------------------------------------
// job_statuses
// ---------------------------------------------------------------------------

/// A named job state (Pending, In Progress, ...), referenced by both jobs
/// and job details.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "PascalCase")]
pub struct JobStatus {
    pub job_status_id: i64,
    pub job_status_title: String,
    pub job_status_description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub modified_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct JobStatusDraft {
    pub job_status_title: String,
    pub job_status_description: Option<String>,
}

// ---------------------------------------------------------------------------
// jobs
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "PascalCase")]
pub struct Job {
    pub job_id: i64,
    pub job_summary: String,
    pub customer_id: Option<i64>,
    pub vehicle_id: Option<i64>,
    pub job_status_id: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub modified_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct JobDraft {
    pub job_summary: String,
    pub customer_id: Option<i64>,
    pub vehicle_id: Option<i64>,
    pub job_status_id: Option<i64>,
}

// ---------------------------------------------------------------------------
// job_details
// ---------------------------------------------------------------------------

/// A line item of a job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "PascalCase")]
pub struct JobDetail {
    pub job_detail_id: i64,
    pub title: String,
    pub description: Option<String>,
    pub job_id: Option<i64>,
    pub job_status_id: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub modified_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct JobDetailDraft {
    pub title: String,
    pub description: Option<String>,
    pub job_id: Option<i64>,
    pub job_status_id: Option<i64>,
}
