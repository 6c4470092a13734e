//! Write-side shape of each entity.
//!
//! An `*Input` is what a caller submits for a create or a full-replace
//! update.  Required fields are `Option` so that an absent value surfaces as
//! a [`WorkshopError::Validation`] instead of a deserialization failure.
//! [`Resource::draft`] turns an input into the store-ready draft.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use db::models::{
    Customer, CustomerDraft, Job, JobDetail, JobDetailDraft, JobDraft, JobStatus, JobStatusDraft,
    Role, RoleDraft, User, UserDraft, Vehicle, VehicleDraft,
};
use db::Writable;

use crate::WorkshopError;

/// An entity exposed through the generic operations in [`crate::service`].
pub trait Resource: Writable + Serialize {
    type Input: DeserializeOwned + Send + 'static;

    /// Validate required scalars and build the draft.
    fn draft(input: Self::Input) -> Result<Self::Draft, WorkshopError>;
}

/// A required text field must be present and not blank.
fn required(value: Option<String>, field: &str) -> Result<String, WorkshopError> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(WorkshopError::Validation(format!("{field} is required"))),
    }
}

// ---------------------------------------------------------------------------
// Inputs
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct RoleInput {
    pub role_name: Option<String>,
    pub role_description: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct UserInput {
    pub username: Option<String>,
    pub password_hash: Option<String>,
    pub role_id: Option<i64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct CustomerInput {
    pub name: Option<String>,
    pub pic_contact: Option<String>,
    pub address: Option<String>,
    pub user_id: Option<i64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct VehicleInput {
    pub registration_number: Option<String>,
    pub model: Option<String>,
    pub brand: Option<String>,
    /// Absent means 0.
    #[serde(alias = "Milleage")]
    pub mileage: Option<i64>,
    pub customer_id: Option<i64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct JobStatusInput {
    pub job_status_title: Option<String>,
    pub job_status_description: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct JobInput {
    pub job_summary: Option<String>,
    pub customer_id: Option<i64>,
    pub vehicle_id: Option<i64>,
    pub job_status_id: Option<i64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct JobDetailInput {
    pub title: Option<String>,
    pub description: Option<String>,
    pub job_id: Option<i64>,
    pub job_status_id: Option<i64>,
}

// ---------------------------------------------------------------------------
// Resource impls
// ---------------------------------------------------------------------------

impl Resource for Role {
    type Input = RoleInput;

    fn draft(input: RoleInput) -> Result<RoleDraft, WorkshopError> {
        Ok(RoleDraft {
            role_name: required(input.role_name, "RoleName")?,
            role_description: input.role_description,
        })
    }
}

impl Resource for User {
    type Input = UserInput;

    fn draft(input: UserInput) -> Result<UserDraft, WorkshopError> {
        Ok(UserDraft {
            username: required(input.username, "Username")?,
            password_hash: input.password_hash,
            role_id: input.role_id,
        })
    }
}

impl Resource for Customer {
    type Input = CustomerInput;

    fn draft(input: CustomerInput) -> Result<CustomerDraft, WorkshopError> {
        Ok(CustomerDraft {
            name: required(input.name, "Name")?,
            pic_contact: input.pic_contact,
            address: input.address,
            user_id: input.user_id,
        })
    }
}

impl Resource for Vehicle {
    type Input = VehicleInput;

    fn draft(input: VehicleInput) -> Result<VehicleDraft, WorkshopError> {
        let mileage = input.mileage.unwrap_or(0);
        if mileage < 0 {
            return Err(WorkshopError::Validation(format!(
                "Mileage must not be negative, got {mileage}"
            )));
        }

        Ok(VehicleDraft {
            registration_number: required(input.registration_number, "RegistrationNumber")?,
            model: input.model,
            brand: input.brand,
            mileage,
            customer_id: input.customer_id,
        })
    }
}

impl Resource for JobStatus {
    type Input = JobStatusInput;

    fn draft(input: JobStatusInput) -> Result<JobStatusDraft, WorkshopError> {
        Ok(JobStatusDraft {
            job_status_title: required(input.job_status_title, "JobStatusTitle")?,
            job_status_description: input.job_status_description,
        })
    }
}

impl Resource for Job {
    type Input = JobInput;

    fn draft(input: JobInput) -> Result<JobDraft, WorkshopError> {
        Ok(JobDraft {
            job_summary: required(input.job_summary, "JobSummary")?,
            customer_id: input.customer_id,
            vehicle_id: input.vehicle_id,
            job_status_id: input.job_status_id,
        })
    }
}

impl Resource for JobDetail {
    type Input = JobDetailInput;

    fn draft(input: JobDetailInput) -> Result<JobDetailDraft, WorkshopError> {
        Ok(JobDetailDraft {
            title: required(input.title, "Title")?,
            description: input.description,
            job_id: input.job_id,
            job_status_id: input.job_status_id,
        })
    }
}
