//! Read projections served by the query endpoints.
//!
//! Each endpoint has a [`ViewTemplate`]: the root kind and the relation
//! paths to eager-load.  The graph is fetched once, then a builder walks it
//! and copies out only the fields the view exposes.  No template path
//! re-enters an ancestor kind, so views are trees and building them always
//! terminates.
//!
//! A null or dangling foreign key renders as `null`.  Child lists come out
//! in identity order, so projecting the same snapshot twice serializes to
//! the same bytes.

use chrono::{DateTime, Utc};
use serde::Serialize;

use db::graph::{self, Graph, Kind, Relation};
use db::models::{Customer, Job, JobDetail, User, Vehicle};
use db::DbPool;

use crate::WorkshopError;

// ---------------------------------------------------------------------------
// Templates
// ---------------------------------------------------------------------------

/// The relation paths one view needs, starting from `root`.
#[derive(Debug, Clone, Copy)]
pub struct ViewTemplate {
    pub root: Kind,
    pub paths: &'static [&'static [Relation]],
}

pub const CUSTOMER: ViewTemplate = ViewTemplate {
    root: Kind::Customer,
    paths: &[&[Relation::CustomerUser, Relation::UserRole]],
};

pub const CUSTOMER_VEHICLES: ViewTemplate = ViewTemplate {
    root: Kind::Customer,
    paths: &[
        &[Relation::CustomerUser, Relation::UserRole],
        &[Relation::CustomerVehicles],
    ],
};

pub const VEHICLE: ViewTemplate = ViewTemplate {
    root: Kind::Vehicle,
    paths: &[&[Relation::VehicleCustomer]],
};

pub const VEHICLE_OVERVIEW: ViewTemplate = ViewTemplate {
    root: Kind::Vehicle,
    paths: &[
        &[Relation::VehicleCustomer],
        &[Relation::VehicleJobs, Relation::JobStatus],
        &[Relation::VehicleJobs, Relation::JobDetails],
    ],
};

pub const VEHICLE_JOBS: ViewTemplate = ViewTemplate {
    root: Kind::Vehicle,
    paths: &[&[Relation::VehicleJobs, Relation::JobStatus]],
};

pub const VEHICLE_JOBS_AND_DETAILS: ViewTemplate = ViewTemplate {
    root: Kind::Vehicle,
    paths: &[
        &[Relation::VehicleJobs, Relation::JobStatus],
        &[Relation::VehicleJobs, Relation::JobDetails, Relation::DetailStatus],
    ],
};

pub const JOB_DETAILS: ViewTemplate = ViewTemplate {
    root: Kind::Job,
    paths: &[
        &[Relation::JobStatus],
        &[Relation::JobDetails, Relation::DetailStatus],
    ],
};

impl ViewTemplate {
    async fn fetch_one(&self, pool: &DbPool, id: i64) -> Result<Graph, WorkshopError> {
        graph::fetch_with_relations(pool, self.root, id, self.paths)
            .await?
            .ok_or(WorkshopError::NotFound { resource: self.root, id })
    }

    async fn fetch_all(&self, pool: &DbPool) -> Result<Graph, WorkshopError> {
        Ok(graph::fetch_all_with_relations(pool, self.root, self.paths).await?)
    }
}

// ---------------------------------------------------------------------------
// Views
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct UserView {
    pub user_id: i64,
    pub user_username: String,
    pub user_created_at: DateTime<Utc>,
    pub user_role_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct CustomerView {
    pub customer_id: i64,
    pub customer_name: String,
    pub customer_pic_contact: Option<String>,
    pub customer_address: Option<String>,
    pub customer_created_at: DateTime<Utc>,
    pub customer_user: Option<UserView>,
}

/// Customer scalars only, as nested under a vehicle.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct CustomerBriefView {
    pub customer_id: i64,
    pub customer_name: String,
    pub customer_pic_contact: Option<String>,
    pub customer_address: Option<String>,
    pub customer_created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct VehicleFields {
    pub vehicle_id: i64,
    pub vehicle_registration_number: String,
    pub vehicle_model: Option<String>,
    pub vehicle_brand: Option<String>,
    pub vehicle_mileage: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct VehicleSummaryView {
    #[serde(flatten)]
    pub vehicle: VehicleFields,
    pub vehicle_created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct CustomerVehiclesView {
    pub customer: CustomerView,
    pub vehicles: Vec<VehicleSummaryView>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct VehicleView {
    #[serde(flatten)]
    pub vehicle: VehicleFields,
    pub vehicle_customer: Option<CustomerBriefView>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct JobCountView {
    pub job_id: i64,
    pub job_summary: String,
    pub job_status: Option<String>,
    pub total_job_detail: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct VehicleOverviewView {
    #[serde(flatten)]
    pub vehicle: VehicleFields,
    pub vehicle_customer: Option<CustomerBriefView>,
    pub jobs: Vec<JobCountView>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct JobSummaryView {
    pub job_id: i64,
    pub job_summary: String,
    pub job_status: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct VehicleJobsView {
    #[serde(flatten)]
    pub vehicle: VehicleFields,
    pub jobs: Vec<JobSummaryView>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct JobDetailView {
    pub job_detail_id: i64,
    pub job_detail_title: String,
    pub job_detail_description: Option<String>,
    pub job_detail_status: Option<String>,
    pub job_detail_created_at: DateTime<Utc>,
    pub job_detail_modified_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct JobTreeView {
    pub job_id: i64,
    pub job_summary: String,
    pub job_status: Option<String>,
    pub job_details: Vec<JobDetailView>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct VehicleJobTreeView {
    #[serde(flatten)]
    pub vehicle: VehicleFields,
    pub jobs: Vec<JobTreeView>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct JobHeaderView {
    pub job_id: i64,
    pub job_summary: String,
    pub job_status: Option<String>,
    pub job_created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct JobDetailsView {
    pub job: JobHeaderView,
    pub job_details: Vec<JobDetailView>,
}

// ---------------------------------------------------------------------------
// Builders
// ---------------------------------------------------------------------------

fn user_view(graph: &Graph, user: &User) -> UserView {
    UserView {
        user_id: user.user_id,
        user_username: user.username.clone(),
        user_created_at: user.created_at,
        user_role_name: graph.role_of(user).map(|r| r.role_name.clone()),
    }
}

fn customer_view(graph: &Graph, customer: &Customer) -> CustomerView {
    CustomerView {
        customer_id: customer.customer_id,
        customer_name: customer.name.clone(),
        customer_pic_contact: customer.pic_contact.clone(),
        customer_address: customer.address.clone(),
        customer_created_at: customer.created_at,
        customer_user: graph.user_of(customer).map(|u| user_view(graph, u)),
    }
}

fn customer_brief(customer: &Customer) -> CustomerBriefView {
    CustomerBriefView {
        customer_id: customer.customer_id,
        customer_name: customer.name.clone(),
        customer_pic_contact: customer.pic_contact.clone(),
        customer_address: customer.address.clone(),
        customer_created_at: customer.created_at,
    }
}

fn vehicle_fields(vehicle: &Vehicle) -> VehicleFields {
    VehicleFields {
        vehicle_id: vehicle.vehicle_id,
        vehicle_registration_number: vehicle.registration_number.clone(),
        vehicle_model: vehicle.model.clone(),
        vehicle_brand: vehicle.brand.clone(),
        vehicle_mileage: vehicle.mileage,
    }
}

fn job_status_title(graph: &Graph, job: &Job) -> Option<String> {
    graph.status_of_job(job).map(|s| s.job_status_title.clone())
}

fn job_detail_view(graph: &Graph, detail: &JobDetail) -> JobDetailView {
    JobDetailView {
        job_detail_id: detail.job_detail_id,
        job_detail_title: detail.title.clone(),
        job_detail_description: detail.description.clone(),
        job_detail_status: graph
            .status_of_detail(detail)
            .map(|s| s.job_status_title.clone()),
        job_detail_created_at: detail.created_at,
        job_detail_modified_at: detail.modified_at,
    }
}

fn vehicle_view(graph: &Graph, vehicle: &Vehicle) -> VehicleView {
    VehicleView {
        vehicle: vehicle_fields(vehicle),
        vehicle_customer: graph.customer_of(vehicle).map(customer_brief),
    }
}

fn vehicle_overview(graph: &Graph, vehicle: &Vehicle) -> VehicleOverviewView {
    VehicleOverviewView {
        vehicle: vehicle_fields(vehicle),
        vehicle_customer: graph.customer_of(vehicle).map(customer_brief),
        jobs: graph
            .jobs_of_vehicle(vehicle.vehicle_id)
            .map(|job| JobCountView {
                job_id: job.job_id,
                job_summary: job.job_summary.clone(),
                job_status: job_status_title(graph, job),
                total_job_detail: graph.details_of(job.job_id).count(),
            })
            .collect(),
    }
}

/// Look up the root row of a single-root graph.
fn root<'g, T>(
    graph: &'g Graph,
    kind: Kind,
    id: i64,
    lookup: impl Fn(&'g Graph, i64) -> Option<&'g T>,
) -> Result<&'g T, WorkshopError> {
    lookup(graph, id).ok_or(WorkshopError::NotFound { resource: kind, id })
}

// ---------------------------------------------------------------------------
// Queries
// ---------------------------------------------------------------------------

/// `GET /customers`
pub async fn customers(pool: &DbPool) -> Result<Vec<CustomerView>, WorkshopError> {
    let graph = CUSTOMER.fetch_all(pool).await?;
    Ok(graph
        .roots()
        .iter()
        .filter_map(|id| graph.customer(*id))
        .map(|c| customer_view(&graph, c))
        .collect())
}

/// `GET /customers/{id}`
pub async fn customer(pool: &DbPool, id: i64) -> Result<CustomerView, WorkshopError> {
    let graph = CUSTOMER.fetch_one(pool, id).await?;
    let customer = root(&graph, Kind::Customer, id, Graph::customer)?;
    Ok(customer_view(&graph, customer))
}

/// `GET /customers/{id}/vehicles`
pub async fn customer_vehicles(
    pool: &DbPool,
    id: i64,
) -> Result<CustomerVehiclesView, WorkshopError> {
    let graph = CUSTOMER_VEHICLES.fetch_one(pool, id).await?;
    let customer = root(&graph, Kind::Customer, id, Graph::customer)?;

    Ok(CustomerVehiclesView {
        customer: customer_view(&graph, customer),
        vehicles: graph
            .vehicles_of(id)
            .map(|v| VehicleSummaryView {
                vehicle: vehicle_fields(v),
                vehicle_created_at: v.created_at,
            })
            .collect(),
    })
}

/// `GET /vehicles`
pub async fn vehicles(pool: &DbPool) -> Result<Vec<VehicleOverviewView>, WorkshopError> {
    let graph = VEHICLE_OVERVIEW.fetch_all(pool).await?;
    Ok(graph
        .roots()
        .iter()
        .filter_map(|id| graph.vehicle(*id))
        .map(|v| vehicle_overview(&graph, v))
        .collect())
}

/// `GET /vehicles/{id}`
pub async fn vehicle(pool: &DbPool, id: i64) -> Result<VehicleView, WorkshopError> {
    let graph = VEHICLE.fetch_one(pool, id).await?;
    let vehicle = root(&graph, Kind::Vehicle, id, Graph::vehicle)?;
    Ok(vehicle_view(&graph, vehicle))
}

/// `GET /vehicles/{id}/jobs`
pub async fn vehicle_jobs(pool: &DbPool, id: i64) -> Result<VehicleJobsView, WorkshopError> {
    let graph = VEHICLE_JOBS.fetch_one(pool, id).await?;
    let vehicle = root(&graph, Kind::Vehicle, id, Graph::vehicle)?;

    Ok(VehicleJobsView {
        vehicle: vehicle_fields(vehicle),
        jobs: graph
            .jobs_of_vehicle(id)
            .map(|job| JobSummaryView {
                job_id: job.job_id,
                job_summary: job.job_summary.clone(),
                job_status: job_status_title(&graph, job),
            })
            .collect(),
    })
}

/// `GET /vehicles/{id}/jobsAndDetails`
pub async fn vehicle_jobs_and_details(
    pool: &DbPool,
    id: i64,
) -> Result<VehicleJobTreeView, WorkshopError> {
    let graph = VEHICLE_JOBS_AND_DETAILS.fetch_one(pool, id).await?;
    let vehicle = root(&graph, Kind::Vehicle, id, Graph::vehicle)?;

    Ok(VehicleJobTreeView {
        vehicle: vehicle_fields(vehicle),
        jobs: graph
            .jobs_of_vehicle(id)
            .map(|job| JobTreeView {
                job_id: job.job_id,
                job_summary: job.job_summary.clone(),
                job_status: job_status_title(&graph, job),
                job_details: graph
                    .details_of(job.job_id)
                    .map(|d| job_detail_view(&graph, d))
                    .collect(),
            })
            .collect(),
    })
}

/// `GET /jobs/{id}/jobdetails`
pub async fn job_details(pool: &DbPool, id: i64) -> Result<JobDetailsView, WorkshopError> {
    let graph = JOB_DETAILS.fetch_one(pool, id).await?;
    let job = root(&graph, Kind::Job, id, Graph::job)?;

    Ok(JobDetailsView {
        job: JobHeaderView {
            job_id: job.job_id,
            job_summary: job.job_summary.clone(),
            job_status: job_status_title(&graph, job),
            job_created_at: job.created_at,
        },
        job_details: graph
            .details_of(id)
            .map(|d| job_detail_view(&graph, d))
            .collect(),
    })
}
