//! Tests for the generic entity operations in `service`.

use std::time::Duration;

use db::models::{Customer, Job, JobDetail, JobStatus, Role, User, Vehicle};
use db::pool::{connect_in_memory, create_pool, run_migrations};
use db::{DbPool, Kind, PoolConfig};
use tempfile::TempDir;

use crate::entities::{
    CustomerInput, JobDetailInput, JobInput, JobStatusInput, RoleInput, UserInput, VehicleInput,
};
use crate::service;
use crate::WorkshopError;

// ----------------------------------------------------------------
// Helpers
// ----------------------------------------------------------------

async fn pool() -> DbPool {
    connect_in_memory().await.unwrap()
}

/// A pool over a database file, so connections really contend for locks.
async fn file_pool(dir: &TempDir) -> DbPool {
    let url = format!("sqlite://{}", dir.path().join("trackr.db").display());
    let pool = create_pool(&url, &PoolConfig::default()).await.unwrap();
    run_migrations(&pool).await.unwrap();
    pool
}

fn status(title: &str, description: Option<&str>) -> JobStatusInput {
    JobStatusInput {
        job_status_title: Some(title.into()),
        job_status_description: description.map(Into::into),
    }
}

async fn customer_with_vehicle(pool: &DbPool) -> (Customer, Vehicle) {
    let customer: Customer = service::create(
        pool,
        CustomerInput { name: Some("Customer A".into()), ..Default::default() },
    )
    .await
    .unwrap();
    let vehicle: Vehicle = service::create(
        pool,
        VehicleInput {
            registration_number: Some("REG123".into()),
            mileage: Some(1000),
            customer_id: Some(customer.customer_id),
            ..Default::default()
        },
    )
    .await
    .unwrap();
    (customer, vehicle)
}

// ----------------------------------------------------------------
// create / get / list
// ----------------------------------------------------------------

#[tokio::test]
async fn create_then_get_returns_the_same_entity() {
    let pool = pool().await;

    let created: JobStatus = service::create(&pool, status("Pending", Some("Awaiting")))
        .await
        .unwrap();
    assert_eq!(created.job_status_id, 1);
    assert_eq!(created.job_status_title, "Pending");
    assert_eq!(created.created_at, created.modified_at);

    let fetched: JobStatus = service::get(&pool, created.job_status_id).await.unwrap();
    assert_eq!(fetched, created);
}

#[tokio::test]
async fn identities_are_assigned_in_creation_order() {
    let pool = pool().await;

    for name in ["Admin", "Mechanic", "FrontDesk"] {
        let _: Role = service::create(
            &pool,
            RoleInput { role_name: Some(name.into()), role_description: None },
        )
        .await
        .unwrap();
    }

    let roles: Vec<Role> = service::list(&pool).await.unwrap();
    let ids: Vec<i64> = roles.iter().map(|r| r.role_id).collect();
    assert_eq!(ids, vec![1, 2, 3]);
}

#[tokio::test]
async fn list_of_empty_table_is_empty() {
    let pool = pool().await;
    let jobs: Vec<Job> = service::list(&pool).await.unwrap();
    assert!(jobs.is_empty());
}

#[tokio::test]
async fn create_without_required_field_is_rejected() {
    let pool = pool().await;

    let err = service::create::<User>(&pool, UserInput::default()).await.unwrap_err();
    assert!(matches!(err, WorkshopError::Validation(ref msg) if msg == "Username is required"));
    assert!(service::list::<User>(&pool).await.unwrap().is_empty());
}

#[tokio::test]
async fn create_with_unknown_reference_is_rejected() {
    let pool = pool().await;

    let err = service::create::<Job>(
        &pool,
        JobInput {
            job_summary: Some("Oil change".into()),
            vehicle_id: Some(7),
            ..Default::default()
        },
    )
    .await
    .unwrap_err();

    assert_eq!(err.to_string(), "Vehicle with id 7 does not exist");
    assert!(service::list::<Job>(&pool).await.unwrap().is_empty());
}

// ----------------------------------------------------------------
// update
// ----------------------------------------------------------------

#[tokio::test]
async fn update_replaces_every_field_and_refreshes_modified_at() {
    let pool = pool().await;
    let created: JobStatus = service::create(&pool, status("Pending", Some("Awaiting")))
        .await
        .unwrap();

    tokio::time::sleep(Duration::from_millis(5)).await;
    let updated: JobStatus = service::update(&pool, created.job_status_id, status("Pending", None))
        .await
        .unwrap();

    assert_eq!(updated.job_status_id, created.job_status_id);
    assert_eq!(updated.job_status_description, None);
    assert_eq!(updated.created_at, created.created_at);
    assert!(updated.modified_at > created.modified_at);

    let fetched: JobStatus = service::get(&pool, created.job_status_id).await.unwrap();
    assert_eq!(fetched, updated);
}

#[tokio::test]
async fn update_can_clear_a_relation() {
    let pool = pool().await;
    let (_, vehicle) = customer_with_vehicle(&pool).await;

    let detached: Vehicle = service::update(
        &pool,
        vehicle.vehicle_id,
        VehicleInput {
            registration_number: Some("REG123".into()),
            mileage: Some(1500),
            ..Default::default()
        },
    )
    .await
    .unwrap();

    assert_eq!(detached.customer_id, None);
    assert_eq!(detached.mileage, 1500);
}

#[tokio::test]
async fn update_of_unknown_id_is_not_found_even_with_invalid_input() {
    let pool = pool().await;

    let err = service::update::<Customer>(&pool, 99, CustomerInput::default())
        .await
        .unwrap_err();
    assert!(matches!(err, WorkshopError::NotFound { resource: Kind::Customer, id: 99 }));
    assert_eq!(err.to_string(), "Customer with id 99 not found.");
}

#[tokio::test]
async fn update_with_unknown_reference_leaves_row_untouched() {
    let pool = pool().await;
    let (customer, vehicle) = customer_with_vehicle(&pool).await;

    let err = service::update::<Vehicle>(
        &pool,
        vehicle.vehicle_id,
        VehicleInput {
            registration_number: Some("REG999".into()),
            customer_id: Some(customer.customer_id + 10),
            ..Default::default()
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, WorkshopError::Validation(_)));

    let unchanged: Vehicle = service::get(&pool, vehicle.vehicle_id).await.unwrap();
    assert_eq!(unchanged, vehicle);
}

// ----------------------------------------------------------------
// delete
// ----------------------------------------------------------------

#[tokio::test]
async fn delete_returns_the_removed_row() {
    let pool = pool().await;
    let created: JobStatus = service::create(&pool, status("Cancelled", None)).await.unwrap();

    let deleted: JobStatus = service::delete(&pool, created.job_status_id).await.unwrap();
    assert_eq!(deleted, created);

    let err = service::get::<JobStatus>(&pool, created.job_status_id).await.unwrap_err();
    assert!(matches!(err, WorkshopError::NotFound { resource: Kind::JobStatus, .. }));
}

#[tokio::test]
async fn delete_of_unknown_id_is_not_found() {
    let pool = pool().await;
    let err = service::delete::<JobDetail>(&pool, 5).await.unwrap_err();
    assert_eq!(err.to_string(), "JobDetail with id 5 not found.");
}

#[tokio::test]
async fn deleting_a_customer_leaves_its_vehicles_dangling() {
    let pool = pool().await;
    let (customer, vehicle) = customer_with_vehicle(&pool).await;
    let job: Job = service::create(
        &pool,
        JobInput {
            job_summary: Some("Tyre rotation".into()),
            customer_id: Some(customer.customer_id),
            vehicle_id: Some(vehicle.vehicle_id),
            job_status_id: None,
        },
    )
    .await
    .unwrap();

    let _: Customer = service::delete(&pool, customer.customer_id).await.unwrap();

    let orphan: Vehicle = service::get(&pool, vehicle.vehicle_id).await.unwrap();
    assert_eq!(orphan.customer_id, Some(customer.customer_id));
    let orphan_job: Job = service::get(&pool, job.job_id).await.unwrap();
    assert_eq!(orphan_job.customer_id, Some(customer.customer_id));

    // The job itself still resolves, so details can hang off it.
    let detail: JobDetail = service::create(
        &pool,
        JobDetailInput {
            title: Some("Rotate".into()),
            job_id: Some(job.job_id),
            ..Default::default()
        },
    )
    .await
    .unwrap();
    assert_eq!(detail.job_id, Some(job.job_id));

    // A dangling id cannot be written back.
    let err = service::update::<Vehicle>(
        &pool,
        vehicle.vehicle_id,
        VehicleInput {
            registration_number: Some("REG123".into()),
            customer_id: orphan.customer_id,
            ..Default::default()
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, WorkshopError::Validation(_)));
}

// ----------------------------------------------------------------
// concurrency
// ----------------------------------------------------------------

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn overlapping_writes_queue_instead_of_failing() {
    let dir = tempfile::tempdir().unwrap();
    let pool = file_pool(&dir).await;

    let mut ids = Vec::new();
    for i in 0..8 {
        let created: JobStatus = service::create(&pool, status(&format!("Status {i}"), None))
            .await
            .unwrap();
        ids.push(created.job_status_id);
    }

    let mut tasks = tokio::task::JoinSet::new();
    for n in 0..160 {
        let pool = pool.clone();
        let id = ids[n % ids.len()];
        tasks.spawn(async move {
            service::update::<JobStatus>(&pool, id, status(&format!("Revision {n}"), None))
                .await
                .map(|_| ())
        });
    }
    for n in 0..40 {
        let pool = pool.clone();
        tasks.spawn(async move {
            service::create::<Role>(
                &pool,
                RoleInput { role_name: Some(format!("Role {n}")), role_description: None },
            )
            .await
            .map(|_| ())
        });
    }

    while let Some(joined) = tasks.join_next().await {
        joined.unwrap().unwrap();
    }

    for id in ids {
        let row: JobStatus = service::get(&pool, id).await.unwrap();
        assert!(row.job_status_title.starts_with("Revision "), "{}", row.job_status_title);
    }
    assert_eq!(service::list::<Role>(&pool).await.unwrap().len(), 40);
}
