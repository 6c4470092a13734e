//! Randomized, referentially consistent demo data.
//!
//! Rows are inserted table by table in dependency order (roles, users,
//! customers, vehicles, job statuses, jobs, job details).  Roles, users and
//! customers commit together with the emptiness check on customers; every
//! later table is its own transaction.  A failure part-way leaves the
//! earlier commits in place.
//!
//! Seeding is a no-op once any customer exists.  Concurrent seeds serialize
//! on the store's write lock, so exactly one of them writes.

use std::ops::RangeInclusive;

use chrono::Utc;
use rand::rngs::StdRng;
use rand::seq::IndexedRandom;
use rand::{Rng, SeedableRng};
use serde::Serialize;
use sqlx::SqliteConnection;
use tracing::{debug, info, instrument};

use db::models::{
    Customer, CustomerDraft, Job, JobDetail, JobDetailDraft, JobDraft, JobStatus, JobStatusDraft,
    Role, RoleDraft, User, UserDraft, Vehicle, VehicleDraft,
};
use db::pool::begin_write;
use db::repository;
use db::{DbPool, Writable};

use crate::WorkshopError;

const ROLES: [(&str, &str); 4] = [
    ("Admin", "Administrator with full access"),
    ("Mechanic", "Mechanic with access to job and vehicle details"),
    ("FrontDesk", "Handles customer inquiries and bookings"),
    ("Management", "Management with overview of operations"),
];

/// One user per role, in role order.
const USERS: [(&str, &str); 4] = [
    ("admin", "hashedpassword1"),
    ("mechanic1", "hashedpassword2"),
    ("frontdesk1", "hashedpassword3"),
    ("manager1", "hashedpassword4"),
];

const CUSTOMERS: [(&str, &str, &str); 3] = [
    ("Customer A", "John Doe", "123 Street A"),
    ("Customer B", "Jane Smith", "456 Street B"),
    ("Customer C", "James Brown", "789 Street C"),
];

const JOB_STATUSES: [(&str, &str); 4] = [
    ("Pending", "Job is awaiting assignment"),
    ("In Progress", "Job is currently being worked on"),
    ("Completed", "Job has been completed"),
    ("Cancelled", "Job has been cancelled"),
];

/// How much data to generate.
#[derive(Debug, Clone, PartialEq)]
pub struct SeedConfig {
    pub customers: usize,
    pub vehicles_per_customer: RangeInclusive<usize>,
    pub jobs_per_vehicle: RangeInclusive<usize>,
    pub details_per_job: RangeInclusive<usize>,
}

impl Default for SeedConfig {
    fn default() -> Self {
        Self {
            customers: CUSTOMERS.len(),
            vehicles_per_customer: 1..=3,
            jobs_per_vehicle: 5..=6,
            details_per_job: 3..=6,
        }
    }
}

impl SeedConfig {
    /// At least one customer, and every cardinality range non-empty.
    ///
    /// A seed without customers would leave the idempotency guard open.
    pub fn validate(&self) -> Result<(), WorkshopError> {
        if self.customers == 0 {
            return Err(WorkshopError::SeedFailure(
                "at least one customer must be seeded".into(),
            ));
        }

        let ranges = [
            ("vehicles per customer", &self.vehicles_per_customer),
            ("jobs per vehicle", &self.jobs_per_vehicle),
            ("details per job", &self.details_per_job),
        ];
        for (name, range) in ranges {
            if range.is_empty() {
                return Err(WorkshopError::SeedFailure(format!(
                    "empty range for {name}: {}..={}",
                    range.start(),
                    range.end()
                )));
            }
        }
        Ok(())
    }
}

/// The generator's random source: reproducible for `Some(seed)`, seeded
/// from the OS otherwise.
pub fn rng_for(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    }
}

/// Rows inserted per table.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct SeedReport {
    pub roles: usize,
    pub users: usize,
    pub customers: usize,
    pub vehicles: usize,
    pub job_statuses: usize,
    pub jobs: usize,
    pub job_details: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeedOutcome {
    Seeded(SeedReport),
    /// Customers already existed; nothing was written.
    Skipped,
}

fn seed_failure(err: impl std::fmt::Display) -> WorkshopError {
    WorkshopError::SeedFailure(err.to_string())
}

async fn insert_rows<T: Writable>(
    conn: &mut SqliteConnection,
    drafts: Vec<T::Draft>,
) -> Result<Vec<T>, WorkshopError> {
    let rows = repository::insert_all::<T>(conn, &drafts, Utc::now())
        .await
        .map_err(seed_failure)?;

    debug!("seeded {} {} rows", rows.len(), T::KIND);
    Ok(rows)
}

/// Insert one table's rows in a transaction of their own.
async fn stage<T: Writable>(pool: &DbPool, drafts: Vec<T::Draft>) -> Result<Vec<T>, WorkshopError> {
    let mut tx = begin_write(pool).await.map_err(seed_failure)?;
    let rows = insert_rows::<T>(&mut tx, drafts).await?;
    tx.commit().await.map_err(seed_failure)?;
    Ok(rows)
}

fn customer_draft(index: usize, user_id: Option<i64>) -> CustomerDraft {
    if let Some(&(name, pic_contact, address)) = CUSTOMERS.get(index) {
        return CustomerDraft {
            name: name.into(),
            pic_contact: Some(pic_contact.into()),
            address: Some(address.into()),
            user_id,
        };
    }

    // Past the named customers: Customer D, E, ... then numbers.
    let label = u8::try_from(index)
        .ok()
        .filter(|i| *i < 26)
        .map(|i| char::from(b'A' + i).to_string())
        .unwrap_or_else(|| (index + 1).to_string());
    CustomerDraft {
        name: format!("Customer {label}"),
        pic_contact: None,
        address: Some(format!("{} Street {label}", 100 + index)),
        user_id,
    }
}

fn vehicle_draft(rng: &mut impl Rng, customer_id: i64) -> VehicleDraft {
    VehicleDraft {
        registration_number: format!("REG{}", rng.random_range(100..=998)),
        model: Some(format!("Model {}", rng.random_range(1..=4))),
        brand: Some(format!("Brand {}", rng.random_range(1..=4))),
        mileage: rng.random_range(20_000..=199_999),
        customer_id: Some(customer_id),
    }
}

/// Populate an empty store.
///
/// # Errors
/// [`WorkshopError::SeedFailure`] if `config` is invalid or any table fails
/// to insert.  Tables committed before the failure stay.
#[instrument(skip(pool, rng, config))]
pub async fn seed<R: Rng + Send>(
    pool: &DbPool,
    rng: &mut R,
    config: &SeedConfig,
) -> Result<SeedOutcome, WorkshopError> {
    config.validate()?;

    // Held until the customers are committed.
    let mut tx = begin_write(pool).await.map_err(seed_failure)?;
    if repository::count::<Customer>(&mut *tx).await.map_err(seed_failure)? > 0 {
        info!("Customers already present, skipping seed");
        return Ok(SeedOutcome::Skipped);
    }

    let roles: Vec<Role> = insert_rows(
        &mut tx,
        ROLES
            .iter()
            .map(|&(name, description)| RoleDraft {
                role_name: name.into(),
                role_description: Some(description.into()),
            })
            .collect(),
    )
    .await?;

    let users: Vec<User> = insert_rows(
        &mut tx,
        USERS
            .iter()
            .zip(&roles)
            .map(|(&(username, hash), role)| UserDraft {
                username: username.into(),
                password_hash: Some(hash.into()),
                role_id: Some(role.role_id),
            })
            .collect(),
    )
    .await?;

    let customers: Vec<Customer> = insert_rows(
        &mut tx,
        (0..config.customers)
            .map(|i| customer_draft(i, users.get(i % users.len()).map(|u| u.user_id)))
            .collect(),
    )
    .await?;
    tx.commit().await.map_err(seed_failure)?;

    let mut vehicle_drafts = Vec::new();
    for customer in &customers {
        for _ in 0..rng.random_range(config.vehicles_per_customer.clone()) {
            vehicle_drafts.push(vehicle_draft(rng, customer.customer_id));
        }
    }
    let vehicles: Vec<Vehicle> = stage(pool, vehicle_drafts).await?;

    let statuses: Vec<JobStatus> = stage(
        pool,
        JOB_STATUSES
            .iter()
            .map(|&(title, description)| JobStatusDraft {
                job_status_title: title.into(),
                job_status_description: Some(description.into()),
            })
            .collect(),
    )
    .await?;
    let status_ids: Vec<i64> = statuses.iter().map(|s| s.job_status_id).collect();

    let mut job_drafts = Vec::new();
    for vehicle in &vehicles {
        for _ in 0..rng.random_range(config.jobs_per_vehicle.clone()) {
            job_drafts.push(JobDraft {
                job_summary: format!("Job Summary {}", rng.random_range(1..=9)),
                customer_id: vehicle.customer_id,
                vehicle_id: Some(vehicle.vehicle_id),
                job_status_id: status_ids.choose(rng).copied(),
            });
        }
    }
    let jobs: Vec<Job> = stage(pool, job_drafts).await?;

    let mut detail_drafts = Vec::new();
    for job in &jobs {
        for _ in 0..rng.random_range(config.details_per_job.clone()) {
            detail_drafts.push(JobDetailDraft {
                title: format!("Job Detail {}", rng.random_range(1..=9)),
                description: Some(format!(
                    "Description for job detail {}",
                    rng.random_range(1..=9)
                )),
                job_id: Some(job.job_id),
                job_status_id: status_ids.choose(rng).copied(),
            });
        }
    }
    let details: Vec<JobDetail> = stage(pool, detail_drafts).await?;

    let report = SeedReport {
        roles: roles.len(),
        users: users.len(),
        customers: customers.len(),
        vehicles: vehicles.len(),
        job_statuses: statuses.len(),
        jobs: jobs.len(),
        job_details: details.len(),
    };
    info!(?report, "Seed complete");
    Ok(SeedOutcome::Seeded(report))
}

// ============================================================
// Unit tests
// ============================================================
#[cfg(test)]
mod tests {
    use super::*;
    use db::pool::{connect_in_memory, create_pool, run_migrations};
    use db::PoolConfig;

    async fn seeded(rng_seed: u64) -> (DbPool, SeedReport) {
        let pool = connect_in_memory().await.unwrap();
        let outcome = seed(&pool, &mut rng_for(Some(rng_seed)), &SeedConfig::default())
            .await
            .unwrap();
        match outcome {
            SeedOutcome::Seeded(report) => (pool, report),
            SeedOutcome::Skipped => panic!("empty store was not seeded"),
        }
    }

    #[tokio::test]
    async fn default_seed_respects_cardinalities() {
        let (pool, report) = seeded(1).await;

        assert_eq!(report.roles, 4);
        assert_eq!(report.users, 4);
        assert_eq!(report.customers, 3);
        assert_eq!(report.job_statuses, 4);

        let customers: Vec<Customer> = repository::list(&pool).await.unwrap();
        let vehicles: Vec<Vehicle> = repository::list(&pool).await.unwrap();
        let jobs: Vec<Job> = repository::list(&pool).await.unwrap();
        let details: Vec<JobDetail> = repository::list(&pool).await.unwrap();
        assert_eq!(vehicles.len(), report.vehicles);
        assert_eq!(details.len(), report.job_details);

        for customer in &customers {
            let owned = vehicles
                .iter()
                .filter(|v| v.customer_id == Some(customer.customer_id))
                .count();
            assert!((1..=3).contains(&owned), "{owned} vehicles");
        }
        for vehicle in &vehicles {
            let vehicle_jobs: Vec<&Job> = jobs
                .iter()
                .filter(|j| j.vehicle_id == Some(vehicle.vehicle_id))
                .collect();
            assert!((5..=6).contains(&vehicle_jobs.len()));
            assert!(vehicle_jobs.iter().all(|j| j.customer_id == vehicle.customer_id));
        }
        for job in &jobs {
            let count = details.iter().filter(|d| d.job_id == Some(job.job_id)).count();
            assert!((3..=6).contains(&count));
        }
        for vehicle in &vehicles {
            assert!((20_000..200_000).contains(&vehicle.mileage));
            let number: u32 = vehicle.registration_number["REG".len()..].parse().unwrap();
            assert!((100..=998).contains(&number));
        }
    }

    #[tokio::test]
    async fn every_seeded_reference_resolves() {
        let (pool, _) = seeded(2).await;
        let status_ids: Vec<i64> = repository::list::<JobStatus>(&pool)
            .await
            .unwrap()
            .iter()
            .map(|s| s.job_status_id)
            .collect();

        let users: Vec<User> = repository::list(&pool).await.unwrap();
        for user in &users {
            let role_id = user.role_id.expect("seeded users have a role");
            assert!(repository::exists(&pool, db::Kind::Role, role_id).await.unwrap());
        }
        for job in repository::list::<Job>(&pool).await.unwrap() {
            assert!(status_ids.contains(&job.job_status_id.unwrap()));
        }
        for detail in repository::list::<JobDetail>(&pool).await.unwrap() {
            assert!(status_ids.contains(&detail.job_status_id.unwrap()));
            assert!(repository::exists(&pool, db::Kind::Job, detail.job_id.unwrap())
                .await
                .unwrap());
        }
    }

    #[tokio::test]
    async fn second_seed_is_a_no_op() {
        let (pool, report) = seeded(3).await;

        let again = seed(&pool, &mut rng_for(Some(3)), &SeedConfig::default())
            .await
            .unwrap();
        assert_eq!(again, SeedOutcome::Skipped);
        assert_eq!(
            repository::count::<Vehicle>(&pool).await.unwrap(),
            report.vehicles as i64
        );
    }

    #[tokio::test]
    async fn same_rng_seed_reproduces_the_data() {
        let (first, _) = seeded(42).await;
        let (second, _) = seeded(42).await;

        let scalars = |vehicles: Vec<Vehicle>| -> Vec<(String, Option<String>, i64, Option<i64>)> {
            vehicles
                .into_iter()
                .map(|v| (v.registration_number, v.model, v.mileage, v.customer_id))
                .collect()
        };
        assert_eq!(
            scalars(repository::list(&first).await.unwrap()),
            scalars(repository::list(&second).await.unwrap())
        );

        let summaries = |jobs: Vec<Job>| -> Vec<(String, Option<i64>)> {
            jobs.into_iter().map(|j| (j.job_summary, j.job_status_id)).collect()
        };
        assert_eq!(
            summaries(repository::list(&first).await.unwrap()),
            summaries(repository::list(&second).await.unwrap())
        );
    }

    #[tokio::test]
    async fn extra_customers_get_generated_names() {
        let pool = connect_in_memory().await.unwrap();
        let config = SeedConfig { customers: 5, ..SeedConfig::default() };
        seed(&pool, &mut rng_for(Some(5)), &config).await.unwrap();

        let names: Vec<String> = repository::list::<Customer>(&pool)
            .await
            .unwrap()
            .into_iter()
            .map(|c| c.name)
            .collect();
        assert_eq!(
            names,
            vec!["Customer A", "Customer B", "Customer C", "Customer D", "Customer E"]
        );
    }

    #[tokio::test]
    async fn empty_range_is_rejected_before_writing() {
        let pool = connect_in_memory().await.unwrap();
        #[allow(clippy::reversed_empty_ranges)]
        let config = SeedConfig { jobs_per_vehicle: 6..=5, ..SeedConfig::default() };

        let err = seed(&pool, &mut rng_for(Some(0)), &config).await.unwrap_err();
        assert!(matches!(err, WorkshopError::SeedFailure(_)));
        assert_eq!(repository::count::<Role>(&pool).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn zero_customers_is_rejected_so_the_guard_stays_effective() {
        let pool = connect_in_memory().await.unwrap();
        let config = SeedConfig { customers: 0, ..SeedConfig::default() };

        for _ in 0..2 {
            let err = seed(&pool, &mut rng_for(Some(0)), &config).await.unwrap_err();
            assert!(matches!(err, WorkshopError::SeedFailure(_)));
        }
        assert_eq!(repository::count::<Role>(&pool).await.unwrap(), 0);
        assert_eq!(repository::count::<JobStatus>(&pool).await.unwrap(), 0);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_seeds_write_exactly_once() {
        let dir = tempfile::tempdir().unwrap();
        let url = format!("sqlite://{}", dir.path().join("seed.db").display());
        let pool = create_pool(&url, &PoolConfig::default()).await.unwrap();
        run_migrations(&pool).await.unwrap();

        let mut tasks = tokio::task::JoinSet::new();
        for n in 0..4 {
            let pool = pool.clone();
            tasks.spawn(async move {
                seed(&pool, &mut rng_for(Some(n)), &SeedConfig::default()).await
            });
        }

        let mut seeded = 0;
        while let Some(joined) = tasks.join_next().await {
            if let SeedOutcome::Seeded(_) = joined.unwrap().unwrap() {
                seeded += 1;
            }
        }
        assert_eq!(seeded, 1);
        assert_eq!(repository::count::<Role>(&pool).await.unwrap(), 4);
        assert_eq!(repository::count::<Customer>(&pool).await.unwrap(), 3);
        assert_eq!(repository::count::<JobStatus>(&pool).await.unwrap(), 4);
    }
}
