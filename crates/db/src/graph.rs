//! Eager relation loading.
//!
//! Records only hold foreign-key ids, so navigating from one entity to
//! another is always explicit: a caller names the relation paths it needs,
//! [`fetch_with_relations`] loads exactly those into a [`Graph`] (one query
//! per hop, `WHERE col IN (...)` over the previous hop's rows), and the
//! caller then walks the graph through its lookup methods.
//!
//! A path may not visit the same entity kind twice, so a loaded graph never
//! contains a back-edge to an ancestor on the same path.

use std::collections::{BTreeMap, BTreeSet};

use sqlx::SqliteConnection;
use tracing::debug;

use crate::models::{Customer, Job, JobDetail, JobStatus, Role, User, Vehicle};
use crate::repository::{self, Table};
use crate::{DbError, DbPool};

// ---------------------------------------------------------------------------
// Kind
// ---------------------------------------------------------------------------

/// The seven entity types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Kind {
    Role,
    User,
    Customer,
    Vehicle,
    JobStatus,
    Job,
    JobDetail,
}

impl Kind {
    pub fn table(self) -> &'static str {
        match self {
            Self::Role => "roles",
            Self::User => "users",
            Self::Customer => "customers",
            Self::Vehicle => "vehicles",
            Self::JobStatus => "job_statuses",
            Self::Job => "jobs",
            Self::JobDetail => "job_details",
        }
    }

    /// Primary-key column; foreign keys pointing at this kind share the name.
    pub fn key(self) -> &'static str {
        match self {
            Self::Role => "role_id",
            Self::User => "user_id",
            Self::Customer => "customer_id",
            Self::Vehicle => "vehicle_id",
            Self::JobStatus => "job_status_id",
            Self::Job => "job_id",
            Self::JobDetail => "job_detail_id",
        }
    }
}

impl std::fmt::Display for Kind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Role => write!(f, "Role"),
            Self::User => write!(f, "User"),
            Self::Customer => write!(f, "Customer"),
            Self::Vehicle => write!(f, "Vehicle"),
            Self::JobStatus => write!(f, "JobStatus"),
            Self::Job => write!(f, "Job"),
            Self::JobDetail => write!(f, "JobDetail"),
        }
    }
}

// ---------------------------------------------------------------------------
// Relation
// ---------------------------------------------------------------------------

/// A navigable edge between two kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Relation {
    /// User → its Role.
    UserRole,
    /// Customer → its linked User.
    CustomerUser,
    /// Customer → every Vehicle referencing it.
    CustomerVehicles,
    /// Customer → every Job referencing it.
    CustomerJobs,
    /// Vehicle → its Customer.
    VehicleCustomer,
    /// Vehicle → every Job referencing it.
    VehicleJobs,
    /// Job → its JobStatus.
    JobStatus,
    /// Job → its Vehicle.
    JobVehicle,
    /// Job → every JobDetail referencing it.
    JobDetails,
    /// JobDetail → its JobStatus.
    DetailStatus,
}

impl Relation {
    pub fn from(self) -> Kind {
        match self {
            Self::UserRole => Kind::User,
            Self::CustomerUser | Self::CustomerVehicles | Self::CustomerJobs => Kind::Customer,
            Self::VehicleCustomer | Self::VehicleJobs => Kind::Vehicle,
            Self::JobStatus | Self::JobVehicle | Self::JobDetails => Kind::Job,
            Self::DetailStatus => Kind::JobDetail,
        }
    }

    pub fn to(self) -> Kind {
        match self {
            Self::UserRole => Kind::Role,
            Self::CustomerUser => Kind::User,
            Self::CustomerVehicles | Self::JobVehicle => Kind::Vehicle,
            Self::CustomerJobs | Self::VehicleJobs => Kind::Job,
            Self::VehicleCustomer => Kind::Customer,
            Self::JobStatus | Self::DetailStatus => Kind::JobStatus,
            Self::JobDetails => Kind::JobDetail,
        }
    }
}

/// Check that every path starts at `root`, chains hop to hop, and never
/// visits a kind twice.
fn validate_paths(root: Kind, paths: &[&[Relation]]) -> Result<(), DbError> {
    for path in paths {
        let mut current = root;
        let mut visited = BTreeSet::from([root]);
        for relation in path.iter() {
            if relation.from() != current {
                return Err(DbError::InvalidPath(format!(
                    "{relation:?} starts at {} but the path is at {current}",
                    relation.from()
                )));
            }
            current = relation.to();
            if !visited.insert(current) {
                return Err(DbError::InvalidPath(format!(
                    "{relation:?} re-enters {current} on the same path"
                )));
            }
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Graph
// ---------------------------------------------------------------------------

/// An arena of fetched records keyed by identity, plus the root ids in
/// store order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Graph {
    roots: Vec<i64>,
    roles: BTreeMap<i64, Role>,
    users: BTreeMap<i64, User>,
    customers: BTreeMap<i64, Customer>,
    vehicles: BTreeMap<i64, Vehicle>,
    job_statuses: BTreeMap<i64, JobStatus>,
    jobs: BTreeMap<i64, Job>,
    job_details: BTreeMap<i64, JobDetail>,
}

impl Graph {
    /// Identities of the rows the fetch started from.
    pub fn roots(&self) -> &[i64] {
        &self.roots
    }

    pub fn role(&self, id: i64) -> Option<&Role> {
        self.roles.get(&id)
    }

    pub fn user(&self, id: i64) -> Option<&User> {
        self.users.get(&id)
    }

    pub fn customer(&self, id: i64) -> Option<&Customer> {
        self.customers.get(&id)
    }

    pub fn vehicle(&self, id: i64) -> Option<&Vehicle> {
        self.vehicles.get(&id)
    }

    pub fn job_status(&self, id: i64) -> Option<&JobStatus> {
        self.job_statuses.get(&id)
    }

    pub fn job(&self, id: i64) -> Option<&Job> {
        self.jobs.get(&id)
    }

    pub fn job_detail(&self, id: i64) -> Option<&JobDetail> {
        self.job_details.get(&id)
    }

    // ------ many-to-one lookups (None for a null or dangling key) ------

    pub fn role_of(&self, user: &User) -> Option<&Role> {
        user.role_id.and_then(|id| self.role(id))
    }

    pub fn user_of(&self, customer: &Customer) -> Option<&User> {
        customer.user_id.and_then(|id| self.user(id))
    }

    pub fn customer_of(&self, vehicle: &Vehicle) -> Option<&Customer> {
        vehicle.customer_id.and_then(|id| self.customer(id))
    }

    pub fn vehicle_of(&self, job: &Job) -> Option<&Vehicle> {
        job.vehicle_id.and_then(|id| self.vehicle(id))
    }

    pub fn status_of_job(&self, job: &Job) -> Option<&JobStatus> {
        job.job_status_id.and_then(|id| self.job_status(id))
    }

    pub fn status_of_detail(&self, detail: &JobDetail) -> Option<&JobStatus> {
        detail.job_status_id.and_then(|id| self.job_status(id))
    }

    // ------ one-to-many lookups, in identity order ------

    pub fn vehicles_of(&self, customer_id: i64) -> impl Iterator<Item = &Vehicle> + '_ {
        self.vehicles
            .values()
            .filter(move |v| v.customer_id == Some(customer_id))
    }

    pub fn jobs_of_customer(&self, customer_id: i64) -> impl Iterator<Item = &Job> + '_ {
        self.jobs
            .values()
            .filter(move |j| j.customer_id == Some(customer_id))
    }

    pub fn jobs_of_vehicle(&self, vehicle_id: i64) -> impl Iterator<Item = &Job> + '_ {
        self.jobs
            .values()
            .filter(move |j| j.vehicle_id == Some(vehicle_id))
    }

    pub fn details_of(&self, job_id: i64) -> impl Iterator<Item = &JobDetail> + '_ {
        self.job_details
            .values()
            .filter(move |d| d.job_id == Some(job_id))
    }

    // ------ loading ------

    async fn load_roots(
        &mut self,
        conn: &mut SqliteConnection,
        kind: Kind,
        id: Option<i64>,
    ) -> Result<(), DbError> {
        self.roots = match kind {
            Kind::Role => load_root(conn, id, &mut self.roles).await?,
            Kind::User => load_root(conn, id, &mut self.users).await?,
            Kind::Customer => load_root(conn, id, &mut self.customers).await?,
            Kind::Vehicle => load_root(conn, id, &mut self.vehicles).await?,
            Kind::JobStatus => load_root(conn, id, &mut self.job_statuses).await?,
            Kind::Job => load_root(conn, id, &mut self.jobs).await?,
            Kind::JobDetail => load_root(conn, id, &mut self.job_details).await?,
        };
        Ok(())
    }

    async fn load_path(
        &mut self,
        conn: &mut SqliteConnection,
        path: &[Relation],
    ) -> Result<(), DbError> {
        let mut frontier = self.roots.clone();

        for relation in path {
            frontier = match relation {
                Relation::UserRole => {
                    let ids = keys(&self.users, &frontier, |u| u.role_id);
                    absorb(conn, Kind::Role.key(), ids, &mut self.roles).await?
                }
                Relation::CustomerUser => {
                    let ids = keys(&self.customers, &frontier, |c| c.user_id);
                    absorb(conn, Kind::User.key(), ids, &mut self.users).await?
                }
                Relation::CustomerVehicles => {
                    absorb(conn, "customer_id", frontier, &mut self.vehicles).await?
                }
                Relation::CustomerJobs => {
                    absorb(conn, "customer_id", frontier, &mut self.jobs).await?
                }
                Relation::VehicleCustomer => {
                    let ids = keys(&self.vehicles, &frontier, |v| v.customer_id);
                    absorb(conn, Kind::Customer.key(), ids, &mut self.customers).await?
                }
                Relation::VehicleJobs => {
                    absorb(conn, "vehicle_id", frontier, &mut self.jobs).await?
                }
                Relation::JobStatus => {
                    let ids = keys(&self.jobs, &frontier, |j| j.job_status_id);
                    absorb(conn, Kind::JobStatus.key(), ids, &mut self.job_statuses).await?
                }
                Relation::JobVehicle => {
                    let ids = keys(&self.jobs, &frontier, |j| j.vehicle_id);
                    absorb(conn, Kind::Vehicle.key(), ids, &mut self.vehicles).await?
                }
                Relation::JobDetails => {
                    absorb(conn, "job_id", frontier, &mut self.job_details).await?
                }
                Relation::DetailStatus => {
                    let ids = keys(&self.job_details, &frontier, |d| d.job_status_id);
                    absorb(conn, Kind::JobStatus.key(), ids, &mut self.job_statuses).await?
                }
            };

            debug!("loaded {:?}: {} rows", relation, frontier.len());
        }

        Ok(())
    }
}

/// Distinct non-null foreign keys of the frontier rows.
fn keys<T>(arena: &BTreeMap<i64, T>, frontier: &[i64], key: impl Fn(&T) -> Option<i64>) -> Vec<i64> {
    frontier
        .iter()
        .filter_map(|id| arena.get(id))
        .filter_map(key)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Load every row whose `column` is in `ids` into `arena`; return their ids.
async fn absorb<T: Table>(
    conn: &mut SqliteConnection,
    column: &str,
    ids: Vec<i64>,
    arena: &mut BTreeMap<i64, T>,
) -> Result<Vec<i64>, DbError> {
    let rows: Vec<T> = repository::list_where_in(&mut *conn, column, &ids).await?;
    let loaded = rows.iter().map(Table::id).collect();
    for row in rows {
        arena.entry(row.id()).or_insert(row);
    }
    Ok(loaded)
}

async fn load_root<T: Table>(
    conn: &mut SqliteConnection,
    id: Option<i64>,
    arena: &mut BTreeMap<i64, T>,
) -> Result<Vec<i64>, DbError> {
    let rows: Vec<T> = match id {
        Some(id) => repository::get(&mut *conn, id).await?.into_iter().collect(),
        None => repository::list(&mut *conn).await?,
    };
    let roots = rows.iter().map(Table::id).collect();
    for row in rows {
        arena.insert(row.id(), row);
    }
    Ok(roots)
}

// ---------------------------------------------------------------------------
// Entry points
// ---------------------------------------------------------------------------

/// Fetch the `kind` row `id` together with the rows reachable through
/// `paths`.  Returns `None` if the root row does not exist.
///
/// All reads happen inside one transaction, so the graph is a consistent
/// snapshot.
pub async fn fetch_with_relations(
    pool: &DbPool,
    kind: Kind,
    id: i64,
    paths: &[&[Relation]],
) -> Result<Option<Graph>, DbError> {
    let graph = fetch(pool, kind, Some(id), paths).await?;
    Ok((!graph.roots.is_empty()).then_some(graph))
}

/// Like [`fetch_with_relations`] but rooted at every row of `kind`.
pub async fn fetch_all_with_relations(
    pool: &DbPool,
    kind: Kind,
    paths: &[&[Relation]],
) -> Result<Graph, DbError> {
    fetch(pool, kind, None, paths).await
}

async fn fetch(
    pool: &DbPool,
    kind: Kind,
    id: Option<i64>,
    paths: &[&[Relation]],
) -> Result<Graph, DbError> {
    validate_paths(kind, paths)?;

    let mut tx = pool.begin().await?;
    let mut graph = Graph::default();

    graph.load_roots(&mut tx, kind, id).await?;
    if !graph.roots.is_empty() {
        for path in paths {
            graph.load_path(&mut tx, path).await?;
        }
    }

    tx.commit().await?;
    Ok(graph)
}

// ============================================================
// Unit tests
// ============================================================
#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CustomerDraft, JobDraft, JobStatusDraft, VehicleDraft};
    use crate::pool::connect_in_memory;
    use crate::repository::{insert_all, Writable};
    use chrono::Utc;

    /// Two customers; the first owns two vehicles, the second one.  Vehicle 1
    /// has two jobs (status 1 and none), vehicle 3 has one job.
    async fn fixture() -> DbPool {
        let pool = connect_in_memory().await.unwrap();
        let mut conn = pool.acquire().await.unwrap();
        let now = Utc::now();

        let customers: Vec<CustomerDraft> = ["Customer A", "Customer B"]
            .iter()
            .map(|name| CustomerDraft {
                name: name.to_string(),
                pic_contact: None,
                address: None,
                user_id: None,
            })
            .collect();
        insert_all::<Customer>(&mut conn, &customers, now).await.unwrap();

        let vehicles: Vec<VehicleDraft> = [1, 1, 2]
            .iter()
            .map(|customer_id| VehicleDraft {
                registration_number: format!("REG{customer_id}"),
                model: None,
                brand: None,
                mileage: 0,
                customer_id: Some(*customer_id),
            })
            .collect();
        insert_all::<Vehicle>(&mut conn, &vehicles, now).await.unwrap();

        JobStatus::insert(
            &mut conn,
            &JobStatusDraft { job_status_title: "Pending".into(), job_status_description: None },
            now,
        )
        .await
        .unwrap();

        let jobs: Vec<JobDraft> = [(1, Some(1)), (1, None), (3, Some(1))]
            .iter()
            .map(|(vehicle_id, status)| JobDraft {
                job_summary: format!("Job for {vehicle_id}"),
                customer_id: None,
                vehicle_id: Some(*vehicle_id),
                job_status_id: *status,
            })
            .collect();
        insert_all::<Job>(&mut conn, &jobs, now).await.unwrap();

        drop(conn);
        pool
    }

    #[test]
    fn paths_must_chain_from_the_root() {
        assert!(validate_paths(Kind::Vehicle, &[&[Relation::VehicleJobs, Relation::JobDetails]]).is_ok());
        assert!(matches!(
            validate_paths(Kind::Vehicle, &[&[Relation::JobDetails]]),
            Err(DbError::InvalidPath(_))
        ));
    }

    #[test]
    fn paths_may_not_re_enter_a_kind() {
        let back_edge: &[Relation] = &[Relation::CustomerVehicles, Relation::VehicleCustomer];
        assert!(matches!(
            validate_paths(Kind::Customer, &[back_edge]),
            Err(DbError::InvalidPath(_))
        ));
    }

    #[tokio::test]
    async fn fetch_loads_only_the_named_paths() {
        let pool = fixture().await;

        let graph = fetch_with_relations(&pool, Kind::Vehicle, 1, &[&[Relation::VehicleJobs]])
            .await
            .unwrap()
            .expect("vehicle 1 exists");

        assert_eq!(graph.roots(), &[1]);
        let jobs: Vec<i64> = graph.jobs_of_vehicle(1).map(|j| j.job_id).collect();
        assert_eq!(jobs, vec![1, 2]);

        // JobStatus was not requested, so it is absent even though job 1 has one.
        let first = graph.job(1).unwrap();
        assert!(graph.status_of_job(first).is_none());
        assert!(graph.vehicle(3).is_none());
    }

    #[tokio::test]
    async fn fetch_follows_multi_hop_paths() {
        let pool = fixture().await;

        let graph = fetch_with_relations(
            &pool,
            Kind::Customer,
            1,
            &[&[Relation::CustomerVehicles, Relation::VehicleJobs, Relation::JobStatus]],
        )
        .await
        .unwrap()
        .unwrap();

        let vehicles: Vec<i64> = graph.vehicles_of(1).map(|v| v.vehicle_id).collect();
        assert_eq!(vehicles, vec![1, 2]);

        let titles: Vec<Option<&str>> = graph
            .jobs_of_vehicle(1)
            .map(|j| graph.status_of_job(j).map(|s| s.job_status_title.as_str()))
            .collect();
        assert_eq!(titles, vec![Some("Pending"), None]);

        // Job 3 belongs to customer 2's vehicle and was never reached.
        assert!(graph.job(3).is_none());
    }

    #[tokio::test]
    async fn fetch_unknown_root_is_none() {
        let pool = fixture().await;
        let graph = fetch_with_relations(&pool, Kind::Customer, 77, &[&[Relation::CustomerVehicles]])
            .await
            .unwrap();
        assert!(graph.is_none());
    }

    #[tokio::test]
    async fn fetch_all_roots_every_row() {
        let pool = fixture().await;
        let graph = fetch_all_with_relations(&pool, Kind::Vehicle, &[&[Relation::VehicleCustomer]])
            .await
            .unwrap();

        assert_eq!(graph.roots(), &[1, 2, 3]);
        let owner = graph.customer_of(graph.vehicle(3).unwrap()).unwrap();
        assert_eq!(owner.name, "Customer B");
    }

    #[tokio::test]
    async fn fetch_all_handles_frontiers_past_the_parameter_limit() {
        let pool = connect_in_memory().await.unwrap();
        let mut conn = pool.acquire().await.unwrap();
        let now = Utc::now();

        let vehicles: Vec<VehicleDraft> = (0..40_000)
            .map(|i| VehicleDraft {
                registration_number: format!("REG{i}"),
                model: None,
                brand: None,
                mileage: 0,
                customer_id: None,
            })
            .collect();
        insert_all::<Vehicle>(&mut conn, &vehicles, now).await.unwrap();

        let job = JobDraft {
            job_summary: "Last vehicle".into(),
            customer_id: None,
            vehicle_id: Some(40_000),
            job_status_id: None,
        };
        Job::insert(&mut conn, &job, now).await.unwrap().unwrap();
        drop(conn);

        let graph = fetch_all_with_relations(&pool, Kind::Vehicle, &[&[Relation::VehicleJobs]])
            .await
            .unwrap();

        assert_eq!(graph.roots().len(), 40_000);
        let summaries: Vec<&str> = graph.jobs_of_vehicle(40_000).map(|j| j.job_summary.as_str()).collect();
        assert_eq!(summaries, vec!["Last vehicle"]);
    }
}
