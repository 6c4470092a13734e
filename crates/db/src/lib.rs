//! `db` crate — pure persistence layer.
//!
//! Provides a connection pool, the flat record structs for the seven workshop
//! tables, repository functions over them, and the eager relation loader
//! (`graph`).  No business logic lives here.

pub mod error;
pub mod graph;
pub mod models;
pub mod pool;
pub mod repository;

pub use error::DbError;
pub use graph::{Graph, Kind, Relation};
pub use pool::{DbPool, PoolConfig};
pub use repository::{Table, Writable};
