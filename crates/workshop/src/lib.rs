//! `workshop` crate — the workshop domain: validated CRUD over the seven
//! entities, the read projections served by the query endpoints, and the
//! demo data seeder.

pub mod entities;
pub mod error;
pub mod projection;
pub mod seed;
pub mod service;

pub use entities::Resource;
pub use error::WorkshopError;
pub use seed::{SeedConfig, SeedOutcome, SeedReport};

#[cfg(test)]
mod service_tests;
