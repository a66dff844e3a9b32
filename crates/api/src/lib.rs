//! Pikwy API server library.
//!
//! Exposes the job store, job runner, content generators, configuration and
//! routes so integration tests and the binary entrypoint can both use them.

pub mod config;
pub mod error;
pub mod generator;
pub mod handlers;
pub mod middleware;
pub mod query;
pub mod router;
pub mod routes;
pub mod runner;
pub mod state;
pub mod store;
