//! Domain types shared by the Pikwy job server and its polling client.
//!
//! Holds the job request/result model, the status wire format, the route
//! table and the error taxonomy. This crate has no I/O so both the API
//! server and the poller can depend on it.

pub mod credits;
pub mod error;
pub mod job;
pub mod protocol;
pub mod types;
