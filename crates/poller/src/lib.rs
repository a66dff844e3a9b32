//! Client side of the Pikwy job protocol.
//!
//! [`client::BackendClient`] wraps the HTTP endpoints; [`poller::JobPoller`]
//! layers the submit / poll / cancel workflow on top of it, with a bounded
//! retry loop and cooperative cancellation.

pub mod auth;
pub mod client;
pub mod config;
pub mod error;
pub mod poller;
