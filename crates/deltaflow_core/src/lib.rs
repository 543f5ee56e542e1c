//! # Deltaflow Core
//! [![Crates.io](https://img.shields.io/crates/v/deltaflow_core.svg)](https://crates.io/crates/deltaflow_core)
//! [![Downloads](https://img.shields.io/crates/d/deltaflow_core.svg)](https://crates.io/crates/deltaflow_core)
//! [![Docs](https://docs.rs/deltaflow_core/badge.svg)](https://docs.rs/deltaflow_core/)
//!
//! Types and traits for the ecosystem.
//!
//! Defines the contract between the backend adapter and the managed
//! dataflow service it drives.
//!
//! - **[`JobConfig`](config::JobConfig)**: The local job configuration consumed by the adapter.
//! - **[`JobSpec`](job::JobSpec)**: The resource description submitted to the remote service.
//! - **[`JobProvider`](traits::JobProvider)**: Trait for implementing the remote resource API.

pub mod auth;
pub mod config;
pub mod error;
pub mod job;
pub mod traits;

pub mod prelude {
    pub use super::auth::*;
    pub use super::config::*;
    pub use super::error::*;
    pub use super::job::*;
    pub use super::traits::*;
}

pub mod routes {
    pub const JOBS: &str = "/jobs";
    pub const JOBS_BY_ID: &str = "/jobs/{id}";
    pub const JOBS_SUBMIT_RUN: &str = "/jobs/{id}/runs";

    pub const RUNS_BY_ID: &str = "/runs/{id}";
    pub const RUNS_LOGS: &str = "/runs/{id}/logs";
}
