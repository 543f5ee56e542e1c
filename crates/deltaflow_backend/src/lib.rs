//! # Deltaflow Backend
//! [![Crates.io](https://img.shields.io/crates/v/deltaflow_backend.svg)](https://crates.io/crates/deltaflow_backend)
//! [![Downloads](https://img.shields.io/crates/d/deltaflow_backend.svg)](https://crates.io/crates/deltaflow_backend)
//! [![Docs](https://docs.rs/deltaflow_backend/badge.svg)](https://docs.rs/deltaflow_backend/)
//!
//! The backend adapter for a managed dataflow service.
//!
//! [`DataflowBackend`] holds a resolved [`JobConfig`](deltaflow_core::config::JobConfig)
//! and a [`JobProvider`](deltaflow_core::traits::JobProvider), and exposes the
//! operation set of the `deltaflow` command line: `init`, `apply`, `run`,
//! `cancel`, `delete` and `watch`. All heavy lifting (scheduling, retries,
//! distributed execution) happens inside the remote service; this crate is
//! configuration marshaling and control flow.

pub mod backend;
pub mod runtime_factory;
pub mod template;

pub use backend::{DataflowBackend, RunSubmission};
pub use runtime_factory::RuntimeKind;

pub type Result<T> = std::result::Result<T, deltaflow_core::error::BackendError>;
