//! # 🌊 Deltaflow
//![![License](https://img.shields.io/badge/license-MIT%2FApache-blue.svg)](https://github.com/deltaflow-rs/deltaflow?tab=readme-ov-file#license)
//![![Crates.io](https://img.shields.io/crates/v/deltaflow.svg)](https://crates.io/crates/deltaflow)
//![![Downloads](https://img.shields.io/crates/d/deltaflow.svg)](https://crates.io/crates/deltaflow)
//![![Docs](https://docs.rs/deltaflow/badge.svg)](https://docs.rs/deltaflow/)
//!
//!> *Your job, someone else's cluster*
//!
//! A control adapter for managed cloud dataflow services. Deltaflow turns a
//! local job configuration into provider calls — create an application,
//! submit a run, cancel it, delete it, watch its logs — and can generate
//! starter job specifications. The remote service does the distributed
//! execution; this crate does the marshaling.
//!
//! This crate serves as an entry point, re-exporting the core types and the
//! backend adapter, and optionally including provider implementations via
//! feature flags.
//!
//! ## Feature Flags
//!
//! | Feature | Description |
//! |---------|-------------|
//! | **`client`** | REST provider for a remote dataflow service (`deltaflow_client`). |
//! | **`mock`** | In-memory provider for development and testing (`deltaflow_mock`). |
//!
//! ## Example: Generating a starter specification
//!
//! ```rust,no_run
//! use deltaflow::prelude::*;
//! use deltaflow_mock::MockProvider;
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() {
//!     let config = JobConfig::default();
//!
//!     // Build the adapter against an in-memory provider
//!     let backend = DataflowBackend::new(config, MockProvider::default()).unwrap();
//!
//!     // Generate a starter specification
//!     let template = backend.init(None, false, None).await.unwrap();
//!     println!("{}", template.unwrap());
//! }
//! ```

pub use deltaflow_core::*;

pub mod backend {
    pub use deltaflow_backend::*;
}

#[cfg(feature = "client")]
pub mod client {
    pub use deltaflow_client::*;
}

#[cfg(feature = "mock")]
pub mod mock {
    pub use deltaflow_mock::*;
}

pub mod prelude {
    pub use deltaflow_core::prelude::*;

    pub use deltaflow_backend::{DataflowBackend, RunSubmission, RuntimeKind};

    #[cfg(feature = "client")]
    pub use deltaflow_client::{RestJobProvider, Signer};

    #[cfg(feature = "mock")]
    pub use deltaflow_mock::MockProvider;
}
