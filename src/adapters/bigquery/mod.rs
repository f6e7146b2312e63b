//! BigQuery sink over the REST API
//!
//! Tables are created partitioned by day on `JOB_RUN` and clustered on the
//! configured columns; each run appends through one multipart load job.

pub mod adapter;
pub mod client;
pub mod models;

pub use adapter::BigQueryAdapter;
pub use client::BigQueryClient;
pub use models::{Job, JobReference, LoadJob, Table, TableReference, TableSchema};
