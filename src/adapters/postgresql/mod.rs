//! PostgreSQL sink
//!
//! The listings table is range-partitioned on `JOB_RUN` with one partition
//! per run day and an index over the clustering columns.

pub mod adapter;
pub mod client;
pub mod sql;

pub use adapter::PostgreSQLAdapter;
pub use client::PostgreSQLClient;
pub use sql::TableName;
