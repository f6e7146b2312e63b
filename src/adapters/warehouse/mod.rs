//! Warehouse sink abstraction layer
//!
//! [`RecordSink`] is implemented by the BigQuery and PostgreSQL adapters;
//! [`row`] holds the column list and row serialization they share.

pub mod factory;
pub mod row;
pub mod traits;

pub use factory::create_sink;
pub use row::{Column, ColumnMode, ColumnType, JsonEncoding, COLUMNS, PARTITION_COLUMN};
pub use traits::RecordSink;
