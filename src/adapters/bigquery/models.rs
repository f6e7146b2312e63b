//! BigQuery REST API models
//!
//! Table and job resources, trimmed to the fields the sink reads or writes.

use crate::adapters::warehouse::row::{ColumnMode, ColumnType, COLUMNS, PARTITION_COLUMN};
use serde::{Deserialize, Serialize};

/// Identifies a table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableReference {
    pub project_id: String,
    pub dataset_id: String,
    pub table_id: String,
}

/// A column of a table schema
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldSchema {
    pub name: String,
    #[serde(rename = "type")]
    pub field_type: String,
    pub mode: String,
}

/// Table schema
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableSchema {
    pub fields: Vec<FieldSchema>,
}

impl TableSchema {
    /// Schema of the listings table
    pub fn listings() -> Self {
        let fields = COLUMNS
            .iter()
            .map(|col| FieldSchema {
                name: col.name.to_string(),
                field_type: bigquery_type(col.column_type).to_string(),
                mode: bigquery_mode(col.mode).to_string(),
            })
            .collect();
        Self { fields }
    }
}

/// BigQuery type name for a logical column type
pub fn bigquery_type(column_type: ColumnType) -> &'static str {
    match column_type {
        ColumnType::String => "STRING",
        ColumnType::Float => "FLOAT",
        ColumnType::Integer => "INTEGER",
        ColumnType::Timestamp => "TIMESTAMP",
        ColumnType::Json => "JSON",
    }
}

fn bigquery_mode(mode: ColumnMode) -> &'static str {
    match mode {
        ColumnMode::Required => "REQUIRED",
        ColumnMode::Nullable => "NULLABLE",
        ColumnMode::Repeated => "REPEATED",
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimePartitioning {
    #[serde(rename = "type")]
    pub partition_type: String,
    pub field: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Clustering {
    pub fields: Vec<String>,
}

/// Table resource sent on creation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Table {
    pub table_reference: TableReference,
    pub schema: TableSchema,
    pub time_partitioning: TimePartitioning,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub clustering: Option<Clustering>,
}

impl Table {
    /// Listings table partitioned by day on `JOB_RUN`
    pub fn listings(table_reference: TableReference, clustering_fields: &[String]) -> Self {
        let clustering = if clustering_fields.is_empty() {
            None
        } else {
            Some(Clustering {
                fields: clustering_fields.to_vec(),
            })
        };

        Self {
            table_reference,
            schema: TableSchema::listings(),
            time_partitioning: TimePartitioning {
                partition_type: "DAY".to_string(),
                field: PARTITION_COLUMN.to_string(),
            },
            clustering,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobReference {
    pub project_id: String,
    pub job_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoadConfiguration {
    pub destination_table: TableReference,
    pub source_format: String,
    pub write_disposition: String,
    pub create_disposition: String,
    pub schema: TableSchema,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobConfiguration {
    pub load: LoadConfiguration,
}

/// Load job request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoadJob {
    pub job_reference: JobReference,
    pub configuration: JobConfiguration,
}

impl LoadJob {
    /// Append newline-delimited JSON rows to an existing table
    pub fn append(job_reference: JobReference, destination: TableReference) -> Self {
        Self {
            job_reference,
            configuration: JobConfiguration {
                load: LoadConfiguration {
                    destination_table: destination,
                    source_format: "NEWLINE_DELIMITED_JSON".to_string(),
                    write_disposition: "WRITE_APPEND".to_string(),
                    create_disposition: "CREATE_NEVER".to_string(),
                    schema: TableSchema::listings(),
                },
            },
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ErrorProto {
    #[serde(default)]
    pub reason: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

impl std::fmt::Display for ErrorProto {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}: {}",
            self.reason.as_deref().unwrap_or("unknown"),
            self.message.as_deref().unwrap_or("no message")
        )
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobStatus {
    #[serde(default)]
    pub state: String,
    #[serde(default)]
    pub error_result: Option<ErrorProto>,
    #[serde(default)]
    pub errors: Vec<ErrorProto>,
}

/// Job resource returned by insert and get
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Job {
    pub job_reference: JobReference,
    #[serde(default)]
    pub status: JobStatus,
}

impl Job {
    pub fn is_done(&self) -> bool {
        self.status.state == "DONE"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn reference() -> TableReference {
        TableReference {
            project_id: "proj".to_string(),
            dataset_id: "marketplace".to_string(),
            table_id: "products".to_string(),
        }
    }

    #[test]
    fn test_listings_schema() {
        let schema = TableSchema::listings();
        let job_run = schema.fields.iter().find(|f| f.name == "JOB_RUN").unwrap();
        assert_eq!(job_run.field_type, "TIMESTAMP");
        assert_eq!(job_run.mode, "REQUIRED");

        let images = schema.fields.iter().find(|f| f.name == "images").unwrap();
        assert_eq!(images.mode, "REPEATED");

        let attributes = schema.fields.iter().find(|f| f.name == "attributes").unwrap();
        assert_eq!(attributes.field_type, "JSON");
    }

    #[test]
    fn test_table_serialization() {
        let fields = vec!["condition".to_string(), "currency".to_string()];
        let value = serde_json::to_value(Table::listings(reference(), &fields)).unwrap();

        assert_eq!(value["tableReference"]["tableId"], "products");
        assert_eq!(
            value["timePartitioning"],
            json!({"type": "DAY", "field": "JOB_RUN"})
        );
        assert_eq!(value["clustering"]["fields"], json!(["condition", "currency"]));
    }

    #[test]
    fn test_table_without_clustering() {
        let value = serde_json::to_value(Table::listings(reference(), &[])).unwrap();
        assert!(value.get("clustering").is_none());
    }

    #[test]
    fn test_load_job_serialization() {
        let job = LoadJob::append(
            JobReference {
                project_id: "proj".to_string(),
                job_id: "job_1".to_string(),
                location: None,
            },
            reference(),
        );
        let value = serde_json::to_value(job).unwrap();

        assert_eq!(value["jobReference"]["jobId"], "job_1");
        assert!(value["jobReference"].get("location").is_none());
        assert_eq!(value["configuration"]["load"]["writeDisposition"], "WRITE_APPEND");
        assert_eq!(
            value["configuration"]["load"]["sourceFormat"],
            "NEWLINE_DELIMITED_JSON"
        );
    }

    #[test]
    fn test_job_status_parsing() {
        let job: Job = serde_json::from_value(json!({
            "jobReference": {"projectId": "proj", "jobId": "job_1", "location": "US"},
            "status": {
                "state": "DONE",
                "errorResult": {"reason": "invalid", "message": "bad row"}
            }
        }))
        .unwrap();

        assert!(job.is_done());
        assert_eq!(
            job.status.error_result.unwrap().to_string(),
            "invalid: bad row"
        );
    }
}
