//! SQL statements for the PostgreSQL sink
//!
//! Identifiers come from configuration, so every one is validated before it is
//! interpolated and then double-quoted.

use crate::adapters::warehouse::row::{ColumnMode, ColumnType, COLUMNS, PARTITION_COLUMN};
use chrono::{DateTime, Duration, NaiveDate, Utc};
use regex::Regex;

/// Longest identifier PostgreSQL keeps untruncated
pub const MAX_IDENTIFIER_CHARS: usize = 63;

/// Longest table name whose `_YYYYMMDD` partitions still fit an identifier
pub const MAX_TABLE_CHARS: usize = MAX_IDENTIFIER_CHARS - "_YYYYMMDD".len();

/// Validate a SQL identifier
pub fn validate_identifier(kind: &str, name: &str) -> Result<(), String> {
    let re = Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$")
        .map_err(|e| format!("Invalid identifier pattern: {e}"))?;
    if name.len() > MAX_IDENTIFIER_CHARS || !re.is_match(name) {
        return Err(format!(
            "Invalid PostgreSQL {kind} '{name}': must match [A-Za-z_][A-Za-z0-9_]* (max 63 chars)"
        ));
    }
    Ok(())
}

/// Double-quote an identifier
pub fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// PostgreSQL type for a column
pub fn postgres_type(column_type: ColumnType, mode: ColumnMode) -> &'static str {
    if mode == ColumnMode::Repeated {
        return "JSONB";
    }
    match column_type {
        ColumnType::String => "TEXT",
        ColumnType::Float => "DOUBLE PRECISION",
        ColumnType::Integer => "BIGINT",
        ColumnType::Timestamp => "TIMESTAMPTZ",
        ColumnType::Json => "JSONB",
    }
}

/// Validated, quoted table location
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableName {
    schema: String,
    table: String,
}

impl TableName {
    /// Validate and build a table name
    pub fn new(schema: &str, table: &str) -> Result<Self, String> {
        validate_identifier("schema", schema)?;
        validate_identifier("table", table)?;
        if table.len() > MAX_TABLE_CHARS {
            return Err(format!(
                "Invalid PostgreSQL table '{table}': at most {MAX_TABLE_CHARS} chars so daily partition names are not truncated"
            ));
        }
        Ok(Self {
            schema: schema.to_string(),
            table: table.to_string(),
        })
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    /// `"schema"."table"`
    pub fn qualified(&self) -> String {
        format!("{}.{}", quote_ident(&self.schema), quote_ident(&self.table))
    }

    /// Unquoted `schema.table` for logs
    pub fn display(&self) -> String {
        format!("{}.{}", self.schema, self.table)
    }

    /// `"schema"."table_YYYYMMDD"`
    pub fn partition(&self, day: NaiveDate) -> String {
        format!(
            "{}.{}",
            quote_ident(&self.schema),
            quote_ident(&format!("{}_{}", self.table, day.format("%Y%m%d")))
        )
    }
}

/// `CREATE SCHEMA` plus the parent table partitioned by range on `JOB_RUN`
pub fn create_table_sql(name: &TableName) -> String {
    let columns: Vec<String> = COLUMNS
        .iter()
        .map(|col| {
            let not_null = if col.mode == ColumnMode::Required {
                " NOT NULL"
            } else {
                ""
            };
            format!(
                "    {} {}{}",
                quote_ident(col.name),
                postgres_type(col.column_type, col.mode),
                not_null
            )
        })
        .collect();

    format!(
        "CREATE SCHEMA IF NOT EXISTS {schema};\n\
         CREATE TABLE IF NOT EXISTS {table} (\n{columns}\n) PARTITION BY RANGE ({partition});",
        schema = quote_ident(&name.schema),
        table = name.qualified(),
        columns = columns.join(",\n"),
        partition = quote_ident(PARTITION_COLUMN),
    )
}

/// Index over the clustering columns, inherited by every partition
///
/// Returns `None` when no clustering columns are configured.
pub fn cluster_index_sql(name: &TableName, fields: &[String]) -> Result<Option<String>, String> {
    if fields.is_empty() {
        return Ok(None);
    }

    for field in fields {
        if !COLUMNS.iter().any(|c| c.name == field.as_str()) {
            return Err(format!("Unknown clustering column '{field}'"));
        }
    }

    let index = quote_ident(&format!("{}_cluster_idx", name.table));
    let columns: Vec<String> = fields.iter().map(|f| quote_ident(f)).collect();

    Ok(Some(format!(
        "CREATE INDEX IF NOT EXISTS {index} ON {} ({})",
        name.qualified(),
        columns.join(", ")
    )))
}

/// Daily partition holding `ts`
pub fn create_partition_sql(name: &TableName, ts: &DateTime<Utc>) -> String {
    let day = ts.date_naive();
    let next = day + Duration::days(1);

    format!(
        "CREATE TABLE IF NOT EXISTS {} PARTITION OF {} FOR VALUES FROM ('{} 00:00:00+00') TO ('{} 00:00:00+00')",
        name.partition(day),
        name.qualified(),
        day.format("%Y-%m-%d"),
        next.format("%Y-%m-%d"),
    )
}

/// Insert every row of a JSONB array parameter (`$1`) in one statement
pub fn insert_rows_sql(name: &TableName) -> String {
    let columns: Vec<String> = COLUMNS.iter().map(|c| quote_ident(c.name)).collect();
    let columns = columns.join(", ");

    format!(
        "INSERT INTO {table} ({columns}) SELECT {columns} FROM jsonb_populate_recordset(NULL::{table}, $1::jsonb)",
        table = name.qualified(),
    )
}
