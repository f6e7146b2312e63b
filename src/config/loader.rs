//! Configuration loader with TOML/YAML parsing and environment variable overrides

use super::schema::{BigQueryConfig, PipelineConfig, PostgreSQLConfig, SinkTarget, SourceKind};
use super::secret::secret_string;
use crate::domain::errors::PipelineError;
use crate::domain::result::Result;
use regex::Regex;
use std::fs;
use std::path::Path;

/// Supported configuration file formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    Toml,
    Yaml,
}

impl ConfigFormat {
    /// Chooses the format from the file extension, TOML unless `.yaml`/`.yml`
    pub fn from_path(path: &Path) -> Self {
        match path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .as_deref()
        {
            Some("yaml") | Some("yml") => Self::Yaml,
            _ => Self::Toml,
        }
    }
}

/// Loads configuration from a TOML or YAML file
///
/// This function:
/// 1. Reads the file
/// 2. Performs environment variable substitution (${VAR} syntax)
/// 3. Parses the file into PipelineConfig
/// 4. Applies environment variable overrides (MELI_ETL_* prefix and legacy names)
/// 5. Validates the configuration
///
/// # Errors
///
/// Returns an error if:
/// - File cannot be read
/// - Parsing fails
/// - Environment variable substitution fails
/// - Configuration validation fails
///
/// # Examples
///
/// ```no_run
/// use meli_etl::config::loader::load_config;
///
/// let config = load_config("config/pipeline.toml").expect("Failed to load config");
/// ```
pub fn load_config(path: impl AsRef<Path>) -> Result<PipelineConfig> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(PipelineError::Configuration(format!(
            "Configuration file not found: {}",
            path.display()
        )));
    }

    let contents = fs::read_to_string(path).map_err(|e| {
        PipelineError::Configuration(format!(
            "Failed to read configuration file {}: {}",
            path.display(),
            e
        ))
    })?;

    let contents = substitute_env_vars(&contents)?;

    let mut config = parse_config(&contents, ConfigFormat::from_path(path))?;

    apply_env_overrides(&mut config)?;

    config.validate().map_err(|e| {
        PipelineError::Configuration(format!("Configuration validation failed: {}", e))
    })?;

    tracing::debug!(
        path = %path.display(),
        source = %config.source.kind,
        sink = ?config.sink_target,
        "Configuration loaded"
    );

    Ok(config)
}

/// Parses configuration text in the given format
pub fn parse_config(contents: &str, format: ConfigFormat) -> Result<PipelineConfig> {
    let config: PipelineConfig = match format {
        ConfigFormat::Toml => toml::from_str(contents)?,
        ConfigFormat::Yaml => serde_yaml::from_str(contents)?,
    };
    Ok(config)
}

/// Substitutes environment variables in the format ${VAR_NAME}
///
/// Comment lines are left untouched.
///
/// # Errors
///
/// Returns an error if a referenced environment variable is not set
fn substitute_env_vars(input: &str) -> Result<String> {
    let re = Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)\}")
        .map_err(|e| PipelineError::Other(format!("Invalid substitution pattern: {e}")))?;
    let mut result = String::new();
    let mut missing_vars: Vec<String> = Vec::new();

    for line in input.lines() {
        if line.trim_start().starts_with('#') {
            result.push_str(line);
            result.push('\n');
            continue;
        }

        let mut processed_line = line.to_string();
        for cap in re.captures_iter(line) {
            let var_name = &cap[1];
            match std::env::var(var_name) {
                Ok(value) => {
                    let placeholder = format!("${{{}}}", var_name);
                    processed_line = processed_line.replace(&placeholder, &value);
                }
                Err(_) => {
                    if !missing_vars.iter().any(|v| v == var_name) {
                        missing_vars.push(var_name.to_string());
                    }
                }
            }
        }
        result.push_str(&processed_line);
        result.push('\n');
    }

    if !missing_vars.is_empty() {
        return Err(PipelineError::Configuration(format!(
            "Missing required environment variables: {}",
            missing_vars.join(", ")
        )));
    }

    Ok(result)
}

fn env(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.is_empty())
}

fn env_parse<T: std::str::FromStr>(name: &str) -> Option<T> {
    env(name).and_then(|v| v.parse().ok())
}

/// Applies environment variable overrides
///
/// Legacy names (`GCP_PROJECT_ID`, `BQ_DATASET_ID`, `BQ_TABLE_ID`,
/// `APIFY_TOKEN`, `GOOGLE_OAUTH_ACCESS_TOKEN`) are applied first, then the
/// `MELI_ETL_<SECTION>_<KEY>` variables, which win.
fn apply_env_overrides(config: &mut PipelineConfig) -> Result<()> {
    apply_legacy_overrides(config);

    // Application overrides
    if let Some(val) = env("MELI_ETL_APPLICATION_LOG_LEVEL") {
        config.application.log_level = val;
    }
    if let Some(val) = env("MELI_ETL_APPLICATION_DRY_RUN") {
        config.application.dry_run = val.parse().unwrap_or(false);
    }

    // Source selection
    if let Some(val) = env("MELI_ETL_SOURCE_KIND") {
        config.source.kind = match val.to_lowercase().as_str() {
            "rest" => SourceKind::Rest,
            "scrape" => SourceKind::Scrape,
            other => {
                return Err(PipelineError::Configuration(format!(
                    "Invalid MELI_ETL_SOURCE_KIND '{other}'. Must be one of: rest, scrape"
                )))
            }
        };
    }

    // Marketplace API overrides
    if let Some(val) = env("MELI_ETL_MELI_BASE_URL") {
        config.meli.base_url = val;
    }
    if let Some(val) = env("MELI_ETL_MELI_SITE_ID") {
        config.meli.site_id = val;
    }
    if let Some(val) = env("MELI_ETL_MELI_SEARCH_QUERY") {
        config.meli.search_query = val;
    }
    if let Some(val) = env_parse("MELI_ETL_MELI_LIMIT_PER_PAGE") {
        config.meli.limit_per_page = val;
    }
    if let Some(val) = env_parse("MELI_ETL_MELI_MAX_PRODUCTS") {
        config.meli.max_products = val;
    }
    if let Some(val) = env_parse("MELI_ETL_MELI_REQUEST_DELAY_MS") {
        config.meli.request_delay_ms = val;
    }

    // Scrape-job overrides
    if let Some(val) = env("MELI_ETL_APIFY_BASE_URL") {
        config.apify.base_url = val;
    }
    if let Some(val) = env("MELI_ETL_APIFY_TOKEN") {
        config.apify.token = Some(secret_string(val));
    }
    if let Some(val) = env("MELI_ETL_APIFY_ACTOR_ID") {
        config.apify.actor_id = val;
    }
    if let Some(val) = env("MELI_ETL_APIFY_SEARCH") {
        config.apify.search = val;
    }
    if let Some(val) = env("MELI_ETL_APIFY_DOMAIN_CODE") {
        config.apify.domain_code = val;
    }
    if let Some(val) = env_parse("MELI_ETL_APIFY_MAX_ITEM_COUNT") {
        config.apify.max_item_count = val;
    }
    if let Some(val) = env("MELI_ETL_APIFY_USE_PROXY") {
        config.apify.use_proxy = val.parse().unwrap_or(true);
    }

    // Sink selection
    if let Some(val) = env("MELI_ETL_SINK_TARGET") {
        config.sink_target = match val.to_lowercase().as_str() {
            "bigquery" => SinkTarget::BigQuery,
            "postgresql" => SinkTarget::PostgreSQL,
            other => {
                return Err(PipelineError::Configuration(format!(
                    "Invalid MELI_ETL_SINK_TARGET '{other}'. Must be one of: bigquery, postgresql"
                )))
            }
        };
    }

    // BigQuery overrides
    let bigquery_vars = [
        "MELI_ETL_BIGQUERY_BASE_URL",
        "MELI_ETL_BIGQUERY_PROJECT_ID",
        "MELI_ETL_BIGQUERY_DATASET_ID",
        "MELI_ETL_BIGQUERY_TABLE_ID",
        "MELI_ETL_BIGQUERY_ACCESS_TOKEN",
        "MELI_ETL_BIGQUERY_LOCATION",
    ];
    if bigquery_vars.iter().any(|name| env(name).is_some()) {
        let bq = config.bigquery.get_or_insert_with(BigQueryConfig::default);
        if let Some(val) = env("MELI_ETL_BIGQUERY_BASE_URL") {
            bq.base_url = val;
        }
        if let Some(val) = env("MELI_ETL_BIGQUERY_PROJECT_ID") {
            bq.project_id = val;
        }
        if let Some(val) = env("MELI_ETL_BIGQUERY_DATASET_ID") {
            bq.dataset_id = val;
        }
        if let Some(val) = env("MELI_ETL_BIGQUERY_TABLE_ID") {
            bq.table_id = val;
        }
        if let Some(val) = env("MELI_ETL_BIGQUERY_ACCESS_TOKEN") {
            bq.access_token = Some(secret_string(val));
        }
        if let Some(val) = env("MELI_ETL_BIGQUERY_LOCATION") {
            bq.location = Some(val);
        }
    }

    // PostgreSQL overrides
    if let Some(val) = env("MELI_ETL_POSTGRESQL_CONNECTION_STRING") {
        match config.postgresql {
            Some(ref mut pg) => pg.connection_string = secret_string(val),
            None => config.postgresql = Some(PostgreSQLConfig::new(secret_string(val))),
        }
    }

    // Logging overrides
    if let Some(val) = env("MELI_ETL_LOGGING_LOCAL_ENABLED") {
        config.logging.local_enabled = val.parse().unwrap_or(true);
    }
    if let Some(val) = env("MELI_ETL_LOGGING_LOCAL_PATH") {
        config.logging.local_path = val;
    }
    if let Some(val) = env("MELI_ETL_LOGGING_LOCAL_FORMAT") {
        config.logging.local_format = val;
    }

    Ok(())
}

fn apply_legacy_overrides(config: &mut PipelineConfig) {
    if let Some(val) = env("APIFY_TOKEN") {
        config.apify.token = Some(secret_string(val));
    }

    let legacy_bigquery = ["GCP_PROJECT_ID", "BQ_DATASET_ID", "BQ_TABLE_ID", "GOOGLE_OAUTH_ACCESS_TOKEN"];
    if !legacy_bigquery.iter().any(|name| env(name).is_some()) {
        return;
    }

    let bq = config.bigquery.get_or_insert_with(BigQueryConfig::default);
    if let Some(val) = env("GCP_PROJECT_ID") {
        bq.project_id = val;
    }
    if let Some(val) = env("BQ_DATASET_ID") {
        bq.dataset_id = val;
    }
    if let Some(val) = env("BQ_TABLE_ID") {
        bq.table_id = val;
    }
    if let Some(val) = env("GOOGLE_OAUTH_ACCESS_TOKEN") {
        bq.access_token = Some(secret_string(val));
    }
}
