//! Actor API request and response models

use crate::config::ApifyConfig;
use serde::{Deserialize, Serialize};

/// Run status reported by a finished job
pub const STATUS_SUCCEEDED: &str = "SUCCEEDED";

const TERMINAL_STATUSES: [&str; 4] = ["SUCCEEDED", "FAILED", "ABORTED", "TIMED-OUT"];

/// Input document passed to the scraping actor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActorInput {
    pub debug_mode: bool,
    pub domain_code: String,
    pub fast_mode: bool,
    pub max_item_count: usize,
    pub proxy: ProxyInput,
    pub search: String,
    pub search_category: String,
    pub sort_by: String,
}

/// Proxy settings of the actor input
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProxyInput {
    pub use_apify_proxy: bool,
    pub apify_proxy_groups: Vec<String>,
}

impl From<&ApifyConfig> for ActorInput {
    fn from(config: &ApifyConfig) -> Self {
        let apify_proxy_groups = if config.use_proxy {
            vec!["RESIDENTIAL".to_string()]
        } else {
            Vec::new()
        };

        Self {
            debug_mode: false,
            domain_code: config.domain_code.clone(),
            fast_mode: config.fast_mode,
            max_item_count: config.max_item_count,
            proxy: ProxyInput {
                use_apify_proxy: config.use_proxy,
                apify_proxy_groups,
            },
            search: config.search.clone(),
            search_category: config.search_category.clone(),
            sort_by: config.sort_by.clone(),
        }
    }
}

/// `{"data": {...}}` wrapper around run objects
#[derive(Debug, Clone, Deserialize)]
pub struct RunEnvelope {
    pub data: ActorRun,
}

/// An actor run
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActorRun {
    pub id: String,
    pub status: String,
    #[serde(default)]
    pub default_dataset_id: Option<String>,
}

impl ActorRun {
    /// Whether the run has stopped and will not change status again
    pub fn is_terminal(&self) -> bool {
        TERMINAL_STATUSES.contains(&self.status.as_str())
    }

    /// Whether the run finished successfully
    pub fn succeeded(&self) -> bool {
        self.status == STATUS_SUCCEEDED
    }

    /// Dataset holding the run's output, if any
    pub fn dataset_id(&self) -> Option<&str> {
        self.default_dataset_id
            .as_deref()
            .map(str::trim)
            .filter(|id| !id.is_empty())
    }
}
