//! Extraction source factory

use crate::adapters::apify::ApifyClient;
use crate::adapters::meli::MeliClient;
use crate::adapters::source::traits::ExtractionSource;
use crate::config::schema::{PipelineConfig, SourceKind};
use crate::domain::Result;
use std::sync::Arc;

/// Create the extraction source selected by `source.kind`
///
/// # Errors
///
/// Returns an error if the HTTP client cannot be built or a required
/// credential is missing.
pub fn create_source(config: &PipelineConfig) -> Result<Arc<dyn ExtractionSource + Send + Sync>> {
    match config.source.kind {
        SourceKind::Rest => {
            tracing::info!(
                site_id = %config.meli.site_id,
                query = %config.meli.search_query,
                "Creating marketplace REST source"
            );
            let client = MeliClient::new(config.meli.clone())?;
            Ok(Arc::new(client) as Arc<dyn ExtractionSource + Send + Sync>)
        }
        SourceKind::Scrape => {
            tracing::info!(
                actor_id = %config.apify.actor_id,
                search = %config.apify.search,
                "Creating scrape-job source"
            );
            let client = ApifyClient::new(config.apify.clone())?;
            Ok(Arc::new(client) as Arc<dyn ExtractionSource + Send + Sync>)
        }
    }
}
