//! Scrape-job actor API source
//!
//! Starts a scraping actor run, waits for it to finish and reads the run's
//! dataset.

pub mod client;
pub mod models;

pub use client::ApifyClient;
pub use models::{ActorInput, ActorRun, ProxyInput, RunEnvelope};
