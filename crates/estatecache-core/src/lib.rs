//! Core library for estatecache.
//!
//! This crate contains the shared functionality used by the command line
//! front end:
//! - `api`: REST client, request descriptors and error types for the
//!   real-estate back-office API
//! - `models`: Owner, Property, PropertyImage and PropertyTrace data structures
//! - `cache`: query-keyed, tag-invalidated in-memory response cache
//! - `filters`: property filters and the debounced filter pipeline
//! - `validation`: client-side checks run before any request is sent
//! - `service`: cached queries and invalidating mutations over the API
//! - `config`: application configuration
//! - `utils`: formatting helpers

pub mod api;
pub mod cache;
pub mod config;
pub mod filters;
pub mod models;
pub mod service;
pub mod utils;
pub mod validation;

#[cfg(test)]
pub(crate) mod testing;

pub use api::{ApiClient, ApiError, Backend, Upload};
pub use cache::{CacheKey, EntityKind, QueryCache, QueryState, Tag};
pub use config::Config;
pub use filters::{Debouncer, FilterPipeline, ListState, PropertyFilters};
pub use service::{BatchSummary, EstateService};
pub use validation::ValidationError;
