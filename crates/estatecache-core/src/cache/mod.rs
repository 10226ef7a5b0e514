//! In-memory query cache for API responses.
//!
//! This module provides the `QueryCache`, which stores one response per
//! distinct (endpoint, query parameters) pair and marks entries stale when
//! a mutation invalidates one of their tags.
//!
//! - `CacheKey`: canonical endpoint + sorted parameters
//! - `Tag`: collection-wide or per-entity label for invalidation
//! - `QueryState`: notifications broadcast to key subscribers

pub mod key;
pub mod manager;

pub use key::{CacheKey, EntityKind, Tag};
pub use manager::{CachedData, QueryCache, QueryState};
