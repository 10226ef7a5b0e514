//! REST API client module for the real-estate back-office service.
//!
//! This module provides the `ApiClient` for communicating with the
//! Owner, Property, PropertyImage and PropertyTrace collections, the
//! `Backend` seam the cache and service layers are written against, and
//! the endpoint descriptors that pair each request with its cache tags.
//!
//! Requests carry JSON bodies, except photo and image uploads which are
//! sent as multipart form data.

pub mod client;
pub mod endpoints;
pub mod error;
pub mod request;

pub use client::ApiClient;
pub use endpoints::{Mutation, Query};
pub use error::ApiError;
pub use request::{ApiRequest, Backend, FormPart, RequestBody, Upload};
