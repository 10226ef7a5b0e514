//! Data models for back-office entities.
//!
//! This module contains the data structures exchanged with the API:
//!
//! - `Owner`, `OwnerWithProperties`, `OwnerInput`: property owners
//! - `Property`, `PropertyWithDetails`, `PropertyInput`: listings
//! - `PropertyImage`, `PropertyImageInput`: listing photos
//! - `PropertyTrace`, `PropertyTraceInput`: sale and valuation history
//!
//! Field names are camelCase on the wire.

pub mod image;
pub mod owner;
pub mod property;
pub mod trace;

pub use image::{PropertyImage, PropertyImageInput};
pub use owner::{Owner, OwnerInput, OwnerWithProperties};
pub use property::{Property, PropertyInput, PropertyWithDetails, Stats};
pub use trace::{PropertyTrace, PropertyTraceInput};
