//! Endpoint descriptors for the four API collections.
//!
//! Every read is a `Query` carrying the tags it provides; every write is a
//! `Mutation` carrying the tags it invalidates. Ids are validated here, so
//! a malformed id never produces a request.

use super::{ApiError, ApiRequest, FormPart, Upload};
use crate::cache::{EntityKind, Tag};
use crate::filters::PropertyFilters;
use crate::models::{OwnerInput, PropertyImageInput, PropertyInput, PropertyTraceInput};
use crate::validation::validate_id;

use EntityKind::{Owner, Property, PropertyImage, PropertyTrace, Stats};

#[derive(Debug, Clone, PartialEq)]
pub struct Query {
    pub request: ApiRequest,
    pub tags: Vec<Tag>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Mutation {
    pub request: ApiRequest,
    pub invalidates: Vec<Tag>,
}

fn query(request: ApiRequest, tags: Vec<Tag>) -> Query {
    Query { request, tags }
}

fn mutation(request: ApiRequest, invalidates: Vec<Tag>) -> Mutation {
    Mutation { request, invalidates }
}

fn checked(id: &str) -> Result<&str, ApiError> {
    validate_id(id)?;
    Ok(id)
}

// ===== Owners =====

pub fn list_owners() -> Query {
    query(ApiRequest::get("/Owner"), vec![Tag::Kind(Owner)])
}

pub fn get_owner(id: &str) -> Result<Query, ApiError> {
    let id = checked(id)?;
    Ok(query(ApiRequest::get(format!("/Owner/{}", id)), vec![Tag::entity(Owner, id)]))
}

pub fn owner_with_properties(id: &str) -> Result<Query, ApiError> {
    let id = checked(id)?;
    Ok(query(
        ApiRequest::get(format!("/Owner/{}/with-properties", id)),
        vec![Tag::entity(Owner, id)],
    ))
}

pub fn create_owner(input: &OwnerInput) -> Result<Mutation, ApiError> {
    Ok(mutation(
        ApiRequest::post_json("/Owner", input)?,
        vec![Tag::Kind(Owner), Tag::Kind(Stats)],
    ))
}

pub fn update_owner(id: &str, input: &OwnerInput) -> Result<Mutation, ApiError> {
    let id = checked(id)?;
    Ok(mutation(
        ApiRequest::put_json(format!("/Owner/{}", id), input)?,
        vec![Tag::Kind(Owner), Tag::entity(Owner, id)],
    ))
}

pub fn delete_owner(id: &str) -> Result<Mutation, ApiError> {
    let id = checked(id)?;
    Ok(mutation(
        ApiRequest::delete(format!("/Owner/{}", id)),
        vec![Tag::Kind(Owner), Tag::entity(Owner, id), Tag::Kind(Stats)],
    ))
}

pub fn upload_owner_photo(id: &str, upload: Upload) -> Result<Mutation, ApiError> {
    let id = checked(id)?;
    Ok(mutation(
        ApiRequest::post_multipart(format!("/Owner/{}/upload-photo", id), vec![upload.into_part("file")]),
        vec![Tag::entity(Owner, id), Tag::Kind(Owner)],
    ))
}

// ===== Properties =====

pub fn list_properties(filters: &PropertyFilters) -> Query {
    query(
        ApiRequest::get("/Property").with_query(filters.to_query()),
        vec![Tag::Kind(Property)],
    )
}

pub fn get_property(id: &str) -> Result<Query, ApiError> {
    let id = checked(id)?;
    Ok(query(ApiRequest::get(format!("/Property/{}", id)), vec![Tag::entity(Property, id)]))
}

pub fn create_property(input: &PropertyInput) -> Result<Mutation, ApiError> {
    Ok(mutation(
        ApiRequest::post_json("/Property", input)?,
        vec![Tag::Kind(Property), Tag::Kind(Owner), Tag::Kind(Stats)],
    ))
}

pub fn update_property(id: &str, input: &PropertyInput) -> Result<Mutation, ApiError> {
    let id = checked(id)?;
    Ok(mutation(
        ApiRequest::put_json(format!("/Property/{}", id), input)?,
        vec![Tag::Kind(Property), Tag::entity(Property, id), Tag::Kind(Owner)],
    ))
}

pub fn delete_property(id: &str) -> Result<Mutation, ApiError> {
    let id = checked(id)?;
    Ok(mutation(
        ApiRequest::delete(format!("/Property/{}", id)),
        vec![
            Tag::Kind(Property),
            Tag::entity(Property, id),
            Tag::Kind(Owner),
            Tag::Kind(Stats),
        ],
    ))
}

// ===== Property images =====

/// Tags touched by any image or trace write: the parent listing embeds both.
fn child_write_tags(kind: EntityKind, id: Option<&str>, property_id: Option<&str>) -> Vec<Tag> {
    let mut tags = vec![Tag::Kind(kind), Tag::Kind(Property), Tag::Kind(Owner)];
    if let Some(id) = id {
        tags.push(Tag::entity(kind, id));
    }
    if let Some(property_id) = property_id {
        tags.push(Tag::entity(Property, property_id));
    }
    tags
}

pub fn list_property_images() -> Query {
    query(ApiRequest::get("/PropertyImage"), vec![Tag::Kind(PropertyImage)])
}

pub fn get_property_image(id: &str) -> Result<Query, ApiError> {
    let id = checked(id)?;
    Ok(query(
        ApiRequest::get(format!("/PropertyImage/{}", id)),
        vec![Tag::entity(PropertyImage, id)],
    ))
}

pub fn create_property_image(input: &PropertyImageInput) -> Result<Mutation, ApiError> {
    Ok(mutation(
        ApiRequest::post_json("/PropertyImage", input)?,
        child_write_tags(PropertyImage, None, input.id_property.as_deref()),
    ))
}

pub fn update_property_image(id: &str, input: &PropertyImageInput) -> Result<Mutation, ApiError> {
    let id = checked(id)?;
    Ok(mutation(
        ApiRequest::put_json(format!("/PropertyImage/{}", id), input)?,
        child_write_tags(PropertyImage, Some(id), input.id_property.as_deref()),
    ))
}

pub fn delete_property_image(id: &str) -> Result<Mutation, ApiError> {
    let id = checked(id)?;
    Ok(mutation(
        ApiRequest::delete(format!("/PropertyImage/{}", id)),
        child_write_tags(PropertyImage, Some(id), None),
    ))
}

/// Upload a new image for a property.
pub fn upload_property_image(property_id: &str, upload: Upload, enabled: bool) -> Result<Mutation, ApiError> {
    let property_id = checked(property_id)?;
    let parts = vec![
        FormPart::Text {
            name: "propertyId".to_string(),
            value: property_id.to_string(),
        },
        FormPart::Text {
            name: "enabled".to_string(),
            value: enabled.to_string(),
        },
        upload.into_part("file"),
    ];
    Ok(mutation(
        ApiRequest::post_multipart("/PropertyImage/upload", parts),
        child_write_tags(PropertyImage, None, Some(property_id)),
    ))
}

/// Replace the file behind an existing image record.
pub fn replace_property_image_file(id: &str, upload: Upload, enabled: bool) -> Result<Mutation, ApiError> {
    let id = checked(id)?;
    let request = ApiRequest::post_multipart(format!("/PropertyImage/{}/upload", id), vec![upload.into_part("file")])
        .with_query(vec![("enabled".to_string(), enabled.to_string())]);
    Ok(mutation(request, child_write_tags(PropertyImage, Some(id), None)))
}

// ===== Property traces =====

pub fn list_property_traces() -> Query {
    query(ApiRequest::get("/PropertyTrace"), vec![Tag::Kind(PropertyTrace)])
}

pub fn get_property_trace(id: &str) -> Result<Query, ApiError> {
    let id = checked(id)?;
    Ok(query(
        ApiRequest::get(format!("/PropertyTrace/{}", id)),
        vec![Tag::entity(PropertyTrace, id)],
    ))
}

pub fn traces_for_property(property_id: &str) -> Result<Query, ApiError> {
    let property_id = checked(property_id)?;
    Ok(query(
        ApiRequest::get(format!("/PropertyTrace/property/{}", property_id)),
        vec![Tag::Kind(PropertyTrace), Tag::entity(Property, property_id)],
    ))
}

pub fn create_property_trace(input: &PropertyTraceInput) -> Result<Mutation, ApiError> {
    Ok(mutation(
        ApiRequest::post_json("/PropertyTrace", input)?,
        child_write_tags(PropertyTrace, None, input.id_property.as_deref()),
    ))
}

pub fn update_property_trace(id: &str, input: &PropertyTraceInput) -> Result<Mutation, ApiError> {
    let id = checked(id)?;
    Ok(mutation(
        ApiRequest::put_json(format!("/PropertyTrace/{}", id), input)?,
        child_write_tags(PropertyTrace, Some(id), input.id_property.as_deref()),
    ))
}

pub fn delete_property_trace(id: &str) -> Result<Mutation, ApiError> {
    let id = checked(id)?;
    Ok(mutation(
        ApiRequest::delete(format!("/PropertyTrace/{}", id)),
        child_write_tags(PropertyTrace, Some(id), None),
    ))
}
