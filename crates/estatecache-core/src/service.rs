//! Cached queries and invalidating mutations over the back-office API.
//!
//! `EstateService` is the entry point the front end talks to. Reads go
//! through the shared `QueryCache`; writes go straight to the backend and,
//! on success, invalidate the tags their endpoint names so the next read
//! refetches. Nothing is patched in place and nothing is retried.

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{info, warn};

use crate::api::endpoints::{self, Mutation, Query};
use crate::api::{ApiError, Backend, Upload};
use crate::cache::{CacheKey, EntityKind, QueryCache, Tag};
use crate::filters::PropertyFilters;
use crate::models::{
    Owner, OwnerInput, OwnerWithProperties, Property, PropertyImage, PropertyImageInput,
    PropertyInput, PropertyTrace, PropertyTraceInput, PropertyWithDetails, Stats,
};
use crate::utils::format::to_iso_timestamp;
use crate::validation::{validate_owner, validate_property_now, validate_trace, validate_traces};

/// Cache key for the derived landing-page counters.
const STATS_KEY: &str = "stats";

fn decode_list<T: DeserializeOwned>(value: Value) -> Result<Vec<T>, ApiError> {
    if value.is_null() {
        return Ok(Vec::new());
    }
    serde_json::from_value(value)
        .map_err(|e| ApiError::InvalidResponse(format!("Unexpected list payload: {}", e)))
}

fn decode_one<T: DeserializeOwned>(value: Option<Value>, what: &str) -> Result<T, ApiError> {
    match value {
        None | Some(Value::Null) => Err(ApiError::InvalidResponse(format!("Empty response for {}", what))),
        Some(value) => serde_json::from_value(value)
            .map_err(|e| ApiError::InvalidResponse(format!("Unexpected {} payload: {}", what, e))),
    }
}

/// Outcome of creating a property together with its images and traces.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchSummary {
    pub property_id: String,
    pub images_uploaded: usize,
    pub images_failed: usize,
    pub traces_created: usize,
    pub traces_failed: usize,
}

impl BatchSummary {
    pub fn new(property_id: String) -> Self {
        Self {
            property_id,
            ..Default::default()
        }
    }

    pub fn is_complete(&self) -> bool {
        self.images_failed == 0 && self.traces_failed == 0
    }

    /// One-line report of the whole batch.
    pub fn message(&self) -> String {
        let mut failures = Vec::new();
        if self.images_failed > 0 {
            failures.push(format!("{} image(s) could not be uploaded", self.images_failed));
        }
        if self.traces_failed > 0 {
            failures.push(format!("{} trace(s) could not be created", self.traces_failed));
        }
        if !failures.is_empty() {
            return format!("Property created, but {}", failures.join(" and "));
        }

        let mut extras = Vec::new();
        if self.images_uploaded > 0 {
            extras.push(format!("{} image(s)", self.images_uploaded));
        }
        if self.traces_created > 0 {
            extras.push(format!("{} trace(s)", self.traces_created));
        }
        if extras.is_empty() {
            "Property created".to_string()
        } else {
            format!("Property created with {}", extras.join(" and "))
        }
    }
}

/// Cached access to owners, properties, images and traces.
/// Clone is cheap and clones share one cache.
pub struct EstateService<B: Backend> {
    backend: Arc<B>,
    cache: Arc<QueryCache>,
}

impl<B: Backend> Clone for EstateService<B> {
    fn clone(&self) -> Self {
        Self {
            backend: Arc::clone(&self.backend),
            cache: Arc::clone(&self.cache),
        }
    }
}

impl<B: Backend> EstateService<B> {
    pub fn new(backend: B) -> Self {
        Self::with_cache(Arc::new(backend), Arc::new(QueryCache::new()))
    }

    pub fn with_cache(backend: Arc<B>, cache: Arc<QueryCache>) -> Self {
        Self { backend, cache }
    }

    pub fn cache(&self) -> &Arc<QueryCache> {
        &self.cache
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    async fn query(&self, query: Query) -> Result<Value, ApiError> {
        let Query { request, tags } = query;
        let key = CacheKey::from_request(&request);
        let backend = Arc::clone(&self.backend);
        self.cache
            .fetch(key, tags, move || async move {
                backend
                    .execute(&request)
                    .await
                    .map(|body| body.unwrap_or(Value::Null))
            })
            .await
    }

    async fn mutate(&self, mutation: Mutation) -> Result<Option<Value>, ApiError> {
        let Mutation { request, invalidates } = mutation;
        let result = self.backend.execute(&request).await?;
        info!(method = %request.method, path = %request.path, "Mutation applied");
        self.cache.invalidate(&invalidates).await;
        Ok(result)
    }

    // ===== Owners =====

    pub async fn owners(&self) -> Result<Vec<Owner>, ApiError> {
        decode_list(self.query(endpoints::list_owners()).await?)
    }

    pub async fn owner(&self, id: &str) -> Result<Owner, ApiError> {
        let query = endpoints::get_owner(id)?;
        decode_one(Some(self.query(query).await?), "owner")
    }

    pub async fn owner_with_properties(&self, id: &str) -> Result<OwnerWithProperties, ApiError> {
        let query = endpoints::owner_with_properties(id)?;
        decode_one(Some(self.query(query).await?), "owner")
    }

    pub async fn create_owner(&self, input: &OwnerInput) -> Result<Owner, ApiError> {
        validate_owner(input)?;
        decode_one(self.mutate(endpoints::create_owner(input)?).await?, "created owner")
    }

    pub async fn update_owner(&self, id: &str, input: &OwnerInput) -> Result<(), ApiError> {
        let mutation = endpoints::update_owner(id, input)?;
        validate_owner(input)?;
        self.mutate(mutation).await.map(|_| ())
    }

    /// Properties that still reference the owner are left for the server to resolve.
    pub async fn delete_owner(&self, id: &str) -> Result<(), ApiError> {
        self.mutate(endpoints::delete_owner(id)?).await.map(|_| ())
    }

    pub async fn upload_owner_photo(&self, id: &str, upload: Upload) -> Result<(), ApiError> {
        self.mutate(endpoints::upload_owner_photo(id, upload)?).await.map(|_| ())
    }

    // ===== Properties =====

    pub async fn properties(&self, filters: &PropertyFilters) -> Result<Vec<PropertyWithDetails>, ApiError> {
        decode_list(self.query(endpoints::list_properties(filters)).await?)
    }

    pub async fn property(&self, id: &str) -> Result<PropertyWithDetails, ApiError> {
        let query = endpoints::get_property(id)?;
        decode_one(Some(self.query(query).await?), "property")
    }

    pub async fn create_property(&self, input: &PropertyInput) -> Result<Property, ApiError> {
        validate_property_now(input)?;
        decode_one(self.mutate(endpoints::create_property(input)?).await?, "created property")
    }

    pub async fn update_property(&self, id: &str, input: &PropertyInput) -> Result<(), ApiError> {
        let mutation = endpoints::update_property(id, input)?;
        validate_property_now(input)?;
        self.mutate(mutation).await.map(|_| ())
    }

    pub async fn delete_property(&self, id: &str) -> Result<(), ApiError> {
        self.mutate(endpoints::delete_property(id)?).await.map(|_| ())
    }

    /// Create a property, then upload its images and create its traces.
    ///
    /// The property and every trace are validated before the first request.
    /// Image and trace failures after the property exists are counted in
    /// the summary instead of aborting the batch.
    pub async fn create_property_with_details(
        &self,
        input: &PropertyInput,
        images: Vec<Upload>,
        traces: Vec<PropertyTraceInput>,
    ) -> Result<BatchSummary, ApiError> {
        validate_property_now(input)?;
        validate_traces(&traces)?;

        let created = self.create_property(input).await?;
        let property_id = created
            .id
            .filter(|id| !id.is_empty())
            .ok_or_else(|| ApiError::InvalidResponse("Created property has no id".to_string()))?;

        let mut summary = BatchSummary::new(property_id.clone());

        for upload in images {
            let file_name = upload.file_name.clone();
            // The first successful upload becomes the primary image
            let enabled = summary.images_uploaded == 0;
            match self.upload_property_image(&property_id, upload, enabled).await {
                Ok(()) => summary.images_uploaded += 1,
                Err(e) => {
                    warn!(property = %property_id, file = %file_name, error = %e, "Image upload failed");
                    summary.images_failed += 1;
                }
            }
        }

        for trace in traces {
            let trace = PropertyTraceInput {
                date_sale: to_iso_timestamp(&trace.date_sale),
                id_property: Some(property_id.clone()),
                ..trace
            };
            match self.create_property_trace(&trace).await {
                Ok(_) => summary.traces_created += 1,
                Err(e) => {
                    warn!(property = %property_id, error = %e, "Trace creation failed");
                    summary.traces_failed += 1;
                }
            }
        }

        info!(property = %property_id, summary = %summary.message(), "Property batch finished");
        Ok(summary)
    }

    // ===== Property images =====

    pub async fn property_images(&self) -> Result<Vec<PropertyImage>, ApiError> {
        decode_list(self.query(endpoints::list_property_images()).await?)
    }

    pub async fn property_image(&self, id: &str) -> Result<PropertyImage, ApiError> {
        let query = endpoints::get_property_image(id)?;
        decode_one(Some(self.query(query).await?), "image")
    }

    pub async fn create_property_image(&self, input: &PropertyImageInput) -> Result<PropertyImage, ApiError> {
        decode_one(self.mutate(endpoints::create_property_image(input)?).await?, "created image")
    }

    pub async fn update_property_image(&self, id: &str, input: &PropertyImageInput) -> Result<(), ApiError> {
        self.mutate(endpoints::update_property_image(id, input)?).await.map(|_| ())
    }

    pub async fn delete_property_image(&self, id: &str) -> Result<(), ApiError> {
        self.mutate(endpoints::delete_property_image(id)?).await.map(|_| ())
    }

    pub async fn upload_property_image(&self, property_id: &str, upload: Upload, enabled: bool) -> Result<(), ApiError> {
        self.mutate(endpoints::upload_property_image(property_id, upload, enabled)?)
            .await
            .map(|_| ())
    }

    pub async fn replace_property_image_file(&self, id: &str, upload: Upload, enabled: bool) -> Result<(), ApiError> {
        self.mutate(endpoints::replace_property_image_file(id, upload, enabled)?)
            .await
            .map(|_| ())
    }

    /// Enable or disable an image, keeping its file and property.
    pub async fn set_image_enabled(&self, id: &str, enabled: bool) -> Result<(), ApiError> {
        // Read the current record from the server, not the cache
        let current: PropertyImage = decode_one(
            self.backend.execute(&endpoints::get_property_image(id)?.request).await?,
            "image",
        )?;
        let input = PropertyImageInput {
            enabled,
            ..current.to_input()
        };
        self.update_property_image(id, &input).await
    }

    // ===== Property traces =====

    pub async fn property_traces(&self) -> Result<Vec<PropertyTrace>, ApiError> {
        decode_list(self.query(endpoints::list_property_traces()).await?)
    }

    pub async fn property_trace(&self, id: &str) -> Result<PropertyTrace, ApiError> {
        let query = endpoints::get_property_trace(id)?;
        decode_one(Some(self.query(query).await?), "trace")
    }

    pub async fn traces_for_property(&self, property_id: &str) -> Result<Vec<PropertyTrace>, ApiError> {
        decode_list(self.query(endpoints::traces_for_property(property_id)?).await?)
    }

    pub async fn create_property_trace(&self, input: &PropertyTraceInput) -> Result<PropertyTrace, ApiError> {
        validate_trace(input)?;
        decode_one(self.mutate(endpoints::create_property_trace(input)?).await?, "created trace")
    }

    pub async fn update_property_trace(&self, id: &str, input: &PropertyTraceInput) -> Result<(), ApiError> {
        let mutation = endpoints::update_property_trace(id, input)?;
        validate_trace(input)?;
        self.mutate(mutation).await.map(|_| ())
    }

    pub async fn delete_property_trace(&self, id: &str) -> Result<(), ApiError> {
        self.mutate(endpoints::delete_property_trace(id)?).await.map(|_| ())
    }

    pub async fn total_taxes(&self, property_id: &str) -> Result<f64, ApiError> {
        let traces = self.traces_for_property(property_id).await?;
        Ok(traces.iter().map(|t| t.tax).sum())
    }

    pub async fn total_sales_value(&self, property_id: &str) -> Result<f64, ApiError> {
        let traces = self.traces_for_property(property_id).await?;
        Ok(traces.iter().map(|t| t.value).sum())
    }

    // ===== Stats =====

    /// Owner and property counts, fetched concurrently.
    pub async fn stats(&self) -> Result<Stats, ApiError> {
        let value = self
            .cache
            .fetch(
                CacheKey::named(STATS_KEY),
                vec![Tag::Kind(EntityKind::Stats)],
                move || async move {
                    let unfiltered = PropertyFilters::default();
                    let (owners, properties) =
                        tokio::try_join!(self.owners(), self.properties(&unfiltered))?;
                    let stats = Stats {
                        total_owners: owners.len(),
                        total_properties: properties.len(),
                    };
                    serde_json::to_value(stats)
                        .map_err(|e| ApiError::InvalidResponse(format!("Failed to encode stats: {}", e)))
                },
            )
            .await?;
        decode_one(Some(value), "stats")
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::*;
    use reqwest::Method;

    fn service() -> (EstateService<FakeBackend>, FakeBackend) {
        let backend = FakeBackend::seeded();
        (EstateService::new(backend.clone()), backend)
    }

    fn new_property() -> PropertyInput {
        PropertyInput {
            name: Some("Parcela Sur".to_string()),
            address: Some("Ruta 5 Sur km 20".to_string()),
            price: 95_000_000.0,
            code_internal: Some("PS-010".to_string()),
            year: 2012,
            id_owner: Some(OWNER_LUIS.to_string()),
        }
    }

    fn trace(name: &str, value: f64, tax: f64) -> PropertyTraceInput {
        PropertyTraceInput {
            date_sale: "2024-01-01".to_string(),
            value,
            tax,
            name: Some(name.to_string()),
            id_property: None,
        }
    }

    #[tokio::test]
    async fn test_malformed_ids_never_reach_network() {
        let (service, backend) = service();
        for bad in ["", "abc", "0000000000000000000000a", "0000000000000000000000a1x"] {
            assert!(service.owner(bad).await.unwrap_err().is_client_side());
            assert!(service.property(bad).await.unwrap_err().is_client_side());
            assert!(service.delete_owner(bad).await.unwrap_err().is_client_side());
            assert!(service.delete_property(bad).await.unwrap_err().is_client_side());
            assert!(service.traces_for_property(bad).await.unwrap_err().is_client_side());
            assert!(service.set_image_enabled(bad, true).await.unwrap_err().is_client_side());
            assert!(service
                .upload_owner_photo(bad, Upload::new("me.jpg", vec![1, 2]))
                .await
                .unwrap_err()
                .is_client_side());
        }
        assert_eq!(backend.request_count(), 0);
    }

    #[tokio::test]
    async fn test_empty_collections_decode_as_empty_lists() {
        let service = EstateService::new(FakeBackend::empty());
        assert!(service.owners().await.expect("owners").is_empty());
        assert!(service.property_images().await.expect("images").is_empty());
        assert_eq!(service.stats().await.expect("stats"), Stats::default());
    }

    #[tokio::test]
    async fn test_repeated_reads_hit_cache() {
        let (service, backend) = service();
        let first = service.owners().await.expect("owners");
        let second = service.owners().await.expect("owners again");
        assert_eq!(first, second);
        assert_eq!(backend.count(Method::GET, "/Owner"), 1);
    }

    #[tokio::test]
    async fn test_distinct_filters_are_cached_separately() {
        let (service, backend) = service();
        let villa = PropertyFilters {
            name: Some("villa".to_string()),
            ..Default::default()
        };
        let all = service.properties(&PropertyFilters::default()).await.expect("all");
        let filtered = service.properties(&villa).await.expect("filtered");
        service.properties(&villa).await.expect("filtered again");

        assert_eq!(all.len(), 3);
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].id.as_deref(), Some(PROPERTY_VILLA));
        assert_eq!(backend.count(Method::GET, "/Property"), 2);
    }

    #[tokio::test]
    async fn test_create_owner_is_visible_on_next_read() {
        let (service, _backend) = service();
        assert_eq!(service.owners().await.expect("owners").len(), 2);

        let created = service
            .create_owner(&OwnerInput {
                name: Some("Carla Rojas".to_string()),
                address: Some("Av. Matta 450".to_string()),
                photo: None,
                birthday: "1992-07-21".to_string(),
            })
            .await
            .expect("create owner");
        assert!(created.id.is_some());

        let owners = service.owners().await.expect("owners after create");
        assert_eq!(owners.len(), 3);
        assert!(owners.iter().any(|o| o.name.as_deref() == Some("Carla Rojas")));
    }

    #[tokio::test]
    async fn test_update_property_invalidates_detail_and_lists() {
        let (service, backend) = service();
        let before = service.property(PROPERTY_CASA).await.expect("detail");
        let cheap = PropertyFilters {
            max_price: Some(100_000_000.0),
            ..Default::default()
        };
        assert_eq!(service.properties(&cheap).await.expect("cheap").len(), 1);

        let input = PropertyInput {
            price: 99_000_000.0,
            ..before.to_input()
        };
        service.update_property(PROPERTY_CASA, &input).await.expect("update");

        let after = service.property(PROPERTY_CASA).await.expect("detail after");
        assert_eq!(after.price, 99_000_000.0);
        assert_eq!(service.properties(&cheap).await.expect("cheap after").len(), 2);
        assert_eq!(backend.count(Method::GET, &format!("/Property/{}", PROPERTY_CASA)), 2);
    }

    #[tokio::test]
    async fn test_failed_mutation_keeps_cache() {
        let (service, backend) = service();
        service.owners().await.expect("owners");
        backend.fail_on(Method::DELETE, "/Owner");

        let err = service.delete_owner(OWNER_LUIS).await.unwrap_err();
        assert!(matches!(err, ApiError::ServerError(_)));
        assert_eq!(err.to_string(), "Server error: injected failure");

        service.owners().await.expect("still cached");
        assert_eq!(backend.count(Method::GET, "/Owner"), 1);
        assert_eq!(backend.count(Method::DELETE, &format!("/Owner/{}", OWNER_LUIS)), 1);
    }

    #[tokio::test]
    async fn test_failed_read_is_not_retried_until_asked() {
        let (service, backend) = service();
        backend.fail_on(Method::GET, "/Owner");

        assert!(service.owners().await.is_err());
        assert_eq!(backend.count(Method::GET, "/Owner"), 1);
        let key = CacheKey::new("/Owner", Vec::new());
        assert!(service.cache().last_error(&key).await.is_some());

        backend.recover();
        assert_eq!(service.owners().await.expect("manual retry").len(), 2);
        assert_eq!(backend.count(Method::GET, "/Owner"), 2);
    }

    #[tokio::test]
    async fn test_delete_owner_with_properties_is_not_blocked() {
        let (service, backend) = service();
        let owner = service.owner_with_properties(OWNER_ANA).await.expect("owner");
        assert_eq!(owner.properties.len(), 2);

        service.delete_owner(OWNER_ANA).await.expect("delete succeeds");

        assert_eq!(service.owners().await.expect("owners").len(), 1);
        // Properties keep their dangling owner reference
        let orphans: Vec<_> = service
            .properties(&PropertyFilters::default())
            .await
            .expect("properties")
            .into_iter()
            .filter(|p| p.id_owner.as_deref() == Some(OWNER_ANA))
            .collect();
        assert_eq!(orphans.len(), 2);
        assert!(orphans.iter().all(|p| p.owner.is_none()));
        assert_eq!(backend.stored("Property").len(), 3);
    }

    #[tokio::test]
    async fn test_trace_with_tax_above_value_is_rejected_before_any_request() {
        let (service, backend) = service();
        let err = service
            .create_property_with_details(
                &new_property(),
                Vec::new(),
                vec![trace("Compra inicial", 1_000_000.0, 1_200_000.0)],
            )
            .await
            .unwrap_err();

        assert!(matches!(err, ApiError::Validation(_)));
        assert!(err.to_string().contains("tax cannot exceed value"));
        assert_eq!(backend.request_count(), 0);
    }

    #[tokio::test]
    async fn test_single_trace_creation_is_validated() {
        let (service, backend) = service();
        let mut bad = trace("Avalúo", 10.0, 20.0);
        bad.id_property = Some(PROPERTY_VILLA.to_string());
        assert!(service.create_property_trace(&bad).await.is_err());
        assert_eq!(backend.request_count(), 0);
    }

    #[tokio::test]
    async fn test_batch_create_counts_partial_failures() {
        let (service, backend) = service();
        backend.reject_files_containing("corrupt");

        let images = vec![
            Upload::new("corrupt.jpg", vec![0]),
            Upload::new("front.jpg", vec![1]),
            Upload::new("back.jpg", vec![2]),
        ];
        let traces = vec![
            trace("Compra inicial", 90_000_000.0, 1_800_000.0),
            trace("Avalúo", 95_000_000.0, 0.0),
        ];

        let summary = service
            .create_property_with_details(&new_property(), images, traces)
            .await
            .expect("batch");

        assert_eq!(summary.images_uploaded, 2);
        assert_eq!(summary.images_failed, 1);
        assert_eq!(summary.traces_created, 2);
        assert!(!summary.is_complete());
        assert_eq!(summary.message(), "Property created, but 1 image(s) could not be uploaded");

        let created = service.property(&summary.property_id).await.expect("detail");
        assert_eq!(created.images.len(), 2);
        // Only the first successful upload is the primary one
        assert_eq!(created.primary_image(), Some("https://cdn.test/front.jpg"));
        assert_eq!(created.traces.len(), 2);
        assert!(created.traces.iter().all(|t| t.date_sale == "2024-01-01T00:00:00.000Z"));
    }

    #[tokio::test]
    async fn test_image_upload_refreshes_property_detail() {
        let (service, _backend) = service();
        let before = service.property(PROPERTY_DEPTO).await.expect("detail");
        assert!(before.images.is_empty());

        service
            .upload_property_image(PROPERTY_DEPTO, Upload::new("living.jpg", vec![9]), true)
            .await
            .expect("upload");

        let after = service.property(PROPERTY_DEPTO).await.expect("detail after");
        assert_eq!(after.primary_image(), Some("https://cdn.test/living.jpg"));
    }

    #[tokio::test]
    async fn test_set_image_enabled_keeps_file() {
        let (service, _backend) = service();
        service.set_image_enabled(IMAGE_VILLA, false).await.expect("toggle");

        let image = service.property_image(IMAGE_VILLA).await.expect("image");
        assert!(!image.enabled);
        assert_eq!(image.file.as_deref(), Some("https://cdn.test/villa.jpg"));
        assert_eq!(image.id_property.as_deref(), Some(PROPERTY_VILLA));
    }

    #[tokio::test]
    async fn test_trace_totals_follow_mutations() {
        let (service, _backend) = service();
        assert_eq!(service.total_taxes(PROPERTY_VILLA).await.expect("taxes"), 7_600_000.0);

        let mut sale = trace("Venta", 450_000_000.0, 9_000_000.0);
        sale.id_property = Some(PROPERTY_VILLA.to_string());
        service.create_property_trace(&sale).await.expect("create trace");

        assert_eq!(service.total_taxes(PROPERTY_VILLA).await.expect("taxes"), 16_600_000.0);
        assert_eq!(
            service.total_sales_value(PROPERTY_VILLA).await.expect("value"),
            830_000_000.0
        );

        service.delete_property_trace(TRACE_VILLA).await.expect("delete trace");
        assert_eq!(service.property_traces().await.expect("traces").len(), 1);
    }

    #[tokio::test]
    async fn test_stats_follow_creates_and_deletes() {
        let (service, backend) = service();
        assert_eq!(
            service.stats().await.expect("stats"),
            Stats {
                total_owners: 2,
                total_properties: 3
            }
        );
        service.stats().await.expect("cached stats");
        assert_eq!(backend.count(Method::GET, "/Owner"), 1);

        service.delete_property(PROPERTY_DEPTO).await.expect("delete");
        assert_eq!(service.stats().await.expect("stats").total_properties, 2);
    }

    #[tokio::test]
    async fn test_owner_photo_upload_refreshes_owner() {
        let (service, backend) = service();
        assert_eq!(service.owner(OWNER_LUIS).await.expect("owner").photo, None);
        service
            .upload_owner_photo(OWNER_LUIS, Upload::new("luis.png", vec![7]))
            .await
            .expect("upload");
        assert_eq!(
            service.owner(OWNER_LUIS).await.expect("owner").photo.as_deref(),
            Some("https://cdn.test/luis.png")
        );
        let uploads = backend
            .requests()
            .into_iter()
            .filter(|r| r.path.ends_with("/upload-photo"))
            .count();
        assert_eq!(uploads, 1);
    }

    #[test]
    fn test_batch_summary_messages() {
        let mut summary = BatchSummary::new("x".to_string());
        assert_eq!(summary.message(), "Property created");
        summary.images_uploaded = 2;
        summary.traces_created = 1;
        assert_eq!(summary.message(), "Property created with 2 image(s) and 1 trace(s)");
        summary.traces_failed = 1;
        assert_eq!(summary.message(), "Property created, but 1 trace(s) could not be created");
    }
}
