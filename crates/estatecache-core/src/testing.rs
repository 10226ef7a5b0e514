//! In-memory stand-in for the remote API, used by unit tests.
//!
//! Routes the same paths as the real service, records every request it
//! receives, and can be told to fail specific calls.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use reqwest::{Method, StatusCode};
use serde_json::{json, Map, Value};

use crate::api::{ApiError, ApiRequest, Backend, FormPart, RequestBody};

pub(crate) const OWNER_ANA: &str = "0000000000000000000000a1";
pub(crate) const OWNER_LUIS: &str = "0000000000000000000000a2";
pub(crate) const PROPERTY_VILLA: &str = "0000000000000000000000b1";
pub(crate) const PROPERTY_CASA: &str = "0000000000000000000000b2";
pub(crate) const PROPERTY_DEPTO: &str = "0000000000000000000000b3";
pub(crate) const IMAGE_VILLA: &str = "0000000000000000000000c1";
pub(crate) const TRACE_VILLA: &str = "0000000000000000000000d1";

const OWNER: &str = "Owner";
const PROPERTY: &str = "Property";
const IMAGE: &str = "PropertyImage";
const TRACE: &str = "PropertyTrace";

#[derive(Default)]
struct FakeState {
    collections: HashMap<&'static str, Vec<Value>>,
    requests: Vec<ApiRequest>,
    next_id: u64,
    failing: Vec<(Method, String)>,
    rejected_file_pattern: Option<String>,
}

#[derive(Clone, Default)]
pub(crate) struct FakeBackend {
    state: Arc<Mutex<FakeState>>,
}

impl FakeBackend {
    pub(crate) fn empty() -> Self {
        Self::default()
    }

    /// Two owners, three properties, one image and one trace.
    pub(crate) fn seeded() -> Self {
        let backend = Self::default();
        {
            let mut state = backend.lock();
            state.next_id = 0x100;
            state.collections.insert(
                OWNER,
                vec![
                    json!({"id": OWNER_ANA, "name": "Ana Pérez", "address": "Av. Providencia 1234", "photo": null, "birthday": "1985-03-14"}),
                    json!({"id": OWNER_LUIS, "name": "Luis Soto", "address": "Los Leones 77", "photo": null, "birthday": "1979-11-02"}),
                ],
            );
            state.collections.insert(
                PROPERTY,
                vec![
                    json!({"id": PROPERTY_VILLA, "name": "Villa Moderna", "address": "Camino El Alba 9500", "price": 450000000.0, "codeInternal": "LC-001", "year": 2019, "idOwner": OWNER_ANA}),
                    json!({"id": PROPERTY_CASA, "name": "Casa Colonial", "address": "Calle Larga 12", "price": 120000000.0, "codeInternal": "CC-002", "year": 1950, "idOwner": OWNER_ANA}),
                    json!({"id": PROPERTY_DEPTO, "name": "Depto Centro", "address": "Alameda 100", "price": 85000000.0, "codeInternal": "DC-003", "year": 2005, "idOwner": OWNER_LUIS}),
                ],
            );
            state.collections.insert(
                IMAGE,
                vec![json!({"id": IMAGE_VILLA, "file": "https://cdn.test/villa.jpg", "enabled": true, "idProperty": PROPERTY_VILLA})],
            );
            state.collections.insert(
                TRACE,
                vec![json!({"id": TRACE_VILLA, "dateSale": "2019-06-01T00:00:00.000Z", "name": "Compra inicial", "value": 380000000.0, "tax": 7600000.0, "idProperty": PROPERTY_VILLA})],
            );
        }
        backend
    }

    fn lock(&self) -> MutexGuard<'_, FakeState> {
        self.state.lock().expect("fake backend state poisoned")
    }

    pub(crate) fn request_count(&self) -> usize {
        self.lock().requests.len()
    }

    pub(crate) fn requests(&self) -> Vec<ApiRequest> {
        self.lock().requests.clone()
    }

    pub(crate) fn count(&self, method: Method, path: &str) -> usize {
        self.lock()
            .requests
            .iter()
            .filter(|r| r.method == method && r.path == path)
            .count()
    }

    /// Answer 500 to every `method` request whose path starts with `prefix`.
    pub(crate) fn fail_on(&self, method: Method, prefix: &str) {
        self.lock().failing.push((method, prefix.to_string()));
    }

    pub(crate) fn recover(&self) {
        self.lock().failing.clear();
    }

    /// Answer 400 to uploads whose file name contains `pattern`.
    pub(crate) fn reject_files_containing(&self, pattern: &str) {
        self.lock().rejected_file_pattern = Some(pattern.to_string());
    }

    pub(crate) fn stored(&self, collection: &'static str) -> Vec<Value> {
        self.lock().collections.get(collection).cloned().unwrap_or_default()
    }
}

fn not_found(path: &str) -> ApiError {
    ApiError::from_status(StatusCode::NOT_FOUND, path)
}

fn id_of(value: &Value) -> Option<&str> {
    value.get("id").and_then(Value::as_str)
}

fn str_field<'a>(value: &'a Value, field: &str) -> &'a str {
    value.get(field).and_then(Value::as_str).unwrap_or("")
}

fn query_param<'a>(request: &'a ApiRequest, name: &str) -> Option<&'a str> {
    request
        .query
        .iter()
        .find(|(k, _)| k == name)
        .map(|(_, v)| v.as_str())
}

fn form_text<'a>(parts: &'a [FormPart], field: &str) -> Option<&'a str> {
    parts.iter().find_map(|p| match p {
        FormPart::Text { name, value } if name == field => Some(value.as_str()),
        _ => None,
    })
}

fn form_file(parts: &[FormPart]) -> Option<&str> {
    parts.iter().find_map(|p| match p {
        FormPart::File { file_name, .. } => Some(file_name.as_str()),
        _ => None,
    })
}

fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

impl FakeState {
    fn new_id(&mut self) -> String {
        self.next_id += 1;
        format!("{:024x}", self.next_id)
    }

    fn collection(&mut self, name: &'static str) -> &mut Vec<Value> {
        self.collections.entry(name).or_default()
    }

    fn find(&self, name: &'static str, id: &str) -> Option<Value> {
        self.collections
            .get(name)
            .and_then(|items| items.iter().find(|v| id_of(v) == Some(id)).cloned())
    }

    fn children(&self, name: &'static str, property_id: &str) -> Vec<Value> {
        self.collections
            .get(name)
            .map(|items| {
                items
                    .iter()
                    .filter(|v| str_field(v, "idProperty") == property_id)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default()
    }

    fn property_details(&self, property: &Value) -> Value {
        let mut details = property.clone();
        let id = str_field(property, "id").to_string();
        let owner = self.find(OWNER, str_field(property, "idOwner")).unwrap_or(Value::Null);
        details["owner"] = owner;
        details["images"] = Value::Array(self.children(IMAGE, &id));
        details["traces"] = Value::Array(self.children(TRACE, &id));
        details
    }

    fn list_properties(&self, request: &ApiRequest) -> Value {
        let name = query_param(request, "Name");
        let address = query_param(request, "Address");
        let min = query_param(request, "MinPrice").and_then(|v| v.parse::<f64>().ok());
        let max = query_param(request, "MaxPrice").and_then(|v| v.parse::<f64>().ok());

        let items = self.collections.get(PROPERTY).cloned().unwrap_or_default();
        let matching = items
            .iter()
            .filter(|p| name.map_or(true, |n| contains_ignore_case(str_field(p, "name"), n)))
            .filter(|p| address.map_or(true, |a| contains_ignore_case(str_field(p, "address"), a)))
            .filter(|p| {
                let price = p.get("price").and_then(Value::as_f64).unwrap_or(0.0);
                min.map_or(true, |m| price >= m) && max.map_or(true, |m| price <= m)
            })
            .map(|p| self.property_details(p))
            .collect();
        Value::Array(matching)
    }

    fn create(&mut self, name: &'static str, body: &Value) -> Value {
        let mut created = body.clone();
        let id = self.new_id();
        if let Value::Object(ref mut map) = created {
            map.insert("id".to_string(), Value::String(id));
        }
        self.collection(name).push(created.clone());
        created
    }

    fn update(&mut self, name: &'static str, id: &str, body: &Value, path: &str) -> Result<(), ApiError> {
        let item = self
            .collection(name)
            .iter_mut()
            .find(|v| id_of(v) == Some(id))
            .ok_or_else(|| not_found(path))?;
        if let (Value::Object(target), Value::Object(changes)) = (item, body) {
            for (k, v) in changes {
                target.insert(k.clone(), v.clone());
            }
        }
        Ok(())
    }

    fn remove(&mut self, name: &'static str, id: &str, path: &str) -> Result<(), ApiError> {
        let items = self.collection(name);
        let before = items.len();
        items.retain(|v| id_of(v) != Some(id));
        if items.len() == before {
            return Err(not_found(path));
        }
        Ok(())
    }

    fn route(&mut self, request: &ApiRequest) -> Result<Option<Value>, ApiError> {
        let path = request.path.as_str();
        let segments: Vec<&str> = path.trim_start_matches('/').split('/').collect();
        let json_body = match &request.body {
            RequestBody::Json(v) => v.clone(),
            _ => Value::Object(Map::new()),
        };
        let parts: &[FormPart] = match &request.body {
            RequestBody::Multipart(parts) => parts.as_slice(),
            _ => &[],
        };

        let collection = match segments.first().copied() {
            Some("Owner") => OWNER,
            Some("Property") => PROPERTY,
            Some("PropertyImage") => IMAGE,
            Some("PropertyTrace") => TRACE,
            _ => return Err(not_found(path)),
        };

        match (request.method.clone(), &segments[1..]) {
            (Method::GET, []) if collection == PROPERTY => Ok(Some(self.list_properties(request))),
            (Method::GET, []) => Ok(Some(Value::Array(
                self.collections.get(collection).cloned().unwrap_or_default(),
            ))),
            (Method::POST, []) => Ok(Some(self.create(collection, &json_body))),
            (Method::POST, ["upload"]) if collection == IMAGE => {
                let property_id = form_text(parts, "propertyId").unwrap_or("");
                let enabled = form_text(parts, "enabled") == Some("true");
                let file = form_file(parts).unwrap_or("upload");
                let body = json!({
                    "file": format!("https://cdn.test/{}", file),
                    "enabled": enabled,
                    "idProperty": property_id,
                });
                Ok(Some(self.create(IMAGE, &body)))
            }
            (Method::GET, ["property", property_id]) if collection == TRACE => {
                Ok(Some(Value::Array(self.children(TRACE, property_id))))
            }
            (Method::GET, [id, "with-properties"]) if collection == OWNER => {
                let mut owner = self.find(OWNER, id).ok_or_else(|| not_found(path))?;
                let properties: Vec<Value> = self
                    .collections
                    .get(PROPERTY)
                    .cloned()
                    .unwrap_or_default()
                    .iter()
                    .filter(|p| str_field(p, "idOwner") == *id)
                    .map(|p| self.property_details(p))
                    .collect();
                owner["properties"] = Value::Array(properties);
                Ok(Some(owner))
            }
            (Method::POST, [id, "upload-photo"]) if collection == OWNER => {
                let file = form_file(parts).unwrap_or("photo");
                let body = json!({"photo": format!("https://cdn.test/{}", file)});
                self.update(OWNER, id, &body, path)?;
                Ok(self.find(OWNER, id))
            }
            (Method::POST, [id, "upload"]) if collection == IMAGE => {
                let file = form_file(parts).unwrap_or("upload");
                let enabled = query_param(request, "enabled") == Some("true");
                let body = json!({"file": format!("https://cdn.test/{}", file), "enabled": enabled});
                self.update(IMAGE, id, &body, path)?;
                Ok(self.find(IMAGE, id))
            }
            (Method::GET, [id]) if collection == PROPERTY => {
                let property = self.find(PROPERTY, id).ok_or_else(|| not_found(path))?;
                Ok(Some(self.property_details(&property)))
            }
            (Method::GET, [id]) => self.find(collection, id).map(Some).ok_or_else(|| not_found(path)),
            (Method::PUT, [id]) => {
                self.update(collection, id, &json_body, path)?;
                Ok(None)
            }
            (Method::DELETE, [id]) => {
                self.remove(collection, id, path)?;
                Ok(None)
            }
            _ => Err(not_found(path)),
        }
    }
}

#[async_trait]
impl Backend for FakeBackend {
    async fn execute(&self, request: &ApiRequest) -> Result<Option<Value>, ApiError> {
        let mut state = self.lock();
        state.requests.push(request.clone());

        if state
            .failing
            .iter()
            .any(|(method, prefix)| *method == request.method && request.path.starts_with(prefix.as_str()))
        {
            return Err(ApiError::from_status(StatusCode::INTERNAL_SERVER_ERROR, "injected failure"));
        }

        if let (Some(pattern), RequestBody::Multipart(parts)) = (&state.rejected_file_pattern, &request.body) {
            if form_file(parts).map_or(false, |f| f.contains(pattern.as_str())) {
                return Err(ApiError::from_status(StatusCode::BAD_REQUEST, "unsupported image"));
            }
        }

        state.route(request)
    }
}
