use serde::{Deserialize, Serialize};

use super::{Owner, PropertyImage, PropertyTrace};

/// Property as returned by `POST /Property`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Property {
    pub id: Option<String>,
    pub name: Option<String>,
    pub address: Option<String>,
    #[serde(default)]
    pub price: f64,
    pub code_internal: Option<String>,
    #[serde(default)]
    pub year: i32,
    pub id_owner: Option<String>,
}

/// Property with its owner, images and traces, as returned by
/// `GET /Property` and `GET /Property/{id}`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PropertyWithDetails {
    pub id: Option<String>,
    pub name: Option<String>,
    pub address: Option<String>,
    #[serde(default)]
    pub price: f64,
    pub code_internal: Option<String>,
    #[serde(default)]
    pub year: i32,
    pub id_owner: Option<String>,
    pub owner: Option<Owner>,
    #[serde(default)]
    pub images: Vec<PropertyImage>,
    #[serde(default)]
    pub traces: Vec<PropertyTrace>,
}

impl PropertyWithDetails {
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or("(unnamed)")
    }

    /// First enabled image, in server order.
    pub fn primary_image(&self) -> Option<&str> {
        self.images
            .iter()
            .filter(|img| img.enabled)
            .find_map(|img| img.file.as_deref())
    }

    pub fn owner_name(&self) -> Option<&str> {
        self.owner.as_ref().and_then(|o| o.name.as_deref())
    }

    pub fn total_taxes(&self) -> f64 {
        self.traces.iter().map(|t| t.tax).sum()
    }

    pub fn total_sales_value(&self) -> f64 {
        self.traces.iter().map(|t| t.value).sum()
    }

    /// Build an update payload from the current record.
    pub fn to_input(&self) -> PropertyInput {
        PropertyInput {
            name: self.name.clone(),
            address: self.address.clone(),
            price: self.price,
            code_internal: self.code_internal.clone(),
            year: self.year,
            id_owner: self.id_owner.clone(),
        }
    }
}

/// Create and update payload for `/Property`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PropertyInput {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    pub price: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code_internal: Option<String>,
    pub year: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id_owner: Option<String>,
}

/// Landing page counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Stats {
    pub total_owners: usize,
    pub total_properties: usize,
}
