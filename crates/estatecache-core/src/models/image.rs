use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PropertyImage {
    pub id: Option<String>,
    pub file: Option<String>,
    #[serde(default)]
    pub enabled: bool,
    pub id_property: Option<String>,
}

impl PropertyImage {
    pub fn to_input(&self) -> PropertyImageInput {
        PropertyImageInput {
            file: self.file.clone(),
            enabled: self.enabled,
            id_property: self.id_property.clone(),
        }
    }
}

/// Create and update payload for `/PropertyImage`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PropertyImageInput {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
    pub enabled: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id_property: Option<String>,
}
