use serde::{Deserialize, Serialize};

use crate::utils::format::format_date;

/// A sale or valuation event attached to a property.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PropertyTrace {
    pub id: Option<String>,
    #[serde(default)]
    pub date_sale: String,
    pub name: Option<String>,
    #[serde(default)]
    pub value: f64,
    #[serde(default)]
    pub tax: f64,
    pub id_property: Option<String>,
}

impl PropertyTrace {
    pub fn date_display(&self) -> String {
        format_date(&self.date_sale)
    }

    pub fn to_input(&self) -> PropertyTraceInput {
        PropertyTraceInput {
            date_sale: self.date_sale.clone(),
            value: self.value,
            tax: self.tax,
            name: self.name.clone(),
            id_property: self.id_property.clone(),
        }
    }
}

/// Create and update payload for `/PropertyTrace`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PropertyTraceInput {
    pub date_sale: String,
    pub value: f64,
    pub tax: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id_property: Option<String>,
}
