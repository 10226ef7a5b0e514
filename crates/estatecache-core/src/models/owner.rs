use chrono::{Datelike, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::PropertyWithDetails;
use crate::utils::format::parse_date;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Owner {
    pub id: Option<String>,
    pub name: Option<String>,
    pub address: Option<String>,
    pub photo: Option<String>,
    #[serde(default)]
    pub birthday: String,
}

impl Owner {
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or("(unnamed)")
    }

    pub fn birth_date(&self) -> Option<NaiveDate> {
        parse_date(&self.birthday)
    }

    pub fn age(&self) -> Option<i32> {
        self.age_on(Utc::now().date_naive())
    }

    /// Age in whole years on `today`.
    pub fn age_on(&self, today: NaiveDate) -> Option<i32> {
        self.birth_date().map(|dob| {
            let mut age = today.year() - dob.year();
            if (today.month(), today.day()) < (dob.month(), dob.day()) {
                age -= 1;
            }
            age
        })
    }

    pub fn age_str(&self) -> String {
        self.age().map(|a| a.to_string()).unwrap_or_else(|| "-".to_string())
    }

    /// Build an update payload from the current record.
    pub fn to_input(&self) -> OwnerInput {
        OwnerInput {
            name: self.name.clone(),
            address: self.address.clone(),
            photo: self.photo.clone(),
            birthday: self.birthday.clone(),
        }
    }
}

// Response from /Owner/{id}/with-properties
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OwnerWithProperties {
    pub id: Option<String>,
    pub name: Option<String>,
    pub address: Option<String>,
    pub photo: Option<String>,
    #[serde(default)]
    pub birthday: String,
    #[serde(default)]
    pub properties: Vec<PropertyWithDetails>,
}

impl OwnerWithProperties {
    pub fn owner(&self) -> Owner {
        Owner {
            id: self.id.clone(),
            name: self.name.clone(),
            address: self.address.clone(),
            photo: self.photo.clone(),
            birthday: self.birthday.clone(),
        }
    }

    pub fn portfolio_value(&self) -> f64 {
        self.properties.iter().map(|p| p.price).sum()
    }
}

/// Create and update payload for `/Owner`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OwnerInput {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub photo: Option<String>,
    pub birthday: String,
}
