// src/models/listing.rs
//! Registry listing data model.
//!
//! A listing is one entry returned by the carbon registry's `/listings`
//! endpoint. The registry is a third party, so every field is optional and
//! scalar fields are accepted as either strings or numbers.

use crate::utils::serialization::{coerce_to_string, lenient_string};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One marketplace listing offered by the external registry.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct ListingCandidate {
    /// Registry identifier of the credit batch
    #[serde(
        rename = "creditId",
        default,
        deserialize_with = "lenient_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub credit_id: Option<String>,

    /// Project the credits were issued for
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project: Option<ProjectRecord>,
}

/// Project details attached to a registry listing.
///
/// Keys the matcher does not read are kept in `extra` so the record can be
/// echoed back to clients exactly as the registry sent it.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct ProjectRecord {
    #[serde(
        default,
        deserialize_with = "lenient_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub name: Option<String>,

    /// Issuance year; numeric in the registry API but kept verbatim
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vintage: Option<Value>,

    #[serde(
        default,
        deserialize_with = "lenient_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub country: Option<String>,

    #[serde(
        default,
        deserialize_with = "lenient_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub methodology: Option<String>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ProjectRecord {
    /// Vintage coerced to text, so `2023` and `"2023"` compare equal.
    pub fn vintage_text(&self) -> Option<String> {
        self.vintage.as_ref().and_then(coerce_to_string)
    }
}

impl ListingCandidate {
    /// Project record, if the listing carries one.
    pub fn project(&self) -> Option<&ProjectRecord> {
        self.project.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_deserializes_registry_listing() {
        let listing: ListingCandidate = serde_json::from_value(json!({
            "creditId": "VCS-1234-2023",
            "project": {
                "name": "Amazon Rainforest",
                "vintage": 2023,
                "country": "Brazil",
                "methodology": "VCS",
                "category": "Forestry"
            },
            "price": "12.50"
        }))
        .unwrap();

        assert_eq!(listing.credit_id.as_deref(), Some("VCS-1234-2023"));
        let project = listing.project().unwrap();
        assert_eq!(project.name.as_deref(), Some("Amazon Rainforest"));
        assert_eq!(project.vintage_text().as_deref(), Some("2023"));
        assert_eq!(project.extra.get("category"), Some(&json!("Forestry")));
    }

    #[test]
    fn test_project_round_trips_unknown_keys() {
        let raw = json!({
            "name": "Kasigau Corridor",
            "vintage": 2019,
            "registry": "Verra",
            "location": { "lat": -3.8, "lng": 38.6 }
        });

        let project: ProjectRecord = serde_json::from_value(raw.clone()).unwrap();
        assert_eq!(serde_json::to_value(&project).unwrap(), raw);
    }

    #[test]
    fn test_missing_fields_default_to_none() {
        let listing: ListingCandidate = serde_json::from_value(json!({ "creditId": 42 })).unwrap();

        assert_eq!(listing.credit_id.as_deref(), Some("42"));
        assert!(listing.project.is_none());
    }

    #[test]
    fn test_vintage_as_string_is_accepted() {
        let project: ProjectRecord =
            serde_json::from_value(json!({ "vintage": "2020" })).unwrap();

        assert_eq!(project.vintage_text().as_deref(), Some("2020"));
    }
}
