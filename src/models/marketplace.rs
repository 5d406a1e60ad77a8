// src/models/marketplace.rs
//! Marketplace listing data model.
//!
//! Listings are created by sellers once their certificate has been checked and
//! are served back to the marketplace page. Field names follow the camelCase
//! JSON the web client reads.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A seller-created listing shown on the marketplace.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MarketplaceListing {
    /// UUID v4 assigned at creation
    pub id: String,
    pub title: String,
    pub description: String,
    /// Cover image URL, chosen by category
    pub image: String,
    pub price_per_tonne: f64,
    pub country: String,
    pub category: String,
    pub vintage: i64,
    pub verified: bool,
    pub registry: String,
    pub credits: f64,
    pub seller: Seller,

    /// Certificate fields the seller authenticated with, if any
    pub certificate: Option<Value>,

    /// Authentication result the seller received, if any
    pub authentication: Option<Value>,

    /// RFC 3339 creation timestamp
    pub created_at: String,
}

/// Seller contact attached to a listing.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Seller {
    pub id: Option<String>,
    pub name: String,
    pub email: Option<String>,
}

/// Default cover images per project category.
const CATEGORY_IMAGES: [(&str, &str); 6] = [
    ("Reforestation", "https://images.unsplash.com/photo-1542273917363-3b1817f69a2d?w=600&h=400&fit=crop"),
    ("Avoided Deforestation", "https://images.unsplash.com/photo-1441974231531-c6227db76b6e?w=600&h=400&fit=crop"),
    ("Blue Carbon", "https://images.unsplash.com/photo-1559825481-12a05cc00344?w=600&h=400&fit=crop"),
    ("Renewable Energy", "https://images.unsplash.com/photo-1532601224476-15c79f2f7a51?w=600&h=400&fit=crop"),
    ("Clean Cookstoves", "https://images.unsplash.com/photo-1605000797499-95a51c5269ae?w=600&h=400&fit=crop"),
    ("Energy Efficiency", "https://images.unsplash.com/photo-1509391366360-2e959784a276?w=600&h=400&fit=crop"),
];

/// Returns the cover image for a category, falling back to the
/// reforestation picture for unknown categories.
pub fn category_image(category: &str) -> &'static str {
    CATEGORY_IMAGES
        .iter()
        .find(|(name, _)| *name == category)
        .map(|(_, url)| *url)
        .unwrap_or(CATEGORY_IMAGES[0].1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_image_lookup() {
        assert!(category_image("Blue Carbon").contains("photo-1559825481"));
        assert_eq!(category_image("Geothermal"), category_image("Reforestation"));
    }

    #[test]
    fn test_listing_uses_camel_case_keys() {
        let listing = MarketplaceListing {
            id: "id-1".into(),
            title: "Mangrove Restoration".into(),
            description: "Listed by Ana. 500 credits available.".into(),
            image: category_image("Blue Carbon").into(),
            price_per_tonne: 18.5,
            country: "Indonesia".into(),
            category: "Blue Carbon".into(),
            vintage: 2022,
            verified: true,
            registry: "Verra".into(),
            credits: 500.0,
            seller: Seller { id: None, name: "Ana".into(), email: None },
            certificate: None,
            authentication: None,
            created_at: "2026-01-01T00:00:00.000Z".into(),
        };

        let json = serde_json::to_value(&listing).unwrap();
        assert_eq!(json["pricePerTonne"], 18.5);
        assert_eq!(json["createdAt"], "2026-01-01T00:00:00.000Z");
        assert!(json["certificate"].is_null());
        assert!(json["authentication"].is_null());
        assert_eq!(json.as_object().map(|o| o.len()), Some(15));
    }
}
