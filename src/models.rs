//! Records persisted in the session store and the normalized item view.
//!
//! Every record serializes with camelCase field names so the stored JSON
//! matches what the storefront pages read and write.

use serde::{Deserialize, Serialize};

use crate::catalog::{parse_miles, CatalogEntry};
use crate::config::StoreConfig;

/// Role recorded for the signed-in user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Customer,
    StoreManager,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Customer => "customer",
            Role::StoreManager => "store_manager",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "customer" => Some(Role::Customer),
            "store_manager" => Some(Role::StoreManager),
            _ => None,
        }
    }

    /// Mock user directory used by the sign-in page.
    pub fn for_email(email: &str) -> Option<Self> {
        match email.trim() {
            "customer@example.com" => Some(Role::Customer),
            "store@example.com" => Some(Role::StoreManager),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionInfo {
    pub logged_in: bool,
    pub role: Option<Role>,
    pub email: String,
}

/// Sustainability figures for a single item.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Impact {
    pub co2: f64,
    pub water: f64,
    pub waste: f64,
}

/// Impact summed over a purchase history.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct TotalImpact {
    #[serde(rename = "totalCO2")]
    pub total_co2: f64,
    #[serde(rename = "totalWater")]
    pub total_water: f64,
    #[serde(rename = "totalWaste")]
    pub total_waste: f64,
}

impl TotalImpact {
    pub fn add(&mut self, impact: &Impact) {
        self.total_co2 += impact.co2;
        self.total_water += impact.water;
        self.total_waste += impact.waste;
    }
}

/// A time-boxed hold on an item. One per item name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Reservation {
    pub item_name: String,
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub expires: String,
    #[serde(default)]
    pub expires_timestamp: i64,
    #[serde(default)]
    pub distance: String,
    #[serde(default)]
    pub store: String,
}

impl Reservation {
    pub fn is_expired_at(&self, now_millis: i64) -> bool {
        self.expires_timestamp <= now_millis
    }
}

/// Location details copied onto a reservation. Missing values fall back to
/// the configured defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReservationDetails {
    pub distance: Option<String>,
    pub store: Option<String>,
}

impl From<&Item> for ReservationDetails {
    fn from(item: &Item) -> Self {
        Self {
            distance: Some(item.distance.clone()),
            store: Some(item.store.clone()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseRecord {
    pub item_name: String,
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub timestamp: i64,
}

/// Payload of the manager's "list an item" form.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NewListing {
    pub name: String,
    pub category: String,
    pub size: String,
    pub brand: String,
    pub condition: String,
    pub price: f64,
    pub description: String,
    pub photo_count: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub retail: Option<String>,
}

/// A listing created by a store manager, as stored under `managerListings`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ManagerListing {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub size: String,
    #[serde(default)]
    pub brand: String,
    #[serde(default)]
    pub condition: String,
    #[serde(default)]
    pub price: f64,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub photo_count: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub retail: Option<String>,
    #[serde(default)]
    pub listed_date: String,
    #[serde(default)]
    pub timestamp: i64,
}

impl ManagerListing {
    pub fn from_new(new: NewListing, id: String, listed_date: String, timestamp: i64) -> Self {
        Self {
            id,
            name: new.name,
            category: new.category,
            size: new.size,
            brand: new.brand,
            condition: new.condition,
            price: new.price,
            description: new.description,
            photo_count: new.photo_count,
            image: new.image,
            retail: new.retail,
            listed_date,
            timestamp,
        }
    }

    /// Overwrites every field present in `update`; id and listing time stay.
    pub fn apply(&mut self, update: ListingUpdate) {
        if let Some(name) = update.name {
            self.name = name;
        }
        if let Some(category) = update.category {
            self.category = category;
        }
        if let Some(size) = update.size {
            self.size = size;
        }
        if let Some(brand) = update.brand {
            self.brand = brand;
        }
        if let Some(condition) = update.condition {
            self.condition = condition;
        }
        if let Some(price) = update.price {
            self.price = price;
        }
        if let Some(description) = update.description {
            self.description = description;
        }
        if let Some(photo_count) = update.photo_count {
            self.photo_count = photo_count;
        }
        if let Some(image) = update.image {
            self.image = Some(image);
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ListingUpdate {
    pub name: Option<String>,
    pub category: Option<String>,
    pub size: Option<String>,
    pub brand: Option<String>,
    pub condition: Option<String>,
    pub price: Option<f64>,
    pub description: Option<String>,
    pub photo_count: Option<u32>,
    pub image: Option<String>,
}

/// Where an [`Item`] came from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ItemSource {
    Catalog,
    Manager { id: String },
}

/// Catalog entries and manager listings in one shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Item {
    pub name: String,
    pub url: String,
    pub image: String,
    pub price: f64,
    pub price_display: String,
    pub retail: String,
    pub size: String,
    pub category: String,
    pub brand: String,
    pub store: String,
    pub distance: String,
    pub distance_miles: f64,
    pub impact: Impact,
    pub description: String,
    pub source: ItemSource,
}

impl Item {
    pub fn from_catalog(entry: &CatalogEntry) -> Self {
        Self {
            name: entry.name.to_string(),
            url: entry.url.to_string(),
            image: entry.image.to_string(),
            price: entry.price,
            price_display: entry.price_display.to_string(),
            retail: entry.retail.to_string(),
            size: entry.size.to_string(),
            category: entry.category.to_string(),
            brand: entry.brand.to_string(),
            store: entry.store.to_string(),
            distance: entry.distance.to_string(),
            distance_miles: parse_miles(entry.distance).unwrap_or(0.0),
            impact: entry.impact,
            description: entry.description.to_string(),
            source: ItemSource::Catalog,
        }
    }

    /// Manager listings have no detail page or store location yet, so they
    /// take the configured defaults for those fields and for impact.
    pub fn from_listing(listing: &ManagerListing, config: &StoreConfig) -> Self {
        Self {
            name: listing.name.clone(),
            url: "#".to_string(),
            image: listing
                .image
                .clone()
                .unwrap_or_else(|| config.listing_image.clone()),
            price: listing.price,
            price_display: format!("${}", listing.price),
            retail: listing.retail.clone().unwrap_or_default(),
            size: listing.size.clone(),
            category: listing.category.clone(),
            brand: listing.brand.clone(),
            store: config.default_store.clone(),
            distance: config.default_distance.clone(),
            distance_miles: config.listing_distance_miles,
            impact: config.listing_impact,
            description: listing.description.clone(),
            source: ItemSource::Manager {
                id: listing.id.clone(),
            },
        }
    }

    pub fn is_manager_listing(&self) -> bool {
        matches!(self.source, ItemSource::Manager { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CustomerPreferences {
    pub preferred_sizes: String,
    pub favorite_stores: String,
    pub categories: Vec<String>,
}

impl Default for CustomerPreferences {
    fn default() -> Self {
        Self {
            preferred_sizes: "32x30, M, 9".to_string(),
            favorite_stores: "Goodwill Benton, Thrifty Village".to_string(),
            categories: vec![
                "Vintage".to_string(),
                "Outdoor Gear".to_string(),
                "Streetwear".to_string(),
            ],
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StoreSettings {
    pub store_name: String,
    pub hours: String,
    pub phone: String,
    pub auto_discount_days: u32,
    pub discount_percent: u32,
    pub co2_goal: u32,
}
