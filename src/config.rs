//! Runtime configuration for a session store.
//!
//! Every field has a default matching the storefront's built-in behavior, so
//! an empty JSON object (`{}`) is a valid configuration.

use serde::{Deserialize, Serialize};

use crate::app_response::AppResponse;
use crate::models::Impact;

/// Toast pacing handed to the UI with every [`crate::feedback::Feedback`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeedbackTiming {
    pub show_after_ms: u64,
    pub visible_ms: u64,
    pub fade_ms: u64,
}

impl Default for FeedbackTiming {
    fn default() -> Self {
        Self {
            show_after_ms: 100,
            visible_ms: 3000,
            fade_ms: 300,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Base name of the LMDB environment; the directory is `<db_name>.lmdb`.
    pub db_name: String,
    pub map_size: usize,
    pub reservation_hold_hours: u32,
    /// Store recorded on a reservation when the item does not name one.
    pub default_store: String,
    pub default_distance: String,
    /// Distance shown for manager listings, which have no store location.
    pub listing_distance_miles: f64,
    /// Estimated impact assigned to manager listings. These items are never
    /// measured individually, so every listing carries the same estimate.
    pub listing_impact: Impact,
    pub listing_image: String,
    pub default_email: String,
    pub recent_listing_limit: usize,
    pub feedback: FeedbackTiming,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            db_name: "thrift_session".to_string(),
            map_size: 10 * 1024 * 1024,
            reservation_hold_hours: 24,
            default_store: "Goodwill Benton".to_string(),
            default_distance: "2.3 miles away".to_string(),
            listing_distance_miles: 2.3,
            listing_impact: Impact {
                co2: 20.0,
                water: 1500.0,
                waste: 4.0,
            },
            listing_image: "images/placeholder.jpg".to_string(),
            default_email: "customer@example.com".to_string(),
            recent_listing_limit: 10,
            feedback: FeedbackTiming::default(),
        }
    }
}

impl StoreConfig {
    pub fn from_json_str(json: &str) -> Result<Self, AppResponse> {
        let config: StoreConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), AppResponse> {
        if self.db_name.trim().is_empty() {
            return Err(AppResponse::ValidationError("db_name cannot be empty".to_string()));
        }
        if self.map_size == 0 {
            return Err(AppResponse::ValidationError("map_size must be positive".to_string()));
        }
        if self.reservation_hold_hours == 0 {
            return Err(AppResponse::ValidationError(
                "reservation_hold_hours must be positive".to_string(),
            ));
        }
        Ok(())
    }
}
