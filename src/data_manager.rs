//! Typed access to everything a session stores.
//!
//! `DataManager` is built once per session over a [`SessionStorage`] and
//! handed to the page controllers. Lookups never fail: a missing or
//! malformed key reads as the empty collection (or default object), and
//! "already exists" / "not found" outcomes are reported through `bool`
//! returns. Only storage write failures surface as [`AppResponse`] errors.

use chrono::{DateTime, Duration, Local, TimeZone};
use log::{debug, info, warn};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::app_response::AppResponse;
use crate::catalog::{self, CatalogEntry};
use crate::config::StoreConfig;
use crate::feedback::{Feedback, FeedbackKind};
use crate::models::{
    CustomerPreferences, Item, ListingUpdate, ManagerListing, NewListing, PurchaseRecord,
    Reservation, ReservationDetails, Role, SessionInfo, StoreSettings, TotalImpact,
};
use crate::session_storage::{keys, SessionStorage};

/// `10/16/2026`
pub fn format_date<Tz: TimeZone>(at: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    at.format("%-m/%-d/%Y").to_string()
}

/// `Oct 17, 3:04 PM`
pub fn format_expiry<Tz: TimeZone>(at: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    at.format("%b %-d, %-I:%M %p").to_string()
}

pub struct DataManager<S: SessionStorage> {
    storage: S,
    config: StoreConfig,
}

impl<S: SessionStorage> DataManager<S> {
    /// Wraps `storage` without touching it.
    pub fn new(storage: S, config: StoreConfig) -> Self {
        Self { storage, config }
    }

    /// Wraps `storage` and makes sure every collection key exists.
    pub fn open(storage: S, config: StoreConfig) -> Result<Self, AppResponse> {
        let manager = Self::new(storage, config);
        manager.initialize_data()?;
        Ok(manager)
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn storage_mut(&mut self) -> &mut S {
        &mut self.storage
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    pub fn into_storage(self) -> S {
        self.storage
    }

    // ---------------------------------------------------------------
    // Raw key access
    // ---------------------------------------------------------------

    fn read_raw(&self, key: &str) -> Option<String> {
        match self.storage.get_item(key) {
            Ok(value) => value,
            Err(e) => {
                warn!("Reading '{key}' failed, treating it as absent: {e}");
                None
            }
        }
    }

    fn read_list<T: DeserializeOwned>(&self, key: &str) -> Vec<T> {
        let Some(raw) = self.read_raw(key) else {
            return Vec::new();
        };
        match serde_json::from_str(&raw) {
            Ok(list) => list,
            Err(e) => {
                warn!("Malformed JSON under '{key}', reading it as empty: {e}");
                Vec::new()
            }
        }
    }

    fn write_list<T: Serialize>(&self, key: &str, list: &[T]) -> Result<(), AppResponse> {
        let json = serde_json::to_string(list)?;
        self.storage.set_item(key, &json)
    }

    fn read_object<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let raw = self.read_raw(key)?;
        match serde_json::from_str(&raw) {
            Ok(value) => Some(value),
            Err(e) => {
                warn!("Malformed JSON under '{key}', using defaults: {e}");
                None
            }
        }
    }

    // ---------------------------------------------------------------
    // Session flags
    // ---------------------------------------------------------------

    pub fn is_logged_in(&self) -> bool {
        self.read_raw(keys::LOGGED_IN).as_deref() == Some("true")
    }

    pub fn user_role(&self) -> Option<Role> {
        self.read_raw(keys::ROLE).and_then(|role| Role::parse(&role))
    }

    pub fn user_email(&self) -> String {
        self.read_raw(keys::USER_EMAIL)
            .filter(|email| !email.is_empty())
            .unwrap_or_else(|| self.config.default_email.clone())
    }

    pub fn session_info(&self) -> SessionInfo {
        SessionInfo {
            logged_in: self.is_logged_in(),
            role: self.user_role(),
            email: self.user_email(),
        }
    }

    /// Signs in one of the mock users. Unknown emails leave the session
    /// untouched.
    pub fn sign_in(&self, email: &str) -> Result<Role, AppResponse> {
        let email = email.trim();
        let role = Role::for_email(email)
            .ok_or_else(|| AppResponse::ValidationError("Invalid login".to_string()))?;

        self.storage.set_item(keys::LOGGED_IN, "true")?;
        self.storage.set_item(keys::ROLE, role.as_str())?;
        self.storage.set_item(keys::USER_EMAIL, email)?;
        info!("Signed in {email} as {}", role.as_str());
        Ok(role)
    }

    /// Wipes the whole session and starts over with empty collections.
    pub fn sign_out(&self) -> Result<(), AppResponse> {
        self.storage.clear()?;
        self.initialize_data()?;
        info!("Session signed out and cleared");
        Ok(())
    }

    /// Creates any missing collection as an empty list. Existing values,
    /// malformed or not, are left alone.
    pub fn initialize_data(&self) -> Result<(), AppResponse> {
        for key in keys::COLLECTIONS {
            if self.read_raw(key).is_none() {
                self.storage.set_item(key, "[]")?;
                debug!("Initialized empty collection '{key}'");
            }
        }
        Ok(())
    }

    // ---------------------------------------------------------------
    // Saved items
    // ---------------------------------------------------------------

    pub fn saved_items(&self) -> Vec<String> {
        self.read_list(keys::SAVED_ITEMS)
    }

    pub fn add_saved_item(&self, name: &str) -> Result<bool, AppResponse> {
        let mut saved = self.saved_items();
        if saved.iter().any(|saved_name| saved_name == name) {
            return Ok(false);
        }
        saved.push(name.to_string());
        self.write_list(keys::SAVED_ITEMS, &saved)?;
        Ok(true)
    }

    pub fn remove_saved_item(&self, name: &str) -> Result<(), AppResponse> {
        let mut saved = self.saved_items();
        saved.retain(|saved_name| saved_name != name);
        self.write_list(keys::SAVED_ITEMS, &saved)
    }

    pub fn is_item_saved(&self, name: &str) -> bool {
        self.saved_items().iter().any(|saved_name| saved_name == name)
    }

    // ---------------------------------------------------------------
    // Reservations
    // ---------------------------------------------------------------

    pub fn reservations(&self) -> Vec<Reservation> {
        self.read_list(keys::RESERVATIONS)
    }

    pub fn reservation_for(&self, name: &str) -> Option<Reservation> {
        self.reservations()
            .into_iter()
            .find(|reservation| reservation.item_name == name)
    }

    pub fn add_reservation(
        &self,
        name: &str,
        details: &ReservationDetails,
    ) -> Result<bool, AppResponse> {
        self.add_reservation_at(name, details, Local::now())
    }

    /// Holds `name` for the configured number of hours starting at `now`.
    /// Returns `false` without writing when a hold already exists.
    pub fn add_reservation_at<Tz: TimeZone>(
        &self,
        name: &str,
        details: &ReservationDetails,
        now: DateTime<Tz>,
    ) -> Result<bool, AppResponse>
    where
        Tz::Offset: std::fmt::Display,
    {
        let mut reservations = self.reservations();
        if reservations.iter().any(|r| r.item_name == name) {
            return Ok(false);
        }

        let expires_at = now.clone() + Duration::hours(i64::from(self.config.reservation_hold_hours));
        reservations.push(Reservation {
            item_name: name.to_string(),
            date: format_date(&now),
            expires: format_expiry(&expires_at),
            expires_timestamp: expires_at.timestamp_millis(),
            distance: details
                .distance
                .clone()
                .unwrap_or_else(|| self.config.default_distance.clone()),
            store: details
                .store
                .clone()
                .unwrap_or_else(|| self.config.default_store.clone()),
        });

        self.write_list(keys::RESERVATIONS, &reservations)?;
        Ok(true)
    }

    pub fn remove_reservation(&self, name: &str) -> Result<(), AppResponse> {
        let mut reservations = self.reservations();
        reservations.retain(|r| r.item_name != name);
        self.write_list(keys::RESERVATIONS, &reservations)
    }

    pub fn is_item_reserved(&self, name: &str) -> bool {
        self.reservations().iter().any(|r| r.item_name == name)
    }

    /// Holds whose expiry is at or before `now`. Nothing releases them
    /// unless [`release_expired_reservations_at`] is called.
    ///
    /// [`release_expired_reservations_at`]: DataManager::release_expired_reservations_at
    pub fn expired_reservations_at(&self, now_millis: i64) -> Vec<Reservation> {
        self.reservations()
            .into_iter()
            .filter(|r| r.is_expired_at(now_millis))
            .collect()
    }

    pub fn release_expired_reservations(&self) -> Result<Vec<Reservation>, AppResponse> {
        self.release_expired_reservations_at(Local::now().timestamp_millis())
    }

    pub fn release_expired_reservations_at(
        &self,
        now_millis: i64,
    ) -> Result<Vec<Reservation>, AppResponse> {
        let (expired, active): (Vec<_>, Vec<_>) = self
            .reservations()
            .into_iter()
            .partition(|r| r.is_expired_at(now_millis));

        if !expired.is_empty() {
            self.write_list(keys::RESERVATIONS, &active)?;
            info!("Released {} expired reservation(s)", expired.len());
        }
        Ok(expired)
    }

    // ---------------------------------------------------------------
    // Purchase history
    // ---------------------------------------------------------------

    pub fn purchase_history(&self) -> Vec<PurchaseRecord> {
        self.read_list(keys::PURCHASE_HISTORY)
    }

    pub fn add_purchase(&self, name: &str) -> Result<PurchaseRecord, AppResponse> {
        self.add_purchase_at(name, Local::now())
    }

    pub fn add_purchase_at<Tz: TimeZone>(
        &self,
        name: &str,
        now: DateTime<Tz>,
    ) -> Result<PurchaseRecord, AppResponse>
    where
        Tz::Offset: std::fmt::Display,
    {
        let mut history = self.purchase_history();
        let record = PurchaseRecord {
            item_name: name.to_string(),
            date: format_date(&now),
            timestamp: now.timestamp_millis(),
        };
        history.push(record.clone());
        self.write_list(keys::PURCHASE_HISTORY, &history)?;
        Ok(record)
    }

    // ---------------------------------------------------------------
    // Manager listings
    // ---------------------------------------------------------------

    pub fn manager_listings(&self) -> Vec<ManagerListing> {
        self.read_list(keys::MANAGER_LISTINGS)
    }

    pub fn add_manager_listing(&self, new: NewListing) -> Result<ManagerListing, AppResponse> {
        self.add_manager_listing_at(new, Local::now())
    }

    /// Stores `new` under a `listing_<millis>` id. A clash with an existing
    /// id (two submissions in the same millisecond) moves to the next free
    /// millisecond. Non-finite or negative prices are rejected, since the
    /// stored list must always parse back.
    pub fn add_manager_listing_at<Tz: TimeZone>(
        &self,
        new: NewListing,
        now: DateTime<Tz>,
    ) -> Result<ManagerListing, AppResponse>
    where
        Tz::Offset: std::fmt::Display,
    {
        validate_price(new.price)?;
        let mut listings = self.manager_listings();
        let timestamp = now.timestamp_millis();

        let mut id_millis = timestamp;
        while listings.iter().any(|l| l.id == listing_id(id_millis)) {
            id_millis += 1;
        }

        let listing = ManagerListing::from_new(new, listing_id(id_millis), format_date(&now), timestamp);
        listings.push(listing.clone());
        self.write_list(keys::MANAGER_LISTINGS, &listings)?;

        info!("Manager listing {} created for '{}'", listing.id, listing.name);
        Ok(listing)
    }

    pub fn remove_manager_listing(&self, id: &str) -> Result<bool, AppResponse> {
        let mut listings = self.manager_listings();
        let before = listings.len();
        listings.retain(|l| l.id != id);
        let removed = listings.len() != before;
        self.write_list(keys::MANAGER_LISTINGS, &listings)?;
        Ok(removed)
    }

    pub fn update_manager_listing(
        &self,
        id: &str,
        update: ListingUpdate,
    ) -> Result<bool, AppResponse> {
        if let Some(price) = update.price {
            validate_price(price)?;
        }
        let mut listings = self.manager_listings();
        let Some(listing) = listings.iter_mut().find(|l| l.id == id) else {
            return Ok(false);
        };
        listing.apply(update);
        self.write_list(keys::MANAGER_LISTINGS, &listings)?;
        Ok(true)
    }

    pub fn manager_listing(&self, id: &str) -> Option<ManagerListing> {
        self.manager_listings().into_iter().find(|l| l.id == id)
    }

    // ---------------------------------------------------------------
    // Catalog and items
    // ---------------------------------------------------------------

    pub fn item_database(&self) -> &'static [CatalogEntry] {
        catalog::catalog()
    }

    /// Catalog entries followed by manager listings. A listing that reuses a
    /// catalog name takes that entry's place.
    pub fn all_items(&self) -> Vec<Item> {
        let mut items: Vec<Item> = self.item_database().iter().map(Item::from_catalog).collect();

        for listing in self.manager_listings() {
            let item = Item::from_listing(&listing, &self.config);
            match items.iter_mut().find(|existing| existing.name == item.name) {
                Some(existing) => *existing = item,
                None => items.push(item),
            }
        }
        items
    }

    pub fn find_item(&self, name: &str) -> Option<Item> {
        self.all_items().into_iter().find(|item| item.name == name)
    }

    /// Sums impact over the purchase history. Names missing from the
    /// catalog count as zero.
    pub fn calculate_total_impact(&self) -> TotalImpact {
        self.purchase_history()
            .iter()
            .filter_map(|purchase| catalog::find_entry(&purchase.item_name))
            .fold(TotalImpact::default(), |mut total, entry| {
                total.add(&entry.impact);
                total
            })
    }

    // ---------------------------------------------------------------
    // Preferences, settings, search hand-off
    // ---------------------------------------------------------------

    pub fn customer_preferences(&self) -> CustomerPreferences {
        self.read_object(keys::CUSTOMER_PREFERENCES).unwrap_or_default()
    }

    pub fn save_customer_preferences(&self, preferences: &CustomerPreferences) -> Result<(), AppResponse> {
        let json = serde_json::to_string(preferences)?;
        self.storage.set_item(keys::CUSTOMER_PREFERENCES, &json)
    }

    pub fn store_settings(&self) -> StoreSettings {
        self.read_object(keys::STORE_SETTINGS).unwrap_or_else(|| StoreSettings {
            store_name: self.config.default_store.clone(),
            ..StoreSettings::default()
        })
    }

    pub fn save_store_settings(&self, settings: &StoreSettings) -> Result<(), AppResponse> {
        let json = serde_json::to_string(settings)?;
        self.storage.set_item(keys::STORE_SETTINGS, &json)
    }

    pub fn set_search_term(&self, term: &str) -> Result<(), AppResponse> {
        self.storage.set_item(keys::SEARCH_TERM, term)
    }

    /// Returns the pending search hand-off and removes it.
    pub fn take_search_term(&self) -> Result<Option<String>, AppResponse> {
        let term = self.read_raw(keys::SEARCH_TERM);
        if term.is_some() {
            self.storage.remove_item(keys::SEARCH_TERM)?;
        }
        Ok(term.filter(|t| !t.is_empty()))
    }

    pub fn show_feedback(&self, message: impl Into<String>, kind: FeedbackKind) -> Feedback {
        Feedback::new(message, kind, &self.config.feedback)
    }
}

/// Listing prices must survive a JSON round trip; NaN and infinities
/// serialize as `null`.
pub(crate) fn validate_price(price: f64) -> Result<(), AppResponse> {
    if !price.is_finite() || price < 0.0 {
        return Err(AppResponse::ValidationError(
            "Price must be a non-negative number".to_string(),
        ));
    }
    Ok(())
}

fn listing_id(millis: i64) -> String {
    format!("listing_{millis}")
}
