//! Page actions invoked from markup event handlers.
//!
//! Each action reads the store, mutates it and returns the resulting value
//! together with the toast the page should show.

use chrono::{DateTime, Local, TimeZone};
use log::info;
use serde::{Deserialize, Serialize};

use crate::app_response::AppResponse;
use crate::dashboard::{CustomerDashboard, ManagerDashboard};
use crate::data_manager::{validate_price, DataManager};
use crate::feedback::{ActionOutcome, FeedbackKind};
use crate::filter::{BrowseController, BrowseView, FilterState};
use crate::models::{
    CustomerPreferences, ListingUpdate, ManagerListing, NewListing, PurchaseRecord, Reservation,
    ReservationDetails, Role, StoreSettings,
};
use crate::session_storage::SessionStorage;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveState {
    pub item_name: String,
    pub saved: bool,
}

pub struct SessionController<S: SessionStorage> {
    manager: DataManager<S>,
    browse: BrowseController,
}

impl<S: SessionStorage> SessionController<S> {
    pub fn new(manager: DataManager<S>) -> Self {
        Self {
            manager,
            browse: BrowseController::new(),
        }
    }

    pub fn manager(&self) -> &DataManager<S> {
        &self.manager
    }

    pub fn manager_mut(&mut self) -> &mut DataManager<S> {
        &mut self.manager
    }

    fn require_login(&self, action: &str) -> Result<(), AppResponse> {
        if self.manager.is_logged_in() {
            Ok(())
        } else {
            Err(AppResponse::Unauthorized(format!(
                "You need to be logged in to {action}."
            )))
        }
    }

    fn require_manager(&self) -> Result<(), AppResponse> {
        self.require_login("manage listings")?;
        match self.manager.user_role() {
            Some(Role::StoreManager) => Ok(()),
            _ => Err(AppResponse::Unauthorized(
                "Only store managers can manage listings.".to_string(),
            )),
        }
    }

    // ---------------------------------------------------------------
    // Session
    // ---------------------------------------------------------------

    pub fn sign_in(&self, email: &str) -> Result<ActionOutcome<Role>, AppResponse> {
        let role = self.manager.sign_in(email)?;
        Ok(ActionOutcome::silent(role))
    }

    pub fn sign_out(&mut self) -> Result<ActionOutcome<()>, AppResponse> {
        self.manager.sign_out()?;
        self.browse = BrowseController::new();
        Ok(ActionOutcome::silent(()))
    }

    // ---------------------------------------------------------------
    // Customer actions
    // ---------------------------------------------------------------

    pub fn toggle_save(&self, item_name: &str) -> Result<ActionOutcome<SaveState>, AppResponse> {
        self.require_login("save items")?;
        let item_name = item_name.trim();
        if item_name.is_empty() {
            return Err(AppResponse::BadRequest("Item name cannot be empty".to_string()));
        }

        if self.manager.is_item_saved(item_name) {
            self.manager.remove_saved_item(item_name)?;
            let feedback = self.manager.show_feedback("Removed from saved items.", FeedbackKind::Info);
            return Ok(ActionOutcome::with_feedback(
                SaveState {
                    item_name: item_name.to_string(),
                    saved: false,
                },
                feedback,
            ));
        }

        self.manager.add_saved_item(item_name)?;
        let feedback = self.manager.show_feedback("Added to saved items!", FeedbackKind::Success);
        Ok(ActionOutcome::with_feedback(
            SaveState {
                item_name: item_name.to_string(),
                saved: true,
            },
            feedback,
        ))
    }

    pub fn reserve(&self, item_name: &str) -> Result<ActionOutcome<Reservation>, AppResponse> {
        self.reserve_at(item_name, Local::now())
    }

    pub fn reserve_at<Tz: TimeZone>(
        &self,
        item_name: &str,
        now: DateTime<Tz>,
    ) -> Result<ActionOutcome<Reservation>, AppResponse>
    where
        Tz::Offset: std::fmt::Display,
    {
        self.require_login("reserve items")?;

        let details = self
            .manager
            .find_item(item_name)
            .map(|item| ReservationDetails::from(&item))
            .unwrap_or_default();

        let created = self.manager.add_reservation_at(item_name, &details, now)?;
        let reservation = self
            .manager
            .reservation_for(item_name)
            .ok_or_else(|| AppResponse::NotFound(format!("No reservation for: {item_name}")))?;

        let feedback = if created {
            self.manager
                .show_feedback("Item reserved! Check your profile to view.", FeedbackKind::Success)
        } else {
            self.manager
                .show_feedback("This item is already reserved.", FeedbackKind::Info)
        };
        Ok(ActionOutcome::with_feedback(reservation, feedback))
    }

    pub fn cancel_reservation(&self, item_name: &str) -> Result<ActionOutcome<bool>, AppResponse> {
        let was_reserved = self.manager.is_item_reserved(item_name);
        self.manager.remove_reservation(item_name)?;
        let feedback = self.manager.show_feedback("Reservation cancelled.", FeedbackKind::Info);
        Ok(ActionOutcome::with_feedback(was_reserved, feedback))
    }

    pub fn remove_saved_item(&self, item_name: &str) -> Result<ActionOutcome<()>, AppResponse> {
        self.manager.remove_saved_item(item_name)?;
        let feedback = self
            .manager
            .show_feedback("Item removed from saved list", FeedbackKind::Info);
        Ok(ActionOutcome::with_feedback((), feedback))
    }

    /// Records a purchase and releases any hold on the item.
    pub fn purchase(&self, item_name: &str) -> Result<ActionOutcome<PurchaseRecord>, AppResponse> {
        self.purchase_at(item_name, Local::now())
    }

    pub fn purchase_at<Tz: TimeZone>(
        &self,
        item_name: &str,
        now: DateTime<Tz>,
    ) -> Result<ActionOutcome<PurchaseRecord>, AppResponse>
    where
        Tz::Offset: std::fmt::Display,
    {
        self.require_login("purchase items")?;
        let record = self.manager.add_purchase_at(item_name, now)?;
        if self.manager.is_item_reserved(item_name) {
            self.manager.remove_reservation(item_name)?;
        }
        Ok(ActionOutcome::silent(record))
    }

    pub fn save_preferences(
        &self,
        preferences: &CustomerPreferences,
    ) -> Result<ActionOutcome<CustomerPreferences>, AppResponse> {
        self.manager.save_customer_preferences(preferences)?;
        let feedback = self
            .manager
            .show_feedback("Preferences updated successfully!", FeedbackKind::Success);
        Ok(ActionOutcome::with_feedback(preferences.clone(), feedback))
    }

    pub fn customer_dashboard(&self) -> CustomerDashboard {
        CustomerDashboard::build(&self.manager)
    }

    // ---------------------------------------------------------------
    // Manager actions
    // ---------------------------------------------------------------

    pub fn list_item(&self, new: NewListing) -> Result<ActionOutcome<ManagerListing>, AppResponse> {
        self.list_item_at(new, Local::now())
    }

    pub fn list_item_at<Tz: TimeZone>(
        &self,
        new: NewListing,
        now: DateTime<Tz>,
    ) -> Result<ActionOutcome<ManagerListing>, AppResponse>
    where
        Tz::Offset: std::fmt::Display,
    {
        self.require_manager()?;
        validate_listing(&new)?;

        let listing = self.manager.add_manager_listing_at(new, now)?;
        let photos = if listing.photo_count > 0 {
            format!(" with {} photo(s)", listing.photo_count)
        } else {
            String::new()
        };
        let feedback = self.manager.show_feedback(
            format!(
                "Success! {} listed for ${}{photos}. Now visible on browse page!",
                listing.name, listing.price
            ),
            FeedbackKind::Success,
        );
        info!("Listing {} is live", listing.id);
        Ok(ActionOutcome::with_feedback(listing, feedback))
    }

    pub fn edit_listing(
        &self,
        id: &str,
        update: ListingUpdate,
    ) -> Result<ActionOutcome<ManagerListing>, AppResponse> {
        self.require_manager()?;
        if !self.manager.update_manager_listing(id, update)? {
            return Err(AppResponse::NotFound(format!("No listing found with id: {id}")));
        }
        let listing = self
            .manager
            .manager_listing(id)
            .ok_or_else(|| AppResponse::NotFound(format!("No listing found with id: {id}")))?;
        let feedback = self
            .manager
            .show_feedback("Listing updated successfully!", FeedbackKind::Success);
        Ok(ActionOutcome::with_feedback(listing, feedback))
    }

    pub fn remove_listing(&self, id: &str) -> Result<ActionOutcome<String>, AppResponse> {
        self.require_manager()?;
        if !self.manager.remove_manager_listing(id)? {
            return Err(AppResponse::NotFound(format!("No listing found with id: {id}")));
        }
        let feedback = self
            .manager
            .show_feedback("Listing removed from marketplace.", FeedbackKind::Info);
        Ok(ActionOutcome::with_feedback(id.to_string(), feedback))
    }

    pub fn save_store_settings(
        &self,
        settings: &StoreSettings,
    ) -> Result<ActionOutcome<StoreSettings>, AppResponse> {
        self.require_manager()?;
        self.manager.save_store_settings(settings)?;
        let feedback = self
            .manager
            .show_feedback("Store settings saved successfully!", FeedbackKind::Success);
        Ok(ActionOutcome::with_feedback(settings.clone(), feedback))
    }

    pub fn manager_dashboard(&self) -> ManagerDashboard {
        ManagerDashboard::build(&self.manager)
    }

    // ---------------------------------------------------------------
    // Browse page
    // ---------------------------------------------------------------

    pub fn open_browse(&mut self) -> Result<BrowseView, AppResponse> {
        self.browse.open(&self.manager)
    }

    pub fn apply_filters(&mut self, filters: FilterState) -> BrowseView {
        self.browse.apply(&self.manager, filters)
    }

    pub fn clear_filters(&mut self) -> BrowseView {
        self.browse.clear(&self.manager)
    }

    pub fn refresh_browse(&self) -> BrowseView {
        self.browse.render(&self.manager)
    }
}

fn validate_listing(new: &NewListing) -> Result<(), AppResponse> {
    if new.name.trim().is_empty() {
        return Err(AppResponse::ValidationError("Listing name cannot be empty".to_string()));
    }
    validate_price(new.price)
}
