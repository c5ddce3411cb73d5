//! Key-value interface behind [`crate::data_manager::DataManager`].
//!
//! Values are JSON-encoded strings under the fixed keys in [`keys`]. The
//! LMDB-backed implementation lives in [`crate::session_db_state`];
//! [`MemoryStorage`] keeps everything in process memory.

use std::cell::RefCell;
use std::collections::BTreeMap;

use crate::app_response::AppResponse;

pub mod keys {
    pub const LOGGED_IN: &str = "loggedIn";
    pub const ROLE: &str = "role";
    pub const USER_EMAIL: &str = "userEmail";
    pub const SAVED_ITEMS: &str = "savedItems";
    pub const RESERVATIONS: &str = "reservations";
    pub const PURCHASE_HISTORY: &str = "purchaseHistory";
    pub const MANAGER_LISTINGS: &str = "managerListings";
    pub const CUSTOMER_PREFERENCES: &str = "customerPreferences";
    pub const STORE_SETTINGS: &str = "storeSettings";
    pub const SEARCH_TERM: &str = "searchTerm";

    /// Collections created empty by `initialize_data`.
    pub const COLLECTIONS: [&str; 4] = [SAVED_ITEMS, RESERVATIONS, PURCHASE_HISTORY, MANAGER_LISTINGS];
}

pub trait SessionStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, AppResponse>;

    fn set_item(&self, key: &str, value: &str) -> Result<(), AppResponse>;

    /// Returns whether the key was present.
    fn remove_item(&self, key: &str) -> Result<bool, AppResponse>;

    fn clear(&self) -> Result<(), AppResponse>;
}

#[derive(Debug, Default)]
pub struct MemoryStorage {
    entries: RefCell<BTreeMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }
}

impl SessionStorage for MemoryStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, AppResponse> {
        Ok(self.entries.borrow().get(key).cloned())
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), AppResponse> {
        self.entries
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove_item(&self, key: &str) -> Result<bool, AppResponse> {
        Ok(self.entries.borrow_mut().remove(key).is_some())
    }

    fn clear(&self) -> Result<(), AppResponse> {
        self.entries.borrow_mut().clear();
        Ok(())
    }
}
