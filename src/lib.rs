//! # Thrift Session Core
//!
//! Session-scoped state and browse filtering for a thrift-store storefront,
//! designed for FFI integration with the page layer. State lives in an LMDB
//! environment opened for the browsing session and cleared on sign-out.
//!
//! ## Features
//!
//! - **Typed session store**: saved items, reservations, purchase history and
//!   manager listings stored as JSON under fixed keys
//! - **Injectable storage**: [`session_storage::SessionStorage`] with LMDB and
//!   in-memory backends
//! - **Filter engine**: category, size, price, distance and free-text search
//!   over catalog items and manager listings
//! - **Dashboards**: customer impact and badges, manager listing analytics
//! - **Safe error handling**: no `unwrap()` calls in production code
//!
//! ## Quick Start
//!
//! ```no_run
//! use thrift_session_core::{create_store, sign_in, toggle_save, free_response};
//! use std::ffi::CString;
//!
//! let name = CString::new("browser_session").unwrap();
//! let session = create_store(name.as_ptr());
//!
//! let email = CString::new("customer@example.com").unwrap();
//! free_response(sign_in(session, email.as_ptr()) as *mut _);
//!
//! let item = CString::new("Lee Regular Fit Jeans").unwrap();
//! let result = toggle_save(session, item.as_ptr());
//! free_response(result as *mut _);
//! ```
//!
//! ## FFI Functions
//!
//! Every function returns a JSON-encoded [`AppResponse`]; `Ok` carries the
//! JSON payload as a string. Release each response with [`free_response`]
//! and the handle with [`close_store`].
//!
//! - Session: [`create_store`], [`create_store_with_config`], [`session_info`],
//!   [`sign_in`], [`sign_out`], [`close_store`]
//! - Customer: [`toggle_save`], [`get_saved_items`], [`remove_saved_item`], [`reserve_item`],
//!   [`cancel_reservation`], [`get_reservations`], [`release_expired_reservations`],
//!   [`purchase_item`], [`get_purchase_history`], [`total_impact`],
//!   [`save_preferences`], [`customer_dashboard`]
//! - Manager: [`list_item`], [`edit_listing`], [`remove_listing`],
//!   [`get_manager_listings`], [`save_store_settings`], [`manager_dashboard`]
//! - Browse: [`get_item_database`], [`get_all_items`], [`open_browse`],
//!   [`apply_filters`], [`clear_filters`], [`set_search_term`]
//! - UI: [`show_feedback`]

pub mod app_response;
pub mod catalog;
pub mod config;
pub mod controller;
pub mod dashboard;
pub mod data_manager;
pub mod feedback;
pub mod filter;
pub mod models;
pub mod session_db_state;
pub mod session_storage;

use std::ffi::{CStr, CString};
use std::os::raw::c_char;

use log::{info, warn};
use serde::de::DeserializeOwned;
use serde::Serialize;

pub use crate::app_response::AppResponse;
use crate::config::StoreConfig;
use crate::controller::SessionController;
use crate::data_manager::DataManager;
use crate::feedback::FeedbackKind;
use crate::filter::FilterState;
use crate::models::{CustomerPreferences, ListingUpdate, NewListing, StoreSettings};
use crate::session_db_state::SessionDbState;

/// Opaque handle owned by the page layer.
pub type ThriftSession = SessionController<SessionDbState>;

/// Opens (or creates) the session store `<name>.lmdb` with default settings.
///
/// Returns a null pointer if `name` is null, not UTF-8, or the store cannot
/// be opened.
///
/// # Examples
///
/// ```no_run
/// use std::ffi::CString;
/// use thrift_session_core::create_store;
///
/// let name = CString::new("tab_session").unwrap();
/// let session = create_store(name.as_ptr());
/// assert!(!session.is_null());
/// ```
#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn create_store(name: *const c_char) -> *mut ThriftSession {
    if name.is_null() {
        warn!("Null name pointer passed to create_store");
        return std::ptr::null_mut();
    }

    let name_str = match unsafe { CStr::from_ptr(name).to_str() } {
        Ok(s) => s.to_string(),
        Err(e) => {
            warn!("Invalid UTF-8 in name parameter: {e}");
            return std::ptr::null_mut();
        }
    };

    let config = StoreConfig {
        db_name: name_str,
        ..StoreConfig::default()
    };
    open_session(config)
}

/// Opens a session store from a JSON [`StoreConfig`]. Missing fields take
/// their defaults, so `{"db_name":"tab_session"}` is enough.
#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn create_store_with_config(config_json: *const c_char) -> *mut ThriftSession {
    if config_json.is_null() {
        warn!("Null config pointer passed to create_store_with_config");
        return std::ptr::null_mut();
    }

    let json = match unsafe { CStr::from_ptr(config_json).to_str() } {
        Ok(s) => s,
        Err(e) => {
            warn!("Invalid UTF-8 in config parameter: {e}");
            return std::ptr::null_mut();
        }
    };

    match StoreConfig::from_json_str(json) {
        Ok(config) => open_session(config),
        Err(e) => {
            warn!("Rejected store configuration: {e}");
            std::ptr::null_mut()
        }
    }
}

fn open_session(config: StoreConfig) -> *mut ThriftSession {
    info!("Attempting to open session store: {}.lmdb", config.db_name);

    let storage = match SessionDbState::init_with_map_size(config.db_name.clone(), config.map_size) {
        Ok(storage) => storage,
        Err(e) => {
            warn!("❌ Failed to open session store: {e}");
            return std::ptr::null_mut();
        }
    };

    match DataManager::open(storage, config) {
        Ok(manager) => {
            info!("✅ Session store ready");
            Box::into_raw(Box::new(SessionController::new(manager)))
        }
        Err(e) => {
            warn!("❌ Failed to initialize session collections: {e}");
            std::ptr::null_mut()
        }
    }
}

/// Returns `{loggedIn, role, email}` for the session.
#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn session_info(state: *mut ThriftSession) -> *const c_char {
    let session = match session_from_ptr(state, "session_info") {
        Ok(s) => s,
        Err(err) => return err,
    };
    serialize_ok(&session.manager().session_info())
}

/// Signs in one of the mock users and returns the assigned role.
#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn sign_in(state: *mut ThriftSession, email: *const c_char) -> *const c_char {
    let session = match session_from_ptr(state, "sign_in") {
        Ok(s) => s,
        Err(err) => return err,
    };
    let email = match c_ptr_to_string(email, "email") {
        Ok(e) => e,
        Err(err) => return err,
    };
    result_to_c_string(session.sign_in(&email))
}

/// Clears every key of the session and recreates the empty collections.
#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn sign_out(state: *mut ThriftSession) -> *const c_char {
    let session = match session_from_ptr(state, "sign_out") {
        Ok(s) => s,
        Err(err) => return err,
    };
    match session.sign_out() {
        Ok(_) => response_to_c_string(&AppResponse::success("Session cleared successfully")),
        Err(e) => response_to_c_string(&e),
    }
}

/// Saves the item, or un-saves it if it was already saved.
///
/// Answers `Unauthorized` when nobody is signed in.
#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn toggle_save(state: *mut ThriftSession, item_name: *const c_char) -> *const c_char {
    let session = match session_from_ptr(state, "toggle_save") {
        Ok(s) => s,
        Err(err) => return err,
    };
    let name = match c_ptr_to_string(item_name, "item name") {
        Ok(n) => n,
        Err(err) => return err,
    };
    result_to_c_string(session.toggle_save(&name))
}

#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn get_saved_items(state: *mut ThriftSession) -> *const c_char {
    let session = match session_from_ptr(state, "get_saved_items") {
        Ok(s) => s,
        Err(err) => return err,
    };
    serialize_ok(&session.manager().saved_items())
}

/// Drops the item from the saved list on the profile page.
#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn remove_saved_item(state: *mut ThriftSession, item_name: *const c_char) -> *const c_char {
    let session = match session_from_ptr(state, "remove_saved_item") {
        Ok(s) => s,
        Err(err) => return err,
    };
    let name = match c_ptr_to_string(item_name, "item name") {
        Ok(n) => n,
        Err(err) => return err,
    };
    result_to_c_string(session.remove_saved_item(&name))
}

/// Places a 24 hour hold on the item.
///
/// When a hold already exists the existing reservation is returned
/// unchanged.
#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn reserve_item(state: *mut ThriftSession, item_name: *const c_char) -> *const c_char {
    let session = match session_from_ptr(state, "reserve_item") {
        Ok(s) => s,
        Err(err) => return err,
    };
    let name = match c_ptr_to_string(item_name, "item name") {
        Ok(n) => n,
        Err(err) => return err,
    };
    result_to_c_string(session.reserve(&name))
}

#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn cancel_reservation(state: *mut ThriftSession, item_name: *const c_char) -> *const c_char {
    let session = match session_from_ptr(state, "cancel_reservation") {
        Ok(s) => s,
        Err(err) => return err,
    };
    let name = match c_ptr_to_string(item_name, "item name") {
        Ok(n) => n,
        Err(err) => return err,
    };
    result_to_c_string(session.cancel_reservation(&name))
}

#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn get_reservations(state: *mut ThriftSession) -> *const c_char {
    let session = match session_from_ptr(state, "get_reservations") {
        Ok(s) => s,
        Err(err) => return err,
    };
    serialize_ok(&session.manager().reservations())
}

/// Drops every hold whose expiry has passed and returns the released
/// reservations. Holds are never released unless this is called.
#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn release_expired_reservations(state: *mut ThriftSession) -> *const c_char {
    let session = match session_from_ptr(state, "release_expired_reservations") {
        Ok(s) => s,
        Err(err) => return err,
    };
    result_to_c_string(session.manager().release_expired_reservations())
}

#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn purchase_item(state: *mut ThriftSession, item_name: *const c_char) -> *const c_char {
    let session = match session_from_ptr(state, "purchase_item") {
        Ok(s) => s,
        Err(err) => return err,
    };
    let name = match c_ptr_to_string(item_name, "item name") {
        Ok(n) => n,
        Err(err) => return err,
    };
    result_to_c_string(session.purchase(&name))
}

#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn get_purchase_history(state: *mut ThriftSession) -> *const c_char {
    let session = match session_from_ptr(state, "get_purchase_history") {
        Ok(s) => s,
        Err(err) => return err,
    };
    serialize_ok(&session.manager().purchase_history())
}

/// Returns `{totalCO2, totalWater, totalWaste}` over the purchase history.
#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn total_impact(state: *mut ThriftSession) -> *const c_char {
    let session = match session_from_ptr(state, "total_impact") {
        Ok(s) => s,
        Err(err) => return err,
    };
    serialize_ok(&session.manager().calculate_total_impact())
}

#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn save_preferences(state: *mut ThriftSession, json_ptr: *const c_char) -> *const c_char {
    let session = match session_from_ptr(state, "save_preferences") {
        Ok(s) => s,
        Err(err) => return err,
    };
    let preferences: CustomerPreferences = match parse_json_arg(json_ptr, "preferences") {
        Ok(p) => p,
        Err(err) => return err,
    };
    result_to_c_string(session.save_preferences(&preferences))
}

#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn customer_dashboard(state: *mut ThriftSession) -> *const c_char {
    let session = match session_from_ptr(state, "customer_dashboard") {
        Ok(s) => s,
        Err(err) => return err,
    };
    serialize_ok(&session.customer_dashboard())
}

/// Creates a manager listing from the list-item form.
///
/// # JSON Format
///
/// ```json
/// {
///   "name": "Vintage Denim Jacket",
///   "category": "outerwear",
///   "size": "M",
///   "brand": "Levi's",
///   "condition": "good",
///   "price": 32,
///   "description": "Faded trucker jacket",
///   "photoCount": 2
/// }
/// ```
#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn list_item(state: *mut ThriftSession, json_ptr: *const c_char) -> *const c_char {
    let session = match session_from_ptr(state, "list_item") {
        Ok(s) => s,
        Err(err) => return err,
    };
    let new: NewListing = match parse_json_arg(json_ptr, "listing") {
        Ok(n) => n,
        Err(err) => return err,
    };
    result_to_c_string(session.list_item(new))
}

/// Merges the given fields (for example `{"price": 20, "description": "..."}`)
/// into the listing `id`.
#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn edit_listing(
    state: *mut ThriftSession,
    id: *const c_char,
    json_ptr: *const c_char,
) -> *const c_char {
    let session = match session_from_ptr(state, "edit_listing") {
        Ok(s) => s,
        Err(err) => return err,
    };
    let id = match c_ptr_to_string(id, "id") {
        Ok(i) => i,
        Err(err) => return err,
    };
    let update: ListingUpdate = match parse_json_arg(json_ptr, "listing update") {
        Ok(u) => u,
        Err(err) => return err,
    };
    result_to_c_string(session.edit_listing(&id, update))
}

#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn remove_listing(state: *mut ThriftSession, id: *const c_char) -> *const c_char {
    let session = match session_from_ptr(state, "remove_listing") {
        Ok(s) => s,
        Err(err) => return err,
    };
    let id = match c_ptr_to_string(id, "id") {
        Ok(i) => i,
        Err(err) => return err,
    };
    result_to_c_string(session.remove_listing(&id))
}

#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn get_manager_listings(state: *mut ThriftSession) -> *const c_char {
    let session = match session_from_ptr(state, "get_manager_listings") {
        Ok(s) => s,
        Err(err) => return err,
    };
    serialize_ok(&session.manager().manager_listings())
}

#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn save_store_settings(state: *mut ThriftSession, json_ptr: *const c_char) -> *const c_char {
    let session = match session_from_ptr(state, "save_store_settings") {
        Ok(s) => s,
        Err(err) => return err,
    };
    let settings: StoreSettings = match parse_json_arg(json_ptr, "store settings") {
        Ok(s) => s,
        Err(err) => return err,
    };
    result_to_c_string(session.save_store_settings(&settings))
}

#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn manager_dashboard(state: *mut ThriftSession) -> *const c_char {
    let session = match session_from_ptr(state, "manager_dashboard") {
        Ok(s) => s,
        Err(err) => return err,
    };
    serialize_ok(&session.manager_dashboard())
}

#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn get_item_database(state: *mut ThriftSession) -> *const c_char {
    let session = match session_from_ptr(state, "get_item_database") {
        Ok(s) => s,
        Err(err) => return err,
    };
    serialize_ok(&session.manager().item_database())
}

/// Catalog entries and manager listings in one normalized shape.
#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn get_all_items(state: *mut ThriftSession) -> *const c_char {
    let session = match session_from_ptr(state, "get_all_items") {
        Ok(s) => s,
        Err(err) => return err,
    };
    serialize_ok(&session.manager().all_items())
}

/// First render of the browse page; consumes a pending search hand-off.
#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn open_browse(state: *mut ThriftSession) -> *const c_char {
    let session = match session_from_ptr(state, "open_browse") {
        Ok(s) => s,
        Err(err) => return err,
    };
    result_to_c_string(session.open_browse())
}

/// Applies the filter controls and returns the browse view.
///
/// # JSON Format
///
/// ```json
/// {
///   "categories": ["jeans"],
///   "sizes": [],
///   "distance": "all",
///   "minPrice": "",
///   "maxPrice": "20",
///   "search": "lee"
/// }
/// ```
#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn apply_filters(state: *mut ThriftSession, json_ptr: *const c_char) -> *const c_char {
    let session = match session_from_ptr(state, "apply_filters") {
        Ok(s) => s,
        Err(err) => return err,
    };
    let filters: FilterState = match parse_json_arg(json_ptr, "filters") {
        Ok(f) => f,
        Err(err) => return err,
    };
    serialize_ok(&session.apply_filters(filters))
}

/// Resets every filter control and shows every card.
#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn clear_filters(state: *mut ThriftSession) -> *const c_char {
    let session = match session_from_ptr(state, "clear_filters") {
        Ok(s) => s,
        Err(err) => return err,
    };
    serialize_ok(&session.clear_filters())
}

/// Stores a search started on another page for the next [`open_browse`].
#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn set_search_term(state: *mut ThriftSession, term: *const c_char) -> *const c_char {
    let session = match session_from_ptr(state, "set_search_term") {
        Ok(s) => s,
        Err(err) => return err,
    };
    let term = match c_ptr_to_string(term, "search term") {
        Ok(t) => t,
        Err(err) => return err,
    };
    match session.manager().set_search_term(&term) {
        Ok(()) => response_to_c_string(&AppResponse::success("Search term stored")),
        Err(e) => response_to_c_string(&e),
    }
}

/// Describes a toast for the page to render. `kind` is `success`, `error`
/// or anything else for `info`; a null `kind` means `info`.
#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn show_feedback(
    state: *mut ThriftSession,
    message: *const c_char,
    kind: *const c_char,
) -> *const c_char {
    let session = match session_from_ptr(state, "show_feedback") {
        Ok(s) => s,
        Err(err) => return err,
    };
    let message = match c_ptr_to_string(message, "message") {
        Ok(m) => m,
        Err(err) => return err,
    };
    let kind = if kind.is_null() {
        FeedbackKind::Info
    } else {
        match c_ptr_to_string(kind, "kind") {
            Ok(k) => FeedbackKind::parse(&k),
            Err(err) => return err,
        }
    };
    serialize_ok(&session.manager().show_feedback(message, kind))
}

/// Closes the LMDB environment and frees the handle. The pointer must not
/// be used afterwards.
///
/// # Examples
///
/// ```no_run
/// use std::ffi::CString;
/// use thrift_session_core::{create_store, close_store, free_response};
///
/// let name = CString::new("tab_session").unwrap();
/// let session = create_store(name.as_ptr());
///
/// let result = close_store(session);
/// free_response(result as *mut _);
/// ```
#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn close_store(state: *mut ThriftSession) -> *const c_char {
    if state.is_null() {
        let error = AppResponse::BadRequest("Null state pointer passed to close_store".to_string());
        return response_to_c_string(&error);
    }

    let mut session = unsafe { Box::from_raw(state) };
    match session.manager_mut().storage_mut().close_database() {
        Ok(()) => response_to_c_string(&AppResponse::success("Session store closed successfully")),
        Err(e) => response_to_c_string(&e),
    }
}

/// Frees a string returned by any function of this library.
#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn free_response(ptr: *mut c_char) {
    if ptr.is_null() {
        return;
    }
    drop(unsafe { CString::from_raw(ptr) });
}

/// Borrows the session behind an FFI handle, or produces the `BadRequest`
/// response to return.
fn session_from_ptr<'a>(
    state: *mut ThriftSession,
    fn_name: &str,
) -> Result<&'a mut ThriftSession, *const c_char> {
    match unsafe { state.as_mut() } {
        Some(session) => Ok(session),
        None => {
            warn!("Null state pointer passed to {fn_name}");
            let error = AppResponse::BadRequest(format!("Null state pointer passed to {fn_name}"));
            Err(response_to_c_string(&error))
        }
    }
}

fn parse_json_arg<T: DeserializeOwned>(ptr: *const c_char, field_name: &str) -> Result<T, *const c_char> {
    let json = c_ptr_to_string(ptr, field_name)?;
    serde_json::from_str(&json).map_err(|e| {
        let error = AppResponse::SerializationError(format!("Invalid {field_name} JSON: {e}"));
        response_to_c_string(&error)
    })
}

fn serialize_ok<T: Serialize + ?Sized>(value: &T) -> *const c_char {
    match serde_json::to_string(value) {
        Ok(json) => response_to_c_string(&AppResponse::Ok(json)),
        Err(e) => {
            let error = AppResponse::SerializationError(format!("Failed to serialize result: {e}"));
            response_to_c_string(&error)
        }
    }
}

fn result_to_c_string<T: Serialize>(result: Result<T, AppResponse>) -> *const c_char {
    match result {
        Ok(value) => serialize_ok(&value),
        Err(e) => response_to_c_string(&e),
    }
}

/// Converts an [`AppResponse`] to a C-compatible string.
///
/// Returns a null pointer if serialization or C string creation fails. The
/// caller releases the string with [`free_response`].
fn response_to_c_string(response: &AppResponse) -> *const c_char {
    let json = match serde_json::to_string(response) {
        Ok(j) => j,
        Err(e) => {
            warn!("Error serializing response: {e}");
            return std::ptr::null();
        }
    };

    match CString::new(json) {
        Ok(c_str) => c_str.into_raw(),
        Err(e) => {
            warn!("Error creating CString: {e}");
            std::ptr::null()
        }
    }
}

/// Converts a C string pointer to a Rust `String`.
///
/// * `Ok(String)` - if conversion was successful
/// * `Err(*const c_char)` - the `BadRequest` response to hand back for a null
///   pointer or invalid UTF-8
fn c_ptr_to_string(ptr: *const c_char, field_name: &str) -> Result<String, *const c_char> {
    if ptr.is_null() {
        let error = AppResponse::BadRequest(format!("Null {field_name} pointer"));
        return Err(response_to_c_string(&error));
    }

    match unsafe { CStr::from_ptr(ptr).to_str() } {
        Ok(s) => Ok(s.to_string()),
        Err(e) => {
            let error = AppResponse::BadRequest(format!("Invalid UTF-8 in {field_name}: {e}"));
            Err(response_to_c_string(&error))
        }
    }
}
