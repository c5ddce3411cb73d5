//! Browse-page filtering.
//!
//! [`FilterState`] mirrors the filter controls as the page holds them (raw
//! field text included). [`FilterCriteria`] is the parsed form the predicate
//! runs against, and [`BrowseController`] ties both to a [`DataManager`] to
//! produce a [`BrowseView`].

use log::debug;
use serde::{Deserialize, Serialize};

use crate::app_response::AppResponse;
use crate::data_manager::DataManager;
use crate::models::Item;
use crate::session_storage::SessionStorage;

/// Distance radio value meaning "no limit".
pub const SHOW_ALL_DISTANCE: &str = "all";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FilterState {
    pub categories: Vec<String>,
    pub sizes: Vec<String>,
    pub distance: String,
    pub min_price: String,
    pub max_price: String,
    pub search: String,
}

impl Default for FilterState {
    fn default() -> Self {
        Self {
            categories: Vec::new(),
            sizes: Vec::new(),
            distance: SHOW_ALL_DISTANCE.to_string(),
            min_price: String::new(),
            max_price: String::new(),
            search: String::new(),
        }
    }
}

impl FilterState {
    pub fn is_cleared(&self) -> bool {
        *self == FilterState::default()
    }

    pub fn criteria(&self) -> FilterCriteria {
        FilterCriteria {
            categories: self.categories.clone(),
            sizes: self.sizes.clone(),
            max_distance: parse_number(&self.distance),
            min_price: parse_number(&self.min_price).unwrap_or(0.0),
            max_price: parse_number(&self.max_price).unwrap_or(f64::INFINITY),
            search: self.search.trim().to_lowercase(),
        }
    }
}

/// Reads the leading number of a field, so `"20abc"` is 20. Text with no
/// leading number (empty, `"all"`, `"abc"`) means "no bound".
fn parse_number(raw: &str) -> Option<f64> {
    let trimmed = raw.trim_start();
    let mut end = 0;
    let mut seen_digit = false;
    let mut seen_dot = false;
    for (i, c) in trimmed.char_indices() {
        match c {
            '+' | '-' if i == 0 => {}
            '.' if !seen_dot => seen_dot = true,
            c if c.is_ascii_digit() => seen_digit = true,
            _ => break,
        }
        end = i + c.len_utf8();
    }
    if !seen_digit {
        return None;
    }
    trimmed[..end]
        .trim_end_matches('.')
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
}

#[derive(Debug, Clone, PartialEq)]
pub struct FilterCriteria {
    pub categories: Vec<String>,
    pub sizes: Vec<String>,
    pub max_distance: Option<f64>,
    pub min_price: f64,
    pub max_price: f64,
    /// Already trimmed and lower-cased.
    pub search: String,
}

impl FilterCriteria {
    pub fn matches(&self, item: &Item) -> bool {
        if !self.categories.is_empty() && !self.categories.iter().any(|c| *c == item.category) {
            return false;
        }
        if !self.sizes.is_empty() && !self.sizes.iter().any(|s| *s == item.size) {
            return false;
        }
        if item.price < self.min_price || item.price > self.max_price {
            return false;
        }
        if let Some(cap) = self.max_distance {
            if item.distance_miles > cap {
                return false;
            }
        }
        if !self.search.is_empty() {
            let term = self.search.as_str();
            return item.name.to_lowercase().contains(term)
                || item.brand.to_lowercase().contains(term)
                || item.description.to_lowercase().contains(term);
        }
        true
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemCard {
    pub item: Item,
    pub visible: bool,
    pub saved: bool,
}

/// The count line shown directly above the first card.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultsBanner {
    pub count: usize,
    pub empty: bool,
    pub message: String,
}

impl ResultsBanner {
    pub fn for_count(count: usize) -> Self {
        let message = if count == 0 {
            "No items found. Try adjusting your filters or search terms.".to_string()
        } else if count == 1 {
            "1 item found".to_string()
        } else {
            format!("{count} items found")
        };
        Self {
            count,
            empty: count == 0,
            message,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BrowseView {
    pub filters: FilterState,
    pub banner: ResultsBanner,
    pub cards: Vec<ItemCard>,
}

impl BrowseView {
    pub fn visible_names(&self) -> Vec<&str> {
        self.cards
            .iter()
            .filter(|card| card.visible)
            .map(|card| card.item.name.as_str())
            .collect()
    }

    pub fn total(&self) -> usize {
        self.cards.len()
    }
}

/// Cards in page order: manager listings newest first, then the catalog.
pub fn browse_items<S: SessionStorage>(manager: &DataManager<S>) -> Vec<Item> {
    let config = manager.config();
    let mut items: Vec<Item> = manager
        .manager_listings()
        .iter()
        .rev()
        .map(|listing| Item::from_listing(listing, config))
        .collect();
    items.extend(manager.item_database().iter().map(Item::from_catalog));
    items
}

/// Applies `state` to `items`, keeping their order.
pub fn filter_items(items: Vec<Item>, state: &FilterState, saved: &[String]) -> BrowseView {
    let criteria = state.criteria();
    let cards: Vec<ItemCard> = items
        .into_iter()
        .map(|item| ItemCard {
            visible: criteria.matches(&item),
            saved: saved.iter().any(|name| *name == item.name),
            item,
        })
        .collect();

    let count = cards.iter().filter(|card| card.visible).count();
    debug!("Filters matched {count} of {} items", cards.len());

    BrowseView {
        filters: state.clone(),
        banner: ResultsBanner::for_count(count),
        cards,
    }
}

/// Holds the browse page's filter controls between events.
#[derive(Debug, Clone, Default)]
pub struct BrowseController {
    filters: FilterState,
}

impl BrowseController {
    pub fn new() -> Self {
        Self::default()
    }

    /// Initial render. A search started on another page is consumed and
    /// applied.
    pub fn open<S: SessionStorage>(
        &mut self,
        manager: &DataManager<S>,
    ) -> Result<BrowseView, AppResponse> {
        if let Some(term) = manager.take_search_term()? {
            self.filters.search = term;
        }
        Ok(self.render(manager))
    }

    pub fn filters(&self) -> &FilterState {
        &self.filters
    }

    pub fn apply<S: SessionStorage>(
        &mut self,
        manager: &DataManager<S>,
        filters: FilterState,
    ) -> BrowseView {
        self.filters = filters;
        self.render(manager)
    }

    pub fn search<S: SessionStorage>(&mut self, manager: &DataManager<S>, term: &str) -> BrowseView {
        self.filters.search = term.to_string();
        self.render(manager)
    }

    /// Resets every control and shows every card.
    pub fn clear<S: SessionStorage>(&mut self, manager: &DataManager<S>) -> BrowseView {
        self.filters = FilterState::default();
        self.render(manager)
    }

    /// Re-renders with the current controls, e.g. after a save toggle.
    pub fn render<S: SessionStorage>(&self, manager: &DataManager<S>) -> BrowseView {
        filter_items(browse_items(manager), &self.filters, &manager.saved_items())
    }
}
