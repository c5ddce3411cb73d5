//! Read models for the customer profile page and the store-manager page.

use chrono::{Duration, Local};
use serde::{Deserialize, Serialize};

use crate::data_manager::DataManager;
use crate::models::{Item, ManagerListing, PurchaseRecord, Reservation, TotalImpact};
use crate::session_storage::SessionStorage;

pub const PICKUP_TIP: &str = "Tip: Pick up reserved items within 24 hours or they'll return to inventory.";

const CO2_BADGE_GOAL: f64 = 100.0;
const WATER_BADGE_GOAL: f64 = 5000.0;
const WASTE_BADGE_GOAL: f64 = 50.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BadgeProgress {
    pub badge: String,
    pub percent: u32,
}

impl BadgeProgress {
    fn toward(badge: &str, total: f64, goal: f64) -> Self {
        let percent = (total / goal * 100.0).clamp(0.0, 100.0).round() as u32;
        Self {
            badge: badge.to_string(),
            percent,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Achievement {
    pub title: String,
    pub unlocked: bool,
}

pub fn achievements(impact: &TotalImpact) -> Vec<Achievement> {
    [
        ("Green Shopper", impact.total_co2 >= 25.0),
        ("Eco Warrior", impact.total_co2 >= 100.0),
        ("Water Saver", impact.total_water >= 5000.0),
    ]
    .into_iter()
    .map(|(title, unlocked)| Achievement {
        title: title.to_string(),
        unlocked,
    })
    .collect()
}

pub fn badge_progress(impact: &TotalImpact) -> Vec<BadgeProgress> {
    vec![
        BadgeProgress::toward("Eco Warrior", impact.total_co2, CO2_BADGE_GOAL),
        BadgeProgress::toward("Water Saver", impact.total_water, WATER_BADGE_GOAL),
        BadgeProgress::toward("Waste Reducer", impact.total_waste, WASTE_BADGE_GOAL),
    ]
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReservationView {
    pub reservation: Reservation,
    pub item: Item,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseView {
    pub purchase: PurchaseRecord,
    pub item: Item,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerDashboard {
    /// Length of the stored list, including names no longer on sale.
    pub saved_count: usize,
    pub saved: Vec<Item>,
    pub reservations: Vec<ReservationView>,
    pub purchase_count: usize,
    pub purchases: Vec<PurchaseView>,
    pub impact: TotalImpact,
    pub progress: Vec<BadgeProgress>,
    pub achievements: Vec<Achievement>,
    pub tip: Option<String>,
}

impl CustomerDashboard {
    pub fn build<S: SessionStorage>(manager: &DataManager<S>) -> Self {
        let items = manager.all_items();
        let lookup = |name: &str| items.iter().find(|item| item.name == name).cloned();

        let saved_names = manager.saved_items();
        let saved = saved_names.iter().filter_map(|name| lookup(name)).collect();

        let reservations: Vec<ReservationView> = manager
            .reservations()
            .into_iter()
            .filter_map(|reservation| {
                lookup(&reservation.item_name).map(|item| ReservationView { reservation, item })
            })
            .collect();

        let history = manager.purchase_history();
        let purchase_count = history.len();
        let purchases = history
            .into_iter()
            .filter_map(|purchase| lookup(&purchase.item_name).map(|item| PurchaseView { purchase, item }))
            .collect();

        let impact = manager.calculate_total_impact();
        let tip = (!reservations.is_empty()).then(|| PICKUP_TIP.to_string());

        Self {
            saved_count: saved_names.len(),
            saved,
            reservations,
            purchase_count,
            purchases,
            progress: badge_progress(&impact),
            achievements: achievements(&impact),
            impact,
            tip,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListingAnalytics {
    pub total_listed: usize,
    /// Two decimals, `"0.00"` with no listings.
    pub average_price: String,
    pub listed_past_week: usize,
}

impl ListingAnalytics {
    pub fn from_listings(listings: &[ManagerListing], now_millis: i64) -> Self {
        let average = if listings.is_empty() {
            0.0
        } else {
            listings.iter().map(|l| l.price).sum::<f64>() / listings.len() as f64
        };
        let week_ago = now_millis - Duration::days(7).num_milliseconds();

        Self {
            total_listed: listings.len(),
            average_price: format!("{average:.2}"),
            listed_past_week: listings.iter().filter(|l| l.timestamp > week_ago).count(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ManagerDashboard {
    pub recent_listings: Vec<ManagerListing>,
    pub live_items_count: usize,
    pub analytics: ListingAnalytics,
}

impl ManagerDashboard {
    pub fn build<S: SessionStorage>(manager: &DataManager<S>) -> Self {
        Self::build_at(manager, Local::now().timestamp_millis())
    }

    pub fn build_at<S: SessionStorage>(manager: &DataManager<S>, now_millis: i64) -> Self {
        let listings = manager.manager_listings();
        let recent_listings = listings
            .iter()
            .rev()
            .take(manager.config().recent_listing_limit)
            .cloned()
            .collect();

        Self {
            recent_listings,
            live_items_count: manager.item_database().len() + listings.len(),
            analytics: ListingAnalytics::from_listings(&listings, now_millis),
        }
    }
}
