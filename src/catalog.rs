//! The fixed storefront inventory.

use serde::Serialize;

use crate::models::Impact;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogEntry {
    pub name: &'static str,
    pub url: &'static str,
    pub image: &'static str,
    pub price: f64,
    pub price_display: &'static str,
    pub retail: &'static str,
    pub size: &'static str,
    pub category: &'static str,
    pub brand: &'static str,
    pub store: &'static str,
    pub distance: &'static str,
    #[serde(flatten)]
    pub impact: Impact,
    pub description: &'static str,
}

const fn impact(co2: f64, water: f64, waste: f64) -> Impact {
    Impact { co2, water, waste }
}

static CATALOG: [CatalogEntry; 10] = [
    CatalogEntry {
        name: "Lee Regular Fit Jeans",
        url: "lee_regular_fit_item1.html",
        image: "images/lee/lee_front.jpg",
        price: 14.0,
        price_display: "$14",
        retail: "$50",
        size: "34x32",
        category: "jeans",
        brand: "Lee",
        store: "Goodwill Benton",
        distance: "2.3 miles away",
        impact: impact(18.0, 1800.0, 4.5),
        description: "Classic Lee jeans in medium wash. Comfortable regular fit with straight leg opening.",
    },
    CatalogEntry {
        name: "Wrangler Relaxed Fit Jeans",
        url: "wranglers_relaxed_fit_item2.html",
        image: "images/wranglers/wranglers_main_image.jpg",
        price: 16.0,
        price_display: "$16",
        retail: "$65",
        size: "34x32",
        category: "jeans",
        brand: "Wrangler",
        store: "Goodwill Benton",
        distance: "2.3 miles away",
        impact: impact(22.0, 1800.0, 5.0),
        description: "Relaxed fit jeans with signature W stitching. Medium-light wash with natural fading.",
    },
    CatalogEntry {
        name: "Levi's 505 Regular Fit Jeans",
        url: "item3.html",
        image: "images/levis/levi505_front.jpg",
        price: 18.0,
        price_display: "$18",
        retail: "$70",
        size: "32x32",
        category: "jeans",
        brand: "Levi's",
        store: "Thrifty Village",
        distance: "3.5 miles away",
        impact: impact(20.0, 1800.0, 5.0),
        description: "Iconic Levi's 505 with classic straight leg. Medium-dark wash with signature details.",
    },
    CatalogEntry {
        name: "Carhartt Work Jeans",
        url: "item4.html",
        image: "images/carhartt/carhartt_front.jpg",
        price: 17.0,
        price_display: "$17",
        retail: "$55",
        size: "34x34",
        category: "jeans",
        brand: "Carhartt",
        store: "Salvation Army",
        distance: "4.2 miles away",
        impact: impact(23.0, 1800.0, 5.5),
        description: "Heavy-duty carpenter jeans with tool pockets. Loose fit for workwear durability.",
    },
    CatalogEntry {
        name: "The Clash Band T-Shirt",
        url: "item5.html",
        image: "images/bandtee/bandtee_front.jpg",
        price: 18.0,
        price_display: "$18",
        retail: "$35",
        size: "L",
        category: "shirts",
        brand: "Vintage",
        store: "Thrifty Village",
        distance: "3.5 miles away",
        impact: impact(12.0, 700.0, 0.5),
        description: "Vintage concert tee featuring The Clash with bold black text graphics on white.",
    },
    CatalogEntry {
        name: "Patagonia Better Fleece Pullover",
        url: "item6.html",
        image: "images/patagonia/patagonia_front.jpg",
        price: 38.0,
        price_display: "$38",
        retail: "$99",
        size: "L",
        category: "shirts",
        brand: "Patagonia",
        store: "Goodwill Benton",
        distance: "2.3 miles away",
        impact: impact(25.0, 1200.0, 2.0),
        description: "Premium quarter-zip fleece in navy blue. Soft, warm, perfect for layering.",
    },
    CatalogEntry {
        name: "Buck Camp Flannel Shirt",
        url: "item7.html",
        image: "images/legendarywhitetails/flannel_front.jpg",
        price: 14.0,
        price_display: "$14",
        retail: "$45",
        size: "L",
        category: "shirts",
        brand: "Legendary Whitetails",
        store: "Salvation Army",
        distance: "4.2 miles away",
        impact: impact(15.0, 900.0, 1.5),
        description: "Classic outdoor flannel in orange/tan plaid. Warm, durable heavyweight cotton.",
    },
    CatalogEntry {
        name: "North Face Thermoball Puffer",
        url: "item8.html",
        image: "images/northface/northface_front.jpg",
        price: 58.0,
        price_display: "$58",
        retail: "$199",
        size: "M",
        category: "outerwear",
        brand: "The North Face",
        store: "Thrifty Village",
        distance: "3.5 miles away",
        impact: impact(45.0, 2500.0, 6.0),
        description: "Quilted puffer with Thermoball insulation. Lightweight, warm, packable black jacket.",
    },
    CatalogEntry {
        name: "Carhartt Duck Utility Jacket",
        url: "item9.html",
        image: "images/carhartt_jacket/carhartt_jacket_front.jpg",
        price: 48.0,
        price_display: "$48",
        retail: "$120",
        size: "L",
        category: "outerwear",
        brand: "Carhartt",
        store: "Goodwill Benton",
        distance: "2.3 miles away",
        impact: impact(40.0, 2000.0, 5.5),
        description: "Sherpa-lined canvas work jacket in moss green. Heavyweight, durable, warm.",
    },
    CatalogEntry {
        name: "Nike Flywire Running Shoes",
        url: "item10.html",
        image: "images/nike/nike_side.jpg",
        price: 24.0,
        price_display: "$24",
        retail: "$85",
        size: "10",
        category: "shoes",
        brand: "Nike",
        store: "Play It Again Sports",
        distance: "5.8 miles away",
        impact: impact(30.0, 1500.0, 5.0),
        description: "Flywire technology running shoes in vibrant red/orange. Breathable, cushioned.",
    },
];

pub fn catalog() -> &'static [CatalogEntry] {
    &CATALOG
}

pub fn find_entry(name: &str) -> Option<&'static CatalogEntry> {
    CATALOG.iter().find(|entry| entry.name == name)
}

/// Reads the leading number of a distance label such as `"2.3 miles away"`.
pub fn parse_miles(label: &str) -> Option<f64> {
    let trimmed = label.trim_start();
    let end = trimmed
        .char_indices()
        .find(|(_, c)| !(c.is_ascii_digit() || *c == '.'))
        .map(|(i, _)| i)
        .unwrap_or(trimmed.len());
    trimmed[..end].parse::<f64>().ok()
}
