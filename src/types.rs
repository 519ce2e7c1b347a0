//! Records shared by the extraction, aggregation and map stages.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Fuel grades reported by the API. Unknown grades deserialize to
/// [`FuelProduct::Other`], which is never selected.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "snake_case")]
pub enum FuelProduct {
    #[default]
    RegularGas,
    MidgradeGas,
    PremiumGas,
    Diesel,
    #[serde(other)]
    #[value(skip)]
    Other,
}

/// One station's posted price for the selected fuel, tagged with the zip
/// code it was searched under.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StationRecord {
    pub id: String,
    pub name: String,
    pub address: String,
    /// Credit price in dollars, rounded to cents.
    pub price: f64,
    pub posted_at: Option<DateTime<Utc>>,
    pub zip: String,
    pub latitude: f64,
    pub longitude: f64,
}

impl StationRecord {
    /// Google Maps search link pointing at the station's coordinates.
    pub fn map_link(&self) -> String {
        format!(
            "https://www.google.com/maps/search/?api=1&query={},{}",
            self.latitude, self.longitude
        )
    }
}

/// The cheapest station for one zip code in one fetch round.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ZipSummary {
    pub zip: String,
    pub cheapest: StationRecord,
    pub price: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PriceRange {
    pub min: f64,
    pub max: f64,
}

/// A row of the cheapest-first list handed to the presentation layer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CheapestStation {
    #[serde(flatten)]
    pub summary: ZipSummary,
    pub map_link: String,
}

impl From<ZipSummary> for CheapestStation {
    fn from(summary: ZipSummary) -> Self {
        let map_link = summary.cheapest.map_link();
        Self { summary, map_link }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LatLon {
    pub lat: f64,
    pub lon: f64,
}

impl LatLon {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }
}

/// A zip code near the requested one, with its centroid distance in miles.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Neighbor {
    pub zip: String,
    pub distance_miles: f64,
}

/// Rounds a dollar amount to whole cents.
pub fn round_cents(price: f64) -> f64 {
    (price * 100.0).round() / 100.0
}
