//! One dashboard round trip: a zip code in, everything the presentation
//! layer renders out.

use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{info, warn};

use crate::aggregate::{cheapest_prices, group_by_zip, price_range, summarize};
use crate::extract::extract_stations;
use crate::fetch::{HttpClient, fetch_all};
use crate::geo::{
    ColorAssignment, DEFAULT_RADIUS_MILES, GeometryIndex, MapLayers, assign_colors_to_zip_codes,
    build_layers, neighboring_zips,
};
use crate::types::{CheapestStation, FuelProduct, Neighbor, PriceRange, StationRecord};

#[derive(Debug, Clone, PartialEq)]
pub struct DashboardRequest {
    pub zip: String,
    /// Whether the user asked for prices. Nothing is fetched otherwise.
    pub fetch_requested: bool,
}

impl DashboardRequest {
    pub fn fetch(zip: &str) -> Self {
        Self {
            zip: zip.trim().to_string(),
            fetch_requested: true,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Report {
    pub zip: String,
    pub neighbors: Vec<Neighbor>,
    /// Every matching station, per zip code.
    pub stations: BTreeMap<String, Vec<StationRecord>>,
    /// One entry per zip with a price, cheapest first.
    pub cheapest: Vec<CheapestStation>,
    pub price_range: Option<PriceRange>,
    pub colors: ColorAssignment,
    pub layers: MapLayers,
}

#[derive(Debug, Clone)]
pub enum DashboardResponse {
    /// No fetch was requested.
    Idle,
    /// The zip code is not in the loaded boundary data.
    UnknownZip { zip: String },
    Ready(Box<Report>),
}

pub struct Dashboard<C> {
    client: Arc<C>,
    endpoint: String,
    geometry: GeometryIndex,
    fuel: FuelProduct,
    radius_miles: f64,
    concurrency: usize,
}

impl<C: HttpClient + 'static> Dashboard<C> {
    pub fn new(client: C, endpoint: impl Into<String>, geometry: GeometryIndex) -> Self {
        Self {
            client: Arc::new(client),
            endpoint: endpoint.into(),
            geometry,
            fuel: FuelProduct::default(),
            radius_miles: DEFAULT_RADIUS_MILES,
            concurrency: 1,
        }
    }

    pub fn with_fuel(mut self, fuel: FuelProduct) -> Self {
        self.fuel = fuel;
        self
    }

    /// Negative and NaN radii are treated as zero.
    pub fn with_radius(mut self, radius_miles: f64) -> Self {
        self.radius_miles = radius_miles.max(0.0);
        self
    }

    /// Maximum number of zip codes fetched at once. `1` fetches them one
    /// after another.
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    /// Runs one request through fetch, extraction, aggregation and coloring.
    ///
    /// Zips that fail to fetch or extract are logged and left out, so the
    /// report may be partial.
    #[tracing::instrument(skip(self, request), fields(zip = %request.zip))]
    pub async fn respond(&self, request: &DashboardRequest) -> DashboardResponse {
        if !request.fetch_requested {
            return DashboardResponse::Idle;
        }

        let Some(neighbors) = neighboring_zips(&self.geometry, &request.zip, self.radius_miles)
        else {
            warn!("Zip code not found in boundary data");
            return DashboardResponse::UnknownZip {
                zip: request.zip.clone(),
            };
        };

        let zips: Vec<String> = neighbors.iter().map(|n| n.zip.clone()).collect();
        info!(zips = zips.len(), radius_miles = self.radius_miles, "Querying neighboring zips");

        let bodies = fetch_all(self.client.clone(), &self.endpoint, &zips, self.concurrency).await;

        let mut records = Vec::new();
        for (zip, body) in &bodies {
            match extract_stations(body, zip, self.fuel) {
                Ok(found) => records.extend(found),
                Err(e) => warn!(zip = %zip, error = %e, "Skipping zip with unreadable station data"),
            }
        }

        let stations = group_by_zip(records);
        let summaries = summarize(&stations);
        let price_range = price_range(&summaries);
        let colors = assign_colors_to_zip_codes(&cheapest_prices(&summaries));
        let layers = build_layers(&zips, &summaries, &colors, &self.geometry, &request.zip);

        info!(
            fetched = bodies.len(),
            priced = summaries.len(),
            "Dashboard report ready"
        );

        DashboardResponse::Ready(Box::new(Report {
            zip: request.zip.clone(),
            neighbors,
            stations,
            cheapest: summaries.into_iter().map(CheapestStation::from).collect(),
            price_range,
            colors,
            layers,
        }))
    }
}
