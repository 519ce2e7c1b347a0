//! Extractor: flattens a station search response into [`StationRecord`]s.
//!
//! Extraction is strict. The response is decoded into typed structs, so a
//! missing key or a wrongly typed field anywhere in the station list rejects
//! the whole zip rather than just the offending station. Only `credit` and
//! `postedTime` may be null or absent; an entry without a credit price is
//! skipped.

use anyhow::{Context, Result, bail};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::Value;

use crate::types::{FuelProduct, StationRecord, round_cents};

#[derive(Debug, Deserialize)]
struct GraphQlResponse {
    data: Option<ResponseData>,
    #[serde(default)]
    errors: Vec<GraphQlError>,
}

#[derive(Debug, Deserialize)]
struct GraphQlError {
    message: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ResponseData {
    location_by_search_term: Location,
}

#[derive(Debug, Deserialize)]
struct Location {
    stations: StationPage,
}

#[derive(Debug, Deserialize)]
struct StationPage {
    results: Vec<StationNode>,
}

#[derive(Debug, Deserialize)]
struct StationNode {
    id: String,
    name: String,
    latitude: f64,
    longitude: f64,
    address: Address,
    prices: Vec<PriceNode>,
}

#[derive(Debug, Deserialize)]
struct Address {
    line1: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PriceNode {
    fuel_product: FuelProduct,
    credit: Option<PostedPrice>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PostedPrice {
    price: f64,
    posted_time: Option<DateTime<Utc>>,
}

/// Returns one record per station price entry for `fuel` with a strictly
/// positive credit price. Every record is tagged with `zip`.
///
/// # Errors
///
/// Fails if the body does not have the expected shape, or if the API
/// returned no data (the GraphQL error messages are included).
pub fn extract_stations(body: &Value, zip: &str, fuel: FuelProduct) -> Result<Vec<StationRecord>> {
    let response = GraphQlResponse::deserialize(body)
        .with_context(|| format!("malformed station response for zip {zip}"))?;

    let Some(data) = response.data else {
        let messages: Vec<_> = response.errors.into_iter().map(|e| e.message).collect();
        bail!("no station data for zip {zip}: {}", messages.join("; "));
    };

    let mut records = Vec::new();

    for station in data.location_by_search_term.stations.results {
        for entry in &station.prices {
            if entry.fuel_product != fuel {
                continue;
            }
            let Some(credit) = &entry.credit else {
                continue;
            };
            // zero is the API's placeholder for "no price posted"; so is
            // anything that rounds to zero
            let price = round_cents(credit.price);
            if price <= 0.0 {
                continue;
            }

            records.push(StationRecord {
                id: station.id.clone(),
                name: station.name.clone(),
                address: station.address.line1.clone(),
                price,
                posted_at: credit.posted_time,
                zip: zip.to_string(),
                latitude: station.latitude,
                longitude: station.longitude,
            });
        }
    }

    Ok(records)
}
