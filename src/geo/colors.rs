//! Choropleth gradient over price rank.
//!
//! Zips are ranked by cheapest price and spread linearly from
//! [`CHEAPEST`] to [`PRICIEST`]. Channels are interpolated independently and
//! truncated, not rounded.

use serde::Serialize;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Rgba(pub [u8; 4]);

/// Intense red, assigned to the cheapest zip.
pub const CHEAPEST: Rgba = Rgba([255, 0, 0, 255]);
/// Pale red, assigned to the most expensive zip.
pub const PRICIEST: Rgba = Rgba([255, 200, 200, 255]);
/// Fill for zips without a price.
pub const TRANSPARENT: Rgba = Rgba([255, 255, 255, 0]);

/// Channel-wise `start * (1 - ratio) + end * ratio`, truncated to `u8`.
pub fn interpolate(start: Rgba, end: Rgba, ratio: f64) -> Rgba {
    let mut out = [0u8; 4];
    for (i, channel) in out.iter_mut().enumerate() {
        let value = f64::from(start.0[i]) * (1.0 - ratio) + f64::from(end.0[i]) * ratio;
        *channel = value as u8;
    }
    Rgba(out)
}

/// Zip code to fill color for one fetch round.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ColorAssignment(BTreeMap<String, Rgba>);

impl ColorAssignment {
    pub fn get(&self, zip: &str) -> Option<Rgba> {
        self.0.get(zip).copied()
    }

    /// The assigned color, or [`TRANSPARENT`] when the zip has none.
    pub fn fill_for(&self, zip: &str) -> Rgba {
        self.get(zip).unwrap_or(TRANSPARENT)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Ranks `prices` ascending (equal prices by zip) and assigns each zip the
/// gradient color at `rank / (n - 1)`. A single zip gets [`CHEAPEST`].
pub fn assign_colors_to_zip_codes(prices: &BTreeMap<String, f64>) -> ColorAssignment {
    let mut ranked: Vec<(&String, f64)> = prices.iter().map(|(z, p)| (z, *p)).collect();
    // BTreeMap order already sorts by zip, a stable sort keeps it for ties
    ranked.sort_by(|a, b| a.1.total_cmp(&b.1));

    let n = ranked.len();
    let colors = ranked
        .into_iter()
        .enumerate()
        .map(|(i, (zip, _))| {
            let ratio = if n > 1 { i as f64 / (n - 1) as f64 } else { 0.0 };
            (zip.clone(), interpolate(CHEAPEST, PRICIEST, ratio))
        })
        .collect();

    ColorAssignment(colors)
}
