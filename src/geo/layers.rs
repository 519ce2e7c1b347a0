//! Map layer data for the dashboard: region fills, station markers and zip
//! labels. Positions are `[lon, lat]`, matching the boundary rings.

use serde::Serialize;

use crate::geo::colors::{ColorAssignment, Rgba};
use crate::geo::geometry::GeometryIndex;
use crate::types::{LatLon, ZipSummary};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RegionLayer {
    pub zip: String,
    pub polygon: Vec<Vec<[f64; 2]>>,
    pub fill: Rgba,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MarkerLayer {
    pub zip: String,
    pub station_id: String,
    pub name: String,
    pub price: f64,
    pub position: [f64; 2],
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LabelLayer {
    pub zip: String,
    pub text: String,
    pub position: [f64; 2],
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MapLayers {
    /// Initial view, the requested zip's centroid.
    pub center: Option<LatLon>,
    pub regions: Vec<RegionLayer>,
    pub markers: Vec<MarkerLayer>,
    pub labels: Vec<LabelLayer>,
}

/// Builds the layers for one fetch round.
///
/// Every zip in `zips` with known geometry gets a region and a label, filled
/// with its assigned color or transparent when it has no price. Every summary
/// gets a marker at its cheapest station, whether or not its zip has
/// geometry.
pub fn build_layers(
    zips: &[String],
    summaries: &[ZipSummary],
    colors: &ColorAssignment,
    geometry: &GeometryIndex,
    center_zip: &str,
) -> MapLayers {
    let mut layers = MapLayers {
        center: geometry.centroid(center_zip),
        ..Default::default()
    };

    for zip in zips {
        let Some(shape) = geometry.get(zip) else {
            continue;
        };

        layers.regions.push(RegionLayer {
            zip: zip.clone(),
            polygon: shape.rings.clone(),
            fill: colors.fill_for(zip),
        });

        let text = match summaries.iter().find(|s| &s.zip == zip) {
            Some(summary) => format!("{zip}\n${:.2}", summary.price),
            None => zip.clone(),
        };
        layers.labels.push(LabelLayer {
            zip: zip.clone(),
            text,
            position: [shape.centroid.lon, shape.centroid.lat],
        });
    }

    layers.markers = summaries
        .iter()
        .map(|s| MarkerLayer {
            zip: s.zip.clone(),
            station_id: s.cheapest.id.clone(),
            name: s.cheapest.name.clone(),
            price: s.price,
            position: [s.cheapest.longitude, s.cheapest.latitude],
        })
        .collect();

    layers
}
