//! Zip code boundaries loaded from GeoJSON.
//!
//! Only exterior rings are kept. They stay in GeoJSON `[lon, lat]` order so
//! the map layers can pass them through untouched.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::Path;
use tracing::{debug, info, warn};

use crate::types::LatLon;

#[derive(Debug, Deserialize)]
struct FeatureCollection {
    features: Vec<Feature>,
}

/// Properties and geometry stay untyped here so one malformed feature can
/// be skipped without rejecting the whole collection.
#[derive(Debug, Deserialize)]
struct Feature {
    #[serde(default)]
    properties: Value,
    #[serde(default)]
    geometry: Value,
}

type Position = Vec<f64>;

#[derive(Debug, Deserialize)]
#[serde(tag = "type")]
enum Geometry {
    Polygon { coordinates: Vec<Vec<Position>> },
    MultiPolygon { coordinates: Vec<Vec<Vec<Position>>> },
    #[serde(other)]
    Unsupported,
}

impl Geometry {
    fn exterior_rings(self) -> Vec<Vec<Position>> {
        match self {
            Geometry::Polygon { coordinates } => coordinates.into_iter().take(1).collect(),
            Geometry::MultiPolygon { coordinates } => coordinates
                .into_iter()
                .filter_map(|polygon| polygon.into_iter().next())
                .collect(),
            Geometry::Unsupported => Vec::new(),
        }
    }
}

/// Boundary and centroid of one zip code.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ZipGeometry {
    pub zip: String,
    pub centroid: LatLon,
    /// Exterior rings as `[lon, lat]` pairs.
    pub rings: Vec<Vec<[f64; 2]>>,
}

/// Read-only lookup of zip code geometry.
#[derive(Debug, Clone, Default)]
pub struct GeometryIndex {
    zips: BTreeMap<String, ZipGeometry>,
}

impl GeometryIndex {
    /// Reads and merges every GeoJSON file in `paths`.
    pub fn load<P: AsRef<Path>>(paths: &[P], zip_property: &str) -> Result<Self> {
        let mut sources = Vec::with_capacity(paths.len());
        for path in paths {
            let path = path.as_ref();
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("failed to read boundary file {}", path.display()))?;
            sources.push(content);
        }

        let index = Self::from_geojson(sources.iter().map(String::as_str), zip_property)?;
        info!(files = paths.len(), zips = index.len(), "Zip boundaries loaded");
        Ok(index)
    }

    /// Builds the index from GeoJSON `FeatureCollection` documents. Features
    /// sharing a zip code are merged into one entry.
    pub fn from_geojson<'a, I>(sources: I, zip_property: &str) -> Result<Self>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut rings_by_zip: BTreeMap<String, Vec<Vec<[f64; 2]>>> = BTreeMap::new();

        for source in sources {
            let collection: FeatureCollection =
                serde_json::from_str(source).context("boundary data is not a GeoJSON FeatureCollection")?;

            for feature in collection.features {
                let Some(zip) = feature.properties.get(zip_property).and_then(zip_value) else {
                    warn!(zip_property, "Skipping feature without a zip code");
                    continue;
                };

                let geometry = match Geometry::deserialize(&feature.geometry) {
                    Ok(geometry) => geometry,
                    Err(e) => {
                        warn!(zip = %zip, error = %e, "Skipping feature with malformed geometry");
                        continue;
                    }
                };

                let rings: Vec<Vec<[f64; 2]>> = geometry
                    .exterior_rings()
                    .into_iter()
                    .filter_map(to_ring)
                    .collect();

                if rings.is_empty() {
                    warn!(zip = %zip, "Skipping feature with unusable geometry");
                    continue;
                }

                rings_by_zip.entry(zip).or_default().extend(rings);
            }
        }

        let zips = rings_by_zip
            .into_iter()
            .map(|(zip, rings)| {
                let centroid = centroid(&rings);
                debug!(zip = %zip, lat = centroid.lat, lon = centroid.lon, "Zip centroid");
                let geometry = ZipGeometry {
                    zip: zip.clone(),
                    centroid,
                    rings,
                };
                (zip, geometry)
            })
            .collect();

        Ok(Self { zips })
    }

    pub fn get(&self, zip: &str) -> Option<&ZipGeometry> {
        self.zips.get(zip)
    }

    pub fn contains(&self, zip: &str) -> bool {
        self.zips.contains_key(zip)
    }

    pub fn centroid(&self, zip: &str) -> Option<LatLon> {
        self.get(zip).map(|g| g.centroid)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ZipGeometry> {
        self.zips.values()
    }

    pub fn len(&self) -> usize {
        self.zips.len()
    }

    pub fn is_empty(&self) -> bool {
        self.zips.is_empty()
    }
}

/// Zip codes appear as strings in most boundary files but as numbers in some.
fn zip_value(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Keeps the first two ordinates of each position. Rings with a malformed
/// position or fewer than three vertices are dropped.
fn to_ring(positions: Vec<Position>) -> Option<Vec<[f64; 2]>> {
    let ring: Vec<[f64; 2]> = positions
        .iter()
        .map(|p| match p.as_slice() {
            [lon, lat, ..] => Some([*lon, *lat]),
            _ => None,
        })
        .collect::<Option<_>>()?;

    (ring.len() >= 3).then_some(ring)
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Average of all ring vertices. The closing vertex of a ring is skipped
/// so it is not counted twice.
fn centroid(rings: &[Vec<[f64; 2]>]) -> LatLon {
    let mut lats = Vec::new();
    let mut lons = Vec::new();

    for ring in rings {
        let open = match (ring.first(), ring.last()) {
            (Some(first), Some(last)) if ring.len() > 1 && first == last => &ring[..ring.len() - 1],
            _ => &ring[..],
        };
        for [lon, lat] in open {
            lons.push(*lon);
            lats.push(*lat);
        }
    }

    LatLon::new(mean(&lats), mean(&lons))
}
