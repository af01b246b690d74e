//! Region dataset loading.
//!
//! Reads a GeoJSON FeatureCollection with one feature per administrative
//! region, checks that every feature is named, and precomputes what the map
//! needs from each boundary: centroid, bounding box and the union of all
//! regions (the country outline).

use std::collections::HashSet;
use std::path::Path;

use geo::{
    BooleanOps, BoundingRect, Centroid, Contains, Coord, LineString, MultiPolygon, Point, Polygon,
    Rect,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::LoadError;

#[derive(Debug, Deserialize)]
struct FeatureCollection {
    features: Vec<Feature>,
}

#[derive(Debug, Deserialize)]
struct Feature {
    #[serde(default)]
    properties: Option<serde_json::Map<String, serde_json::Value>>,
    geometry: Option<RawGeometry>,
}

#[derive(Debug, Deserialize)]
struct RawGeometry {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    coordinates: serde_json::Value,
}

/// GeoJSON geometry as written back out to the page.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type")]
pub enum Geometry {
    MultiPolygon { coordinates: Vec<Vec<Vec<[f64; 2]>>> },
}

impl From<&MultiPolygon<f64>> for Geometry {
    fn from(mp: &MultiPolygon<f64>) -> Self {
        let coordinates = mp
            .iter()
            .map(|poly| {
                std::iter::once(poly.exterior())
                    .chain(poly.interiors())
                    .map(|ring| ring.coords().map(|c| [c.x, c.y]).collect())
                    .collect()
            })
            .collect();
        Geometry::MultiPolygon { coordinates }
    }
}

/// Index of a region in dataset order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RegionId(pub usize);

impl std::fmt::Display for RegionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone)]
pub struct Region {
    pub id: RegionId,
    pub name: String,
    pub boundary: MultiPolygon<f64>,
    /// Label anchor (x = lon, y = lat).
    pub centroid: Point<f64>,
    pub bounds: Rect<f64>,
}

impl Region {
    /// Check if a point (lon, lat) falls inside this region.
    pub fn contains(&self, lon: f64, lat: f64) -> bool {
        let p = Point::new(lon, lat);
        self.bounds.contains(&p) && self.boundary.contains(&p)
    }
}

/// All regions of one country plus their union.
#[derive(Debug, Clone)]
pub struct RegionSet {
    regions: Vec<Region>,
    outline: MultiPolygon<f64>,
}

impl RegionSet {
    /// Parse a FeatureCollection. Every feature needs a `name` string
    /// property and a Polygon or MultiPolygon geometry.
    pub fn from_geojson(geojson: &str) -> Result<Self, LoadError> {
        let fc: FeatureCollection = serde_json::from_str(geojson)?;
        if fc.features.is_empty() {
            return Err(LoadError::Empty);
        }

        let mut seen = HashSet::new();
        let mut regions = Vec::with_capacity(fc.features.len());

        for (index, feature) in fc.features.into_iter().enumerate() {
            let name = feature
                .properties
                .as_ref()
                .and_then(|props| props.get("name"))
                .and_then(|v| v.as_str())
                .map(str::to_owned)
                .ok_or(LoadError::MissingName { index })?;

            if !seen.insert(name.clone()) {
                warn!(%name, index, "duplicate region name in dataset");
            }

            let boundary = match feature.geometry {
                Some(raw) => parse_boundary(index, &name, raw)?,
                None => MultiPolygon::new(Vec::new()),
            };

            let bounds = boundary
                .bounding_rect()
                .ok_or_else(|| LoadError::EmptyBoundary {
                    index,
                    name: name.clone(),
                })?;

            let centroid = boundary.centroid().unwrap_or_else(|| bounds.center().into());

            regions.push(Region {
                id: RegionId(index),
                name,
                boundary,
                centroid,
                bounds,
            });
        }

        let outline = union_all(&regions);
        debug!(
            regions = regions.len(),
            outline_parts = outline.0.len(),
            "computed country outline"
        );

        Ok(Self { regions, outline })
    }

    pub fn regions(&self) -> &[Region] {
        &self.regions
    }

    /// Union of every region boundary.
    pub fn outline(&self) -> &MultiPolygon<f64> {
        &self.outline
    }

    pub fn get(&self, id: RegionId) -> Option<&Region> {
        self.regions.get(id.0)
    }

    pub fn len(&self) -> usize {
        self.regions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }

    /// Case-insensitive lookup by display name.
    pub fn find_by_name(&self, name: &str) -> Option<&Region> {
        let name = name.trim().to_lowercase();
        self.regions
            .iter()
            .find(|r| r.name.to_lowercase() == name)
    }

    /// Find which region contains the given point, with a nearest-region
    /// fallback for points that land just off a low-res coastline.
    pub fn find_at(&self, lon: f64, lat: f64) -> Option<&Region> {
        if let Some(region) = self.regions.iter().find(|r| r.contains(lon, lat)) {
            return Some(region);
        }
        // Search in expanding rings up to ~0.5 degree
        for &offset in &[0.1, 0.25, 0.5] {
            for &(dlon, dlat) in &[
                (offset, 0.0),
                (-offset, 0.0),
                (0.0, offset),
                (0.0, -offset),
                (offset, offset),
                (offset, -offset),
                (-offset, offset),
                (-offset, -offset),
            ] {
                if let Some(region) = self
                    .regions
                    .iter()
                    .find(|r| r.contains(lon + dlon, lat + dlat))
                {
                    return Some(region);
                }
            }
        }
        None
    }
}

/// Load a dataset from a local path, or from a URL when the `remote`
/// feature is enabled.
pub async fn load(location: &str) -> Result<RegionSet, LoadError> {
    let text = if is_url(location) {
        fetch(location).await?
    } else {
        let path = Path::new(location);
        tokio::fs::read_to_string(path)
            .await
            .map_err(|source| LoadError::Read {
                path: path.to_path_buf(),
                source,
            })?
    };

    let set = RegionSet::from_geojson(&text)?;
    info!(dataset = location, regions = set.len(), "loaded region dataset");
    Ok(set)
}

fn is_url(location: &str) -> bool {
    location.starts_with("http://") || location.starts_with("https://")
}

#[cfg(feature = "remote")]
async fn fetch(url: &str) -> Result<String, LoadError> {
    crate::remote::fetch_text(url).await
}

#[cfg(not(feature = "remote"))]
async fn fetch(url: &str) -> Result<String, LoadError> {
    Err(LoadError::Fetch {
        url: url.to_owned(),
        source: "loading datasets over HTTP requires the 'remote' feature".into(),
    })
}

fn parse_boundary(
    index: usize,
    name: &str,
    raw: RawGeometry,
) -> Result<MultiPolygon<f64>, LoadError> {
    let polygons: Vec<Vec<Vec<Vec<f64>>>> = match raw.kind.as_str() {
        "Polygon" => vec![serde_json::from_value(raw.coordinates)?],
        "MultiPolygon" => serde_json::from_value(raw.coordinates)?,
        other => {
            return Err(LoadError::UnsupportedGeometry {
                index,
                name: name.to_owned(),
                kind: other.to_owned(),
            });
        }
    };

    let polygons = polygons
        .into_iter()
        .filter(|rings| rings.first().is_some_and(|outer| outer.len() >= 3))
        .map(|rings| {
            let mut rings = rings.into_iter().map(to_line_string);
            let exterior = rings.next().unwrap_or_else(|| LineString::new(Vec::new()));
            Polygon::new(exterior, rings.collect())
        })
        .collect();

    Ok(MultiPolygon::new(polygons))
}

/// Positions may carry an altitude; only lon/lat are kept.
fn to_line_string(ring: Vec<Vec<f64>>) -> LineString<f64> {
    ring.into_iter()
        .filter_map(|pos| match pos.as_slice() {
            [x, y, ..] => Some(Coord { x: *x, y: *y }),
            _ => None,
        })
        .collect::<Vec<_>>()
        .into()
}

fn union_all(regions: &[Region]) -> MultiPolygon<f64> {
    regions
        .iter()
        .fold(MultiPolygon::new(Vec::new()), |acc, region| {
            acc.union(&region.boundary)
        })
}

#[cfg(test)]
pub(crate) mod fixtures {
    /// Three unit-ish squares side by side: A | B | C, plus nothing else.
    pub const THREE_REGIONS: &str = r#"{
      "type": "FeatureCollection",
      "features": [
        { "type": "Feature", "properties": { "name": "A", "created_at": "2020-01-01" },
          "geometry": { "type": "Polygon",
            "coordinates": [[[0,0],[2,0],[2,2],[0,2],[0,0]]] } },
        { "type": "Feature", "properties": { "name": "B" },
          "geometry": { "type": "Polygon",
            "coordinates": [[[2,0],[4,0],[4,2],[2,2],[2,0]]] } },
        { "type": "Feature", "properties": { "name": "C" },
          "geometry": { "type": "MultiPolygon",
            "coordinates": [[[[4,0],[6,0],[6,2],[4,2],[4,0]]],
                            [[[10,10],[10.1,10],[10.1,10.1],[10,10.1],[10,10]]]] } }
      ]
    }"#;
}
