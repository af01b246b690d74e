use clap::ValueEnum;
use serde::Serialize;

use crate::camera::LatLon;

const OSM_ATTRIBUTION: &str =
    "&copy; <a href=\"https://www.openstreetmap.org/copyright\">OpenStreetMap</a> contributors";

const DEFAULT_VIEWPORT_META: &str = "width=device-width, initial-scale=1.0";

/// One switchable base layer.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TileLayerDef {
    pub name: &'static str,
    pub url: &'static str,
    pub attribution: String,
    pub subdomains: &'static str,
    /// Shown when the page loads.
    pub default: bool,
}

/// Everything that differs between the served countries.
#[derive(Debug, Clone, PartialEq)]
pub struct CountryConfig {
    pub key: &'static str,
    pub title: &'static str,
    /// Name of the region overlay in the layer switcher.
    pub layer_name: &'static str,
    pub center: LatLon,
    pub initial_zoom: f64,
    pub min_zoom: f64,
    /// Path or URL of the region GeoJSON.
    pub dataset: String,
    pub viewport_meta: &'static str,
    pub port: u16,
    pub tile_layers: Vec<TileLayerDef>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum CountryPreset {
    Brazil,
    India,
}

impl CountryPreset {
    pub fn config(self) -> CountryConfig {
        match self {
            CountryPreset::Brazil => CountryConfig {
                key: "brazil",
                title: "Brazil Map",
                layer_name: "Brazil",
                center: LatLon::new(-15.0, -53.0),
                initial_zoom: 4.5,
                min_zoom: 4.5,
                dataset: "data/brazil_states.geojson".to_owned(),
                viewport_meta: DEFAULT_VIEWPORT_META,
                port: 5003,
                tile_layers: tile_layers(),
            },
            CountryPreset::India => CountryConfig {
                key: "india",
                title: "India Map",
                layer_name: "India",
                center: LatLon::new(18.0, 84.0),
                initial_zoom: 5.0,
                min_zoom: 5.0,
                dataset: "data/india_states.geojson".to_owned(),
                viewport_meta: "width=device-width, initial-scale=1, maximum-scale=1, \
                                user-scalable=no",
                port: 5002,
                tile_layers: tile_layers(),
            },
        }
    }
}

/// Political, physical and plain street base layers; the street layer is
/// the default.
fn tile_layers() -> Vec<TileLayerDef> {
    vec![
        TileLayerDef {
            name: "Political Map",
            url: "https://{s}.basemaps.cartocdn.com/rastertiles/voyager/{z}/{x}/{y}{r}.png",
            attribution: format!(
                "{OSM_ATTRIBUTION} &copy; <a href=\"https://carto.com/attributions\">CARTO</a>"
            ),
            subdomains: "abcd",
            default: false,
        },
        TileLayerDef {
            name: "Physical Map",
            url: "https://{s}.tile.opentopomap.org/{z}/{x}/{y}.png",
            attribution: "&copy; OpenTopoMap, SRTM, NASA, OpenStreetMap contributors".to_owned(),
            subdomains: "abc",
            default: false,
        },
        TileLayerDef {
            name: "Default Map",
            url: "https://{s}.tile.openstreetmap.org/{z}/{x}/{y}.png",
            attribution: OSM_ATTRIBUTION.to_owned(),
            subdomains: "abc",
            default: true,
        },
    ]
}
