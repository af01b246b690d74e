use serde::Serialize;

use crate::config::{CountryConfig, TileLayerDef};
use crate::mask::build_mask;
use crate::regions::{Geometry, RegionId, RegionSet};
use crate::selection::SelectionSettings;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PathStyle {
    pub fill_color: &'static str,
    pub fill_opacity: f64,
    pub color: &'static str,
    pub weight: f64,
}

const MASK_STYLE: PathStyle = PathStyle {
    fill_color: "white",
    fill_opacity: 0.7,
    color: "white",
    weight: 0.0,
};

/// Near-invisible fill so the whole region stays clickable.
const REGION_STYLE: PathStyle = PathStyle {
    fill_color: "none",
    fill_opacity: 0.1,
    color: "black",
    weight: 1.0,
};

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MapDocument {
    pub title: &'static str,
    pub view: ViewOptions,
    pub tile_layers: Vec<TileLayer>,
    pub mask: MaskLayer,
    pub regions: RegionLayer,
    pub labels: LabelLayer,
    pub selection: SelectionSettings,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewOptions {
    /// `[lat, lon]`, Leaflet order.
    pub center: [f64; 2],
    pub zoom: f64,
    pub min_zoom: f64,
    pub zoom_snap: f64,
    pub double_click_zoom: bool,
    pub touch_zoom: bool,
    /// Leaflet's tap handler synthesizes clicks on touch browsers.
    pub tap: bool,
    pub scale_control: bool,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TileLayer {
    #[serde(flatten)]
    pub def: TileLayerDef,
    pub min_zoom: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct MaskLayer {
    pub name: &'static str,
    pub style: PathStyle,
    pub geometry: Geometry,
}

#[derive(Debug, Clone, Serialize)]
pub struct RegionLayer {
    pub name: &'static str,
    pub style: PathStyle,
    pub data: FeatureCollection,
}

#[derive(Debug, Clone, Serialize)]
pub struct FeatureCollection {
    #[serde(rename = "type")]
    kind: &'static str,
    pub features: Vec<Feature>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Feature {
    #[serde(rename = "type")]
    kind: &'static str,
    pub id: RegionId,
    pub properties: FeatureProperties,
    pub geometry: Geometry,
}

#[derive(Debug, Clone, Serialize)]
pub struct FeatureProperties {
    pub name: String,
}

/// Text markers at region centroids. Not listed in the layer switcher.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LabelLayer {
    pub icon_size: [u32; 2],
    pub icon_anchor: [u32; 2],
    pub class_name: &'static str,
    pub markers: Vec<Label>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Label {
    pub name: String,
    pub lat: f64,
    pub lon: f64,
}

/// Build the full document, including a freshly computed world mask.
pub fn assemble(
    config: &CountryConfig,
    regions: &RegionSet,
    selection: SelectionSettings,
) -> MapDocument {
    let mask = build_mask(regions.outline());

    let features = regions
        .regions()
        .iter()
        .map(|r| Feature {
            kind: "Feature",
            id: r.id,
            properties: FeatureProperties {
                name: r.name.clone(),
            },
            geometry: Geometry::from(&r.boundary),
        })
        .collect();

    let markers = regions
        .regions()
        .iter()
        .map(|r| Label {
            name: r.name.clone(),
            lat: r.centroid.y(),
            lon: r.centroid.x(),
        })
        .collect();

    let tile_layers = config
        .tile_layers
        .iter()
        .map(|def| TileLayer {
            def: def.clone(),
            min_zoom: config.min_zoom,
        })
        .collect();

    MapDocument {
        title: config.title,
        view: ViewOptions {
            center: [config.center.lat, config.center.lon],
            zoom: config.initial_zoom,
            min_zoom: config.min_zoom,
            zoom_snap: 0.5,
            double_click_zoom: false,
            touch_zoom: true,
            tap: false,
            scale_control: true,
        },
        tile_layers,
        mask: MaskLayer {
            name: "World Mask",
            style: MASK_STYLE,
            geometry: Geometry::from(&mask),
        },
        regions: RegionLayer {
            name: config.layer_name,
            style: REGION_STYLE,
            data: FeatureCollection {
                kind: "FeatureCollection",
                features,
            },
        },
        labels: LabelLayer {
            icon_size: [150, 36],
            icon_anchor: [75, 18],
            class_name: "state-label",
            markers,
        },
        selection,
    }
}
