//! A [`MapSurface`] that emits a Leaflet script.
//!
//! Surface calls are recorded as plain data and serialized into one JSON
//! payload; a fixed bootstrap script replays it with Leaflet, the
//! markercluster plugin and the heat plugin.

use serde::Serialize;

use crate::interaction::{InteractionMode, MarkerHandler};
use crate::surface::{
    ClusterOptions, GroupId, HeatOptions, HeatSample, LatLng, MapSurface, Marker, MarkerIcon,
    MarkerId, Popup, TileLayer,
};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ViewSpec {
    center: [f64; 2],
    zoom: u8,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct TileSpec {
    url: String,
    attribution: String,
    max_zoom: u8,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct IconSpec {
    class_name: String,
    icon_size: [u32; 2],
    icon_anchor: [i32; 2],
    popup_anchor: [i32; 2],
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct PopupSpec {
    html: String,
    max_width: u32,
    class_name: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct MarkerSpec {
    latlng: [f64; 2],
    icon: IconSpec,
    group: Option<usize>,
    popup: Option<PopupSpec>,
    interaction: Option<InteractionMode>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ClusterSpec {
    show_coverage_on_hover: bool,
    max_cluster_radius: u32,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct HeatSpec {
    points: Vec<[f64; 3]>,
    radius: u32,
    blur: u32,
    max_zoom: u8,
    max: f64,
    gradient: serde_json::Map<String, serde_json::Value>,
}

#[derive(Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
struct Scene {
    view: Option<ViewSpec>,
    tiles: Vec<TileSpec>,
    groups: Vec<ClusterSpec>,
    markers: Vec<MarkerSpec>,
    heat: Vec<HeatSpec>,
}

/// Replays the scene payload. `SCENE` is defined just before this runs.
const BOOTSTRAP: &str = r#"
const map = L.map('map');
if (SCENE.view) {
    map.setView(SCENE.view.center, SCENE.view.zoom);
}
SCENE.tiles.forEach(t => L.tileLayer(t.url, { attribution: t.attribution, maxZoom: t.maxZoom }).addTo(map));
const groups = SCENE.groups.map(g => L.markerClusterGroup(g));
SCENE.markers.forEach(m => {
    const marker = L.marker(m.latlng, { icon: L.divIcon(m.icon) });
    if (m.popup) {
        marker.bindPopup(m.popup.html, { maxWidth: m.popup.maxWidth, className: m.popup.className });
    }
    if (m.interaction === 'hover') {
        let pinned = false;
        marker.off('click');
        marker.on('mouseover', () => marker.openPopup());
        marker.on('mouseout', () => { if (!pinned) marker.closePopup(); });
        marker.on('click', () => { pinned = true; marker.openPopup(); });
        marker.on('popupclose', () => { pinned = false; });
    }
    (m.group === null ? map : groups[m.group]).addLayer(marker);
});
groups.forEach(g => map.addLayer(g));
SCENE.heat.forEach(h => L.heatLayer(h.points, h).addTo(map));
"#;

#[derive(Debug, Default)]
pub struct LeafletMap {
    scene: Scene,
}

impl LeafletMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn marker_count(&self) -> usize {
        self.scene.markers.len()
    }

    pub fn heat_layer_count(&self) -> usize {
        self.scene.heat.len()
    }

    /// The scene payload followed by the bootstrap, ready for a `<script>` element.
    pub fn render_script(&self) -> serde_json::Result<String> {
        let payload = serde_json::to_string(&self.scene)?;
        // Keep popup markup from terminating the surrounding script element.
        let payload = payload.replace("</", "<\\/");
        Ok(format!("const SCENE = {payload};\n{BOOTSTRAP}"))
    }
}

impl MapSurface for LeafletMap {
    fn set_view(&mut self, center: LatLng, zoom: u8) {
        self.scene.view = Some(ViewSpec {
            center: [center.lat, center.lng],
            zoom,
        });
    }

    fn add_tile_layer(&mut self, tiles: &TileLayer) {
        self.scene.tiles.push(TileSpec {
            url: tiles.url_template.clone(),
            attribution: tiles.attribution.clone(),
            max_zoom: tiles.max_zoom,
        });
    }

    fn clear_overlays(&mut self) {
        self.scene.groups.clear();
        self.scene.markers.clear();
        self.scene.heat.clear();
    }

    fn add_cluster_group(&mut self, options: &ClusterOptions) -> GroupId {
        self.scene.groups.push(ClusterSpec {
            show_coverage_on_hover: options.show_coverage_on_hover,
            max_cluster_radius: options.max_cluster_radius,
        });
        GroupId(self.scene.groups.len() - 1)
    }

    fn add_marker(&mut self, marker: &Marker, group: Option<GroupId>) -> MarkerId {
        let MarkerIcon {
            class_name,
            size,
            anchor,
            popup_anchor,
        } = &marker.icon;

        self.scene.markers.push(MarkerSpec {
            latlng: [marker.position.lat, marker.position.lng],
            icon: IconSpec {
                class_name: class_name.clone(),
                icon_size: [size.0, size.1],
                icon_anchor: [anchor.0, anchor.1],
                popup_anchor: [popup_anchor.0, popup_anchor.1],
            },
            group: group.map(|g| g.0),
            popup: None,
            interaction: None,
        });
        MarkerId(self.scene.markers.len() - 1)
    }

    fn bind_popup(&mut self, marker: MarkerId, popup: &Popup) {
        if let Some(spec) = self.scene.markers.get_mut(marker.0) {
            spec.popup = Some(PopupSpec {
                html: popup.html.clone(),
                max_width: popup.max_width,
                class_name: popup.class_name.clone(),
            });
        }
    }

    /// Only the handler's mode survives; the bootstrap re-implements it in JS.
    fn on(&mut self, marker: MarkerId, handler: Box<dyn MarkerHandler>) {
        if let Some(spec) = self.scene.markers.get_mut(marker.0) {
            spec.interaction = Some(handler.mode());
        }
    }

    fn add_heat_layer(&mut self, samples: &[HeatSample], options: &HeatOptions) {
        let gradient = options
            .gradient
            .iter()
            .map(|(stop, color)| (stop.to_string(), serde_json::Value::from(color.as_str())))
            .collect();

        self.scene.heat.push(HeatSpec {
            points: samples.iter().map(|s| [s.lat, s.lng, s.weight]).collect(),
            radius: options.radius,
            blur: options.blur,
            max_zoom: options.max_zoom,
            max: options.max,
            gradient,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MapConfig;

    fn sample_marker(config: &MapConfig) -> Marker {
        Marker {
            position: LatLng::new(40.7, -74.0),
            icon: config.icon.clone(),
        }
    }

    #[test]
    fn test_script_contains_scene() {
        let config = MapConfig::default();
        let mut map = LeafletMap::new();
        map.set_view(config.center, config.zoom);
        map.add_tile_layer(&config.tiles);
        let group = map.add_cluster_group(&config.cluster);
        let id = map.add_marker(&sample_marker(&config), Some(group));
        map.bind_popup(
            id,
            &Popup {
                html: "<p>Piping Plover</p>".into(),
                max_width: 300,
                class_name: "bird-popup-wrapper".into(),
            },
        );
        map.on(id, InteractionMode::Hover.handler());
        map.add_heat_layer(
            &[HeatSample {
                lat: 40.7,
                lng: -74.0,
                weight: 0.5,
            }],
            &config.heat,
        );

        let script = map.render_script().unwrap();

        assert!(script.starts_with("const SCENE = {"));
        assert!(script.contains(r#""latlng":[40.7,-74.0]"#));
        assert!(script.contains(r#""group":0"#));
        assert!(script.contains(r#""interaction":"hover""#));
        assert!(script.contains(r#""maxClusterRadius":50"#));
        assert!(script.contains(r#""points":[[40.7,-74.0,0.5]]"#));
        assert!(script.contains(r##""0.5":"#f39c12""##));
        assert!(script.contains("<p>Piping Plover<\\/p>"));
        assert!(!script.contains("</p>"));
        assert!(script.contains("L.markerClusterGroup"));
    }

    #[test]
    fn test_clear_overlays_keeps_view_and_tiles() {
        let config = MapConfig::default();
        let mut map = LeafletMap::new();
        map.set_view(config.center, config.zoom);
        map.add_tile_layer(&config.tiles);
        map.add_marker(&sample_marker(&config), None);

        map.clear_overlays();

        assert_eq!(map.marker_count(), 0);
        let script = map.render_script().unwrap();
        assert!(script.contains("tile.openstreetmap.org"));
        assert!(script.contains(r#""zoom":11"#));
    }
}
