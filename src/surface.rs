//! The map rendering surface as a capability interface.
//!
//! The pipeline only talks to [`MapSurface`]; the slippy-map engine behind it
//! is swappable. [`RecordingSurface`] keeps everything in memory and can
//! replay pointer events against the installed handlers.

use serde::Serialize;
use std::collections::HashMap;

use crate::interaction::{MarkerEvent, MarkerHandler, PopupController, PopupState};

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

impl LatLng {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// Finite and inside the WGS84 latitude/longitude ranges.
    pub fn is_valid(&self) -> bool {
        self.lat.is_finite()
            && self.lng.is_finite()
            && (-90.0..=90.0).contains(&self.lat)
            && (-180.0..=180.0).contains(&self.lng)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TileLayer {
    pub url_template: String,
    pub attribution: String,
    pub max_zoom: u8,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MarkerIcon {
    pub class_name: String,
    pub size: (u32, u32),
    pub anchor: (i32, i32),
    pub popup_anchor: (i32, i32),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Marker {
    pub position: LatLng,
    pub icon: MarkerIcon,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Popup {
    pub html: String,
    pub max_width: u32,
    pub class_name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClusterOptions {
    pub show_coverage_on_hover: bool,
    pub max_cluster_radius: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct HeatSample {
    pub lat: f64,
    pub lng: f64,
    pub weight: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HeatOptions {
    pub radius: u32,
    pub blur: u32,
    pub max_zoom: u8,
    pub max: f64,
    pub gradient: Vec<(f64, String)>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct MarkerId(pub usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct GroupId(pub usize);

/// Drawing capabilities the pipeline needs from a slippy-map engine.
pub trait MapSurface {
    fn set_view(&mut self, center: LatLng, zoom: u8);
    fn add_tile_layer(&mut self, tiles: &TileLayer);
    /// Removes every marker, cluster group and heat layer. Tiles stay.
    fn clear_overlays(&mut self);
    fn add_cluster_group(&mut self, options: &ClusterOptions) -> GroupId;
    /// Adds a marker to `group`, or directly to the map when `group` is `None`.
    fn add_marker(&mut self, marker: &Marker, group: Option<GroupId>) -> MarkerId;
    fn bind_popup(&mut self, marker: MarkerId, popup: &Popup);
    fn on(&mut self, marker: MarkerId, handler: Box<dyn MarkerHandler>);
    fn add_heat_layer(&mut self, samples: &[HeatSample], options: &HeatOptions);
}

pub struct RecordedMarker {
    pub marker: Marker,
    pub group: Option<GroupId>,
    pub popup: Option<Popup>,
    pub popup_state: PopupState,
    handler: Option<Box<dyn MarkerHandler>>,
}

impl RecordedMarker {
    pub fn has_handler(&self) -> bool {
        self.handler.is_some()
    }
}

/// Headless surface used for dry runs and tests.
#[derive(Default)]
pub struct RecordingSurface {
    pub view: Option<(LatLng, u8)>,
    pub tile_layers: Vec<TileLayer>,
    pub groups: Vec<ClusterOptions>,
    pub heat_layers: Vec<Vec<HeatSample>>,
    markers: Vec<RecordedMarker>,
    /// Total `add_marker` calls, including markers later cleared.
    pub add_marker_calls: usize,
    next_marker: usize,
    ids: HashMap<MarkerId, usize>,
}

impl RecordingSurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn markers(&self) -> &[RecordedMarker] {
        &self.markers
    }

    pub fn marker(&self, id: MarkerId) -> Option<&RecordedMarker> {
        self.ids.get(&id).map(|&i| &self.markers[i])
    }

    pub fn marker_ids(&self) -> Vec<MarkerId> {
        let mut ids: Vec<_> = self.ids.iter().map(|(id, i)| (*i, *id)).collect();
        ids.sort_unstable_by_key(|(i, _)| *i);
        ids.into_iter().map(|(_, id)| id).collect()
    }

    /// Feeds `event` to the marker's handler; returns whether its popup is open afterwards.
    pub fn dispatch(&mut self, id: MarkerId, event: MarkerEvent) -> Option<bool> {
        let index = *self.ids.get(&id)?;
        let recorded = &mut self.markers[index];
        if let Some(handler) = recorded.handler.as_mut() {
            handler.handle(event, &mut recorded.popup_state);
        }
        Some(recorded.popup_state.is_open())
    }
}

impl MapSurface for RecordingSurface {
    fn set_view(&mut self, center: LatLng, zoom: u8) {
        self.view = Some((center, zoom));
    }

    fn add_tile_layer(&mut self, tiles: &TileLayer) {
        self.tile_layers.push(tiles.clone());
    }

    fn clear_overlays(&mut self) {
        self.markers.clear();
        self.ids.clear();
        self.groups.clear();
        self.heat_layers.clear();
    }

    fn add_cluster_group(&mut self, options: &ClusterOptions) -> GroupId {
        self.groups.push(options.clone());
        GroupId(self.groups.len() - 1)
    }

    fn add_marker(&mut self, marker: &Marker, group: Option<GroupId>) -> MarkerId {
        let id = MarkerId(self.next_marker);
        self.next_marker += 1;
        self.add_marker_calls += 1;

        self.ids.insert(id, self.markers.len());
        self.markers.push(RecordedMarker {
            marker: marker.clone(),
            group,
            popup: None,
            popup_state: PopupState::Closed,
            handler: None,
        });
        id
    }

    fn bind_popup(&mut self, marker: MarkerId, popup: &Popup) {
        if let Some(&i) = self.ids.get(&marker) {
            self.markers[i].popup = Some(popup.clone());
        }
    }

    fn on(&mut self, marker: MarkerId, handler: Box<dyn MarkerHandler>) {
        if let Some(&i) = self.ids.get(&marker) {
            self.markers[i].handler = Some(handler);
        }
    }

    fn add_heat_layer(&mut self, samples: &[HeatSample], _options: &HeatOptions) {
        self.heat_layers.push(samples.to_vec());
    }
}
