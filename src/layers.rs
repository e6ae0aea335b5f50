//! Turns sightings into map-layer primitives.
//!
//! [`LayerBuilder::build`] is pure: it validates the record and prepares the
//! marker, popup, cluster membership and heat sample. [`MapLayer::attach`]
//! performs the surface calls and installs the interaction handler.

use thiserror::Error;
use tracing::warn;

use crate::config::{Layout, MapConfig, RenderMode};
use crate::interaction::InteractionMode;
use crate::models::Sighting;
use crate::popup;
use crate::surface::{
    GroupId, HeatSample, LatLng, MapSurface, Marker, MarkerIcon, MarkerId, Popup,
};

/// Why a record cannot be placed on the map.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Rejection {
    #[error("sighting has no location")]
    MissingLocation,

    #[error("sighting has invalid coordinates (lat={lat:?}, lng={lng:?})")]
    InvalidCoordinates { lat: Option<f64>, lng: Option<f64> },
}

/// Everything needed to put one sighting on the map.
#[derive(Debug, Clone, PartialEq)]
pub struct MapLayer {
    pub marker: Marker,
    pub popup: Popup,
    pub interaction: InteractionMode,
    /// Joins the shared cluster group instead of the map itself.
    pub clustered: bool,
    pub heat: Option<HeatSample>,
}

impl MapLayer {
    pub fn position(&self) -> LatLng {
        self.marker.position
    }

    /// Adds the marker to the surface (inside `group` when clustered), binds
    /// the popup and installs a fresh interaction handler.
    pub fn attach<S: MapSurface + ?Sized>(
        &self,
        surface: &mut S,
        group: Option<GroupId>,
    ) -> MarkerId {
        let group = if self.clustered { group } else { None };
        let id = surface.add_marker(&self.marker, group);
        surface.bind_popup(id, &self.popup);
        surface.on(id, self.interaction.handler());
        id
    }
}

pub struct LayerBuilder {
    mode: RenderMode,
    icon: MarkerIcon,
    popup_max_width: u32,
    popup_class: String,
    heat_weight: f64,
}

impl LayerBuilder {
    pub fn new(config: &MapConfig) -> Self {
        Self {
            mode: config.mode,
            icon: config.icon.clone(),
            popup_max_width: config.popup_max_width,
            popup_class: config.popup_class.clone(),
            heat_weight: config.heat_weight,
        }
    }

    pub fn build(&self, sighting: &Sighting) -> Result<MapLayer, Rejection> {
        let location = sighting.location.as_ref().ok_or(Rejection::MissingLocation)?;

        let position = match (location.lat, location.lng) {
            (Some(lat), Some(lng)) => LatLng::new(lat, lng),
            _ => {
                return Err(Rejection::InvalidCoordinates {
                    lat: location.lat,
                    lng: location.lng,
                });
            }
        };

        if !position.is_valid() {
            return Err(Rejection::InvalidCoordinates {
                lat: location.lat,
                lng: location.lng,
            });
        }

        let clustered = self.mode.layout == Layout::Cluster;

        Ok(MapLayer {
            marker: Marker {
                position,
                icon: self.icon.clone(),
            },
            popup: Popup {
                html: popup::render(self.mode.popup_style, sighting),
                max_width: self.popup_max_width,
                class_name: self.popup_class.clone(),
            },
            interaction: InteractionMode::for_style(self.mode.popup_style),
            clustered,
            heat: clustered.then_some(HeatSample {
                lat: position.lat,
                lng: position.lng,
                weight: self.heat_weight,
            }),
        })
    }

    /// Builds every placeable sighting in order; rejected records are logged
    /// and counted, never returned.
    pub fn build_all(&self, sightings: &[Sighting]) -> (Vec<MapLayer>, usize) {
        let mut rejected = 0;
        let layers = sightings
            .iter()
            .enumerate()
            .filter_map(|(index, sighting)| match self.build(sighting) {
                Ok(layer) => Some(layer),
                Err(reason) => {
                    rejected += 1;
                    warn!(
                        index,
                        species = sighting.species.as_deref().unwrap_or("unknown"),
                        reason = %reason,
                        "Skipping unplaceable sighting"
                    );
                    None
                }
            })
            .collect();
        (layers, rejected)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interaction::MarkerEvent;
    use crate::models::Location;
    use crate::surface::RecordingSurface;

    fn at(lat: Option<f64>, lng: Option<f64>) -> Sighting {
        Sighting {
            species: Some("Snowy Owl".into()),
            location: Some(Location {
                lat,
                lng,
                name: Some("Jones Beach".into()),
            }),
            ..Default::default()
        }
    }

    fn builder(mode: RenderMode) -> LayerBuilder {
        LayerBuilder::new(&MapConfig::default().with_mode(mode))
    }

    #[test]
    fn test_cluster_layer_has_heat_sample() {
        let layer = builder(RenderMode::cluster())
            .build(&at(Some(40.6), Some(-73.5)))
            .unwrap();

        assert_eq!(layer.position(), LatLng::new(40.6, -73.5));
        assert!(layer.clustered);
        assert_eq!(
            layer.heat,
            Some(HeatSample {
                lat: 40.6,
                lng: -73.5,
                weight: 0.5
            })
        );
        assert_eq!(layer.interaction, InteractionMode::Click);
        assert!(layer.popup.html.contains("bird-popup"));
        assert_eq!(layer.marker.icon.class_name, "bird-marker");
    }

    #[test]
    fn test_direct_layer_uses_hover_card() {
        let layer = builder(RenderMode::direct())
            .build(&at(Some(40.6), Some(-73.5)))
            .unwrap();

        assert!(!layer.clustered);
        assert_eq!(layer.heat, None);
        assert_eq!(layer.interaction, InteractionMode::Hover);
        assert!(layer.popup.html.contains("bird-hover"));
    }

    #[test]
    fn test_rejects_missing_and_invalid_coordinates() {
        let b = builder(RenderMode::cluster());

        assert_eq!(
            b.build(&Sighting::default()).unwrap_err(),
            Rejection::MissingLocation
        );
        for (lat, lng) in [
            (None, Some(-73.5)),
            (Some(40.6), None),
            (Some(f64::NAN), Some(0.0)),
            (Some(0.0), Some(f64::NEG_INFINITY)),
            (Some(91.0), Some(0.0)),
            (Some(0.0), Some(181.0)),
        ] {
            assert!(matches!(
                b.build(&at(lat, lng)),
                Err(Rejection::InvalidCoordinates { .. })
            ));
        }
    }

    #[test]
    fn test_build_all_keeps_order_and_counts_rejections() {
        let sightings = vec![
            at(Some(1.0), Some(1.0)),
            at(None, None),
            at(Some(2.0), Some(2.0)),
        ];
        let (layers, rejected) = builder(RenderMode::cluster()).build_all(&sightings);

        assert_eq!(rejected, 1);
        let positions: Vec<_> = layers.iter().map(MapLayer::position).collect();
        assert_eq!(positions, vec![LatLng::new(1.0, 1.0), LatLng::new(2.0, 2.0)]);
    }

    #[test]
    fn test_attach_wires_marker_popup_and_handler() {
        let layer = builder(RenderMode::cluster())
            .build(&at(Some(40.6), Some(-73.5)))
            .unwrap();
        let mut surface = RecordingSurface::new();
        let group = surface.add_cluster_group(&MapConfig::default().cluster);

        let id = layer.attach(&mut surface, Some(group));

        let recorded = surface.marker(id).unwrap();
        assert_eq!(recorded.group, Some(group));
        assert_eq!(recorded.popup.as_ref(), Some(&layer.popup));
        assert!(recorded.has_handler());
        assert_eq!(surface.dispatch(id, MarkerEvent::Click), Some(true));
        assert_eq!(surface.dispatch(id, MarkerEvent::Click), Some(false));
    }

    #[test]
    fn test_attach_direct_ignores_group() {
        let layer = builder(RenderMode::direct())
            .build(&at(Some(40.6), Some(-73.5)))
            .unwrap();
        let mut surface = RecordingSurface::new();
        let id = layer.attach(&mut surface, Some(GroupId(0)));

        assert_eq!(surface.marker(id).unwrap().group, None);
    }
}
