//! Map deployment settings.
//!
//! Defaults reproduce the NYC rare-bird deployment. A few values can be
//! overridden from the environment (after `.env` is loaded) and again from
//! CLI flags.

use clap::ValueEnum;
use serde::Serialize;
use tracing::warn;

use crate::surface::{ClusterOptions, HeatOptions, LatLng, MarkerIcon, TileLayer};

/// How accepted markers are placed on the map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Layout {
    /// Markers join a shared cluster group and feed the heat layer.
    Cluster,
    /// Markers are added straight to the map; no heat layer.
    Direct,
}

/// Which card a marker's popup shows, and how it opens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum PopupStyle {
    /// Full card, opened and closed by click.
    Detailed,
    /// Compact card, opened while hovered and pinned by click.
    Hover,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RenderMode {
    pub layout: Layout,
    pub popup_style: PopupStyle,
}

impl RenderMode {
    pub fn cluster() -> Self {
        Self {
            layout: Layout::Cluster,
            popup_style: PopupStyle::Detailed,
        }
    }

    pub fn direct() -> Self {
        Self {
            layout: Layout::Direct,
            popup_style: PopupStyle::Hover,
        }
    }
}

impl Default for RenderMode {
    fn default() -> Self {
        Self::cluster()
    }
}

#[derive(Debug, Clone)]
pub struct MapConfig {
    pub title: String,
    pub dataset: String,
    pub center: LatLng,
    pub zoom: u8,
    pub tiles: TileLayer,
    pub mode: RenderMode,
    pub icon: MarkerIcon,
    pub popup_max_width: u32,
    pub popup_class: String,
    pub cluster: ClusterOptions,
    pub heat: HeatOptions,
    pub heat_weight: f64,
    /// Footer attribution; `{updated}` is replaced with the formatted timestamp.
    pub footer_template: String,
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            title: "NYC Rare Bird Sightings".to_string(),
            dataset: "data/birds.json".to_string(),
            center: LatLng::new(40.7128, -74.0060),
            zoom: 11,
            tiles: TileLayer {
                url_template: "https://{s}.tile.openstreetmap.org/{z}/{x}/{y}.png".to_string(),
                attribution: "&copy; <a href=\"https://www.openstreetmap.org/copyright\">OpenStreetMap</a> contributors".to_string(),
                max_zoom: 19,
            },
            mode: RenderMode::default(),
            icon: MarkerIcon {
                class_name: "bird-marker".to_string(),
                size: (20, 20),
                anchor: (10, 10),
                popup_anchor: (0, -10),
            },
            popup_max_width: 300,
            popup_class: "bird-popup-wrapper".to_string(),
            cluster: ClusterOptions {
                show_coverage_on_hover: false,
                max_cluster_radius: 50,
            },
            heat: HeatOptions {
                radius: 25,
                blur: 35,
                max_zoom: 13,
                max: 1.0,
                gradient: vec![
                    (0.0, "#3498db".to_string()),
                    (0.5, "#f39c12".to_string()),
                    (1.0, "#e74c3c".to_string()),
                ],
            },
            heat_weight: 0.5,
            footer_template: "Data from <a href=\"https://ebird.org\" target=\"_blank\">eBird</a> | Last updated: {updated}".to_string(),
        }
    }
}

impl MapConfig {
    /// Defaults with `BIRD_MAP_*` environment overrides applied.
    ///
    /// Malformed values are logged and ignored.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(dataset) = std::env::var("BIRD_MAP_DATA") {
            config.dataset = dataset;
        }

        if let Ok(url) = std::env::var("BIRD_MAP_TILE_URL") {
            config.tiles.url_template = url;
        }

        if let Ok(raw) = std::env::var("BIRD_MAP_CENTER") {
            match parse_center(&raw) {
                Some(center) => config.center = center,
                None => warn!(value = %raw, "Ignoring malformed BIRD_MAP_CENTER"),
            }
        }

        if let Ok(raw) = std::env::var("BIRD_MAP_ZOOM") {
            match raw.trim().parse::<u8>() {
                Ok(zoom) if zoom <= config.tiles.max_zoom => config.zoom = zoom,
                _ => warn!(value = %raw, "Ignoring malformed BIRD_MAP_ZOOM"),
            }
        }

        config
    }

    pub fn with_mode(mut self, mode: RenderMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn footer(&self, updated: &str) -> String {
        self.footer_template.replace("{updated}", updated)
    }
}

/// Parses `lat,lng`.
pub fn parse_center(raw: &str) -> Option<LatLng> {
    let (lat, lng) = raw.split_once(',')?;
    let center = LatLng::new(lat.trim().parse().ok()?, lng.trim().parse().ok()?);
    center.is_valid().then_some(center)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_mode_presets() {
        assert_eq!(RenderMode::cluster().layout, Layout::Cluster);
        assert_eq!(RenderMode::cluster().popup_style, PopupStyle::Detailed);
        assert_eq!(RenderMode::direct().layout, Layout::Direct);
        assert_eq!(RenderMode::direct().popup_style, PopupStyle::Hover);
    }

    #[test]
    fn test_parse_center() {
        assert_eq!(parse_center("40.7, -74.0"), Some(LatLng::new(40.7, -74.0)));
        assert_eq!(parse_center("40.7"), None);
        assert_eq!(parse_center("north,south"), None);
        assert_eq!(parse_center("95.0,0.0"), None);
    }

    #[test]
    fn test_footer_template() {
        let config = MapConfig::default();
        let footer = config.footer("May 1, 2024, 10:00 AM UTC");
        assert!(footer.starts_with("Data from <a href=\"https://ebird.org\""));
        assert!(footer.ends_with("Last updated: May 1, 2024, 10:00 AM UTC"));
    }
}
