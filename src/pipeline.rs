//! Orchestrates one load of the sightings map.
//!
//! A run retrieves the dataset, builds a layer per placeable sighting and
//! commits them to the surface in one batch. Whatever happens, the run leaves
//! the loading state exactly once.

use tracing::{debug, error, info, warn};

use crate::config::{Layout, MapConfig};
use crate::dates::format_footer;
use crate::error::Result;
use crate::fetch::Retriever;
use crate::layers::{LayerBuilder, MapLayer};
use crate::page::Page;
use crate::parser::parse_dataset;
use crate::state::{LoadingStateController, PipelineState};
use crate::stats::RunStats;
use crate::surface::{HeatSample, MapSurface};

/// Result of the fallible middle of a run.
enum Loaded {
    Empty,
    Committed,
}

/// Owns the map surface and page for a session. Construct once, then call
/// [`SightingPipeline::run`]; each run replaces all layers from the previous one.
pub struct SightingPipeline<R, S, P> {
    config: MapConfig,
    retriever: R,
    surface: S,
    page: P,
    builder: LayerBuilder,
    state: LoadingStateController,
    layers: Vec<MapLayer>,
    stats: RunStats,
}

impl<R, S, P> SightingPipeline<R, S, P>
where
    R: Retriever,
    S: MapSurface,
    P: Page,
{
    /// Sets the initial view and base tiles.
    pub fn new(config: MapConfig, retriever: R, mut surface: S, page: P) -> Self {
        surface.set_view(config.center, config.zoom);
        surface.add_tile_layer(&config.tiles);

        Self {
            builder: LayerBuilder::new(&config),
            stats: RunStats::new(&config),
            config,
            retriever,
            surface,
            page,
            state: LoadingStateController::new(),
            layers: Vec::new(),
        }
    }

    #[tracing::instrument(
        skip(self),
        fields(dataset = %self.config.dataset, layout = ?self.config.mode.layout)
    )]
    pub async fn run(&mut self) -> &PipelineState {
        self.stats = RunStats::new(&self.config);
        self.state.enter_loading(&mut self.page);

        match self.load().await {
            Ok(Loaded::Empty) => self.state.finish_empty(&mut self.page),
            Ok(Loaded::Committed) => self.state.finish_ready(&mut self.page),
            Err(e) => {
                error!(error = %e, "Error loading bird data");
                self.state.fail(&mut self.page, &e.to_string());
            }
        }

        self.stats.finish(self.state.state());
        self.state.state()
    }

    async fn load(&mut self) -> Result<Loaded> {
        let bytes = self.retriever.retrieve(&self.config.dataset).await?;
        let dataset = parse_dataset(&bytes)?;

        info!(count = dataset.sightings.len(), "Loaded bird sightings");
        self.stats.record_dataset(&dataset);

        if dataset.sightings.is_empty() {
            return Ok(Loaded::Empty);
        }

        let (layers, rejected) = self.builder.build_all(&dataset.sightings);
        self.stats.record_layers(layers.len(), rejected);
        self.layers = layers;

        self.commit();
        self.update_footer(dataset.last_updated.as_deref());

        Ok(Loaded::Committed)
    }

    /// Replaces everything on the surface with the current layers.
    fn commit(&mut self) {
        self.surface.clear_overlays();

        let group = match self.config.mode.layout {
            Layout::Cluster => Some(self.surface.add_cluster_group(&self.config.cluster)),
            Layout::Direct => None,
        };

        for layer in &self.layers {
            layer.attach(&mut self.surface, group);
        }

        let heat: Vec<HeatSample> = self.layers.iter().filter_map(|l| l.heat).collect();
        if !heat.is_empty() {
            self.surface.add_heat_layer(&heat, &self.config.heat);
        }

        debug!(markers = self.layers.len(), heat_samples = heat.len(), "Layers committed");
    }

    fn update_footer(&mut self, last_updated: Option<&str>) {
        match format_footer(last_updated) {
            Some(formatted) => self.page.set_footer(self.config.footer(&formatted)),
            None if last_updated.is_some() => {
                warn!(value = ?last_updated, "Unparsable last_updated, footer left unchanged");
            }
            None => {}
        }
    }

    pub fn state(&self) -> &PipelineState {
        self.state.state()
    }

    pub fn layers(&self) -> &[MapLayer] {
        &self.layers
    }

    pub fn stats(&self) -> &RunStats {
        &self.stats
    }

    pub fn config(&self) -> &MapConfig {
        &self.config
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    pub fn page(&self) -> &P {
        &self.page
    }

    pub fn into_parts(self) -> (S, P, RunStats) {
        (self.surface, self.page, self.stats)
    }
}
