use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::config::{Layout, MapConfig, PopupStyle};
use crate::models::Dataset;
use crate::state::PipelineState;

/// Summary of one pipeline run, one CSV row per run.
#[derive(Debug, Serialize)]
pub struct RunStats {
    pub timestamp: DateTime<Utc>,
    pub dataset: String,
    pub layout: Layout,
    pub popup_style: PopupStyle,

    // records
    pub total_records: usize,
    pub placed: usize,
    pub rejected: usize,

    // enrichment coverage
    pub with_image: usize,
    pub with_description: usize,
    pub with_count: usize,
    pub with_date: usize,
    pub last_updated: Option<String>,

    // outcome
    pub state: String,
    pub error_message: Option<String>,
}

impl RunStats {
    pub fn new(config: &MapConfig) -> Self {
        RunStats {
            timestamp: Utc::now(),
            dataset: config.dataset.clone(),
            layout: config.mode.layout,
            popup_style: config.mode.popup_style,
            total_records: 0,
            placed: 0,
            rejected: 0,
            with_image: 0,
            with_description: 0,
            with_count: 0,
            with_date: 0,
            last_updated: None,
            state: PipelineState::Loading.label().to_string(),
            error_message: None,
        }
    }

    pub fn record_dataset(&mut self, dataset: &Dataset) {
        self.total_records = dataset.sightings.len();
        self.last_updated = dataset.last_updated.clone();

        for s in &dataset.sightings {
            if s.image_url().is_some() {
                self.with_image += 1;
            }

            if s.description().is_some() {
                self.with_description += 1;
            }

            if s.count.is_some_and(|c| c > 0) {
                self.with_count += 1;
            }

            if s.observed_at.is_some() {
                self.with_date += 1;
            }
        }
    }

    pub fn record_layers(&mut self, placed: usize, rejected: usize) {
        self.placed = placed;
        self.rejected = rejected;
    }

    pub fn finish(&mut self, state: &PipelineState) {
        self.state = state.label().to_string();
        self.error_message = match state {
            PipelineState::Error(message) => Some(message.clone()),
            _ => None,
        };
    }

    pub fn pct(part: usize, total: usize) -> f64 {
        if total == 0 {
            0.0
        } else {
            (part as f64 / total as f64) * 100.0
        }
    }

    pub fn image_pct(&self) -> f64 {
        Self::pct(self.with_image, self.total_records)
    }

    pub fn placed_pct(&self) -> f64 {
        Self::pct(self.placed, self.total_records)
    }
}
