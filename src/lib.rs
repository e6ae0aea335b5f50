pub mod config;
pub mod dates;
pub mod error;
pub mod fetch;
pub mod interaction;
pub mod layers;
pub mod leaflet;
pub mod models;
pub mod output;
pub mod page;
pub mod parser;
pub mod pipeline;
pub mod popup;
pub mod state;
pub mod stats;
pub mod surface;
