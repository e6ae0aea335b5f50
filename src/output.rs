//! Output of a finished run: the standalone map page and run statistics.
//!
//! Supports pretty-printing, JSON serialization, and CSV append for
//! [`RunStats`], and renders [`LeafletMap`] + [`HtmlPage`] into one HTML file.

use anyhow::Result;
use tracing::{debug, info};

use crate::config::MapConfig;
use crate::leaflet::LeafletMap;
use crate::page::HtmlPage;
use crate::popup::escape_html;
use crate::stats::RunStats;
use csv::WriterBuilder;
use std::fs::OpenOptions;
use std::path::Path;

const DEFAULT_FOOTER: &str = "Data from <a href=\"https://ebird.org\" target=\"_blank\">eBird</a>";

const LEAFLET_ASSETS: &str = r#"<link rel="stylesheet" href="https://unpkg.com/leaflet@1.9.4/dist/leaflet.css" />
    <link rel="stylesheet" href="https://unpkg.com/leaflet.markercluster@1.5.3/dist/MarkerCluster.css" />
    <link rel="stylesheet" href="https://unpkg.com/leaflet.markercluster@1.5.3/dist/MarkerCluster.Default.css" />
    <script src="https://unpkg.com/leaflet@1.9.4/dist/leaflet.js"></script>
    <script src="https://unpkg.com/leaflet.markercluster@1.5.3/dist/leaflet.markercluster.js"></script>
    <script src="https://unpkg.com/leaflet.heat@0.2.0/dist/leaflet-heat.js"></script>"#;

const PAGE_CSS: &str = r#"
html, body { height: 100%; margin: 0; font-family: system-ui, -apple-system, 'Segoe UI', sans-serif; }
body { display: flex; flex-direction: column; }
#map { flex: 1; }
footer { padding: 0.5rem 1rem; font-size: 0.8rem; color: #555; background: #f7f7f7; }
.bird-marker { background: #e74c3c; border: 2px solid #fff; border-radius: 50%; box-shadow: 0 0 4px rgba(0,0,0,0.4); }
.loading { position: fixed; top: 50%; left: 50%; transform: translate(-50%, -50%); z-index: 1000;
           background: #fff; padding: 1.5rem 2rem; border-radius: 8px; box-shadow: 0 2px 12px rgba(0,0,0,0.25); text-align: center; }
.loading-spinner { width: 32px; height: 32px; margin: 0 auto 0.5rem; border: 4px solid #ddd; border-top-color: #3498db;
                   border-radius: 50%; animation: spin 1s linear infinite; }
@keyframes spin { to { transform: rotate(360deg); } }
.bird-popup img, .bird-hover img { width: 100%; max-height: 160px; object-fit: cover; border-radius: 4px; }
.scientific-name { font-style: italic; color: #666; }
.metadata { font-size: 0.85rem; }
"#;

/// Renders the final page: map mount point, scene script, any nodes left on
/// the page (error panel), the footer, and queued notices as alerts.
pub fn render_document(config: &MapConfig, map: &LeafletMap, page: &HtmlPage) -> Result<String> {
    let nodes: String = page
        .nodes()
        .iter()
        .map(|n| {
            format!(
                "<div id=\"{}\" class=\"{}\">{}</div>\n",
                escape_html(&n.id),
                escape_html(&n.class_name),
                n.html
            )
        })
        .collect();

    let notices: String = page
        .notices()
        .iter()
        .map(|msg| -> Result<String> {
            let literal = serde_json::to_string(msg)?.replace("</", "<\\/");
            Ok(format!("window.addEventListener('load', () => alert({literal}));\n"))
        })
        .collect::<Result<_>>()?;

    Ok(format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>{title}</title>
    {assets}
    <style>{css}</style>
</head>
<body>
    <div id="map"></div>
    {nodes}
    <footer><p>{footer}</p></footer>
    <script>
{script}
{notices}
    </script>
</body>
</html>
"#,
        title = escape_html(&config.title),
        assets = LEAFLET_ASSETS,
        css = PAGE_CSS,
        nodes = nodes,
        footer = page.footer().unwrap_or(DEFAULT_FOOTER),
        script = map.render_script()?,
        notices = notices,
    ))
}

/// Writes the rendered document to `path`, creating parent directories.
pub fn write_document(path: &str, html: &str) -> Result<()> {
    if let Some(parent) = Path::new(path).parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, html)?;
    info!(path, bytes = html.len(), "Map page written");
    Ok(())
}

/// Logs run statistics using Rust's debug pretty-print format.
pub fn print_pretty(stats: &RunStats) {
    debug!("{:#?}", stats);
}

/// Prints run statistics as pretty JSON on stdout.
pub fn print_json(stats: &RunStats) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(stats)?);
    Ok(())
}

/// Appends a [`RunStats`] record as a row to a CSV file.
///
/// Creates the file with headers if it does not already exist.
pub fn append_record(path: &str, stats: &RunStats) -> Result<()> {
    let file_exists = Path::new(path).exists();
    debug!(path, file_exists, "Appending CSV record");

    let file = OpenOptions::new().append(true).create(true).open(path)?;

    let mut writer = WriterBuilder::new()
        .has_headers(!file_exists) // IMPORTANT when appending
        .from_writer(file);

    writer.serialize(stats)?;
    writer.flush()?;

    Ok(())
}
