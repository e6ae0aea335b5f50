//! Popup markup for a single sighting.
//!
//! Both card variants are pure string builders. Every text field coming from
//! the dataset is escaped before it is embedded.

use crate::config::PopupStyle;
use crate::dates::format_card;
use crate::models::Sighting;

pub const PLACEHOLDER_IMAGE: &str = "assets/images/placeholder-bird.svg";
pub const NO_DESCRIPTION: &str = "No description available.";

const UNKNOWN_SPECIES: &str = "Unknown species";
const UNKNOWN_SCIENTIFIC_NAME: &str = "Scientific name unavailable";
const UNKNOWN_LOCATION: &str = "Unknown location";
const UNKNOWN_OBSERVER: &str = "Unknown observer";

/// Escapes the five HTML-significant characters.
pub fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Map-search deep link for a coordinate pair. No range checking.
pub fn map_search_url(lat: f64, lng: f64) -> String {
    format!("https://www.google.com/maps/search/?api=1&query={lat},{lng}")
}

pub fn render(style: PopupStyle, sighting: &Sighting) -> String {
    match style {
        PopupStyle::Detailed => render_detailed(sighting),
        PopupStyle::Hover => render_hover(sighting),
    }
}

/// Full card shown on click: image, names, description and metadata rows.
pub fn render_detailed(sighting: &Sighting) -> String {
    let fields = CardFields::from(sighting);

    format!(
        r#"<div class="bird-popup">
    {image}
    <div class="bird-popup-content">
        <h3>{species}</h3>
        <div class="scientific-name">{scientific_name}</div>
        <p>{description}</p>
        <div class="metadata">
            <div><strong>Location:</strong> {location}</div>
            <div><strong>Date:</strong> {date}</div>
            <div><strong>Observer:</strong> {observer}</div>
            {count}
        </div>
    </div>
</div>"#,
        image = fields.image_tag(),
        species = fields.species,
        scientific_name = fields.scientific_name,
        description = fields.description,
        location = fields.location,
        date = fields.date,
        observer = fields.observer,
        count = fields.count_row(),
    )
}

/// Compact card shown on hover, with an outbound map-search link.
pub fn render_hover(sighting: &Sighting) -> String {
    let fields = CardFields::from(sighting);

    let link = sighting
        .location
        .as_ref()
        .and_then(|l| Some(map_search_url(l.lat?, l.lng?)))
        .map(|url| {
            format!(
                r#"<a class="map-link" href="{}" target="_blank" rel="noopener noreferrer">Open in maps</a>"#,
                escape_html(&url)
            )
        })
        .unwrap_or_default();

    format!(
        r#"<div class="bird-hover">
    {image}
    <div class="bird-hover-content">
        <h4>{species}</h4>
        <div class="scientific-name">{scientific_name}</div>
        <div class="metadata">
            <div>{location}</div>
            <div>{date}</div>
            <div>{observer}</div>
            {count}
        </div>
        <p>{description}</p>
        {link}
    </div>
</div>"#,
        image = fields.image_tag(),
        species = fields.species,
        scientific_name = fields.scientific_name,
        location = fields.location,
        date = fields.date,
        observer = fields.observer,
        count = fields.count_row(),
        description = fields.description,
        link = link,
    )
}

/// Escaped, placeholder-filled values shared by both card variants.
struct CardFields {
    species: String,
    scientific_name: String,
    description: String,
    location: String,
    date: String,
    observer: String,
    image_src: String,
    count: Option<u64>,
}

impl From<&Sighting> for CardFields {
    fn from(s: &Sighting) -> Self {
        let text = |value: Option<&str>, fallback: &str| escape_html(value.unwrap_or(fallback));

        Self {
            species: text(s.species.as_deref(), UNKNOWN_SPECIES),
            scientific_name: text(s.scientific_name.as_deref(), UNKNOWN_SCIENTIFIC_NAME),
            description: text(s.description(), NO_DESCRIPTION),
            location: text(s.location_name(), UNKNOWN_LOCATION),
            date: escape_html(&format_card(s.observed_at.as_deref())),
            observer: text(s.observer_name.as_deref(), UNKNOWN_OBSERVER),
            image_src: escape_html(s.image_url().unwrap_or(PLACEHOLDER_IMAGE)),
            count: s.count.filter(|c| *c > 0),
        }
    }
}

impl CardFields {
    /// The `onerror` handler swaps in the placeholder when the remote image
    /// fails to load, and clears itself so a missing placeholder cannot loop.
    fn image_tag(&self) -> String {
        format!(
            r#"<img src="{src}" alt="{alt}" onerror="this.onerror=null;this.src='{placeholder}'">"#,
            src = self.image_src,
            alt = self.species,
            placeholder = PLACEHOLDER_IMAGE,
        )
    }

    fn count_row(&self) -> String {
        self.count
            .map(|c| format!("<div><strong>Count:</strong> {c}</div>"))
            .unwrap_or_default()
    }
}
