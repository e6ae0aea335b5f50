//! Sighting records as read from the collected dataset.
//!
//! The dataset is produced by an external scraper, so every field is
//! optional and decoded leniently: a value of the wrong JSON type is treated
//! as absent instead of failing the whole document.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// One rare-bird observation.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Sighting {
    #[serde(default, deserialize_with = "lenient_text")]
    pub species: Option<String>,

    #[serde(default, deserialize_with = "lenient_text")]
    pub scientific_name: Option<String>,

    #[serde(default, deserialize_with = "lenient_object")]
    pub location: Option<Location>,

    #[serde(default, rename = "date", deserialize_with = "lenient_text")]
    pub observed_at: Option<String>,

    #[serde(default, rename = "observer", deserialize_with = "lenient_text")]
    pub observer_name: Option<String>,

    #[serde(default, deserialize_with = "lenient_count")]
    pub count: Option<u64>,

    #[serde(default, rename = "wikipedia", deserialize_with = "lenient_object")]
    pub media_summary: Option<MediaSummary>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Location {
    #[serde(default, deserialize_with = "lenient_number")]
    pub lat: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub lng: Option<f64>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub name: Option<String>,
}

/// Wikipedia enrichment attached by the scraper.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct MediaSummary {
    #[serde(default, deserialize_with = "lenient_text")]
    pub image_url: Option<String>,
    #[serde(default, rename = "summary", deserialize_with = "lenient_text")]
    pub description: Option<String>,
}

/// The whole document, in source order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dataset {
    pub sightings: Vec<Sighting>,
    pub last_updated: Option<String>,
}

impl Sighting {
    pub fn image_url(&self) -> Option<&str> {
        self.media_summary
            .as_ref()
            .and_then(|m| m.image_url.as_deref())
    }

    pub fn description(&self) -> Option<&str> {
        self.media_summary
            .as_ref()
            .and_then(|m| m.description.as_deref())
    }

    pub fn location_name(&self) -> Option<&str> {
        self.location.as_ref().and_then(|l| l.name.as_deref())
    }
}

/// Strings (non-blank) and numbers are kept as text, anything else is absent.
pub(crate) fn lenient_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) if !s.trim().is_empty() => Some(s),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    })
}

/// Only JSON numbers count as coordinates; numeric strings are not coerced.
/// Numbers beyond the `f64` range become infinite and are rejected later.
fn lenient_number<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Number(n) => n.as_f64().or_else(|| n.to_string().parse().ok()),
        _ => None,
    })
}

fn lenient_count<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    })
}

fn lenient_object<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    Ok(match Value::deserialize(deserializer)? {
        value @ Value::Object(_) => serde_json::from_value(value).ok(),
        _ => None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_external_field_names_are_mapped() {
        let sighting: Sighting = serde_json::from_value(json!({
            "species": "Piping Plover",
            "scientific_name": "Charadrius melodus",
            "location": {"lat": 40.7, "lng": -74.0, "name": "Jamaica Bay"},
            "date": "2024-05-01T10:00:00Z",
            "observer": "J. Doe",
            "count": 2,
            "wikipedia": {"image_url": "img.jpg", "summary": "A small plover."}
        }))
        .unwrap();

        assert_eq!(sighting.scientific_name.as_deref(), Some("Charadrius melodus"));
        assert_eq!(sighting.observed_at.as_deref(), Some("2024-05-01T10:00:00Z"));
        assert_eq!(sighting.observer_name.as_deref(), Some("J. Doe"));
        assert_eq!(sighting.count, Some(2));
        assert_eq!(sighting.image_url(), Some("img.jpg"));
        assert_eq!(sighting.description(), Some("A small plover."));
        assert_eq!(sighting.location_name(), Some("Jamaica Bay"));
    }

    #[test]
    fn test_wrong_types_degrade_to_absent() {
        let sighting: Sighting = serde_json::from_value(json!({
            "species": "",
            "location": {"lat": "40.7", "lng": null},
            "count": "X",
            "wikipedia": "not an object"
        }))
        .unwrap();

        assert_eq!(sighting.species, None);
        let location = sighting.location.unwrap();
        assert_eq!(location.lat, None);
        assert_eq!(location.lng, None);
        assert_eq!(sighting.count, None);
        assert_eq!(sighting.media_summary, None);
    }

    #[test]
    fn test_out_of_range_coordinate_is_infinite() {
        let sighting: Sighting =
            serde_json::from_str(r#"{"location": {"lat": 1e400, "lng": -74.0}}"#).unwrap();
        let location = sighting.location.unwrap();

        assert_eq!(location.lat, Some(f64::INFINITY));
        assert_eq!(location.lng, Some(-74.0));
    }

    #[test]
    fn test_location_must_be_an_object() {
        let sighting: Sighting =
            serde_json::from_value(json!({"location": [40.7, -74.0]})).unwrap();
        assert_eq!(sighting.location, None);
    }
}
