//! JSON parser for the collected sightings document.

use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, warn};

use crate::error::Result;
use crate::models::{Dataset, Sighting, lenient_text};

#[derive(Deserialize)]
struct RawDataset {
    #[serde(default)]
    sightings: Option<Vec<Value>>,
    #[serde(default, deserialize_with = "lenient_text")]
    last_updated: Option<String>,
}

/// Decodes a sightings document from raw bytes.
///
/// A missing `sightings` key yields an empty dataset. Entries that are not
/// objects are kept as empty records so they are rejected, in order, by the
/// layer builder rather than disappearing here.
///
/// # Errors
///
/// Returns an error if the bytes are not a JSON object.
pub fn parse_dataset(bytes: &[u8]) -> Result<Dataset> {
    let raw: RawDataset = serde_json::from_slice(bytes)?;

    let sightings = raw
        .sightings
        .unwrap_or_default()
        .into_iter()
        .enumerate()
        .map(|(index, value)| {
            serde_json::from_value::<Sighting>(value).unwrap_or_else(|e| {
                warn!(index, error = %e, "Malformed sighting record");
                Sighting::default()
            })
        })
        .collect::<Vec<_>>();

    debug!(count = sightings.len(), "Dataset parsed");

    Ok(Dataset {
        sightings,
        last_updated: raw.last_updated,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_missing_sightings_is_empty() {
        let dataset = parse_dataset(br#"{"last_updated": "2024-05-01T10:00:00"}"#).unwrap();
        assert!(dataset.sightings.is_empty());
        assert_eq!(dataset.last_updated.as_deref(), Some("2024-05-01T10:00:00"));
    }

    #[test]
    fn test_parse_invalid_bytes() {
        assert!(parse_dataset(b"<html>404</html>").is_err());
        assert!(parse_dataset(b"[1, 2, 3]").is_err());
    }

    #[test]
    fn test_parse_tolerates_overflowing_coordinate() {
        let bytes = br#"{
            "sightings": [
                {"species": "Piping Plover", "location": {"lat": 40.7, "lng": -74.0}},
                {"species": "Snowy Owl", "location": {"lat": 1e400, "lng": -74.0}}
            ]
        }"#;
        let dataset = parse_dataset(bytes).unwrap();

        assert_eq!(dataset.sightings.len(), 2);
        assert_eq!(dataset.sightings[0].location.as_ref().unwrap().lat, Some(40.7));
        assert_eq!(dataset.sightings[1].species.as_deref(), Some("Snowy Owl"));
    }

    #[test]
    fn test_parse_preserves_order_and_keeps_junk_entries() {
        let bytes = br#"{
            "sightings": [
                {"species": "Snowy Owl"},
                42,
                {"species": "Piping Plover"}
            ]
        }"#;
        let dataset = parse_dataset(bytes).unwrap();

        assert_eq!(dataset.sightings.len(), 3);
        assert_eq!(dataset.sightings[0].species.as_deref(), Some("Snowy Owl"));
        assert_eq!(dataset.sightings[1], Sighting::default());
        assert_eq!(dataset.sightings[2].species.as_deref(), Some("Piping Plover"));
        assert_eq!(dataset.last_updated, None);
    }
}
