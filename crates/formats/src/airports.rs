use foundation::math::LatLon;
use serde::Deserialize;
use serde_json::Value;

use crate::error::{DatasetError, record_array};

const DATASET: &str = "airports";

/// One airport marker. One point (and optionally one ring emitter) per record.
#[derive(Debug, Clone, PartialEq)]
pub struct AirportRecord {
    pub label: String,
    pub location: LatLon,
    /// Display size multiplier.
    pub size: f64,
    pub city: Option<String>,
    pub country: Option<String>,
}

fn default_size() -> f64 {
    1.0
}

#[derive(Deserialize)]
struct RawAirport {
    #[serde(alias = "text")]
    label: String,
    lat: f64,
    #[serde(alias = "lon")]
    lng: f64,
    #[serde(default = "default_size")]
    size: f64,
    #[serde(default)]
    city: Option<String>,
    #[serde(default)]
    country: Option<String>,
}

/// Parse airports from either a bare array or `{ "airports": [...] }`.
pub fn parse_airports(payload: &str) -> Result<Vec<AirportRecord>, DatasetError> {
    let root: Value = serde_json::from_str(payload).map_err(|source| DatasetError::Json {
        dataset: DATASET,
        source,
    })?;
    let records = record_array(DATASET, &root, "airports", "an array of airports")?;

    let mut out = Vec::with_capacity(records.len());
    for (index, record) in records.iter().enumerate() {
        let raw = RawAirport::deserialize(record)
            .map_err(|e| DatasetError::invalid(DATASET, index, e.to_string()))?;
        let label = raw.label.trim().to_string();
        if label.is_empty() {
            return Err(DatasetError::invalid(DATASET, index, "label must be non-empty"));
        }
        let location = LatLon::new(raw.lat, raw.lng);
        if !location.is_valid() {
            return Err(DatasetError::invalid(
                DATASET,
                index,
                format!("coordinate out of range: {location:?}"),
            ));
        }
        if !raw.size.is_finite() || raw.size < 0.0 {
            return Err(DatasetError::invalid(
                DATASET,
                index,
                format!("size must be a non-negative number, got {}", raw.size),
            ));
        }
        out.push(AirportRecord {
            label,
            location,
            size: raw.size,
            city: raw.city,
            country: raw.country,
        });
    }
    tracing::debug!(count = out.len(), "airports parsed");
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::parse_airports;
    use crate::error::DatasetError;

    #[test]
    fn parses_text_alias_and_default_size() {
        let airports = parse_airports(
            r#"{"airports":[{"text":"LOS","city":"Lagos","lat":6.5774,"lng":3.3212}]}"#,
        )
        .expect("parse");
        assert_eq!(airports[0].label, "LOS");
        assert_eq!(airports[0].size, 1.0);
        assert_eq!(airports[0].city.as_deref(), Some("Lagos"));
    }

    #[test]
    fn rejects_missing_label_and_bad_coordinates() {
        let missing = parse_airports(r#"[{"lat":1.0,"lng":2.0}]"#).unwrap_err();
        assert!(matches!(missing, DatasetError::InvalidRecord { index: 0, .. }));

        let blank = parse_airports(r#"[{"label":"  ","lat":1.0,"lng":2.0}]"#).unwrap_err();
        assert!(blank.to_string().contains("non-empty"));

        let off_globe =
            parse_airports(r#"[{"label":"A","lat":1.0,"lng":2.0},{"label":"B","lat":95.0,"lng":2.0}]"#)
                .unwrap_err();
        assert!(matches!(off_globe, DatasetError::InvalidRecord { index: 1, .. }));
    }
}
