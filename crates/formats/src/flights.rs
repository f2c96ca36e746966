use foundation::math::LatLon;
use serde::Deserialize;
use serde_json::Value;

use crate::error::{DatasetError, record_array};

const DATASET: &str = "flights";

/// One flown leg. One arc is drawn per record.
#[derive(Debug, Clone, PartialEq)]
pub struct FlightRecord {
    pub origin: String,
    pub destination: String,
    pub start: LatLon,
    pub end: LatLon,
    /// Arc height as a fraction of the globe radius, in `[0, 1]`.
    pub arc_alt: f64,
    /// Stagger position of the arc's dash pulse.
    pub order: u32,
    /// Drawn with the thicker stroke when set.
    pub status: bool,
    pub flight_code: Option<String>,
    pub date: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawFlight {
    #[serde(alias = "origin")]
    from: String,
    #[serde(alias = "destination")]
    to: String,
    start_lat: f64,
    start_lng: f64,
    end_lat: f64,
    end_lng: f64,
    arc_alt: f64,
    order: u32,
    #[serde(default)]
    status: bool,
    #[serde(default)]
    flight_code: Option<String>,
    #[serde(default)]
    date: Option<String>,
}

impl TryFrom<RawFlight> for FlightRecord {
    type Error = String;

    fn try_from(raw: RawFlight) -> Result<Self, Self::Error> {
        if raw.from.trim().is_empty() || raw.to.trim().is_empty() {
            return Err("origin and destination labels must be non-empty".to_string());
        }
        let start = LatLon::new(raw.start_lat, raw.start_lng);
        let end = LatLon::new(raw.end_lat, raw.end_lng);
        if !start.is_valid() {
            return Err(format!("start coordinate out of range: {start:?}"));
        }
        if !end.is_valid() {
            return Err(format!("end coordinate out of range: {end:?}"));
        }
        if !(0.0..=1.0).contains(&raw.arc_alt) {
            return Err(format!("arcAlt {} outside [0, 1]", raw.arc_alt));
        }
        Ok(Self {
            origin: raw.from,
            destination: raw.to,
            start,
            end,
            arc_alt: raw.arc_alt,
            order: raw.order,
            status: raw.status,
            flight_code: raw.flight_code,
            date: raw.date,
        })
    }
}

/// Parse flights from either a bare array or `{ "flights": [...] }`.
pub fn parse_flights(payload: &str) -> Result<Vec<FlightRecord>, DatasetError> {
    let root: Value = serde_json::from_str(payload).map_err(|source| DatasetError::Json {
        dataset: DATASET,
        source,
    })?;
    let records = record_array(DATASET, &root, "flights", "an array of flights")?;

    let mut out = Vec::with_capacity(records.len());
    for (index, record) in records.iter().enumerate() {
        let raw = RawFlight::deserialize(record)
            .map_err(|e| DatasetError::invalid(DATASET, index, e.to_string()))?;
        let flight =
            FlightRecord::try_from(raw).map_err(|r| DatasetError::invalid(DATASET, index, r))?;
        out.push(flight);
    }
    tracing::debug!(count = out.len(), "flights parsed");
    Ok(out)
}
