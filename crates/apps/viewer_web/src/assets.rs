//! Demo datasets compiled into the module.

use formats::{DatasetError, Datasets};

pub const COUNTRIES: &str = include_str!("../assets/countries.geojson");
pub const FLIGHTS: &str = include_str!("../assets/flights.json");
pub const AIRPORTS: &str = include_str!("../assets/airports.json");

pub fn bundled_datasets() -> Result<Datasets, DatasetError> {
    Datasets::from_json(COUNTRIES, FLIGHTS, AIRPORTS)
}

/// Host-supplied JSON replaces the matching bundled collection.
pub fn datasets_with_overrides(
    countries: Option<&str>,
    flights: Option<&str>,
    airports: Option<&str>,
) -> Result<Datasets, DatasetError> {
    Datasets::from_json(
        countries.unwrap_or(COUNTRIES),
        flights.unwrap_or(FLIGHTS),
        airports.unwrap_or(AIRPORTS),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bundled_datasets_parse() {
        let data = bundled_datasets().expect("bundled datasets");
        assert_eq!(data.airport_index.len(), data.airports.len());
        assert!(!data.countries.is_empty());
        assert!(!data.flights.is_empty());
    }

    #[test]
    fn override_replaces_one_collection() {
        let flights = r#"{ "flights": [] }"#;
        let data = datasets_with_overrides(None, Some(flights), None).expect("datasets");
        assert!(data.flights.is_empty());
        assert!(!data.airports.is_empty());
    }
}
