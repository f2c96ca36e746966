use crate::airport_index::AirportIndex;
use crate::airports::{AirportRecord, parse_airports};
use crate::countries::{CountryFeature, parse_countries};
use crate::error::DatasetError;
use crate::flights::{FlightRecord, parse_flights};

/// The three read-only collections, loaded wholesale once at startup.
#[derive(Debug, Clone)]
pub struct Datasets {
    pub countries: Vec<CountryFeature>,
    pub flights: Vec<FlightRecord>,
    pub airports: Vec<AirportRecord>,
    pub airport_index: AirportIndex,
}

impl Datasets {
    pub fn new(
        countries: Vec<CountryFeature>,
        flights: Vec<FlightRecord>,
        airports: Vec<AirportRecord>,
    ) -> Result<Self, DatasetError> {
        let airport_index = AirportIndex::build(&airports)?;
        Ok(Self {
            countries,
            flights,
            airports,
            airport_index,
        })
    }

    pub fn from_json(
        countries: &str,
        flights: &str,
        airports: &str,
    ) -> Result<Self, DatasetError> {
        let datasets = Self::new(
            parse_countries(countries)?,
            parse_flights(flights)?,
            parse_airports(airports)?,
        )?;
        tracing::info!(
            countries = datasets.countries.len(),
            flights = datasets.flights.len(),
            airports = datasets.airports.len(),
            "datasets loaded"
        );
        Ok(datasets)
    }
}

#[cfg(test)]
mod tests {
    use super::Datasets;

    #[test]
    fn loads_bundled_assets() {
        let datasets = Datasets::from_json(
            include_str!("../../apps/viewer_web/assets/countries.geojson"),
            include_str!("../../apps/viewer_web/assets/flights.json"),
            include_str!("../../apps/viewer_web/assets/airports.json"),
        )
        .expect("bundled datasets are valid");
        assert!(!datasets.flights.is_empty());
        assert_eq!(datasets.airport_index.len(), datasets.airports.len());
        for flight in &datasets.flights {
            assert!(datasets.airport_index.for_flight(flight).is_some());
        }
    }

    #[test]
    fn first_invalid_dataset_aborts_load() {
        let err = Datasets::from_json(
            include_str!("../../apps/viewer_web/assets/countries.geojson"),
            "[{\"from\": \"LOS\"}]",
            "[]",
        )
        .unwrap_err();
        assert!(err.to_string().starts_with("flights"));
    }
}
