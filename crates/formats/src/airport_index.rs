use std::collections::HashMap;

use crate::airports::AirportRecord;
use crate::error::DatasetError;
use crate::flights::FlightRecord;

/// Label → 1-based position in the airport list.
///
/// Built once at startup and never mutated, so every label resolves to the same index for the
/// lifetime of the process. Labels are unique, so positions cover `1..=len` without gaps.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AirportIndex {
    positions: HashMap<String, usize>,
    len: usize,
}

impl AirportIndex {
    pub fn build(airports: &[AirportRecord]) -> Result<Self, DatasetError> {
        let mut positions = HashMap::with_capacity(airports.len());
        for (i, airport) in airports.iter().enumerate() {
            if let Some(first) = positions.insert(airport.label.clone(), i + 1) {
                return Err(DatasetError::invalid(
                    "airports",
                    i,
                    format!("duplicate label `{}` (first at index {})", airport.label, first - 1),
                ));
            }
        }
        Ok(Self {
            positions,
            len: airports.len(),
        })
    }

    pub fn get(&self, label: &str) -> Option<usize> {
        self.positions.get(label).copied()
    }

    /// Index used to color a flight: its origin, else its destination.
    pub fn for_flight(&self, flight: &FlightRecord) -> Option<usize> {
        self.get(&flight.origin).or_else(|| self.get(&flight.destination))
    }

    /// Number of airport records the index was built from.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

#[cfg(test)]
mod tests {
    use super::AirportIndex;
    use crate::airports::AirportRecord;
    use crate::error::DatasetError;
    use crate::flights::FlightRecord;
    use foundation::math::LatLon;
    use pretty_assertions::assert_eq;

    fn airport(label: &str) -> AirportRecord {
        AirportRecord {
            label: label.to_string(),
            location: LatLon::new(0.0, 0.0),
            size: 1.0,
            city: None,
            country: None,
        }
    }

    fn flight(from: &str, to: &str) -> FlightRecord {
        FlightRecord {
            origin: from.to_string(),
            destination: to.to_string(),
            start: LatLon::new(0.0, 0.0),
            end: LatLon::new(1.0, 1.0),
            arc_alt: 0.1,
            order: 0,
            status: false,
            flight_code: None,
            date: None,
        }
    }

    #[test]
    fn indices_are_one_based_without_gaps() {
        let airports: Vec<_> = ["LOS", "ABV", "DXB", "LHR"].into_iter().map(airport).collect();
        let index = AirportIndex::build(&airports).expect("unique labels");
        let mut seen: Vec<usize> = airports
            .iter()
            .filter_map(|a| index.get(&a.label))
            .collect();
        seen.sort_unstable();
        assert_eq!(seen, (1..=airports.len()).collect::<Vec<_>>());
        assert_eq!(index.len(), 4);
    }

    #[test]
    fn flights_resolve_by_origin_then_destination() {
        let index = AirportIndex::build(&[airport("LOS"), airport("ABV")]).expect("unique labels");
        assert_eq!(index.for_flight(&flight("ABV", "LOS")), Some(2));
        assert_eq!(index.for_flight(&flight("XXX", "LOS")), Some(1));
        assert_eq!(index.for_flight(&flight("XXX", "YYY")), None);
    }

    #[test]
    fn lookups_are_stable() {
        let index = AirportIndex::build(&[airport("LOS"), airport("ABV")]).expect("unique labels");
        let first = index.get("LOS");
        for _ in 0..3 {
            assert_eq!(index.get("LOS"), first);
        }
        assert_eq!(first, Some(1));
    }

    #[test]
    fn duplicate_labels_are_rejected() {
        let err = AirportIndex::build(&[airport("LOS"), airport("ABV"), airport("LOS")])
            .expect_err("duplicate label");
        match err {
            DatasetError::InvalidRecord { dataset, index, reason } => {
                assert_eq!(dataset, "airports");
                assert_eq!(index, 2);
                assert!(reason.contains("LOS"), "{reason}");
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
