use foundation::math::LatLon;
use serde_json::Value;

use crate::error::DatasetError;

const DATASET: &str = "countries";

/// One polygon: the outer ring followed by zero or more holes. Coordinates in degrees.
#[derive(Debug, Clone, PartialEq)]
pub struct Polygon {
    pub rings: Vec<Vec<LatLon>>,
}

/// `[min_lat, min_lon, max_lat, max_lon]` in degrees.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct LatLonBounds {
    pub min: LatLon,
    pub max: LatLon,
}

impl LatLonBounds {
    pub fn contains(&self, p: LatLon) -> bool {
        p.lat_deg >= self.min.lat_deg
            && p.lat_deg <= self.max.lat_deg
            && p.lon_deg >= self.min.lon_deg
            && p.lon_deg <= self.max.lon_deg
    }
}

impl Polygon {
    pub fn outer(&self) -> &[LatLon] {
        self.rings.first().map(Vec::as_slice).unwrap_or(&[])
    }

    /// Planar (lon/lat) containment with even-odd holes.
    pub fn contains(&self, p: LatLon) -> bool {
        let mut inside = false;
        for ring in &self.rings {
            if ring_contains(ring, p) {
                inside = !inside;
            }
        }
        inside
    }

    pub fn bounds(&self) -> Option<LatLonBounds> {
        bounds_of(self.outer().iter().copied())
    }
}

fn ring_contains(ring: &[LatLon], p: LatLon) -> bool {
    let n = ring.len();
    if n < 3 {
        return false;
    }
    let (x, y) = (p.lon_deg, p.lat_deg);
    let mut inside = false;
    let mut j = n - 1;
    for i in 0..n {
        let (xi, yi) = (ring[i].lon_deg, ring[i].lat_deg);
        let (xj, yj) = (ring[j].lon_deg, ring[j].lat_deg);
        if (yi > y) != (yj > y) && x < (xj - xi) * (y - yi) / (yj - yi) + xi {
            inside = !inside;
        }
        j = i;
    }
    inside
}

fn bounds_of(points: impl Iterator<Item = LatLon>) -> Option<LatLonBounds> {
    points.fold(None, |acc, p| {
        Some(match acc {
            None => LatLonBounds { min: p, max: p },
            Some(b) => LatLonBounds {
                min: LatLon::new(b.min.lat_deg.min(p.lat_deg), b.min.lon_deg.min(p.lon_deg)),
                max: LatLon::new(b.max.lat_deg.max(p.lat_deg), b.max.lon_deg.max(p.lon_deg)),
            },
        })
    })
}

/// A country boundary keyed by its ISO 3166-1 alpha-3 code.
#[derive(Debug, Clone, PartialEq)]
pub struct CountryFeature {
    pub iso_a3: String,
    pub name: Option<String>,
    pub polygons: Vec<Polygon>,
}

impl CountryFeature {
    pub fn contains(&self, p: LatLon) -> bool {
        self.polygons.iter().any(|poly| poly.contains(p))
    }

    pub fn bounds(&self) -> Option<LatLonBounds> {
        bounds_of(
            self.polygons
                .iter()
                .flat_map(|poly| poly.outer().iter().copied()),
        )
    }
}

/// Parse a GeoJSON `FeatureCollection` of country (multi)polygons.
///
/// Every feature must carry `properties.ISO_A3` and a `Polygon` or `MultiPolygon` geometry.
pub fn parse_countries(payload: &str) -> Result<Vec<CountryFeature>, DatasetError> {
    let value: Value = serde_json::from_str(payload).map_err(|source| DatasetError::Json {
        dataset: DATASET,
        source,
    })?;
    countries_from_value(&value)
}

pub fn countries_from_value(value: &Value) -> Result<Vec<CountryFeature>, DatasetError> {
    let missing = DatasetError::MissingCollection {
        dataset: DATASET,
        expected: "a GeoJSON FeatureCollection",
    };
    let obj = value.as_object().ok_or(missing)?;
    if obj.get("type").and_then(|v| v.as_str()) != Some("FeatureCollection") {
        return Err(DatasetError::MissingCollection {
            dataset: DATASET,
            expected: "a GeoJSON FeatureCollection",
        });
    }
    let features = obj
        .get("features")
        .and_then(|v| v.as_array())
        .ok_or(DatasetError::MissingCollection {
            dataset: DATASET,
            expected: "a `features` array",
        })?;

    let mut out = Vec::with_capacity(features.len());
    for (index, feat) in features.iter().enumerate() {
        let feature =
            parse_feature(feat).map_err(|reason| DatasetError::invalid(DATASET, index, reason))?;
        out.push(feature);
    }
    tracing::debug!(count = out.len(), "countries parsed");
    Ok(out)
}

fn parse_feature(value: &Value) -> Result<CountryFeature, String> {
    let obj = value
        .as_object()
        .ok_or("feature must be an object".to_string())?;
    let props = obj
        .get("properties")
        .and_then(|v| v.as_object())
        .ok_or("feature missing properties".to_string())?;
    let iso_a3 = props
        .get("ISO_A3")
        .and_then(|v| v.as_str())
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or("feature missing properties.ISO_A3".to_string())?
        .to_string();
    let name = props
        .get("ADMIN")
        .or_else(|| props.get("NAME"))
        .and_then(|v| v.as_str())
        .map(str::to_string);

    let geometry = obj
        .get("geometry")
        .and_then(|v| v.as_object())
        .ok_or("feature missing geometry".to_string())?;
    let ty = geometry
        .get("type")
        .and_then(|v| v.as_str())
        .ok_or("geometry missing type".to_string())?;
    let coords = geometry
        .get("coordinates")
        .ok_or("geometry missing coordinates".to_string())?;

    let polygons = match ty {
        "Polygon" => vec![parse_polygon(coords)?],
        "MultiPolygon" => coords
            .as_array()
            .ok_or("MultiPolygon coordinates must be an array of polygons".to_string())?
            .iter()
            .map(parse_polygon)
            .collect::<Result<Vec<_>, _>>()?,
        other => return Err(format!("unsupported geometry type for a country: {other}")),
    };

    Ok(CountryFeature {
        iso_a3,
        name,
        polygons,
    })
}

fn parse_polygon(coords: &Value) -> Result<Polygon, String> {
    let rings = coords
        .as_array()
        .ok_or("Polygon coordinates must be an array of rings".to_string())?;
    if rings.is_empty() {
        return Err("Polygon has no rings".to_string());
    }
    let rings = rings
        .iter()
        .map(parse_ring)
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Polygon { rings })
}

fn parse_ring(coords: &Value) -> Result<Vec<LatLon>, String> {
    let arr = coords
        .as_array()
        .ok_or("ring must be an array of positions".to_string())?;
    let mut out = Vec::with_capacity(arr.len());
    for item in arr {
        let pos = item
            .as_array()
            .filter(|p| p.len() >= 2)
            .ok_or("position must be [lon, lat]".to_string())?;
        let lon = pos[0].as_f64().ok_or("lon must be a number".to_string())?;
        let lat = pos[1].as_f64().ok_or("lat must be a number".to_string())?;
        let p = LatLon::new(lat, lon);
        if !p.is_valid() {
            return Err(format!("position out of range: [{lon}, {lat}]"));
        }
        out.push(p);
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::parse_countries;
    use crate::error::DatasetError;
    use foundation::math::LatLon;

    const SQUARE_WITH_HOLE: &str = r#"{
        "type": "FeatureCollection",
        "features": [{
            "type": "Feature",
            "properties": { "ISO_A3": "SQR", "ADMIN": "Square" },
            "geometry": {
                "type": "Polygon",
                "coordinates": [
                    [[0, 0], [10, 0], [10, 10], [0, 10], [0, 0]],
                    [[4, 4], [6, 4], [6, 6], [4, 6], [4, 4]]
                ]
            }
        }]
    }"#;

    #[test]
    fn parses_polygon_with_hole() {
        let countries = parse_countries(SQUARE_WITH_HOLE).expect("parse");
        assert_eq!(countries.len(), 1);
        let c = &countries[0];
        assert_eq!(c.iso_a3, "SQR");
        assert_eq!(c.name.as_deref(), Some("Square"));
        assert!(c.contains(LatLon::new(2.0, 2.0)));
        assert!(!c.contains(LatLon::new(5.0, 5.0)));
        assert!(!c.contains(LatLon::new(20.0, 5.0)));
        let b = c.bounds().expect("bounds");
        assert_eq!(b.max, LatLon::new(10.0, 10.0));
    }

    #[test]
    fn rejects_feature_without_iso_code() {
        let payload = SQUARE_WITH_HOLE.replace("\"ISO_A3\": \"SQR\", ", "");
        let err = parse_countries(&payload).unwrap_err();
        assert!(matches!(err, DatasetError::InvalidRecord { index: 0, .. }));
        assert!(err.to_string().contains("ISO_A3"));
    }

    #[test]
    fn rejects_non_polygon_geometry() {
        let payload = r#"{"type":"FeatureCollection","features":[{"type":"Feature",
            "properties":{"ISO_A3":"PNT"},
            "geometry":{"type":"Point","coordinates":[1,2]}}]}"#;
        assert!(matches!(
            parse_countries(payload),
            Err(DatasetError::InvalidRecord { .. })
        ));
    }

    #[test]
    fn rejects_non_collections() {
        assert!(matches!(
            parse_countries("[]"),
            Err(DatasetError::MissingCollection { .. })
        ));
        assert!(matches!(
            parse_countries("{"),
            Err(DatasetError::Json { .. })
        ));
    }

    #[test]
    fn parses_bundled_countries() {
        let payload = include_str!("../../apps/viewer_web/assets/countries.geojson");
        let countries = parse_countries(payload).expect("parse bundled countries");
        assert!(countries.iter().any(|c| c.iso_a3 == "NGA"));
    }
}
