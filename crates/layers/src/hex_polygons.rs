use formats::CountryFeature;
use foundation::Rgba;
use foundation::math::{LatLon, Vec3, interpolate, polar_to_cartesian};
use h3o::{CellIndex, LatLng, Resolution};
use serde::{Deserialize, Serialize};

use crate::layer::{Layer, LayerId};
use crate::symbology::HighlightPolicy;

#[derive(Debug, thiserror::Error)]
pub enum HexPolygonError {
    #[error("hex resolution {0} is outside 0..=15")]
    InvalidResolution(u8),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HexPolygonStyle {
    pub resolution: u8,
    /// Fraction of each cell cut away towards its center, in `[0, 1)`.
    pub margin: f64,
    /// Height above the surface as a fraction of the globe radius.
    pub altitude: f64,
    pub colors: HighlightPolicy,
}

impl Default for HexPolygonStyle {
    fn default() -> Self {
        Self {
            resolution: 3,
            margin: 0.5,
            altitude: 0.001,
            colors: HighlightPolicy::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct HexCell {
    pub iso_a3: String,
    pub cell: CellIndex,
    pub center: Vec3,
    /// Shrunk boundary, not closed.
    pub boundary: Vec<Vec3>,
    pub color: Rgba,
}

#[derive(Debug, Clone, PartialEq)]
pub struct HexPolygonLayer {
    id: LayerId,
    pub cells: Vec<HexCell>,
}

impl HexPolygonLayer {
    /// Tessellates every country into the H3 cells whose centers fall inside it.
    pub fn build(id: u64, countries: &[CountryFeature], style: &HexPolygonStyle) -> Result<Self, HexPolygonError> {
        let resolution = Resolution::try_from(style.resolution)
            .map_err(|_| HexPolygonError::InvalidResolution(style.resolution))?;
        let centers: Vec<(CellIndex, LatLon)> = CellIndex::base_cells()
            .flat_map(|base| base.children(resolution))
            .map(|cell| (cell, to_lat_lon(LatLng::from(cell))))
            .collect();

        let mut cells = Vec::new();
        for country in countries {
            let Some(bounds) = country.bounds() else {
                continue;
            };
            let color = style.colors.color_for(&country.iso_a3);
            let before = cells.len();
            for &(cell, center) in &centers {
                if !bounds.contains(center) || !country.contains(center) {
                    continue;
                }
                cells.push(hex_cell(&country.iso_a3, cell, center, style, color));
            }
            if cells.len() == before {
                tracing::debug!(iso_a3 = %country.iso_a3, "country too small for hex resolution");
            }
        }
        tracing::debug!(cells = cells.len(), resolution = style.resolution, "hex polygons built");
        Ok(Self {
            id: LayerId(id),
            cells,
        })
    }

    pub fn cells_of<'a>(&'a self, iso_a3: &'a str) -> impl Iterator<Item = &'a HexCell> + 'a {
        self.cells.iter().filter(move |c| c.iso_a3 == iso_a3)
    }
}

fn to_lat_lon(ll: LatLng) -> LatLon {
    LatLon::new(ll.lat(), ll.lng())
}

fn hex_cell(iso_a3: &str, cell: CellIndex, center: LatLon, style: &HexPolygonStyle, color: Rgba) -> HexCell {
    let keep = 1.0 - style.margin.clamp(0.0, 1.0);
    let boundary = cell
        .boundary()
        .iter()
        .map(|&vertex| polar_to_cartesian(interpolate(center, to_lat_lon(vertex), keep), style.altitude))
        .collect();
    HexCell {
        iso_a3: iso_a3.to_string(),
        cell,
        center: polar_to_cartesian(center, style.altitude),
        boundary,
        color,
    }
}

impl Layer for HexPolygonLayer {
    fn id(&self) -> LayerId {
        self.id
    }

    fn name(&self) -> &'static str {
        "hex_polygons"
    }
}
