use std::collections::BTreeMap;

use log::warn;

use crate::data::geometry::{GeoPoint, to_geo_point};
use crate::data::model::{Field, RecordSet};

/// Which storm center a heatmap shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CenterKind {
    Historic,
    Sst,
}

impl CenterKind {
    pub fn field(self) -> Field {
        match self {
            CenterKind::Historic => Field::HistoricStormCenter,
            CenterKind::Sst => Field::SstStormCenter,
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            CenterKind::Historic => "Historic Storm Centers Heatmap",
            CenterKind::Sst => "SST Storm Centers Heatmap",
        }
    }
}

/// Storm centers of one kind plus how many records had to be skipped.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Centers {
    pub points: Vec<GeoPoint>,
    pub skipped: usize,
}

/// Derive the axis-corrected storm centers of `records`. A record whose WKT
/// does not parse (including `N/A`) is logged and left out.
pub fn storm_centers(records: &RecordSet, kind: CenterKind) -> Centers {
    let mut centers = Centers::default();
    for record in records {
        let wkt = record.get(kind.field()).to_string();
        match to_geo_point(&wkt) {
            Ok(p) => centers.points.push(p),
            Err(e) => {
                warn!("{}: skipping {:?} center: {e}", record.id, kind);
                centers.skipped += 1;
            }
        }
    }
    centers
}

// ---------------------------------------------------------------------------
// Density grid
// ---------------------------------------------------------------------------

/// One occupied grid cell. `lon`/`lat` is the south-west corner.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HeatCell {
    pub lon: f64,
    pub lat: f64,
    pub count: usize,
}

impl HeatCell {
    /// Corners of the cell, counter-clockwise from south-west.
    pub fn corners(&self, size: f64) -> [[f64; 2]; 4] {
        [
            [self.lon, self.lat],
            [self.lon + size, self.lat],
            [self.lon + size, self.lat + size],
            [self.lon, self.lat + size],
        ]
    }
}

/// Point density on a regular lon/lat grid.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HeatGrid {
    pub cell_size: f64,
    pub cells: Vec<HeatCell>,
    pub max_count: usize,
}

impl HeatGrid {
    /// Count in `cell` relative to the densest cell, in `(0, 1]`.
    pub fn intensity(&self, cell: &HeatCell) -> f32 {
        if self.max_count == 0 {
            return 0.0;
        }
        cell.count as f32 / self.max_count as f32
    }
}

/// Bin points into square cells of `cell_size` degrees. Only occupied cells
/// are returned, ordered west→east then south→north.
pub fn bin_points(points: &[GeoPoint], cell_size: f64) -> HeatGrid {
    if cell_size.is_nan() || cell_size <= 0.0 {
        return HeatGrid::default();
    }
    let mut counts: BTreeMap<(i64, i64), usize> = BTreeMap::new();
    for p in points {
        let key = (
            (p.lon() / cell_size).floor() as i64,
            (p.lat() / cell_size).floor() as i64,
        );
        *counts.entry(key).or_default() += 1;
    }

    let max_count = counts.values().copied().max().unwrap_or(0);
    let cells = counts
        .into_iter()
        .map(|((ix, iy), count)| HeatCell {
            lon: ix as f64 * cell_size,
            lat: iy as f64 * cell_size,
            count,
        })
        .collect();

    HeatGrid {
        cell_size,
        cells,
        max_count,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::FieldValue;
    use crate::data::model::tests::blank_record;

    fn pt(x: f64, y: f64) -> GeoPoint {
        GeoPoint { x, y }
    }

    #[test]
    fn centers_are_swapped_and_bad_rows_counted() {
        let mut a = blank_record("a");
        a.historic_storm_center = FieldValue::from("POINT (37.75 -80.94)");
        a.sst_storm_center = FieldValue::from("POINT (38.5 -81.5)");
        let b = blank_record("b");

        let set = RecordSet::new(vec![a, b]);
        let historic = storm_centers(&set, CenterKind::Historic);
        assert_eq!(historic.points, vec![pt(-80.94, 37.75)]);
        assert_eq!(historic.skipped, 1);

        let sst = storm_centers(&set, CenterKind::Sst);
        assert_eq!(sst.points, vec![pt(-81.5, 38.5)]);
    }

    #[test]
    fn bins_count_points_per_cell() {
        let points = [pt(-80.9, 37.7), pt(-80.8, 37.6), pt(-79.1, 38.2)];
        let grid = bin_points(&points, 0.5);

        assert_eq!(grid.max_count, 2);
        assert_eq!(grid.cells.len(), 2);
        assert_eq!(
            grid.cells[0],
            HeatCell {
                lon: -81.0,
                lat: 37.5,
                count: 2
            }
        );
        assert_eq!(grid.intensity(&grid.cells[1]), 0.5);
    }

    #[test]
    fn no_points_or_bad_cell_size_give_empty_grid() {
        assert!(bin_points(&[], 0.25).cells.is_empty());
        assert_eq!(bin_points(&[pt(0.0, 0.0)], 0.0), HeatGrid::default());
        assert_eq!(bin_points(&[pt(0.0, 0.0)], f64::NAN), HeatGrid::default());
    }

    #[test]
    fn corners_span_one_cell() {
        let cell = HeatCell {
            lon: -81.0,
            lat: 37.5,
            count: 1,
        };
        assert_eq!(cell.corners(0.5)[2], [-80.5, 38.0]);
    }
}
