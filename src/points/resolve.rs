use crate::points::error::PointError;
use crate::points::query::QueryPoint;
use log::info;
use serde::{Deserialize, Serialize};

/// A query point bound to its nearest grid cell.
///
/// `grid_lon`/`grid_lat` are the axis values whose absolute difference to
/// the query coordinate is minimal; ties go to the lowest index. Read-only
/// for the rest of the pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedPoint {
    pub query: QueryPoint,
    pub grid_lon: f64,
    pub grid_lat: f64,
    pub lon_index: usize,
    pub lat_index: usize,
}

/// Maps each query point onto the nearest grid cell of the given axes.
///
/// The lat and lon searches are independent (grid separability is assumed,
/// not a 2-D Euclidean nearest neighbor), and the axes need not be sorted.
/// Points outside the axis bounds resolve to the nearest edge cell; that is
/// expected behavior, not an error.
pub fn resolve(
    points: &[QueryPoint],
    lat_axis: &[f64],
    lon_axis: &[f64],
) -> Result<Vec<ResolvedPoint>, PointError> {
    if lat_axis.is_empty() {
        return Err(PointError::EmptyAxis("lat"));
    }
    if lon_axis.is_empty() {
        return Err(PointError::EmptyAxis("lon"));
    }

    let mut resolved = Vec::with_capacity(points.len());
    for point in points {
        let lat_index = argmin_abs(lat_axis, point.lat);
        let lon_index = argmin_abs(lon_axis, point.lon);
        let grid_lat = lat_axis[lat_index];
        let grid_lon = lon_axis[lon_index];

        info!(
            "Point {} ({:.4}, {:.4}) -> grid cell ({:.4}, {:.4}) at [lat {}, lon {}]",
            point.id, point.lon, point.lat, grid_lon, grid_lat, lat_index, lon_index
        );

        resolved.push(ResolvedPoint {
            query: point.clone(),
            grid_lon,
            grid_lat,
            lon_index,
            lat_index,
        });
    }
    Ok(resolved)
}

/// Index of the axis value closest to `target`; first occurrence wins ties.
fn argmin_abs(axis: &[f64], target: f64) -> usize {
    let mut best = 0;
    let mut best_diff = (axis[0] - target).abs();
    for (i, value) in axis.iter().enumerate().skip(1) {
        let diff = (value - target).abs();
        if diff < best_diff {
            best = i;
            best_diff = diff;
        }
    }
    best
}
