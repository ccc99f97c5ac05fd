use crate::points::error::PointError;
use log::warn;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::Path;

/// A caller-supplied location for which a forcing series is requested.
///
/// Ids must be unique within one run; [`ensure_unique_ids`] enforces this
/// before resolution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryPoint {
    pub id: String,
    pub lon: f64,
    pub lat: f64,
}

impl QueryPoint {
    pub fn new(id: impl Into<String>, lon: f64, lat: f64) -> Self {
        Self {
            id: id.into(),
            lon,
            lat,
        }
    }
}

/// Parses `"lon,lat"` pair strings into query points with ids `1..=N`.
///
/// Unparseable entries are logged and skipped, matching the tolerant
/// behavior of the point-file reader.
pub fn parse_point_list(specs: &[String]) -> Vec<QueryPoint> {
    let mut points = Vec::with_capacity(specs.len());
    for spec in specs {
        match parse_lon_lat(spec) {
            Some((lon, lat)) => {
                let id = (points.len() + 1).to_string();
                points.push(QueryPoint::new(id, lon, lat));
            }
            None => warn!("Skipping unparseable coordinate pair '{}'", spec),
        }
    }
    points
}

/// Reads query points from a text file: one `"lon,lat"` pair per line,
/// blank lines and `#`-prefixed comments ignored.
pub fn read_point_file(path: &Path) -> Result<Vec<QueryPoint>, PointError> {
    let contents =
        fs::read_to_string(path).map_err(|e| PointError::PointFileRead(path.to_path_buf(), e))?;

    let mut points = Vec::new();
    for (line_no, line) in contents.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        match parse_lon_lat(line) {
            Some((lon, lat)) => {
                let id = (points.len() + 1).to_string();
                points.push(QueryPoint::new(id, lon, lat));
            }
            None => warn!(
                "Skipping unparseable line {} in '{}': '{}'",
                line_no + 1,
                path.display(),
                line
            ),
        }
    }

    if points.is_empty() {
        return Err(PointError::EmptyPointFile(path.to_path_buf()));
    }
    Ok(points)
}

/// Rejects query sets with repeated ids before any extraction starts.
pub fn ensure_unique_ids(points: &[QueryPoint]) -> Result<(), PointError> {
    let mut seen = HashSet::with_capacity(points.len());
    for point in points {
        if !seen.insert(point.id.as_str()) {
            return Err(PointError::DuplicatePointId(point.id.clone()));
        }
    }
    Ok(())
}

fn parse_lon_lat(spec: &str) -> Option<(f64, f64)> {
    let (lon, lat) = spec.split_once(',')?;
    let lon = lon.trim().parse::<f64>().ok()?;
    let lat = lat.trim().parse::<f64>().ok()?;
    Some((lon, lat))
}
