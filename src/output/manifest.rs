use crate::output::error::OutputError;
use crate::output::series::read_series_header;
use crate::points::ResolvedPoint;
use log::info;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

const MANIFEST_FILE_NAME: &str = "meteo.tsd.forc";
const LOCATIONS_FILE_NAME: &str = "meteo_locations.csv";

/// Writes the forcing manifest consumed by the downstream model: point
/// count and start date, the relative series directory, then one series
/// filename per point in resolution order.
///
/// Every referenced series file must already exist; otherwise the missing
/// point ids are reported and no manifest is written. The start date is read
/// back from the first point's series header rather than recomputed.
pub fn write_manifest(
    points: &[ResolvedPoint],
    series_dir: &Path,
    output_dir: &Path,
) -> Result<PathBuf, OutputError> {
    let Some(first_point) = points.first() else {
        return Err(OutputError::MissingSeries(Vec::new()));
    };

    let missing: Vec<String> = points
        .iter()
        .filter(|p| !series_dir.join(format!("{}.csv", p.query.id)).is_file())
        .map(|p| p.query.id.clone())
        .collect();
    if !missing.is_empty() {
        return Err(OutputError::MissingSeries(missing));
    }

    let first = series_dir.join(format!("{}.csv", first_point.query.id));
    let start_date = read_series_header(&first)?.start_date;

    let rel_dir = series_dir
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("csv");

    let path = output_dir.join(MANIFEST_FILE_NAME);
    let file = File::create(&path).map_err(|e| OutputError::ManifestWrite(path.clone(), e))?;
    let mut out = BufWriter::new(file);
    let mut body = format!(
        "{} {}\n./{}/\n",
        points.len(),
        start_date.format("%Y%m%d"),
        rel_dir
    );
    for point in points {
        body.push_str(&point.query.id);
        body.push_str(".csv\n");
    }
    out.write_all(body.as_bytes())
        .and_then(|_| out.flush())
        .map_err(|e| OutputError::ManifestWrite(path.clone(), e))?;

    info!("Wrote forcing manifest '{}'", path.display());
    Ok(path)
}

/// Writes the point-correspondence table: each query coordinate next to the
/// grid cell it resolved to, for diagnostic rendering.
pub fn write_locations(
    points: &[ResolvedPoint],
    output_dir: &Path,
) -> Result<PathBuf, OutputError> {
    let path = output_dir.join(LOCATIONS_FILE_NAME);
    let file = File::create(&path).map_err(|e| OutputError::ManifestWrite(path.clone(), e))?;
    let mut out = BufWriter::new(file);

    let mut body = String::from("ID,Original_Lon,Original_Lat,Resolved_Lon,Resolved_Lat\n");
    for point in points {
        body.push_str(&format!(
            "{},{:.4},{:.4},{:.4},{:.4}\n",
            point.query.id, point.query.lon, point.query.lat, point.grid_lon, point.grid_lat
        ));
    }
    out.write_all(body.as_bytes())
        .and_then(|_| out.flush())
        .map_err(|e| OutputError::ManifestWrite(path.clone(), e))?;

    info!("Wrote point-correspondence table '{}'", path.display());
    Ok(path)
}
