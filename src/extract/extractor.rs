use crate::catalog::SnapshotFile;
use crate::extract::error::ExtractError;
use crate::extract::RawSeries;
use crate::points::ResolvedPoint;
use crate::snapshot::GridData;
use log::warn;
use ndarray::Array3;

/// Walks one ordered partition of snapshots and accumulates the raw
/// `[point][time][var]` tensor.
///
/// The configured variable list is narrowed once per partition to the subset
/// present in the first readable snapshot; a snapshot that cannot be read or
/// is missing a surviving variable loses its whole timestep (fail-skip).
/// Given the same partition and point set, two runs produce bit-identical
/// tensors.
pub fn extract(
    partition: &str,
    snapshots: &[SnapshotFile],
    points: &[ResolvedPoint],
    variables: &[String],
) -> Result<RawSeries, ExtractError> {
    if snapshots.is_empty() {
        return Err(ExtractError::EmptyPartition(partition.to_string()));
    }

    let mut surviving: Option<Vec<String>> = None;
    let mut times = Vec::new();
    let mut rows: Vec<Vec<f64>> = Vec::new(); // time-major, [point * var] per row

    for snapshot in snapshots {
        let grid = match GridData::read(&snapshot.path) {
            Ok(grid) => grid,
            Err(e) => {
                warn!(
                    "Partition {}: skipping unreadable snapshot '{}': {}",
                    partition,
                    snapshot.path.display(),
                    e
                );
                continue;
            }
        };

        let surviving = surviving.get_or_insert_with(|| {
            let mut kept = Vec::with_capacity(variables.len());
            for var in variables {
                if grid.has_field(var) {
                    kept.push(var.clone());
                } else {
                    warn!(
                        "Partition {}: variable '{}' absent from first snapshot, dropped",
                        partition, var
                    );
                }
            }
            kept
        });

        let mut row = Vec::with_capacity(points.len() * surviving.len());
        let mut failed = false;
        'points: for point in points {
            for var in surviving.iter() {
                match grid.value(var, point.lat_index, point.lon_index) {
                    Ok(value) => row.push(value),
                    Err(e) => {
                        warn!(
                            "Partition {}: skipping snapshot '{}': {}",
                            partition,
                            snapshot.path.display(),
                            e
                        );
                        failed = true;
                        break 'points;
                    }
                }
            }
        }
        if failed {
            continue;
        }

        times.push(snapshot.timestamp);
        rows.push(row);
    }

    let Some(variables) = surviving else {
        return Err(ExtractError::NoReadableSnapshots(partition.to_string()));
    };
    if times.is_empty() {
        return Err(ExtractError::NoReadableSnapshots(partition.to_string()));
    }

    let n_points = points.len();
    let n_times = times.len();
    let n_vars = variables.len();
    let mut data = Array3::zeros((n_points, n_times, n_vars));
    for (t, row) in rows.iter().enumerate() {
        for p in 0..n_points {
            for v in 0..n_vars {
                data[[p, t, v]] = row[p * n_vars + v];
            }
        }
    }

    Ok(RawSeries {
        partition: partition.to_string(),
        point_ids: points.iter().map(|p| p.query.id.clone()).collect(),
        variables,
        times,
        data,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::points::{resolve, QueryPoint};
    use chrono::NaiveDate;
    use std::fs;
    use std::path::Path;
    use tempfile::tempdir;

    const LAT_AXIS: [f64; 2] = [30.0, 30.25];
    const LON_AXIS: [f64; 2] = [100.0, 100.25];

    fn write_snapshot(dir: &Path, day: u32, fields: &[(&str, f64)]) -> SnapshotFile {
        let mut grid = GridData::new(LAT_AXIS.to_vec(), LON_AXIS.to_vec());
        for (name, base) in fields {
            // Cell (i, j) holds base + i*10 + j so every cell is distinct.
            let values = (0..4).map(|k| base + (k / 2 * 10 + k % 2) as f64).collect();
            grid.insert_field(name, values).unwrap();
        }
        let path = dir.join(format!("GLDAS_202305{day:02}_0000.grd"));
        grid.write(&path).unwrap();
        SnapshotFile {
            path,
            timestamp: NaiveDate::from_ymd_opt(2023, 5, day)
                .unwrap()
                .and_hms_opt(0, 0, 0)
                .unwrap(),
        }
    }

    fn resolved_points() -> Vec<ResolvedPoint> {
        let queries = vec![
            QueryPoint::new("1", 100.0, 30.0),
            QueryPoint::new("2", 100.25, 30.25),
        ];
        resolve(&queries, &LAT_AXIS, &LON_AXIS).unwrap()
    }

    #[test]
    fn accumulates_points_times_and_variables() {
        let dir = tempdir().unwrap();
        let vars = vec!["Tair_f_inst".to_string(), "Wind_f_inst".to_string()];
        let snaps = vec![
            write_snapshot(dir.path(), 1, &[("Tair_f_inst", 280.0), ("Wind_f_inst", 2.0)]),
            write_snapshot(dir.path(), 2, &[("Tair_f_inst", 290.0), ("Wind_f_inst", 3.0)]),
        ];
        let points = resolved_points();

        let raw = extract("2023", &snaps, &points, &vars).unwrap();
        assert_eq!(raw.point_ids, vec!["1", "2"]);
        assert_eq!(raw.variables, vars);
        assert_eq!(raw.times.len(), 2);
        assert_eq!(raw.data.dim(), (2, 2, 2));
        // Point 1 sits at cell (0, 0), point 2 at cell (1, 1).
        assert_eq!(raw.data[[0, 0, 0]], 280.0);
        assert_eq!(raw.data[[1, 0, 0]], 291.0);
        assert_eq!(raw.data[[0, 1, 1]], 3.0);
        assert_eq!(raw.data[[1, 1, 1]], 14.0);
    }

    #[test]
    fn variables_missing_from_first_snapshot_are_dropped() {
        let dir = tempdir().unwrap();
        let vars = vec!["Tair_f_inst".to_string(), "Rainf_tavg".to_string()];
        let snaps = vec![
            write_snapshot(dir.path(), 1, &[("Tair_f_inst", 280.0)]),
            write_snapshot(
                dir.path(),
                2,
                &[("Tair_f_inst", 281.0), ("Rainf_tavg", 0.001)],
            ),
        ];
        let raw = extract("2023", &snaps, &resolved_points(), &vars).unwrap();
        assert_eq!(raw.variables, vec!["Tair_f_inst"]);
        assert_eq!(raw.data.dim(), (2, 2, 1));
    }

    #[test]
    fn unreadable_snapshot_loses_its_timestep_only() {
        let dir = tempdir().unwrap();
        let vars = vec!["Tair_f_inst".to_string()];
        let good1 = write_snapshot(dir.path(), 1, &[("Tair_f_inst", 280.0)]);
        let bad = write_snapshot(dir.path(), 2, &[("Tair_f_inst", 285.0)]);
        fs::write(&bad.path, b"corrupted").unwrap();
        let good2 = write_snapshot(dir.path(), 3, &[("Tair_f_inst", 290.0)]);

        let raw = extract("2023", &[good1, bad, good2], &resolved_points(), &vars).unwrap();
        assert_eq!(raw.times.len(), 2);
        assert_eq!(raw.data[[0, 1, 0]], 290.0);
    }

    #[test]
    fn missing_field_in_a_later_snapshot_skips_that_timestep() {
        let dir = tempdir().unwrap();
        let vars = vec!["Tair_f_inst".to_string()];
        let snaps = vec![
            write_snapshot(dir.path(), 1, &[("Tair_f_inst", 280.0)]),
            write_snapshot(dir.path(), 2, &[("Wind_f_inst", 2.0)]),
            write_snapshot(dir.path(), 3, &[("Tair_f_inst", 290.0)]),
        ];
        let raw = extract("2023", &snaps, &resolved_points(), &vars).unwrap();
        assert_eq!(raw.times.len(), 2);
    }

    #[test]
    fn empty_partition_is_an_error() {
        assert!(matches!(
            extract("2023", &[], &resolved_points(), &[]),
            Err(ExtractError::EmptyPartition(p)) if p == "2023"
        ));
    }

    #[test]
    fn all_snapshots_unreadable_is_an_error() {
        let dir = tempdir().unwrap();
        let bad = write_snapshot(dir.path(), 1, &[("Tair_f_inst", 280.0)]);
        fs::write(&bad.path, b"corrupted").unwrap();
        assert!(matches!(
            extract("2023", &[bad], &resolved_points(), &[]),
            Err(ExtractError::NoReadableSnapshots(_))
        ));
    }

    #[test]
    fn extraction_is_deterministic() {
        let dir = tempdir().unwrap();
        let vars = vec!["Tair_f_inst".to_string()];
        let snaps = vec![
            write_snapshot(dir.path(), 1, &[("Tair_f_inst", 280.0)]),
            write_snapshot(dir.path(), 2, &[("Tair_f_inst", 285.0)]),
        ];
        let points = resolved_points();
        let a = extract("2023", &snaps, &points, &vars).unwrap();
        let b = extract("2023", &snaps, &points, &vars).unwrap();
        assert_eq!(a, b);
    }
}
