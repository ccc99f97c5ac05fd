//! End-to-end runs over synthetic snapshot files.

use chrono::NaiveDate;
use meteogrid::{
    read_series_header, ForcingPipeline, GridData, MeteogridError, PartitionScheme, QueryPoint,
};
use std::fs;
use std::path::Path;
use tempfile::tempdir;

const LAT_AXIS: [f64; 3] = [30.0, 30.25, 30.5];
const LON_AXIS: [f64; 3] = [100.0, 100.25, 100.5];

const VARIABLES: [(&str, f64); 6] = [
    ("Rainf_tavg", 0.0001),
    ("Tair_f_inst", 293.15),
    ("Qair_f_inst", 0.01),
    ("Wind_f_inst", 3.0),
    ("Swnet_tavg", 180.0),
    ("Psurf_f_inst", 101_325.0),
];

fn write_snapshot(dir: &Path, stamp: &str, offset: f64) {
    let mut grid = GridData::new(LAT_AXIS.to_vec(), LON_AXIS.to_vec());
    for (name, base) in VARIABLES {
        let values = (0..9).map(|i| base + offset * (1.0 + i as f64) * 1e-6).collect();
        grid.insert_field(name, values).unwrap();
    }
    grid.write(&dir.join(format!("GLDAS_{stamp}.grd"))).unwrap();
}

fn write_corrupt_snapshot(dir: &Path, stamp: &str) {
    fs::write(dir.join(format!("GLDAS_{stamp}.grd")), b"not a snapshot").unwrap();
}

fn query_points() -> Vec<QueryPoint> {
    vec![
        QueryPoint::new("1", 100.05, 30.05),
        QueryPoint::new("2", 100.30, 30.30),
        QueryPoint::new("3", 100.45, 30.55),
    ]
}

#[test]
fn three_points_four_hourly_snapshots() {
    let data = tempdir().unwrap();
    let out = tempdir().unwrap();
    for (i, stamp) in ["20230501_0000", "20230501_0100", "20230501_0200", "20230501_0300"]
        .iter()
        .enumerate()
    {
        write_snapshot(data.path(), stamp, i as f64);
    }

    let pipeline = ForcingPipeline::builder()
        .source_roots(vec![data.path().to_path_buf()])
        .output_dir(out.path().to_path_buf())
        .points(query_points())
        .build();
    let summary = pipeline.run().unwrap();

    assert_eq!(summary.snapshots_found, 4);
    assert_eq!(summary.partitions_extracted, 1);
    assert_eq!(summary.partitions_skipped, 0);
    assert_eq!(summary.series_written, 3);

    // Three series files, each with 4 rows and hourly timesteps.
    for id in ["1", "2", "3"] {
        let path = out.path().join("csv").join(format!("{id}.csv"));
        let header = read_series_header(&path).unwrap();
        assert_eq!(header.row_count, 4);
        assert_eq!(header.col_count, 7);
        assert_eq!(header.timestep_seconds, 3600);
        assert_eq!(header.start_date, NaiveDate::from_ymd_opt(2023, 5, 1).unwrap());
    }

    // Manifest lists exactly the three filenames in resolution order.
    let manifest = fs::read_to_string(summary.manifest_path).unwrap();
    assert_eq!(
        manifest.lines().collect::<Vec<_>>(),
        vec!["3 20230501", "./csv/", "1.csv", "2.csv", "3.csv"]
    );

    // Correspondence table has a header plus one row per point.
    let locations = fs::read_to_string(summary.locations_path).unwrap();
    assert_eq!(locations.lines().count(), 4);
    assert!(locations.starts_with("ID,Original_Lon,Original_Lat,Resolved_Lon,Resolved_Lat"));

    // Spot-check converted values in point 1's file: row 0 of the first
    // snapshot carries the unperturbed base values.
    let first = fs::read_to_string(out.path().join("csv/1.csv")).unwrap();
    let row: Vec<&str> = first.lines().nth(2).unwrap().split('\t').collect();
    assert_eq!(row[0], "0.0000"); // elapsed days
    assert_eq!(row[1], "8.6400"); // 0.0001 kg/m2/s -> mm/day
    assert_eq!(row[2], "20.0000"); // 293.15 K -> degC
    assert_eq!(row[4], "3.0000"); // wind passthrough
    assert_eq!(row[5], "180.0000"); // net shortwave preferred
    assert_eq!(row[6], "101325.0000"); // pressure in Pa
}

#[test]
fn rerun_serves_from_cache_and_skips_existing_series() {
    let data = tempdir().unwrap();
    let out = tempdir().unwrap();
    write_snapshot(data.path(), "20230501_0000", 0.0);
    write_snapshot(data.path(), "20230501_0300", 1.0);

    let pipeline = ForcingPipeline::builder()
        .source_roots(vec![data.path().to_path_buf()])
        .output_dir(out.path().to_path_buf())
        .points(query_points())
        .build();
    pipeline.run().unwrap();

    // Corrupt the later snapshot in place and clear the series files; the
    // rerun must rebuild both rows from the cache artifact alone. A
    // recompute would only see one readable timestep.
    write_corrupt_snapshot(data.path(), "20230501_0300");
    for id in ["1", "2", "3"] {
        fs::remove_file(out.path().join("csv").join(format!("{id}.csv"))).unwrap();
    }

    let summary = pipeline.run().unwrap();
    assert_eq!(summary.series_written, 3);
    let header = read_series_header(&out.path().join("csv/1.csv")).unwrap();
    assert_eq!(header.row_count, 2);
}

#[test]
fn corrupt_partition_is_skipped_when_another_succeeds() {
    let data = tempdir().unwrap();
    let out = tempdir().unwrap();
    write_corrupt_snapshot(data.path(), "20220601_0000");
    write_corrupt_snapshot(data.path(), "20220601_0300");
    write_snapshot(data.path(), "20230501_0000", 0.0);
    write_snapshot(data.path(), "20230501_0300", 1.0);

    let pipeline = ForcingPipeline::builder()
        .source_roots(vec![data.path().to_path_buf()])
        .output_dir(out.path().to_path_buf())
        .points(query_points())
        .build();
    let summary = pipeline.run().unwrap();

    assert_eq!(summary.snapshots_found, 4);
    assert_eq!(summary.partitions_skipped, 1);
    assert_eq!(summary.partitions_extracted, 1);
    assert_eq!(summary.series_written, 3);
    let header = read_series_header(&out.path().join("csv/1.csv")).unwrap();
    assert_eq!(header.start_date, NaiveDate::from_ymd_opt(2023, 5, 1).unwrap());
}

#[test]
fn all_partitions_failing_is_fatal() {
    let data = tempdir().unwrap();
    let out = tempdir().unwrap();
    // The readable snapshot predates the cutoff, so it supplies the axes
    // but belongs to no partition; the only partition is corrupt.
    write_snapshot(data.path(), "20230512_2100", 0.0);
    write_corrupt_snapshot(data.path(), "20230513_0000");
    write_corrupt_snapshot(data.path(), "20230513_0300");

    let pipeline = ForcingPipeline::builder()
        .source_roots(vec![data.path().to_path_buf()])
        .output_dir(out.path().to_path_buf())
        .points(query_points())
        .scheme(PartitionScheme::FromDate(
            NaiveDate::from_ymd_opt(2023, 5, 13).unwrap(),
        ))
        .build();
    assert!(matches!(
        pipeline.run(),
        Err(MeteogridError::AllPartitionsFailed)
    ));
}

#[test]
fn from_date_mode_produces_a_single_partition() {
    let data = tempdir().unwrap();
    let out = tempdir().unwrap();
    write_snapshot(data.path(), "20230512_2100", 0.0);
    write_snapshot(data.path(), "20230513_0000", 1.0);
    write_snapshot(data.path(), "20230513_0300", 2.0);

    let pipeline = ForcingPipeline::builder()
        .source_roots(vec![data.path().to_path_buf()])
        .output_dir(out.path().to_path_buf())
        .points(query_points())
        .scheme(PartitionScheme::FromDate(
            NaiveDate::from_ymd_opt(2023, 5, 13).unwrap(),
        ))
        .build();
    let summary = pipeline.run().unwrap();

    assert_eq!(summary.partitions_extracted, 1);
    let header = read_series_header(&out.path().join("csv/1.csv")).unwrap();
    assert_eq!(header.row_count, 2);
    assert_eq!(header.start_date, NaiveDate::from_ymd_opt(2023, 5, 13).unwrap());
}

#[test]
fn multi_year_runs_concatenate_per_point() {
    let data = tempdir().unwrap();
    let out = tempdir().unwrap();
    write_snapshot(data.path(), "20221231_1800", 0.0);
    write_snapshot(data.path(), "20221231_2100", 1.0);
    write_snapshot(data.path(), "20230101_0000", 2.0);
    write_snapshot(data.path(), "20230101_0300", 3.0);

    let pipeline = ForcingPipeline::builder()
        .source_roots(vec![data.path().to_path_buf()])
        .output_dir(out.path().to_path_buf())
        .points(query_points())
        .build();
    let summary = pipeline.run().unwrap();

    assert_eq!(summary.partitions_extracted, 2);
    let header = read_series_header(&out.path().join("csv/1.csv")).unwrap();
    assert_eq!(header.row_count, 4);
    assert_eq!(header.start_date, NaiveDate::from_ymd_opt(2022, 12, 31).unwrap());
    assert_eq!(header.end_date, NaiveDate::from_ymd_opt(2023, 1, 1).unwrap());
}

#[test]
fn no_points_and_no_snapshots_are_fatal() {
    let data = tempdir().unwrap();
    let out = tempdir().unwrap();

    let no_points = ForcingPipeline::builder()
        .source_roots(vec![data.path().to_path_buf()])
        .output_dir(out.path().to_path_buf())
        .points(vec![])
        .build();
    assert!(no_points.run().is_err());

    let no_snapshots = ForcingPipeline::builder()
        .source_roots(vec![data.path().to_path_buf()])
        .output_dir(out.path().to_path_buf())
        .points(query_points())
        .build();
    assert!(no_snapshots.run().is_err());
}
