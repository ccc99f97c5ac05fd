use crate::convert::ConvertedSeries;
use crate::output::error::OutputError;
use chrono::NaiveDate;
use log::{info, warn};
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

/// Timestep assigned to a degenerate single-row series, where no interval
/// can be measured.
const DEFAULT_TIMESTEP_SECONDS: i64 = 86_400;

/// The metadata line leading every series file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeriesHeader {
    pub row_count: usize,
    pub col_count: usize,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub timestep_seconds: i64,
}

/// Serializes one converted series as `<point_id>.csv` under `dir`.
///
/// Layout: one metadata header line, one column-header line starting with
/// `Time_interval`, then tab-delimited rows prefixed by elapsed days since
/// the first timestamp, all values to 4 decimals. An existing file is left
/// untouched unless `force` is set. Irregular intervals are flagged, not
/// silently dropped; the header keeps the leading interval.
pub fn write_series(
    series: &ConvertedSeries,
    dir: &Path,
    force: bool,
) -> Result<PathBuf, OutputError> {
    let path = dir.join(format!("{}.csv", series.point_id));
    if path.exists() && !force {
        info!("Series file '{}' already exists, skipping", path.display());
        return Ok(path);
    }
    if series.times.is_empty() {
        return Err(OutputError::EmptySeries(series.point_id.clone()));
    }

    let start = series.times[0];
    let timestep_seconds = if series.times.len() >= 2 {
        (series.times[1] - start).num_seconds()
    } else {
        DEFAULT_TIMESTEP_SECONDS
    };
    for (i, pair) in series.times.windows(2).enumerate().skip(1) {
        if (pair[1] - pair[0]).num_seconds() != timestep_seconds {
            warn!(
                "Point {}: irregular timestep at row {} (expected {} s), header keeps the leading interval",
                series.point_id,
                i + 1,
                timestep_seconds
            );
            break;
        }
    }

    let file = File::create(&path).map_err(|e| OutputError::SeriesWrite(path.clone(), e))?;
    let mut out = BufWriter::new(file);
    let write = |out: &mut BufWriter<File>, line: String| {
        writeln!(out, "{line}").map_err(|e| OutputError::SeriesWrite(path.clone(), e))
    };

    write(
        &mut out,
        format!(
            "{}\t{}\t{}\t{}\t{}",
            series.rows.len(),
            series.columns.len() + 1,
            start.format("%Y%m%d"),
            series.times[series.times.len() - 1].format("%Y%m%d"),
            timestep_seconds
        ),
    )?;
    write(
        &mut out,
        format!("Time_interval\t{}", series.columns.join("\t")),
    )?;
    for (time, row) in series.times.iter().zip(&series.rows) {
        let elapsed_days = (*time - start).num_seconds() as f64 / 86_400.0;
        let mut line = format!("{elapsed_days:.4}");
        for value in row {
            line.push('\t');
            line.push_str(&format!("{value:.4}"));
        }
        write(&mut out, line)?;
    }
    out.flush()
        .map_err(|e| OutputError::SeriesWrite(path.clone(), e))?;

    info!("Wrote series file '{}'", path.display());
    Ok(path)
}

/// Reads back only the metadata header line of a series file.
pub fn read_series_header(path: &Path) -> Result<SeriesHeader, OutputError> {
    let file = File::open(path).map_err(|e| OutputError::SeriesRead(path.to_path_buf(), e))?;
    let mut line = String::new();
    BufReader::new(file)
        .read_line(&mut line)
        .map_err(|e| OutputError::SeriesRead(path.to_path_buf(), e))?;

    let parse = |line: &str| -> Option<SeriesHeader> {
        let mut fields = line.trim_end().split('\t');
        let header = SeriesHeader {
            row_count: fields.next()?.parse().ok()?,
            col_count: fields.next()?.parse().ok()?,
            start_date: NaiveDate::parse_from_str(fields.next()?, "%Y%m%d").ok()?,
            end_date: NaiveDate::parse_from_str(fields.next()?, "%Y%m%d").ok()?,
            timestep_seconds: fields.next()?.parse().ok()?,
        };
        fields.next().is_none().then_some(header)
    };
    parse(&line).ok_or_else(|| OutputError::HeaderParse {
        path: path.to_path_buf(),
        reason: format!("expected 5 tab-separated fields, got '{}'", line.trim_end()),
    })
}
