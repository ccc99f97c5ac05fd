use crate::catalog::error::CatalogError;
use chrono::{Datelike, NaiveDate, NaiveDateTime, NaiveTime};
use log::{info, warn};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

/// One discovered snapshot file with the timestamp taken from its name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnapshotFile {
    pub path: PathBuf,
    pub timestamp: NaiveDateTime,
}

/// How discovered snapshots are split into extraction/caching units.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PartitionScheme {
    /// One partition per calendar year (bulk extraction).
    CalendarYear,
    /// A single partition holding every snapshot on or after the given date
    /// (incremental "from-date" extraction).
    FromDate(NaiveDate),
}

/// An ordered, timestamp-deduplicated collection of snapshot files.
#[derive(Debug, Clone, Default)]
pub struct SnapshotCatalog {
    snapshots: Vec<SnapshotFile>,
}

impl SnapshotCatalog {
    /// Scans each source root (and its `downloads/` subdirectory, if one
    /// exists) for snapshot files whose names carry a parseable timestamp.
    ///
    /// Files matching neither naming convention are excluded with a warning.
    /// Missing roots are skipped; a root that exists but cannot be listed is
    /// an error. The result is sorted by timestamp, duplicates dropped
    /// keeping the first occurrence.
    pub fn discover(source_roots: &[PathBuf]) -> Result<Self, CatalogError> {
        let mut snapshots = Vec::new();
        for root in source_roots {
            if !root.is_dir() {
                warn!("Snapshot directory '{}' not found, skipping", root.display());
                continue;
            }
            collect_dir(root, &mut snapshots)?;
            let downloads = root.join("downloads");
            if downloads.is_dir() {
                collect_dir(&downloads, &mut snapshots)?;
            }
        }

        snapshots.sort_by(|a, b| (a.timestamp, &a.path).cmp(&(b.timestamp, &b.path)));
        let before = snapshots.len();
        snapshots.dedup_by(|b, a| a.timestamp == b.timestamp);
        if snapshots.len() < before {
            warn!(
                "Dropped {} snapshot(s) with duplicate timestamps",
                before - snapshots.len()
            );
        }

        info!("Discovered {} snapshot file(s)", snapshots.len());
        Ok(Self { snapshots })
    }

    /// Keeps only snapshots whose date falls inside the inclusive range.
    pub fn filter_range(mut self, start: Option<NaiveDate>, end: Option<NaiveDate>) -> Self {
        self.snapshots.retain(|s| {
            let date = s.timestamp.date();
            start.map_or(true, |d| date >= d) && end.map_or(true, |d| date <= d)
        });
        self
    }

    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    pub fn snapshots(&self) -> &[SnapshotFile] {
        &self.snapshots
    }

    /// Splits the catalog into ordered partitions. Keys sort ascending, so
    /// iterating the result visits snapshots chronologically.
    pub fn partition(&self, scheme: PartitionScheme) -> BTreeMap<String, Vec<SnapshotFile>> {
        let mut partitions: BTreeMap<String, Vec<SnapshotFile>> = BTreeMap::new();
        match scheme {
            PartitionScheme::CalendarYear => {
                for snapshot in &self.snapshots {
                    partitions
                        .entry(snapshot.timestamp.year().to_string())
                        .or_default()
                        .push(snapshot.clone());
                }
            }
            PartitionScheme::FromDate(start) => {
                let key = format!("from-{}", start.format("%Y%m%d"));
                let selected: Vec<SnapshotFile> = self
                    .snapshots
                    .iter()
                    .filter(|s| s.timestamp.date() >= start)
                    .cloned()
                    .collect();
                if !selected.is_empty() {
                    partitions.insert(key, selected);
                }
            }
        }
        partitions
    }
}

fn collect_dir(dir: &Path, out: &mut Vec<SnapshotFile>) -> Result<(), CatalogError> {
    let entries =
        fs::read_dir(dir).map_err(|e| CatalogError::SourceDirRead(dir.to_path_buf(), e))?;
    for entry in entries {
        let entry = entry.map_err(|e| CatalogError::SourceDirRead(dir.to_path_buf(), e))?;
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        match timestamp_from_name(name) {
            Some(timestamp) => out.push(SnapshotFile { path, timestamp }),
            None => warn!("Excluding '{}': no timestamp in file name", name),
        }
    }
    Ok(())
}

/// Extracts the snapshot timestamp from either historical naming convention:
/// `PREFIX_YYYYMMDD_HHMM.ext` or `PREFIX.AYYYYMMDD.HHMM.*.ext`.
pub fn timestamp_from_name(name: &str) -> Option<NaiveDateTime> {
    // PREFIX_YYYYMMDD_HHMM.ext
    let stem = name.rsplit_once('.').map_or(name, |(stem, _)| stem);
    let mut parts = stem.rsplit('_');
    if let (Some(time), Some(date)) = (parts.next(), parts.next()) {
        if let Some(ts) = parse_compact(date, time) {
            return Some(ts);
        }
    }

    // PREFIX.AYYYYMMDD.HHMM.*.ext
    let segments: Vec<&str> = name.split('.').collect();
    for pair in segments.windows(2) {
        if let Some(date) = pair[0].strip_prefix('A') {
            if let Some(ts) = parse_compact(date, pair[1]) {
                return Some(ts);
            }
        }
    }

    None
}

fn parse_compact(date: &str, time: &str) -> Option<NaiveDateTime> {
    if date.len() != 8 || time.len() != 4 {
        return None;
    }
    let date = NaiveDate::parse_from_str(date, "%Y%m%d").ok()?;
    let time = NaiveTime::parse_from_str(time, "%H%M").ok()?;
    Some(NaiveDateTime::new(date, time))
}
