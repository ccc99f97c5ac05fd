pub mod error;
mod cache;
mod extractor;

pub use cache::CacheStore;
pub use extractor::extract;

use chrono::NaiveDateTime;
use ndarray::Array3;

/// The raw multi-variable series for one partition, prior to any unit
/// conversion: `data[[point, time, var]]` in source units.
///
/// The timestep axis covers only snapshots that were successfully read, and
/// the variable axis only the configured variables present in the first
/// readable snapshot of the partition.
#[derive(Debug, Clone, PartialEq)]
pub struct RawSeries {
    pub partition: String,
    pub point_ids: Vec<String>,
    pub variables: Vec<String>,
    pub times: Vec<NaiveDateTime>,
    pub data: Array3<f64>,
}

impl RawSeries {
    /// Column index of a raw variable, if it survived extraction.
    pub fn variable_index(&self, name: &str) -> Option<usize> {
        self.variables.iter().position(|v| v == name)
    }
}
