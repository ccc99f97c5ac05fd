pub mod error;
mod grid_file;

pub use grid_file::GridData;

use bincode::config::{Configuration, Fixint, LittleEndian};

/// Fixed-int little-endian encoding, shared by snapshot files and cache
/// artifacts so both formats stay byte-stable across runs.
pub(crate) const BINCODE_CONFIG: Configuration<LittleEndian, Fixint> =
    bincode::config::standard().with_fixed_int_encoding();
