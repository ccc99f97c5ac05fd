pub mod error;
mod query;
mod resolve;

pub use query::{ensure_unique_ids, parse_point_list, read_point_file, QueryPoint};
pub use resolve::{resolve, ResolvedPoint};
