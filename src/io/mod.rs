//! Reading series from CSV sources.

mod dates;
mod load;

pub use dates::parse_timestamp;
pub use load::{load_csv, read_csv, ColumnRef, DuplicatePolicy, LoadOptions};
