//! The sumc driver: reads declaration units and lowers them to C.
pub mod pipeline;

pub use pipeline::{DriverError, Outcome, lower_to_c, parse_unit, read_unit, tags_json, write_output};
