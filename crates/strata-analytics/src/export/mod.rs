//! Flat-file renditions of assembled reports.

mod csv;

pub use self::csv::{export_csv, export_file_name, CONTENT_TYPE};
