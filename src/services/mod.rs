pub mod exporter;
pub mod failure_writer;
pub mod result_accumulator;
pub mod xlsx;

pub use exporter::{to_delimited_text, to_spreadsheet};
pub use failure_writer::FailureWriter;
pub use result_accumulator::merge;
