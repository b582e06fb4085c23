pub mod batch;
pub mod expediente;
pub mod loaders;

pub use batch::Batch;
pub use expediente::{Identifier, LookupResult, ResultSet};
pub use loaders::{ingest, is_csv_path, load_csv_file, parse, Ingestion, IDENTIFIER_COLUMN};
