pub mod csv_loader;

pub use csv_loader::{ingest, is_csv_path, load_csv_file, parse, Ingestion, IDENTIFIER_COLUMN};
