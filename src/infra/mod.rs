pub mod csv_extractor;
pub mod sqlite_loader;
