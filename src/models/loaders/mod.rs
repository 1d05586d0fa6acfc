pub mod csv_loader;

pub use csv_loader::{dataset_exists, load_dataset, load_work_items, read_dataset_text};
