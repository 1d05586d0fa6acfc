pub mod capture;
pub mod dataset;
pub mod loaders;
pub mod options;
pub mod run;
pub mod work_item;

pub use capture::{CaptureRegion, RenderCapture};
pub use dataset::{Dataset, DatasetRecord};
pub use loaders::{dataset_exists, load_dataset, load_work_items, read_dataset_text};
pub use options::{Background, GenerationOptions, MAX_SCALE};
pub use run::{FailedItem, ProgressEvent, RunResult};
pub use work_item::WorkItem;
