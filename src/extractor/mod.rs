pub mod file_extractor;
pub mod output_manager;

pub use file_extractor::{CopyStep, ExtractionProgress, FileOperations};
pub use output_manager::{ConfigSnapshot, ExtractionReport, FileInfo, OutputManager};
