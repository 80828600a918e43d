pub mod bundle_scanner;
pub mod name_filter;

pub use bundle_scanner::{BundleScanner, PreloadFile, ScanStatistics};
pub use name_filter::NameFilter;
