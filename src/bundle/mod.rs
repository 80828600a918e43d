pub mod app_bundle;

pub use app_bundle::{AppBundle, BundleEntry, BundleInfo};
