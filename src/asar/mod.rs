pub mod archive;
pub mod header;
pub mod integrity;

pub use archive::{AsarArchive, EntryData};
pub use header::{parse_header, AsarDirectory, AsarEntry, FileRecord};
pub use integrity::{verify, HashAlgorithm, Integrity, IntegrityCheck};
