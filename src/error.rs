use thiserror::Error;

#[derive(Error, Debug)]
pub enum AsarPickError {
    #[error("Application bundle not found: {path}")]
    SourceNotFound { path: String },

    #[error("Malformed asar archive {path}: {reason}")]
    MalformedArchive { path: String, reason: String },

    #[error("Entry '{name}' is marked unpacked and carries no content in the archive")]
    UnpackedEntry { name: String },

    #[error("Failed to create output directory: {path}")]
    DirectoryCreation {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to read source entry: {path}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write output file: {path}")]
    Write {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Extraction cancelled")]
    Cancelled,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub trait UserFriendlyError {
    fn user_message(&self) -> String;
    fn suggestion(&self) -> Option<String>;
}

impl UserFriendlyError for AsarPickError {
    /// Rephrases variants whose Display form is terser than a user wants;
    /// the rest pass through unchanged.
    fn user_message(&self) -> String {
        match self {
            AsarPickError::MalformedArchive { path, reason } => {
                format!("The archive at {} could not be parsed: {}", path, reason)
            }
            AsarPickError::UnpackedEntry { name } => {
                format!("Entry '{}' is stored outside the archive", name)
            }
            AsarPickError::DirectoryCreation { path, .. } => {
                format!("Could not create output directory: {}", path)
            }
            AsarPickError::Read { path, .. } => {
                format!("Could not read source entry: {}", path)
            }
            AsarPickError::Write { path, .. } => {
                format!("Could not write output file: {}", path)
            }
            _ => self.to_string(),
        }
    }

    fn suggestion(&self) -> Option<String> {
        match self {
            AsarPickError::SourceNotFound { .. } => Some(
                "Check that the resources directory contains app/application.asar (or an unpacked app/application directory). Pass the resources directory as the first argument or set ASARPICK_RESOURCES.".to_string()
            ),
            AsarPickError::MalformedArchive { .. } => Some(
                "Verify the file is a complete asar bundle and not truncated. If the application ships an unpacked app/application directory, point the tool at that instead.".to_string()
            ),
            AsarPickError::UnpackedEntry { .. } => Some(
                "Unpacked entries live next to the archive on disk. Extract them from the application's unpacked directory instead of the archive.".to_string()
            ),
            AsarPickError::DirectoryCreation { .. } => Some(
                "Ensure the parent of the output path exists and is writable. The output directory is created a single level deep.".to_string()
            ),
            AsarPickError::Read { .. } => Some(
                "Ensure you have read permission for the application bundle and that it is not being modified while extracting.".to_string()
            ),
            AsarPickError::Write { .. } => Some(
                "Ensure you have write permission for the output directory and enough free disk space.".to_string()
            ),
            AsarPickError::Config { .. } => Some(
                "Review the TOML configuration file, or run with --generate-config to emit a known-good sample.".to_string()
            ),
            _ => None,
        }
    }
}

impl From<toml::ser::Error> for AsarPickError {
    fn from(error: toml::ser::Error) -> Self {
        AsarPickError::Config {
            message: format!("Failed to serialize config: {}", error),
        }
    }
}

pub type Result<T> = std::result::Result<T, AsarPickError>;
