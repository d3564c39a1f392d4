use thiserror::Error;

#[derive(Error, Debug)]
pub enum OszError {
    #[error("IO operation failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("Archive could not be read: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("No audio files found in {archive}")]
    NoAudioFound { archive: String },

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Path validation failed: {path}")]
    InvalidPath { path: String },

    #[error("Permission denied: {path}")]
    Permission { path: String },

    #[error("Path is outside the output directory: {path}")]
    OutsideOutputRoot { path: String },

    #[error("Unsafe entry path: {entry}")]
    UnsafeEntry { entry: String },
}

pub trait UserFriendlyError {
    fn user_message(&self) -> String;
    fn suggestion(&self) -> Option<String>;
}

impl UserFriendlyError for OszError {
    fn user_message(&self) -> String {
        match self {
            OszError::Io(e) => format!("File operation failed: {}", e),
            OszError::Zip(e) => format!("Not a readable .osz archive: {}", e),
            OszError::NoAudioFound { archive } => {
                format!("No .mp3 audio found in {}", archive)
            }
            OszError::Config { message } => format!("Configuration error: {}", message),
            OszError::InvalidPath { path } => format!("Invalid path: {}", path),
            OszError::Permission { path } => format!("Permission denied accessing: {}", path),
            OszError::OutsideOutputRoot { path } => {
                format!("Refusing to touch a path outside the output directory: {}", path)
            }
            OszError::UnsafeEntry { entry } => {
                format!("Archive entry would be written outside the output folder: {}", entry)
            }
        }
    }

    fn suggestion(&self) -> Option<String> {
        match self {
            OszError::Zip(_) => Some(
                "The file may be corrupt or incompletely downloaded. Re-download the beatmap and try again.".to_string()
            ),
            OszError::NoAudioFound { .. } => Some(
                "Only .mp3 tracks are extracted. Check the archive contents with any zip tool.".to_string()
            ),
            OszError::Config { .. } => Some(
                "Check your configuration file syntax or regenerate one with --generate-config.".to_string()
            ),
            OszError::InvalidPath { .. } => Some(
                "Make sure the input folder exists and is a directory (see --input).".to_string()
            ),
            OszError::Permission { .. } => Some(
                "Ensure you have the necessary read/write permissions for the input and output directories.".to_string()
            ),
            _ => None,
        }
    }
}

impl From<toml::de::Error> for OszError {
    fn from(error: toml::de::Error) -> Self {
        OszError::Config {
            message: error.to_string(),
        }
    }
}

impl From<walkdir::Error> for OszError {
    fn from(error: walkdir::Error) -> Self {
        let path = error
            .path()
            .map(|p| p.display().to_string())
            .unwrap_or_default();

        match error.io_error().map(|e| e.kind()) {
            Some(std::io::ErrorKind::PermissionDenied) => OszError::Permission { path },
            _ => OszError::Io(std::io::Error::other(error.to_string())),
        }
    }
}

pub type Result<T> = std::result::Result<T, OszError>;
