use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Failures raised while writing an archive.
#[derive(Error, Debug)]
pub enum ArchiveError {
    #[error("Source file {} could not be read: {source}", .path.display())]
    SourceNotFound {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Destination {} is not writable: {source}", .path.display())]
    DestinationUnwritable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("I/O failure after {written} bytes: {source}")]
    IoFailureMidWrite {
        written: u64,
        #[source]
        source: io::Error,
    },
}

/// Failures returned by the controller. Every failure path ends up as one of these.
#[derive(Error, Debug)]
pub enum CompressionError {
    #[error("No file selected")]
    InvalidSelection,

    #[error("Unsupported file type: {}", .path.display())]
    UnsupportedFileType { path: PathBuf },

    #[error("Source file {} could not be read: {source}", .path.display())]
    SourceNotFound {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Destination {} is not writable: {source}", .path.display())]
    DestinationUnwritable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Compression failed after {written} bytes: {source}")]
    IoFailureMidWrite {
        written: u64,
        #[source]
        source: io::Error,
    },
}

impl CompressionError {
    /// Text shown in the status line.
    pub fn user_message(&self) -> String {
        match self {
            CompressionError::InvalidSelection => "Please select a file first.".to_string(),
            CompressionError::UnsupportedFileType { .. } => {
                "Unsupported file type. Please select a supported file.".to_string()
            }
            CompressionError::SourceNotFound { path, .. } => format!(
                "Could not read {}. It may have been moved or deleted.",
                path.display()
            ),
            CompressionError::DestinationUnwritable { path, .. } => format!(
                "Cannot save to {}. Choose another location.",
                path.display()
            ),
            CompressionError::IoFailureMidWrite { source, .. } => {
                format!("An error occurred while compressing: {}", source)
            }
        }
    }
}

impl From<ArchiveError> for CompressionError {
    fn from(err: ArchiveError) -> Self {
        match err {
            ArchiveError::SourceNotFound { path, source } => {
                CompressionError::SourceNotFound { path, source }
            }
            ArchiveError::DestinationUnwritable { path, source } => {
                CompressionError::DestinationUnwritable { path, source }
            }
            ArchiveError::IoFailureMidWrite { written, source } => {
                CompressionError::IoFailureMidWrite { written, source }
            }
        }
    }
}
