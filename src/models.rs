use std::path::{Path, PathBuf};

use zip::CompressionMethod;

use crate::formats::category_of;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FileCategory {
    Image,
    Document,
    Audio,
    Video,
    Archive,
    Unsupported,
}

impl FileCategory {
    pub fn label(&self) -> &'static str {
        match self {
            FileCategory::Image => "Images",
            FileCategory::Document => "Documents",
            FileCategory::Audio => "Audio",
            FileCategory::Video => "Video",
            FileCategory::Archive => "Archives",
            FileCategory::Unsupported => "Unsupported",
        }
    }
}

/// A file the user picked. Immutable once created.
#[derive(Clone, Debug)]
pub struct SelectedFile {
    path: PathBuf,
    category: FileCategory,
}

impl SelectedFile {
    pub fn new(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
            category: category_of(path),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn category(&self) -> FileCategory {
        self.category
    }

    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .unwrap_or_default()
            .to_string_lossy()
            .into_owned()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum JobStatus {
    Pending,
    InProgress,
    Succeeded,
    Failed,
}

impl JobStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, JobStatus::Succeeded | JobStatus::Failed)
    }
}

/// Tracks one compress attempt.
///
/// Transitions are one-way: Pending -> InProgress -> Succeeded | Failed, or
/// Pending -> Failed when the attempt is rejected before any write. Once
/// terminal, the job ignores further updates.
#[derive(Clone, Debug)]
pub struct CompressionJob {
    source: PathBuf,
    destination: PathBuf,
    status: JobStatus,
    progress: f32,
    error: Option<String>,
}

impl CompressionJob {
    pub fn new(source: &Path, destination: &Path) -> Self {
        Self {
            source: source.to_path_buf(),
            destination: destination.to_path_buf(),
            status: JobStatus::Pending,
            progress: 0.0,
            error: None,
        }
    }

    pub fn source(&self) -> &Path {
        &self.source
    }

    pub fn destination(&self) -> &Path {
        &self.destination
    }

    pub fn status(&self) -> JobStatus {
        self.status
    }

    pub fn progress(&self) -> f32 {
        self.progress
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn start(&mut self) {
        if self.status == JobStatus::Pending {
            self.status = JobStatus::InProgress;
        }
    }

    /// Records a progress fraction, keeping the stored value non-decreasing and
    /// within 0.0..=1.0. Returns the value now held.
    pub fn record_progress(&mut self, fraction: f32) -> f32 {
        if self.status.is_terminal() {
            return self.progress;
        }
        self.start();
        let fraction = if fraction.is_nan() { 0.0 } else { fraction.clamp(0.0, 1.0) };
        if fraction > self.progress {
            self.progress = fraction;
        }
        self.progress
    }

    pub fn succeed(&mut self) {
        if self.status == JobStatus::InProgress {
            self.progress = 1.0;
            self.status = JobStatus::Succeeded;
        }
    }

    pub fn fail(&mut self, detail: impl Into<String>) {
        if !self.status.is_terminal() {
            self.status = JobStatus::Failed;
            self.error = Some(detail.into());
        }
    }
}

/// The single record stored in the archive.
#[derive(Clone, Debug, PartialEq)]
pub struct ArchiveEntry {
    pub name: String,
    pub uncompressed_size: u64,
    pub method: CompressionMethod,
}

/// What a successful write leaves behind.
#[derive(Clone, Debug)]
pub struct CompressedArchive {
    pub destination: PathBuf,
    pub entry: ArchiveEntry,
    pub compressed_size: u64,
}
