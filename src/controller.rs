use std::path::Path;

use tracing::{info, warn};

use crate::error::{ArchiveError, CompressionError};
use crate::formats::is_supported;
use crate::models::{CompressedArchive, CompressionJob, SelectedFile};
use crate::progress::ProgressReporter;
use crate::settings::CompressionSettings;
use crate::writer::ArchiveWriter;

pub type CompressionResult = Result<CompressedArchive, CompressionError>;

/// Validates selections, drives the [`ArchiveWriter`] and translates its
/// failures. Holds at most one selection and one job at a time.
pub struct CompressionController {
    writer: ArchiveWriter,
    selected: Option<SelectedFile>,
    last_job: Option<CompressionJob>,
}

impl Default for CompressionController {
    fn default() -> Self {
        Self::new(&CompressionSettings::default())
    }
}

impl CompressionController {
    pub fn new(settings: &CompressionSettings) -> Self {
        Self {
            writer: ArchiveWriter::new(settings),
            selected: None,
            last_job: None,
        }
    }

    /// Records `path` as the current selection. Only the extension is checked;
    /// existence is left to the write.
    pub fn select_file(&mut self, path: &Path) -> Result<SelectedFile, CompressionError> {
        if path.as_os_str().is_empty() {
            return Err(CompressionError::InvalidSelection);
        }
        if !is_supported(path) {
            warn!("Rejected unsupported file: {:?}", path);
            return Err(CompressionError::UnsupportedFileType {
                path: path.to_path_buf(),
            });
        }

        let selected = SelectedFile::new(path);
        info!("Selected {:?} ({})", path, selected.category().label());
        self.selected = Some(selected.clone());
        Ok(selected)
    }

    #[cfg(test)]
    pub fn selected(&self) -> Option<&SelectedFile> {
        self.selected.as_ref()
    }

    /// Compresses the current selection. The selection is discarded afterwards,
    /// whatever the outcome.
    pub fn compress_selected(
        &mut self,
        destination: &Path,
        progress: &mut dyn ProgressReporter,
    ) -> CompressionResult {
        match self.selected.take() {
            Some(selected) => self.compress(selected.path(), destination, progress),
            None => {
                let mut job = CompressionJob::new(Path::new(""), destination);
                let err = CompressionError::InvalidSelection;
                job.fail(err.to_string());
                self.last_job = Some(job);
                Err(err)
            }
        }
    }

    pub fn compress(
        &mut self,
        source: &Path,
        destination: &Path,
        progress: &mut dyn ProgressReporter,
    ) -> CompressionResult {
        self.compress_with(source, destination, progress, |writer, tracked| {
            writer.write(source, destination, tracked)
        })
    }

    /// Runs one job, handing the actual archive write to `write`.
    fn compress_with<W>(
        &mut self,
        source: &Path,
        destination: &Path,
        progress: &mut dyn ProgressReporter,
        write: W,
    ) -> CompressionResult
    where
        W: FnOnce(&ArchiveWriter, &mut dyn ProgressReporter) -> Result<CompressedArchive, ArchiveError>,
    {
        let mut job = CompressionJob::new(source, destination);
        let result = self.run(&mut job, progress, write);

        match &result {
            Ok(archive) => {
                job.succeed();
                info!("Compressed {:?} into {:?}", source, archive.destination);
            }
            Err(e) => {
                warn!("Compression of {:?} failed: {}", source, e);
                job.fail(e.to_string());
            }
        }

        self.last_job = Some(job);
        result
    }

    /// The job from the most recent attempt, handed over to the caller.
    pub fn take_last_job(&mut self) -> Option<CompressionJob> {
        self.last_job.take()
    }

    fn run<W>(
        &self,
        job: &mut CompressionJob,
        progress: &mut dyn ProgressReporter,
        write: W,
    ) -> CompressionResult
    where
        W: FnOnce(&ArchiveWriter, &mut dyn ProgressReporter) -> Result<CompressedArchive, ArchiveError>,
    {
        let source = job.source().to_path_buf();
        let destination = job.destination().to_path_buf();

        if source.as_os_str().is_empty() {
            return Err(CompressionError::InvalidSelection);
        }
        if !is_supported(&source) {
            return Err(CompressionError::UnsupportedFileType { path: source });
        }

        job.start();
        let mut tracked = JobProgress { job, sink: progress };
        Ok(write(&self.writer, &mut tracked)?)
    }
}

/// Forwards writer updates to the caller's reporter while recording them on
/// the job. Updates after the job turns terminal are dropped.
struct JobProgress<'a, P: ProgressReporter + ?Sized> {
    job: &'a mut CompressionJob,
    sink: &'a mut P,
}

impl<P: ProgressReporter + ?Sized> ProgressReporter for JobProgress<'_, P> {
    fn report(&mut self, fraction: f32) {
        if self.job.status().is_terminal() {
            return;
        }
        let fraction = self.job.record_progress(fraction);
        self.sink.report(fraction);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::JobStatus;
    use crate::progress::NoopProgress;
    use std::fs::{self, File};
    use std::io::{self, Cursor, Read};
    use tempfile::TempDir;
    use zip::ZipArchive;

    fn controller() -> CompressionController {
        CompressionController::new(
            &CompressionSettings::default()
                .with_chunk_size(8)
                .with_progress_step(0.0),
        )
    }

    #[test]
    fn test_compress_photo() {
        let temp = TempDir::new().unwrap();
        let source = temp.path().join("photo.jpg");
        let destination = temp.path().join("out.zip");
        fs::write(&source, b"abc").unwrap();

        let mut controller = controller();
        let archive = controller.compress(&source, &destination, &mut NoopProgress).unwrap();
        assert_eq!(archive.destination, destination);

        let mut zip = ZipArchive::new(File::open(&destination).unwrap()).unwrap();
        assert_eq!(zip.len(), 1);
        let mut entry = zip.by_index(0).unwrap();
        let mut data = String::new();
        entry.read_to_string(&mut data).unwrap();
        assert_eq!(entry.name(), "photo.jpg");
        assert_eq!(data, "abc");

        let job = controller.take_last_job().unwrap();
        assert_eq!(job.status(), JobStatus::Succeeded);
        assert_eq!(job.progress(), 1.0);
        assert!(controller.take_last_job().is_none());
    }

    #[test]
    fn test_unsupported_type_touches_nothing() {
        let temp = TempDir::new().unwrap();
        let source = temp.path().join("notes.exe");
        let destination = temp.path().join("out.zip");
        fs::write(&source, b"MZ").unwrap();

        let mut calls = 0;
        let mut reporter = |_: f32| calls += 1;
        let mut controller = controller();
        let result = controller.compress(&source, &destination, &mut reporter);

        assert!(matches!(result, Err(CompressionError::UnsupportedFileType { .. })));
        assert!(!destination.exists());
        assert_eq!(calls, 0);

        let job = controller.take_last_job().unwrap();
        assert_eq!(job.status(), JobStatus::Failed);
        assert_eq!(job.progress(), 0.0);
    }

    #[test]
    fn test_missing_source() {
        let temp = TempDir::new().unwrap();
        let destination = temp.path().join("out.zip");

        let mut controller = controller();
        let result = controller.compress(&temp.path().join("missing.txt"), &destination, &mut NoopProgress);

        assert!(matches!(result, Err(CompressionError::SourceNotFound { .. })));
        assert!(!destination.exists());
        let job = controller.take_last_job().unwrap();
        assert_eq!(job.status(), JobStatus::Failed);
        assert!(job.error().is_some());
    }

    #[test]
    fn test_empty_source_path() {
        let mut controller = controller();
        let result = controller.compress(Path::new(""), Path::new("out.zip"), &mut NoopProgress);
        assert!(matches!(result, Err(CompressionError::InvalidSelection)));
        assert!(matches!(
            controller.select_file(Path::new("")),
            Err(CompressionError::InvalidSelection)
        ));
    }

    #[test]
    fn test_unwritable_destination() {
        let temp = TempDir::new().unwrap();
        let source = temp.path().join("song.mp3");
        fs::write(&source, b"ID3").unwrap();

        let mut controller = controller();
        let result = controller.compress(
            &source,
            &temp.path().join("missing").join("out.zip"),
            &mut NoopProgress,
        );
        assert!(matches!(result, Err(CompressionError::DestinationUnwritable { .. })));
    }

    #[test]
    fn test_progress_reaches_one_and_stops() {
        let temp = TempDir::new().unwrap();
        let source = temp.path().join("data.json");
        let destination = temp.path().join("data.zip");
        fs::write(&source, vec![b'x'; 200]).unwrap();

        let mut seen = Vec::new();
        let mut reporter = |fraction: f32| seen.push(fraction);
        let mut controller = controller();
        controller.compress(&source, &destination, &mut reporter).unwrap();

        assert!(seen.windows(2).all(|w| w[0] <= w[1]));
        assert_eq!(seen.last().copied(), Some(1.0));
    }

    #[test]
    fn test_failure_mid_write_fails_job() {
        let temp = TempDir::new().unwrap();
        let source = temp.path().join("data.txt");
        let destination = temp.path().join("data.zip");

        let reader = Cursor::new(vec![b'x'; 64]).chain(ErrorAfter);
        let mut seen = Vec::new();
        let mut reporter = |fraction: f32| seen.push(fraction);
        let mut controller = controller();
        let result = controller.compress_with(&source, &destination, &mut reporter, |writer, tracked| {
            writer.write_stream(reader, 200, "data.txt", &destination, tracked)
        });

        assert!(matches!(
            result,
            Err(CompressionError::IoFailureMidWrite { written: 64, .. })
        ));
        assert!(!destination.exists());
        assert!(!seen.is_empty());
        assert!(!seen.contains(&1.0));

        let job = controller.take_last_job().unwrap();
        assert_eq!(job.status(), JobStatus::Failed);
        assert!(job.progress() < 1.0);
        assert!(job.progress() > 0.0);
        assert!(job.error().is_some());
    }

    struct ErrorAfter;

    impl Read for ErrorAfter {
        fn read(&mut self, _buf: &mut [u8]) -> io::Result<usize> {
            Err(io::Error::other("disk pulled"))
        }
    }

    #[test]
    fn test_job_progress_drops_updates_after_terminal() {
        let mut job = CompressionJob::new(Path::new("a.txt"), Path::new("a.zip"));
        job.start();
        let mut seen = Vec::new();
        let mut sink = |fraction: f32| seen.push(fraction);
        {
            let mut tracked = JobProgress { job: &mut job, sink: &mut sink };
            tracked.report(0.5);
            tracked.job.fail("boom");
            tracked.report(0.9);
        }
        assert_eq!(seen, vec![0.5]);
    }

    #[test]
    fn test_select_then_compress() {
        let temp = TempDir::new().unwrap();
        let source = temp.path().join("Clip.MP4");
        let destination = temp.path().join("clip.zip");
        fs::write(&source, b"\x00\x00\x00\x18ftyp").unwrap();

        let mut controller = controller();
        let selected = controller.select_file(&source).unwrap();
        assert_eq!(selected.file_name(), "Clip.MP4");
        assert!(controller.selected().is_some());

        controller.compress_selected(&destination, &mut NoopProgress).unwrap();
        assert!(destination.exists());
        assert!(controller.selected().is_none());

        let result = controller.compress_selected(&destination, &mut NoopProgress);
        assert!(matches!(result, Err(CompressionError::InvalidSelection)));
        assert_eq!(controller.take_last_job().map(|j| j.status()), Some(JobStatus::Failed));
    }

    #[test]
    fn test_select_unsupported_keeps_previous() {
        let mut controller = controller();
        controller.select_file(Path::new("/tmp/readme.md")).unwrap();
        let result = controller.select_file(Path::new("/tmp/setup.exe"));
        assert!(matches!(result, Err(CompressionError::UnsupportedFileType { .. })));
        assert_eq!(
            controller.selected().map(|s| s.file_name()),
            Some("readme.md".to_string())
        );
    }
}
