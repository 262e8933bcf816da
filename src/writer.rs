use std::fs::{self, File};
use std::io::{self, BufReader, BufWriter, ErrorKind, Read, Write};
use std::path::Path;

use tempfile::NamedTempFile;
use tracing::{debug, info, warn};
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::error::ArchiveError;
use crate::models::{ArchiveEntry, CompressedArchive};
use crate::progress::{ProgressReporter, Throttle};
use crate::settings::{CompressionSettings, DEFLATE_LEVEL};

const TEMP_SUFFIX: &str = ".zip.part";

/// Writes a single file into a new ZIP archive.
///
/// The archive is assembled in a temporary file next to the destination and
/// renamed over it only once it is complete, so the destination path never
/// holds a truncated archive. On failure the temporary file is removed.
pub struct ArchiveWriter {
    chunk_size: usize,
    progress_step: f32,
}

impl ArchiveWriter {
    pub fn new(settings: &CompressionSettings) -> Self {
        Self {
            chunk_size: settings.chunk_size.max(1),
            progress_step: settings.progress_step,
        }
    }

    pub fn write(
        &self,
        source: &Path,
        destination: &Path,
        progress: &mut dyn ProgressReporter,
    ) -> Result<CompressedArchive, ArchiveError> {
        let not_found = |source_err| ArchiveError::SourceNotFound {
            path: source.to_path_buf(),
            source: source_err,
        };

        let file = File::open(source).map_err(not_found)?;
        let metadata = file.metadata().map_err(not_found)?;
        if !metadata.is_file() {
            return Err(not_found(io::Error::new(
                ErrorKind::InvalidInput,
                "not a regular file",
            )));
        }

        let entry_name = source
            .file_name()
            .unwrap_or_default()
            .to_string_lossy()
            .into_owned();

        let reader = BufReader::with_capacity(self.chunk_size, file);
        self.write_stream(reader, metadata.len(), &entry_name, destination, progress)
    }

    /// Streams `reader` into an entry named `entry_name`. `total_size` is only
    /// used to compute progress fractions.
    pub(crate) fn write_stream<R: Read>(
        &self,
        mut reader: R,
        total_size: u64,
        entry_name: &str,
        destination: &Path,
        progress: &mut dyn ProgressReporter,
    ) -> Result<CompressedArchive, ArchiveError> {
        let mut temp = temp_file_beside(destination)?;
        debug!("Staging archive at {:?}", temp.path());

        let written = match self.stream_entry(
            &mut reader,
            total_size,
            entry_name,
            temp.as_file_mut(),
            progress,
        ) {
            Ok(written) => written,
            Err(e) => {
                warn!("Discarding partial archive {:?}: {}", temp.path(), e);
                return Err(e);
            }
        };

        temp.as_file()
            .sync_all()
            .map_err(|source| ArchiveError::IoFailureMidWrite { written, source })?;

        keep_existing_permissions(temp.as_file(), destination);

        let file = temp
            .persist(destination)
            .map_err(|e| ArchiveError::DestinationUnwritable {
                path: destination.to_path_buf(),
                source: e.error,
            })?;

        let compressed_size = match file.metadata() {
            Ok(meta) => meta.len(),
            Err(e) => {
                warn!("Could not stat {:?}: {}", destination, e);
                0
            }
        };

        info!(
            "Wrote {:?} ({} bytes -> {} bytes)",
            destination, written, compressed_size
        );
        progress.report(1.0);

        Ok(CompressedArchive {
            destination: destination.to_path_buf(),
            entry: ArchiveEntry {
                name: entry_name.to_string(),
                uncompressed_size: written,
                method: CompressionMethod::Deflated,
            },
            compressed_size,
        })
    }

    fn stream_entry<R: Read>(
        &self,
        reader: &mut R,
        total_size: u64,
        entry_name: &str,
        out: &mut File,
        progress: &mut dyn ProgressReporter,
    ) -> Result<u64, ArchiveError> {
        let mut zip = ZipWriter::new(BufWriter::new(out));
        let options: FileOptions<'_, ()> = FileOptions::default()
            .compression_method(CompressionMethod::Deflated)
            .compression_level(Some(DEFLATE_LEVEL))
            .large_file(total_size >= u32::MAX as u64)
            .unix_permissions(0o644);

        let mut written = 0u64;
        zip.start_file(entry_name, options)
            .map_err(|e| mid_write(written, io::Error::other(e)))?;

        let mut throttle = Throttle::new(self.progress_step);
        if throttle.should_report(0.0) {
            progress.report(0.0);
        }

        let mut buffer = vec![0u8; self.chunk_size];
        loop {
            let n = match reader.read(&mut buffer) {
                Ok(0) => break,
                Ok(n) => n,
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(mid_write(written, e)),
            };
            zip.write_all(&buffer[..n])
                .map_err(|e| mid_write(written, e))?;
            written += n as u64;

            // 1.0 is held back until the archive is renamed into place
            if total_size > 0 {
                let fraction = (written as f64 / total_size as f64) as f32;
                if fraction < 1.0 && throttle.should_report(fraction) {
                    progress.report(fraction);
                }
            }
        }

        let mut buffered = zip
            .finish()
            .map_err(|e| mid_write(written, io::Error::other(e)))?;
        buffered.flush().map_err(|e| mid_write(written, e))?;

        Ok(written)
    }
}

fn mid_write(written: u64, source: io::Error) -> ArchiveError {
    ArchiveError::IoFailureMidWrite { written, source }
}

fn temp_file_beside(destination: &Path) -> Result<NamedTempFile, ArchiveError> {
    let unwritable = |source| ArchiveError::DestinationUnwritable {
        path: destination.to_path_buf(),
        source,
    };

    if destination.as_os_str().is_empty() || destination.is_dir() {
        return Err(unwritable(io::Error::new(
            ErrorKind::InvalidInput,
            "destination is not a file path",
        )));
    }

    let parent = match destination.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut builder = tempfile::Builder::new();
    builder.prefix(".").suffix(TEMP_SUFFIX);
    // same mode File::create would give, so the umask applies instead of 0600
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        builder.permissions(fs::Permissions::from_mode(0o666));
    }
    builder.tempfile_in(parent).map_err(unwritable)
}

/// An archive being replaced keeps the permissions it had.
fn keep_existing_permissions(staged: &File, destination: &Path) {
    let Ok(existing) = fs::metadata(destination) else {
        return;
    };
    if let Err(e) = staged.set_permissions(existing.permissions()) {
        warn!("Could not copy permissions of {:?}: {}", destination, e);
    }
}
