use std::path::{Path, PathBuf};
use std::time::Duration;

pub fn get_formatted_size(size: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if size >= GB {
        format!("{:.2} GB", size as f64 / GB as f64)
    } else if size >= MB {
        format!("{:.2} MB", size as f64 / MB as f64)
    } else if size >= KB {
        format!("{:.2} KB", size as f64 / KB as f64)
    } else {
        format!("{} B", size)
    }
}

/// `photo.jpg` -> `photo.jpg.zip`
pub fn default_archive_name(source: &Path) -> String {
    let name = source
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| "archive".to_string());
    format!("{}.zip", name)
}

/// Appends `.zip` when the save dialog hands back a name without an extension.
pub fn ensure_zip_extension(path: PathBuf) -> PathBuf {
    if path.extension().is_some() {
        path
    } else {
        path.with_extension("zip")
    }
}

/// Remaining time extrapolated from elapsed time and the fraction done so far.
pub fn estimate_remaining(elapsed: Duration, fraction: f32) -> Option<Duration> {
    if fraction <= 0.0 || fraction >= 1.0 {
        return None;
    }
    let total = elapsed.as_secs_f32() / fraction;
    Some(Duration::from_secs_f32((total - elapsed.as_secs_f32()).max(0.0)))
}
