use std::path::Path;

use crate::models::FileCategory;

/// Extensions accepted for compression, grouped the way the formats panel shows them.
pub const SUPPORTED_FORMATS: &[(FileCategory, &[&str])] = &[
    (FileCategory::Image, &["jpg", "jpeg", "png"]),
    (FileCategory::Document, &["txt", "md", "json", "pdf"]),
    (FileCategory::Archive, &["zip"]),
    (FileCategory::Video, &["mp4"]),
    (FileCategory::Audio, &["mp3", "wav"]),
];

/// Looks up the category of a path from its extension alone. Never touches the filesystem.
pub fn category_of(path: &Path) -> FileCategory {
    let Some(extension) = path.extension().and_then(|ext| ext.to_str()) else {
        return FileCategory::Unsupported;
    };
    let extension = extension.to_ascii_lowercase();

    SUPPORTED_FORMATS
        .iter()
        .find(|(_, extensions)| extensions.contains(&extension.as_str()))
        .map(|(category, _)| *category)
        .unwrap_or(FileCategory::Unsupported)
}

pub fn is_supported(path: &Path) -> bool {
    category_of(path) != FileCategory::Unsupported
}

pub fn all_extensions() -> Vec<&'static str> {
    SUPPORTED_FORMATS
        .iter()
        .flat_map(|(_, extensions)| extensions.iter().copied())
        .collect()
}

/// Filters for the open dialog: everything supported first, then one per category,
/// then an escape hatch.
pub fn dialog_filters() -> Vec<(String, Vec<&'static str>)> {
    let mut filters = vec![("All supported files".to_string(), all_extensions())];
    filters.extend(
        SUPPORTED_FORMATS
            .iter()
            .map(|(category, extensions)| (category.label().to_string(), extensions.to_vec())),
    );
    filters.push(("All files".to_string(), vec!["*"]));
    filters
}

/// "Images: JPG, JPEG, PNG"
pub fn describe_category(category: FileCategory, extensions: &[&str]) -> String {
    let upper: Vec<String> = extensions.iter().map(|ext| ext.to_ascii_uppercase()).collect();
    format!("{}: {}", category.label(), upper.join(", "))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_supported_extensions_any_case() {
        for ext in all_extensions() {
            let lower = format!("file.{}", ext);
            let upper = format!("FILE.{}", ext.to_ascii_uppercase());
            assert!(is_supported(Path::new(&lower)), "{} should be supported", lower);
            assert!(is_supported(Path::new(&upper)), "{} should be supported", upper);
        }
        assert!(is_supported(Path::new("/home/user/Photo.JpEg")));
    }

    #[test]
    fn test_unsupported_extensions() {
        assert!(!is_supported(Path::new("notes.exe")));
        assert!(!is_supported(Path::new("archive.7z")));
        assert!(!is_supported(Path::new("noextension")));
        assert!(!is_supported(Path::new(".jpg")));
        assert!(!is_supported(Path::new("trailing.")));
        assert!(!is_supported(Path::new("")));
        assert!(!is_supported(Path::new("photo.jpg.bak")));
    }

    #[test]
    fn test_category_of() {
        assert_eq!(category_of(Path::new("a.png")), FileCategory::Image);
        assert_eq!(category_of(Path::new("a.MD")), FileCategory::Document);
        assert_eq!(category_of(Path::new("a.wav")), FileCategory::Audio);
        assert_eq!(category_of(Path::new("a.mp4")), FileCategory::Video);
        assert_eq!(category_of(Path::new("a.zip")), FileCategory::Archive);
        assert_eq!(category_of(Path::new("a.rar")), FileCategory::Unsupported);
    }

    #[test]
    fn test_allow_list_is_exact() {
        let mut extensions = all_extensions();
        extensions.sort_unstable();
        assert_eq!(
            extensions,
            vec!["jpeg", "jpg", "json", "md", "mp3", "mp4", "pdf", "png", "txt", "wav", "zip"]
        );
    }

    #[test]
    fn test_dialog_filters() {
        let filters = dialog_filters();
        assert_eq!(filters.len(), SUPPORTED_FORMATS.len() + 2);
        assert_eq!(filters[0].0, "All supported files");
        assert_eq!(filters[0].1.len(), 11);
        assert_eq!(filters.last().map(|(name, _)| name.as_str()), Some("All files"));
    }

    #[test]
    fn test_describe_category() {
        assert_eq!(
            describe_category(FileCategory::Image, &["jpg", "jpeg", "png"]),
            "Images: JPG, JPEG, PNG"
        );
    }
}
