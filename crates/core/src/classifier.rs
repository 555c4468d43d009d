use std::fs::FileType;
use std::path::Path;

/// Extensions of formats that may carry an embedded capture time.
pub const DEFAULT_EXTENSIONS: &[&str] = &[
    "heic", "heif", "jpg", "jpeg", "tif", "tiff", "png", "webp", "wav",
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtensionClassifier {
    extensions: Vec<String>,
}

impl Default for ExtensionClassifier {
    fn default() -> Self {
        Self::new(DEFAULT_EXTENSIONS.iter().copied())
    }
}

impl ExtensionClassifier {
    /// Entries may be given with or without the leading dot, in any case.
    pub fn new<I, S>(extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut extensions: Vec<String> = extensions
            .into_iter()
            .map(|ext| ext.as_ref().trim().trim_start_matches('.').to_ascii_lowercase())
            .filter(|ext| !ext.is_empty())
            .collect();
        extensions.sort();
        extensions.dedup();
        Self { extensions }
    }

    pub fn extensions(&self) -> &[String] {
        &self.extensions
    }

    pub fn is_candidate(&self, path: &Path, file_type: FileType) -> bool {
        if !file_type.is_file() {
            return false;
        }
        lower_case_extension(path)
            .map(|ext| self.extensions.iter().any(|allowed| *allowed == ext))
            .unwrap_or(false)
    }
}

pub fn lower_case_extension(path: &Path) -> Option<String> {
    path.extension()
        .map(|ext| ext.to_string_lossy().to_ascii_lowercase())
}
