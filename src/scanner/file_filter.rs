use crate::config::ScanConfig;
use std::path::Path;

/// File-name suffix identifying a beatmap archive, compared case-insensitively.
pub const ARCHIVE_SUFFIX: &str = ".osz";

/// Extension of the only audio type pulled out of archives.
pub const AUDIO_EXTENSION: &str = "mp3";

pub struct FileFilter {
    exclude_dirs: Vec<String>,
}

impl FileFilter {
    pub fn new(config: &ScanConfig) -> Self {
        Self {
            exclude_dirs: config
                .exclude_dirs
                .iter()
                .map(|d| d.to_lowercase())
                .collect(),
        }
    }

    pub fn is_archive_file(&self, path: &Path) -> bool {
        path.file_name()
            .map(|name| name.to_string_lossy().to_lowercase().ends_with(ARCHIVE_SUFFIX))
            .unwrap_or(false)
    }

    pub fn should_traverse_directory(&self, path: &Path) -> bool {
        match path.file_name().and_then(|s| s.to_str()) {
            Some(dir_name) => {
                let dir_name_lower = dir_name.to_lowercase();
                !self.exclude_dirs.iter().any(|d| *d == dir_name_lower)
            }
            None => true,
        }
    }
}

/// True when an archive entry name carries the audio extension.
///
/// Directory entries never qualify, and a bare `.mp3` has no extension.
pub fn is_audio_entry(entry_name: &str) -> bool {
    if entry_name.ends_with('/') || entry_name.ends_with('\\') {
        return false;
    }

    Path::new(entry_name)
        .extension()
        .map(|ext| ext.to_string_lossy().to_lowercase() == AUDIO_EXTENSION)
        .unwrap_or(false)
}
