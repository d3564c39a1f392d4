pub mod archive_scanner;
pub mod file_filter;

pub use archive_scanner::{ArchiveFile, ArchiveScanner, ScanStatistics};
pub use file_filter::{is_audio_entry, FileFilter, ARCHIVE_SUFFIX, AUDIO_EXTENSION};
