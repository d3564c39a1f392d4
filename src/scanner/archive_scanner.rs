use crate::config::ScanConfig;
use crate::error::{OszError, Result};
use crate::scanner::file_filter::FileFilter;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use walkdir::{DirEntry, WalkDir};

/// A beatmap archive discovered during a scan.
#[derive(Debug, Clone)]
pub struct ArchiveFile {
    pub source_path: PathBuf,
    pub relative_path: PathBuf,
    pub filename: String,
    pub size: u64,
}

impl ArchiveFile {
    pub fn new(source_path: PathBuf, relative_path: PathBuf, size: u64) -> Self {
        let filename = source_path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();

        Self {
            source_path,
            relative_path,
            filename,
            size,
        }
    }

    /// Archive file name with its final extension removed.
    pub fn song_name(&self) -> String {
        song_name_of(&self.source_path)
    }

    pub fn display_path(&self) -> String {
        self.relative_path.display().to_string()
    }
}

/// Beatmap name derived from an archive path: the file name minus its last extension.
pub fn song_name_of(archive_path: &Path) -> String {
    archive_path
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_default()
}

pub struct ArchiveScanner {
    filter: FileFilter,
    max_depth: Option<usize>,
    follow_links: bool,
}

impl ArchiveScanner {
    pub fn new(config: &ScanConfig) -> Self {
        Self {
            filter: FileFilter::new(config),
            max_depth: config.max_depth,
            follow_links: config.follow_links,
        }
    }

    /// Collect every archive under `root`. An empty result is not an error.
    pub fn scan_directory<P: AsRef<Path>>(&self, root: P) -> Result<Vec<ArchiveFile>> {
        let mut archives = Vec::new();
        self.for_each_archive(root, |archive| archives.push(archive))?;
        Ok(archives)
    }

    /// Walk `root` and hand each archive to `visit` as soon as it is found.
    ///
    /// Entries that cannot be read are logged and skipped; returns the number
    /// of skipped entries.
    pub fn for_each_archive<P, F>(&self, root: P, mut visit: F) -> Result<usize>
    where
        P: AsRef<Path>,
        F: FnMut(ArchiveFile),
    {
        let root_path = root.as_ref();

        if !root_path.exists() {
            return Err(OszError::InvalidPath {
                path: root_path.display().to_string(),
            });
        }

        if !root_path.is_dir() {
            return Err(OszError::InvalidPath {
                path: format!("{} is not a directory", root_path.display()),
            });
        }

        let mut walker = WalkDir::new(root_path).follow_links(self.follow_links);
        if let Some(max_depth) = self.max_depth {
            walker = walker.max_depth(max_depth);
        }

        let walker = walker
            .into_iter()
            .filter_entry(|e| self.should_traverse(e));

        let mut skipped = 0;

        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(err) => {
                    warn!(error = %err, "skipping unreadable entry");
                    skipped += 1;
                    continue;
                }
            };

            if !entry.file_type().is_file() || !self.filter.is_archive_file(entry.path()) {
                continue;
            }

            let size = entry.metadata().map(|m| m.len()).unwrap_or(0);
            let relative_path = entry
                .path()
                .strip_prefix(root_path)
                .unwrap_or(entry.path())
                .to_path_buf();

            debug!(path = %entry.path().display(), size, "found archive");
            visit(ArchiveFile::new(entry.path().to_path_buf(), relative_path, size));
        }

        Ok(skipped)
    }

    fn should_traverse(&self, entry: &DirEntry) -> bool {
        if entry.depth() == 0 || !entry.file_type().is_dir() {
            return true;
        }

        self.filter.should_traverse_directory(entry.path())
    }

    pub fn get_statistics(&self, archives: &[ArchiveFile]) -> ScanStatistics {
        let (largest_file_size, largest_file_path) = archives
            .iter()
            .max_by_key(|a| a.size)
            .map(|a| (a.size, a.relative_path.clone()))
            .unwrap_or((0, PathBuf::new()));

        ScanStatistics {
            total_archives: archives.len(),
            total_size: archives.iter().map(|a| a.size).sum(),
            largest_file_size,
            largest_file_path,
        }
    }
}

#[derive(Debug, Default)]
pub struct ScanStatistics {
    pub total_archives: usize,
    pub total_size: u64,
    pub largest_file_size: u64,
    pub largest_file_path: PathBuf,
}

impl ScanStatistics {
    pub fn display_summary(&self) -> String {
        let mut summary = format!(
            "Scan Results:\n  Archives: {}\n  Total size: {}\n",
            self.total_archives,
            format_bytes(self.total_size)
        );

        if self.largest_file_size > 0 {
            summary.push_str(&format!(
                "  Largest archive: {} ({})\n",
                self.largest_file_path.display(),
                format_bytes(self.largest_file_size)
            ));
        }

        summary
    }
}

fn format_bytes(bytes: u64) -> String {
    const UNITS: &[&str] = &["B", "KB", "MB", "GB"];
    let mut size = bytes as f64;
    let mut unit_index = 0;

    while size >= 1024.0 && unit_index < UNITS.len() - 1 {
        size /= 1024.0;
        unit_index += 1;
    }

    if unit_index == 0 {
        format!("{} {}", bytes, UNITS[unit_index])
    } else {
        format!("{:.1} {}", size, UNITS[unit_index])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn create_test_config() -> ScanConfig {
        ScanConfig {
            max_depth: Some(8),
            follow_links: false,
            exclude_dirs: vec!["skip".to_string()],
        }
    }

    #[test]
    fn test_song_name_derivation() {
        assert_eq!(song_name_of(Path::new("input/song1.osz")), "song1");
        assert_eq!(
            song_name_of(Path::new("123 Artist - Title (Mapper).OSZ")),
            "123 Artist - Title (Mapper)"
        );
        assert_eq!(song_name_of(Path::new("a.b.osz")), "a.b");

        let archive = ArchiveFile::new(PathBuf::from("x/y/z.osz"), PathBuf::from("y/z.osz"), 3);
        assert_eq!(archive.filename, "z.osz");
        assert_eq!(archive.song_name(), "z");
    }

    #[test]
    fn test_scan_finds_nested_archives_only() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();

        fs::create_dir_all(root.join("pack/deeper")).unwrap();
        fs::write(root.join("one.osz"), b"x").unwrap();
        fs::write(root.join("pack/two.OSZ"), b"xy").unwrap();
        fs::write(root.join("pack/deeper/three.osz"), b"xyz").unwrap();
        fs::write(root.join("readme.txt"), b"not an archive").unwrap();
        fs::write(root.join("pack/cover.jpg"), b"jpg").unwrap();

        let scanner = ArchiveScanner::new(&create_test_config());
        let archives = scanner.scan_directory(root).unwrap();

        let mut names: Vec<_> = archives.iter().map(|a| a.filename.clone()).collect();
        names.sort();
        assert_eq!(names, vec!["one.osz", "three.osz", "two.OSZ"]);

        let stats = scanner.get_statistics(&archives);
        assert_eq!(stats.total_archives, 3);
        assert_eq!(stats.total_size, 6);
        assert_eq!(stats.largest_file_size, 3);
    }

    #[test]
    fn test_scan_skips_excluded_directories() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();

        fs::create_dir_all(root.join("Skip")).unwrap();
        fs::write(root.join("Skip/hidden.osz"), b"x").unwrap();
        fs::write(root.join("kept.osz"), b"x").unwrap();

        let scanner = ArchiveScanner::new(&create_test_config());
        let archives = scanner.scan_directory(root).unwrap();

        assert_eq!(archives.len(), 1);
        assert_eq!(archives[0].filename, "kept.osz");
    }

    #[test]
    fn test_empty_directory_is_not_an_error() {
        let temp_dir = TempDir::new().unwrap();
        let scanner = ArchiveScanner::new(&create_test_config());

        let archives = scanner.scan_directory(temp_dir.path()).unwrap();
        assert!(archives.is_empty());
    }

    #[test]
    fn test_missing_root_is_rejected() {
        let temp_dir = TempDir::new().unwrap();
        let scanner = ArchiveScanner::new(&create_test_config());

        let result = scanner.scan_directory(temp_dir.path().join("missing"));
        assert!(matches!(result, Err(OszError::InvalidPath { .. })));

        let file = temp_dir.path().join("file.osz");
        fs::write(&file, b"x").unwrap();
        assert!(scanner.scan_directory(&file).is_err());
    }

    #[test]
    fn test_max_depth_is_opt_in() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        fs::create_dir_all(root.join("a/b/c")).unwrap();
        fs::write(root.join("top.osz"), b"x").unwrap();
        fs::write(root.join("a/b/c/deep.osz"), b"x").unwrap();

        let unlimited = ArchiveScanner::new(&ScanConfig::default());
        assert_eq!(unlimited.scan_directory(root).unwrap().len(), 2);

        let shallow = ScanConfig {
            max_depth: Some(2),
            ..ScanConfig::default()
        };
        let archives = ArchiveScanner::new(&shallow).scan_directory(root).unwrap();
        assert_eq!(archives.len(), 1);
        assert_eq!(archives[0].filename, "top.osz");
    }

    #[cfg(unix)]
    #[test]
    fn test_unreadable_directory_is_skipped_and_counted() {
        use std::os::unix::fs::PermissionsExt;

        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        let locked = root.join("locked");
        fs::create_dir(&locked).unwrap();
        fs::write(locked.join("hidden.osz"), b"x").unwrap();
        fs::write(root.join("open.osz"), b"x").unwrap();

        fs::set_permissions(&locked, fs::Permissions::from_mode(0o000)).unwrap();
        if fs::read_dir(&locked).is_ok() {
            // Running with privileges that ignore directory permissions.
            fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();
            return;
        }

        let scanner = ArchiveScanner::new(&create_test_config());
        let mut found = Vec::new();
        let skipped = scanner
            .for_each_archive(root, |archive| found.push(archive.filename))
            .unwrap();

        fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();

        assert_eq!(skipped, 1);
        assert_eq!(found, vec!["open.osz"]);
    }

    #[test]
    fn test_format_bytes() {
        assert_eq!(format_bytes(500), "500 B");
        assert_eq!(format_bytes(1024), "1.0 KB");
        assert_eq!(format_bytes(1048576), "1.0 MB");
    }
}
