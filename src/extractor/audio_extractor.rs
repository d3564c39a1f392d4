use crate::error::{OszError, Result};
use crate::extractor::placement::{is_same_dir, remove_empty_parents, replace_file};
use crate::scanner::archive_scanner::song_name_of;
use crate::scanner::file_filter::is_audio_entry;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use zip::ZipArchive;

/// Result of running the extractor over one archive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ArchiveOutcome {
    /// Audio was written; paths are the final files under the output root.
    Extracted { files: Vec<PathBuf> },
    /// The archive opened fine but holds no `.mp3` entry.
    NoAudio,
    /// The archive could not be opened or an entry could not be written.
    Failed { reason: String },
}

impl ArchiveOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, ArchiveOutcome::Extracted { .. })
    }
}

/// A qualifying entry, captured before any extraction starts.
#[derive(Debug, Clone)]
struct AudioEntry {
    index: usize,
    name: String,
    relative_path: PathBuf,
    extension: String,
}

pub struct AudioExtractor {
    buffer_size: usize,
}

impl AudioExtractor {
    pub fn new() -> Self {
        Self {
            buffer_size: 64 * 1024, // 64KB buffer
        }
    }

    /// Extract every `.mp3` of `archive_path` into `output_dir`, renamed after
    /// the archive. Returns `false` when the archive is unreadable or holds no
    /// audio; errors are logged here and never escape.
    pub fn extract(&self, archive_path: &Path, output_dir: &Path) -> bool {
        self.extract_archive(archive_path, output_dir).is_success()
    }

    pub fn extract_archive(&self, archive_path: &Path, output_dir: &Path) -> ArchiveOutcome {
        let archive_name = display_name(archive_path);

        match self.try_extract(archive_path, output_dir) {
            Ok(files) => ArchiveOutcome::Extracted { files },
            Err(OszError::NoAudioFound { .. }) => {
                info!(archive = %archive_name, "no audio found");
                ArchiveOutcome::NoAudio
            }
            Err(e) => {
                debug!(archive = %archive_name, error = %e, "failed to process archive");
                ArchiveOutcome::Failed {
                    reason: e.to_string(),
                }
            }
        }
    }

    /// Fallible core of [`extract_archive`](Self::extract_archive).
    pub fn try_extract(&self, archive_path: &Path, output_dir: &Path) -> Result<Vec<PathBuf>> {
        let song_name = song_name_of(archive_path);

        let file = fs::File::open(archive_path)?;
        let mut archive = ZipArchive::new(file)?;

        let (entries, unsafe_entries) = Self::select_audio_entries(&mut archive)?;
        if entries.is_empty() {
            if let Some(entry) = unsafe_entries.into_iter().next() {
                return Err(OszError::UnsafeEntry { entry });
            }
            return Err(OszError::NoAudioFound {
                archive: display_name(archive_path),
            });
        }

        debug!(
            archive = %archive_path.display(),
            count = entries.len(),
            "selected audio entries"
        );

        let mut placed = Vec::with_capacity(entries.len());

        for entry in &entries {
            let extracted = self.extract_entry(&mut archive, entry, output_dir)?;
            let target = output_dir.join(format!("{}.{}", song_name, entry.extension));
            let final_path = Self::place_extracted(&extracted, &target, output_dir)?;

            info!(
                file = %display_name(&final_path),
                entry = %entry.name,
                "extracted audio"
            );
            placed.push(final_path);
        }

        Ok(placed)
    }

    fn select_audio_entries<R: io::Read + io::Seek>(
        archive: &mut ZipArchive<R>,
    ) -> Result<(Vec<AudioEntry>, Vec<String>)> {
        let mut entries = Vec::new();
        let mut unsafe_entries = Vec::new();

        for index in 0..archive.len() {
            let file = archive.by_index_raw(index)?;
            let name = file.name().to_string();

            if file.is_dir() || !is_audio_entry(&name) {
                continue;
            }

            let relative_path = match file.enclosed_name() {
                Some(path) => path.to_path_buf(),
                None => {
                    warn!(entry = %name, "skipping entry with unsafe path");
                    unsafe_entries.push(name);
                    continue;
                }
            };

            let extension = relative_path
                .extension()
                .map(|e| e.to_string_lossy().to_string())
                .unwrap_or_default();

            entries.push(AudioEntry {
                index,
                name,
                relative_path,
                extension,
            });
        }

        Ok((entries, unsafe_entries))
    }

    /// Write one entry under `output_dir`, keeping its directory layout.
    fn extract_entry<R: io::Read + io::Seek>(
        &self,
        archive: &mut ZipArchive<R>,
        entry: &AudioEntry,
        output_dir: &Path,
    ) -> Result<PathBuf> {
        let out_path = output_dir.join(&entry.relative_path);

        if let Some(parent) = out_path.parent() {
            fs::create_dir_all(parent)?;
        }

        let result = self.write_entry(archive, entry.index, &out_path);

        if let Err(ref e) = result {
            warn!(entry = %entry.name, error = %e, "discarding partially written entry");
            let _ = fs::remove_file(&out_path);
            if let Some(parent) = out_path.parent() {
                let _ = remove_empty_parents(parent, output_dir);
            }
        }

        result.map(|_| out_path)
    }

    fn write_entry<R: io::Read + io::Seek>(
        &self,
        archive: &mut ZipArchive<R>,
        index: usize,
        out_path: &Path,
    ) -> Result<u64> {
        let mut zip_file = archive.by_index(index)?;
        let out_file = fs::File::create(out_path)?;
        let mut writer = BufWriter::with_capacity(self.buffer_size, out_file);

        let bytes = io::copy(&mut zip_file, &mut writer)?;
        writer.flush()?;

        Ok(bytes)
    }

    /// Bring an extracted file to `target` directly under `output_dir`.
    fn place_extracted(extracted: &Path, target: &Path, output_dir: &Path) -> Result<PathBuf> {
        let extracted_dir = extracted.parent().unwrap_or(output_dir);

        if !is_same_dir(extracted_dir, output_dir) {
            replace_file(extracted, target)?;
            remove_empty_parents(extracted_dir, output_dir)?;
        } else if extracted != target {
            replace_file(extracted, target)?;
        }

        Ok(target.to_path_buf())
    }
}

impl Default for AudioExtractor {
    fn default() -> Self {
        Self::new()
    }
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string())
}
