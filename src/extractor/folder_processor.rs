use crate::config::ScanConfig;
use crate::error::{OszError, Result};
use crate::extractor::audio_extractor::{ArchiveOutcome, AudioExtractor};
use crate::scanner::{ArchiveFile, ArchiveScanner};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tracing::{debug, info};

/// Notifications raised while a folder is processed, in the order they happen.
#[derive(Debug, Clone)]
pub enum ProcessEvent {
    ArchiveStarted { archive: ArchiveFile, index: usize },
    AudioExtracted { archive: ArchiveFile, file: PathBuf },
    NoAudioFound { archive: ArchiveFile },
    ArchiveFailed { archive: ArchiveFile, reason: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArchiveFailure {
    pub archive: PathBuf,
    pub reason: String,
}

/// Tally of one folder run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProcessSummary {
    pub total: usize,
    pub successful: usize,
    pub files_extracted: usize,
    pub without_audio: Vec<PathBuf>,
    pub failures: Vec<ArchiveFailure>,
    pub skipped_entries: usize,
    pub elapsed: Duration,
}

impl ProcessSummary {
    fn record(&mut self, archive: &ArchiveFile, outcome: &ArchiveOutcome) {
        match outcome {
            ArchiveOutcome::Extracted { files } => {
                self.successful += 1;
                self.files_extracted += files.len();
            }
            ArchiveOutcome::NoAudio => self.without_audio.push(archive.source_path.clone()),
            ArchiveOutcome::Failed { reason } => self.failures.push(ArchiveFailure {
                archive: archive.source_path.clone(),
                reason: reason.clone(),
            }),
        }
    }
}

pub struct FolderProcessor {
    scanner: ArchiveScanner,
    extractor: AudioExtractor,
}

impl FolderProcessor {
    pub fn new(config: &ScanConfig) -> Self {
        Self {
            scanner: ArchiveScanner::new(config),
            extractor: AudioExtractor::new(),
        }
    }

    /// Extract audio from every archive under `input_dir` into `output_dir`.
    pub fn process(&self, input_dir: &Path, output_dir: &Path) -> Result<ProcessSummary> {
        self.process_with(input_dir, output_dir, None)
    }

    /// Like [`process`](Self::process), reporting progress through `on_event`.
    ///
    /// Only a missing input root or an output directory that cannot be
    /// created fail the call; per-archive problems land in the summary.
    pub fn process_with(
        &self,
        input_dir: &Path,
        output_dir: &Path,
        on_event: Option<&dyn Fn(&ProcessEvent)>,
    ) -> Result<ProcessSummary> {
        let start = Instant::now();
        ensure_output_dir(output_dir)?;

        let mut summary = ProcessSummary::default();

        let skipped = self.scanner.for_each_archive(input_dir, |archive| {
            summary.total += 1;
            notify(
                on_event,
                ProcessEvent::ArchiveStarted {
                    archive: archive.clone(),
                    index: summary.total,
                },
            );

            let outcome = self
                .extractor
                .extract_archive(&archive.source_path, output_dir);

            match &outcome {
                ArchiveOutcome::Extracted { files } => {
                    for file in files {
                        notify(
                            on_event,
                            ProcessEvent::AudioExtracted {
                                archive: archive.clone(),
                                file: file.clone(),
                            },
                        );
                    }
                }
                ArchiveOutcome::NoAudio => notify(
                    on_event,
                    ProcessEvent::NoAudioFound {
                        archive: archive.clone(),
                    },
                ),
                ArchiveOutcome::Failed { reason } => notify(
                    on_event,
                    ProcessEvent::ArchiveFailed {
                        archive: archive.clone(),
                        reason: reason.clone(),
                    },
                ),
            }

            summary.record(&archive, &outcome);
        })?;

        summary.skipped_entries = skipped;
        summary.elapsed = start.elapsed();

        info!(
            total = summary.total,
            successful = summary.successful,
            files = summary.files_extracted,
            "folder processed"
        );

        Ok(summary)
    }

    /// Archives `process` would visit, without touching anything.
    pub fn plan(&self, input_dir: &Path) -> Result<Vec<ArchiveFile>> {
        self.scanner.scan_directory(input_dir)
    }

    pub fn scanner(&self) -> &ArchiveScanner {
        &self.scanner
    }
}

fn notify(on_event: Option<&dyn Fn(&ProcessEvent)>, event: ProcessEvent) {
    if let Some(callback) = on_event {
        callback(&event);
    }
}

/// Create `output_dir` and its parents when missing.
pub fn ensure_output_dir(output_dir: &Path) -> Result<()> {
    if output_dir.is_dir() {
        return Ok(());
    }

    debug!(dir = %output_dir.display(), "creating output directory");
    fs::create_dir_all(output_dir).map_err(|e| match e.kind() {
        std::io::ErrorKind::PermissionDenied => OszError::Permission {
            path: output_dir.display().to_string(),
        },
        _ => OszError::Io(e),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extractor::test_support::write_osz;
    use std::cell::RefCell;
    use tempfile::TempDir;

    fn processor() -> FolderProcessor {
        FolderProcessor::new(&ScanConfig::default())
    }

    #[test]
    fn test_mixed_folder_counts() {
        let temp_dir = TempDir::new().unwrap();
        let input = temp_dir.path().join("input");
        let output = temp_dir.path().join("output");
        fs::create_dir(&input).unwrap();
        write_osz(&input.join("song1.osz"), &[("audio.mp3", "one")]);
        write_osz(&input.join("song2.osz"), &[("map.osu", "osu")]);

        let summary = processor().process(&input, &output).unwrap();

        assert_eq!(summary.total, 2);
        assert_eq!(summary.successful, 1);
        assert!(output.join("song1.mp3").exists());

        let leftovers: Vec<_> = fs::read_dir(&output)
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().to_string())
            .filter(|name| name.starts_with("song2"))
            .collect();
        assert!(leftovers.is_empty(), "unexpected files: {:?}", leftovers);
        assert_eq!(summary.without_audio, vec![input.join("song2.osz")]);
    }

    #[test]
    fn test_nested_folders_and_other_files() {
        let temp_dir = TempDir::new().unwrap();
        let input = temp_dir.path().join("input");
        let output = temp_dir.path().join("output");
        fs::create_dir_all(input.join("a/b")).unwrap();
        write_osz(&input.join("top.osz"), &[("x.mp3", "1")]);
        write_osz(&input.join("a/mid.OSZ"), &[("sub/y.MP3", "2")]);
        write_osz(&input.join("a/b/deep.osz"), &[("z.mp3", "3")]);
        write_osz(&input.join("a/not-a-map.zip"), &[("w.mp3", "4")]);
        fs::write(input.join("a/b/notes.txt"), b"ignore me").unwrap();

        let summary = processor().process(&input, &output).unwrap();

        assert_eq!(summary.total, 3);
        assert_eq!(summary.successful, 3);
        assert_eq!(summary.files_extracted, 3);
        assert!(output.join("top.mp3").exists());
        assert!(output.join("mid.MP3").exists());
        assert!(output.join("deep.mp3").exists());
        assert!(!output.join("not-a-map.mp3").exists());
        assert!(!output.join("sub").exists());
    }

    #[test]
    fn test_archives_at_any_depth_are_found() {
        let temp_dir = TempDir::new().unwrap();
        let input = temp_dir.path().join("input");
        let output = temp_dir.path().join("output");

        let mut deep_dir = input.clone();
        for level in 0..34 {
            deep_dir.push(format!("d{}", level));
        }
        fs::create_dir_all(&deep_dir).unwrap();
        write_osz(&deep_dir.join("deep.osz"), &[("a.mp3", "deep")]);

        let summary = processor().process(&input, &output).unwrap();

        assert_eq!(summary.total, 1);
        assert_eq!(summary.successful, 1);
        assert_eq!(fs::read_to_string(output.join("deep.mp3")).unwrap(), "deep");
    }

    #[test]
    fn test_corrupt_archive_does_not_stop_processing() {
        let temp_dir = TempDir::new().unwrap();
        let input = temp_dir.path().join("input");
        let output = temp_dir.path().join("output");
        fs::create_dir(&input).unwrap();
        fs::write(input.join("bad.osz"), b"garbage").unwrap();
        write_osz(&input.join("good.osz"), &[("audio.mp3", "ok")]);

        let summary = processor().process(&input, &output).unwrap();

        assert_eq!(summary.total, 2);
        assert_eq!(summary.successful, 1);
        assert_eq!(summary.failures.len(), 1);
        assert_eq!(summary.failures[0].archive, input.join("bad.osz"));
        assert!(output.join("good.mp3").exists());
    }

    #[test]
    fn test_output_directory_is_created() {
        let temp_dir = TempDir::new().unwrap();
        let input = temp_dir.path().join("input");
        let output = temp_dir.path().join("nested/output");
        fs::create_dir(&input).unwrap();

        let summary = processor().process(&input, &output).unwrap();

        assert_eq!(summary.total, 0);
        assert_eq!(summary.successful, 0);
        assert!(output.is_dir());
    }

    #[test]
    fn test_missing_input_is_an_error() {
        let temp_dir = TempDir::new().unwrap();
        let result = processor().process(
            &temp_dir.path().join("missing"),
            &temp_dir.path().join("output"),
        );

        assert!(matches!(result, Err(OszError::InvalidPath { .. })));
    }

    #[test]
    fn test_events_follow_processing_order() {
        let temp_dir = TempDir::new().unwrap();
        let input = temp_dir.path().join("input");
        let output = temp_dir.path().join("output");
        fs::create_dir(&input).unwrap();
        write_osz(&input.join("only.osz"), &[("audio.mp3", "a")]);

        let seen = RefCell::new(Vec::new());
        let callback = |event: &ProcessEvent| {
            let label = match event {
                ProcessEvent::ArchiveStarted { archive, index } => {
                    format!("start {} #{}", archive.filename, index)
                }
                ProcessEvent::AudioExtracted { file, .. } => {
                    format!("file {}", file.file_name().unwrap().to_string_lossy())
                }
                ProcessEvent::NoAudioFound { archive } => format!("none {}", archive.filename),
                ProcessEvent::ArchiveFailed { archive, .. } => format!("fail {}", archive.filename),
            };
            seen.borrow_mut().push(label);
        };

        processor()
            .process_with(&input, &output, Some(&callback))
            .unwrap();

        assert_eq!(
            seen.into_inner(),
            vec!["start only.osz #1".to_string(), "file only.mp3".to_string()]
        );
    }

    #[test]
    fn test_plan_lists_without_extracting() {
        let temp_dir = TempDir::new().unwrap();
        let input = temp_dir.path().join("input");
        let output = temp_dir.path().join("output");
        fs::create_dir(&input).unwrap();
        write_osz(&input.join("one.osz"), &[("audio.mp3", "a")]);

        let planned = processor().plan(&input).unwrap();

        assert_eq!(planned.len(), 1);
        assert!(!output.exists());
    }

    #[test]
    fn test_summary_serializes() {
        let summary = ProcessSummary {
            total: 2,
            successful: 1,
            ..Default::default()
        };
        let json = serde_json::to_value(&summary).unwrap();
        assert_eq!(json["total"], 2);
        assert_eq!(json["successful"], 1);
    }
}
