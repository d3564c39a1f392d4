use crate::error::{OszError, UserFriendlyError};
use crate::extractor::{ProcessEvent, ProcessSummary};
use crate::scanner::ArchiveFile;
use console::{style, Emoji, Term};
use std::path::Path;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum OutputMode {
    Human,
    Json,
    Plain,
}

// Emojis with text fallbacks
static CHECKMARK: Emoji = Emoji("✅ ", "✓ ");
static CROSS: Emoji = Emoji("❌ ", "✗ ");
static INFO: Emoji = Emoji("ℹ️  ", "i ");
static WARNING: Emoji = Emoji("⚠️  ", "! ");
static MUSIC: Emoji = Emoji("🎵 ", "> ");
static SPARKLES: Emoji = Emoji("✨ ", "* ");

pub struct OutputFormatter {
    mode: OutputMode,
    use_colors: bool,
    verbose_level: u8,
    quiet: bool,
}

impl OutputFormatter {
    pub fn new(mode: OutputMode, verbose: u8, quiet: bool) -> Self {
        let use_colors = match mode {
            OutputMode::Human => Term::stdout().features().colors_supported() && !quiet,
            _ => false,
        };

        Self {
            mode,
            use_colors,
            verbose_level: if quiet { 0 } else { verbose },
            quiet,
        }
    }

    pub fn mode(&self) -> OutputMode {
        self.mode
    }

    // Core messaging methods
    pub fn success(&self, message: &str) {
        if self.should_show_message(0) {
            match self.mode {
                OutputMode::Human => self.print_human_message(MessageType::Success, message),
                OutputMode::Json => self.print_json_message("success", message),
                OutputMode::Plain => println!("SUCCESS: {}", message),
            }
        }
    }

    pub fn error(&self, message: &str) {
        match self.mode {
            OutputMode::Human => self.print_human_message(MessageType::Error, message),
            OutputMode::Json => self.print_json_message("error", message),
            OutputMode::Plain => eprintln!("ERROR: {}", message),
        }
    }

    pub fn warning(&self, message: &str) {
        if self.should_show_message(0) {
            match self.mode {
                OutputMode::Human => self.print_human_message(MessageType::Warning, message),
                OutputMode::Json => self.print_json_message("warning", message),
                OutputMode::Plain => println!("WARNING: {}", message),
            }
        }
    }

    pub fn info(&self, message: &str) {
        if self.should_show_message(1) {
            match self.mode {
                OutputMode::Human => self.print_human_message(MessageType::Info, message),
                OutputMode::Json => self.print_json_message("info", message),
                OutputMode::Plain => println!("INFO: {}", message),
            }
        }
    }

    pub fn debug(&self, message: &str) {
        if self.should_show_message(2) {
            match self.mode {
                OutputMode::Human => {
                    if self.use_colors {
                        println!("  {}", style(message).dim());
                    } else {
                        println!("  DEBUG: {}", message);
                    }
                }
                OutputMode::Json => self.print_json_message("debug", message),
                OutputMode::Plain => println!("DEBUG: {}", message),
            }
        }
    }

    pub fn start_operation(&self, operation: &str) {
        if self.should_show_message(0) {
            match self.mode {
                OutputMode::Human => {
                    if self.use_colors {
                        println!("{}{}", MUSIC, style(operation).bold());
                    } else {
                        println!("> {}", operation);
                    }
                }
                OutputMode::Json => self.print_json_message("operation_start", operation),
                OutputMode::Plain => println!("STARTING: {}", operation),
            }
        }
    }

    // Per-archive notices
    pub fn print_event(&self, event: &ProcessEvent) {
        match event {
            ProcessEvent::ArchiveStarted { archive, index } => {
                if !self.should_show_message(0) {
                    return;
                }
                match self.mode {
                    OutputMode::Human => {
                        if self.use_colors {
                            println!(
                                "{} {}",
                                style(format!("[{}]", index)).dim(),
                                style(format!("Processing: {}", archive.filename)).bold()
                            );
                        } else {
                            println!("[{}] Processing: {}", index, archive.filename);
                        }
                    }
                    OutputMode::Json => self.print_json_object(&serde_json::json!({
                        "type": "archive_started",
                        "index": index,
                        "archive": archive.source_path,
                        "timestamp": chrono::Utc::now().to_rfc3339()
                    })),
                    OutputMode::Plain => println!("PROCESSING: {}", archive.filename),
                }
            }
            ProcessEvent::AudioExtracted { archive, file } => match self.mode {
                OutputMode::Json => {
                    if self.should_show_message(0) {
                        self.print_json_object(&serde_json::json!({
                            "type": "audio_extracted",
                            "archive": archive.source_path,
                            "file": file,
                            "timestamp": chrono::Utc::now().to_rfc3339()
                        }));
                    }
                }
                _ => self.success(&format!("Extracted: {}", file_label(file))),
            },
            ProcessEvent::NoAudioFound { archive } => match self.mode {
                OutputMode::Json => {
                    if self.should_show_message(0) {
                        self.print_json_object(&serde_json::json!({
                            "type": "no_audio",
                            "archive": archive.source_path,
                            "timestamp": chrono::Utc::now().to_rfc3339()
                        }));
                    }
                }
                _ => self.warning(&format!("No audio found in {}", archive.filename)),
            },
            ProcessEvent::ArchiveFailed { archive, reason } => match self.mode {
                OutputMode::Json => self.print_json_object(&serde_json::json!({
                    "type": "archive_failed",
                    "archive": archive.source_path,
                    "reason": reason,
                    "timestamp": chrono::Utc::now().to_rfc3339()
                })),
                _ => self.error(&format!(
                    "Failed to process {}: {}",
                    archive.source_path.display(),
                    reason
                )),
            },
        }
    }

    // User-friendly error handling
    pub fn print_user_friendly_error(&self, error: &OszError) {
        let user_message = error.user_message();
        self.error(&user_message);

        if let Some(suggestion) = error.suggestion() {
            match self.mode {
                OutputMode::Human => {
                    println!();
                    if self.use_colors {
                        println!(
                            "{}{}",
                            INFO,
                            style(&format!("Suggestion: {}", suggestion)).cyan()
                        );
                    } else {
                        println!("Suggestion: {}", suggestion);
                    }
                }
                OutputMode::Json => {
                    self.print_json_object(&serde_json::json!({
                        "type": "suggestion",
                        "message": suggestion
                    }));
                }
                OutputMode::Plain => {
                    println!("SUGGESTION: {}", suggestion);
                }
            }
        }
    }

    // Summary and reporting
    pub fn print_process_summary(&self, summary: &ProcessSummary) {
        if self.quiet {
            return;
        }

        match self.mode {
            OutputMode::Human => self.print_human_summary(summary),
            OutputMode::Json => self.print_json_summary(summary),
            OutputMode::Plain => self.print_plain_summary(summary),
        }
    }

    pub fn print_first_run(&self, input_dir: &Path, output_dir: &Path) {
        match self.mode {
            OutputMode::Json => self.print_json_object(&serde_json::json!({
                "type": "first_run",
                "input": input_dir,
                "output": output_dir
            })),
            _ => {
                println!();
                println!("First run detected. Created:");
                println!();
                println!("[INPUT]  {}", input_dir.display());
                println!("[OUTPUT] {}", output_dir.display());
                println!();
                println!("Put your .osz files in the INPUT folder and run again.");
            }
        }
    }

    pub fn print_dry_run(&self, archives: &[ArchiveFile], output_dir: &Path) {
        match self.mode {
            OutputMode::Json => self.print_json_object(&serde_json::json!({
                "type": "dry_run",
                "output": output_dir,
                "archives": archives
                    .iter()
                    .map(|a| a.source_path.clone())
                    .collect::<Vec<_>>()
            })),
            _ => {
                self.print_header("Dry run");
                for archive in archives {
                    println!("  {} -> {}.mp3", archive.display_path(), archive.song_name());
                }
                println!();
                println!(
                    "{} archive(s) would be processed into {}",
                    archives.len(),
                    output_dir.display()
                );
            }
        }
    }

    // Specialized output methods
    pub fn print_header(&self, title: &str) {
        if self.quiet {
            return;
        }

        match self.mode {
            OutputMode::Human => {
                println!();
                if self.use_colors {
                    println!("{} {}", SPARKLES, style(title).bold().cyan());
                } else {
                    println!("=== {} ===", title);
                }
                println!();
            }
            OutputMode::Json => {
                self.print_json_object(&serde_json::json!({
                    "type": "header",
                    "title": title
                }));
            }
            OutputMode::Plain => {
                println!("=== {} ===", title);
            }
        }
    }

    pub fn print_separator(&self) {
        if self.quiet {
            return;
        }

        match self.mode {
            OutputMode::Human => {
                if self.use_colors {
                    println!("{}", style("─".repeat(60)).dim());
                } else {
                    println!("{}", "-".repeat(60));
                }
            }
            OutputMode::Plain => {
                println!("{}", "-".repeat(60));
            }
            OutputMode::Json => {}
        }
    }

    // Private helper methods
    fn should_show_message(&self, min_verbose_level: u8) -> bool {
        !self.quiet && self.verbose_level >= min_verbose_level
    }

    fn print_human_message(&self, msg_type: MessageType, message: &str) {
        #[allow(clippy::type_complexity)]
        let (emoji, color_fn): (Emoji, Box<dyn Fn(&str) -> console::StyledObject<&str>>) =
            match msg_type {
                MessageType::Success => (CHECKMARK, Box::new(|msg| style(msg).green())),
                MessageType::Error => (CROSS, Box::new(|msg| style(msg).red().bold())),
                MessageType::Warning => (WARNING, Box::new(|msg| style(msg).yellow())),
                MessageType::Info => (INFO, Box::new(|msg| style(msg).cyan())),
            };

        if self.use_colors {
            match msg_type {
                MessageType::Error => eprintln!("{}{}", emoji, color_fn(message)),
                _ => println!("{}{}", emoji, color_fn(message)),
            }
        } else {
            let prefix = match msg_type {
                MessageType::Success => "✓",
                MessageType::Error => "✗",
                MessageType::Warning => "!",
                MessageType::Info => "i",
            };

            match msg_type {
                MessageType::Error => eprintln!("{} {}", prefix, message),
                _ => println!("{} {}", prefix, message),
            }
        }
    }

    fn print_json_message(&self, level: &str, message: &str) {
        self.print_json_object(&serde_json::json!({
            "type": "message",
            "level": level,
            "message": message,
            "timestamp": chrono::Utc::now().to_rfc3339()
        }));
    }

    fn print_json_object(&self, obj: &serde_json::Value) {
        println!(
            "{}",
            serde_json::to_string(obj).unwrap_or_else(|_| "{}".to_string())
        );
    }

    fn print_human_summary(&self, summary: &ProcessSummary) {
        println!();
        self.print_separator();

        if self.use_colors {
            println!("{}", style("Summary:").bold());
        } else {
            println!("Summary:");
        }

        println!(
            "  Total .osz files found: {}",
            self.highlight(summary.total.to_string())
        );
        println!(
            "  Successful extractions: {}",
            self.highlight(summary.successful.to_string())
        );

        if self.should_show_message(1) {
            println!("  Audio files written:    {}", summary.files_extracted);
            println!("  Without audio:          {}", summary.without_audio.len());
            println!("  Failed:                 {}", summary.failures.len());
            println!("  Time taken:             {}", format_duration(summary.elapsed));
        }

        self.print_separator();
    }

    fn print_json_summary(&self, summary: &ProcessSummary) {
        let json = serde_json::json!({
            "type": "summary",
            "total": summary.total,
            "successful": summary.successful,
            "files_extracted": summary.files_extracted,
            "without_audio": summary.without_audio,
            "failures": summary.failures,
            "duration_ms": summary.elapsed.as_millis() as u64,
            "timestamp": chrono::Utc::now().to_rfc3339()
        });

        println!(
            "{}",
            serde_json::to_string_pretty(&json).unwrap_or_else(|_| "{}".to_string())
        );
    }

    fn print_plain_summary(&self, summary: &ProcessSummary) {
        println!("SUMMARY:");
        println!("Total .osz files found: {}", summary.total);
        println!("Successful extractions: {}", summary.successful);
    }

    fn highlight(&self, value: String) -> String {
        if self.use_colors {
            style(value).cyan().bold().to_string()
        } else {
            value
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum MessageType {
    Success,
    Error,
    Warning,
    Info,
}

fn file_label(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string())
}

fn format_duration(duration: Duration) -> String {
    let secs = duration.as_secs();
    if secs >= 60 {
        format!("{}m {}s", secs / 60, secs % 60)
    } else if secs > 0 {
        format!("{}s", secs)
    } else {
        format!("{}ms", duration.as_millis())
    }
}

// Progress-aware output wrapper
pub struct ProgressAwareOutput<'a> {
    formatter: &'a OutputFormatter,
    progress_manager: Option<&'a crate::ui::ProgressManager>,
}

impl<'a> ProgressAwareOutput<'a> {
    pub fn new(
        formatter: &'a OutputFormatter,
        progress_manager: Option<&'a crate::ui::ProgressManager>,
    ) -> Self {
        Self {
            formatter,
            progress_manager,
        }
    }

    pub fn suspend_and_print<F>(&self, f: F)
    where
        F: FnOnce(&OutputFormatter),
    {
        if let Some(pm) = self.progress_manager {
            pm.suspend(|| f(self.formatter));
        } else {
            f(self.formatter);
        }
    }

    pub fn event(&self, event: &ProcessEvent) {
        self.suspend_and_print(|f| f.print_event(event));
    }
}
