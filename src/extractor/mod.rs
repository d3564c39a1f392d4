pub mod audio_extractor;
pub mod folder_processor;
pub mod placement;

pub use audio_extractor::{ArchiveOutcome, AudioExtractor};
pub use folder_processor::{
    ensure_output_dir, ArchiveFailure, FolderProcessor, ProcessEvent, ProcessSummary,
};
