use crate::models::config::ImportSettings;
use camino::Utf8PathBuf;
use std::collections::HashSet;
use std::fmt;

/// Outcome of one file in a batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileStatus {
    Imported,
    Failed,
}

impl fmt::Display for FileStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FileStatus::Imported => f.write_str("imported"),
            FileStatus::Failed => f.write_str("failed"),
        }
    }
}

/// Per-scene importer state.
///
/// Holds the scene's [`ImportSettings`] record, which survives repeated imports
/// so the user's choices are not re-entered, plus progress and results of the
/// current batch.
///
/// # Thread Safety
///
/// `ImporterState` is wrapped in `Arc<RwLock<ImporterState>>` by
/// [`crate::state::StateManager`]. Use its `read()` and `update()` methods rather
/// than holding the state directly.
#[derive(Clone, Debug)]
pub struct ImporterState {
    // Scene settings record
    pub settings: ImportSettings,

    // Runtime state
    pub is_importing: bool,
    pub current_file: Option<Utf8PathBuf>,
    pub current_operation: String,

    // Progress state
    pub progress: usize,
    pub total_files: usize,
    pub files_to_import: Vec<Utf8PathBuf>,

    // Results
    pub imported_files: HashSet<Utf8PathBuf>,
    pub failed_files: HashSet<Utf8PathBuf>,

    // Aggregate statistics across the batch
    pub total_new_objects: usize,
    pub total_step_failures: usize,
}

impl Default for ImporterState {
    fn default() -> Self {
        Self::with_settings(ImportSettings::default())
    }
}

impl ImporterState {
    /// Create state for a scene that starts from the given settings.
    pub fn with_settings(settings: ImportSettings) -> Self {
        Self {
            settings,

            is_importing: false,
            current_file: None,
            current_operation: String::new(),

            progress: 0,
            total_files: 0,
            files_to_import: Vec::new(),

            imported_files: HashSet::new(),
            failed_files: HashSet::new(),

            total_new_objects: 0,
            total_step_failures: 0,
        }
    }

    /// Get batch statistics as (imported, failed, total).
    pub fn import_stats(&self) -> (usize, usize, usize) {
        (
            self.imported_files.len(),
            self.failed_files.len(),
            self.total_files,
        )
    }

    /// Reset all batch-related state. The settings record is kept.
    pub fn reset_import_state(&mut self) {
        self.is_importing = false;
        self.current_file = None;
        self.current_operation.clear();
        self.progress = 0;
        self.total_files = 0;
        self.files_to_import.clear();
        self.imported_files.clear();
        self.failed_files.clear();
        self.total_new_objects = 0;
        self.total_step_failures = 0;
    }

    /// Record the outcome of one file and advance the progress counter.
    pub fn add_result(&mut self, file: Utf8PathBuf, status: FileStatus) {
        match status {
            FileStatus::Imported => {
                self.imported_files.insert(file);
            }
            FileStatus::Failed => {
                self.failed_files.insert(file);
            }
        }
        self.progress += 1;
    }

    /// Summary line for the finished batch.
    pub fn summary(&self) -> String {
        let (imported, failed, total) = self.import_stats();
        let mut summary = format!("{imported}/{total} files imported");
        if failed > 0 {
            summary.push_str(&format!(", {failed} failed"));
        }
        if self.total_new_objects > 0 {
            summary.push_str(&format!(", {} new objects", self.total_new_objects));
        }
        if self.total_step_failures > 0 {
            summary.push_str(&format!(
                ", {} post-processing steps failed",
                self.total_step_failures
            ));
        }
        summary
    }
}
