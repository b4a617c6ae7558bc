// State management module
//
// This module provides the StateManager which wraps ImporterState with thread-safe access
// using Arc<RwLock<T>> and emits change events for whoever drives the import.

use crate::models::{FileStatus, ImportSettings, ImporterState, Preferences};
use camino::{Utf8Path, Utf8PathBuf};
use std::sync::{Arc, RwLock};
use tokio::sync::broadcast;

/// Change events emitted when state is modified
#[derive(Clone, Debug, PartialEq)]
pub enum StateChange {
    /// The scene's settings record has been updated
    SettingsChanged,

    /// A batch has started
    ImportStarted { total_files: usize },

    /// Progress has been updated during a batch
    ProgressUpdated {
        current: usize,
        total: usize,
        current_file: Option<Utf8PathBuf>,
    },

    /// Current operation has changed
    OperationChanged { operation: String },

    /// A file has been processed
    FileProcessed {
        file: Utf8PathBuf,
        status: FileStatus,
        message: String,
    },

    /// A batch has finished
    ImportFinished { imported: usize, failed: usize },

    /// State has been reset
    StateReset,
}

/// Thread-safe state manager with event emission
///
/// Owns the per-scene [`ImporterState`]: the [`ImportSettings`] record every
/// import snapshots its options from, and the progress of the running batch.
///
/// - [`read()`](Self::read) for reading state
/// - [`update()`](Self::update) for mutations with automatic event emission
/// - [`subscribe()`](Self::subscribe) for listening to state changes
pub struct StateManager {
    state: Arc<RwLock<ImporterState>>,

    /// Broadcast channel for emitting state change events
    state_tx: broadcast::Sender<StateChange>,
}

impl StateManager {
    /// Create a new StateManager with default settings
    ///
    /// # Returns
    /// A new StateManager with a broadcast channel buffer of 100 events
    pub fn new() -> Self {
        Self::with_settings(ImportSettings::default())
    }

    /// Create a StateManager for a scene starting from `settings`
    pub fn with_settings(settings: ImportSettings) -> Self {
        let (state_tx, _) = broadcast::channel(100);
        Self {
            state: Arc::new(RwLock::new(ImporterState::with_settings(settings))),
            state_tx,
        }
    }

    /// Get a cloned snapshot of the current state
    pub fn snapshot(&self) -> ImporterState {
        self.state.read().unwrap().clone()
    }

    /// The current settings record
    pub fn settings(&self) -> ImportSettings {
        self.read(|state| state.settings.clone())
    }

    /// Execute a function with read access to the state
    ///
    /// # Example
    /// ```ignore
    /// let busy = state_manager.read(|state| state.is_importing);
    /// ```
    pub fn read<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&ImporterState) -> R,
    {
        let state = self.state.read().unwrap();
        f(&state)
    }

    /// Update the state and emit change events
    ///
    /// # Arguments
    /// * `update_fn` - A function that mutates the state
    ///
    /// # Returns
    /// The StateChange events that were emitted
    pub fn update<F>(&self, update_fn: F) -> Vec<StateChange>
    where
        F: FnOnce(&mut ImporterState),
    {
        let mut state = self.state.write().unwrap();
        let old_state = state.clone();

        update_fn(&mut state);

        let changes = self.detect_changes(&old_state, &state);

        for change in &changes {
            // Ignore send errors - it's OK if no one is listening
            let _ = self.state_tx.send(change.clone());
        }

        changes
    }

    /// Subscribe to state change events
    pub fn subscribe(&self) -> broadcast::Receiver<StateChange> {
        self.state_tx.subscribe()
    }

    fn detect_changes(&self, old: &ImporterState, new: &ImporterState) -> Vec<StateChange> {
        let mut changes = Vec::new();

        if old.is_importing != new.is_importing {
            if new.is_importing {
                changes.push(StateChange::ImportStarted {
                    total_files: new.total_files,
                });
            } else {
                changes.push(StateChange::ImportFinished {
                    imported: new.imported_files.len(),
                    failed: new.failed_files.len(),
                });
            }
        }

        if old.progress != new.progress
            || old.total_files != new.total_files
            || old.current_file != new.current_file
        {
            changes.push(StateChange::ProgressUpdated {
                current: new.progress,
                total: new.total_files,
                current_file: new.current_file.clone(),
            });
        }

        if old.current_operation != new.current_operation {
            changes.push(StateChange::OperationChanged {
                operation: new.current_operation.clone(),
            });
        }

        if old.settings != new.settings {
            changes.push(StateChange::SettingsChanged);
        }

        changes
    }

    /// Start a batch
    pub fn start_import(&self, files: Vec<Utf8PathBuf>) -> Vec<StateChange> {
        self.update(|state| {
            state.is_importing = true;
            state.progress = 0;
            state.total_files = files.len();
            state.files_to_import = files;
            state.current_file = None;
            state.current_operation = "Starting import...".to_string();
            state.imported_files.clear();
            state.failed_files.clear();
            state.total_new_objects = 0;
            state.total_step_failures = 0;
        })
    }

    /// Set the file being imported and what is happening to it
    pub fn update_progress(&self, file: Utf8PathBuf, operation: String) -> Vec<StateChange> {
        self.update(|state| {
            state.current_file = Some(file);
            state.current_operation = operation;
        })
    }

    /// Record the result of importing one file
    ///
    /// # Arguments
    /// * `file` - The source file
    /// * `status` - Whether the file made it into the scene
    /// * `message` - Human-readable message about the result
    /// * `new_objects` - Objects the import created
    /// * `step_failures` - Post-processing steps that failed
    pub fn add_file_result(
        &self,
        file: Utf8PathBuf,
        status: FileStatus,
        message: String,
        new_objects: usize,
        step_failures: usize,
    ) -> Vec<StateChange> {
        let mut changes = self.update(|state| {
            state.add_result(file.clone(), status);
            state.total_new_objects += new_objects;
            state.total_step_failures += step_failures;
        });

        let file_event = StateChange::FileProcessed {
            file,
            status,
            message,
        };

        let _ = self.state_tx.send(file_event.clone());
        changes.push(file_event);

        changes
    }

    /// Finish the batch
    pub fn finish_import(&self) -> Vec<StateChange> {
        self.update(|state| {
            state.is_importing = false;
            state.current_file = None;
            state.current_operation.clear();
        })
    }

    /// Reset all batch-related state, keeping the settings record
    pub fn reset_import_state(&self) -> Vec<StateChange> {
        let mut changes = self.update(|state| {
            state.reset_import_state();
        });

        let reset_event = StateChange::StateReset;
        let _ = self.state_tx.send(reset_event.clone());
        changes.push(reset_event);

        changes
    }

    /// Replace the settings record
    pub fn set_settings(&self, settings: ImportSettings) -> Vec<StateChange> {
        self.update(|state| {
            state.settings = settings;
        })
    }

    /// Update the settings record in place
    pub fn update_settings<F>(&self, settings_fn: F) -> Vec<StateChange>
    where
        F: FnOnce(&mut ImportSettings),
    {
        self.update(|state| settings_fn(&mut state.settings))
    }

    /// Remember the directory of the last batch in the settings record
    pub fn remember_directory(&self, directory: &Utf8Path) -> Vec<StateChange> {
        self.update_settings(|settings| {
            settings.directory = directory.to_string();
        })
    }

    /// Start the scene's settings record from the user's preferences
    ///
    /// # Returns
    /// The StateChange events that were emitted
    pub fn load_from_preferences(&self, preferences: &Preferences) -> Vec<StateChange> {
        let changes = self.set_settings(preferences.import_defaults.clone());
        tracing::info!(
            "Loaded preferences: divine={}, assets={}, conform={}, materials={}",
            preferences.converter_path().is_some(),
            preferences.assets_root().is_some(),
            preferences.import_defaults.gr2_conform_enabled,
            preferences.import_defaults.use_build_material
        );
        changes
    }
}

impl Default for StateManager {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for StateManager {
    fn clone(&self) -> Self {
        Self {
            state: Arc::clone(&self.state),
            state_tx: self.state_tx.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::RenameMode;

    #[test]
    fn test_new_state_manager() {
        let manager = StateManager::new();
        let state = manager.snapshot();

        assert!(!state.is_importing);
        assert_eq!(state.progress, 0);
        assert_eq!(state.settings, ImportSettings::default());
    }

    #[test]
    fn test_update_with_change_detection() {
        let manager = StateManager::new();

        let changes = manager.update(|state| {
            state.is_importing = true;
            state.total_files = 3;
        });

        assert_eq!(changes.len(), 2);
        assert!(matches!(changes[0], StateChange::ImportStarted { total_files: 3 }));
        assert!(matches!(changes[1], StateChange::ProgressUpdated { .. }));
    }

    #[test]
    fn test_start_import() {
        let manager = StateManager::new();
        let files = vec![Utf8PathBuf::from("a.gr2"), Utf8PathBuf::from("b.dae")];

        let changes = manager.start_import(files.clone());

        assert!(matches!(changes[0], StateChange::ImportStarted { total_files: 2 }));

        let state = manager.snapshot();
        assert!(state.is_importing);
        assert_eq!(state.total_files, 2);
        assert_eq!(state.files_to_import, files);
    }

    #[test]
    fn test_finish_import() {
        let manager = StateManager::new();
        manager.start_import(vec!["a.gr2".into()]);
        manager.add_file_result("a.gr2".into(), FileStatus::Failed, "nope".into(), 0, 0);

        let changes = manager.finish_import();

        assert!(matches!(
            changes[0],
            StateChange::ImportFinished {
                imported: 0,
                failed: 1
            }
        ));
        assert!(!manager.snapshot().is_importing);
    }

    #[test]
    fn test_update_progress() {
        let manager = StateManager::new();

        let changes = manager.update_progress("a.gr2".into(), "Converting".to_string());

        assert!(matches!(changes[0], StateChange::ProgressUpdated { .. }));
        assert!(matches!(changes[1], StateChange::OperationChanged { .. }));

        let state = manager.snapshot();
        assert_eq!(state.current_file, Some(Utf8PathBuf::from("a.gr2")));
        assert_eq!(state.current_operation, "Converting");
    }

    #[test]
    fn test_add_file_result() {
        let manager = StateManager::new();
        manager.start_import(vec!["a.gr2".into()]);

        let changes = manager.add_file_result(
            "a.gr2".into(),
            FileStatus::Imported,
            "2 new objects".to_string(),
            2,
            1,
        );

        assert!(
            changes
                .iter()
                .any(|c| matches!(c, StateChange::FileProcessed { .. }))
        );

        let state = manager.snapshot();
        assert_eq!(state.imported_files.len(), 1);
        assert_eq!(state.progress, 1);
        assert_eq!(state.total_new_objects, 2);
        assert_eq!(state.total_step_failures, 1);
    }

    #[test]
    fn test_reset_import_state() {
        let manager = StateManager::new();
        manager.update_settings(|settings| settings.use_build_material = true);
        manager.start_import(vec!["a.gr2".into()]);
        manager.add_file_result("a.gr2".into(), FileStatus::Imported, "ok".into(), 1, 0);

        let changes = manager.reset_import_state();

        assert!(changes.iter().any(|c| matches!(c, StateChange::StateReset)));

        let state = manager.snapshot();
        assert!(!state.is_importing);
        assert_eq!(state.total_files, 0);
        assert!(state.imported_files.is_empty());
        assert!(state.settings.use_build_material);
    }

    #[test]
    fn test_settings_change_detection() {
        let manager = StateManager::new();

        let changes = manager.update_settings(|settings| {
            settings.rename_meshes = RenameMode::Disabled;
        });

        assert_eq!(changes, vec![StateChange::SettingsChanged]);
        assert_eq!(manager.settings().rename_meshes, RenameMode::Disabled);

        // No-op updates emit nothing
        let changes = manager.update_settings(|settings| {
            settings.rename_meshes = RenameMode::Disabled;
        });
        assert!(changes.is_empty());
    }

    #[test]
    fn test_remember_directory() {
        let manager = StateManager::new();
        manager.remember_directory(Utf8Path::new("/mods/anims"));
        assert_eq!(manager.settings().directory, "/mods/anims");
    }

    #[test]
    fn test_load_from_preferences() {
        let manager = StateManager::new();
        let mut preferences = Preferences::default();
        preferences.import_defaults.gr2_conform_enabled = true;

        let changes = manager.load_from_preferences(&preferences);

        assert_eq!(changes, vec![StateChange::SettingsChanged]);
        assert!(manager.settings().gr2_conform_enabled);
    }

    #[test]
    fn test_subscribe_to_changes() {
        let manager = StateManager::new();
        let mut rx = manager.subscribe();

        manager.update(|state| {
            state.is_importing = true;
        });

        let event = rx.try_recv();
        assert!(matches!(event, Ok(StateChange::ImportStarted { .. })));
    }

    #[test]
    fn test_multiple_subscribers() {
        let manager = StateManager::new();
        let mut rx1 = manager.subscribe();
        let mut rx2 = manager.subscribe();

        manager.start_import(vec!["a.gr2".into()]);

        assert!(rx1.try_recv().is_ok());
        assert!(rx2.try_recv().is_ok());
    }

    #[test]
    fn test_clone_state_manager() {
        let manager1 = StateManager::new();
        let manager2 = manager1.clone();

        manager1.update(|state| {
            state.progress = 10;
        });

        assert_eq!(manager2.snapshot().progress, 10);
    }
}
