//! Data models for the importer.
//!
//! - [`Race`], [`Gender`], [`RaceGender`]: the fixed race/gender taxonomy shared by
//!   skeleton discovery, texture discovery and shorthand renaming
//! - [`ImportOptions`]: the immutable snapshot threaded through one import
//! - [`ImportSettings`]: the per-scene settings record the snapshot is built from
//! - [`Preferences`]: converter path and shared assets root from `Importer Preferences.yaml`
//! - [`ImporterState`]: settings record plus batch progress, owned by
//!   [`StateManager`](crate::state::StateManager)

pub mod config;
pub mod importer_state;
pub mod options;
pub mod race;

pub use config::{BASE_SKELETON_AUTO, BASE_SKELETON_DISABLED, ImportSettings, Preferences};
pub use importer_state::{FileStatus, ImporterState};
pub use options::{
    ActionOptions, ColladaSettings, ConformMode, DeleteFilter, ImportFormat, ImportOptions,
    RenameMode,
};
pub use race::{Gender, Race, RaceGender};
