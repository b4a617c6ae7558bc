//! Services module - the import pipeline.
//!
//! The services have no dependency on a particular scene editor: everything
//! they need from the host goes through the [`Scene`] trait.
//!
//! # Components
//!
//! - [`naming`]: collision-safe renaming with race shorthand and junk stripping
//! - [`race_detection`]: race/gender tokens in asset filenames
//! - [`skeletons`]: the [`SkeletonCatalog`] of base skeletons used for conforming
//! - [`textures`]: the [`TextureResolver`] finding PBR maps for a mesh
//! - [`converter`]: the [`DivineConverter`] turning `.gr2` into a temporary `.dae`
//! - [`scene`]: the [`Scene`] trait and the [`ActiveObjectGuard`]
//! - [`importer`]: the [`Importer`] tying it all together
//!
//! # Usage Example
//!
//! ```ignore
//! use dos2de_importer::services::{Importer, SkeletonCatalog};
//!
//! let catalog = SkeletonCatalog::scan(&assets_root);
//! let importer = Importer::from_preferences(&catalog, &preferences);
//! let options = state_manager.settings().snapshot();
//!
//! let batch = importer
//!     .import_batch(&mut scene, &files, &options, Some(&state_manager))
//!     .await;
//! for message in batch.user_reports() {
//!     eprintln!("{message}");
//! }
//! ```

pub mod converter;
pub mod importer;
pub mod naming;
pub mod race_detection;
pub mod scene;
pub mod skeletons;
pub mod textures;

pub use converter::{ConversionError, ConversionOutput, DivineConverter};
pub use importer::{
    BatchReport, FileOutcome, ImportError, ImportReport, Importer, PostProcessStep,
    PreparedImport, StepOutcome, StepReport,
};
pub use naming::{NameRegistry, apply_naming_patterns, increment_string, safe_rename};
pub use race_detection::{detect_race_gender, matches_skeleton_key};
pub use scene::{
    ActiveObjectGuard, MaterialId, ObjectId, ObjectKind, Scene, SceneError, SceneObject,
    TransformFlags,
};
pub use skeletons::{SkeletonCatalog, SkeletonChoice, SkeletonEntry};
pub use textures::{TextureResolver, TextureSet};
