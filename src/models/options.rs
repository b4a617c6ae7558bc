use crate::models::RaceGender;
use crate::models::config::{BASE_SKELETON_AUTO, BASE_SKELETON_DISABLED};
use camino::{Utf8Path, Utf8PathBuf};
use serde::{Deserialize, Serialize};
use std::convert::Infallible;
use std::str::FromStr;

/// Source format of an import, decided once from the file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportFormat {
    /// `.dae`, handed straight to the scene importer
    Collada,
    /// `.gr2`, converted to a temporary `.dae` first
    Granny,
}

impl ImportFormat {
    /// Classify a path by its extension (case-insensitive).
    pub fn from_path(path: &Utf8Path) -> Option<ImportFormat> {
        let extension = path.extension()?.to_ascii_lowercase();
        match extension.as_str() {
            "dae" => Some(ImportFormat::Collada),
            "gr2" => Some(ImportFormat::Granny),
            _ => None,
        }
    }
}

/// How an armature or mesh gets renamed after import.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RenameMode {
    /// Replace race/gender tokens in the current name, i.e. Humans_Female becomes HF
    #[serde(rename = "SHORTHAND")]
    Shorthand,
    /// Use the name of the source file
    #[serde(rename = "FILE")]
    Filename,
    /// Use the name of the source file and replace race/gender tokens
    #[serde(rename = "FILE_SHORTHAND")]
    FilenameShorthand,
    #[serde(rename = "DISABLED")]
    Disabled,
}

impl RenameMode {
    pub fn uses_filename(&self) -> bool {
        matches!(self, RenameMode::Filename | RenameMode::FilenameShorthand)
    }

    pub fn uses_shorthand(&self) -> bool {
        matches!(self, RenameMode::Shorthand | RenameMode::FilenameShorthand)
    }
}

/// Which new objects get deleted once the import has been post-processed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeleteFilter {
    /// Typically for animations: delete all objects and keep only the actions
    #[serde(rename = "ALL")]
    All,
    #[serde(rename = "MESH")]
    Mesh,
    #[serde(rename = "ARMATURE")]
    Armature,
    #[serde(rename = "DISABLED")]
    Disabled,
}

/// Skeleton selection for conforming a Granny file during conversion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConformMode {
    Disabled,
    /// Pick a base skeleton from the catalog by matching the source filename
    Auto,
    /// A catalog key such as `Humans_Male`
    Key(String),
    /// An explicit skeleton file
    Path(Utf8PathBuf),
}

impl FromStr for ConformMode {
    type Err = Infallible;

    /// `DISABLED`, `AUTO` (any case), a catalog key, or else a skeleton path.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.eq_ignore_ascii_case(BASE_SKELETON_DISABLED) {
            Ok(ConformMode::Disabled)
        } else if s.eq_ignore_ascii_case(BASE_SKELETON_AUTO) {
            Ok(ConformMode::Auto)
        } else if RaceGender::from_key(s).is_some() {
            Ok(ConformMode::Key(s.to_string()))
        } else {
            Ok(ConformMode::Path(Utf8PathBuf::from(s)))
        }
    }
}

/// Parameters forwarded untouched to the scene's Collada importer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColladaSettings {
    pub fix_orientation: bool,
    pub import_units: bool,
    pub find_chains: bool,
    pub auto_connect: bool,
    pub min_chain_length: u32,
    pub keep_bind_info: bool,
}

impl Default for ColladaSettings {
    fn default() -> Self {
        Self {
            fix_orientation: false,
            import_units: false,
            find_chains: false,
            auto_connect: false,
            min_chain_length: 0,
            keep_bind_info: true,
        }
    }
}

/// Post-processing applied to actions carried by new armatures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActionOptions {
    pub rename: bool,
    pub fake_user: bool,
    pub offset_to_frame_one: bool,
}

impl ActionOptions {
    pub fn any(&self) -> bool {
        self.rename || self.fake_user || self.offset_to_frame_one
    }
}

/// Immutable configuration for one import invocation.
///
/// Built once from the scene's [`ImportSettings`](crate::models::ImportSettings)
/// record and passed by reference through every stage of the pipeline.
#[derive(Debug, Clone, PartialEq)]
pub struct ImportOptions {
    pub collada: ColladaSettings,
    pub conform: ConformMode,
    /// Manual skeleton used when `Auto` or `Key` find nothing
    pub conform_fallback: Option<Utf8PathBuf>,
    pub delete_temp_collada: bool,
    pub rename_armatures: RenameMode,
    pub rename_meshes: RenameMode,
    pub strip_junk: bool,
    pub build_materials: bool,
    pub apply_transforms: bool,
    pub delete_objects: DeleteFilter,
    pub actions: ActionOptions,
}

impl Default for ImportOptions {
    fn default() -> Self {
        crate::models::ImportSettings::default().snapshot()
    }
}

impl ImportOptions {
    /// Replace the skeleton selection, dropping any manual fallback from the settings record.
    pub fn with_conform(mut self, conform: ConformMode) -> Self {
        self.conform = conform;
        self.conform_fallback = None;
        self
    }
}
