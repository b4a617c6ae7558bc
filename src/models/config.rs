use crate::models::options::{
    ActionOptions, ColladaSettings, ConformMode, DeleteFilter, ImportOptions, RenameMode,
};
use camino::Utf8PathBuf;
use serde::{Deserialize, Serialize};

/// Base skeleton selection that turns catalog conforming off.
pub const BASE_SKELETON_DISABLED: &str = "DISABLED";

/// Base skeleton selection that picks a skeleton from the source filename.
pub const BASE_SKELETON_AUTO: &str = "AUTO";

/// Importer preferences from `Importer Preferences.yaml`
///
/// Holds the paths shared by every scene, plus the settings a new scene starts with.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Preferences {
    /// Path to divine.exe, used to convert from gr2 to dae
    #[serde(default)]
    pub divine_path: String,

    /// Extracted `Public/Shared/Assets` directory, used for skeletons and textures
    #[serde(default)]
    pub extracted_assets_dir: String,

    /// Debug logging for host front ends; the CLI takes `--debug` instead
    #[serde(default)]
    pub debug_mode: bool,

    #[serde(default)]
    pub import_defaults: ImportSettings,
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            divine_path: String::new(),
            extracted_assets_dir: String::new(),
            debug_mode: false,
            import_defaults: ImportSettings::default(),
        }
    }
}

impl Preferences {
    /// The converter executable, if one is configured.
    pub fn converter_path(&self) -> Option<Utf8PathBuf> {
        non_empty_path(&self.divine_path)
    }

    /// The shared assets root, if one is configured.
    pub fn assets_root(&self) -> Option<Utf8PathBuf> {
        non_empty_path(&self.extracted_assets_dir)
    }
}

fn non_empty_path(value: &str) -> Option<Utf8PathBuf> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(Utf8PathBuf::from(trimmed))
    }
}

/// Import settings kept for a scene so repeated imports reuse the user's choices.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImportSettings {
    /// Directory of the last imported batch
    #[serde(default)]
    pub directory: String,

    /// Apply all object transformations on imported objects
    #[serde(default = "default_true")]
    pub apply_transformation: bool,

    #[serde(default = "default_delete_objects")]
    pub delete_objects: DeleteFilter,

    #[serde(default = "default_rename_armatures")]
    pub rename_armatures: RenameMode,

    #[serde(default = "default_rename_meshes")]
    pub rename_meshes: RenameMode,

    /// Strip fluff such as `_MeshShape` from new object names
    #[serde(default = "default_true")]
    pub use_rename_junk: bool,

    /// Find associated textures and build materials
    #[serde(default)]
    pub use_build_material: bool,

    #[serde(default)]
    pub auto_connect: bool,

    #[serde(default)]
    pub find_chains: bool,

    #[serde(default)]
    pub min_chain_length: u32,

    #[serde(default)]
    pub fix_orientation: bool,

    #[serde(default)]
    pub import_units: bool,

    #[serde(default = "default_true")]
    pub keep_bind_info: bool,

    #[serde(default = "default_true")]
    pub action_autorename: bool,

    #[serde(default = "default_true")]
    pub action_set_fake_user: bool,

    #[serde(default = "default_true")]
    pub action_offset_zero: bool,

    /// Delete the temporary .dae produced by a gr2 conversion
    #[serde(default = "default_true")]
    pub gr2_delete_dae: bool,

    #[serde(default)]
    pub gr2_conform_enabled: bool,

    /// `DISABLED`, `AUTO`, or a catalog key such as `Humans_Male`
    #[serde(default = "default_base_skeleton")]
    pub gr2_base_skeleton: String,

    /// Manually chosen skeleton to conform to
    #[serde(default)]
    pub gr2_conform_skeleton_path: String,
}

impl Default for ImportSettings {
    fn default() -> Self {
        Self {
            directory: String::new(),
            apply_transformation: true,
            delete_objects: DeleteFilter::Disabled,
            rename_armatures: RenameMode::FilenameShorthand,
            rename_meshes: RenameMode::Shorthand,
            use_rename_junk: true,
            use_build_material: false,
            auto_connect: false,
            find_chains: false,
            min_chain_length: 0,
            fix_orientation: false,
            import_units: false,
            keep_bind_info: true,
            action_autorename: true,
            action_set_fake_user: true,
            action_offset_zero: true,
            gr2_delete_dae: true,
            gr2_conform_enabled: false,
            gr2_base_skeleton: BASE_SKELETON_DISABLED.to_string(),
            gr2_conform_skeleton_path: String::new(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_delete_objects() -> DeleteFilter {
    DeleteFilter::Disabled
}

fn default_rename_armatures() -> RenameMode {
    RenameMode::FilenameShorthand
}

fn default_rename_meshes() -> RenameMode {
    RenameMode::Shorthand
}

fn default_base_skeleton() -> String {
    BASE_SKELETON_DISABLED.to_string()
}

impl ImportSettings {
    /// Freeze the settings into the options for one import invocation.
    pub fn snapshot(&self) -> ImportOptions {
        let (conform, conform_fallback) = self.conform_selection();

        ImportOptions {
            collada: ColladaSettings {
                fix_orientation: self.fix_orientation,
                import_units: self.import_units,
                find_chains: self.find_chains,
                auto_connect: self.auto_connect,
                min_chain_length: self.min_chain_length,
                keep_bind_info: self.keep_bind_info,
            },
            conform,
            conform_fallback,
            delete_temp_collada: self.gr2_delete_dae,
            rename_armatures: self.rename_armatures,
            rename_meshes: self.rename_meshes,
            strip_junk: self.use_rename_junk,
            build_materials: self.use_build_material,
            apply_transforms: self.apply_transformation,
            delete_objects: self.delete_objects,
            actions: ActionOptions {
                rename: self.action_autorename,
                fake_user: self.action_set_fake_user,
                offset_to_frame_one: self.action_offset_zero,
            },
        }
    }

    /// Map the base-skeleton selection and the manual path onto a conform mode.
    ///
    /// A disabled selection uses the manual path when it names an existing file,
    /// otherwise conforming is off. `AUTO` and catalog keys keep the manual path
    /// as a fallback for when the catalog has no match.
    fn conform_selection(&self) -> (ConformMode, Option<Utf8PathBuf>) {
        if !self.gr2_conform_enabled {
            return (ConformMode::Disabled, None);
        }

        let manual_path = non_empty_path(&self.gr2_conform_skeleton_path);

        match self.gr2_base_skeleton.trim() {
            "" | BASE_SKELETON_DISABLED => match manual_path {
                Some(path) if path.is_file() => (ConformMode::Path(path), None),
                _ => {
                    tracing::debug!("Conforming enabled without a base skeleton or manual path, disabling");
                    (ConformMode::Disabled, None)
                }
            },
            BASE_SKELETON_AUTO => (ConformMode::Auto, manual_path),
            key => (ConformMode::Key(key.to_string()), manual_path),
        }
    }
}
