//! PBR texture discovery for imported meshes.
//!
//! Character textures live next to each other in one folder per race/gender:
//!
//! ```text
//! <assets_root>/Textures/Characters/<Race>/<Race>_<Gender>/<name>..._<ROLE>.dds
//! ```
//!
//! A file belongs to an object when its name starts with the object's file
//! name and ends in `_<ROLE>.dds`. Roles are matched independently and the
//! first hit in directory listing order wins.

use crate::models::RaceGender;
use crate::services::race_detection::detect_race_gender;
use camino::{Utf8Path, Utf8PathBuf};
use regex::Regex;
use std::fs;

/// Texture maps found for one object. Each role is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TextureSet {
    /// `_BM` / `_BMA` base color (with or without alpha)
    pub basecolor: Option<Utf8PathBuf>,
    /// `_NM` normal map
    pub normalmap: Option<Utf8PathBuf>,
    /// `_PM` physical map (metallic/roughness)
    pub physicalmap: Option<Utf8PathBuf>,
    /// `_MSKcloth`
    pub cloth_mask: Option<Utf8PathBuf>,
    /// `_MSKskin`
    pub skin_mask: Option<Utf8PathBuf>,
}

impl TextureSet {
    pub fn is_empty(&self) -> bool {
        !self.has_pbr() && self.cloth_mask.is_none() && self.skin_mask.is_none()
    }

    /// True if any of the maps a PBR material is built from was found.
    ///
    /// Masks alone do not count.
    pub fn has_pbr(&self) -> bool {
        self.basecolor.is_some() || self.normalmap.is_some() || self.physicalmap.is_some()
    }

    /// Number of roles filled in.
    pub fn count(&self) -> usize {
        [
            &self.basecolor,
            &self.normalmap,
            &self.physicalmap,
            &self.cloth_mask,
            &self.skin_mask,
        ]
        .iter()
        .filter(|role| role.is_some())
        .count()
    }
}

/// Folder holding the textures of one race/gender.
pub fn texture_dir(assets_root: &Utf8Path, race_gender: &RaceGender) -> Utf8PathBuf {
    assets_root
        .join("Textures")
        .join("Characters")
        .join(race_gender.race.as_str())
        .join(race_gender.key())
}

/// Finds the texture maps matching an object's file name.
///
/// The role suffix patterns are compiled once at construction; the per-object
/// part is a literal prefix test, so object names need no escaping.
pub struct TextureResolver {
    /// `_BM.dds` or `_BMA.dds`
    basecolor_pattern: Regex,

    /// `_NM.dds`
    normalmap_pattern: Regex,

    /// `_PM.dds`
    physicalmap_pattern: Regex,

    /// `_MSKcloth.dds`
    cloth_mask_pattern: Regex,

    /// `_MSKskin.dds`
    skin_mask_pattern: Regex,
}

impl TextureResolver {
    pub fn new() -> Self {
        Self {
            basecolor_pattern: Regex::new(r"_(BM|BMA)\.dds$").expect("Invalid basecolor regex"),
            normalmap_pattern: Regex::new(r"_(NM)\.dds$").expect("Invalid normal map regex"),
            physicalmap_pattern: Regex::new(r"_(PM)\.dds$").expect("Invalid physical map regex"),
            cloth_mask_pattern: Regex::new(r"_(MSKcloth)\.dds$").expect("Invalid cloth mask regex"),
            skin_mask_pattern: Regex::new(r"_(MSKskin)\.dds$").expect("Invalid skin mask regex"),
        }
    }

    /// Resolve the textures for `object_filename` under `assets_root`.
    ///
    /// # Arguments
    /// * `object_filename` - Base name of the imported file, e.g. `Humans_Female_Body_A`
    /// * `assets_root` - Root of the extracted shared assets
    ///
    /// # Returns
    /// The roles that were found. Misses are logged and yield an empty set.
    pub fn resolve_textures(&self, object_filename: &str, assets_root: &Utf8Path) -> TextureSet {
        let Some(race_gender) = detect_race_gender(object_filename) else {
            tracing::info!("No race/gender in '{}', skipping texture lookup", object_filename);
            return TextureSet::default();
        };

        let dir = texture_dir(assets_root, &race_gender);
        if !dir.is_dir() {
            tracing::info!("Texture directory '{}' does not exist", dir);
            return TextureSet::default();
        }

        let entries = match fs::read_dir(&dir) {
            Ok(entries) => entries,
            Err(e) => {
                tracing::warn!("Failed to list texture directory '{}': {}", dir, e);
                return TextureSet::default();
            }
        };

        let mut textures = TextureSet::default();
        for entry in entries.flatten() {
            let Ok(file_name) = entry.file_name().into_string() else {
                continue;
            };
            let Some(rest) = file_name.strip_prefix(object_filename) else {
                continue;
            };

            let path = dir.join(&file_name);
            for (slot, pattern) in [
                (&mut textures.basecolor, &self.basecolor_pattern),
                (&mut textures.normalmap, &self.normalmap_pattern),
                (&mut textures.physicalmap, &self.physicalmap_pattern),
                (&mut textures.cloth_mask, &self.cloth_mask_pattern),
                (&mut textures.skin_mask, &self.skin_mask_pattern),
            ] {
                if slot.is_none() && pattern.is_match(rest) {
                    tracing::debug!("Matched texture {}", path);
                    *slot = Some(path.clone());
                }
            }
        }

        tracing::info!(
            "Found {} texture(s) for '{}' in {}",
            textures.count(),
            object_filename,
            dir
        );
        textures
    }
}

impl Default for TextureResolver {
    fn default() -> Self {
        Self::new()
    }
}
