//! Base skeleton catalog.
//!
//! Conforming a Granny file retargets its skeleton onto a race/gender base
//! skeleton shipped with the game. The catalog is built by scanning the
//! extracted shared assets, which follow a fixed layout:
//!
//! ```text
//! <assets_root>/Characters/<Race>/<Race>_<Female|Male>_Base.gr2
//! ```
//!
//! The catalog is an explicit value owned by the caller. Rescanning overwrites
//! the entries it finds and keeps the rest.

use crate::models::{
    BASE_SKELETON_AUTO, BASE_SKELETON_DISABLED, ConformMode, Gender, Race, RaceGender,
};
use crate::services::race_detection::matches_skeleton_key;
use camino::{Utf8Path, Utf8PathBuf};
use indexmap::IndexMap;

/// A base skeleton found on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkeletonEntry {
    pub path: Utf8PathBuf,
    pub race: Race,
    pub gender: Gender,
}

impl SkeletonEntry {
    pub fn race_gender(&self) -> RaceGender {
        RaceGender::new(self.race, self.gender)
    }

    /// Catalog key, e.g. `Humans_Female`.
    pub fn key(&self) -> String {
        self.race_gender().key()
    }
}

/// One selectable item of the skeleton list shown to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkeletonChoice {
    pub key: String,
    pub label: String,
    pub description: String,
}

/// Registry of base skeletons keyed by race/gender, in discovery order.
#[derive(Debug, Clone, Default)]
pub struct SkeletonCatalog {
    entries: IndexMap<RaceGender, SkeletonEntry>,
}

impl SkeletonCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a catalog from an extracted assets directory.
    pub fn scan(assets_root: &Utf8Path) -> Self {
        let mut catalog = Self::new();
        catalog.rescan(assets_root);
        catalog
    }

    /// Scan again, overwriting entries for every skeleton found.
    ///
    /// Entries whose files have disappeared are not purged.
    ///
    /// # Returns
    /// The number of skeletons found by this scan
    pub fn rescan(&mut self, assets_root: &Utf8Path) -> usize {
        let characters_dir = assets_root.join("Characters");
        if !characters_dir.is_dir() {
            tracing::info!("No Characters directory under {}, no base skeletons", assets_root);
            return 0;
        }

        let mut found = 0;
        for race in Race::ALL {
            let race_dir = characters_dir.join(race.as_str());
            if !race_dir.is_dir() {
                tracing::debug!("Skipping missing race directory: {}", race_dir);
                continue;
            }

            for gender in Gender::ALL {
                let path = race_dir.join(format!("{race}_{gender}_Base.gr2"));
                if path.is_file() {
                    tracing::debug!("Found base skeleton {}_{}: {}", race, gender, path);
                    self.insert(SkeletonEntry { path, race, gender });
                    found += 1;
                }
            }
        }

        tracing::info!("Skeleton scan of {} found {} base skeletons", assets_root, found);
        found
    }

    /// Add or replace the entry for its race/gender key.
    pub fn insert(&mut self, entry: SkeletonEntry) -> Option<SkeletonEntry> {
        self.entries.insert(entry.race_gender(), entry)
    }

    /// Look up an entry by its `<Race>_<Gender>` key.
    pub fn get(&self, key: &str) -> Option<&SkeletonEntry> {
        let race_gender = RaceGender::from_key(key)?;
        self.entries.get(&race_gender)
    }

    pub fn entries(&self) -> impl Iterator<Item = &SkeletonEntry> {
        self.entries.values()
    }

    pub fn keys(&self) -> Vec<String> {
        self.entries.keys().map(RaceGender::key).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The selectable list: `DISABLED` and `AUTO` first, then every entry.
    pub fn presentation_items(&self) -> Vec<SkeletonChoice> {
        let mut items = vec![
            SkeletonChoice {
                key: BASE_SKELETON_DISABLED.to_string(),
                label: "Disabled".to_string(),
                description: String::new(),
            },
            SkeletonChoice {
                key: BASE_SKELETON_AUTO.to_string(),
                label: "Auto".to_string(),
                description: "Auto-select a base skeleton to conform to, based on the file name"
                    .to_string(),
            },
        ];

        items.extend(self.entries.values().map(|entry| SkeletonChoice {
            key: entry.key(),
            label: entry.race_gender().label(),
            description: entry.path.to_string(),
        }));

        items
    }

    /// Pick the skeleton to conform `filename` to.
    ///
    /// Never fails: a miss or a skeleton that vanished from disk yields `None`,
    /// and the import proceeds without conforming.
    pub fn resolve(&self, mode: &ConformMode, filename: &str) -> Option<Utf8PathBuf> {
        match mode {
            ConformMode::Disabled => None,
            ConformMode::Path(path) => {
                if path.is_file() {
                    tracing::info!("Using conform skeleton path '{}'", path);
                    Some(path.clone())
                } else {
                    tracing::info!("Conform skeleton '{}' is not a file", path);
                    None
                }
            }
            ConformMode::Key(key) => {
                tracing::info!("Looking for base skeleton '{}'", key);
                match self.get(key) {
                    Some(entry) if entry.path.is_file() => {
                        tracing::info!("Using base skeleton '{}'", entry.path);
                        Some(entry.path.clone())
                    }
                    Some(entry) => {
                        tracing::info!("Base skeleton '{}' no longer exists", entry.path);
                        None
                    }
                    None => {
                        tracing::info!("No base skeleton registered for '{}'", key);
                        None
                    }
                }
            }
            ConformMode::Auto => self.auto_select(filename),
        }
    }

    fn auto_select(&self, filename: &str) -> Option<Utf8PathBuf> {
        tracing::info!("Auto-selecting base skeleton for '{}'", filename);

        let matched = self.entries.iter().find_map(|(race_gender, entry)| {
            matches_skeleton_key(filename, race_gender).map(|how| (entry, how))
        });

        match matched {
            Some((entry, how)) if entry.path.is_file() => {
                tracing::info!("Auto-selected skeleton {} ({:?} match)", entry.path, how);
                Some(entry.path.clone())
            }
            _ => {
                tracing::info!("No auto base skeleton found for '{}'", filename);
                None
            }
        }
    }
}
