//! Race/gender detection from asset filenames.
//!
//! Divinity character assets carry their race and gender in the name
//! (`Humans_Female_Body_A`, `Elves_Hero_Male_Walk`). This module provides:
//! - [`detect_race_gender`]: the `<Race>_<Gender>` token used for texture lookup
//! - [`matches_skeleton_key`]: the two tests used to auto-select a base skeleton
//!
//! # Examples
//!
//! ```ignore
//! use dos2de_importer::services::race_detection::detect_race_gender;
//!
//! let detected = detect_race_gender("Humans_Female_Cloth_A");
//! assert_eq!(detected.map(|rg| rg.key()), Some("Humans_Female".to_string()));
//! ```

use crate::models::{Gender, Race, RaceGender};
use regex::Regex;
use std::sync::OnceLock;

/// Any run of characters, then a race, underscore, and gender.
///
/// The leading `.*` is greedy, so the last race/gender token in a name wins.
const RACE_GENDER_PATTERN: &str = r"^.*(Dwarves|Elves|Humans|Lizards)_(Male|Female)";

fn race_gender_regex() -> &'static Regex {
    static REGEX: OnceLock<Regex> = OnceLock::new();
    REGEX.get_or_init(|| Regex::new(RACE_GENDER_PATTERN).expect("Invalid race/gender regex"))
}

/// Detects the race/gender pair a filename was authored for.
///
/// # Returns
///
/// `None` when the name has no `<Race>_<Male|Female>` token.
pub fn detect_race_gender(filename: &str) -> Option<RaceGender> {
    let captures = race_gender_regex().captures(filename)?;
    let race = Race::parse(captures.get(1)?.as_str())?;
    let gender = Gender::parse(captures.get(2)?.as_str())?;

    tracing::debug!("Detected {}_{} in '{}'", race, gender, filename);
    Some(RaceGender::new(race, gender))
}

/// Which filename test matched a base skeleton.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkeletonMatch {
    /// The filename contains the catalog key, e.g. `Humans_Male`
    Key,
    /// The filename contains the hero token, e.g. `Humans_Hero_Male`
    Hero,
}

/// Checks whether `filename` refers to the skeleton of `race_gender`.
///
/// Plain substring containment, tried in order: the catalog key first, then
/// the hero token.
pub fn matches_skeleton_key(filename: &str, race_gender: &RaceGender) -> Option<SkeletonMatch> {
    if filename.contains(&race_gender.key()) {
        Some(SkeletonMatch::Key)
    } else if filename.contains(&race_gender.hero_token()) {
        Some(SkeletonMatch::Hero)
    } else {
        None
    }
}
