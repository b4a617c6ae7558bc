//! Name normalization for newly imported objects.
//!
//! Three building blocks, used by the orchestrator's rename step:
//!
//! - [`apply_naming_patterns`]: ordered literal replacements (race shorthand, junk stripping)
//! - [`increment_string`]: bump the last number in a name, or append `_1`
//! - [`safe_rename`] / [`NameRegistry`]: increment a candidate until it no longer collides
//!
//! Meshes and armatures have independent namespaces, so a [`NameRegistry`] is
//! seeded from the data names of one object kind only.

use crate::models::RenameMode;
use crate::services::scene::ObjectKind;
use std::collections::HashSet;

/// Race/gender tokens and their two-letter shorthand, applied in this order.
pub const RACE_SHORTHAND_PATTERNS: [(&str, &str); 8] = [
    ("Dwarves_Female", "DF"),
    ("Dwarves_Male", "DM"),
    ("Elves_Female", "EF"),
    ("Elves_Male", "EM"),
    ("Humans_Female", "HF"),
    ("Humans_Male", "HM"),
    ("Lizards_Female", "LF"),
    ("Lizards_Male", "LM"),
];

/// Fluff the Collada exporter leaves in object names.
pub const JUNK_PATTERNS: [(&str, &str); 1] = [("_MeshShape", "")];

/// Prefix given to renamed armatures.
pub const ARMATURE_PREFIX: &str = "Arm_";

/// Replace every occurrence of each pattern with its replacement, in list order.
///
/// All patterns are applied; a later pattern sees the output of the earlier ones.
pub fn apply_naming_patterns<P, R>(name: &str, patterns: &[(P, R)]) -> String
where
    P: AsRef<str>,
    R: AsRef<str>,
{
    let mut result = name.to_string();
    for (pattern, replacement) in patterns {
        let pattern = pattern.as_ref();
        // str::replace with an empty pattern would interleave the replacement
        if pattern.is_empty() {
            continue;
        }
        result = result.replace(pattern, replacement.as_ref());
    }
    result
}

/// Increment the last run of ASCII digits in `s`, or append `_1` if there is none.
///
/// The new number is written so that it ends where the old run ended, without
/// starting before the run. Zero padding therefore survives (`Mesh_009` becomes
/// `Mesh_010`) and a number that needs more digits grows the string
/// (`Mesh_9` becomes `Mesh_10`).
///
/// The result is never equal to `s`.
pub fn increment_string(s: &str) -> String {
    match last_digit_run(s) {
        Some((start, end)) => {
            let next = increment_decimal(&s[start..end]);
            let splice_start = end.saturating_sub(next.len()).max(start);
            format!("{}{}{}", &s[..splice_start], next, &s[end..])
        }
        None => format!("{s}_1"),
    }
}

/// Byte span of the last maximal run of ASCII digits.
fn last_digit_run(s: &str) -> Option<(usize, usize)> {
    let bytes = s.as_bytes();
    let end = bytes.iter().rposition(u8::is_ascii_digit)? + 1;
    let start = bytes[..end]
        .iter()
        .rposition(|b| !b.is_ascii_digit())
        .map_or(0, |index| index + 1);
    Some((start, end))
}

/// `digits + 1` in decimal, without leading zeros. Works for any length.
fn increment_decimal(digits: &str) -> String {
    let trimmed = digits.trim_start_matches('0');
    let mut result: Vec<u8> = trimmed.bytes().collect();

    let mut carry = true;
    for digit in result.iter_mut().rev() {
        if *digit == b'9' {
            *digit = b'0';
        } else {
            *digit += 1;
            carry = false;
            break;
        }
    }
    if carry {
        result.insert(0, b'1');
    }

    // Only ASCII digits were pushed
    String::from_utf8(result).unwrap_or_default()
}

/// Increment `candidate` until it is not contained in `existing`.
pub fn safe_rename(candidate: &str, existing: &HashSet<String>) -> String {
    let mut name = candidate.to_string();
    while existing.contains(&name) {
        name = increment_string(&name);
    }
    name
}

/// Collision set for one object kind.
///
/// Starts from the names already present in the scene and grows with every
/// name it hands out, so two claims from the same registry never collide.
#[derive(Debug, Clone, Default)]
pub struct NameRegistry {
    taken: HashSet<String>,
}

impl NameRegistry {
    pub fn new<I, S>(existing: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            taken: existing.into_iter().map(Into::into).collect(),
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.taken.contains(name)
    }

    /// Resolve collisions for `candidate` and reserve the result.
    pub fn claim(&mut self, candidate: &str) -> String {
        let name = safe_rename(candidate, &self.taken);
        self.taken.insert(name.clone());
        name
    }
}

/// Build the rename candidate for a new object.
///
/// Returns `None` when the object should keep its name: the mode is disabled,
/// the object is neither a mesh nor an armature, or the candidate ends up empty.
pub fn candidate_name(
    kind: ObjectKind,
    mode: RenameMode,
    object_name: &str,
    file_base: &str,
    strip_junk: bool,
) -> Option<String> {
    if mode == RenameMode::Disabled {
        return None;
    }

    let prefix = match kind {
        ObjectKind::Armature => ARMATURE_PREFIX,
        ObjectKind::Mesh => "",
        ObjectKind::Other => return None,
    };

    let mut name = if mode.uses_filename() {
        format!("{prefix}{file_base}")
    } else {
        format!("{prefix}{object_name}")
    };

    if mode.uses_shorthand() {
        name = apply_naming_patterns(&name, &RACE_SHORTHAND_PATTERNS);
    }

    if strip_junk {
        name = apply_naming_patterns(&name, &JUNK_PATTERNS);
    }

    if name.is_empty() { None } else { Some(name) }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::RaceGender;

    #[test]
    fn test_increment_without_digits() {
        assert_eq!(increment_string("Arm_HF"), "Arm_HF_1");
        assert_eq!(increment_string(""), "_1");
    }

    #[test]
    fn test_increment_last_run() {
        assert_eq!(increment_string("Mesh_1"), "Mesh_2");
        assert_eq!(increment_string("a1b2"), "a1b3");
        assert_eq!(increment_string("Body_01_Mesh"), "Body_02_Mesh");
    }

    #[test]
    fn test_increment_grows_and_keeps_padding() {
        assert_eq!(increment_string("9"), "10");
        assert_eq!(increment_string("Mesh_9"), "Mesh_10");
        assert_eq!(increment_string("Mesh_009"), "Mesh_010");
        assert_eq!(increment_string("Mesh_099"), "Mesh_100");
        assert_eq!(increment_string("Mesh_999"), "Mesh_1000");
    }

    #[test]
    fn test_increment_huge_number() {
        let name = format!("Mesh_{}", "9".repeat(40));
        assert_eq!(increment_string(&name), format!("Mesh_1{}", "0".repeat(40)));
    }

    #[test]
    fn test_safe_rename() {
        let existing: HashSet<String> = ["HF_Body", "HF_Body_1", "HF_Body_2"]
            .into_iter()
            .map(String::from)
            .collect();

        assert_eq!(safe_rename("HF_Body", &existing), "HF_Body_3");
        assert_eq!(safe_rename("HF_Head", &existing), "HF_Head");
    }

    #[test]
    fn test_registry_batch_is_consistent() {
        let mut registry = NameRegistry::new(["HF"]);

        let first = registry.claim("HF");
        let second = registry.claim("HF");
        let third = registry.claim("HF");

        assert_eq!(first, "HF_1");
        assert_eq!(second, "HF_2");
        assert_eq!(third, "HF_3");
        assert!(registry.contains("HF_3"));
    }

    #[test]
    fn test_apply_naming_patterns() {
        let name = apply_naming_patterns("Humans_Female_MeshShape", &[("Humans_Female", "HF")]);
        let name = apply_naming_patterns(&name, &[("_MeshShape", "")]);
        assert_eq!(name, "HF");
    }

    #[test]
    fn test_apply_all_patterns_in_order() {
        let patterns = [("a", "b"), ("b", "c")];
        assert_eq!(apply_naming_patterns("aab", &patterns), "ccc");
        assert_eq!(apply_naming_patterns("keep", &[("", "x")]), "keep");
    }

    #[test]
    fn test_shorthand_table_matches_taxonomy() {
        let generated: Vec<(String, String)> = RaceGender::all()
            .map(|rg| (rg.key(), rg.shorthand()))
            .collect();
        let table: Vec<(String, String)> = RACE_SHORTHAND_PATTERNS
            .iter()
            .map(|(key, short)| (key.to_string(), short.to_string()))
            .collect();
        assert_eq!(generated, table);
    }

    #[test]
    fn test_candidate_name_modes() {
        assert_eq!(
            candidate_name(
                ObjectKind::Mesh,
                RenameMode::Shorthand,
                "Humans_Female_Body_MeshShape",
                "HUM_F_Body",
                true
            ),
            Some("HF_Body".to_string())
        );
        assert_eq!(
            candidate_name(
                ObjectKind::Armature,
                RenameMode::FilenameShorthand,
                "Armature",
                "Humans_Male_Walk",
                true
            ),
            Some("Arm_HM_Walk".to_string())
        );
        assert_eq!(
            candidate_name(
                ObjectKind::Armature,
                RenameMode::Filename,
                "Armature",
                "Humans_Male_Walk",
                true
            ),
            Some("Arm_Humans_Male_Walk".to_string())
        );
        assert_eq!(
            candidate_name(
                ObjectKind::Mesh,
                RenameMode::Shorthand,
                "Body_MeshShape",
                "x",
                false
            ),
            Some("Body_MeshShape".to_string())
        );
    }

    #[test]
    fn test_candidate_name_skips() {
        assert_eq!(
            candidate_name(ObjectKind::Mesh, RenameMode::Disabled, "Body", "file", true),
            None
        );
        assert_eq!(
            candidate_name(ObjectKind::Other, RenameMode::Filename, "Light", "file", true),
            None
        );
        assert_eq!(
            candidate_name(ObjectKind::Mesh, RenameMode::Shorthand, "_MeshShape", "file", true),
            None
        );
    }
}
