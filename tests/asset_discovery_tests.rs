//! Integration tests for skeleton and texture discovery
//!
//! These tests verify, against a full extracted-assets tree:
//! - Every race/gender base skeleton is cataloged in a stable order
//! - Presentation keys round-trip into conform modes
//! - Auto selection from animation file names
//! - Texture lookup for meshes of different races

mod common;

use common::{touch, utf8_temp_dir, write_skeletons, write_textures};
use dos2de_importer::models::{ConformMode, RaceGender};
use dos2de_importer::services::{SkeletonCatalog, TextureResolver, detect_race_gender};

const ALL_KEYS: [&str; 8] = [
    "Dwarves_Female",
    "Dwarves_Male",
    "Elves_Female",
    "Elves_Male",
    "Humans_Female",
    "Humans_Male",
    "Lizards_Female",
    "Lizards_Male",
];

#[test]
fn test_full_catalog() {
    let (_temp, root) = utf8_temp_dir();
    // Written out of order on purpose
    let mut keys = ALL_KEYS;
    keys.reverse();
    write_skeletons(&root, &keys);
    // Not a base skeleton
    touch(&root.join("Characters/Humans/Humans_Male_Cloth.gr2"));

    let catalog = SkeletonCatalog::scan(&root);

    assert_eq!(catalog.len(), 8);
    assert_eq!(catalog.keys(), ALL_KEYS.to_vec());
    assert!(catalog.entries().all(|entry| entry.path.is_file()));

    let expected: Vec<String> = RaceGender::all().map(|rg| rg.key()).collect();
    assert_eq!(catalog.keys(), expected);
}

#[test]
fn test_presentation_keys_parse_into_conform_modes() {
    let (_temp, root) = utf8_temp_dir();
    write_skeletons(&root, &["Elves_Female", "Lizards_Male"]);
    let catalog = SkeletonCatalog::scan(&root);

    let modes: Vec<ConformMode> = catalog
        .presentation_items()
        .iter()
        .map(|item| item.key.parse().unwrap())
        .collect();

    assert_eq!(
        modes,
        vec![
            ConformMode::Disabled,
            ConformMode::Auto,
            ConformMode::Key("Elves_Female".to_string()),
            ConformMode::Key("Lizards_Male".to_string()),
        ]
    );
    assert_eq!(
        catalog.resolve(&modes[3], "whatever.gr2"),
        Some(root.join("Characters/Lizards/Lizards_Male_Base.gr2"))
    );
}

#[test]
fn test_auto_selection_for_animations() {
    let (_temp, root) = utf8_temp_dir();
    let paths = write_skeletons(&root, &ALL_KEYS);
    let catalog = SkeletonCatalog::scan(&root);

    let cases = [
        ("Dwarves_Male_Walk_01.gr2", Some(&paths[1])),
        ("Lizards_Hero_Female_Attack.gr2", Some(&paths[6])),
        ("Humans_Female_Idle.gr2", Some(&paths[4])),
        ("Skeleton_Idle.gr2", None),
    ];
    for (file_name, expected) in cases {
        assert_eq!(
            catalog.resolve(&ConformMode::Auto, file_name).as_ref(),
            expected,
            "auto selection for {file_name}"
        );
    }
}

#[test]
fn test_rescan_picks_up_new_skeletons() {
    let (_temp, root) = utf8_temp_dir();
    write_skeletons(&root, &["Humans_Male"]);
    let mut catalog = SkeletonCatalog::scan(&root);
    assert_eq!(catalog.len(), 1);

    write_skeletons(&root, &["Dwarves_Female"]);
    assert_eq!(catalog.rescan(&root), 2);
    // Newly found entries go after the existing ones
    assert_eq!(catalog.keys(), vec!["Humans_Male", "Dwarves_Female"]);
}

#[test]
fn test_textures_per_race() {
    let (_temp, root) = utf8_temp_dir();
    write_textures(
        &root,
        "Dwarves_Male",
        &["Dwarves_Male_Body_A_BM.dds", "Dwarves_Male_Body_A_NM.dds"],
    );
    write_textures(&root, "Elves_Female", &["Elves_Female_Head_C_PM.dds"]);

    let resolver = TextureResolver::new();

    let dwarf = resolver.resolve_textures("Dwarves_Male_Body_A", &root);
    assert_eq!(dwarf.count(), 2);
    assert!(dwarf.has_pbr());

    let elf = resolver.resolve_textures("Elves_Female_Head_C", &root);
    assert_eq!(elf.count(), 1);
    assert!(elf.physicalmap.is_some());

    // Right folder, wrong object
    assert!(resolver.resolve_textures("Elves_Female_Head_A", &root).is_empty());
}

#[test]
fn test_hero_names_detect_last_token() {
    let detected = detect_race_gender("Humans_Male_to_Elves_Female_Body").map(|rg| rg.key());
    assert_eq!(detected.as_deref(), Some("Elves_Female"));

    // The hero token has the race and gender split apart
    assert!(detect_race_gender("Elves_Hero_Male_Body").is_none());
}
