//! Validation of the shipped `content/*.json` files.
//!
//! 1. Schema validity: every file deserializes
//! 2. Range constraints: difficulties, tolerances, limits
//! 3. Catalog shape: five missions per motion type, first one unlocked
//! 4. Agreement with the in-code fixture catalog

use lab_core::test_fixtures::default_defs;
use lab_core::{LabContent, MissionKind, MotionKind};
use lab_world::{build_catalog, load_content};
use std::collections::HashSet;
use std::sync::OnceLock;

/// Integration tests run from the crate directory, so go up two levels.
fn content_dir() -> String {
    let manifest = std::env::var("CARGO_MANIFEST_DIR").expect("CARGO_MANIFEST_DIR not set");
    format!("{manifest}/../../content")
}

fn load_test_content() -> &'static LabContent {
    static CONTENT: OnceLock<LabContent> = OnceLock::new();
    CONTENT.get_or_init(|| {
        load_content(&content_dir()).expect("load_content should succeed for shipped content")
    })
}

// =========================================================================
// 1. Schema validation
// =========================================================================

#[test]
fn content_loads_successfully() {
    let content = load_test_content();
    assert!(!content.content_version.is_empty());
}

#[test]
fn constants_are_sane() {
    let c = &load_test_content().constants;
    assert!((c.default_gravity - 9.8).abs() < 1e-12);
    assert_eq!(c.tick_interval_ms, 30);
    assert!(c.max_run_seconds > 0.0);
    assert_eq!(c.max_trajectory_samples, 500);
}

// =========================================================================
// 2. Range constraints
// =========================================================================

#[test]
fn mission_ids_are_unique_and_non_empty() {
    let content = load_test_content();
    let mut seen = HashSet::new();
    for def in &content.missions {
        assert!(!def.id.0.is_empty(), "mission has empty id");
        assert!(seen.insert(def.id.clone()), "duplicate id {}", def.id);
    }
}

#[test]
fn difficulties_and_tolerances_in_range() {
    for def in &load_test_content().missions {
        assert!((1..=5).contains(&def.difficulty), "{}: difficulty", def.id);
        assert!(def.tolerance >= 0.0, "{}: tolerance", def.id);
        assert!(def.target_value.is_finite(), "{}: target", def.id);
    }
}

#[test]
fn mission_prefix_matches_motion() {
    for def in &load_test_content().missions {
        let prefix = match def.kind {
            MissionKind::LinearMotion(_) => "MRU_",
            MissionKind::FreeFall(_) => "CAIDA_",
            MissionKind::Projectile(_) => "TIRO_",
        };
        assert!(def.id.0.starts_with(prefix), "{} should start with {prefix}", def.id);
    }
}

// =========================================================================
// 3. Catalog shape
// =========================================================================

#[test]
fn five_missions_per_motion_with_first_unlocked() {
    let catalog = build_catalog(load_test_content()).unwrap();
    assert_eq!(catalog.len(), 15);
    for motion in MotionKind::ALL {
        let missions: Vec<_> = catalog.by_motion(motion).collect();
        assert_eq!(missions.len(), 5, "{motion}");
        assert!(missions[0].is_unlocked(), "{motion}: first mission unlocked");
        assert!(missions[1..].iter().all(|m| !m.is_unlocked()));
        let difficulties: Vec<u8> = missions.iter().map(|m| m.difficulty()).collect();
        assert!(
            difficulties.windows(2).all(|w| w[0] <= w[1]),
            "{motion}: difficulty should not drop along the list"
        );
    }
}

// =========================================================================
// 4. Agreement with fixtures
// =========================================================================

#[test]
fn shipped_content_matches_fixture_catalog() {
    let content = load_test_content();
    let fixtures = default_defs();
    assert_eq!(content.missions.len(), fixtures.len());
    for (shipped, fixture) in content.missions.iter().zip(&fixtures) {
        assert_eq!(shipped.id, fixture.id);
        assert_eq!(shipped.name, fixture.name);
        assert_eq!(shipped.kind, fixture.kind, "{}", shipped.id);
        assert_eq!(shipped.difficulty, fixture.difficulty, "{}", shipped.id);
        assert!((shipped.target_value - fixture.target_value).abs() < 1e-12);
        assert!((shipped.tolerance - fixture.tolerance).abs() < 1e-12);
        assert_eq!(shipped.limits, fixture.limits, "{}", shipped.id);
    }
}
