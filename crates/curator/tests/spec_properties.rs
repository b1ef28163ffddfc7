//! End-to-end properties of the specification engine, loaded the way
//! users load it: from a YAML file on disk.

use curator::spec::tag_values;
use curator::{Specification, TagValues};
use std::fs;
use tempfile::TempDir;

const SPEC_YAML: &str = r#"
tags:
  - name: mice
    pattern: "mice-([a-zA-Z0-9]+)"
  - name: day
    pattern: "day-([0-9]+)"
path_patterns:
  - "mice-{mice}/day-{day}/file{extension}"
  - "mice-{mice}/file{extension}"
"#;

fn load(yaml: &str) -> Specification {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("sample.yaml");
    fs::write(&path, yaml).unwrap();
    Specification::from_yaml_file(&path).unwrap()
}

#[test]
fn round_trip_restores_tags() {
    let spec = load(SPEC_YAML);
    let tags = tag_values([("mice", "G1"), ("day", "02"), ("extension", ".npy")]);
    let path = spec.build_path(&tags).unwrap();
    assert_eq!(spec.match_path(&path).unwrap(), tags);
}

#[test]
fn build_is_deterministic() {
    let spec = load(SPEC_YAML);
    let tags = tag_values([("mice", "G1"), ("day", "02"), ("extension", ".npy")]);
    let first = spec.build_path(&tags);
    for _ in 0..10 {
        assert_eq!(spec.build_path(&tags), first);
    }
}

#[test]
fn first_matching_template_wins() {
    let spec = load(
        r#"
tags: []
path_patterns:
  - "{a}/data"
  - "{b}/data"
"#,
    );
    let tags = spec.match_path("x/data").unwrap();
    assert!(tags.contains_key("a"));
    assert!(!tags.contains_key("b"));
}

#[test]
fn optional_group_is_omitted_or_kept() {
    let spec = load(
        r#"
tags: []
path_patterns:
  - "a[/{x}]/b"
"#,
    );
    assert_eq!(spec.build_path(&TagValues::new()).as_deref(), Some("a/b"));
    assert_eq!(
        spec.build_path(&tag_values([("x", "1")])).as_deref(),
        Some("a/1/b")
    );
}

#[test]
fn enumeration_rejects_out_of_set_values() {
    let spec = load(
        r#"
tags: []
path_patterns:
  - "{x<foo|bar>|foo}"
"#,
    );
    // Out-of-set value: no template remains, and "baz" is never emitted.
    assert_eq!(spec.build_path(&tag_values([("x", "baz")])), None);
    assert_eq!(spec.build_path(&tag_values([("x", "bar")])).as_deref(), Some("bar"));
}

#[test]
fn default_substitutes_for_missing_tag() {
    let spec = load(
        r#"
tags: []
path_patterns:
  - "{day|01}"
"#,
    );
    assert_eq!(spec.build_path(&TagValues::new()).as_deref(), Some("01"));
}

#[test]
fn inconsistent_default_fails_at_load() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("broken.yaml");
    fs::write(
        &path,
        r#"
tags: []
path_patterns:
  - "{x<foo|bar>|baz}"
"#,
    )
    .unwrap();
    assert!(Specification::from_yaml_file(&path).is_err());
}

#[test]
fn concrete_scenario_matches_and_builds() {
    let spec = load(SPEC_YAML);

    let tags = spec.match_path("mice-G1/day-02/file.npy").unwrap();
    assert_eq!(
        tags,
        tag_values([("mice", "G1"), ("day", "02"), ("extension", ".npy")])
    );

    assert_eq!(
        spec.build_path(&tags).as_deref(),
        Some("mice-G1/day-02/file.npy")
    );
}

#[test]
fn validate_agrees_with_match() {
    let spec = load(SPEC_YAML);
    assert!(spec.validate("mice-G1/day-02/file.npy"));
    assert!(spec.validate("mice-G1/file.csv"));
    assert!(!spec.validate("elsewhere/file.csv"));
}
