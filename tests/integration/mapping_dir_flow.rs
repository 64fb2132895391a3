use std::fs;
use std::path::Path;

use mapcheck::domain::error::{ConfigurationError, Failure, RuleEngineError};
use mapcheck::domain::mapping::{CompareMethod, MappingSource};
use mapcheck::engine::rules::RuleEngine;
use mapcheck::io::mapping::{MAPPING_FILES, MappingDir};
use serde_json::json;
use tempfile::tempdir;

#[test]
fn bundled_mappings_parse_for_every_registered_pipeline() {
    let dir = MappingDir::new(Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/rules-mapping"));
    for (pipeline, _) in MAPPING_FILES {
        if !dir.path_for(pipeline).expect("registered").exists() {
            continue;
        }
        let spec = dir.load(pipeline).expect("mapping parses");
        assert!(spec.directives(pipeline).is_some(), "{pipeline} defines its key");
    }
}

#[test]
fn bundled_inventory_mapping_keeps_unsupported_directive() {
    let dir = MappingDir::new(Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/rules-mapping"));
    let spec = dir.load("inventoryList").expect("inventory mapping");
    let methods: Vec<CompareMethod> = spec
        .directives("inventoryList")
        .expect("directives")
        .iter()
        .map(|directive| directive.method)
        .collect();
    assert_eq!(
        methods,
        vec![
            CompareMethod::PathBasedCompare,
            CompareMethod::PathBasedCompare,
            CompareMethod::Unsupported
        ]
    );
}

#[test]
fn mapping_edits_apply_to_the_next_run() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("storelist_rules_mapping.json");
    let engine = RuleEngine::new(MappingDir::new(dir.path()));
    let source = json!([{"name": "Main"}]);
    let target = json!([{"name": "main"}]);

    fs::write(
        &path,
        r#"{"mapping":{"storelist":[{"method":"pathbasedcompare","source_path":"name|path","target_path":"name|path","rules":[{"ruleName":"equalValue"}]}]}}"#,
    )
    .expect("write mapping");
    assert!(matches!(
        engine.evaluate("storelist", &source, &target),
        Err(Failure::Aborted(RuleEngineError::ValueMismatch { .. }))
    ));

    fs::write(&path, r#"{"mapping":{"storelist":[]}}"#).expect("rewrite mapping");
    let summary = engine
        .evaluate("storelist", &source, &target)
        .expect("empty directive list completes");
    assert_eq!(summary.directives, 0);
    assert!(summary.is_completed());
}

#[test]
fn registered_pipeline_missing_from_its_file_is_reported() {
    let dir = tempdir().expect("tempdir");
    fs::write(
        dir.path().join("pricebook_rules_mapping.json"),
        r#"{"mapping":{"storelist":[]}}"#,
    )
    .expect("write mapping");
    let engine = RuleEngine::new(MappingDir::new(dir.path()));
    match engine.evaluate("pricebook", &json!({}), &json!({})) {
        Err(Failure::Aborted(RuleEngineError::Configuration(
            ConfigurationError::MissingPipeline { pipeline },
        ))) => assert_eq!(pipeline, "pricebook"),
        other => panic!("unexpected outcome: {other:?}"),
    }
}

#[test]
fn malformed_mapping_is_invalid() {
    let dir = tempdir().expect("tempdir");
    fs::write(dir.path().join("storelist_rules_mapping.json"), "{ not json").expect("write");
    let engine = RuleEngine::new(MappingDir::new(dir.path()));
    let failure = engine
        .evaluate("storelist", &json!([]), &json!([]))
        .expect_err("malformed mapping");
    assert_eq!(failure.errors()[0].kind(), "configuration_error");
}
