use std::path::Path;

use mapcheck::domain::error::RuleEngineError;
use mapcheck::domain::report::RunSummary;
use mapcheck::engine::rules::{CollectingChannel, RuleEngine};
use mapcheck::io::mapping::MappingDir;
use mapcheck::io::{Format, reader};
use serde_json::{Value, json};

fn bundled_engine() -> RuleEngine<MappingDir> {
    RuleEngine::new(MappingDir::new(
        Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/rules-mapping"),
    ))
}

fn storelist_documents() -> (Value, Value) {
    let root = Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/storelist");
    let source = reader::read_document_path(&root.join("source.json"), Format::Json, "source")
        .expect("source fixture");
    let target = reader::read_document_path(&root.join("target.json"), Format::Json, "target")
        .expect("target fixture");
    (source, target)
}

#[test]
fn concurrent_runs_share_one_engine() {
    let engine = bundled_engine();
    let (source, target) = storelist_documents();

    std::thread::scope(|scope| {
        let handles: Vec<_> = (0..4)
            .map(|_| {
                scope.spawn(|| {
                    let mut channel = CollectingChannel::default();
                    engine
                        .execute_rules("storelist", &source, &target, &mut channel)
                        .expect("run");
                    channel
                })
            })
            .collect();
        for handle in handles {
            let channel = handle.join().expect("thread");
            assert_eq!(channel.completions.len(), 1);
            assert!(channel.failures.is_empty());
        }
    });
}

#[test]
fn fatal_errors_never_reach_the_channel() {
    let engine = bundled_engine();
    let (source, mut target) = storelist_documents();
    target["stores"][0]["id"] = json!("999");

    let mut events: Vec<Result<String, String>> = Vec::new();
    let mut channel = |outcome: Result<&RunSummary, &RuleEngineError>| {
        events.push(
            outcome
                .map(|summary| summary.pipeline.clone())
                .map_err(ToString::to_string),
        );
    };
    let error = engine
        .execute_rules("storelist", &source, &target, &mut channel)
        .expect_err("id mismatch");

    assert_eq!(error.kind(), "value_mismatch");
    assert!(events.is_empty());
}

#[test]
fn source_transforms_do_not_mutate_the_input_document() {
    let engine = bundled_engine();
    let (source, target) = storelist_documents();
    let before = source.clone();
    engine.evaluate("storelist", &source, &target).expect("match");
    assert_eq!(source, before);
    assert_eq!(source[0]["storeId"], json!("ST-101"));
}
