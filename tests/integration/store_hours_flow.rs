use mapcheck::domain::mapping::MappingSpecification;
use mapcheck::engine::hours::{HoursError, expand_weekly_hours};
use mapcheck::engine::rules::RuleEngine;
use serde_json::{Value, json};

fn hours_engine() -> RuleEngine<MappingSpecification> {
    let mapping = json!({
        "mapping": {
            "storelist": [{
                "method": "pathbasedcompare",
                "source_path": "hours|path",
                "target_path": "hours|path",
                "rules": [{"ruleName": "equalValue"}],
                "transformation_rules": {"timeFormatChange": "storeHoursTransformation"}
            }]
        }
    });
    RuleEngine::new(serde_json::from_value(mapping).expect("valid mapping"))
}

#[test]
fn expanded_hours_serialize_in_week_order_per_segment() {
    let expanded = expand_weekly_hours("Mon-Thu 10:30am-8:30pm, Fri 10:30am-9pm").expect("expand");
    let records: Value = serde_json::from_str(&expanded).expect("json array");
    let days: Vec<&str> = records
        .as_array()
        .expect("array")
        .iter()
        .map(|record| record["day"].as_str().expect("day"))
        .collect();
    assert_eq!(days, vec!["Mon", "Tue", "Wed", "Thu", "Fri"]);
    assert_eq!(records[4], json!({"day": "Fri", "open": "1030", "close": "2100"}));
}

#[test]
fn transformed_source_matches_structured_target() {
    let source = json!([{"hours": "Sat-Sun 10am-4pm"}]);
    let target = json!([{"hours": [
        {"day": "Sat", "open": "1000", "close": "1600"},
        {"day": "Sun", "open": "1000", "close": "1600"}
    ]}]);
    let summary = hours_engine()
        .evaluate("storelist", &source, &target)
        .expect("hours match");
    assert_eq!(summary.values_compared, 1);
}

#[test]
fn transformed_source_matches_serialized_target() {
    let source = json!([{"hours": "Sun closed"}]);
    let target = json!([{"hours": r#"[{"day":"Sun","open":"CLOSED","close":"CLOSED"}]"#}]);
    assert!(hours_engine().evaluate("storelist", &source, &target).is_ok());
}

#[test]
fn malformed_hours_abort_the_run() {
    let source = json!([{"hours": "Mon-Fri 9am"}]);
    let target = json!([{"hours": "[]"}]);
    let failure = hours_engine()
        .evaluate("storelist", &source, &target)
        .expect_err("missing close time");
    assert_eq!(failure.errors()[0].kind(), "transform_input_error");
    assert!(failure.to_string().contains("`9am`"));
}

#[test]
fn non_string_hours_are_rejected() {
    let source = json!([{"hours": 9}]);
    let target = json!([{"hours": "9"}]);
    let failure = hours_engine()
        .evaluate("storelist", &source, &target)
        .expect_err("numeric hours");
    assert!(failure.to_string().contains("storeHoursTransformation expects a string value"));
}

#[test]
fn hours_errors_name_the_offending_token() {
    assert!(matches!(
        expand_weekly_hours("Mon-Fri"),
        Err(HoursError::MissingTimeRange { .. })
    ));
    assert!(matches!(
        expand_weekly_hours("Mon-Fri xxam-5pm"),
        Err(HoursError::InvalidHour { time }) if time == "xxam"
    ));
}
