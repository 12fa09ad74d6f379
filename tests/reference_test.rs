//! Integration tests for cross-field references.

use pretty_assertions::assert_eq;
use rulechain::{reference, Chain, ExecutionError, Param, Report, Schema, SchemaError};
use serde_json::{json, Value};

async fn report_of(schema: &Schema, data: Value) -> Option<Report> {
    schema
        .validate(&data)
        .await
        .unwrap()
        .into_result()
        .err()
        .map(|err| err.into_report())
}

fn range_schema() -> Schema {
    Schema::object([
        ("min", Chain::new().number()),
        ("max", Chain::new().number().min(reference("min").unwrap())),
    ])
    .unwrap()
}

#[tokio::test]
async fn test_reference_reads_sibling_field() {
    let schema = range_schema();

    assert_eq!(report_of(&schema, json!({"min": 10, "max": 15})).await, None);

    let report = report_of(&schema, json!({"min": 10, "max": 5})).await.unwrap();
    assert_eq!(
        report.to_json(),
        json!({"max": ["This value is below the allowed minimum."]})
    );
}

#[tokio::test]
async fn test_referenced_large_integers_compare_exactly() {
    let schema = Schema::object([
        ("id", Chain::new().integer()),
        ("confirm_id", Chain::new().equal(reference("id").unwrap())),
    ])
    .unwrap();

    let same = json!({"id": 9_007_199_254_740_993_u64, "confirm_id": 9_007_199_254_740_993_u64});
    assert!(report_of(&schema, same).await.is_none());

    let off_by_one = json!({"id": 9_007_199_254_740_993_u64, "confirm_id": 9_007_199_254_740_992_u64});
    let report = report_of(&schema, off_by_one).await.unwrap();
    assert_eq!(
        report.to_json(),
        json!({"confirm_id": ["This value does not match the expected value."]})
    );
}

#[tokio::test]
async fn test_reference_is_resolved_per_call() {
    let schema = range_schema();
    assert!(report_of(&schema, json!({"min": 1, "max": 5})).await.is_none());
    assert!(report_of(&schema, json!({"min": 6, "max": 5})).await.is_some());
    assert!(report_of(&schema, json!({"min": 5, "max": 5})).await.is_none());
}

#[tokio::test]
async fn test_reference_value_in_message() {
    let schema = Schema::object([
        ("min", Chain::new().number()),
        (
            "max",
            Chain::new()
                .number()
                .min(reference("min").unwrap())
                .error("{name} must be at least {0}, got {value}"),
        ),
    ])
    .unwrap();

    let report = report_of(&schema, json!({"min": 10, "max": 3})).await.unwrap();
    assert_eq!(
        report.field("max").unwrap().messages(),
        vec!["max must be at least 10, got 3"]
    );
}

#[tokio::test]
async fn test_shape_references_resolve_from_root() {
    let schema = Schema::object([
        ("limit", Chain::new().integer()),
        (
            "settings",
            Chain::new().shape([
                ("retries", Chain::new().integer().max(reference("limit").unwrap())),
                (
                    "fallback",
                    Chain::new().nullable().equal(reference("settings.primary").unwrap()),
                ),
                ("primary", Chain::new().string()),
            ]),
        ),
    ])
    .unwrap();

    let data = json!({
        "limit": 3,
        "settings": {"retries": 5, "fallback": "b", "primary": "a"}
    });
    let report = report_of(&schema, data).await.unwrap();
    assert_eq!(
        report.to_json(),
        json!({
            "settings": {
                "retries": ["This value exceeds the allowed maximum."],
                "fallback": ["This value does not match the expected value."]
            }
        })
    );
}

#[tokio::test]
async fn test_array_item_references_resolve_from_root() {
    let schema = Schema::object([
        ("max_len", Chain::new().integer()),
        (
            "tags",
            Chain::new()
                .array()
                .of(Chain::new().string().max(reference("max_len").unwrap())),
        ),
    ])
    .unwrap();

    let report = report_of(&schema, json!({"max_len": 3, "tags": ["abc", "abcd", "ab"]}))
        .await
        .unwrap();
    assert_eq!(
        report.to_json(),
        json!({"tags": [null, ["This value exceeds the allowed maximum."]]})
    );
}

#[tokio::test]
async fn test_raw_chain_can_reference_value() {
    let schema = Schema::new(
        Chain::new()
            .custom_with(
                |call| Ok(call.value() == call.param(0)),
                [reference("value").unwrap()],
            )
            .error("self reference failed"),
    )
    .unwrap();

    assert!(schema.validate(&json!({"nested": [1, 2]})).await.unwrap().is_success());
}

#[tokio::test]
async fn test_index_segments_in_references() {
    let schema = Schema::object([
        ("choices", Chain::new().array()),
        ("first", Chain::new().equal(reference("choices.0").unwrap())),
    ])
    .unwrap();

    assert!(report_of(&schema, json!({"choices": ["x", "y"], "first": "x"})).await.is_none());
    assert!(report_of(&schema, json!({"choices": ["x", "y"], "first": "y"})).await.is_some());
}

#[tokio::test]
async fn test_nested_param_structures_resolve() {
    let bounds = Param::map([
        ("low", Param::from(reference("low").unwrap())),
        ("high", Param::from(100)),
    ]);
    let schema = Schema::object([
        ("low", Chain::new().integer()),
        (
            "value",
            Chain::new().custom_with(
                |call| {
                    let bounds = call.param(0);
                    let value = call.value().as_f64().unwrap_or(f64::NAN);
                    Ok(value >= bounds["low"].as_f64().unwrap_or(0.0)
                        && value <= bounds["high"].as_f64().unwrap_or(0.0))
                },
                [bounds],
            ),
        ),
    ])
    .unwrap();

    assert!(report_of(&schema, json!({"low": 10, "value": 50})).await.is_none());
    assert!(report_of(&schema, json!({"low": 60, "value": 50})).await.is_some());
}

#[tokio::test]
async fn test_one_of_with_referenced_list() {
    let schema = Schema::object([
        ("allowed", Chain::new().array()),
        ("pick", Chain::new().one_of(reference("allowed").unwrap())),
        (
            "pair",
            Chain::new().one_of(Param::list([
                Param::from(reference("allowed.0").unwrap()),
                Param::from("fallback"),
            ])),
        ),
    ])
    .unwrap();

    let ok = json!({"allowed": ["red", "blue"], "pick": "blue", "pair": "fallback"});
    assert!(report_of(&schema, ok).await.is_none());

    let bad = json!({"allowed": ["red", "blue"], "pick": "green", "pair": "blue"});
    let report = report_of(&schema, bad).await.unwrap();
    assert!(report.field("pick").is_some());
    assert!(report.field("pair").is_some());
}

#[tokio::test]
async fn test_unusable_reference_aborts_validation() {
    let schema = range_schema();
    let err = schema.validate(&json!({"min": "ten", "max": 5})).await.unwrap_err();
    assert!(matches!(
        err,
        ExecutionError::Schema(SchemaError::ExpectedNumber(_))
    ));

    let schema = Schema::object([("pick", Chain::new().one_of(reference("allowed").unwrap()))]).unwrap();
    let err = schema.validate(&json!({"pick": "x", "allowed": "x"})).await.unwrap_err();
    assert!(matches!(err, ExecutionError::Schema(SchemaError::ExpectedList(_))));
}

#[test]
fn test_malformed_reference_paths() {
    assert_eq!(reference(""), Err(SchemaError::InvalidReference(String::new())));
    assert_eq!(
        reference("a..b"),
        Err(SchemaError::InvalidReference("a..b".into()))
    );
}

#[test]
fn test_missing_reference_resolves_to_null() {
    let r = reference("a.b.c").unwrap();
    assert_eq!(r.resolve(&json!({"a": {"b": {}}})), Value::Null);
    assert_eq!(r.resolve(&json!({"a": {"b": {"c": 7}}})), json!(7));
}
