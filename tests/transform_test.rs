//! Integration tests for value transforms.

use pretty_assertions::assert_eq;
use rulechain::{reference, Chain, ExecutionError, Report, RuleError, Schema};
use serde_json::{json, Value};

async fn report_of(schema: &Schema, data: &Value) -> Option<Report> {
    schema
        .validate(data)
        .await
        .unwrap()
        .into_result()
        .err()
        .map(|err| err.into_report())
}

fn parse_number(value: &Value, _root: &Value) -> Result<Value, RuleError> {
    match value {
        Value::String(s) => s
            .trim()
            .parse::<f64>()
            .map(Value::from)
            .map_err(RuleError::from_source),
        other => Ok(other.clone()),
    }
}

#[tokio::test]
async fn test_later_rules_see_transformed_value() {
    let schema = Schema::object([(
        "amount",
        Chain::new().transform(parse_number).number().min(10),
    )])
    .unwrap();

    assert!(report_of(&schema, &json!({"amount": " 12.5 "})).await.is_none());

    let report = report_of(&schema, &json!({"amount": "3"})).await.unwrap();
    assert_eq!(
        report.to_json(),
        json!({"amount": ["This value is below the allowed minimum."]})
    );
}

#[tokio::test]
async fn test_rules_before_transform_see_original_value() {
    let schema = Schema::new(
        Chain::new()
            .string()
            .transform(parse_number)
            .number(),
    )
    .unwrap();

    assert!(report_of(&schema, &json!("42")).await.is_none());
    let report = report_of(&schema, &json!(42)).await.unwrap();
    assert_eq!(report.messages(), vec!["This value must be a string."]);
}

#[tokio::test]
async fn test_input_is_not_modified() {
    let schema = Schema::object([(
        "tag",
        Chain::new().transform(|value, _| Ok(json!(value.to_string().len()))),
    )])
    .unwrap();

    let data = json!({"tag": "original"});
    let before = data.clone();
    assert!(report_of(&schema, &data).await.is_none());
    assert_eq!(data, before);
}

#[tokio::test]
async fn test_references_see_original_data() {
    let schema = Schema::object([
        (
            "password",
            Chain::new().transform(|value, _| Ok(json!(value.as_str().unwrap_or_default().trim()))),
        ),
        ("confirm", Chain::new().equal(reference("password").unwrap())),
    ])
    .unwrap();

    assert!(report_of(&schema, &json!({"password": " pw ", "confirm": " pw "})).await.is_none());
    assert!(report_of(&schema, &json!({"password": " pw ", "confirm": "pw"})).await.is_some());
}

#[tokio::test]
async fn test_transform_does_not_leak_into_other_fields() {
    let schema = Schema::object([
        ("a", Chain::new().transform(|_, _| Ok(json!(100))).max(200)),
        ("b", Chain::new().max(200)),
    ])
    .unwrap();

    let report = report_of(&schema, &json!({"a": 500, "b": 500})).await.unwrap();
    assert!(report.field("a").is_none());
    assert!(report.field("b").is_some());
}

#[tokio::test]
async fn test_transform_receives_root() {
    let schema = Schema::object([
        ("unit", Chain::new().one_of(json!(["cm", "m"]))),
        (
            "length",
            Chain::new()
                .transform(|value, root| {
                    let factor = if root["unit"] == "m" { 100.0 } else { 1.0 };
                    Ok(json!(value.as_f64().unwrap_or(0.0) * factor))
                })
                .max(250),
        ),
    ])
    .unwrap();

    assert!(report_of(&schema, &json!({"unit": "cm", "length": 200})).await.is_none());
    assert!(report_of(&schema, &json!({"unit": "m", "length": 2})).await.is_none());
    assert!(report_of(&schema, &json!({"unit": "m", "length": 3})).await.is_some());
}

#[tokio::test]
async fn test_transform_fault_aborts_validation() {
    let schema = Schema::object([("amount", Chain::new().transform(parse_number).number())]).unwrap();

    let err = schema.validate(&json!({"amount": "twelve"})).await.unwrap_err();
    let rule = err.as_rule().unwrap();
    assert_eq!(rule.message(), "invalid float literal");
    assert!(matches!(err, ExecutionError::Rule(_)));
}

#[tokio::test]
async fn test_transform_skipped_for_nullable_values() {
    let schema = Schema::object([(
        "n",
        Chain::new()
            .nullable()
            .transform(|_, _| Err(RuleError::new("must not run")))
            .number(),
    )])
    .unwrap();

    assert!(report_of(&schema, &json!({"n": ""})).await.is_none());
    assert!(schema.validate(&json!({"n": "1"})).await.is_err());
}

#[tokio::test]
async fn test_round_trip_with_cross_field_reference() {
    let schema = Schema::object([
        ("min", Chain::new().transform(parse_number).number()),
        (
            "max",
            Chain::new()
                .transform(parse_number)
                .number()
                .min(reference("min").unwrap()),
        ),
    ])
    .unwrap();

    let data = json!({"min": 10, "max": "15"});
    assert!(report_of(&schema, &data).await.is_none());

    let data = json!({"min": 10, "max": "5"});
    let report = report_of(&schema, &data).await.unwrap();
    assert_eq!(
        report.to_json(),
        json!({"max": ["This value is below the allowed minimum."]})
    );
}

#[tokio::test]
async fn test_custom_rule_compares_against_untransformed_input() {
    let schema = Schema::object([(
        "age",
        Chain::new()
            .string()
            .transform(parse_number)
            .custom(|call| {
                let original = call.root()["age"].as_str().unwrap_or_default();
                Ok(call.value().is_number() && original == "25")
            }),
    )])
    .unwrap();

    assert!(report_of(&schema, &json!({"age": "25"})).await.is_none());
    assert!(report_of(&schema, &json!({"age": "26"})).await.is_some());
}
