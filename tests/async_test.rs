//! Integration tests for asynchronous rules and concurrent validation.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use futures::future::join_all;
use pretty_assertions::assert_eq;
use rulechain::{Chain, ExecutionError, RuleCall, RuleError, Schema, ValidateOptions};
use serde_json::json;

fn taken_usernames() -> Chain {
    Chain::new()
        .string()
        .custom_async(|call: RuleCall<'static>| async move {
            tokio::time::sleep(Duration::from_millis(5)).await;
            Ok::<_, RuleError>(!matches!(call.value().as_str(), Some("admin" | "root")))
        })
        .error("{value} is taken")
}

#[tokio::test]
async fn test_async_rule_pass_and_fail() {
    let schema = Schema::object([("username", taken_usernames())]).unwrap();

    assert!(schema.validate(&json!({"username": "ada"})).await.unwrap().is_success());

    let err = schema
        .validate(&json!({"username": "root"}))
        .await
        .unwrap()
        .into_result()
        .unwrap_err();
    assert_eq!(
        err.report().field("username").unwrap().messages(),
        vec!["root is taken"]
    );
}

#[tokio::test]
async fn test_async_rules_run_in_chain_order() {
    let seen = Arc::new(parking_lot::Mutex::new(Vec::new()));

    let record = |label: &'static str, delay: u64| {
        let seen = Arc::clone(&seen);
        move |_call: RuleCall<'static>| {
            let seen = Arc::clone(&seen);
            async move {
                tokio::time::sleep(Duration::from_millis(delay)).await;
                seen.lock().push(label);
                Ok::<_, RuleError>(true)
            }
        }
    };

    let schema = Schema::new(
        Chain::new()
            .custom_async(record("slow", 20))
            .custom(|_| Ok(true))
            .custom_async(record("fast", 1)),
    )
    .unwrap();

    assert!(schema.validate(&json!(1)).await.unwrap().is_success());
    assert_eq!(*seen.lock(), vec!["slow", "fast"]);
}

#[tokio::test]
async fn test_abort_early_skips_later_rules() {
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&calls);

    let schema = Schema::new(
        Chain::new()
            .custom_async(|_call: RuleCall<'static>| async { Ok::<_, RuleError>(false) })
            .custom_async(move |_call: RuleCall<'static>| {
                let counter = Arc::clone(&counter);
                async move {
                    counter.fetch_add(1, Ordering::SeqCst);
                    Ok::<_, RuleError>(true)
                }
            }),
    )
    .unwrap();

    let result = schema
        .validate_with(&json!("x"), ValidateOptions::new().abort_early(true))
        .await
        .unwrap();
    assert!(result.is_failure());
    assert_eq!(calls.load(Ordering::SeqCst), 0);

    let result = schema.validate(&json!("x")).await.unwrap();
    assert!(result.is_failure());
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_async_fault_aborts_validation() {
    let schema = Schema::object([
        (
            "a",
            Chain::new().custom_async(|_call: RuleCall<'static>| async {
                Err::<bool, _>(RuleError::new("lookup service unavailable"))
            }),
        ),
        ("b", Chain::new().required()),
    ])
    .unwrap();

    let err = schema.validate(&json!({})).await.unwrap_err();
    assert!(matches!(err, ExecutionError::Rule(_)));
    assert_eq!(err.to_string(), "lookup service unavailable");
}

#[tokio::test]
async fn test_concurrent_calls_are_isolated() {
    let schema = Schema::object([
        (
            "name",
            Chain::new()
                .string()
                .transform(|value, _| Ok(json!(value.as_str().unwrap_or_default().to_uppercase())))
                .custom_async(|call: RuleCall<'static>| async move {
                    let delay = call.value().as_str().map_or(0, str::len) as u64;
                    tokio::time::sleep(Duration::from_millis(delay)).await;
                    Ok::<_, RuleError>(call.value().as_str().is_some_and(|s| s.starts_with('A')))
                })
                .error("{name}: {value} does not start with A"),
        ),
        ("age", Chain::new().nullable().integer().min(18).error("{value} < {0}")),
    ])
    .unwrap();

    let inputs: Vec<_> = (0..16)
        .map(|i| {
            let name = if i % 2 == 0 { format!("anna{i}") } else { format!("bob{i}") };
            json!({"name": name, "age": i + 10})
        })
        .collect();

    let results = join_all(inputs.iter().map(|data| schema.validate(data))).await;

    for (i, result) in results.into_iter().enumerate() {
        let result = result.unwrap();
        let report = result.into_result().err().map(|err| err.into_report());
        let expected_name = (i % 2 == 1).then(|| format!("name: BOB{i} does not start with A"));
        let expected_age = (i + 10 < 18).then(|| format!("{} < 18", i + 10));

        let name = report
            .as_ref()
            .and_then(|r| r.field("name"))
            .map(|r| r.messages()[0].to_string());
        let age = report
            .as_ref()
            .and_then(|r| r.field("age"))
            .map(|r| r.messages()[0].to_string());

        assert_eq!(name, expected_name, "input {i}");
        assert_eq!(age, expected_age, "input {i}");
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_shared_schema_across_tasks() {
    let schema = Schema::object([(
        "id",
        Chain::new()
            .integer()
            .custom_async(|call: RuleCall<'static>| async move {
                tokio::task::yield_now().await;
                Ok::<_, RuleError>(call.value().as_i64().is_some_and(|n| n % 3 != 0))
            })
            .error("{value} is a multiple of three"),
    )])
    .unwrap();

    let handles: Vec<_> = (0..24)
        .map(|i| {
            let schema = schema.clone();
            tokio::spawn(async move {
                let data = json!({"id": i});
                let result = schema.validate(&data).await.unwrap();
                (i, result.into_result().err().map(|err| err.into_report()))
            })
        })
        .collect();

    for handle in handles {
        let (i, report) = handle.await.unwrap();
        if i % 3 == 0 {
            let report = report.unwrap();
            assert_eq!(
                report.field("id").unwrap().messages(),
                vec![format!("{i} is a multiple of three")]
            );
        } else {
            assert!(report.is_none(), "id {i}");
        }
    }
}
