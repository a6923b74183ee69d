//! Tool registry, arguments, and built-in tool tests.

use std::sync::Arc;

use pretty_assertions::assert_eq;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use promptloop::error::PromptloopError;
use promptloop::tools::builtin::{builtin_tool, builtin_tools, BUILTIN_TOOL_NAMES};
use promptloop::tools::{FnTool, Tool, ToolArguments, ToolParameters, ToolRegistry};

fn echo_tool() -> Arc<dyn Tool> {
    Arc::new(FnTool::new(
        "echo",
        "Echo the input back",
        ToolParameters::object()
            .string("text", "Text to echo", true)
            .build(),
        |args| async move { Ok(serde_json::json!({ "echo": args.get_str("text")? })) },
    ))
}

#[test]
fn parameter_builder_produces_schema_and_description() {
    let params = ToolParameters::object()
        .string("city", "City name", true)
        .integer("days", "Forecast days", false)
        .boolean("metric", "Use metric units", false)
        .build();

    assert_eq!(params.schema["type"], "object");
    assert_eq!(params.schema["required"], serde_json::json!(["city"]));

    let info = params.describe();
    assert_eq!(info.len(), 3);
    let city = info.iter().find(|p| p.name == "city").unwrap();
    assert!(city.required);
    assert_eq!(city.description, "City name");
    assert!(!info.iter().find(|p| p.name == "days").unwrap().required);
}

#[test]
fn typed_argument_extraction() {
    let args = ToolArguments::new(serde_json::json!({
        "name": "ada",
        "count": 3,
        "ratio": 0.5,
        "flag": true,
        "nested": { "k": "v" }
    }));

    assert_eq!(args.get_str("name").unwrap(), "ada");
    assert_eq!(args.get_i64("count").unwrap(), 3);
    assert_eq!(args.get_f64("ratio").unwrap(), 0.5);
    assert!(args.get_bool("flag").unwrap());
    assert_eq!(args.get_object("nested").unwrap()["k"], "v");

    assert!(args.get_str_opt("missing").is_none());
    assert!(matches!(
        args.get_str("missing"),
        Err(PromptloopError::InvalidArgument(_))
    ));
}

#[tokio::test]
async fn registry_registers_and_executes() {
    let mut registry = ToolRegistry::new();
    registry.register(echo_tool()).unwrap();

    assert_eq!(registry.names(), vec!["echo"]);
    assert!(registry.get("echo").is_some());

    let args = ToolArguments::new(serde_json::json!({ "text": "hello" }));
    let result = registry.execute("echo", &args).await.unwrap();
    assert_eq!(result["echo"], "hello");
}

#[tokio::test]
async fn registry_rejects_duplicates_and_unknown_names() {
    let mut registry = ToolRegistry::new();
    registry.register(echo_tool()).unwrap();

    let err = registry.register(echo_tool()).unwrap_err();
    assert!(matches!(err, PromptloopError::InvalidArgument(_)));

    let args = ToolArguments::new(serde_json::json!({}));
    let err = registry.execute("nope", &args).await.unwrap_err();
    assert!(matches!(
        err,
        PromptloopError::ToolExecution { tool_name, .. } if tool_name == "nope"
    ));
}

#[test]
fn builtin_set_is_stable() {
    let tools = builtin_tools();
    let names: Vec<&str> = tools.iter().map(|t| t.name()).collect();
    assert_eq!(names, BUILTIN_TOOL_NAMES);
}

#[tokio::test]
async fn calculator_evaluates_expressions() {
    let calc = builtin_tool("calculator").unwrap();
    let args = ToolArguments::new(serde_json::json!({ "expression": "2 + 2 * 3" }));
    let result = calc.execute(&args).await.unwrap();
    assert_eq!(result["result"], 8.0);

    let args = ToolArguments::new(serde_json::json!({ "expression": "sqrt(-1) +" }));
    let err = calc.execute(&args).await.unwrap_err();
    assert!(matches!(err, PromptloopError::ToolExecution { .. }));
}

#[tokio::test]
async fn current_time_reports_consistent_fields() {
    let tool = builtin_tool("current_time").unwrap();
    let args = ToolArguments::new(serde_json::json!({}));
    let result = tool.execute(&args).await.unwrap();

    let year = result["year"].as_i64().unwrap();
    assert!(year >= 2024);
    assert!(result["iso"].as_str().unwrap().starts_with(&year.to_string()));
    assert!(result["formatted"].as_str().unwrap().len() == 19);
}

#[tokio::test]
async fn http_request_tool_returns_status_and_json_body() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/status"))
        .and(header("x-probe", "1"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({ "ok": true })),
        )
        .mount(&server)
        .await;

    let tool = builtin_tool("http_request").unwrap();
    let args = ToolArguments::new(serde_json::json!({
        "url": format!("{}/status", server.uri()),
        "headers": { "x-probe": "1" }
    }));
    let result = tool.execute(&args).await.unwrap();

    assert_eq!(result["status_code"], 200);
    assert_eq!(result["data"]["ok"], true);
}

#[tokio::test]
async fn http_request_tool_posts_json_body() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/submit"))
        .and(wiremock::matchers::body_json(
            serde_json::json!({ "value": 7 }),
        ))
        .respond_with(ResponseTemplate::new(201).set_body_string("created"))
        .expect(1)
        .mount(&server)
        .await;

    let tool = builtin_tool("http_request").unwrap();
    let args = ToolArguments::new(serde_json::json!({
        "url": format!("{}/submit", server.uri()),
        "method": "post",
        "data": { "value": 7 }
    }));
    let result = tool.execute(&args).await.unwrap();

    assert_eq!(result["status_code"], 201);
    assert_eq!(result["data"], "created");
}

#[tokio::test]
async fn http_request_tool_rejects_bad_method() {
    let tool = builtin_tool("http_request").unwrap();
    let args = ToolArguments::new(serde_json::json!({
        "url": "http://localhost/",
        "method": "TELEPORT ME"
    }));
    let err = tool.execute(&args).await.unwrap_err();
    assert!(matches!(err, PromptloopError::ToolExecution { .. }));
}

#[tokio::test]
async fn file_stats_counts_matching_files() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("a.rs"), "fn main() {}").unwrap();
    std::fs::write(dir.path().join("b.rs"), "mod b;").unwrap();
    std::fs::write(dir.path().join("notes.txt"), "hello").unwrap();
    std::fs::create_dir(dir.path().join("subdir")).unwrap();

    let tool = builtin_tool("file_stats").unwrap();

    let args = ToolArguments::new(serde_json::json!({
        "directory": dir.path().to_str().unwrap(),
    }));
    let result = tool.execute(&args).await.unwrap();
    assert_eq!(result["file_count"], 3);
    assert_eq!(result["extensions"][".rs"], 2);
    assert_eq!(result["extensions"][".txt"], 1);
    assert!(result["oldest_file"].is_object());
    assert!(result["newest_file"].is_object());

    let args = ToolArguments::new(serde_json::json!({
        "directory": dir.path().to_str().unwrap(),
        "pattern": "*.rs"
    }));
    let result = tool.execute(&args).await.unwrap();
    assert_eq!(result["file_count"], 2);
    assert_eq!(result["total_size_bytes"], 18);
}

#[tokio::test]
async fn file_stats_missing_directory_is_an_error() {
    let tool = builtin_tool("file_stats").unwrap();
    let args = ToolArguments::new(serde_json::json!({
        "directory": "/definitely/not/a/real/path"
    }));
    let err = tool.execute(&args).await.unwrap_err();
    assert!(matches!(err, PromptloopError::ToolExecution { .. }));
}
