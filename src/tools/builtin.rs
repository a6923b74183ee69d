//! Built-in tools.
//!
//! A representative set covering pure computation (`calculator`), time
//! (`current_time`), network (`http_request`), and the filesystem
//! (`file_stats`). Each constructor returns the tool as `Arc<dyn Tool>`.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Datelike, Timelike, Utc};
use tracing::debug;

use crate::error::PromptloopError;
use crate::provider::http::shared_client;
use crate::tools::tool::{FnTool, Tool};
use crate::tools::types::ToolParameters;

/// Names of all built-in tools.
pub const BUILTIN_TOOL_NAMES: &[&str] = &["calculator", "current_time", "http_request", "file_stats"];

/// Create all built-in tools.
pub fn builtin_tools() -> Vec<Arc<dyn Tool>> {
    vec![
        calculator_tool(),
        current_time_tool(),
        http_request_tool(),
        file_stats_tool(),
    ]
}

/// Look up a built-in tool by name.
pub fn builtin_tool(name: &str) -> Option<Arc<dyn Tool>> {
    match name {
        "calculator" => Some(calculator_tool()),
        "current_time" => Some(current_time_tool()),
        "http_request" => Some(http_request_tool()),
        "file_stats" => Some(file_stats_tool()),
        _ => None,
    }
}

/// Create the `calculator` tool — evaluates an arithmetic expression.
pub fn calculator_tool() -> Arc<dyn Tool> {
    Arc::new(FnTool::new(
        "calculator",
        "Calculate the result of a mathematical expression, e.g. \"2 + 2 * 3\" or \"sin(pi / 2)\"",
        ToolParameters::object()
            .string("expression", "The mathematical expression to calculate", true)
            .build(),
        |args| async move {
            let expression = args.get_str("expression")?;
            debug!(expression, "calculator tool invoked");
            let result = super::calc::eval_expression(expression).map_err(|message| {
                PromptloopError::ToolExecution {
                    tool_name: "calculator".into(),
                    message: format!("failed to calculate '{expression}': {message}"),
                }
            })?;
            Ok(serde_json::json!({
                "expression": expression,
                "result": result,
            }))
        },
    ))
}

/// Create the `current_time` tool — returns the current time, broken down.
pub fn current_time_tool() -> Arc<dyn Tool> {
    Arc::new(FnTool::new(
        "current_time",
        "Get detailed information about the current time",
        ToolParameters::empty(),
        |_args| async move {
            let now = Utc::now();
            Ok(serde_json::json!({
                "iso": now.to_rfc3339(),
                "year": now.year(),
                "month": now.month(),
                "day": now.day(),
                "hour": now.hour(),
                "minute": now.minute(),
                "second": now.second(),
                "weekday": now.weekday().to_string(),
                "formatted": now.format("%Y-%m-%d %H:%M:%S").to_string(),
            }))
        },
    ))
}

/// Create the `http_request` tool — sends an HTTP request and returns the
/// status, headers, and JSON-or-text body.
pub fn http_request_tool() -> Arc<dyn Tool> {
    Arc::new(FnTool::new(
        "http_request",
        "Send an HTTP request and return the response status, headers, and body",
        ToolParameters::object()
            .string("url", "Request URL", true)
            .string("method", "Request method (GET, POST, PUT, PATCH, DELETE), default GET", false)
            .object_prop("headers", "Request headers", false)
            .object_prop("data", "JSON request body for POST/PUT/PATCH", false)
            .build(),
        |args| async move {
            let url = args.get_str("url")?.to_string();
            let method = args.get_str_opt("method").unwrap_or("GET").to_uppercase();
            debug!(%url, %method, "http_request tool invoked");

            let tool_err = |message: String| PromptloopError::ToolExecution {
                tool_name: "http_request".into(),
                message,
            };

            let method = method
                .parse::<reqwest::Method>()
                .map_err(|_| tool_err(format!("unsupported method '{method}'")))?;

            let mut request = shared_client().request(method.clone(), &url);
            if let Some(headers) = args.get_object("headers") {
                for (name, value) in headers {
                    if let Some(value) = value.as_str() {
                        request = request.header(name, value);
                    }
                }
            }
            let has_body = method == reqwest::Method::POST
                || method == reqwest::Method::PUT
                || method == reqwest::Method::PATCH;
            if has_body {
                if let Some(data) = args.get_object("data") {
                    request = request.json(data);
                }
            }

            let response = request
                .send()
                .await
                .map_err(|e| tool_err(e.to_string()))?;

            let status = response.status().as_u16();
            let headers: HashMap<String, String> = response
                .headers()
                .iter()
                .map(|(k, v)| (k.to_string(), String::from_utf8_lossy(v.as_bytes()).to_string()))
                .collect();
            let text = response.text().await.map_err(|e| tool_err(e.to_string()))?;
            let data = serde_json::from_str::<serde_json::Value>(&text)
                .unwrap_or(serde_json::Value::String(text));

            Ok(serde_json::json!({
                "status_code": status,
                "headers": headers,
                "data": data,
            }))
        },
    ))
}

/// Create the `file_stats` tool — statistics about files in a directory.
pub fn file_stats_tool() -> Arc<dyn Tool> {
    Arc::new(FnTool::new(
        "file_stats",
        "Get statistics about files in a directory: count, total size, extensions, oldest and newest files",
        ToolParameters::object()
            .string("directory", "Directory path to analyze, default is the current directory", false)
            .string("pattern", "File name pattern, e.g. \"*.rs\", default is \"*\"", false)
            .build(),
        |args| async move {
            let directory = args.get_str_opt("directory").unwrap_or(".").to_string();
            let pattern = args.get_str_opt("pattern").unwrap_or("*").to_string();
            debug!(%directory, %pattern, "file_stats tool invoked");

            let tool_err = |message: String| PromptloopError::ToolExecution {
                tool_name: "file_stats".into(),
                message,
            };

            let mut entries = tokio::fs::read_dir(&directory)
                .await
                .map_err(|e| tool_err(format!("'{directory}': {e}")))?;

            let mut file_count = 0u64;
            let mut total_size = 0u64;
            let mut extensions: HashMap<String, u64> = HashMap::new();
            let mut oldest: Option<(String, DateTime<Utc>)> = None;
            let mut newest: Option<(String, DateTime<Utc>)> = None;

            while let Some(entry) = entries
                .next_entry()
                .await
                .map_err(|e| tool_err(e.to_string()))?
            {
                let name = entry.file_name().to_string_lossy().to_string();
                if !name_matches(&name, &pattern) {
                    continue;
                }
                let metadata = match entry.metadata().await {
                    Ok(m) if m.is_file() => m,
                    _ => continue,
                };

                file_count += 1;
                total_size += metadata.len();

                let ext = std::path::Path::new(&name)
                    .extension()
                    .map(|e| format!(".{}", e.to_string_lossy().to_lowercase()))
                    .unwrap_or_default();
                *extensions.entry(ext).or_insert(0) += 1;

                if let Ok(modified) = metadata.modified() {
                    let modified: DateTime<Utc> = modified.into();
                    if oldest.as_ref().map(|(_, t)| modified < *t).unwrap_or(true) {
                        oldest = Some((name.clone(), modified));
                    }
                    if newest.as_ref().map(|(_, t)| modified > *t).unwrap_or(true) {
                        newest = Some((name, modified));
                    }
                }
            }

            let describe = |entry: &Option<(String, DateTime<Utc>)>| {
                entry.as_ref().map(|(path, modified)| {
                    serde_json::json!({ "path": path, "modified": modified.to_rfc3339() })
                })
            };

            Ok(serde_json::json!({
                "directory": directory,
                "pattern": pattern,
                "file_count": file_count,
                "total_size_bytes": total_size,
                "total_size_human": format_size(total_size),
                "extensions": extensions,
                "oldest_file": describe(&oldest),
                "newest_file": describe(&newest),
                "analyzed_at": Utc::now().to_rfc3339(),
            }))
        },
    ))
}

/// Match a file name against a simple pattern: `*` matches everything,
/// `*.ext` matches by suffix, anything else matches exactly.
fn name_matches(name: &str, pattern: &str) -> bool {
    if pattern == "*" {
        return true;
    }
    if let Some(suffix) = pattern.strip_prefix('*') {
        return name.ends_with(suffix);
    }
    name == pattern
}

/// Format a byte count for humans.
fn format_size(bytes: u64) -> String {
    const UNITS: &[&str] = &["B", "KB", "MB", "GB", "TB", "PB"];
    if bytes == 0 {
        return "0 B".to_string();
    }
    let exponent = ((bytes as f64).log(1024.0).floor() as usize).min(UNITS.len() - 1);
    let value = bytes as f64 / 1024f64.powi(exponent as i32);
    format!("{} {}", (value * 100.0).round() / 100.0, UNITS[exponent])
}
