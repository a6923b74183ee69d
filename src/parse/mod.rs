//! Free-text tool-call extraction and loose JSON parsing.
//!
//! Models are instructed to request tools with a `TOOL: <name>` /
//! `ARGS: {...}` block, but replies drift: typos, localized labels, spaced-out
//! letters, single quotes, trailing commas, markdown fences. The extractor
//! tries a fixed ladder of patterns and repairs before giving up.

use std::sync::OnceLock;

use regex::Regex;
use tracing::{error, warn};

/// A tool invocation parsed out of the model's reply.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedToolCall {
    pub name: String,
    pub arguments: serde_json::Value,
}

/// Known tool-call formats, most common first. Each pattern captures the
/// tool name and a brace-delimited argument body.
const TOOL_PATTERNS: &[&str] = &[
    r"(?s)TOOL:\s*(\w+)\s*ARGS:\s*(\{.*?\})",                          // standard
    r"(?s)TOL:\s*(\w+)\s*ARGS:\s*(\{.*?\})",                           // typo
    r"(?s)使用工具:\s*(\w+)\s*参数:\s*(\{.*?\})",                       // Chinese
    r"(?s)USE TOOL:\s*(\w+)\s*WITH ARGS:\s*(\{.*?\})",                 // alternative English
    r"(?s)T\s*O\s*O\s*L\s*:\s*(\w+)\s*A\s*R\s*G\s*S\s*:\s*(\{.*?\})", // spaced letters
    r"(?s)工具名称:\s*(\w+)\s*工具参数:\s*(\{.*?\})",                   // alternative Chinese
    r"(?s)Tool:\s*(\w+)\s*Args:\s*(\{.*?\})",                          // capitalized
    r"(?s)Tool:\s*(\w+)\s*Arguments:\s*(\{.*?\})",                     // full word
];

fn tool_patterns() -> &'static [Regex] {
    static PATTERNS: OnceLock<Vec<Regex>> = OnceLock::new();
    PATTERNS.get_or_init(|| {
        TOOL_PATTERNS
            .iter()
            .map(|p| Regex::new(p).expect("tool pattern compiles"))
            .collect()
    })
}

/// Extract a tool call from the model's reply, if any.
///
/// Patterns are tried in order; the first match whose argument body parses as
/// JSON (after repair) wins. A match with unparseable arguments falls through
/// to the next pattern.
pub fn extract_tool_call(content: &str) -> Option<ParsedToolCall> {
    for pattern in tool_patterns() {
        if let Some(captures) = pattern.captures(content) {
            let name = captures.get(1)?.as_str().to_string();
            let raw_args = captures.get(2)?.as_str();
            match parse_loose(raw_args) {
                Some(arguments) => return Some(ParsedToolCall { name, arguments }),
                None => {
                    error!(
                        args = %truncate_for_log(raw_args, 100),
                        "failed to parse tool arguments, trying next pattern"
                    );
                    continue;
                }
            }
        }
    }
    None
}

/// Parse a JSON string, tolerating common model mistakes.
///
/// Tries, in order: strict parse; JSON extracted from markdown fences or the
/// outermost brace block; comment/trailing-comma cleanup; single quotes
/// replaced by double quotes. Returns `None` when nothing parses.
pub fn parse_loose(input: &str) -> Option<serde_json::Value> {
    if input.trim().is_empty() {
        warn!("received empty JSON string");
        return None;
    }

    if let Ok(value) = serde_json::from_str(input) {
        return Some(value);
    }

    if let Some(block) = extract_json_block(input) {
        if let Ok(value) = serde_json::from_str(&block) {
            return Some(value);
        }
    }

    let cleaned = clean_json(input);
    if let Ok(value) = serde_json::from_str(&cleaned) {
        return Some(value);
    }

    let requoted = cleaned.replace('\'', "\"");
    if let Ok(value) = serde_json::from_str(&requoted) {
        return Some(value);
    }

    error!(input = %truncate_for_log(input, 100), "unable to parse JSON");
    None
}

/// Extract a JSON candidate from markdown ```json fences or the outermost
/// `{...}` block.
pub fn extract_json_block(text: &str) -> Option<String> {
    static FENCE: OnceLock<Regex> = OnceLock::new();
    static BRACES: OnceLock<Regex> = OnceLock::new();

    let fence = FENCE.get_or_init(|| {
        Regex::new(r"(?s)```(?:json)?\s*(.*?)```").expect("fence pattern compiles")
    });
    if let Some(captures) = fence.captures(text) {
        return Some(captures.get(1)?.as_str().trim().to_string());
    }

    let braces = BRACES.get_or_init(|| Regex::new(r"(?s)\{.*\}").expect("brace pattern compiles"));
    braces.find(text).map(|m| m.as_str().to_string())
}

/// Strip `//` and `/* */` comments and trailing commas.
fn clean_json(input: &str) -> String {
    static TRAILING_COMMA: OnceLock<Regex> = OnceLock::new();

    let comma =
        TRAILING_COMMA.get_or_init(|| Regex::new(r",\s*([}\]])").expect("pattern compiles"));

    let stripped = strip_comments(input);
    comma.replace_all(&stripped, "$1").trim().to_string()
}

/// Remove comments outside string literals. Tracks both double- and
/// single-quoted strings so a `//` inside a value (e.g. a URL) survives.
fn strip_comments(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();
    let mut quote: Option<char> = None;

    while let Some(c) = chars.next() {
        match quote {
            Some(q) => {
                out.push(c);
                if c == '\\' {
                    if let Some(escaped) = chars.next() {
                        out.push(escaped);
                    }
                } else if c == q {
                    quote = None;
                }
            }
            None => match c {
                '"' | '\'' => {
                    quote = Some(c);
                    out.push(c);
                }
                '/' if chars.peek() == Some(&'/') => {
                    for skipped in chars.by_ref() {
                        if skipped == '\n' {
                            out.push('\n');
                            break;
                        }
                    }
                }
                '/' if chars.peek() == Some(&'*') => {
                    chars.next();
                    let mut prev = '\0';
                    for skipped in chars.by_ref() {
                        if prev == '*' && skipped == '/' {
                            break;
                        }
                        prev = skipped;
                    }
                }
                _ => out.push(c),
            },
        }
    }

    out
}

/// Truncate content for log display, respecting char boundaries.
pub fn truncate_for_log(content: &str, max_chars: usize) -> String {
    if content.chars().count() <= max_chars {
        return content.to_string();
    }
    let truncated: String = content.chars().take(max_chars).collect();
    format!("{truncated}...")
}
