//! Convenience re-exports of the most commonly used types.
//!
//! ```
//! use promptloop::prelude::*;
//! ```

pub use crate::agent::{Agent, DEFAULT_MAX_ITERATIONS};
pub use crate::config::{AgentConfig, LlmConfig};
pub use crate::error::{ErrorCategory, PromptloopError, Result};
pub use crate::parse::{extract_tool_call, parse_loose, ParsedToolCall};
pub use crate::provider::{create_provider, ChatCompletion, ChatProvider};
pub use crate::reflect::Reflector;
pub use crate::tools::builtin::{builtin_tool, builtin_tools, BUILTIN_TOOL_NAMES};
pub use crate::tools::{FnTool, Tool, ToolArguments, ToolParameters, ToolRegistry};
pub use crate::types::{
    ChatMessage, Conversation, FinishReason, GenerationSettings, Role, Usage,
};
pub use crate::util::RetryPolicy;
