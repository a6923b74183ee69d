//! The agent loop: prompt the model, parse tool directives from the reply,
//! execute tools, feed results back, and return the final answer.

mod prompt;

pub use prompt::{render_system_prompt, render_tools_block};

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::config::AgentConfig;
use crate::error::Result;
use crate::parse::{extract_tool_call, truncate_for_log};
use crate::provider::{create_provider, ChatProvider};
use crate::reflect::Reflector;
use crate::tools::builtin::builtin_tool;
use crate::tools::{Tool, ToolArguments, ToolRegistry};
use crate::types::{ChatMessage, Conversation, GenerationSettings, Usage};
use crate::util::RetryPolicy;

/// Default cap on model round-trips per query.
pub const DEFAULT_MAX_ITERATIONS: u32 = 10;

/// A tool-using chat agent.
///
/// The agent keeps a conversation, renders registered tools into the system
/// prompt, and loops: ask the model, look for a `TOOL:` directive in the
/// reply, run the tool, append the result as a user turn, ask again. A reply
/// with no directive is the final answer.
pub struct Agent {
    config: AgentConfig,
    provider: Box<dyn ChatProvider>,
    tools: ToolRegistry,
    retry: RetryPolicy,
    reflector: Option<Reflector>,
}

impl Agent {
    /// Create an agent from configuration, resolving the provider from the
    /// configured model and registering any configured default tools.
    pub fn new(config: AgentConfig) -> Result<Self> {
        let provider = create_provider(&config.llm)?;
        Self::with_provider(config, provider)
    }

    /// Create an agent with an explicit provider.
    pub fn with_provider(config: AgentConfig, provider: Box<dyn ChatProvider>) -> Result<Self> {
        let mut tools = ToolRegistry::new();
        for name in &config.default_tools {
            match builtin_tool(name) {
                Some(tool) => tools.register(tool)?,
                None => warn!(tool = %name, "unknown default tool, skipping"),
            }
        }

        let reflector = config.enable_reflection.then(|| Reflector {
            system_prompt: config.reflection_system_prompt.clone(),
            ..Reflector::new()
        });

        info!(
            provider = provider.provider_name(),
            model = provider.model_id(),
            tools = ?tools.names(),
            "agent created"
        );

        Ok(Self {
            config,
            provider,
            tools,
            retry: RetryPolicy::default(),
            reflector,
        })
    }

    /// Replace the retry policy.
    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Register a tool. Errors if a tool with the same name is already
    /// registered.
    pub fn add_tool(&mut self, tool: Arc<dyn Tool>) -> Result<()> {
        self.tools.register(tool)
    }

    /// Register a built-in tool by name. Returns false for unknown names.
    pub fn load_builtin_tool(&mut self, name: &str) -> Result<bool> {
        match builtin_tool(name) {
            Some(tool) => {
                self.tools.register(tool)?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Names of all registered tools, in registration order.
    pub fn available_tools(&self) -> Vec<&str> {
        self.tools.names()
    }

    pub fn config(&self) -> &AgentConfig {
        &self.config
    }

    /// Run a query to completion with the default iteration cap.
    pub async fn run(&self, query: &str) -> Result<String> {
        self.run_with_options(query, DEFAULT_MAX_ITERATIONS).await
    }

    /// Run a query to completion, with at most `max_iterations` model
    /// round-trips. When the cap is reached the last assistant reply is
    /// returned as-is.
    pub async fn run_with_options(&self, query: &str, max_iterations: u32) -> Result<String> {
        let mut conversation = Conversation::new();
        conversation.push(ChatMessage::system(render_system_prompt(
            &self.config.system_prompt,
            &self.tools,
        )));
        conversation.push(ChatMessage::user(query));

        let settings = self.generation_settings();
        let mut usage = Usage::default();

        for iteration in 0..max_iterations {
            debug!(iteration = iteration + 1, "requesting completion");
            let completion = self
                .retry
                .execute(|| self.provider.complete(conversation.as_slice(), &settings))
                .await?;
            usage.merge(&completion.usage);

            let reply = completion.text;
            debug!(reply = %truncate_for_log(&reply, 200), "model replied");
            conversation.push(ChatMessage::assistant(reply.clone()));

            let Some(call) = extract_tool_call(&reply) else {
                // No directive: this is the final answer.
                info!(
                    iterations = iteration + 1,
                    prompt_tokens = usage.prompt_tokens,
                    completion_tokens = usage.completion_tokens,
                    "run finished"
                );
                if let Some(reflector) = &self.reflector {
                    reflector
                        .apply(self.provider.as_ref(), &mut conversation)
                        .await;
                    if let Some((_, answer)) = conversation.last_exchange() {
                        return Ok(answer.to_string());
                    }
                }
                return Ok(reply);
            };

            info!(tool = %call.name, "executing tool");
            let feedback = self.run_tool(&call.name, call.arguments).await;
            conversation.push(ChatMessage::user(feedback));
        }

        warn!(max_iterations, "iteration cap reached, returning last reply");
        Ok(conversation
            .last_assistant()
            .map(str::to_string)
            .unwrap_or_default())
    }

    /// Execute one tool call and format the result (or failure) as the user
    /// turn fed back to the model.
    async fn run_tool(&self, name: &str, arguments: serde_json::Value) -> String {
        if self.tools.get(name).is_none() {
            warn!(tool = %name, "model requested an unknown tool");
            return format!(
                "Error: Tool {name} not found. Available tools: {}. \
                 Continue answering the user's question, or call another tool if needed.",
                self.tools.names().join(", ")
            );
        }

        let args = ToolArguments::new(arguments);
        match self.tools.execute(name, &args).await {
            Ok(result) => format!(
                "Tool execution result: {name} returned: {result}\n\
                 Continue answering the user's question, or call another tool if needed."
            ),
            Err(e) => {
                warn!(tool = %name, error = %e, "tool execution failed");
                format!(
                    "Error executing tool: {e}\n\
                     Continue answering the user's question, or call another tool if needed."
                )
            }
        }
    }

    fn generation_settings(&self) -> GenerationSettings {
        let llm = &self.config.llm;
        GenerationSettings {
            temperature: Some(llm.temperature),
            max_tokens: llm.max_tokens,
            top_p: llm.top_p,
            frequency_penalty: llm.frequency_penalty,
            presence_penalty: llm.presence_penalty,
            stop_sequences: None,
        }
    }
}

impl std::fmt::Debug for Agent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Agent")
            .field("provider", &self.provider.provider_name())
            .field("model", &self.provider.model_id())
            .field("tools", &self.tools.names())
            .field("reflection", &self.reflector.is_some())
            .finish()
    }
}
