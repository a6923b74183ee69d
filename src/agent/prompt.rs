//! System prompt rendering, including the tools block.

use crate::tools::ToolRegistry;

/// Render the full system prompt: the configured base prompt plus, when any
/// tools are registered, the tools block with invocation instructions.
pub fn render_system_prompt(base: &str, tools: &ToolRegistry) -> String {
    if tools.is_empty() {
        return base.to_string();
    }
    format!("{base}\n\n{}", render_tools_block(tools))
}

/// Render the tool descriptions and the strict invocation format the model
/// must follow.
pub fn render_tools_block(tools: &ToolRegistry) -> String {
    let mut block = String::from("You have access to the following tools:\n\n");

    for tool in tools.iter() {
        block.push_str(&format!("- {}: {}\n", tool.name(), tool.description()));
        for param in tool.parameters().describe() {
            let marker = if param.required { " (required)" } else { "" };
            block.push_str(&format!(
                "    - {}{}: {}\n",
                param.name, marker, param.description
            ));
        }
    }

    block.push_str(
        "\nTo use a tool, respond with EXACTLY this format:\n\
         TOOL: tool_name\n\
         ARGS: {\"param\": \"value\"}\n\n\
         For example, to calculate an expression:\n\
         TOOL: calculator\n\
         ARGS: {\"expression\": \"2 + 2\"}\n\n\
         The ARGS line must be valid JSON on a single line: use double quotes \
         around keys and string values, no comments, and no trailing commas.\n\
         If no tool is needed, answer the question directly.",
    );

    block
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::tools::{FnTool, ToolParameters};

    fn registry_with_echo() -> ToolRegistry {
        let mut tools = ToolRegistry::new();
        tools
            .register(Arc::new(FnTool::new(
                "echo",
                "Echo the input back",
                ToolParameters::object()
                    .string("text", "Text to echo", true)
                    .string("prefix", "Optional prefix", false)
                    .build(),
                |args| async move { Ok(serde_json::json!(args.get_str("text")?)) },
            )))
            .unwrap();
        tools
    }

    #[test]
    fn empty_registry_keeps_base_prompt() {
        let tools = ToolRegistry::new();
        assert_eq!(render_system_prompt("Base.", &tools), "Base.");
    }

    #[test]
    fn tools_block_lists_tools_and_parameters() {
        let block = render_tools_block(&registry_with_echo());
        assert!(block.contains("- echo: Echo the input back"));
        assert!(block.contains("text (required)"));
        assert!(block.contains("prefix: Optional prefix"));
        assert!(!block.contains("prefix (required)"));
        assert!(block.contains("TOOL: tool_name"));
        assert!(block.contains("ARGS: {\"param\": \"value\"}"));
    }

    #[test]
    fn system_prompt_appends_tools_block() {
        let prompt = render_system_prompt("Base.", &registry_with_echo());
        assert!(prompt.starts_with("Base.\n\n"));
        assert!(prompt.contains("You have access to the following tools:"));
    }
}
