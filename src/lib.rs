//! Promptloop — a minimal LLM agent library.
//!
//! Sends a natural-language query to an OpenAI-format chat-completion
//! endpoint, describes registered tools to the model in plain prose, parses
//! the model's free-text reply for a `TOOL:`/`ARGS:` directive, executes the
//! matching local tool, and feeds the result back until the model produces a
//! final answer. An optional reflection pass asks the model to critique and
//! improve that answer.
//!
//! # Quick Start
//!
//! ```no_run
//! use promptloop::prelude::*;
//!
//! # async fn example() -> promptloop::error::Result<()> {
//! let config = AgentConfig::from_env();
//! let mut agent = Agent::new(config)?;
//! agent.load_builtin_tool("calculator")?;
//! let answer = agent.run("What is 2 + 2 * 3?").await?;
//! println!("{answer}");
//! # Ok(())
//! # }
//! ```

pub mod agent;
pub mod config;
pub mod error;
pub mod parse;
pub mod prelude;
pub mod provider;
pub mod reflect;
pub mod tools;
pub mod types;
pub mod util;
