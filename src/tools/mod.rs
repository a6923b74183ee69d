//! Tool system: trait, registry, argument access, built-ins.

pub mod arguments;
pub mod builtin;
mod calc;
pub mod registry;
pub mod tool;
pub mod types;

pub use arguments::ToolArguments;
pub use registry::ToolRegistry;
pub use tool::{FnTool, Tool};
pub use types::ToolParameters;
