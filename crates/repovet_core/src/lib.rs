pub mod config;
pub mod error;
pub mod message;
pub mod tools;

pub use config::{AuditConfig, LlmConfig, ProviderConfig, RepovetConfig};
pub use error::AuditError;
pub use message::{Message, Role, ToolCall};
pub use tools::{ToolDescriptor, ToolProvider, ToolResult};
