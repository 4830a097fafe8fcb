pub mod client;
pub mod registry;

pub use client::McpProvider;
pub use registry::CapabilityRegistry;
