use std::collections::HashMap;
use std::sync::Arc;

use tracing::debug;

use super::error::RegistryError;
use super::models::{Tool, ToolDescriptor};

/// Name-indexed set of tools, kept in registration order.
///
/// Built once at startup, then shared read-only behind an `Arc`.
#[derive(Debug, Default)]
pub struct ToolRegistry {
    tools: Vec<Arc<ToolDescriptor>>,
    index: HashMap<String, usize>,
}

impl ToolRegistry {
    /// Creates an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a tool; its name must not be registered yet
    pub fn register(&mut self, descriptor: ToolDescriptor) -> Result<(), RegistryError> {
        if self.index.contains_key(&descriptor.name) {
            return Err(RegistryError::DuplicateTool(descriptor.name));
        }
        debug!(tool = %descriptor.name, "Registered tool");
        self.index.insert(descriptor.name.clone(), self.tools.len());
        self.tools.push(Arc::new(descriptor));
        Ok(())
    }

    /// Look up a tool by name
    pub fn resolve(&self, name: &str) -> Result<Arc<ToolDescriptor>, RegistryError> {
        self.index
            .get(name)
            .map(|&i| Arc::clone(&self.tools[i]))
            .ok_or_else(|| RegistryError::UnknownTool(name.to_string()))
    }

    /// All tools in registration order
    pub fn list(&self) -> impl Iterator<Item = &Arc<ToolDescriptor>> + '_ {
        self.tools.iter()
    }

    /// Wire form of every tool, for `tools/list`
    pub fn tools(&self) -> Vec<Tool> {
        self.tools.iter().map(|t| t.to_tool()).collect()
    }

    /// Number of registered tools
    pub fn len(&self) -> usize {
        self.tools.len()
    }

    /// Whether no tool is registered
    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}
