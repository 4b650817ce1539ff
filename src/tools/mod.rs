//! Tools the agency roles may invoke while taking a turn.
//!
//! Every tool returns a JSON value. Failures never escape the registry: they
//! are logged and handed back to the model as an `{"error": "..."}` payload so
//! the conversation keeps going.

mod content;
mod search;

pub use content::{write_content, FormattedContent, WriteContent};
pub use search::{
    format_results, research, Language, Research, ResearchOutcome, SearchError, SearchProvider,
    SearchResult, SearchResultSet, SerperClient, MAX_RESULTS_PER_LANGUAGE,
};

use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{json, Value};

use crate::llm::{FunctionSchema, ToolCall, ToolSchema};

/// Name of the bilingual web research tool.
pub const RESEARCH: &str = "research";
/// Name of the content formatting tool.
pub const WRITE_CONTENT: &str = "write_content";

#[async_trait]
pub trait Tool: Send + Sync {
    fn name(&self) -> &str;

    fn description(&self) -> &str;

    /// JSON schema of the arguments object.
    fn parameters_schema(&self) -> Value;

    async fn execute(&self, args: Value) -> anyhow::Result<Value>;
}

/// The tools available to a conversation, keyed by name.
#[derive(Clone, Default)]
pub struct ToolRegistry {
    tools: HashMap<String, Arc<dyn Tool>>,
}

impl ToolRegistry {
    /// Registry with the agency's standard tools.
    pub fn new(search: Arc<dyn SearchProvider>) -> Self {
        let mut registry = Self::default();
        registry.register(Arc::new(Research::new(search)));
        registry.register(Arc::new(WriteContent));
        registry
    }

    pub fn register(&mut self, tool: Arc<dyn Tool>) {
        self.tools.insert(tool.name().to_string(), tool);
    }

    /// Schemas for the subset of tools a role is bound to, in name order.
    pub fn schemas_for(&self, allowed: &BTreeSet<String>) -> Vec<ToolSchema> {
        allowed
            .iter()
            .filter_map(|name| self.tools.get(name))
            .map(|tool| ToolSchema {
                schema_type: "function",
                function: FunctionSchema {
                    name: tool.name().to_string(),
                    description: tool.description().to_string(),
                    parameters: tool.parameters_schema(),
                },
            })
            .collect()
    }

    /// Run a tool call on behalf of a role bound to `allowed`.
    pub async fn invoke(&self, allowed: &BTreeSet<String>, call: &ToolCall) -> Value {
        let name = call.function.name.as_str();

        if !allowed.contains(name) {
            tracing::warn!(tool = name, "Refusing tool call outside the role's bindings");
            return error_payload(format!("Tool '{}' is not permitted for this role", name));
        }

        let Some(tool) = self.tools.get(name) else {
            tracing::warn!(tool = name, "Model requested an unknown tool");
            return error_payload(format!("Unknown tool: {}", name));
        };

        let args: Value = match serde_json::from_str(&call.function.arguments) {
            Ok(args) => args,
            Err(e) => {
                tracing::warn!(tool = name, error = %e, "Malformed tool arguments");
                return error_payload(format!("Invalid arguments for {}: {}", name, e));
            }
        };

        tracing::debug!(tool = name, args = %args, "Executing tool");

        match tool.execute(args).await {
            Ok(value) => value,
            Err(e) => {
                tracing::error!(tool = name, error = %e, "Tool execution failed");
                error_payload(e.to_string())
            }
        }
    }
}

fn error_payload(message: String) -> Value {
    json!({ "error": message })
}

/// Fetch a required string argument.
fn required_str<'a>(args: &'a Value, key: &str) -> anyhow::Result<&'a str> {
    args[key]
        .as_str()
        .ok_or_else(|| anyhow::anyhow!("Missing '{}' argument", key))
}
