use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::error::ToolError;
use crate::api::ApiRequest;
use crate::mcp::schema::CompiledSchema;
use crate::utils::error::McpResult;

/// A tool as advertised by `tools/list`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tool {
    /// Unique identifier for the tool
    pub name: String,

    /// Human-readable description of functionality
    pub description: String,

    /// JSON Schema defining expected parameters
    pub input_schema: Value,

    /// JSON Schema describing the result
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_schema: Option<Value>,
}

/// Builds the outbound request for a tool from its validated arguments
pub trait ToolOperation: Send + Sync {
    /// Translate arguments into an API request
    fn build_request(&self, arguments: &Value) -> Result<ApiRequest, ToolError>;
}

impl<F> ToolOperation for F
where
    F: Fn(&Value) -> Result<ApiRequest, ToolError> + Send + Sync,
{
    fn build_request(&self, arguments: &Value) -> Result<ApiRequest, ToolError> {
        self(arguments)
    }
}

/// A registered tool: its schemas plus the operation behind it
#[derive(Clone)]
pub struct ToolDescriptor {
    /// Unique name within the registry
    pub name: String,
    /// Human-readable description
    pub description: String,
    /// Schema the arguments must satisfy
    pub input_schema: CompiledSchema,
    /// Schema the upstream result must satisfy
    pub output_schema: CompiledSchema,
    /// Builds the outbound request
    pub operation: Arc<dyn ToolOperation>,
}

impl ToolDescriptor {
    /// Creates a descriptor, compiling both schemas
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        input_schema: Value,
        output_schema: Value,
        operation: Arc<dyn ToolOperation>,
    ) -> McpResult<Self> {
        Ok(Self {
            name: name.into(),
            description: description.into(),
            input_schema: CompiledSchema::compile(input_schema)?,
            output_schema: CompiledSchema::compile(output_schema)?,
            operation,
        })
    }

    /// The wire form used in `tools/list`
    pub fn to_tool(&self) -> Tool {
        Tool {
            name: self.name.clone(),
            description: self.description.clone(),
            input_schema: self.input_schema.raw().clone(),
            output_schema: Some(self.output_schema.raw().clone()),
        }
    }
}

impl fmt::Debug for ToolDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ToolDescriptor")
            .field("name", &self.name)
            .field("description", &self.description)
            .field("input_schema", &self.input_schema)
            .field("output_schema", &self.output_schema)
            .finish_non_exhaustive()
    }
}

/// One inbound `tools/call`
#[derive(Debug, Clone, PartialEq)]
pub struct ToolCallRequest {
    /// JSON-RPC id of the originating request
    pub request_id: Value,
    /// Requested tool
    pub tool_name: String,
    /// Raw arguments
    pub arguments: Map<String, Value>,
}

impl ToolCallRequest {
    /// Creates a call request
    pub fn new(request_id: Value, tool_name: impl Into<String>, arguments: Map<String, Value>) -> Self {
        Self {
            request_id,
            tool_name: tool_name.into(),
            arguments,
        }
    }
}

/// Whether a call succeeded
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallStatus {
    /// The payload conforms to the output schema
    Success,
    /// The call failed; see the error detail
    Error,
}

/// The single result produced for a [`ToolCallRequest`]
#[derive(Debug, Clone, PartialEq)]
pub struct ToolCallResult {
    /// JSON-RPC id of the originating request
    pub request_id: Value,
    /// Validated payload or error detail
    pub outcome: Result<Value, ToolError>,
}

impl ToolCallResult {
    /// Success or error
    pub fn status(&self) -> CallStatus {
        match self.outcome {
            Ok(_) => CallStatus::Success,
            Err(_) => CallStatus::Error,
        }
    }

    /// The error detail, if the call failed
    pub fn error(&self) -> Option<&ToolError> {
        self.outcome.as_ref().err()
    }

    /// Convert into the `tools/call` response body
    pub fn into_tool_result(self) -> ToolResult {
        match self.outcome {
            Ok(payload) => ToolResult::success(payload),
            Err(error) => ToolResult::failure(&error),
        }
    }
}

/// Represents different content types for tool results
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ToolResultContent {
    /// Text content
    #[serde(rename = "text")]
    Text {
        /// The text content
        text: String,
    },
}

/// Body of a `tools/call` response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolResult {
    /// List of content items in the result
    pub content: Vec<ToolResultContent>,

    /// Machine-readable copy of the result
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub structured_content: Option<Value>,

    /// Whether the tool execution resulted in an error
    #[serde(default)]
    pub is_error: bool,
}

impl ToolResult {
    /// A successful result; objects are also returned as structured content
    pub fn success(payload: Value) -> Self {
        let text = serde_json::to_string_pretty(&payload).unwrap_or_else(|_| payload.to_string());
        let structured_content = payload.is_object().then_some(payload);
        Self {
            content: vec![ToolResultContent::Text { text }],
            structured_content,
            is_error: false,
        }
    }

    /// An error result carrying the error kind in structured form
    pub fn failure(error: &ToolError) -> Self {
        let mut structured = Map::new();
        structured.insert("error".to_string(), error.to_json());
        Self {
            content: vec![ToolResultContent::Text {
                text: error.to_string(),
            }],
            structured_content: Some(Value::Object(structured)),
            is_error: true,
        }
    }

    /// The first text item, if any
    pub fn text(&self) -> Option<&str> {
        self.content.iter().find_map(|c| match c {
            ToolResultContent::Text { text } => Some(text.as_str()),
        })
    }
}
