//! Schema validation for tool arguments and results
//!
//! Every tool declares a JSON Schema (draft 7) for its arguments and one for
//! its result. Schemas are compiled once when the tool is registered; a
//! schema that does not compile is rejected at that point.

use std::fmt;
use std::sync::Arc;

use jsonschema::error::ValidationErrorKind;
use jsonschema::{Draft, JSONSchema};
use serde_json::{Map, Value};
use thiserror::Error;
use tracing::debug;

use crate::utils::error::{McpError, McpResult};

/// A value did not conform to its schema
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{reason} at {}", if path.is_empty() { "/" } else { path.as_str() })]
pub struct SchemaViolation {
    /// JSON pointer to the first offending field; empty for the root
    pub path: String,
    /// Human-readable description of the violation
    pub reason: String,
}

/// A JSON Schema compiled for repeated validation
#[derive(Clone)]
pub struct CompiledSchema {
    raw: Value,
    compiled: Arc<JSONSchema>,
}

impl CompiledSchema {
    /// Compile a draft 7 schema
    pub fn compile(schema: Value) -> McpResult<Self> {
        let compiled = JSONSchema::options()
            .with_draft(Draft::Draft7)
            .compile(&schema)
            .map_err(|e| McpError::InvalidSchema(e.to_string()))?;
        Ok(Self {
            raw: schema,
            compiled: Arc::new(compiled),
        })
    }

    /// The schema as declared
    pub fn raw(&self) -> &Value {
        &self.raw
    }

    /// Whether the schema declares `"type": "object"`
    fn is_object_schema(&self) -> bool {
        match self.raw.get("type") {
            Some(Value::String(t)) => t == "object",
            _ => false,
        }
    }

    /// Top-level property defaults declared by the schema
    fn defaults(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.raw
            .get("properties")
            .and_then(Value::as_object)
            .into_iter()
            .flat_map(|props| props.iter())
            .filter_map(|(name, prop)| prop.get("default").map(|d| (name, d)))
    }
}

impl fmt::Debug for CompiledSchema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompiledSchema")
            .field("raw", &self.raw)
            .finish()
    }
}

impl PartialEq for CompiledSchema {
    fn eq(&self, other: &Self) -> bool {
        self.raw == other.raw
    }
}

/// Validator applying compiled schemas to payloads
#[derive(Debug, Clone, Copy, Default)]
pub struct SchemaValidator;

impl SchemaValidator {
    /// Creates a new schema validator
    pub fn new() -> Self {
        Self
    }

    /// Validate `value` against `schema`, returning the coerced value.
    ///
    /// A `null` value becomes `{}` for object schemas, and missing top-level
    /// properties with a declared `default` are filled in before checking.
    pub fn validate(
        &self,
        value: Value,
        schema: &CompiledSchema,
    ) -> Result<Value, SchemaViolation> {
        let value = coerce(value, schema);

        let result = match schema.compiled.validate(&value) {
            Ok(()) => Ok(()),
            Err(mut errors) => match errors.next() {
                Some(error) => Err(violation_from(&error)),
                None => Ok(()),
            },
        };

        match result {
            Ok(()) => Ok(value),
            Err(violation) => {
                debug!(path = %violation.path, reason = %violation.reason, "Schema validation failed");
                Err(violation)
            }
        }
    }
}

fn coerce(value: Value, schema: &CompiledSchema) -> Value {
    if !schema.is_object_schema() {
        return value;
    }

    let mut object = match value {
        Value::Null => Map::new(),
        Value::Object(object) => object,
        other => return other,
    };
    for (name, default) in schema.defaults() {
        if !object.contains_key(name) {
            object.insert(name.clone(), default.clone());
        }
    }
    Value::Object(object)
}

fn violation_from(error: &jsonschema::ValidationError<'_>) -> SchemaViolation {
    let mut path = error.instance_path.to_string();
    if let ValidationErrorKind::Required { property } = &error.kind {
        path.push('/');
        match property {
            Value::String(name) => path.push_str(name),
            other => path.push_str(&other.to_string()),
        }
    }
    SchemaViolation {
        path,
        reason: error.to_string(),
    }
}
