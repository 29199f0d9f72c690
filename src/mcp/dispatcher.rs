//! Tool call dispatch
//!
//! Each `tools/call` walks an explicit state machine:
//!
//! ```text
//! Received -> Resolving -> Validating -> Invoking -> Responding -> Done
//! ```
//!
//! Any state may short-circuit to `Responding` with an error, and every path
//! ends in `Done` with exactly one [`ToolCallResult`]. Output validation
//! happens on the way from `Invoking` to `Responding`.

use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, instrument, warn};

use crate::api::{ApiAdapter, ApiRequest};
use crate::config::Credential;
use crate::mcp::retry::RetryPolicy;
use crate::mcp::schema::SchemaValidator;
use crate::mcp::tools::{
    ToolCallRequest, ToolCallResult, ToolDescriptor, ToolError, ToolRegistry,
};
use crate::telemetry::{add_metric, span_duration};

enum DispatchState {
    Received(ToolCallRequest),
    Resolving {
        request_id: Value,
        tool_name: String,
        arguments: Value,
    },
    Validating {
        request_id: Value,
        descriptor: Arc<ToolDescriptor>,
        arguments: Value,
    },
    Invoking {
        request_id: Value,
        descriptor: Arc<ToolDescriptor>,
        request: ApiRequest,
    },
    Responding {
        request_id: Value,
        outcome: Result<Value, ToolError>,
    },
    Done(ToolCallResult),
}

impl DispatchState {
    fn name(&self) -> &'static str {
        match self {
            Self::Received(_) => "received",
            Self::Resolving { .. } => "resolving",
            Self::Validating { .. } => "validating",
            Self::Invoking { .. } => "invoking",
            Self::Responding { .. } => "responding",
            Self::Done(_) => "done",
        }
    }
}

/// Routes tool calls to the API adapter
pub struct Dispatcher {
    registry: Arc<ToolRegistry>,
    adapter: Arc<dyn ApiAdapter>,
    credential: Arc<Credential>,
    retry: RetryPolicy,
    validator: SchemaValidator,
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("tools", &self.registry.len())
            .field("credential", &self.credential)
            .field("retry", &self.retry)
            .finish_non_exhaustive()
    }
}

impl Dispatcher {
    /// Creates a dispatcher over a finished registry
    pub fn new(
        registry: Arc<ToolRegistry>,
        adapter: Arc<dyn ApiAdapter>,
        credential: Arc<Credential>,
        retry: RetryPolicy,
    ) -> Self {
        Self {
            registry,
            adapter,
            credential,
            retry,
            validator: SchemaValidator::new(),
        }
    }

    /// The registry calls are resolved against
    pub fn registry(&self) -> &Arc<ToolRegistry> {
        &self.registry
    }

    /// Runs one tool call to completion
    #[instrument(skip(self, request), fields(tool = %request.tool_name, id = %request.request_id))]
    pub async fn dispatch(&self, request: ToolCallRequest) -> ToolCallResult {
        let _guard = span_duration("dispatch_tool_call");
        let tool_name = request.tool_name.clone();
        let mut state = DispatchState::Received(request);

        loop {
            debug!(state = state.name(), "Dispatch step");
            state = match state {
                DispatchState::Received(request) => DispatchState::Resolving {
                    request_id: request.request_id,
                    tool_name: request.tool_name,
                    arguments: Value::Object(request.arguments),
                },

                DispatchState::Resolving {
                    request_id,
                    tool_name,
                    arguments,
                } => match self.registry.resolve(&tool_name) {
                    Ok(descriptor) => DispatchState::Validating {
                        request_id,
                        descriptor,
                        arguments,
                    },
                    Err(_) => DispatchState::Responding {
                        request_id,
                        outcome: Err(ToolError::unknown_tool(&tool_name)),
                    },
                },

                DispatchState::Validating {
                    request_id,
                    descriptor,
                    arguments,
                } => {
                    let built = self
                        .validator
                        .validate(arguments, &descriptor.input_schema)
                        .map_err(ToolError::invalid_input)
                        .and_then(|arguments| descriptor.operation.build_request(&arguments));
                    match built {
                        Ok(request) => DispatchState::Invoking {
                            request_id,
                            descriptor,
                            request,
                        },
                        Err(error) => DispatchState::Responding {
                            request_id,
                            outcome: Err(error),
                        },
                    }
                }

                DispatchState::Invoking {
                    request_id,
                    descriptor,
                    request,
                } => {
                    let outcome = self.execute(&request).await.and_then(|payload| {
                        self.validator
                            .validate(payload, &descriptor.output_schema)
                            .map_err(ToolError::invalid_output)
                    });
                    DispatchState::Responding {
                        request_id,
                        outcome,
                    }
                }

                DispatchState::Responding {
                    request_id,
                    outcome,
                } => {
                    let status = match &outcome {
                        Ok(_) => "success",
                        Err(error) => {
                            warn!(kind = %error.kind, "Tool call failed: {}", error.message);
                            error.kind.as_str()
                        }
                    };
                    add_metric(
                        "tool.calls",
                        1.0,
                        &[("tool", tool_name.clone()), ("status", status.to_string())],
                    );
                    DispatchState::Done(ToolCallResult {
                        request_id,
                        outcome,
                    })
                }

                DispatchState::Done(result) => return result,
            };
        }
    }

    /// Sends `request` upstream, retrying transient failures per the policy
    pub async fn execute(&self, request: &ApiRequest) -> Result<Value, ToolError> {
        let mut attempt: u32 = 1;
        loop {
            match self.adapter.invoke(request, &self.credential).await {
                Ok(payload) => {
                    add_metric(
                        "upstream.attempts",
                        f64::from(attempt),
                        &[("path", request.path())],
                    );
                    return Ok(payload);
                }
                Err(error) if error.is_transient() => match self.retry.delay_for(attempt) {
                    Some(delay) => {
                        warn!(
                            attempt,
                            delay_ms = delay.as_millis() as u64,
                            "Transient upstream failure, retrying: {}",
                            error
                        );
                        tokio::time::sleep(delay).await;
                        attempt += 1;
                    }
                    None => {
                        warn!(attempt, "Retries exhausted: {}", error);
                        return Err(ToolError::retry_exhausted(attempt, error));
                    }
                },
                Err(error) => {
                    debug!(attempt, "Upstream call failed: {}", error);
                    return Err(ToolError::from(error));
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::AdapterError;
    use crate::mcp::tools::{CallStatus, ToolErrorKind};
    use async_trait::async_trait;
    use serde_json::{json, Map};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::time::Duration;

    struct FailingAdapter {
        error: AdapterError,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl ApiAdapter for FailingAdapter {
        async fn invoke(
            &self,
            _request: &ApiRequest,
            _credential: &Credential,
        ) -> Result<Value, AdapterError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Err(self.error.clone())
        }
    }

    fn registry() -> Arc<ToolRegistry> {
        let mut registry = ToolRegistry::new();
        registry
            .register(
                ToolDescriptor::new(
                    "ping_upstream",
                    "Calls the upstream",
                    json!({"type": "object"}),
                    json!({"type": "object"}),
                    Arc::new(|_: &Value| -> Result<ApiRequest, ToolError> {
                        Ok(ApiRequest::get(["v1", "ping"]))
                    }),
                )
                .unwrap(),
            )
            .unwrap();
        Arc::new(registry)
    }

    fn dispatcher(adapter: Arc<FailingAdapter>, max_retries: u32) -> Dispatcher {
        Dispatcher::new(
            registry(),
            adapter,
            Arc::new(Credential::new("test-key")),
            RetryPolicy {
                max_retries,
                initial_delay: Duration::from_millis(1),
                max_delay: Duration::from_millis(2),
                backoff_factor: 2.0,
            },
        )
    }

    #[tokio::test]
    async fn test_protocol_mismatch_is_not_retried() {
        let adapter = Arc::new(FailingAdapter {
            error: AdapterError::protocol_mismatch(Some(200), "garbage"),
            calls: AtomicUsize::new(0),
        });
        let result = dispatcher(adapter.clone(), 3)
            .dispatch(ToolCallRequest::new(json!(1), "ping_upstream", Map::new()))
            .await;

        assert_eq!(result.status(), CallStatus::Error);
        assert_eq!(result.error().unwrap().kind, ToolErrorKind::ProtocolMismatch);
        assert_eq!(adapter.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_zero_retries_gives_single_attempt() {
        let adapter = Arc::new(FailingAdapter {
            error: AdapterError::transient(Some(503), "unavailable"),
            calls: AtomicUsize::new(0),
        });
        let result = dispatcher(adapter.clone(), 0)
            .dispatch(ToolCallRequest::new(json!("a"), "ping_upstream", Map::new()))
            .await;

        assert_eq!(result.request_id, json!("a"));
        assert_eq!(result.error().unwrap().kind, ToolErrorKind::RetryExhausted);
        assert_eq!(adapter.calls.load(Ordering::SeqCst), 1);
    }
}
