//! Tool factory.
//!
//! Binds an [`OperationDescriptor`] to the shared [`Dispatcher`] and exposes
//! the result as an MCP tool: a name, an argument schema and a handler.

use std::fmt;
use std::sync::Arc;

use futures::FutureExt;
use rmcp::{
    ErrorData as McpError,
    handler::server::tool::{ToolCallContext, ToolRoute},
    model::{JsonObject, Tool},
};
use serde_json::{Map, Value, json};
use tokio_util::sync::CancellationToken;
use tracing::{info, instrument, warn};

use super::args::ArgumentBag;
use super::descriptor::OperationDescriptor;
use super::error::{DispatchError, DispatchResult};
use super::executor::HttpExecutor;
use super::normalizer::{NormalizedResult, normalize};
use super::request::{OutboundRequest, build_request};
use super::router::{UnknownArgumentPolicy, route_arguments};

/// Read-only settings shared by every tool.
#[derive(Clone)]
pub struct DispatchSettings {
    pub base_url: String,
    pub bearer_token: Option<String>,
    pub unknown_arguments: UnknownArgumentPolicy,
}

impl DispatchSettings {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            bearer_token: None,
            unknown_arguments: UnknownArgumentPolicy::default(),
        }
    }

    pub fn with_bearer_token(mut self, token: impl Into<String>) -> Self {
        self.bearer_token = Some(token.into());
        self
    }

    pub fn with_unknown_arguments(mut self, policy: UnknownArgumentPolicy) -> Self {
        self.unknown_arguments = policy;
        self
    }
}

impl fmt::Debug for DispatchSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DispatchSettings")
            .field("base_url", &self.base_url)
            .field("bearer_token", &self.bearer_token.as_ref().map(|_| "[REDACTED]"))
            .field("unknown_arguments", &self.unknown_arguments)
            .finish()
    }
}

/// The generic dispatch pipeline: route, build, execute, normalize.
pub struct Dispatcher {
    settings: DispatchSettings,
    executor: Arc<dyn HttpExecutor>,
}

impl Dispatcher {
    pub fn new(settings: DispatchSettings, executor: Arc<dyn HttpExecutor>) -> Self {
        Self { settings, executor }
    }

    pub fn settings(&self) -> &DispatchSettings {
        &self.settings
    }

    /// Validate and route the arguments, then build the request.
    ///
    /// Nothing is sent; any error here means no network call happens.
    pub fn prepare(
        &self,
        descriptor: &OperationDescriptor,
        arguments: Value,
    ) -> DispatchResult<OutboundRequest> {
        let bag = ArgumentBag::try_from(arguments)?;
        let routed = route_arguments(descriptor, &bag, self.settings.unknown_arguments)?;
        build_request(
            descriptor,
            &self.settings.base_url,
            self.settings.bearer_token.as_deref(),
            routed,
        )
    }

    /// Run one invocation end to end.
    ///
    /// Every outcome, including cancellation, comes back as a
    /// [`NormalizedResult`].
    #[instrument(skip_all, fields(method = %descriptor.method, route = %descriptor.route))]
    pub async fn dispatch(
        &self,
        descriptor: &OperationDescriptor,
        arguments: Value,
        cancellation: CancellationToken,
    ) -> NormalizedResult {
        let request = match self.prepare(descriptor, arguments) {
            Ok(request) => request,
            Err(e) => {
                warn!("Invocation rejected before sending: {}", e);
                return e.into();
            }
        };

        let response = tokio::select! {
            biased;
            _ = cancellation.cancelled() => Err(DispatchError::Cancelled),
            response = self.executor.execute(request) => response,
        };

        match response {
            Ok(raw) => {
                let result = normalize(raw.status, &raw.body);
                if !result.is_success() {
                    warn!(status = raw.status, "Remote API returned an error");
                }
                result
            }
            Err(e) => {
                warn!("Invocation failed: {}", e);
                e.into()
            }
        }
    }
}

/// A remote operation exposed as an invocable tool.
#[derive(Clone)]
pub struct OperationTool {
    name: Arc<str>,
    descriptor: Arc<OperationDescriptor>,
    dispatcher: Arc<Dispatcher>,
}

impl OperationTool {
    pub fn new(descriptor: Arc<OperationDescriptor>, dispatcher: Arc<Dispatcher>) -> Self {
        Self {
            name: descriptor.tool_name().into(),
            descriptor,
            dispatcher,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn descriptor(&self) -> &OperationDescriptor {
        &self.descriptor
    }

    /// Text shown to clients; falls back to the verb and route.
    pub fn description(&self) -> String {
        if self.descriptor.description.is_empty() {
            format!("{} {}", self.descriptor.method, self.descriptor.route)
        } else {
            self.descriptor.description.clone()
        }
    }

    /// JSON Schema for the tool's arguments.
    pub fn input_schema(&self) -> JsonObject {
        let mut properties = Map::new();
        let mut required = Vec::new();

        for param in &self.descriptor.parameters {
            let mut property = Map::new();
            property.insert("type".into(), json!(param.param_type.json_schema_type()));
            if !param.description.is_empty() {
                property.insert("description".into(), json!(param.description));
            }
            properties.insert(param.name.clone(), Value::Object(property));
            if param.required {
                required.push(Value::String(param.name.clone()));
            }
        }

        let mut schema = Map::new();
        schema.insert("type".into(), json!("object"));
        schema.insert("properties".into(), Value::Object(properties));
        if !required.is_empty() {
            schema.insert("required".into(), Value::Array(required));
        }
        schema
    }

    /// Create a Tool model for this operation (metadata).
    pub fn to_tool(&self) -> Tool {
        Tool {
            name: self.name.to_string().into(),
            description: Some(self.description().into()),
            input_schema: Arc::new(self.input_schema()),
            annotations: None,
            output_schema: None,
            icons: None,
            meta: None,
            title: None,
        }
    }

    /// Invoke the operation with a caller-supplied argument value.
    pub async fn invoke(&self, arguments: Value, cancellation: CancellationToken) -> NormalizedResult {
        info!("Calling tool: {}", self.name);
        self.dispatcher
            .dispatch(&self.descriptor, arguments, cancellation)
            .await
    }

    /// Create a ToolRoute for the rmcp tool router.
    ///
    /// Failures are returned as error-flagged tool results, never as
    /// protocol errors.
    pub fn create_route<S>(&self) -> ToolRoute<S>
    where
        S: Send + Sync + 'static,
    {
        let tool = self.clone();
        ToolRoute::new_dyn(self.to_tool(), move |ctx: ToolCallContext<'_, S>| {
            let tool = tool.clone();
            let arguments = ctx
                .arguments
                .clone()
                .map(Value::Object)
                .unwrap_or(Value::Null);
            let cancellation = ctx.request_context.ct.clone();
            async move {
                let result = tool.invoke(arguments, cancellation).await;
                Ok::<_, McpError>(result.into_call_tool_result())
            }
            .boxed()
        })
    }
}

impl fmt::Debug for OperationTool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OperationTool")
            .field("name", &self.name)
            .field("descriptor", &self.descriptor)
            .finish()
    }
}
