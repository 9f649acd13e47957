//! Operation descriptors.
//!
//! A descriptor is the static, read-only shape of one remote operation: verb,
//! route, ordered parameters and whether a bearer credential applies. The
//! catalog deserializes them once at startup and every invocation of the
//! resulting tool borrows the same instance.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

/// HTTP verbs supported by the catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl HttpMethod {
    /// Upper-case verb as sent on the wire.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Patch => "PATCH",
            Self::Delete => "DELETE",
        }
    }

    /// Whether requests with this verb may carry a body.
    pub fn allows_body(&self) -> bool {
        matches!(self, Self::Post | Self::Put | Self::Patch)
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<HttpMethod> for reqwest::Method {
    fn from(method: HttpMethod) -> Self {
        match method {
            HttpMethod::Get => reqwest::Method::GET,
            HttpMethod::Post => reqwest::Method::POST,
            HttpMethod::Put => reqwest::Method::PUT,
            HttpMethod::Patch => reqwest::Method::PATCH,
            HttpMethod::Delete => reqwest::Method::DELETE,
        }
    }
}

/// Where a parameter travels on the outbound request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParamLocation {
    Query,
    Header,
    Body,
}

/// Type hint declared for a parameter.
///
/// Used for the advertised argument schema and for coercing loosely typed
/// caller input; not a full payload schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParamType {
    #[default]
    String,
    Number,
    Integer,
    Boolean,
    Array,
    Object,
}

impl ParamType {
    /// JSON Schema `type` keyword for this hint.
    pub fn json_schema_type(&self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Number => "number",
            Self::Integer => "integer",
            Self::Boolean => "boolean",
            Self::Array => "array",
            Self::Object => "object",
        }
    }
}

/// One declared parameter of an operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParameterSpec {
    pub name: String,
    pub location: ParamLocation,
    #[serde(default)]
    pub required: bool,
    #[serde(rename = "type", default)]
    pub param_type: ParamType,
    #[serde(default)]
    pub description: String,
}

impl ParameterSpec {
    pub fn new(name: impl Into<String>, location: ParamLocation) -> Self {
        Self {
            name: name.into(),
            location,
            required: false,
            param_type: ParamType::default(),
            description: String::new(),
        }
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn with_type(mut self, param_type: ParamType) -> Self {
        self.param_type = param_type;
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }
}

/// Reasons a descriptor is rejected at registration time.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DescriptorError {
    #[error("operation route must not be empty")]
    EmptyRoute,

    #[error("{route}: duplicate parameter '{name}'")]
    DuplicateParameter { route: String, name: String },

    #[error("{route}: body parameter '{name}' is not allowed on {method}")]
    BodyNotAllowed {
        route: String,
        name: String,
        method: HttpMethod,
    },
}

fn default_requires_bearer_auth() -> bool {
    true
}

/// Static metadata describing one remote operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperationDescriptor {
    pub method: HttpMethod,
    /// Path fragment appended to the base URL, e.g. `/files.list`.
    pub route: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub parameters: Vec<ParameterSpec>,
    #[serde(default = "default_requires_bearer_auth")]
    pub requires_bearer_auth: bool,
}

impl OperationDescriptor {
    pub fn new(method: HttpMethod, route: impl Into<String>) -> Self {
        Self {
            method,
            route: route.into(),
            description: String::new(),
            parameters: Vec::new(),
            requires_bearer_auth: true,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_parameter(mut self, parameter: ParameterSpec) -> Self {
        self.parameters.push(parameter);
        self
    }

    pub fn without_bearer_auth(mut self) -> Self {
        self.requires_bearer_auth = false;
        self
    }

    /// Externally visible tool name: lower-case verb, underscore, route.
    pub fn tool_name(&self) -> String {
        format!(
            "{}_{}",
            self.method.as_str().to_ascii_lowercase(),
            self.route.trim_start_matches('/')
        )
    }

    /// Look up a declared parameter by name.
    pub fn parameter(&self, name: &str) -> Option<&ParameterSpec> {
        self.parameters.iter().find(|p| p.name == name)
    }

    /// Declared parameters at one location, in declaration order.
    pub fn parameters_at(&self, location: ParamLocation) -> impl Iterator<Item = &ParameterSpec> {
        self.parameters.iter().filter(move |p| p.location == location)
    }

    /// Whether a request for this operation carries a JSON body.
    pub fn has_body(&self) -> bool {
        self.method.allows_body() && self.parameters_at(ParamLocation::Body).next().is_some()
    }

    /// Check the invariants the router relies on.
    pub fn validate(&self) -> Result<(), DescriptorError> {
        if self.route.trim_start_matches('/').is_empty() {
            return Err(DescriptorError::EmptyRoute);
        }

        let mut seen = HashSet::new();
        for param in &self.parameters {
            if !seen.insert(param.name.as_str()) {
                return Err(DescriptorError::DuplicateParameter {
                    route: self.route.clone(),
                    name: param.name.clone(),
                });
            }
            if param.location == ParamLocation::Body && !self.method.allows_body() {
                return Err(DescriptorError::BodyNotAllowed {
                    route: self.route.clone(),
                    name: param.name.clone(),
                    method: self.method,
                });
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn files_list() -> OperationDescriptor {
        OperationDescriptor::new(HttpMethod::Get, "/files.list")
            .with_parameter(ParameterSpec::new("token", ParamLocation::Header))
            .with_parameter(ParameterSpec::new("user", ParamLocation::Query))
            .with_parameter(ParameterSpec::new("channel", ParamLocation::Query))
    }

    #[test]
    fn test_tool_name_derivation() {
        assert_eq!(files_list().tool_name(), "get_files.list");
        let post = OperationDescriptor::new(HttpMethod::Post, "/chat.postMessage");
        assert_eq!(post.tool_name(), "post_chat.postMessage");
    }

    #[test]
    fn test_validate_accepts_well_formed() {
        assert!(files_list().validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_duplicate_parameter() {
        let desc = files_list().with_parameter(ParameterSpec::new("user", ParamLocation::Header));
        assert!(matches!(
            desc.validate(),
            Err(DescriptorError::DuplicateParameter { name, .. }) if name == "user"
        ));
    }

    #[test]
    fn test_validate_rejects_body_on_get() {
        let desc = files_list().with_parameter(ParameterSpec::new("text", ParamLocation::Body));
        assert!(matches!(
            desc.validate(),
            Err(DescriptorError::BodyNotAllowed { method: HttpMethod::Get, .. })
        ));
    }

    #[test]
    fn test_validate_rejects_empty_route() {
        let desc = OperationDescriptor::new(HttpMethod::Get, "/");
        assert_eq!(desc.validate(), Err(DescriptorError::EmptyRoute));
    }

    #[test]
    fn test_deserialize_defaults() {
        let json = r#"{
            "method": "POST",
            "route": "/chat.postMessage",
            "parameters": [
                {"name": "channel", "location": "body", "required": true},
                {"name": "unfurl_links", "location": "body", "type": "boolean"}
            ]
        }"#;
        let desc: OperationDescriptor = serde_json::from_str(json).unwrap();
        assert!(desc.requires_bearer_auth);
        assert!(desc.has_body());
        assert_eq!(desc.parameters[0].param_type, ParamType::String);
        assert!(desc.parameters[0].required);
        assert_eq!(desc.parameters[1].param_type, ParamType::Boolean);
        assert!(!desc.parameters[1].required);
    }
}
