//! Request builder.
//!
//! Turns routed arguments into one concrete outbound request. Nothing here
//! touches the network, so every failure is a construction error.

use reqwest::Url;
use reqwest::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderName, HeaderValue};
use serde_json::Value;

use super::descriptor::{HttpMethod, OperationDescriptor};
use super::error::{DispatchError, DispatchResult};
use super::router::RoutedArguments;

const APPLICATION_JSON: &str = "application/json";

/// A fully assembled request, built once and consumed once.
#[derive(Debug, Clone)]
pub struct OutboundRequest {
    pub method: HttpMethod,
    pub url: Url,
    pub headers: HeaderMap,
    pub body: Option<Vec<u8>>,
}

impl OutboundRequest {
    /// Header value as text, if present and visible ASCII.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// Body parsed back as JSON, mostly useful for inspection.
    pub fn body_json(&self) -> Option<Value> {
        self.body
            .as_deref()
            .and_then(|b| serde_json::from_slice(b).ok())
    }
}

/// Join the base URL and route, then append the encoded query string.
pub fn build_url(
    base_url: &str,
    route: &str,
    query: &[(String, String)],
) -> DispatchResult<Url> {
    let joined = format!(
        "{}/{}",
        base_url.trim_end_matches('/'),
        route.trim_start_matches('/')
    );

    let mut url = Url::parse(&joined).map_err(|e| {
        DispatchError::request_construction(format!("invalid URL '{}': {}", joined, e))
    })?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(DispatchError::request_construction(format!(
            "unsupported URL scheme '{}'",
            url.scheme()
        )));
    }

    if !query.is_empty() {
        let encoded = serde_urlencoded::to_string(query).map_err(|e| {
            DispatchError::request_construction(format!("failed to encode query: {}", e))
        })?;
        url.set_query(Some(&encoded));
    }

    Ok(url)
}

/// Assemble the outbound request for one invocation.
///
/// `bearer_token` is attached only when the operation requires auth and a
/// non-empty credential is configured.
pub fn build_request(
    descriptor: &OperationDescriptor,
    base_url: &str,
    bearer_token: Option<&str>,
    routed: RoutedArguments,
) -> DispatchResult<OutboundRequest> {
    let url = build_url(base_url, &descriptor.route, &routed.query)?;

    let mut headers = HeaderMap::new();
    headers.insert(ACCEPT, HeaderValue::from_static(APPLICATION_JSON));

    for (name, value) in &routed.headers {
        let header_name = HeaderName::from_bytes(name.as_bytes()).map_err(|e| {
            DispatchError::request_construction(format!("invalid header name '{}': {}", name, e))
        })?;
        let header_value = HeaderValue::from_str(value).map_err(|e| {
            DispatchError::request_construction(format!("invalid value for header '{}': {}", name, e))
        })?;
        headers.insert(header_name, header_value);
    }

    if descriptor.requires_bearer_auth {
        if let Some(token) = bearer_token.filter(|t| !t.is_empty()) {
            let mut value = HeaderValue::from_str(&format!("Bearer {}", token)).map_err(|_| {
                DispatchError::request_construction("configured bearer token is not a valid header value")
            })?;
            value.set_sensitive(true);
            headers.insert(AUTHORIZATION, value);
        }
    }

    let body = match routed.body {
        Some(_) if !descriptor.method.allows_body() => {
            return Err(DispatchError::request_construction(format!(
                "{} requests cannot carry a body",
                descriptor.method
            )));
        }
        Some(body) => {
            let bytes = serde_json::to_vec(&Value::Object(body)).map_err(|e| {
                DispatchError::request_construction(format!("failed to encode body: {}", e))
            })?;
            headers.insert(CONTENT_TYPE, HeaderValue::from_static(APPLICATION_JSON));
            Some(bytes)
        }
        None => None,
    };

    Ok(OutboundRequest {
        method: descriptor.method,
        url,
        headers,
        body,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::descriptor::{ParamLocation, ParameterSpec};
    use serde_json::{Map, json};

    fn pairs(items: &[(&str, &str)]) -> Vec<(String, String)> {
        items
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_url_joins_without_double_slash() {
        let url = build_url("https://slack.com/api/", "/files.list", &[]).unwrap();
        assert_eq!(url.as_str(), "https://slack.com/api/files.list");
        assert_eq!(url.query(), None);
    }

    #[test]
    fn test_query_is_percent_encoded_in_order() {
        let url = build_url(
            "https://slack.com/api",
            "/files.list",
            &pairs(&[("types", "spaces,snippets"), ("ts_from", "12:30 pm")]),
        )
        .unwrap();
        assert_eq!(url.query(), Some("types=spaces%2Csnippets&ts_from=12%3A30+pm"));
    }

    #[test]
    fn test_malformed_base_url() {
        let err = build_url("not a url", "/files.list", &[]).unwrap_err();
        assert!(matches!(err, DispatchError::RequestConstruction(_)));

        let err = build_url("ftp://example.com", "/files.list", &[]).unwrap_err();
        assert!(err.to_string().contains("unsupported URL scheme"));
    }

    #[test]
    fn test_get_has_accept_but_no_body() {
        let desc = OperationDescriptor::new(HttpMethod::Get, "/api.test");
        let req = build_request(&desc, "https://slack.com/api", None, RoutedArguments::default())
            .unwrap();
        assert_eq!(req.header("accept"), Some("application/json"));
        assert!(req.body.is_none());
        assert!(req.header("content-type").is_none());
        assert!(req.header("authorization").is_none());
    }

    #[test]
    fn test_get_refuses_body() {
        let desc = OperationDescriptor::new(HttpMethod::Delete, "/thing");
        let routed = RoutedArguments {
            body: Some(Map::new()),
            ..Default::default()
        };
        let err = build_request(&desc, "https://slack.com/api", None, routed).unwrap_err();
        assert!(err.is_pre_flight());
    }

    #[test]
    fn test_post_serializes_body_and_headers() {
        let desc = OperationDescriptor::new(HttpMethod::Post, "/chat.postMessage")
            .with_parameter(ParameterSpec::new("channel", ParamLocation::Body));
        let mut body = Map::new();
        body.insert("channel".into(), json!("C1"));
        let routed = RoutedArguments {
            headers: pairs(&[("token", "T")]),
            body: Some(body),
            ..Default::default()
        };

        let req = build_request(&desc, "https://slack.com/api", Some("xoxb-1"), routed).unwrap();
        assert_eq!(req.header("content-type"), Some("application/json"));
        assert_eq!(req.header("token"), Some("T"));
        assert_eq!(req.header("authorization"), Some("Bearer xoxb-1"));
        assert_eq!(req.body_json(), Some(json!({"channel": "C1"})));
    }

    #[test]
    fn test_bearer_skipped_when_not_required_or_empty() {
        let desc = OperationDescriptor::new(HttpMethod::Get, "/api.test").without_bearer_auth();
        let req = build_request(&desc, "https://slack.com/api", Some("xoxb-1"), RoutedArguments::default())
            .unwrap();
        assert!(req.header("authorization").is_none());

        let desc = OperationDescriptor::new(HttpMethod::Get, "/api.test");
        let req = build_request(&desc, "https://slack.com/api", Some(""), RoutedArguments::default())
            .unwrap();
        assert!(req.header("authorization").is_none());
    }

    #[test]
    fn test_invalid_header_value() {
        let desc = OperationDescriptor::new(HttpMethod::Get, "/api.test");
        let routed = RoutedArguments {
            headers: pairs(&[("token", "bad\nvalue")]),
            ..Default::default()
        };
        let err = build_request(&desc, "https://slack.com/api", None, routed).unwrap_err();
        assert!(matches!(err, DispatchError::RequestConstruction(_)));
    }
}
