//! Parameter router.
//!
//! Splits an argument bag into query pairs, header pairs and a JSON body
//! according to the descriptor's declared parameter locations.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::debug;

use super::args::{ArgumentBag, coerce, wire_text};
use super::descriptor::{OperationDescriptor, ParamLocation};
use super::error::ArgumentError;

/// What to do with bag keys that match no declared parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnknownArgumentPolicy {
    /// Drop them without forwarding.
    #[default]
    Ignore,
    /// Fail the invocation before anything is sent.
    Reject,
}

/// Arguments sorted by transport location.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RoutedArguments {
    /// Query pairs in descriptor declaration order.
    pub query: Vec<(String, String)>,
    /// Header pairs in descriptor declaration order.
    pub headers: Vec<(String, String)>,
    /// Merged body object, present whenever the operation carries a body.
    pub body: Option<Map<String, Value>>,
}

/// Route every supplied argument to its declared location.
///
/// Each declared parameter lands in exactly one collection. Required
/// parameters that are absent fail the whole call.
pub fn route_arguments(
    descriptor: &OperationDescriptor,
    bag: &ArgumentBag,
    policy: UnknownArgumentPolicy,
) -> Result<RoutedArguments, ArgumentError> {
    for key in bag.keys() {
        if descriptor.parameter(key).is_none() {
            match policy {
                UnknownArgumentPolicy::Reject => {
                    return Err(ArgumentError::Unknown(key.to_string()));
                }
                UnknownArgumentPolicy::Ignore => {
                    debug!(route = %descriptor.route, "Ignoring unknown argument: {}", key);
                }
            }
        }
    }

    let mut routed = RoutedArguments {
        body: descriptor.has_body().then(Map::new),
        ..Default::default()
    };

    for param in &descriptor.parameters {
        let Some(value) = bag.get(&param.name) else {
            if param.required {
                return Err(ArgumentError::MissingRequired(param.name.clone()));
            }
            continue;
        };

        let value = coerce(&param.name, param.param_type, value)?;

        match param.location {
            ParamLocation::Query => routed.query.push((param.name.clone(), wire_text(&value))),
            ParamLocation::Header => routed.headers.push((param.name.clone(), wire_text(&value))),
            ParamLocation::Body => {
                routed
                    .body
                    .get_or_insert_with(Map::new)
                    .insert(param.name.clone(), value);
            }
        }
    }

    Ok(routed)
}
