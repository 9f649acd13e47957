//! Generic operation-dispatch engine.
//!
//! Every tool in the catalog runs through the same pipeline:
//!
//! 1. [`args`]: accept the caller's argument bag and coerce values
//! 2. [`router`]: place each argument in the query string, a header or the body
//! 3. [`request`]: assemble the outbound HTTP request
//! 4. [`executor`]: perform exactly one round trip
//! 5. [`normalizer`]: turn the response into a success or failure text
//!
//! [`factory`] binds a [`descriptor::OperationDescriptor`] to that pipeline
//! and produces an invocable tool.

pub mod args;
pub mod descriptor;
pub mod error;
pub mod executor;
pub mod factory;
pub mod normalizer;
pub mod request;
pub mod router;

pub use args::ArgumentBag;
pub use descriptor::{
    DescriptorError, HttpMethod, OperationDescriptor, ParamLocation, ParamType, ParameterSpec,
};
pub use error::{ArgumentError, DispatchError, DispatchResult};
pub use executor::{HttpExecutor, RawResponse, ReqwestExecutor};
pub use factory::{DispatchSettings, Dispatcher, OperationTool};
pub use normalizer::{DecodedBody, NormalizedResult, normalize};
pub use request::{OutboundRequest, build_request};
pub use router::{RoutedArguments, UnknownArgumentPolicy, route_arguments};
