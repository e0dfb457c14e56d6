//! Client facade subsystem.
//!
//! # Data Flow
//! ```text
//! ClientRegistry::create("rest", opts)
//!     → rest.rs (RestClient: options resolved, transport built once)
//! RestClient::new_request(service, schema, operation, RestRequest)
//!     → request.rs (Request envelope)
//! RestClient::call(ctx, address, request, response, call options)
//!     → dispatch.rs (URL, headers, transport task raced against ctx)
//!     → resilience::failure (status classification)
//!     → response.rs (RestResponse populated in place)
//! ```
//!
//! # Design Decisions
//! - Arguments and responses cross the registry boundary as `dyn Any` so the
//!   registry stays protocol-agnostic; the rest client downcasts on entry
//! - One client per registered name per registry; clients are shared behind
//!   `Arc` and are safe for concurrent calls

pub mod dispatch;
pub mod registry;
pub mod request;
pub mod response;
pub mod rest;

pub use dispatch::X_REQUEST_ID;
pub use registry::{ClientConstructor, ClientRegistry, ProtocolClient};
pub use request::{Request, RestRequest};
pub use response::RestResponse;
pub use rest::{RestClient, NAME};
