//! HTTP primitives for the issue tracker.
//!
//! This crate provides the request and response types exchanged between the
//! server, the router and the views, together with the [`Handler`] and
//! [`Middleware`] abstractions used to compose request processing.
//!
//! ## Basic Usage
//!
//! ```rust
//! use issuetracker_http::{Handler, Request, Response, Result};
//! use async_trait::async_trait;
//!
//! struct Hello;
//!
//! #[async_trait]
//! impl Handler for Hello {
//!     async fn handle(&self, _request: Request) -> Result<Response> {
//!         Ok(Response::ok().with_body("Hello"))
//!     }
//! }
//! ```

pub mod error;
pub mod logging;
pub mod middleware;
pub mod request;
pub mod response;

pub use error::{Error, Result};
pub use logging::LoggingMiddleware;
pub use middleware::{Handler, Middleware, MiddlewareChain};
pub use request::{Request, RequestBuilder};
pub use response::Response;

// Re-export hyper types used in public signatures
pub use hyper::{HeaderMap, Method, StatusCode, Uri, Version};
