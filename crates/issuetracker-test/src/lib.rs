//! Testing utilities for the issue tracker
//!
//! - [`APIClient`]: drives a [`Handler`](issuetracker_http::Handler)
//!   in-process, without sockets
//! - [`TestResponse`]: response wrapper with JSON helpers
//! - [`fixtures`]: rstest fixtures for stores and live servers

pub mod client;
pub mod fixtures;
pub mod response;

pub use client::{APIClient, ClientError, ClientResult};
pub use fixtures::{FailingBackend, TestServerGuard, http_client, memory_backend, test_server_guard};
pub use response::TestResponse;
