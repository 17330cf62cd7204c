//! HTTP server for the issue tracker.
//!
//! An HTTP/1.1 server on hyper that buffers each request body, hands the
//! request to a [`Handler`](issuetracker_http::Handler) and writes the
//! response back. Any error a handler lets escape is rendered as a JSON
//! error response instead of dropping the connection.
//!
//! ## Basic Usage
//!
//! ```rust,ignore
//! use issuetracker_server::{HttpServer, ShutdownCoordinator, shutdown_signal};
//! use std::time::Duration;
//!
//! let coordinator = ShutdownCoordinator::new(Duration::from_secs(30));
//! let trigger = coordinator.clone();
//! tokio::spawn(async move {
//!     shutdown_signal().await;
//!     trigger.shutdown();
//! });
//!
//! HttpServer::new(router)
//!     .listen_with_shutdown("127.0.0.1:8000".parse()?, coordinator)
//!     .await?;
//! ```

pub mod http;
pub mod shutdown;

pub use http::{DEFAULT_MAX_BODY_SIZE, HttpServer, ServerError, serve, serve_with_shutdown};
pub use shutdown::{ShutdownCoordinator, ShutdownSignal, shutdown_signal};
