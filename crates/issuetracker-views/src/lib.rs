//! Class-style views with per-method dispatch.
//!
//! A [`View`] receives every request routed to it and dispatches on the
//! HTTP method. [`ViewHandler`] adapts a view into a
//! [`Handler`](issuetracker_http::Handler) and takes care of the parts
//! every view shares: answering `OPTIONS` and rejecting methods outside
//! [`View::allowed_methods`] with `405` and an `Allow` header.

mod handler;

pub use handler::ViewHandler;

use async_trait::async_trait;
use issuetracker_http::{Request, Response, Result};

/// Base trait for all views
#[async_trait]
pub trait View: Send + Sync {
	async fn dispatch(&self, request: Request) -> Result<Response>;

	/// Returns the list of HTTP methods allowed by this view
	fn allowed_methods(&self) -> Vec<&'static str> {
		vec!["GET", "HEAD", "OPTIONS"]
	}
}
