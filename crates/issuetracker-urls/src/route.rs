use issuetracker_http::Handler;
use std::sync::Arc;

/// Route definition: a path pattern bound to a handler
#[derive(Clone)]
pub struct Route {
	pub path: String,
	handler: Arc<dyn Handler>,
	pub name: Option<String>,
}

impl Route {
	pub fn new(path: impl Into<String>, handler: Arc<dyn Handler>) -> Self {
		Self {
			path: path.into(),
			handler,
			name: None,
		}
	}

	/// Create a route from a concrete handler without wrapping it in `Arc` first
	pub fn from_handler<H>(path: impl Into<String>, handler: H) -> Self
	where
		H: Handler + 'static,
	{
		Self::new(path, Arc::new(handler))
	}

	/// Set the name of the route
	pub fn with_name(mut self, name: impl Into<String>) -> Self {
		self.name = Some(name.into());
		self
	}

	pub fn handler(&self) -> Arc<dyn Handler> {
		self.handler.clone()
	}
}

impl std::fmt::Debug for Route {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("Route")
			.field("path", &self.path)
			.field("name", &self.name)
			.finish_non_exhaustive()
	}
}

/// Shorthand for [`Route::new`]
pub fn path(path: impl Into<String>, handler: Arc<dyn Handler>) -> Route {
	Route::new(path, handler)
}
