use async_trait::async_trait;
use issuetracker_http::{Error, Handler, Request, Response, Result};

use crate::{PathPattern, PatternError, Route};

/// Path router
///
/// Routes are tried in registration order and the first match wins. A
/// request matching no route fails with [`Error::NotFound`], which renders
/// as a JSON `404`.
#[derive(Default)]
pub struct Router {
	routes: Vec<Route>,
	patterns: Vec<PathPattern>,
}

impl Router {
	pub fn new() -> Self {
		Self::default()
	}

	/// Register a route
	///
	/// # Errors
	///
	/// Returns a [`PatternError`] if the route path is not a valid pattern.
	pub fn add_route(&mut self, route: Route) -> std::result::Result<&mut Self, PatternError> {
		let pattern = PathPattern::new(&route.path)?;
		tracing::debug!(path = %route.path, name = ?route.name, "route registered");
		self.patterns.push(pattern);
		self.routes.push(route);
		Ok(self)
	}

	/// Register routes under a common prefix
	///
	/// # Examples
	///
	/// ```
	/// use issuetracker_http::{Handler, Request, Response, Result};
	/// use issuetracker_urls::{Router, path};
	/// use std::sync::Arc;
	///
	/// # struct DummyHandler;
	/// # #[async_trait::async_trait]
	/// # impl Handler for DummyHandler {
	/// #     async fn handle(&self, _req: Request) -> Result<Response> {
	/// #         Ok(Response::ok())
	/// #     }
	/// # }
	/// let handler = Arc::new(DummyHandler);
	/// let mut router = Router::new();
	/// router
	///     .mount("/api/", vec![path("issues/{project}", handler)])
	///     .unwrap();
	///
	/// assert_eq!(router.get_routes()[0].path, "/api/issues/{project}");
	/// ```
	pub fn mount(
		&mut self,
		prefix: &str,
		routes: Vec<Route>,
	) -> std::result::Result<&mut Self, PatternError> {
		let prefix = prefix.trim_end_matches('/');

		for mut route in routes {
			route.path = if route.path.starts_with('/') {
				format!("{}{}", prefix, route.path)
			} else {
				format!("{}/{}", prefix, route.path)
			};
			self.add_route(route)?;
		}

		Ok(self)
	}

	/// Get all registered routes
	pub fn get_routes(&self) -> &[Route] {
		&self.routes
	}

	/// Find a route by name
	pub fn find_by_name(&self, name: &str) -> Option<&Route> {
		self.routes
			.iter()
			.find(|route| route.name.as_deref() == Some(name))
	}
}

#[async_trait]
impl Handler for Router {
	async fn handle(&self, mut request: Request) -> Result<Response> {
		let path = request.path().to_string();

		for (pattern, route) in self.patterns.iter().zip(&self.routes) {
			if let Some(params) = pattern.extract_params(&path) {
				request.path_params.extend(params);
				return route.handler().handle(request).await;
			}
		}

		Err(Error::NotFound(format!("No route found for {}", path)))
	}
}
