//! URL routing for the issue tracker.
//!
//! Routes are declared with Django-style patterns such as
//! `/api/issues/{project}`. A [`Router`] matches the request path against
//! its routes in registration order, stores the captured parameters on the
//! request and hands it to the route's handler.
//!
//! ```rust
//! use issuetracker_http::{Handler, Request, Response, Result};
//! use issuetracker_urls::{Router, path};
//! use std::sync::Arc;
//!
//! struct ProjectName;
//!
//! #[async_trait::async_trait]
//! impl Handler for ProjectName {
//!     async fn handle(&self, request: Request) -> Result<Response> {
//!         let project = request.path_param("project").unwrap_or_default().to_string();
//!         Ok(Response::ok().with_body(project))
//!     }
//! }
//!
//! let mut router = Router::new();
//! router
//!     .mount("/api", vec![path("/issues/{project}", Arc::new(ProjectName))])
//!     .unwrap();
//! assert_eq!(router.get_routes()[0].path, "/api/issues/{project}");
//! ```

mod pattern;
mod route;
mod router;

pub use pattern::{PathPattern, PatternError};
pub use route::{Route, path};
pub use router::Router;
