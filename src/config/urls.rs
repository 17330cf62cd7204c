//! URL configuration for the issue tracker project
//!
//! `url_patterns` builds the router; `handler` wraps it with the project
//! middleware and is what the server runs.

use issuetracker_http::{Handler, LoggingMiddleware, MiddlewareChain};
use issuetracker_urls::{PatternError, Router, path};
use issuetracker_views::ViewHandler;
use std::sync::Arc;

use crate::apps::issues;
use crate::apps::issues::store::IssueStore;
use crate::apps::issues::views::HealthView;

pub fn url_patterns(store: IssueStore) -> Result<Router, PatternError> {
	let mut router = Router::new();
	router
		.add_route(
			path("/health", Arc::new(ViewHandler::new(HealthView::new(store.clone()))))
				.with_name("health"),
		)?
		.mount("/api/issues", issues::urls::url_patterns(store))?;
	Ok(router)
}

/// Router wrapped in request logging
pub fn handler(store: IssueStore) -> Result<Arc<dyn Handler>, PatternError> {
	let router = url_patterns(store)?;
	Ok(Arc::new(
		MiddlewareChain::new(Arc::new(router)).with_middleware(Arc::new(LoggingMiddleware::new())),
	))
}
