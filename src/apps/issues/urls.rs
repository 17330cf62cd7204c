//! URL configuration for the issues app

use issuetracker_urls::{Route, path};
use issuetracker_views::ViewHandler;
use std::sync::Arc;

use super::store::IssueStore;
use super::views::IssueView;

/// Routes of the issues app, relative to its mount point
pub fn url_patterns(store: IssueStore) -> Vec<Route> {
	vec![path("/{project}", Arc::new(ViewHandler::new(IssueView::new(store)))).with_name("issues")]
}
