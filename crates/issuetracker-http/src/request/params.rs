use super::Request;
use hyper::Uri;
use std::collections::HashMap;

impl Request {
	/// Parse query parameters from URI
	///
	/// Keys and values are form-decoded (`%20` and `+` both become a space).
	/// When a key is repeated the last value wins. A query string that fails
	/// to decode yields no parameters at all.
	pub(super) fn parse_query_params(uri: &Uri) -> HashMap<String, String> {
		uri.query()
			.and_then(|q| serde_urlencoded::from_str::<Vec<(String, String)>>(q).ok())
			.map(|pairs| pairs.into_iter().collect())
			.unwrap_or_default()
	}

	/// Get the request path
	///
	/// # Examples
	///
	/// ```
	/// use issuetracker_http::Request;
	/// use hyper::Method;
	///
	/// let request = Request::builder()
	///     .method(Method::GET)
	///     .uri("/api/issues/apitest?open=false")
	///     .build()
	///     .unwrap();
	///
	/// assert_eq!(request.path(), "/api/issues/apitest");
	/// ```
	pub fn path(&self) -> &str {
		self.uri.path()
	}

	/// Set a path parameter (used by routers for path variable extraction)
	pub fn set_path_param(&mut self, key: impl Into<String>, value: impl Into<String>) {
		self.path_params.insert(key.into(), value.into());
	}

	/// Look up a path parameter extracted by the router
	///
	/// # Examples
	///
	/// ```
	/// use issuetracker_http::Request;
	///
	/// let mut request = Request::builder().uri("/api/issues/apitest").build().unwrap();
	/// request.set_path_param("project", "apitest");
	///
	/// assert_eq!(request.path_param("project"), Some("apitest"));
	/// assert_eq!(request.path_param("missing"), None);
	/// ```
	pub fn path_param(&self, name: &str) -> Option<&str> {
		self.path_params.get(name).map(String::as_str)
	}
}
