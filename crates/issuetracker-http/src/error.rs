//! Error type shared by handlers, routers and middleware.

/// Result type for request processing
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while routing or handling a request.
///
/// Every variant maps to an HTTP status code through [`Error::status_code`],
/// and converts into a JSON `{"error": ...}` response.
#[non_exhaustive]
#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("Not found: {0}")]
	NotFound(String),

	#[error("Method not allowed: {0}")]
	MethodNotAllowed(String),

	#[error("Bad request: {0}")]
	BadRequest(String),

	/// Request body exceeded the server's limit, in bytes
	#[error("Payload too large: body exceeds {0} bytes")]
	PayloadTooLarge(usize),

	#[error("Serialization error: {0}")]
	Serialization(String),

	#[error("Internal server error: {0}")]
	Internal(String),
}

impl Error {
	/// HTTP status code associated with this error
	///
	/// # Examples
	///
	/// ```
	/// use issuetracker_http::Error;
	///
	/// assert_eq!(Error::NotFound("/nowhere".to_string()).status_code(), 404);
	/// assert_eq!(Error::Internal("boom".to_string()).status_code(), 500);
	/// ```
	pub fn status_code(&self) -> u16 {
		match self {
			Error::NotFound(_) => 404,
			Error::MethodNotAllowed(_) => 405,
			Error::BadRequest(_) => 400,
			Error::PayloadTooLarge(_) => 413,
			Error::Serialization(_) | Error::Internal(_) => 500,
		}
	}
}

impl From<serde_json::Error> for Error {
	fn from(err: serde_json::Error) -> Self {
		Error::Serialization(err.to_string())
	}
}
