//! NoSQL database error types

/// Result type for NoSQL operations
pub type Result<T> = std::result::Result<T, NoSQLError>;

/// Unified error type for NoSQL operations
#[derive(Debug, thiserror::Error)]
pub enum NoSQLError {
	#[error("Connection error: {0}")]
	ConnectionError(String),

	/// Query/operation execution error
	#[error("Execution error: {0}")]
	ExecutionError(String),

	#[error("Not found: {0}")]
	NotFound(String),

	#[error("Serialization error: {0}")]
	SerializationError(String),

	/// Invalid operation for the current backend
	#[error("Invalid operation: {0}")]
	InvalidOperation(String),

	#[error("Configuration error: {0}")]
	ConfigError(String),

	#[error("Authentication error: {0}")]
	AuthenticationError(String),

	/// Database-specific error (contains the original error message)
	#[error("Database error: {0}")]
	DatabaseError(String),

	/// Feature not supported by this backend or build
	#[error("Unsupported feature: {0}")]
	UnsupportedFeature(String),
}

impl From<serde_json::Error> for NoSQLError {
	fn from(err: serde_json::Error) -> Self {
		NoSQLError::SerializationError(err.to_string())
	}
}

// bson 3.x uses a single error type for both encoding and decoding
impl From<bson::error::Error> for NoSQLError {
	fn from(err: bson::error::Error) -> Self {
		NoSQLError::SerializationError(err.to_string())
	}
}

#[cfg(feature = "mongodb")]
impl From<mongodb::error::Error> for NoSQLError {
	fn from(err: mongodb::error::Error) -> Self {
		use mongodb::error::ErrorKind;

		match *err.kind {
			ErrorKind::Authentication { .. } => NoSQLError::AuthenticationError(err.to_string()),
			ErrorKind::InvalidArgument { .. } => NoSQLError::InvalidOperation(err.to_string()),
			ErrorKind::Io(_) => NoSQLError::ConnectionError(err.to_string()),
			_ => NoSQLError::DatabaseError(err.to_string()),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	#[rstest]
	fn test_display_prefixes() {
		assert_eq!(
			NoSQLError::InvalidOperation("$inc".to_string()).to_string(),
			"Invalid operation: $inc"
		);
		assert_eq!(
			NoSQLError::ConfigError("bad url".to_string()).to_string(),
			"Configuration error: bad url"
		);
	}

	#[rstest]
	fn test_from_serde_json_error() {
		// Arrange
		let err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();

		// Act
		let converted: NoSQLError = err.into();

		// Assert
		assert!(matches!(converted, NoSQLError::SerializationError(_)));
	}
}
