//! Document identifier validation

use bson::oid::ObjectId;

use crate::error::{NoSQLError, Result};

/// Returns true if `id` is a well-formed ObjectId (24 hex characters)
///
/// # Examples
///
/// ```
/// use issuetracker_db::is_valid_object_id;
///
/// assert!(is_valid_object_id("5f43a1c2b3e4d5f6a7b8c9d0"));
/// assert!(!is_valid_object_id("invalidid123"));
/// ```
pub fn is_valid_object_id(id: &str) -> bool {
	ObjectId::parse_str(id).is_ok()
}

/// Parse `id` as an ObjectId
///
/// # Errors
///
/// Returns [`NoSQLError::InvalidOperation`] when the string is malformed.
pub fn parse_object_id(id: &str) -> Result<ObjectId> {
	ObjectId::parse_str(id)
		.map_err(|e| NoSQLError::InvalidOperation(format!("Invalid ObjectId '{}': {}", id, e)))
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	#[rstest]
	#[case("5f43a1c2b3e4d5f6a7b8c9d0", true)]
	#[case("5F43A1C2B3E4D5F6A7B8C9D0", true)]
	#[case("invalidid123", false)]
	#[case("5f43a1c2b3e4d5f6a7b8c9d", false)]
	#[case("5f43a1c2b3e4d5f6a7b8c9dz", false)]
	#[case("", false)]
	fn test_is_valid_object_id(#[case] id: &str, #[case] expected: bool) {
		assert_eq!(is_valid_object_id(id), expected);
	}

	#[rstest]
	fn test_parse_round_trips_generated_id() {
		// Arrange
		let generated = ObjectId::new();

		// Act
		let parsed = parse_object_id(&generated.to_hex()).unwrap();

		// Assert
		assert_eq!(parsed, generated);
	}

	#[rstest]
	fn test_parse_rejects_malformed() {
		let err = parse_object_id("nope").unwrap_err();
		assert!(matches!(err, NoSQLError::InvalidOperation(_)));
	}
}
