use super::Request;
use crate::{Error, Result};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

impl Request {
	/// Media type of the body, without parameters such as `charset`
	pub fn content_type(&self) -> Option<&str> {
		self.headers
			.get(hyper::header::CONTENT_TYPE)
			.and_then(|h| h.to_str().ok())
			.and_then(|ct| ct.split(';').next())
			.map(str::trim)
	}

	/// Returns true if the body is declared as an HTML form submission
	pub fn is_form(&self) -> bool {
		self.content_type()
			.is_some_and(|ct| ct.eq_ignore_ascii_case(FORM_CONTENT_TYPE))
	}

	/// Deserialize the body as JSON
	///
	/// # Examples
	///
	/// ```
	/// use issuetracker_http::Request;
	/// use serde::Deserialize;
	///
	/// #[derive(Deserialize)]
	/// struct Payload {
	///     _id: String,
	/// }
	///
	/// let request = Request::builder()
	///     .body(r#"{"_id":"5f1c"}"#)
	///     .build()
	///     .unwrap();
	///
	/// let payload: Payload = request.json().unwrap();
	/// assert_eq!(payload._id, "5f1c");
	/// ```
	pub fn json<T: DeserializeOwned>(&self) -> Result<T> {
		serde_json::from_slice(self.body()).map_err(Into::into)
	}

	/// Decode the body into a flat field map
	///
	/// Form bodies produce string values. Any other body is read as a JSON
	/// object, so typed values such as `"open": false` survive. An empty
	/// body produces an empty map.
	///
	/// # Errors
	///
	/// Returns [`Error::BadRequest`] when the body cannot be decoded, or when
	/// a JSON body is not an object.
	///
	/// # Examples
	///
	/// ```
	/// use issuetracker_http::Request;
	///
	/// let request = Request::builder()
	///     .header("content-type", "application/x-www-form-urlencoded")
	///     .body("issue_title=Fix+error&created_by=Joe")
	///     .build()
	///     .unwrap();
	///
	/// let fields = request.fields().unwrap();
	/// assert_eq!(fields["issue_title"], "Fix error");
	/// assert_eq!(fields["created_by"], "Joe");
	/// ```
	pub fn fields(&self) -> Result<Map<String, Value>> {
		if self.body().iter().all(u8::is_ascii_whitespace) {
			return Ok(Map::new());
		}

		if self.is_form() {
			let pairs: Vec<(String, String)> = serde_urlencoded::from_bytes(self.body())
				.map_err(|e| Error::BadRequest(format!("Invalid form body: {}", e)))?;
			return Ok(pairs
				.into_iter()
				.map(|(k, v)| (k, Value::String(v)))
				.collect());
		}

		match serde_json::from_slice::<Value>(self.body()) {
			Ok(Value::Object(map)) => Ok(map),
			Ok(other) => Err(Error::BadRequest(format!(
				"Expected a JSON object, got {}",
				json_kind(&other)
			))),
			Err(e) => Err(Error::BadRequest(format!("Invalid JSON body: {}", e))),
		}
	}
}

fn json_kind(value: &Value) -> &'static str {
	match value {
		Value::Null => "null",
		Value::Bool(_) => "a boolean",
		Value::Number(_) => "a number",
		Value::String(_) => "a string",
		Value::Array(_) => "an array",
		Value::Object(_) => "an object",
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	fn request_with(content_type: Option<&str>, body: &str) -> Request {
		let mut builder = Request::builder().body(body.to_string());
		if let Some(ct) = content_type {
			builder = builder.header("content-type", ct);
		}
		builder.build().unwrap()
	}

	#[rstest]
	fn test_fields_from_json_keeps_types() {
		// Arrange
		let request = request_with(
			Some("application/json"),
			r#"{"_id":"abc","open":false,"issue_text":"x"}"#,
		);

		// Act
		let fields = request.fields().unwrap();

		// Assert
		assert_eq!(fields.len(), 3);
		assert_eq!(fields["open"], Value::Bool(false));
		assert_eq!(fields["issue_text"], "x");
	}

	#[rstest]
	fn test_fields_from_form_with_charset() {
		// Arrange
		let request = request_with(
			Some("application/x-www-form-urlencoded; charset=UTF-8"),
			"_id=abc&open=false",
		);

		// Act
		let fields = request.fields().unwrap();

		// Assert
		assert_eq!(fields["_id"], "abc");
		assert_eq!(fields["open"], "false");
	}

	#[rstest]
	#[case(None, "")]
	#[case(Some("application/json"), "  \n")]
	#[case(Some("application/x-www-form-urlencoded"), "")]
	fn test_fields_empty_body(#[case] content_type: Option<&str>, #[case] body: &str) {
		// Arrange
		let request = request_with(content_type, body);

		// Act
		let fields = request.fields().unwrap();

		// Assert
		assert!(fields.is_empty());
	}

	#[rstest]
	#[case("{not json")]
	#[case("[1,2,3]")]
	#[case("\"text\"")]
	fn test_fields_rejects_non_object_json(#[case] body: &str) {
		// Arrange
		let request = request_with(Some("application/json"), body);

		// Act
		let result = request.fields();

		// Assert
		assert!(matches!(result, Err(Error::BadRequest(_))));
	}

	#[rstest]
	fn test_json_deserialization_error_maps_to_serialization() {
		// Arrange
		let request = request_with(Some("application/json"), "{");

		// Act
		let result = request.json::<Value>();

		// Assert
		assert!(matches!(result, Err(Error::Serialization(_))));
	}

	#[rstest]
	fn test_content_type_strips_parameters() {
		// Arrange
		let request = request_with(Some("application/json; charset=utf-8"), "{}");

		// Act & Assert
		assert_eq!(request.content_type(), Some("application/json"));
		assert!(!request.is_form());
	}
}
