//! Path pattern compilation and matching.

use percent_encoding::percent_decode_str;
use std::collections::HashMap;

/// Maximum allowed length for a URL pattern string in bytes.
const MAX_PATTERN_LENGTH: usize = 1024;

/// Maximum allowed size for a compiled pattern regex (in bytes).
const MAX_REGEX_SIZE: usize = 1 << 20;

/// Errors raised while compiling a path pattern
#[derive(Debug, thiserror::Error)]
pub enum PatternError {
	#[error("Pattern length {0} exceeds maximum allowed length of {MAX_PATTERN_LENGTH} bytes")]
	TooLong(usize),

	#[error("Invalid parameter name '{0}' in pattern")]
	InvalidParam(String),

	#[error("Unclosed parameter in pattern '{0}'")]
	Unclosed(String),

	#[error("Failed to compile pattern regex: {0}")]
	Regex(#[from] regex::Error),
}

/// A compiled path pattern
///
/// `{name}` captures one path segment (anything except `/`); all other
/// characters match literally. A single trailing slash on the request path
/// is tolerated, so `/api/issues/{project}` also matches
/// `/api/issues/apitest/`. Captured values are percent-decoded.
///
/// # Examples
///
/// ```
/// use issuetracker_urls::PathPattern;
///
/// let pattern = PathPattern::new("/api/issues/{project}").unwrap();
///
/// let params = pattern.extract_params("/api/issues/my%20app").unwrap();
/// assert_eq!(params["project"], "my app");
/// assert!(pattern.extract_params("/api/issues").is_none());
/// ```
#[derive(Debug, Clone)]
pub struct PathPattern {
	pattern: String,
	regex: regex::Regex,
	param_names: Vec<String>,
}

impl PathPattern {
	pub fn new(pattern: &str) -> Result<Self, PatternError> {
		if pattern.len() > MAX_PATTERN_LENGTH {
			return Err(PatternError::TooLong(pattern.len()));
		}

		let (regex_str, param_names) = Self::compile_pattern(pattern)?;
		let regex = regex::RegexBuilder::new(&regex_str)
			.size_limit(MAX_REGEX_SIZE)
			.build()?;

		Ok(Self {
			pattern: pattern.to_string(),
			regex,
			param_names,
		})
	}

	fn compile_pattern(pattern: &str) -> Result<(String, Vec<String>), PatternError> {
		let mut regex_str = String::from("^");
		let mut param_names = Vec::new();
		let mut rest = pattern.trim_end_matches('/');

		while let Some(start) = rest.find('{') {
			regex_str.push_str(&regex::escape(&rest[..start]));

			let after = &rest[start + 1..];
			let end = after
				.find('}')
				.ok_or_else(|| PatternError::Unclosed(pattern.to_string()))?;
			let name = &after[..end];

			let valid = !name.is_empty()
				&& name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
				&& !name.starts_with(|c: char| c.is_ascii_digit());
			if !valid || param_names.iter().any(|n| n == name) {
				return Err(PatternError::InvalidParam(name.to_string()));
			}

			regex_str.push_str(&format!("(?P<{}>[^/]+)", name));
			param_names.push(name.to_string());
			rest = &after[end + 1..];
		}

		regex_str.push_str(&regex::escape(rest));
		regex_str.push_str("/?$");
		Ok((regex_str, param_names))
	}

	/// Returns the original pattern string.
	pub fn pattern(&self) -> &str {
		&self.pattern
	}

	/// Returns the parameter names in the order they appear.
	pub fn param_names(&self) -> &[String] {
		&self.param_names
	}

	pub fn is_match(&self, path: &str) -> bool {
		self.regex.is_match(path)
	}

	/// Match `path` and return the decoded parameters, or `None` on mismatch
	pub fn extract_params(&self, path: &str) -> Option<HashMap<String, String>> {
		let caps = self.regex.captures(path)?;
		Some(
			self.param_names
				.iter()
				.filter_map(|name| {
					caps.name(name).map(|m| {
						let value = percent_decode_str(m.as_str()).decode_utf8_lossy();
						(name.clone(), value.into_owned())
					})
				})
				.collect(),
		)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	#[rstest]
	#[case("/api/issues/apitest", Some("apitest"))]
	#[case("/api/issues/apitest/", Some("apitest"))]
	#[case("/api/issues/", None)]
	#[case("/api/issues/a/b", None)]
	#[case("/api/issue/apitest", None)]
	fn test_project_pattern(#[case] path: &str, #[case] expected: Option<&str>) {
		// Arrange
		let pattern = PathPattern::new("/api/issues/{project}").unwrap();

		// Act
		let params = pattern.extract_params(path);

		// Assert
		assert_eq!(
			params.as_ref().and_then(|p| p.get("project")).map(String::as_str),
			expected
		);
	}

	#[rstest]
	fn test_literal_pattern_escapes_regex_characters() {
		// Arrange
		let pattern = PathPattern::new("/health.json").unwrap();

		// Act & Assert
		assert!(pattern.is_match("/health.json"));
		assert!(!pattern.is_match("/healthxjson"));
		assert!(pattern.param_names().is_empty());
	}

	#[rstest]
	fn test_multiple_params_in_order() {
		// Arrange
		let pattern = PathPattern::new("/{org}/issues/{project}/").unwrap();

		// Act
		let params = pattern.extract_params("/acme/issues/web").unwrap();

		// Assert
		assert_eq!(pattern.param_names(), &["org", "project"]);
		assert_eq!(params["org"], "acme");
		assert_eq!(params["project"], "web");
	}

	#[rstest]
	#[case("/api/{}", "InvalidParam")]
	#[case("/api/{1st}", "InvalidParam")]
	#[case("/api/{id}/{id}", "InvalidParam")]
	#[case("/api/{id", "Unclosed")]
	fn test_invalid_patterns(#[case] raw: &str, #[case] kind: &str) {
		// Act
		let err = PathPattern::new(raw).unwrap_err();

		// Assert
		let matches_kind = match err {
			PatternError::InvalidParam(_) => kind == "InvalidParam",
			PatternError::Unclosed(_) => kind == "Unclosed",
			_ => false,
		};
		assert!(matches_kind, "unexpected error for {}: {}", raw, err);
	}

	#[rstest]
	fn test_pattern_too_long() {
		// Arrange
		let raw = format!("/{}", "a".repeat(MAX_PATTERN_LENGTH));

		// Act
		let result = PathPattern::new(&raw);

		// Assert
		assert!(matches!(result, Err(PatternError::TooLong(_))));
	}
}
