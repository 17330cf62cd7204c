//! Request parsing and response shapes for issues
//!
//! Request bodies arrive as loose field maps (JSON objects or form data).
//! These types turn them into explicit allow-lists so that protected fields
//! such as `project`, `_id` and `created_on` can never reach the store.

use bson::oid::ObjectId;
use bson::{Bson, Document};
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashMap;
use validator::Validate;

use super::models::{self, Issue, to_bson_datetime};

/// Read a client-supplied value as text
///
/// Numbers and booleans are stringified, null counts as absent, and
/// arrays or objects are not text at all.
fn text_value(value: &Value) -> Option<String> {
	match value {
		Value::String(s) => Some(s.clone()),
		Value::Number(n) => Some(n.to_string()),
		Value::Bool(b) => Some(b.to_string()),
		Value::Null | Value::Array(_) | Value::Object(_) => None,
	}
}

/// Interpret an `open` value: a JSON boolean or `"true"`/`"false"`
pub fn parse_open(value: &Value) -> Option<bool> {
	match value {
		Value::Bool(b) => Some(*b),
		Value::String(s) => match s.as_str() {
			"true" => Some(true),
			"false" => Some(false),
			_ => None,
		},
		_ => None,
	}
}

/// Fields accepted when creating an issue
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct CreateIssueSerializer {
	#[validate(length(min = 1, message = "issue_title is required"))]
	pub issue_title: String,

	#[validate(length(min = 1, message = "issue_text is required"))]
	pub issue_text: String,

	#[validate(length(min = 1, message = "created_by is required"))]
	pub created_by: String,

	pub assigned_to: String,
	pub status_text: String,
}

impl CreateIssueSerializer {
	/// Pick the create fields out of a request body; anything else is ignored
	pub fn from_fields(fields: &Map<String, Value>) -> Self {
		let get = |key: &str| fields.get(key).and_then(text_value).unwrap_or_default();

		Self {
			issue_title: get(models::ISSUE_TITLE),
			issue_text: get(models::ISSUE_TEXT),
			created_by: get(models::CREATED_BY),
			assigned_to: get(models::ASSIGNED_TO),
			status_text: get(models::STATUS_TEXT),
		}
	}

	/// Build a new open issue for `project`, stamped with `now`
	pub fn into_issue(self, project: &str, now: DateTime<Utc>) -> Issue {
		Issue {
			id: ObjectId::new(),
			project: project.to_string(),
			issue_title: self.issue_title,
			issue_text: self.issue_text,
			created_by: self.created_by,
			assigned_to: self.assigned_to,
			status_text: self.status_text,
			created_on: now,
			updated_on: now,
			open: true,
		}
	}
}

/// A field that was sent but cannot be stored as its declared type
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid value for '{0}'")]
pub struct InvalidField(pub &'static str);

/// Fields a client may change on an existing issue
///
/// Empty strings and nulls are treated as "not sent". `created_on`,
/// `project` and `_id` are not part of the allow-list.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UpdateIssueSerializer {
	pub issue_title: Option<String>,
	pub issue_text: Option<String>,
	pub created_by: Option<String>,
	pub assigned_to: Option<String>,
	pub status_text: Option<String>,
	pub open: Option<bool>,
	/// Allowed fields that were sent with a value of the wrong type
	pub invalid: Vec<&'static str>,
}

const UPDATABLE_TEXT_FIELDS: [&str; 5] = [
	models::ISSUE_TITLE,
	models::ISSUE_TEXT,
	models::CREATED_BY,
	models::ASSIGNED_TO,
	models::STATUS_TEXT,
];

impl UpdateIssueSerializer {
	pub fn from_fields(fields: &Map<String, Value>) -> Self {
		let mut update = Self::default();

		for key in UPDATABLE_TEXT_FIELDS {
			let Some(value) = fields.get(key) else {
				continue;
			};
			if is_blank(value) {
				continue;
			}
			match text_value(value) {
				Some(text) => *update.text_slot(key) = Some(text),
				None => update.invalid.push(key),
			}
		}

		if let Some(value) = fields.get(models::OPEN).filter(|v| !is_blank(v)) {
			match parse_open(value) {
				Some(open) => update.open = Some(open),
				None => update.invalid.push(models::OPEN),
			}
		}

		update
	}

	fn text_slot(&mut self, key: &str) -> &mut Option<String> {
		match key {
			models::ISSUE_TITLE => &mut self.issue_title,
			models::ISSUE_TEXT => &mut self.issue_text,
			models::CREATED_BY => &mut self.created_by,
			models::ASSIGNED_TO => &mut self.assigned_to,
			_ => &mut self.status_text,
		}
	}

	/// True when no allowed field carries a value
	pub fn is_empty(&self) -> bool {
		self.issue_title.is_none()
			&& self.issue_text.is_none()
			&& self.created_by.is_none()
			&& self.assigned_to.is_none()
			&& self.status_text.is_none()
			&& self.open.is_none()
			&& self.invalid.is_empty()
	}

	/// Fields to `$set`, including the refreshed `updated_on`
	pub fn to_set_document(&self, now: DateTime<Utc>) -> Result<Document, InvalidField> {
		if let Some(field) = self.invalid.first() {
			return Err(InvalidField(*field));
		}

		let mut set = Document::new();
		let texts = [
			(models::ISSUE_TITLE, &self.issue_title),
			(models::ISSUE_TEXT, &self.issue_text),
			(models::CREATED_BY, &self.created_by),
			(models::ASSIGNED_TO, &self.assigned_to),
			(models::STATUS_TEXT, &self.status_text),
		];
		for (key, value) in texts {
			if let Some(value) = value {
				set.insert(key, value.clone());
			}
		}
		if let Some(open) = self.open {
			set.insert(models::OPEN, open);
		}
		set.insert(models::UPDATED_ON, to_bson_datetime(now));

		Ok(set)
	}
}

fn is_blank(value: &Value) -> bool {
	match value {
		Value::Null => true,
		Value::String(s) => s.is_empty(),
		_ => false,
	}
}

/// Issue as returned to clients; `project` is left out
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IssueResponse {
	#[serde(rename = "_id")]
	pub id: String,
	pub issue_title: String,
	pub issue_text: String,
	pub created_on: String,
	pub updated_on: String,
	pub created_by: String,
	pub assigned_to: String,
	pub open: bool,
	pub status_text: String,
}

fn format_timestamp(at: &DateTime<Utc>) -> String {
	at.to_rfc3339_opts(SecondsFormat::Millis, true)
}

impl From<&Issue> for IssueResponse {
	fn from(issue: &Issue) -> Self {
		Self {
			id: issue.id.to_hex(),
			issue_title: issue.issue_title.clone(),
			issue_text: issue.issue_text.clone(),
			created_on: format_timestamp(&issue.created_on),
			updated_on: format_timestamp(&issue.updated_on),
			created_by: issue.created_by.clone(),
			assigned_to: issue.assigned_to.clone(),
			open: issue.open,
			status_text: issue.status_text.clone(),
		}
	}
}

/// Build the list filter for `project` from query parameters
///
/// Every pair is an exact-match condition. The path project always wins
/// over a `project` query key. Returns `None` when a value cannot match
/// its field's type (a malformed `_id`, a non-boolean `open`, an
/// unparseable timestamp), which lists as empty.
pub fn list_filter(project: &str, query: &HashMap<String, String>) -> Option<Document> {
	let mut filter = Document::new();
	filter.insert(models::PROJECT, project);

	for (key, value) in query {
		let condition = match key.as_str() {
			models::PROJECT => continue,
			models::ID => Bson::ObjectId(ObjectId::parse_str(value).ok()?),
			models::OPEN => Bson::Boolean(parse_open(&Value::String(value.clone()))?),
			models::CREATED_ON | models::UPDATED_ON => {
				let at = DateTime::parse_from_rfc3339(value).ok()?;
				Bson::DateTime(to_bson_datetime(at.with_timezone(&Utc)))
			}
			_ => Bson::String(value.clone()),
		};
		filter.insert(key.clone(), condition);
	}

	Some(filter)
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::*;
	use serde_json::json;

	fn fields(value: Value) -> Map<String, Value> {
		match value {
			Value::Object(map) => map,
			_ => panic!("expected an object"),
		}
	}

	#[rstest]
	fn test_create_serializer_requires_fields() {
		// Arrange
		let complete = CreateIssueSerializer::from_fields(&fields(json!({
			"issue_title": "Title",
			"issue_text": "Text",
			"created_by": "Joe",
		})));
		let missing_text = CreateIssueSerializer::from_fields(&fields(json!({
			"issue_title": "Title",
			"issue_text": "",
			"created_by": "Joe",
		})));

		// Act & Assert
		assert!(complete.validate().is_ok());
		assert_eq!(complete.assigned_to, "");
		assert!(missing_text.validate().is_err());
	}

	#[rstest]
	fn test_create_serializer_ignores_protected_fields() {
		// Arrange
		let serializer = CreateIssueSerializer::from_fields(&fields(json!({
			"issue_title": "Title",
			"issue_text": "Text",
			"created_by": "Joe",
			"project": "other",
			"open": false,
		})));
		let now = Utc::now();

		// Act
		let issue = serializer.into_issue("apitest", now);

		// Assert
		assert_eq!(issue.project, "apitest");
		assert!(issue.open);
		assert_eq!(issue.created_on, now);
		assert_eq!(issue.updated_on, now);
	}

	#[rstest]
	fn test_update_serializer_skips_blank_and_unknown() {
		// Act
		let update = UpdateIssueSerializer::from_fields(&fields(json!({
			"_id": "5f43a1c2b3e4d5f6a7b8c9d0",
			"issue_title": "",
			"issue_text": null,
			"project": "hijack",
			"created_on": "2020-01-01T00:00:00Z",
		})));

		// Assert
		assert!(update.is_empty());
	}

	#[rstest]
	#[case(json!(false), Some(false))]
	#[case(json!("true"), Some(true))]
	#[case(json!("false"), Some(false))]
	#[case(json!("maybe"), None)]
	#[case(json!(1), None)]
	fn test_parse_open(#[case] value: Value, #[case] expected: Option<bool>) {
		assert_eq!(parse_open(&value), expected);
	}

	#[rstest]
	fn test_set_document_contains_only_sent_fields() {
		// Arrange
		let update = UpdateIssueSerializer::from_fields(&fields(json!({
			"issue_text": "New text",
			"open": "false",
		})));
		let now = Utc::now();

		// Act
		let set = update.to_set_document(now).unwrap();

		// Assert
		let keys: Vec<&str> = set.keys().map(String::as_str).collect();
		assert_eq!(keys, vec!["issue_text", "open", "updated_on"]);
		assert_eq!(set.get("open"), Some(&Bson::Boolean(false)));
	}

	#[rstest]
	#[case(json!({"open": "maybe"}), "open")]
	#[case(json!({"issue_title": ["a"]}), "issue_title")]
	fn test_invalid_values_are_not_empty_but_fail(#[case] body: Value, #[case] field: &str) {
		// Act
		let update = UpdateIssueSerializer::from_fields(&fields(body));

		// Assert
		assert!(!update.is_empty());
		assert_eq!(update.to_set_document(Utc::now()).unwrap_err().0, field);
	}

	#[rstest]
	fn test_response_omits_project_and_formats_dates() {
		// Arrange
		let at = DateTime::from_timestamp_millis(1_600_000_000_000).unwrap();
		let issue = CreateIssueSerializer {
			issue_title: "t".to_string(),
			issue_text: "x".to_string(),
			created_by: "me".to_string(),
			..Default::default()
		}
		.into_issue("apitest", at);

		// Act
		let value = serde_json::to_value(IssueResponse::from(&issue)).unwrap();

		// Assert
		assert!(value.get("project").is_none());
		assert_eq!(value["_id"], issue.id.to_hex());
		assert_eq!(value["created_on"], "2020-09-13T12:26:40.000Z");
	}

	#[rstest]
	fn test_list_filter_keeps_path_project() {
		// Arrange
		let query = HashMap::from([
			("project".to_string(), "other".to_string()),
			("created_by".to_string(), "Chai Test".to_string()),
			("open".to_string(), "true".to_string()),
		]);

		// Act
		let filter = list_filter("apitest", &query).unwrap();

		// Assert
		assert_eq!(filter.get_str("project").unwrap(), "apitest");
		assert_eq!(filter.get_str("created_by").unwrap(), "Chai Test");
		assert_eq!(filter.get("open"), Some(&Bson::Boolean(true)));
	}

	#[rstest]
	#[case("_id", "invalidid123")]
	#[case("open", "yes")]
	#[case("created_on", "yesterday")]
	fn test_list_filter_rejects_unmatchable_values(#[case] key: &str, #[case] value: &str) {
		let query = HashMap::from([(key.to_string(), value.to_string())]);
		assert!(list_filter("apitest", &query).is_none());
	}
}
