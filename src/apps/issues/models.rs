//! Issue model and its document mapping

use bson::oid::ObjectId;
use bson::{Bson, Document, doc};
use chrono::{DateTime, Utc};
use issuetracker_db::{NoSQLError, Result};

pub const ID: &str = "_id";
pub const PROJECT: &str = "project";
pub const ISSUE_TITLE: &str = "issue_title";
pub const ISSUE_TEXT: &str = "issue_text";
pub const CREATED_BY: &str = "created_by";
pub const ASSIGNED_TO: &str = "assigned_to";
pub const STATUS_TEXT: &str = "status_text";
pub const CREATED_ON: &str = "created_on";
pub const UPDATED_ON: &str = "updated_on";
pub const OPEN: &str = "open";

/// An issue filed against a project
#[derive(Debug, Clone, PartialEq)]
pub struct Issue {
	pub id: ObjectId,
	/// Taken from the route; never writable by clients
	pub project: String,
	pub issue_title: String,
	pub issue_text: String,
	pub created_by: String,
	pub assigned_to: String,
	pub status_text: String,
	pub created_on: DateTime<Utc>,
	pub updated_on: DateTime<Utc>,
	pub open: bool,
}

/// Convert to the store's millisecond-precision timestamp
pub fn to_bson_datetime(at: DateTime<Utc>) -> bson::DateTime {
	bson::DateTime::from_millis(at.timestamp_millis())
}

fn from_bson_datetime(at: bson::DateTime) -> Result<DateTime<Utc>> {
	DateTime::from_timestamp_millis(at.timestamp_millis()).ok_or_else(|| {
		NoSQLError::SerializationError(format!("timestamp out of range: {}", at.timestamp_millis()))
	})
}

impl Issue {
	/// Issue document as stored
	pub fn to_document(&self) -> Document {
		doc! {
			ID: self.id,
			PROJECT: self.project.clone(),
			ISSUE_TITLE: self.issue_title.clone(),
			ISSUE_TEXT: self.issue_text.clone(),
			CREATED_BY: self.created_by.clone(),
			ASSIGNED_TO: self.assigned_to.clone(),
			STATUS_TEXT: self.status_text.clone(),
			CREATED_ON: to_bson_datetime(self.created_on),
			UPDATED_ON: to_bson_datetime(self.updated_on),
			OPEN: self.open,
		}
	}

	/// Decode a stored document
	///
	/// Optional text fields default to empty and `open` to true, matching
	/// what creation writes.
	pub fn from_document(document: &Document) -> Result<Self> {
		let id = match document.get(ID) {
			Some(Bson::ObjectId(oid)) => *oid,
			other => {
				return Err(NoSQLError::SerializationError(format!(
					"issue document has no ObjectId _id: {:?}",
					other
				)));
			}
		};

		Ok(Self {
			id,
			project: text(document, PROJECT)?,
			issue_title: text(document, ISSUE_TITLE)?,
			issue_text: text(document, ISSUE_TEXT)?,
			created_by: text(document, CREATED_BY)?,
			assigned_to: optional_text(document, ASSIGNED_TO)?,
			status_text: optional_text(document, STATUS_TEXT)?,
			created_on: timestamp(document, CREATED_ON)?,
			updated_on: timestamp(document, UPDATED_ON)?,
			open: match document.get(OPEN) {
				None => true,
				Some(Bson::Boolean(open)) => *open,
				Some(other) => {
					return Err(NoSQLError::SerializationError(format!(
						"field '{}' is not a boolean: {}",
						OPEN, other
					)));
				}
			},
		})
	}
}

fn optional_text(document: &Document, key: &str) -> Result<String> {
	match document.get(key) {
		None | Some(Bson::Null) => Ok(String::new()),
		Some(Bson::String(s)) => Ok(s.clone()),
		Some(other) => Err(NoSQLError::SerializationError(format!(
			"field '{}' is not a string: {}",
			key, other
		))),
	}
}

fn text(document: &Document, key: &str) -> Result<String> {
	if document.get(key).is_none() {
		return Err(NoSQLError::SerializationError(format!(
			"issue document is missing '{}'",
			key
		)));
	}
	optional_text(document, key)
}

fn timestamp(document: &Document, key: &str) -> Result<DateTime<Utc>> {
	match document.get(key) {
		Some(Bson::DateTime(at)) => from_bson_datetime(*at),
		other => Err(NoSQLError::SerializationError(format!(
			"field '{}' is not a timestamp: {:?}",
			key, other
		))),
	}
}
