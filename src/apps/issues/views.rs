//! Issue views
//!
//! Every outcome of a client mistake is a `200` with an `error` field in
//! the body. Store failures are logged and downgraded the same way, except
//! on create, which answers `500`.

use async_trait::async_trait;
use bson::oid::ObjectId;
use chrono::Utc;
use hyper::{Method, StatusCode};
use issuetracker_http::{Error, Request, Response, Result};
use issuetracker_views::View;
use serde_json::{Map, Value, json};
use validator::Validate;

use super::serializers::{CreateIssueSerializer, IssueResponse, UpdateIssueSerializer, list_filter};
use super::store::IssueStore;

const MISSING_ID: &str = "missing _id";
const MISSING_FIELDS: &str = "required field(s) missing";
const NO_UPDATE_FIELDS: &str = "no update field(s) sent";
const COULD_NOT_UPDATE: &str = "could not update";
const COULD_NOT_DELETE: &str = "could not delete";
const SERVER_ERROR: &str = "server error";

fn json_response(status: StatusCode, body: &Value) -> Result<Response> {
	Response::new(status).with_json(body)
}

fn error_response(message: &str) -> Result<Response> {
	json_response(StatusCode::OK, &json!({ "error": message }))
}

fn error_with_id(message: &str, id: &Value) -> Result<Response> {
	json_response(StatusCode::OK, &json!({ "error": message, "_id": id }))
}

fn result_with_id(message: &str, id: &Value) -> Result<Response> {
	json_response(StatusCode::OK, &json!({ "result": message, "_id": id }))
}

/// The `_id` a client sent, unless it is absent, null or empty
fn submitted_id(fields: &Map<String, Value>) -> Option<&Value> {
	fields.get("_id").filter(|id| match id {
		Value::Null => false,
		Value::String(s) => !s.is_empty(),
		_ => true,
	})
}

fn parse_id(id: &Value) -> Option<ObjectId> {
	id.as_str()
		.and_then(|s| issuetracker_db::parse_object_id(s).ok())
}

/// Body fields, or none when the body cannot be decoded
fn body_fields(request: &Request) -> Map<String, Value> {
	request.fields().unwrap_or_else(|err| {
		tracing::debug!(error = %err, "unreadable request body treated as empty");
		Map::new()
	})
}

/// CRUD over the issues of one project, routed at `/api/issues/{project}`
pub struct IssueView {
	store: IssueStore,
}

impl IssueView {
	pub fn new(store: IssueStore) -> Self {
		Self { store }
	}

	async fn list(&self, project: &str, request: &Request) -> Result<Response> {
		let issues = match list_filter(project, &request.query_params) {
			None => {
				tracing::debug!(project, "filter cannot match any issue");
				Vec::new()
			}
			Some(filter) => match self.store.find(filter).await {
				Ok(issues) => issues,
				Err(err) => {
					tracing::warn!(project, error = %err, "listing issues failed, returning empty list");
					Vec::new()
				}
			},
		};

		let body: Vec<IssueResponse> = issues.iter().map(IssueResponse::from).collect();
		Response::ok().with_json(&body)
	}

	async fn create(&self, project: &str, request: &Request) -> Result<Response> {
		let serializer = CreateIssueSerializer::from_fields(&body_fields(request));
		if serializer.validate().is_err() {
			return error_response(MISSING_FIELDS);
		}

		match self.store.create(&serializer.into_issue(project, Utc::now())).await {
			Ok(issue) => {
				tracing::debug!(project, id = %issue.id, "issue created");
				Response::ok().with_json(&IssueResponse::from(&issue))
			}
			Err(err) => {
				tracing::error!(project, error = %err, "creating issue failed");
				json_response(
					StatusCode::INTERNAL_SERVER_ERROR,
					&json!({ "error": SERVER_ERROR }),
				)
			}
		}
	}

	async fn update(&self, request: &Request) -> Result<Response> {
		let fields = body_fields(request);
		let Some(raw_id) = submitted_id(&fields) else {
			return error_response(MISSING_ID);
		};

		let update = UpdateIssueSerializer::from_fields(&fields);
		if update.is_empty() {
			return error_with_id(NO_UPDATE_FIELDS, raw_id);
		}

		let Some(id) = parse_id(raw_id) else {
			return error_with_id(COULD_NOT_UPDATE, raw_id);
		};

		let set = match update.to_set_document(Utc::now()) {
			Ok(set) => set,
			Err(err) => {
				tracing::debug!(%id, error = %err, "update rejected");
				return error_with_id(COULD_NOT_UPDATE, raw_id);
			}
		};

		match self.store.update_by_id(id, set).await {
			Ok(Some(_)) => {
				tracing::debug!(%id, "issue updated");
				result_with_id("successfully updated", raw_id)
			}
			Ok(None) => error_with_id(COULD_NOT_UPDATE, raw_id),
			Err(err) => {
				tracing::error!(%id, error = %err, "updating issue failed");
				error_with_id(COULD_NOT_UPDATE, raw_id)
			}
		}
	}

	async fn delete(&self, request: &Request) -> Result<Response> {
		let fields = body_fields(request);
		let Some(raw_id) = submitted_id(&fields) else {
			return error_response(MISSING_ID);
		};

		let Some(id) = parse_id(raw_id) else {
			return error_with_id(COULD_NOT_DELETE, raw_id);
		};

		match self.store.delete_by_id(id).await {
			Ok(Some(_)) => {
				tracing::debug!(%id, "issue deleted");
				result_with_id("successfully deleted", raw_id)
			}
			Ok(None) => error_with_id(COULD_NOT_DELETE, raw_id),
			Err(err) => {
				tracing::error!(%id, error = %err, "deleting issue failed");
				error_with_id(COULD_NOT_DELETE, raw_id)
			}
		}
	}
}

#[async_trait]
impl View for IssueView {
	async fn dispatch(&self, request: Request) -> Result<Response> {
		let project = request
			.path_param("project")
			.ok_or_else(|| Error::NotFound(request.path().to_string()))?
			.to_string();

		match request.method {
			Method::GET => self.list(&project, &request).await,
			Method::POST => self.create(&project, &request).await,
			Method::PUT => self.update(&request).await,
			Method::DELETE => self.delete(&request).await,
			ref other => Err(Error::MethodNotAllowed(other.to_string())),
		}
	}

	fn allowed_methods(&self) -> Vec<&'static str> {
		vec!["GET", "POST", "PUT", "DELETE", "OPTIONS"]
	}
}

/// Liveness of the service and its store
pub struct HealthView {
	store: IssueStore,
}

impl HealthView {
	pub fn new(store: IssueStore) -> Self {
		Self { store }
	}
}

#[async_trait]
impl View for HealthView {
	async fn dispatch(&self, _request: Request) -> Result<Response> {
		match self.store.health_check().await {
			Ok(()) => json_response(StatusCode::OK, &json!({ "status": "ok" })),
			Err(err) => {
				tracing::warn!(error = %err, "store health check failed");
				json_response(
					StatusCode::SERVICE_UNAVAILABLE,
					&json!({ "status": "unavailable" }),
				)
			}
		}
	}

	fn allowed_methods(&self) -> Vec<&'static str> {
		vec!["GET", "OPTIONS"]
	}
}
