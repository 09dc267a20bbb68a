//! Minimal HTTP stand-in for an IQ server.
//!
//! Public `api/v2` routes only require basic auth. Private `rest/` routes
//! require the session cookie and an `X-CSRF-TOKEN` header matching the
//! `CLM-CSRF-TOKEN` cookie handed out by `GET /rest/user/session`; anything
//! else gets `403`.

#![allow(dead_code)]

use std::collections::{BTreeMap, HashSet};
use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use axum::extract::{Path, Query, State};
use axum::http::header::{AUTHORIZATION, COOKIE, SET_COOKIE};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{AppendHeaders, IntoResponse, Response};
use axum::routing::{delete, get};
use parking_lot::Mutex;
use serde::Deserialize;
use serde_json::{Value, json};
use tokio::net::TcpListener;

#[derive(Default)]
pub struct MockState {
	/// public id -> internal id
	pub applications: BTreeMap<String, String>,
	/// (public id, stage) -> component hashes
	pub reports: BTreeMap<(String, String), Vec<String>>,
	/// (public id, hash) -> waiversByOwner array
	pub waivers: BTreeMap<(String, String), Value>,
	/// When false the session endpoint omits the CSRF cookie.
	pub issue_csrf: bool,
	pub sessions_issued: usize,
	pub valid_tokens: HashSet<String>,
	pub rejected: usize,
	pub deleted_organizations: Vec<String>,
}

pub type Shared = Arc<Mutex<MockState>>;

pub struct MockIq {
	pub addr: SocketAddr,
	pub state: Shared,
	server: tokio::task::JoinHandle<()>,
}

impl MockIq {
	pub async fn start() -> Self {
		let state: Shared = Arc::new(Mutex::new(MockState {
			issue_csrf: true,
			..MockState::default()
		}));

		let app = Router::new()
			.route("/rest/user/session", get(session))
			.route("/rest/organization/{id}", delete(delete_organization))
			.route("/rest/policyWaiver/application/{app}/component/{hash}", get(waivers))
			.route("/api/v2/applications", get(applications))
			.route("/api/v2/reports/applications/{id}", get(report_infos))
			.route("/api/v2/applications/{app}/reports/{report}/raw", get(raw_report))
			.with_state(state.clone());

		let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
		let addr = listener.local_addr().unwrap();
		let server = tokio::spawn(async move {
			axum::serve(listener, app).await.unwrap();
		});

		Self { addr, state, server }
	}

	pub fn url(&self) -> String {
		format!("http://{}", self.addr)
	}

	pub fn add_application(&self, public_id: &str) {
		self.state
			.lock()
			.applications
			.insert(public_id.to_string(), format!("{}-internal", public_id));
	}

	pub fn add_report(&self, public_id: &str, stage: &str, hashes: &[&str]) {
		self.state.lock().reports.insert(
			(public_id.to_string(), stage.to_string()),
			hashes.iter().map(|h| h.to_string()).collect(),
		);
	}

	pub fn add_waivers(&self, public_id: &str, hash: &str, owners: Value) {
		self.state.lock().waivers.insert((public_id.to_string(), hash.to_string()), owners);
	}

	pub fn sessions_issued(&self) -> usize {
		self.state.lock().sessions_issued
	}

	pub fn rejected(&self) -> usize {
		self.state.lock().rejected
	}
}

impl Drop for MockIq {
	fn drop(&mut self) {
		self.server.abort();
	}
}

pub fn waiver_owner(owner_id: &str, waiver_id: &str, hash: &str) -> Value {
	json!({
		"ownerId": owner_id,
		"ownerName": owner_id,
		"ownerType": "application",
		"waivers": [{
			"id": waiver_id,
			"hash": hash,
			"policyId": "policy-1",
			"ownerId": owner_id,
			"comment": "accepted risk",
			"createTime": 1565707371130i64,
			"constraintFactsJson": null,
			"constraintFacts": null,
			"policyName": "Security-High"
		}]
	})
}

fn has_basic_auth(headers: &HeaderMap) -> bool {
	headers
		.get(AUTHORIZATION)
		.and_then(|v| v.to_str().ok())
		.is_some_and(|v| v.starts_with("Basic "))
}

fn cookie_value(headers: &HeaderMap, name: &str) -> Option<String> {
	headers
		.get_all(COOKIE)
		.iter()
		.filter_map(|v| v.to_str().ok())
		.flat_map(|v| v.split(';'))
		.filter_map(|pair| pair.trim().split_once('='))
		.find(|(key, _)| *key == name)
		.map(|(_, value)| value.to_string())
}

/// Enforces the private-API session rules.
fn check_session(state: &Shared, headers: &HeaderMap) -> Result<(), StatusCode> {
	let header = headers.get("x-csrf-token").and_then(|v| v.to_str().ok()).map(str::to_string);
	let cookie = cookie_value(headers, "CLM-CSRF-TOKEN");
	let session = cookie_value(headers, "JSESSIONID");
	let mut state = state.lock();
	let ok = match (header, cookie, session) {
		(Some(header), Some(cookie), Some(_)) => header == cookie && state.valid_tokens.contains(&header),
		_ => false,
	};
	if ok {
		Ok(())
	} else {
		state.rejected += 1;
		Err(StatusCode::FORBIDDEN)
	}
}

async fn session(State(state): State<Shared>, headers: HeaderMap) -> Response {
	if !has_basic_auth(&headers) {
		return StatusCode::UNAUTHORIZED.into_response();
	}
	let mut state = state.lock();
	state.sessions_issued += 1;
	let n = state.sessions_issued;
	let token = format!("csrf-{}", n);
	state.valid_tokens.insert(token.clone());

	let session_cookie = format!("JSESSIONID=node0session{}; Path=/; HttpOnly", n);
	if state.issue_csrf {
		let csrf_cookie = format!("CLM-CSRF-TOKEN={}; Path=/", token);
		(AppendHeaders([(SET_COOKIE, session_cookie), (SET_COOKIE, csrf_cookie)]), StatusCode::OK).into_response()
	} else {
		(AppendHeaders([(SET_COOKIE, session_cookie)]), StatusCode::OK).into_response()
	}
}

async fn delete_organization(State(state): State<Shared>, headers: HeaderMap, Path(id): Path<String>) -> Response {
	if let Err(status) = check_session(&state, &headers) {
		return status.into_response();
	}
	state.lock().deleted_organizations.push(id);
	StatusCode::NO_CONTENT.into_response()
}

async fn waivers(State(state): State<Shared>, headers: HeaderMap, Path((app, hash)): Path<(String, String)>) -> Response {
	if let Err(status) = check_session(&state, &headers) {
		return status.into_response();
	}
	let owners = state.lock().waivers.get(&(app, hash)).cloned().unwrap_or_else(|| json!([]));
	axum::Json(json!({ "waiversByOwner": owners })).into_response()
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApplicationQuery {
	public_id: Option<String>,
}

async fn applications(State(state): State<Shared>, headers: HeaderMap, Query(query): Query<ApplicationQuery>) -> Response {
	if !has_basic_auth(&headers) {
		return StatusCode::UNAUTHORIZED.into_response();
	}
	let state = state.lock();
	let apps: Vec<Value> = state
		.applications
		.iter()
		.filter(|(public_id, _)| query.public_id.as_ref().is_none_or(|wanted| wanted == *public_id))
		.map(|(public_id, id)| json!({"id": id, "publicId": public_id, "name": public_id, "organizationId": "ROOT_ORGANIZATION_ID"}))
		.collect();
	axum::Json(json!({ "applications": apps })).into_response()
}

async fn report_infos(State(state): State<Shared>, Path(id): Path<String>) -> Response {
	let state = state.lock();
	let Some(public_id) = state.applications.iter().find(|(_, internal)| **internal == id).map(|(p, _)| p.clone()) else {
		return StatusCode::NOT_FOUND.into_response();
	};
	let infos: Vec<Value> = state
		.reports
		.keys()
		.filter(|(app, _)| *app == public_id)
		.map(|(app, stage)| {
			let report = format!("{}-{}", app, stage);
			json!({
				"stage": stage,
				"applicationId": id,
				"reportHtmlUrl": format!("ui/links/application/{}/report/{}", app, report),
				"reportDataUrl": format!("api/v2/applications/{}/reports/{}/raw", app, report)
			})
		})
		.collect();
	axum::Json(Value::Array(infos)).into_response()
}

async fn raw_report(State(state): State<Shared>, Path((app, report)): Path<(String, String)>) -> Response {
	let state = state.lock();
	let Some(stage) = report.strip_prefix(&format!("{}-", app)) else {
		return StatusCode::NOT_FOUND.into_response();
	};
	match state.reports.get(&(app.clone(), stage.to_string())) {
		Some(hashes) => {
			let components: Vec<Value> = hashes.iter().map(|h| json!({"hash": h, "matchState": "exact"})).collect();
			axum::Json(json!({ "components": components })).into_response()
		}
		None => StatusCode::NOT_FOUND.into_response(),
	}
}
