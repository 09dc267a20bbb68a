//! In-memory IQ server for unit testing.
//!
//! [`FakeServer`] implements both [`BaseClient`] (scripted HTTP replies keyed
//! by method and path) and [`PublicApi`] (applications and reports held in
//! memory), and records every request it sees.
//!
//! # Example
//!
//! ```ignore
//! let fake = Arc::new(FakeServer::new());
//! fake.set_session_cookies(&[("CLM-CSRF-TOKEN", "t")]);
//! fake.route(Method::DELETE, "rest/organization/x", FakeReply::status(StatusCode::NO_CONTENT));
//!
//! let client = PrivateClient::new(fake.clone());
//! client.delete("rest/organization/x").await?;
//! assert_eq!(fake.requests_to("rest/organization/x"), 1);
//! ```

use std::collections::{HashMap, VecDeque};
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use iq_protocol::{Application, Component, Evaluation, Organization, RawReport, RawReportComponent, ReportInfo, Stage};
use parking_lot::Mutex;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::{Method, Request, StatusCode};

use crate::error::{Error, Result};
use crate::public::PublicApi;
use crate::server::{BaseClient, RawResponse, RequestBody, SessionCookie, build_request, endpoint_url};
use crate::session::SESSION_PATH;

pub const FAKE_HOST: &str = "http://fake.iq";
const FAKE_USERNAME: &str = "admin";
const FAKE_PASSWORD: &str = "admin123";

/// Scripted answer to one request.
#[derive(Debug, Clone)]
pub enum FakeReply {
	Respond {
		status: StatusCode,
		headers: Vec<(String, String)>,
		cookies: Vec<SessionCookie>,
		body: Bytes,
	},
	/// Fails at the transport level.
	Fail(String),
}

impl FakeReply {
	pub fn status(status: StatusCode) -> Self {
		Self::bytes(status, Bytes::new())
	}

	pub fn json(status: StatusCode, value: serde_json::Value) -> Self {
		Self::bytes(status, Bytes::from(value.to_string())).with_header("content-type", "application/json")
	}

	pub fn text(status: StatusCode, text: &str) -> Self {
		Self::bytes(status, Bytes::from(text.to_string()))
	}

	pub fn bytes(status: StatusCode, body: impl Into<Bytes>) -> Self {
		FakeReply::Respond {
			status,
			headers: Vec::new(),
			cookies: Vec::new(),
			body: body.into(),
		}
	}

	pub fn fail(message: &str) -> Self {
		FakeReply::Fail(message.to_string())
	}

	pub fn with_header(mut self, name: &str, value: &str) -> Self {
		if let FakeReply::Respond { headers, .. } = &mut self {
			headers.push((name.to_string(), value.to_string()));
		}
		self
	}

	pub fn with_cookie(mut self, name: &str, value: &str) -> Self {
		if let FakeReply::Respond { cookies, .. } = &mut self {
			cookies.push(SessionCookie::new(name, value));
		}
		self
	}

	fn into_response(self) -> Result<RawResponse> {
		match self {
			FakeReply::Fail(message) => Err(Error::transport(message)),
			FakeReply::Respond {
				status,
				headers,
				cookies,
				body,
			} => {
				let mut map = HeaderMap::new();
				for (name, value) in headers {
					let name = HeaderName::from_bytes(name.as_bytes()).map_err(|e| Error::transport(e.to_string()))?;
					map.append(name, HeaderValue::from_str(&value)?);
				}
				Ok(RawResponse {
					status,
					headers: map,
					cookies,
					body,
				})
			}
		}
	}
}

/// A request as the fake received it.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
	pub method: Method,
	/// Server-relative path without the leading slash, including any query.
	pub path: String,
	pub headers: HeaderMap,
	/// Empty for streamed bodies such as multipart uploads.
	pub body: Bytes,
}

impl RecordedRequest {
	pub fn header(&self, name: &str) -> Option<String> {
		self.headers.get(name).and_then(|v| v.to_str().ok()).map(str::to_string)
	}

	pub fn json(&self) -> Option<serde_json::Value> {
		serde_json::from_slice(&self.body).ok()
	}
}

#[derive(Debug, Clone)]
enum FakeReport {
	Present(RawReport),
	Fail(String),
}

#[derive(Default)]
struct FakeState {
	routes: HashMap<(Method, String), VecDeque<FakeReply>>,
	requests: Vec<RecordedRequest>,
	applications: Vec<Application>,
	applications_failure: Option<String>,
	organizations: Vec<Organization>,
	reports: HashMap<(String, Stage), FakeReport>,
	report_fetches: Vec<(String, Stage)>,
	deleted_applications: Vec<String>,
	evaluation: Option<Evaluation>,
	next_id: usize,
	latency: Option<Duration>,
}

/// Scriptable stand-in for an IQ server.
pub struct FakeServer {
	http: reqwest::Client,
	state: Mutex<FakeState>,
}

impl Default for FakeServer {
	fn default() -> Self {
		Self::new()
	}
}

impl FakeServer {
	/// A server whose session endpoint answers `200` without cookies and
	/// whose every other route answers `404`.
	pub fn new() -> Self {
		let server = Self {
			http: reqwest::Client::new(),
			state: Mutex::new(FakeState::default()),
		};
		server.route(Method::GET, SESSION_PATH, FakeReply::status(StatusCode::OK));
		server
	}

	/// Cookies handed out by `GET rest/user/session` from now on.
	pub fn set_session_cookies(&self, cookies: &[(&str, &str)]) {
		let reply = cookies
			.iter()
			.fold(FakeReply::status(StatusCode::OK), |reply, (name, value)| reply.with_cookie(name, value));
		self.route(Method::GET, SESSION_PATH, reply);
	}

	/// Answers every `method` request to `path` with `reply`.
	pub fn route(&self, method: Method, path: &str, reply: FakeReply) {
		self.route_sequence(method, path, vec![reply]);
	}

	/// Answers successive requests with `replies` in order; the last one repeats.
	pub fn route_sequence(&self, method: Method, path: &str, replies: Vec<FakeReply>) {
		self.state.lock().routes.insert((method, path.to_string()), replies.into());
	}

	/// Delays every HTTP reply, to widen interleavings in concurrency tests.
	pub fn set_latency(&self, latency: Duration) {
		self.state.lock().latency = Some(latency);
	}

	pub fn requests(&self) -> Vec<RecordedRequest> {
		self.state.lock().requests.clone()
	}

	pub fn requests_to(&self, path: &str) -> usize {
		self.state.lock().requests.iter().filter(|r| r.path == path).count()
	}

	/// Registers an application whose internal id is `{public_id}-id`.
	pub fn add_application(&self, public_id: &str) -> Application {
		let app = Application {
			id: format!("{}-id", public_id),
			public_id: public_id.to_string(),
			name: public_id.to_string(),
			organization_id: "ROOT_ORGANIZATION_ID".to_string(),
			contact_user_name: None,
		};
		self.state.lock().applications.push(app.clone());
		app
	}

	pub fn fail_applications(&self, message: &str) {
		self.state.lock().applications_failure = Some(message.to_string());
	}

	pub fn add_organization(&self, id: &str, name: &str) {
		self.state.lock().organizations.push(Organization {
			id: id.to_string(),
			name: name.to_string(),
			parent_organization_id: Some("ROOT_ORGANIZATION_ID".to_string()),
		});
	}

	/// Gives `public_id` a report at `stage` listing `hashes` in order.
	pub fn add_report(&self, public_id: &str, stage: Stage, hashes: &[&str]) {
		let report = RawReport {
			components: hashes
				.iter()
				.map(|hash| RawReportComponent {
					hash: Some(hash.to_string()),
					component_identifier: None,
					package_url: None,
					proprietary: false,
					match_state: Some("exact".into()),
					pathnames: Vec::new(),
				})
				.collect(),
		};
		self.state
			.lock()
			.reports
			.insert((public_id.to_string(), stage), FakeReport::Present(report));
	}

	pub fn fail_report(&self, public_id: &str, stage: Stage, message: &str) {
		self.state
			.lock()
			.reports
			.insert((public_id.to_string(), stage), FakeReport::Fail(message.to_string()));
	}

	/// Serves `owners` from the waiver lookup of `public_id`/`hash`.
	pub fn add_waivers(&self, public_id: &str, hash: &str, owners: serde_json::Value) {
		self.route(
			Method::GET,
			&waiver_path(public_id, hash),
			FakeReply::json(StatusCode::OK, serde_json::json!({ "waiversByOwner": owners })),
		);
	}

	pub fn fail_waivers(&self, public_id: &str, hash: &str, message: &str) {
		self.route(Method::GET, &waiver_path(public_id, hash), FakeReply::fail(message));
	}

	/// Number of `raw_report` calls, successful or not.
	pub fn report_fetches(&self) -> usize {
		self.state.lock().report_fetches.len()
	}

	pub fn report_fetches_for(&self, public_id: &str) -> Vec<Stage> {
		self.state
			.lock()
			.report_fetches
			.iter()
			.filter(|(app, _)| app == public_id)
			.map(|(_, stage)| *stage)
			.collect()
	}

	pub fn deleted_applications(&self) -> Vec<String> {
		self.state.lock().deleted_applications.clone()
	}

	pub fn set_evaluation(&self, evaluation: Evaluation) {
		self.state.lock().evaluation = Some(evaluation);
	}

	fn record(&self, request: &Request) -> (RecordedRequest, Option<Duration>) {
		let url = request.url();
		let mut path = url.path().trim_start_matches('/').to_string();
		if let Some(query) = url.query() {
			path.push('?');
			path.push_str(query);
		}
		let recorded = RecordedRequest {
			method: request.method().clone(),
			path,
			headers: request.headers().clone(),
			body: request
				.body()
				.and_then(|b| b.as_bytes())
				.map(Bytes::copy_from_slice)
				.unwrap_or_default(),
		};
		let mut state = self.state.lock();
		state.requests.push(recorded.clone());
		(recorded, state.latency)
	}

	fn next_reply(&self, method: &Method, path: &str) -> FakeReply {
		let mut state = self.state.lock();
		match state.routes.get_mut(&(method.clone(), path.to_string())) {
			Some(replies) if replies.len() > 1 => replies.pop_front().unwrap_or_else(|| FakeReply::status(StatusCode::NOT_FOUND)),
			Some(replies) => replies.front().cloned().unwrap_or_else(|| FakeReply::status(StatusCode::NOT_FOUND)),
			None => FakeReply::status(StatusCode::NOT_FOUND),
		}
	}

	fn next_id(&self, prefix: &str) -> String {
		let mut state = self.state.lock();
		state.next_id += 1;
		format!("{}-{}", prefix, state.next_id)
	}
}

fn waiver_path(public_id: &str, hash: &str) -> String {
	format!("rest/policyWaiver/application/{}/component/{}", public_id, hash)
}

#[async_trait]
impl BaseClient for FakeServer {
	fn new_request(&self, method: Method, path: &str, body: &RequestBody) -> Result<Request> {
		let url = endpoint_url(FAKE_HOST, path)?;
		Ok(build_request(&self.http, method, url, body)?
			.basic_auth(FAKE_USERNAME, Some(FAKE_PASSWORD))
			.build()?)
	}

	async fn execute(&self, request: Request) -> Result<RawResponse> {
		let (recorded, latency) = self.record(&request);
		match latency {
			Some(latency) => tokio::time::sleep(latency).await,
			None => tokio::task::yield_now().await,
		}
		self.next_reply(&recorded.method, &recorded.path).into_response()
	}
}

#[async_trait]
impl PublicApi for FakeServer {
	async fn applications(&self) -> Result<Vec<Application>> {
		let state = self.state.lock();
		match &state.applications_failure {
			Some(message) => Err(Error::transport(message.clone())),
			None => Ok(state.applications.clone()),
		}
	}

	async fn application_by_public_id(&self, public_id: &str) -> Result<Application> {
		self.state
			.lock()
			.applications
			.iter()
			.find(|app| app.public_id == public_id)
			.cloned()
			.ok_or_else(|| Error::NotFound(format!("application '{}'", public_id)))
	}

	async fn report_infos(&self, application_id: &str) -> Result<Vec<ReportInfo>> {
		let state = self.state.lock();
		let Some(app) = state.applications.iter().find(|app| app.id == application_id) else {
			return Err(Error::NotFound(format!("application id '{}'", application_id)));
		};
		let mut infos: Vec<ReportInfo> = state
			.reports
			.keys()
			.filter(|(public_id, _)| *public_id == app.public_id)
			.map(|(public_id, stage)| {
				let report_id = format!("{}-{}", public_id, stage);
				ReportInfo {
					stage: *stage,
					application_id: app.id.clone(),
					evaluation_date: None,
					report_html_url: format!("ui/links/application/{}/report/{}", public_id, report_id),
					report_pdf_url: None,
					report_data_url: format!("api/v2/applications/{}/reports/{}/raw", public_id, report_id),
				}
			})
			.collect();
		infos.sort_by_key(|info| info.stage);
		Ok(infos)
	}

	async fn raw_report(&self, public_id: &str, stage: Stage) -> Result<Option<RawReport>> {
		tokio::task::yield_now().await;
		let mut state = self.state.lock();
		state.report_fetches.push((public_id.to_string(), stage));
		match state.reports.get(&(public_id.to_string(), stage)) {
			Some(FakeReport::Present(report)) => Ok(Some(report.clone())),
			Some(FakeReport::Fail(message)) => Err(Error::transport(message.clone())),
			None => Ok(None),
		}
	}

	async fn organization_by_name(&self, name: &str) -> Result<Organization> {
		self.state
			.lock()
			.organizations
			.iter()
			.find(|org| org.name == name)
			.cloned()
			.ok_or_else(|| Error::NotFound(format!("organization '{}'", name)))
	}

	async fn create_organization(&self, name: &str) -> Result<String> {
		let id = self.next_id("org");
		self.add_organization(&id, name);
		Ok(id)
	}

	async fn create_application(&self, name: &str, organization_id: &str) -> Result<String> {
		let id = self.next_id("app");
		self.state.lock().applications.push(Application {
			id: id.clone(),
			public_id: name.to_string(),
			name: name.to_string(),
			organization_id: organization_id.to_string(),
			contact_user_name: None,
		});
		Ok(id)
	}

	async fn delete_application(&self, application_id: &str) -> Result<()> {
		let mut state = self.state.lock();
		let before = state.applications.len();
		state.applications.retain(|app| app.id != application_id);
		if state.applications.len() == before {
			return Err(Error::NotFound(format!("application id '{}'", application_id)));
		}
		state.deleted_applications.push(application_id.to_string());
		Ok(())
	}

	async fn evaluate_components(&self, components: &[Component], application_id: &str) -> Result<Evaluation> {
		let state = self.state.lock();
		if !state.applications.iter().any(|app| app.id == application_id) {
			return Err(Error::NotFound(format!("application id '{}'", application_id)));
		}
		Ok(state.evaluation.clone().unwrap_or_else(|| Evaluation {
			submitted_date: None,
			evaluation_date: None,
			application_id: Some(application_id.to_string()),
			results: components
				.iter()
				.map(|c| serde_json::json!({ "component": { "hash": c.hash }, "matchState": "exact" }))
				.collect(),
			is_error: false,
			error_message: None,
		}))
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[tokio::test]
	async fn unrouted_paths_answer_404_and_are_recorded() {
		let fake = FakeServer::new();
		let response = fake.get("rest/unknown?x=1").await.unwrap();
		assert_eq!(response.status, StatusCode::NOT_FOUND);
		assert_eq!(fake.requests_to("rest/unknown?x=1"), 1);
	}

	#[tokio::test]
	async fn sequences_repeat_their_last_reply() {
		let fake = FakeServer::new();
		fake.route_sequence(
			Method::GET,
			"rest/x",
			vec![FakeReply::status(StatusCode::ACCEPTED), FakeReply::status(StatusCode::OK)],
		);
		let mut statuses = Vec::new();
		for _ in 0..3 {
			statuses.push(fake.get("rest/x").await.unwrap().status);
		}
		assert_eq!(statuses, vec![StatusCode::ACCEPTED, StatusCode::OK, StatusCode::OK]);
	}

	#[tokio::test]
	async fn session_cookies_are_served() {
		let fake = FakeServer::new();
		fake.set_session_cookies(&[("JSESSIONID", "a"), ("CLM-CSRF-TOKEN", "b")]);
		let response = fake.get(SESSION_PATH).await.unwrap();
		assert_eq!(response.cookie("CLM-CSRF-TOKEN").map(|c| c.value.as_str()), Some("b"));
		assert_eq!(response.cookies.len(), 2);
	}

	#[tokio::test]
	async fn raw_report_distinguishes_missing_from_failed() {
		let fake = FakeServer::new();
		fake.add_application("app-A");
		fake.add_report("app-A", Stage::Build, &["h1", "h2"]);
		fake.fail_report("app-A", Stage::Release, "timeout");

		let report = fake.raw_report("app-A", Stage::Build).await.unwrap().unwrap();
		assert_eq!(report.component_hashes().collect::<Vec<_>>(), vec!["h1", "h2"]);
		assert!(fake.raw_report("app-A", Stage::Operate).await.unwrap().is_none());
		assert!(fake.raw_report("app-A", Stage::Release).await.unwrap_err().is_transport());
		assert_eq!(fake.report_fetches(), 3);

		let infos = fake.report_infos("app-A-id").await.unwrap();
		assert_eq!(infos.len(), 2);
		assert_eq!(infos[0].report_id(), "app-A-build");
	}
}
