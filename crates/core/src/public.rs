//! Documented `api/v2` surface consumed by the private endpoints.
//!
//! Only the calls the private layer needs are covered: application and
//! organization lookup/creation, report discovery and component evaluation.

use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use iq_protocol::{
	Application, ApplicationList, Component, CreateApplicationRequest, CreateOrganizationRequest, Evaluation, EvaluationRequest,
	EvaluationSubmission, Organization, OrganizationList, RawReport, ReportInfo, Stage,
};
use reqwest::{Method, StatusCode};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::config::ServerConfig;
use crate::error::{Error, Result};
use crate::server::{BaseClient, RequestBody};

const APPLICATIONS_PATH: &str = "api/v2/applications";
const ORGANIZATIONS_PATH: &str = "api/v2/organizations";
const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(1);
const DEFAULT_EVALUATION_TIMEOUT: Duration = Duration::from_secs(60);

/// Public API operations the private layer depends on.
#[async_trait]
pub trait PublicApi: Send + Sync {
	async fn applications(&self) -> Result<Vec<Application>>;

	/// # Errors
	///
	/// [`Error::NotFound`] when no application has `public_id`.
	async fn application_by_public_id(&self, public_id: &str) -> Result<Application>;

	/// Latest report per stage for the application with internal id `application_id`.
	async fn report_infos(&self, application_id: &str) -> Result<Vec<ReportInfo>>;

	/// Raw report of `public_id` at `stage`; `None` when that stage has no report.
	async fn raw_report(&self, public_id: &str, stage: Stage) -> Result<Option<RawReport>>;

	async fn organization_by_name(&self, name: &str) -> Result<Organization>;

	/// Returns the new organization's id.
	async fn create_organization(&self, name: &str) -> Result<String>;

	/// Creates an application whose public id is `name`; returns its internal id.
	async fn create_application(&self, name: &str, organization_id: &str) -> Result<String>;

	async fn delete_application(&self, application_id: &str) -> Result<()>;

	/// Evaluates `components` against the policies of `application_id` and
	/// waits for the result.
	async fn evaluate_components(&self, components: &[Component], application_id: &str) -> Result<Evaluation>;
}

#[derive(Deserialize)]
struct CreatedId {
	id: String,
}

/// [`PublicApi`] over any [`BaseClient`].
pub struct PublicClient {
	base: Arc<dyn BaseClient>,
	poll_interval: Duration,
	evaluation_timeout: Duration,
}

impl PublicClient {
	pub fn new(base: Arc<dyn BaseClient>) -> Self {
		Self {
			base,
			poll_interval: DEFAULT_POLL_INTERVAL,
			evaluation_timeout: DEFAULT_EVALUATION_TIMEOUT,
		}
	}

	/// Client whose evaluation polling gives up after `config.timeout()`.
	pub fn from_config(base: Arc<dyn BaseClient>, config: &ServerConfig) -> Self {
		Self::new(base).with_polling(DEFAULT_POLL_INTERVAL, config.timeout())
	}

	pub fn with_polling(mut self, interval: Duration, timeout: Duration) -> Self {
		self.poll_interval = interval;
		self.evaluation_timeout = timeout;
		self
	}

	async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
		self.base.get(path).await?.error_for_status(path)?.json(path)
	}

	async fn send_json<T: DeserializeOwned>(&self, method: Method, path: &str, body: RequestBody) -> Result<T> {
		let request = self.base.new_request(method, path, &body)?;
		self.base.execute(request).await?.error_for_status(path)?.json(path)
	}
}

#[async_trait]
impl PublicApi for PublicClient {
	async fn applications(&self) -> Result<Vec<Application>> {
		let list: ApplicationList = self.get_json(APPLICATIONS_PATH).await?;
		debug!(target: "iq.public", count = list.applications.len(), "listed applications");
		Ok(list.applications)
	}

	async fn application_by_public_id(&self, public_id: &str) -> Result<Application> {
		let path = format!("{}?publicId={}", APPLICATIONS_PATH, encode(public_id));
		let list: ApplicationList = self.get_json(&path).await?;
		list.applications
			.into_iter()
			.find(|app| app.public_id == public_id)
			.ok_or_else(|| Error::NotFound(format!("application '{}'", public_id)))
	}

	async fn report_infos(&self, application_id: &str) -> Result<Vec<ReportInfo>> {
		self.get_json(&format!("api/v2/reports/applications/{}", application_id)).await
	}

	async fn raw_report(&self, public_id: &str, stage: Stage) -> Result<Option<RawReport>> {
		let app = self.application_by_public_id(public_id).await?;
		let infos = self.report_infos(&app.id).await?;
		let Some(info) = infos.into_iter().find(|info| info.stage == stage) else {
			debug!(target: "iq.public", application = public_id, %stage, "no report for stage");
			return Ok(None);
		};
		self.get_json(&info.report_data_url).await.map(Some)
	}

	async fn organization_by_name(&self, name: &str) -> Result<Organization> {
		let path = format!("{}?organizationName={}", ORGANIZATIONS_PATH, encode(name));
		let list: OrganizationList = self.get_json(&path).await?;
		list.organizations
			.into_iter()
			.find(|org| org.name == name)
			.ok_or_else(|| Error::NotFound(format!("organization '{}'", name)))
	}

	async fn create_organization(&self, name: &str) -> Result<String> {
		let body = RequestBody::json(&CreateOrganizationRequest { name: name.to_string() })?;
		let created: CreatedId = self.send_json(Method::POST, ORGANIZATIONS_PATH, body).await?;
		Ok(created.id)
	}

	async fn create_application(&self, name: &str, organization_id: &str) -> Result<String> {
		let body = RequestBody::json(&CreateApplicationRequest {
			public_id: name.to_string(),
			name: name.to_string(),
			organization_id: organization_id.to_string(),
		})?;
		let created: CreatedId = self.send_json(Method::POST, APPLICATIONS_PATH, body).await?;
		Ok(created.id)
	}

	async fn delete_application(&self, application_id: &str) -> Result<()> {
		let path = format!("{}/{}", APPLICATIONS_PATH, application_id);
		let request = self.base.new_request(Method::DELETE, &path, &RequestBody::Empty)?;
		self.base.execute(request).await?.error_for_status(&path)?;
		Ok(())
	}

	async fn evaluate_components(&self, components: &[Component], application_id: &str) -> Result<Evaluation> {
		let path = format!("api/v2/evaluation/applications/{}", application_id);
		let body = RequestBody::json(&EvaluationRequest {
			components: components.to_vec(),
		})?;
		let submission: EvaluationSubmission = self.send_json(Method::POST, &path, body).await?;
		debug!(target: "iq.public", result_id = %submission.result_id, "evaluation submitted");

		let deadline = Instant::now() + self.evaluation_timeout;
		loop {
			let response = self.base.get(&submission.results_url).await?;
			if response.status != StatusCode::NOT_FOUND {
				return response.error_for_status(&submission.results_url)?.json(&submission.results_url);
			}
			if Instant::now() >= deadline {
				return Err(Error::Timeout(format!(
					"evaluation {} did not complete within {}s",
					submission.result_id,
					self.evaluation_timeout.as_secs()
				)));
			}
			tokio::time::sleep(self.poll_interval).await;
		}
	}
}

fn encode(value: &str) -> String {
	url::form_urlencoded::byte_serialize(value.as_bytes()).collect()
}
