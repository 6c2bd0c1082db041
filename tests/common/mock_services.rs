//! Mock services for testing
//!
//! In-memory implementations of the transport and provider-client traits so
//! that the clients and the aggregator can run without a network.

use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

use gitstuff::domain::entities::Repository;
use gitstuff::domain::value_objects::ProviderType;
use gitstuff::infrastructure::http::{HttpError, HttpRequest, HttpResponse, HttpTransport};
use gitstuff::infrastructure::scm::{ScmClient, ScmError};

/// Transport that answers from scripted responses keyed by URL.
///
/// Responses for the same URL are returned in the order they were added.
/// Every request is recorded for later inspection.
#[derive(Default)]
pub struct MockTransport {
    responses: Mutex<HashMap<String, VecDeque<HttpResponse>>>,
    requests: Mutex<Vec<HttpRequest>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a response for `url`
    pub fn respond(&self, url: &str, response: HttpResponse) -> &Self {
        self.responses
            .lock()
            .unwrap()
            .entry(url.to_string())
            .or_default()
            .push_back(response);
        self
    }

    /// Queue a 200 JSON response
    pub fn respond_json(&self, url: &str, body: serde_json::Value) -> &Self {
        self.respond(url, json_response(200, body, &[]))
    }

    /// Queue a 200 JSON response with extra headers
    pub fn respond_json_with_headers(
        &self,
        url: &str,
        body: serde_json::Value,
        headers: &[(&str, &str)],
    ) -> &Self {
        self.respond(url, json_response(200, body, headers))
    }

    /// Queue an empty response with the given status
    pub fn respond_status(&self, url: &str, status: u16) -> &Self {
        self.respond(url, json_response(status, serde_json::json!({}), &[]))
    }

    /// URLs requested so far, in order
    pub fn requested_urls(&self) -> Vec<String> {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .map(|r| r.url.clone())
            .collect()
    }

    /// All recorded requests
    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl HttpTransport for MockTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, HttpError> {
        self.requests.lock().unwrap().push(request.clone());
        self.responses
            .lock()
            .unwrap()
            .get_mut(&request.url)
            .and_then(VecDeque::pop_front)
            .ok_or_else(|| {
                HttpError::Transport(format!("no response registered for GET {}", request.url))
            })
    }
}

pub fn json_response(status: u16, body: serde_json::Value, headers: &[(&str, &str)]) -> HttpResponse {
    HttpResponse {
        status,
        headers: headers
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect(),
        body: serde_json::to_vec(&body).unwrap(),
    }
}

/// Provider client with a fixed repository list, or a fixed failure
pub struct StubScmClient {
    provider: ProviderType,
    repositories: Vec<Repository>,
    failure: Option<String>,
    calls: Mutex<Vec<String>>,
}

impl StubScmClient {
    pub fn with_paths(provider: ProviderType, paths: &[&str]) -> Self {
        Self {
            provider,
            repositories: paths
                .iter()
                .enumerate()
                .map(|(i, p)| Repository::new(provider, (i + 1).to_string(), *p))
                .collect(),
            failure: None,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn with_repositories(provider: ProviderType, repositories: Vec<Repository>) -> Self {
        Self {
            provider,
            repositories,
            failure: None,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(provider: ProviderType, message: &str) -> Self {
        Self {
            provider,
            repositories: Vec::new(),
            failure: Some(message.to_string()),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Method calls received, e.g. `list_repositories_in_group(team-a)`
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: String) -> Result<(), ScmError> {
        self.calls.lock().unwrap().push(call);
        match &self.failure {
            Some(message) => Err(ScmError::invalid_configuration(message.clone())),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl ScmClient for StubScmClient {
    async fn list_all_repositories(&self) -> Result<Vec<Repository>, ScmError> {
        self.record("list_all_repositories".to_string())?;
        Ok(self.repositories.clone())
    }

    async fn list_repositories_in_group(
        &self,
        group_path: &str,
    ) -> Result<Vec<Repository>, ScmError> {
        self.record(format!("list_repositories_in_group({group_path})"))?;
        Ok(self
            .repositories
            .iter()
            .filter(|r| r.is_in_group(group_path))
            .cloned()
            .collect())
    }

    fn provider_type(&self) -> ProviderType {
        self.provider
    }
}
