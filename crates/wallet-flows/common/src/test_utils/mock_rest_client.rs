use std::{
    collections::{HashMap, VecDeque},
    sync::Mutex,
};

use tracing::debug;

use crate::{
    error::ServiceConnectivityError,
    rest::{RestClient, RestResponse},
};

#[derive(Debug)]
pub struct MockResponse {
    pub(crate) status_code: u16,
    pub(crate) text: String,
}

impl MockResponse {
    pub fn new(status_code: u16, text: String) -> Self {
        MockResponse { status_code, text }
    }
}

/// A request captured by [`MockRestClient`]
#[derive(Clone, Debug)]
pub struct RecordedRequest {
    pub url: String,
    pub headers: Option<HashMap<String, String>>,
    pub body: String,
}

/// Replays queued responses in FIFO order and records every request.
#[derive(Default)]
pub struct MockRestClient {
    responses: Mutex<VecDeque<MockResponse>>,
    requests: Mutex<Vec<RecordedRequest>>,
}

impl MockRestClient {
    pub fn new() -> Self {
        MockRestClient::default()
    }

    pub fn add_response(&self, response: MockResponse) -> &Self {
        debug!("Push response: {response:?}");
        let mut responses = self.responses.lock().unwrap();
        responses.push_back(response);
        self
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl RestClient for MockRestClient {
    async fn post_json(
        &self,
        url: String,
        headers: Option<HashMap<String, String>>,
        body: String,
    ) -> Result<RestResponse, ServiceConnectivityError> {
        self.requests
            .lock()
            .unwrap()
            .push(RecordedRequest { url, headers, body });
        let mut responses = self.responses.lock().unwrap();
        let response = responses.pop_front().ok_or_else(|| {
            ServiceConnectivityError::Other(String::from("No response available for POST request"))
        })?;
        debug!("Pop POST response: {response:?}");

        Ok(RestResponse {
            status: response.status_code,
            body: response.text,
        })
    }
}
