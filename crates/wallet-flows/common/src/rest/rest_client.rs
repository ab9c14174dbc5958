use crate::error::ServiceConnectivityError;
use reqwest::Client;
use std::{collections::HashMap, time::Duration};
use tracing::{debug, trace};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
const JSON_CONTENT_TYPE: &str = "application/json";

#[derive(Clone, Debug)]
pub struct RestResponse {
    pub status: u16,
    pub body: String,
}

impl RestResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Minimal HTTP surface the backend clients are written against, so tests
/// and host applications can substitute their own transport.
#[async_trait::async_trait]
pub trait RestClient: Send + Sync {
    /// Makes a POST request carrying a JSON body and logs on DEBUG.
    /// ### Arguments
    /// - `url`: the URL on which POST will be called
    /// - `headers`: optional extra headers, `Content-Type` is always JSON
    /// - `body`: the serialized JSON body
    async fn post_json(
        &self,
        url: String,
        headers: Option<HashMap<String, String>>,
        body: String,
    ) -> Result<RestResponse, ServiceConnectivityError>;
}

pub struct ReqwestRestClient {
    client: Client,
}

impl ReqwestRestClient {
    pub fn new(user_agent: Option<&str>) -> Result<Self, ServiceConnectivityError> {
        let mut builder = Client::builder().timeout(REQUEST_TIMEOUT);
        if let Some(user_agent) = user_agent {
            builder = builder.user_agent(user_agent.to_string());
        }
        let client = builder.build()?;
        Ok(ReqwestRestClient { client })
    }
}

#[async_trait::async_trait]
impl RestClient for ReqwestRestClient {
    async fn post_json(
        &self,
        url: String,
        headers: Option<HashMap<String, String>>,
        body: String,
    ) -> Result<RestResponse, ServiceConnectivityError> {
        debug!("Making POST request to: {url}");
        let mut req = self
            .client
            .post(url)
            .header(reqwest::header::CONTENT_TYPE, JSON_CONTENT_TYPE)
            .body(body);
        for (key, value) in headers.iter().flatten() {
            req = req.header(key, value);
        }
        let response = req.send().await?;
        let status = response.status().as_u16();
        let body = response.text().await?;
        debug!("Received response, status: {status}");
        trace!("raw response body: {body}");

        Ok(RestResponse { status, body })
    }
}
