use std::{collections::HashMap, sync::Arc};

use graphql_client::{GraphQLQuery, Response};
use tracing::{debug, trace};

use crate::{
    error::{ServiceConnectivityError, ServiceError},
    rest::RestClient,
};

/// GraphQL-over-HTTP client. Operations are [`GraphQLQuery`] types, so the
/// request body and the response envelope come from `graphql_client`.
pub struct GraphQLClient {
    rest_client: Arc<dyn RestClient>,
    url: String,
    auth_token: Option<String>,
}

impl GraphQLClient {
    pub fn new(rest_client: Arc<dyn RestClient>, url: String) -> Self {
        Self {
            rest_client,
            url,
            auth_token: None,
        }
    }

    #[must_use]
    pub fn with_auth_token(mut self, token: Option<String>) -> Self {
        self.auth_token = token;
        self
    }

    /// Posts the operation `Q` and returns its `data` member.
    ///
    /// Any top-level `errors` fail the call, even when `data` is present.
    pub async fn post_query<Q: GraphQLQuery>(
        &self,
        variables: Q::Variables,
    ) -> Result<Q::ResponseData, ServiceError> {
        let body = Q::build_query(variables);
        let operation_name = body.operation_name;
        let body_str = serde_json::to_string(&body)?;

        let headers = self.auth_token.as_ref().map(|token| {
            HashMap::from([("Authorization".to_string(), format!("Bearer {token}"))])
        });

        debug!("Posting GraphQL operation {operation_name}");
        let response = self
            .rest_client
            .post_json(self.url.clone(), headers, body_str)
            .await?;
        trace!("GraphQL response: {:?}", response.body);
        if !response.is_success() {
            return Err(ServiceConnectivityError::Status {
                status: response.status,
                body: response.body,
            }
            .into());
        }

        let json: Response<Q::ResponseData> = serde_json::from_str(&response.body)?;
        if let Some(errors) = json.errors
            && !errors.is_empty()
        {
            return Err(ServiceError::from_graphql_errors(&errors));
        }

        json.data
            .ok_or_else(|| ServiceError::serialization("Missing data in GraphQL response"))
    }
}
