use std::{
    marker::PhantomData,
    sync::atomic::{AtomicU64, Ordering},
    time::Duration,
};

use futures::{TryFutureExt, future};
pub use reqwest::header;
use reqwest::{
    Client as HttpClient,
    header::{HeaderMap, HeaderValue},
};
use reqwest_middleware::{ClientBuilder as HttpClientBuilder, ClientWithMiddleware};
use reqwest_retry::{RetryTransientMiddleware, policies::ExponentialBackoff};
#[cfg(feature = "tracing")]
use reqwest_tracing::TracingMiddleware;
use serde::{Deserialize, Serialize, de::DeserializeOwned};

use crate::{MiddlewareError, ReqwestError, jsonrpc};

// Retry parameters for rate limited requests.
const EXPONENT_BASE: u32 = 2;
const MIN_RETRY_INTERVAL: Duration = Duration::from_secs(1);
const MAX_RETRY_INTERVAL: Duration = Duration::from_secs(32);
const MAX_RETRIES: u32 = 9;

/// Specialized error types
#[derive(Debug, thiserror::Error)]
pub enum RpcClientError {
    /// The message could not be sent to the remote node
    #[error(transparent)]
    FailedToSend(MiddlewareError),

    /// The remote node failed to reply with the body of the response
    #[error("The response text was corrupted: {0}.")]
    CorruptedResponse(ReqwestError),

    /// The server returned an error code.
    #[error("The Http server returned error status code: {0}")]
    HttpStatus(ReqwestError),

    /// The request cannot be serialized as JSON.
    #[error(transparent)]
    InvalidJsonRequest(serde_json::Error),

    /// The server returned an invalid JSON-RPC response.
    #[error(
        "Response '{response}' failed to parse with expected type '{expected_type}', due to error: '{error}'"
    )]
    InvalidResponse {
        /// The response text
        response: String,
        /// The expected type of the response
        expected_type: &'static str,
        /// The parse error
        error: serde_json::Error,
    },

    /// Invalid URL format
    #[error(transparent)]
    InvalidUrl(#[from] url::ParseError),

    /// The JSON-RPC returned an error.
    #[error("{error}. Request: {request}")]
    JsonRpcError {
        /// The JSON-RPC error
        error: jsonrpc::Error,
        /// The request JSON
        request: String,
    },
}

/// A client for executing JSON-RPC methods on a remote node.
///
/// Transient transport failures and rate limiting are retried with
/// exponential backoff; all other failures are returned to the caller.
#[derive(Debug)]
pub struct RpcClient<MethodT: Serialize> {
    url: url::Url,
    client: ClientWithMiddleware,
    next_id: AtomicU64,
    _phantom: PhantomData<MethodT>,
}

impl<MethodT: Serialize> RpcClient<MethodT> {
    /// Create a new instance, given a remote node URL.
    pub fn new(url: &str, extra_headers: Option<HeaderMap>) -> Result<Self, RpcClientError> {
        let retry_policy = ExponentialBackoff::builder()
            .retry_bounds(MIN_RETRY_INTERVAL, MAX_RETRY_INTERVAL)
            .base(EXPONENT_BASE)
            .build_with_max_retries(MAX_RETRIES);

        let mut headers = extra_headers.unwrap_or_default();
        headers.append(
            header::CONTENT_TYPE,
            HeaderValue::from_static("application/json"),
        );
        headers.append(
            header::USER_AGENT,
            HeaderValue::from_str(&format!("devchain {}", env!("CARGO_PKG_VERSION")))
                .expect("Version string is valid header value"),
        );

        let client = HttpClient::builder()
            .default_headers(headers)
            .build()
            .expect("Default construction nor setting default headers can cause an error");

        #[cfg(feature = "tracing")]
        let client = HttpClientBuilder::new(client)
            .with(TracingMiddleware::default())
            .with(RetryTransientMiddleware::new_with_policy(retry_policy))
            .build();
        #[cfg(not(feature = "tracing"))]
        let client = HttpClientBuilder::new(client)
            .with(RetryTransientMiddleware::new_with_policy(retry_policy))
            .build();

        Ok(RpcClient {
            url: url.parse()?,
            client,
            next_id: AtomicU64::new(0),
            _phantom: PhantomData,
        })
    }

    /// Returns the URL of the remote node.
    pub fn url(&self) -> &url::Url {
        &self.url
    }

    fn parse_response_str<SuccessT: DeserializeOwned>(
        response: String,
    ) -> Result<jsonrpc::Response<SuccessT>, RpcClientError> {
        serde_json::from_str(&response).map_err(|error| RpcClientError::InvalidResponse {
            response,
            expected_type: std::any::type_name::<jsonrpc::Response<SuccessT>>(),
            error,
        })
    }

    async fn retry_on_sporadic_failure<T: DeserializeOwned>(
        &self,
        error: jsonrpc::Error,
        request: SerializedRequest,
    ) -> Result<T, RpcClientError> {
        let is_missing_trie_node_error =
            error.code == -32000 && error.message.to_lowercase().contains("missing trie node");

        let result = if is_missing_trie_node_error {
            log::debug!("Retrying request after sporadic failure: {}", error.message);

            self.send_request_body(&request)
                .await
                .and_then(Self::parse_response_str)?
                .data
                .into_result()
        } else {
            Err(error)
        };

        result.map_err(|error| RpcClientError::JsonRpcError {
            error,
            request: request.to_json_string(),
        })
    }

    async fn send_request_and_extract_result<SuccessT: DeserializeOwned>(
        &self,
        request: SerializedRequest,
    ) -> Result<SuccessT, RpcClientError> {
        future::ready(
            self.send_request_body(&request)
                .await
                .and_then(Self::parse_response_str)?
                .data
                .into_result(),
        )
        // Some providers have sporadic failures that are returned in the JSON-RPC layer
        .or_else(|error| async { self.retry_on_sporadic_failure(error, request).await })
        .await
    }

    #[cfg_attr(feature = "tracing", tracing::instrument(level = "trace", skip_all))]
    async fn send_request_body(
        &self,
        request_body: &SerializedRequest,
    ) -> Result<String, RpcClientError> {
        self.client
            .post(self.url.clone())
            .body(request_body.to_json_string())
            .send()
            .await
            .map_err(|err| RpcClientError::FailedToSend(err.into()))?
            .error_for_status()
            .map_err(|err| RpcClientError::HttpStatus(err.into()))?
            .text()
            .await
            .map_err(|err| RpcClientError::CorruptedResponse(err.into()))
    }

    fn serialize_request(&self, method: &MethodT) -> Result<SerializedRequest, RpcClientError> {
        let id = jsonrpc::Id::Num(self.next_id.fetch_add(1, Ordering::Relaxed));

        let request = serde_json::to_value(jsonrpc::Request {
            version: jsonrpc::Version::V2_0,
            id,
            method,
        })
        .map_err(RpcClientError::InvalidJsonRequest)?;

        Ok(SerializedRequest(request))
    }

    /// Calls the provided JSON-RPC method and returns the result.
    #[cfg_attr(feature = "tracing", tracing::instrument(level = "trace", skip_all))]
    pub async fn call<SuccessT: DeserializeOwned>(
        &self,
        method: MethodT,
    ) -> Result<SuccessT, RpcClientError> {
        let request = self.serialize_request(&method)?;

        self.send_request_and_extract_result(request).await
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[repr(transparent)]
#[serde(transparent)]
struct SerializedRequest(serde_json::Value);

impl SerializedRequest {
    fn to_json_string(&self) -> String {
        self.0.to_string()
    }
}
