// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Client for the Lambda Runtime API (`2018-06-01`).
//!
//! The runtime long-polls `invocation/next`, then answers each invocation exactly once on
//! either its `response` or `error` endpoint. Startup failures go to `init/error`.

use reqwest::header::HeaderMap;
use reqwest::{Client, Response};
use serde::{Deserialize, Serialize};
use tracing::debug;

const API_VERSION: &str = "2018-06-01";
const REQUEST_ID_HEADER: &str = "lambda-runtime-aws-request-id";
const DEADLINE_HEADER: &str = "lambda-runtime-deadline-ms";
const FUNCTION_ARN_HEADER: &str = "lambda-runtime-invoked-function-arn";
const TRACE_ID_HEADER: &str = "lambda-runtime-trace-id";
const ERROR_TYPE_HEADER: &str = "Lambda-Runtime-Function-Error-Type";

#[derive(Debug, thiserror::Error)]
pub enum RuntimeError {
    #[error("Runtime API request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Runtime API {path} returned status {status}: {body}")]
    Status {
        path: String,
        status: u16,
        body: String,
    },

    #[error("Runtime API response is missing header {0}")]
    MissingHeader(&'static str),

    #[error("Invalid value for header {name}: {value}")]
    InvalidHeader { name: &'static str, value: String },

    #[error("Failed to encode response: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Metadata the platform attaches to an invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvocationContext {
    pub request_id: String,
    /// Wall-clock deadline in milliseconds since the epoch.
    pub deadline_ms: u64,
    pub invoked_function_arn: Option<String>,
    pub trace_id: Option<String>,
}

#[derive(Debug, Clone)]
pub struct Invocation {
    pub context: InvocationContext,
    /// Raw event payload.
    pub body: Vec<u8>,
}

/// Body of the `error` and `init/error` endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorResponse {
    pub error_message: String,
    pub error_type: String,
}

impl ErrorResponse {
    pub fn new(error_type: impl Into<String>, error_message: impl ToString) -> Self {
        ErrorResponse {
            error_message: error_message.to_string(),
            error_type: error_type.into(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct RuntimeClient {
    http: Client,
    base_url: String,
}

impl RuntimeClient {
    /// `api` is the `host:port` found in `AWS_LAMBDA_RUNTIME_API`.
    pub fn new(api: &str) -> Result<Self, RuntimeError> {
        // No timeout: `invocation/next` blocks until the next event arrives.
        let http = Client::builder().build()?;
        Ok(RuntimeClient {
            http,
            base_url: format!("http://{api}/{API_VERSION}/runtime"),
        })
    }

    /// Blocks until the platform hands over the next invocation.
    pub async fn next_invocation(&self) -> Result<Invocation, RuntimeError> {
        let path = "invocation/next";
        let response = self.http.get(self.url(path)).send().await?;
        let response = check_status(path, response).await?;
        let context = context_from_headers(response.headers())?;
        let body = response.bytes().await?.to_vec();
        debug!("Received invocation {}", context.request_id);
        Ok(Invocation { context, body })
    }

    pub async fn send_response<T: Serialize>(
        &self,
        request_id: &str,
        result: &T,
    ) -> Result<(), RuntimeError> {
        let path = format!("invocation/{request_id}/response");
        let body = serde_json::to_vec(result)?;
        let response = self.http.post(self.url(&path)).body(body).send().await?;
        check_status(&path, response).await.map(|_| ())
    }

    pub async fn send_error(
        &self,
        request_id: &str,
        error: &ErrorResponse,
    ) -> Result<(), RuntimeError> {
        self.post_error(&format!("invocation/{request_id}/error"), error)
            .await
    }

    /// Reports a failure that happened before the first invocation.
    pub async fn send_init_error(&self, error: &ErrorResponse) -> Result<(), RuntimeError> {
        self.post_error("init/error", error).await
    }

    async fn post_error(&self, path: &str, error: &ErrorResponse) -> Result<(), RuntimeError> {
        let body = serde_json::to_vec(error)?;
        let response = self
            .http
            .post(self.url(path))
            .header(ERROR_TYPE_HEADER, "Unhandled")
            .body(body)
            .send()
            .await?;
        check_status(path, response).await.map(|_| ())
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{path}", self.base_url)
    }
}

async fn check_status(path: &str, response: Response) -> Result<Response, RuntimeError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(RuntimeError::Status {
        path: path.to_string(),
        status: status.as_u16(),
        body,
    })
}

fn context_from_headers(headers: &HeaderMap) -> Result<InvocationContext, RuntimeError> {
    let header = |name: &'static str| -> Result<Option<String>, RuntimeError> {
        headers
            .get(name)
            .map(|value| {
                value
                    .to_str()
                    .map(str::to_string)
                    .map_err(|_| RuntimeError::InvalidHeader {
                        name,
                        value: String::from_utf8_lossy(value.as_bytes()).into_owned(),
                    })
            })
            .transpose()
    };

    let request_id = header(REQUEST_ID_HEADER)?
        .filter(|id| !id.is_empty())
        .ok_or(RuntimeError::MissingHeader(REQUEST_ID_HEADER))?;
    let deadline_ms = match header(DEADLINE_HEADER)? {
        Some(value) => value
            .parse::<u64>()
            .map_err(|_| RuntimeError::InvalidHeader {
                name: DEADLINE_HEADER,
                value,
            })?,
        None => 0,
    };

    Ok(InvocationContext {
        request_id,
        deadline_ms,
        invoked_function_arn: header(FUNCTION_ARN_HEADER)?,
        trace_id: header(TRACE_ID_HEADER)?,
    })
}
