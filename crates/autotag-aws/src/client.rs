// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Signed HTTP access to the AWS service endpoints.
//!
//! One [`AwsClient`] holds the shared `reqwest::Client`, credentials and region; the
//! per-service modules describe their calls as [`ServiceRequest`]s and hand them to
//! [`AwsClient::send`], which resolves the endpoint, signs the request and maps error
//! responses to [`TagError::Provider`].

use autotag_core::config::Config;
use autotag_core::{ConfigError, TagError};
use chrono::Utc;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::{Client, Method, Url};
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

use crate::credentials::{Credentials, CredentialsError};
use crate::sigv4::{self, CanonicalRequest, SigningParams};

const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded; charset=utf-8";
const AMZ_JSON_CONTENT_TYPE: &str = "application/x-amz-json-1.1";
const JSON_CONTENT_TYPE: &str = "application/json";
const ERROR_TYPE_HEADER: &str = "x-amzn-errortype";

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Credentials(#[from] CredentialsError),

    #[error("Failed to create HTTP client: {0}")]
    Http(#[from] reqwest::Error),
}

/// Service an operation belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Service {
    /// Name used in the credential scope.
    pub signing_name: &'static str,
    /// Leading label(s) of the regional endpoint host.
    pub endpoint_prefix: &'static str,
}

impl Service {
    /// S3 paths are signed as sent; every other service double-encodes them.
    fn double_encodes_path(&self) -> bool {
        self.signing_name != "s3"
    }
}

/// One service call, before endpoint resolution and signing.
#[derive(Debug, Clone)]
pub struct ServiceRequest {
    pub service: Service,
    pub operation: &'static str,
    pub method: Method,
    /// Raw (unencoded) path segments.
    pub path: Vec<String>,
    pub query: Vec<(String, String)>,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
    /// Bucket addressed by an S3 call, put in the host name unless an endpoint override
    /// forces path-style addressing.
    pub bucket: Option<String>,
}

impl ServiceRequest {
    fn new(service: Service, operation: &'static str, method: Method) -> Self {
        ServiceRequest {
            service,
            operation,
            method,
            path: Vec::new(),
            query: Vec::new(),
            headers: Vec::new(),
            body: Vec::new(),
            bucket: None,
        }
    }

    /// AWS query protocol: form-encoded parameters in a POST body.
    pub fn query_protocol(
        service: Service,
        operation: &'static str,
        version: &'static str,
        params: Vec<(String, String)>,
    ) -> Self {
        let mut all_params = vec![
            ("Action".to_string(), operation.to_string()),
            ("Version".to_string(), version.to_string()),
        ];
        all_params.extend(params);

        let mut request = ServiceRequest::new(service, operation, Method::POST);
        request.headers = vec![("content-type".to_string(), FORM_CONTENT_TYPE.to_string())];
        request.body = sigv4::canonical_query(&all_params).into_bytes();
        request
    }

    /// AWS JSON 1.1 protocol: operation named by `X-Amz-Target`, JSON body.
    pub fn json_protocol(
        service: Service,
        operation: &'static str,
        target: &'static str,
        body: &Value,
    ) -> Self {
        let mut request = ServiceRequest::new(service, operation, Method::POST);
        request.headers = vec![
            ("content-type".to_string(), AMZ_JSON_CONTENT_TYPE.to_string()),
            ("x-amz-target".to_string(), target.to_string()),
        ];
        request.body = body.to_string().into_bytes();
        request
    }

    /// REST-JSON protocol: operation named by method and path, JSON body.
    pub fn rest_json(
        service: Service,
        operation: &'static str,
        method: Method,
        path: Vec<String>,
        body: &Value,
    ) -> Self {
        let mut request = ServiceRequest::new(service, operation, method);
        request.path = path;
        request.headers = vec![("content-type".to_string(), JSON_CONTENT_TYPE.to_string())];
        request.body = body.to_string().into_bytes();
        request
    }

    /// REST-XML protocol against one S3 bucket.
    pub fn s3_bucket(
        service: Service,
        operation: &'static str,
        method: Method,
        bucket: &str,
        query: Vec<(String, String)>,
        headers: Vec<(String, String)>,
        body: Vec<u8>,
    ) -> Self {
        let mut request = ServiceRequest::new(service, operation, method);
        request.bucket = Some(bucket.to_string());
        request.query = query;
        request.headers = headers;
        request.body = body;
        request
    }

    fn build_error(&self, reason: impl ToString) -> TagError {
        TagError::Request {
            service: self.service.signing_name,
            operation: self.operation,
            reason: reason.to_string(),
        }
    }
}

/// Shared, read-only handle to the AWS APIs. Cheap to clone.
#[derive(Debug, Clone)]
pub struct AwsClient {
    http: Client,
    credentials: Credentials,
    region: String,
    endpoint_url: Option<String>,
}

impl AwsClient {
    pub fn new(config: &Config, credentials: Credentials) -> Result<Self, ClientError> {
        let region = config.require_region()?.to_string();
        let http = build_client(config.https_proxy.as_deref(), config.http_timeout)?;
        Ok(AwsClient {
            http,
            credentials,
            region,
            endpoint_url: config.endpoint_url.clone(),
        })
    }

    /// Reads credentials from the environment.
    pub fn from_config(config: &Config) -> Result<Self, ClientError> {
        AwsClient::new(config, Credentials::from_env()?)
    }

    pub fn region(&self) -> &str {
        &self.region
    }

    /// Signs and sends `request`. Any non-2xx answer is a provider error.
    pub async fn send(&self, request: ServiceRequest) -> Result<(), TagError> {
        let url = self.resolve_url(&request)?;
        let host = match (url.host_str(), url.port()) {
            (Some(host), Some(port)) => format!("{host}:{port}"),
            (Some(host), None) => host.to_string(),
            (None, _) => return Err(request.build_error(format!("no host in {url}"))),
        };

        let now = Utc::now();
        let payload_hash = sigv4::sha256_hex(&request.body);
        let mut headers = request.headers.clone();
        headers.push(("host".to_string(), host));
        headers.push(("x-amz-date".to_string(), sigv4::amz_date(now)));
        headers.push(("x-amz-content-sha256".to_string(), payload_hash.clone()));
        if let Some(token) = self.credentials.session_token() {
            headers.push(("x-amz-security-token".to_string(), token.to_string()));
        }

        let canonical = CanonicalRequest {
            method: request.method.as_str(),
            uri: sigv4::canonical_uri(url.path(), request.service.double_encodes_path()),
            query: url.query().unwrap_or_default().to_string(),
            headers: &headers,
            payload_hash: &payload_hash,
        };
        let params = SigningParams {
            access_key_id: self.credentials.access_key_id(),
            secret_access_key: self.credentials.secret_access_key(),
            region: &self.region,
            service: request.service.signing_name,
            time: now,
        };
        let authorization =
            sigv4::authorization(&params, &canonical).map_err(|e| request.build_error(e))?;

        let mut header_map = HeaderMap::new();
        for (name, value) in headers.iter().filter(|(name, _)| name != "host") {
            let name = HeaderName::from_bytes(name.as_bytes()).map_err(|e| request.build_error(e))?;
            let value = HeaderValue::from_str(value).map_err(|e| request.build_error(e))?;
            header_map.insert(name, value);
        }
        let authorization =
            HeaderValue::from_str(&authorization).map_err(|e| request.build_error(e))?;
        header_map.insert(reqwest::header::AUTHORIZATION, authorization);

        debug!(
            "Sending {} {} to {url}",
            request.service.signing_name, request.operation
        );
        let response = self
            .http
            .request(request.method.clone(), url)
            .headers(header_map)
            .body(request.body)
            .send()
            .await
            .map_err(|e| TagError::Transport {
                service: request.service.signing_name,
                operation: request.operation,
                source: Box::new(e),
            })?;

        let status = response.status();
        if status.is_success() {
            debug!(
                "{} {} succeeded with status {status}",
                request.service.signing_name, request.operation
            );
            return Ok(());
        }

        let error_type = response
            .headers()
            .get(ERROR_TYPE_HEADER)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string);
        let body = response.text().await.unwrap_or_default();
        let (code, message) = parse_error_body(&body, error_type.as_deref());
        Err(TagError::Provider {
            service: request.service.signing_name,
            operation: request.operation,
            status: status.as_u16(),
            code,
            message: if message.is_empty() {
                status.canonical_reason().unwrap_or_default().to_string()
            } else {
                message
            },
        })
    }

    fn resolve_url(&self, request: &ServiceRequest) -> Result<Url, TagError> {
        let mut segments: Vec<&str> = Vec::new();
        let base = match (&self.endpoint_url, &request.bucket) {
            (Some(endpoint), Some(bucket)) => {
                segments.push(bucket);
                endpoint.clone()
            }
            (Some(endpoint), None) => endpoint.clone(),
            (None, Some(bucket)) if !is_virtual_hostable(bucket) => {
                segments.push(bucket);
                format!(
                    "https://{}.{}.amazonaws.com",
                    request.service.endpoint_prefix, self.region
                )
            }
            (None, Some(bucket)) => format!(
                "https://{bucket}.{}.{}.amazonaws.com",
                request.service.endpoint_prefix, self.region
            ),
            (None, None) => format!(
                "https://{}.{}.amazonaws.com",
                request.service.endpoint_prefix, self.region
            ),
        };
        segments.extend(request.path.iter().map(String::as_str));

        let path: String = segments
            .iter()
            .map(|segment| format!("/{}", sigv4::uri_encode(segment, true)))
            .collect();
        let path = if path.is_empty() { "/".to_string() } else { path };

        let mut raw = format!("{}{path}", base.trim_end_matches('/'));
        if !request.query.is_empty() {
            raw.push('?');
            raw.push_str(&sigv4::canonical_query(&request.query));
        }
        Url::parse(&raw).map_err(|e| request.build_error(e))
    }
}

/// Whether `bucket` can be addressed as `<bucket>.s3.<region>.amazonaws.com` over TLS.
///
/// The S3 wildcard certificate covers a single label, so names with dots (and names that are
/// not valid DNS labels) go path-style.
fn is_virtual_hostable(bucket: &str) -> bool {
    let bytes = bucket.as_bytes();
    (3..=63).contains(&bytes.len())
        && bytes
            .iter()
            .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || *b == b'-')
        && bytes.first().is_some_and(u8::is_ascii_alphanumeric)
        && bytes.last().is_some_and(u8::is_ascii_alphanumeric)
}

/// Builds a reqwest client with optional proxy configuration and timeout, using rustls.
pub fn build_client(proxy_url: Option<&str>, timeout: Duration) -> Result<Client, reqwest::Error> {
    let mut builder = Client::builder().use_rustls_tls().timeout(timeout);
    if let Some(proxy) = proxy_url {
        builder = builder.proxy(reqwest::Proxy::https(proxy)?);
    }
    builder.build()
}

/// Error code and message of an AWS error response.
///
/// JSON protocols put them in `__type`/`message` (or the `x-amzn-ErrorType` header); query
/// and REST-XML protocols in `<Code>`/`<Message>` elements.
pub fn parse_error_body(body: &str, error_type_header: Option<&str>) -> (String, String) {
    if let Ok(Value::Object(fields)) = serde_json::from_str::<Value>(body) {
        let field = |names: &[&str]| {
            names
                .iter()
                .find_map(|name| fields.get(*name).and_then(Value::as_str))
                .map(str::to_string)
        };
        let code = field(&["__type", "code", "Code"])
            .or_else(|| error_type_header.map(str::to_string))
            .map(|code| short_error_code(&code))
            .unwrap_or_else(|| "Unknown".to_string());
        let message = field(&["message", "Message", "errorMessage"]).unwrap_or_default();
        return (code, message);
    }

    // EC2 nests it as Response/Errors/Error, RDS as ErrorResponse/Error, S3 uses a bare Error.
    if let Some(error) = xml_element_text(body, "Error") {
        if let Some(code) = xml_element_text(&error, "Code") {
            let message = xml_element_text(&error, "Message").unwrap_or_default();
            return (xml_unescape(&code), xml_unescape(&message));
        }
    }

    let code = error_type_header
        .map(short_error_code)
        .unwrap_or_else(|| "Unknown".to_string());
    (code, body.trim().to_string())
}

/// `com.amazon.coral.service#AccessDeniedException` and
/// `AccessDeniedException:http://internal.amazon.com/...` both become
/// `AccessDeniedException`.
fn short_error_code(code: &str) -> String {
    let code = code.rsplit('#').next().unwrap_or(code);
    code.split(':').next().unwrap_or(code).to_string()
}

fn xml_element_text(body: &str, element: &str) -> Option<String> {
    let open = format!("<{element}>");
    let close = format!("</{element}>");
    let start = body.find(&open)? + open.len();
    let end = start + body[start..].find(&close)?;
    Some(body[start..end].trim().to_string())
}

fn xml_unescape(text: &str) -> String {
    text.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&apos;", "'")
        .replace("&amp;", "&")
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    const EC2: Service = Service {
        signing_name: "ec2",
        endpoint_prefix: "ec2",
    };
    const S3: Service = Service {
        signing_name: "s3",
        endpoint_prefix: "s3",
    };

    fn client(endpoint_url: Option<&str>) -> AwsClient {
        let config = Config {
            region: Some("us-west-2".to_string()),
            endpoint_url: endpoint_url.map(str::to_string),
            ..Config::default()
        };
        AwsClient::new(&config, Credentials::new("AKID", "secret", None)).unwrap()
    }

    #[test]
    fn test_new_requires_region() {
        let err = AwsClient::new(&Config::default(), Credentials::new("AKID", "secret", None))
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Missing required environment variable AWS_REGION"
        );
    }

    #[test]
    fn test_regional_endpoint() {
        let request = ServiceRequest::query_protocol(EC2, "CreateTags", "2016-11-15", vec![]);
        let url = client(None).resolve_url(&request).unwrap();
        assert_eq!(url.as_str(), "https://ec2.us-west-2.amazonaws.com/");
    }

    #[test]
    fn test_s3_virtual_hosted_endpoint() {
        let request = ServiceRequest::s3_bucket(
            S3,
            "PutBucketTagging",
            Method::PUT,
            "my-bucket",
            vec![("tagging".to_string(), String::new())],
            vec![],
            vec![],
        );
        let url = client(None).resolve_url(&request).unwrap();
        assert_eq!(
            url.as_str(),
            "https://my-bucket.s3.us-west-2.amazonaws.com/?tagging="
        );
    }

    #[test]
    fn test_s3_dotted_bucket_uses_path_style() {
        let request = ServiceRequest::s3_bucket(
            S3,
            "PutBucketTagging",
            Method::PUT,
            "logs.example.com",
            vec![("tagging".to_string(), String::new())],
            vec![],
            vec![],
        );
        let url = client(None).resolve_url(&request).unwrap();
        assert_eq!(
            url.as_str(),
            "https://s3.us-west-2.amazonaws.com/logs.example.com?tagging="
        );
    }

    #[test]
    fn test_virtual_hostable_bucket_names() {
        assert!(is_virtual_hostable("my-bucket"));
        assert!(is_virtual_hostable("abc"));
        assert!(is_virtual_hostable("2024-archive"));
        assert!(!is_virtual_hostable("logs.example.com"));
        assert!(!is_virtual_hostable("My_Bucket"));
        assert!(!is_virtual_hostable("ab"));
        assert!(!is_virtual_hostable("-leading-hyphen"));
        assert!(!is_virtual_hostable("trailing-hyphen-"));
        assert!(!is_virtual_hostable(&"a".repeat(64)));
    }

    #[test]
    fn test_endpoint_override_uses_path_style() {
        let request = ServiceRequest::s3_bucket(
            S3,
            "PutBucketTagging",
            Method::PUT,
            "my-bucket",
            vec![("tagging".to_string(), String::new())],
            vec![],
            vec![],
        );
        let url = client(Some("http://127.0.0.1:4566"))
            .resolve_url(&request)
            .unwrap();
        assert_eq!(url.as_str(), "http://127.0.0.1:4566/my-bucket?tagging=");
    }

    #[test]
    fn test_path_segments_are_encoded() {
        let request = ServiceRequest::rest_json(
            Service {
                signing_name: "lambda",
                endpoint_prefix: "lambda",
            },
            "TagResource",
            Method::POST,
            vec![
                "2017-03-31".to_string(),
                "tags".to_string(),
                "arn:aws:lambda:us-west-2:111:function:fn".to_string(),
            ],
            &serde_json::json!({}),
        );
        let url = client(None).resolve_url(&request).unwrap();
        assert_eq!(
            url.path(),
            "/2017-03-31/tags/arn%3Aaws%3Alambda%3Aus-west-2%3A111%3Afunction%3Afn"
        );
    }

    #[test]
    fn test_parse_json_error() {
        let (code, message) = parse_error_body(
            r#"{"__type":"com.amazonaws.ecr#RepositoryNotFoundException","message":"The repository does not exist"}"#,
            None,
        );
        assert_eq!(code, "RepositoryNotFoundException");
        assert_eq!(message, "The repository does not exist");
    }

    #[test]
    fn test_parse_json_error_code_from_header() {
        let (code, message) = parse_error_body(
            r#"{"Message":"User is not authorized"}"#,
            Some("AccessDeniedException:http://internal.amazon.com/coral/com.amazon.coral.service/"),
        );
        assert_eq!(code, "AccessDeniedException");
        assert_eq!(message, "User is not authorized");
    }

    #[test]
    fn test_parse_xml_error() {
        let body = "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<Response><Errors><Error><Code>InvalidInstanceID.NotFound</Code><Message>The instance ID 'i-1' does not exist</Message></Error></Errors><RequestID>abc</RequestID></Response>";
        let (code, message) = parse_error_body(body, None);
        assert_eq!(code, "InvalidInstanceID.NotFound");
        assert_eq!(message, "The instance ID 'i-1' does not exist");
    }

    #[test]
    fn test_parse_xml_error_reads_error_element_only() {
        let body = "<Response><Detail><Code>NotTheErrorCode</Code></Detail><Errors><Error><Code>UnauthorizedOperation</Code><Message>You are not authorized to &lt;Code&gt; &amp; more</Message></Error></Errors></Response>";
        let (code, message) = parse_error_body(body, None);
        assert_eq!(code, "UnauthorizedOperation");
        assert_eq!(message, "You are not authorized to <Code> & more");
    }

    #[test]
    fn test_parse_s3_error() {
        let body = "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<Error><Code>NoSuchBucket</Code><Message>The specified bucket does not exist</Message><BucketName>photos</BucketName></Error>";
        let (code, message) = parse_error_body(body, None);
        assert_eq!(code, "NoSuchBucket");
        assert_eq!(message, "The specified bucket does not exist");
    }

    #[test]
    fn test_parse_xml_without_error_element() {
        let (code, _) = parse_error_body("<Status><Code>Busy</Code></Status>", None);
        assert_eq!(code, "Unknown");
    }

    #[test]
    fn test_parse_unrecognized_error() {
        let (code, message) = parse_error_body("  Service Unavailable ", None);
        assert_eq!(code, "Unknown");
        assert_eq!(message, "Service Unavailable");

        let (code, message) = parse_error_body("", Some("ThrottlingException"));
        assert_eq!(code, "ThrottlingException");
        assert_eq!(message, "");
    }
}
