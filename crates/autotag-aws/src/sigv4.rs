// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! AWS Signature Version 4 request signing.
//!
//! # Signing steps
//!
//! 1. Build the canonical request: method, canonical URI, canonical query string, canonical
//!    headers, signed header list and the hex SHA-256 of the payload, joined by newlines
//! 2. Build the string to sign from the algorithm, timestamp, credential scope and the hash
//!    of the canonical request
//! 3. Derive the signing key by chaining HMAC-SHA256 over date, region, service and
//!    `aws4_request`
//! 4. Sign the string with the derived key and emit the `Authorization` header
//!
//! # References
//!
//! See [Signature Version 4](https://docs.aws.amazon.com/IAM/latest/UserGuide/reference_aws-signing.html)
//! for the full rules.

use chrono::{DateTime, Utc};
use hmac::digest::InvalidLength;
use hmac::{Hmac, Mac};
use sha2::{Digest, Sha256};

const ALGORITHM: &str = "AWS4-HMAC-SHA256";
const SCOPE_TERMINATOR: &str = "aws4_request";

type HmacSha256 = Hmac<Sha256>;

/// Who signs, where, and when.
#[derive(Debug, Clone, Copy)]
pub struct SigningParams<'a> {
    pub access_key_id: &'a str,
    pub secret_access_key: &'a str,
    pub region: &'a str,
    pub service: &'a str,
    pub time: DateTime<Utc>,
}

impl SigningParams<'_> {
    fn credential_scope(&self) -> String {
        format!(
            "{}/{}/{}/{SCOPE_TERMINATOR}",
            short_date(self.time),
            self.region,
            self.service
        )
    }
}

/// The parts of a request covered by the signature.
#[derive(Debug, Clone)]
pub struct CanonicalRequest<'a> {
    pub method: &'a str,
    /// Already in canonical form, see [`canonical_uri`].
    pub uri: String,
    /// Already in canonical form, see [`canonical_query`].
    pub query: String,
    /// Header names and values as sent. Every header listed here is signed.
    pub headers: &'a [(String, String)],
    pub payload_hash: &'a str,
}

impl CanonicalRequest<'_> {
    fn sorted_headers(&self) -> Vec<(String, String)> {
        let mut headers: Vec<(String, String)> = self
            .headers
            .iter()
            .map(|(name, value)| (name.to_lowercase(), normalize_header_value(value)))
            .collect();
        headers.sort();
        headers
    }

    pub fn signed_headers(&self) -> String {
        self.sorted_headers()
            .into_iter()
            .map(|(name, _)| name)
            .collect::<Vec<_>>()
            .join(";")
    }

    /// Newline-joined canonical form.
    pub fn render(&self) -> String {
        let headers = self.sorted_headers();
        let canonical_headers: String = headers
            .iter()
            .map(|(name, value)| format!("{name}:{value}\n"))
            .collect();
        let signed_headers = headers
            .iter()
            .map(|(name, _)| name.as_str())
            .collect::<Vec<_>>()
            .join(";");
        format!(
            "{}\n{}\n{}\n{}\n{}\n{}",
            self.method,
            self.uri,
            self.query,
            canonical_headers,
            signed_headers,
            self.payload_hash
        )
    }
}

/// `Authorization` header value for `request`.
pub fn authorization(
    params: &SigningParams<'_>,
    request: &CanonicalRequest<'_>,
) -> Result<String, InvalidLength> {
    let string_to_sign = string_to_sign(params, &sha256_hex(request.render().as_bytes()));
    let key = signing_key(
        params.secret_access_key,
        &short_date(params.time),
        params.region,
        params.service,
    )?;
    let signature = hex::encode(hmac_sha256(&key, string_to_sign.as_bytes())?);
    Ok(format!(
        "{ALGORITHM} Credential={}/{}, SignedHeaders={}, Signature={signature}",
        params.access_key_id,
        params.credential_scope(),
        request.signed_headers()
    ))
}

pub fn string_to_sign(params: &SigningParams<'_>, canonical_request_hash: &str) -> String {
    format!(
        "{ALGORITHM}\n{}\n{}\n{canonical_request_hash}",
        amz_date(params.time),
        params.credential_scope()
    )
}

pub fn signing_key(
    secret_access_key: &str,
    date: &str,
    region: &str,
    service: &str,
) -> Result<Vec<u8>, InvalidLength> {
    let k_date = hmac_sha256(format!("AWS4{secret_access_key}").as_bytes(), date.as_bytes())?;
    let k_region = hmac_sha256(&k_date, region.as_bytes())?;
    let k_service = hmac_sha256(&k_region, service.as_bytes())?;
    hmac_sha256(&k_service, SCOPE_TERMINATOR.as_bytes())
}

fn hmac_sha256(key: &[u8], data: &[u8]) -> Result<Vec<u8>, InvalidLength> {
    let mut mac = HmacSha256::new_from_slice(key)?;
    mac.update(data);
    Ok(mac.finalize().into_bytes().to_vec())
}

pub fn sha256_hex(data: &[u8]) -> String {
    hex::encode(Sha256::digest(data))
}

/// `X-Amz-Date` timestamp, e.g. `20150830T123600Z`.
pub fn amz_date(time: DateTime<Utc>) -> String {
    time.format("%Y%m%dT%H%M%SZ").to_string()
}

fn short_date(time: DateTime<Utc>) -> String {
    time.format("%Y%m%d").to_string()
}

/// RFC 3986 encoding as SigV4 defines it: everything but unreserved characters is
/// percent-encoded with upper-case hex.
pub fn uri_encode(input: &str, encode_slash: bool) -> String {
    let mut encoded = String::with_capacity(input.len());
    for byte in input.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                encoded.push(byte as char)
            }
            b'/' if !encode_slash => encoded.push('/'),
            _ => encoded.push_str(&format!("%{byte:02X}")),
        }
    }
    encoded
}

/// Canonical URI for an already-encoded request path.
///
/// Every service except S3 expects the path segments to be encoded a second time.
pub fn canonical_uri(encoded_path: &str, double_encode: bool) -> String {
    if encoded_path.is_empty() {
        return "/".to_string();
    }
    if !double_encode {
        return encoded_path.to_string();
    }
    encoded_path
        .split('/')
        .map(|segment| uri_encode(segment, true))
        .collect::<Vec<_>>()
        .join("/")
}

/// Sorted, encoded `key=value` pairs joined with `&`. Also usable as the request query
/// string or a form body.
pub fn canonical_query(params: &[(String, String)]) -> String {
    let mut pairs: Vec<(String, String)> = params
        .iter()
        .map(|(key, value)| (uri_encode(key, true), uri_encode(value, true)))
        .collect();
    pairs.sort();
    pairs
        .into_iter()
        .map(|(key, value)| format!("{key}={value}"))
        .collect::<Vec<_>>()
        .join("&")
}

fn normalize_header_value(value: &str) -> String {
    value.split_whitespace().collect::<Vec<_>>().join(" ")
}
