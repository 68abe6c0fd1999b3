// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use autotag_aws::{AwsClient, Credentials};
use autotag_core::config::Config;
use std::time::Duration;

pub const REGION: &str = "us-east-1";
pub const ACCESS_KEY_ID: &str = "AKIDEXAMPLE";

/// Authorization header pattern for a request signed for `service` in [`REGION`].
pub fn authorization_pattern(service: &str) -> String {
    format!(
        r"^AWS4-HMAC-SHA256 Credential={ACCESS_KEY_ID}/\d{{8}}/{REGION}/{service}/aws4_request, SignedHeaders=[a-z0-9;-]+, Signature=[0-9a-f]{{64}}$"
    )
}

/// Client whose every call goes to `endpoint_url`.
pub fn client_for(endpoint_url: &str, session_token: Option<&str>) -> AwsClient {
    let config = Config {
        region: Some(REGION.to_string()),
        endpoint_url: Some(endpoint_url.to_string()),
        http_timeout: Duration::from_secs(5),
        ..Config::default()
    };
    AwsClient::new(
        &config,
        Credentials::new(
            ACCESS_KEY_ID,
            "wJalrXUtnFEMI/K7MDENG+bPxRfiCYEXAMPLEKEY",
            session_token.map(str::to_string),
        ),
    )
    .expect("failed to create client")
}
