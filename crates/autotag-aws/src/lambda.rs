// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use async_trait::async_trait;
use autotag_core::tagger::FunctionTagger;
use autotag_core::{Tag, TagError};
use reqwest::Method;
use serde_json::json;

use crate::client::{AwsClient, Service, ServiceRequest};

pub const LAMBDA: Service = Service {
    signing_name: "lambda",
    endpoint_prefix: "lambda",
};

#[async_trait]
impl FunctionTagger for AwsClient {
    async fn tag_function(&self, arn: &str, tag: &Tag) -> Result<(), TagError> {
        let body = json!({ "Tags": { tag.key.as_str(): tag.value } });
        self.send(ServiceRequest::rest_json(
            LAMBDA,
            "TagResource",
            Method::POST,
            vec!["2017-03-31".to_string(), "tags".to_string(), arn.to_string()],
            &body,
        ))
        .await
    }
}
