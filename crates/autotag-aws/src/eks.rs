// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use async_trait::async_trait;
use autotag_core::tagger::ClusterTagger;
use autotag_core::{Tag, TagError};
use reqwest::Method;
use serde_json::json;

use crate::client::{AwsClient, Service, ServiceRequest};

pub const EKS: Service = Service {
    signing_name: "eks",
    endpoint_prefix: "eks",
};

#[async_trait]
impl ClusterTagger for AwsClient {
    async fn tag_cluster(&self, arn: &str, tag: &Tag) -> Result<(), TagError> {
        let body = json!({ "tags": { tag.key.as_str(): tag.value } });
        self.send(ServiceRequest::rest_json(
            EKS,
            "TagResource",
            Method::POST,
            vec!["tags".to_string(), arn.to_string()],
            &body,
        ))
        .await
    }
}
