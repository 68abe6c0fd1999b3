// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use async_trait::async_trait;
use autotag_core::tagger::RepositoryTagger;
use autotag_core::{Tag, TagError};
use serde_json::json;

use crate::client::{AwsClient, Service, ServiceRequest};

pub const ECR: Service = Service {
    signing_name: "ecr",
    endpoint_prefix: "api.ecr",
};

#[async_trait]
impl RepositoryTagger for AwsClient {
    async fn tag_repository(&self, arn: &str, tag: &Tag) -> Result<(), TagError> {
        let body = json!({
            "resourceArn": arn,
            "tags": [{ "Key": tag.key, "Value": tag.value }],
        });
        self.send(ServiceRequest::json_protocol(
            ECR,
            "TagResource",
            "AmazonEC2ContainerRegistry_V20150921.TagResource",
            &body,
        ))
        .await
    }
}
