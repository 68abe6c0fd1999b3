// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! EC2 `CreateTags` over the query protocol.

use async_trait::async_trait;
use autotag_core::tagger::ComputeTagger;
use autotag_core::{Tag, TagError};

use crate::client::{AwsClient, Service, ServiceRequest};

pub const EC2: Service = Service {
    signing_name: "ec2",
    endpoint_prefix: "ec2",
};
const API_VERSION: &str = "2016-11-15";

/// Form parameters for one `CreateTags` call. Resource IDs are numbered from 1.
pub fn create_tags_params(resource_ids: &[String], tag: &Tag) -> Vec<(String, String)> {
    let mut params: Vec<(String, String)> = resource_ids
        .iter()
        .enumerate()
        .map(|(i, id)| (format!("ResourceId.{}", i + 1), id.clone()))
        .collect();
    params.push(("Tag.1.Key".to_string(), tag.key.clone()));
    params.push(("Tag.1.Value".to_string(), tag.value.clone()));
    params
}

#[async_trait]
impl ComputeTagger for AwsClient {
    async fn create_tags(&self, resource_ids: &[String], tag: &Tag) -> Result<(), TagError> {
        self.send(ServiceRequest::query_protocol(
            EC2,
            "CreateTags",
            API_VERSION,
            create_tags_params(resource_ids, tag),
        ))
        .await
    }
}
