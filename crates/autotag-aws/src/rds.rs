// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use async_trait::async_trait;
use autotag_core::tagger::DatabaseTagger;
use autotag_core::{Tag, TagError};

use crate::client::{AwsClient, Service, ServiceRequest};

pub const RDS: Service = Service {
    signing_name: "rds",
    endpoint_prefix: "rds",
};
const API_VERSION: &str = "2014-10-31";

#[async_trait]
impl DatabaseTagger for AwsClient {
    async fn tag_db_instance(&self, arn: &str, tag: &Tag) -> Result<(), TagError> {
        let params = vec![
            ("ResourceName".to_string(), arn.to_string()),
            ("Tags.Tag.1.Key".to_string(), tag.key.clone()),
            ("Tags.Tag.1.Value".to_string(), tag.value.clone()),
        ];
        self.send(ServiceRequest::query_protocol(
            RDS,
            "AddTagsToResource",
            API_VERSION,
            params,
        ))
        .await
    }
}
