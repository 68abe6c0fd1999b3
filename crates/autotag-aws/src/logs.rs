// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! CloudWatch Logs. Log groups are addressed by name, so this uses `TagLogGroup`
//! rather than the ARN-based `TagResource`.

use async_trait::async_trait;
use autotag_core::tagger::LogGroupTagger;
use autotag_core::{Tag, TagError};
use serde_json::json;

use crate::client::{AwsClient, Service, ServiceRequest};

pub const LOGS: Service = Service {
    signing_name: "logs",
    endpoint_prefix: "logs",
};

#[async_trait]
impl LogGroupTagger for AwsClient {
    async fn tag_log_group(&self, name: &str, tag: &Tag) -> Result<(), TagError> {
        let body = json!({
            "logGroupName": name,
            "tags": { tag.key.as_str(): tag.value },
        });
        self.send(ServiceRequest::json_protocol(
            LOGS,
            "TagLogGroup",
            "Logs_20140328.TagLogGroup",
            &body,
        ))
        .await
    }
}
