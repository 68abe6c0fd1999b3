// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Recording tagger used in place of the provider APIs

use async_trait::async_trait;
use autotag_core::tagger::{
    BucketTagger, ClusterTagger, ComputeTagger, DatabaseTagger, FunctionTagger, LogGroupTagger,
    RepositoryTagger,
};
use autotag_core::{Tag, TagError};
use std::sync::Mutex;

/// One provider call as seen by the tagger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Compute(Vec<String>, Tag),
    Bucket(String, Tag),
    Database(String, Tag),
    Function(String, Tag),
    Repository(String, Tag),
    LogGroup(String, Tag),
    Cluster(String, Tag),
}

/// Records every call. Calls whose first resource ID starts with `fail_prefix` are rejected
/// after being recorded.
#[derive(Default)]
pub struct RecordingTagger {
    calls: Mutex<Vec<Call>>,
    fail_prefix: Option<String>,
}

#[allow(dead_code)]
impl RecordingTagger {
    pub fn failing_on(prefix: &str) -> Self {
        RecordingTagger {
            calls: Mutex::new(Vec::new()),
            fail_prefix: Some(prefix.to_string()),
        }
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().expect("lock poisoned").clone()
    }

    fn record(&self, call: Call, resource: &str) -> Result<(), TagError> {
        self.calls.lock().expect("lock poisoned").push(call);
        match &self.fail_prefix {
            Some(prefix) if resource.starts_with(prefix.as_str()) => Err(TagError::Provider {
                service: "mock",
                operation: "Tag",
                status: 400,
                code: "InvalidParameterValue".to_string(),
                message: format!("cannot tag {resource}"),
            }),
            _ => Ok(()),
        }
    }
}

#[async_trait]
impl ComputeTagger for RecordingTagger {
    async fn create_tags(&self, resource_ids: &[String], tag: &Tag) -> Result<(), TagError> {
        let first = resource_ids.first().cloned().unwrap_or_default();
        self.record(Call::Compute(resource_ids.to_vec(), tag.clone()), &first)
    }
}

#[async_trait]
impl BucketTagger for RecordingTagger {
    async fn tag_bucket(&self, bucket: &str, tag: &Tag) -> Result<(), TagError> {
        self.record(Call::Bucket(bucket.to_string(), tag.clone()), bucket)
    }
}

#[async_trait]
impl DatabaseTagger for RecordingTagger {
    async fn tag_db_instance(&self, arn: &str, tag: &Tag) -> Result<(), TagError> {
        self.record(Call::Database(arn.to_string(), tag.clone()), arn)
    }
}

#[async_trait]
impl FunctionTagger for RecordingTagger {
    async fn tag_function(&self, arn: &str, tag: &Tag) -> Result<(), TagError> {
        self.record(Call::Function(arn.to_string(), tag.clone()), arn)
    }
}

#[async_trait]
impl RepositoryTagger for RecordingTagger {
    async fn tag_repository(&self, arn: &str, tag: &Tag) -> Result<(), TagError> {
        self.record(Call::Repository(arn.to_string(), tag.clone()), arn)
    }
}

#[async_trait]
impl LogGroupTagger for RecordingTagger {
    async fn tag_log_group(&self, name: &str, tag: &Tag) -> Result<(), TagError> {
        self.record(Call::LogGroup(name.to_string(), tag.clone()), name)
    }
}

#[async_trait]
impl ClusterTagger for RecordingTagger {
    async fn tag_cluster(&self, arn: &str, tag: &Tag) -> Result<(), TagError> {
        self.record(Call::Cluster(arn.to_string(), tag.clone()), arn)
    }
}
