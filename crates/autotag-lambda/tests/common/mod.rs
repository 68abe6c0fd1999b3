// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use async_trait::async_trait;
use autotag_core::tagger::{
    BucketTagger, ClusterTagger, ComputeTagger, DatabaseTagger, FunctionTagger, LogGroupTagger,
    RepositoryTagger,
};
use autotag_core::{Dispatcher, Tag, TagError, Taggers};
use std::sync::Arc;

/// Accepts every call except bucket tagging, which is rejected with `AccessDenied`.
pub struct DenyBuckets;

#[async_trait]
impl ComputeTagger for DenyBuckets {
    async fn create_tags(&self, _: &[String], _: &Tag) -> Result<(), TagError> {
        Ok(())
    }
}

#[async_trait]
impl BucketTagger for DenyBuckets {
    async fn tag_bucket(&self, bucket: &str, _: &Tag) -> Result<(), TagError> {
        Err(TagError::Provider {
            service: "s3",
            operation: "PutBucketTagging",
            status: 403,
            code: "AccessDenied".to_string(),
            message: format!("access denied on {bucket}"),
        })
    }
}

#[async_trait]
impl DatabaseTagger for DenyBuckets {
    async fn tag_db_instance(&self, _: &str, _: &Tag) -> Result<(), TagError> {
        Ok(())
    }
}

#[async_trait]
impl FunctionTagger for DenyBuckets {
    async fn tag_function(&self, _: &str, _: &Tag) -> Result<(), TagError> {
        Ok(())
    }
}

#[async_trait]
impl RepositoryTagger for DenyBuckets {
    async fn tag_repository(&self, _: &str, _: &Tag) -> Result<(), TagError> {
        Ok(())
    }
}

#[async_trait]
impl LogGroupTagger for DenyBuckets {
    async fn tag_log_group(&self, _: &str, _: &Tag) -> Result<(), TagError> {
        Ok(())
    }
}

#[async_trait]
impl ClusterTagger for DenyBuckets {
    async fn tag_cluster(&self, _: &str, _: &Tag) -> Result<(), TagError> {
        Ok(())
    }
}

pub fn dispatcher() -> Dispatcher {
    Dispatcher::new(Taggers::shared(Arc::new(DenyBuckets)), "CreatedBy")
}
