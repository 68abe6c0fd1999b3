// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Provider tagging capabilities, one trait per resource class.
//!
//! Implementations must be idempotent: applying the same tag twice overwrites it with the
//! same value.

use async_trait::async_trait;
use std::fmt::Debug;
use std::sync::Arc;

use crate::error::TagError;

/// Key/value pair attached to a resource.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tag {
    pub key: String,
    pub value: String,
}

impl Tag {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Tag {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// Compute instances and block storage volumes. Accepts several IDs of one class per call.
#[async_trait]
pub trait ComputeTagger: Send + Sync {
    async fn create_tags(&self, resource_ids: &[String], tag: &Tag) -> Result<(), TagError>;
}

/// Object storage buckets, addressed by bucket name.
#[async_trait]
pub trait BucketTagger: Send + Sync {
    async fn tag_bucket(&self, bucket: &str, tag: &Tag) -> Result<(), TagError>;
}

/// Relational database instances, addressed by ARN.
#[async_trait]
pub trait DatabaseTagger: Send + Sync {
    async fn tag_db_instance(&self, arn: &str, tag: &Tag) -> Result<(), TagError>;
}

/// Functions, addressed by ARN.
#[async_trait]
pub trait FunctionTagger: Send + Sync {
    async fn tag_function(&self, arn: &str, tag: &Tag) -> Result<(), TagError>;
}

/// Container image repositories, addressed by ARN.
#[async_trait]
pub trait RepositoryTagger: Send + Sync {
    async fn tag_repository(&self, arn: &str, tag: &Tag) -> Result<(), TagError>;
}

/// Log groups. Unlike every other class these are addressed by name.
#[async_trait]
pub trait LogGroupTagger: Send + Sync {
    async fn tag_log_group(&self, name: &str, tag: &Tag) -> Result<(), TagError>;
}

/// Orchestration clusters, addressed by ARN.
#[async_trait]
pub trait ClusterTagger: Send + Sync {
    async fn tag_cluster(&self, arn: &str, tag: &Tag) -> Result<(), TagError>;
}

/// The set of capabilities handed to the dispatcher at construction.
#[derive(Clone)]
pub struct Taggers {
    pub compute: Arc<dyn ComputeTagger>,
    pub bucket: Arc<dyn BucketTagger>,
    pub database: Arc<dyn DatabaseTagger>,
    pub function: Arc<dyn FunctionTagger>,
    pub repository: Arc<dyn RepositoryTagger>,
    pub log_group: Arc<dyn LogGroupTagger>,
    pub cluster: Arc<dyn ClusterTagger>,
}

impl Taggers {
    /// Uses one implementation for every resource class.
    pub fn shared<T>(tagger: Arc<T>) -> Self
    where
        T: ComputeTagger
            + BucketTagger
            + DatabaseTagger
            + FunctionTagger
            + RepositoryTagger
            + LogGroupTagger
            + ClusterTagger
            + 'static,
    {
        Taggers {
            compute: tagger.clone(),
            bucket: tagger.clone(),
            database: tagger.clone(),
            function: tagger.clone(),
            repository: tagger.clone(),
            log_group: tagger.clone(),
            cluster: tagger,
        }
    }
}

impl Debug for Taggers {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Taggers")
    }
}
