// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! S3 `PutBucketTagging`.
//!
//! The call replaces the bucket's whole tag set. A freshly created bucket has none, so a
//! single-tag set is written.

use async_trait::async_trait;
use autotag_core::tagger::BucketTagger;
use autotag_core::{Tag, TagError};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use reqwest::Method;
use sha2::{Digest, Sha256};

use crate::client::{AwsClient, Service, ServiceRequest};

pub const S3: Service = Service {
    signing_name: "s3",
    endpoint_prefix: "s3",
};

pub fn tagging_document(tag: &Tag) -> String {
    format!(
        "<Tagging xmlns=\"http://s3.amazonaws.com/doc/2006-03-01/\"><TagSet><Tag><Key>{}</Key><Value>{}</Value></Tag></TagSet></Tagging>",
        xml_escape(&tag.key),
        xml_escape(&tag.value)
    )
}

fn xml_escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

#[async_trait]
impl BucketTagger for AwsClient {
    async fn tag_bucket(&self, bucket: &str, tag: &Tag) -> Result<(), TagError> {
        let body = tagging_document(tag).into_bytes();
        // PutBucketTagging requires an integrity checksum of the body.
        let checksum = STANDARD.encode(Sha256::digest(&body));
        let headers = vec![
            ("content-type".to_string(), "application/xml".to_string()),
            ("x-amz-checksum-sha256".to_string(), checksum),
            ("x-amz-sdk-checksum-algorithm".to_string(), "SHA256".to_string()),
        ];
        self.send(ServiceRequest::s3_bucket(
            S3,
            "PutBucketTagging",
            Method::PUT,
            bucket,
            vec![("tagging".to_string(), String::new())],
            headers,
            body,
        ))
        .await
    }
}
