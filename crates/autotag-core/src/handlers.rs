// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Per-resource tagging handlers.
//!
//! Each handler pulls the resource identifiers out of the event detail and calls the
//! matching capability. Missing or malformed identifiers mean there is nothing to tag: the
//! handler returns `Ok(())` without calling the provider.

use serde_json::Value;
use tracing::debug;

use crate::error::TagError;
use crate::event::Detail;
use crate::route::Route;
use crate::tagger::{Tag, Taggers};

/// Account and region the call was made in, used to build ARNs the response omits.
#[derive(Debug, Clone, Copy, Default)]
pub struct Scope<'a> {
    pub account: Option<&'a str>,
    pub region: Option<&'a str>,
}

/// Runs the handler selected by `route`. The first failing provider call aborts the rest.
pub async fn apply(
    route: Route,
    taggers: &Taggers,
    detail: &Detail,
    scope: Scope<'_>,
    tag: &Tag,
) -> Result<(), TagError> {
    match route {
        Route::RunInstances => tag_run_instances(taggers, detail, tag).await,
        Route::CreateVolume => match detail.response_str("/volumeId") {
            Some(volume_id) => {
                taggers
                    .compute
                    .create_tags(&[volume_id.to_string()], tag)
                    .await
            }
            None => skip(route),
        },
        Route::CreateBucket => match detail.request_str("/bucketName") {
            Some(bucket) => taggers.bucket.tag_bucket(bucket, tag).await,
            None => skip(route),
        },
        Route::CreateDbInstance => match db_instance_arn(detail, scope) {
            Some(arn) => taggers.database.tag_db_instance(&arn, tag).await,
            None => skip(route),
        },
        Route::CreateFunction => match detail.response_str("/functionArn") {
            Some(arn) => taggers.function.tag_function(arn, tag).await,
            None => skip(route),
        },
        Route::CreateRepository => match detail.response_str("/repository/repositoryArn") {
            Some(arn) => taggers.repository.tag_repository(arn, tag).await,
            None => skip(route),
        },
        Route::CreateLogGroup => match detail.request_str("/logGroupName") {
            Some(name) => taggers.log_group.tag_log_group(name, tag).await,
            None => skip(route),
        },
        Route::CreateCluster => match detail.response_str("/cluster/arn") {
            Some(arn) => taggers.cluster.tag_cluster(arn, tag).await,
            None => skip(route),
        },
    }
}

fn skip(route: Route) -> Result<(), TagError> {
    debug!("No resource identifier found for {route:?}, nothing to tag");
    Ok(())
}

async fn tag_run_instances(taggers: &Taggers, detail: &Detail, tag: &Tag) -> Result<(), TagError> {
    let items = launched_instances(detail);
    let instance_ids = instance_ids(items);
    if instance_ids.is_empty() {
        return skip(Route::RunInstances);
    }
    taggers.compute.create_tags(&instance_ids, tag).await?;

    let volume_ids = launch_volume_ids(items);
    if !volume_ids.is_empty() {
        taggers.compute.create_tags(&volume_ids, tag).await?;
    }
    Ok(())
}

fn launched_instances(detail: &Detail) -> &[Value] {
    detail
        .response_elements
        .as_ref()
        .and_then(|response| response.pointer("/instancesSet/items"))
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or_default()
}

/// Instance IDs of every launched instance record.
pub fn instance_ids(items: &[Value]) -> Vec<String> {
    items
        .iter()
        .filter_map(|item| non_empty_str(item.get("instanceId")))
        .map(str::to_string)
        .collect()
}

/// Volume IDs from every instance's block device mapping, de-duplicated in first-seen order.
pub fn launch_volume_ids(items: &[Value]) -> Vec<String> {
    let mut volume_ids: Vec<String> = Vec::new();
    let mappings = items
        .iter()
        .filter_map(|item| item.get("blockDeviceMapping").and_then(Value::as_array))
        .flatten();
    for mapping in mappings {
        if let Some(volume_id) = non_empty_str(mapping.pointer("/ebs/volumeId")) {
            if !volume_ids.iter().any(|seen| seen == volume_id) {
                volume_ids.push(volume_id.to_string());
            }
        }
    }
    volume_ids
}

/// ARN of the created database instance.
///
/// Some restore calls omit `dBInstanceArn` from the response; the ARN is then built from the
/// region, account and requested identifier.
pub fn db_instance_arn(detail: &Detail, scope: Scope<'_>) -> Option<String> {
    if let Some(arn) = detail.response_str("/dBInstanceArn") {
        return Some(arn.to_string());
    }
    let identifier = detail.request_str("/dBInstanceIdentifier")?;
    let region = scope.region?;
    let account = scope.account?;
    Some(format!("arn:aws:rds:{region}:{account}:db:{identifier}"))
}

fn non_empty_str(value: Option<&Value>) -> Option<&str> {
    value.and_then(Value::as_str).filter(|v| !v.is_empty())
}
