// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Static dispatch table from (event source, event name) to a tagging handler.

const EC2: &str = "ec2.amazonaws.com";
const S3: &str = "s3.amazonaws.com";
const RDS: &str = "rds.amazonaws.com";
const LAMBDA: &str = "lambda.amazonaws.com";
const ECR: &str = "ecr.amazonaws.com";
const LOGS: &str = "logs.amazonaws.com";
const EKS: &str = "eks.amazonaws.com";

/// Resource-creation calls that get tagged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    /// Instances plus the volumes created with them at launch.
    RunInstances,
    CreateVolume,
    CreateBucket,
    /// Covers both fresh instances and restores from a snapshot.
    CreateDbInstance,
    CreateFunction,
    CreateRepository,
    CreateLogGroup,
    CreateCluster,
}

impl Route {
    /// Exact, case-sensitive lookup. `None` means the event is not one we tag.
    pub fn lookup(event_source: &str, event_name: &str) -> Option<Route> {
        let route = match (event_source, event_name) {
            (EC2, "RunInstances") => Route::RunInstances,
            (EC2, "CreateVolume") => Route::CreateVolume,
            (S3, "CreateBucket") => Route::CreateBucket,
            (RDS, "CreateDBInstance" | "RestoreDBInstanceFromDBSnapshot") => {
                Route::CreateDbInstance
            }
            (LAMBDA, "CreateFunction20150331") => Route::CreateFunction,
            (ECR, "CreateRepository") => Route::CreateRepository,
            (LOGS, "CreateLogGroup") => Route::CreateLogGroup,
            (EKS, "CreateCluster") => Route::CreateCluster,
            _ => return None,
        };
        Some(route)
    }
}
