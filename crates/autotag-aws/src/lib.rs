// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! AWS implementations of the autotag tagging capabilities.
//!
//! Every capability trait is implemented for [`AwsClient`], so one client backs all
//! handlers through [`autotag_core::Taggers::shared`].

#![cfg_attr(not(test), deny(clippy::panic))]
#![cfg_attr(not(test), deny(clippy::unwrap_used))]
#![cfg_attr(not(test), deny(clippy::expect_used))]
#![cfg_attr(not(test), deny(clippy::todo))]
#![cfg_attr(not(test), deny(clippy::unimplemented))]

pub mod client;
pub mod credentials;
pub mod sigv4;

pub mod ec2;
pub mod ecr;
pub mod eks;
pub mod lambda;
pub mod logs;
pub mod rds;
pub mod s3;

pub use client::{AwsClient, ClientError};
pub use credentials::{Credentials, CredentialsError};
