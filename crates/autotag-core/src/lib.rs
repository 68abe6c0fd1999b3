// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Event dispatcher that stamps newly created cloud resources with the identity of their
//! creator.
//!
//! An audit event (one resource-creation API call) is decoded into an [`event::Event`], the
//! acting identity is resolved by [`actor::resolve_actor`], and the matching
//! [`route::Route`] drives one of the tagging handlers against the injected
//! [`tagger::Taggers`] capabilities.

#![cfg_attr(not(test), deny(clippy::panic))]
#![cfg_attr(not(test), deny(clippy::unwrap_used))]
#![cfg_attr(not(test), deny(clippy::expect_used))]
#![cfg_attr(not(test), deny(clippy::todo))]
#![cfg_attr(not(test), deny(clippy::unimplemented))]

pub mod actor;
pub mod config;
pub mod dispatcher;
pub mod error;
pub mod event;
pub mod handlers;
pub mod route;
pub mod tagger;

pub use dispatcher::{Dispatcher, InvocationResult, Status};
pub use error::{ConfigError, DispatchError, TagError};
pub use event::Event;
pub use tagger::{Tag, Taggers};
