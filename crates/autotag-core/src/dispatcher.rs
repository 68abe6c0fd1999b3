// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, error, info};

use crate::actor::resolve_actor;
use crate::error::DispatchError;
use crate::event::{Detail, Event};
use crate::handlers::{self, Scope};
use crate::route::Route;
use crate::tagger::{Tag, Taggers};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Ok,
}

/// Record returned for every successfully handled invocation, tagged or not.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvocationResult {
    pub status: Status,
    pub actor: String,
    /// `<eventSource>:<eventName>` of the event, whether or not a handler matched.
    pub handled: String,
}

/// Handles one event per call. Holds no per-invocation state, so a single instance serves
/// every invocation of the process.
#[derive(Debug, Clone)]
pub struct Dispatcher {
    taggers: Taggers,
    tag_key: String,
}

impl Dispatcher {
    pub fn new(taggers: Taggers, tag_key: impl Into<String>) -> Self {
        Dispatcher {
            taggers,
            tag_key: tag_key.into(),
        }
    }

    pub fn tag_key(&self) -> &str {
        &self.tag_key
    }

    /// Decodes a raw invocation payload and handles it.
    pub async fn handle_value(&self, payload: Value) -> Result<InvocationResult, DispatchError> {
        let event = Event::from_value(payload)?;
        self.handle(&event).await
    }

    /// Tags the resource(s) created by `event`.
    ///
    /// Unmatched events and events without a usable resource identifier succeed without
    /// calling any provider. A provider failure is logged and returned; it is the only error
    /// path.
    pub async fn handle(&self, event: &Event) -> Result<InvocationResult, DispatchError> {
        let empty = Detail::default();
        let detail = event.detail.as_ref().unwrap_or(&empty);
        let scope = Scope {
            account: event.account(),
            region: event.region(),
        };
        let actor = resolve_actor(detail.user_identity.as_ref());
        let source = detail.event_source();
        let name = detail.event_name();

        info!("Received {source}:{name} by {actor}");

        match Route::lookup(source, name) {
            Some(route) => {
                debug!("Dispatching {source}:{name} to {route:?}");
                let tag = Tag::new(self.tag_key.as_str(), actor.as_str());
                if let Err(e) = handlers::apply(route, &self.taggers, detail, scope, &tag).await {
                    error!("Tagging error: {e}");
                    return Err(e.into());
                }
            }
            None => info!("No handler for {source}:{name}"),
        }

        Ok(InvocationResult {
            status: Status::Ok,
            actor,
            handled: format!("{source}:{name}"),
        })
    }
}
