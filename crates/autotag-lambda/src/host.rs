// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Invocation loop of the custom runtime.

use autotag_core::{DispatchError, Dispatcher};
use serde_json::Value;
use tracing::{debug, error, info_span, Instrument};

use crate::runtime::{ErrorResponse, Invocation, RuntimeClient, RuntimeError};

/// Serves invocations until the Runtime API stops handing them out.
///
/// Only a failure to fetch the next invocation ends the loop; failures to answer one are
/// logged and the loop moves on.
pub async fn run(runtime: &RuntimeClient, dispatcher: &Dispatcher) -> Result<(), RuntimeError> {
    loop {
        let invocation = runtime.next_invocation().await?;
        let span = info_span!(
            "invocation",
            request_id = %invocation.context.request_id
        );
        process(runtime, dispatcher, invocation)
            .instrument(span)
            .await;
    }
}

/// Dispatches one invocation and reports the outcome on its response or error endpoint.
pub async fn process(runtime: &RuntimeClient, dispatcher: &Dispatcher, invocation: Invocation) {
    let request_id = invocation.context.request_id.as_str();
    let outcome = match serde_json::from_slice::<Value>(&invocation.body) {
        Ok(payload) => dispatcher.handle_value(payload).await,
        Err(e) => Err(DispatchError::InvalidEvent(e.to_string())),
    };

    let reported = match outcome {
        Ok(result) => {
            debug!("Tagged {} for {}", result.handled, result.actor);
            runtime.send_response(request_id, &result).await
        }
        Err(e) => {
            error!("Invocation failed: {e}");
            runtime
                .send_error(request_id, &ErrorResponse::new(e.error_type(), &e))
                .await
        }
    };

    if let Err(e) = reported {
        error!("Failed to report invocation result: {e}");
    }
}
