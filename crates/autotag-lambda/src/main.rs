// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

#![cfg_attr(not(test), deny(clippy::panic))]
#![cfg_attr(not(test), deny(clippy::unwrap_used))]
#![cfg_attr(not(test), deny(clippy::expect_used))]
#![cfg_attr(not(test), deny(clippy::todo))]
#![cfg_attr(not(test), deny(clippy::unimplemented))]

use std::{env, sync::Arc};
use tracing::{debug, error, info};
use tracing_subscriber::EnvFilter;

use autotag_aws::AwsClient;
use autotag_core::{
    config::{Config, DEFAULT_LOG_LEVEL},
    Dispatcher, Taggers,
};
use autotag_lambda::{
    host,
    runtime::{ErrorResponse, RuntimeClient},
};

#[tokio::main]
pub async fn main() {
    let config = Config::from_env();
    let log_level = config
        .as_ref()
        .map(|c| c.log_level.clone())
        .unwrap_or_else(|_| DEFAULT_LOG_LEVEL.to_string());

    let env_filter = format!("h2=off,hyper=off,rustls=off,reqwest=off,{}", log_level);

    #[allow(clippy::expect_used)]
    let subscriber = tracing_subscriber::fmt::Subscriber::builder()
        .with_env_filter(
            EnvFilter::try_new(env_filter).expect("could not parse log level in configuration"),
        )
        .with_level(true)
        .with_thread_names(false)
        .with_thread_ids(false)
        .with_line_number(false)
        .with_file(false)
        .with_target(true)
        .without_time()
        .finish();

    #[allow(clippy::expect_used)]
    tracing::subscriber::set_global_default(subscriber).expect("setting default subscriber failed");

    debug!("Logging subsystem enabled");

    let runtime_api = match env::var("AWS_LAMBDA_RUNTIME_API") {
        Ok(api) if !api.trim().is_empty() => api,
        _ => {
            error!("AWS_LAMBDA_RUNTIME_API is not set. Not running inside Lambda, shutting down.");
            return;
        }
    };

    let runtime = match RuntimeClient::new(&runtime_api) {
        Ok(runtime) => runtime,
        Err(e) => {
            error!("Failed to create Runtime API client: {e}");
            return;
        }
    };

    let client = match config {
        Ok(config) => AwsClient::from_config(&config).map(|client| (config, client)),
        Err(e) => Err(e.into()),
    };
    let (config, client) = match client {
        Ok(pair) => pair,
        Err(e) => {
            error!("Initialization failed: {e}");
            if let Err(e) = runtime
                .send_init_error(&ErrorResponse::new("InitError", &e))
                .await
            {
                error!("Failed to report initialization error: {e}");
            }
            return;
        }
    };

    info!(
        "Tagging new resources with {} in {}",
        config.tag_key,
        client.region()
    );
    let dispatcher = Dispatcher::new(Taggers::shared(Arc::new(client)), config.tag_key);

    if let Err(e) = host::run(&runtime, &dispatcher).await {
        error!("Stopped receiving invocations: {e}");
    }
}
