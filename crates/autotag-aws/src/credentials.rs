// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use std::env;
use std::fmt::Debug;

#[derive(Debug, thiserror::Error)]
pub enum CredentialsError {
    #[error("{0} environment variable is not set")]
    Missing(&'static str),
}

/// Static credentials used to sign provider requests. The function runtime exports the
/// execution role's session credentials as environment variables.
#[derive(Clone)]
pub struct Credentials {
    access_key_id: String,
    secret_access_key: String,
    session_token: Option<String>,
}

impl Credentials {
    pub fn new(
        access_key_id: impl Into<String>,
        secret_access_key: impl Into<String>,
        session_token: Option<String>,
    ) -> Self {
        Credentials {
            access_key_id: access_key_id.into(),
            secret_access_key: secret_access_key.into(),
            session_token,
        }
    }

    pub fn from_env() -> Result<Self, CredentialsError> {
        let access_key_id = non_blank_var("AWS_ACCESS_KEY_ID")
            .ok_or(CredentialsError::Missing("AWS_ACCESS_KEY_ID"))?;
        let secret_access_key = non_blank_var("AWS_SECRET_ACCESS_KEY")
            .ok_or(CredentialsError::Missing("AWS_SECRET_ACCESS_KEY"))?;
        let session_token = non_blank_var("AWS_SESSION_TOKEN");
        Ok(Credentials::new(
            access_key_id,
            secret_access_key,
            session_token,
        ))
    }

    pub fn access_key_id(&self) -> &str {
        &self.access_key_id
    }

    pub fn secret_access_key(&self) -> &str {
        &self.secret_access_key
    }

    pub fn session_token(&self) -> Option<&str> {
        self.session_token.as_deref()
    }
}

impl Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("access_key_id", &self.access_key_id)
            .field("secret_access_key", &"<redacted>")
            .field(
                "session_token",
                &self.session_token.as_ref().map(|_| "<redacted>"),
            )
            .finish()
    }
}

fn non_blank_var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|val| !val.trim().is_empty())
}
