// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use crate::event::{non_empty, UserIdentity};

/// Actor reported when the identity carries nothing usable.
pub const UNKNOWN_ACTOR: &str = "unknown";

const ASSUMED_ROLE: &str = "AssumedRole";

/// Resolves who performed the call.
///
/// Role sessions (CI/CD pipelines, automation) are reported as the issuing role rather than
/// the per-session ARN. A role session whose record has a `sessionIssuer.arn` key uses that
/// value in place of the direct ARN, even when it is empty or null. An empty ARN falls
/// through to the principal ID. The result is never empty.
pub fn resolve_actor(identity: Option<&UserIdentity>) -> String {
    let Some(identity) = identity else {
        return UNKNOWN_ACTOR.to_string();
    };

    let arn = match identity.session_issuer_arn() {
        Some(issuer_arn) if identity.identity_type.as_deref() == Some(ASSUMED_ROLE) => issuer_arn,
        _ => identity.arn.as_deref(),
    };

    non_empty(arn)
        .or_else(|| non_empty(identity.principal_id.as_deref()))
        .unwrap_or(UNKNOWN_ACTOR)
        .to_string()
}
