// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Event bus envelope around a CloudTrail-recorded API call.
//!
//! Every field is optional on the wire. A field carrying the wrong JSON type is read as
//! absent instead of failing the whole decode, since `requestParameters` and
//! `responseElements` differ per service and audit records are sometimes partial.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::error::DispatchError;

/// One resource-creation event as delivered by the event bus.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Event {
    /// Account the call was made in.
    #[serde(default, deserialize_with = "lenient")]
    pub account: Option<String>,
    /// Region of the bus event, used when the detail carries no `awsRegion`.
    #[serde(default, deserialize_with = "lenient")]
    pub region: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub detail: Option<Detail>,
}

impl Event {
    /// Decodes an invocation payload. Only a payload that is not a JSON object is rejected.
    pub fn from_value(payload: Value) -> Result<Self, DispatchError> {
        if !payload.is_object() {
            return Err(DispatchError::InvalidEvent(format!(
                "expected a JSON object, got {}",
                json_type_name(&payload)
            )));
        }
        serde_json::from_value(payload).map_err(|e| DispatchError::InvalidEvent(e.to_string()))
    }

    /// Region the call was made in: `detail.awsRegion`, falling back to the envelope region.
    pub fn region(&self) -> Option<&str> {
        self.detail
            .as_ref()
            .and_then(|detail| non_empty(detail.aws_region.as_deref()))
            .or_else(|| non_empty(self.region.as_deref()))
    }

    pub fn account(&self) -> Option<&str> {
        non_empty(self.account.as_deref())
    }
}

/// The CloudTrail record carried in `detail`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Detail {
    #[serde(default, deserialize_with = "lenient")]
    pub event_source: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub event_name: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub aws_region: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub user_identity: Option<UserIdentity>,
    #[serde(default)]
    pub request_parameters: Option<Value>,
    #[serde(default)]
    pub response_elements: Option<Value>,
}

impl Detail {
    pub fn event_source(&self) -> &str {
        self.event_source.as_deref().unwrap_or_default()
    }

    pub fn event_name(&self) -> &str {
        self.event_name.as_deref().unwrap_or_default()
    }

    /// String at `pointer` inside `requestParameters`, if present and non-empty.
    pub fn request_str(&self, pointer: &str) -> Option<&str> {
        lookup_str(self.request_parameters.as_ref(), pointer)
    }

    /// String at `pointer` inside `responseElements`, if present and non-empty.
    pub fn response_str(&self, pointer: &str) -> Option<&str> {
        lookup_str(self.response_elements.as_ref(), pointer)
    }
}

/// Identity that performed the call.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserIdentity {
    #[serde(rename = "type", default, deserialize_with = "lenient")]
    pub identity_type: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub arn: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub principal_id: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub session_context: Option<SessionContext>,
}

impl UserIdentity {
    /// ARN of the role behind a role session.
    ///
    /// `None` when the record has no `sessionIssuer.arn` key at all. `Some(None)` when the key
    /// is present but null or not a string.
    pub fn session_issuer_arn(&self) -> Option<Option<&str>> {
        self.session_context
            .as_ref()
            .and_then(|context| context.session_issuer.as_ref())
            .and_then(|issuer| issuer.arn.as_ref())
            .map(|arn| arn.as_deref())
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionContext {
    #[serde(default, deserialize_with = "lenient")]
    pub session_issuer: Option<SessionIssuer>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SessionIssuer {
    /// Outer `None`: key absent. Inner `None`: null or wrong type.
    #[serde(default, deserialize_with = "present")]
    pub arn: Option<Option<String>>,
}

pub(crate) fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}

fn lookup_str<'a>(root: Option<&'a Value>, pointer: &str) -> Option<&'a str> {
    non_empty(root?.pointer(pointer)?.as_str())
}

fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).ok())
}

/// Like [`lenient`], but keeps "present with an unusable value" apart from "absent".
/// Only called when the key exists, so a null still yields `Some(None)`.
fn present<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Value::deserialize(deserializer)?;
    Ok(Some(serde_json::from_value(value).ok()))
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_decode_full_event() {
        let event = Event::from_value(json!({
            "account": "111122223333",
            "region": "eu-west-1",
            "detail": {
                "eventSource": "ec2.amazonaws.com",
                "eventName": "CreateVolume",
                "awsRegion": "us-east-1",
                "userIdentity": {
                    "type": "AssumedRole",
                    "arn": "arn:aws:sts::111122223333:assumed-role/deploy/session",
                    "principalId": "AROAEXAMPLE:session",
                    "sessionContext": {
                        "sessionIssuer": {
                            "type": "Role",
                            "arn": "arn:aws:iam::111122223333:role/deploy"
                        }
                    }
                },
                "requestParameters": {"size": 8},
                "responseElements": {"volumeId": "vol-0123"}
            }
        }))
        .unwrap();

        let detail = event.detail.as_ref().unwrap();
        assert_eq!(event.account(), Some("111122223333"));
        assert_eq!(event.region(), Some("us-east-1"));
        assert_eq!(detail.event_source(), "ec2.amazonaws.com");
        assert_eq!(detail.event_name(), "CreateVolume");
        assert_eq!(detail.response_str("/volumeId"), Some("vol-0123"));
        assert_eq!(
            detail.user_identity.as_ref().unwrap().session_issuer_arn(),
            Some(Some("arn:aws:iam::111122223333:role/deploy"))
        );
    }

    #[test]
    fn test_session_issuer_arn_presence() {
        let issuer_arn = |identity: Value| {
            let identity: UserIdentity = serde_json::from_value(identity).unwrap();
            identity
                .session_issuer_arn()
                .map(|arn| arn.map(str::to_string))
        };

        assert_eq!(issuer_arn(json!({"sessionContext": {}})), None);
        assert_eq!(
            issuer_arn(json!({"sessionContext": {"sessionIssuer": {"type": "Role"}}})),
            None
        );
        assert_eq!(
            issuer_arn(json!({"sessionContext": {"sessionIssuer": {"arn": null}}})),
            Some(None)
        );
        assert_eq!(
            issuer_arn(json!({"sessionContext": {"sessionIssuer": {"arn": 7}}})),
            Some(None)
        );
        assert_eq!(
            issuer_arn(json!({"sessionContext": {"sessionIssuer": {"arn": ""}}})),
            Some(Some(String::new()))
        );
    }

    #[test]
    fn test_region_falls_back_to_envelope() {
        let event = Event::from_value(json!({
            "region": "eu-west-1",
            "detail": {"awsRegion": ""}
        }))
        .unwrap();
        assert_eq!(event.region(), Some("eu-west-1"));

        let event = Event::from_value(json!({"region": "eu-west-1"})).unwrap();
        assert_eq!(event.region(), Some("eu-west-1"));

        let event = Event::from_value(json!({})).unwrap();
        assert_eq!(event.region(), None);
    }

    #[test]
    fn test_wrong_types_read_as_absent() {
        let event = Event::from_value(json!({
            "account": 111,
            "detail": {
                "eventSource": ["s3.amazonaws.com"],
                "eventName": "CreateBucket",
                "userIdentity": "alice",
                "requestParameters": null
            }
        }))
        .unwrap();

        let detail = event.detail.as_ref().unwrap();
        assert_eq!(event.account(), None);
        assert_eq!(detail.event_source(), "");
        assert_eq!(detail.event_name(), "CreateBucket");
        assert!(detail.user_identity.is_none());
        assert_eq!(detail.request_str("/bucketName"), None);
    }

    #[test]
    fn test_detail_of_wrong_type_is_absent() {
        let event = Event::from_value(json!({"detail": "not a mapping"})).unwrap();
        assert!(event.detail.is_none());
    }

    #[test]
    fn test_non_object_payload_rejected() {
        let err = Event::from_value(json!(["not", "an", "event"])).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Invalid event payload: expected a JSON object, got an array"
        );
        assert!(Event::from_value(Value::Null).is_err());
    }

    #[test]
    fn test_empty_strings_are_absent() {
        let event = Event::from_value(json!({
            "detail": {
                "requestParameters": {"bucketName": ""},
                "responseElements": {"volumeId": 42}
            }
        }))
        .unwrap();
        let detail = event.detail.unwrap();
        assert_eq!(detail.request_str("/bucketName"), None);
        assert_eq!(detail.response_str("/volumeId"), None);
    }
}
