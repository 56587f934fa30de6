//! The `{success, data | error}` wire envelope.
//!
//! # Design
//! serde cannot tag an enum on a boolean field, so decoding goes through a
//! loose `RawEnvelope` and is checked by hand: `success: true` decodes `data`
//! into the caller's type (a missing `data` reads as `null`), `success: false`
//! requires an `error` object. `data` is only decoded on success, so a
//! failure envelope never trips over the caller's type.

use serde::de::{DeserializeOwned, Error as _};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Error payload of a failure envelope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
}

/// A decoded response envelope.
#[derive(Debug, Clone, PartialEq)]
pub enum Envelope<T> {
    Success(T),
    Failure(ErrorBody),
}

#[derive(Deserialize)]
struct RawEnvelope {
    success: bool,
    #[serde(default)]
    data: Option<Value>,
    #[serde(default)]
    error: Option<ErrorBody>,
}

impl<'de, T: DeserializeOwned> Deserialize<'de> for Envelope<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = RawEnvelope::deserialize(deserializer)?;
        if raw.success {
            let data = raw.data.unwrap_or(Value::Null);
            T::deserialize(data)
                .map(Envelope::Success)
                .map_err(|e| D::Error::custom(format!("invalid envelope data: {e}")))
        } else {
            raw.error
                .map(Envelope::Failure)
                .ok_or_else(|| D::Error::missing_field("error"))
        }
    }
}

impl<T> Envelope<T> {
    pub fn is_success(&self) -> bool {
        matches!(self, Envelope::Success(_))
    }

    pub fn into_result(self) -> Result<T, ErrorBody> {
        match self {
            Envelope::Success(data) => Ok(data),
            Envelope::Failure(error) => Err(error),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn success_decodes_data() {
        let env: Envelope<Vec<u32>> = serde_json::from_str(r#"{"success":true,"data":[1,2]}"#).unwrap();
        assert_eq!(env, Envelope::Success(vec![1, 2]));
    }

    #[test]
    fn success_without_data_reads_as_null() {
        let env: Envelope<()> = serde_json::from_str(r#"{"success":true}"#).unwrap();
        assert!(env.is_success());
        let env: Envelope<Option<String>> = serde_json::from_str(r#"{"success":true,"data":null}"#).unwrap();
        assert_eq!(env, Envelope::Success(None));
    }

    #[test]
    fn failure_keeps_message_and_details() {
        let env: Envelope<Value> = serde_json::from_str(
            r#"{"success":false,"error":{"message":"Invalid amount","details":{"field":"amount"}}}"#,
        )
        .unwrap();
        let err = env.into_result().unwrap_err();
        assert_eq!(err.message, "Invalid amount");
        assert_eq!(err.details, Some(json!({"field": "amount"})));
    }

    #[test]
    fn failure_does_not_decode_data() {
        let env: Envelope<u32> =
            serde_json::from_str(r#"{"success":false,"data":"oops","error":{"message":"no"}}"#).unwrap();
        assert!(!env.is_success());
    }

    #[test]
    fn failure_without_error_is_rejected() {
        let res: Result<Envelope<Value>, _> = serde_json::from_str(r#"{"success":false}"#);
        assert!(res.is_err());
    }

    #[test]
    fn missing_discriminant_is_rejected() {
        let res: Result<Envelope<Value>, _> = serde_json::from_str(r#"{"detail":"Not Found"}"#);
        assert!(res.is_err());
    }

    #[test]
    fn data_of_wrong_shape_is_rejected() {
        let res: Result<Envelope<u32>, _> = serde_json::from_str(r#"{"success":true,"data":"x"}"#);
        let err = res.unwrap_err();
        assert!(err.to_string().contains("invalid envelope data"));
    }
}
