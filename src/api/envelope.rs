//! Decoding of the backend's `{success, data, detail, message}` envelope.
//!
//! Kept free of any HTTP client so the classification rules can be tested
//! against raw status codes and bodies.

use serde::{Deserialize, de::DeserializeOwned};
use serde_json::{Map, Value};

use crate::api::ApiError;

/// A decoded 2xx response that reported success.
#[derive(Debug, Deserialize)]
pub(crate) struct Envelope<T> {
    #[serde(default)]
    success: bool,
    data: Option<T>,
    #[serde(default)]
    detail: Option<Value>,
    #[serde(default)]
    message: Option<String>,
    #[serde(flatten)]
    extra: Map<String, Value>,
}

impl<T> Envelope<T> {
    /// The payload, if the backend sent one.
    pub(crate) fn into_data(self) -> Option<T> {
        self.data
    }

    /// An identifier the backend returned alongside the payload, such as
    /// `request_id` after a create.
    pub(crate) fn id(&self, key: &str) -> Option<u64> {
        self.extra.get(key).and_then(Value::as_u64)
    }

    fn failure_detail(&self) -> Option<String> {
        describe(self.detail.as_ref(), self.message.as_deref())
    }
}

#[derive(Debug, Deserialize)]
struct Failure {
    #[serde(default)]
    detail: Option<Value>,
    #[serde(default)]
    message: Option<String>,
}

/// Classifies a raw response.
///
/// A non-2xx status becomes [`ApiError::Status`], carrying the body's
/// `detail` or `message` when there is one. A 2xx body that fails to decode
/// is [`ApiError::Malformed`], and one with `success` unset or false is
/// [`ApiError::Rejected`].
pub(crate) fn interpret<T: DeserializeOwned>(
    status: u16,
    body: &[u8],
) -> Result<Envelope<T>, ApiError> {
    if !(200..300).contains(&status) {
        let detail = serde_json::from_slice::<Failure>(body)
            .ok()
            .and_then(|failure| describe(failure.detail.as_ref(), failure.message.as_deref()));
        return Err(match detail {
            Some(detail) => ApiError::Status {
                status,
                detail,
                from_body: true,
            },
            None => ApiError::Status {
                status,
                detail: format!("Request failed with status {status}"),
                from_body: false,
            },
        });
    }

    let envelope: Envelope<T> =
        serde_json::from_slice(body).map_err(|e| ApiError::Malformed(e.to_string()))?;
    if !envelope.success {
        return Err(ApiError::Rejected {
            detail: envelope
                .failure_detail()
                .unwrap_or_else(|| "The backend reported a failure".to_string()),
        });
    }
    Ok(envelope)
}

/// `detail` may be a plain string or, for schema violations, a list of
/// `{msg, ...}` objects.
fn describe(detail: Option<&Value>, message: Option<&str>) -> Option<String> {
    let from_detail = match detail {
        Some(Value::String(text)) => Some(text.trim().to_string()),
        Some(Value::Array(items)) => {
            let messages: Vec<&str> = items
                .iter()
                .filter_map(|item| item.get("msg").and_then(Value::as_str).or_else(|| item.as_str()))
                .collect();
            Some(messages.join("; "))
        }
        _ => None,
    };
    from_detail
        .filter(|text| !text.is_empty())
        .or_else(|| message.map(|m| m.trim().to_string()))
        .filter(|text| !text.is_empty())
}
