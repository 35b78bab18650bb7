use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Response represents a decoded HTTP response: status code and JSON body.
/// An empty body decodes to `Value::Null`, a body that is not JSON to
/// `Value::String` holding its text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Response {
    /// HTTP status code
    pub status_code: u16,

    /// Decoded response body
    #[serde(default)]
    pub body: Value,

    /// X-Request-Id header from HTTP response (not serialized)
    #[serde(skip)]
    pub request_id: Option<String>,
}

impl Response {
    /// Create a new Response
    pub fn new(status_code: u16, body: Value) -> Self {
        Response {
            status_code,
            body,
            request_id: None,
        }
    }
}
