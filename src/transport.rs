use crate::error::Result;
use crate::response::Response;
use crate::verb::Verb;
use indexmap::IndexMap;
use serde_json::Value;

/// Request headers, in insertion order
pub type Headers = IndexMap<String, String>;

/// Header carrying the per-request correlation id
pub const REQUEST_ID_HEADER: &str = "X-Request-Id";

/// A request for the transport to execute
#[derive(Debug, Clone, PartialEq)]
pub struct Request {
    pub verb: Verb,
    pub url: String,
    pub headers: Headers,
    pub body: Option<Value>,
}

impl Request {
    pub fn new(verb: Verb, url: impl Into<String>) -> Self {
        Request {
            verb,
            url: url.into(),
            headers: Headers::new(),
            body: None,
        }
    }

    pub fn with_headers(mut self, headers: Headers) -> Self {
        self.headers.extend(headers);
        self
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    pub fn with_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    /// HTTP method name, e.g. `GET`
    pub fn method(&self) -> &'static str {
        self.verb.http_method()
    }

    /// Case-insensitive header lookup
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// Executes requests on behalf of the resource layer.
///
/// Implementations block until a response is available. Status codes are
/// not interpreted here; the caller checks them against the resource's
/// valid status codes.
pub trait Transport {
    fn execute(&self, request: &Request) -> Result<Response>;
}

impl<T: Transport + ?Sized> Transport for &T {
    fn execute(&self, request: &Request) -> Result<Response> {
        (**self).execute(request)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_builder() {
        let request = Request::new(Verb::Patch, "http://api.test/people/1/")
            .with_header("Accept", "application/json")
            .with_body(serde_json::json!({"age": 19}));

        assert_eq!(request.method(), "PATCH");
        assert_eq!(request.header("accept"), Some("application/json"));
        assert_eq!(request.header(REQUEST_ID_HEADER), None);
        assert!(request.body.is_some());
    }
}
