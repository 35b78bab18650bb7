use crate::auth::Credentials;
use crate::client::{create_rest_client, Config};
use crate::descriptor::ResourceDescriptor;
use crate::endpoint::UrlTarget;
use crate::error::{RestError, Result};
use crate::hypermedia;
use crate::registry::{MethodTable, ResourceRegistry};
use crate::resource::Resource;
use crate::response::Response;
use crate::transport::{Request, Transport, REQUEST_ID_HEADER};
use crate::verb::Verb;
use reqwest::blocking::Client;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use reqwest::Method;
use serde_json::Value;
use std::sync::Arc;
use std::time::Instant;
use url::Url;
use uuid::Uuid;

/// Maximum length of response body to log
const MAX_LOG_BODY_LENGTH: usize = 200;

/// Truncate a response body and strip control characters for logging
fn sanitize_for_log(body: &str) -> String {
    let truncated = if body.len() > MAX_LOG_BODY_LENGTH {
        let mut end = MAX_LOG_BODY_LENGTH;
        while !body.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}... [truncated, {} bytes total]", &body[..end], body.len())
    } else {
        body.to_string()
    };

    truncated.replace(|c: char| c.is_control(), "")
}

/// Blocking HTTP transport backed by reqwest
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
    config: Config,
    credentials: Option<Credentials>,
}

impl HttpTransport {
    /// Create a transport for the given configuration
    pub fn new(config: Config) -> Result<Self> {
        config.parsed_base_url()?;
        Ok(HttpTransport {
            client: create_rest_client(&config)?,
            config,
            credentials: None,
        })
    }

    /// Set the credentials sent with every request
    pub fn with_credentials(mut self, credentials: Credentials) -> Self {
        self.credentials = Some(credentials);
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }
}

impl Transport for HttpTransport {
    fn execute(&self, request: &Request) -> Result<Response> {
        let method = Method::from_bytes(request.method().as_bytes())
            .map_err(|_| RestError::RequestBuild(format!("Invalid HTTP method: {}", request.method())))?;
        let url = Url::parse(&request.url)?;

        let request_id = request
            .header(REQUEST_ID_HEADER)
            .map(|id| id.to_string())
            .unwrap_or_else(|| Uuid::new_v4().to_string());

        let mut builder = self.client.request(method, url);

        for (name, value) in &self.config.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(ref credentials) = self.credentials {
            builder = builder.header(AUTHORIZATION, credentials.header_value());
        }
        for (name, value) in &request.headers {
            if !name.eq_ignore_ascii_case(REQUEST_ID_HEADER) {
                builder = builder.header(name.as_str(), value.as_str());
            }
        }
        builder = builder.header(REQUEST_ID_HEADER, request_id.as_str());

        if let Some(ref body) = request.body {
            builder = builder
                .header(CONTENT_TYPE, "application/json")
                .body(serde_json::to_vec(body)?);
        }

        // Execute request
        let start = Instant::now();
        let http_response = builder.send()?;
        let status = http_response.status();

        let request_id = http_response
            .headers()
            .get(REQUEST_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(|s| s.to_string())
            .unwrap_or(request_id);

        let bytes = http_response.bytes()?;
        let elapsed = start.elapsed();

        if self.config.debug {
            tracing::info!(method = request.method(), url = %request.url, status = status.as_u16(), ?elapsed, request_id = %request_id, "request");
        } else {
            tracing::debug!(method = request.method(), url = %request.url, status = status.as_u16(), ?elapsed, request_id = %request_id, "request");
        }

        if !status.is_success() {
            tracing::error!(
                "API error: {} - {}",
                status,
                sanitize_for_log(&String::from_utf8_lossy(&bytes))
            );
        }

        Ok(Response {
            status_code: status.as_u16(),
            body: decode_body(&bytes),
            request_id: Some(request_id),
        })
    }
}

/// Decode a response body, keeping non-JSON text as a string value.
///
/// Whether the response is an error is decided by the resource's status
/// check, never by the shape of the body.
fn decode_body(bytes: &[u8]) -> Value {
    if bytes.is_empty() {
        return Value::Null;
    }
    match serde_json::from_slice(bytes) {
        Ok(body) => body,
        Err(e) => {
            tracing::debug!(error = %e, "response body is not JSON, keeping raw text");
            Value::String(String::from_utf8_lossy(bytes).into_owned())
        }
    }
}

/// Arguments for [`RestClient::invoke`]
#[derive(Debug, Clone, Default)]
pub struct Call {
    pub uid: Option<String>,
    pub body: Option<Value>,
}

impl Call {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn uid(mut self, uid: impl Into<String>) -> Self {
        self.uid = Some(uid.into());
        self
    }

    pub fn body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }
}

/// Result of a dispatched operation
#[derive(Debug, Clone)]
pub enum Outcome {
    One(Resource),
    Many(Vec<Resource>),
    Empty,
}

impl Outcome {
    pub fn into_one(self) -> Option<Resource> {
        match self {
            Outcome::One(resource) => Some(resource),
            _ => None,
        }
    }

    pub fn into_many(self) -> Vec<Resource> {
        match self {
            Outcome::One(resource) => vec![resource],
            Outcome::Many(resources) => resources,
            Outcome::Empty => Vec::new(),
        }
    }
}

/// Client dispatching resource operations over a transport
pub struct RestClient<T: Transport = HttpTransport> {
    transport: T,
    base_url: String,
    registry: Arc<ResourceRegistry>,
    methods: MethodTable,
}

impl RestClient<HttpTransport> {
    /// Create an HTTP client for the registered resources
    pub fn new(config: Config, registry: Arc<ResourceRegistry>) -> Result<Self> {
        let base_url = config.base_url().to_string();
        Self::with_transport(HttpTransport::new(config)?, base_url, registry)
    }

    /// Set the credentials sent with every request
    pub fn with_credentials(mut self, credentials: Credentials) -> Self {
        self.transport = self.transport.with_credentials(credentials);
        self
    }
}

impl<T: Transport> RestClient<T> {
    /// Create a client over any transport.
    ///
    /// Fails when a related resource is not registered or two resources
    /// produce the same operation name.
    pub fn with_transport(transport: T, base_url: impl Into<String>, registry: Arc<ResourceRegistry>) -> Result<Self> {
        registry.check_links()?;
        let methods = registry.method_table()?;
        Ok(RestClient {
            transport,
            base_url: base_url.into(),
            registry,
            methods,
        })
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn registry(&self) -> &Arc<ResourceRegistry> {
        &self.registry
    }

    pub fn methods(&self) -> &MethodTable {
        &self.methods
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Derive the URL of a registered resource
    pub fn url_for(&self, resource: &str, target: UrlTarget<'_>, verb: Verb) -> Result<String> {
        self.registry
            .descriptor(resource)?
            .url_for(&self.base_url, target, verb)
    }

    /// Fetch one entity by identifier
    pub fn get(&self, resource: &str, uid: &str) -> Result<Resource> {
        let descriptor = self.registry.descriptor(resource)?;
        let response = self.send(descriptor, Verb::Get, UrlTarget::Uid(uid), None)?;
        self.registry.instantiate(descriptor, &response.body)
    }

    /// Fetch the collection
    pub fn list(&self, resource: &str) -> Result<Vec<Resource>> {
        let descriptor = self.registry.descriptor(resource)?;
        let response = self.send(descriptor, Verb::List, UrlTarget::Collection, None)?;
        self.registry.instantiate_all(descriptor, &response.body)
    }

    /// Create an entity; returns the bound response body, if any
    pub fn create(&self, resource: &str, body: Value) -> Result<Option<Resource>> {
        let descriptor = self.registry.descriptor(resource)?;
        let response = self.send(descriptor, Verb::Post, UrlTarget::Collection, Some(body))?;
        self.bind_optional(descriptor, &response.body)
    }

    /// Replace an entity with its bound attributes
    pub fn update(&self, resource: &Resource) -> Result<Option<Resource>> {
        let descriptor = resource.descriptor();
        let body = resource.to_value();
        let response = self.send(descriptor, Verb::Put, UrlTarget::Instance(resource), Some(body))?;
        self.bind_optional(descriptor, &response.body)
    }

    /// Partially update an entity
    pub fn patch(&self, resource: &Resource, body: Value) -> Result<Option<Resource>> {
        let descriptor = resource.descriptor();
        let response = self.send(descriptor, Verb::Patch, UrlTarget::Instance(resource), Some(body))?;
        self.bind_optional(descriptor, &response.body)
    }

    /// Delete an entity
    pub fn delete(&self, resource: &Resource) -> Result<()> {
        self.send(resource.descriptor(), Verb::Delete, UrlTarget::Instance(resource), None)?;
        Ok(())
    }

    /// Invoke a hypermedia accessor, e.g. `get_designer`
    pub fn follow(&self, resource: &Resource, accessor: &str, uid: Option<&str>) -> Result<Resource> {
        hypermedia::follow(resource, accessor, uid, &self.transport, &self.registry)
    }

    /// Dispatch an operation from the method table by name
    pub fn invoke(&self, operation: &str, call: Call) -> Result<Outcome> {
        let op = self
            .methods
            .get(operation)
            .ok_or_else(|| RestError::invalid(format!("unknown operation `{}`", operation)))?;
        let descriptor = self.registry.descriptor(&op.resource)?;

        let target = match call.uid.as_deref() {
            Some(uid) if op.verb.requires_identifier() => UrlTarget::Uid(uid),
            _ => UrlTarget::Collection,
        };
        let response = self.send(descriptor, op.verb, target, call.body)?;

        match op.verb {
            Verb::List => Ok(Outcome::Many(self.registry.instantiate_all(descriptor, &response.body)?)),
            Verb::Get => Ok(Outcome::One(self.registry.instantiate(descriptor, &response.body)?)),
            _ => Ok(self
                .bind_optional(descriptor, &response.body)?
                .map_or(Outcome::Empty, Outcome::One)),
        }
    }

    fn send(
        &self,
        descriptor: &Arc<ResourceDescriptor>,
        verb: Verb,
        target: UrlTarget<'_>,
        body: Option<Value>,
    ) -> Result<Response> {
        if !descriptor.supports(verb) {
            return Err(RestError::invalid(format!(
                "{} does not support `{}`",
                descriptor.name(),
                verb
            )));
        }

        let url = descriptor.url_for(&self.base_url, target, verb)?;
        let mut request = Request::new(verb, url).with_headers(descriptor.headers());
        if let Some(body) = body {
            request = request.with_body(body);
        }

        let response = self.transport.execute(&request)?;
        descriptor.check_status(&response, &request.url)?;
        Ok(response)
    }

    fn bind_optional(&self, descriptor: &Arc<ResourceDescriptor>, body: &Value) -> Result<Option<Resource>> {
        match body {
            Value::Object(_) => Ok(Some(self.registry.instantiate(descriptor, body)?)),
            _ => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::ResourceMeta;

    #[test]
    fn test_sanitize_for_log() {
        assert_eq!(sanitize_for_log("not\nfound"), "notfound");

        let long = "é".repeat(150);
        let sanitized = sanitize_for_log(&long);
        assert!(sanitized.ends_with("[truncated, 300 bytes total]"));
    }

    #[test]
    fn test_decode_body() {
        assert_eq!(decode_body(b""), Value::Null);
        assert_eq!(decode_body(br#"{"id": 1}"#), serde_json::json!({"id": 1}));
        assert_eq!(
            decode_body(b"<html>Not Found</html>"),
            Value::String("<html>Not Found</html>".to_string())
        );
    }

    #[test]
    fn test_non_json_error_body_leaves_status_check_in_charge() {
        let descriptor = ResourceMeta::new("Designer")
            .identifier("slug")
            .attributes(["slug"])
            .validate()
            .unwrap();
        let url = "http://shop.test/designeres/x/";

        let response = Response::new(404, decode_body(b"<html>Not Found</html>"));
        let err = descriptor.check_status(&response, url).unwrap_err();
        assert!(matches!(err, RestError::UnexpectedStatus { status: 404, .. }));

        // A listed status passes even when the body is plain text
        let lenient = ResourceMeta::new("Designer")
            .identifier("slug")
            .attributes(["slug"])
            .valid_status_codes([200, 404])
            .validate()
            .unwrap();
        assert!(lenient.check_status(&response, url).is_ok());
    }

    #[test]
    fn test_rest_client_creation() {
        let mut registry = ResourceRegistry::new();
        registry
            .register(
                ResourceMeta::new("Person")
                    .resource_name("people")
                    .identifier("url")
                    .attributes(["name", "url"])
                    .methods(["get", "list"]),
            )
            .unwrap();

        let client = RestClient::new(Config::new("https://swapi.dev/api/"), Arc::new(registry))
            .unwrap()
            .with_credentials(Credentials::bearer("token"));

        assert_eq!(client.base_url(), "https://swapi.dev/api");
        assert_eq!(client.methods().len(), 2);
        assert_eq!(
            client.url_for("Person", UrlTarget::Uid("1"), Verb::Get).unwrap(),
            "https://swapi.dev/api/people/1/"
        );
    }

    #[test]
    fn test_rest_client_rejects_bad_base_url() {
        let result = RestClient::new(Config::new("swapi"), Arc::new(ResourceRegistry::new()));
        assert!(matches!(result, Err(RestError::UrlParse(_))));
    }
}
