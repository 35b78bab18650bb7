//! Resource metadata and its validation
//!
//! A [`ResourceMeta`] is the raw declaration of a resource type, either
//! built in code or deserialized from JSON. [`ResourceMeta::validate`]
//! checks it once and produces the immutable [`ResourceDescriptor`] that
//! binding, URL derivation and hypermedia resolution read from.

use crate::endpoint::{Endpoint, EndpointHook, UrlContext, UrlTarget};
use crate::error::{RestError, Result};
use crate::naming::pluralize;
use crate::response::Response;
use crate::transport::Headers;
use crate::verb::Verb;
use indexmap::IndexSet;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use url::Url;

/// Status code accepted when a resource declares none
pub const DEFAULT_STATUS_CODE: u16 = 200;

/// Whether a resource type carries hypermedia links
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceKind {
    #[default]
    Plain,
    Hypermedia,
}

/// Raw resource declaration, prior to validation
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ResourceMeta {
    /// Singular name of the resource type
    pub name: Option<String>,
    /// Collection path segment; defaults to the lowercased pluralized name
    pub resource_name: Option<String>,
    /// Attribute holding the resource's unique key
    pub identifier: Option<String>,
    /// Whitelist of payload keys copied onto instances
    pub attributes: Option<Vec<String>>,
    /// Status codes treated as success
    pub valid_status_codes: Option<Vec<u16>>,
    /// Verbs the client exposes for this resource
    pub methods: Option<Vec<String>>,
    /// Payload key holding a list of sub-payloads
    pub pagination_key: Option<String>,
    #[serde(default)]
    pub kind: ResourceKind,
    /// Required for hypermedia resources, optional override otherwise
    pub base_url: Option<String>,
    /// Names of resource types that may be linked from this one
    pub related_resources: Option<Vec<String>>,
    #[serde(skip)]
    pub endpoint: Option<EndpointHook>,
}

impl ResourceMeta {
    /// Start a declaration for the named resource type
    pub fn new(name: impl Into<String>) -> Self {
        ResourceMeta {
            name: Some(name.into()),
            ..Default::default()
        }
    }

    pub fn resource_name(mut self, resource_name: impl Into<String>) -> Self {
        self.resource_name = Some(resource_name.into());
        self
    }

    pub fn identifier(mut self, identifier: impl Into<String>) -> Self {
        self.identifier = Some(identifier.into());
        self
    }

    pub fn attributes<I, S>(mut self, attributes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.attributes = Some(attributes.into_iter().map(Into::into).collect());
        self
    }

    pub fn valid_status_codes<I: IntoIterator<Item = u16>>(mut self, codes: I) -> Self {
        self.valid_status_codes = Some(codes.into_iter().collect());
        self
    }

    pub fn methods<I, S>(mut self, methods: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.methods = Some(methods.into_iter().map(Into::into).collect());
        self
    }

    pub fn pagination_key(mut self, key: impl Into<String>) -> Self {
        self.pagination_key = Some(key.into());
        self
    }

    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    /// Mark the resource as hypermedia-capable, rooted at `base_url`
    pub fn hypermedia(mut self, base_url: impl Into<String>) -> Self {
        self.kind = ResourceKind::Hypermedia;
        self.base_url = Some(base_url.into());
        self
    }

    pub fn related_resources<I, S>(mut self, related: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.related_resources = Some(related.into_iter().map(Into::into).collect());
        self
    }

    /// Replace the default URL derivation and headers for this resource
    pub fn endpoint<E: Endpoint + 'static>(mut self, endpoint: E) -> Self {
        self.endpoint = Some(EndpointHook::new(endpoint));
        self
    }

    /// Validate the declaration and apply defaults
    pub fn validate(self) -> Result<ResourceDescriptor> {
        let name = non_empty(self.name).ok_or_else(|| RestError::missing("<unnamed>", "name"))?;
        let identifier =
            non_empty(self.identifier).ok_or_else(|| RestError::missing(&name, "identifier"))?;

        let attributes: IndexSet<String> = self
            .attributes
            .unwrap_or_default()
            .into_iter()
            .filter(|a| !a.is_empty())
            .collect();
        if attributes.is_empty() {
            return Err(RestError::missing(&name, "attributes"));
        }
        if !attributes.contains(&identifier) {
            tracing::warn!(
                resource = %name,
                identifier = %identifier,
                "identifier is not a whitelisted attribute, instances will not be addressable"
            );
        }

        // Derived path segments are lowercase, declared ones are kept as written
        let resource_name =
            non_empty(self.resource_name).unwrap_or_else(|| pluralize(&name).to_lowercase());

        let valid_status_codes: BTreeSet<u16> = match self.valid_status_codes {
            Some(codes) if !codes.is_empty() => codes.into_iter().collect(),
            _ => BTreeSet::from([DEFAULT_STATUS_CODE]),
        };

        let methods = self
            .methods
            .unwrap_or_default()
            .iter()
            .map(|m| m.parse::<Verb>())
            .collect::<Result<IndexSet<Verb>>>()?;

        let base_url = non_empty(self.base_url);
        if let Some(ref base_url) = base_url {
            Url::parse(base_url)?;
        }

        let related_resources = match self.kind {
            ResourceKind::Hypermedia => {
                if base_url.is_none() {
                    return Err(RestError::missing(&name, "base_url"));
                }
                let related = self.related_resources.unwrap_or_else(|| {
                    tracing::warn!(
                        resource = %name,
                        "hypermedia resource declares no related_resources, no links will be resolved"
                    );
                    Vec::new()
                });
                check_related(&name, &related)?;
                related
            }
            ResourceKind::Plain => {
                if self.related_resources.is_some_and(|r| !r.is_empty()) {
                    return Err(RestError::config(format!(
                        "{} declares related_resources but is not a hypermedia resource",
                        name
                    )));
                }
                Vec::new()
            }
        };

        Ok(ResourceDescriptor {
            name,
            resource_name,
            identifier,
            attributes,
            valid_status_codes,
            methods,
            pagination_key: non_empty(self.pagination_key),
            kind: self.kind,
            base_url,
            related_resources,
            endpoint: self.endpoint.unwrap_or_default(),
        })
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// Reject related types that would claim the same attribute name
fn check_related(name: &str, related: &[String]) -> Result<()> {
    let mut seen = BTreeSet::new();
    for r in related {
        if r.is_empty() {
            return Err(RestError::config(format!("{} declares an empty related resource", name)));
        }
        if !seen.insert(r.to_lowercase()) {
            return Err(RestError::config(format!(
                "{} declares related resource `{}` more than once (names match case-insensitively)",
                name, r
            )));
        }
    }
    Ok(())
}

/// Validated, immutable description of one resource type
#[derive(Debug, Clone)]
pub struct ResourceDescriptor {
    name: String,
    resource_name: String,
    identifier: String,
    attributes: IndexSet<String>,
    valid_status_codes: BTreeSet<u16>,
    methods: IndexSet<Verb>,
    pagination_key: Option<String>,
    kind: ResourceKind,
    base_url: Option<String>,
    related_resources: Vec<String>,
    endpoint: EndpointHook,
}

impl ResourceDescriptor {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn resource_name(&self) -> &str {
        &self.resource_name
    }

    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    pub fn attributes(&self) -> &IndexSet<String> {
        &self.attributes
    }

    pub fn valid_status_codes(&self) -> &BTreeSet<u16> {
        &self.valid_status_codes
    }

    pub fn methods(&self) -> &IndexSet<Verb> {
        &self.methods
    }

    pub fn pagination_key(&self) -> Option<&str> {
        self.pagination_key.as_deref()
    }

    pub fn kind(&self) -> ResourceKind {
        self.kind
    }

    pub fn is_hypermedia(&self) -> bool {
        self.kind == ResourceKind::Hypermedia
    }

    pub fn base_url(&self) -> Option<&str> {
        self.base_url.as_deref()
    }

    pub fn related_resources(&self) -> &[String] {
        &self.related_resources
    }

    /// Whether the client exposes `verb` for this resource
    pub fn supports(&self, verb: Verb) -> bool {
        self.methods.contains(&verb)
    }

    /// Name of the hypermedia accessor that fetches this resource type
    pub fn accessor_name(&self) -> String {
        format!("get_{}", self.name.to_lowercase())
    }

    /// Derive the URL for `target` and `verb`.
    ///
    /// The resource's own `base_url` takes precedence over `fallback_base`.
    pub fn url_for(&self, fallback_base: &str, target: UrlTarget<'_>, verb: Verb) -> Result<String> {
        let ctx = UrlContext {
            base_url: self.base_url.as_deref().unwrap_or(fallback_base),
            descriptor: self,
            target,
            verb,
        };
        self.endpoint.endpoint().url(&ctx)
    }

    /// Default request headers for this resource
    pub fn headers(&self) -> Headers {
        self.endpoint.endpoint().headers(self)
    }

    pub fn accepts_status(&self, status: u16) -> bool {
        self.valid_status_codes.contains(&status)
    }

    /// Fail with `UnexpectedStatus` unless the response status is valid
    pub fn check_status(&self, response: &Response, url: &str) -> Result<()> {
        if self.accepts_status(response.status_code) {
            return Ok(());
        }
        Err(RestError::UnexpectedStatus {
            resource: self.name.clone(),
            status: response.status_code,
            expected: self.valid_status_codes.iter().copied().collect(),
            url: url.to_string(),
        })
    }
}
