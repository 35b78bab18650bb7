//! Hypermedia links between resources
//!
//! A hypermedia resource declares the resource types it may link to. After
//! an instance is bound, every attribute whose key equals a related type's
//! name (case-insensitive) and holds a string or number becomes a
//! [`HypermediaLink`], exposed as an accessor named `get_<name>`.
//!
//! Accessors are lazy: nothing is requested until [`follow`] or
//! [`HypermediaLink::fetch`] is called, and every call is a fresh request.

use crate::descriptor::ResourceDescriptor;
use crate::endpoint::UrlTarget;
use crate::error::{RestError, Result};
use crate::registry::ResourceRegistry;
use crate::resource::Resource;
use crate::transport::{Request, Transport};
use crate::verb::Verb;
use serde_json::Value;
use std::sync::Arc;

/// A reference from one bound attribute to another resource
#[derive(Debug, Clone)]
pub struct HypermediaLink {
    attribute: String,
    accessor: String,
    target: Arc<ResourceDescriptor>,
    uid: String,
    base_url: String,
}

impl HypermediaLink {
    /// Attribute the link was found in
    pub fn attribute(&self) -> &str {
        &self.attribute
    }

    /// Accessor name, e.g. `get_designer`
    pub fn accessor(&self) -> &str {
        &self.accessor
    }

    pub fn target(&self) -> &Arc<ResourceDescriptor> {
        &self.target
    }

    /// Identifier value detected in the payload
    pub fn uid(&self) -> &str {
        &self.uid
    }

    /// URL the accessor requests for `uid`, or the detected identifier
    pub fn url(&self, uid: Option<&str>) -> Result<String> {
        let uid = uid.unwrap_or(&self.uid);
        self.target.url_for(&self.base_url, UrlTarget::Uid(uid), Verb::Get)
    }

    /// Request the linked resource and bind the response.
    ///
    /// Fails with `UnexpectedStatus` when the response status is not valid
    /// for the target resource type.
    pub fn fetch<T>(&self, transport: &T, registry: &ResourceRegistry, uid: Option<&str>) -> Result<Resource>
    where
        T: Transport + ?Sized,
    {
        let url = self.url(uid)?;
        let request = Request::new(Verb::Get, url).with_headers(self.target.headers());

        tracing::debug!(
            accessor = %self.accessor,
            url = %request.url,
            "following hypermedia link"
        );

        let response = transport.execute(&request)?;
        self.target.check_status(&response, &request.url)?;
        registry.instantiate(&self.target, &response.body)
    }
}

/// Detect the links of a bound instance.
///
/// Returns an empty list for non-hypermedia resources. Fails with
/// `ConfigurationError` when a related type is not registered or when two
/// payload fields match the same related type. Related names are unique
/// ignoring case, so a field never matches two related types.
pub fn detect_links(resource: &Resource, registry: &ResourceRegistry) -> Result<Vec<HypermediaLink>> {
    let descriptor = resource.descriptor();
    if !descriptor.is_hypermedia() {
        return Ok(Vec::new());
    }
    let base_url = descriptor.base_url().ok_or_else(|| {
        RestError::missing(descriptor.name(), "base_url")
    })?;

    let mut links = Vec::new();

    for related in descriptor.related_resources() {
        let target = registry.descriptor(related)?;

        let mut matches = resource
            .attributes()
            .iter()
            .filter(|(key, _)| key.eq_ignore_ascii_case(target.name()));

        let Some((key, value)) = matches.next() else {
            continue;
        };
        if let Some((other, _)) = matches.next() {
            return Err(RestError::config(format!(
                "{} fields `{}` and `{}` both match related resource {}",
                descriptor.name(),
                key,
                other,
                target.name()
            )));
        }

        match link_uid(value) {
            Some(uid) => links.push(HypermediaLink {
                attribute: key.clone(),
                accessor: target.accessor_name(),
                target: Arc::clone(target),
                uid,
                base_url: base_url.to_string(),
            }),
            None => tracing::debug!(
                resource = %descriptor.name(),
                field = %key,
                "field value is not a link identifier, skipping"
            ),
        }
    }

    Ok(links)
}

/// Invoke an accessor on a bound instance.
///
/// `accessor` is either the accessor name (`get_designer`) or the attribute
/// the link was found in (`designer`). An explicit `uid` replaces the
/// detected identifier.
pub fn follow<T>(
    resource: &Resource,
    accessor: &str,
    uid: Option<&str>,
    transport: &T,
    registry: &ResourceRegistry,
) -> Result<Resource>
where
    T: Transport + ?Sized,
{
    let link = resource.link(accessor).ok_or_else(|| {
        RestError::invalid(format!(
            "{} has no accessor `{}`",
            resource.resource_type(),
            accessor
        ))
    })?;
    link.fetch(transport, registry, uid)
}

fn link_uid(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}
