//! URL derivation for resource types and instances
//!
//! The default layout is RESTful: collection verbs address
//! `{base_url}/{resource_name}` and single-entity verbs address
//! `{base_url}/{resource_name}/{identifier}/`. A resource type can replace
//! this entirely by registering its own [`Endpoint`].

use crate::descriptor::ResourceDescriptor;
use crate::error::{RestError, Result};
use crate::resource::Resource;
use crate::transport::Headers;
use crate::verb::Verb;
use std::fmt;
use std::sync::Arc;
use url::Url;

/// What a URL is being derived for
#[derive(Debug, Clone, Copy)]
pub enum UrlTarget<'a> {
    /// The resource collection
    Collection,
    /// A bound instance; its identifier attribute supplies the uid
    Instance(&'a Resource),
    /// An explicit identifier value
    Uid(&'a str),
}

/// Everything an [`Endpoint`] needs to build a URL
#[derive(Debug, Clone, Copy)]
pub struct UrlContext<'a> {
    pub base_url: &'a str,
    pub descriptor: &'a ResourceDescriptor,
    pub target: UrlTarget<'a>,
    pub verb: Verb,
}

/// Per-resource override point for URLs and request headers.
///
/// Implementors that override [`Endpoint::url`] bypass the default
/// derivation completely, suffix rules included.
pub trait Endpoint: Send + Sync {
    fn url(&self, ctx: &UrlContext<'_>) -> Result<String> {
        restful_url(ctx)
    }

    /// Headers added to every request for this resource type
    fn headers(&self, _descriptor: &ResourceDescriptor) -> Headers {
        let mut headers = Headers::new();
        headers.insert("Accept".to_string(), "application/json".to_string());
        headers
    }
}

/// The default RESTful endpoint
#[derive(Debug, Clone, Copy, Default)]
pub struct Restful;

impl Endpoint for Restful {}

/// Shared handle to a resource's [`Endpoint`]
#[derive(Clone)]
pub struct EndpointHook(Arc<dyn Endpoint>);

impl EndpointHook {
    pub fn new<E: Endpoint + 'static>(endpoint: E) -> Self {
        EndpointHook(Arc::new(endpoint))
    }

    pub fn endpoint(&self) -> &dyn Endpoint {
        self.0.as_ref()
    }
}

impl Default for EndpointHook {
    fn default() -> Self {
        EndpointHook::new(Restful)
    }
}

impl fmt::Debug for EndpointHook {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("EndpointHook(..)")
    }
}

/// Default URL derivation
pub fn restful_url(ctx: &UrlContext<'_>) -> Result<String> {
    let base = format!(
        "{}/{}",
        ctx.base_url.trim_end_matches('/'),
        ctx.descriptor.resource_name()
    );

    if !ctx.verb.requires_identifier() {
        return Ok(base);
    }

    let uid = match ctx.target {
        UrlTarget::Collection => {
            return Err(RestError::invalid(format!(
                "{} on {} requires an identifier",
                ctx.verb,
                ctx.descriptor.name()
            )))
        }
        UrlTarget::Uid(uid) => uid.to_string(),
        UrlTarget::Instance(resource) => resource.uid()?,
    };

    // Hypermedia identifiers may already be complete URLs
    if let Some(absolute) = absolute_url(&uid) {
        return same_origin(ctx, absolute);
    }

    let uid = uid.trim_matches('/');
    if uid.is_empty() || uid == "." || uid == ".." {
        return Err(RestError::invalid(format!(
            "{} on {} requires a non-empty identifier, got `{}`",
            ctx.verb,
            ctx.descriptor.name(),
            uid
        )));
    }

    // The identifier is one path segment, reserved characters included
    let mut url = Url::parse(&base)?;
    url.path_segments_mut()
        .map_err(|_| RestError::invalid(format!("{} cannot be used as a base URL", base)))?
        .push(uid)
        .push("");
    Ok(url.into())
}

fn absolute_url(uid: &str) -> Option<Url> {
    Url::parse(uid)
        .ok()
        .filter(|u| matches!(u.scheme(), "http" | "https"))
}

/// Accept an absolute identifier only when it points at the resource's own API
fn same_origin(ctx: &UrlContext<'_>, absolute: Url) -> Result<String> {
    let base = Url::parse(ctx.base_url)?;
    if absolute.origin() != base.origin() {
        return Err(RestError::invalid(format!(
            "identifier {} for {} is outside {}",
            absolute,
            ctx.descriptor.name(),
            ctx.base_url
        )));
    }
    Ok(absolute.into())
}
