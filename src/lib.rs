//! # hyperres - declarative REST resources for Rust
//!
//! Describe each resource of a remote REST API once, as a validated
//! descriptor, and get working resource objects and client operations from
//! it. Payloads are bound onto instances through an attribute whitelist,
//! URLs are derived RESTfully (or by a per-resource override), and
//! hypermedia resources expose accessors that follow links to related
//! resources.
//!
//! ## Features
//!
//! - Descriptor validation and defaulting at registration time
//! - Whitelisted attribute binding with values kept exactly as decoded
//! - RESTful URL derivation with an [`Endpoint`] override hook
//! - Lazy hypermedia accessors (`get_designer`) between resource types
//! - A registration table of per-verb operations (`get_person`, `list_people`)
//! - A blocking reqwest transport, pluggable through the [`Transport`] trait
//!
//! ## Basic Usage
//!
//! ```no_run
//! use hyperres::{Config, ResourceMeta, ResourceRegistry, RestClient};
//! use std::sync::Arc;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut registry = ResourceRegistry::new();
//!     registry.register(
//!         ResourceMeta::new("Person")
//!             .resource_name("people")
//!             .identifier("url")
//!             .attributes(["name", "height", "url"])
//!             .methods(["get", "list"]),
//!     )?;
//!
//!     let client = RestClient::new(Config::new("https://swapi.dev/api"), Arc::new(registry))?;
//!
//!     let luke = client.get("Person", "1")?;
//!     println!("{}", luke.attr("name")?);
//!     Ok(())
//! }
//! ```
//!
//! ## Hypermedia
//!
//! ```
//! use hyperres::{ResourceMeta, ResourceRegistry};
//! use serde_json::json;
//!
//! let mut registry = ResourceRegistry::new();
//! registry.register(ResourceMeta::new("Designer").identifier("slug").attributes(["slug", "name"]))?;
//! registry.register(
//!     ResourceMeta::new("Product")
//!         .identifier("id")
//!         .attributes(["id", "designer"])
//!         .hypermedia("http://shop.test")
//!         .related_resources(["Designer"]),
//! )?;
//!
//! let product = registry.instantiate_named("Product", &json!({"id": 1, "designer": "eames"}))?;
//! assert_eq!(product.accessors().collect::<Vec<_>>(), vec!["get_designer"]);
//! # Ok::<(), hyperres::RestError>(())
//! ```

pub mod auth;
pub mod client;
pub mod descriptor;
pub mod endpoint;
pub mod error;
pub mod hypermedia;
pub mod naming;
pub mod registry;
pub mod resource;
pub mod response;
pub mod rest;
pub mod transport;
pub mod verb;

// Re-export main types for convenience
pub use auth::Credentials;
pub use client::Config;
pub use descriptor::{ResourceDescriptor, ResourceKind, ResourceMeta};
pub use endpoint::{Endpoint, Restful, UrlContext, UrlTarget};
pub use error::{RestError, Result};
pub use hypermedia::HypermediaLink;
pub use naming::pluralize;
pub use registry::{MethodTable, Operation, ResourceRegistry};
pub use resource::{bind, Resource};
pub use response::Response;
pub use rest::{Call, HttpTransport, Outcome, RestClient};
pub use transport::{Headers, Request, Transport};
pub use verb::Verb;

// Re-export serde_json for convenience
pub use serde_json::json;
