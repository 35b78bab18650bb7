//! Resource registry and the per-verb operation table
//!
//! Resource types are registered once, before any payload is bound. Links
//! between hypermedia resources are resolved against the registry, so every
//! related type must be registered before instances of the linking type are
//! created; [`ResourceRegistry::check_links`] verifies this up front.

use crate::descriptor::{ResourceDescriptor, ResourceMeta};
use crate::error::{RestError, Result};
use crate::hypermedia::detect_links;
use crate::resource::{bind, collection_payloads, Resource};
use crate::verb::Verb;
use indexmap::IndexMap;
use serde_json::Value;
use std::sync::Arc;

/// Registry of validated resource descriptors, keyed by resource name
#[derive(Debug, Default, Clone)]
pub struct ResourceRegistry {
    descriptors: IndexMap<String, Arc<ResourceDescriptor>>,
}

impl ResourceRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a registry from a JSON array of resource declarations
    pub fn from_json_str(json: &str) -> Result<Self> {
        let metas: Vec<ResourceMeta> = serde_json::from_str(json)?;
        let mut registry = Self::new();
        for meta in metas {
            registry.register(meta)?;
        }
        Ok(registry)
    }

    /// Validate and register a resource type
    pub fn register(&mut self, meta: ResourceMeta) -> Result<Arc<ResourceDescriptor>> {
        let descriptor = Arc::new(meta.validate()?);
        let name = descriptor.name().to_string();

        if self.descriptors.contains_key(&name) {
            return Err(RestError::config(format!("resource {} is already registered", name)));
        }

        tracing::debug!(
            resource = %name,
            resource_name = %descriptor.resource_name(),
            hypermedia = descriptor.is_hypermedia(),
            "registered resource"
        );

        self.descriptors.insert(name, Arc::clone(&descriptor));
        Ok(descriptor)
    }

    pub fn get(&self, name: &str) -> Option<&Arc<ResourceDescriptor>> {
        self.descriptors.get(name)
    }

    /// Look up a resource type, failing when it is not registered
    pub fn descriptor(&self, name: &str) -> Result<&Arc<ResourceDescriptor>> {
        self.get(name)
            .ok_or_else(|| RestError::config(format!("resource {} is not registered", name)))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.descriptors.keys().map(|k| k.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<ResourceDescriptor>> {
        self.descriptors.values()
    }

    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }

    /// Verify every declared related resource is registered
    pub fn check_links(&self) -> Result<()> {
        for descriptor in self.descriptors.values() {
            for related in descriptor.related_resources() {
                if !self.descriptors.contains_key(related) {
                    return Err(RestError::config(format!(
                        "{} links to unregistered resource {}",
                        descriptor.name(),
                        related
                    )));
                }
            }
        }
        Ok(())
    }

    /// Bind a payload and resolve its hypermedia links
    pub fn instantiate(&self, descriptor: &Arc<ResourceDescriptor>, payload: &Value) -> Result<Resource> {
        let mut resource = bind(descriptor, payload)?;
        if descriptor.is_hypermedia() {
            let links = detect_links(&resource, self)?;
            resource.set_links(links);
        }
        Ok(resource)
    }

    pub fn instantiate_named(&self, name: &str, payload: &Value) -> Result<Resource> {
        let descriptor = self.descriptor(name)?;
        self.instantiate(descriptor, payload)
    }

    /// Bind every payload of a list response, honouring the pagination key
    pub fn instantiate_all(&self, descriptor: &Arc<ResourceDescriptor>, body: &Value) -> Result<Vec<Resource>> {
        collection_payloads(descriptor, body)?
            .into_iter()
            .map(|payload| self.instantiate(descriptor, payload))
            .collect()
    }

    /// Build the operation table for every declared verb
    pub fn method_table(&self) -> Result<MethodTable> {
        MethodTable::build(self)
    }
}

/// A client operation bound to one resource type and verb
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Operation {
    pub name: String,
    pub resource: String,
    pub verb: Verb,
}

impl Operation {
    pub fn new(descriptor: &ResourceDescriptor, verb: Verb) -> Self {
        let name = match verb {
            Verb::Get => format!("get_{}", descriptor.name().to_lowercase()),
            Verb::List => format!("list_{}", descriptor.resource_name().to_lowercase()),
            Verb::Post => format!("create_{}", descriptor.name().to_lowercase()),
            Verb::Put => format!("update_{}", descriptor.name().to_lowercase()),
            Verb::Patch => format!("patch_{}", descriptor.name().to_lowercase()),
            Verb::Delete => format!("delete_{}", descriptor.name().to_lowercase()),
        };
        Operation {
            name,
            resource: descriptor.name().to_string(),
            verb,
        }
    }
}

/// Table of operations keyed by name, e.g. `get_person` or `list_people`
#[derive(Debug, Default, Clone)]
pub struct MethodTable {
    operations: IndexMap<String, Operation>,
}

impl MethodTable {
    /// Build the table from every registered resource's `methods`.
    ///
    /// Two resources producing the same operation name is a configuration
    /// error.
    pub fn build(registry: &ResourceRegistry) -> Result<Self> {
        let mut operations: IndexMap<String, Operation> = IndexMap::new();
        for descriptor in registry.iter() {
            for verb in descriptor.methods() {
                let operation = Operation::new(descriptor, *verb);
                if let Some(existing) = operations.get(&operation.name) {
                    return Err(RestError::config(format!(
                        "operation {} is declared by both {} and {}",
                        operation.name, existing.resource, operation.resource
                    )));
                }
                operations.insert(operation.name.clone(), operation);
            }
        }
        Ok(MethodTable { operations })
    }

    pub fn get(&self, name: &str) -> Option<&Operation> {
        self.operations.get(name)
    }

    /// Find the operation for a resource and verb
    pub fn find(&self, resource: &str, verb: Verb) -> Option<&Operation> {
        self.operations
            .values()
            .find(|op| op.resource == resource && op.verb == verb)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Operation> {
        self.operations.values()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.operations.keys().map(|k| k.as_str())
    }

    pub fn len(&self) -> usize {
        self.operations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn person() -> ResourceMeta {
        ResourceMeta::new("Person")
            .resource_name("people")
            .identifier("url")
            .attributes(["name", "age", "url"])
            .methods(["get", "list", "post"])
    }

    #[test]
    fn test_new_registry_is_empty() {
        let registry = ResourceRegistry::new();
        assert!(registry.is_empty());
        assert_eq!(registry.names().count(), 0);
    }

    #[test]
    fn test_register_and_lookup() {
        let mut registry = ResourceRegistry::new();
        let descriptor = registry.register(person()).unwrap();

        assert_eq!(registry.len(), 1);
        assert_eq!(descriptor.resource_name(), "people");
        assert!(Arc::ptr_eq(registry.get("Person").unwrap(), &descriptor));
        assert!(registry.descriptor("Planet").unwrap_err().is_configuration());
    }

    #[test]
    fn test_duplicate_registration() {
        let mut registry = ResourceRegistry::new();
        registry.register(person()).unwrap();
        assert!(registry.register(person()).unwrap_err().is_configuration());
    }

    #[test]
    fn test_invalid_meta_not_registered() {
        let mut registry = ResourceRegistry::new();
        let err = registry
            .register(ResourceMeta::new("Planet").identifier("url"))
            .unwrap_err();
        assert!(err.is_missing_attribute());
        assert!(registry.is_empty());
    }

    #[test]
    fn test_check_links() {
        let mut registry = ResourceRegistry::new();
        registry
            .register(
                ResourceMeta::new("Product")
                    .identifier("id")
                    .attributes(["id", "designer"])
                    .hypermedia("http://shop.test")
                    .related_resources(["Designer"]),
            )
            .unwrap();
        assert!(registry.check_links().unwrap_err().is_configuration());

        registry
            .register(ResourceMeta::new("Designer").identifier("slug").attributes(["slug"]))
            .unwrap();
        assert!(registry.check_links().is_ok());
    }

    #[test]
    fn test_from_json_str() {
        let registry = ResourceRegistry::from_json_str(
            r#"[
                {"name": "Person", "resource_name": "people", "identifier": "url",
                 "attributes": ["name", "url"], "methods": ["get"]},
                {"name": "Planet", "identifier": "url", "attributes": ["url", "climate"]}
            ]"#,
        )
        .unwrap();

        assert_eq!(registry.names().collect::<Vec<_>>(), vec!["Person", "Planet"]);

        let err = ResourceRegistry::from_json_str(r#"[{"name": "Person"}]"#).unwrap_err();
        assert!(err.is_missing_attribute());
    }

    #[test]
    fn test_instantiate_all() {
        let mut registry = ResourceRegistry::new();
        let descriptor = registry.register(person().pagination_key("results")).unwrap();

        let people = registry
            .instantiate_all(&descriptor, &json!({"results": [{"name": "luke"}, {"name": "leia"}]}))
            .unwrap();
        assert_eq!(people.len(), 2);
    }

    #[test]
    fn test_method_table() {
        let mut registry = ResourceRegistry::new();
        registry.register(person()).unwrap();
        registry
            .register(ResourceMeta::new("Planet").identifier("url").attributes(["url"]))
            .unwrap();

        let table = registry.method_table().unwrap();
        assert_eq!(
            table.names().collect::<Vec<_>>(),
            vec!["get_person", "list_people", "create_person"]
        );

        let op = table.get("list_people").unwrap();
        assert_eq!(op.resource, "Person");
        assert_eq!(op.verb, Verb::List);
        assert_eq!(table.find("Person", Verb::Post).unwrap().name, "create_person");
        assert!(table.find("Planet", Verb::Get).is_none());
    }

    #[test]
    fn test_method_table_collision() {
        let mut registry = ResourceRegistry::new();
        registry
            .register(ResourceMeta::new("Person").identifier("id").attributes(["id"]).methods(["get"]))
            .unwrap();
        registry
            .register(ResourceMeta::new("person").identifier("id").attributes(["id"]).methods(["get"]))
            .unwrap();

        assert!(registry.method_table().unwrap_err().is_configuration());
    }
}
