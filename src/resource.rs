//! Resource instances and the attribute binder

use crate::descriptor::ResourceDescriptor;
use crate::error::{RestError, Result};
use crate::hypermedia::HypermediaLink;
use indexmap::IndexMap;
use serde::{Serialize, Serializer};
use serde_json::{Map, Value};
use std::sync::Arc;

/// One entity bound from a payload.
///
/// Holds the whitelisted attributes found in the payload, verbatim, and a
/// shared read-only handle to its descriptor.
#[derive(Debug, Clone)]
pub struct Resource {
    descriptor: Arc<ResourceDescriptor>,
    attributes: IndexMap<String, Value>,
    links: Vec<HypermediaLink>,
}

impl Resource {
    pub fn descriptor(&self) -> &Arc<ResourceDescriptor> {
        &self.descriptor
    }

    /// Name of the resource type
    pub fn resource_type(&self) -> &str {
        self.descriptor.name()
    }

    /// Look up a bound attribute
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.attributes.get(name)
    }

    /// Look up a bound attribute, failing when it was never set
    pub fn attr(&self, name: &str) -> Result<&Value> {
        self.attributes.get(name).ok_or_else(|| {
            RestError::invalid(format!(
                "{} has no attribute `{}`",
                self.descriptor.name(),
                name
            ))
        })
    }

    pub fn contains(&self, name: &str) -> bool {
        self.attributes.contains_key(name)
    }

    pub fn attributes(&self) -> &IndexMap<String, Value> {
        &self.attributes
    }

    pub fn len(&self) -> usize {
        self.attributes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty()
    }

    /// Value of the identifier attribute, if bound
    pub fn identifier(&self) -> Option<&Value> {
        self.attributes.get(self.descriptor.identifier())
    }

    /// Identifier rendered for use in a URL
    pub fn uid(&self) -> Result<String> {
        let value = self.identifier().ok_or_else(|| {
            RestError::invalid(format!(
                "{} instance has no identifier `{}` set",
                self.descriptor.name(),
                self.descriptor.identifier()
            ))
        })?;

        match value {
            Value::String(s) => Ok(s.clone()),
            Value::Number(n) => Ok(n.to_string()),
            other => Err(RestError::invalid(format!(
                "{} identifier `{}` is not a string or number: {}",
                self.descriptor.name(),
                self.descriptor.identifier(),
                other
            ))),
        }
    }

    /// Hypermedia links detected on this instance
    pub fn links(&self) -> &[HypermediaLink] {
        &self.links
    }

    /// Names of the accessors available on this instance
    pub fn accessors(&self) -> impl Iterator<Item = &str> {
        self.links.iter().map(|l| l.accessor())
    }

    /// Find a link by accessor name (`get_designer`) or attribute name (`designer`)
    pub fn link(&self, name: &str) -> Option<&HypermediaLink> {
        self.links
            .iter()
            .find(|l| l.accessor() == name)
            .or_else(|| self.links.iter().find(|l| l.attribute() == name))
    }

    pub(crate) fn set_links(&mut self, links: Vec<HypermediaLink>) {
        self.links = links;
    }

    /// Attributes as a JSON object
    pub fn to_value(&self) -> Value {
        Value::Object(
            self.attributes
                .iter()
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect(),
        )
    }

    pub fn into_attributes(self) -> IndexMap<String, Value> {
        self.attributes
    }
}

impl Serialize for Resource {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        self.attributes.serialize(serializer)
    }
}

/// Bind one payload object onto a new instance.
///
/// Only keys listed in the descriptor's attributes are copied; listed keys
/// missing from the payload stay unset.
pub fn bind(descriptor: &Arc<ResourceDescriptor>, payload: &Value) -> Result<Resource> {
    match payload {
        Value::Object(object) => Ok(bind_object(descriptor, object)),
        other => Err(RestError::invalid(format!(
            "{} payload must be a JSON object, got {}",
            descriptor.name(),
            json_type(other)
        ))),
    }
}

pub fn bind_object(descriptor: &Arc<ResourceDescriptor>, object: &Map<String, Value>) -> Resource {
    let attributes = descriptor
        .attributes()
        .iter()
        .filter_map(|name| object.get(name).map(|value| (name.clone(), value.clone())))
        .collect();

    Resource {
        descriptor: Arc::clone(descriptor),
        attributes,
        links: Vec::new(),
    }
}

/// Split a list response into the payloads to bind.
///
/// An array body yields its elements. An object body yields the elements of
/// the array under the descriptor's pagination key when one is declared, or
/// itself otherwise. A null body yields nothing.
pub fn collection_payloads<'a>(
    descriptor: &ResourceDescriptor,
    body: &'a Value,
) -> Result<Vec<&'a Value>> {
    match body {
        Value::Null => Ok(Vec::new()),
        Value::Array(items) => Ok(items.iter().collect()),
        Value::Object(object) => match descriptor.pagination_key() {
            None => Ok(vec![body]),
            Some(key) => match object.get(key) {
                Some(Value::Array(items)) => Ok(items.iter().collect()),
                Some(other) => Err(RestError::invalid(format!(
                    "{} pagination key `{}` holds {}, expected an array",
                    descriptor.name(),
                    key,
                    json_type(other)
                ))),
                None => Err(RestError::invalid(format!(
                    "{} response has no pagination key `{}`",
                    descriptor.name(),
                    key
                ))),
            },
        },
        other => Err(RestError::invalid(format!(
            "{} list response must be an array or object, got {}",
            descriptor.name(),
            json_type(other)
        ))),
    }
}

/// Bind every payload of a list response
pub fn bind_collection(descriptor: &Arc<ResourceDescriptor>, body: &Value) -> Result<Vec<Resource>> {
    collection_payloads(descriptor, body)?
        .into_iter()
        .map(|payload| bind(descriptor, payload))
        .collect()
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::ResourceMeta;
    use serde_json::json;

    fn person() -> Arc<ResourceDescriptor> {
        Arc::new(
            ResourceMeta::new("Person")
                .identifier("url")
                .attributes(["name", "age", "url"])
                .methods(["get"])
                .validate()
                .unwrap(),
        )
    }

    #[test]
    fn test_bind_person() {
        let descriptor = person();
        let payload = json!({"name": "luke skywalker", "age": 18, "url": "https://x/1"});

        let luke = bind(&descriptor, &payload).unwrap();

        assert_eq!(luke.resource_type(), "Person");
        assert_eq!(luke.get("name"), Some(&json!("luke skywalker")));
        assert_eq!(luke.get("age"), Some(&json!(18)));
        assert_eq!(luke.get("url"), Some(&json!("https://x/1")));
        assert_eq!(luke.len(), 3);
        assert_eq!(luke.uid().unwrap(), "https://x/1");
    }

    #[test]
    fn test_bind_drops_unlisted_keys() {
        let descriptor = person();
        let payload = json!({"name": "leia", "homeworld": "alderaan", "mass": "49"});

        let leia = bind(&descriptor, &payload).unwrap();

        assert_eq!(leia.attributes().keys().collect::<Vec<_>>(), vec!["name"]);
        assert!(!leia.contains("homeworld"));
    }

    #[test]
    fn test_unset_attribute_is_not_null() {
        let descriptor = person();
        let leia = bind(&descriptor, &json!({"name": "leia", "age": null})).unwrap();

        assert_eq!(leia.get("age"), Some(&Value::Null));
        assert_eq!(leia.get("url"), None);
        assert!(leia.attr("url").unwrap_err().is_invalid_operation());
        assert!(leia.attr("homeworld").unwrap_err().is_invalid_operation());
        assert!(leia.uid().unwrap_err().is_invalid_operation());
    }

    #[test]
    fn test_bind_preserves_nested_values() {
        let descriptor = Arc::new(
            ResourceMeta::new("Film")
                .identifier("id")
                .attributes(["id", "characters", "meta"])
                .validate()
                .unwrap(),
        );
        let payload = json!({
            "id": 4,
            "characters": ["luke", "leia"],
            "meta": {"episode": "IV", "rating": 8.6}
        });

        let film = bind(&descriptor, &payload).unwrap();

        assert_eq!(film.get("characters"), payload.get("characters"));
        assert_eq!(film.get("meta"), payload.get("meta"));
        assert_eq!(film.uid().unwrap(), "4");
        assert_eq!(serde_json::to_value(&film).unwrap(), payload);
        assert_eq!(film.to_value(), payload);
    }

    #[test]
    fn test_bind_rejects_non_object() {
        let descriptor = person();
        let err = bind(&descriptor, &json!([{"name": "luke"}])).unwrap_err();
        assert!(err.is_invalid_operation());
    }

    #[test]
    fn test_non_scalar_identifier() {
        let descriptor = person();
        let odd = bind(&descriptor, &json!({"url": {"href": "/1/"}})).unwrap();
        assert!(odd.uid().unwrap_err().is_invalid_operation());
    }

    #[test]
    fn test_bind_collection() {
        let plain = person();
        let body = json!([{"name": "luke"}, {"name": "leia"}]);
        let people = bind_collection(&plain, &body).unwrap();
        assert_eq!(people.len(), 2);
        assert_eq!(people[1].get("name"), Some(&json!("leia")));

        let single = bind_collection(&plain, &json!({"name": "han"})).unwrap();
        assert_eq!(single.len(), 1);

        assert!(bind_collection(&plain, &Value::Null).unwrap().is_empty());
        assert!(bind_collection(&plain, &json!("luke")).is_err());
    }

    #[test]
    fn test_bind_collection_pagination_key() {
        let paged = Arc::new(
            ResourceMeta::new("Person")
                .identifier("url")
                .attributes(["name", "url"])
                .pagination_key("results")
                .validate()
                .unwrap(),
        );

        let body = json!({"count": 2, "next": null, "results": [{"name": "luke"}, {"name": "r2"}]});
        let people = bind_collection(&paged, &body).unwrap();
        assert_eq!(people.len(), 2);
        assert_eq!(people[0].get("name"), Some(&json!("luke")));

        let err = bind_collection(&paged, &json!({"count": 0})).unwrap_err();
        assert!(err.is_invalid_operation());

        let err = bind_collection(&paged, &json!({"results": "none"})).unwrap_err();
        assert!(err.is_invalid_operation());
    }
}
