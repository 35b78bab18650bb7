use hyperres::{Config, ResourceMeta, ResourceRegistry, RestClient, RestError};
use std::sync::Arc;

fn swapi() -> RestClient {
    let mut registry = ResourceRegistry::new();
    registry
        .register(
            ResourceMeta::new("Person")
                .resource_name("people")
                .identifier("url")
                .attributes(["name", "height", "mass", "homeworld", "url"])
                .methods(["get", "list"])
                .pagination_key("results"),
        )
        .expect("valid Person descriptor");
    registry
        .register(
            ResourceMeta::new("Planet")
                .resource_name("planets")
                .identifier("url")
                .attributes(["name", "climate", "url"])
                .methods(["get"]),
        )
        .expect("valid Planet descriptor");

    RestClient::new(Config::new("https://swapi.dev/api"), Arc::new(registry))
        .expect("failed to build client")
}

#[test]
#[ignore] // Run with: cargo test --test integration_tests -- --ignored
fn test_get_person() {
    let client = swapi();

    let luke = client.get("Person", "1").expect("failed to get person");

    assert_eq!(luke.attr("name").unwrap(), "Luke Skywalker");
    assert!(luke.get("eye_color").is_none(), "unlisted keys must be dropped");

    println!("Get person test passed: {:?}", luke.to_value());
}

#[test]
#[ignore]
fn test_list_people() {
    let client = swapi();

    let people = client.list("Person").expect("failed to list people");

    assert!(!people.is_empty(), "expected a non-empty page of people");

    println!("List people test passed: {} people", people.len());
}

#[test]
#[ignore]
fn test_absolute_identifier_round_trip() {
    let client = swapi();

    let luke = client.get("Person", "1").expect("failed to get person");
    let homeworld = luke.attr("homeworld").unwrap().as_str().unwrap().to_string();

    // The homeworld field is already a full URL and is used as-is
    let tatooine = client.get("Planet", &homeworld).expect("failed to get planet");
    assert_eq!(tatooine.attr("name").unwrap(), "Tatooine");

    println!("Absolute identifier test passed: {}", homeworld);
}

#[test]
#[ignore]
fn test_not_found() {
    let client = swapi();

    let result = client.get("Person", "99999");

    match result.unwrap_err() {
        RestError::UnexpectedStatus { status, .. } => {
            assert_eq!(status, 404);
        }
        other => panic!("expected RestError::UnexpectedStatus, got {:?}", other),
    }
}
