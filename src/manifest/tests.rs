use super::*;
use crate::router::{HandlerKind, RequestDescriptor};
use std::path::Path;

const YAML: &str = r"
config:
  max_locator_depth: 4
routes:
  - path: /items
    method: GET
    produces: [application/json, application/xml]
    handler: list_items
  - path: '/items/{id: \d+}'
    method: GET
    handler: get_item
    parameters:
      - { parameter: item_id, variable: id }
  - path: /accounts/{id}
    handler: account
    locator: true
    resource: account
resources:
  account:
    - path: /transactions
      method: GET
      handler: list_transactions
";

#[test]
fn test_parse_yaml_manifest() {
    let manifest = parse_manifest_str(YAML, ManifestFormat::Yaml).unwrap();
    assert_eq!(manifest.config.max_locator_depth, 4);
    assert!(manifest.config.trailing_slash_tolerant);
    assert_eq!(manifest.routes.len(), 3);
    assert_eq!(manifest.routes[2].kind(), HandlerKind::Locator);
    assert_eq!(manifest.resources["account"].len(), 1);
}

#[test]
fn test_build_wires_locators_to_resources() {
    let router = parse_manifest_str(YAML, ManifestFormat::Yaml)
        .unwrap()
        .build()
        .unwrap();
    assert_eq!(router.config().max_locator_depth, 4);

    let resolved = router
        .route(&RequestDescriptor::get("/accounts/7/transactions"))
        .unwrap();
    assert_eq!(resolved.handler(), "list_transactions");
    assert_eq!(resolved.get_path_param("id"), Some("7"));

    let resolved = router.route(&RequestDescriptor::get("/items/12")).unwrap();
    assert_eq!(resolved.bound_parameters(), vec![("item_id", "12")]);
}

#[test]
fn test_json_and_toml_manifests() {
    let json = r#"{"routes": [{"path": "/ping", "method": "GET", "handler": "ping"}]}"#;
    let manifest = parse_manifest_str(json, ManifestFormat::Json).unwrap();
    assert_eq!(manifest.routes[0].handler, "ping");

    let toml = r#"
[config]
head_falls_back_to_get = false

[[routes]]
path = "/ping"
method = "GET"
handler = "ping"
"#;
    let manifest = parse_manifest_str(toml, ManifestFormat::Toml).unwrap();
    assert!(!manifest.config.head_falls_back_to_get);
    assert_eq!(manifest.routes[0].path, "/ping");
}

#[test]
fn test_unknown_fields_rejected() {
    let yaml = "routes:\n  - path: /x\n    handler: h\n    verb: GET\n";
    assert!(parse_manifest_str(yaml, ManifestFormat::Yaml).is_err());
    assert!(parse_manifest_str("route: []\n", ManifestFormat::Yaml).is_err());
}

#[test]
fn test_locator_without_known_resource_fails_build() {
    let missing = "routes:\n  - { path: /a, handler: a, locator: true }\n";
    let err = parse_manifest_str(missing, ManifestFormat::Yaml)
        .unwrap()
        .build()
        .unwrap_err();
    assert!(err.to_string().contains("does not name a resource"));

    let unknown = "routes:\n  - { path: /a, handler: a, locator: true, resource: nope }\n";
    let err = parse_manifest_str(unknown, ManifestFormat::Yaml)
        .unwrap()
        .build()
        .unwrap_err();
    assert!(err.to_string().contains("unknown resource 'nope'"));
}

#[test]
fn test_registration_errors_carry_context() {
    let ambiguous = "routes:\n  - { path: '/a/{x}', method: GET, handler: one }\n  - { path: '/a/{y}', method: GET, handler: two }\n";
    let err = parse_manifest_str(ambiguous, ManifestFormat::Yaml)
        .unwrap()
        .build()
        .unwrap_err();
    assert!(err.to_string().contains("top-level routes"));
    assert!(format!("{err:#}").contains("ambiguous route"));
}

#[test]
fn test_format_from_extension() {
    assert_eq!(ManifestFormat::from_path(Path::new("r.yaml")), ManifestFormat::Yaml);
    assert_eq!(ManifestFormat::from_path(Path::new("r.YML")), ManifestFormat::Yaml);
    assert_eq!(ManifestFormat::from_path(Path::new("r.toml")), ManifestFormat::Toml);
    assert_eq!(ManifestFormat::from_path(Path::new("r.json")), ManifestFormat::Json);
    assert_eq!(ManifestFormat::from_path(Path::new("routes")), ManifestFormat::Json);
}
