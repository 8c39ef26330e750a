use http::Method;
use resrouter::error::RoutingError;
use resrouter::manifest::{parse_manifest_str, ManifestFormat};
use resrouter::router::{RequestDescriptor, RouteDefinition, RouteTable, Router};
use resrouter::template::PathTemplate;

mod common;
use common::fixtures::BANK_MANIFEST;

fn bank_router() -> Router {
    parse_manifest_str(BANK_MANIFEST, ManifestFormat::Yaml)
        .unwrap()
        .build()
        .unwrap()
}

fn handler_for(router: &Router, method: Method, path: &str) -> String {
    router
        .route(&RequestDescriptor::new(method, path))
        .unwrap_or_else(|e| panic!("{path}: {e}"))
        .handler()
        .to_string()
}

#[test]
fn test_numeric_template_boundary() {
    let template = PathTemplate::compile(r"/{id: \d+}/test").unwrap();
    assert_eq!(template.number_of_template_variables(), 1);
    assert_eq!(template.number_of_explicit_regexes(), 1);

    let router = bank_router();
    let resolved = router.route(&RequestDescriptor::get("/42/test")).unwrap();
    assert_eq!(resolved.handler(), "numeric_test");
    assert_eq!(resolved.get_path_param("id"), Some("42"));

    let err = router.route(&RequestDescriptor::get("/abc/test")).unwrap_err();
    assert!(err.is_not_found());
}

#[test]
fn test_root_and_trailing_slash() {
    let router = bank_router();
    assert_eq!(handler_for(&router, Method::GET, "/"), "index");
    assert_eq!(handler_for(&router, Method::GET, "/widgets"), "list_widgets");
    assert_eq!(handler_for(&router, Method::GET, "/widgets/"), "list_widgets");
    assert_eq!(handler_for(&router, Method::GET, "/widgets?page=2"), "list_widgets");
}

#[test]
fn test_trailing_slash_strict_mode() {
    let table =
        RouteTable::from_definitions([RouteDefinition::new("/widgets", "list").method("GET")])
            .unwrap();
    let config = resrouter::RouterConfig {
        trailing_slash_tolerant: false,
        ..Default::default()
    };
    let router = Router::new(table).with_config(config);
    assert!(router.route(&RequestDescriptor::get("/widgets")).is_ok());
    assert!(router
        .route(&RequestDescriptor::get("/widgets/"))
        .unwrap_err()
        .is_not_found());
}

#[test]
fn test_unknown_path_is_not_found() {
    let router = bank_router();
    match router.route(&RequestDescriptor::get("/nope/deeper")) {
        Err(RoutingError::NotFound { path }) => assert_eq!(path, "/nope/deeper"),
        other => panic!("expected NotFound, got {other:?}"),
    }
}

#[test]
fn test_method_mismatch_is_not_not_found() {
    let router = bank_router();
    let err = router
        .route(&RequestDescriptor::new(Method::PUT, "/widgets"))
        .unwrap_err();
    assert!(!err.is_not_found());
    let allowed = err.allowed_methods().unwrap();
    assert!(allowed.contains(&Method::GET));
    assert!(!allowed.contains(&Method::PUT));
    assert_eq!(err.allow_header().as_deref(), Some("GET"));
}

#[test]
fn test_allowed_methods_query() {
    let router = bank_router();
    assert_eq!(
        router.allowed_methods("/items"),
        vec![Method::GET, Method::HEAD, Method::OPTIONS, Method::POST]
    );
    assert!(router.allowed_methods("/missing/path").is_empty());
}

#[test]
fn test_automatic_options() {
    let router = bank_router();
    let resolved = router
        .route(&RequestDescriptor::new(Method::OPTIONS, "/items"))
        .unwrap();
    assert_eq!(
        resolved.automatic_options(),
        Some(&router.allowed_methods("/items")[..])
    );

    let resolved = router
        .route(&RequestDescriptor::new(Method::OPTIONS, "/accounts/7/transactions"))
        .unwrap();
    assert_eq!(resolved.expansions(), 1);
    assert_eq!(
        resolved.automatic_options(),
        Some(&[Method::GET, Method::HEAD, Method::OPTIONS][..])
    );
}

#[test]
fn test_winner_independent_of_registration_order() {
    let definitions = vec![
        RouteDefinition::new("/items/{id}", "item_by_name").method("GET"),
        RouteDefinition::new("/items/special", "special_item").method("GET"),
        RouteDefinition::new(r"/items/{id: \d+}", "item_by_number").method("GET"),
        RouteDefinition::new("/{a}/{b}", "any_pair").method("GET"),
    ];
    let forward = Router::new(RouteTable::from_definitions(definitions.clone()).unwrap());
    let reversed =
        Router::new(RouteTable::from_definitions(definitions.into_iter().rev()).unwrap());

    for (path, expected) in [
        ("/items/special", "special_item"),
        ("/items/42", "item_by_number"),
        ("/items/widget", "item_by_name"),
        ("/orders/42", "any_pair"),
    ] {
        assert_eq!(handler_for(&forward, Method::GET, path), expected, "{path}");
        assert_eq!(handler_for(&reversed, Method::GET, path), expected, "{path}");
    }
}

#[test]
fn test_percent_encoded_captures_are_decoded() {
    let table = RouteTable::from_definitions([
        RouteDefinition::new("/files/{name}", "get_file").method("GET")
    ])
    .unwrap();
    let router = Router::new(table);
    let resolved = router
        .route(&RequestDescriptor::get("/files/annual%20report.pdf"))
        .unwrap();
    assert_eq!(resolved.get_path_param("name"), Some("annual report.pdf"));
}

#[test]
fn test_literal_template_beats_variable_template() {
    let table = RouteTable::from_definitions([
        RouteDefinition::new("/users/{id}", "get_user").method("GET"),
        RouteDefinition::new("/users/me", "get_me").method("GET"),
    ])
    .unwrap();
    let router = Router::new(table);
    assert_eq!(handler_for(&router, Method::GET, "/users/me"), "get_me");
    assert_eq!(handler_for(&router, Method::GET, "/users/42"), "get_user");
}

#[test]
fn test_many_routes() {
    let table = RouteTable::from_definitions((0..200).map(|i| {
        RouteDefinition::new(format!("/api/v1/resource{i}/{{id}}"), format!("handler_{i}"))
            .method("GET")
    }))
    .unwrap();
    let router = Router::new(table);
    for i in [0, 57, 199] {
        let resolved = router
            .route(&RequestDescriptor::get(&format!("/api/v1/resource{i}/abc")))
            .unwrap();
        assert_eq!(resolved.handler(), format!("handler_{i}"));
        assert_eq!(resolved.get_path_param("id"), Some("abc"));
    }
}

#[test]
fn test_router_is_shareable_across_threads() {
    let router = std::sync::Arc::new(bank_router());
    let workers: Vec<_> = (0..4)
        .map(|i| {
            let router = std::sync::Arc::clone(&router);
            std::thread::spawn(move || {
                let path = format!("/accounts/{i}/transactions");
                let resolved = router.route(&RequestDescriptor::get(&path)).unwrap();
                assert_eq!(resolved.handler(), "list_transactions");
                assert_eq!(resolved.get_path_param("id"), Some(i.to_string().as_str()));
            })
        })
        .collect();
    for worker in workers {
        worker.join().unwrap();
    }
}
