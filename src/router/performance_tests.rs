// Performance-focused tests for router scalability.
//
// The first-segment index should keep lookups flat as unrelated routes are added.

use super::{RequestDescriptor, RouteDefinition, RouteTable, Router};
use std::time::Instant;

fn router(defs: Vec<RouteDefinition>) -> Router {
    Router::new(RouteTable::from_definitions(defs).unwrap())
}

#[test]
fn test_router_performance_with_many_routes() {
    let defs = (0..500)
        .map(|i| {
            RouteDefinition::new(format!("/resource{i}/{{id}}"), format!("handler_{i}")).method("GET")
        })
        .collect();
    let router = router(defs);

    let start = Instant::now();
    for _ in 0..1000 {
        let result = router.route(&RequestDescriptor::get("/resource250/123"));
        assert_eq!(result.unwrap().handler(), "handler_250");
    }
    let duration = start.elapsed();

    assert!(
        duration.as_millis() < 500,
        "Router performance degraded: {}ms for 1000 lookups with 500 routes",
        duration.as_millis()
    );
}

#[test]
fn test_router_common_prefix_routes() {
    let router = router(vec![
        RouteDefinition::new("/api/v1/users", "list_users").method("GET"),
        RouteDefinition::new("/api/v1/users/{id}", "get_user").method("GET"),
        RouteDefinition::new("/api/v1/users/{id}/profile", "get_profile").method("GET"),
        RouteDefinition::new("/api/v1/posts", "list_posts").method("GET"),
        RouteDefinition::new("/api/v1/posts/{id}", "get_post").method("GET"),
        RouteDefinition::new("/api/v2/users", "list_users_v2").method("GET"),
    ]);

    for (path, handler) in [
        ("/api/v1/users", "list_users"),
        ("/api/v1/users/123", "get_user"),
        ("/api/v1/users/123/profile", "get_profile"),
        ("/api/v1/posts", "list_posts"),
        ("/api/v1/posts/9", "get_post"),
        ("/api/v2/users", "list_users_v2"),
    ] {
        let resolved = router.route(&RequestDescriptor::get(path)).unwrap();
        assert_eq!(resolved.handler(), handler, "{path}");
    }
}

#[test]
fn test_router_parameter_extraction() {
    let router = router(vec![RouteDefinition::new(
        "/api/{version}/users/{user_id}/posts/{post_id}/comments/{comment_id}",
        "get_comment",
    )
    .method("GET")]);

    for _ in 0..100 {
        let resolved = router
            .route(&RequestDescriptor::get("/api/v1/users/123/posts/456/comments/789"))
            .unwrap();
        assert_eq!(resolved.matched.params.len(), 4);
        assert!(!resolved.matched.params.spilled());
        assert_eq!(resolved.get_path_param("comment_id"), Some("789"));
    }
}
