use criterion::{criterion_group, criterion_main, Criterion};
use http::Method;
use resrouter::manifest::{parse_manifest_str, ManifestFormat};
use resrouter::router::{RequestDescriptor, Router};
use std::hint::black_box;

fn example_manifest() -> &'static str {
    r"
routes:
  - { path: /, method: GET, handler: root_handler }
  - { path: /zoo/animals, method: GET, handler: get_animals, produces: [application/json] }
  - { path: /zoo/animals, method: GET, handler: get_animals_xml, produces: [application/xml] }
  - { path: /zoo/animals, method: POST, handler: create_animal, consumes: [application/json] }
  - { path: '/zoo/animals/{id}', method: GET, handler: get_animal }
  - { path: '/zoo/animals/{id}', method: PUT, handler: update_animal }
  - { path: '/zoo/animals/{id}', method: DELETE, handler: delete_animal }
  - { path: '/zoo/animals/{id}/toys/{toy_id}', method: GET, handler: animal_toy }
  - { path: '/zoo/{category}/animals/{id: \d+}/habitats/{habitat_id}', method: GET, handler: habitat }
  - { path: '/complex/{a}/{b}/{c}/{d}/{e}/{f}/{g}/{h}/{i}', method: GET, handler: complex_many_params }
  - { path: '/keepers/{keeper}', handler: keeper, locator: true, resource: keeper }
resources:
  keeper:
    - { path: /, method: GET, handler: get_keeper }
    - { path: '/shifts/{shift}', method: GET, handler: get_shift }
"
}

fn build_router() -> Router {
    parse_manifest_str(example_manifest(), ManifestFormat::Yaml)
        .expect("failed to parse manifest")
        .build()
        .expect("failed to build router")
}

fn bench_route_throughput(c: &mut Criterion) {
    let router = build_router();
    c.bench_function("route_match", |b| {
        let requests = [
            RequestDescriptor::new(Method::GET, "/zoo/animals/123"),
            RequestDescriptor::new(Method::GET, "/zoo/animals/123/toys/456"),
            RequestDescriptor::new(Method::GET, "/zoo/cats/animals/123/habitats/88"),
            RequestDescriptor::new(Method::GET, "/complex/1/2/3/4/5/6/7/8/9"),
        ];
        b.iter(|| {
            for request in &requests {
                let res = router.route(request);
                black_box(&res);
            }
        })
    });
}

fn bench_negotiation(c: &mut Criterion) {
    let router = build_router();
    c.bench_function("route_negotiated", |b| {
        let requests = [
            RequestDescriptor::get("/zoo/animals")
                .with_accept("application/xml;q=0.9,application/json;q=0.5"),
            RequestDescriptor::get("/zoo/animals")
                .with_accept("text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8"),
            RequestDescriptor::new(Method::POST, "/zoo/animals")
                .with_content_type("application/json"),
        ];
        b.iter(|| {
            for request in &requests {
                let res = router.route(request);
                black_box(&res);
            }
        })
    });
}

fn bench_locator(c: &mut Criterion) {
    let router = build_router();
    c.bench_function("route_locator", |b| {
        let request = RequestDescriptor::get("/keepers/k1/shifts/42");
        b.iter(|| black_box(router.route(&request)))
    });
}

criterion_group!(benches, bench_route_throughput, bench_negotiation, bench_locator);
criterion_main!(benches);
