use super::*;
use crate::error::TemplateErrorKind;
use std::collections::HashMap;

fn compile(t: &str) -> PathTemplate {
    PathTemplate::compile(t).expect("template compiles")
}

fn kind_of(t: &str) -> TemplateErrorKind {
    PathTemplate::compile(t).expect_err("template is invalid").kind
}

fn param<'a>(m: &'a TemplateMatch, name: &str) -> Option<&'a str> {
    m.params
        .iter()
        .find(|(k, _)| k.as_ref() == name)
        .map(|(_, v)| v.as_str())
}

#[test]
fn test_root_path() {
    let t = compile("/");
    assert_eq!(t.number_of_template_variables(), 0);
    assert!(t.segments().is_empty());
    let m = t.match_path("/").unwrap();
    assert!(m.params.is_empty());
    assert_eq!(m.remainder, "/");
    assert_eq!(t.match_path("/anything/below").unwrap().remainder, "/anything/below");
}

#[test]
fn test_regex_variable_counts_and_matching() {
    let t = compile(r"/{id: \d+}/test");
    assert_eq!(t.number_of_template_variables(), 1);
    assert_eq!(t.number_of_explicit_regexes(), 1);

    let m = t.match_path("/42/test").unwrap();
    assert_eq!(param(&m, "id"), Some("42"));
    assert_eq!(m.remainder, "");

    assert!(t.match_path("/abc/test").is_none());
}

#[test]
fn test_parameterized_path() {
    let t = compile("/items/{id}");
    let m = t.match_path("/items/123").unwrap();
    assert_eq!(param(&m, "id"), Some("123"));
    assert!(t.match_path("/items").is_none());
    assert!(t.match_path("/items/").is_none());
}

#[test]
fn test_prefix_match_stops_at_slash_boundary() {
    let t = compile("/accounts/{id}");
    let m = t.match_path("/accounts/7/transactions").unwrap();
    assert_eq!(param(&m, "id"), Some("7"));
    assert_eq!(m.remainder, "/transactions");

    let literal = compile("/items");
    assert!(literal.match_path("/itemsx").is_none());
    assert_eq!(literal.match_path("/items/").unwrap().remainder, "/");
}

#[test]
fn test_affixes_within_segment() {
    let t = compile("/files/report.{ext}");
    let m = t.match_path("/files/report.pdf").unwrap();
    assert_eq!(param(&m, "ext"), Some("pdf"));
    assert!(t.match_path("/files/summary.pdf").is_none());
    assert_eq!(t.segments()[1].kind, SegmentKind::Variable);
}

#[test]
fn test_catch_all_variable_spans_segments() {
    let t = compile("/static/{path: .*}");
    let m = t.match_path("/static/css/site/main.css").unwrap();
    assert_eq!(param(&m, "path"), Some("css/site/main.css"));
    assert_eq!(m.remainder, "");
}

#[test]
fn test_nested_groups_in_explicit_regex() {
    let t = compile(r"/{version: v(\d)(\d)?}/{name}");
    let m = t.match_path("/v12/widgets").unwrap();
    assert_eq!(param(&m, "version"), Some("v12"));
    assert_eq!(param(&m, "name"), Some("widgets"));
}

#[test]
fn test_quantifier_braces_in_regex() {
    let t = compile(r"/years/{year: \d{4}}");
    assert!(t.match_path("/years/2024").is_some());
    assert!(t.match_path("/years/24").is_none());
}

#[test]
fn test_captures_are_percent_decoded() {
    let t = compile("/users/{name}");
    let m = t.match_path("/users/Jane%20Doe").unwrap();
    assert_eq!(param(&m, "name"), Some("Jane Doe"));
}

#[test]
fn test_literal_with_space_matches_encoded_path() {
    let t = compile("/my docs/{id}");
    assert!(t.match_path("/my%20docs/1").is_some());
    assert!(t.match_path("/my docs/1").is_none());

    let escaped = compile("/a%2fb");
    assert!(escaped.match_path("/a%2Fb").is_some());
    assert!(escaped.match_path("/a%2fb").is_some());
}

#[test]
fn test_normalisation() {
    assert_eq!(compile("items/").as_str(), "/items");
    assert_eq!(compile("/items/{id}/").as_str(), "/items/{id}");
}

#[test]
fn test_syntax_errors() {
    assert_eq!(kind_of(""), TemplateErrorKind::Empty);
    assert!(matches!(kind_of("/items/{id"), TemplateErrorKind::UnbalancedBraces(_)));
    assert!(matches!(kind_of("/items/id}"), TemplateErrorKind::UnbalancedBraces(_)));
    assert!(matches!(kind_of("/items/{}"), TemplateErrorKind::EmptyName(_)));
    assert!(matches!(kind_of("/items/{ : \\d+}"), TemplateErrorKind::EmptyName(_)));
    assert_eq!(
        kind_of("/{id}/x/{id}"),
        TemplateErrorKind::DuplicateName("id".into())
    );
    assert_eq!(kind_of("/{id: }"), TemplateErrorKind::EmptyRegex("id".into()));
    assert!(matches!(kind_of("/{id: (\\d+}"), TemplateErrorKind::InvalidRegex { .. }));
    assert!(matches!(kind_of("/{a b}"), TemplateErrorKind::IllegalName { ch: ' ', .. }));
}

#[test]
fn test_specificity_ordering() {
    let literal = compile("/items/special");
    let var = compile("/items/{id}");
    let regex = compile(r"/items/{id: \d+}");
    let two_vars = compile("/items/{a}-{b}");

    assert_eq!(literal.cmp_specificity(&var), Ordering::Less);
    assert_eq!(var.cmp_specificity(&literal), Ordering::Greater);
    // same literal chars, same arity: explicit regex wins
    assert_eq!(regex.cmp_specificity(&var), Ordering::Less);
    // '-' is a literal char, so two_vars has more literal characters
    assert_eq!(two_vars.cmp_specificity(&var), Ordering::Less);

    let fewer = compile("/a/{x}");
    let more = compile("/{y}/{x}");
    assert_eq!(fewer.cmp_specificity(&more), Ordering::Less);

    let mut sorted = vec![var.clone(), regex.clone(), literal.clone()];
    sorted.sort_by(|a, b| a.cmp_specificity(b));
    assert_eq!(sorted[0].as_str(), "/items/special");
    assert_eq!(sorted[1].as_str(), r"/items/{id: \d+}");
    assert_eq!(sorted[2].as_str(), "/items/{id}");
}

#[test]
fn test_structural_equality_ignores_names() {
    let a = compile("/users/{id}/posts");
    let b = compile("/users/{user_id}/posts");
    let c = compile(r"/users/{id: \d+}/posts");
    let d = compile("/users/{id}/comments");
    assert_eq!(a, b);
    assert_eq!(a, c);
    assert_ne!(a, d);
    assert!(a.matches_same_paths(&b));
    assert!(!a.matches_same_paths(&c));
}

#[test]
fn test_expand_round_trip() {
    let t = compile(r"/shops/{shop}/items/{id: \d+}/{rest: .*}");
    let values: HashMap<&str, &str> = [("shop", "Bob's shop"), ("id", "42"), ("rest", "a/b c")]
        .into_iter()
        .collect();
    let path = t.expand(|name| values.get(name).copied()).unwrap();
    assert_eq!(path, "/shops/Bob%27s%20shop/items/42/a/b%20c");

    let m = t.match_path(&path).unwrap();
    for (name, value) in &values {
        assert_eq!(param(&m, name), Some(*value));
    }

    assert!(t.expand(|_| None).is_none());
}

#[test]
fn test_segments_classification() {
    let t = compile(r"/a/{b}/{c: \d+}.json");
    let kinds: Vec<_> = t.segments().iter().map(|s| s.kind).collect();
    assert_eq!(
        kinds,
        vec![SegmentKind::Literal, SegmentKind::Variable, SegmentKind::RegexVariable]
    );
    assert_eq!(t.segments()[2].raw, r"{c: \d+}.json");
}
