use callsite::{DispatchError, Dispatcher, RequestContext, RequestContextBuilder};
use search_example::{corpus, registry, Search, SearchError};
use serde_json::Value;

fn dispatcher() -> Dispatcher {
    let search = Search::new(corpus::sample()).count_per_type(2).sample_size(2);
    Dispatcher::builder()
        .components(registry(search).unwrap())
        .build()
}

fn call(method: &str) -> RequestContextBuilder {
    RequestContext::builder()
        .route("componentName", "Search")
        .route("methodName", method)
}

fn json(req: RequestContext) -> Value {
    let response = dispatcher().dispatch(&req).unwrap();
    assert_eq!(response.content_type, "application/json");
    serde_json::from_str(&response.body).unwrap()
}

#[test]
fn find_with_escaped_wildcard_and_text_limit() {
    let body = json(
        call("Find")
            .route("query", "~")
            .route("limit", "10")
            .query("type", "json")
            .build(),
    );
    assert_eq!(body["title"], "Documents matching *");
    assert_eq!(body["totalCount"], 6);
    assert_eq!(body["items"].as_array().map(Vec::len), Some(6));
}

#[test]
fn find_defaults_limit() {
    let body = json(call("Find").route("query", "asia").build());
    assert_eq!(body["totalCount"], 3);
}

#[test]
fn find_rejects_negative_limit_with_component_error() {
    let req = call("Find").route("query", "acme").route("limit", "-5").build();
    let err = dispatcher().dispatch(&req).unwrap_err();
    assert!(matches!(
        err.downcast_ref::<SearchError>(),
        Some(SearchError::InvalidLimit(-5))
    ));
}

#[test]
fn find_with_empty_query_is_missing_parameter() {
    let req = call("Find").route("query", "").build();
    let err = dispatcher().dispatch(&req).unwrap_err();
    assert!(matches!(
        err,
        DispatchError::Param(callsite::ParamError::Missing(ref k)) if k == "query"
    ));
}

#[test]
fn find_as_rss_feed() {
    let req = call("Find")
        .route("query", "acme")
        .route("limit", "2")
        .query("type", "rss")
        .build();
    let response = dispatcher().dispatch(&req).unwrap();
    assert_eq!(response.content_type, "application/rss+xml");
    assert!(response.body.contains("<title>Documents matching acme</title>"));
    assert!(response.body.contains("<link>https://news.example.org/1</link>"));
    assert_eq!(response.body.matches("<item>").count(), 2);
}

#[test]
fn find_as_csv() {
    let req = call("Find")
        .route("query", "rust")
        .query("type", "csv")
        .build();
    let response = dispatcher().dispatch(&req).unwrap();
    let mut lines = response.body.lines();
    assert_eq!(lines.next(), Some("id,summary,title,url"));
    assert!(lines.next().is_some_and(|l| l.starts_with("3,Vendors in Europe")));
}

#[test]
fn terms_without_arguments_reads_the_request() {
    let body = json(
        call("Terms")
            .query("types", "person,company")
            .query("query", "acme")
            .build(),
    );
    let kinds: Vec<&str> = body["items"]
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|t| t["type"].as_str())
        .collect();
    assert_eq!(kinds, vec!["person", "person", "company", "company"]);
}

#[test]
fn terms_without_query_samples_everything() {
    let body = json(call("Terms").build());
    assert_eq!(body["title"], "Terms for *");
    let acme = body["items"]
        .as_array()
        .unwrap()
        .iter()
        .find(|t| t["name"] == "Acme")
        .map(|t| t["documents"].clone());
    assert_eq!(acme, Some(Value::from(2)));
}

#[test]
fn terms_with_all_arguments() {
    let body = json(
        call("Terms")
            .route("query", "~")
            .route("types", "region")
            .route("optimization", "")
            .build(),
    );
    let names: Vec<&str> = body["items"]
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|t| t["name"].as_str())
        .collect();
    assert_eq!(names, vec!["Asia", "Europe"]);
}

#[test]
fn unknown_optimization_surfaces_search_error() {
    let req = call("Terms")
        .route("query", "acme")
        .route("types", "company")
        .route("optimization", "turbo")
        .build();
    let err = dispatcher().dispatch(&req).unwrap_err();
    assert!(err.to_string().contains("turbo"));
    assert!(err.downcast_ref::<SearchError>().is_some());
}

#[test]
fn debug_info_reports_selected_overload() {
    let body = json(
        call("Find")
            .route("query", "acme")
            .route("limit", "1")
            .query("debug", "true")
            .build(),
    );
    assert_eq!(body["debugInfo"]["component"], "Search");
    assert_eq!(body["debugInfo"]["signature"], "Find(string, int)");
}
