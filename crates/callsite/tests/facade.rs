use callsite::{
    ComponentRegistry, ComponentType, DispatchError, Dispatcher, HookError, Hooks, ItemList,
    RequestContext, Value,
};

struct Inbox {
    subjects: Vec<&'static str>,
}

struct ApiKey(String);

fn dispatcher() -> Dispatcher {
    let inbox = ComponentType::new(Inbox {
        subjects: vec!["welcome", "invoice", "reminder"],
    })
    .scoped_method("List", &[], |inbox: &Inbox, scope: &callsite::CallScope<'_>| {
        let owner = scope.extensions().get_required::<ApiKey>()?;
        let limit = scope.try_resolve::<i64>("limit").unwrap_or(10);
        Ok::<_, anyhow::Error>(
            ItemList::new(
                inbox
                    .subjects
                    .iter()
                    .take(limit as usize)
                    .map(|s| serde_json::json!({ "title": s }))
                    .collect(),
            )
            .title(format!("inbox of {}", owner.0)),
        )
    });

    let mut components = ComponentRegistry::new();
    components.register("Inbox", inbox).unwrap();

    let hooks = Hooks::new().pre_dispatch(|req, ctx| {
        match req.item("apiKey").and_then(Value::as_str) {
            Some(key) => {
                ctx.extensions.insert(ApiKey(key.to_string()));
                Ok(())
            }
            None => Err(HookError::pre_dispatch("api key required")),
        }
    });

    Dispatcher::builder()
        .components(components)
        .hooks(hooks)
        .build()
}

fn list() -> callsite::RequestContextBuilder {
    RequestContext::builder()
        .route("componentName", "Inbox")
        .route("methodName", "List")
}

#[test]
fn hook_gates_access() {
    let err = dispatcher().dispatch(&list().build()).unwrap_err();
    assert!(matches!(err, DispatchError::Hook(_)));
    assert_eq!(err.status_code(), 403);
}

#[test]
fn scoped_method_reads_extensions_and_resolver() {
    let req = list().item("apiKey", "k-42").query("limit", "2").build();
    let response = dispatcher().dispatch(&req).unwrap();
    let body: serde_json::Value = serde_json::from_str(&response.body).unwrap();

    assert_eq!(body["title"], "inbox of k-42");
    assert_eq!(body["items"].as_array().map(Vec::len), Some(2));
}

#[test]
fn unparseable_optional_limit_falls_back_to_default() {
    let req = list().item("apiKey", "k-42").query("limit", "lots").build();
    let response = dispatcher().dispatch(&req).unwrap();
    let body: serde_json::Value = serde_json::from_str(&response.body).unwrap();

    assert_eq!(body["items"].as_array().map(Vec::len), Some(3));
}
