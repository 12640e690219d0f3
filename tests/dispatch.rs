//! Dispatch behaviour of compiled controllers.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use api_router::http::response;
use api_router::{
    create_route, from_fn, ApiError, ApiRequest, ApiRouter, Controller, HandlerResult, Middleware,
    Next, Registry,
};
use axum::http::{Method, StatusCode};
use axum::response::IntoResponse;
use serde_json::json;
use tower::ServiceExt;

mod common;
use common::{body_json, body_text, request, tag, trace_response};

// ---------------------------------------------------------------------------
// Controllers
// ---------------------------------------------------------------------------

struct Users;

impl Users {
    async fn show(self: Arc<Self>, req: ApiRequest, _next: Next) -> HandlerResult {
        Ok(response::json(
            StatusCode::OK,
            json!({ "id": req.param("id"), "params": req.params().len() }),
        ))
    }

    async fn trailing(self: Arc<Self>, _req: ApiRequest, _next: Next) -> HandlerResult {
        Ok("trailing".into_response())
    }
}

impl Controller for Users {
    fn register(registry: &mut Registry<Self>) {
        registry
            .request_mapping("/users/:id", Method::GET, "show", Self::show)
            .request_mapping("/a/", Method::GET, "trailing", Self::trailing);
    }
}

fn explode() -> Arc<dyn Middleware> {
    from_fn(|_req: ApiRequest, _next: Next| async move {
        Err(ApiError::handler("middleware exploded"))
    })
}

struct Guarded;

impl Guarded {
    async fn secure(self: Arc<Self>, _req: ApiRequest, _next: Next) -> HandlerResult {
        Ok("unreachable".into_response())
    }
}

impl Controller for Guarded {
    fn register(registry: &mut Registry<Self>) {
        registry
            .register_controller_middleware([explode()])
            .request_mapping("/secure", Method::GET, "secure", Self::secure)
            .request_mapping("/other", Method::GET, "other", Self::secure)
            .register_route_error_handler("other", |err: ApiError, req: ApiRequest| async move {
                response::json(
                    StatusCode::IM_A_TEAPOT,
                    json!({ "handler": "route", "error": err.to_string(), "path": req.path() }),
                )
            });
    }
}

#[derive(Default)]
struct Gate {
    terminal_calls: AtomicUsize,
}

impl Gate {
    async fn open(self: Arc<Self>, _req: ApiRequest, _next: Next) -> HandlerResult {
        self.terminal_calls.fetch_add(1, Ordering::SeqCst);
        Ok("terminal".into_response())
    }
}

fn deny() -> Arc<dyn Middleware> {
    from_fn(|_req: ApiRequest, _next: Next| async move {
        Ok((StatusCode::FORBIDDEN, "denied by middleware").into_response())
    })
}

impl Controller for Gate {
    fn register(registry: &mut Registry<Self>) {
        registry
            .request_mapping("/gate", Method::GET, "open", Self::open)
            .register_route_middleware("open", [deny()]);
    }
}

fn shared_middlewares() -> Vec<Arc<dyn Middleware>> {
    vec![tag("auth"), tag("audit")]
}

struct Orders;

impl Orders {
    async fn list(self: Arc<Self>, req: ApiRequest, _next: Next) -> HandlerResult {
        Ok(trace_response(&req))
    }
}

impl Controller for Orders {
    fn register(registry: &mut Registry<Self>) {
        registry
            .register_route_middleware("list", [tag("orders.list")])
            .request_mapping("/orders", Method::GET, "list", Self::list)
            .register_controller_middleware(shared_middlewares());
    }
}

struct Invoices;

impl Invoices {
    async fn list(self: Arc<Self>, req: ApiRequest, _next: Next) -> HandlerResult {
        Ok(trace_response(&req))
    }
}

impl Controller for Invoices {
    fn register(registry: &mut Registry<Self>) {
        registry
            .register_controller_middleware(shared_middlewares())
            .request_mapping("/invoices", Method::GET, "list", Self::list)
            .register_route_middleware("list", [tag("invoices.list"), tag("invoices.cache")]);
    }
}

struct Catalog;

impl Catalog {
    async fn by_id(self: Arc<Self>, _req: ApiRequest, _next: Next) -> HandlerResult {
        Ok("by_id".into_response())
    }

    async fn special(self: Arc<Self>, _req: ApiRequest, _next: Next) -> HandlerResult {
        Ok("special".into_response())
    }

    async fn post_special(self: Arc<Self>, _req: ApiRequest, _next: Next) -> HandlerResult {
        Ok("post_special".into_response())
    }

    async fn panics(self: Arc<Self>, _req: ApiRequest, _next: Next) -> HandlerResult {
        panic!("handler bug");
    }
}

impl Controller for Catalog {
    fn register(registry: &mut Registry<Self>) {
        registry
            .request_mapping("/things/special", Method::POST, "post_special", Self::post_special)
            .request_mapping("/things/:id", Method::GET, "by_id", Self::by_id)
            .request_mapping("/things/special", Method::GET, "special", Self::special)
            .request_mapping("/boom", Method::GET, "panics", Self::panics);
    }
}

struct Assets;

impl Assets {
    async fn get(self: Arc<Self>, req: ApiRequest, _next: Next) -> HandlerResult {
        Ok(format!("get {}", req.param("name").unwrap_or_default()).into_response())
    }

    async fn head(self: Arc<Self>, _req: ApiRequest, _next: Next) -> HandlerResult {
        Ok("head logo".into_response())
    }

    async fn upload(self: Arc<Self>, _req: ApiRequest, _next: Next) -> HandlerResult {
        Ok(StatusCode::CREATED.into_response())
    }
}

impl Controller for Assets {
    fn register(registry: &mut Registry<Self>) {
        registry
            .request_mapping("/assets/logo", Method::HEAD, "head", Self::head)
            .request_mapping("/assets/:name", Method::GET, "get", Self::get)
            .request_mapping("/uploads", Method::POST, "upload", Self::upload);
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[test]
fn test_compiled_path_concatenates_base_and_strips_slash() {
    let router = ApiRouter::new("/api", Arc::new(Users)).unwrap();
    let paths: Vec<&str> = router.routes().iter().map(|r| r.path()).collect();
    assert_eq!(paths, vec!["/api/users/:id", "/api/a"]);
}

#[tokio::test]
async fn test_params_reach_terminal_handler() {
    let router = ApiRouter::new("", Arc::new(Users)).unwrap();

    let response = router
        .clone()
        .oneshot(request(Method::GET, "/api/users/42"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await, json!({ "id": "42", "params": 1 }));
}

#[tokio::test]
async fn test_unmatched_request_is_not_found() {
    let router = ApiRouter::new("", Arc::new(Users)).unwrap();

    for (method, uri) in [
        (Method::GET, "/api/nothing"),
        (Method::POST, "/api/users/42"),
        (Method::GET, "/api/users/42/extra"),
    ] {
        let response = router.handle(request(method, uri)).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(
            body_json(response).await,
            json!({ "sucess": false, "message": "Not Found" })
        );
    }
}

#[tokio::test]
async fn test_failing_controller_middleware_uses_router_error_handler() {
    let mut router = ApiRouter::new("", Arc::new(Guarded)).unwrap();
    router.on_error(|err, req| async move {
        response::json(
            StatusCode::SERVICE_UNAVAILABLE,
            json!({ "handler": "router", "error": err.to_string(), "path": req.path() }),
        )
    });

    let response = router.handle(request(Method::GET, "/api/secure")).await;
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(
        body_json(response).await,
        json!({ "handler": "router", "error": "middleware exploded", "path": "/api/secure" })
    );
}

#[tokio::test]
async fn test_route_error_handler_takes_precedence() {
    let mut router = ApiRouter::new("", Arc::new(Guarded)).unwrap();
    router.on_error(|_err, _req| async move { StatusCode::SERVICE_UNAVAILABLE.into_response() });

    let response = router.handle(request(Method::GET, "/api/other")).await;
    assert_eq!(response.status(), StatusCode::IM_A_TEAPOT);
    assert_eq!(
        body_json(response).await,
        json!({ "handler": "route", "error": "middleware exploded", "path": "/api/other" })
    );
}

#[tokio::test]
async fn test_builtin_fallback_without_error_handlers() {
    let router = ApiRouter::new("", Arc::new(Guarded)).unwrap();

    let response = router.handle(request(Method::GET, "/api/secure")).await;
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        body_json(response).await,
        json!({ "success": false, "message": "Internal Server Error", "path": "/api/secure" })
    );
}

#[tokio::test]
async fn test_panicking_error_handler_yields_fallback_response() {
    let mut router = ApiRouter::new("", Arc::new(Guarded)).unwrap();
    router.on_error(|err, _req| async move {
        if err.status().is_server_error() {
            panic!("error handler bug");
        }
        StatusCode::OK.into_response()
    });

    let response = router.handle(request(Method::GET, "/api/secure")).await;
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        body_json(response).await,
        json!({ "success": false, "message": "Internal Server Error", "path": "/api/secure" })
    );
}

#[tokio::test]
async fn test_short_circuit_skips_terminal_handler() {
    let gate = Arc::new(Gate::default());
    let router = ApiRouter::new("", Arc::clone(&gate)).unwrap();

    let response = router.handle(request(Method::GET, "/api/gate")).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert_eq!(body_text(response).await, "denied by middleware");
    assert_eq!(gate.terminal_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_controller_middleware_runs_before_route_middleware() {
    let orders = ApiRouter::new("", Arc::new(Orders)).unwrap();
    let invoices = ApiRouter::new("", Arc::new(Invoices)).unwrap();

    let response = orders.handle(request(Method::GET, "/api/orders")).await;
    assert_eq!(body_text(response).await, "auth,audit,orders.list");

    let response = invoices.handle(request(Method::GET, "/api/invoices")).await;
    assert_eq!(
        body_text(response).await,
        "auth,audit,invoices.list,invoices.cache"
    );
}

#[tokio::test]
async fn test_first_registered_match_wins() {
    let router = ApiRouter::new("", Arc::new(Catalog)).unwrap();

    // The POST route is skipped on method, then `/things/:id` wins over the
    // more specific `/things/special` because it was declared first.
    let response = router.handle(request(Method::GET, "/api/things/special")).await;
    assert_eq!(body_text(response).await, "by_id");

    let response = router.handle(request(Method::POST, "/api/things/special")).await;
    assert_eq!(body_text(response).await, "post_special");
}

#[tokio::test]
async fn test_panicking_handler_yields_fallback_response() {
    let router = ApiRouter::new("", Arc::new(Catalog)).unwrap();

    let response = router.handle(request(Method::GET, "/api/boom")).await;
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body_json(response).await["path"], "/api/boom");

    // The table is unaffected by the failure.
    let response = router.handle(request(Method::GET, "/api/things/1")).await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_head_binding_shares_get_dispatch() {
    let handlers = create_route(Arc::new(Users), "").unwrap();

    let via_get = (handlers.get)(request(Method::GET, "/api/users/7")).await;
    let via_head = (handlers.head)(request(Method::HEAD, "/api/users/7")).await;

    assert_eq!(via_get.status(), StatusCode::OK);
    assert_eq!(via_head.status(), via_get.status());
    assert_eq!(body_json(via_get).await, body_json(via_head).await);

    let missing = (handlers.head)(request(Method::HEAD, "/api/users/7/extra")).await;
    assert_eq!(missing.status(), StatusCode::NOT_FOUND);

    for method in [
        Method::GET,
        Method::POST,
        Method::PUT,
        Method::PATCH,
        Method::DELETE,
        Method::OPTIONS,
        Method::HEAD,
    ] {
        assert!(handlers.for_method(&method).is_some());
    }
    assert!(handlers.for_method(&Method::TRACE).is_none());
}

#[tokio::test]
async fn test_declared_head_route_wins_over_get_fallback() {
    let router = ApiRouter::new("", Arc::new(Assets)).unwrap();

    let response = router.handle(request(Method::HEAD, "/api/assets/logo")).await;
    assert_eq!(body_text(response).await, "head logo");

    let response = router.handle(request(Method::HEAD, "/api/assets/app.css")).await;
    assert_eq!(body_text(response).await, "get app.css");

    // Only GET routes are consulted on fallback.
    let response = router.handle(request(Method::HEAD, "/api/uploads")).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_mounted_bindings_answer_head_like_get() {
    let app = create_route(Arc::new(Users), "").unwrap().into_router();

    let via_get = app
        .clone()
        .oneshot(request(Method::GET, "/api/users/7"))
        .await
        .unwrap();
    let via_head = app
        .oneshot(request(Method::HEAD, "/api/users/7"))
        .await
        .unwrap();

    assert_eq!(via_get.status(), StatusCode::OK);
    assert_eq!(via_head.status(), via_get.status());
    assert_eq!(
        via_head.headers().get("content-type"),
        via_get.headers().get("content-type")
    );
}

#[tokio::test]
async fn test_mounted_bindings_serve_through_axum() {
    let app = create_route(Arc::new(Users), "").unwrap().into_router();

    let response = app
        .clone()
        .oneshot(request(Method::GET, "/api/users/9"))
        .await
        .unwrap();
    assert_eq!(body_json(response).await["id"], "9");

    let response = app.oneshot(request(Method::GET, "/")).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
