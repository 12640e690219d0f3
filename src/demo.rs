//! In-memory users controller served by the binary.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};
use std::time::Instant;

use api_router::http::response;
use api_router::{from_fn, ApiError, ApiRequest, Controller, HandlerResult, Middleware, Next, Registry};
use axum::http::{header, Method, StatusCode};
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};
use serde_json::json;

#[derive(Debug, Clone, Serialize)]
pub struct User {
    pub id: u64,
    pub name: String,
}

#[derive(Debug, Deserialize)]
struct NewUser {
    name: String,
}

#[derive(Default)]
pub struct UsersController {
    users: RwLock<BTreeMap<u64, User>>,
    next_id: AtomicU64,
}

impl UsersController {
    pub fn new() -> Self {
        Self::default()
    }

    async fn list(self: Arc<Self>, _req: ApiRequest, _next: Next) -> HandlerResult {
        let users: Vec<User> = self.read()?.values().cloned().collect();
        Ok(response::json(StatusCode::OK, users))
    }

    async fn show(self: Arc<Self>, req: ApiRequest, _next: Next) -> HandlerResult {
        let id = user_id(&req)?;
        let user = self
            .read()?
            .get(&id)
            .cloned()
            .ok_or_else(|| ApiError::not_found(format!("User {} not found", id)))?;
        Ok(response::json(StatusCode::OK, user))
    }

    async fn create(self: Arc<Self>, req: ApiRequest, _next: Next) -> HandlerResult {
        let input: NewUser = req.json()?;
        if input.name.trim().is_empty() {
            return Err(ApiError::bad_request("name must not be empty"));
        }

        let id = self.next_id.fetch_add(1, Ordering::Relaxed) + 1;
        let user = User { id, name: input.name };
        self.write()?.insert(id, user.clone());

        tracing::info!(user_id = id, "User created");
        Ok(response::json(StatusCode::CREATED, user))
    }

    async fn remove(self: Arc<Self>, req: ApiRequest, _next: Next) -> HandlerResult {
        let id = user_id(&req)?;
        match self.write()?.remove(&id) {
            Some(_) => Ok(StatusCode::NO_CONTENT.into_response()),
            None => Err(ApiError::not_found(format!("User {} not found", id))),
        }
    }

    fn read(&self) -> Result<std::sync::RwLockReadGuard<'_, BTreeMap<u64, User>>, ApiError> {
        self.users
            .read()
            .map_err(|_| ApiError::handler("user store lock poisoned"))
    }

    fn write(&self) -> Result<std::sync::RwLockWriteGuard<'_, BTreeMap<u64, User>>, ApiError> {
        self.users
            .write()
            .map_err(|_| ApiError::handler("user store lock poisoned"))
    }
}

impl Controller for UsersController {
    fn register(registry: &mut Registry<Self>) {
        registry
            .register_controller_middleware([log_requests()])
            .request_mapping("/users", Method::GET, "list", Self::list)
            .request_mapping("/users/:id", Method::GET, "show", Self::show)
            .request_mapping("/users", Method::POST, "create", Self::create)
            .request_mapping("/users/:id", Method::DELETE, "remove", Self::remove)
            .register_route_middleware("create", [require_json()]);
    }
}

/// Render handler failures with their own status and message.
pub async fn render_error(err: ApiError, req: ApiRequest) -> Response {
    response::json(
        err.status(),
        json!({
            "success": false,
            "message": err.to_string(),
            "path": req.path(),
        }),
    )
}

fn user_id(req: &ApiRequest) -> Result<u64, ApiError> {
    req.param("id")
        .and_then(|id| id.parse().ok())
        .ok_or_else(|| ApiError::bad_request("id must be a positive integer"))
}

fn log_requests() -> Arc<dyn Middleware> {
    from_fn(|req: ApiRequest, next: Next| async move {
        let start = Instant::now();
        let method = req.method().clone();
        let path = req.path().to_string();

        let result = next.run(req).await;
        let status = result
            .as_ref()
            .map(|r| r.status().as_u16())
            .unwrap_or_else(|e| e.status().as_u16());
        tracing::info!(
            method = %method,
            path = %path,
            status,
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Handled request"
        );
        result
    })
}

fn require_json() -> Arc<dyn Middleware> {
    from_fn(|req: ApiRequest, next: Next| async move {
        let is_json = req
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|v| v.starts_with("application/json"));

        if !is_json {
            return Ok(response::error_response(
                StatusCode::UNSUPPORTED_MEDIA_TYPE,
                req.path(),
            ));
        }
        next.run(req).await
    })
}
