//! HTTP surface: `/auth/*` and `/health` on axum.
//!
//! Routes that need an identity sit behind a bearer-token route layer that
//! resolves the token to a [`User`] and binds it to the request extensions.

use axum::{
    extract::{Path, Request, State},
    http::{header, HeaderMap, StatusCode},
    middleware::{self, Next},
    response::Response,
    routing::{delete, get, post},
    Extension, Json, Router,
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::error::AuthError;
use crate::models::{Credentials, HealthResponse, MeResponse, MessageResponse, TokenResponse, User};
use crate::service::AuthService;

/// Collaborators shared by every handler.
#[derive(Clone)]
pub struct AppState {
    pub auth: AuthService,
    pub database_url_set: bool,
}

impl AppState {
    pub fn new(auth: AuthService, database_url_set: bool) -> Self {
        Self {
            auth,
            database_url_set,
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(register_handler, login_handler, me_handler, delete_profile_handler, health_handler),
    components(schemas(Credentials, TokenResponse, MeResponse, MessageResponse, HealthResponse)),
    tags((name = "authentication", description = "Account registration and bearer tokens"))
)]
pub struct ApiDoc;

/// Pull the token out of `Authorization: Bearer <token>`.
fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;
    let token = token.trim();
    (scheme.eq_ignore_ascii_case("bearer") && !token.is_empty()).then_some(token)
}

async fn auth_middleware(
    State(state): State<Arc<AppState>>,
    mut req: Request,
    next: Next,
) -> Result<Response, AuthError> {
    let token = bearer_token(req.headers()).ok_or(AuthError::Unauthorized)?;
    let user = state.auth.authenticate(token)?;

    req.extensions_mut().insert(user);
    Ok(next.run(req).await)
}

/// Build the router over the given collaborators.
pub fn create_router(state: AppState) -> Router {
    let state = Arc::new(state);

    let auth_routes = Router::new()
        .route("/auth/me", get(me_handler))
        .route("/auth/profile/:username", delete(delete_profile_handler))
        .route_layer(middleware::from_fn_with_state(state.clone(), auth_middleware));

    Router::new()
        .route("/auth/register", post(register_handler))
        .route("/auth/login", post(login_handler))
        .route("/health", get(health_handler))
        .merge(auth_routes)
        .merge(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Create an account and return a bearer token for it.
#[utoipa::path(
    post,
    path = "/auth/register",
    tag = "authentication",
    request_body = Credentials,
    responses(
        (status = 201, description = "Account created", body = TokenResponse),
        (status = 400, description = "Username missing or already taken")
    )
)]
async fn register_handler(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<Credentials>,
) -> Result<(StatusCode, Json<TokenResponse>), AuthError> {
    let auth = state.auth.clone();
    // bcrypt blocks
    let token = tokio::task::spawn_blocking(move || {
        auth.register(payload.username.as_deref(), &payload.password)
    })
    .await??;

    Ok((StatusCode::CREATED, Json(TokenResponse::bearer(token))))
}

/// Exchange credentials for a bearer token.
#[utoipa::path(
    post,
    path = "/auth/login",
    tag = "authentication",
    request_body = Credentials,
    responses(
        (status = 200, description = "Logged in", body = TokenResponse),
        (status = 401, description = "Missing username or invalid credentials")
    )
)]
async fn login_handler(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<Credentials>,
) -> Result<Json<TokenResponse>, AuthError> {
    let auth = state.auth.clone();
    let token = tokio::task::spawn_blocking(move || {
        auth.login(payload.username.as_deref(), &payload.password)
    })
    .await??;

    Ok(Json(TokenResponse::bearer(token)))
}

#[utoipa::path(
    get,
    path = "/auth/me",
    tag = "authentication",
    responses(
        (status = 200, description = "Authenticated identity", body = MeResponse),
        (status = 401, description = "Token missing, invalid, or account gone")
    )
)]
async fn me_handler(Extension(user): Extension<User>) -> Json<MeResponse> {
    Json(MeResponse {
        username: user.username,
    })
}

#[utoipa::path(
    delete,
    path = "/auth/profile/{username}",
    tag = "authentication",
    params(("username" = String, Path, description = "Account to delete")),
    responses(
        (status = 200, description = "Profile deleted", body = MessageResponse),
        (status = 401, description = "Not authenticated"),
        (status = 403, description = "Caller is not the profile owner")
    )
)]
async fn delete_profile_handler(
    State(state): State<Arc<AppState>>,
    Path(username): Path<String>,
    Extension(user): Extension<User>,
) -> Result<Json<MessageResponse>, AuthError> {
    state.auth.delete_profile(&username, &user)?;
    Ok(Json(MessageResponse {
        message: format!("User {username} profile deleted successfully"),
    }))
}

/// Liveness plus a hint whether storage was configured explicitly. The
/// store is pinged on every call; a failure is logged, not reported.
#[utoipa::path(
    get,
    path = "/health",
    responses((status = 200, description = "Service is up", body = HealthResponse))
)]
async fn health_handler(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    match state.auth.check_store() {
        Ok(()) => tracing::debug!("credential store reachable"),
        Err(e) => tracing::warn!(error = %e, "credential store unreachable"),
    }
    Json(HealthResponse {
        status: "ok".to_string(),
        database_url_set: state.database_url_set,
    })
}
