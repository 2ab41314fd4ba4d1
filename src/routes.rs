use axum::{
    extract::DefaultBodyLimit,
    http::{header, HeaderValue, Method, StatusCode, Uri},
    middleware::map_response,
    response::{IntoResponse, Response},
    routing::{get, patch, post},
    Router,
};
use std::sync::Arc;
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    trace::TraceLayer,
};

use crate::config::{AppConfig, SecurityConfig};
use crate::database::store::DocumentStore;
use crate::error::ApiError;
use crate::handlers::{contacts, public, resource, teachers, users};
use crate::resources::{Resource, ResourceService, BANNERS, CONTACTS, HIGHLIGHTS, TEACHERS, USERS};

/// State shared by handlers that need the raw store
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn DocumentStore>,
}

/// Build the full application router over an already-opened store
pub fn app(store: Arc<dyn DocumentStore>, config: &AppConfig) -> Router {
    let service = |resource: &'static Resource| ResourceService::new(store.clone(), resource);

    let mut router = Router::new()
        // Public
        .route("/", get(public::root))
        .route("/health", get(public::health))
        // Resources
        .merge(teacher_routes(service(&TEACHERS)))
        .merge(user_routes(service(&USERS)))
        .merge(contact_routes(service(&CONTACTS)))
        .merge(collection_routes("/banners", service(&BANNERS)))
        .merge(collection_routes("/exam-hero-highlights", service(&HIGHLIGHTS)))
        .fallback(unknown_route)
        .layer(DefaultBodyLimit::max(config.api.max_request_size_bytes))
        .layer(map_response(method_not_allowed_body))
        .with_state(AppState { store: store.clone() });

    // Global middleware
    if config.security.enable_cors {
        router = router.layer(cors_layer(&config.security));
    }
    if config.api.enable_request_logging {
        router = router.layer(TraceLayer::new_for_http());
    }
    router
}

/// Create, list, show, update and delete under `base`
fn collection_routes(base: &str, service: ResourceService) -> Router<AppState> {
    Router::new()
        .route(base, post(resource::create).get(resource::list))
        .route(
            &format!("{}/:id", base),
            get(resource::show).put(resource::update).delete(resource::delete),
        )
        .with_state(service)
}

fn teacher_routes(service: ResourceService) -> Router<AppState> {
    Router::new()
        .route("/teachers", post(resource::create).get(teachers::list_approved))
        .route("/admin/teachers", get(resource::list))
        .route(
            "/teachers/:id",
            get(resource::show).put(resource::update).delete(resource::delete),
        )
        .route("/teachers/:id/status", patch(resource::update_status))
        .with_state(service)
}

fn user_routes(service: ResourceService) -> Router<AppState> {
    Router::new()
        .route("/users", post(resource::create).get(resource::list))
        .route("/users/email/:email", get(users::show_by_email))
        .route(
            "/users/:id",
            get(resource::show).put(resource::update).delete(resource::delete),
        )
        .route("/users/:id/role", patch(users::update_role))
        .with_state(service)
}

fn contact_routes(service: ResourceService) -> Router<AppState> {
    Router::new()
        .route("/contacts", post(resource::create).get(contacts::list))
        .route(
            "/contacts/:id",
            get(resource::show).put(resource::update).delete(resource::delete),
        )
        .route("/contacts/:id/status", patch(resource::update_status))
        .with_state(service)
}

fn cors_layer(security: &SecurityConfig) -> CorsLayer {
    if security.cors_origins.is_empty() {
        return CorsLayer::permissive();
    }

    let origins: Vec<HeaderValue> = security
        .cors_origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin: {}", origin);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods(Any)
        .allow_headers(Any)
}

async fn unknown_route(uri: Uri) -> ApiError {
    ApiError::not_found(format!("No route for {}", uri.path()))
}

/// Give the router's bare 405 the error envelope, keeping its `Allow` header
async fn method_not_allowed_body(method: Method, uri: Uri, response: Response) -> Response {
    if response.status() != StatusCode::METHOD_NOT_ALLOWED || response.headers().contains_key(header::CONTENT_TYPE) {
        return response;
    }

    let allow = response.headers().get(header::ALLOW).cloned();
    let mut replaced = ApiError::method_not_allowed(format!("{} is not supported on {}", method, uri.path())).into_response();
    if let Some(allow) = allow {
        replaced.headers_mut().insert(header::ALLOW, allow);
    }
    replaced
}
