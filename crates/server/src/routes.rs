use axum::{
    response::Redirect,
    routing::get,
    Json, Router,
};
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnFailure, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::{debug, Level};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use common::types::Health;

use crate::apps::{self, ServerState};
use crate::openapi::ApiDoc;

#[utoipa::path(
    get, path = "/health", tag = "health",
    responses((status = 200, description = "Service is up"))
)]
pub async fn health() -> Json<Health> {
    Json(Health { status: "ok" })
}

#[utoipa::path(
    get, path = "/schema", tag = "schema",
    responses((status = 200, description = "The OpenAPI schema"))
)]
pub async fn schema() -> Json<utoipa::openapi::OpenApi> {
    debug!("generating schema");
    Json(ApiDoc::openapi())
}

/// Build the full application router: the app data routes, schema and
/// health endpoints, and swagger-ui for exploration.
pub fn build_router(state: ServerState, cors: CorsLayer) -> Router {
    let api = Router::new()
        .route("/apps", get(apps::list_apps))
        .route(
            "/apps/:appid",
            get(apps::get_app)
                .put(apps::put_app)
                .delete(apps::delete_app),
        )
        .route("/schema", get(schema))
        .with_state(state);

    Router::new()
        // swagger-ui is reachable from the root URL, as the original
        // service advertised
        .route("/", get(|| async { Redirect::permanent("/swaggerui") }))
        .route("/health", get(health))
        .merge(api)
        .merge(SwaggerUi::new("/swaggerui").url("/schema.json", ApiDoc::openapi()))
        .layer(cors)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(
                    DefaultMakeSpan::new()
                        .level(Level::INFO)
                        .include_headers(false),
                )
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(
                    DefaultOnResponse::new()
                        .level(Level::INFO)
                        .include_headers(false),
                )
                .on_failure(DefaultOnFailure::new().level(Level::ERROR)),
        )
}
