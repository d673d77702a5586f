use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use kvstore::Store;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::errors::JsonApiError;

/// Store namespace holding the app documents.
pub const APPS_NAMESPACE: &str = "apps";

#[derive(Debug, Serialize, Deserialize, utoipa::ToSchema)]
pub struct AppName {
    /// App name
    #[schema(example = "My App")]
    pub name: String,
}

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct AppData {
    /// App data
    #[schema(value_type = Object, example = json!({"any_data": "you_like_goes_here"}))]
    pub data: Value,
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct AppWithData {
    pub name: String,
    #[schema(value_type = Object)]
    pub data: Value,
}

#[derive(Clone)]
pub struct ServerState {
    pub store: Arc<Store>,
}

#[utoipa::path(
    get, path = "/apps", tag = "apps",
    responses(
        (status = 200, description = "List of apps", body = [AppName])
    )
)]
pub async fn list_apps(State(state): State<ServerState>) -> Json<Vec<AppName>> {
    debug!("listing all apps");
    let names = state.store.keys(APPS_NAMESPACE).await;
    Json(names.into_iter().map(|name| AppName { name }).collect())
}

#[utoipa::path(
    get, path = "/apps/{appid}", tag = "apps",
    params(("appid" = String, Path, description = "App name")),
    responses(
        (status = 200, description = "App with its data", body = AppWithData),
        (status = 404, description = "App not found.")
    )
)]
pub async fn get_app(
    State(state): State<ServerState>,
    Path(appid): Path<String>,
) -> Result<Json<AppWithData>, JsonApiError> {
    debug!(app = %appid, "getting app");
    match state.store.retrieve(APPS_NAMESPACE, &appid).await {
        Some(data) => Ok(Json(AppWithData { name: appid, data })),
        None => {
            debug!("no app found");
            Err(JsonApiError::not_found("App not found."))
        }
    }
}

/// Add, or change the data stored for, an app. The request body is a
/// JSON object whose `data` field holds the new data.
#[utoipa::path(
    put, path = "/apps/{appid}", tag = "apps",
    params(("appid" = String, Path, description = "App name")),
    request_body = AppData,
    responses(
        (status = 204, description = "App successfully updated."),
        (status = 400, description = "Validation Error")
    )
)]
pub async fn put_app(
    State(state): State<ServerState>,
    Path(appid): Path<String>,
    Json(payload): Json<Value>,
) -> Result<StatusCode, JsonApiError> {
    debug!(app = %appid, "updating app");
    let Some(data) = payload.get("data").cloned() else {
        return Err(JsonApiError::new(
            StatusCode::BAD_REQUEST,
            "Validation Error",
            Some("request body must be an object with a 'data' field".into()),
        ));
    };
    state
        .store
        .store(APPS_NAMESPACE, &appid, data)
        .await
        .map_err(JsonApiError::internal)?;
    Ok(StatusCode::NO_CONTENT)
}

/// Deleting an app that does not exist still succeeds with 204.
#[utoipa::path(
    delete, path = "/apps/{appid}", tag = "apps",
    params(("appid" = String, Path, description = "App name")),
    responses(
        (status = 204, description = "App successfully deleted.")
    )
)]
pub async fn delete_app(
    State(state): State<ServerState>,
    Path(appid): Path<String>,
) -> Result<StatusCode, JsonApiError> {
    debug!(app = %appid, "deleting app");
    state
        .store
        .delete(APPS_NAMESPACE, &appid)
        .await
        .map_err(JsonApiError::internal)?;
    Ok(StatusCode::NO_CONTENT)
}
