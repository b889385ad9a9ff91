//! Reading and replacing the locally edited SDL.

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use std::sync::Arc;
use tracing::{info, warn};

use crate::adapters::metrics_handler::MetricsCollector;
use crate::domain::StoreError;
use crate::schema::{SchemaMode, SchemaStore};

#[derive(Clone)]
pub struct SdlState {
    pub store: Arc<SchemaStore>,
    pub metrics: Arc<MetricsCollector>,
}

#[derive(Debug, Serialize)]
pub struct UserSdl {
    #[serde(rename = "schemaSDL")]
    pub schema_sdl: String,
    #[serde(rename = "extensionSDL")]
    pub extension_sdl: Option<String>,
}

/// `GET /user-sdl`: the base document and, in proxy mode, the local extension
pub async fn get_user_sdl(State(state): State<SdlState>) -> Json<UserSdl> {
    let local = state.store.local_sdl().to_string();
    let sdl = match state.store.mode() {
        SchemaMode::Mock => UserSdl {
            schema_sdl: local,
            extension_sdl: None,
        },
        SchemaMode::Proxy { remote_sdl } => UserSdl {
            schema_sdl: remote_sdl.clone(),
            extension_sdl: Some(local),
        },
    };
    Json(sdl)
}

/// `POST /user-sdl`: validates the new SDL, saves it and starts serving it
pub async fn post_user_sdl(State(state): State<SdlState>, body: String) -> Response {
    let store = state.store.clone();
    // building and writing the file are blocking
    let saved = tokio::task::spawn_blocking(move || store.save(body)).await;

    let result = match saved {
        Ok(result) => result,
        Err(e) => {
            return (StatusCode::INTERNAL_SERVER_ERROR, format!("Failed to save SDL: {e}"))
                .into_response()
        }
    };
    match result {
        Ok(schema) => {
            state
                .metrics
                .schema_reloads_total
                .with_label_values(&["success"])
                .inc();
            info!(types = schema.schema.types.len(), "SDL saved");
            (StatusCode::OK, "ok").into_response()
        }
        Err(StoreError::Schema(error)) => {
            state
                .metrics
                .schema_reloads_total
                .with_label_values(&["failure"])
                .inc();
            warn!(%error, "Rejected SDL update");
            (StatusCode::BAD_REQUEST, error.messages().join("\n")).into_response()
        }
        Err(error) => {
            warn!(%error, "Failed to save SDL");
            (StatusCode::INTERNAL_SERVER_ERROR, error.to_string()).into_response()
        }
    }
}
