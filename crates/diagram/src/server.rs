// SPDX-License-Identifier: MIT
//! Thin HTTP surface over [`DiagramStore`] (C8, §4.6).

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};

use crate::error::DiagramError;
use crate::store::{DiagramArtifact, DiagramMetadata, DiagramStore};

pub fn router(store: Arc<DiagramStore>) -> Router {
    Router::new()
        .route("/api/diagrams/list", get(list_diagrams))
        .route("/api/diagram/:config_type/:diagram_name", get(get_diagram))
        .route("/api/diagram/:config_type/metadata", get(get_metadata))
        .with_state(store)
}

async fn list_diagrams(State(store): State<Arc<DiagramStore>>) -> Result<Json<Vec<String>>, ApiError> {
    Ok(Json(store.list_config_types()?))
}

async fn get_diagram(
    State(store): State<Arc<DiagramStore>>,
    Path((config_type, diagram_name)): Path<(String, String)>,
) -> Result<Json<DiagramArtifact>, ApiError> {
    Ok(Json(store.load_diagram(&config_type, &diagram_name)?))
}

async fn get_metadata(
    State(store): State<Arc<DiagramStore>>,
    Path(config_type): Path<String>,
) -> Result<Json<DiagramMetadata>, ApiError> {
    Ok(Json(store.load_config_metadata(&config_type)?))
}

struct ApiError(DiagramError);

impl From<DiagramError> for ApiError {
    fn from(err: DiagramError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self.0 {
            DiagramError::NotFound(key) => (StatusCode::NOT_FOUND, format!("not found: {key}")).into_response(),
            other => {
                tracing::warn!(error = %other, "diagram provider I/O failure");
                (StatusCode::INTERNAL_SERVER_ERROR, "diagram artifact unreadable").into_response()
            }
        }
    }
}
