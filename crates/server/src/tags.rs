//! Tag API endpoints

use api_types::Created;
use api_types::tag::{TagNew, TagUpdate, TagView};
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use uuid::Uuid;

use crate::{ServerError, server::ServerState};

fn view(model: ledger::tags::Model) -> TagView {
    TagView {
        id: model.id,
        name: model.name,
    }
}

pub async fn list(State(state): State<ServerState>) -> Result<Json<Vec<TagView>>, ServerError> {
    let tags = state.ledger.list_tags().await?;
    Ok(Json(tags.into_iter().map(view).collect()))
}

pub async fn get(
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<Json<TagView>, ServerError> {
    let tag = state.ledger.tag(id).await?;
    Ok(Json(view(tag)))
}

pub async fn create(
    State(state): State<ServerState>,
    Json(payload): Json<TagNew>,
) -> Result<(StatusCode, Json<Created>), ServerError> {
    let id = state.ledger.new_tag(&payload.name).await?;
    Ok((StatusCode::CREATED, Json(Created { id })))
}

pub async fn update(
    State(state): State<ServerState>,
    Json(payload): Json<TagUpdate>,
) -> Result<StatusCode, ServerError> {
    state.ledger.rename_tag(payload.tag_id, &payload.name).await?;
    Ok(StatusCode::OK)
}

pub async fn delete(
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ServerError> {
    state.ledger.delete_tag(id).await?;
    Ok(StatusCode::OK)
}
