//! Category API endpoints

use api_types::Created;
use api_types::category::{CategoryNew, CategoryUpdate, CategoryView};
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use uuid::Uuid;

use crate::{ServerError, server::ServerState};

fn view(model: ledger::categories::Model) -> CategoryView {
    CategoryView {
        id: model.id,
        name: model.name,
        is_editable: model.is_editable,
    }
}

pub async fn list(
    State(state): State<ServerState>,
) -> Result<Json<Vec<CategoryView>>, ServerError> {
    let categories = state.ledger.list_categories().await?;
    Ok(Json(categories.into_iter().map(view).collect()))
}

pub async fn get(
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<Json<CategoryView>, ServerError> {
    let category = state.ledger.category(id).await?;
    Ok(Json(view(category)))
}

pub async fn create(
    State(state): State<ServerState>,
    Json(payload): Json<CategoryNew>,
) -> Result<(StatusCode, Json<Created>), ServerError> {
    let id = state.ledger.new_category(&payload.name).await?;
    Ok((StatusCode::CREATED, Json(Created { id })))
}

/// Handle requests for renaming a category. Seeded categories refuse it.
pub async fn update(
    State(state): State<ServerState>,
    Json(payload): Json<CategoryUpdate>,
) -> Result<StatusCode, ServerError> {
    state
        .ledger
        .rename_category(payload.category_id, &payload.name)
        .await?;

    Ok(StatusCode::OK)
}

pub async fn delete(
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ServerError> {
    state.ledger.delete_category(id).await?;
    Ok(StatusCode::OK)
}
