//! Payee API endpoints

use api_types::Created;
use api_types::payee::{PayeeNew, PayeeUpdate, PayeeView};
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use uuid::Uuid;

use crate::{ServerError, server::ServerState};

fn view(model: ledger::payees::Model) -> PayeeView {
    PayeeView {
        id: model.id,
        name: model.name,
        default_category_id: model.default_category_id,
    }
}

pub async fn list(State(state): State<ServerState>) -> Result<Json<Vec<PayeeView>>, ServerError> {
    let payees = state.ledger.list_payees().await?;
    Ok(Json(payees.into_iter().map(view).collect()))
}

pub async fn get(
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<Json<PayeeView>, ServerError> {
    let payee = state.ledger.payee(id).await?;
    Ok(Json(view(payee)))
}

pub async fn create(
    State(state): State<ServerState>,
    Json(payload): Json<PayeeNew>,
) -> Result<(StatusCode, Json<Created>), ServerError> {
    let id = state
        .ledger
        .new_payee(ledger::NewPayee {
            name: payload.name,
            default_category_id: payload.default_category_id,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(Created { id })))
}

/// Handle requests for updating a payee.
///
/// An absent `default_category_id` leaves the stored default untouched.
pub async fn update(
    State(state): State<ServerState>,
    Json(payload): Json<PayeeUpdate>,
) -> Result<StatusCode, ServerError> {
    state
        .ledger
        .update_payee(
            payload.payee_id,
            ledger::PayeeUpdate {
                name: Some(payload.name),
                default_category_id: payload.default_category_id.map(Some),
            },
        )
        .await?;

    Ok(StatusCode::OK)
}

pub async fn delete(
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ServerError> {
    state.ledger.delete_payee(id).await?;
    Ok(StatusCode::OK)
}
