//! Budget API endpoints

use api_types::Created;
use api_types::budget::{
    BudgetMonthCategoryView, BudgetMonthUpdate, BudgetNew, BudgetUpdate, BudgetView,
};
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use uuid::Uuid;

use crate::{ServerError, server::ServerState};
use ledger::{BudgetMonthCategoryRow, MoneyCents};

fn view(model: ledger::budgets::Model) -> BudgetView {
    BudgetView {
        id: model.id,
        name: model.name,
    }
}

fn month_view(row: BudgetMonthCategoryRow) -> BudgetMonthCategoryView {
    BudgetMonthCategoryView {
        id: row.id,
        category_id: row.category_id,
        category_name: row.category_name,
        budgeted_minor: row.budgeted.cents(),
        spent_minor: row.spent.cents(),
        available_minor: row.available.cents(),
    }
}

pub async fn list(State(state): State<ServerState>) -> Result<Json<Vec<BudgetView>>, ServerError> {
    let budgets = state.ledger.list_budgets().await?;
    Ok(Json(budgets.into_iter().map(view).collect()))
}

pub async fn get(
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<Json<BudgetView>, ServerError> {
    let budget = state.ledger.budget(id).await?;
    Ok(Json(view(budget)))
}

/// Handle requests for one budget month, category lines with budgeted,
/// spent and available amounts.
pub async fn month(
    State(state): State<ServerState>,
    Path((id, year, month)): Path<(Uuid, i32, i32)>,
) -> Result<Json<Vec<BudgetMonthCategoryView>>, ServerError> {
    let rows = state.ledger.budget_month(id, year, month).await?;
    Ok(Json(rows.into_iter().map(month_view).collect()))
}

pub async fn current_month(
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<BudgetMonthCategoryView>>, ServerError> {
    let rows = state.ledger.current_budget_month(id).await?;
    Ok(Json(rows.into_iter().map(month_view).collect()))
}

pub async fn create(
    State(state): State<ServerState>,
    Json(payload): Json<BudgetNew>,
) -> Result<(StatusCode, Json<Created>), ServerError> {
    let id = state.ledger.new_budget(&payload.name).await?;
    Ok((StatusCode::CREATED, Json(Created { id })))
}

pub async fn update(
    State(state): State<ServerState>,
    Json(payload): Json<BudgetUpdate>,
) -> Result<StatusCode, ServerError> {
    state
        .ledger
        .rename_budget(payload.budget_id, &payload.name)
        .await?;

    Ok(StatusCode::OK)
}

/// Handle requests for setting one category's budgeted amount in a month,
/// creating the month row on first use.
pub async fn set_month(
    State(state): State<ServerState>,
    Json(payload): Json<BudgetMonthUpdate>,
) -> Result<Json<Created>, ServerError> {
    let id = state
        .ledger
        .set_budget_month_category(
            payload.budget_id,
            payload.year,
            payload.month,
            payload.category_id,
            MoneyCents::new(payload.budgeted_minor),
        )
        .await?;

    Ok(Json(Created { id }))
}

pub async fn delete(
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ServerError> {
    state.ledger.delete_budget(id).await?;
    Ok(StatusCode::OK)
}
