//! Goal API endpoints

use api_types::Created;
use api_types::goal::{GoalList, GoalNew, GoalUpdate, GoalView};
use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use ledger::MoneyCents;
use uuid::Uuid;

use crate::{ServerError, server::ServerState};

fn view(model: ledger::goals::Model) -> GoalView {
    GoalView {
        id: model.id,
        name: model.name,
        description: model.description,
        category_id: model.category_id,
        amount_minor: model.amount_minor,
        start_date: model.start_date,
        end_date: model.end_date,
        schedule_id: model.schedule_id,
    }
}

pub async fn list(
    State(state): State<ServerState>,
    Query(params): Query<GoalList>,
) -> Result<Json<Vec<GoalView>>, ServerError> {
    let archived = params.archived.unwrap_or(false);
    let goals = state.ledger.list_goals(archived).await?;
    Ok(Json(goals.into_iter().map(view).collect()))
}

pub async fn get(
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<Json<GoalView>, ServerError> {
    let goal = state.ledger.goal(id, false).await?;
    Ok(Json(view(goal)))
}

pub async fn create(
    State(state): State<ServerState>,
    Json(payload): Json<GoalNew>,
) -> Result<(StatusCode, Json<Created>), ServerError> {
    let id = state
        .ledger
        .new_goal(ledger::NewGoal {
            name: payload.name,
            description: payload.description,
            category_id: payload.category_id,
            amount: payload.amount_minor.map(MoneyCents::new),
            start_date: payload.start_date,
            end_date: payload.end_date,
            schedule_id: payload.schedule_id,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(Created { id })))
}

/// Handle requests for replacing a goal. Absent optional fields clear
/// the stored values.
pub async fn update(
    State(state): State<ServerState>,
    Json(payload): Json<GoalUpdate>,
) -> Result<StatusCode, ServerError> {
    state
        .ledger
        .update_goal(
            payload.goal_id,
            ledger::GoalUpdate {
                name: payload.name,
                description: payload.description,
                category_id: payload.category_id,
                amount: payload.amount_minor.map(MoneyCents::new),
                start_date: payload.start_date,
                end_date: payload.end_date,
                schedule_id: payload.schedule_id,
            },
        )
        .await?;

    Ok(StatusCode::OK)
}

/// Handle requests for archiving a goal (soft delete, idempotent).
pub async fn archive(
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ServerError> {
    state.ledger.archive_goal(id).await?;
    Ok(StatusCode::OK)
}

/// Handle requests for permanently deleting a goal, archived or not.
pub async fn purge(
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ServerError> {
    state.ledger.purge_goal(id).await?;
    Ok(StatusCode::OK)
}
