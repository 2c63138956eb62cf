//! Schedule API endpoints

use api_types::Created;
use api_types::schedule::{
    ScheduleFrequency as ApiFrequency, ScheduleNew, ScheduleUpdate, ScheduleView,
};
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use uuid::Uuid;

use crate::{ServerError, server::ServerState};

fn map_frequency(frequency: ledger::ScheduleFrequency) -> ApiFrequency {
    match frequency {
        ledger::ScheduleFrequency::Year => ApiFrequency::Year,
        ledger::ScheduleFrequency::Month => ApiFrequency::Month,
        ledger::ScheduleFrequency::Week => ApiFrequency::Week,
        ledger::ScheduleFrequency::Day => ApiFrequency::Day,
    }
}

fn ledger_frequency(frequency: ApiFrequency) -> ledger::ScheduleFrequency {
    match frequency {
        ApiFrequency::Year => ledger::ScheduleFrequency::Year,
        ApiFrequency::Month => ledger::ScheduleFrequency::Month,
        ApiFrequency::Week => ledger::ScheduleFrequency::Week,
        ApiFrequency::Day => ledger::ScheduleFrequency::Day,
    }
}

fn view(model: ledger::schedules::Model) -> Result<ScheduleView, ServerError> {
    let frequency = ledger::ScheduleFrequency::try_from(model.frequency.as_str())?;
    Ok(ScheduleView {
        id: model.id,
        frequency: map_frequency(frequency),
        interval: model.interval,
        display_name: model.display_name,
        display_order: model.display_order,
        is_editable: model.is_editable,
    })
}

pub async fn list(
    State(state): State<ServerState>,
) -> Result<Json<Vec<ScheduleView>>, ServerError> {
    let schedules = state.ledger.list_schedules().await?;
    let views = schedules.into_iter().map(view).collect::<Result<_, _>>()?;
    Ok(Json(views))
}

pub async fn get(
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ScheduleView>, ServerError> {
    let schedule = state.ledger.schedule(id).await?;
    Ok(Json(view(schedule)?))
}

pub async fn create(
    State(state): State<ServerState>,
    Json(payload): Json<ScheduleNew>,
) -> Result<(StatusCode, Json<Created>), ServerError> {
    let id = state
        .ledger
        .new_schedule(ledger::NewSchedule {
            frequency: ledger_frequency(payload.frequency),
            interval: payload.interval,
            display_name: payload.display_name,
            display_order: payload.display_order,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(Created { id })))
}

/// Handle requests for replacing a schedule. Seeded schedules refuse it.
pub async fn update(
    State(state): State<ServerState>,
    Json(payload): Json<ScheduleUpdate>,
) -> Result<StatusCode, ServerError> {
    state
        .ledger
        .update_schedule(
            payload.schedule_id,
            ledger::ScheduleUpdate {
                frequency: ledger_frequency(payload.frequency),
                interval: payload.interval,
                display_name: payload.display_name,
                display_order: payload.display_order,
            },
        )
        .await?;

    Ok(StatusCode::OK)
}

pub async fn delete(
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ServerError> {
    state.ledger.delete_schedule(id).await?;
    Ok(StatusCode::OK)
}
