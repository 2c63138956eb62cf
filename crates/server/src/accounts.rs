//! Account API endpoints

use api_types::Created;
use api_types::account::{
    AccountBalance, AccountKind as ApiKind, AccountNew, AccountUpdate, AccountView,
};
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use ledger::MoneyCents;
use uuid::Uuid;

use crate::{ServerError, server::ServerState};

fn map_kind(kind: ledger::AccountKind) -> ApiKind {
    match kind {
        ledger::AccountKind::Cash => ApiKind::Cash,
        ledger::AccountKind::Checking => ApiKind::Checking,
        ledger::AccountKind::Savings => ApiKind::Savings,
        ledger::AccountKind::CreditCard => ApiKind::CreditCard,
        ledger::AccountKind::LineOfCredit => ApiKind::LineOfCredit,
        ledger::AccountKind::Mortgage => ApiKind::Mortgage,
        ledger::AccountKind::Loan => ApiKind::Loan,
        ledger::AccountKind::Asset => ApiKind::Asset,
        ledger::AccountKind::Liability => ApiKind::Liability,
    }
}

fn ledger_kind(kind: ApiKind) -> ledger::AccountKind {
    match kind {
        ApiKind::Cash => ledger::AccountKind::Cash,
        ApiKind::Checking => ledger::AccountKind::Checking,
        ApiKind::Savings => ledger::AccountKind::Savings,
        ApiKind::CreditCard => ledger::AccountKind::CreditCard,
        ApiKind::LineOfCredit => ledger::AccountKind::LineOfCredit,
        ApiKind::Mortgage => ledger::AccountKind::Mortgage,
        ApiKind::Loan => ledger::AccountKind::Loan,
        ApiKind::Asset => ledger::AccountKind::Asset,
        ApiKind::Liability => ledger::AccountKind::Liability,
    }
}

fn view(model: ledger::accounts::Model) -> Result<AccountView, ServerError> {
    let kind = ledger::AccountKind::try_from(model.kind.as_str())?;
    Ok(AccountView {
        id: model.id,
        name: model.name,
        kind: map_kind(kind),
        tracked: model.tracked,
        balance_minor: model.balance_minor,
    })
}

pub async fn list(
    State(state): State<ServerState>,
) -> Result<Json<Vec<AccountView>>, ServerError> {
    let accounts = state.ledger.list_accounts().await?;
    let views = accounts.into_iter().map(view).collect::<Result<_, _>>()?;
    Ok(Json(views))
}

pub async fn get(
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<Json<AccountView>, ServerError> {
    let account = state.ledger.account(id).await?;
    Ok(Json(view(account)?))
}

pub async fn get_by_name(
    State(state): State<ServerState>,
    Path(name): Path<String>,
) -> Result<Json<AccountView>, ServerError> {
    let account = state.ledger.account_by_name(&name).await?;
    Ok(Json(view(account)?))
}

pub async fn balance(
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<Json<AccountBalance>, ServerError> {
    let balance = state.ledger.account_balance(id).await?;
    Ok(Json(AccountBalance {
        balance_minor: balance.cents(),
    }))
}

/// Handle requests for creating a new account.
///
/// A positive opening balance is posted as a starting transaction.
pub async fn create(
    State(state): State<ServerState>,
    Json(payload): Json<AccountNew>,
) -> Result<(StatusCode, Json<Created>), ServerError> {
    let id = state
        .ledger
        .new_account(ledger::NewAccount {
            name: payload.name,
            kind: ledger_kind(payload.kind),
            tracked: payload.tracked,
            opening_balance: MoneyCents::new(payload.opening_balance_minor),
        })
        .await?;

    Ok((StatusCode::CREATED, Json(Created { id })))
}

pub async fn update(
    State(state): State<ServerState>,
    Json(payload): Json<AccountUpdate>,
) -> Result<StatusCode, ServerError> {
    state
        .ledger
        .rename_account(payload.account_id, &payload.name)
        .await?;

    Ok(StatusCode::OK)
}

/// Handle requests for deleting an account.
///
/// Refused with a conflict while the account still carries a balance.
pub async fn delete(
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ServerError> {
    state.ledger.delete_account(id).await?;
    Ok(StatusCode::OK)
}
