//! Transaction API endpoints

use api_types::Created;
use api_types::transaction::{
    MoveToPayee, MoveToPayeeResult, SplitNew, SplitView, TransactionNew,
    TransactionStatus as ApiStatus, TransactionTagView, TransactionUpdate, TransactionView,
};
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use uuid::Uuid;

use crate::{ServerError, server::ServerState};
use ledger::{MoneyCents, SplitDraft, TransactionCategory, TransactionFilter, TransactionInfo};

fn map_status(status: ledger::TransactionStatus) -> ApiStatus {
    match status {
        ledger::TransactionStatus::Pending => ApiStatus::Pending,
        ledger::TransactionStatus::Cleared => ApiStatus::Cleared,
    }
}

fn ledger_status(status: ApiStatus) -> ledger::TransactionStatus {
    match status {
        ApiStatus::Pending => ledger::TransactionStatus::Pending,
        ApiStatus::Cleared => ledger::TransactionStatus::Cleared,
    }
}

fn split_drafts(splits: Vec<SplitNew>) -> Vec<SplitDraft> {
    splits
        .into_iter()
        .map(|split| SplitDraft {
            category_id: split.category_id,
            amount: MoneyCents::new(split.amount_minor),
            notes: split.notes,
            position: split.order,
        })
        .collect()
}

fn view(info: TransactionInfo) -> TransactionView {
    let (category_id, category_name, splits) = match info.category {
        TransactionCategory::None => (None, None, Vec::new()),
        TransactionCategory::Single { category_id, name } => {
            (Some(category_id), Some(name), Vec::new())
        }
        TransactionCategory::Split(splits) => (
            None,
            Some("Split".to_string()),
            splits
                .into_iter()
                .map(|split| SplitView {
                    category_id: split.category_id,
                    category_name: split.category,
                    amount_minor: split.amount.cents(),
                    notes: split.notes,
                    order: split.position,
                })
                .collect(),
        ),
    };

    TransactionView {
        id: info.id,
        posted_on: info.posted_on,
        account_id: info.account_id,
        account_name: info.account,
        payee_id: info.payee_id,
        payee_name: info.payee,
        amount_minor: info.amount.cents(),
        notes: info.notes,
        status: map_status(info.status),
        category_id,
        category_name,
        tags: info
            .tags
            .into_iter()
            .map(|tag| TransactionTagView {
                tag_id: tag.id,
                tag_name: tag.name,
            })
            .collect(),
        splits,
    }
}

async fn list_filtered(
    state: ServerState,
    filter: TransactionFilter,
) -> Result<Json<Vec<TransactionView>>, ServerError> {
    let infos = state.ledger.list_transactions(filter).await?;
    Ok(Json(infos.into_iter().map(view).collect()))
}

pub async fn list(
    State(state): State<ServerState>,
) -> Result<Json<Vec<TransactionView>>, ServerError> {
    list_filtered(state, TransactionFilter::All).await
}

pub async fn list_by_account(
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<TransactionView>>, ServerError> {
    list_filtered(state, TransactionFilter::Account(id)).await
}

pub async fn list_by_payee(
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<TransactionView>>, ServerError> {
    list_filtered(state, TransactionFilter::Payee(id)).await
}

pub async fn list_by_category(
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<TransactionView>>, ServerError> {
    list_filtered(state, TransactionFilter::Category(id)).await
}

/// Handle requests for creating a new transaction.
///
/// Splits are validated against the amount before anything is written;
/// the account balance is refreshed afterwards.
pub async fn create(
    State(state): State<ServerState>,
    Json(payload): Json<TransactionNew>,
) -> Result<(StatusCode, Json<Created>), ServerError> {
    let id = state
        .ledger
        .new_transaction(ledger::NewTransaction {
            posted_on: payload.posted_on,
            account_id: payload.account_id,
            payee_id: payload.payee_id,
            amount: MoneyCents::new(payload.amount_minor),
            notes: payload.notes,
            status: ledger_status(payload.status),
            tags: payload.tags,
            splits: split_drafts(payload.splits),
        })
        .await?;

    Ok((StatusCode::CREATED, Json(Created { id })))
}

/// Handle requests for replacing a transaction.
///
/// The body is the full desired state: tags and splits are replaced
/// wholesale and absent notes clear the stored ones.
pub async fn update(
    State(state): State<ServerState>,
    Json(payload): Json<TransactionUpdate>,
) -> Result<StatusCode, ServerError> {
    state
        .ledger
        .update_transaction(
            payload.transaction_id,
            ledger::TransactionUpdate {
                posted_on: Some(payload.posted_on),
                account_id: Some(payload.account_id),
                payee_id: Some(payload.payee_id),
                amount: Some(MoneyCents::new(payload.amount_minor)),
                notes: Some(payload.notes),
                status: Some(ledger_status(payload.status)),
                tags: Some(payload.tags),
                splits: Some(split_drafts(payload.splits)),
            },
        )
        .await?;

    Ok(StatusCode::OK)
}

pub async fn delete(
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ServerError> {
    state.ledger.delete_transaction(id).await?;
    Ok(StatusCode::OK)
}

pub async fn move_to_payee(
    State(state): State<ServerState>,
    Json(payload): Json<MoveToPayee>,
) -> Result<Json<MoveToPayeeResult>, ServerError> {
    let moved = state
        .ledger
        .move_transactions_to_payee(payload.old_payee_id, payload.new_payee_id)
        .await?;

    Ok(Json(MoveToPayeeResult { moved }))
}
