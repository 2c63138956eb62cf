use axum::{
    Router,
    routing::{delete, get, post, put},
};
use sea_orm::DatabaseConnection;

use std::sync::Arc;

use crate::{accounts, budgets, categories, goals, payees, schedules, tags, transactions};
use ledger::Ledger;

#[derive(Clone)]
pub struct ServerState {
    pub ledger: Arc<Ledger>,
    pub db: DatabaseConnection,
}

pub fn router(ledger: Ledger, db: DatabaseConnection) -> Router {
    let state = ServerState {
        ledger: Arc::new(ledger),
        db,
    };

    Router::new()
        .route(
            "/account",
            get(accounts::list).post(accounts::create).put(accounts::update),
        )
        .route("/account/name/{name}", get(accounts::get_by_name))
        .route("/account/balance/{id}", get(accounts::balance))
        .route("/account/{id}", get(accounts::get).delete(accounts::delete))
        .route(
            "/payee",
            get(payees::list).post(payees::create).put(payees::update),
        )
        .route("/payee/{id}", get(payees::get).delete(payees::delete))
        .route(
            "/category",
            get(categories::list)
                .post(categories::create)
                .put(categories::update),
        )
        .route(
            "/category/{id}",
            get(categories::get).delete(categories::delete),
        )
        .route("/tag", get(tags::list).post(tags::create).put(tags::update))
        .route("/tag/{id}", get(tags::get).delete(tags::delete))
        .route(
            "/transaction",
            get(transactions::list)
                .post(transactions::create)
                .put(transactions::update),
        )
        .route("/transaction/account/{id}", get(transactions::list_by_account))
        .route("/transaction/payee/{id}", get(transactions::list_by_payee))
        .route(
            "/transaction/category/{id}",
            get(transactions::list_by_category),
        )
        .route("/transaction/move/payee", put(transactions::move_to_payee))
        .route("/transaction/{id}", delete(transactions::delete))
        .route(
            "/budget",
            get(budgets::list).post(budgets::create).put(budgets::update),
        )
        .route("/budget/month", put(budgets::set_month))
        .route("/budget/month/{id}", get(budgets::current_month))
        .route("/budget/month/{id}/{year}/{month}", get(budgets::month))
        .route("/budget/{id}", get(budgets::get).delete(budgets::delete))
        .route(
            "/schedule",
            get(schedules::list)
                .post(schedules::create)
                .put(schedules::update),
        )
        .route(
            "/schedule/{id}",
            get(schedules::get).delete(schedules::delete),
        )
        .route("/goal", get(goals::list).post(goals::create).put(goals::update))
        .route("/goal/purge/{id}", delete(goals::purge))
        .route("/goal/{id}", get(goals::get).delete(goals::archive))
        .with_state(state)
}

pub async fn run(ledger: Ledger, db: DatabaseConnection) {
    let listener = match tokio::net::TcpListener::bind("127.0.0.1:3000").await {
        Ok(listener) => listener,
        Err(err) => {
            tracing::error!("failed to bind server listener: {err}");
            return;
        }
    };
    if let Err(err) = run_with_listener(ledger, db, listener).await {
        tracing::error!("server failed: {err}");
    }
}

pub async fn run_with_listener(
    ledger: Ledger,
    db: DatabaseConnection,
    listener: tokio::net::TcpListener,
) -> Result<(), std::io::Error> {
    let addr = listener.local_addr()?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, router(ledger, db)).await
}

pub fn spawn_with_listener(
    ledger: Ledger,
    db: DatabaseConnection,
    listener: tokio::net::TcpListener,
) -> Result<std::net::SocketAddr, std::io::Error> {
    let addr = listener.local_addr()?;

    tokio::spawn(async move {
        if let Err(err) = run_with_listener(ledger, db, listener).await {
            tracing::error!("server failed: {err}");
        }
    });

    Ok(addr)
}
