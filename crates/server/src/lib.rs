use axum::{Json, http::StatusCode, response::IntoResponse};
use ledger::LedgerError;

use serde::Serialize;
pub use server::{router, run, run_with_listener, spawn_with_listener};

mod accounts;
mod budgets;
mod categories;
mod goals;
mod payees;
mod schedules;
mod server;
mod tags;
mod transactions;

pub enum ServerError {
    Ledger(LedgerError),
    Generic(String),
}

#[derive(Serialize)]
struct Error {
    error: String,
}

fn status_for_ledger_error(err: &LedgerError) -> StatusCode {
    match err {
        LedgerError::NotFound { .. } => StatusCode::NOT_FOUND,
        LedgerError::DuplicateName(_)
        | LedgerError::NotEditable(_)
        | LedgerError::AccountHasBalance => StatusCode::CONFLICT,
        LedgerError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        LedgerError::InvalidName(_)
        | LedgerError::InvalidSplitTotal
        | LedgerError::InvalidSplitOrder
        | LedgerError::InvalidAmount(_)
        | LedgerError::InvalidKind(_) => StatusCode::UNPROCESSABLE_ENTITY,
    }
}

fn message_for_ledger_error(err: LedgerError) -> String {
    match err {
        LedgerError::Database(db_err) => {
            tracing::error!("database error: {db_err}");
            "internal server error".to_string()
        }
        other => other.to_string(),
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> axum::response::Response {
        let (status, error) = match self {
            ServerError::Ledger(err) => (status_for_ledger_error(&err), message_for_ledger_error(err)),
            ServerError::Generic(err) => (StatusCode::BAD_REQUEST, err),
        };

        (status, Json(Error { error })).into_response()
    }
}

impl From<LedgerError> for ServerError {
    fn from(value: LedgerError) -> Self {
        Self::Ledger(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use axum::body::Body;
    use axum::http::Request;
    use http_body_util::BodyExt;
    use migration::MigratorTrait;
    use sea_orm::Database;
    use serde_json::{Value, json};
    use tower::ServiceExt;

    async fn test_router() -> axum::Router {
        let db = Database::connect("sqlite::memory:").await.unwrap();
        migration::Migrator::up(&db, None).await.unwrap();
        let ledger = ledger::Ledger::builder()
            .database(db.clone())
            .build()
            .await
            .unwrap();
        router(ledger, db)
    }

    fn post_json(uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn put_json(uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method("PUT")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn body_json(res: axum::response::Response) -> Value {
        let bytes = res.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[test]
    fn ledger_not_found_maps_to_404() {
        let err = LedgerError::NotFound {
            entity: "account",
            id: "x".to_string(),
        };
        let res = ServerError::from(err).into_response();
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn ledger_conflict_maps_to_409() {
        let res = ServerError::from(LedgerError::DuplicateName("x".to_string())).into_response();
        assert_eq!(res.status(), StatusCode::CONFLICT);

        let res = ServerError::from(LedgerError::AccountHasBalance).into_response();
        assert_eq!(res.status(), StatusCode::CONFLICT);
    }

    #[test]
    fn ledger_validation_maps_to_422() {
        let res = ServerError::from(LedgerError::InvalidSplitTotal).into_response();
        assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);

        let res = ServerError::from(LedgerError::InvalidName("x".to_string())).into_response();
        assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[test]
    fn generic_maps_to_400() {
        let res = ServerError::Generic("bad".to_string()).into_response();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn account_create_list_and_balance() {
        let app = test_router().await;

        let res = app
            .clone()
            .oneshot(post_json(
                "/account",
                json!({
                    "name": "Checking",
                    "kind": "checking",
                    "tracked": true,
                    "opening_balance_minor": 10_000
                }),
            ))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::CREATED);
        let created = body_json(res).await;
        let id = created["id"].as_str().unwrap().to_string();

        let res = app
            .clone()
            .oneshot(
                Request::builder()
                    .uri("/account")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        let listed = body_json(res).await;
        assert_eq!(listed.as_array().unwrap().len(), 1);
        assert_eq!(listed[0]["name"], "Checking");
        assert_eq!(listed[0]["balance_minor"], 10_000);

        let res = app
            .oneshot(
                Request::builder()
                    .uri(format!("/account/balance/{id}"))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        assert_eq!(body_json(res).await["balance_minor"], 10_000);
    }

    #[tokio::test]
    async fn duplicate_account_name_returns_409() {
        let app = test_router().await;

        let payload = json!({
            "name": "Cash",
            "kind": "cash",
            "tracked": false,
            "opening_balance_minor": 0
        });
        let res = app
            .clone()
            .oneshot(post_json("/account", payload.clone()))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::CREATED);

        let res = app.oneshot(post_json("/account", payload)).await.unwrap();
        assert_eq!(res.status(), StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn transaction_create_rejects_bad_splits() {
        let app = test_router().await;

        let res = app
            .clone()
            .oneshot(post_json(
                "/account",
                json!({
                    "name": "Checking",
                    "kind": "checking",
                    "tracked": true,
                    "opening_balance_minor": 0
                }),
            ))
            .await
            .unwrap();
        let account_id = body_json(res).await["id"].as_str().unwrap().to_string();

        let res = app
            .clone()
            .oneshot(post_json("/payee", json!({ "name": "Grocer" })))
            .await
            .unwrap();
        let payee_id = body_json(res).await["id"].as_str().unwrap().to_string();

        let res = app
            .clone()
            .oneshot(post_json("/category", json!({ "name": "Food" })))
            .await
            .unwrap();
        let category_id = body_json(res).await["id"].as_str().unwrap().to_string();

        // Splits sum to -4000, transaction says -5000.
        let res = app
            .oneshot(post_json(
                "/transaction",
                json!({
                    "posted_on": "2026-03-01",
                    "account_id": account_id,
                    "payee_id": payee_id,
                    "amount_minor": -5000,
                    "notes": null,
                    "status": "cleared",
                    "splits": [
                        { "category_id": category_id, "amount_minor": -4000, "notes": null, "order": 0 }
                    ],
                    "tags": []
                }),
            ))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn missing_payee_returns_404() {
        let app = test_router().await;

        let res = app
            .oneshot(put_json(
                "/payee",
                json!({
                    "payee_id": uuid::Uuid::new_v4(),
                    "name": "Nobody",
                    "default_category_id": null
                }),
            ))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn seeded_schedules_are_listed_and_protected() {
        let app = test_router().await;

        let res = app
            .clone()
            .oneshot(
                Request::builder()
                    .uri("/schedule")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        let listed = body_json(res).await;
        let schedules = listed.as_array().unwrap();
        assert_eq!(schedules.len(), 4);
        let daily = schedules
            .iter()
            .find(|s| s["display_name"] == "Daily")
            .unwrap();
        assert_eq!(daily["is_editable"], false);

        let daily_id = daily["id"].as_str().unwrap();
        let res = app
            .oneshot(
                Request::builder()
                    .method("DELETE")
                    .uri(format!("/schedule/{daily_id}"))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::CONFLICT);
    }
}
