//! Seeds the rows the ledger expects to exist.
//!
//! - category `Income`, not editable;
//! - payee `Starting Balance` (`kind = starting_balance`), defaulting to
//!   the Income category, used by the account opening-balance bootstrap;
//! - schedules Daily/Weekly/Monthly/Yearly at interval 1, not editable.
//!
//! Every insert is guarded by an existence check so re-running `up`
//! against an already seeded database is harmless.

use chrono::Utc;
use sea_orm::{ConnectionTrait, DbBackend, QueryResult, Statement, Value, prelude::DateTimeUtc};
use sea_orm_migration::{SchemaManagerConnection, prelude::*};
use uuid::Uuid;

#[derive(DeriveMigrationName)]
pub struct Migration;

const INCOME_CATEGORY: &str = "Income";
const STARTING_BALANCE_PAYEE: &str = "Starting Balance";
const STARTING_BALANCE_KIND: &str = "starting_balance";

const SEED_SCHEDULES: [(&str, &str, i32); 4] = [
    ("day", "Daily", 0),
    ("week", "Weekly", 1),
    ("month", "Monthly", 2),
    ("year", "Yearly", 3),
];

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        let backend = db.get_database_backend();
        let now: DateTimeUtc = Utc::now();

        let income_id = match find_category_id(db, backend, INCOME_CATEGORY).await? {
            Some(id) => id,
            None => {
                let id = Uuid::new_v4();
                db.execute(Statement::from_sql_and_values(
                    backend,
                    "INSERT INTO categories (id, name, is_editable, created_at) \
                     VALUES (?, ?, ?, ?);",
                    [
                        id.as_bytes().to_vec().into(),
                        INCOME_CATEGORY.into(),
                        Value::Bool(Some(false)),
                        now.into(),
                    ],
                ))
                .await?;
                id
            }
        };

        let payees = count_rows(
            db,
            Statement::from_sql_and_values(
                backend,
                "SELECT COUNT(*) AS n FROM payees WHERE name = ? OR kind = ?;",
                [STARTING_BALANCE_PAYEE.into(), STARTING_BALANCE_KIND.into()],
            ),
        )
        .await?;
        if payees == 0 {
            db.execute(Statement::from_sql_and_values(
                backend,
                "INSERT INTO payees (id, name, kind, default_category_id, created_at) \
                 VALUES (?, ?, ?, ?, ?);",
                [
                    Uuid::new_v4().as_bytes().to_vec().into(),
                    STARTING_BALANCE_PAYEE.into(),
                    STARTING_BALANCE_KIND.into(),
                    income_id.as_bytes().to_vec().into(),
                    now.into(),
                ],
            ))
            .await?;
        }

        for (frequency, display_name, display_order) in SEED_SCHEDULES {
            let existing = count_rows(
                db,
                Statement::from_sql_and_values(
                    backend,
                    "SELECT COUNT(*) AS n FROM schedules WHERE frequency = ? AND interval = 1;",
                    [frequency.into()],
                ),
            )
            .await?;
            if existing > 0 {
                continue;
            }

            db.execute(Statement::from_sql_and_values(
                backend,
                "INSERT INTO schedules \
                 (id, frequency, interval, display_name, display_order, is_editable, created_at) \
                 VALUES (?, ?, 1, ?, ?, ?, ?);",
                [
                    Uuid::new_v4().as_bytes().to_vec().into(),
                    frequency.into(),
                    display_name.into(),
                    display_order.into(),
                    Value::Bool(Some(false)),
                    now.into(),
                ],
            ))
            .await?;
        }

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        let backend = db.get_database_backend();

        db.execute(Statement::from_sql_and_values(
            backend,
            "DELETE FROM payees WHERE name = ?;",
            [STARTING_BALANCE_PAYEE.into()],
        ))
        .await?;
        db.execute(Statement::from_sql_and_values(
            backend,
            "DELETE FROM categories WHERE name = ?;",
            [INCOME_CATEGORY.into()],
        ))
        .await?;
        db.execute(Statement::from_string(
            backend,
            "DELETE FROM schedules WHERE interval = 1 AND is_editable = 0 \
             AND frequency IN ('day', 'week', 'month', 'year');",
        ))
        .await?;

        Ok(())
    }
}

async fn find_category_id(
    db: &SchemaManagerConnection<'_>,
    backend: DbBackend,
    name: &str,
) -> Result<Option<Uuid>, DbErr> {
    let row = db
        .query_one(Statement::from_sql_and_values(
            backend,
            "SELECT id FROM categories WHERE name = ? AND deleted_at IS NULL;",
            [name.into()],
        ))
        .await?;
    row.map(|row| uuid_from_row(&row, "id")).transpose()
}

async fn count_rows(
    db: &SchemaManagerConnection<'_>,
    statement: Statement,
) -> Result<i64, DbErr> {
    let row = db
        .query_one(statement)
        .await?
        .ok_or_else(|| DbErr::Custom("count query returned no row".to_string()))?;
    row.try_get("", "n")
}

fn uuid_from_row(row: &QueryResult, column: &str) -> Result<Uuid, DbErr> {
    let bytes: Vec<u8> = row.try_get("", column)?;
    Uuid::from_slice(&bytes)
        .map_err(|err| DbErr::Custom(format!("invalid UUID in column {column}: {err}")))
}
