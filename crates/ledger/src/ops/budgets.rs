use chrono::{Datelike, NaiveDate, Utc};
use uuid::Uuid;

use sea_orm::{
    ActiveValue, DatabaseTransaction, DbBackend, FromQueryResult, QueryFilter, QueryOrder,
    Statement, TransactionTrait, prelude::*,
};

use crate::{
    LedgerError, MoneyCents, ResultLedger, budget_month_categories, budget_months, budgets,
};

use super::{Ledger, normalize_required_name, with_tx};

/// One budgeted category of a budget month, with spending folded in.
#[derive(Clone, Debug, PartialEq)]
pub struct BudgetMonthCategoryRow {
    pub id: Uuid,
    pub category_id: Uuid,
    pub category_name: String,
    pub budgeted: MoneyCents,
    pub spent: MoneyCents,
    pub available: MoneyCents,
}

#[derive(Debug, FromQueryResult)]
struct RawBudgetMonthRow {
    id: Uuid,
    category_id: Uuid,
    category_name: String,
    budgeted_minor: i64,
    spent_minor: i64,
    available_minor: i64,
}

impl From<RawBudgetMonthRow> for BudgetMonthCategoryRow {
    fn from(raw: RawBudgetMonthRow) -> Self {
        Self {
            id: raw.id,
            category_id: raw.category_id,
            category_name: raw.category_name,
            budgeted: MoneyCents::new(raw.budgeted_minor),
            spent: MoneyCents::new(raw.spent_minor),
            available: MoneyCents::new(raw.available_minor),
        }
    }
}

impl Ledger {
    pub(super) async fn require_budget(
        &self,
        db_tx: &DatabaseTransaction,
        budget_id: Uuid,
    ) -> ResultLedger<budgets::Model> {
        budgets::Entity::find_by_id(budget_id)
            .filter(budgets::Column::DeletedAt.is_null())
            .one(db_tx)
            .await?
            .ok_or_else(|| LedgerError::not_found("budget", budget_id))
    }

    /// Adds a new budget.
    pub async fn new_budget(&self, name: &str) -> ResultLedger<Uuid> {
        let name = normalize_required_name(name, "budget")?;
        with_tx!(self, |db_tx| {
            let budget_id = Uuid::new_v4();
            budgets::ActiveModel {
                id: ActiveValue::Set(budget_id),
                name: ActiveValue::Set(name.clone()),
                created_at: ActiveValue::Set(Utc::now()),
                deleted_at: ActiveValue::Set(None),
            }
            .insert(&db_tx)
            .await?;
            Ok(budget_id)
        })
    }

    /// Renames an existing budget.
    pub async fn rename_budget(&self, budget_id: Uuid, name: &str) -> ResultLedger<()> {
        let name = normalize_required_name(name, "budget")?;
        with_tx!(self, |db_tx| {
            self.require_budget(&db_tx, budget_id).await?;
            budgets::ActiveModel {
                id: ActiveValue::Set(budget_id),
                name: ActiveValue::Set(name.clone()),
                ..Default::default()
            }
            .update(&db_tx)
            .await?;
            Ok(())
        })
    }

    /// Return a live budget by id.
    pub async fn budget(&self, budget_id: Uuid) -> ResultLedger<budgets::Model> {
        with_tx!(self, |db_tx| self.require_budget(&db_tx, budget_id).await)
    }

    /// List live budgets, sorted by name.
    pub async fn list_budgets(&self) -> ResultLedger<Vec<budgets::Model>> {
        with_tx!(self, |db_tx| {
            let models = budgets::Entity::find()
                .filter(budgets::Column::DeletedAt.is_null())
                .order_by_asc(budgets::Column::Name)
                .all(&db_tx)
                .await?;
            Ok(models)
        })
    }

    /// Soft-deletes a budget; unknown ids are a no-op.
    pub async fn delete_budget(&self, budget_id: Uuid) -> ResultLedger<()> {
        with_tx!(self, |db_tx| {
            let existing = budgets::Entity::find_by_id(budget_id)
                .filter(budgets::Column::DeletedAt.is_null())
                .one(&db_tx)
                .await?;
            if existing.is_none() {
                tracing::debug!("delete of unknown budget {budget_id} ignored");
                return Ok(());
            }

            budgets::ActiveModel {
                id: ActiveValue::Set(budget_id),
                deleted_at: ActiveValue::Set(Some(Utc::now())),
                ..Default::default()
            }
            .update(&db_tx)
            .await?;
            Ok(())
        })
    }

    /// Budgeted categories of one budget month, with the month's spending.
    ///
    /// Spending is the split sum over tracked accounts within that calendar
    /// month. A month that was never budgeted yields an empty list.
    pub async fn budget_month(
        &self,
        budget_id: Uuid,
        year: i32,
        month: i32,
    ) -> ResultLedger<Vec<BudgetMonthCategoryRow>> {
        let Some(bounds) = month_bounds(year, month) else {
            return Ok(Vec::new());
        };
        let (first_day, next_first_day) = bounds;

        let rows = RawBudgetMonthRow::find_by_statement(Statement::from_sql_and_values(
            DbBackend::Sqlite,
            r#"
            SELECT bmc.id AS id,
                   bmc.category_id AS category_id,
                   c.name AS category_name,
                   bmc.budgeted_minor AS budgeted_minor,
                   COALESCE(spent.amount_minor, 0) AS spent_minor,
                   bmc.budgeted_minor - COALESCE(spent.amount_minor, 0) AS available_minor
            FROM budget_month_categories AS bmc
            INNER JOIN budget_months AS bm ON bm.id = bmc.budget_month_id
            INNER JOIN categories AS c ON c.id = bmc.category_id
            LEFT JOIN (
                SELECT s.category_id AS category_id,
                       SUM(s.amount_minor) AS amount_minor
                FROM splits AS s
                INNER JOIN transactions AS t ON t.id = s.transaction_id
                INNER JOIN accounts AS a ON a.id = t.account_id
                WHERE a.tracked = 1
                  AND t.posted_on >= ?
                  AND t.posted_on < ?
                GROUP BY s.category_id
            ) AS spent ON spent.category_id = bmc.category_id
            WHERE bm.budget_id = ? AND bm.year = ? AND bm.month = ?
            ORDER BY c.name ASC
            "#,
            [
                first_day.into(),
                next_first_day.into(),
                budget_id.as_bytes().to_vec().into(),
                year.into(),
                month.into(),
            ],
        ))
        .all(&self.database)
        .await?;

        Ok(rows.into_iter().map(BudgetMonthCategoryRow::from).collect())
    }

    /// [`Ledger::budget_month`] for today's year and month.
    pub async fn current_budget_month(
        &self,
        budget_id: Uuid,
    ) -> ResultLedger<Vec<BudgetMonthCategoryRow>> {
        let today = Utc::now().date_naive();
        self.budget_month(budget_id, today.year(), today.month() as i32)
            .await
    }

    /// Sets the budgeted amount of one category in one budget month.
    ///
    /// The BudgetMonth row is created the first time a month is budgeted;
    /// an existing per-category row gets its amount replaced. Returns the
    /// id of the month-category row.
    pub async fn set_budget_month_category(
        &self,
        budget_id: Uuid,
        year: i32,
        month: i32,
        category_id: Uuid,
        budgeted: MoneyCents,
    ) -> ResultLedger<Uuid> {
        if month_bounds(year, month).is_none() {
            return Err(LedgerError::InvalidKind(format!("month {month}")));
        }

        with_tx!(self, |db_tx| {
            self.require_budget(&db_tx, budget_id).await?;
            self.require_category(&db_tx, category_id).await?;

            let budget_month = budget_months::Entity::find()
                .filter(budget_months::Column::BudgetId.eq(budget_id))
                .filter(budget_months::Column::Year.eq(year))
                .filter(budget_months::Column::Month.eq(month))
                .one(&db_tx)
                .await?;
            let budget_month_id = match budget_month {
                Some(model) => model.id,
                None => {
                    let budget_month_id = Uuid::new_v4();
                    budget_months::ActiveModel {
                        id: ActiveValue::Set(budget_month_id),
                        budget_id: ActiveValue::Set(budget_id),
                        year: ActiveValue::Set(year),
                        month: ActiveValue::Set(month),
                        created_at: ActiveValue::Set(Utc::now()),
                    }
                    .insert(&db_tx)
                    .await?;
                    budget_month_id
                }
            };

            let existing = budget_month_categories::Entity::find()
                .filter(budget_month_categories::Column::BudgetMonthId.eq(budget_month_id))
                .filter(budget_month_categories::Column::CategoryId.eq(category_id))
                .one(&db_tx)
                .await?;
            let row_id = match existing {
                Some(model) => {
                    budget_month_categories::ActiveModel {
                        id: ActiveValue::Set(model.id),
                        budgeted_minor: ActiveValue::Set(budgeted.cents()),
                        ..Default::default()
                    }
                    .update(&db_tx)
                    .await?;
                    model.id
                }
                None => {
                    let row_id = Uuid::new_v4();
                    budget_month_categories::ActiveModel {
                        id: ActiveValue::Set(row_id),
                        budget_month_id: ActiveValue::Set(budget_month_id),
                        category_id: ActiveValue::Set(category_id),
                        budgeted_minor: ActiveValue::Set(budgeted.cents()),
                        created_at: ActiveValue::Set(Utc::now()),
                    }
                    .insert(&db_tx)
                    .await?;
                    row_id
                }
            };
            Ok(row_id)
        })
    }
}

/// First day of `(year, month)` and of the following month, or `None`
/// when the pair does not name a calendar month.
fn month_bounds(year: i32, month: i32) -> Option<(NaiveDate, NaiveDate)> {
    let month_u32 = u32::try_from(month).ok()?;
    let first_day = NaiveDate::from_ymd_opt(year, month_u32, 1)?;
    let next_first_day = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)?
    } else {
        NaiveDate::from_ymd_opt(year, month_u32 + 1, 1)?
    };
    Some((first_day, next_first_day))
}
