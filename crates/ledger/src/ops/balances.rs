use sea_orm::{ActiveValue, FromQueryResult, Statement, prelude::*};
use uuid::Uuid;

use crate::{ResultLedger, accounts};

use super::Ledger;

#[derive(Debug, FromQueryResult)]
struct BalanceSum {
    total_minor: Option<i64>,
}

impl Ledger {
    /// Recomputes the stored balance of one account.
    ///
    /// Always the full `SUM(amount_minor)` over the account's transactions,
    /// never a delta, so concurrent recomputes converge on the same value.
    /// `exclude_transaction` leaves one transaction out of the sum; used
    /// right before that transaction is deleted.
    ///
    /// Runs outside the triggering mutation's database transaction and
    /// never fails the caller: a recompute error is logged and the stored
    /// balance stays stale until the next mutation on the account.
    pub(super) async fn recompute_account_balance(
        &self,
        account_id: Option<Uuid>,
        exclude_transaction: Option<Uuid>,
    ) {
        let Some(account_id) = account_id else {
            tracing::debug!("balance recompute skipped: transaction has no account");
            return;
        };
        if let Err(err) = self
            .store_account_balance(account_id, exclude_transaction)
            .await
        {
            tracing::error!("balance recompute failed for account {account_id}: {err}");
        }
    }

    async fn store_account_balance(
        &self,
        account_id: Uuid,
        exclude_transaction: Option<Uuid>,
    ) -> ResultLedger<()> {
        let backend = self.database.get_database_backend();
        let stmt = match exclude_transaction {
            None => Statement::from_sql_and_values(
                backend,
                "SELECT COALESCE(SUM(amount_minor), 0) AS total_minor \
                 FROM transactions WHERE account_id = ?",
                [account_id.as_bytes().to_vec().into()],
            ),
            Some(transaction_id) => Statement::from_sql_and_values(
                backend,
                "SELECT COALESCE(SUM(amount_minor), 0) AS total_minor \
                 FROM transactions WHERE account_id = ? AND id <> ?",
                [
                    account_id.as_bytes().to_vec().into(),
                    transaction_id.as_bytes().to_vec().into(),
                ],
            ),
        };

        let sum = BalanceSum::find_by_statement(stmt)
            .one(&self.database)
            .await?
            .and_then(|row| row.total_minor)
            .unwrap_or(0);

        accounts::ActiveModel {
            id: ActiveValue::Set(account_id),
            balance_minor: ActiveValue::Set(sum),
            ..Default::default()
        }
        .update(&self.database)
        .await?;

        Ok(())
    }
}
