use chrono::Utc;
use uuid::Uuid;

use sea_orm::{
    ActiveValue, DatabaseTransaction, QueryFilter, QueryOrder, TransactionTrait, prelude::*,
    sea_query::Expr,
};

use crate::{
    AccountKind, LedgerError, MoneyCents, NewTransaction, ResultLedger, SplitDraft,
    TransactionStatus, accounts,
};

use super::{Ledger, normalize_required_name, with_tx};

/// Creation input for an account.
#[derive(Clone, Debug)]
pub struct NewAccount {
    pub name: String,
    pub kind: AccountKind,
    pub tracked: bool,
    pub opening_balance: MoneyCents,
}

impl Ledger {
    pub(super) async fn require_account(
        &self,
        db_tx: &DatabaseTransaction,
        account_id: Uuid,
    ) -> ResultLedger<accounts::Model> {
        accounts::Entity::find_by_id(account_id)
            .filter(accounts::Column::DeletedAt.is_null())
            .one(db_tx)
            .await?
            .ok_or_else(|| LedgerError::not_found("account", account_id))
    }

    /// Fetch an account regardless of liveness. Transactions may sit on a
    /// soft-deleted account until reassigned.
    pub(super) async fn account_any(
        &self,
        db_tx: &DatabaseTransaction,
        account_id: Uuid,
    ) -> ResultLedger<Option<accounts::Model>> {
        Ok(accounts::Entity::find_by_id(account_id).one(db_tx).await?)
    }

    async fn ensure_account_name_free(
        &self,
        db_tx: &DatabaseTransaction,
        name: &str,
        exclude: Option<Uuid>,
    ) -> ResultLedger<()> {
        let mut query = accounts::Entity::find()
            .filter(accounts::Column::DeletedAt.is_null())
            .filter(Expr::cust("LOWER(name)").eq(name.to_lowercase()));
        if let Some(account_id) = exclude {
            query = query.filter(accounts::Column::Id.ne(account_id));
        }
        if query.one(db_tx).await?.is_some() {
            return Err(LedgerError::DuplicateName(name.to_string()));
        }
        Ok(())
    }

    /// Adds a new account.
    ///
    /// The row starts at balance zero. A positive `opening_balance` is then
    /// booked as a regular transaction against the starting-balance payee,
    /// dated today; on tracked accounts it carries one split over that
    /// payee's default category. The booking runs through
    /// [`Ledger::new_transaction`], so the stored balance comes out of the
    /// usual recompute.
    pub async fn new_account(&self, new: NewAccount) -> ResultLedger<Uuid> {
        let NewAccount {
            name,
            kind,
            tracked,
            opening_balance,
        } = new;
        let name = normalize_required_name(&name, "account")?;

        let (account_id, starting_payee) = with_tx!(self, |db_tx| {
            self.ensure_account_name_free(&db_tx, &name, None).await?;

            let account_id = Uuid::new_v4();
            accounts::ActiveModel {
                id: ActiveValue::Set(account_id),
                name: ActiveValue::Set(name.clone()),
                kind: ActiveValue::Set(kind.as_str().to_string()),
                tracked: ActiveValue::Set(tracked),
                balance_minor: ActiveValue::Set(0),
                created_at: ActiveValue::Set(Utc::now()),
                deleted_at: ActiveValue::Set(None),
            }
            .insert(&db_tx)
            .await?;

            let starting_payee = if opening_balance.is_positive() {
                Some(self.require_starting_balance_payee(&db_tx).await?)
            } else {
                None
            };
            Ok::<_, LedgerError>((account_id, starting_payee))
        })?;

        if let Some(payee) = starting_payee {
            let splits = match (tracked, payee.default_category_id) {
                (true, Some(category_id)) => vec![SplitDraft {
                    category_id,
                    amount: opening_balance,
                    notes: None,
                    position: 0,
                }],
                _ => Vec::new(),
            };
            self.new_transaction(NewTransaction {
                posted_on: Utc::now().date_naive(),
                account_id,
                payee_id: payee.id,
                amount: opening_balance,
                notes: None,
                status: TransactionStatus::Cleared,
                tags: Vec::new(),
                splits,
            })
            .await?;
        }

        Ok(account_id)
    }

    /// Renames an existing account.
    pub async fn rename_account(&self, account_id: Uuid, name: &str) -> ResultLedger<()> {
        let name = normalize_required_name(name, "account")?;
        with_tx!(self, |db_tx| {
            self.require_account(&db_tx, account_id).await?;
            self.ensure_account_name_free(&db_tx, &name, Some(account_id))
                .await?;

            accounts::ActiveModel {
                id: ActiveValue::Set(account_id),
                name: ActiveValue::Set(name.clone()),
                ..Default::default()
            }
            .update(&db_tx)
            .await?;
            Ok(())
        })
    }

    /// Return a live account by id.
    pub async fn account(&self, account_id: Uuid) -> ResultLedger<accounts::Model> {
        with_tx!(self, |db_tx| self.require_account(&db_tx, account_id).await)
    }

    /// Return a live account by name, case-insensitive.
    pub async fn account_by_name(&self, name: &str) -> ResultLedger<accounts::Model> {
        with_tx!(self, |db_tx| {
            accounts::Entity::find()
                .filter(accounts::Column::DeletedAt.is_null())
                .filter(Expr::cust("LOWER(name)").eq(name.trim().to_lowercase()))
                .one(&db_tx)
                .await?
                .ok_or_else(|| LedgerError::not_found("account", name))
        })
    }

    /// List live accounts, sorted by name.
    pub async fn list_accounts(&self) -> ResultLedger<Vec<accounts::Model>> {
        with_tx!(self, |db_tx| {
            let models = accounts::Entity::find()
                .filter(accounts::Column::DeletedAt.is_null())
                .order_by_asc(accounts::Column::Name)
                .all(&db_tx)
                .await?;
            Ok(models)
        })
    }

    /// Current stored balance of a live account.
    pub async fn account_balance(&self, account_id: Uuid) -> ResultLedger<MoneyCents> {
        with_tx!(self, |db_tx| {
            let model = self.require_account(&db_tx, account_id).await?;
            Ok(MoneyCents::new(model.balance_minor))
        })
    }

    /// Soft-deletes an account.
    ///
    /// Refused while the stored balance is non-zero; the caller has to move
    /// or delete the remaining transactions first.
    pub async fn delete_account(&self, account_id: Uuid) -> ResultLedger<()> {
        with_tx!(self, |db_tx| {
            let model = self.require_account(&db_tx, account_id).await?;
            if model.balance_minor != 0 {
                return Err(LedgerError::AccountHasBalance);
            }

            accounts::ActiveModel {
                id: ActiveValue::Set(account_id),
                deleted_at: ActiveValue::Set(Some(Utc::now())),
                ..Default::default()
            }
            .update(&db_tx)
            .await?;
            Ok(())
        })
    }
}
