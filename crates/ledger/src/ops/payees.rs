use chrono::Utc;
use sea_orm::{
    ActiveValue, DatabaseTransaction, QueryFilter, QueryOrder, TransactionTrait, prelude::*,
    sea_query::Expr,
};
use uuid::Uuid;

use crate::{LedgerError, PayeeKind, ResultLedger, payees};

use super::{Ledger, normalize_required_name, with_tx};

/// Creation input for a payee.
#[derive(Clone, Debug)]
pub struct NewPayee {
    pub name: String,
    pub default_category_id: Option<Uuid>,
}

/// Partial update for a payee. `None` leaves a field alone; for the
/// default category, `Some(None)` clears it.
#[derive(Clone, Debug, Default)]
pub struct PayeeUpdate {
    pub name: Option<String>,
    pub default_category_id: Option<Option<Uuid>>,
}

impl Ledger {
    pub(super) async fn require_payee(
        &self,
        db_tx: &DatabaseTransaction,
        payee_id: Uuid,
    ) -> ResultLedger<payees::Model> {
        payees::Entity::find_by_id(payee_id)
            .filter(payees::Column::DeletedAt.is_null())
            .one(db_tx)
            .await?
            .ok_or_else(|| LedgerError::not_found("payee", payee_id))
    }

    /// The seeded payee that anchors opening-balance transactions.
    pub(super) async fn require_starting_balance_payee(
        &self,
        db_tx: &DatabaseTransaction,
    ) -> ResultLedger<payees::Model> {
        payees::Entity::find()
            .filter(payees::Column::Kind.eq(PayeeKind::StartingBalance.as_str()))
            .one(db_tx)
            .await?
            .ok_or_else(|| LedgerError::not_found("payee", "starting_balance"))
    }

    async fn ensure_payee_name_free(
        &self,
        db_tx: &DatabaseTransaction,
        name: &str,
        exclude: Option<Uuid>,
    ) -> ResultLedger<()> {
        let mut query = payees::Entity::find()
            .filter(payees::Column::DeletedAt.is_null())
            .filter(Expr::cust("LOWER(name)").eq(name.to_lowercase()));
        if let Some(id) = exclude {
            query = query.filter(payees::Column::Id.ne(id));
        }
        if query.one(db_tx).await?.is_some() {
            return Err(LedgerError::DuplicateName(name.to_string()));
        }
        Ok(())
    }

    /// Creates a payee.
    pub async fn new_payee(&self, payee: NewPayee) -> ResultLedger<Uuid> {
        let NewPayee {
            name,
            default_category_id,
        } = payee;
        let name = normalize_required_name(&name, "payee")?;
        with_tx!(self, |db_tx| {
            self.ensure_payee_name_free(&db_tx, &name, None).await?;
            if let Some(category_id) = default_category_id {
                self.require_category(&db_tx, category_id).await?;
            }

            let id = Uuid::new_v4();
            payees::ActiveModel {
                id: ActiveValue::Set(id),
                name: ActiveValue::Set(name),
                kind: ActiveValue::Set(PayeeKind::Normal.as_str().to_string()),
                default_category_id: ActiveValue::Set(default_category_id),
                created_at: ActiveValue::Set(Utc::now()),
                deleted_at: ActiveValue::Set(None),
            }
            .insert(&db_tx)
            .await?;
            Ok(id)
        })
    }

    /// Updates a payee's name and/or default category.
    ///
    /// The starting-balance payee refuses any update.
    pub async fn update_payee(&self, payee_id: Uuid, update: PayeeUpdate) -> ResultLedger<()> {
        let PayeeUpdate {
            name,
            default_category_id,
        } = update;
        let name = name
            .map(|value| normalize_required_name(&value, "payee"))
            .transpose()?;
        with_tx!(self, |db_tx| {
            let model = self.require_payee(&db_tx, payee_id).await?;
            if model.kind == PayeeKind::StartingBalance.as_str() {
                return Err(LedgerError::NotEditable(model.name));
            }

            let mut active = payees::ActiveModel {
                id: ActiveValue::Set(payee_id),
                ..Default::default()
            };
            if let Some(name) = name {
                self.ensure_payee_name_free(&db_tx, &name, Some(payee_id))
                    .await?;
                active.name = ActiveValue::Set(name);
            }
            if let Some(default_category_id) = default_category_id {
                if let Some(category_id) = default_category_id {
                    self.require_category(&db_tx, category_id).await?;
                }
                active.default_category_id = ActiveValue::Set(default_category_id);
            }

            active.update(&db_tx).await?;
            Ok(())
        })
    }

    /// Return a live payee by id.
    pub async fn payee(&self, payee_id: Uuid) -> ResultLedger<payees::Model> {
        with_tx!(self, |db_tx| { self.require_payee(&db_tx, payee_id).await })
    }

    /// Return the starting-balance singleton.
    pub async fn starting_balance_payee(&self) -> ResultLedger<payees::Model> {
        with_tx!(self, |db_tx| {
            self.require_starting_balance_payee(&db_tx).await
        })
    }

    /// Lists live payees, ordered by name.
    pub async fn list_payees(&self) -> ResultLedger<Vec<payees::Model>> {
        with_tx!(self, |db_tx| {
            let models = payees::Entity::find()
                .filter(payees::Column::DeletedAt.is_null())
                .order_by_asc(payees::Column::Name)
                .all(&db_tx)
                .await?;
            Ok(models)
        })
    }

    /// Soft-deletes a payee.
    ///
    /// The starting-balance payee refuses deletion. Transactions keep the
    /// payee id; include-deleted reads still resolve it.
    pub async fn delete_payee(&self, payee_id: Uuid) -> ResultLedger<()> {
        with_tx!(self, |db_tx| {
            let model = self.require_payee(&db_tx, payee_id).await?;
            if model.kind == PayeeKind::StartingBalance.as_str() {
                return Err(LedgerError::NotEditable(model.name));
            }

            payees::ActiveModel {
                id: ActiveValue::Set(payee_id),
                deleted_at: ActiveValue::Set(Some(Utc::now())),
                ..Default::default()
            }
            .update(&db_tx)
            .await?;
            Ok(())
        })
    }
}
