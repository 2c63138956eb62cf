use std::collections::{HashMap, HashSet};

use chrono::{NaiveDate, Utc};
use sea_orm::{
    ActiveValue, DatabaseTransaction, JoinType, QueryFilter, QueryOrder, QuerySelect,
    TransactionTrait, prelude::*, sea_query::Expr,
};
use uuid::Uuid;

use crate::{
    LedgerError, MoneyCents, ResultLedger, SplitDraft, TransactionStatus, accounts, payees,
    reconcile_splits, splits, tags, transaction_tags, transactions, validate_splits,
};

use super::{Ledger, normalize_optional_text, with_tx};

/// Creation input for a transaction.
///
/// `splits` is only honored when the account is tracked; untracked
/// accounts never carry splits.
#[derive(Clone, Debug)]
pub struct NewTransaction {
    pub posted_on: NaiveDate,
    pub account_id: Uuid,
    pub payee_id: Uuid,
    pub amount: MoneyCents,
    pub notes: Option<String>,
    pub status: TransactionStatus,
    pub tags: Vec<Uuid>,
    pub splits: Vec<SplitDraft>,
}

/// Partial update for a transaction. `None` leaves a field alone.
///
/// `notes: Some(None)` clears the notes, `tags: Some(v)` replaces the
/// whole tag set and `splits: Some(v)` reconciles the persisted splits
/// against `v`.
#[derive(Clone, Debug, Default)]
pub struct TransactionUpdate {
    pub posted_on: Option<NaiveDate>,
    pub account_id: Option<Uuid>,
    pub payee_id: Option<Uuid>,
    pub amount: Option<MoneyCents>,
    pub notes: Option<Option<String>>,
    pub status: Option<TransactionStatus>,
    pub tags: Option<Vec<Uuid>>,
    pub splits: Option<Vec<SplitDraft>>,
}

/// Scope of a transaction listing.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TransactionFilter {
    All,
    Account(Uuid),
    Payee(Uuid),
    Category(Uuid),
}

/// One transaction assembled for display, names resolved.
#[derive(Clone, Debug, PartialEq)]
pub struct TransactionInfo {
    pub id: Uuid,
    pub posted_on: NaiveDate,
    pub account_id: Option<Uuid>,
    pub account: Option<String>,
    pub payee_id: Uuid,
    pub payee: String,
    pub amount: MoneyCents,
    pub notes: Option<String>,
    pub status: TransactionStatus,
    pub tags: Vec<TagInfo>,
    pub category: TransactionCategory,
}

/// A tag attached to a transaction, name resolved.
#[derive(Clone, Debug, PartialEq)]
pub struct TagInfo {
    pub id: Uuid,
    pub name: String,
}

/// How a transaction's amount is categorized.
///
/// Untracked accounts carry no splits (`None`); a single split shows as
/// that category; several show as an ordered split list.
#[derive(Clone, Debug, PartialEq)]
pub enum TransactionCategory {
    None,
    Single { category_id: Uuid, name: String },
    Split(Vec<SplitInfo>),
}

/// One split of a transaction, with its category name resolved.
#[derive(Clone, Debug, PartialEq)]
pub struct SplitInfo {
    pub id: Uuid,
    pub category_id: Uuid,
    pub category: String,
    pub amount: MoneyCents,
    pub notes: Option<String>,
    pub position: i32,
}

impl Ledger {
    /// Creates a transaction.
    ///
    /// Resolves account, payee and tags, validates the splits when the
    /// account is tracked, then writes the transaction row, its tag links
    /// and its splits in one database transaction. The account balance is
    /// recomputed after commit.
    pub async fn new_transaction(&self, new: NewTransaction) -> ResultLedger<Uuid> {
        let NewTransaction {
            posted_on,
            account_id,
            payee_id,
            amount,
            notes,
            status,
            tags,
            splits,
        } = new;
        let notes = normalize_optional_text(notes.as_deref());

        let transaction_id = with_tx!(self, |db_tx| {
            let account = self.require_account(&db_tx, account_id).await?;
            self.require_payee(&db_tx, payee_id).await?;
            let tag_models = self.require_tags(&db_tx, &tags).await?;
            if account.tracked {
                validate_splits(&splits, amount)?;
                self.require_split_categories(&db_tx, &splits).await?;
            }

            let transaction_id = Uuid::new_v4();
            transactions::ActiveModel {
                id: ActiveValue::Set(transaction_id),
                posted_on: ActiveValue::Set(posted_on),
                account_id: ActiveValue::Set(Some(account_id)),
                payee_id: ActiveValue::Set(payee_id),
                amount_minor: ActiveValue::Set(amount.cents()),
                notes: ActiveValue::Set(notes),
                status: ActiveValue::Set(status.as_str().to_string()),
                created_at: ActiveValue::Set(Utc::now()),
            }
            .insert(&db_tx)
            .await?;

            for tag in &tag_models {
                transaction_tags::ActiveModel {
                    transaction_id: ActiveValue::Set(transaction_id),
                    tag_id: ActiveValue::Set(tag.id),
                }
                .insert(&db_tx)
                .await?;
            }

            if account.tracked {
                self.insert_splits(&db_tx, transaction_id, &splits).await?;
            }

            Ok::<_, LedgerError>(transaction_id)
        })?;

        self.recompute_account_balance(Some(account_id), None).await;
        Ok(transaction_id)
    }

    /// Updates a transaction.
    ///
    /// Field changes, the tag set difference and the split change-set from
    /// [`reconcile_splits`] are applied in one database transaction.
    /// Post-commit the old account (when it changed) and the current
    /// account (when amount or account changed) get their balances
    /// recomputed.
    pub async fn update_transaction(
        &self,
        transaction_id: Uuid,
        update: TransactionUpdate,
    ) -> ResultLedger<()> {
        let TransactionUpdate {
            posted_on,
            account_id,
            payee_id,
            amount,
            notes,
            status,
            tags,
            splits: desired_splits,
        } = update;

        let (old_account_id, new_account_id, amount_changed) = with_tx!(self, |db_tx| {
            let existing = transactions::Entity::find_by_id(transaction_id)
                .one(&db_tx)
                .await?
                .ok_or_else(|| LedgerError::not_found("transaction", transaction_id))?;

            // The account the transaction will sit on after this update
            // decides whether splits apply at all.
            let account_in_effect = match account_id {
                Some(new_id) => Some(self.require_account(&db_tx, new_id).await?),
                None => match existing.account_id {
                    Some(old_id) => self.account_any(&db_tx, old_id).await?,
                    None => None,
                },
            };
            let tracked = account_in_effect
                .as_ref()
                .map(|account| account.tracked)
                .unwrap_or(false);

            if let Some(new_payee_id) = payee_id {
                self.require_payee(&db_tx, new_payee_id).await?;
            }

            let amount_in_effect = amount.unwrap_or(MoneyCents::new(existing.amount_minor));
            let existing_splits = splits::Entity::find()
                .filter(splits::Column::TransactionId.eq(transaction_id))
                .order_by_asc(splits::Column::Position)
                .all(&db_tx)
                .await?;

            // Desired end state of the splits: the caller's set when given,
            // otherwise what is already persisted; untracked accounts end
            // up with none.
            let desired: Vec<SplitDraft> = if !tracked {
                Vec::new()
            } else {
                match &desired_splits {
                    Some(drafts) => drafts.clone(),
                    None => existing_splits.iter().map(split_row_to_draft).collect(),
                }
            };
            if tracked {
                validate_splits(&desired, amount_in_effect)?;
                self.require_split_categories(&db_tx, &desired).await?;
            }

            let mut active = transactions::ActiveModel {
                id: ActiveValue::Set(transaction_id),
                ..Default::default()
            };
            if let Some(posted_on) = posted_on {
                active.posted_on = ActiveValue::Set(posted_on);
            }
            if let Some(new_account_id) = account_id {
                active.account_id = ActiveValue::Set(Some(new_account_id));
            }
            if let Some(new_payee_id) = payee_id {
                active.payee_id = ActiveValue::Set(new_payee_id);
            }
            if let Some(amount) = amount {
                active.amount_minor = ActiveValue::Set(amount.cents());
            }
            if let Some(notes) = notes {
                active.notes = ActiveValue::Set(normalize_optional_text(notes.as_deref()));
            }
            if let Some(status) = status {
                active.status = ActiveValue::Set(status.as_str().to_string());
            }
            active.update(&db_tx).await?;

            if let Some(desired_tags) = tags {
                self.replace_transaction_tags(&db_tx, transaction_id, &desired_tags)
                    .await?;
            }

            let change_set = reconcile_splits(&existing_splits, &desired);
            if !change_set.removed.is_empty() {
                splits::Entity::delete_many()
                    .filter(splits::Column::Id.is_in(change_set.removed.iter().copied()))
                    .exec(&db_tx)
                    .await?;
            }
            for split_update in &change_set.updated {
                let mut active = splits::ActiveModel {
                    id: ActiveValue::Set(split_update.id),
                    ..Default::default()
                };
                if let Some(category_id) = split_update.category_id {
                    active.category_id = ActiveValue::Set(category_id);
                }
                if let Some(amount) = split_update.amount {
                    active.amount_minor = ActiveValue::Set(amount.cents());
                }
                if let Some(notes) = &split_update.notes {
                    active.notes = ActiveValue::Set(notes.clone());
                }
                active.update(&db_tx).await?;
            }
            self.insert_splits(&db_tx, transaction_id, &change_set.added)
                .await?;

            let new_account_id = account_id.or(existing.account_id);
            Ok::<_, LedgerError>((
                existing.account_id,
                new_account_id,
                amount.is_some_and(|value| value.cents() != existing.amount_minor),
            ))
        })?;

        let account_changed = new_account_id != old_account_id;
        if account_changed {
            self.recompute_account_balance(old_account_id, None).await;
        }
        if account_changed || amount_changed {
            self.recompute_account_balance(new_account_id, None).await;
        }
        Ok(())
    }

    /// Deletes a transaction; unknown ids are a no-op.
    ///
    /// The account balance is settled first, leaving the dying row out of
    /// the sum; splits and tag links go with the row via cascade.
    pub async fn delete_transaction(&self, transaction_id: Uuid) -> ResultLedger<()> {
        let existing = transactions::Entity::find_by_id(transaction_id)
            .one(&self.database)
            .await?;
        let Some(model) = existing else {
            tracing::debug!("delete of unknown transaction {transaction_id} ignored");
            return Ok(());
        };

        self.recompute_account_balance(model.account_id, Some(transaction_id))
            .await;

        with_tx!(self, |db_tx| {
            transactions::Entity::delete_by_id(transaction_id)
                .exec(&db_tx)
                .await?;
            Ok(())
        })
    }

    /// Reassigns every transaction of `old_payee_id` to `new_payee_id`.
    ///
    /// Returns how many rows moved. Balances are untouched since the
    /// amounts stay on their accounts.
    pub async fn move_transactions_to_payee(
        &self,
        old_payee_id: Uuid,
        new_payee_id: Uuid,
    ) -> ResultLedger<u64> {
        with_tx!(self, |db_tx| {
            self.require_payee(&db_tx, old_payee_id).await?;
            self.require_payee(&db_tx, new_payee_id).await?;

            let result = transactions::Entity::update_many()
                .col_expr(transactions::Column::PayeeId, Expr::value(new_payee_id))
                .filter(transactions::Column::PayeeId.eq(old_payee_id))
                .exec(&db_tx)
                .await?;
            Ok(result.rows_affected)
        })
    }

    /// Lists transactions, newest posting date first.
    pub async fn list_transactions(
        &self,
        filter: TransactionFilter,
    ) -> ResultLedger<Vec<TransactionInfo>> {
        with_tx!(self, |db_tx| {
            let mut query = transactions::Entity::find()
                .order_by_desc(transactions::Column::PostedOn)
                .order_by_desc(transactions::Column::CreatedAt);

            query = match filter {
                TransactionFilter::All => query,
                TransactionFilter::Account(account_id) => {
                    query.filter(transactions::Column::AccountId.eq(account_id))
                }
                TransactionFilter::Payee(payee_id) => {
                    query.filter(transactions::Column::PayeeId.eq(payee_id))
                }
                TransactionFilter::Category(category_id) => query
                    .join(JoinType::InnerJoin, transactions::Relation::Splits.def())
                    .filter(splits::Column::CategoryId.eq(category_id))
                    .distinct(),
            };

            let models = query.all(&db_tx).await?;
            self.assemble_transaction_infos(&db_tx, models).await
        })
    }

    async fn require_split_categories(
        &self,
        db_tx: &DatabaseTransaction,
        splits: &[SplitDraft],
    ) -> ResultLedger<()> {
        let distinct: HashSet<Uuid> = splits.iter().map(|draft| draft.category_id).collect();
        for category_id in distinct {
            self.require_category(db_tx, category_id).await?;
        }
        Ok(())
    }

    async fn insert_splits(
        &self,
        db_tx: &DatabaseTransaction,
        transaction_id: Uuid,
        drafts: &[SplitDraft],
    ) -> ResultLedger<()> {
        for draft in drafts {
            splits::ActiveModel {
                id: ActiveValue::Set(Uuid::new_v4()),
                transaction_id: ActiveValue::Set(transaction_id),
                category_id: ActiveValue::Set(draft.category_id),
                amount_minor: ActiveValue::Set(draft.amount.cents()),
                notes: ActiveValue::Set(draft.notes.clone()),
                position: ActiveValue::Set(draft.position),
                created_at: ActiveValue::Set(Utc::now()),
            }
            .insert(db_tx)
            .await?;
        }
        Ok(())
    }

    async fn replace_transaction_tags(
        &self,
        db_tx: &DatabaseTransaction,
        transaction_id: Uuid,
        desired: &[Uuid],
    ) -> ResultLedger<()> {
        self.require_tags(db_tx, desired).await?;

        let current: HashSet<Uuid> = transaction_tags::Entity::find()
            .filter(transaction_tags::Column::TransactionId.eq(transaction_id))
            .all(db_tx)
            .await?
            .into_iter()
            .map(|link| link.tag_id)
            .collect();
        let desired: HashSet<Uuid> = desired.iter().copied().collect();

        let stale: Vec<Uuid> = current.difference(&desired).copied().collect();
        if !stale.is_empty() {
            transaction_tags::Entity::delete_many()
                .filter(transaction_tags::Column::TransactionId.eq(transaction_id))
                .filter(transaction_tags::Column::TagId.is_in(stale))
                .exec(db_tx)
                .await?;
        }
        for tag_id in desired.difference(&current) {
            transaction_tags::ActiveModel {
                transaction_id: ActiveValue::Set(transaction_id),
                tag_id: ActiveValue::Set(*tag_id),
            }
            .insert(db_tx)
            .await?;
        }
        Ok(())
    }

    async fn assemble_transaction_infos(
        &self,
        db_tx: &DatabaseTransaction,
        models: Vec<transactions::Model>,
    ) -> ResultLedger<Vec<TransactionInfo>> {
        if models.is_empty() {
            return Ok(Vec::new());
        }
        let transaction_ids: Vec<Uuid> = models.iter().map(|model| model.id).collect();

        // Name lookups skip the liveness filter: history keeps pointing at
        // soft-deleted rows.
        let account_ids: HashSet<Uuid> =
            models.iter().filter_map(|model| model.account_id).collect();
        let accounts_by_id: HashMap<Uuid, String> = accounts::Entity::find()
            .filter(accounts::Column::Id.is_in(account_ids))
            .all(db_tx)
            .await?
            .into_iter()
            .map(|model| (model.id, model.name))
            .collect();

        let payee_ids: HashSet<Uuid> = models.iter().map(|model| model.payee_id).collect();
        let payees_by_id: HashMap<Uuid, String> = payees::Entity::find()
            .filter(payees::Column::Id.is_in(payee_ids))
            .all(db_tx)
            .await?
            .into_iter()
            .map(|model| (model.id, model.name))
            .collect();

        let split_models = splits::Entity::find()
            .filter(splits::Column::TransactionId.is_in(transaction_ids.clone()))
            .order_by_asc(splits::Column::Position)
            .all(db_tx)
            .await?;
        let category_ids: Vec<Uuid> = split_models
            .iter()
            .map(|split| split.category_id)
            .collect::<HashSet<_>>()
            .into_iter()
            .collect();
        let category_names = self.category_names(db_tx, &category_ids).await?;
        let mut splits_by_transaction: HashMap<Uuid, Vec<splits::Model>> = HashMap::new();
        for split in split_models {
            splits_by_transaction
                .entry(split.transaction_id)
                .or_default()
                .push(split);
        }

        let links = transaction_tags::Entity::find()
            .filter(transaction_tags::Column::TransactionId.is_in(transaction_ids))
            .all(db_tx)
            .await?;
        let tag_ids: Vec<Uuid> = links
            .iter()
            .map(|link| link.tag_id)
            .collect::<HashSet<_>>()
            .into_iter()
            .collect();
        let tag_names: HashMap<Uuid, String> = tags::Entity::find()
            .filter(tags::Column::Id.is_in(tag_ids))
            .all(db_tx)
            .await?
            .into_iter()
            .map(|model| (model.id, model.name))
            .collect();
        let mut tags_by_transaction: HashMap<Uuid, Vec<TagInfo>> = HashMap::new();
        for link in links {
            if let Some(name) = tag_names.get(&link.tag_id) {
                tags_by_transaction
                    .entry(link.transaction_id)
                    .or_default()
                    .push(TagInfo {
                        id: link.tag_id,
                        name: name.clone(),
                    });
            }
        }

        let mut infos = Vec::with_capacity(models.len());
        for model in models {
            let payee = payees_by_id
                .get(&model.payee_id)
                .cloned()
                .ok_or_else(|| LedgerError::not_found("payee", model.payee_id))?;
            let account = model
                .account_id
                .and_then(|id| accounts_by_id.get(&id).cloned());

            let split_rows = splits_by_transaction.remove(&model.id).unwrap_or_default();
            let category = match split_rows.as_slice() {
                [] => TransactionCategory::None,
                [split] => TransactionCategory::Single {
                    category_id: split.category_id,
                    name: category_names
                        .get(&split.category_id)
                        .cloned()
                        .unwrap_or_default(),
                },
                _ => TransactionCategory::Split(
                    split_rows
                        .iter()
                        .map(|split| SplitInfo {
                            id: split.id,
                            category_id: split.category_id,
                            category: category_names
                                .get(&split.category_id)
                                .cloned()
                                .unwrap_or_default(),
                            amount: MoneyCents::new(split.amount_minor),
                            notes: split.notes.clone(),
                            position: split.position,
                        })
                        .collect(),
                ),
            };

            let mut tag_list = tags_by_transaction.remove(&model.id).unwrap_or_default();
            tag_list.sort_by(|a, b| a.name.cmp(&b.name));

            infos.push(TransactionInfo {
                id: model.id,
                posted_on: model.posted_on,
                account_id: model.account_id,
                account,
                payee_id: model.payee_id,
                payee,
                amount: MoneyCents::new(model.amount_minor),
                notes: model.notes,
                status: TransactionStatus::try_from(model.status.as_str())?,
                tags: tag_list,
                category,
            });
        }
        Ok(infos)
    }
}

fn split_row_to_draft(row: &splits::Model) -> SplitDraft {
    SplitDraft {
        category_id: row.category_id,
        amount: MoneyCents::new(row.amount_minor),
        notes: row.notes.clone(),
        position: row.position,
    }
}
