use std::collections::HashMap;

use chrono::Utc;
use sea_orm::{
    ActiveValue, DatabaseTransaction, QueryFilter, QueryOrder, TransactionTrait, prelude::*,
};
use uuid::Uuid;

use crate::{LedgerError, ResultLedger, categories};

use super::{Ledger, normalize_required_name, with_tx};

impl Ledger {
    pub(super) async fn require_category(
        &self,
        db_tx: &DatabaseTransaction,
        category_id: Uuid,
    ) -> ResultLedger<categories::Model> {
        categories::Entity::find_by_id(category_id)
            .filter(categories::Column::DeletedAt.is_null())
            .one(db_tx)
            .await?
            .ok_or_else(|| LedgerError::not_found("category", category_id))
    }

    /// Resolves category names for a set of ids, soft-deleted rows included.
    ///
    /// Historical transactions keep pointing at deleted categories; display
    /// paths still need their names.
    pub(super) async fn category_names(
        &self,
        db_tx: &DatabaseTransaction,
        ids: &[Uuid],
    ) -> ResultLedger<HashMap<Uuid, String>> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }
        let models = categories::Entity::find()
            .filter(categories::Column::Id.is_in(ids.iter().copied()))
            .all(db_tx)
            .await?;
        Ok(models
            .into_iter()
            .map(|model| (model.id, model.name))
            .collect())
    }

    /// Creates a category.
    pub async fn new_category(&self, name: &str) -> ResultLedger<Uuid> {
        let name = normalize_required_name(name, "category")?;
        with_tx!(self, |db_tx| {
            let id = Uuid::new_v4();
            categories::ActiveModel {
                id: ActiveValue::Set(id),
                name: ActiveValue::Set(name),
                is_editable: ActiveValue::Set(true),
                created_at: ActiveValue::Set(Utc::now()),
                deleted_at: ActiveValue::Set(None),
            }
            .insert(&db_tx)
            .await?;
            Ok(id)
        })
    }

    /// Renames an existing category.
    ///
    /// Seeded categories carry `is_editable = false` and refuse the rename.
    pub async fn rename_category(&self, category_id: Uuid, new_name: &str) -> ResultLedger<()> {
        let new_name = normalize_required_name(new_name, "category")?;
        with_tx!(self, |db_tx| {
            let model = self.require_category(&db_tx, category_id).await?;
            if !model.is_editable {
                return Err(LedgerError::NotEditable(model.name));
            }

            categories::ActiveModel {
                id: ActiveValue::Set(category_id),
                name: ActiveValue::Set(new_name),
                ..Default::default()
            }
            .update(&db_tx)
            .await?;
            Ok(())
        })
    }

    /// Return a live category by id.
    pub async fn category(&self, category_id: Uuid) -> ResultLedger<categories::Model> {
        with_tx!(self, |db_tx| {
            self.require_category(&db_tx, category_id).await
        })
    }

    /// Lists live categories, ordered by name.
    pub async fn list_categories(&self) -> ResultLedger<Vec<categories::Model>> {
        with_tx!(self, |db_tx| {
            let models = categories::Entity::find()
                .filter(categories::Column::DeletedAt.is_null())
                .order_by_asc(categories::Column::Name)
                .all(&db_tx)
                .await?;
            Ok(models)
        })
    }

    /// Soft-deletes a category.
    ///
    /// Splits, budget rows and goals keep their references; the row stays
    /// and only disappears from default reads.
    pub async fn delete_category(&self, category_id: Uuid) -> ResultLedger<()> {
        with_tx!(self, |db_tx| {
            let model = self.require_category(&db_tx, category_id).await?;
            if !model.is_editable {
                return Err(LedgerError::NotEditable(model.name));
            }

            categories::ActiveModel {
                id: ActiveValue::Set(category_id),
                deleted_at: ActiveValue::Set(Some(Utc::now())),
                ..Default::default()
            }
            .update(&db_tx)
            .await?;
            Ok(())
        })
    }
}
