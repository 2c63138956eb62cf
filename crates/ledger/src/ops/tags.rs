use chrono::Utc;
use sea_orm::{
    ActiveValue, DatabaseTransaction, QueryFilter, QueryOrder, TransactionTrait, prelude::*,
};
use uuid::Uuid;

use crate::{LedgerError, ResultLedger, tags};

use super::{Ledger, normalize_required_name, with_tx};

impl Ledger {
    async fn require_tag(
        &self,
        db_tx: &DatabaseTransaction,
        tag_id: Uuid,
    ) -> ResultLedger<tags::Model> {
        tags::Entity::find_by_id(tag_id)
            .filter(tags::Column::DeletedAt.is_null())
            .one(db_tx)
            .await?
            .ok_or_else(|| LedgerError::not_found("tag", tag_id))
    }

    /// Resolves a set of tag ids, failing on the first unknown one.
    pub(super) async fn require_tags(
        &self,
        db_tx: &DatabaseTransaction,
        ids: &[Uuid],
    ) -> ResultLedger<Vec<tags::Model>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let models = tags::Entity::find()
            .filter(tags::Column::Id.is_in(ids.iter().copied()))
            .filter(tags::Column::DeletedAt.is_null())
            .all(db_tx)
            .await?;
        for id in ids {
            if !models.iter().any(|model| model.id == *id) {
                return Err(LedgerError::not_found("tag", id));
            }
        }
        Ok(models)
    }

    /// Creates a tag.
    pub async fn new_tag(&self, name: &str) -> ResultLedger<Uuid> {
        let name = normalize_required_name(name, "tag")?;
        with_tx!(self, |db_tx| {
            let id = Uuid::new_v4();
            tags::ActiveModel {
                id: ActiveValue::Set(id),
                name: ActiveValue::Set(name),
                created_at: ActiveValue::Set(Utc::now()),
                deleted_at: ActiveValue::Set(None),
            }
            .insert(&db_tx)
            .await?;
            Ok(id)
        })
    }

    /// Renames an existing tag.
    pub async fn rename_tag(&self, tag_id: Uuid, new_name: &str) -> ResultLedger<()> {
        let new_name = normalize_required_name(new_name, "tag")?;
        with_tx!(self, |db_tx| {
            self.require_tag(&db_tx, tag_id).await?;

            tags::ActiveModel {
                id: ActiveValue::Set(tag_id),
                name: ActiveValue::Set(new_name),
                ..Default::default()
            }
            .update(&db_tx)
            .await?;
            Ok(())
        })
    }

    /// Return a live tag by id.
    pub async fn tag(&self, tag_id: Uuid) -> ResultLedger<tags::Model> {
        with_tx!(self, |db_tx| { self.require_tag(&db_tx, tag_id).await })
    }

    /// Lists live tags, ordered by name.
    pub async fn list_tags(&self) -> ResultLedger<Vec<tags::Model>> {
        with_tx!(self, |db_tx| {
            let models = tags::Entity::find()
                .filter(tags::Column::DeletedAt.is_null())
                .order_by_asc(tags::Column::Name)
                .all(&db_tx)
                .await?;
            Ok(models)
        })
    }

    /// Soft-deletes a tag. Existing transaction links stay in place.
    pub async fn delete_tag(&self, tag_id: Uuid) -> ResultLedger<()> {
        with_tx!(self, |db_tx| {
            self.require_tag(&db_tx, tag_id).await?;

            tags::ActiveModel {
                id: ActiveValue::Set(tag_id),
                deleted_at: ActiveValue::Set(Some(Utc::now())),
                ..Default::default()
            }
            .update(&db_tx)
            .await?;
            Ok(())
        })
    }
}
