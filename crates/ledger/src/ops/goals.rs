use chrono::{NaiveDate, Utc};
use uuid::Uuid;

use sea_orm::{
    ActiveValue, DatabaseTransaction, QueryFilter, QueryOrder, TransactionTrait, prelude::*,
};

use crate::{LedgerError, MoneyCents, ResultLedger, goals};

use super::{Ledger, normalize_optional_text, normalize_required_name, with_tx};

/// Creation input for a goal.
#[derive(Clone, Debug)]
pub struct NewGoal {
    pub name: String,
    pub description: Option<String>,
    pub category_id: Uuid,
    pub amount: Option<MoneyCents>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub schedule_id: Option<Uuid>,
}

/// Replacement state for a goal. Updates are whole-row, so `None` here
/// clears the field rather than keeping it.
#[derive(Clone, Debug)]
pub struct GoalUpdate {
    pub name: String,
    pub description: Option<String>,
    pub category_id: Uuid,
    pub amount: Option<MoneyCents>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub schedule_id: Option<Uuid>,
}

/// A start date only makes sense before the end date; anything else is
/// dropped rather than stored.
fn effective_start_date(
    start_date: Option<NaiveDate>,
    end_date: Option<NaiveDate>,
) -> Option<NaiveDate> {
    match (start_date, end_date) {
        (Some(start), Some(end)) if start < end => Some(start),
        _ => None,
    }
}

impl Ledger {
    async fn find_goal(
        &self,
        db_tx: &DatabaseTransaction,
        goal_id: Uuid,
        include_archived: bool,
    ) -> ResultLedger<Option<goals::Model>> {
        let mut query = goals::Entity::find_by_id(goal_id);
        if !include_archived {
            query = query.filter(goals::Column::DeletedAt.is_null());
        }
        Ok(query.one(db_tx).await?)
    }

    async fn check_goal_references(
        &self,
        db_tx: &DatabaseTransaction,
        category_id: Uuid,
        schedule_id: Option<Uuid>,
    ) -> ResultLedger<()> {
        self.require_category(db_tx, category_id).await?;
        if let Some(schedule_id) = schedule_id {
            self.require_schedule(db_tx, schedule_id).await?;
        }
        Ok(())
    }

    /// Adds a new goal against a category, optionally on a schedule.
    pub async fn new_goal(&self, new: NewGoal) -> ResultLedger<Uuid> {
        let NewGoal {
            name,
            description,
            category_id,
            amount,
            start_date,
            end_date,
            schedule_id,
        } = new;
        let name = normalize_required_name(&name, "goal")?;
        let description = normalize_optional_text(description.as_deref());
        let start_date = effective_start_date(start_date, end_date);

        with_tx!(self, |db_tx| {
            self.check_goal_references(&db_tx, category_id, schedule_id)
                .await?;

            let goal_id = Uuid::new_v4();
            goals::ActiveModel {
                id: ActiveValue::Set(goal_id),
                name: ActiveValue::Set(name.clone()),
                description: ActiveValue::Set(description.clone()),
                category_id: ActiveValue::Set(category_id),
                amount_minor: ActiveValue::Set(amount.map(MoneyCents::cents)),
                start_date: ActiveValue::Set(start_date),
                end_date: ActiveValue::Set(end_date),
                schedule_id: ActiveValue::Set(schedule_id),
                created_at: ActiveValue::Set(Utc::now()),
                deleted_at: ActiveValue::Set(None),
            }
            .insert(&db_tx)
            .await?;
            Ok(goal_id)
        })
    }

    /// Replaces a live goal.
    pub async fn update_goal(&self, goal_id: Uuid, update: GoalUpdate) -> ResultLedger<()> {
        let GoalUpdate {
            name,
            description,
            category_id,
            amount,
            start_date,
            end_date,
            schedule_id,
        } = update;
        let name = normalize_required_name(&name, "goal")?;
        let description = normalize_optional_text(description.as_deref());
        let start_date = effective_start_date(start_date, end_date);

        with_tx!(self, |db_tx| {
            self.find_goal(&db_tx, goal_id, false)
                .await?
                .ok_or_else(|| LedgerError::not_found("goal", goal_id))?;
            self.check_goal_references(&db_tx, category_id, schedule_id)
                .await?;

            goals::ActiveModel {
                id: ActiveValue::Set(goal_id),
                name: ActiveValue::Set(name.clone()),
                description: ActiveValue::Set(description.clone()),
                category_id: ActiveValue::Set(category_id),
                amount_minor: ActiveValue::Set(amount.map(MoneyCents::cents)),
                start_date: ActiveValue::Set(start_date),
                end_date: ActiveValue::Set(end_date),
                schedule_id: ActiveValue::Set(schedule_id),
                ..Default::default()
            }
            .update(&db_tx)
            .await?;
            Ok(())
        })
    }

    /// Return a goal by id, live or (when `archived`) regardless.
    pub async fn goal(&self, goal_id: Uuid, archived: bool) -> ResultLedger<goals::Model> {
        with_tx!(self, |db_tx| {
            self.find_goal(&db_tx, goal_id, archived)
                .await?
                .ok_or_else(|| LedgerError::not_found("goal", goal_id))
        })
    }

    /// List goals by name: the live ones, or only the archived ones.
    pub async fn list_goals(&self, archived: bool) -> ResultLedger<Vec<goals::Model>> {
        with_tx!(self, |db_tx| {
            let mut query = goals::Entity::find().order_by_asc(goals::Column::Name);
            query = if archived {
                query.filter(goals::Column::DeletedAt.is_not_null())
            } else {
                query.filter(goals::Column::DeletedAt.is_null())
            };
            Ok(query.all(&db_tx).await?)
        })
    }

    /// Archives (soft-deletes) a goal; unknown or already archived ids are
    /// a no-op.
    pub async fn archive_goal(&self, goal_id: Uuid) -> ResultLedger<()> {
        with_tx!(self, |db_tx| {
            if self.find_goal(&db_tx, goal_id, false).await?.is_none() {
                tracing::debug!("archive of unknown goal {goal_id} ignored");
                return Ok(());
            }

            goals::ActiveModel {
                id: ActiveValue::Set(goal_id),
                deleted_at: ActiveValue::Set(Some(Utc::now())),
                ..Default::default()
            }
            .update(&db_tx)
            .await?;
            Ok(())
        })
    }

    /// Permanently deletes a goal, archived or not; unknown ids are a
    /// no-op.
    pub async fn purge_goal(&self, goal_id: Uuid) -> ResultLedger<()> {
        with_tx!(self, |db_tx| {
            if self.find_goal(&db_tx, goal_id, true).await?.is_none() {
                tracing::debug!("purge of unknown goal {goal_id} ignored");
                return Ok(());
            }

            goals::Entity::delete_by_id(goal_id).exec(&db_tx).await?;
            Ok(())
        })
    }
}
