use chrono::Utc;
use uuid::Uuid;

use sea_orm::{
    ActiveValue, DatabaseTransaction, QueryFilter, QueryOrder, TransactionTrait, prelude::*,
    sea_query::Expr,
};

use crate::{LedgerError, ResultLedger, ScheduleFrequency, schedules};

use super::{Ledger, normalize_required_name, with_tx};

/// Creation input for a schedule.
#[derive(Clone, Debug)]
pub struct NewSchedule {
    pub frequency: ScheduleFrequency,
    pub interval: i32,
    pub display_name: String,
    pub display_order: i32,
}

/// Replacement state for a schedule. Updates are whole-row; there is no
/// per-field patching here.
#[derive(Clone, Debug)]
pub struct ScheduleUpdate {
    pub frequency: ScheduleFrequency,
    pub interval: i32,
    pub display_name: String,
    pub display_order: i32,
}

impl Ledger {
    pub(super) async fn require_schedule(
        &self,
        db_tx: &DatabaseTransaction,
        schedule_id: Uuid,
    ) -> ResultLedger<schedules::Model> {
        schedules::Entity::find_by_id(schedule_id)
            .one(db_tx)
            .await?
            .ok_or_else(|| LedgerError::not_found("schedule", schedule_id))
    }

    /// `(frequency, interval)` pairs are unique across all schedules.
    async fn ensure_schedule_slot_free(
        &self,
        db_tx: &DatabaseTransaction,
        frequency: ScheduleFrequency,
        interval: i32,
        exclude: Option<Uuid>,
    ) -> ResultLedger<()> {
        let mut query = schedules::Entity::find()
            .filter(schedules::Column::Frequency.eq(frequency.as_str()))
            .filter(schedules::Column::Interval.eq(interval));
        if let Some(schedule_id) = exclude {
            query = query.filter(schedules::Column::Id.ne(schedule_id));
        }
        if query.one(db_tx).await?.is_some() {
            return Err(LedgerError::DuplicateName(format!(
                "{}/{interval}",
                frequency.as_str()
            )));
        }
        Ok(())
    }

    /// Makes room at `display_order` by pushing every schedule at or after
    /// it one slot down.
    async fn shift_display_orders(
        &self,
        db_tx: &DatabaseTransaction,
        display_order: i32,
        exclude: Option<Uuid>,
    ) -> ResultLedger<()> {
        let mut query = schedules::Entity::update_many()
            .col_expr(
                schedules::Column::DisplayOrder,
                Expr::col(schedules::Column::DisplayOrder).add(1),
            )
            .filter(schedules::Column::DisplayOrder.gte(display_order));
        if let Some(schedule_id) = exclude {
            query = query.filter(schedules::Column::Id.ne(schedule_id));
        }
        query.exec(db_tx).await?;
        Ok(())
    }

    /// Adds a new schedule at the requested display position.
    pub async fn new_schedule(&self, new: NewSchedule) -> ResultLedger<Uuid> {
        let NewSchedule {
            frequency,
            interval,
            display_name,
            display_order,
        } = new;
        let display_name = normalize_required_name(&display_name, "schedule")?;

        with_tx!(self, |db_tx| {
            self.ensure_schedule_slot_free(&db_tx, frequency, interval, None)
                .await?;
            self.shift_display_orders(&db_tx, display_order, None).await?;

            let schedule_id = Uuid::new_v4();
            schedules::ActiveModel {
                id: ActiveValue::Set(schedule_id),
                frequency: ActiveValue::Set(frequency.as_str().to_string()),
                interval: ActiveValue::Set(interval),
                display_name: ActiveValue::Set(display_name.clone()),
                display_order: ActiveValue::Set(display_order),
                is_editable: ActiveValue::Set(true),
                created_at: ActiveValue::Set(Utc::now()),
            }
            .insert(&db_tx)
            .await?;
            Ok(schedule_id)
        })
    }

    /// Replaces an editable schedule.
    pub async fn update_schedule(
        &self,
        schedule_id: Uuid,
        update: ScheduleUpdate,
    ) -> ResultLedger<()> {
        let ScheduleUpdate {
            frequency,
            interval,
            display_name,
            display_order,
        } = update;
        let display_name = normalize_required_name(&display_name, "schedule")?;

        with_tx!(self, |db_tx| {
            let model = self.require_schedule(&db_tx, schedule_id).await?;
            if !model.is_editable {
                return Err(LedgerError::NotEditable(model.display_name));
            }
            self.ensure_schedule_slot_free(&db_tx, frequency, interval, Some(schedule_id))
                .await?;
            self.shift_display_orders(&db_tx, display_order, Some(schedule_id))
                .await?;

            schedules::ActiveModel {
                id: ActiveValue::Set(schedule_id),
                frequency: ActiveValue::Set(frequency.as_str().to_string()),
                interval: ActiveValue::Set(interval),
                display_name: ActiveValue::Set(display_name.clone()),
                display_order: ActiveValue::Set(display_order),
                ..Default::default()
            }
            .update(&db_tx)
            .await?;
            Ok(())
        })
    }

    /// Return a schedule by id.
    pub async fn schedule(&self, schedule_id: Uuid) -> ResultLedger<schedules::Model> {
        with_tx!(self, |db_tx| self.require_schedule(&db_tx, schedule_id).await)
    }

    /// List schedules in display order.
    pub async fn list_schedules(&self) -> ResultLedger<Vec<schedules::Model>> {
        with_tx!(self, |db_tx| {
            let models = schedules::Entity::find()
                .order_by_asc(schedules::Column::DisplayOrder)
                .all(&db_tx)
                .await?;
            Ok(models)
        })
    }

    /// Deletes an editable schedule; unknown ids are a no-op.
    pub async fn delete_schedule(&self, schedule_id: Uuid) -> ResultLedger<()> {
        with_tx!(self, |db_tx| {
            let existing = schedules::Entity::find_by_id(schedule_id).one(&db_tx).await?;
            let Some(model) = existing else {
                tracing::debug!("delete of unknown schedule {schedule_id} ignored");
                return Ok(());
            };
            if !model.is_editable {
                return Err(LedgerError::NotEditable(model.display_name));
            }

            schedules::Entity::delete_by_id(schedule_id)
                .exec(&db_tx)
                .await?;
            Ok(())
        })
    }
}
