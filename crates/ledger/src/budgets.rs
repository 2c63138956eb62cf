//! Budgets: named envelopes of per-month category allocations.

use sea_orm::entity::prelude::*;
use uuid::Uuid;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "budgets")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub name: String,
    pub created_at: DateTimeUtc,
    pub deleted_at: Option<DateTimeUtc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::budget_months::Entity")]
    BudgetMonths,
}

impl Related<super::budget_months::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::BudgetMonths.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
