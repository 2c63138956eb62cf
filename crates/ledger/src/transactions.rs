//! Ledger transactions.
//!
//! A transaction is a single dated movement against one account and one
//! payee. Tracked accounts break the amount down into [`splits`] rows; the
//! split amounts must always sum back to `amount_minor`.
//!
//! `account_id` is nullable: soft-deleting an account leaves its history
//! in place and the balance maintainer skips rows without an account.
//!
//! [`splits`]: super::splits

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::LedgerError;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionStatus {
    Pending,
    Cleared,
}

impl TransactionStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Cleared => "cleared",
        }
    }
}

impl TryFrom<&str> for TransactionStatus {
    type Error = LedgerError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "pending" => Ok(Self::Pending),
            "cleared" => Ok(Self::Cleared),
            other => Err(LedgerError::InvalidKind(format!(
                "transaction status {other}"
            ))),
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "transactions")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub posted_on: Date,
    pub account_id: Option<Uuid>,
    pub payee_id: Uuid,
    pub amount_minor: i64,
    pub notes: Option<String>,
    pub status: String,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::accounts::Entity",
        from = "Column::AccountId",
        to = "super::accounts::Column::Id",
        on_update = "NoAction",
        on_delete = "SetNull"
    )]
    Accounts,
    #[sea_orm(
        belongs_to = "super::payees::Entity",
        from = "Column::PayeeId",
        to = "super::payees::Column::Id",
        on_update = "NoAction",
        on_delete = "Restrict"
    )]
    Payees,
    #[sea_orm(has_many = "super::splits::Entity")]
    Splits,
    #[sea_orm(has_many = "super::transaction_tags::Entity")]
    TransactionTags,
}

impl Related<super::accounts::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Accounts.def()
    }
}

impl Related<super::payees::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Payees.def()
    }
}

impl Related<super::splits::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Splits.def()
    }
}

impl Related<super::tags::Entity> for Entity {
    fn to() -> RelationDef {
        super::transaction_tags::Relation::Tags.def()
    }

    fn via() -> Option<RelationDef> {
        Some(super::transaction_tags::Relation::Transactions.def().rev())
    }
}

impl ActiveModelBehavior for ActiveModel {}
