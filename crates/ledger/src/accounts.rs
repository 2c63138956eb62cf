//! Money accounts.
//!
//! `balance_minor` is derived state: the stored sum of the account's
//! transaction amounts, rewritten by the balance maintainer after every
//! mutation. Nothing else may write it.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::LedgerError;

/// What the account represents on the budget sheet.
///
/// `tracked` is stored separately: an off-budget account keeps a kind but
/// its transactions carry no splits and never feed budget figures.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccountKind {
    Cash,
    Checking,
    Savings,
    CreditCard,
    LineOfCredit,
    Mortgage,
    Loan,
    Asset,
    Liability,
}

impl AccountKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Cash => "cash",
            Self::Checking => "checking",
            Self::Savings => "savings",
            Self::CreditCard => "credit_card",
            Self::LineOfCredit => "line_of_credit",
            Self::Mortgage => "mortgage",
            Self::Loan => "loan",
            Self::Asset => "asset",
            Self::Liability => "liability",
        }
    }
}

impl TryFrom<&str> for AccountKind {
    type Error = LedgerError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "cash" => Ok(Self::Cash),
            "checking" => Ok(Self::Checking),
            "savings" => Ok(Self::Savings),
            "credit_card" => Ok(Self::CreditCard),
            "line_of_credit" => Ok(Self::LineOfCredit),
            "mortgage" => Ok(Self::Mortgage),
            "loan" => Ok(Self::Loan),
            "asset" => Ok(Self::Asset),
            "liability" => Ok(Self::Liability),
            other => Err(LedgerError::InvalidKind(format!(
                "account kind {other}"
            ))),
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "accounts")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub name: String,
    pub kind: String,
    pub tracked: bool,
    pub balance_minor: i64,
    pub created_at: DateTimeUtc,
    pub deleted_at: Option<DateTimeUtc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::transactions::Entity")]
    Transactions,
}

impl Related<super::transactions::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Transactions.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
