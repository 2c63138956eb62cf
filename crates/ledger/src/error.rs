//! The module contains the errors the ledger can return.
//!
//! Validation errors ([`InvalidSplitTotal`], [`InvalidSplitOrder`]) are
//! detected before any write begins; [`Database`] wraps a failed unit of
//! work after the whole database transaction has rolled back.
//!
//!  [`InvalidSplitTotal`]: LedgerError::InvalidSplitTotal
//!  [`InvalidSplitOrder`]: LedgerError::InvalidSplitOrder
//!  [`Database`]: LedgerError::Database
use sea_orm::DbErr;
use thiserror::Error;

/// Ledger custom errors.
#[derive(Error, Debug)]
pub enum LedgerError {
    #[error("{entity} \"{id}\" not found!")]
    NotFound { entity: &'static str, id: String },
    #[error("\"{0}\" already present!")]
    DuplicateName(String),
    #[error("Invalid name: {0}")]
    InvalidName(String),
    #[error("split amounts do not sum to the transaction total")]
    InvalidSplitTotal,
    #[error("split order values are not a contiguous 0..n-1 range")]
    InvalidSplitOrder,
    #[error("\"{0}\" is not editable!")]
    NotEditable(String),
    #[error("account still carries a non-zero balance")]
    AccountHasBalance,
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),
    #[error("Invalid kind: {0}")]
    InvalidKind(String),
    #[error(transparent)]
    Database(#[from] DbErr),
}

impl LedgerError {
    /// Shorthand for the common miss case.
    pub(crate) fn not_found(entity: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            entity,
            id: id.to_string(),
        }
    }
}

impl PartialEq for LedgerError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (
                Self::NotFound { entity: ea, id: ia },
                Self::NotFound { entity: eb, id: ib },
            ) => ea == eb && ia == ib,
            (Self::DuplicateName(a), Self::DuplicateName(b)) => a == b,
            (Self::InvalidName(a), Self::InvalidName(b)) => a == b,
            (Self::InvalidSplitTotal, Self::InvalidSplitTotal) => true,
            (Self::InvalidSplitOrder, Self::InvalidSplitOrder) => true,
            (Self::NotEditable(a), Self::NotEditable(b)) => a == b,
            (Self::AccountHasBalance, Self::AccountHasBalance) => true,
            (Self::InvalidAmount(a), Self::InvalidAmount(b)) => a == b,
            (Self::InvalidKind(a), Self::InvalidKind(b)) => a == b,
            (Self::Database(a), Self::Database(b)) => a.to_string() == b.to_string(),
            _ => false,
        }
    }
}
